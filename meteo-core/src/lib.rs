//! Core library for the `meteo` weather lookup.
//!
//! This crate defines:
//! - Clients for geocoding, IP location and forecasts (Open-Meteo, ipinfo.io)
//! - The mapping from raw forecasts to fixed-slot display records
//! - The session pipeline tying them together
//! - Configuration, response caching and retry plumbing
//!
//! It is used by `meteo-cli`, but any front end can drive [`WeatherApp`] and
//! render the resulting [`WeatherDisplay`].

pub mod cache;
pub mod config;
pub mod error;
pub mod http;
pub mod icons;
pub mod model;
pub mod present;
pub mod provider;
pub mod series;
pub mod session;

pub use config::Config;
pub use error::LookupError;
pub use icons::{IconId, IconRegistry, IconSlot};
pub use model::{
    Coordinates, CurrentConditions, DailyRecord, Forecast, HourlyRecord, LocationCandidate,
    ResolvedLocation,
};
pub use present::{DailyDisplay, HourlyDisplay, WeatherDisplay, present};
pub use provider::{ForecastSource, Geocoder, IpLocator, Providers, providers_from_config};
pub use session::{Notice, Outcome, SessionState, WeatherApp};
