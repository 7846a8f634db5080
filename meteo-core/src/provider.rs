use async_trait::async_trait;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use std::fmt::Debug;

use crate::{
    Config,
    cache::ResponseCache,
    error::LookupError,
    http::{RetryPolicy, build_client},
    model::{Coordinates, Forecast, LocationCandidate, ResolvedLocation},
    provider::{forecast::ForecastClient, geocode::GeocodeClient, ip::IpInfoLocator},
};

pub mod forecast;
pub mod geocode;
pub mod ip;

/// Free text or postal code to candidate locations.
#[async_trait]
pub trait Geocoder: Send + Sync + Debug {
    /// Never fails: any problem yields an empty list.
    async fn resolve(&self, query: &str) -> Vec<LocationCandidate>;
}

/// Approximate location of the caller from its egress IP.
#[async_trait]
pub trait IpLocator: Send + Sync + Debug {
    async fn locate(&self) -> Result<ResolvedLocation, LookupError>;
}

#[async_trait]
pub trait ForecastSource: Send + Sync + Debug {
    /// Current conditions plus hourly and daily series for `coordinates`,
    /// with local times in `timezone` and the hourly window anchored at `now`.
    async fn fetch(
        &self,
        coordinates: Coordinates,
        timezone: Tz,
        now: DateTime<Utc>,
    ) -> Result<Forecast, LookupError>;
}

/// The three clients a session needs.
#[derive(Debug)]
pub struct Providers {
    pub geocoder: Box<dyn Geocoder>,
    pub locator: Box<dyn IpLocator>,
    pub forecast: Box<dyn ForecastSource>,
}

/// Construct the default HTTP-backed providers from config.
pub fn providers_from_config(config: &Config) -> anyhow::Result<Providers> {
    let client = build_client(config.http.timeout())?;

    let mut forecast = ForecastClient::new(client.clone(), &config.endpoints.forecast)
        .with_retry(RetryPolicy::from(&config.http));

    if config.cache.enabled {
        let dir = config.cache_dir()?;
        let ttl = std::time::Duration::from_secs(config.cache.ttl_secs);
        forecast = forecast.with_cache(ResponseCache::new(dir, ttl));
    }

    Ok(Providers {
        geocoder: Box::new(GeocodeClient::new(client.clone(), &config.endpoints.geocoding)),
        locator: Box::new(IpInfoLocator::new(client, &config.endpoints.ip_location)),
        forecast: Box::new(forecast),
    })
}
