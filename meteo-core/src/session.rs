//! The lookup pipeline: query or IP → resolved location → forecast → display.
//!
//! Session state is a plain value. Every operation takes the current state
//! and hands back the next one; a failed lookup hands back the previous state
//! untouched, so the last good display stays on screen.

use chrono::{DateTime, Utc};

use crate::{
    error::LookupError,
    icons::IconRegistry,
    model::ResolvedLocation,
    present::{WeatherDisplay, present},
    provider::Providers,
};

/// What is currently on screen, and for where.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub location: Option<ResolvedLocation>,
    pub display: Option<WeatherDisplay>,
}

/// Short user-facing message for a failed lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    LocationNotFound,
    WeatherUnavailable,
}

impl Notice {
    pub fn message(&self) -> &'static str {
        match self {
            Notice::LocationNotFound => "Could not find location.\nPlease try again.",
            Notice::WeatherUnavailable => "Could not retrieve weather data.\nPlease try again.",
        }
    }
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

impl From<&LookupError> for Notice {
    fn from(err: &LookupError) -> Self {
        match err {
            LookupError::NotFound(_) | LookupError::Transport(_) => Notice::LocationNotFound,
            LookupError::DataUnavailable(_) => Notice::WeatherUnavailable,
        }
    }
}

/// Result of one user action.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub state: SessionState,
    pub notice: Option<Notice>,
}

impl Outcome {
    fn success(state: SessionState) -> Self {
        Self { state, notice: None }
    }

    fn failure(previous: SessionState, notice: Notice) -> Self {
        Self { state: previous, notice: Some(notice) }
    }

    pub fn is_success(&self) -> bool {
        self.notice.is_none()
    }
}

#[derive(Debug)]
pub struct WeatherApp {
    providers: Providers,
    icons: IconRegistry,
}

impl WeatherApp {
    pub fn new(providers: Providers, icons: IconRegistry) -> Self {
        Self { providers, icons }
    }

    pub fn icons(&self) -> &IconRegistry {
        &self.icons
    }

    /// Startup: show weather for the caller's IP location if it can be found.
    /// Failure leaves an empty session and no notice.
    pub async fn start(&self) -> SessionState {
        self.start_at(Utc::now()).await
    }

    pub async fn start_at(&self, now: DateTime<Utc>) -> SessionState {
        let location = match self.providers.locator.locate().await {
            Ok(location) => location,
            Err(_) => return SessionState::default(),
        };

        self.show(SessionState::default(), location, now).await.state
    }

    /// Geocode `query` and, if the forecast can be fetched, switch to it.
    pub async fn search(&self, state: SessionState, query: &str) -> Outcome {
        self.search_at(state, query, Utc::now()).await
    }

    pub async fn search_at(&self, state: SessionState, query: &str, now: DateTime<Utc>) -> Outcome {
        let query = query.trim();
        if query.is_empty() {
            return Outcome::failure(state, Notice::LocationNotFound);
        }

        let candidates = self.providers.geocoder.resolve(query).await;
        let Some(candidate) = candidates.first() else {
            return Outcome::failure(state, Notice::LocationNotFound);
        };

        let location = match ResolvedLocation::try_from(candidate) {
            Ok(location) => location,
            Err(e) => {
                tracing::warn!("{e}");
                return Outcome::failure(state, Notice::from(&e));
            }
        };

        self.show(state, location, now).await
    }

    /// Re-fetch the forecast for the location already on screen.
    pub async fn refresh(&self, state: SessionState) -> Outcome {
        self.refresh_at(state, Utc::now()).await
    }

    pub async fn refresh_at(&self, state: SessionState, now: DateTime<Utc>) -> Outcome {
        match state.location.clone() {
            Some(location) => self.show(state, location, now).await,
            None => Outcome::failure(state, Notice::LocationNotFound),
        }
    }

    async fn show(
        &self,
        previous: SessionState,
        location: ResolvedLocation,
        now: DateTime<Utc>,
    ) -> Outcome {
        let forecast = self
            .providers
            .forecast
            .fetch(location.coordinates, location.timezone, now)
            .await;

        match forecast {
            Ok(forecast) => {
                let display = present(&location.display_name, &forecast, &self.icons, now);
                Outcome::success(SessionState {
                    location: Some(location),
                    display: Some(display),
                })
            }
            Err(e) => Outcome::failure(previous, Notice::from(&e)),
        }
    }
}
