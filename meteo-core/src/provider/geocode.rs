//! Open-Meteo geocoding: place name or postal code to coordinates.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::{
    error::LookupError,
    http::truncate_body,
    model::{LocationCandidate, UNITED_STATES},
};

use super::Geocoder;

const SEARCH_PATH: &str = "/v1/search";

/// Only the top (most relevant, usually most populous) match is requested.
/// Smaller places sharing a name with a larger one need a postal code.
const RESULT_COUNT: &str = "1";

#[derive(Debug, Clone)]
pub struct GeocodeClient {
    http: Client,
    base_url: String,
}

impl GeocodeClient {
    pub fn new(http: Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn search(&self, query: &str) -> Result<Vec<LocationCandidate>, LookupError> {
        let url = format!("{}{}", self.base_url, SEARCH_PATH);

        let res = self
            .http
            .get(&url)
            .query(&[
                ("name", query),
                ("count", RESULT_COUNT),
                ("language", "en"),
                ("format", "json"),
            ])
            .send()
            .await
            .map_err(LookupError::transport)?;

        let status = res.status();
        let body = res.text().await.map_err(LookupError::transport)?;

        if !status.is_success() {
            return Err(LookupError::Transport(format!(
                "geocoding request failed with status {}: {}",
                status,
                truncate_body(&body),
            )));
        }

        let parsed: GeoResponse = serde_json::from_str(&body).map_err(|e| {
            LookupError::Transport(format!("failed to parse geocoding JSON: {e}"))
        })?;

        let candidates: Vec<LocationCandidate> =
            parsed.results.into_iter().map(LocationCandidate::from).collect();

        if candidates.is_empty() {
            return Err(LookupError::NotFound(query.to_string()));
        }

        Ok(candidates)
    }
}

#[derive(Debug, Deserialize)]
struct GeoResponse {
    // The provider omits the key entirely when nothing matches.
    #[serde(default)]
    results: Vec<GeoResult>,
}

#[derive(Debug, Deserialize)]
struct GeoResult {
    name: String,
    #[serde(default)]
    country: String,
    admin1: Option<String>,
    latitude: f64,
    longitude: f64,
    timezone: String,
    population: Option<u64>,
}

impl From<GeoResult> for LocationCandidate {
    fn from(r: GeoResult) -> Self {
        let admin_region = if r.country == UNITED_STATES { r.admin1 } else { None };

        Self {
            name: r.name,
            country: r.country,
            admin_region,
            latitude: r.latitude,
            longitude: r.longitude,
            timezone: r.timezone,
            population: r.population,
        }
    }
}

#[async_trait]
impl Geocoder for GeocodeClient {
    async fn resolve(&self, query: &str) -> Vec<LocationCandidate> {
        match self.search(query).await {
            Ok(candidates) => {
                tracing::info!(
                    "geocoded '{}' to {} ({}, {})",
                    query,
                    candidates[0].display_name(),
                    candidates[0].latitude,
                    candidates[0].longitude
                );
                candidates
            }
            Err(LookupError::NotFound(_)) => {
                tracing::debug!("no geocoding match for '{query}'");
                Vec::new()
            }
            Err(e) => {
                tracing::warn!("geocoding '{query}' failed: {e}");
                Vec::new()
            }
        }
    }
}
