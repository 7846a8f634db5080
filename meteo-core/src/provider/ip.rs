//! ipinfo.io lookup of the caller's approximate location.

use async_trait::async_trait;
use chrono_tz::Tz;
use reqwest::{Client, header::ACCEPT};
use serde::Deserialize;

use crate::{
    error::LookupError,
    http::truncate_body,
    model::{Coordinates, ResolvedLocation},
};

use super::IpLocator;

#[derive(Debug, Clone)]
pub struct IpInfoLocator {
    http: Client,
    base_url: String,
}

impl IpInfoLocator {
    pub fn new(http: Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn fetch(&self) -> Result<IpInfo, LookupError> {
        let url = format!("{}/", self.base_url);

        let res = self
            .http
            .get(&url)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(LookupError::transport)?;

        let status = res.status();
        let body = res.text().await.map_err(LookupError::transport)?;

        if !status.is_success() {
            return Err(LookupError::Transport(format!(
                "IP location request failed with status {}: {}",
                status,
                truncate_body(&body),
            )));
        }

        serde_json::from_str(&body)
            .map_err(|e| LookupError::Transport(format!("failed to parse IP location JSON: {e}")))
    }
}

#[derive(Debug, Deserialize)]
struct IpInfo {
    city: String,
    region: String,
    /// "lat,long"
    loc: String,
    timezone: String,
}

impl TryFrom<IpInfo> for ResolvedLocation {
    type Error = LookupError;

    fn try_from(info: IpInfo) -> Result<Self, Self::Error> {
        let coordinates = parse_loc(&info.loc)?;
        let timezone = info.timezone.parse::<Tz>().map_err(|e| {
            LookupError::Transport(format!("unusable timezone '{}': {e}", info.timezone))
        })?;

        Ok(Self {
            coordinates,
            timezone,
            display_name: format!("{}, {}", info.city, info.region),
        })
    }
}

fn parse_loc(loc: &str) -> Result<Coordinates, LookupError> {
    let malformed = || LookupError::Transport(format!("malformed 'loc' field: '{loc}'"));

    let (lat, lon) = loc.split_once(',').ok_or_else(malformed)?;
    let latitude = lat.trim().parse::<f64>().map_err(|_| malformed())?;
    let longitude = lon.trim().parse::<f64>().map_err(|_| malformed())?;

    Ok(Coordinates { latitude, longitude })
}

#[async_trait]
impl IpLocator for IpInfoLocator {
    async fn locate(&self) -> Result<ResolvedLocation, LookupError> {
        let located = self.fetch().await.and_then(ResolvedLocation::try_from);

        match &located {
            Ok(location) => tracing::info!("IP location: {}", location.display_name),
            Err(e) => tracing::warn!("IP location unavailable: {e}"),
        }

        located
    }
}
