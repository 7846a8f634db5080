use chrono::{DateTime, NaiveDate};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::LookupError;

pub const UNITED_STATES: &str = "United States";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// A single geocoding match, in provider relevance order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationCandidate {
    pub name: String,
    pub country: String,
    /// State or province; only kept for US results.
    pub admin_region: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub timezone: String,
    pub population: Option<u64>,
}

impl LocationCandidate {
    /// "Omaha, Nebraska" for US results, the bare name otherwise.
    pub fn display_name(&self) -> String {
        match &self.admin_region {
            Some(region) => format!("{}, {}", self.name, region),
            None => self.name.clone(),
        }
    }
}

/// The location currently driving forecast display.
///
/// Coordinates and timezone only ever change together, by replacing the
/// whole value.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedLocation {
    pub coordinates: Coordinates,
    pub timezone: Tz,
    pub display_name: String,
}

impl TryFrom<&LocationCandidate> for ResolvedLocation {
    type Error = LookupError;

    fn try_from(candidate: &LocationCandidate) -> Result<Self, Self::Error> {
        let timezone = candidate.timezone.parse::<Tz>().map_err(|e| {
            LookupError::NotFound(format!(
                "candidate '{}' has unusable timezone '{}': {e}",
                candidate.name, candidate.timezone
            ))
        })?;

        Ok(Self {
            coordinates: Coordinates {
                latitude: candidate.latitude,
                longitude: candidate.longitude,
            },
            timezone,
            display_name: candidate.display_name(),
        })
    }
}

/// Conditions "now", in Fahrenheit / mph / inches.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentConditions {
    pub temperature: Option<f64>,
    pub apparent_temperature: Option<f64>,
    pub precipitation: Option<f64>,
    pub weather_code: Option<f64>,
    pub humidity: Option<f64>,
    pub wind_speed: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HourlyRecord {
    pub time: DateTime<Tz>,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub apparent_temperature: Option<f64>,
    pub precipitation: Option<f64>,
    pub weather_code: Option<f64>,
    pub wind_speed: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DailyRecord {
    pub date: NaiveDate,
    pub weather_code: Option<f64>,
    pub temp_max: Option<f64>,
    pub temp_min: Option<f64>,
    pub apparent_temp_max: Option<f64>,
    pub apparent_temp_min: Option<f64>,
    pub precipitation_sum: Option<f64>,
}

/// Everything one forecast fetch produces.
#[derive(Debug, Clone, PartialEq)]
pub struct Forecast {
    pub timezone: Tz,
    pub current: CurrentConditions,
    /// At most 12 records starting at the current local hour.
    pub hourly: Vec<HourlyRecord>,
    /// Starts with the current local day.
    pub daily: Vec<DailyRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn omaha() -> LocationCandidate {
        LocationCandidate {
            name: "Omaha".into(),
            country: UNITED_STATES.into(),
            admin_region: Some("Nebraska".into()),
            latitude: 41.26,
            longitude: -95.94,
            timezone: "America/Chicago".into(),
            population: Some(434_353),
        }
    }

    #[test]
    fn us_candidate_resolves_with_state() {
        let resolved = ResolvedLocation::try_from(&omaha()).expect("valid candidate");
        assert_eq!(resolved.display_name, "Omaha, Nebraska");
        assert_eq!(resolved.timezone, chrono_tz::America::Chicago);
        assert_eq!(resolved.coordinates.latitude, 41.26);
        assert_eq!(resolved.coordinates.longitude, -95.94);
    }

    #[test]
    fn non_us_candidate_uses_bare_name() {
        let candidate = LocationCandidate {
            name: "Paris".into(),
            country: "France".into(),
            admin_region: None,
            latitude: 48.85,
            longitude: 2.35,
            timezone: "Europe/Paris".into(),
            population: None,
        };
        assert_eq!(candidate.display_name(), "Paris");
    }

    #[test]
    fn unknown_timezone_is_rejected() {
        let mut candidate = omaha();
        candidate.timezone = "Mars/Olympus_Mons".into();

        let err = ResolvedLocation::try_from(&candidate).unwrap_err();
        assert!(matches!(err, LookupError::NotFound(_)));
    }
}
