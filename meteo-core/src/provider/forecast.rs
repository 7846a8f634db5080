//! Open-Meteo forecast: current conditions plus hourly and daily series.
//!
//! The provider returns each block as parallel arrays, one per requested
//! variable. The `*_VARIABLES` lists below are both the request and the
//! positional schema: values are read back by index into these lists, so the
//! index constants must stay in step with them.

use std::collections::HashMap;

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use reqwest::{Client, Request};
use serde::Deserialize;
use serde_json::Value;

use crate::{
    cache::ResponseCache,
    error::LookupError,
    http::{RetryPolicy, send_with_retry, truncate_body},
    model::{Coordinates, CurrentConditions, DailyRecord, Forecast, HourlyRecord},
    series::{HOURLY_WINDOW_HOURS, hourly_window, local_time, today},
};

use super::ForecastSource;

const FORECAST_PATH: &str = "/v1/forecast";

pub const CURRENT_VARIABLES: [&str; 6] = [
    "temperature_2m",
    "apparent_temperature",
    "precipitation",
    "weather_code",
    "relative_humidity_2m",
    "wind_speed_10m",
];

pub const HOURLY_VARIABLES: [&str; 6] = [
    "temperature_2m",
    "relative_humidity_2m",
    "apparent_temperature",
    "precipitation",
    "weather_code",
    "wind_speed_10m",
];

pub const DAILY_VARIABLES: [&str; 6] = [
    "weather_code",
    "temperature_2m_max",
    "temperature_2m_min",
    "apparent_temperature_max",
    "apparent_temperature_min",
    "precipitation_sum",
];

mod current_var {
    pub const TEMPERATURE: usize = 0;
    pub const APPARENT_TEMPERATURE: usize = 1;
    pub const PRECIPITATION: usize = 2;
    pub const WEATHER_CODE: usize = 3;
    pub const HUMIDITY: usize = 4;
    pub const WIND_SPEED: usize = 5;
}

mod hourly_var {
    pub const TEMPERATURE: usize = 0;
    pub const HUMIDITY: usize = 1;
    pub const APPARENT_TEMPERATURE: usize = 2;
    pub const PRECIPITATION: usize = 3;
    pub const WEATHER_CODE: usize = 4;
    pub const WIND_SPEED: usize = 5;
}

mod daily_var {
    pub const WEATHER_CODE: usize = 0;
    pub const TEMP_MAX: usize = 1;
    pub const TEMP_MIN: usize = 2;
    pub const APPARENT_TEMP_MAX: usize = 3;
    pub const APPARENT_TEMP_MIN: usize = 4;
    pub const PRECIPITATION_SUM: usize = 5;
}

#[derive(Debug, Clone)]
pub struct ForecastClient {
    http: Client,
    base_url: String,
    retry: RetryPolicy,
    cache: Option<ResponseCache>,
}

impl ForecastClient {
    pub fn new(http: Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            retry: RetryPolicy::default(),
            cache: None,
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_cache(mut self, cache: ResponseCache) -> Self {
        self.cache = Some(cache);
        self
    }

    fn build_request(&self, coordinates: Coordinates, timezone: Tz) -> Result<Request> {
        let url = format!("{}{}", self.base_url, FORECAST_PATH);

        self.http
            .get(&url)
            .query(&[
                ("latitude", coordinates.latitude.to_string()),
                ("longitude", coordinates.longitude.to_string()),
                ("current", CURRENT_VARIABLES.join(",")),
                ("hourly", HOURLY_VARIABLES.join(",")),
                ("daily", DAILY_VARIABLES.join(",")),
                ("temperature_unit", "fahrenheit".to_string()),
                ("wind_speed_unit", "mph".to_string()),
                ("precipitation_unit", "inch".to_string()),
                ("timeformat", "unixtime".to_string()),
                ("timezone", timezone.name().to_string()),
            ])
            .build()
            .context("Failed to build forecast request")
    }

    async fn fetch_body(&self, request: Request) -> Result<String> {
        let res = send_with_retry(&self.http, request, &self.retry)
            .await
            .context("Failed to send request to Open-Meteo (forecast)")?;

        let status = res.status();
        let body = res
            .text()
            .await
            .context("Failed to read Open-Meteo forecast response body")?;

        if !status.is_success() {
            return Err(anyhow!(
                "Open-Meteo forecast request failed with status {}: {}",
                status,
                truncate_body(&body),
            ));
        }

        Ok(body)
    }

    fn cached(&self, url: &str, timezone: Tz, now: DateTime<Utc>) -> Option<Forecast> {
        let body = self.cache.as_ref()?.get(url, now)?;

        match parse_forecast(&body, timezone, now) {
            Ok(forecast) => {
                tracing::debug!("forecast cache hit for {url}");
                Some(forecast)
            }
            Err(e) => {
                tracing::debug!("ignoring unusable cached forecast for {url}: {e:#}");
                None
            }
        }
    }

    async fn fetch_forecast(
        &self,
        coordinates: Coordinates,
        timezone: Tz,
        now: DateTime<Utc>,
    ) -> Result<Forecast> {
        let request = self.build_request(coordinates, timezone)?;
        let url = request.url().to_string();

        if let Some(forecast) = self.cached(&url, timezone, now) {
            return Ok(forecast);
        }

        let body = self.fetch_body(request).await?;
        let forecast = parse_forecast(&body, timezone, now)?;

        // Only bodies that parsed are worth replaying.
        if let Some(cache) = &self.cache {
            if let Err(e) = cache.put(&url, &body, now) {
                tracing::warn!("could not cache forecast response: {e:#}");
            }
        }

        Ok(forecast)
    }
}

#[derive(Debug, Deserialize)]
struct OmResponse {
    current: HashMap<String, Value>,
    hourly: OmSeries,
    daily: OmSeries,
}

#[derive(Debug, Deserialize)]
struct OmSeries {
    time: Vec<i64>,
    #[serde(flatten)]
    values: HashMap<String, Value>,
}

/// Scalar values of `block`, in the order of `names`.
fn scalars(block: &HashMap<String, Value>, names: &[&str]) -> Result<Vec<Option<f64>>> {
    names
        .iter()
        .map(|name| {
            block
                .get(*name)
                .map(Value::as_f64)
                .ok_or_else(|| anyhow!("forecast response is missing current '{name}'"))
        })
        .collect()
}

/// Value arrays of `series`, in the order of `names`.
fn columns(series: &OmSeries, names: &[&str]) -> Result<Vec<Vec<Option<f64>>>> {
    names
        .iter()
        .map(|name| {
            let value = series
                .values
                .get(*name)
                .ok_or_else(|| anyhow!("forecast response is missing series '{name}'"))?;
            serde_json::from_value(value.clone())
                .with_context(|| format!("forecast series '{name}' is not numeric"))
        })
        .collect()
}

/// Value at `row` of column `var`; short columns read as missing.
fn at(columns: &[Vec<Option<f64>>], var: usize, row: usize) -> Option<f64> {
    columns.get(var).and_then(|c| c.get(row)).copied().flatten()
}

fn parse_forecast(body: &str, timezone: Tz, now: DateTime<Utc>) -> Result<Forecast> {
    let parsed: OmResponse =
        serde_json::from_str(body).context("Failed to parse Open-Meteo forecast JSON")?;

    let cur = scalars(&parsed.current, &CURRENT_VARIABLES)?;
    let current = CurrentConditions {
        temperature: cur[current_var::TEMPERATURE],
        apparent_temperature: cur[current_var::APPARENT_TEMPERATURE],
        precipitation: cur[current_var::PRECIPITATION],
        weather_code: cur[current_var::WEATHER_CODE],
        humidity: cur[current_var::HUMIDITY],
        wind_speed: cur[current_var::WIND_SPEED],
    };

    let cols = columns(&parsed.hourly, &HOURLY_VARIABLES)?;
    let (window_start, window_end) = hourly_window(now, timezone);
    let hourly: Vec<HourlyRecord> = parsed
        .hourly
        .time
        .iter()
        .enumerate()
        .filter_map(|(row, ts)| local_time(*ts, timezone).map(|time| (row, time)))
        .filter(|(_, time)| *time >= window_start && *time < window_end)
        .take(HOURLY_WINDOW_HOURS as usize)
        .map(|(row, time)| HourlyRecord {
            time,
            temperature: at(&cols, hourly_var::TEMPERATURE, row),
            humidity: at(&cols, hourly_var::HUMIDITY, row),
            apparent_temperature: at(&cols, hourly_var::APPARENT_TEMPERATURE, row),
            precipitation: at(&cols, hourly_var::PRECIPITATION, row),
            weather_code: at(&cols, hourly_var::WEATHER_CODE, row),
            wind_speed: at(&cols, hourly_var::WIND_SPEED, row),
        })
        .collect();

    let cols = columns(&parsed.daily, &DAILY_VARIABLES)?;
    let first_day = today(now, timezone);
    let daily: Vec<DailyRecord> = parsed
        .daily
        .time
        .iter()
        .enumerate()
        .filter_map(|(row, ts)| local_time(*ts, timezone).map(|t| (row, t.date_naive())))
        // A cached response fetched before midnight may still start yesterday.
        .filter(|(_, date)| *date >= first_day)
        .map(|(row, date)| DailyRecord {
            date,
            weather_code: at(&cols, daily_var::WEATHER_CODE, row),
            temp_max: at(&cols, daily_var::TEMP_MAX, row),
            temp_min: at(&cols, daily_var::TEMP_MIN, row),
            apparent_temp_max: at(&cols, daily_var::APPARENT_TEMP_MAX, row),
            apparent_temp_min: at(&cols, daily_var::APPARENT_TEMP_MIN, row),
            precipitation_sum: at(&cols, daily_var::PRECIPITATION_SUM, row),
        })
        .collect();

    Ok(Forecast { timezone, current, hourly, daily })
}

#[async_trait]
impl ForecastSource for ForecastClient {
    async fn fetch(
        &self,
        coordinates: Coordinates,
        timezone: Tz,
        now: DateTime<Utc>,
    ) -> Result<Forecast, LookupError> {
        match self.fetch_forecast(coordinates, timezone, now).await {
            Ok(forecast) => {
                tracing::info!(
                    hourly = forecast.hourly.len(),
                    daily = forecast.daily.len(),
                    "forecast retrieved for {}, {}",
                    coordinates.latitude,
                    coordinates.longitude
                );
                Ok(forecast)
            }
            Err(e) => {
                tracing::warn!("forecast fetch failed: {e:#}");
                Err(LookupError::DataUnavailable(format!("{e:#}")))
            }
        }
    }
}
