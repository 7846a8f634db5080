//! Display-ready records built from a [`Forecast`].
//!
//! Everything here is pure: the same forecast, registry and clock always
//! produce the same strings. Slot containers have a fixed size; when the
//! provider returns fewer records the trailing slots are `None`.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::{
    icons::{IconRegistry, IconSlot},
    model::{Forecast, HourlyRecord, DailyRecord},
    series::{clock_label, today, weekday_name},
};

pub const HOURLY_SLOTS: usize = 12;
pub const DAILY_SLOTS: usize = 7;

/// Rendered for values the provider left out.
pub const MISSING: &str = "--";
pub const TODAY: &str = "Today";

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

/// Whole degrees, truncated toward zero: 72.9 → "72°".
pub fn format_temperature(value: Option<f64>) -> String {
    match finite(value) {
        Some(t) => format!("{}°", t.trunc() as i64),
        None => MISSING.to_string(),
    }
}

/// Two decimal places: 0.1 → "0.10".
pub fn format_precipitation(value: Option<f64>) -> String {
    match finite(value) {
        Some(p) => format!("{p:.2}"),
        None => MISSING.to_string(),
    }
}

/// Integer part only, for wind speed and humidity.
pub fn format_whole(value: Option<f64>) -> String {
    match finite(value) {
        Some(v) => (v.trunc() as i64).to_string(),
        None => MISSING.to_string(),
    }
}

/// "Today" for the first slot when it is today's date, otherwise the weekday.
pub fn day_label(slot: usize, date: NaiveDate, today: NaiveDate) -> String {
    if slot == 0 && date == today {
        TODAY.to_string()
    } else {
        weekday_name(date)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentDisplay {
    pub temperature: String,
    pub feels_like: String,
    pub precipitation: String,
    pub wind_speed: String,
    pub humidity: String,
    pub icon: IconSlot,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlyDisplay {
    pub time: String,
    pub temperature: String,
    pub icon: IconSlot,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyDisplay {
    pub day: String,
    pub precipitation: String,
    pub temp_max: String,
    pub temp_min: String,
    pub icon: IconSlot,
}

impl DailyDisplay {
    /// "80°/61°"
    pub fn temps(&self) -> String {
        format!("{}/{}", self.temp_max, self.temp_min)
    }
}

/// One complete screen of weather for a location.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherDisplay {
    pub location: String,
    pub current: CurrentDisplay,
    pub hourly: [Option<HourlyDisplay>; HOURLY_SLOTS],
    pub daily: [Option<DailyDisplay>; DAILY_SLOTS],
}

impl WeatherDisplay {
    pub fn hourly_slots(&self) -> impl Iterator<Item = &HourlyDisplay> {
        self.hourly.iter().flatten()
    }

    pub fn daily_slots(&self) -> impl Iterator<Item = &DailyDisplay> {
        self.daily.iter().flatten()
    }
}

fn hourly_display(record: &HourlyRecord, icons: &IconRegistry) -> HourlyDisplay {
    HourlyDisplay {
        time: clock_label(&record.time),
        temperature: format_temperature(record.temperature),
        icon: icons.icon_for(record.weather_code),
    }
}

fn daily_display(
    slot: usize,
    record: &DailyRecord,
    today: NaiveDate,
    icons: &IconRegistry,
) -> DailyDisplay {
    DailyDisplay {
        day: day_label(slot, record.date, today),
        precipitation: format!("{} in", format_precipitation(record.precipitation_sum)),
        temp_max: format_temperature(record.temp_max),
        temp_min: format_temperature(record.temp_min),
        icon: icons.icon_for(record.weather_code),
    }
}

/// Map a forecast into fixed display slots for `location`.
pub fn present(
    location: &str,
    forecast: &Forecast,
    icons: &IconRegistry,
    now: DateTime<Utc>,
) -> WeatherDisplay {
    let current = &forecast.current;
    let today = today(now, forecast.timezone);

    WeatherDisplay {
        location: location.to_string(),
        current: CurrentDisplay {
            temperature: format_temperature(current.temperature),
            feels_like: format_temperature(current.apparent_temperature),
            precipitation: format!("{} in", format_precipitation(current.precipitation)),
            wind_speed: format!("{} mph", format_whole(current.wind_speed)),
            humidity: format!("{}%", format_whole(current.humidity)),
            icon: icons.icon_for(current.weather_code),
        },
        hourly: std::array::from_fn(|i| {
            forecast.hourly.get(i).map(|r| hourly_display(r, icons))
        }),
        daily: std::array::from_fn(|i| {
            forecast.daily.get(i).map(|r| daily_display(i, r, today, icons))
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{icons::IconId, model::CurrentConditions};
    use chrono::{Duration, TimeZone};
    use chrono_tz::America::Chicago;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn forecast(hours: usize, days: usize, first_day: NaiveDate) -> Forecast {
        let start = Chicago
            .with_ymd_and_hms(2026, 10, 17, 14, 0, 0)
            .single()
            .expect("time");

        Forecast {
            timezone: Chicago,
            current: CurrentConditions {
                temperature: Some(72.9),
                apparent_temperature: Some(70.2),
                precipitation: Some(0.1),
                weather_code: Some(2.0),
                humidity: Some(45.8),
                wind_speed: Some(8.7),
            },
            hourly: (0..hours)
                .map(|h| HourlyRecord {
                    time: start + Duration::hours(h as i64),
                    temperature: Some(60.0 + h as f64),
                    humidity: None,
                    apparent_temperature: None,
                    precipitation: None,
                    weather_code: Some(if h == 3 { 142.0 } else { 61.0 }),
                    wind_speed: None,
                })
                .collect(),
            daily: (0..days)
                .map(|d| DailyRecord {
                    date: first_day + Duration::days(d as i64),
                    weather_code: Some(0.0),
                    temp_max: Some(80.6),
                    temp_min: Some(61.2),
                    apparent_temp_max: None,
                    apparent_temp_min: None,
                    precipitation_sum: Some(0.12),
                })
                .collect(),
        }
    }

    fn afternoon() -> DateTime<Utc> {
        Chicago
            .with_ymd_and_hms(2026, 10, 17, 14, 20, 0)
            .single()
            .expect("time")
            .with_timezone(&Utc)
    }

    #[test]
    fn temperatures_truncate_rather_than_round() {
        assert_eq!(format_temperature(Some(72.9)), "72°");
        assert_eq!(format_temperature(Some(72.0)), "72°");
        assert_eq!(format_temperature(Some(-3.7)), "-3°");
        assert_eq!(format_temperature(Some(-0.4)), "0°");
        assert_eq!(format_temperature(None), MISSING);
        assert_eq!(format_temperature(Some(f64::NAN)), MISSING);
    }

    #[test]
    fn truncated_temperature_parses_back() {
        for value in [72.9, 72.1, 0.5, -12.99, 101.0] {
            let text = format_temperature(Some(value));
            let parsed: i64 = text.trim_end_matches('°').parse().expect("integer");
            assert_eq!(parsed, value.trunc() as i64);
        }
    }

    #[test]
    fn precipitation_has_two_decimals() {
        assert_eq!(format_precipitation(Some(0.0)), "0.00");
        assert_eq!(format_precipitation(Some(0.1)), "0.10");
        assert_eq!(format_precipitation(Some(1.234)), "1.23");
        assert_eq!(format_precipitation(None), MISSING);
    }

    #[test]
    fn wind_and_humidity_truncate() {
        assert_eq!(format_whole(Some(8.7)), "8");
        assert_eq!(format_whole(Some(45.99)), "45");
        assert_eq!(format_whole(None), MISSING);
    }

    #[test]
    fn first_day_is_today_only_when_dates_match() {
        let today = date(2026, 10, 17);
        assert_eq!(day_label(0, today, today), "Today");
        assert_eq!(day_label(0, date(2026, 10, 16), today), "Friday");
        assert_eq!(day_label(1, date(2026, 10, 18), today), "Sunday");
        // Only slot 0 may say "Today".
        assert_eq!(day_label(3, today, today), "Saturday");
    }

    #[test]
    fn present_fills_current_conditions() {
        let display = present(
            "Omaha, Nebraska",
            &forecast(12, 7, date(2026, 10, 17)),
            &IconRegistry::builtin(),
            afternoon(),
        );

        assert_eq!(display.location, "Omaha, Nebraska");
        assert_eq!(display.current.temperature, "72°");
        assert_eq!(display.current.feels_like, "70°");
        assert_eq!(display.current.precipitation, "0.10 in");
        assert_eq!(display.current.wind_speed, "8 mph");
        assert_eq!(display.current.humidity, "45%");
        assert_eq!(display.current.icon, IconSlot::Icon(IconId::PartlyCloudy));
    }

    #[test]
    fn present_fills_all_slots_for_a_full_forecast() {
        let display = present(
            "Omaha, Nebraska",
            &forecast(12, 7, date(2026, 10, 17)),
            &IconRegistry::builtin(),
            afternoon(),
        );

        assert_eq!(display.hourly_slots().count(), HOURLY_SLOTS);
        assert_eq!(display.daily_slots().count(), DAILY_SLOTS);

        let first = display.hourly[0].as_ref().expect("slot 0");
        assert_eq!(first.time, "2:00 PM");
        assert_eq!(first.temperature, "60°");
        assert_eq!(first.icon, IconSlot::Icon(IconId::Rain));

        let last = display.hourly[11].as_ref().expect("slot 11");
        assert_eq!(last.time, "1:00 AM");

        assert_eq!(display.hourly[3].as_ref().expect("slot 3").icon, IconSlot::Placeholder);

        let today = display.daily[0].as_ref().expect("day 0");
        assert_eq!(today.day, "Today");
        assert_eq!(today.precipitation, "0.12 in");
        assert_eq!(today.temps(), "80°/61°");
        assert_eq!(today.icon, IconSlot::Icon(IconId::ClearSky));

        assert_eq!(display.daily[1].as_ref().expect("day 1").day, "Sunday");
    }

    #[test]
    fn stale_first_day_gets_weekday_label() {
        let display = present(
            "Omaha, Nebraska",
            &forecast(12, 7, date(2026, 10, 16)),
            &IconRegistry::builtin(),
            afternoon(),
        );

        assert_eq!(display.daily[0].as_ref().expect("day 0").day, "Friday");
    }

    #[test]
    fn short_series_leave_trailing_slots_empty() {
        let display = present(
            "Omaha, Nebraska",
            &forecast(5, 3, date(2026, 10, 17)),
            &IconRegistry::builtin(),
            afternoon(),
        );

        assert_eq!(display.hourly_slots().count(), 5);
        assert!(display.hourly[5..].iter().all(Option::is_none));
        assert_eq!(display.daily_slots().count(), 3);
        assert!(display.daily[3].is_none());
    }

    #[test]
    fn display_serializes_slots_as_arrays() {
        let display = present(
            "Omaha, Nebraska",
            &forecast(2, 1, date(2026, 10, 17)),
            &IconRegistry::builtin(),
            afternoon(),
        );

        let json = serde_json::to_value(&display).expect("serializes");
        assert_eq!(json["hourly"].as_array().map(Vec::len), Some(HOURLY_SLOTS));
        assert_eq!(json["hourly"][0]["icon"]["icon"], "rain");
        assert!(json["hourly"][2].is_null());
        assert_eq!(json["current"]["icon"]["icon"], "partly_cloudy");
    }
}
