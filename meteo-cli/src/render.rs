//! Plain-text layout of a [`WeatherDisplay`].

use std::fmt;

use meteo_core::{IconSlot, WeatherDisplay};

fn icon(slot: &IconSlot) -> String {
    match slot {
        IconSlot::Icon(id) => format!("[{id}]"),
        IconSlot::Placeholder => slot.to_string(),
    }
}

/// Text screen for a display: current block, then hours, then days.
pub struct Weather<'a>(pub &'a WeatherDisplay);

impl fmt::Display for Weather<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let display = self.0;
        let current = &display.current;

        writeln!(f, "{}", display.location)?;
        writeln!(f, "{} {}", current.temperature, icon(&current.icon))?;
        writeln!(f, "Feels like {}", current.feels_like)?;
        writeln!(
            f,
            "Precipitation {}  Wind {}  Humidity {}",
            current.precipitation, current.wind_speed, current.humidity
        )?;

        writeln!(f)?;
        for hour in display.hourly_slots() {
            writeln!(f, "{:>8}  {:>5}  {}", hour.time, hour.temperature, icon(&hour.icon))?;
        }

        writeln!(f)?;
        for day in display.daily_slots() {
            writeln!(
                f,
                "{:<10} {:>8}  {:>9}  {}",
                day.day,
                day.precipitation,
                day.temps(),
                icon(&day.icon)
            )?;
        }

        Ok(())
    }
}
