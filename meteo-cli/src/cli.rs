use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use chrono::Utc;
use chrono_tz::Tz;
use clap::{Parser, Subcommand};
use inquire::{Confirm, CustomType, Text};
use meteo_core::{
    Config, Coordinates, IconRegistry, Outcome, Providers, SessionState, WeatherApp,
    WeatherDisplay, present, providers_from_config,
};

use crate::render::Weather;

const NOT_FOUND_HINT: &str =
    "Location not found, please check the name or ZIP code and try again.";
const NO_IP_LOCATION: &str =
    "Could not determine your location from your IP address.\nPass a city name or ZIP code.";

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "meteo", version, about = "Current, hourly and 7-day weather")]
pub struct Cli {
    /// Debug logging (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Interactively edit the config file.
    Configure,

    #[command(flatten)]
    Lookup(LookupCommand),
}

/// Commands that talk to the weather providers.
#[derive(Debug, Subcommand)]
pub enum LookupCommand {
    /// Show weather for a city or ZIP code, or for your IP location if omitted.
    Show {
        /// City name or postal code.
        query: Option<String>,

        /// Print the display records as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Prompt for locations until an empty line or Ctrl-C.
    Interactive,

    /// Resolve a city name or ZIP code to coordinates and timezone.
    Geocode {
        query: String,
    },

    /// Show the location detected from your IP address.
    Locate,

    /// Show weather for explicit coordinates.
    Forecast {
        #[arg(long, default_value_t = 41.25626, allow_negative_numbers = true)]
        lat: f64,

        #[arg(long, default_value_t = -95.94043, allow_negative_numbers = true)]
        lon: f64,

        /// IANA timezone name, e.g. "America/Chicago".
        #[arg(long, default_value = "America/Chicago")]
        timezone: String,

        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Lookup(command) => {
                let config = Config::load()?;
                tracing::debug!(?config, "loaded configuration");
                let providers = providers_from_config(&config)?;
                let icons = IconRegistry::from_config(config.icons_dir.as_deref());
                run_lookup(command, providers, icons).await
            }
        }
    }
}

async fn run_lookup(
    command: LookupCommand,
    providers: Providers,
    icons: IconRegistry,
) -> Result<()> {
    match command {
        LookupCommand::Show { query, json } => {
            let app = WeatherApp::new(providers, icons);
            let outcome = match query {
                Some(query) => app.search(SessionState::default(), &query).await,
                None => Outcome { state: app.start().await, notice: None },
            };

            match outcome_display(outcome) {
                Ok(display) => print_display(&display, json),
                Err(message) => {
                    println!("{message}");
                    Ok(())
                }
            }
        }

        LookupCommand::Interactive => interactive(WeatherApp::new(providers, icons)).await,

        LookupCommand::Geocode { query } => {
            let candidates = providers.geocoder.resolve(&query).await;
            match candidates.first() {
                Some(c) => println!(
                    "{}, {}, {}, {}, {}, {}",
                    c.name,
                    c.admin_region.as_deref().unwrap_or("-"),
                    c.country,
                    c.latitude,
                    c.longitude,
                    c.timezone
                ),
                None => println!("{NOT_FOUND_HINT}"),
            }
            Ok(())
        }

        LookupCommand::Locate => {
            let location = providers
                .locator
                .locate()
                .await
                .context("Failed to determine location from IP address")?;
            println!(
                "{} ({}, {}) {}",
                location.display_name,
                location.coordinates.latitude,
                location.coordinates.longitude,
                location.timezone
            );
            Ok(())
        }

        LookupCommand::Forecast { lat, lon, timezone, json } => {
            let tz: Tz = timezone
                .parse()
                .map_err(|e| anyhow!("Unknown timezone '{timezone}': {e}"))?;
            let coordinates = Coordinates { latitude: lat, longitude: lon };
            let now = Utc::now();

            let forecast = providers
                .forecast
                .fetch(coordinates, tz, now)
                .await
                .context("Failed to fetch forecast")?;

            let label = format!("{lat}, {lon}");
            print_display(&present(&label, &forecast, &icons, now), json)
        }
    }
}

/// The display a finished `show` lookup produced, or the message to print
/// in its place. A failed lookup is reported, not treated as an error.
fn outcome_display(outcome: Outcome) -> Result<WeatherDisplay, String> {
    if let Some(notice) = outcome.notice {
        return Err(notice.to_string());
    }
    outcome.state.display.ok_or_else(|| NO_IP_LOCATION.to_string())
}

fn print_display(display: &WeatherDisplay, json: bool) -> Result<()> {
    if json {
        let text = serde_json::to_string_pretty(display)
            .context("Failed to serialize weather display")?;
        println!("{text}");
    } else {
        print!("{}", Weather(display));
    }
    Ok(())
}

/// Search loop. The last good display stays current across failed lookups.
async fn interactive(app: WeatherApp) -> Result<()> {
    let mut state = app.start().await;
    match &state.display {
        Some(display) => print!("{}", Weather(display)),
        None => println!("{NO_IP_LOCATION}"),
    }

    loop {
        let query = match Text::new("Enter city name or ZIP code:")
            .with_help_message("empty line to quit, \"r\" to refresh")
            .prompt()
        {
            Ok(query) => query,
            Err(
                inquire::InquireError::OperationCanceled
                | inquire::InquireError::OperationInterrupted,
            ) => break,
            Err(e) => return Err(e).context("Failed to read location"),
        };

        let query = query.trim();
        if query.is_empty() {
            break;
        }

        let outcome = if query.eq_ignore_ascii_case("r") {
            app.refresh(state).await
        } else {
            app.search(state, query).await
        };

        if let Some(notice) = outcome.notice {
            println!("{notice}");
        } else if let Some(display) = &outcome.state.display {
            print!("{}", Weather(display));
        }
        state = outcome.state;
    }

    Ok(())
}

fn configure() -> Result<()> {
    let mut config = Config::load()?;

    let current_icons = config
        .icons_dir
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_default();
    let icons_dir = Text::new("Icon asset directory (empty for none):")
        .with_initial_value(&current_icons)
        .prompt()
        .context("Failed to read icon directory")?;
    config.icons_dir = match icons_dir.trim() {
        "" => None,
        dir => Some(PathBuf::from(dir)),
    };

    config.cache.enabled = Confirm::new("Cache forecast responses?")
        .with_default(config.cache.enabled)
        .prompt()
        .context("Failed to read cache setting")?;

    if config.cache.enabled {
        config.cache.ttl_secs = CustomType::<u64>::new("Cache lifetime in seconds:")
            .with_default(config.cache.ttl_secs)
            .with_error_message("Please enter a whole number of seconds")
            .prompt()
            .context("Failed to read cache lifetime")?;
    }

    config.http.timeout_secs = CustomType::<u64>::new("Request timeout in seconds:")
        .with_default(config.http.timeout_secs)
        .with_error_message("Please enter a whole number of seconds")
        .prompt()
        .context("Failed to read request timeout")?;

    config.save()?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use meteo_core::Notice;

    #[test]
    fn configure_parses_outside_lookup_commands() {
        let cli = Cli::try_parse_from(["meteo", "configure"]).expect("parses");
        assert!(matches!(cli.command, Command::Configure));

        let cli = Cli::try_parse_from(["meteo", "show", "Omaha", "--json"]).expect("parses");
        assert!(matches!(
            cli.command,
            Command::Lookup(LookupCommand::Show { query: Some(ref q), json: true }) if q == "Omaha"
        ));
    }

    #[test]
    fn forecast_accepts_negative_coordinates() {
        let cli = Cli::try_parse_from(["meteo", "forecast", "--lat", "-33.87", "--lon", "151.2"])
            .expect("parses");
        match cli.command {
            Command::Lookup(LookupCommand::Forecast { lat, lon, timezone, json }) => {
                assert_eq!(lat, -33.87);
                assert_eq!(lon, 151.2);
                assert_eq!(timezone, "America/Chicago");
                assert!(!json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn failed_show_lookup_is_a_message_not_an_error() {
        let outcome = Outcome {
            state: SessionState::default(),
            notice: Some(Notice::LocationNotFound),
        };

        assert_eq!(
            outcome_display(outcome).unwrap_err(),
            "Could not find location.\nPlease try again."
        );
    }

    #[test]
    fn show_without_ip_location_explains_itself() {
        let outcome = Outcome { state: SessionState::default(), notice: None };

        assert_eq!(outcome_display(outcome).unwrap_err(), NO_IP_LOCATION);
    }
}
