use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use weather_core::{Config, LocationParams, WeatherService};

use crate::server;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "Weather aggregation backend")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key in the config file.
    Configure {
        /// Key to store; prompted for when omitted.
        #[arg(long)]
        api_key: Option<String>,
    },

    /// Fetch current conditions and forecast once and print the JSON reply.
    Show {
        #[arg(long)]
        city: Option<String>,

        #[arg(long, allow_hyphen_values = true)]
        lat: Option<String>,

        #[arg(long, allow_hyphen_values = true)]
        lon: Option<String>,
    },

    /// Serve `GET /api/weather` over HTTP.
    Serve {
        /// Defaults to `server.port` from the config file.
        #[arg(long)]
        port: Option<u16>,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure { api_key } => {
                let api_key = match api_key {
                    Some(key) => key,
                    None => inquire::Password::new("OpenWeather API key:")
                        .without_confirmation()
                        .prompt()
                        .context("Failed to read API key")?,
                };
                if api_key.trim().is_empty() {
                    bail!("API key must not be empty");
                }

                let mut cfg = Config::load_file()?;
                cfg.set_api_key(api_key.trim().to_string());
                cfg.save()?;

                let path = Config::config_file_path()?;
                println!("Saved API key to {}", path.display());
            }
            Command::Show { city, lat, lon } => {
                let cfg = Config::load()?;
                let service = WeatherService::from_config(&cfg)?;

                let reply = service.handle(&LocationParams { city, lat, lon }).await;
                println!("{}", serde_json::to_string_pretty(&reply.body)?);

                if !reply.is_success() {
                    bail!("weather request failed with status {}", reply.status);
                }
            }
            Command::Serve { port } => {
                let cfg = Config::load()?;
                let service = WeatherService::from_config(&cfg)?;

                server::run(service, port.unwrap_or(cfg.server.port)).await?;
            }
        }

        Ok(())
    }
}
