use std::{collections::HashMap, io::Read};

use anyhow::Context;
use clap::{Parser, Subcommand};
use inquire::{Password, PasswordDisplayMode, Text};
use tracing::{debug, warn};
use weatherdash_core::{Config, Dashboard};

use crate::{terminal, web};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weatherdash", version, about = "Weather forecasting dashboard with LLM summaries")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store API keys and the default city in the config file.
    Configure,

    /// Print the dashboard for a city in the terminal.
    Show {
        /// City name; falls back to the configured default city.
        city: Option<String>,
    },

    /// Serve the dashboard in the browser.
    Serve {
        /// Address to bind, overrides `server.host`.
        #[arg(long)]
        host: Option<String>,

        /// Port to bind, overrides `server.port`.
        #[arg(long)]
        port: Option<u16>,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show { city } => {
                let config = load_config()?;
                let dashboard = Dashboard::from_config(&config)?;
                let city = city.unwrap_or_else(|| config.city_or_default().to_string());

                let view = dashboard.run(&city).await;
                print!("{}", terminal::render(&city, &view));
                Ok(())
            }
            Command::Serve { host, port } => {
                let mut config = load_config()?;
                if let Some(host) = host {
                    config.server.host = host;
                }
                if let Some(port) = port {
                    config.server.port = port;
                }
                web::serve(config).await
            }
        }
    }
}

/// Config file plus `WEATHER_API_KEY` / `OPENAI_API_KEY` from the environment
/// or a `.env` file.
fn load_config() -> anyhow::Result<Config> {
    let dotenv = dotenv_vars();
    let config = Config::load()?.with_env_overrides(|name| env_var(name, &dotenv));
    config.weather_api_key()?;
    Ok(config)
}

/// Process environment first, then the `.env` file. Blank values count as unset.
fn env_var(name: &str, dotenv: &HashMap<String, String>) -> Option<String> {
    std::env::var(name)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .or_else(|| dotenv.get(name).cloned())
}

/// Variables from the nearest `.env` file, searched from the working directory
/// upward. A missing file is not an error.
fn dotenv_vars() -> HashMap<String, String> {
    match dotenvy::dotenv_iter() {
        Ok(iter) => collect_dotenv(iter),
        Err(e) if e.not_found() => {
            debug!("no .env file found");
            HashMap::new()
        }
        Err(e) => {
            warn!(error = %e, "failed to open .env file");
            HashMap::new()
        }
    }
}

fn collect_dotenv<R: Read>(iter: dotenvy::Iter<R>) -> HashMap<String, String> {
    iter.filter_map(|item| match item {
        Ok(pair) => Some(pair),
        Err(e) => {
            warn!(error = %e, "skipping unreadable .env line");
            None
        }
    })
    .collect()
}

fn configure() -> anyhow::Result<()> {
    // File values only: keys from the environment are never written back.
    let mut config = Config::load()?;

    let city = Text::new("Default city:")
        .with_default(config.city_or_default())
        .prompt()
        .context("Failed to read default city")?;
    config.default_city = Some(city.trim().to_string());

    if let Some(key) = prompt_key("OpenWeather API key:", !config.weather.api_key.is_empty())? {
        config.weather.api_key = key;
    }
    if let Some(key) = prompt_key("OpenAI API key:", !config.llm.api_key.is_empty())? {
        config.llm.api_key = key;
    }

    config.save()?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}

/// Ask for a secret; an empty answer keeps the stored one.
fn prompt_key(message: &str, has_existing: bool) -> anyhow::Result<Option<String>> {
    let help = if has_existing {
        "Leave empty to keep the current key"
    } else {
        "Leave empty to skip"
    };

    let key = Password::new(message)
        .without_confirmation()
        .with_display_mode(PasswordDisplayMode::Masked)
        .with_help_message(help)
        .prompt()
        .with_context(|| format!("Failed to read {message}"))?;

    let key = key.trim();
    Ok((!key.is_empty()).then(|| key.to_string()))
}
