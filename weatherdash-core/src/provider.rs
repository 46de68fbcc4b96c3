use crate::{
    config::WeatherApiConfig,
    model::{CurrentLookup, ForecastLookup},
    provider::openweather::OpenWeatherProvider,
};
use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};
use thiserror::Error;

pub mod openweather;

/// Failures that stop a provider request before it yields a status marker.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Failed to reach weather provider ({endpoint}): {source}")]
    Transport {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("Unexpected weather provider response ({endpoint}): {source}")]
    Decode {
        endpoint: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Current conditions for `city`.
    async fn current(&self, city: &str) -> Result<CurrentLookup, FetchError>;

    /// 5-day forecast in 3-hour intervals for `city`.
    async fn forecast(&self, city: &str) -> Result<ForecastLookup, FetchError>;
}

/// Construct the OpenWeather provider from its config section.
pub fn provider_from_config(
    config: &WeatherApiConfig,
) -> anyhow::Result<Arc<dyn WeatherProvider>> {
    if config.api_key.trim().is_empty() {
        anyhow::bail!(
            "No OpenWeather API key configured.\n\
             Hint: run `weatherdash configure` and enter your API key."
        );
    }

    Ok(Arc::new(OpenWeatherProvider::new(config)?))
}
