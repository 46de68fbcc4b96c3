use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use crate::{
    config::WeatherApiConfig,
    model::{
        CurrentLookup, ForecastLookup, ForecastPoint, ForecastSeries, StatusMarker, WeatherReading,
    },
};

use super::{FetchError, WeatherProvider};

const CURRENT_ENDPOINT: &str = "weather";
const FORECAST_ENDPOINT: &str = "forecast";

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(config: &WeatherApiConfig) -> Result<Self, FetchError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(FetchError::Client)?;

        Ok(Self {
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    /// GET `{base_url}/{endpoint}` and decode the body as JSON.
    ///
    /// The HTTP status is not checked: OpenWeather answers "city not found"
    /// with a 404 whose body still carries the `cod` marker.
    async fn fetch_body(&self, endpoint: &'static str, city: &str) -> Result<Value, FetchError> {
        let url = format!("{}/{}", self.base_url, endpoint);

        let res = self
            .http
            .get(url)
            .query(&[("appid", self.api_key.as_str()), ("q", city)])
            .send()
            .await
            .map_err(|source| FetchError::Transport { endpoint, source })?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|source| FetchError::Transport { endpoint, source })?;

        debug!(endpoint, %status, bytes = body.len(), "OpenWeather responded");

        serde_json::from_str(&body).map_err(|source| {
            warn!(endpoint, %status, body = %truncate_body(&body), "OpenWeather body is not JSON");
            FetchError::Decode { endpoint, source }
        })
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    #[instrument(skip(self))]
    async fn current(&self, city: &str) -> Result<CurrentLookup, FetchError> {
        let body = self.fetch_body(CURRENT_ENDPOINT, city).await?;
        let envelope = Envelope::from_body(&body, CURRENT_ENDPOINT)?;

        // A missing marker is read as success; the body decode below decides.
        if let Some(status) = envelope.cod.filter(|s| !s.is_success()) {
            if status.is_not_found() {
                debug!("city not found");
                return Ok(CurrentLookup::NotFound);
            }
            let message = message_text(envelope.message);
            warn!(%status, ?message, "OpenWeather rejected current weather request");
            return Ok(CurrentLookup::Rejected { status, message });
        }

        let parsed: OwCurrentResponse = serde_json::from_value(body).map_err(|source| {
            FetchError::Decode {
                endpoint: CURRENT_ENDPOINT,
                source,
            }
        })?;

        Ok(CurrentLookup::Found(parsed.into_reading(city)))
    }

    /// The marker is compared as text, so a numeric `200` passes as well as
    /// the string `"200"` the live API sends. A missing marker is unavailable.
    #[instrument(skip(self))]
    async fn forecast(&self, city: &str) -> Result<ForecastLookup, FetchError> {
        let body = self.fetch_body(FORECAST_ENDPOINT, city).await?;
        let envelope = Envelope::from_body(&body, FORECAST_ENDPOINT)?;

        let status = match envelope.cod {
            Some(status) if status.is_success() => status,
            other => {
                let status = other.unwrap_or_else(|| StatusMarker::new(""));
                let message = message_text(envelope.message);
                warn!(%status, ?message, "forecast unavailable");
                return Ok(ForecastLookup::Unavailable { status, message });
            }
        };

        let parsed: OwForecastResponse = serde_json::from_value(body).map_err(|source| {
            FetchError::Decode {
                endpoint: FORECAST_ENDPOINT,
                source,
            }
        })?;

        debug!(%status, intervals = parsed.list.len(), "forecast received");
        Ok(ForecastLookup::Found(parsed.into_series(city)))
    }
}

/// The fields every OpenWeather body has, success or not.
#[derive(Debug, Deserialize)]
struct Envelope {
    cod: Option<StatusMarker>,
    /// A string on failures, a number (`0`) on forecast successes.
    message: Option<Value>,
}

impl Envelope {
    fn from_body(body: &Value, endpoint: &'static str) -> Result<Self, FetchError> {
        Self::deserialize(body).map_err(|source| FetchError::Decode { endpoint, source })
    }
}

fn message_text(message: Option<Value>) -> Option<String> {
    match message? {
        Value::String(s) if !s.is_empty() => Some(s),
        _ => None,
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    humidity: f64,
    pressure: f64,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    #[serde(default)]
    name: String,
    dt: Option<i64>,
    main: OwMain,
    #[serde(default)]
    weather: Vec<OwWeather>,
    wind: OwWind,
}

impl OwCurrentResponse {
    fn into_reading(self, requested_city: &str) -> WeatherReading {
        let city = if self.name.is_empty() {
            requested_city.to_string()
        } else {
            self.name
        };

        WeatherReading {
            city,
            temperature_k: self.main.temp,
            humidity_pct: self.main.humidity,
            pressure_hpa: self.main.pressure,
            wind_speed_mps: self.wind.speed,
            description: first_description(self.weather),
            observation_time: self.dt.and_then(unix_to_utc),
        }
    }
}

#[derive(Debug, Deserialize)]
struct OwForecastMain {
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct OwCity {
    name: String,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt_txt: String,
    main: OwForecastMain,
    #[serde(default)]
    weather: Vec<OwWeather>,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    city: Option<OwCity>,
    #[serde(default)]
    list: Vec<OwForecastEntry>,
}

impl OwForecastResponse {
    fn into_series(self, requested_city: &str) -> ForecastSeries {
        let city = self
            .city
            .map(|c| c.name)
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| requested_city.to_string());

        let points = self
            .list
            .into_iter()
            .map(|entry| ForecastPoint {
                timestamp: entry.dt_txt,
                temperature_k: entry.main.temp,
                description: first_description(entry.weather),
            })
            .collect();

        ForecastSeries { city, points }
    }
}

fn first_description(weather: Vec<OwWeather>) -> String {
    weather
        .into_iter()
        .next()
        .map(|w| w.description)
        .unwrap_or_else(|| "unknown".to_string())
}

fn unix_to_utc(ts: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(ts, 0)
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
