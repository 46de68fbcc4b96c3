use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Offset between the Kelvin and Celsius scales.
pub const KELVIN_OFFSET: f64 = 273.15;

pub fn kelvin_to_celsius(kelvin: f64) -> f64 {
    kelvin - KELVIN_OFFSET
}

/// The `cod` field OpenWeather puts in every response body.
///
/// Current-weather successes send it as a number (`200`), forecasts and most
/// failures as a string (`"404"`). Both are kept as text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct StatusMarker(String);

impl StatusMarker {
    pub const SUCCESS: &'static str = "200";
    pub const NOT_FOUND: &'static str = "404";

    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_success(&self) -> bool {
        self.0 == Self::SUCCESS
    }

    pub fn is_not_found(&self) -> bool {
        self.0 == Self::NOT_FOUND
    }
}

impl fmt::Display for StatusMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for StatusMarker {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(i64),
            Text(String),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Self(n.to_string()),
            Raw::Text(s) => Self(s),
        })
    }
}

/// Current conditions for one city, as reported by the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReading {
    pub city: String,
    pub temperature_k: f64,
    pub humidity_pct: f64,
    pub pressure_hpa: f64,
    pub wind_speed_mps: f64,
    pub description: String,
    pub observation_time: Option<DateTime<Utc>>,
}

impl WeatherReading {
    pub fn temperature_c(&self) -> f64 {
        kelvin_to_celsius(self.temperature_k)
    }
}

/// One 3-hour interval of the 5-day forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    /// Provider timestamp text, e.g. `2024-01-15 12:00:00`.
    pub timestamp: String,
    pub temperature_k: f64,
    pub description: String,
}

impl ForecastPoint {
    pub fn temperature_c(&self) -> f64 {
        kelvin_to_celsius(self.temperature_k)
    }
}

/// Forecast intervals in the order the provider returned them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSeries {
    pub city: String,
    pub points: Vec<ForecastPoint>,
}

/// Outcome of a current-weather request that reached the provider.
#[derive(Debug, Clone, PartialEq)]
pub enum CurrentLookup {
    Found(WeatherReading),
    NotFound,
    /// Any other non-success marker (bad key, rate limit, ...).
    Rejected {
        status: StatusMarker,
        message: Option<String>,
    },
}

/// Outcome of a forecast request that reached the provider.
#[derive(Debug, Clone, PartialEq)]
pub enum ForecastLookup {
    Found(ForecastSeries),
    Unavailable {
        status: StatusMarker,
        message: Option<String>,
    },
}
