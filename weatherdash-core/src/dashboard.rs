//! The request pipeline behind the dashboard page.
//!
//! One call to [`Dashboard::run`] takes a city name to a [`DashboardView`]:
//! current weather first, then the summary and the forecast side by side.
//! Every failure ends up inside the view; nothing here returns an error.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::{
    config::Config,
    model::{CurrentLookup, ForecastLookup, ForecastPoint, StatusMarker, WeatherReading},
    provider::{WeatherProvider, provider_from_config},
    summary::{SummaryGenerator, SummaryOutcome},
    trend::TrendChart,
};

pub const CITY_NOT_FOUND_MESSAGE: &str = "City not found or an error occurred!";
pub const FORECAST_UNAVAILABLE_MESSAGE: &str =
    "Could not fetch forecast data. Please try again later.";

/// How many forecast intervals the detailed listing shows.
pub const FORECAST_ROW_LIMIT: usize = 10;

/// The four headline numbers, already formatted for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub temperature: String,
    pub humidity: String,
    pub pressure: String,
    pub wind_speed: String,
}

impl Metrics {
    pub fn from_reading(reading: &WeatherReading) -> Self {
        Self {
            temperature: format!("{:.2}°C", reading.temperature_c()),
            humidity: format!("{}%", reading.humidity_pct),
            pressure: format!("{} hPa", reading.pressure_hpa),
            wind_speed: format!("{} m/s", reading.wind_speed_mps),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ForecastSection {
    Available {
        chart: TrendChart,
        rows: Vec<String>,
    },
    Unavailable {
        message: String,
        reason: Option<String>,
    },
}

impl ForecastSection {
    fn unavailable(reason: Option<String>) -> Self {
        Self::Unavailable {
            message: FORECAST_UNAVAILABLE_MESSAGE.to_string(),
            reason,
        }
    }
}

/// Everything shown for a city that was found.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub city: String,
    pub reading: WeatherReading,
    pub metrics: Metrics,
    pub summary: SummaryOutcome,
    pub forecast: ForecastSection,
}

/// Terminal state of one dashboard request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum DashboardView {
    Rendered(Report),
    CityNotFound {
        city: String,
        message: String,
    },
    /// The provider could not be reached or refused the request.
    WeatherUnavailable {
        city: String,
        message: String,
        reason: String,
    },
}

/// Upper-case the first character and lower-case the rest.
pub fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// One line of the detailed listing, e.g. `2024-01-15 12:00:00: 6.85°C, Light rain`.
pub fn format_forecast_row(point: &ForecastPoint) -> String {
    format!(
        "{}: {:.2}°C, {}",
        point.timestamp,
        point.temperature_c(),
        capitalize(&point.description)
    )
}

fn status_reason(status: &StatusMarker, message: Option<&str>) -> String {
    match message {
        Some(m) => format!("provider returned status {status}: {m}"),
        None => format!("provider returned status {status}"),
    }
}

#[derive(Debug, Clone)]
pub struct Dashboard {
    provider: Arc<dyn WeatherProvider>,
    summarizer: SummaryGenerator,
}

impl Dashboard {
    pub fn new(provider: Arc<dyn WeatherProvider>, summarizer: SummaryGenerator) -> Self {
        Self {
            provider,
            summarizer,
        }
    }

    /// Wire up the OpenWeather provider and the OpenAI summarizer.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let provider = provider_from_config(&config.weather)?;
        let summarizer = SummaryGenerator::from_config(&config.llm)?;
        Ok(Self::new(provider, summarizer))
    }

    #[instrument(skip(self))]
    pub async fn run(&self, city: &str) -> DashboardView {
        let city = city.trim();
        if city.is_empty() {
            return DashboardView::CityNotFound {
                city: String::new(),
                message: CITY_NOT_FOUND_MESSAGE.to_string(),
            };
        }

        let reading = match self.provider.current(city).await {
            Ok(CurrentLookup::Found(reading)) => reading,
            Ok(CurrentLookup::NotFound) => {
                info!("city not found");
                return DashboardView::CityNotFound {
                    city: city.to_string(),
                    message: CITY_NOT_FOUND_MESSAGE.to_string(),
                };
            }
            Ok(CurrentLookup::Rejected { status, message }) => {
                return DashboardView::WeatherUnavailable {
                    city: city.to_string(),
                    message: CITY_NOT_FOUND_MESSAGE.to_string(),
                    reason: status_reason(&status, message.as_deref()),
                };
            }
            Err(e) => {
                warn!(error = %e, "current weather request failed");
                return DashboardView::WeatherUnavailable {
                    city: city.to_string(),
                    message: CITY_NOT_FOUND_MESSAGE.to_string(),
                    reason: e.to_string(),
                };
            }
        };

        let metrics = Metrics::from_reading(&reading);

        let (summary, forecast) = tokio::join!(
            self.summarizer.summarize(&reading),
            self.provider.forecast(city)
        );

        let forecast = match forecast {
            Ok(ForecastLookup::Found(series)) => ForecastSection::Available {
                chart: TrendChart::from_series(&series),
                rows: series
                    .points
                    .iter()
                    .take(FORECAST_ROW_LIMIT)
                    .map(format_forecast_row)
                    .collect(),
            },
            Ok(ForecastLookup::Unavailable { status, message }) => {
                ForecastSection::unavailable(Some(status_reason(&status, message.as_deref())))
            }
            Err(e) => {
                warn!(error = %e, "forecast request failed");
                ForecastSection::unavailable(Some(e.to_string()))
            }
        };

        info!(summary_ok = summary.is_generated(), "dashboard rendered");

        DashboardView::Rendered(Report {
            city: reading.city.clone(),
            reading,
            metrics,
            summary,
            forecast,
        })
    }
}
