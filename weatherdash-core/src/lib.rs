//! Core library for the `weatherdash` dashboard.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The OpenWeather provider (current conditions and 5-day forecast)
//! - LLM summaries of the current conditions
//! - The temperature trend chart and the dashboard pipeline tying it together
//!
//! It is used by `weatherdash-cli`, which serves the browser UI and the terminal output.

pub mod config;
pub mod dashboard;
pub mod model;
pub mod provider;
pub mod summary;
pub mod trend;

pub use config::{Config, LlmConfig, ServerConfig, WeatherApiConfig};
pub use dashboard::{Dashboard, DashboardView, ForecastSection, Metrics, Report};
pub use model::{
    CurrentLookup, ForecastLookup, ForecastPoint, ForecastSeries, StatusMarker, WeatherReading,
};
pub use provider::{FetchError, WeatherProvider};
pub use summary::{ChatCompletion, SummaryError, SummaryGenerator, SummaryOutcome};
pub use trend::TrendChart;
