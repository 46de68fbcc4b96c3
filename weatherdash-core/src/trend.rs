//! Temperature trend chart for the forecast.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::model::ForecastSeries;

pub const CHART_TITLE: &str = "Temperature Trend for the Next 5 Days";
pub const X_LABEL: &str = "Date & Time";
pub const Y_LABEL: &str = "Temperature (°C)";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub timestamp: String,
    pub temperature_c: f64,
}

/// A line chart of every forecast interval, in provider order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendChart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub points: Vec<TrendPoint>,
}

impl TrendChart {
    pub fn from_series(series: &ForecastSeries) -> Self {
        let points = series
            .points
            .iter()
            .map(|p| TrendPoint {
                timestamp: p.timestamp.clone(),
                temperature_c: p.temperature_c(),
            })
            .collect();

        Self {
            title: CHART_TITLE.to_string(),
            x_label: X_LABEL.to_string(),
            y_label: Y_LABEL.to_string(),
            points,
        }
    }

    /// Lowest and highest temperature, `None` for an empty chart.
    pub fn range(&self) -> Option<(f64, f64)> {
        self.points.iter().map(|p| p.temperature_c).fold(None, |acc, t| match acc {
            None => Some((t, t)),
            Some((lo, hi)) => Some((lo.min(t), hi.max(t))),
        })
    }

    /// Plotly figure (`data` + `layout`) drawing the chart without gridlines.
    pub fn to_plotly(&self) -> Value {
        let x: Vec<&str> = self.points.iter().map(|p| p.timestamp.as_str()).collect();
        let y: Vec<f64> = self.points.iter().map(|p| p.temperature_c).collect();

        json!({
            "data": [{
                "type": "scatter",
                "mode": "lines",
                "x": x,
                "y": y,
            }],
            "layout": {
                "title": { "text": self.title },
                "xaxis": { "title": { "text": self.x_label }, "showgrid": false },
                "yaxis": { "title": { "text": self.y_label }, "showgrid": false },
            }
        })
    }
}
