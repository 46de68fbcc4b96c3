//! HTML rendering of the dashboard page.

use serde::Serialize;
use tera::{Context, Tera};
use weatherdash_core::{DashboardView, ForecastSection};

pub const PAGE_TITLE: &str = "Weather Forecasting with LLM";

const DASHBOARD_TEMPLATE: &str = include_str!("../templates/dashboard.html");
const DASHBOARD_NAME: &str = "dashboard.html";

/// What the page template needs.
#[derive(Debug, Serialize)]
pub struct PageModel<'a> {
    pub title: &'static str,
    /// Value shown in the city input and in the heading.
    pub city_input: &'a str,
    /// Inline message shown above the results, e.g. for an empty city.
    pub notice: Option<&'a str>,
    pub view: Option<&'a DashboardView>,
    /// Plotly figure as a script-safe JSON literal.
    pub chart_json: Option<String>,
}

impl<'a> PageModel<'a> {
    pub fn new(city_input: &'a str, view: Option<&'a DashboardView>) -> Self {
        let chart_json = match view {
            Some(DashboardView::Rendered(report)) => match &report.forecast {
                ForecastSection::Available { chart, .. } => {
                    Some(script_safe_json(&chart.to_plotly()))
                }
                ForecastSection::Unavailable { .. } => None,
            },
            _ => None,
        };

        Self {
            title: PAGE_TITLE,
            city_input,
            notice: None,
            view,
            chart_json,
        }
    }

    pub fn with_notice(mut self, notice: &'a str) -> Self {
        self.notice = Some(notice);
        self
    }
}

/// JSON that can sit inside a `<script>` element without closing it early.
fn script_safe_json(value: &serde_json::Value) -> String {
    value
        .to_string()
        .replace('<', "\\u003c")
        .replace('>', "\\u003e")
        .replace('&', "\\u0026")
}

#[derive(Debug)]
pub struct Pages {
    tera: Tera,
}

impl Pages {
    pub fn new() -> Result<Self, tera::Error> {
        let mut tera = Tera::default();
        tera.add_raw_template(DASHBOARD_NAME, DASHBOARD_TEMPLATE)?;
        Ok(Self { tera })
    }

    pub fn dashboard(&self, page: &PageModel<'_>) -> Result<String, tera::Error> {
        let context = Context::from_serialize(page)?;
        self.tera.render(DASHBOARD_NAME, &context)
    }
}
