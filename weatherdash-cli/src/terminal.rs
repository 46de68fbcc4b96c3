use std::fmt::{self, Write};

use weatherdash_core::{DashboardView, ForecastSection, Report};

/// Plain-text rendition of a dashboard view for `weatherdash show`.
pub fn render(city: &str, view: &DashboardView) -> String {
    let mut out = String::new();
    // Writing into a `String` cannot fail.
    write_view(&mut out, city, view).unwrap_or_default();
    out
}

fn write_view(out: &mut impl Write, city: &str, view: &DashboardView) -> fmt::Result {
    writeln!(out, "Weather Updates for {city}\n")?;

    match view {
        DashboardView::Rendered(report) => write_report(out, report),
        DashboardView::CityNotFound { message, .. } => writeln!(out, "error: {message}"),
        DashboardView::WeatherUnavailable {
            message, reason, ..
        } => {
            writeln!(out, "error: {message}")?;
            writeln!(out, "  {reason}")
        }
    }
}

fn write_report(out: &mut impl Write, report: &Report) -> fmt::Result {
    let m = &report.metrics;
    writeln!(out, "  {:<12}{}", "Temperature", m.temperature)?;
    writeln!(out, "  {:<12}{}", "Humidity", m.humidity)?;
    writeln!(out, "  {:<12}{}", "Pressure", m.pressure)?;
    writeln!(out, "  {:<12}{}", "Wind Speed", m.wind_speed)?;

    writeln!(out, "\n{}\n", report.summary.display_text())?;
    writeln!(out, "5-Day Weather Forecast")?;

    match &report.forecast {
        ForecastSection::Available { chart, rows } => {
            if let Some((lo, hi)) = chart.range() {
                writeln!(
                    out,
                    "  {} points, {lo:.2}°C .. {hi:.2}°C",
                    chart.points.len()
                )?;
            }
            writeln!(out, "\nDetailed Forecast")?;
            for row in rows {
                writeln!(out, "  {row}")?;
            }
            Ok(())
        }
        ForecastSection::Unavailable { message, reason } => {
            writeln!(out, "error: {message}")?;
            match reason {
                Some(reason) => writeln!(out, "  {reason}"),
                None => Ok(()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use weatherdash_core::{
        Metrics, SummaryOutcome, WeatherReading,
        dashboard::{CITY_NOT_FOUND_MESSAGE, FORECAST_UNAVAILABLE_MESSAGE},
        trend::{TrendChart, TrendPoint},
    };

    fn report(forecast: ForecastSection) -> DashboardView {
        let reading = WeatherReading {
            city: "London".into(),
            temperature_k: 283.15,
            humidity_pct: 70.0,
            pressure_hpa: 1012.0,
            wind_speed_mps: 3.0,
            description: "clear sky".into(),
            observation_time: None,
        };
        DashboardView::Rendered(Report {
            city: "London".into(),
            metrics: Metrics::from_reading(&reading),
            reading,
            summary: SummaryOutcome::Failed {
                reason: "Language model returned no choices".into(),
            },
            forecast,
        })
    }

    #[test]
    fn report_lists_metrics_summary_and_rows() {
        let chart = TrendChart {
            title: "t".into(),
            x_label: "x".into(),
            y_label: "y".into(),
            points: vec![
                TrendPoint {
                    timestamp: "a".into(),
                    temperature_c: 1.5,
                },
                TrendPoint {
                    timestamp: "b".into(),
                    temperature_c: -2.0,
                },
            ],
        };
        let view = report(ForecastSection::Available {
            chart,
            rows: vec!["a: 1.50°C, Rain".into(), "b: -2.00°C, Snow".into()],
        });

        let text = render("London", &view);

        assert!(text.starts_with("Weather Updates for London\n"));
        assert!(text.contains("  Temperature 10.00°C\n"));
        assert!(text.contains("  Wind Speed  3 m/s\n"));
        assert!(text.contains("Language model returned no choices"));
        assert!(text.contains("2 points, -2.00°C .. 1.50°C"));
        assert!(text.contains("  a: 1.50°C, Rain\n  b: -2.00°C, Snow\n"));
    }

    #[test]
    fn forecast_error_keeps_metrics() {
        let view = report(ForecastSection::Unavailable {
            message: FORECAST_UNAVAILABLE_MESSAGE.into(),
            reason: None,
        });

        let text = render("London", &view);

        assert!(text.contains("1012 hPa"));
        assert!(text.contains(&format!("error: {FORECAST_UNAVAILABLE_MESSAGE}")));
        assert!(!text.contains("Detailed Forecast"));
    }

    /// Sink that refuses every write after the first `budget` calls.
    struct Failing {
        budget: usize,
    }

    impl Write for Failing {
        fn write_str(&mut self, _s: &str) -> fmt::Result {
            if self.budget == 0 {
                return Err(fmt::Error);
            }
            self.budget -= 1;
            Ok(())
        }
    }

    #[test]
    fn write_errors_propagate() {
        let view = report(ForecastSection::Unavailable {
            message: FORECAST_UNAVAILABLE_MESSAGE.into(),
            reason: Some("provider returned status 404".into()),
        });

        assert!(write_view(&mut Failing { budget: 0 }, "London", &view).is_err());
        assert!(write_view(&mut Failing { budget: 3 }, "London", &view).is_err());
        assert!(write_view(&mut Failing { budget: usize::MAX }, "London", &view).is_ok());
    }

    #[test]
    fn city_not_found_is_a_single_error() {
        let view = DashboardView::CityNotFound {
            city: "Atlantis".into(),
            message: CITY_NOT_FOUND_MESSAGE.into(),
        };

        assert_eq!(
            render("Atlantis", &view),
            format!("Weather Updates for Atlantis\n\nerror: {CITY_NOT_FOUND_MESSAGE}\n")
        );
    }
}
