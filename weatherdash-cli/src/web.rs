//! Browser UI: the dashboard page plus a JSON twin of it.

use std::sync::Arc;

use anyhow::Context;
use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use weatherdash_core::{Config, Dashboard};

use crate::render::{PageModel, Pages};

pub const EMPTY_CITY_MESSAGE: &str = "Please enter a city name.";

/// Shared application state
#[derive(Debug, Clone)]
pub struct AppState {
    pub dashboard: Arc<Dashboard>,
    pub pages: Arc<Pages>,
    pub default_city: Arc<str>,
}

#[derive(Debug, Deserialize)]
pub struct CityQuery {
    pub city: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/weather", get(api_weather))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind, serve until Ctrl-C.
pub async fn serve(config: Config) -> anyhow::Result<()> {
    let state = AppState {
        dashboard: Arc::new(Dashboard::from_config(&config)?),
        pages: Arc::new(Pages::new().context("Failed to compile page template")?),
        default_city: Arc::from(config.city_or_default()),
    };

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!(%addr, "dashboard available at http://{addr}/");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal(tokio::signal::ctrl_c()))
        .await
        .context("HTTP server failed")
}

/// Resolves once `signal` fires or its listener fails to install.
async fn shutdown_signal<F>(signal: F)
where
    F: Future<Output = std::io::Result<()>>,
{
    match signal.await {
        Ok(()) => info!("shutting down"),
        Err(e) => warn!(error = %e, "failed to listen for Ctrl-C, shutting down"),
    }
}

async fn index(State(state): State<AppState>, Query(query): Query<CityQuery>) -> Response {
    let submitted = query.city.as_deref().map(str::trim);

    let view = match submitted {
        Some(city) if !city.is_empty() => Some(state.dashboard.run(city).await),
        _ => None,
    };

    let city_input = match submitted {
        Some(city) => city,
        None => state.default_city.as_ref(),
    };

    let mut page = PageModel::new(city_input, view.as_ref());
    if submitted.is_some_and(str::is_empty) {
        page = page.with_notice(EMPTY_CITY_MESSAGE);
    }

    match state.pages.dashboard(&page) {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            error!(error = %e, "failed to render dashboard page");
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to render page").into_response()
        }
    }
}

async fn api_weather(State(state): State<AppState>, Query(query): Query<CityQuery>) -> Response {
    let city = query.city.as_deref().map(str::trim).unwrap_or_default();
    if city.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: EMPTY_CITY_MESSAGE.to_string(),
            }),
        )
            .into_response();
    }

    Json(state.dashboard.run(city).await).into_response()
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
