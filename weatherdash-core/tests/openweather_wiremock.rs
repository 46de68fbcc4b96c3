//! OpenWeather provider against a mock HTTP server.

use weatherdash_core::{
    CurrentLookup, FetchError, ForecastLookup, WeatherApiConfig, WeatherProvider,
    provider::openweather::OpenWeatherProvider,
};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, query_param},
};

fn provider_for(server: &MockServer) -> OpenWeatherProvider {
    let config = WeatherApiConfig {
        api_key: "TEST_KEY".into(),
        base_url: server.uri(),
        timeout_secs: 5,
    };
    OpenWeatherProvider::new(&config).expect("client must build")
}

fn london_current() -> serde_json::Value {
    serde_json::json!({
        "cod": 200,
        "name": "London",
        "dt": 1_705_320_000,
        "main": {"temp": 283.15, "humidity": 70, "pressure": 1012},
        "wind": {"speed": 3},
        "weather": [{"description": "clear sky"}]
    })
}

fn london_forecast(entries: usize) -> serde_json::Value {
    let list: Vec<_> = (0..entries)
        .map(|i| {
            serde_json::json!({
                "dt": 1_705_320_000 + (i as i64) * 10_800,
                "dt_txt": format!("2024-01-{:02} {:02}:00:00", 15 + i / 8, (i % 8) * 3),
                "main": {"temp": 280.0 + i as f64, "humidity": 80, "pressure": 1010},
                "weather": [{"description": "light rain"}],
                "wind": {"speed": 5.1}
            })
        })
        .collect();

    serde_json::json!({
        "cod": "200",
        "message": 0,
        "cnt": entries,
        "list": list,
        "city": {"name": "London", "country": "GB"}
    })
}

#[tokio::test]
async fn current_sends_key_and_city_as_query() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("appid", "TEST_KEY"))
        .and(query_param("q", "London"))
        .respond_with(ResponseTemplate::new(200).set_body_json(london_current()))
        .expect(1)
        .mount(&server)
        .await;

    let lookup = provider_for(&server).current("London").await.unwrap();

    let CurrentLookup::Found(reading) = lookup else {
        panic!("expected a reading");
    };
    assert_eq!(reading.city, "London");
    assert_eq!(reading.temperature_k, 283.15);
    assert_eq!(reading.humidity_pct, 70.0);
    assert_eq!(reading.pressure_hpa, 1012.0);
    assert_eq!(reading.description, "clear sky");
    assert!(reading.observation_time.is_some());
}

#[tokio::test]
async fn current_not_found_is_a_lookup_not_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_json(serde_json::json!({"cod": "404", "message": "city not found"})),
        )
        .mount(&server)
        .await;

    let lookup = provider_for(&server).current("Atlantis").await.unwrap();

    assert_eq!(lookup, CurrentLookup::NotFound);
}

#[tokio::test]
async fn current_numeric_not_found_marker() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"cod": 404})))
        .mount(&server)
        .await;

    let lookup = provider_for(&server).current("Atlantis").await.unwrap();

    assert_eq!(lookup, CurrentLookup::NotFound);
}

#[tokio::test]
async fn current_bad_key_is_rejected_with_message() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "cod": 401,
            "message": "Invalid API key."
        })))
        .mount(&server)
        .await;

    let lookup = provider_for(&server).current("London").await.unwrap();

    match lookup {
        CurrentLookup::Rejected { status, message } => {
            assert_eq!(status.as_str(), "401");
            assert_eq!(message.as_deref(), Some("Invalid API key."));
        }
        other => panic!("expected rejection, got {other:?}"),
    }
}

#[tokio::test]
async fn current_non_json_body_is_a_decode_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
        .mount(&server)
        .await;

    let err = provider_for(&server).current("London").await.unwrap_err();

    assert!(matches!(err, FetchError::Decode { endpoint: "weather", .. }));
}

#[tokio::test]
async fn unreachable_provider_is_a_transport_error() {
    let config = WeatherApiConfig {
        api_key: "TEST_KEY".into(),
        base_url: "http://127.0.0.1:1".into(),
        timeout_secs: 2,
    };
    let provider = OpenWeatherProvider::new(&config).unwrap();

    let err = provider.forecast("London").await.unwrap_err();

    assert!(matches!(err, FetchError::Transport { endpoint: "forecast", .. }));
    assert!(err.to_string().contains("Failed to reach weather provider"));
}

#[tokio::test]
async fn forecast_returns_all_intervals_in_order() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/forecast"))
        .and(query_param("appid", "TEST_KEY"))
        .and(query_param("q", "London"))
        .respond_with(ResponseTemplate::new(200).set_body_json(london_forecast(40)))
        .mount(&server)
        .await;

    let lookup = provider_for(&server).forecast("London").await.unwrap();

    let ForecastLookup::Found(series) = lookup else {
        panic!("expected a forecast");
    };
    assert_eq!(series.city, "London");
    assert_eq!(series.points.len(), 40);
    assert_eq!(series.points[0].timestamp, "2024-01-15 00:00:00");
    assert_eq!(series.points[9].timestamp, "2024-01-16 03:00:00");
    assert_eq!(series.points[39].temperature_k, 319.0);
}

#[tokio::test]
async fn forecast_failure_marker_is_unavailable() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"cod": "404"})))
        .mount(&server)
        .await;

    let lookup = provider_for(&server).forecast("London").await.unwrap();

    match lookup {
        ForecastLookup::Unavailable { status, message } => {
            assert_eq!(status.as_str(), "404");
            assert_eq!(message, None);
        }
        other => panic!("expected unavailable, got {other:?}"),
    }
}

#[tokio::test]
async fn forecast_numeric_success_marker_is_accepted() {
    let server = MockServer::start().await;

    let mut body = london_forecast(2);
    body["cod"] = serde_json::json!(200);
    Mock::given(method("GET"))
        .and(path("/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;

    let lookup = provider_for(&server).forecast("London").await.unwrap();

    let ForecastLookup::Found(series) = lookup else {
        panic!("expected a forecast series");
    };
    assert_eq!(series.points.len(), 2);
}

#[tokio::test]
async fn forecast_without_marker_is_unavailable() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"list": []})))
        .mount(&server)
        .await;

    let lookup = provider_for(&server).forecast("London").await.unwrap();

    match lookup {
        ForecastLookup::Unavailable { status, .. } => assert_eq!(status.as_str(), ""),
        other => panic!("expected unavailable, got {other:?}"),
    }
}
