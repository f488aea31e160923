//! Integration tests for OpenWeatherSource using wiremock.
//!
//! These tests verify request shape and error mapping against a mock HTTP server.

use std::{sync::Arc, time::Duration};

use forecast_core::{
    LocationQuery, OpenWeatherSource, SourceError, ViewState, WeatherOrchestrator, WeatherSource,
};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn source(server: &MockServer) -> OpenWeatherSource {
    OpenWeatherSource::builder("TEST_KEY".to_string())
        .base_url(server.uri())
        .timeout(Duration::from_millis(500))
        .build()
        .unwrap()
}

fn current_body() -> serde_json::Value {
    serde_json::json!({
        "coord": { "lon": 69.39, "lat": 53.28 },
        "weather": [{ "id": 600, "main": "Snow", "description": "light snow", "icon": "13d" }],
        "main": { "temp": -5.2, "feels_like": -9.8, "temp_min": -6.1, "temp_max": -4.3, "humidity": 86 },
        "wind": { "speed": 4.1 },
        "name": "Kokshetau",
        "dt": 1704100000
    })
}

/// 40 three-hourly entries starting at midnight, five of them at noon.
fn forecast_body() -> serde_json::Value {
    let list: Vec<_> = (0..40i32)
        .map(|i| {
            let day = i / 8 + 1;
            let hour = (i % 8) * 3;
            serde_json::json!({
                "dt": 1704067200 + i * 10800,
                "dt_txt": format!("2024-01-0{day} {hour:02}:00:00"),
                "main": { "temp": -7.0 + f64::from(i) * 0.1, "feels_like": -10.0, "temp_min": -8.0, "temp_max": -6.0, "humidity": 80 },
                "weather": [{ "id": 600, "main": "Snow", "description": "light snow", "icon": "13d" }]
            })
        })
        .collect();

    serde_json::json!({
        "list": list,
        "city": { "name": "Kokshetau", "country": "KZ" }
    })
}

#[tokio::test]
async fn test_fetch_current_by_coordinates() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("lat", "53.28"))
        .and(query_param("lon", "69.39"))
        .and(query_param("appid", "TEST_KEY"))
        .and(query_param("units", "metric"))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_body()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let query = LocationQuery::coordinates(53.28, 69.39).unwrap();
    let current = source(&mock_server).fetch_current(&query).await.unwrap();

    assert_eq!(current.location_label, "Kokshetau");
    assert_eq!(current.observed_at_epoch_seconds, 1704100000);
    assert_eq!(current.temperature_c, -5.2);
    assert_eq!(current.feels_like_c, -9.8);
    assert_eq!(current.humidity_percent, 86);
    assert_eq!(current.wind_speed_ms, 4.1);
    assert_eq!(current.condition_summary, "Snow");
    assert_eq!(current.condition_icon_id, "13d");
}

#[tokio::test]
async fn test_fetch_forecast_by_city() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/forecast"))
        .and(query_param("q", "Kokshetau"))
        .and(query_param("appid", "TEST_KEY"))
        .and(query_param("units", "metric"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let query = LocationQuery::city("Kokshetau").unwrap();
    let series = source(&mock_server).fetch_forecast(&query).await.unwrap();

    assert_eq!(series.location_label, "Kokshetau");
    assert_eq!(series.country_code, "KZ");
    assert_eq!(series.len(), 40);
    assert_eq!(series.samples[0].timestamp_text, "2024-01-01 00:00:00");
    assert_eq!(series.samples[4].timestamp_text, "2024-01-01 12:00:00");
}

#[tokio::test]
async fn test_unknown_city_maps_to_upstream_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_json(serde_json::json!({ "cod": "404", "message": "city not found" })),
        )
        .mount(&mock_server)
        .await;

    let query = LocationQuery::city("Atlantis").unwrap();
    let err = source(&mock_server).fetch_current(&query).await.unwrap_err();

    match err {
        SourceError::Upstream { status, message } => {
            assert_eq!(status, 404);
            assert_eq!(message, "city not found");
        }
        other => panic!("expected upstream error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_non_json_error_body_is_kept() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/forecast"))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
        .mount(&mock_server)
        .await;

    let query = LocationQuery::city("Paris").unwrap();
    let err = source(&mock_server).fetch_forecast(&query).await.unwrap_err();

    assert!(matches!(
        err,
        SourceError::Upstream { status: 502, ref message } if message == "Bad Gateway"
    ));
}

#[tokio::test]
async fn test_malformed_payload_maps_to_decode_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "name": "Paris" })),
        )
        .mount(&mock_server)
        .await;

    let query = LocationQuery::city("Paris").unwrap();
    let err = source(&mock_server).fetch_current(&query).await.unwrap_err();

    assert!(matches!(err, SourceError::Decode(_)));
}

#[tokio::test]
async fn test_slow_upstream_maps_to_network_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(current_body())
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&mock_server)
        .await;

    let query = LocationQuery::city("Kokshetau").unwrap();
    let err = source(&mock_server).fetch_current(&query).await.unwrap_err();

    assert!(matches!(err, SourceError::Network(_)));
}

#[tokio::test]
async fn test_orchestrator_end_to_end() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_body()))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body()))
        .mount(&mock_server)
        .await;

    let orchestrator = WeatherOrchestrator::new(Arc::new(source(&mock_server)));
    orchestrator.request_by_location(53.28, 69.39).await.unwrap();

    match orchestrator.state() {
        ViewState::Success { current, forecast } => {
            assert_eq!(current.location_label, "Kokshetau");
            assert_eq!(current.temperature_c, -5.2);
            assert_eq!(forecast.len(), 5);
            let dates: Vec<_> = forecast.samples.iter().map(|s| &s.timestamp_text[..10]).collect();
            assert_eq!(
                dates,
                ["2024-01-01", "2024-01-02", "2024-01-03", "2024-01-04", "2024-01-05"]
            );
        }
        other => panic!("expected success, got {other:?}"),
    }
}

#[tokio::test]
async fn test_orchestrator_forecast_failure_is_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_body()))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/forecast"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_json(serde_json::json!({ "cod": "404", "message": "city not found" })),
        )
        .mount(&mock_server)
        .await;

    let orchestrator = WeatherOrchestrator::new(Arc::new(source(&mock_server)));

    orchestrator.request_by_location(53.28, 69.39).await.unwrap();
    assert_eq!(
        orchestrator.state(),
        ViewState::Error { message: "Failed to load weather: city not found (status 404)".into() }
    );

    orchestrator.request_by_city("Kokshetau").await.unwrap();
    assert_eq!(
        orchestrator.state(),
        ViewState::Error { message: "City not found or network error.".into() }
    );
}
