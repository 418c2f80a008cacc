// API Integration Tests
//
// Purpose: exercise every endpoint against an in-memory seeded database
// Run with: cargo test --features server --test api_tests

#![cfg(feature = "server")]

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use carbon_footprint::{create_router, AppConfig, AppState, FootprintService, SqliteRepository};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt; // for oneshot

// Helper: app backed by the embedded seed data
fn create_test_app() -> Router {
    let repo = Arc::new(SqliteRepository::in_memory().expect("in-memory database"));
    let service = FootprintService::new(repo, AppConfig::default());
    create_router(AppState::new(service), None)
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    (status, json_body(response).await)
}

async fn post_json(app: Router, uri: &str, body: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    (status, json_body(response).await)
}

async fn json_body(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read response body");
    serde_json::from_slice(&body).unwrap_or(Value::Null)
}

// =========================================================================
// Reference data
// =========================================================================

#[tokio::test]
async fn test_health_check() {
    let (status, body) = get(create_test_app(), "/api/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"], "OK");
}

#[tokio::test]
async fn test_list_countries() {
    let (status, body) = get(create_test_app(), "/api/countries").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let countries = body["countries"].as_array().unwrap();
    assert!(countries.len() >= 20);
    for field in ["code", "name", "co2_intensity", "region"] {
        assert!(!countries[0][field].is_null(), "missing {}", field);
    }
}

#[tokio::test]
async fn test_country_intensity_found() {
    let (status, body) = get(create_test_app(), "/api/country-intensity/FR").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["code"], "FR");
    assert_eq!(body["name"], "France");
    assert!(body["co2_intensity"].as_f64().unwrap() > 0.0);
}

#[tokio::test]
async fn test_country_intensity_not_found() {
    let (status, body) = get(create_test_app(), "/api/country-intensity/ZZ").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "not found");
}

#[tokio::test]
async fn test_statistics() {
    let (status, body) = get(create_test_app(), "/api/statistics").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["most_polluting"].as_array().unwrap().len(), 10);
    assert_eq!(body["cleanest"].as_array().unwrap().len(), 10);
    assert!(!body["regions"].as_array().unwrap().is_empty());
    assert!(!body["energy_sources"].as_array().unwrap().is_empty());

    let top = body["most_polluting"][0]["co2_intensity"].as_f64().unwrap();
    let clean = body["cleanest"][0]["co2_intensity"].as_f64().unwrap();
    assert!(top > clean);
}

#[tokio::test]
async fn test_emission_factors() {
    let (status, body) = get(create_test_app(), "/api/emission-factors").await;

    assert_eq!(status, StatusCode::OK);
    let factors = body["factors"].as_array().unwrap();
    assert!(factors.iter().any(|f| f["activity"] == "domestic flight"));
}

// =========================================================================
// Calculation
// =========================================================================

#[tokio::test]
async fn test_calculate() {
    let (status, body) = post_json(
        create_test_app(),
        "/api/calculate",
        r#"{"country_code": "FR", "car_km": 100, "meat_kg": 2}"#,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["country_code"], "FR");
    assert!(body["timestamp"].is_string());

    let results = &body["results"];
    assert!((results["transport"]["car"].as_f64().unwrap() - 21.0).abs() < 1e-9);
    assert!((results["food"]["meat"].as_f64().unwrap() - 54.0).abs() < 1e-9);
    assert_eq!(results["totals"]["monthly"], 75.0);
    assert_eq!(results["totals"]["annual"], 900.0);
    assert!(results["totals"]["cars_km"].is_number());
    assert!(results["totals"]["vs_global"].is_number());
}

#[tokio::test]
async fn test_calculate_all_zero() {
    let (status, body) = post_json(create_test_app(), "/api/calculate", r#"{"country_code": "DE"}"#).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["results"]["totals"]["monthly"], 0.0);
    assert_eq!(body["results"]["totals"]["annual"], 0.0);
    assert_eq!(body["results"]["totals"]["vs_global"], -100.0);
}

#[tokio::test]
async fn test_calculate_unknown_country() {
    let (status, body) = post_json(
        create_test_app(),
        "/api/calculate",
        r#"{"country_code": "ZZ", "car_km": 100}"#,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body.get("results").is_none());
}

#[tokio::test]
async fn test_calculate_malformed_body() {
    let (status, body) = post_json(create_test_app(), "/api/calculate", "{not json").await;

    assert!(status.is_client_error());
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_calculate_missing_content_type() {
    let response = create_test_app()
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/api/calculate")
                .body(Body::from(r#"{"country_code": "FR", "car_km": 100}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["success"], false);
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn test_calculate_wrong_type() {
    let (status, body) = post_json(
        create_test_app(),
        "/api/calculate",
        r#"{"country_code": "FR", "car_km": "lots"}"#,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

// =========================================================================
// Recommendations
// =========================================================================

#[tokio::test]
async fn test_recommendations_order() {
    let request = json!({
        "results": {
            "transport": {"total": 60.0},
            "food": {"total": 35.0},
            "habitat": {"total": 45.0}
        }
    });
    let (status, body) = post_json(create_test_app(), "/api/recommendations", &request.to_string()).await;

    assert_eq!(status, StatusCode::OK);
    let recs = body["recommendations"].as_array().unwrap();
    let areas: Vec<&str> = recs.iter().map(|r| r["area"].as_str().unwrap()).collect();
    assert_eq!(areas, vec!["transport", "food", "housing"]);
    assert_eq!(recs[0]["priority"], "high");
}

#[tokio::test]
async fn test_recommendations_fallback() {
    let (status, body) = post_json(create_test_app(), "/api/recommendations", "{}").await;

    assert_eq!(status, StatusCode::OK);
    let recs = body["recommendations"].as_array().unwrap();
    assert_eq!(recs.len(), 1);
    assert_eq!(recs[0]["priority"], "low");
}

#[tokio::test]
async fn test_recommendations_malformed_body() {
    let (status, body) = post_json(create_test_app(), "/api/recommendations", "{\"results\": [").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body.get("recommendations").is_none());
}

#[tokio::test]
async fn test_calculate_then_recommend() {
    let (_, calc) = post_json(
        create_test_app(),
        "/api/calculate",
        r#"{"country_code": "PL", "car_km": 400, "heating_kwh": 300}"#,
    )
    .await;

    let request = json!({ "results": calc["results"] });
    let (status, body) = post_json(create_test_app(), "/api/recommendations", &request.to_string()).await;

    assert_eq!(status, StatusCode::OK);
    let recs = body["recommendations"].as_array().unwrap();
    assert_eq!(recs[0]["area"], "transport");
    assert!(recs.iter().any(|r| r["area"] == "housing"));
}

// =========================================================================
// Landing page
// =========================================================================

#[tokio::test]
async fn test_index_lists_countries() {
    let response = create_test_app()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let html = String::from_utf8(body.to_vec()).unwrap();

    assert!(html.contains("<option value=\"FR\""));
    assert!(html.contains("Germany"));
}
