use super::common::*;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use std::sync::Arc;
use tower::ServiceExt;

use crate::analytics::snapshot::PortfolioStore;
use crate::analytics::{analytics_router, SessionAuthenticator};
use crate::config::AuthConfig;

fn router<S: PortfolioStore + 'static>(store: S) -> Router {
    analytics_router(Arc::new(service(store)), SessionAuthenticator::default())
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::AUTHORIZATION, "Bearer analyst-7")
        .body(Body::empty())
        .expect("request")
}

#[tokio::test]
async fn missing_bearer_is_unauthorized() {
    let request = Request::builder()
        .uri("/api/v1/reports/occupancy-stats")
        .body(Body::empty())
        .expect("request");

    let response = router(ranking_store())
        .oneshot(request)
        .await
        .expect("response");
    let (status, body) = json_body(response).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Unauthorized");
}

#[tokio::test]
async fn unauthorized_wins_over_malformed_parameters() {
    let request = Request::builder()
        .uri("/api/v1/reports/opportunity-loss?start_date=yesterday")
        .body(Body::empty())
        .expect("request");

    let response = router(gap_store()).oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn wrong_configured_token_is_unauthorized() {
    let authenticator = SessionAuthenticator::new(&AuthConfig {
        api_token: Some("s3cret".to_string()),
    });
    let app = analytics_router(Arc::new(service(gap_store())), authenticator);

    let response = app
        .oneshot(get("/api/v1/reports/occupancy"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn occupancy_report_is_wrapped_in_the_envelope() {
    let response = router(gap_store())
        .oneshot(get(
            "/api/v1/reports/occupancy?start_date=2025-01-01&end_date=2025-01-31",
        ))
        .await
        .expect("response");
    let (status, body) = json_body(response).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"][0]["property_name"], "Harbor Point");
    assert_eq!(body["data"][0]["vacancy_method"], "latest_terminal_lease");
    assert_eq!(body["data"][0]["units"][0]["vacant_days"], 20);
    assert!(body.get("error").is_none());
}

#[tokio::test]
async fn opportunity_loss_reconstructs_the_gap() {
    let response = router(gap_store())
        .oneshot(get(
            "/api/v1/reports/opportunity-loss?start_date=2025-01-01T00:00:00Z&end_date=2025-01-31",
        ))
        .await
        .expect("response");
    let (status, body) = json_body(response).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["total_vacant_days"], 9);
    assert_eq!(body["data"][0]["period"]["total_days"], 30);
}

#[tokio::test]
async fn opportunity_loss_requires_a_window() {
    let response = router(gap_store())
        .oneshot(get("/api/v1/reports/opportunity-loss?start_date=2025-01-01"))
        .await
        .expect("response");
    let (status, body) = json_body(response).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"],
        "Both start_date and end_date are required for a report window"
    );
}

#[tokio::test]
async fn malformed_parameters_are_bad_requests() {
    let app = router(ranking_store());

    let response = app
        .clone()
        .oneshot(get("/api/v1/reports/occupancy?property_type=castle"))
        .await
        .expect("response");
    let (status, body) = json_body(response).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid property_type: 'castle'");

    let response = app
        .oneshot(get(
            "/api/v1/reports/property-performance?start_date=2025-01-01&end_date=soon",
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn performance_report_lists_properties_by_name() {
    let response = router(ranking_store())
        .oneshot(get("/api/v1/reports/property-performance"))
        .await
        .expect("response");
    let (status, body) = json_body(response).await;

    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body["data"]
        .as_array()
        .expect("array")
        .iter()
        .filter_map(|record| record["property_name"].as_str())
        .collect();
    assert_eq!(names, ["Alder Court", "Birch House", "Cedar Plaza"]);
    assert_eq!(body["data"][1]["occupancy_rank"], 1);
}

#[tokio::test]
async fn store_failure_is_an_internal_error() {
    let response = router(UnavailableStore)
        .oneshot(get("/api/v1/reports/occupancy-stats"))
        .await
        .expect("response");
    let (status, body) = json_body(response).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Failed to fetch occupancy statistics");
}
