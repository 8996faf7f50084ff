mod common;

use std::sync::Arc;

use axum::{
    body::to_bytes,
    http::{header, StatusCode},
};
use base64::{engine::general_purpose, Engine as _};
use tower::ServiceExt;

use common::{
    authenticated_get, create_test_app, fixture_store, get, json_body, METRICS_AUTH, MODULE_ID,
    TEST_USERNAME,
};

#[tokio::test]
async fn test_status_is_public() {
    let app = create_test_app(Arc::new(fixture_store()));

    let response = get(&app, "/status", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["status"], "OK");
}

#[tokio::test]
async fn test_health_reports_database_ok() {
    let app = create_test_app(Arc::new(fixture_store()));

    let response = get(&app, "/health", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await,
        serde_json::json!({
            "overall_status": "OK",
            "detailed_status": { "database_connection": "OK" }
        })
    );
}

#[tokio::test]
async fn test_health_reports_database_unavailable() {
    let store = Arc::new(fixture_store());
    store.set_unavailable(true);
    let app = create_test_app(store);

    let response = get(&app, "/health", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await,
        serde_json::json!({
            "overall_status": "UNAVAILABLE",
            "detailed_status": { "database_connection": "UNAVAILABLE" }
        })
    );
}

#[tokio::test]
async fn test_authentication_check_success() {
    let app = create_test_app(Arc::new(fixture_store()));

    let (status, body) = authenticated_get(&app, "/authenticated").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], TEST_USERNAME);
}

#[tokio::test]
async fn test_authentication_check_failure() {
    let app = create_test_app(Arc::new(fixture_store()));

    let response = get(&app, "/authenticated", None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
        "Token"
    );
    assert_eq!(
        json_body(response).await["detail"],
        "Authentication credentials were not provided."
    );
}

#[tokio::test]
async fn test_unknown_api_key_is_rejected() {
    let app = create_test_app(Arc::new(fixture_store()));

    let response = get(
        &app,
        &format!("/api/v0/problems/{}/answer_distribution/", MODULE_ID),
        Some("Token not-a-real-key"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(response).await["detail"], "Invalid token.");
}

#[tokio::test]
async fn test_bearer_scheme_is_not_accepted() {
    let app = create_test_app(Arc::new(fixture_store()));

    let response = get(
        &app,
        "/authenticated",
        Some(&format!("Bearer {}", common::TEST_TOKEN)),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_metrics_require_basic_auth() {
    let app = create_test_app(Arc::new(fixture_store()));

    let response = get(&app, "/metrics", None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let wrong = format!("Basic {}", general_purpose::STANDARD.encode("metrics:wrong"));
    let response = get(&app, "/metrics", Some(&wrong)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_metrics_expose_http_counters() {
    let app = create_test_app(Arc::new(fixture_store()));

    // Generate at least one recorded request
    let _ = get(&app, "/status", None).await;

    let credentials = format!("Basic {}", general_purpose::STANDARD.encode(METRICS_AUTH));
    let response = get(&app, "/metrics", Some(&credentials)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.contains("http_requests_total"));
}

#[tokio::test]
async fn test_trace_id_is_echoed_or_generated() {
    let app = create_test_app(Arc::new(fixture_store()));

    let response = app
        .clone()
        .oneshot(
            axum::http::Request::builder()
                .uri("/status")
                .header("x-trace-id", "trace-123")
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.headers().get("x-trace-id").unwrap(), "trace-123");

    let response = get(&app, "/status", None).await;
    let generated = response.headers().get("x-trace-id").unwrap().to_str().unwrap();
    assert_eq!(generated.len(), 36);
}

#[tokio::test]
async fn test_metrics_labels_do_not_grow_with_unknown_paths() {
    let app = create_test_app(Arc::new(fixture_store()));

    let response = get(&app, "/api/v0/problems/x/junk1", None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let response = get(&app, "/nope/2", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let credentials = format!("Basic {}", general_purpose::STANDARD.encode(METRICS_AUTH));
    let response = get(&app, "/metrics", Some(&credentials)).await;
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();

    assert!(!text.contains("junk1"));
    assert!(!text.contains("/nope/2"));
    assert!(text.contains("/api/v0/problems/{unknown}"));
    assert!(text.contains("{unmatched}"));
}
