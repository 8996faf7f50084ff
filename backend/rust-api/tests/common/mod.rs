#![allow(dead_code)]

use analytics_data_api::{
    config::Config,
    create_router,
    models::{
        auth::ApiToken,
        problems::{AnswerDistribution, GradeDistribution, SequentialOpenDistribution},
    },
    services::AppState,
    storage::MemoryStore,
};
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    response::Response,
    Router,
};
use chrono::{DateTime, TimeZone, Utc};
use std::sync::Arc;
use tower::ServiceExt;

pub const TEST_TOKEN: &str = "test-api-key";
pub const TEST_USERNAME: &str = "tester";
pub const METRICS_AUTH: &str = "metrics:secret";

pub const COURSE_ID: &str = "org/num/run";
pub const MODULE_ID: &str = "i4x://org/num/run/problem/RANDOMNUMBER";
pub const PART_ID: &str = "i4x-org-num-run-problem-RANDOMNUMBER_2_1";
pub const OTHER_MODULE_ID: &str = "i4x://org/num/run/problem/OTHER";
pub const SEQUENTIAL_ID: &str = "i4x://org/num/run/sequential/intro";

pub fn created() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2014, 7, 25, 16, 14, 0).unwrap()
}

pub fn test_config() -> Config {
    Config {
        mongo_uri: "mongodb://localhost:27017".to_string(),
        mongo_database: "analytics_api_test".to_string(),
        analytics_database: "analytics_api_test".to_string(),
        db_retry_attempts: 1,
        bind_address: "127.0.0.1:0".to_string(),
        metrics_auth: METRICS_AUTH.to_string(),
    }
}

/// Correct answer "3" seen under two random seeds.
pub fn randomized_answer(variant: i32, count: i64) -> AnswerDistribution {
    AnswerDistribution {
        course_id: COURSE_ID.to_string(),
        module_id: MODULE_ID.to_string(),
        part_id: PART_ID.to_string(),
        correct: true,
        count,
        value_id: "3".to_string(),
        answer_value_text: Some("3".to_string()),
        answer_value_numeric: Some(3.0),
        problem_display_name: Some("Test Problem".to_string()),
        question_text: Some("Question Text".to_string()),
        variant: Some(variant),
        created: created(),
    }
}

pub fn other_answer() -> AnswerDistribution {
    AnswerDistribution {
        correct: false,
        count: 5,
        value_id: "7".to_string(),
        answer_value_text: Some("seven".to_string()),
        answer_value_numeric: None,
        variant: None,
        ..randomized_answer(0, 0)
    }
}

pub fn fixture_store() -> MemoryStore {
    MemoryStore::new()
        .with_token(ApiToken {
            key: TEST_TOKEN.to_string(),
            username: TEST_USERNAME.to_string(),
            created: created(),
        })
        .with_answers(vec![
            randomized_answer(123, 1),
            randomized_answer(345, 2),
            other_answer(),
            AnswerDistribution {
                module_id: OTHER_MODULE_ID.to_string(),
                part_id: "i4x-org-num-run-problem-OTHER_2_1".to_string(),
                count: 4,
                ..randomized_answer(1, 4)
            },
        ])
        .with_grades(vec![
            GradeDistribution {
                module_id: MODULE_ID.to_string(),
                course_id: COURSE_ID.to_string(),
                grade: 1,
                max_grade: 1,
                count: 3,
                created: created(),
            },
            GradeDistribution {
                module_id: MODULE_ID.to_string(),
                course_id: COURSE_ID.to_string(),
                grade: 0,
                max_grade: 1,
                count: 5,
                created: created(),
            },
        ])
        .with_sequential_opens(vec![SequentialOpenDistribution {
            module_id: SEQUENTIAL_ID.to_string(),
            course_id: COURSE_ID.to_string(),
            count: 42,
            created: created(),
        }])
}

pub fn create_test_app(store: Arc<MemoryStore>) -> Router {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();

    let app_state = Arc::new(AppState::new(test_config(), store));
    create_router(app_state)
}

pub async fn get(app: &Router, uri: &str, authorization: Option<&str>) -> Response {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(value) = authorization {
        builder = builder.header("authorization", value);
    }

    app.clone()
        .oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

pub async fn authenticated_get(app: &Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let response = get(app, uri, Some(&format!("Token {}", TEST_TOKEN))).await;
    let status = response.status();
    (status, json_body(response).await)
}

pub async fn json_body(response: Response) -> serde_json::Value {
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}
