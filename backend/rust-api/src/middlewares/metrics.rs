use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use std::time::Instant;

use crate::handlers::problems::{parse_problem_resource, ProblemResource};
use crate::metrics::{HTTP_REQUESTS_TOTAL, HTTP_REQUEST_DURATION_SECONDS};

const PROBLEMS_ROUTE: &str = "/api/v0/problems/{*resource}";
const PROBLEMS_PREFIX: &str = "/api/v0/problems/";
const UNMATCHED_ROUTE: &str = "{unmatched}";

/// Records request count and latency per route label.
pub async fn metrics_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().to_string();
    let path = route_label(
        req.extensions().get::<MatchedPath>().map(MatchedPath::as_str),
        req.uri().path(),
    );

    let response = next.run(req).await;

    let duration = start.elapsed().as_secs_f64();
    let status = response.status().as_u16().to_string();

    HTTP_REQUESTS_TOTAL
        .with_label_values(&[&method, &path, &status])
        .inc();

    HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&[&method, &path])
        .observe(duration);

    response
}

/// Label for a request: the matched route template, with problem resources
/// collapsed to their endpoint. Requests outside every route share one label.
fn route_label(matched: Option<&str>, path: &str) -> String {
    match matched {
        Some(PROBLEMS_ROUTE) => problem_label(path),
        Some(route) => route.to_string(),
        None => UNMATCHED_ROUTE.to_string(),
    }
}

fn problem_label(path: &str) -> String {
    let resource = path
        .strip_prefix(PROBLEMS_PREFIX)
        .and_then(parse_problem_resource);

    let suffix = match resource {
        Some(ProblemResource::SubmissionCounts) => "submission_counts",
        Some(ProblemResource::AnswerDistribution(_)) => "{problem_id}/answer_distribution",
        Some(ProblemResource::GradeDistribution(_)) => "{problem_id}/grade_distribution",
        Some(ProblemResource::SequentialOpenDistribution(_)) => {
            "{problem_id}/sequential_open_distribution"
        }
        None => "{unknown}",
    };

    format!("{}{}", PROBLEMS_PREFIX, suffix)
}
