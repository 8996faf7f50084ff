use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use super::ApiError;
use crate::services::{problem_service::ProblemService, AppState};

const SUBMISSION_COUNTS: &str = "submission_counts";
const ANSWER_DISTRIBUTION: &str = "answer_distribution";
const GRADE_DISTRIBUTION: &str = "grade_distribution";
const SEQUENTIAL_OPEN_DISTRIBUTION: &str = "sequential_open_distribution";

/// Resource addressed below `/api/v0/problems/`. Problem ids are opaque and
/// routinely contain slashes (`i4x://org/num/run/problem/...`), so the
/// endpoint name is taken from the last path segment.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum ProblemResource<'a> {
    SubmissionCounts,
    AnswerDistribution(&'a str),
    GradeDistribution(&'a str),
    SequentialOpenDistribution(&'a str),
}

pub(crate) fn parse_problem_resource(path: &str) -> Option<ProblemResource<'_>> {
    let path = path.strip_suffix('/').unwrap_or(path);
    if path == SUBMISSION_COUNTS {
        return Some(ProblemResource::SubmissionCounts);
    }

    let (id, endpoint) = path.rsplit_once('/')?;
    if id.is_empty() {
        return None;
    }

    match endpoint {
        ANSWER_DISTRIBUTION => Some(ProblemResource::AnswerDistribution(id)),
        GRADE_DISTRIBUTION => Some(ProblemResource::GradeDistribution(id)),
        SEQUENTIAL_OPEN_DISTRIBUTION => Some(ProblemResource::SequentialOpenDistribution(id)),
        _ => None,
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ProblemQuery {
    consolidate: Option<String>,
    problem_ids: Option<String>,
}

/// Any non-empty value enables the flag, `consolidate=false` included.
fn is_flag_set(value: Option<&str>) -> bool {
    value.is_some_and(|v| !v.is_empty())
}

fn parse_problem_ids(value: Option<&str>) -> Vec<String> {
    value
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect()
}

fn non_empty<T: Serialize>(rows: Vec<T>, message: String) -> Result<Response, ApiError> {
    if rows.is_empty() {
        return Err(ApiError::not_found(message));
    }
    Ok(Json(rows).into_response())
}

pub(crate) async fn problem_resource(
    State(state): State<Arc<AppState>>,
    Path(resource): Path<String>,
    Query(query): Query<ProblemQuery>,
) -> Result<Response, ApiError> {
    let resource =
        parse_problem_resource(&resource).ok_or_else(|| ApiError::not_found("Not found."))?;
    let service = ProblemService::new(state.store.clone());

    match resource {
        ProblemResource::SubmissionCounts => {
            let problem_ids = parse_problem_ids(query.problem_ids.as_deref());
            if problem_ids.is_empty() {
                return Err(ApiError::not_acceptable(
                    "The problem_ids parameter is required.",
                ));
            }

            let counts = service.submission_counts(&problem_ids).await?;
            non_empty(
                counts,
                format!("No submissions found for problems {}", problem_ids.join(",")),
            )
        }
        ProblemResource::AnswerDistribution(problem_id) => {
            let consolidate = is_flag_set(query.consolidate.as_deref());
            let rows = service
                .answer_distribution(problem_id, consolidate)
                .await?;
            non_empty(
                rows,
                format!("No answer distribution found for problem {}", problem_id),
            )
        }
        ProblemResource::GradeDistribution(problem_id) => {
            let rows = service.grade_distribution(problem_id).await?;
            non_empty(
                rows,
                format!("No grade distribution found for problem {}", problem_id),
            )
        }
        ProblemResource::SequentialOpenDistribution(module_id) => {
            let rows = service.sequential_open_distribution(module_id).await?;
            non_empty(
                rows,
                format!("No sequential open distribution found for module {}", module_id),
            )
        }
    }
}
