use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::time::{bson_datetime, format_api_datetime};

/// One row of the answer distribution table: how many submissions to one part
/// of a problem produced one distinct answer value.
///
/// Rows are written by the data pipeline; this service never modifies them in
/// storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerDistribution {
    pub course_id: String,
    pub module_id: String,
    pub part_id: String,
    pub correct: bool,
    pub count: i64,
    pub value_id: String,
    #[serde(default)]
    pub answer_value_text: Option<String>,
    #[serde(default)]
    pub answer_value_numeric: Option<f64>,
    #[serde(default)]
    pub problem_display_name: Option<String>,
    #[serde(default)]
    pub question_text: Option<String>,
    /// Random seed of the problem instance that produced this row. Absent for
    /// problems without randomization.
    #[serde(default)]
    pub variant: Option<i32>,
    #[serde(with = "bson_datetime")]
    pub created: DateTime<Utc>,
}

impl AnswerDistribution {
    /// Whether two rows describe the same logical answer. Variant and count
    /// do not take part: rows differing only in those are split copies of one
    /// answer.
    pub fn matches(&self, other: &AnswerDistribution) -> bool {
        self.question_text == other.question_text
            && self.answer_value_text == other.answer_value_text
            && self.answer_value_numeric == other.answer_value_numeric
            && self.problem_display_name == other.problem_display_name
            && self.correct == other.correct
            && self.value_id == other.value_id
    }
}

/// An answer distribution row after variant consolidation.
#[derive(Debug, Clone, PartialEq)]
pub struct ConsolidatedAnswer {
    pub answer: AnswerDistribution,
    /// Set once this row has absorbed at least one equivalent row.
    pub consolidated_variant: bool,
}

impl ConsolidatedAnswer {
    pub fn new(answer: AnswerDistribution) -> Self {
        Self {
            answer,
            consolidated_variant: false,
        }
    }

    /// Folds an equivalent row into this one. The merged count saturates at
    /// `i64::MAX` instead of wrapping.
    pub fn absorb(&mut self, other: AnswerDistribution) {
        self.answer.count = self.answer.count.saturating_add(other.count);
        self.answer.variant = None;
        self.consolidated_variant = true;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeDistribution {
    pub module_id: String,
    pub course_id: String,
    pub grade: i64,
    pub max_grade: i64,
    pub count: i64,
    #[serde(with = "bson_datetime")]
    pub created: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequentialOpenDistribution {
    pub module_id: String,
    pub course_id: String,
    pub count: i64,
    #[serde(with = "bson_datetime")]
    pub created: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProblemSubmissionCount {
    pub module_id: String,
    pub total: i64,
    pub correct: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnswerDistributionResponse {
    pub course_id: String,
    pub module_id: String,
    pub part_id: String,
    pub correct: bool,
    pub count: i64,
    pub value_id: String,
    pub answer_value_text: Option<String>,
    pub answer_value_numeric: Option<f64>,
    pub problem_display_name: Option<String>,
    pub question_text: Option<String>,
    pub variant: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consolidated_variant: Option<bool>,
    pub created: String,
}

impl From<AnswerDistribution> for AnswerDistributionResponse {
    fn from(answer: AnswerDistribution) -> Self {
        Self {
            created: format_api_datetime(&answer.created),
            course_id: answer.course_id,
            module_id: answer.module_id,
            part_id: answer.part_id,
            correct: answer.correct,
            count: answer.count,
            value_id: answer.value_id,
            answer_value_text: answer.answer_value_text,
            answer_value_numeric: answer.answer_value_numeric,
            problem_display_name: answer.problem_display_name,
            question_text: answer.question_text,
            variant: answer.variant,
            consolidated_variant: None,
        }
    }
}

impl From<ConsolidatedAnswer> for AnswerDistributionResponse {
    fn from(consolidated: ConsolidatedAnswer) -> Self {
        let mut response = AnswerDistributionResponse::from(consolidated.answer);
        response.consolidated_variant = Some(consolidated.consolidated_variant);
        response
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GradeDistributionResponse {
    pub module_id: String,
    pub course_id: String,
    pub grade: i64,
    pub max_grade: i64,
    pub count: i64,
    pub created: String,
}

impl From<GradeDistribution> for GradeDistributionResponse {
    fn from(row: GradeDistribution) -> Self {
        Self {
            created: format_api_datetime(&row.created),
            module_id: row.module_id,
            course_id: row.course_id,
            grade: row.grade,
            max_grade: row.max_grade,
            count: row.count,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SequentialOpenDistributionResponse {
    pub module_id: String,
    pub course_id: String,
    pub count: i64,
    pub created: String,
}

impl From<SequentialOpenDistribution> for SequentialOpenDistributionResponse {
    fn from(row: SequentialOpenDistribution) -> Self {
        Self {
            created: format_api_datetime(&row.created),
            module_id: row.module_id,
            course_id: row.course_id,
            count: row.count,
        }
    }
}
