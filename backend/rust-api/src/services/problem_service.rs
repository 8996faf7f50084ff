use std::sync::Arc;

use anyhow::Result;

use super::consolidation::consolidate_problem;
use crate::{
    metrics::ANSWER_ROWS_CONSOLIDATED_TOTAL,
    models::problems::{
        AnswerDistribution, AnswerDistributionResponse, GradeDistributionResponse,
        ProblemSubmissionCount, SequentialOpenDistributionResponse,
    },
    storage::AnalyticsStore,
};

pub struct ProblemService {
    store: Arc<dyn AnalyticsStore>,
}

impl ProblemService {
    pub fn new(store: Arc<dyn AnalyticsStore>) -> Self {
        Self { store }
    }

    /// Answer distribution of one problem, optionally with randomized variants
    /// of the same answer merged per part.
    pub async fn answer_distribution(
        &self,
        problem_id: &str,
        consolidate: bool,
    ) -> Result<Vec<AnswerDistributionResponse>> {
        let rows = self.store.answer_distribution(problem_id).await?;

        if !consolidate {
            return Ok(rows.into_iter().map(Into::into).collect());
        }

        let row_count = rows.len();
        let consolidated = consolidate_problem(rows);
        let merged = row_count - consolidated.len();
        if merged > 0 {
            ANSWER_ROWS_CONSOLIDATED_TOTAL.inc_by(merged as u64);
        }
        tracing::debug!(
            "Consolidated answer distribution for {}: {} rows -> {}",
            problem_id,
            row_count,
            consolidated.len()
        );

        Ok(consolidated.into_iter().map(Into::into).collect())
    }

    pub async fn submission_counts(
        &self,
        problem_ids: &[String],
    ) -> Result<Vec<ProblemSubmissionCount>> {
        let rows = self
            .store
            .answer_distribution_for_problems(problem_ids)
            .await?;
        Ok(summarize_submissions(&rows))
    }

    pub async fn grade_distribution(
        &self,
        problem_id: &str,
    ) -> Result<Vec<GradeDistributionResponse>> {
        let rows = self.store.grade_distribution(problem_id).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn sequential_open_distribution(
        &self,
        module_id: &str,
    ) -> Result<Vec<SequentialOpenDistributionResponse>> {
        let rows = self.store.sequential_open_distribution(module_id).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }
}

/// Total and correct submission counts per problem. Rows must be ordered by
/// module id; one entry is produced per contiguous run.
pub fn summarize_submissions(rows: &[AnswerDistribution]) -> Vec<ProblemSubmissionCount> {
    let mut summaries: Vec<ProblemSubmissionCount> = Vec::new();

    for row in rows {
        if summaries
            .last()
            .map_or(true, |last| last.module_id != row.module_id)
        {
            summaries.push(ProblemSubmissionCount {
                module_id: row.module_id.clone(),
                total: 0,
                correct: 0,
            });
        }

        if let Some(summary) = summaries.last_mut() {
            summary.total = summary.total.saturating_add(row.count);
            if row.correct {
                summary.correct = summary.correct.saturating_add(row.count);
            }
        }
    }

    summaries
}
