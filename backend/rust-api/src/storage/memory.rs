use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{bail, Result};

use super::AnalyticsStore;
use crate::models::{
    auth::ApiToken,
    problems::{AnswerDistribution, GradeDistribution, SequentialOpenDistribution},
};

/// Fixture-backed store for tests and local runs without MongoDB.
///
/// Queries return rows in the same order `MongoStore` does: stable sorts keep
/// insertion order among ties.
#[derive(Debug, Default)]
pub struct MemoryStore {
    answers: Vec<AnswerDistribution>,
    grades: Vec<GradeDistribution>,
    sequential_opens: Vec<SequentialOpenDistribution>,
    tokens: Vec<ApiToken>,
    unavailable: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_answers(mut self, rows: impl IntoIterator<Item = AnswerDistribution>) -> Self {
        self.answers.extend(rows);
        self
    }

    pub fn with_grades(mut self, rows: impl IntoIterator<Item = GradeDistribution>) -> Self {
        self.grades.extend(rows);
        self
    }

    pub fn with_sequential_opens(
        mut self,
        rows: impl IntoIterator<Item = SequentialOpenDistribution>,
    ) -> Self {
        self.sequential_opens.extend(rows);
        self
    }

    pub fn with_token(mut self, token: ApiToken) -> Self {
        self.tokens.push(token);
        self
    }

    /// Makes every subsequent query fail, as a lost database connection would.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            bail!("In-memory store marked unavailable");
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl AnalyticsStore for MemoryStore {
    async fn answer_distribution(&self, module_id: &str) -> Result<Vec<AnswerDistribution>> {
        self.check_available()?;
        let mut rows: Vec<_> = self
            .answers
            .iter()
            .filter(|row| row.module_id == module_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.part_id.cmp(&b.part_id));
        Ok(rows)
    }

    async fn answer_distribution_for_problems(
        &self,
        module_ids: &[String],
    ) -> Result<Vec<AnswerDistribution>> {
        self.check_available()?;
        let mut rows: Vec<_> = self
            .answers
            .iter()
            .filter(|row| module_ids.contains(&row.module_id))
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.module_id.cmp(&b.module_id));
        Ok(rows)
    }

    async fn grade_distribution(&self, module_id: &str) -> Result<Vec<GradeDistribution>> {
        self.check_available()?;
        let mut rows: Vec<_> = self
            .grades
            .iter()
            .filter(|row| row.module_id == module_id)
            .cloned()
            .collect();
        rows.sort_by_key(|row| row.grade);
        Ok(rows)
    }

    async fn sequential_open_distribution(
        &self,
        module_id: &str,
    ) -> Result<Vec<SequentialOpenDistribution>> {
        self.check_available()?;
        Ok(self
            .sequential_opens
            .iter()
            .filter(|row| row.module_id == module_id)
            .cloned()
            .collect())
    }

    async fn find_token(&self, key: &str) -> Result<Option<ApiToken>> {
        self.check_available()?;
        Ok(self.tokens.iter().find(|token| token.key == key).cloned())
    }

    async fn ping(&self) -> Result<()> {
        self.check_available()
    }
}
