use anyhow::Result;

use crate::models::{
    auth::ApiToken,
    problems::{AnswerDistribution, GradeDistribution, SequentialOpenDistribution},
};

pub mod memory;
pub mod mongo;

pub use memory::MemoryStore;
pub use mongo::MongoStore;

/// Read access to the tables maintained by the analytics pipeline.
#[async_trait::async_trait]
pub trait AnalyticsStore: Send + Sync {
    /// All answer rows of one problem, ordered by part id.
    async fn answer_distribution(&self, module_id: &str) -> Result<Vec<AnswerDistribution>>;

    /// Answer rows of several problems, ordered by module id.
    async fn answer_distribution_for_problems(
        &self,
        module_ids: &[String],
    ) -> Result<Vec<AnswerDistribution>>;

    async fn grade_distribution(&self, module_id: &str) -> Result<Vec<GradeDistribution>>;

    async fn sequential_open_distribution(
        &self,
        module_id: &str,
    ) -> Result<Vec<SequentialOpenDistribution>>;

    async fn find_token(&self, key: &str) -> Result<Option<ApiToken>>;

    /// Round trip to the backing database.
    async fn ping(&self) -> Result<()>;
}
