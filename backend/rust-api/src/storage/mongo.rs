use anyhow::{Context, Result};
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, Document},
    Client, Database,
};
use serde::de::DeserializeOwned;

use super::AnalyticsStore;
use crate::{
    config::Config,
    metrics::track_db_operation,
    models::{
        auth::ApiToken,
        problems::{AnswerDistribution, GradeDistribution, SequentialOpenDistribution},
    },
    utils::retry::{retry_async_with_config, RetryConfig},
};

const ANSWER_DISTRIBUTION_COLLECTION: &str = "problem_response_answer_distribution";
const GRADE_DISTRIBUTION_COLLECTION: &str = "grade_distribution";
const SEQUENTIAL_OPEN_DISTRIBUTION_COLLECTION: &str = "sequential_open_distribution";
const API_TOKENS_COLLECTION: &str = "api_tokens";

/// MongoDB-backed store. Pipeline tables are read from the analytics
/// database, API keys from the primary one.
#[derive(Clone)]
pub struct MongoStore {
    primary: Database,
    analytics: Database,
    retry: RetryConfig,
}

impl MongoStore {
    pub fn new(client: &Client, config: &Config) -> Self {
        Self {
            primary: client.database(&config.mongo_database),
            analytics: client.database(&config.analytics_database),
            retry: RetryConfig::with_attempts(config.db_retry_attempts),
        }
    }

    async fn find_sorted<T>(
        &self,
        collection: &str,
        filter: Document,
        sort: Document,
    ) -> Result<Vec<T>>
    where
        T: DeserializeOwned + Unpin + Send + Sync,
    {
        let coll = &self.analytics.collection::<T>(collection);
        let filter = &filter;
        let sort = &sort;

        retry_async_with_config(&self.retry, collection, || async move {
            track_db_operation("find", collection, async move {
                let cursor = coll
                    .find(filter.clone())
                    .sort(sort.clone())
                    .await
                    .with_context(|| format!("Failed to query {}", collection))?;

                cursor
                    .try_collect()
                    .await
                    .with_context(|| format!("Failed to read {} cursor", collection))
            })
            .await
        })
        .await
    }
}

#[async_trait::async_trait]
impl AnalyticsStore for MongoStore {
    async fn answer_distribution(&self, module_id: &str) -> Result<Vec<AnswerDistribution>> {
        self.find_sorted(
            ANSWER_DISTRIBUTION_COLLECTION,
            doc! { "module_id": module_id },
            doc! { "part_id": 1, "_id": 1 },
        )
        .await
    }

    async fn answer_distribution_for_problems(
        &self,
        module_ids: &[String],
    ) -> Result<Vec<AnswerDistribution>> {
        self.find_sorted(
            ANSWER_DISTRIBUTION_COLLECTION,
            doc! { "module_id": { "$in": module_ids.to_vec() } },
            doc! { "module_id": 1, "_id": 1 },
        )
        .await
    }

    async fn grade_distribution(&self, module_id: &str) -> Result<Vec<GradeDistribution>> {
        self.find_sorted(
            GRADE_DISTRIBUTION_COLLECTION,
            doc! { "module_id": module_id },
            doc! { "grade": 1, "_id": 1 },
        )
        .await
    }

    async fn sequential_open_distribution(
        &self,
        module_id: &str,
    ) -> Result<Vec<SequentialOpenDistribution>> {
        self.find_sorted(
            SEQUENTIAL_OPEN_DISTRIBUTION_COLLECTION,
            doc! { "module_id": module_id },
            doc! { "_id": 1 },
        )
        .await
    }

    async fn find_token(&self, key: &str) -> Result<Option<ApiToken>> {
        let coll = &self.primary.collection::<ApiToken>(API_TOKENS_COLLECTION);

        retry_async_with_config(&self.retry, API_TOKENS_COLLECTION, || async move {
            track_db_operation("find_one", API_TOKENS_COLLECTION, async move {
                coll.find_one(doc! { "key": key })
                    .await
                    .context("Failed to look up API token")
            })
            .await
        })
        .await
    }

    async fn ping(&self) -> Result<()> {
        for database in [&self.primary, &self.analytics] {
            database
                .run_command(doc! { "ping": 1 })
                .await
                .with_context(|| format!("Ping to database {} failed", database.name()))?;
        }
        Ok(())
    }
}
