use std::sync::Arc;

use crate::config::Config;
use crate::storage::{AnalyticsStore, MongoStore};

pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn AnalyticsStore>,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn AnalyticsStore>) -> Self {
        Self { config, store }
    }

    /// Connects to MongoDB and verifies the connection before serving.
    pub async fn connect(config: Config) -> anyhow::Result<Self> {
        let mongo_client = mongodb::Client::with_uri_str(&config.mongo_uri).await?;
        let store = MongoStore::new(&mongo_client, &config);

        tracing::info!(
            "Connecting to MongoDB (primary: {}, analytics: {})...",
            config.mongo_database,
            config.analytics_database
        );

        tokio::time::timeout(std::time::Duration::from_secs(30), store.ping())
            .await
            .map_err(|_| anyhow::anyhow!("MongoDB ping timeout after 30s"))??;

        tracing::info!("MongoDB connection established successfully");

        Ok(Self::new(config, Arc::new(store)))
    }
}

pub mod consolidation;
pub mod problem_service;
