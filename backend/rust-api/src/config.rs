use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub mongo_uri: String,
    /// Database holding API keys.
    pub mongo_database: String,
    /// Database the analytics pipeline writes its tables into.
    pub analytics_database: String,
    pub db_retry_attempts: usize,
    pub bind_address: String,
    /// `user:password` pair protecting `/metrics`.
    pub metrics_auth: String,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        // Root .env first, then the crate-local one
        let skip_root_env = env::var("SKIP_ROOT_ENV").is_ok();
        if skip_root_env {
            dotenvy::dotenv().ok();
        } else if dotenvy::from_path("../../.env").is_err() {
            dotenvy::dotenv().ok();
        }

        let env = env::var("APP_ENV").unwrap_or_else(|_| "dev".to_string());

        // Build configuration from config/*.toml + ENV overrides
        let settings = config::Config::builder()
            .add_source(config::File::with_name(&format!("config/{}", env)).required(false))
            .add_source(config::Environment::with_prefix("APP").separator("__"))
            .build()?;

        Self::from_settings(&settings, &env)
    }

    fn from_settings(settings: &config::Config, env: &str) -> Result<Self, config::ConfigError> {
        let mongo_uri = settings
            .get_string("database.mongo_uri")
            .or_else(|_| env::var("MONGO_URI"))
            .unwrap_or_else(|_| "mongodb://localhost:27017".to_string());

        let mongo_database = settings
            .get_string("database.mongo_database")
            .or_else(|_| env::var("MONGO_DATABASE"))
            .unwrap_or_else(|_| "analytics_api".to_string());

        // Pipeline tables default to the primary database
        let analytics_database = settings
            .get_string("database.analytics_database")
            .or_else(|_| env::var("ANALYTICS_DATABASE"))
            .unwrap_or_else(|_| mongo_database.clone());

        let db_retry_attempts = match settings.get_int("database.retry_attempts") {
            Ok(value) if value >= 1 => value as usize,
            Ok(value) => {
                return Err(config::ConfigError::Message(format!(
                    "database.retry_attempts must be at least 1, got {}",
                    value
                )))
            }
            Err(_) => 3,
        };

        let bind_address = settings
            .get_string("server.bind_address")
            .or_else(|_| env::var("BIND_ADDRESS"))
            .unwrap_or_else(|_| "0.0.0.0:8100".to_string());

        let metrics_auth = match settings
            .get_string("metrics.auth")
            .or_else(|_| env::var("METRICS_AUTH"))
        {
            Ok(value) => value,
            Err(_) if env == "prod" => {
                return Err(config::ConfigError::NotFound(
                    "metrics.auth must be set in production".to_string(),
                ))
            }
            Err(_) => {
                tracing::warn!("Using default metrics credentials (dev mode only!)");
                "admin:changeme".to_string()
            }
        };

        Ok(Config {
            mongo_uri,
            mongo_database,
            analytics_database,
            db_retry_attempts,
            bind_address,
            metrics_auth,
        })
    }
}
