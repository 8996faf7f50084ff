use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::time::bson_datetime;

/// API key issued to a client of the analytics API. Keys are provisioned by
/// operators directly in the `api_tokens` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiToken {
    pub key: String,
    pub username: String,
    #[serde(with = "bson_datetime")]
    pub created: DateTime<Utc>,
}

/// Identity attached to request extensions once the API key checks out.
#[derive(Debug, Clone)]
pub struct AuthenticatedClient {
    pub username: String,
}
