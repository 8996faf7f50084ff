use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use crate::handlers::ApiError;
use crate::metrics::AUTH_FAILURES_TOTAL;
use crate::models::auth::AuthenticatedClient;
use crate::services::AppState;
use crate::storage::AnalyticsStore;

const TOKEN_KEYWORD: &str = "token";

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("Authentication credentials were not provided.")]
    MissingCredentials,
    #[error("Invalid token header. No credentials provided.")]
    EmptyToken,
    #[error("Invalid token header. Token string should not contain spaces.")]
    TokenWithSpaces,
    #[error("Invalid token.")]
    InvalidToken,
}

impl AuthError {
    fn reason(&self) -> &'static str {
        match self {
            AuthError::MissingCredentials => "missing",
            AuthError::EmptyToken | AuthError::TokenWithSpaces => "malformed",
            AuthError::InvalidToken => "invalid",
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        AUTH_FAILURES_TOTAL.with_label_values(&[err.reason()]).inc();
        ApiError::Unauthorized(err.to_string())
    }
}

/// Extracts the key from an `Authorization: Token <key>` header. The keyword
/// is matched case-insensitively; other schemes count as no credentials.
pub fn parse_token_header(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingCredentials)?;

    let mut parts = value.split_whitespace();
    match parts.next() {
        Some(keyword) if keyword.eq_ignore_ascii_case(TOKEN_KEYWORD) => {}
        _ => return Err(AuthError::MissingCredentials),
    }

    let key = parts.next().ok_or(AuthError::EmptyToken)?;
    if parts.next().is_some() {
        return Err(AuthError::TokenWithSpaces);
    }

    Ok(key)
}

/// Middleware для проверки API-ключа
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let key = parse_token_header(&headers).map_err(|e| {
        tracing::warn!("API key authentication failed: {}", e);
        e
    })?;

    let token = state
        .store
        .find_token(key)
        .await?
        .ok_or_else(|| {
            tracing::warn!("API key authentication failed: unknown key");
            AuthError::InvalidToken
        })?;

    tracing::debug!("Authenticated API client: {}", token.username);

    request.extensions_mut().insert(AuthenticatedClient {
        username: token.username,
    });

    Ok(next.run(request).await)
}
