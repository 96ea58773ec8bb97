//! Authentication middleware for mutating endpoints
//!
//! Checks the `Authorization: Bearer` header against the shared secret
//! loaded from the settings table at startup. An empty secret disables
//! checking entirely so a fresh install works before an operator sets
//! one. Applied to mutating routes only; reads and /health stay open.

use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::warn;

use crate::AppState;

pub async fn auth_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    // Empty secret disables ALL auth checking
    if state.shared_secret.is_empty() {
        return Ok(next.run(request).await);
    }

    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    match header.and_then(|h| h.strip_prefix("Bearer ")) {
        Some(token) if token == state.shared_secret => Ok(next.run(request).await),
        Some(_) => {
            warn!("rejected request with invalid API token");
            Err(AuthError::InvalidToken)
        }
        None => Err(AuthError::MissingToken),
    }
}

/// Authentication error types for HTTP responses
#[derive(Debug)]
pub enum AuthError {
    MissingToken,
    InvalidToken,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let message = match self {
            AuthError::MissingToken => "Token is missing",
            AuthError::InvalidToken => "Invalid token",
        };
        let body = Json(json!({ "error": message }));
        (StatusCode::UNAUTHORIZED, body).into_response()
    }
}
