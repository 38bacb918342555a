//! Session-based authentication.
//!
//! Every protected route runs behind [`require_session`], which resolves the
//! presented token to a live session and the redactor behind it.

pub mod password;

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::errors::AppError;
use crate::models::Redactor;
use crate::AppState;

/// Header carrying the session token when no bearer token is sent.
pub const SESSION_HEADER: &str = "x-session-token";

/// The authenticated caller, available to handlers as an extension.
#[derive(Debug, Clone)]
pub struct CurrentSession {
    pub token: String,
    pub redactor: Redactor,
}

/// Reject requests without a live session by redirecting them to the login page.
pub async fn require_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let original = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| "/".to_string());
    let unauthenticated = || AppError::Unauthenticated { next: original }.into_response();

    let Some(token) = session_token(request.headers()) else {
        return unauthenticated();
    };

    let Some(session) = state.sessions.get(&token).await else {
        return unauthenticated();
    };

    match state.repo.get_redactor(&session.redactor_id).await {
        Ok(Some(redactor)) => {
            request
                .extensions_mut()
                .insert(CurrentSession { token, redactor });
            next.run(request).await
        }
        Ok(None) => {
            // The account was deleted while the session was still open
            state.sessions.remove(&token).await;
            unauthenticated()
        }
        Err(e) => e.into_response(),
    }
}

/// Read the session token from `Authorization: Bearer` or the session header.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "));

    bearer
        .or_else(|| headers.get(SESSION_HEADER).and_then(|v| v.to_str().ok()))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}
