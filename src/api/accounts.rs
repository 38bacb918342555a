//! Login boundary: log in, log out, and who am I.

use axum::{
    extract::{Extension, Query, State},
    response::Redirect,
};
use serde::Deserialize;

use super::{success, ApiResult, FormJson};
use crate::auth::{password::verify_password, CurrentSession};
use crate::errors::{AppError, LOGIN_PATH};
use crate::models::{LoginForm, LoginPrompt, LoginResponse, SessionInfo};
use crate::validation::{FieldErrors, NON_FIELD, REQUIRED};
use crate::AppState;

pub const INVALID_LOGIN: &str = "Please enter a correct username and password.";

/// Query parameters of the login page.
#[derive(Debug, Default, Deserialize)]
pub struct LoginQuery {
    pub next: Option<String>,
}

/// GET /accounts/login/ - Where unauthenticated requests land.
pub async fn login_page(Query(params): Query<LoginQuery>) -> ApiResult<LoginPrompt> {
    success(LoginPrompt {
        login_required: true,
        next: params.next.unwrap_or_else(|| "/".to_string()),
    })
}

/// POST /accounts/login/ - Check credentials and open a session.
pub async fn login(
    State(state): State<AppState>,
    FormJson(form): FormJson<LoginForm>,
) -> ApiResult<LoginResponse> {
    let username = form.username.trim().to_string();

    let mut errors = FieldErrors::new();
    if username.is_empty() {
        errors.add("username", REQUIRED);
    }
    if form.password.is_empty() {
        errors.add("password", REQUIRED);
    }
    errors.finish(())?;

    let found = state.repo.find_redactor_by_username(&username).await?;
    let authenticated = match &found {
        Some(redactor) => {
            verify_password(form.password, redactor.account.password_hash.clone()).await?
        }
        None => false,
    };

    let Some(redactor) = found.filter(|_| authenticated) else {
        tracing::warn!(username = %username, "Failed login attempt");
        return Err(FieldErrors::single(NON_FIELD, INVALID_LOGIN).into());
    };

    let token = state.sessions.create(&redactor.id).await;

    tracing::info!(redactor = %redactor.display_name(), "Logged in");
    success(LoginResponse { token, redactor })
}

/// POST /accounts/logout/ - End the current session.
pub async fn logout(
    State(state): State<AppState>,
    Extension(session): Extension<CurrentSession>,
) -> Redirect {
    state.sessions.remove(&session.token).await;

    tracing::info!(redactor = %session.redactor.display_name(), "Logged out");
    Redirect::to(LOGIN_PATH)
}

/// GET /accounts/me - The logged-in redactor and this session's visit count.
pub async fn current_session(
    State(state): State<AppState>,
    Extension(session): Extension<CurrentSession>,
) -> ApiResult<SessionInfo> {
    let num_visits = state.sessions.visits(&session.token).await;

    success(SessionInfo {
        redactor: session.redactor,
        num_visits,
    })
}
