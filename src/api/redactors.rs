//! Redactor endpoints.

use axum::{
    extract::{Path, Query, State},
    response::Redirect,
};
use serde::Deserialize;

use super::{redirect_saved, redirect_to_list, success, ApiResult, FormJson, Page, Pagination, PAGE_SIZE};
use crate::auth::password::hash_password;
use crate::errors::AppError;
use crate::models::{
    Redactor, RedactorCreationForm, RedactorExperienceForm, RedactorWithNewspapers,
    USERNAME_TAKEN,
};
use crate::search::SearchFilter;
use crate::validation::{FieldErrors, Validate};
use crate::AppState;

/// Query parameters of the redactor list.
#[derive(Debug, Default, Deserialize)]
pub struct RedactorListQuery {
    pub username: Option<String>,
    pub page: Option<String>,
}

/// GET /redactors/ - List redactors with their newspapers, optionally filtered by username.
pub async fn list_redactors(
    State(state): State<AppState>,
    Query(params): Query<RedactorListQuery>,
) -> ApiResult<Page<RedactorWithNewspapers>> {
    let filter = SearchFilter::redactors_by_username(params.username.as_deref());
    let total = state.repo.count_redactors(&filter).await?;
    let pagination = Pagination::resolve(total, params.page.as_deref(), PAGE_SIZE)?;
    let redactors = state
        .repo
        .list_redactors(&filter, pagination.limit(), pagination.offset())
        .await?;

    success(Page::new(redactors, pagination, filter))
}

/// GET /redactors/:id - Get a redactor with their newspapers and topics.
pub async fn get_redactor(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<RedactorWithNewspapers> {
    match state.repo.get_redactor_detail(&id).await? {
        Some(redactor) => success(redactor),
        None => Err(AppError::NotFound(format!("Redactor {} not found", id))),
    }
}

/// POST /redactors/new - Register a redactor, then show them.
pub async fn create_redactor(
    State(state): State<AppState>,
    FormJson(form): FormJson<RedactorCreationForm>,
) -> Result<Redirect, AppError> {
    let input = form.validate()?;

    if state
        .repo
        .find_redactor_by_username(&input.username)
        .await?
        .is_some()
    {
        return Err(FieldErrors::single("username", USERNAME_TAKEN).into());
    }

    let password_hash = hash_password(input.password.clone()).await?;
    let redactor = state.repo.create_redactor(&input, &password_hash).await?;

    tracing::info!(redactor_id = %redactor.id, redactor = %redactor.display_name(), "Redactor created");
    Ok(redirect_saved(&redactor))
}

/// POST /redactors/:id/edit - Change experience and featured flag, then show the redactor.
pub async fn update_redactor(
    State(state): State<AppState>,
    Path(id): Path<String>,
    FormJson(form): FormJson<RedactorExperienceForm>,
) -> Result<Redirect, AppError> {
    if state.repo.get_redactor(&id).await?.is_none() {
        return Err(AppError::NotFound(format!("Redactor {} not found", id)));
    }

    let changes = form.validate()?;
    let redactor = state.repo.update_redactor(&id, &changes).await?;

    tracing::info!(
        redactor_id = %redactor.id,
        years_of_experience = redactor.years_of_experience,
        is_featured = redactor.is_featured,
        "Redactor updated"
    );
    Ok(redirect_saved(&redactor))
}

/// POST /redactors/:id/delete - Delete a redactor.
pub async fn delete_redactor(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Redirect, AppError> {
    state.repo.delete_redactor(&id).await?;

    tracing::info!(redactor_id = %id, "Redactor deleted");
    Ok(redirect_to_list::<Redactor>())
}
