//! Newspaper endpoints, including the redactor assignment toggle.

use axum::{
    extract::{Extension, Path, Query, State},
    response::Redirect,
};
use serde::Deserialize;

use super::{
    redirect_saved, redirect_to_list, success, ApiResult, FormJson, Page, Pagination, Resource,
    PAGE_SIZE,
};
use crate::auth::CurrentSession;
use crate::errors::AppError;
use crate::models::{
    invalid_redactor_choice, Newspaper, NewspaperDetail, NewspaperForm, NewspaperInput,
    NewspaperWithTopic, INVALID_TOPIC,
};
use crate::search::SearchFilter;
use crate::validation::{FieldErrors, Validate};
use crate::AppState;

/// Query parameters of the newspaper list.
#[derive(Debug, Default, Deserialize)]
pub struct NewspaperListQuery {
    pub title: Option<String>,
    pub page: Option<String>,
}

/// GET /newspapers/ - List newspapers with their topics, optionally filtered by title.
pub async fn list_newspapers(
    State(state): State<AppState>,
    Query(params): Query<NewspaperListQuery>,
) -> ApiResult<Page<NewspaperWithTopic>> {
    let filter = SearchFilter::newspapers_by_title(params.title.as_deref());
    let total = state.repo.count_newspapers(&filter).await?;
    let pagination = Pagination::resolve(total, params.page.as_deref(), PAGE_SIZE)?;
    let newspapers = state
        .repo
        .list_newspapers(&filter, pagination.limit(), pagination.offset())
        .await?;

    success(Page::new(newspapers, pagination, filter))
}

/// GET /newspapers/:id - Get a newspaper with its topic and redactors.
pub async fn get_newspaper(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<NewspaperDetail> {
    match state.repo.get_newspaper(&id).await? {
        Some(newspaper) => success(newspaper),
        None => Err(AppError::NotFound(format!("Newspaper {} not found", id))),
    }
}

/// POST /newspapers/new - Create a newspaper, then show it.
pub async fn create_newspaper(
    State(state): State<AppState>,
    FormJson(form): FormJson<NewspaperForm>,
) -> Result<Redirect, AppError> {
    let input = clean_newspaper(&state, form).await?;
    let newspaper = state.repo.create_newspaper(&input).await?;

    tracing::info!(
        newspaper_id = %newspaper.id,
        title = %newspaper.title,
        redactors = input.redactor_ids.len(),
        "Newspaper created"
    );
    Ok(redirect_saved(&newspaper))
}

/// POST /newspapers/:id/edit - Update a newspaper and its redactors, then show it.
pub async fn update_newspaper(
    State(state): State<AppState>,
    Path(id): Path<String>,
    FormJson(form): FormJson<NewspaperForm>,
) -> Result<Redirect, AppError> {
    if state.repo.get_newspaper(&id).await?.is_none() {
        return Err(AppError::NotFound(format!("Newspaper {} not found", id)));
    }

    let input = clean_newspaper(&state, form).await?;
    let newspaper = state.repo.update_newspaper(&id, &input).await?;

    tracing::info!(newspaper_id = %newspaper.id, title = %newspaper.title, "Newspaper updated");
    Ok(redirect_saved(&newspaper))
}

/// POST /newspapers/:id/delete - Delete a newspaper.
pub async fn delete_newspaper(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Redirect, AppError> {
    state.repo.delete_newspaper(&id).await?;

    tracing::info!(newspaper_id = %id, "Newspaper deleted");
    Ok(redirect_to_list::<Newspaper>())
}

/// POST /newspapers/:id/assign - Add or remove the caller as a redactor of the newspaper.
pub async fn toggle_assignment(
    State(state): State<AppState>,
    Extension(session): Extension<CurrentSession>,
    Path(id): Path<String>,
) -> Result<Redirect, AppError> {
    let assigned = state
        .repo
        .toggle_assignment(&id, &session.redactor.id)
        .await?;

    tracing::info!(
        newspaper_id = %id,
        redactor = %session.redactor.display_name(),
        assigned,
        "Assignment toggled"
    );
    Ok(Redirect::to(&format!("{}{}", Newspaper::LIST_PATH, id)))
}

/// Validate the form, then resolve its topic and redactors against the store.
async fn clean_newspaper(state: &AppState, form: NewspaperForm) -> Result<NewspaperInput, AppError> {
    let input = form.validate()?;
    let mut errors = FieldErrors::new();

    if state.repo.get_topic(&input.topic_id).await?.is_none() {
        errors.add("topicId", INVALID_TOPIC);
    }

    for missing in state.repo.missing_redactor_ids(&input.redactor_ids).await? {
        errors.add("redactorIds", invalid_redactor_choice(&missing));
    }

    Ok(errors.finish(input)?)
}
