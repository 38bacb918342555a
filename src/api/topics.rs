//! Topic endpoints.

use axum::{
    extract::{Path, Query, State},
    response::Redirect,
};
use serde::Deserialize;

use super::{redirect_saved, redirect_to_list, success, ApiResult, FormJson, Page, Pagination, PAGE_SIZE};
use crate::errors::AppError;
use crate::models::{Topic, TopicForm, TopicInput, TOPIC_NAME_TAKEN};
use crate::search::SearchFilter;
use crate::validation::{FieldErrors, Validate};
use crate::AppState;

/// Query parameters of the topic list.
#[derive(Debug, Default, Deserialize)]
pub struct TopicListQuery {
    pub name: Option<String>,
    pub page: Option<String>,
}

/// GET /topics/ - List topics, optionally filtered by name.
pub async fn list_topics(
    State(state): State<AppState>,
    Query(params): Query<TopicListQuery>,
) -> ApiResult<Page<Topic>> {
    let filter = SearchFilter::topics_by_name(params.name.as_deref());
    let total = state.repo.count_topics(&filter).await?;
    let pagination = Pagination::resolve(total, params.page.as_deref(), PAGE_SIZE)?;
    let topics = state
        .repo
        .list_topics(&filter, pagination.limit(), pagination.offset())
        .await?;

    success(Page::new(topics, pagination, filter))
}

/// GET /topics/:id - Get a single topic.
pub async fn get_topic(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Topic> {
    match state.repo.get_topic(&id).await? {
        Some(topic) => success(topic),
        None => Err(AppError::NotFound(format!("Topic {} not found", id))),
    }
}

/// POST /topics/new - Create a topic, then show the list.
pub async fn create_topic(
    State(state): State<AppState>,
    FormJson(form): FormJson<TopicForm>,
) -> Result<Redirect, AppError> {
    let input = clean_topic(&state, form, None).await?;
    let topic = state.repo.create_topic(&input).await?;

    tracing::info!(topic_id = %topic.id, name = %topic.name, "Topic created");
    Ok(redirect_saved(&topic))
}

/// POST /topics/:id/edit - Rename a topic, then show the list.
pub async fn update_topic(
    State(state): State<AppState>,
    Path(id): Path<String>,
    FormJson(form): FormJson<TopicForm>,
) -> Result<Redirect, AppError> {
    if state.repo.get_topic(&id).await?.is_none() {
        return Err(AppError::NotFound(format!("Topic {} not found", id)));
    }

    let input = clean_topic(&state, form, Some(&id)).await?;
    let topic = state.repo.update_topic(&id, &input).await?;

    tracing::info!(topic_id = %topic.id, name = %topic.name, "Topic updated");
    Ok(redirect_saved(&topic))
}

/// POST /topics/:id/delete - Delete a topic and its newspapers.
pub async fn delete_topic(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Redirect, AppError> {
    state.repo.delete_topic(&id).await?;

    tracing::info!(topic_id = %id, "Topic deleted");
    Ok(redirect_to_list::<Topic>())
}

/// Validate the form and check the name is not taken by another topic.
async fn clean_topic(
    state: &AppState,
    form: TopicForm,
    current_id: Option<&str>,
) -> Result<TopicInput, AppError> {
    let input = form.validate()?;

    if state.repo.topic_name_taken(&input.name, current_id).await? {
        return Err(FieldErrors::single("name", TOPIC_NAME_TAKEN).into());
    }

    Ok(input)
}
