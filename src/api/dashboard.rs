//! Dashboard endpoint.

use axum::extract::{Extension, State};

use super::{success, ApiResult};
use crate::auth::CurrentSession;
use crate::models::Dashboard;
use crate::AppState;

/// Newspapers and featured redactors shown on the dashboard.
pub const DASHBOARD_LIMIT: i64 = 5;

/// GET / - Counts, latest newspapers, featured redactors and this session's visit count.
pub async fn dashboard(
    State(state): State<AppState>,
    Extension(session): Extension<CurrentSession>,
) -> ApiResult<Dashboard> {
    let counts = state.repo.count_all().await?;
    let latest_newspapers = state.repo.latest_newspapers(DASHBOARD_LIMIT).await?;
    let featured_redactors = state.repo.featured_redactors(DASHBOARD_LIMIT).await?;

    let num_visits = state.sessions.record_visit(&session.token).await;

    success(Dashboard {
        num_redactors: counts.redactors,
        num_newspapers: counts.newspapers,
        num_topics: counts.topics,
        num_visits,
        latest_newspapers,
        featured_redactors,
    })
}
