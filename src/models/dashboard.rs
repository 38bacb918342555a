//! Read-only summaries: the dashboard and the current session.

use serde::Serialize;

use super::{NewspaperWithTopic, Redactor};

/// Row counts shown on the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EntityCounts {
    pub redactors: i64,
    pub newspapers: i64,
    pub topics: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub num_redactors: i64,
    pub num_newspapers: i64,
    pub num_topics: i64,
    pub num_visits: u64,
    pub latest_newspapers: Vec<NewspaperWithTopic>,
    pub featured_redactors: Vec<Redactor>,
}

/// The logged-in redactor and how often this session opened the dashboard.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    pub redactor: Redactor,
    pub num_visits: u64,
}

/// Issued on a successful login.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub redactor: Redactor,
}

/// The login boundary unauthenticated requests are redirected to.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginPrompt {
    pub login_required: bool,
    pub next: String,
}
