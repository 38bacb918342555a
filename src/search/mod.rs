//! Search filters for the list views.
//!
//! Each filter turns an optional query string into a case-insensitive
//! substring match on one column. Matching runs against a lowercased copy of
//! the column, written by the repository through [`fold_case`], so case is
//! ignored beyond ASCII. An empty query leaves the list unfiltered.

use serde::Serialize;
use sqlx::query::Query;
use sqlx::sqlite::{Sqlite, SqliteArguments};

/// Longest query the search forms accept; longer input leaves the list unfiltered.
pub const MAX_QUERY_LENGTH: usize = 150;

const LIKE_ESCAPE: char = '\\';

/// Lowercased form stored next to every searchable column.
pub fn fold_case(text: &str) -> String {
    text.to_lowercase()
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchFilter {
    /// Query parameter the value came from, echoed back to the client
    pub field: &'static str,
    /// Raw value as submitted
    pub value: String,
    #[serde(skip)]
    column: &'static str,
    #[serde(skip)]
    needle: Option<String>,
}

impl SearchFilter {
    pub fn topics_by_name(raw: Option<&str>) -> Self {
        Self::new("name", "topics.name_folded", raw)
    }

    pub fn newspapers_by_title(raw: Option<&str>) -> Self {
        Self::new("title", "newspapers.title_folded", raw)
    }

    pub fn redactors_by_username(raw: Option<&str>) -> Self {
        Self::new("username", "redactors.username_folded", raw)
    }

    fn new(field: &'static str, column: &'static str, raw: Option<&str>) -> Self {
        let value = raw.unwrap_or_default().to_string();
        let trimmed = value.trim();
        let needle = (!trimmed.is_empty() && trimmed.chars().count() <= MAX_QUERY_LENGTH)
            .then(|| fold_case(trimmed));

        Self {
            field,
            value,
            column,
            needle,
        }
    }

    /// Whether the filter narrows the list at all.
    pub fn is_active(&self) -> bool {
        self.needle.is_some()
    }

    /// `WHERE` clause for the filter, or an empty string when inactive.
    pub fn where_clause(&self) -> String {
        if self.is_active() {
            format!("WHERE {} LIKE ? ESCAPE '{}'", self.column, LIKE_ESCAPE)
        } else {
            String::new()
        }
    }

    /// `LIKE` pattern matching the query anywhere, with wildcards taken literally.
    pub fn pattern(&self) -> Option<String> {
        self.needle.as_ref().map(|needle| {
            let mut pattern = String::with_capacity(needle.len() + 2);
            pattern.push('%');
            for c in needle.chars() {
                if matches!(c, '%' | '_') || c == LIKE_ESCAPE {
                    pattern.push(LIKE_ESCAPE);
                }
                pattern.push(c);
            }
            pattern.push('%');
            pattern
        })
    }

    /// Bind the pattern for the placeholder in [`where_clause`](Self::where_clause).
    pub fn bind<'q>(
        &self,
        query: Query<'q, Sqlite, SqliteArguments<'q>>,
    ) -> Query<'q, Sqlite, SqliteArguments<'q>> {
        match self.pattern() {
            Some(pattern) => query.bind(pattern),
            None => query,
        }
    }
}
