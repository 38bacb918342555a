//! Page slicing for list views.

use serde::Serialize;

use crate::errors::AppError;
use crate::search::SearchFilter;

/// Items per list page.
pub const PAGE_SIZE: i64 = 5;

/// A resolved page within a result set of `total` items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: i64,
    pub num_pages: i64,
    pub total: i64,
    pub page_size: i64,
}

impl Pagination {
    /// Resolve the `page` query value (1-based number or `last`) against `total`.
    ///
    /// Page 1 always exists, even for an empty list.
    pub fn resolve(total: i64, requested: Option<&str>, page_size: i64) -> Result<Self, AppError> {
        let num_pages = if total == 0 {
            1
        } else {
            (total + page_size - 1) / page_size
        };

        let page = match requested.map(str::trim) {
            None | Some("") => 1,
            Some("last") => num_pages,
            Some(raw) => raw.parse::<i64>().map_err(|_| {
                AppError::NotFound("Page is not 'last', nor can it be converted to an int.".to_string())
            })?,
        };

        if page < 1 || page > num_pages {
            return Err(AppError::NotFound(format!("Invalid page ({})", page)));
        }

        Ok(Self {
            page,
            num_pages,
            total,
            page_size,
        })
    }

    pub fn limit(&self) -> i64 {
        self.page_size
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.page_size
    }
}

/// One page of a list, with the active search echoed back.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T: Serialize> {
    pub items: Vec<T>,
    pub page: i64,
    pub num_pages: i64,
    pub total: i64,
    pub has_next: bool,
    pub has_previous: bool,
    pub is_paginated: bool,
    pub search: SearchFilter,
}

impl<T: Serialize> Page<T> {
    pub fn new(items: Vec<T>, pagination: Pagination, search: SearchFilter) -> Self {
        Self {
            items,
            page: pagination.page,
            num_pages: pagination.num_pages,
            total: pagination.total,
            has_next: pagination.page < pagination.num_pages,
            has_previous: pagination.page > 1,
            is_paginated: pagination.num_pages > 1,
            search,
        }
    }
}
