//! HTTP API module.
//!
//! Contains the route handlers. Reads answer with a JSON envelope; successful
//! writes answer with a redirect to the page that shows the result.

mod accounts;
mod dashboard;
mod newspapers;
mod pagination;
mod redactors;
mod topics;

pub use accounts::*;
pub use dashboard::*;
pub use newspapers::*;
pub use pagination::*;
pub use redactors::*;
pub use topics::*;

use axum::{
    extract::FromRequest,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde::Serialize;

use crate::errors::AppError;
use crate::models::{Newspaper, Redactor, Topic};

/// Success response envelope.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Response type that can be either success or error.
pub type ApiResult<T> = Result<ApiResponse<T>, AppError>;

/// Create a successful API response.
pub fn success<T: Serialize>(data: T) -> ApiResult<T> {
    Ok(ApiResponse::new(data))
}

/// JSON form body whose rejections are reported in the API error envelope.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct FormJson<T>(pub T);

/// An entity reachable through list and detail pages.
pub trait Resource {
    /// Path of the list page, which also prefixes detail pages.
    const LIST_PATH: &'static str;

    fn id(&self) -> &str;

    fn detail_path(&self) -> String {
        format!("{}{}", Self::LIST_PATH, self.id())
    }

    /// Page shown after a successful create or update.
    fn saved_path(&self) -> String {
        self.detail_path()
    }
}

impl Resource for Topic {
    const LIST_PATH: &'static str = "/topics/";

    fn id(&self) -> &str {
        &self.id
    }

    fn saved_path(&self) -> String {
        Self::LIST_PATH.to_string()
    }
}

impl Resource for Newspaper {
    const LIST_PATH: &'static str = "/newspapers/";

    fn id(&self) -> &str {
        &self.id
    }
}

impl Resource for Redactor {
    const LIST_PATH: &'static str = "/redactors/";

    fn id(&self) -> &str {
        &self.id
    }
}

/// Redirect after a successful create or update.
pub fn redirect_saved<R: Resource>(resource: &R) -> Redirect {
    Redirect::to(&resource.saved_path())
}

/// Redirect to the list page, e.g. after a delete.
pub fn redirect_to_list<R: Resource>() -> Redirect {
    Redirect::to(R::LIST_PATH)
}
