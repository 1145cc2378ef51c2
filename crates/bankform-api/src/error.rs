//! Error types for bankform-api

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use thiserror::Error;

use bankform_core::CoreError;
use bankform_utils::escape_html;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Bad request: {message}")]
    BadRequest { message: String },

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::Core(CoreError::TransactionNotFound { .. }) => StatusCode::NOT_FOUND,
            ApiError::Core(CoreError::Validation { .. }) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Core(CoreError::Backend { .. })
            | ApiError::Core(CoreError::Transport { .. })
            | ApiError::Core(CoreError::Decode { .. }) => StatusCode::BAD_GATEWAY,
            ApiError::Core(CoreError::Internal { .. }) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            ApiError::Core(e) => log::log!(e.log_level(), "{}", e.to_details()),
            ApiError::BadRequest { .. } => log::debug!("{}", self),
        }

        let html = format!(
            r#"<div class='bg-red-50 border border-red-200 rounded-lg p-4'><div class='flex items-center gap-2'><span class='text-red-600'>✗</span><span class='font-medium text-red-800'>{}</span></div><p class='text-sm text-red-600 mt-1'>{}</p></div>"#,
            status.canonical_reason().unwrap_or("Error"),
            escape_html(&self.to_string())
        );
        (status, Html(html)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
