use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::repository::PersistenceError;
use crate::views::RenderError;

/// Ошибки, которые доходят до HTTP-слоя.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("database error: {0}")]
    Persistence(#[from] PersistenceError),

    #[error("render error: {0}")]
    Render(#[from] RenderError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        tracing::error!("Internal Server Error: {}", self);
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
