use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::database::StoreError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error("{context}: {source}")]
    Store {
        context: &'static str,
        source: StoreError,
    },

    #[error("OpenAI API key not configured")]
    MissingApiKey,

    #[error("Error generating ideas: {0}")]
    Completion(String),

    #[error("Error parsing AI response: {0}")]
    InvalidAiResponse(String),
}

impl AppError {
    pub fn store(context: &'static str) -> impl FnOnce(StoreError) -> Self {
        move |source| AppError::Store { context, source }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::MalformedPayload(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::MalformedPayload(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::MalformedPayload { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Store { .. }
            | AppError::MissingApiKey
            | AppError::Completion { .. }
            | AppError::InvalidAiResponse { .. } => {
                error!("{self}");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (status, Json(json!({ "detail": self.to_string() }))).into_response()
    }
}
