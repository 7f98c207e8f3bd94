//! API error responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use todo_core::FieldErrors;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("validation failed")]
    Validation(FieldErrors),

    #[error("todo {0} not found")]
    NotFound(Uuid),
}

/// JSON body for every error response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_errors: Option<FieldErrors>,
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ServerError::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();
        let body = match self {
            ServerError::Validation(errors) => ErrorBody {
                code: "VALIDATION_ERROR",
                message,
                field_errors: Some(errors),
            },
            ServerError::NotFound(_) => ErrorBody {
                code: "NOT_FOUND",
                message,
                field_errors: None,
            },
        };
        tracing::debug!(status = status.as_u16(), code = body.code, "request rejected");
        (status, Json(body)).into_response()
    }
}
