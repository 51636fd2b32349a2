//! API response envelopes
//!
//! Every endpoint answers with the same JSON envelope: `{success, data}` on
//! success, `{success: false, error: {code, message}}` on failure, with the
//! HTTP status derived from the error taxonomy.

use crate::error::AtelierError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::error;

/// Success envelope
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data,
        })
    }
}

/// Error detail carried in the failure envelope
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiErrorBody {
    pub code: String,
    pub message: String,
}

/// Failure envelope
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiErrorEnvelope {
    pub success: bool,
    pub error: ApiErrorBody,
}

impl AtelierError {
    /// HTTP status for this error
    pub fn status(&self) -> StatusCode {
        match self {
            AtelierError::Validation(_) => StatusCode::BAD_REQUEST,
            AtelierError::NotFound(_) => StatusCode::NOT_FOUND,
            AtelierError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AtelierError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {self}");
        }

        let envelope = ApiErrorEnvelope {
            success: false,
            error: ApiErrorBody {
                code: self.code().to_string(),
                message: self.to_string(),
            },
        };
        (status, Json(envelope)).into_response()
    }
}
