//! API error responses.
//!
//! Every error renders as `{"error": {"code", "message"}}`; entitlement
//! denials add the full denial under `error.denial`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use socialflow_core::CoreError;
use socialflow_org::Denial;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Core(#[from] CoreError),

    #[error("Authentication required")]
    Unauthorized,

    #[error("{0}")]
    BadRequest(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    code: &'a str,
    message: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    denial: Option<&'a Denial>,
}

#[derive(Debug, Serialize)]
struct ErrorEnvelope<'a> {
    error: ErrorBody<'a>,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn status(&self) -> StatusCode {
        let code = match self {
            ApiError::Core(e) => e.status_code(),
            ApiError::Unauthorized => 401,
            ApiError::BadRequest(_) => 400,
        };
        StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    fn code(&self) -> &'static str {
        match self {
            ApiError::Core(e) => e.error_code(),
            ApiError::Unauthorized => "UNAUTHORIZED",
            ApiError::BadRequest(_) => "INVALID_INPUT",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status.is_server_error() && !matches!(self, ApiError::Core(CoreError::Upstream { .. })) {
            error!(error = %self, "Request failed");
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        let denial = match &self {
            ApiError::Core(e) => e.denial(),
            _ => None,
        };
        let body = ErrorEnvelope {
            error: ErrorBody {
                code: self.code(),
                message,
                denial,
            },
        };
        (status, Json(body)).into_response()
    }
}

impl From<socialflow_auth::AuthError> for ApiError {
    fn from(e: socialflow_auth::AuthError) -> Self {
        ApiError::Core(e.into())
    }
}
