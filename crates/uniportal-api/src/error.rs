//! API error handling
//!
//! Handler failures are rendered as problem details
//! (`application/problem+json`).

use axum::{
    extract::rejection::JsonRejection,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const PROBLEM_JSON: &str = "application/problem+json";

/// Problem details error body
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProblemDetails {
    /// Reference to the HTTP status definition
    #[serde(rename = "type")]
    #[schema(example = "https://tools.ietf.org/html/rfc9110#section-15.5.2")]
    pub problem_type: String,

    /// Short summary of the status
    #[schema(example = "Unauthorized")]
    pub title: String,

    /// HTTP status code
    #[schema(example = 401)]
    pub status: u16,

    /// Human-readable explanation
    #[schema(example = "Código de estudiante o contraseña inválidos.")]
    pub detail: String,
}

impl ProblemDetails {
    pub fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            problem_type: problem_type_for(status).to_string(),
            title: status.canonical_reason().unwrap_or("Error").to_string(),
            status: status.as_u16(),
            detail: detail.into(),
        }
    }
}

fn problem_type_for(status: StatusCode) -> &'static str {
    match status {
        StatusCode::BAD_REQUEST => "https://tools.ietf.org/html/rfc9110#section-15.5.1",
        StatusCode::UNAUTHORIZED => "https://tools.ietf.org/html/rfc9110#section-15.5.2",
        _ => "https://tools.ietf.org/html/rfc9110#section-15.6.1",
    }
}

/// Application error type
#[derive(Debug)]
pub enum AppError {
    /// Request body missing or malformed
    BadRequest(String),
    /// Credentials did not match any student
    Unauthorized(String),
    /// Store, model, or parse fault; the message is returned as-is
    Internal(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = match self {
            AppError::BadRequest(msg) | AppError::Unauthorized(msg) | AppError::Internal(msg) => {
                msg
            }
        };

        let mut response = (status, Json(ProblemDetails::new(status, detail))).into_response();
        response
            .headers_mut()
            .insert(header::CONTENT_TYPE, HeaderValue::from_static(PROBLEM_JSON));
        response
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}
