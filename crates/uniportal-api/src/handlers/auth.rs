//! Student login handler
//!
//! Looks a student up by code and stored password value. No session or
//! token is issued; the caller receives the student record itself.

use crate::error::{AppError, ProblemDetails};
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uniportal_core::Student;
use utoipa::ToSchema;

/// Shared by unknown-code and wrong-password outcomes
pub const INVALID_CREDENTIALS: &str = "Código de estudiante o contraseña inválidos.";

/// Login request body
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[serde(rename = "codigoEstudiante")]
    #[schema(example = "C1")]
    pub codigo_estudiante: String,

    #[schema(example = "p1")]
    pub password: String,
}

/// Log a student in
///
/// The submitted password goes through the configured password policy and
/// is then matched, together with the student code, against the stored
/// record. The full record is returned on success.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = Student),
        (status = 400, description = "Malformed request body", body = ProblemDetails),
        (status = 401, description = "Invalid credentials", body = ProblemDetails),
        (status = 500, description = "Store error", body = ProblemDetails),
    )
)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<Student>, AppError> {
    let Json(request) = payload?;
    let password = state
        .config
        .auth
        .password_policy
        .stored_form(&request.password);

    let student = state
        .store
        .find_student(&request.codigo_estudiante, &password)
        .await
        .map_err(|e| {
            tracing::error!(backend = state.store.name(), error = %e, "student lookup failed");
            AppError::Internal(format!("Error al consultar estudiantes: {e}"))
        })?;

    match student {
        Some(student) => {
            tracing::info!(codigo = %student.codigo_estudiante, "student logged in");
            Ok(Json(student))
        }
        None => {
            tracing::debug!(codigo = %request.codigo_estudiante, "login rejected");
            Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_request_uses_camel_case_code() {
        let request: LoginRequest =
            serde_json::from_str(r#"{"codigoEstudiante":"C1","password":"p1"}"#).unwrap();
        assert_eq!(request.codigo_estudiante, "C1");
        assert_eq!(request.password, "p1");
    }

    #[test]
    fn test_login_request_requires_both_fields() {
        assert!(serde_json::from_str::<LoginRequest>(r#"{"codigoEstudiante":"C1"}"#).is_err());
        assert!(serde_json::from_str::<LoginRequest>(r#"{"password":"p1"}"#).is_err());
    }
}
