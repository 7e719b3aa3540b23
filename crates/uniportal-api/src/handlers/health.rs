//! Health and connectivity handlers

use crate::error::{AppError, ProblemDetails};
use crate::state::AppState;
use axum::{extract::State, response::IntoResponse, Json};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

/// Health check response
#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Liveness probe - basic health check
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is alive", body = HealthResponse)
    )
)]
pub async fn health_check() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Count the students collection to prove the store is reachable
#[utoipa::path(
    get,
    path = "/test-mongo-connection",
    tag = "health",
    responses(
        (status = 200, description = "Store reachable; message embeds the document count",
            body = String, content_type = "text/plain"),
        (status = 500, description = "Store unreachable", body = ProblemDetails,
            content_type = "application/problem+json")
    )
)]
pub async fn connectivity_check(State(state): State<Arc<AppState>>) -> Result<String, AppError> {
    let collection = &state.config.database.students_collection;

    match state.store.count_students().await {
        Ok(count) => Ok(format!(
            "¡Conexión exitosa! La colección '{collection}' tiene {count} documentos."
        )),
        Err(e) => {
            tracing::error!(backend = state.store.name(), error = %e, "connectivity check failed");
            Err(AppError::Internal(format!(
                "Error al conectar con la base de datos: {e}"
            )))
        }
    }
}
