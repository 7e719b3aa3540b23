//! Regulation chat handler

use crate::error::{AppError, ProblemDetails};
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uniportal_core::PortalError;
use utoipa::ToSchema;

pub const MODEL_CALL_FAILED: &str = "Error llamando a la API de Ollama.";

/// Chat request body
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ChatRequest {
    /// User's question
    #[serde(rename = "Pregunta", alias = "pregunta")]
    #[schema(example = "¿Cómo me retiro de un curso?")]
    pub pregunta: String,
}

/// Chat response body
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ChatResponse {
    /// Model answer
    #[schema(example = "Debes llenar el formulario F-02 y pagar la tasa en tesorería.")]
    pub respuesta: String,
}

/// Answer a question from the stored regulations
#[utoipa::path(
    post,
    path = "/api/chat",
    tag = "chat",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Model answer", body = ChatResponse),
        (status = 400, description = "Malformed request body", body = ProblemDetails),
        (status = 500, description = "Store or model failure", body = ProblemDetails),
    )
)]
pub async fn chat_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, AppError> {
    let Json(request) = payload?;

    match state.chat.answer(&request.pregunta).await {
        Ok(respuesta) => Ok(Json(ChatResponse { respuesta })),
        Err(PortalError::LlmStatus { status, body }) => {
            tracing::warn!(status, body = %body, "model endpoint rejected the request");
            Err(AppError::Internal(MODEL_CALL_FAILED.to_string()))
        }
        Err(e) => {
            tracing::error!(error = %e, "chat request failed");
            Err(AppError::Internal(format!(
                "Error procesando el chat: {e}. Asegúrate de que Ollama esté corriendo."
            )))
        }
    }
}
