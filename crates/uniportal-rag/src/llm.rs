//! Ollama client
//!
//! Issues non-streamed `/api/generate` calls and returns the `response`
//! field of the reply.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uniportal_core::{LlmClient, LlmConfig, PortalError, Result};

/// Ollama API client
pub struct OllamaClient {
    client: Client,
    base_url: String,
    model: String,
}

#[derive(Debug, Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    response: String,
}

impl OllamaClient {
    /// Create a new Ollama client
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            model: model.into(),
        }
    }

    /// Create from config
    pub fn from_config(config: &LlmConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| PortalError::ConfigError(format!("HTTP client setup failed: {e}")))?;

        Ok(Self {
            client,
            base_url: config.ollama_url.clone(),
            model: config.model.clone(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn generate_url(&self) -> String {
        format!("{}/api/generate", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl LlmClient for OllamaClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let request = OllamaRequest {
            model: &self.model,
            prompt,
            stream: false,
        };

        let response = self
            .client
            .post(self.generate_url())
            .json(&request)
            .send()
            .await
            .map_err(|e| PortalError::LlmError(format!("Ollama request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PortalError::LlmStatus {
                status: status.as_u16(),
                body,
            });
        }

        let result: OllamaResponse = response
            .json()
            .await
            .map_err(|e| PortalError::LlmError(format!("Failed to parse Ollama response: {e}")))?;

        Ok(result.response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::post, Json, Router};
    use serde_json::{json, Value};
    use std::sync::{Arc, Mutex};

    /// Serve `app` on an ephemeral local port and return its base URL
    async fn spawn_stub(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[test]
    fn test_ollama_client_creation() {
        let client = OllamaClient::new("http://localhost:11434/", "tinyllama");
        assert_eq!(client.model(), "tinyllama");
        assert_eq!(client.generate_url(), "http://localhost:11434/api/generate");
    }

    #[test]
    fn test_from_config_with_timeout() {
        let config = LlmConfig {
            timeout_secs: Some(5),
            ..LlmConfig::default()
        };
        let client = OllamaClient::from_config(&config).unwrap();
        assert_eq!(client.model(), "tinyllama");
    }

    #[tokio::test]
    async fn test_generate_sends_non_streamed_request() {
        let seen: Arc<Mutex<Option<Value>>> = Arc::new(Mutex::new(None));
        let seen_in_handler = seen.clone();

        let app = Router::new().route(
            "/api/generate",
            post(move |Json(body): Json<Value>| {
                let seen = seen_in_handler.clone();
                async move {
                    *seen.lock().unwrap() = Some(body);
                    Json(json!({ "model": "tinyllama", "response": "Llena el F-02.", "done": true }))
                }
            }),
        );
        let base_url = spawn_stub(app).await;

        let client = OllamaClient::new(base_url, "tinyllama");
        let answer = client.generate("¿Cómo me retiro?").await.unwrap();
        assert_eq!(answer, "Llena el F-02.");

        let body = seen.lock().unwrap().clone().unwrap();
        assert_eq!(body["model"], "tinyllama");
        assert_eq!(body["prompt"], "¿Cómo me retiro?");
        assert_eq!(body["stream"], false);
    }

    #[tokio::test]
    async fn test_non_success_status_is_reported() {
        let app = Router::new().route(
            "/api/generate",
            post(|| async { (StatusCode::NOT_FOUND, "model 'tinyllama' not found") }),
        );
        let base_url = spawn_stub(app).await;

        let err = OllamaClient::new(base_url, "tinyllama")
            .generate("hola")
            .await
            .unwrap_err();

        match err {
            PortalError::LlmStatus { status, body } => {
                assert_eq!(status, 404);
                assert!(body.contains("not found"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_response_field_is_a_parse_error() {
        let app = Router::new().route(
            "/api/generate",
            post(|| async { Json(json!({ "done": true })) }),
        );
        let base_url = spawn_stub(app).await;

        let err = OllamaClient::new(base_url, "tinyllama")
            .generate("hola")
            .await
            .unwrap_err();
        assert!(matches!(err, PortalError::LlmError(msg) if msg.contains("parse")));
    }

    #[tokio::test]
    async fn test_unreachable_server() {
        let err = OllamaClient::new("http://127.0.0.1:1", "tinyllama")
            .generate("hola")
            .await
            .unwrap_err();
        assert!(matches!(err, PortalError::LlmError(_)));
    }
}
