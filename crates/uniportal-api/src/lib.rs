//! University portal API
//!
//! HTTP endpoints for the student portal: store connectivity check,
//! student login, and regulation chat.

pub mod error;
pub mod handlers;
pub mod state;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

use axum::{
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use handlers::{auth, chat, health};
use state::AppState;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "University Portal API",
        version = "0.1.0",
        description = "Student login and regulation chat for the university portal"
    ),
    paths(
        health::health_check,
        health::connectivity_check,
        auth::login_handler,
        chat::chat_handler,
    ),
    components(schemas(
        health::HealthResponse,
        auth::LoginRequest,
        chat::ChatRequest,
        chat::ChatResponse,
        error::ProblemDetails,
        uniportal_core::Student,
        uniportal_core::Advisor,
        uniportal_core::Course,
    )),
    tags(
        (name = "health", description = "Liveness and store connectivity"),
        (name = "auth", description = "Student login"),
        (name = "chat", description = "Regulation chat backed by a local model"),
    )
)]
pub struct ApiDoc;

/// Build the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.config.server.cors_origins);

    let mut router = Router::new()
        .route("/health", get(health::health_check))
        .route("/test-mongo-connection", get(health::connectivity_check))
        .route("/api/auth/login", post(auth::login_handler))
        .route("/api/chat", post(chat::chat_handler));

    if state.config.server.swagger_enabled {
        router = router
            .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));
    }

    router
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// CORS policy: listed origins only, any method and header
fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Router over in-memory collaborators with default configuration
#[cfg(any(test, feature = "test-utils"))]
pub fn create_router_for_testing() -> Router {
    let state = testing::TestContext::new().state();
    create_router(state)
}
