//! University portal API server

use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use uniportal_api::{create_router, state::AppState};
use uniportal_core::{AppConfig, LoggingConfig, PasswordPolicy};
use uniportal_rag::OllamaClient;
use uniportal_store::SurrealStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = match std::env::var("UNIPORTAL_CONFIG") {
        Ok(path) => AppConfig::from_file(path)?.with_env_override()?,
        Err(_) => AppConfig::from_env()?,
    };

    init_tracing(&config.logging);

    if config.auth.password_policy == PasswordPolicy::Verbatim {
        tracing::warn!(
            "password policy is 'verbatim': login compares the submitted password \
             directly with the stored value"
        );
    }

    let store = Arc::new(SurrealStore::new(config.database.clone()));
    if let Err(e) = store.connect().await {
        // Requests retry the connection; the connectivity endpoint reports it
        tracing::warn!(error = %e, "document store not reachable at startup");
    }

    let llm = Arc::new(OllamaClient::from_config(&config.llm)?);
    tracing::info!(url = %config.llm.ollama_url, model = llm.model(), "using Ollama model");

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let swagger_enabled = config.server.swagger_enabled;

    let state = Arc::new(AppState::new(config, store, llm));
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("University portal API starting on http://{}", addr);
    if swagger_enabled {
        tracing::info!("Swagger UI available at http://{}/swagger-ui/", addr);
        tracing::info!("OpenAPI spec at http://{}/api-docs/openapi.json", addr);
    }

    axum::serve(listener, app).await?;

    Ok(())
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "uniportal_api={level},uniportal_rag={level},uniportal_store={level},tower_http={level}",
            level = logging.level
        ))
    });

    if logging.json_format {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
