//! Portal configuration management
//!
//! Handles configuration from environment variables and TOML files
//! with defaults suitable for local development.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::PathBuf;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP server configuration
    pub server: ServerConfig,

    /// Document store connection and collection names
    pub database: DatabaseConfig,

    /// Language model endpoint
    pub llm: LlmConfig,

    /// Login comparison settings
    pub auth: AuthConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().apply_overrides(|key| std::env::var(key).ok())
    }

    /// Load from a TOML file
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::FileReadError {
            path: path.clone(),
            source: e,
        })?;

        Self::from_toml_str(&content).map_err(|e| match e {
            ConfigError::ParseError { message, .. } => ConfigError::ParseError { path, message },
            other => other,
        })
    }

    /// Parse a TOML document; missing sections fall back to defaults
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError {
            path: PathBuf::from("<inline>"),
            message: e.to_string(),
        })
    }

    /// Merge with environment variables (env takes precedence)
    pub fn with_env_override(self) -> Result<Self, ConfigError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply every recognised variable that `lookup` yields on top of `self`
    pub fn apply_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Server
        if let Some(host) = lookup("API_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("API_PORT") {
            self.server.port = parse_value("API_PORT", port)?;
        }
        if let Some(origins) = lookup("CORS_ORIGINS") {
            self.server.cors_origins = origins
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
        if let Some(enabled) = lookup("SWAGGER_ENABLED") {
            self.server.swagger_enabled = parse_value("SWAGGER_ENABLED", enabled)?;
        }

        // Document store
        if let Some(url) = lookup("DATABASE_URL") {
            self.database.connection_string = url;
        }
        if let Some(user) = lookup("DATABASE_USER") {
            self.database.username = user;
        }
        if let Some(pass) = lookup("DATABASE_PASS") {
            self.database.password = pass;
        }
        if let Some(ns) = lookup("DATABASE_NAMESPACE") {
            self.database.namespace = ns;
        }
        if let Some(name) = lookup("DATABASE_NAME") {
            self.database.database_name = name;
        }
        if let Some(name) = lookup("STUDENTS_COLLECTION") {
            self.database.students_collection = name;
        }
        if let Some(name) = lookup("FORMS_COLLECTION") {
            self.database.forms_collection = name;
        }
        if let Some(name) = lookup("CHAT_MESSAGES_COLLECTION") {
            self.database.chat_messages_collection = name;
        }
        if let Some(name) = lookup("GENERAL_DOCUMENTS_COLLECTION") {
            self.database.general_documents_collection = name;
        }

        // LLM
        if let Some(url) = lookup("OLLAMA_URL") {
            self.llm.ollama_url = url;
        }
        if let Some(model) = lookup("LLM_MODEL") {
            self.llm.model = model;
        }
        if let Some(secs) = lookup("LLM_TIMEOUT_SECS") {
            self.llm.timeout_secs = Some(parse_value("LLM_TIMEOUT_SECS", secs)?);
        }

        // Auth
        if let Some(policy) = lookup("PASSWORD_POLICY") {
            self.auth.password_policy = policy.parse()?;
        }

        // Logging
        if let Some(level) = lookup("LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(json) = lookup("LOG_JSON") {
            self.logging.json_format = parse_value("LOG_JSON", json)?;
        }

        Ok(self)
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, value: String) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value,
    })
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Allowed origins for CORS
    pub cors_origins: Vec<String>,

    /// Serve the OpenAPI document and Swagger UI
    pub swagger_enabled: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            // The two front-end dev servers
            cors_origins: vec![
                "http://localhost:8080".to_string(),
                "http://localhost:9000".to_string(),
            ],
            swagger_enabled: true,
        }
    }
}

/// Document store connection configuration
///
/// `forms_collection` and `chat_messages_collection` are carried for
/// compatibility with existing deployments; no endpoint reads them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Server address (`ws://host:port`)
    pub connection_string: String,

    /// Root username
    pub username: String,

    /// Root password
    pub password: String,

    /// Namespace holding the database
    pub namespace: String,

    /// Database name
    pub database_name: String,

    pub students_collection: String,

    pub forms_collection: String,

    pub chat_messages_collection: String,

    pub general_documents_collection: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            connection_string: "ws://localhost:8000".to_string(),
            username: "root".to_string(),
            password: "root".to_string(),
            namespace: "universidad".to_string(),
            database_name: "portal".to_string(),
            students_collection: "estudiantes".to_string(),
            forms_collection: "formularios".to_string(),
            chat_messages_collection: "mensajes_chat".to_string(),
            general_documents_collection: "documentos_generales".to_string(),
        }
    }
}

/// LLM endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Ollama server URL
    pub ollama_url: String,

    /// Model name to use
    pub model: String,

    /// Request timeout in seconds; `None` keeps the transport default
    pub timeout_secs: Option<u64>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            ollama_url: "http://localhost:11434".to_string(),
            model: "tinyllama".to_string(),
            timeout_secs: None,
        }
    }
}

/// Login comparison configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub password_policy: PasswordPolicy,
}

/// How a submitted password is turned into the value matched against the
/// stored `password_hash` field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PasswordPolicy {
    /// Compare the submitted value as an opaque token
    #[default]
    Verbatim,
    /// Compare the lowercase hex SHA-256 digest of the submitted value
    Sha256,
}

impl PasswordPolicy {
    /// Value to look up in the store for a submitted password
    pub fn stored_form(&self, submitted: &str) -> String {
        match self {
            Self::Verbatim => submitted.to_string(),
            Self::Sha256 => format!("{:x}", Sha256::digest(submitted.as_bytes())),
        }
    }
}

impl std::str::FromStr for PasswordPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "verbatim" => Ok(Self::Verbatim),
            "sha256" => Ok(Self::Sha256),
            _ => Err(ConfigError::InvalidValue {
                key: "PASSWORD_POLICY".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for PasswordPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Verbatim => write!(f, "verbatim"),
            Self::Sha256 => write!(f, "sha256"),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// JSON format for logs
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}
