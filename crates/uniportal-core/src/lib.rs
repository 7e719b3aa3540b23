//! Portal Core - Domain models, traits, and shared types
//!
//! This crate defines the abstractions shared by the portal crates:
//! - Student and general-document models
//! - Common error types
//! - Service traits for the document store and the language model
//! - Configuration management

pub mod config;

pub use config::{
    AppConfig, AuthConfig, ConfigError, DatabaseConfig, LlmConfig, LoggingConfig, PasswordPolicy,
    ServerConfig,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

// ============================================================================
// Error Types
// ============================================================================

/// Core error types for portal operations
#[derive(Error, Debug)]
pub enum PortalError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("LLM error: {0}")]
    LlmError(String),

    /// The model endpoint answered with a non-success status
    #[error("LLM returned HTTP {status}: {body}")]
    LlmStatus { status: u16, body: String },

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<ConfigError> for PortalError {
    fn from(err: ConfigError) -> Self {
        PortalError::ConfigError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PortalError>;

// ============================================================================
// Students
// ============================================================================

/// Student record as kept in the students collection.
///
/// Field names match the stored documents and are also the wire format of
/// the login response, password field included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Student {
    /// Store-assigned identifier
    #[schema(example = "k3r9x0c2m1")]
    pub id: String,

    /// Business key used to log in
    #[schema(example = "C1")]
    pub codigo_estudiante: String,

    /// Stored password value, compared per the configured password policy
    pub password_hash: String,

    #[schema(example = "Ana Quispe Rojas")]
    pub nombre_completo: String,

    /// Program / major
    #[schema(example = "Ingeniería de Sistemas")]
    pub carrera: String,

    /// Weighted grade average
    #[schema(example = 15.4)]
    pub promedio_ponderado: f64,

    /// Assigned advisor; older records may have none
    #[serde(default)]
    pub asesor: Option<Advisor>,

    /// Enrolled courses, in stored order
    #[serde(default)]
    pub cursos_inscritos: Vec<Course>,
}

/// Advisor embedded in a student record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Advisor {
    pub nombre: String,
    pub correo: String,
}

/// Course embedded in a student's enrolment list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Course {
    pub nombre: String,
    pub codigo: String,
}

// ============================================================================
// General documents
// ============================================================================

/// Free-text document used as chat context, one per type tag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneralDocument {
    /// Store-assigned identifier
    pub id: String,

    /// Type tag, e.g. `reglamento`
    pub tipo: String,

    pub contenido: String,
}

/// A general document that has not been stored yet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewGeneralDocument {
    pub tipo: String,
    pub contenido: String,
}

impl NewGeneralDocument {
    pub fn new(tipo: impl Into<String>, contenido: impl Into<String>) -> Self {
        Self {
            tipo: tipo.into(),
            contenido: contenido.into(),
        }
    }

    /// Attach the identifier the store assigned on insert
    pub fn with_id(self, id: impl Into<String>) -> GeneralDocument {
        GeneralDocument {
            id: id.into(),
            tipo: self.tipo,
            contenido: self.contenido,
        }
    }
}

// ============================================================================
// Traits
// ============================================================================

/// Access to the university document store.
///
/// Implementations are shared across request tasks and must be safe for
/// concurrent use.
#[async_trait::async_trait]
pub trait UniversityStore: Send + Sync {
    /// Number of documents in the students collection
    async fn count_students(&self) -> Result<u64>;

    /// First student whose code and stored password both equal the inputs
    async fn find_student(&self, codigo_estudiante: &str, password: &str)
        -> Result<Option<Student>>;

    /// First general document carrying the given type tag
    async fn find_general_document(&self, tipo: &str) -> Result<Option<GeneralDocument>>;

    /// Insert a general document and return it with its assigned identifier
    async fn insert_general_document(&self, document: NewGeneralDocument)
        -> Result<GeneralDocument>;

    /// Get backend name for logging
    fn name(&self) -> &str;
}

/// Trait for LLM clients
#[async_trait::async_trait]
pub trait LlmClient: Send + Sync {
    /// Generate a complete, non-streamed response
    async fn generate(&self, prompt: &str) -> Result<String>;
}

// ============================================================================
// Tests
// ============================================================================
