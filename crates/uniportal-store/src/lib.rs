//! Portal Store - document store adapter
//!
//! Implements [`UniversityStore`] on top of a SurrealDB server. Each
//! configured collection name maps to a table.

mod records;

use async_trait::async_trait;
use records::{CountRow, GeneralDocumentRecord, StudentRecord};
use surrealdb::engine::remote::ws::{Client, Ws};
use surrealdb::opt::auth::Root;
use surrealdb::Surreal;
use tokio::sync::OnceCell;
use uniportal_core::{
    DatabaseConfig, GeneralDocument, NewGeneralDocument, PortalError, Result, Student,
    UniversityStore,
};

/// SurrealDB-backed university store.
///
/// The connection is opened on first use, so a store that is down at
/// startup surfaces as a per-request error instead of a failed boot.
/// Opening the socket and selecting the session (signin, namespace,
/// database) are tracked separately: the socket can only be opened once per
/// client, while a rejected signin is retried on the next request.
pub struct SurrealStore {
    client: Surreal<Client>,
    transport: OnceCell<()>,
    session: OnceCell<()>,
    config: DatabaseConfig,
}

impl SurrealStore {
    /// Create a store handle; no network traffic happens until the first query
    pub fn new(config: DatabaseConfig) -> Self {
        Self {
            client: Surreal::init(),
            transport: OnceCell::new(),
            session: OnceCell::new(),
            config,
        }
    }

    /// Open the connection now instead of on the first query
    pub async fn connect(&self) -> Result<()> {
        self.session().await.map(|_| ())
    }

    async fn session(&self) -> Result<&Surreal<Client>> {
        let url = server_address(&self.config.connection_string);

        self.transport
            .get_or_try_init(|| async move {
                self.client.connect::<Ws>(url).await.map_err(|e| {
                    PortalError::DatabaseError(format!("SurrealDB connection failed: {e}"))
                })
            })
            .await?;

        self.session
            .get_or_try_init(|| async move {
                if !self.config.username.is_empty() {
                    self.client
                        .signin(Root {
                            username: &self.config.username,
                            password: &self.config.password,
                        })
                        .await
                        .map_err(|e| {
                            PortalError::DatabaseError(format!("SurrealDB auth failed: {e}"))
                        })?;
                }

                self.client
                    .use_ns(&self.config.namespace)
                    .use_db(&self.config.database_name)
                    .await
                    .map_err(|e| {
                        PortalError::DatabaseError(format!("SurrealDB namespace error: {e}"))
                    })?;

                tracing::info!(
                    url,
                    namespace = %self.config.namespace,
                    database = %self.config.database_name,
                    "connected to document store"
                );
                Ok::<(), PortalError>(())
            })
            .await?;

        Ok(&self.client)
    }
}

/// Strip the ws:// or wss:// prefix (the surrealdb crate adds it itself)
fn server_address(connection_string: &str) -> &str {
    connection_string
        .strip_prefix("ws://")
        .or_else(|| connection_string.strip_prefix("wss://"))
        .unwrap_or(connection_string)
}

#[async_trait]
impl UniversityStore for SurrealStore {
    async fn count_students(&self) -> Result<u64> {
        let row: Option<CountRow> = self
            .session()
            .await?
            .query("SELECT count() AS count FROM type::table($table) GROUP ALL")
            .bind(("table", self.config.students_collection.clone()))
            .await
            .map_err(|e| PortalError::DatabaseError(format!("Count failed: {e}")))?
            .take(0)
            .map_err(|e| PortalError::DatabaseError(format!("Result extraction failed: {e}")))?;

        // GROUP ALL over an empty table yields no row at all
        Ok(row.map(|r| r.count).unwrap_or(0))
    }

    async fn find_student(
        &self,
        codigo_estudiante: &str,
        password: &str,
    ) -> Result<Option<Student>> {
        let record: Option<StudentRecord> = self
            .session()
            .await?
            .query(
                "SELECT * FROM type::table($table) \
                 WHERE codigo_estudiante = $codigo AND password_hash = $password \
                 LIMIT 1",
            )
            .bind(("table", self.config.students_collection.clone()))
            .bind(("codigo", codigo_estudiante.to_string()))
            .bind(("password", password.to_string()))
            .await
            .map_err(|e| PortalError::DatabaseError(format!("Student lookup failed: {e}")))?
            .take(0)
            .map_err(|e| PortalError::DatabaseError(format!("Result extraction failed: {e}")))?;

        Ok(record.map(Student::from))
    }

    async fn find_general_document(&self, tipo: &str) -> Result<Option<GeneralDocument>> {
        let record: Option<GeneralDocumentRecord> = self
            .session()
            .await?
            .query("SELECT * FROM type::table($table) WHERE tipo = $tipo LIMIT 1")
            .bind(("table", self.config.general_documents_collection.clone()))
            .bind(("tipo", tipo.to_string()))
            .await
            .map_err(|e| PortalError::DatabaseError(format!("Document lookup failed: {e}")))?
            .take(0)
            .map_err(|e| PortalError::DatabaseError(format!("Result extraction failed: {e}")))?;

        Ok(record.map(GeneralDocument::from))
    }

    async fn insert_general_document(
        &self,
        document: NewGeneralDocument,
    ) -> Result<GeneralDocument> {
        let created: Option<GeneralDocumentRecord> = self
            .session()
            .await?
            .query("CREATE type::table($table) CONTENT $doc")
            .bind(("table", self.config.general_documents_collection.clone()))
            .bind(("doc", GeneralDocumentRecord::from(document)))
            .await
            .map_err(|e| PortalError::DatabaseError(format!("Failed to store document: {e}")))?
            .take(0)
            .map_err(|e| PortalError::DatabaseError(format!("Result extraction failed: {e}")))?;

        created
            .map(GeneralDocument::from)
            .ok_or_else(|| PortalError::DatabaseError("Failed to create document".to_string()))
    }

    fn name(&self) -> &str {
        "surrealdb"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local_config() -> DatabaseConfig {
        DatabaseConfig {
            connection_string: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "ws://localhost:8000".to_string()),
            database_name: "portal_test".to_string(),
            ..DatabaseConfig::default()
        }
    }

    #[test]
    fn test_server_address_strips_scheme() {
        assert_eq!(server_address("ws://localhost:8000"), "localhost:8000");
        assert_eq!(server_address("wss://db.example:443"), "db.example:443");
        assert_eq!(server_address("localhost:8000"), "localhost:8000");
    }

    #[tokio::test]
    async fn test_unreachable_server_is_a_query_error() {
        let store = SurrealStore::new(DatabaseConfig {
            connection_string: "ws://127.0.0.1:1".to_string(),
            ..DatabaseConfig::default()
        });

        let err = store.count_students().await.unwrap_err();
        assert!(matches!(err, PortalError::DatabaseError(_)));
    }

    #[tokio::test]
    #[ignore = "requires a running SurrealDB server"]
    async fn test_insert_then_find_general_document() {
        let store = SurrealStore::new(local_config());
        let tipo = format!("prueba-{}", std::process::id());

        assert!(store.find_general_document(&tipo).await.unwrap().is_none());

        let created = store
            .insert_general_document(NewGeneralDocument::new(tipo.clone(), "contenido"))
            .await
            .unwrap();
        assert!(!created.id.is_empty());

        let found = store.find_general_document(&tipo).await.unwrap().unwrap();
        assert_eq!(found, created);
    }

    #[tokio::test]
    async fn test_unreachable_server_keeps_failing_on_connect() {
        let store = SurrealStore::new(DatabaseConfig {
            connection_string: "ws://127.0.0.1:1".to_string(),
            ..DatabaseConfig::default()
        });

        for _ in 0..2 {
            let err = store.connect().await.unwrap_err();
            assert!(err.to_string().contains("SurrealDB connection failed"));
        }
    }

    #[tokio::test]
    #[ignore = "requires a running SurrealDB server"]
    async fn test_rejected_signin_is_retried_without_reconnecting() {
        let store = SurrealStore::new(DatabaseConfig {
            password: "definitely-not-the-root-password".to_string(),
            ..local_config()
        });

        // The socket opens, then signin fails; later attempts must fail at
        // signin again rather than on a second connect.
        for _ in 0..2 {
            let err = store.connect().await.unwrap_err();
            let message = err.to_string();
            assert!(message.contains("SurrealDB auth failed"), "{message}");
            assert!(!message.contains("connection failed"), "{message}");
        }
        assert!(store.transport.initialized());
        assert!(!store.session.initialized());
    }

    #[tokio::test]
    #[ignore = "requires a running SurrealDB server"]
    async fn test_find_student_requires_both_fields() {
        let store = SurrealStore::new(local_config());
        store.connect().await.unwrap();

        assert!(store
            .find_student("no-such-code", "no-such-password")
            .await
            .unwrap()
            .is_none());
    }
}
