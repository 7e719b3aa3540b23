//! In-memory collaborators for router tests

use crate::state::AppState;
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use uniportal_core::{
    Advisor, AppConfig, Course, GeneralDocument, LlmClient, NewGeneralDocument, PortalError,
    Result, Student, UniversityStore,
};

/// Vec-backed store with an optional injected failure
#[derive(Default)]
pub struct InMemoryStore {
    students: Mutex<Vec<Student>>,
    documents: Mutex<Vec<GeneralDocument>>,
    failure: Mutex<Option<String>>,
    next_id: AtomicU64,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_student(&self, student: Student) {
        self.students.lock().unwrap().push(student);
    }

    pub fn add_document(&self, document: NewGeneralDocument) -> GeneralDocument {
        let stored = document.with_id(self.assign_id());
        self.documents.lock().unwrap().push(stored.clone());
        stored
    }

    pub fn documents(&self) -> Vec<GeneralDocument> {
        self.documents.lock().unwrap().clone()
    }

    /// Make every subsequent call fail with `message`
    pub fn fail_with(&self, message: impl Into<String>) {
        *self.failure.lock().unwrap() = Some(message.into());
    }

    fn check(&self) -> Result<()> {
        match self.failure.lock().unwrap().as_ref() {
            Some(message) => Err(PortalError::DatabaseError(message.clone())),
            None => Ok(()),
        }
    }

    fn assign_id(&self) -> String {
        format!("mem{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1)
    }
}

#[async_trait]
impl UniversityStore for InMemoryStore {
    async fn count_students(&self) -> Result<u64> {
        self.check()?;
        Ok(self.students.lock().unwrap().len() as u64)
    }

    async fn find_student(
        &self,
        codigo_estudiante: &str,
        password: &str,
    ) -> Result<Option<Student>> {
        self.check()?;
        Ok(self
            .students
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.codigo_estudiante == codigo_estudiante && s.password_hash == password)
            .cloned())
    }

    async fn find_general_document(&self, tipo: &str) -> Result<Option<GeneralDocument>> {
        self.check()?;
        Ok(self
            .documents
            .lock()
            .unwrap()
            .iter()
            .find(|d| d.tipo == tipo)
            .cloned())
    }

    async fn insert_general_document(
        &self,
        document: NewGeneralDocument,
    ) -> Result<GeneralDocument> {
        self.check()?;
        Ok(self.add_document(document))
    }

    fn name(&self) -> &str {
        "memory"
    }
}

/// What [`ScriptedLlm`] does on the next call
#[derive(Debug, Clone)]
pub enum LlmReply {
    Answer(String),
    /// Model endpoint answered with this HTTP status
    Status(u16),
    /// Transport-level failure with this message
    Unreachable(String),
}

/// Language model double that records prompts
pub struct ScriptedLlm {
    reply: Mutex<LlmReply>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedLlm {
    pub fn answering(answer: impl Into<String>) -> Self {
        Self {
            reply: Mutex::new(LlmReply::Answer(answer.into())),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn set_reply(&self, reply: LlmReply) {
        *self.reply.lock().unwrap() = reply;
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmClient for ScriptedLlm {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        match self.reply.lock().unwrap().clone() {
            LlmReply::Answer(answer) => Ok(answer),
            LlmReply::Status(status) => Err(PortalError::LlmStatus {
                status,
                body: String::new(),
            }),
            LlmReply::Unreachable(message) => Err(PortalError::LlmError(message)),
        }
    }
}

/// Store, model and configuration wired together for one test
pub struct TestContext {
    pub config: AppConfig,
    pub store: Arc<InMemoryStore>,
    pub llm: Arc<ScriptedLlm>,
}

impl TestContext {
    pub fn new() -> Self {
        Self {
            config: AppConfig::default(),
            store: Arc::new(InMemoryStore::new()),
            llm: Arc::new(ScriptedLlm::answering("Respuesta de prueba")),
        }
    }

    pub fn state(&self) -> Arc<AppState> {
        Arc::new(AppState::new(
            self.config.clone(),
            self.store.clone(),
            self.llm.clone(),
        ))
    }

    pub fn router(&self) -> axum::Router {
        crate::create_router(self.state())
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

/// A fully populated student record
pub fn sample_student(codigo: &str, password: &str) -> Student {
    Student {
        id: format!("id-{codigo}"),
        codigo_estudiante: codigo.to_string(),
        password_hash: password.to_string(),
        nombre_completo: "Ana Quispe Rojas".to_string(),
        carrera: "Ingeniería de Sistemas".to_string(),
        promedio_ponderado: 15.4,
        asesor: Some(Advisor {
            nombre: "Luis Torres".to_string(),
            correo: "ltorres@uni.edu.pe".to_string(),
        }),
        cursos_inscritos: vec![
            Course {
                nombre: "Cálculo I".to_string(),
                codigo: "MA101".to_string(),
            },
            Course {
                nombre: "Programación I".to_string(),
                codigo: "IS101".to_string(),
            },
        ],
    }
}
