//! Portal RAG - answers student questions from the stored regulations
//!
//! The pipeline is a single pass:
//! 1. Load the `reglamento` general document (seeding a default one if absent)
//! 2. Build a context-only prompt around it
//! 3. Ask the language model and relay its answer

pub mod llm;

pub use llm::OllamaClient;

use std::sync::Arc;
use uniportal_core::{GeneralDocument, LlmClient, NewGeneralDocument, Result, UniversityStore};

/// Type tag of the document used as chat context
pub const REGLAMENTO_TIPO: &str = "reglamento";

/// Content stored when no regulation document exists yet
pub const FALLBACK_REGLAMENTO: &str = "Capítulo 4: Procesos Académicos. Artículo 45: Retiro de Curso. El proceso para el retiro es: 1. Llenar el formulario F-02, disponible en la sección de trámites. 2. Pagar la tasa de 50 soles en tesorería. 3. El plazo máximo es hasta la semana 8 del ciclo académico.";

/// Build the model prompt: instruction, context, then question
pub fn build_prompt(context: &str, question: &str) -> String {
    format!(
        "**Instrucción:** Eres un asistente estudiantil amigable. Responde la pregunta del usuario basándote *únicamente* en el siguiente contexto.\n\
         **Contexto (Reglamento):**\n\
         {context}\n\
         **Pregunta del Usuario:**\n\
         {question}\n\
         **Respuesta:**\n"
    )
}

/// Chat service composing the document store and the language model
#[derive(Clone)]
pub struct ChatAssistant {
    store: Arc<dyn UniversityStore>,
    llm: Arc<dyn LlmClient>,
}

impl ChatAssistant {
    pub fn new(store: Arc<dyn UniversityStore>, llm: Arc<dyn LlmClient>) -> Self {
        Self { store, llm }
    }

    /// Regulation document for this request.
    ///
    /// Inserts the fallback document when none exists. Two concurrent first
    /// requests can both insert; later lookups take whichever comes first.
    pub async fn working_document(&self) -> Result<GeneralDocument> {
        if let Some(document) = self.store.find_general_document(REGLAMENTO_TIPO).await? {
            return Ok(document);
        }

        tracing::info!(
            backend = self.store.name(),
            "no regulation document found, storing the default one"
        );
        self.store
            .insert_general_document(NewGeneralDocument::new(
                REGLAMENTO_TIPO,
                FALLBACK_REGLAMENTO,
            ))
            .await
    }

    /// Answer `question` using only the regulation document as context
    pub async fn answer(&self, question: &str) -> Result<String> {
        let document = self.working_document().await?;
        let prompt = build_prompt(&document.contenido, question);

        tracing::debug!(
            document_id = %document.id,
            prompt_chars = prompt.chars().count(),
            "sending chat prompt to model"
        );
        self.llm.generate(&prompt).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use proptest::prelude::*;
    use std::sync::Mutex;
    use uniportal_core::{PortalError, Student};

    #[derive(Default)]
    struct DocStore {
        docs: Mutex<Vec<GeneralDocument>>,
    }

    #[async_trait]
    impl UniversityStore for DocStore {
        async fn count_students(&self) -> Result<u64> {
            Ok(0)
        }

        async fn find_student(&self, _: &str, _: &str) -> Result<Option<Student>> {
            Ok(None)
        }

        async fn find_general_document(&self, tipo: &str) -> Result<Option<GeneralDocument>> {
            Ok(self
                .docs
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
            let mut docs = self.docs.lock().unwrap();
            let stored = document.with_id(format!("doc-{}", docs.len() + 1));
            docs.push(stored.clone());
            Ok(stored)
        }

        fn name(&self) -> &str {
            "test"
        }
    }

    #[derive(Default)]
    struct EchoLlm {
        prompts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl LlmClient for EchoLlm {
        async fn generate(&self, prompt: &str) -> Result<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            Ok("respuesta".to_string())
        }
    }

    struct DownLlm;

    #[async_trait]
    impl LlmClient for DownLlm {
        async fn generate(&self, _: &str) -> Result<String> {
            Err(PortalError::LlmStatus {
                status: 500,
                body: String::new(),
            })
        }
    }

    #[tokio::test]
    async fn test_first_answer_seeds_fallback_document() {
        let store = Arc::new(DocStore::default());
        let llm = Arc::new(EchoLlm::default());
        let assistant = ChatAssistant::new(store.clone(), llm.clone());

        let question = "¿Cómo me retiro de un curso?";
        assert_eq!(assistant.answer(question).await.unwrap(), "respuesta");

        let docs = store.docs.lock().unwrap().clone();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].tipo, REGLAMENTO_TIPO);
        assert_eq!(docs[0].contenido, FALLBACK_REGLAMENTO);

        let prompt = llm.prompts.lock().unwrap()[0].clone();
        let context_at = prompt.find(FALLBACK_REGLAMENTO).unwrap();
        let question_at = prompt.find(question).unwrap();
        assert!(context_at < question_at);
    }

    #[tokio::test]
    async fn test_existing_document_is_reused() {
        let store = Arc::new(DocStore::default());
        store
            .insert_general_document(NewGeneralDocument::new(REGLAMENTO_TIPO, "Artículo 1."))
            .await
            .unwrap();
        let llm = Arc::new(EchoLlm::default());
        let assistant = ChatAssistant::new(store.clone(), llm.clone());

        assistant.answer("a").await.unwrap();
        assistant.answer("b").await.unwrap();

        assert_eq!(store.docs.lock().unwrap().len(), 1);
        for prompt in llm.prompts.lock().unwrap().iter() {
            assert!(prompt.contains("Artículo 1."));
            assert!(!prompt.contains(FALLBACK_REGLAMENTO));
        }
    }

    #[tokio::test]
    async fn test_model_error_is_propagated() {
        let assistant = ChatAssistant::new(Arc::new(DocStore::default()), Arc::new(DownLlm));
        let err = assistant.answer("hola").await.unwrap_err();
        assert!(matches!(err, PortalError::LlmStatus { status: 500, .. }));
    }

    #[test]
    fn test_prompt_layout() {
        let prompt = build_prompt("CTX", "Q?");
        assert!(prompt.starts_with("**Instrucción:** Eres un asistente estudiantil amigable."));
        assert!(prompt.contains("**Contexto (Reglamento):**\nCTX\n**Pregunta del Usuario:**\nQ?\n"));
        assert!(prompt.trim_end().ends_with("**Respuesta:**"));
    }

    proptest! {
        #[test]
        fn prop_prompt_keeps_context_before_question(
            context in "[a-zA-Z0-9 .,]{1,200}",
            question in "[a-zA-Z0-9 ?]{1,80}",
        ) {
            let prompt = build_prompt(&context, &question);
            let context_at = prompt.find("**Contexto (Reglamento):**\n").unwrap();
            let question_at = prompt.find("**Pregunta del Usuario:**\n").unwrap();

            prop_assert!(prompt[context_at..question_at].contains(context.as_str()));
            prop_assert!(prompt[question_at..].contains(question.as_str()));
        }
    }
}
