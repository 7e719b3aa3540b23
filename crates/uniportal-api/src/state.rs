//! Application state management

use std::sync::Arc;
use uniportal_core::{AppConfig, LlmClient, UniversityStore};
use uniportal_rag::ChatAssistant;

/// Application state shared across handlers
pub struct AppState {
    /// Application configuration
    pub config: AppConfig,
    /// Document store
    pub store: Arc<dyn UniversityStore>,
    /// Regulation chat built on the same store
    pub chat: ChatAssistant,
}

impl AppState {
    /// Create new application state from its collaborators
    pub fn new(
        config: AppConfig,
        store: Arc<dyn UniversityStore>,
        llm: Arc<dyn LlmClient>,
    ) -> Self {
        let chat = ChatAssistant::new(store.clone(), llm);
        Self {
            config,
            store,
            chat,
        }
    }
}
