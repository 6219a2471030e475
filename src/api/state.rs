use std::sync::Arc;

use crate::ai::chat::{TurnConfig, TurnProcessor};
use crate::chat::{ChatHost, SessionStore};
use crate::core::AppConfig;
use crate::openai::OpenAiClient;

/// Shared by every request. Nothing in here is written after startup,
/// per-session state lives behind the host's own locks.
pub struct AppState {
    pub host: Arc<ChatHost>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let client = OpenAiClient::new(
            &config.llm_endpoint,
            &config.llm_api_key,
            config.request_timeout,
        );
        let processor = TurnProcessor::new(Box::new(client), TurnConfig::from(&config));
        let store = SessionStore::new(&config.system_message);
        Self {
            host: Arc::new(ChatHost::new(store, processor)),
        }
    }
}
