mod config;
mod logging;

pub use config::{AppConfig, DEFAULT_LLM_ENDPOINT, DEFAULT_LLM_MODEL};
pub use logging::init_tracing;
