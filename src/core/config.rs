use std::env;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};

use crate::ai::prompt::SYSTEM_PROMPT;

pub const DEFAULT_LLM_ENDPOINT: &str = "https://models.github.ai/inference";
pub const DEFAULT_LLM_MODEL: &str = "xai/grok-3";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub llm_endpoint: String,
    pub llm_api_key: String,
    pub llm_model: String,
    pub system_message: String,
    pub temperature: f64,
    pub top_p: f64,
    pub max_retries: u32,
    pub retry_base_delay: Duration,
    pub request_timeout: Duration,
}

impl AppConfig {
    /// Everything except the credential has a default so the only
    /// thing needed to get going is `GITHUB_TOKEN`.
    pub fn new(llm_api_key: &str) -> Self {
        Self {
            llm_endpoint: DEFAULT_LLM_ENDPOINT.to_string(),
            llm_api_key: llm_api_key.to_string(),
            llm_model: DEFAULT_LLM_MODEL.to_string(),
            system_message: SYSTEM_PROMPT.to_string(),
            temperature: 0.3,
            top_p: 0.9,
            max_retries: 3,
            retry_base_delay: Duration::from_secs(1),
            request_timeout: Duration::from_secs(60 * 10),
        }
    }

    /// Read configuration from the environment. Only called once at
    /// startup, nothing else in the crate touches env vars.
    pub fn from_env() -> Result<Self> {
        let llm_api_key = env::var("GITHUB_TOKEN")
            .map_err(|_| anyhow!("Missing env var GITHUB_TOKEN"))?;
        let mut config = Self::new(&llm_api_key);

        if let Ok(endpoint) = env::var("NOTES_LLM_ENDPOINT") {
            config.llm_endpoint = endpoint;
        }
        if let Ok(model) = env::var("NOTES_LLM_MODEL") {
            config.llm_model = model;
        }
        if let Ok(system_message) = env::var("NOTES_SYSTEM_MESSAGE") {
            config.system_message = system_message;
        }
        if let Some(temperature) = parse_env("NOTES_TEMPERATURE")? {
            config.temperature = temperature;
        }
        if let Some(top_p) = parse_env("NOTES_TOP_P")? {
            config.top_p = top_p;
        }
        if let Some(max_retries) = parse_env("NOTES_MAX_RETRIES")? {
            config.max_retries = max_retries;
        }
        if let Some(delay_ms) = parse_env::<u64>("NOTES_RETRY_BASE_DELAY_MS")? {
            config.retry_base_delay = Duration::from_millis(delay_ms);
        }
        if let Some(timeout_secs) = parse_env::<u64>("NOTES_REQUEST_TIMEOUT_SECS")? {
            config.request_timeout = Duration::from_secs(timeout_secs);
        }

        Ok(config)
    }
}

fn parse_env<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(val) => val
            .trim()
            .parse::<T>()
            .map(Some)
            .with_context(|| format!("Invalid value for env var {}: {}", key, val)),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_uses_defaults() {
        let config = AppConfig::new("test-token");
        assert_eq!(config.llm_api_key, "test-token");
        assert_eq!(config.llm_endpoint, DEFAULT_LLM_ENDPOINT);
        assert_eq!(config.llm_model, DEFAULT_LLM_MODEL);
        assert_eq!(config.system_message, SYSTEM_PROMPT);
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.retry_base_delay, Duration::from_secs(1));
        assert_eq!(config.temperature, 0.3);
        assert_eq!(config.top_p, 0.9);
    }

    #[test]
    fn test_parse_env_missing_is_none() {
        let val = parse_env::<u32>("NOTES_TEST_SURELY_NOT_SET").unwrap();
        assert!(val.is_none());
    }
}
