//! Test utilities for integration tests
use std::sync::Arc;
use std::time::Duration;

use axum::{Router, body::Body};

use snippet_notes::api::AppState;
use snippet_notes::api::app;
use snippet_notes::core::AppConfig;

pub const TEST_SYSTEM_MESSAGE: &str = "You are a helpful assistant.";

/// Creates a test application router that talks to a completion
/// endpoint at `llm_endpoint`, usually a `mockito` server.
///
/// Retries back off in milliseconds instead of seconds to keep the
/// rate limit tests quick.
pub fn test_app(llm_endpoint: &str) -> Router {
    let mut app_config = AppConfig::new("test-api-key");
    app_config.llm_endpoint = llm_endpoint.to_string();
    app_config.llm_model = String::from("xai/grok-3");
    app_config.system_message = String::from(TEST_SYSTEM_MESSAGE);
    app_config.retry_base_delay = Duration::from_millis(10);
    app_config.request_timeout = Duration::from_secs(5);

    let app_state = AppState::new(app_config);
    app(Arc::new(app_state))
}

pub async fn body_to_string(body: Body) -> String {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Failed to read body");
    String::from_utf8(bytes.to_vec()).expect("Body is not valid UTF-8")
}

/// Completion response body with `content` as the assistant's message
pub fn completion_body(content: &str) -> String {
    serde_json::json!({
        "id": "chatcmpl-123",
        "object": "chat.completion",
        "created": 1694268190,
        "model": "xai/grok-3",
        "choices": [{
            "index": 0,
            "message": {
                "role": "assistant",
                "content": content
            },
            "finish_reason": "stop"
        }]
    })
    .to_string()
}
