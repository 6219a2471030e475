//! Public types for the chat API
use serde::{Deserialize, Serialize};

use crate::ai::chat::{Notice, TurnOutcome};
use crate::openai::Message;

#[derive(Deserialize, Default)]
pub struct StartSessionRequest {
    // Generated when not provided
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Serialize, Deserialize)]
pub struct StartSessionResponse {
    pub session_id: String,
    pub notice: NoticeEvent,
}

fn default_stream() -> bool {
    true
}

#[derive(Deserialize)]
pub struct ChatRequest {
    pub session_id: String,
    pub message: String,
    // Respond with server-sent events unless set to false
    #[serde(default = "default_stream")]
    pub stream: bool,
}

/// A `Notice` as sent over the wire, either as an SSE `data` payload
/// or as part of a `ChatResponse`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct NoticeEvent {
    pub r#type: String,
    pub content: String,
    pub markdown: bool,
    pub terminal: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wait_ms: Option<u64>,
}

impl From<&Notice> for NoticeEvent {
    fn from(notice: &Notice) -> Self {
        let wait_ms = match notice {
            Notice::RetryWarning { wait, .. } => {
                Some(u64::try_from(wait.as_millis()).unwrap_or(u64::MAX))
            }
            _ => None,
        };
        Self {
            r#type: notice.kind().to_string(),
            content: notice.to_string(),
            markdown: notice.is_markdown(),
            terminal: notice.is_terminal(),
            wait_ms,
        }
    }
}

#[derive(Serialize, Deserialize)]
pub struct ChatResponse {
    pub outcome: TurnOutcome,
    pub notices: Vec<NoticeEvent>,
}

#[derive(Serialize)]
pub struct ChatTranscriptResponse {
    pub transcript: Vec<Message>,
}
