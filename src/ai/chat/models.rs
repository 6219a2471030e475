//! The core models for managing a stateful chat with an LLM.
use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::openai::{Message, Role};

/// Ordered history of a chat session. Always starts with the system
/// instruction and only ever grows at the tail.
#[derive(Clone, Debug, PartialEq)]
pub struct Transcript(Vec<Message>);

impl Transcript {
    pub fn new(system_message: &str) -> Self {
        Self(vec![Message::new(Role::System, system_message)])
    }

    pub fn messages(&self) -> Vec<Message> {
        self.0.clone()
    }

    pub fn as_slice(&self) -> &[Message] {
        &self.0
    }

    pub(crate) fn push(&mut self, msg: Message) {
        self.0.push(msg)
    }

    pub(crate) fn len(&self) -> usize {
        self.0.len()
    }

    #[cfg(test)]
    pub(crate) fn roles(&self) -> Vec<Role> {
        self.0.iter().map(Message::role).collect()
    }
}

/// Something shown to the user on behalf of a chat session.
#[derive(Clone, Debug, PartialEq)]
pub enum Notice {
    Welcome(String),
    /// Attempt `attempt` (zero based) was rate limited and will be
    /// retried after `wait`
    RetryWarning { attempt: u32, wait: Duration },
    /// The assistant's Markdown reply
    Reply(String),
    RateLimitExceeded,
    Error(String),
}

impl Notice {
    pub fn is_markdown(&self) -> bool {
        matches!(self, Notice::Reply(_))
    }

    /// Terminal notices end a turn. Warnings and the welcome don't.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Notice::Reply(_) | Notice::RateLimitExceeded | Notice::Error(_)
        )
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Notice::Welcome(_) => "welcome",
            Notice::RetryWarning { .. } => "retry_warning",
            Notice::Reply(_) => "reply",
            Notice::RateLimitExceeded => "rate_limit_exceeded",
            Notice::Error(_) => "error",
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Notice::Welcome(content) | Notice::Reply(content) | Notice::Error(content) => {
                write!(f, "{}", content)
            }
            Notice::RetryWarning { wait, .. } => write!(
                f,
                "⚠️ Rate limit reached. Retrying in {} seconds...",
                format_secs(wait)
            ),
            Notice::RateLimitExceeded => write!(
                f,
                "❌ Rate limit exceeded. Please wait a moment and try again later."
            ),
        }
    }
}

// Whole seconds print without a fraction so the default policy reads
// "1 seconds", "2 seconds", ...
fn format_secs(wait: &Duration) -> String {
    if wait.subsec_nanos() == 0 {
        wait.as_secs().to_string()
    } else {
        format!("{:.3}", wait.as_secs_f64())
            .trim_end_matches('0')
            .trim_end_matches('.')
            .to_string()
    }
}

/// How a turn ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnOutcome {
    Succeeded,
    RateLimitExhausted,
    FatalError,
}
