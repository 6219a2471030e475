use handlebars::{Handlebars, RenderError};
use thiserror::Error;
use tokio::sync::mpsc;

use super::models::{Notice, Transcript, TurnOutcome};
use super::retry::{Attempt, RetryPolicy, Step, TurnState};
use crate::ai::prompt;
use crate::core::AppConfig;
use crate::openai::{BoxedChatCompletion, CompletionError, CompletionParams, Message, Role};

#[derive(Debug, Error)]
pub enum TurnError {
    #[error("rate limit exceeded after {attempts} attempts")]
    RateLimited { attempts: u32 },
    #[error(transparent)]
    RemoteCallFailed(#[from] CompletionError),
    #[error("no active chat session with ID {0}")]
    SessionStateMissing(String),
    #[error("failed to render prompt: {0}")]
    Prompt(#[from] RenderError),
}

impl TurnError {
    /// The message shown to the user when a turn fails.
    pub fn notice(&self) -> Notice {
        match self {
            TurnError::RateLimited { .. } => Notice::RateLimitExceeded,
            TurnError::RemoteCallFailed(CompletionError::Status { .. })
            | TurnError::SessionStateMissing(_) => Notice::Error(format!("Error: {}", self)),
            TurnError::RemoteCallFailed(_) | TurnError::Prompt(_) => Notice::Error(format!(
                "Error generating notes: {}. Please check your setup and try again.",
                self
            )),
        }
    }

    pub fn outcome(&self) -> TurnOutcome {
        match self {
            TurnError::RateLimited { .. } => TurnOutcome::RateLimitExhausted,
            _ => TurnOutcome::FatalError,
        }
    }
}

/// Read-only settings for every turn, built once at startup.
#[derive(Clone, Debug, PartialEq)]
pub struct TurnConfig {
    pub params: CompletionParams,
    pub retry: RetryPolicy,
}

impl From<&AppConfig> for TurnConfig {
    fn from(config: &AppConfig) -> Self {
        let mut params = CompletionParams::new(&config.llm_model);
        params.temperature = config.temperature;
        params.top_p = config.top_p;

        Self {
            params,
            retry: RetryPolicy::new(config.max_retries, config.retry_base_delay),
        }
    }
}

/// Runs a single turn of a chat: wraps the snippet, calls the model
/// (retrying when rate limited) and records the reply.
///
/// Holds no session state. The transcript is handed in on each call
/// so one processor can be shared by every session.
pub struct TurnProcessor {
    client: BoxedChatCompletion,
    config: TurnConfig,
    templates: Handlebars<'static>,
}

impl TurnProcessor {
    pub fn new(client: BoxedChatCompletion, config: TurnConfig) -> Self {
        Self {
            client,
            config,
            templates: prompt::templates(),
        }
    }

    /// Process `raw_input` against `transcript`, sending every notice
    /// for the turn to `tx`. Exactly one terminal notice is sent,
    /// possibly preceded by retry warnings.
    pub async fn process_turn(
        &self,
        transcript: &mut Transcript,
        raw_input: &str,
        tx: &mpsc::UnboundedSender<Notice>,
    ) -> TurnOutcome {
        match self.next_msg(transcript, raw_input, tx).await {
            Ok(reply) => {
                // The receiver may have gone away, the reply is
                // still kept in the transcript
                let _ = tx.send(Notice::Reply(reply.content().to_string()));
                TurnOutcome::Succeeded
            }
            Err(e) => {
                tracing::error!("Turn failed: {}", e);
                let _ = tx.send(e.notice());
                e.outcome()
            }
        }
    }

    async fn next_msg(
        &self,
        transcript: &mut Transcript,
        raw_input: &str,
        tx: &mpsc::UnboundedSender<Notice>,
    ) -> Result<Message, TurnError> {
        let content = prompt::code_notes(&self.templates, raw_input)?;
        transcript.push(Message::new(Role::User, &content));

        let mut retry = self.config.retry.start();
        loop {
            let result = self
                .client
                .complete(transcript.as_slice(), &self.config.params)
                .await;
            let attempt = match &result {
                Ok(_) => Attempt::Success,
                Err(e) if e.is_rate_limited() => Attempt::RateLimited,
                Err(_) => Attempt::Failed,
            };

            match (retry.advance(attempt), result) {
                (Step::Retry { failed, wait }, _) => {
                    tracing::warn!(
                        "Rate limited on attempt {}/{}, retrying in {:?}",
                        failed + 1,
                        self.config.retry.max_attempts(),
                        wait
                    );
                    let _ = tx.send(Notice::RetryWarning {
                        attempt: failed,
                        wait,
                    });
                    tokio::time::sleep(wait).await;
                }
                (Step::Finished(TurnState::RateLimitExhausted), _) => {
                    return Err(TurnError::RateLimited {
                        attempts: self.config.retry.max_attempts(),
                    });
                }
                (Step::Finished(_), Err(e)) => return Err(e.into()),
                (Step::Finished(_), Ok(reply)) => {
                    let msg = Message::new(Role::Assistant, &reply);
                    transcript.push(msg.clone());
                    return Ok(msg);
                }
            }
        }
    }
}
