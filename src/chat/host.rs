//! Entry points a chat UI calls into: session start, each user
//! message, and session end.
use tokio::sync::mpsc;

use super::store::SessionStore;
use crate::ai::chat::{Notice, TurnError, TurnOutcome, TurnProcessor};
use crate::ai::prompt::WELCOME_MESSAGE;
use crate::openai::Message;

pub struct ChatHost {
    store: SessionStore,
    processor: TurnProcessor,
}

impl ChatHost {
    pub fn new(store: SessionStore, processor: TurnProcessor) -> Self {
        Self { store, processor }
    }

    pub fn on_session_start(&self, session_id: &str) -> Notice {
        self.store.initialize(session_id);
        tracing::info!(
            "Started chat session {} ({} active)",
            session_id,
            self.active_sessions()
        );
        Notice::Welcome(WELCOME_MESSAGE.to_string())
    }

    /// Run one turn for `session_id`. A session that was never started
    /// (or already ended) is reported to the user rather than being
    /// silently recreated without its system message.
    pub async fn on_user_message(
        &self,
        session_id: &str,
        text: &str,
        tx: &mpsc::UnboundedSender<Notice>,
    ) -> TurnOutcome {
        let Some(transcript) = self.store.get(session_id) else {
            let err = TurnError::SessionStateMissing(session_id.to_string());
            tracing::warn!("{}", err);
            let _ = tx.send(err.notice());
            return err.outcome();
        };

        let mut transcript = transcript.lock().await;
        let outcome = self.processor.process_turn(&mut transcript, text, tx).await;
        tracing::debug!(
            "Session {} turn finished: {:?} ({} messages)",
            session_id,
            outcome,
            transcript.len()
        );
        outcome
    }

    pub fn on_session_end(&self, session_id: &str) -> bool {
        tracing::info!("Ending chat session {}", session_id);
        self.store.clear(session_id)
    }

    /// Snapshot of a session's messages, waiting for any turn in
    /// progress to finish.
    pub async fn transcript(&self, session_id: &str) -> Option<Vec<Message>> {
        let transcript = self.store.get(session_id)?;
        let messages = transcript.lock().await.messages();
        Some(messages)
    }

    pub fn active_sessions(&self) -> usize {
        self.store.len()
    }
}
