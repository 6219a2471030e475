use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tokio::sync::Mutex;

use crate::ai::chat::Transcript;

/// A session's transcript. The async mutex is held for the whole turn
/// so turns within a session run one at a time while other sessions
/// carry on.
pub type SharedTranscript = Arc<Mutex<Transcript>>;

/// In-memory transcripts keyed by session ID. Nothing survives a
/// restart.
pub struct SessionStore {
    system_message: String,
    sessions: RwLock<HashMap<String, SharedTranscript>>,
}

impl SessionStore {
    pub fn new(system_message: &str) -> Self {
        Self {
            system_message: system_message.to_string(),
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Start a fresh transcript for `session_id` seeded with the system
    /// message, replacing whatever was there.
    pub fn initialize(&self, session_id: &str) -> SharedTranscript {
        let transcript = Arc::new(Mutex::new(Transcript::new(&self.system_message)));
        self.sessions
            .write()
            .expect("Unable to write session store")
            .insert(session_id.to_string(), Arc::clone(&transcript));
        transcript
    }

    pub fn get(&self, session_id: &str) -> Option<SharedTranscript> {
        self.sessions
            .read()
            .expect("Unable to read session store")
            .get(session_id)
            .cloned()
    }

    /// Drop the transcript. Returns false when there was nothing to
    /// clear. A turn still holding the transcript finishes against
    /// the orphaned copy.
    pub fn clear(&self, session_id: &str) -> bool {
        self.sessions
            .write()
            .expect("Unable to write session store")
            .remove(session_id)
            .is_some()
    }

    pub fn len(&self) -> usize {
        self.sessions
            .read()
            .expect("Unable to read session store")
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
