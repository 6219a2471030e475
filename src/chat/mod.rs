mod host;
mod store;

pub use host::ChatHost;
pub use store::{SessionStore, SharedTranscript};
