mod core;
pub mod models;
pub mod retry;

pub use self::core::{TurnConfig, TurnError, TurnProcessor};
pub use models::{Notice, Transcript, TurnOutcome};
pub use retry::{RetryPolicy, TurnState};
