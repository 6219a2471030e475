//! Retry policy for rate limited completion calls, kept apart from
//! the HTTP client so it can be tested on its own.
use std::time::Duration;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(1);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS, DEFAULT_BASE_DELAY)
    }
}

impl RetryPolicy {
    /// At least one attempt is always made.
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn base_delay(&self) -> Duration {
        self.base_delay
    }

    /// Wait before retrying after attempt `n` failed: `base * 2^n`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(2u32.saturating_pow(attempt))
    }

    pub fn start(&self) -> RetryState {
        RetryState {
            policy: *self,
            state: TurnState::Attempting(0),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TurnState {
    Attempting(u32),
    Succeeded,
    RateLimitExhausted,
    FatalError,
}

/// Result of a single remote call, as far as retrying cares.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Attempt {
    Success,
    RateLimited,
    Failed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    /// Attempt `failed` was rate limited. Sleep for `wait` then try again.
    Retry { failed: u32, wait: Duration },
    Finished(TurnState),
}

/// Per-turn retry bookkeeping. Thrown away when the turn ends.
#[derive(Clone, Copy, Debug)]
pub struct RetryState {
    policy: RetryPolicy,
    state: TurnState,
}

impl RetryState {
    pub fn state(&self) -> TurnState {
        self.state
    }

    pub fn advance(&mut self, attempt: Attempt) -> Step {
        let n = match self.state {
            TurnState::Attempting(n) => n,
            finished => return Step::Finished(finished),
        };

        match attempt {
            Attempt::RateLimited if n + 1 < self.policy.max_attempts => {
                self.state = TurnState::Attempting(n + 1);
                Step::Retry {
                    failed: n,
                    wait: self.policy.delay_for(n),
                }
            }
            Attempt::RateLimited => self.finish(TurnState::RateLimitExhausted),
            Attempt::Success => self.finish(TurnState::Succeeded),
            Attempt::Failed => self.finish(TurnState::FatalError),
        }
    }

    fn finish(&mut self, state: TurnState) -> Step {
        self.state = state;
        Step::Finished(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts(), 3);
        assert_eq!(policy.base_delay(), Duration::from_secs(1));
    }

    #[test]
    fn test_delay_doubles() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(0), Duration::from_secs(1));
        assert_eq!(policy.delay_for(1), Duration::from_secs(2));
        assert_eq!(policy.delay_for(2), Duration::from_secs(4));

        let policy = RetryPolicy::new(5, Duration::from_millis(250));
        assert_eq!(policy.delay_for(3), Duration::from_secs(2));
    }

    #[test]
    fn test_delay_saturates() {
        let policy = RetryPolicy::new(100, Duration::from_secs(1));
        assert_eq!(policy.delay_for(64), Duration::from_secs(u64::from(u32::MAX)));
    }

    #[test]
    fn test_zero_attempts_clamped_to_one() {
        let policy = RetryPolicy::new(0, Duration::from_secs(1));
        assert_eq!(policy.max_attempts(), 1);

        let mut state = policy.start();
        assert_eq!(
            state.advance(Attempt::RateLimited),
            Step::Finished(TurnState::RateLimitExhausted)
        );
    }

    #[test]
    fn test_success_on_first_attempt() {
        let mut state = RetryPolicy::default().start();
        assert_eq!(state.state(), TurnState::Attempting(0));
        assert_eq!(
            state.advance(Attempt::Success),
            Step::Finished(TurnState::Succeeded)
        );
        assert_eq!(state.state(), TurnState::Succeeded);
    }

    #[test]
    fn test_rate_limited_until_exhausted() {
        let mut state = RetryPolicy::default().start();
        assert_eq!(
            state.advance(Attempt::RateLimited),
            Step::Retry {
                failed: 0,
                wait: Duration::from_secs(1)
            }
        );
        assert_eq!(state.state(), TurnState::Attempting(1));
        assert_eq!(
            state.advance(Attempt::RateLimited),
            Step::Retry {
                failed: 1,
                wait: Duration::from_secs(2)
            }
        );
        assert_eq!(state.state(), TurnState::Attempting(2));
        assert_eq!(
            state.advance(Attempt::RateLimited),
            Step::Finished(TurnState::RateLimitExhausted)
        );
    }

    #[test]
    fn test_failure_is_fatal_regardless_of_budget() {
        let mut state = RetryPolicy::default().start();
        assert!(matches!(
            state.advance(Attempt::RateLimited),
            Step::Retry { .. }
        ));
        assert_eq!(
            state.advance(Attempt::Failed),
            Step::Finished(TurnState::FatalError)
        );
    }

    #[test]
    fn test_finished_state_is_absorbing() {
        let mut state = RetryPolicy::default().start();
        state.advance(Attempt::Failed);
        assert_eq!(
            state.advance(Attempt::Success),
            Step::Finished(TurnState::FatalError)
        );
    }
}
