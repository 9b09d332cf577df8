//! Bounded retry-polling with linear backoff.
//!
//! This module provides the mechanism for resolving a value that an external
//! asynchronous process produces some time after it was requested: poll a
//! fetch function up to a fixed number of attempts, backing off linearly
//! between attempts, and stop on the first attempt that yields a payload.
//!
//! Per-attempt failures (transport errors, empty payloads) are absorbed and
//! logged; only exhaustion of the whole attempt budget surfaces as an error.
//! Callers for whom the value is an enhancement rather than a requirement
//! downgrade even that to "absent".
//!
//! # Example
//!
//! ```rust
//! use helpdesk_runtime::poll::{PollPolicy, poll_until_some};
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), helpdesk_runtime::poll::PollError> {
//! let policy = PollPolicy::new()
//!     .with_max_attempts(5)
//!     .with_backoff_unit(Duration::from_millis(100));
//!
//! let value = poll_until_some(&policy, |_attempt| async {
//!     // Your fetch here; Ok(None) means "not produced yet"
//!     Ok::<_, String>(Some(42))
//! })
//! .await?;
//! assert_eq!(value, 42);
//! # Ok(())
//! # }
//! ```

use std::time::Duration;
use thiserror::Error;
use tokio::time::sleep;

/// Polling policy: attempt budget and backoff shape.
///
/// Attempt `n` (1-indexed) that does not yield a payload is followed by a
/// sleep of `backoff_unit * n`, so the defaults wait 1s, 2s, 3s, 4s, 5s -
/// roughly 15 seconds worst case across the whole budget.
#[derive(Debug, Clone)]
pub struct PollPolicy {
    /// Maximum number of attempts before giving up
    pub max_attempts: u32,
    /// Base delay; attempt `n` backs off for `backoff_unit * n`
    pub backoff_unit: Duration,
}

impl PollPolicy {
    /// Create a policy with the default budget (5 attempts, 1s unit).
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_attempts: 5,
            backoff_unit: Duration::from_secs(1),
        }
    }

    /// Set the maximum number of attempts.
    #[must_use]
    pub const fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Set the base backoff unit.
    #[must_use]
    pub const fn with_backoff_unit(mut self, unit: Duration) -> Self {
        self.backoff_unit = unit;
        self
    }

    /// Delay to wait after a failed attempt (1-indexed).
    #[must_use]
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        self.backoff_unit * attempt
    }
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self::new()
    }
}

/// Polling failed to produce a value within the attempt budget.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PollError {
    /// All attempts were exhausted without a payload.
    #[error("No result after {attempts} attempts")]
    Exhausted {
        /// Number of attempts that were made
        attempts: u32,
    },
}

/// The polling state machine, independent of any timer primitive.
///
/// [`poll_until_some`] drives it with real sleeps; the transitions
/// themselves are pure and can be tested without a runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    /// About to issue attempt `n` (1-indexed)
    Attempting(u32),
    /// Attempt `n` did not yield a payload; its backoff is pending
    BackingOff(u32),
    /// A payload was produced
    Resolved,
    /// The attempt budget ran out
    Exhausted,
}

impl PollState {
    /// Initial state: about to issue the first attempt.
    #[must_use]
    pub const fn start() -> Self {
        Self::Attempting(1)
    }

    /// Transition for the outcome of the pending attempt.
    #[must_use]
    pub const fn after_attempt(self, succeeded: bool) -> Self {
        match self {
            Self::Attempting(_) if succeeded => Self::Resolved,
            Self::Attempting(n) => Self::BackingOff(n),
            other => other,
        }
    }

    /// Transition once the pending backoff has elapsed.
    #[must_use]
    pub const fn after_backoff(self, policy: &PollPolicy) -> Self {
        match self {
            Self::BackingOff(n) if n >= policy.max_attempts => Self::Exhausted,
            Self::BackingOff(n) => Self::Attempting(n + 1),
            other => other,
        }
    }

    /// Whether polling has finished (successfully or not).
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Resolved | Self::Exhausted)
    }
}

/// Poll an async fetch until it yields a payload, with linear backoff.
///
/// Attempt `n` (1-indexed) awaits `attempt_fn(n)`:
///
/// - `Ok(Some(value))` - first success wins; returns immediately
/// - `Ok(None)` - the value does not exist yet; back off and try again
/// - `Err(_)` - the attempt failed; logged and absorbed, back off and retry
///
/// After the final failed attempt the backoff sleep still runs before the
/// budget is declared exhausted, matching the worst-case bound documented on
/// [`PollPolicy`].
///
/// # Errors
///
/// Returns [`PollError::Exhausted`] when no attempt produced a payload.
pub async fn poll_until_some<F, Fut, T, E>(
    policy: &PollPolicy,
    mut attempt_fn: F,
) -> Result<T, PollError>
where
    F: FnMut(u32) -> Fut,
    Fut: std::future::Future<Output = Result<Option<T>, E>>,
    E: std::fmt::Display,
{
    let mut state = PollState::start();

    loop {
        match state {
            PollState::Attempting(attempt) => {
                match attempt_fn(attempt).await {
                    Ok(Some(value)) => {
                        if attempt > 1 {
                            tracing::info!(attempt, "poll resolved after retries");
                        }
                        return Ok(value);
                    },
                    Ok(None) => {
                        tracing::debug!(attempt, "poll returned empty payload");
                    },
                    Err(err) => {
                        tracing::warn!(attempt, error = %err, "poll attempt failed");
                    },
                }
                state = state.after_attempt(false);
            },

            PollState::BackingOff(attempt) => {
                let delay = policy.delay_for_attempt(attempt);
                tracing::debug!(
                    attempt,
                    delay_ms = delay.as_millis(),
                    "backing off before next attempt"
                );
                sleep(delay).await;
                state = state.after_backoff(policy);
            },

            // Success returns straight from the attempt arm, so the only
            // terminal state the driver can reach is Exhausted
            PollState::Resolved | PollState::Exhausted => {
                tracing::warn!(
                    attempts = policy.max_attempts,
                    "poll exhausted its attempt budget"
                );
                return Err(PollError::Exhausted {
                    attempts: policy.max_attempts,
                });
            },
        }
    }
}
