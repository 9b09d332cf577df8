//! # Helpdesk Testing
//!
//! Test support for the helpdesk client workspace: a deterministic clock
//! and a Given-When-Then harness for slice reducers.
//!
//! Reducers are pure, so most slice tests never need a runtime: seed a
//! state, feed actions, assert on the result. The harness in
//! [`reducer_test`] does exactly that, and [`test_clock`] pins `now()` so
//! timestamps written by reducers are reproducible.
//!
//! ## Example
//!
//! ```ignore
//! use helpdesk_testing::{ReducerTest, test_clock};
//!
//! ReducerTest::new(TicketsReducer::new())
//!     .with_env(test_environment())
//!     .given_state(TicketsState::new())
//!     .when_action(TicketsAction::FetchAll { filter: TicketFilter::default() })
//!     .run()
//!     .then_state(|state| assert!(state.loading));
//! ```

use chrono::{DateTime, Utc};
use helpdesk_core::environment::Clock;

/// Given-When-Then reducer test harness.
pub mod reducer_test;

pub use reducer_test::{ReducerTest, TestRun, assertions};

/// Clock that always reports the same instant.
///
/// Injected wherever production code takes a [`Clock`], so state written
/// from `now()` (refresh stamps, entity timestamps) compares exactly.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    instant: DateTime<Utc>,
}

impl FixedClock {
    /// Pin the clock to the given instant.
    #[must_use]
    pub const fn new(instant: DateTime<Utc>) -> Self {
        Self { instant }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.instant
    }
}

/// The fixed clock used across the workspace's tests: 2025-01-01 00:00:00
/// UTC.
///
/// # Panics
///
/// Never in practice; the timestamp is a compile-time constant string.
#[must_use]
#[allow(clippy::expect_used)]
pub fn test_clock() -> FixedClock {
    FixedClock::new(
        DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
            .expect("hardcoded timestamp should always parse")
            .with_timezone(&Utc),
    )
}
