//! # Helpdesk Core
//!
//! Core traits and types for the helpdesk client architecture.
//!
//! The client is built around a small set of abstractions borrowed from the
//! composable reducer pattern:
//!
//! - **State**: owned domain state for one feature (a "slice")
//! - **Action**: all possible inputs to a reducer - user commands and the
//!   response actions fed back by completed effects
//! - **Reducer**: pure function `(State, Action, Environment) → Effects`
//! - **Effect**: a description of a side effect (not its execution)
//! - **Environment**: injected dependencies behind traits
//!
//! Reducers never perform I/O themselves. An async operation is expressed as
//! a command action that flips the slice into its pending state and returns
//! an [`effect::Effect::Future`]; the runtime executes the future and feeds
//! the resulting response action back through the reducer.
//!
//! ## Example
//!
//! ```ignore
//! use helpdesk_core::{Effect, Reducer, SmallVec, smallvec};
//!
//! impl Reducer for CounterReducer {
//!     type State = CounterState;
//!     type Action = CounterAction;
//!     type Environment = CounterEnvironment;
//!
//!     fn reduce(
//!         &self,
//!         state: &mut CounterState,
//!         action: CounterAction,
//!         _env: &CounterEnvironment,
//!     ) -> SmallVec<[Effect<CounterAction>; 4]> {
//!         match action {
//!             CounterAction::Increment => {
//!                 state.count += 1;
//!                 smallvec![]
//!             }
//!         }
//!     }
//! }
//! ```

// Re-export commonly used types
pub use chrono::{DateTime, Utc};
pub use smallvec::{SmallVec, smallvec};

/// Reducer module - the core trait for slice logic.
///
/// Reducers are pure functions: `(State, Action, Environment) → Effects`.
/// They contain all state-transition logic and are deterministic and
/// testable in isolation.
pub mod reducer {
    use super::effect::Effect;
    use smallvec::SmallVec;

    /// Slice logic: state transitions plus the effects they request.
    ///
    /// A slice implements this once; the runtime store and the test
    /// harness both drive it through [`Reducer::reduce`].
    pub trait Reducer {
        /// Domain state owned by the slice
        type State;

        /// Commands and the response actions effects feed back
        type Action;

        /// Injected dependencies (API adapter, clock, stores)
        type Environment;

        /// Apply one action: mutate `state` in place and return the
        /// effects the runtime should execute.
        ///
        /// No I/O happens here. Anything asynchronous is described as an
        /// [`Effect`] and performed by the runtime, which feeds resulting
        /// response actions back through this same function.
        ///
        /// Most actions produce zero or one effect, so the effect list is a
        /// `SmallVec` that stays on the stack for the common case.
        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]>;
    }
}

/// Effect module - side effect descriptions.
///
/// Effects describe side effects to be performed by the runtime. They are
/// values (not execution) and are composable: effects can be merged to run
/// in parallel, chained to run sequentially, and mapped into a parent
/// action type when slices are composed into an application reducer.
pub mod effect {
    use std::future::Future;
    use std::pin::Pin;
    use std::time::Duration;

    /// A side effect as a value.
    ///
    /// Returned from reducers and executed by the runtime store; nothing
    /// runs at construction time. `Action` is the type the effect can feed
    /// back into the reducer once it completes.
    pub enum Effect<Action> {
        /// Nothing to do
        None,

        /// Execute the contained effects concurrently
        Parallel(Vec<Effect<Action>>),

        /// Execute the contained effects one after another
        Sequential(Vec<Effect<Action>>),

        /// Dispatch `action` after `duration` has elapsed
        Delay {
            /// Sleep before dispatching
            duration: Duration,
            /// Action fed back once the sleep ends
            action: Box<Action>,
        },

        /// An async computation; a `Some` output is fed back into the
        /// reducer as the next action
        Future(Pin<Box<dyn Future<Output = Option<Action>> + Send>>),
    }

    // Manual Debug implementation since Future doesn't implement Debug
    impl<Action> std::fmt::Debug for Effect<Action>
    where
        Action: std::fmt::Debug,
    {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                Effect::None => write!(f, "Effect::None"),
                Effect::Parallel(effects) => {
                    f.debug_tuple("Effect::Parallel").field(effects).finish()
                },
                Effect::Sequential(effects) => {
                    f.debug_tuple("Effect::Sequential").field(effects).finish()
                },
                Effect::Delay { duration, action } => f
                    .debug_struct("Effect::Delay")
                    .field("duration", duration)
                    .field("action", action)
                    .finish(),
                Effect::Future(_) => write!(f, "Effect::Future(<future>)"),
            }
        }
    }

    impl<Action> Effect<Action> {
        /// Group effects for concurrent execution
        #[must_use]
        pub const fn merge(effects: Vec<Effect<Action>>) -> Effect<Action> {
            Effect::Parallel(effects)
        }

        /// Group effects for one-after-another execution
        #[must_use]
        pub const fn chain(effects: Vec<Effect<Action>>) -> Effect<Action> {
            Effect::Sequential(effects)
        }

        /// Create an effect from an async computation.
        ///
        /// The future's output, if `Some`, is fed back into the reducer as a
        /// new action.
        pub fn future<F>(fut: F) -> Effect<Action>
        where
            F: Future<Output = Option<Action>> + Send + 'static,
        {
            Effect::Future(Box::pin(fut))
        }

        /// Map the action type produced by this effect.
        ///
        /// Used when composing slice reducers into an application reducer:
        /// each slice's effects are lifted into the application action type.
        #[must_use]
        pub fn map<B, F>(self, f: F) -> Effect<B>
        where
            Action: Send + 'static,
            B: Send + 'static,
            F: Fn(Action) -> B + Send + Sync + Clone + 'static,
        {
            match self {
                Effect::None => Effect::None,
                Effect::Parallel(effects) => Effect::Parallel(
                    effects.into_iter().map(|e| e.map(f.clone())).collect(),
                ),
                Effect::Sequential(effects) => Effect::Sequential(
                    effects.into_iter().map(|e| e.map(f.clone())).collect(),
                ),
                Effect::Delay { duration, action } => Effect::Delay {
                    duration,
                    action: Box::new(f(*action)),
                },
                Effect::Future(fut) => {
                    Effect::Future(Box::pin(async move { fut.await.map(f) }))
                },
            }
        }
    }
}

/// Environment module - dependency injection traits.
///
/// All external dependencies are abstracted behind traits and injected via
/// the Environment parameter, so reducers stay deterministic under test.
pub mod environment {
    use chrono::{DateTime, Utc};

    /// Source of the current time.
    ///
    /// Production uses [`SystemClock`]; tests pin `now()` to a fixed
    /// instant so timestamps written by reducers compare exactly.
    pub trait Clock: Send + Sync {
        /// The current time
        fn now(&self) -> DateTime<Utc>;
    }

    /// Production clock backed by the system time.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }
}

pub use effect::Effect;
pub use reducer::Reducer;
