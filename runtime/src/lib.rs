//! # Helpdesk Runtime
//!
//! Runtime implementation for the helpdesk client architecture.
//!
//! This crate provides the [`Store`] that coordinates reducer execution and
//! effect handling, and the [`poll`] module implementing bounded
//! retry-polling with linear backoff.
//!
//! ## Core Components
//!
//! - **Store**: owns state behind an async lock, runs the reducer for each
//!   action, and executes the returned effects in spawned tasks
//! - **`EffectHandle`**: returned by [`Store::send`]; lets callers await the
//!   completion of an action's effects, including feedback actions and
//!   their transitive effects
//! - **poll**: `poll_until_some` - attempt-bounded polling for a value that
//!   an external process produces asynchronously
//!
//! ## Example
//!
//! ```ignore
//! use helpdesk_runtime::Store;
//!
//! let store = Store::new(initial_state, my_reducer, environment);
//!
//! // Dispatch an action and wait for its effects to settle
//! store.send(Action::Refresh).await.wait().await;
//!
//! // Read state
//! let count = store.state(|s| s.items.len()).await;
//! ```

use helpdesk_core::{effect::Effect, reducer::Reducer};
use futures::future::BoxFuture;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::{RwLock, watch};

/// Bounded retry-polling with linear backoff
pub mod poll;

/// Error types for the Store runtime
pub mod error {
    use thiserror::Error;

    /// Errors that can occur while waiting on Store operations.
    #[derive(Error, Debug)]
    pub enum StoreError {
        /// Timeout waiting for effects to complete.
        ///
        /// Returned by `EffectHandle::wait_with_timeout` when the timeout
        /// expires before all tracked effects finish.
        #[error("Timeout waiting for effects to complete")]
        Timeout,
    }
}

pub use error::StoreError;

/// Handle for tracking effect completion.
///
/// Returned by [`Store::send`]. Each dispatched action gets a handle that
/// can be awaited to know when its effects - including response actions fed
/// back by [`Effect::Future`] and anything those spawn - are done.
///
/// # Example
///
/// ```ignore
/// let mut handle = store.send(Action::Refresh).await;
/// handle.wait().await;
/// // All effects from Action::Refresh are now complete
/// ```
#[derive(Clone)]
pub struct EffectHandle {
    pending: Arc<AtomicUsize>,
    completion: watch::Receiver<()>,
}

impl EffectHandle {
    fn new() -> (Self, EffectTracking) {
        let pending = Arc::new(AtomicUsize::new(0));
        let (notifier, completion) = watch::channel(());

        let handle = Self {
            pending: Arc::clone(&pending),
            completion,
        };

        let tracking = EffectTracking { pending, notifier };

        (handle, tracking)
    }

    /// Create a handle that is already complete.
    ///
    /// Useful as an initial value when accumulating handles in a loop.
    #[must_use]
    pub fn completed() -> Self {
        let (tx, rx) = watch::channel(());
        let _ = tx.send(());

        Self {
            pending: Arc::new(AtomicUsize::new(0)),
            completion: rx,
        }
    }

    /// Wait for all tracked effects to complete.
    pub async fn wait(&mut self) {
        while self.pending.load(Ordering::SeqCst) > 0 {
            let _ = self.completion.changed().await;
        }
    }

    /// Wait for all tracked effects to complete, with a timeout.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Timeout`] if the timeout expires before all
    /// tracked effects finish.
    pub async fn wait_with_timeout(&mut self, timeout: Duration) -> Result<(), StoreError> {
        tokio::time::timeout(timeout, self.wait())
            .await
            .map_err(|_| StoreError::Timeout)
    }
}

impl std::fmt::Debug for EffectHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectHandle")
            .field("pending_effects", &self.pending.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

/// Internal: tracking context passed through effect execution.
struct EffectTracking {
    pending: Arc<AtomicUsize>,
    notifier: watch::Sender<()>,
}

impl EffectTracking {
    /// Increment the effect counter (effect started)
    fn increment(&self) {
        self.pending.fetch_add(1, Ordering::SeqCst);
    }

    /// Decrement the effect counter (effect completed)
    fn decrement(&self) {
        if self.pending.fetch_sub(1, Ordering::SeqCst) == 1 {
            // Counter reached zero, notify waiters
            let _ = self.notifier.send(());
        }
    }
}

impl Clone for EffectTracking {
    fn clone(&self) -> Self {
        Self {
            pending: Arc::clone(&self.pending),
            notifier: self.notifier.clone(),
        }
    }
}

/// Internal: RAII guard that decrements the effect counter on drop.
///
/// Ensures the counter is always decremented, even if the effect panics.
struct DecrementGuard(EffectTracking);

impl Drop for DecrementGuard {
    fn drop(&mut self) {
        self.0.decrement();
    }
}

/// The Store - runtime coordinator for a reducer.
///
/// The Store manages:
/// 1. State (behind an async `RwLock` for concurrent access)
/// 2. The reducer (slice logic)
/// 3. The environment (injected dependencies)
/// 4. Effect execution (with the action feedback loop)
///
/// Cloning a Store is cheap: clones share the same state.
///
/// # Concurrency
///
/// - The reducer executes synchronously while holding the write lock
/// - Effects execute asynchronously in spawned tasks
/// - [`Store::send`] returns after starting effect execution, not completion;
///   await the returned [`EffectHandle`] to observe completion
/// - Concurrent `send` calls serialize at the reducer, but their effects may
///   complete in any order - the last response to resolve wins
pub struct Store<R: Reducer> {
    inner: Arc<StoreInner<R>>,
}

struct StoreInner<R: Reducer> {
    state: RwLock<R::State>,
    reducer: R,
    environment: R::Environment,
}

impl<R: Reducer> Clone for Store<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R> Store<R>
where
    R: Reducer + Send + Sync + 'static,
    R::State: Send + Sync + 'static,
    R::Action: Send + 'static,
    R::Environment: Send + Sync + 'static,
{
    /// Create a new store with initial state, reducer, and environment.
    #[must_use]
    pub fn new(initial_state: R::State, reducer: R, environment: R::Environment) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                state: RwLock::new(initial_state),
                reducer,
                environment,
            }),
        }
    }

    /// Send an action to the store.
    ///
    /// 1. Acquires the write lock on state
    /// 2. Calls the reducer with (state, action, environment)
    /// 3. Executes returned effects in spawned tasks
    /// 4. Effects may produce more actions (feedback loop); those are
    ///    processed within the same tracking context, so the returned
    ///    handle completes only once the whole cascade has settled
    #[tracing::instrument(skip(self, action), name = "store_send")]
    pub async fn send(&self, action: R::Action) -> EffectHandle {
        let effects = {
            let mut state = self.inner.state.write().await;
            self.inner
                .reducer
                .reduce(&mut state, action, &self.inner.environment)
        };

        metrics::counter!("store.actions").increment(1);

        let (handle, tracking) = EffectHandle::new();
        for effect in effects {
            self.spawn_effect(effect, &tracking);
        }

        handle
    }

    /// Send an action and wait for its effects to complete.
    pub async fn send_and_wait(&self, action: R::Action) {
        self.send(action).await.wait().await;
    }

    /// Read a projection of the current state.
    pub async fn state<T>(&self, read: impl FnOnce(&R::State) -> T) -> T {
        let state = self.inner.state.read().await;
        read(&state)
    }

    /// Start executing an effect in its own task, tracked by `tracking`.
    ///
    /// The counter is incremented before the task is spawned so that a
    /// handle observed immediately after `send` can never miss the effect.
    fn spawn_effect(&self, effect: Effect<R::Action>, tracking: &EffectTracking) {
        if matches!(effect, Effect::None) {
            return;
        }

        tracking.increment();
        metrics::counter!("store.effects").increment(1);

        let guard = DecrementGuard(tracking.clone());
        let store = self.clone();
        let tracking = tracking.clone();

        tokio::spawn(async move {
            let _guard = guard;
            store.execute(effect, &tracking).await;
        });
    }

    /// Execute a single effect to completion within the current task.
    fn execute<'a>(
        &'a self,
        effect: Effect<R::Action>,
        tracking: &'a EffectTracking,
    ) -> BoxFuture<'a, ()> {
        Box::pin(async move {
            match effect {
                Effect::None => {},
                Effect::Parallel(effects) => {
                    for effect in effects {
                        self.spawn_effect(effect, tracking);
                    }
                },
                Effect::Sequential(effects) => {
                    for effect in effects {
                        self.execute(effect, tracking).await;
                    }
                },
                Effect::Delay { duration, action } => {
                    tokio::time::sleep(duration).await;
                    self.feedback(*action, tracking).await;
                },
                Effect::Future(fut) => {
                    if let Some(action) = fut.await {
                        self.feedback(action, tracking).await;
                    }
                },
            }
        })
    }

    /// Feed an effect-produced action back through the reducer.
    ///
    /// Nested effects run inline so the originating handle tracks the whole
    /// cascade.
    async fn feedback(&self, action: R::Action, tracking: &EffectTracking) {
        let effects = {
            let mut state = self.inner.state.write().await;
            self.inner
                .reducer
                .reduce(&mut state, action, &self.inner.environment)
        };

        metrics::counter!("store.actions").increment(1);

        for effect in effects {
            self.execute(effect, tracking).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use helpdesk_core::{SmallVec, smallvec};

    #[derive(Debug, Clone, Default)]
    struct CounterState {
        count: i32,
        refreshed: bool,
    }

    #[derive(Debug, Clone)]
    enum CounterAction {
        Increment,
        RefreshLater(Duration),
        Refresh,
        LoadRemote,
        RemoteLoaded(i32),
    }

    struct CounterReducer;

    impl Reducer for CounterReducer {
        type State = CounterState;
        type Action = CounterAction;
        type Environment = ();

        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            _env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]> {
            match action {
                CounterAction::Increment => {
                    state.count += 1;
                    smallvec![]
                },
                CounterAction::RefreshLater(duration) => {
                    smallvec![Effect::Delay {
                        duration,
                        action: Box::new(CounterAction::Refresh),
                    }]
                },
                CounterAction::Refresh => {
                    state.refreshed = true;
                    smallvec![]
                },
                CounterAction::LoadRemote => {
                    smallvec![Effect::future(async {
                        Some(CounterAction::RemoteLoaded(41))
                    })]
                },
                CounterAction::RemoteLoaded(value) => {
                    state.count = value;
                    // Cascading effect: bump once more after loading
                    smallvec![Effect::future(async { Some(CounterAction::Increment) })]
                },
            }
        }
    }

    #[tokio::test]
    async fn send_applies_state_synchronously() {
        let store = Store::new(CounterState::default(), CounterReducer, ());
        store.send(CounterAction::Increment).await;
        assert_eq!(store.state(|s| s.count).await, 1);
    }

    #[tokio::test]
    async fn future_effect_feeds_action_back() {
        let store = Store::new(CounterState::default(), CounterReducer, ());
        store.send_and_wait(CounterAction::LoadRemote).await;
        // RemoteLoaded(41) plus the cascaded Increment
        assert_eq!(store.state(|s| s.count).await, 42);
    }

    #[tokio::test(start_paused = true)]
    async fn delay_effect_dispatches_after_sleep() {
        let store = Store::new(CounterState::default(), CounterReducer, ());
        let mut handle = store
            .send(CounterAction::RefreshLater(Duration::from_secs(3)))
            .await;
        handle.wait().await;
        assert!(store.state(|s| s.refreshed).await);
    }

    #[tokio::test]
    async fn completed_handle_resolves_immediately() {
        let mut handle = EffectHandle::completed();
        handle.wait().await;
    }

    #[tokio::test]
    async fn wait_with_timeout_times_out_on_stuck_effect() {
        let (mut handle, tracking) = EffectHandle::new();
        tracking.increment();

        let result = handle.wait_with_timeout(Duration::from_millis(10)).await;
        assert!(matches!(result, Err(StoreError::Timeout)));

        tracking.decrement();
        handle.wait().await;
    }
}
