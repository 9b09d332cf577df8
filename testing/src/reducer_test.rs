//! Given-When-Then harness for slice reducers.
//!
//! A reducer is a pure function, so testing one is three steps: seed a
//! state, run one or more actions through it, and look at what came out.
//! [`ReducerTest`] queues the actions and [`ReducerTest::run`] executes
//! them in order against the same state, handing back a [`TestRun`] with
//! the final state and the effects of the last action - the place where a
//! slice's pending transition and its request effect are asserted.
//!
//! Queuing several actions covers the command/response pairs the slices
//! are built from: dispatch the command, then feed the response action a
//! completed effect would have produced.

use helpdesk_core::{Effect, Reducer};

/// Builder for a single reducer scenario.
///
/// # Example
///
/// ```ignore
/// use helpdesk_testing::{ReducerTest, assertions};
///
/// ReducerTest::new(SessionReducer::new())
///     .with_env(test_environment())
///     .given_state(SessionState::new())
///     .when_action(SessionAction::Login { email, password })
///     .when_action(SessionAction::AuthResponseReceived(Ok(auth)))
///     .run()
///     .then_state(|state| assert!(state.is_authenticated()))
///     .then_effects(assertions::assert_no_effects);
/// ```
pub struct ReducerTest<R: Reducer> {
    reducer: R,
    environment: Option<R::Environment>,
    state: Option<R::State>,
    actions: Vec<R::Action>,
}

impl<R: Reducer> ReducerTest<R> {
    /// Start a scenario for the given reducer.
    #[must_use]
    pub const fn new(reducer: R) -> Self {
        Self {
            reducer,
            environment: None,
            state: None,
            actions: Vec::new(),
        }
    }

    /// Inject the environment the reducer runs against.
    #[must_use]
    pub fn with_env(mut self, environment: R::Environment) -> Self {
        self.environment = Some(environment);
        self
    }

    /// Seed the initial state (Given).
    #[must_use]
    pub fn given_state(mut self, state: R::State) -> Self {
        self.state = Some(state);
        self
    }

    /// Queue an action (When). May be called repeatedly; actions run in
    /// the order they were queued.
    #[must_use]
    pub fn when_action(mut self, action: R::Action) -> Self {
        self.actions.push(action);
        self
    }

    /// Run every queued action and return the outcome.
    ///
    /// # Panics
    ///
    /// Panics when the scenario is incomplete: no state, no environment,
    /// or no actions.
    #[allow(clippy::expect_used)] // Incomplete scenarios should fail loudly
    pub fn run(self) -> TestRun<R::State, R::Action> {
        let Self {
            reducer,
            environment,
            state,
            actions,
        } = self;

        let mut state = state.expect("given_state() was not called");
        let environment = environment.expect("with_env() was not called");
        assert!(!actions.is_empty(), "when_action() was not called");

        let mut effects = Vec::new();
        for action in actions {
            effects = reducer.reduce(&mut state, action, &environment).into_vec();
        }

        TestRun { state, effects }
    }
}

/// Outcome of a reducer scenario: the final state and the effects the
/// last action produced.
pub struct TestRun<S, A> {
    /// State after every queued action was applied
    pub state: S,
    /// Effects returned by the final action
    pub effects: Vec<Effect<A>>,
}

impl<S, A> TestRun<S, A> {
    /// Assert on the final state (Then).
    pub fn then_state(self, check: impl FnOnce(&S)) -> Self {
        check(&self.state);
        self
    }

    /// Assert on the final action's effects (Then).
    pub fn then_effects(self, check: impl FnOnce(&[Effect<A>])) -> Self {
        check(&self.effects);
        self
    }
}

/// Effect assertions shared across slice tests.
pub mod assertions {
    use helpdesk_core::Effect;

    /// Assert the action produced no effects (pure state transition).
    ///
    /// # Panics
    ///
    /// Panics when any non-`None` effect is present.
    pub fn assert_no_effects<A>(effects: &[Effect<A>]) {
        let live = effects
            .iter()
            .filter(|e| !matches!(e, Effect::None))
            .count();
        assert!(live == 0, "expected no effects, found {live}");
    }

    /// Assert the action spawned exactly one request future - the shape of
    /// every slice command that goes to the REST adapter.
    ///
    /// # Panics
    ///
    /// Panics when the number of `Future` effects is not exactly one.
    pub fn assert_spawns_request<A>(effects: &[Effect<A>]) {
        let requests = effects
            .iter()
            .filter(|e| matches!(e, Effect::Future(_)))
            .count();
        assert!(requests == 1, "expected one request effect, found {requests}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use helpdesk_core::{SmallVec, smallvec};

    #[derive(Clone, Debug, Default)]
    struct TallyState {
        total: i32,
        pending: bool,
    }

    #[derive(Clone, Debug)]
    enum TallyAction {
        Add(i32),
        BeginSync,
    }

    struct TallyReducer;

    impl Reducer for TallyReducer {
        type State = TallyState;
        type Action = TallyAction;
        type Environment = ();

        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            _env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]> {
            match action {
                TallyAction::Add(n) => {
                    state.total += n;
                    smallvec![]
                },
                TallyAction::BeginSync => {
                    state.pending = true;
                    smallvec![Effect::future(async { None })]
                },
            }
        }
    }

    #[test]
    fn runs_queued_actions_in_order() {
        ReducerTest::new(TallyReducer)
            .with_env(())
            .given_state(TallyState::default())
            .when_action(TallyAction::Add(2))
            .when_action(TallyAction::Add(3))
            .run()
            .then_state(|state| assert_eq!(state.total, 5))
            .then_effects(assertions::assert_no_effects);
    }

    #[test]
    fn exposes_effects_of_the_last_action() {
        let run = ReducerTest::new(TallyReducer)
            .with_env(())
            .given_state(TallyState::default())
            .when_action(TallyAction::Add(1))
            .when_action(TallyAction::BeginSync)
            .run();

        assert!(run.state.pending);
        assertions::assert_spawns_request(&run.effects);
    }

    #[test]
    #[should_panic(expected = "given_state() was not called")]
    fn incomplete_scenario_fails_loudly() {
        let _ = ReducerTest::new(TallyReducer)
            .with_env(())
            .when_action(TallyAction::Add(1))
            .run();
    }
}
