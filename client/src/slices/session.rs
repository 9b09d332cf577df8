//! Session slice: authentication state and the durable credential store.

use crate::credentials::StoredCredentials;
use crate::environment::AppEnvironment;
use crate::error::ApiError;
use crate::types::{AuthResponse, AuthToken, RegisterInput, User};
use helpdesk_core::{Effect, Reducer, SmallVec, smallvec};

/// Authentication state.
///
/// Invariant: after any completed login/register/logout transition, `user`
/// and `token` are either both present or both absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    /// The authenticated user, if any
    pub user: Option<User>,
    /// The bearer credential, if any
    pub token: Option<AuthToken>,
    /// An authentication request is in flight
    pub loading: bool,
    /// Human-readable message of the last failed operation
    pub error: Option<String>,
}

impl SessionState {
    /// Empty, unauthenticated state
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// State rehydrated from the durable credential store at startup
    #[must_use]
    pub fn rehydrated(credentials: StoredCredentials) -> Self {
        Self {
            user: Some(credentials.user),
            token: Some(credentials.token),
            loading: false,
            error: None,
        }
    }

    /// Whether the client is considered authenticated
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.token.is_some() && self.user.is_some()
    }
}

/// Actions processed by the session slice
#[derive(Debug, Clone)]
pub enum SessionAction {
    /// Command: exchange credentials for a session
    Login {
        /// Login email
        email: String,
        /// Password
        password: String,
    },

    /// Command: create an account and a session
    Register(RegisterInput),

    /// Response: the server answered a login or register request
    AuthResponseReceived(Result<AuthResponse, ApiError>),

    /// Command: end the session, clearing memory and durable state
    Logout,

    /// Command: dismiss the error banner
    ClearError,
}

/// Reducer for the session slice
#[derive(Debug, Clone, Default)]
pub struct SessionReducer;

impl SessionReducer {
    /// Creates a new `SessionReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Reducer for SessionReducer {
    type State = SessionState;
    type Action = SessionAction;
    type Environment = AppEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            SessionAction::Login { email, password } => {
                state.loading = true;
                state.error = None;

                let response = env.api().login(&email, &password);
                smallvec![Effect::future(async move {
                    Some(SessionAction::AuthResponseReceived(response.await))
                })]
            },

            SessionAction::Register(input) => {
                state.loading = true;
                state.error = None;

                let response = env.api().register(&input);
                smallvec![Effect::future(async move {
                    Some(SessionAction::AuthResponseReceived(response.await))
                })]
            },

            SessionAction::AuthResponseReceived(Ok(auth)) => {
                state.loading = false;
                state.user = Some(auth.user.clone());
                state.token = Some(auth.token.clone());

                // The adapter reads the bearer cell on every request
                env.bearer().set(auth.token.clone());

                let stored = StoredCredentials {
                    user: auth.user,
                    token: auth.token,
                };
                if let Err(err) = env.credentials().save(&stored) {
                    tracing::warn!(error = %err, "failed to persist credentials");
                }

                smallvec![]
            },

            SessionAction::AuthResponseReceived(Err(err)) => {
                state.loading = false;
                state.error = Some(err.to_string());
                smallvec![]
            },

            SessionAction::Logout => {
                state.user = None;
                state.token = None;
                state.loading = false;
                state.error = None;

                env.bearer().clear();
                env.credentials().clear();

                smallvec![]
            },

            SessionAction::ClearError => {
                state.error = None;
                smallvec![]
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code
mod tests {
    use super::*;
    use crate::api::BearerCell;
    use crate::credentials::{CredentialStore, MemoryCredentialStore};
    use crate::mocks::MockApi;
    use crate::types::{Role, UserId};
    use helpdesk_testing::{ReducerTest, assertions, test_clock};
    use std::sync::Arc;

    fn demo_user() -> User {
        User {
            id: UserId::new("u1"),
            name: "Demo User".to_string(),
            email: "user@demo.com".to_string(),
            role: Role::User,
            created_at: None,
        }
    }

    fn auth_response() -> AuthResponse {
        AuthResponse {
            token: AuthToken::new("tok-1"),
            user: demo_user(),
        }
    }

    fn test_env(api: MockApi) -> (AppEnvironment, BearerCell, Arc<MemoryCredentialStore>) {
        let bearer = BearerCell::new();
        let credentials = Arc::new(MemoryCredentialStore::new());
        let env = AppEnvironment::new(
            Arc::new(api),
            Arc::new(test_clock()),
            Arc::clone(&credentials) as Arc<dyn CredentialStore>,
            bearer.clone(),
        );
        (env, bearer, credentials)
    }

    #[test]
    fn login_enters_pending_and_spawns_request() {
        let (env, _, _) = test_env(MockApi::new());

        ReducerTest::new(SessionReducer::new())
            .with_env(env)
            .given_state(SessionState::new())
            .when_action(SessionAction::Login {
                email: "user@demo.com".to_string(),
                password: "User@123".to_string(),
            })
            .run()
            .then_state(|state| {
                assert!(state.loading);
                assert!(state.error.is_none());
            })
            .then_effects(assertions::assert_spawns_request);
    }

    #[test]
    fn successful_auth_sets_session_and_persists() {
        let (env, bearer, credentials) = test_env(MockApi::new());

        ReducerTest::new(SessionReducer::new())
            .with_env(env)
            .given_state(SessionState::new())
            .when_action(SessionAction::Login {
                email: "user@demo.com".to_string(),
                password: "User@123".to_string(),
            })
            .when_action(SessionAction::AuthResponseReceived(Ok(auth_response())))
            .run()
            .then_state(|state| {
                assert!(!state.loading);
                assert!(state.is_authenticated());
                assert_eq!(state.user.as_ref().map(|u| u.id.as_str()), Some("u1"));
            })
            .then_effects(assertions::assert_no_effects);

        assert_eq!(bearer.get(), Some(AuthToken::new("tok-1")));
        assert_eq!(
            credentials.load().map(|c| c.token),
            Some(AuthToken::new("tok-1"))
        );
    }

    #[test]
    fn failed_auth_records_error_and_keeps_prior_session() {
        let (env, _, _) = test_env(MockApi::new());
        let existing = SessionState::rehydrated(StoredCredentials {
            user: demo_user(),
            token: AuthToken::new("old"),
        });

        ReducerTest::new(SessionReducer::new())
            .with_env(env)
            .given_state(existing)
            .when_action(SessionAction::AuthResponseReceived(Err(
                ApiError::Unauthorized,
            )))
            .run()
            .then_state(|state| {
                assert!(!state.loading);
                assert!(state.error.is_some());
                // Stale session data stays visible on failure
                assert!(state.is_authenticated());
            });
    }

    #[test]
    fn logout_clears_memory_bearer_and_durable_store() {
        let (env, bearer, credentials) = test_env(MockApi::new());
        bearer.set(AuthToken::new("tok-1"));
        credentials
            .save(&StoredCredentials {
                user: demo_user(),
                token: AuthToken::new("tok-1"),
            })
            .unwrap();

        ReducerTest::new(SessionReducer::new())
            .with_env(env)
            .given_state(SessionState::rehydrated(StoredCredentials {
                user: demo_user(),
                token: AuthToken::new("tok-1"),
            }))
            .when_action(SessionAction::Logout)
            .run()
            .then_state(|state| {
                assert!(!state.is_authenticated());
                assert!(state.user.is_none());
                assert!(state.token.is_none());
            })
            .then_effects(assertions::assert_no_effects);

        assert!(bearer.get().is_none());
        assert!(credentials.load().is_none());
    }

    #[test]
    fn rehydrated_state_is_authenticated() {
        let state = SessionState::rehydrated(StoredCredentials {
            user: demo_user(),
            token: AuthToken::new("tok-1"),
        });
        assert!(state.is_authenticated());
        assert!(!state.loading);
    }
}
