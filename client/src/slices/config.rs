//! Config slice: the system configuration singleton.

use crate::environment::AppEnvironment;
use crate::error::ApiError;
use crate::types::SystemConfig;
use helpdesk_core::{Effect, Reducer, SmallVec, smallvec};

/// Configuration singleton state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigState {
    /// The configuration, once fetched
    pub config: Option<SystemConfig>,
    /// A configuration operation is in flight
    pub loading: bool,
    /// Human-readable message of the last failed operation
    pub error: Option<String>,
}

impl ConfigState {
    /// Empty state
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

/// Actions processed by the config slice
#[derive(Debug, Clone)]
pub enum ConfigAction {
    /// Command: fetch the configuration singleton
    Fetch,
    /// Response: the fetch endpoint answered
    FetchResponse(Result<SystemConfig, ApiError>),

    /// Command: replace the configuration wholesale
    Update {
        /// The full replacement value
        config: SystemConfig,
    },
    /// Response: the update endpoint answered with the stored value
    UpdateResponse(Result<SystemConfig, ApiError>),

    /// Command: dismiss the error banner
    ClearError,
}

/// Reducer for the config slice
#[derive(Debug, Clone, Default)]
pub struct ConfigReducer;

impl ConfigReducer {
    /// Creates a new `ConfigReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Reducer for ConfigReducer {
    type State = ConfigState;
    type Action = ConfigAction;
    type Environment = AppEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            ConfigAction::Fetch => {
                state.loading = true;
                state.error = None;

                let response = env.api().fetch_config();
                smallvec![Effect::future(async move {
                    Some(ConfigAction::FetchResponse(response.await))
                })]
            },

            ConfigAction::FetchResponse(Ok(config)) => {
                state.loading = false;
                state.config = Some(config);
                smallvec![]
            },

            ConfigAction::FetchResponse(Err(err)) => {
                state.loading = false;
                state.error = Some(err.to_string());
                smallvec![]
            },

            ConfigAction::Update { config } => {
                state.loading = true;
                state.error = None;

                let response = env.api().update_config(&config);
                smallvec![Effect::future(async move {
                    Some(ConfigAction::UpdateResponse(response.await))
                })]
            },

            ConfigAction::UpdateResponse(Ok(config)) => {
                state.loading = false;
                // Wholesale replace with the server's representation
                state.config = Some(config);
                smallvec![]
            },

            ConfigAction::UpdateResponse(Err(err)) => {
                // Stale configuration stays visible during a failed save
                state.loading = false;
                state.error = Some(err.to_string());
                smallvec![]
            },

            ConfigAction::ClearError => {
                state.error = None;
                smallvec![]
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::BearerCell;
    use crate::credentials::MemoryCredentialStore;
    use crate::mocks::MockApi;
    use helpdesk_testing::{ReducerTest, assertions, test_clock};
    use std::sync::Arc;

    fn test_env() -> AppEnvironment {
        AppEnvironment::new(
            Arc::new(MockApi::new()),
            Arc::new(test_clock()),
            Arc::new(MemoryCredentialStore::new()),
            BearerCell::new(),
        )
    }

    fn config(sla_hours: u32) -> SystemConfig {
        SystemConfig {
            auto_close_enabled: true,
            confidence_threshold: 0.78,
            sla_hours,
        }
    }

    #[test]
    fn fetch_enters_pending_and_spawns_request() {
        ReducerTest::new(ConfigReducer::new())
            .with_env(test_env())
            .given_state(ConfigState::new())
            .when_action(ConfigAction::Fetch)
            .run()
            .then_state(|state| {
                assert!(state.loading);
            })
            .then_effects(assertions::assert_spawns_request);
    }

    #[test]
    fn fetch_response_stores_singleton() {
        ReducerTest::new(ConfigReducer::new())
            .with_env(test_env())
            .given_state(ConfigState {
                loading: true,
                ..ConfigState::new()
            })
            .when_action(ConfigAction::FetchResponse(Ok(config(24))))
            .run()
            .then_state(|state| {
                assert_eq!(state.config.as_ref().map(|c| c.sla_hours), Some(24));
                assert!(!state.loading);
            });
    }

    #[test]
    fn update_response_replaces_wholesale() {
        ReducerTest::new(ConfigReducer::new())
            .with_env(test_env())
            .given_state(ConfigState {
                config: Some(config(24)),
                ..ConfigState::new()
            })
            .when_action(ConfigAction::UpdateResponse(Ok(config(48))))
            .run()
            .then_state(|state| {
                assert_eq!(state.config.as_ref().map(|c| c.sla_hours), Some(48));
            });
    }

    #[test]
    fn failed_save_keeps_stale_config_and_records_error() {
        ReducerTest::new(ConfigReducer::new())
            .with_env(test_env())
            .given_state(ConfigState {
                config: Some(config(24)),
                loading: true,
                ..ConfigState::new()
            })
            .when_action(ConfigAction::UpdateResponse(Err(
                ApiError::ValidationRejected("slaHours must be positive".to_string()),
            )))
            .run()
            .then_state(|state| {
                assert_eq!(state.config.as_ref().map(|c| c.sla_hours), Some(24));
                assert!(state.error.is_some());
                assert!(!state.loading);
            });
    }
}
