//! Shared environment for the application reducers.
//!
//! All external dependencies - the REST adapter, the clock, the durable
//! credential store, the in-memory bearer cell, and the suggestion poll
//! policy - are injected through one [`AppEnvironment`] value, so every
//! slice reducer stays deterministic under test.

use crate::api::{BearerCell, HelpdeskApi, HttpApiClient};
use crate::credentials::{CredentialStore, FileCredentialStore};
use helpdesk_core::environment::{Clock, SystemClock};
use helpdesk_runtime::poll::PollPolicy;
use std::path::PathBuf;
use std::sync::Arc;

/// Dependencies injected into the slice reducers.
///
/// Clones are cheap and share the same underlying dependencies.
#[derive(Clone)]
pub struct AppEnvironment {
    api: Arc<dyn HelpdeskApi>,
    clock: Arc<dyn Clock>,
    credentials: Arc<dyn CredentialStore>,
    bearer: BearerCell,
    poll: PollPolicy,
}

impl AppEnvironment {
    /// Assemble an environment from explicit dependencies.
    ///
    /// `bearer` must be the same cell the API implementation reads, so that
    /// session transitions are visible to subsequent requests.
    #[must_use]
    pub fn new(
        api: Arc<dyn HelpdeskApi>,
        clock: Arc<dyn Clock>,
        credentials: Arc<dyn CredentialStore>,
        bearer: BearerCell,
    ) -> Self {
        Self {
            api,
            clock,
            credentials,
            bearer,
            poll: PollPolicy::new(),
        }
    }

    /// Production environment: HTTP adapter against `base_url`, system
    /// clock, file-backed credential store, default poll policy.
    #[must_use]
    pub fn production(base_url: impl Into<String>, credentials_path: PathBuf) -> Self {
        let bearer = BearerCell::new();
        let api = HttpApiClient::new(base_url, bearer.clone());

        Self::new(
            Arc::new(api),
            Arc::new(SystemClock),
            Arc::new(FileCredentialStore::new(credentials_path)),
            bearer,
        )
    }

    /// Override the suggestion poll policy.
    #[must_use]
    pub fn with_poll_policy(mut self, policy: PollPolicy) -> Self {
        self.poll = policy;
        self
    }

    /// The REST API adapter
    #[must_use]
    pub fn api(&self) -> &Arc<dyn HelpdeskApi> {
        &self.api
    }

    /// The clock
    #[must_use]
    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// The durable credential store
    #[must_use]
    pub fn credentials(&self) -> &dyn CredentialStore {
        self.credentials.as_ref()
    }

    /// The in-memory bearer credential cell
    #[must_use]
    pub const fn bearer(&self) -> &BearerCell {
        &self.bearer
    }

    /// The suggestion poll policy
    #[must_use]
    pub const fn poll(&self) -> &PollPolicy {
        &self.poll
    }
}
