//! Store composition: the application state, action, and reducer, plus the
//! [`AppStore`] facade that presentation code talks to.
//!
//! The four slices are assembled under fixed keys. All mutation flows
//! through [`AppStore::send`] (or the high-level operations, which dispatch
//! and then await effect completion); no external code mutates collection
//! contents directly.
//!
//! Concurrent operations against the same slice follow last-write-wins:
//! whichever response resolves last overwrites `loading`/`data`/`error`.
//! Callers needing strict ordering must serialize their calls.

use crate::environment::AppEnvironment;
use crate::slices::config::{ConfigAction, ConfigReducer, ConfigState};
use crate::slices::knowledge_base::{
    KnowledgeBaseAction, KnowledgeBaseReducer, KnowledgeBaseState,
};
use crate::slices::session::{SessionAction, SessionReducer, SessionState};
use crate::slices::tickets::{TicketsAction, TicketsReducer, TicketsState};
use crate::types::{
    Article, ArticleFilter, ArticleId, ArticlePatch, NewArticle, NewTicket, RegisterInput,
    SuggestionEdit, SuggestionId, SystemConfig, Ticket, TicketDetail, TicketFilter, TicketId,
    TicketReply, UserId,
};
use helpdesk_core::{Effect, Reducer, SmallVec};
use helpdesk_runtime::{EffectHandle, Store};

/// The process-wide application state.
#[derive(Debug, Clone, Default)]
pub struct AppState {
    /// Authentication state
    pub session: SessionState,
    /// Ticket collection and detail view
    pub tickets: TicketsState,
    /// Knowledge-base articles
    pub knowledge_base: KnowledgeBaseState,
    /// System configuration singleton
    pub config: ConfigState,
}

/// Union of all slice actions.
#[derive(Debug, Clone)]
pub enum AppAction {
    /// Session slice action
    Session(SessionAction),
    /// Tickets slice action
    Tickets(TicketsAction),
    /// Knowledge-base slice action
    KnowledgeBase(KnowledgeBaseAction),
    /// Config slice action
    Config(ConfigAction),
}

/// Root reducer delegating to the slice reducers.
#[derive(Debug, Clone, Default)]
pub struct AppReducer {
    session: SessionReducer,
    tickets: TicketsReducer,
    knowledge_base: KnowledgeBaseReducer,
    config: ConfigReducer,
}

impl AppReducer {
    /// Creates a new `AppReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self {
            session: SessionReducer::new(),
            tickets: TicketsReducer::new(),
            knowledge_base: KnowledgeBaseReducer::new(),
            config: ConfigReducer::new(),
        }
    }
}

impl Reducer for AppReducer {
    type State = AppState;
    type Action = AppAction;
    type Environment = AppEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            AppAction::Session(action) => self
                .session
                .reduce(&mut state.session, action, env)
                .into_iter()
                .map(|e| e.map(AppAction::Session))
                .collect(),
            AppAction::Tickets(action) => self
                .tickets
                .reduce(&mut state.tickets, action, env)
                .into_iter()
                .map(|e| e.map(AppAction::Tickets))
                .collect(),
            AppAction::KnowledgeBase(action) => self
                .knowledge_base
                .reduce(&mut state.knowledge_base, action, env)
                .into_iter()
                .map(|e| e.map(AppAction::KnowledgeBase))
                .collect(),
            AppAction::Config(action) => self
                .config
                .reduce(&mut state.config, action, env)
                .into_iter()
                .map(|e| e.map(AppAction::Config))
                .collect(),
        }
    }
}

/// The application store.
///
/// Constructed once at application start; torn down implicitly at process
/// exit. On construction the session is rehydrated from the durable
/// credential store (read exactly once), so a page reload does not force
/// re-authentication.
///
/// The high-level operations dispatch an action and await its effects
/// (promise-style), then return a snapshot of the relevant state. The state
/// itself stays the single source of truth; `error` fields are inspected
/// reactively rather than through return values.
#[derive(Clone)]
pub struct AppStore {
    store: Store<AppReducer>,
}

impl AppStore {
    /// Build the store, rehydrating the session from the credential store.
    #[must_use]
    pub fn new(environment: AppEnvironment) -> Self {
        let session = match environment.credentials().load() {
            Some(stored) => {
                // Requests issued from here on carry the restored credential
                environment.bearer().set(stored.token.clone());
                SessionState::rehydrated(stored)
            },
            None => SessionState::new(),
        };

        let state = AppState {
            session,
            ..AppState::default()
        };

        Self {
            store: Store::new(state, AppReducer::new(), environment),
        }
    }

    /// Dispatch an action.
    ///
    /// Returns an [`EffectHandle`] that completes when the action's effects
    /// (and their feedback cascade) have settled.
    pub async fn send(&self, action: AppAction) -> EffectHandle {
        self.store.send(action).await
    }

    /// Read a projection of the current state.
    pub async fn state<T>(&self, read: impl FnOnce(&AppState) -> T) -> T {
        self.store.state(read).await
    }

    // ───────────────────────── session ─────────────────────────

    /// Log in and wait for the session transition to settle.
    pub async fn login(
        &self,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> SessionState {
        self.store
            .send_and_wait(AppAction::Session(SessionAction::Login {
                email: email.into(),
                password: password.into(),
            }))
            .await;
        self.state(|s| s.session.clone()).await
    }

    /// Register an account and wait for the session transition to settle.
    pub async fn register(&self, input: RegisterInput) -> SessionState {
        self.store
            .send_and_wait(AppAction::Session(SessionAction::Register(input)))
            .await;
        self.state(|s| s.session.clone()).await
    }

    /// Log out, clearing in-memory and durable credential state.
    pub async fn logout(&self) {
        self.store
            .send_and_wait(AppAction::Session(SessionAction::Logout))
            .await;
    }

    // ───────────────────────── tickets ─────────────────────────

    /// Fetch the ticket list and return the resulting collection.
    pub async fn fetch_tickets(&self, filter: TicketFilter) -> Vec<Ticket> {
        self.store
            .send_and_wait(AppAction::Tickets(TicketsAction::FetchAll { filter }))
            .await;
        self.state(|s| s.tickets.tickets.clone()).await
    }

    /// Fetch one ticket's detail view.
    pub async fn fetch_ticket_detail(&self, id: TicketId) -> Option<TicketDetail> {
        self.store
            .send_and_wait(AppAction::Tickets(TicketsAction::FetchDetail { id }))
            .await;
        self.state(|s| s.tickets.current_ticket.clone()).await
    }

    /// Create a ticket, polling for its agent suggestion within the retry
    /// budget. Returns the detail view of the created ticket (suggestion
    /// attached when one resolved in time).
    pub async fn create_ticket(&self, input: NewTicket) -> Option<TicketDetail> {
        self.store
            .send_and_wait(AppAction::Tickets(TicketsAction::Create { input }))
            .await;
        self.state(|s| s.tickets.current_ticket.clone()).await
    }

    /// Reply to a ticket (optionally closing or reopening it).
    pub async fn reply_to_ticket(&self, id: TicketId, reply: TicketReply) {
        self.store
            .send_and_wait(AppAction::Tickets(TicketsAction::Reply { id, reply }))
            .await;
    }

    /// Assign a ticket to an agent.
    pub async fn assign_ticket(&self, id: TicketId, assignee: UserId) {
        self.store
            .send_and_wait(AppAction::Tickets(TicketsAction::Assign { id, assignee }))
            .await;
    }

    /// Re-run the bounded suggestion poll for a ticket and return the
    /// current detail view afterwards.
    pub async fn resolve_suggestion(&self, ticket_id: TicketId) -> Option<TicketDetail> {
        self.store
            .send_and_wait(AppAction::Tickets(TicketsAction::ResolveSuggestion {
                ticket_id,
            }))
            .await;
        self.state(|s| s.tickets.current_ticket.clone()).await
    }

    /// Refresh the audit trail of the current detail view.
    pub async fn fetch_audit_log(&self, id: TicketId) -> Option<TicketDetail> {
        self.store
            .send_and_wait(AppAction::Tickets(TicketsAction::FetchAudit { id }))
            .await;
        self.state(|s| s.tickets.current_ticket.clone()).await
    }

    /// Edit an agent suggestion's reviewable fields.
    pub async fn update_suggestion(&self, id: SuggestionId, edit: SuggestionEdit) {
        self.store
            .send_and_wait(AppAction::Tickets(TicketsAction::UpdateSuggestion {
                id,
                edit,
            }))
            .await;
    }

    // ─────────────────────── knowledge base ───────────────────────

    /// Fetch the article list and return the resulting collection.
    pub async fn fetch_articles(&self, filter: ArticleFilter) -> Vec<Article> {
        self.store
            .send_and_wait(AppAction::KnowledgeBase(KnowledgeBaseAction::FetchAll {
                filter,
            }))
            .await;
        self.state(|s| s.knowledge_base.articles.clone()).await
    }

    /// Create an article.
    pub async fn create_article(&self, input: NewArticle) {
        self.store
            .send_and_wait(AppAction::KnowledgeBase(KnowledgeBaseAction::Create {
                input,
            }))
            .await;
    }

    /// Update an article.
    pub async fn update_article(&self, id: ArticleId, patch: ArticlePatch) {
        self.store
            .send_and_wait(AppAction::KnowledgeBase(KnowledgeBaseAction::Update {
                id,
                patch,
            }))
            .await;
    }

    /// Delete an article.
    pub async fn delete_article(&self, id: ArticleId) {
        self.store
            .send_and_wait(AppAction::KnowledgeBase(KnowledgeBaseAction::Delete { id }))
            .await;
    }

    // ───────────────────────── config ─────────────────────────

    /// Fetch the configuration singleton.
    pub async fn fetch_config(&self) -> Option<SystemConfig> {
        self.store
            .send_and_wait(AppAction::Config(ConfigAction::Fetch))
            .await;
        self.state(|s| s.config.config.clone()).await
    }

    /// Replace the configuration wholesale.
    pub async fn update_config(&self, config: SystemConfig) -> Option<SystemConfig> {
        self.store
            .send_and_wait(AppAction::Config(ConfigAction::Update { config }))
            .await;
        self.state(|s| s.config.config.clone()).await
    }
}
