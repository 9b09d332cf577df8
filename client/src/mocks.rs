//! Mock implementations for tests and embedding.
//!
//! [`MockApi`] is a scripted [`HelpdeskApi`]: construct it with the
//! responses each endpoint should serve and hand it to an
//! [`crate::environment::AppEnvironment`]. Endpoints without a scripted
//! response answer with an `Unexpected` error, so a test touching an
//! endpoint it did not script fails loudly instead of hanging.
//!
//! The suggestion endpoint is scripted as a queue of per-attempt responses
//! (the resolver polls it repeatedly); once the queue is drained it keeps
//! answering "no suggestion yet", and every request is counted.

use crate::api::HelpdeskApi;
use crate::error::{ApiError, ApiResult};
use crate::types::{
    AgentSuggestion, Article, ArticleFilter, ArticleId, ArticlePatch, AuditLog, AuthResponse,
    NewArticle, NewTicket, RegisterInput, SuggestionEdit, SuggestionId, SystemConfig, Ticket,
    TicketDetail, TicketFilter, TicketId, TicketReply, UserId,
};
use futures::future::BoxFuture;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Mutex, PoisonError};

fn unscripted<T>(endpoint: &str) -> ApiResult<T> {
    Err(ApiError::Unexpected {
        status: 0,
        message: format!("no scripted response for {endpoint}"),
    })
}

fn ready<T: Send + 'static>(result: ApiResult<T>) -> BoxFuture<'static, ApiResult<T>> {
    Box::pin(std::future::ready(result))
}

/// Scripted in-memory [`HelpdeskApi`] implementation.
#[derive(Default)]
pub struct MockApi {
    login_result: Option<ApiResult<AuthResponse>>,
    register_result: Option<ApiResult<AuthResponse>>,
    tickets: Option<ApiResult<Vec<Ticket>>>,
    ticket_detail: Option<ApiResult<TicketDetail>>,
    created_ticket: Option<ApiResult<Ticket>>,
    reply_result: Option<ApiResult<()>>,
    assign_result: Option<ApiResult<Ticket>>,
    audit: Option<ApiResult<Vec<AuditLog>>>,
    suggestion_script: Mutex<VecDeque<ApiResult<Option<AgentSuggestion>>>>,
    suggestion_requests: AtomicU32,
    updated_suggestion: Option<ApiResult<AgentSuggestion>>,
    articles: Option<ApiResult<Vec<Article>>>,
    created_article: Option<ApiResult<Article>>,
    updated_article: Option<ApiResult<Article>>,
    delete_article_result: Option<ApiResult<()>>,
    config: Option<ApiResult<SystemConfig>>,
}

impl MockApi {
    /// Create a mock with no scripted responses
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the login response
    #[must_use]
    pub fn with_login(mut self, result: ApiResult<AuthResponse>) -> Self {
        self.login_result = Some(result);
        self
    }

    /// Script the register response
    #[must_use]
    pub fn with_register(mut self, result: ApiResult<AuthResponse>) -> Self {
        self.register_result = Some(result);
        self
    }

    /// Script the ticket list response
    #[must_use]
    pub fn with_tickets(mut self, result: ApiResult<Vec<Ticket>>) -> Self {
        self.tickets = Some(result);
        self
    }

    /// Script the ticket detail response
    #[must_use]
    pub fn with_ticket_detail(mut self, result: ApiResult<TicketDetail>) -> Self {
        self.ticket_detail = Some(result);
        self
    }

    /// Script the create-ticket response
    #[must_use]
    pub fn with_created_ticket(mut self, result: ApiResult<Ticket>) -> Self {
        self.created_ticket = Some(result);
        self
    }

    /// Script the reply response
    #[must_use]
    pub fn with_reply(mut self, result: ApiResult<()>) -> Self {
        self.reply_result = Some(result);
        self
    }

    /// Script the assign response
    #[must_use]
    pub fn with_assign(mut self, result: ApiResult<Ticket>) -> Self {
        self.assign_result = Some(result);
        self
    }

    /// Script the audit-log response
    #[must_use]
    pub fn with_audit(mut self, result: ApiResult<Vec<AuditLog>>) -> Self {
        self.audit = Some(result);
        self
    }

    /// Queue per-attempt suggestion responses, served in order.
    ///
    /// Once drained, further attempts see `Ok(None)` ("not produced yet").
    #[must_use]
    pub fn with_suggestion_script(
        self,
        script: impl IntoIterator<Item = ApiResult<Option<AgentSuggestion>>>,
    ) -> Self {
        {
            let mut queue = self
                .suggestion_script
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            queue.extend(script);
        }
        self
    }

    /// Script the update-suggestion response
    #[must_use]
    pub fn with_updated_suggestion(mut self, result: ApiResult<AgentSuggestion>) -> Self {
        self.updated_suggestion = Some(result);
        self
    }

    /// Script the article list response
    #[must_use]
    pub fn with_articles(mut self, result: ApiResult<Vec<Article>>) -> Self {
        self.articles = Some(result);
        self
    }

    /// Script the create-article response
    #[must_use]
    pub fn with_created_article(mut self, result: ApiResult<Article>) -> Self {
        self.created_article = Some(result);
        self
    }

    /// Script the update-article response
    #[must_use]
    pub fn with_updated_article(mut self, result: ApiResult<Article>) -> Self {
        self.updated_article = Some(result);
        self
    }

    /// Script the delete-article response
    #[must_use]
    pub fn with_delete_article(mut self, result: ApiResult<()>) -> Self {
        self.delete_article_result = Some(result);
        self
    }

    /// Script the config fetch response
    #[must_use]
    pub fn with_config(mut self, result: ApiResult<SystemConfig>) -> Self {
        self.config = Some(result);
        self
    }

    /// Number of suggestion requests issued so far
    #[must_use]
    pub fn suggestion_requests(&self) -> u32 {
        self.suggestion_requests.load(Ordering::SeqCst)
    }
}

impl HelpdeskApi for MockApi {
    fn login(&self, _email: &str, _password: &str) -> BoxFuture<'static, ApiResult<AuthResponse>> {
        ready(
            self.login_result
                .clone()
                .unwrap_or_else(|| unscripted("login")),
        )
    }

    fn register(&self, _input: &RegisterInput) -> BoxFuture<'static, ApiResult<AuthResponse>> {
        ready(
            self.register_result
                .clone()
                .unwrap_or_else(|| unscripted("register")),
        )
    }

    fn fetch_tickets(&self, _filter: &TicketFilter) -> BoxFuture<'static, ApiResult<Vec<Ticket>>> {
        ready(
            self.tickets
                .clone()
                .unwrap_or_else(|| unscripted("fetch_tickets")),
        )
    }

    fn fetch_ticket_detail(&self, _id: &TicketId) -> BoxFuture<'static, ApiResult<TicketDetail>> {
        ready(
            self.ticket_detail
                .clone()
                .unwrap_or_else(|| unscripted("fetch_ticket_detail")),
        )
    }

    fn create_ticket(&self, _input: &NewTicket) -> BoxFuture<'static, ApiResult<Ticket>> {
        ready(
            self.created_ticket
                .clone()
                .unwrap_or_else(|| unscripted("create_ticket")),
        )
    }

    fn reply_to_ticket(
        &self,
        _id: &TicketId,
        _reply: &TicketReply,
    ) -> BoxFuture<'static, ApiResult<()>> {
        ready(
            self.reply_result
                .clone()
                .unwrap_or_else(|| unscripted("reply_to_ticket")),
        )
    }

    fn assign_ticket(
        &self,
        _id: &TicketId,
        _assignee: &UserId,
    ) -> BoxFuture<'static, ApiResult<Ticket>> {
        ready(
            self.assign_result
                .clone()
                .unwrap_or_else(|| unscripted("assign_ticket")),
        )
    }

    fn fetch_audit_log(&self, _id: &TicketId) -> BoxFuture<'static, ApiResult<Vec<AuditLog>>> {
        ready(
            self.audit
                .clone()
                .unwrap_or_else(|| unscripted("fetch_audit_log")),
        )
    }

    fn fetch_suggestion(
        &self,
        _ticket_id: &TicketId,
    ) -> BoxFuture<'static, ApiResult<Option<AgentSuggestion>>> {
        self.suggestion_requests.fetch_add(1, Ordering::SeqCst);

        let next = self
            .suggestion_script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or(Ok(None));

        ready(next)
    }

    fn update_suggestion(
        &self,
        _id: &SuggestionId,
        _edit: &SuggestionEdit,
    ) -> BoxFuture<'static, ApiResult<AgentSuggestion>> {
        ready(
            self.updated_suggestion
                .clone()
                .unwrap_or_else(|| unscripted("update_suggestion")),
        )
    }

    fn fetch_articles(
        &self,
        _filter: &ArticleFilter,
    ) -> BoxFuture<'static, ApiResult<Vec<Article>>> {
        ready(
            self.articles
                .clone()
                .unwrap_or_else(|| unscripted("fetch_articles")),
        )
    }

    fn create_article(&self, _input: &NewArticle) -> BoxFuture<'static, ApiResult<Article>> {
        ready(
            self.created_article
                .clone()
                .unwrap_or_else(|| unscripted("create_article")),
        )
    }

    fn update_article(
        &self,
        _id: &ArticleId,
        _patch: &ArticlePatch,
    ) -> BoxFuture<'static, ApiResult<Article>> {
        ready(
            self.updated_article
                .clone()
                .unwrap_or_else(|| unscripted("update_article")),
        )
    }

    fn delete_article(&self, _id: &ArticleId) -> BoxFuture<'static, ApiResult<()>> {
        ready(
            self.delete_article_result
                .clone()
                .unwrap_or_else(|| unscripted("delete_article")),
        )
    }

    fn fetch_config(&self) -> BoxFuture<'static, ApiResult<SystemConfig>> {
        ready(
            self.config
                .clone()
                .unwrap_or_else(|| unscripted("fetch_config")),
        )
    }

    fn update_config(
        &self,
        config: &SystemConfig,
    ) -> BoxFuture<'static, ApiResult<SystemConfig>> {
        // Echo the wholesale replacement back, like the real server
        ready(Ok(config.clone()))
    }
}
