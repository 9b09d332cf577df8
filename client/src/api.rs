//! REST API adapter.
//!
//! [`HelpdeskApi`] is the object-safe seam between the slices and the wire:
//! one method per endpoint, each returning a boxed future so the trait can
//! live behind `Arc<dyn HelpdeskApi>` in the shared environment. The
//! production implementation [`HttpApiClient`] wraps a `reqwest::Client`
//! with a fixed base URL and attaches the current bearer credential from a
//! shared [`BearerCell`].
//!
//! This layer performs no retries; retry-polling is a policy of the
//! suggestion resolver, not of the transport.

use crate::error::{ApiError, ApiResult};
use crate::types::{
    AgentSuggestion, Article, ArticleFilter, ArticleId, ArticlePatch, AuditLog, AuthResponse,
    AuthToken, NewArticle, NewTicket, RegisterInput, SuggestionEdit, SuggestionId, SystemConfig,
    Ticket, TicketDetail, TicketFilter, TicketId, TicketReply, UserId,
};
use futures::future::BoxFuture;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::{Arc, PoisonError, RwLock};

/// Shared cell holding the in-memory bearer credential.
///
/// Written (replace-whole-value) on login/register, cleared on logout, read
/// by the adapter on every request. Clones share the same cell.
#[derive(Clone, Default)]
pub struct BearerCell {
    inner: Arc<RwLock<Option<AuthToken>>>,
}

impl BearerCell {
    /// Create an empty cell
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the stored token
    pub fn set(&self, token: AuthToken) {
        *self
            .inner
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(token);
    }

    /// Clear the stored token
    pub fn clear(&self) {
        *self
            .inner
            .write()
            .unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Current token, if any
    #[must_use]
    pub fn get(&self) -> Option<AuthToken> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl std::fmt::Debug for BearerCell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let present = self.get().is_some();
        f.debug_struct("BearerCell").field("present", &present).finish()
    }
}

/// The remote helpdesk REST API.
///
/// Object-safe: every method returns a `BoxFuture` so the trait can be held
/// as `Arc<dyn HelpdeskApi>` and mocked in tests.
pub trait HelpdeskApi: Send + Sync {
    /// POST /auth/login - exchange credentials for `{user, token}`
    fn login(&self, email: &str, password: &str) -> BoxFuture<'static, ApiResult<AuthResponse>>;

    /// POST /auth/register - create an account, returns `{user, token}`
    fn register(&self, input: &RegisterInput) -> BoxFuture<'static, ApiResult<AuthResponse>>;

    /// GET /tickets - list tickets, optionally filtered
    fn fetch_tickets(&self, filter: &TicketFilter) -> BoxFuture<'static, ApiResult<Vec<Ticket>>>;

    /// GET /tickets/{id} - full ticket detail
    fn fetch_ticket_detail(&self, id: &TicketId) -> BoxFuture<'static, ApiResult<TicketDetail>>;

    /// POST /tickets - create a ticket
    fn create_ticket(&self, input: &NewTicket) -> BoxFuture<'static, ApiResult<Ticket>>;

    /// POST /tickets/{id}/reply - reply and optionally close/reopen
    fn reply_to_ticket(
        &self,
        id: &TicketId,
        reply: &TicketReply,
    ) -> BoxFuture<'static, ApiResult<()>>;

    /// POST /tickets/{id}/assign - assign the ticket to an agent
    fn assign_ticket(
        &self,
        id: &TicketId,
        assignee: &UserId,
    ) -> BoxFuture<'static, ApiResult<Ticket>>;

    /// GET /tickets/{id}/audit - audit trail for a ticket
    fn fetch_audit_log(&self, id: &TicketId) -> BoxFuture<'static, ApiResult<Vec<AuditLog>>>;

    /// GET /agent/suggestion/{ticketId} - the ticket's AI suggestion.
    ///
    /// Returns `Ok(None)` when no suggestion has been produced yet (404 or
    /// an empty/null body): absence is a normal state, not an error.
    fn fetch_suggestion(
        &self,
        ticket_id: &TicketId,
    ) -> BoxFuture<'static, ApiResult<Option<AgentSuggestion>>>;

    /// PUT /agent/suggestion/{id} - edit a suggestion's reviewable fields
    fn update_suggestion(
        &self,
        id: &SuggestionId,
        edit: &SuggestionEdit,
    ) -> BoxFuture<'static, ApiResult<AgentSuggestion>>;

    /// GET /kb - list articles, optionally filtered
    fn fetch_articles(&self, filter: &ArticleFilter)
    -> BoxFuture<'static, ApiResult<Vec<Article>>>;

    /// POST /kb - create an article
    fn create_article(&self, input: &NewArticle) -> BoxFuture<'static, ApiResult<Article>>;

    /// PUT /kb/{id} - update an article
    fn update_article(
        &self,
        id: &ArticleId,
        patch: &ArticlePatch,
    ) -> BoxFuture<'static, ApiResult<Article>>;

    /// DELETE /kb/{id} - delete an article
    fn delete_article(&self, id: &ArticleId) -> BoxFuture<'static, ApiResult<()>>;

    /// GET /config - the configuration singleton
    fn fetch_config(&self) -> BoxFuture<'static, ApiResult<SystemConfig>>;

    /// PUT /config - replace the configuration wholesale
    fn update_config(&self, config: &SystemConfig)
    -> BoxFuture<'static, ApiResult<SystemConfig>>;
}

/// Production implementation of [`HelpdeskApi`] over `reqwest`.
#[derive(Clone)]
pub struct HttpApiClient {
    client: reqwest::Client,
    base_url: String,
    bearer: BearerCell,
}

impl HttpApiClient {
    /// Create a client against a fixed base endpoint.
    ///
    /// The `bearer` cell is shared with the session slice, which writes it
    /// on login/register and clears it on logout.
    #[must_use]
    pub fn new(base_url: impl Into<String>, bearer: BearerCell) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }

        Self {
            client: reqwest::Client::new(),
            base_url,
            bearer,
        }
    }

    /// Build a request, attaching the current bearer credential if present.
    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{path}", self.base_url);
        tracing::debug!(%method, %url, "api request");

        let builder = self.client.request(method, url);
        match self.bearer.get() {
            Some(token) => builder.bearer_auth(token.as_str()),
            None => builder,
        }
    }

    /// Send a request and decode a JSON body on success.
    async fn execute<T: DeserializeOwned>(builder: reqwest::RequestBuilder) -> ApiResult<T> {
        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::NetworkFailure(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            response
                .json::<T>()
                .await
                .map_err(|e| ApiError::Decode(e.to_string()))
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(Self::error_for(status, &body))
        }
    }

    /// Send a request, discarding any success body.
    async fn execute_empty(builder: reqwest::RequestBuilder) -> ApiResult<()> {
        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::NetworkFailure(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(Self::error_for(status, &body))
        }
    }

    /// Classify a non-success response.
    fn error_for(status: StatusCode, body: &str) -> ApiError {
        let message = Self::message_from(body);
        match status {
            StatusCode::UNAUTHORIZED => ApiError::Unauthorized,
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                ApiError::ValidationRejected(message)
            },
            StatusCode::NOT_FOUND => ApiError::NotFound(message),
            status => ApiError::Unexpected {
                status: status.as_u16(),
                message,
            },
        }
    }

    /// Extract a human-readable message from an error body.
    ///
    /// The server reports errors as `{"error": ...}` (sometimes
    /// `{"message": ...}`); anything else is passed through verbatim.
    fn message_from(body: &str) -> String {
        if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
            for key in ["error", "message"] {
                if let Some(message) = value.get(key).and_then(|m| m.as_str()) {
                    return message.to_string();
                }
            }
        }
        body.to_string()
    }
}

impl HelpdeskApi for HttpApiClient {
    fn login(&self, email: &str, password: &str) -> BoxFuture<'static, ApiResult<AuthResponse>> {
        let builder = self
            .request(Method::POST, "/auth/login")
            .json(&serde_json::json!({ "email": email, "password": password }));
        Box::pin(Self::execute(builder))
    }

    fn register(&self, input: &RegisterInput) -> BoxFuture<'static, ApiResult<AuthResponse>> {
        let builder = self.request(Method::POST, "/auth/register").json(input);
        Box::pin(Self::execute(builder))
    }

    fn fetch_tickets(&self, filter: &TicketFilter) -> BoxFuture<'static, ApiResult<Vec<Ticket>>> {
        let builder = self
            .request(Method::GET, "/tickets")
            .query(&filter.to_query());
        Box::pin(Self::execute(builder))
    }

    fn fetch_ticket_detail(&self, id: &TicketId) -> BoxFuture<'static, ApiResult<TicketDetail>> {
        let builder = self.request(Method::GET, &format!("/tickets/{id}"));
        Box::pin(Self::execute(builder))
    }

    fn create_ticket(&self, input: &NewTicket) -> BoxFuture<'static, ApiResult<Ticket>> {
        let builder = self.request(Method::POST, "/tickets").json(input);
        Box::pin(Self::execute(builder))
    }

    fn reply_to_ticket(
        &self,
        id: &TicketId,
        reply: &TicketReply,
    ) -> BoxFuture<'static, ApiResult<()>> {
        let builder = self
            .request(Method::POST, &format!("/tickets/{id}/reply"))
            .json(reply);
        Box::pin(Self::execute_empty(builder))
    }

    fn assign_ticket(
        &self,
        id: &TicketId,
        assignee: &UserId,
    ) -> BoxFuture<'static, ApiResult<Ticket>> {
        let builder = self
            .request(Method::POST, &format!("/tickets/{id}/assign"))
            .json(&serde_json::json!({ "assigneeId": assignee.as_str() }));
        Box::pin(Self::execute(builder))
    }

    fn fetch_audit_log(&self, id: &TicketId) -> BoxFuture<'static, ApiResult<Vec<AuditLog>>> {
        let builder = self.request(Method::GET, &format!("/tickets/{id}/audit"));
        Box::pin(Self::execute(builder))
    }

    fn fetch_suggestion(
        &self,
        ticket_id: &TicketId,
    ) -> BoxFuture<'static, ApiResult<Option<AgentSuggestion>>> {
        let builder = self.request(Method::GET, &format!("/agent/suggestion/{ticket_id}"));
        Box::pin(async move {
            let response = builder
                .send()
                .await
                .map_err(|e| ApiError::NetworkFailure(e.to_string()))?;

            let status = response.status();
            if status == StatusCode::NOT_FOUND {
                return Ok(None);
            }
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(Self::error_for(status, &body));
            }

            let body = response
                .text()
                .await
                .map_err(|e| ApiError::Decode(e.to_string()))?;
            let body = body.trim();
            if body.is_empty() || body == "null" {
                return Ok(None);
            }

            serde_json::from_str::<AgentSuggestion>(body)
                .map(Some)
                .map_err(|e| ApiError::Decode(e.to_string()))
        })
    }

    fn update_suggestion(
        &self,
        id: &SuggestionId,
        edit: &SuggestionEdit,
    ) -> BoxFuture<'static, ApiResult<AgentSuggestion>> {
        let builder = self
            .request(Method::PUT, &format!("/agent/suggestion/{id}"))
            .json(edit);
        Box::pin(Self::execute(builder))
    }

    fn fetch_articles(
        &self,
        filter: &ArticleFilter,
    ) -> BoxFuture<'static, ApiResult<Vec<Article>>> {
        let builder = self.request(Method::GET, "/kb").query(&filter.to_query());
        Box::pin(Self::execute(builder))
    }

    fn create_article(&self, input: &NewArticle) -> BoxFuture<'static, ApiResult<Article>> {
        let builder = self.request(Method::POST, "/kb").json(input);
        Box::pin(Self::execute(builder))
    }

    fn update_article(
        &self,
        id: &ArticleId,
        patch: &ArticlePatch,
    ) -> BoxFuture<'static, ApiResult<Article>> {
        let builder = self.request(Method::PUT, &format!("/kb/{id}")).json(patch);
        Box::pin(Self::execute(builder))
    }

    fn delete_article(&self, id: &ArticleId) -> BoxFuture<'static, ApiResult<()>> {
        let builder = self.request(Method::DELETE, &format!("/kb/{id}"));
        Box::pin(Self::execute_empty(builder))
    }

    fn fetch_config(&self) -> BoxFuture<'static, ApiResult<SystemConfig>> {
        let builder = self.request(Method::GET, "/config");
        Box::pin(Self::execute(builder))
    }

    fn update_config(
        &self,
        config: &SystemConfig,
    ) -> BoxFuture<'static, ApiResult<SystemConfig>> {
        let builder = self.request(Method::PUT, "/config").json(config);
        Box::pin(Self::execute(builder))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn bearer_cell_replaces_and_clears() {
        let cell = BearerCell::new();
        assert!(cell.get().is_none());

        cell.set(AuthToken::new("t1"));
        assert_eq!(cell.get(), Some(AuthToken::new("t1")));

        cell.set(AuthToken::new("t2"));
        assert_eq!(cell.get(), Some(AuthToken::new("t2")));

        cell.clear();
        assert!(cell.get().is_none());
    }

    #[tokio::test]
    async fn attaches_bearer_header_when_token_present() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/tickets"))
            .and(header("authorization", "Bearer secret-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(&server)
            .await;

        let bearer = BearerCell::new();
        bearer.set(AuthToken::new("secret-token"));
        let client = HttpApiClient::new(server.uri(), bearer);

        let tickets = client.fetch_tickets(&TicketFilter::default()).await.unwrap();
        assert!(tickets.is_empty());
    }

    #[tokio::test]
    async fn forwards_filter_as_query_params() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/tickets"))
            .and(query_param("status", "open"))
            .and(query_param("mine", "true"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(&server)
            .await;

        let client = HttpApiClient::new(server.uri(), BearerCell::new());
        let filter = TicketFilter {
            status: Some(crate::types::TicketStatus::Open),
            mine: true,
        };

        assert!(client.fetch_tickets(&filter).await.is_ok());
    }

    #[tokio::test]
    async fn maps_status_codes_to_error_kinds() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/config"))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_json(serde_json::json!({ "error": "token expired" })),
            )
            .mount(&server)
            .await;

        let client = HttpApiClient::new(server.uri(), BearerCell::new());
        assert_eq!(client.fetch_config().await, Err(ApiError::Unauthorized));
    }

    #[tokio::test]
    async fn extracts_error_message_from_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/tickets"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_json(serde_json::json!({ "error": "title is required" })),
            )
            .mount(&server)
            .await;

        let client = HttpApiClient::new(server.uri(), BearerCell::new());
        let input = NewTicket {
            title: String::new(),
            description: "Y".to_string(),
            category: None,
        };

        assert_eq!(
            client.create_ticket(&input).await,
            Err(ApiError::ValidationRejected("title is required".to_string()))
        );
    }

    #[tokio::test]
    async fn suggestion_absence_is_not_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/agent/suggestion/t404"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/agent/suggestion/tnull"))
            .respond_with(ResponseTemplate::new(200).set_body_string("null"))
            .mount(&server)
            .await;

        let client = HttpApiClient::new(server.uri(), BearerCell::new());
        assert_eq!(
            client.fetch_suggestion(&TicketId::new("t404")).await,
            Ok(None)
        );
        assert_eq!(
            client.fetch_suggestion(&TicketId::new("tnull")).await,
            Ok(None)
        );
    }

    #[tokio::test]
    async fn decodes_present_suggestion() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/agent/suggestion/t1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "_id": "s1",
                "ticketId": "t1",
                "predictedCategory": "tech",
                "articleIds": ["a1"],
                "draftReply": "Restart the router",
                "confidence": 0.9,
                "autoClosed": false
            })))
            .mount(&server)
            .await;

        let client = HttpApiClient::new(server.uri(), BearerCell::new());
        let suggestion = client
            .fetch_suggestion(&TicketId::new("t1"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(suggestion.id, SuggestionId::new("s1"));
        assert_eq!(suggestion.draft_reply, "Restart the router");
    }

    #[tokio::test]
    async fn trims_trailing_slash_from_base_url() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/config"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "autoCloseEnabled": true,
                "confidenceThreshold": 0.8,
                "slaHours": 24
            })))
            .mount(&server)
            .await;

        let client = HttpApiClient::new(format!("{}/", server.uri()), BearerCell::new());
        let config = client.fetch_config().await.unwrap();
        assert!(config.auto_close_enabled);
        assert_eq!(config.sla_hours, 24);
    }
}
