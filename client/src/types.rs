//! Domain types for the helpdesk client.
//!
//! All entities are identified by server-assigned opaque string identifiers
//! (`_id` on the wire), wrapped in newtypes so ids of different entities
//! cannot be mixed up. Field names follow the server's camelCase JSON;
//! enum values are lowercase (`snake_case` where the server uses it).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Unique identifier for a user
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(String);

impl UserId {
    /// Creates a `UserId` from an opaque server-assigned string
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a ticket
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TicketId(String);

impl TicketId {
    /// Creates a `TicketId` from an opaque server-assigned string
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TicketId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for an agent suggestion
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SuggestionId(String);

impl SuggestionId {
    /// Creates a `SuggestionId` from an opaque server-assigned string
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SuggestionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a knowledge-base article
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArticleId(String);

impl ArticleId {
    /// Creates an `ArticleId` from an opaque server-assigned string
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ArticleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Bearer token proving an authenticated session.
///
/// Issued by the server on login/register; the client never inspects its
/// contents, only attaches it to requests and persists it durably.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthToken(String);

impl AuthToken {
    /// Wraps a server-issued token string
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the token as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Debug deliberately hides the token value
impl std::fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AuthToken(***)")
    }
}

/// Role of an authenticated user
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Full access: configuration, knowledge base, all tickets
    Admin,
    /// Support agent: all tickets, suggestions
    Agent,
    /// End user: own tickets only
    User,
}

/// An authenticated user
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Server-assigned identifier
    #[serde(rename = "_id")]
    pub id: UserId,
    /// Display name
    pub name: String,
    /// Login email
    pub email: String,
    /// Role controlling visibility and capabilities
    pub role: Role,
    /// When the account was created
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Response from the login and register endpoints
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthResponse {
    /// Bearer credential for subsequent requests
    pub token: AuthToken,
    /// The authenticated user
    pub user: User,
}

/// Ticket category
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketCategory {
    /// Billing and payment issues
    Billing,
    /// Technical problems
    Tech,
    /// Shipping and delivery
    Shipping,
    /// Everything else
    Other,
}

impl TicketCategory {
    /// Wire representation of the category
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Billing => "billing",
            Self::Tech => "tech",
            Self::Shipping => "shipping",
            Self::Other => "other",
        }
    }
}

/// Ticket lifecycle status
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    /// Newly created, not yet triaged
    Open,
    /// Auto-triaged by the agent pipeline
    Triaged,
    /// Waiting for a human agent
    WaitingHuman,
    /// Resolved, pending closure
    Resolved,
    /// Closed
    Closed,
}

impl TicketStatus {
    /// Wire representation of the status
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Triaged => "triaged",
            Self::WaitingHuman => "waiting_human",
            Self::Resolved => "resolved",
            Self::Closed => "closed",
        }
    }
}

impl std::fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A user-submitted support request tracked through a status lifecycle
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    /// Server-assigned identifier
    #[serde(rename = "_id")]
    pub id: TicketId,
    /// Short summary
    pub title: String,
    /// Full problem description
    pub description: String,
    /// Category (user-chosen or agent-predicted)
    pub category: TicketCategory,
    /// Current lifecycle status
    pub status: TicketStatus,
    /// User who created the ticket
    pub created_by: UserId,
    /// Agent the ticket is assigned to, if any
    #[serde(default)]
    pub assignee: Option<UserId>,
    /// Reference to the agent suggestion, once one has been produced
    #[serde(default)]
    pub agent_suggestion_id: Option<SuggestionId>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp
    pub updated_at: DateTime<Utc>,
}

/// Provenance of an agent suggestion's model run
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelInfo {
    /// Model provider name
    pub provider: String,
    /// Model identifier
    pub model: String,
    /// Prompt template version
    pub prompt_version: String,
    /// Inference latency, when reported
    #[serde(default)]
    pub latency_ms: Option<u64>,
}

/// An AI-generated draft reply and category prediction for a ticket.
///
/// Produced asynchronously by a server-side process; the client only polls
/// for its existence and may later edit `draft_reply`/`article_ids`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentSuggestion {
    /// Server-assigned identifier
    #[serde(rename = "_id")]
    pub id: SuggestionId,
    /// The ticket this suggestion belongs to
    pub ticket_id: TicketId,
    /// Category the model predicted
    pub predicted_category: TicketCategory,
    /// Referenced knowledge-base articles.
    ///
    /// The server sometimes sends plain id strings and sometimes nested
    /// `{_id: ...}` objects; both are normalized to `ArticleId` here.
    #[serde(deserialize_with = "article_refs")]
    pub article_ids: Vec<ArticleId>,
    /// Draft reply text
    pub draft_reply: String,
    /// Model confidence in [0, 1]
    pub confidence: f64,
    /// Whether the pipeline auto-closed the ticket
    pub auto_closed: bool,
    /// Model provenance, when reported
    #[serde(default)]
    pub model_info: Option<ModelInfo>,
    /// When the suggestion was produced
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Deserialize article references from either plain ids or nested objects.
fn article_refs<'de, D>(deserializer: D) -> Result<Vec<ArticleId>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum ArticleRef {
        Id(String),
        Object {
            #[serde(rename = "_id")]
            id: String,
        },
    }

    let refs = Vec::<ArticleRef>::deserialize(deserializer)?;
    Ok(refs
        .into_iter()
        .map(|r| match r {
            ArticleRef::Id(id) | ArticleRef::Object { id } => ArticleId::new(id),
        })
        .collect())
}

/// Actor recorded in an audit log entry
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditActor {
    /// Automated pipeline
    System,
    /// Human support agent
    Agent,
    /// End user
    User,
}

/// One entry of a ticket's audit trail
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLog {
    /// Server-assigned identifier
    #[serde(rename = "_id")]
    pub id: String,
    /// The ticket this entry belongs to
    pub ticket_id: TicketId,
    /// Correlates all entries of one pipeline run
    pub trace_id: String,
    /// Who performed the action
    pub actor: AuditActor,
    /// Action name (e.g. "`TICKET_CREATED`")
    pub action: String,
    /// Free-form metadata attached by the actor
    #[serde(default)]
    pub meta: serde_json::Value,
    /// When the action happened
    pub timestamp: DateTime<Utc>,
}

/// Full detail view of one ticket: the ticket itself, its agent suggestion
/// (if one has been produced), and the audit trail.
///
/// This is the single normalized shape for the "current ticket": the wire
/// field `agentSuggestion` is folded into `suggestion`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketDetail {
    /// The ticket
    pub ticket: Ticket,
    /// Agent suggestion, once resolved
    #[serde(default, alias = "agentSuggestion")]
    pub suggestion: Option<AgentSuggestion>,
    /// Audit trail entries
    #[serde(default)]
    pub audit: Vec<AuditLog>,
}

impl TicketDetail {
    /// Build a detail view for a just-created ticket.
    ///
    /// The audit trail is not fetched on creation; it arrives with the next
    /// full detail fetch.
    #[must_use]
    pub const fn from_created(ticket: Ticket, suggestion: Option<AgentSuggestion>) -> Self {
        Self {
            ticket,
            suggestion,
            audit: Vec::new(),
        }
    }
}

/// Publication status of a knowledge-base article
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArticleStatus {
    /// Visible to admins only
    Draft,
    /// Published to all users
    Published,
}

impl ArticleStatus {
    /// Wire representation of the status
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Published => "published",
        }
    }
}

/// A knowledge-base article
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    /// Server-assigned identifier
    #[serde(rename = "_id")]
    pub id: ArticleId,
    /// Article title
    pub title: String,
    /// Article body (markdown)
    pub body: String,
    /// Search tags
    #[serde(default)]
    pub tags: Vec<String>,
    /// Publication status
    pub status: ArticleStatus,
    /// Last modification timestamp
    pub updated_at: DateTime<Utc>,
}

/// System configuration singleton.
///
/// Fetched once and replaced wholesale on update - there are no
/// partial-field merge semantics beyond what the server returns.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemConfig {
    /// Whether high-confidence suggestions auto-close tickets
    pub auto_close_enabled: bool,
    /// Confidence threshold in [0, 1] for auto-closing
    pub confidence_threshold: f64,
    /// Service-level agreement window in hours (> 0)
    pub sla_hours: u32,
}

/// Input for registering a new account
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterInput {
    /// Display name
    pub name: String,
    /// Login email
    pub email: String,
    /// Password
    pub password: String,
    /// Requested role; the server defaults to `user` when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

/// Input for creating a ticket
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTicket {
    /// Short summary
    pub title: String,
    /// Full problem description
    pub description: String,
    /// Category; the triage pipeline predicts one when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<TicketCategory>,
}

/// Body of a reply/close/reopen operation on a ticket
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketReply {
    /// Reply text
    pub message: String,
    /// Close the ticket along with the reply
    #[serde(skip_serializing_if = "Option::is_none")]
    pub close: Option<bool>,
    /// Reopen the ticket along with the reply
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reopen: Option<bool>,
}

impl TicketReply {
    /// A plain reply that leaves the status untouched
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            close: None,
            reopen: None,
        }
    }

    /// A reply that also closes the ticket
    #[must_use]
    pub fn closing(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            close: Some(true),
            reopen: None,
        }
    }

    /// A reply that also reopens the ticket
    #[must_use]
    pub fn reopening(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            close: None,
            reopen: Some(true),
        }
    }
}

/// Edit to an agent suggestion's reviewable fields
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionEdit {
    /// Replacement draft reply, if edited
    #[serde(skip_serializing_if = "Option::is_none")]
    pub draft_reply: Option<String>,
    /// Replacement article references, if edited
    #[serde(skip_serializing_if = "Option::is_none")]
    pub article_ids: Option<Vec<ArticleId>>,
}

/// Input for creating a knowledge-base article
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewArticle {
    /// Article title
    pub title: String,
    /// Article body
    pub body: String,
    /// Search tags
    pub tags: Vec<String>,
    /// Publication status
    pub status: ArticleStatus,
}

/// Partial update to a knowledge-base article
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticlePatch {
    /// Replacement title
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Replacement body
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    /// Replacement tags
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    /// Replacement status
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ArticleStatus>,
}

/// Server-side filter for the ticket list
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TicketFilter {
    /// Restrict to one status
    pub status: Option<TicketStatus>,
    /// Restrict to tickets created by the current user
    pub mine: bool,
}

impl TicketFilter {
    /// Query-string parameters for the list endpoint
    #[must_use]
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(status) = self.status {
            params.push(("status", status.as_str().to_string()));
        }
        if self.mine {
            params.push(("mine", "true".to_string()));
        }
        params
    }
}

/// Server-side filter for the knowledge-base article list
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ArticleFilter {
    /// Free-text query
    pub query: Option<String>,
    /// Restrict to one publication status
    pub status: Option<ArticleStatus>,
}

impl ArticleFilter {
    /// Query-string parameters for the list endpoint
    #[must_use]
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(query) = &self.query {
            params.push(("query", query.clone()));
        }
        if let Some(status) = self.status {
            params.push(("status", status.as_str().to_string()));
        }
        params
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code
mod tests {
    use super::*;

    #[test]
    fn ticket_deserializes_from_server_shape() {
        let json = r#"{
            "_id": "t1",
            "title": "Printer on fire",
            "description": "It is very much on fire",
            "category": "tech",
            "status": "waiting_human",
            "createdBy": "u1",
            "assignee": "a1",
            "agentSuggestionId": "s1",
            "createdAt": "2025-01-01T00:00:00Z",
            "updatedAt": "2025-01-02T00:00:00Z"
        }"#;

        let ticket: Ticket = serde_json::from_str(json).unwrap();
        assert_eq!(ticket.id, TicketId::new("t1"));
        assert_eq!(ticket.category, TicketCategory::Tech);
        assert_eq!(ticket.status, TicketStatus::WaitingHuman);
        assert_eq!(ticket.created_by, UserId::new("u1"));
        assert_eq!(ticket.assignee, Some(UserId::new("a1")));
        assert_eq!(ticket.agent_suggestion_id, Some(SuggestionId::new("s1")));
    }

    #[test]
    fn ticket_tolerates_absent_optional_fields() {
        let json = r#"{
            "_id": "t2",
            "title": "X",
            "description": "Y",
            "category": "other",
            "status": "open",
            "createdBy": "u1",
            "createdAt": "2025-01-01T00:00:00Z",
            "updatedAt": "2025-01-01T00:00:00Z"
        }"#;

        let ticket: Ticket = serde_json::from_str(json).unwrap();
        assert_eq!(ticket.assignee, None);
        assert_eq!(ticket.agent_suggestion_id, None);
    }

    #[test]
    fn suggestion_normalizes_plain_article_ids() {
        let json = r#"{
            "_id": "s1",
            "ticketId": "t1",
            "predictedCategory": "billing",
            "articleIds": ["a1", "a2"],
            "draftReply": "Try turning it off and on",
            "confidence": 0.87,
            "autoClosed": false
        }"#;

        let suggestion: AgentSuggestion = serde_json::from_str(json).unwrap();
        assert_eq!(
            suggestion.article_ids,
            vec![ArticleId::new("a1"), ArticleId::new("a2")]
        );
        assert_eq!(suggestion.model_info, None);
    }

    #[test]
    fn suggestion_normalizes_nested_article_refs() {
        let json = r#"{
            "_id": "s1",
            "ticketId": "t1",
            "predictedCategory": "tech",
            "articleIds": [{"_id": "a1", "title": "ignored"}, "a2"],
            "draftReply": "See the attached article",
            "confidence": 0.5,
            "autoClosed": true,
            "modelInfo": {
                "provider": "stub",
                "model": "stub-v1",
                "promptVersion": "3"
            }
        }"#;

        let suggestion: AgentSuggestion = serde_json::from_str(json).unwrap();
        assert_eq!(
            suggestion.article_ids,
            vec![ArticleId::new("a1"), ArticleId::new("a2")]
        );
        let info = suggestion.model_info.unwrap();
        assert_eq!(info.provider, "stub");
        assert_eq!(info.latency_ms, None);
    }

    #[test]
    fn ticket_detail_accepts_agent_suggestion_alias() {
        let json = r#"{
            "ticket": {
                "_id": "t1",
                "title": "X",
                "description": "Y",
                "category": "other",
                "status": "open",
                "createdBy": "u1",
                "createdAt": "2025-01-01T00:00:00Z",
                "updatedAt": "2025-01-01T00:00:00Z"
            },
            "agentSuggestion": {
                "_id": "s1",
                "ticketId": "t1",
                "predictedCategory": "other",
                "articleIds": [],
                "draftReply": "Hello",
                "confidence": 1.0,
                "autoClosed": false
            },
            "audit": []
        }"#;

        let detail: TicketDetail = serde_json::from_str(json).unwrap();
        assert_eq!(
            detail.suggestion.map(|s| s.draft_reply),
            Some("Hello".to_string())
        );
    }

    #[test]
    fn ticket_filter_builds_query_params() {
        let filter = TicketFilter {
            status: Some(TicketStatus::Open),
            mine: true,
        };
        assert_eq!(
            filter.to_query(),
            vec![
                ("status", "open".to_string()),
                ("mine", "true".to_string())
            ]
        );

        assert!(TicketFilter::default().to_query().is_empty());
    }

    #[test]
    fn reply_serializes_only_set_flags() {
        let reply = TicketReply::closing("done");
        let json = serde_json::to_value(&reply).unwrap();
        assert_eq!(json["message"], "done");
        assert_eq!(json["close"], true);
        assert!(json.get("reopen").is_none());
    }

    #[test]
    fn auth_token_debug_hides_value() {
        let token = AuthToken::new("secret");
        assert_eq!(format!("{token:?}"), "AuthToken(***)");
    }
}
