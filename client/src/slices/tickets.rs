//! Tickets slice: the ticket collection, the current detail view, and the
//! suggestion polling flows.

use crate::environment::AppEnvironment;
use crate::error::ApiError;
use crate::resolver::resolve_suggestion;
use crate::types::{
    AgentSuggestion, AuditLog, NewTicket, SuggestionEdit, SuggestionId, Ticket, TicketDetail,
    TicketFilter, TicketId, TicketReply, UserId,
};
use chrono::{DateTime, Utc};
use helpdesk_core::{Effect, Reducer, SmallVec, smallvec};
use std::sync::Arc;

/// Ticket collection state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TicketsState {
    /// The ticket list as last replaced by a fetch (head = most recent)
    pub tickets: Vec<Ticket>,
    /// Detail view of the currently selected ticket
    pub current_ticket: Option<TicketDetail>,
    /// When the list was last successfully replaced from the server
    pub last_refreshed: Option<DateTime<Utc>>,
    /// A ticket operation is in flight
    pub loading: bool,
    /// Human-readable message of the last failed operation
    pub error: Option<String>,
}

impl TicketsState {
    /// Empty state
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

/// A created ticket together with whatever suggestion was resolved within
/// the polling budget. Creation succeeds regardless of the suggestion
/// outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct CreatedTicket {
    /// The created ticket
    pub ticket: Ticket,
    /// Suggestion resolved within the retry budget, if any
    pub suggestion: Option<AgentSuggestion>,
}

/// Actions processed by the tickets slice
#[derive(Debug, Clone)]
pub enum TicketsAction {
    /// Command: replace the ticket list from the server
    FetchAll {
        /// Server-side filter
        filter: TicketFilter,
    },
    /// Response: the list endpoint answered
    FetchAllResponse(Result<Vec<Ticket>, ApiError>),

    /// Command: load one ticket's detail view
    FetchDetail {
        /// Ticket to load
        id: TicketId,
    },
    /// Response: the detail endpoint answered
    FetchDetailResponse(Result<TicketDetail, ApiError>),

    /// Command: create a ticket, then poll for its agent suggestion
    Create {
        /// Ticket fields
        input: NewTicket,
    },
    /// Response: creation (and the bounded suggestion poll) finished
    CreateResponse(Result<CreatedTicket, ApiError>),

    /// Command: reply to a ticket, optionally closing or reopening it
    Reply {
        /// Ticket to reply to
        id: TicketId,
        /// Reply body and status flags
        reply: TicketReply,
    },
    /// Response: the reply endpoint answered
    ReplyResponse(Result<(), ApiError>),

    /// Command: assign a ticket to an agent
    Assign {
        /// Ticket to assign
        id: TicketId,
        /// Agent to assign it to
        assignee: UserId,
    },
    /// Response: the assign endpoint answered with the updated ticket
    AssignResponse(Result<Ticket, ApiError>),

    /// Command: re-run the bounded suggestion poll for a ticket
    ResolveSuggestion {
        /// Ticket to poll for
        ticket_id: TicketId,
    },
    /// Response: the poll finished; `None` means no suggestion resolved
    SuggestionResolved {
        /// Ticket that was polled
        ticket_id: TicketId,
        /// The resolved suggestion, if any
        suggestion: Option<AgentSuggestion>,
    },

    /// Command: refresh the audit trail of the current detail view
    FetchAudit {
        /// Ticket whose audit trail to fetch
        id: TicketId,
    },
    /// Response: the audit endpoint answered
    FetchAuditResponse {
        /// Ticket that was queried
        id: TicketId,
        /// The audit trail, or the failure
        result: Result<Vec<AuditLog>, ApiError>,
    },

    /// Command: edit a suggestion's reviewable fields
    UpdateSuggestion {
        /// Suggestion to edit
        id: SuggestionId,
        /// Edited fields
        edit: SuggestionEdit,
    },
    /// Response: the suggestion update endpoint answered
    UpdateSuggestionResponse(Result<AgentSuggestion, ApiError>),

    /// Command: dismiss the error banner
    ClearError,
    /// Command: drop the current detail view
    ClearCurrentTicket,
}

/// Reducer for the tickets slice
#[derive(Debug, Clone, Default)]
pub struct TicketsReducer;

impl TicketsReducer {
    /// Creates a new `TicketsReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Reducer for TicketsReducer {
    type State = TicketsState;
    type Action = TicketsAction;
    type Environment = AppEnvironment;

    #[allow(clippy::too_many_lines)] // One arm per operation of the slice
    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            TicketsAction::FetchAll { filter } => {
                state.loading = true;
                state.error = None;

                let response = env.api().fetch_tickets(&filter);
                smallvec![Effect::future(async move {
                    Some(TicketsAction::FetchAllResponse(response.await))
                })]
            },

            TicketsAction::FetchAllResponse(Ok(tickets)) => {
                state.loading = false;
                state.tickets = tickets;
                state.last_refreshed = Some(env.clock().now());
                smallvec![]
            },

            TicketsAction::FetchAllResponse(Err(err)) => {
                // Stale list stays visible; only the flags flip
                state.loading = false;
                state.error = Some(err.to_string());
                smallvec![]
            },

            TicketsAction::FetchDetail { id } => {
                state.loading = true;
                state.error = None;

                let response = env.api().fetch_ticket_detail(&id);
                smallvec![Effect::future(async move {
                    Some(TicketsAction::FetchDetailResponse(response.await))
                })]
            },

            TicketsAction::FetchDetailResponse(Ok(detail)) => {
                state.loading = false;
                state.current_ticket = Some(detail);
                smallvec![]
            },

            TicketsAction::FetchDetailResponse(Err(err)) => {
                state.loading = false;
                state.error = Some(err.to_string());
                smallvec![]
            },

            TicketsAction::Create { input } => {
                state.loading = true;
                state.error = None;

                let api = Arc::clone(env.api());
                let policy = env.poll().clone();
                smallvec![Effect::future(async move {
                    let response = match api.create_ticket(&input).await {
                        Ok(ticket) => {
                            // Non-fatal: creation succeeds even when no
                            // suggestion resolves within the budget
                            let suggestion =
                                resolve_suggestion(api.as_ref(), &policy, &ticket.id)
                                    .await
                                    .ok();
                            Ok(CreatedTicket { ticket, suggestion })
                        },
                        Err(err) => Err(err),
                    };
                    Some(TicketsAction::CreateResponse(response))
                })]
            },

            TicketsAction::CreateResponse(Ok(created)) => {
                state.loading = false;
                // Optimistic most-recent-first ordering
                state.tickets.insert(0, created.ticket.clone());
                state.current_ticket = Some(TicketDetail::from_created(
                    created.ticket,
                    created.suggestion,
                ));
                smallvec![]
            },

            TicketsAction::CreateResponse(Err(err)) => {
                state.loading = false;
                state.error = Some(err.to_string());
                smallvec![]
            },

            TicketsAction::Reply { id, reply } => {
                state.loading = true;
                state.error = None;

                let response = env.api().reply_to_ticket(&id, &reply);
                smallvec![Effect::future(async move {
                    Some(TicketsAction::ReplyResponse(response.await))
                })]
            },

            TicketsAction::ReplyResponse(Ok(())) => {
                state.loading = false;
                // Invalidate on mutation: force a refetch of the detail view
                state.current_ticket = None;
                smallvec![]
            },

            TicketsAction::ReplyResponse(Err(err)) => {
                state.loading = false;
                state.error = Some(err.to_string());
                smallvec![]
            },

            TicketsAction::Assign { id, assignee } => {
                state.loading = true;
                state.error = None;

                let response = env.api().assign_ticket(&id, &assignee);
                smallvec![Effect::future(async move {
                    Some(TicketsAction::AssignResponse(response.await))
                })]
            },

            TicketsAction::AssignResponse(Ok(ticket)) => {
                state.loading = false;
                // Wholesale replace; an unknown id is silently dropped
                if let Some(existing) =
                    state.tickets.iter_mut().find(|t| t.id == ticket.id)
                {
                    *existing = ticket;
                }
                smallvec![]
            },

            TicketsAction::AssignResponse(Err(err)) => {
                state.loading = false;
                state.error = Some(err.to_string());
                smallvec![]
            },

            TicketsAction::ResolveSuggestion { ticket_id } => {
                let api = Arc::clone(env.api());
                let policy = env.poll().clone();
                smallvec![Effect::future(async move {
                    let suggestion = resolve_suggestion(api.as_ref(), &policy, &ticket_id)
                        .await
                        .ok();
                    Some(TicketsAction::SuggestionResolved {
                        ticket_id,
                        suggestion,
                    })
                })]
            },

            TicketsAction::SuggestionResolved {
                ticket_id,
                suggestion,
            } => {
                match (state.current_ticket.as_mut(), suggestion) {
                    (Some(detail), Some(suggestion))
                        if detail.ticket.id == ticket_id =>
                    {
                        detail.suggestion = Some(suggestion);
                    },
                    (_, Some(_)) => {
                        tracing::debug!(%ticket_id, "resolved suggestion has no matching current ticket");
                    },
                    // No suggestion within the budget: the ticket stays valid
                    (_, None) => {},
                }
                smallvec![]
            },

            TicketsAction::FetchAudit { id } => {
                let response = env.api().fetch_audit_log(&id);
                smallvec![Effect::future(async move {
                    Some(TicketsAction::FetchAuditResponse {
                        id,
                        result: response.await,
                    })
                })]
            },

            TicketsAction::FetchAuditResponse {
                id,
                result: Ok(audit),
            } => {
                if let Some(detail) = state
                    .current_ticket
                    .as_mut()
                    .filter(|d| d.ticket.id == id)
                {
                    detail.audit = audit;
                }
                smallvec![]
            },

            TicketsAction::FetchAuditResponse {
                result: Err(err), ..
            } => {
                state.error = Some(err.to_string());
                smallvec![]
            },

            TicketsAction::UpdateSuggestion { id, edit } => {
                state.loading = true;
                state.error = None;

                let response = env.api().update_suggestion(&id, &edit);
                smallvec![Effect::future(async move {
                    Some(TicketsAction::UpdateSuggestionResponse(response.await))
                })]
            },

            TicketsAction::UpdateSuggestionResponse(Ok(suggestion)) => {
                state.loading = false;
                if let Some(detail) = state.current_ticket.as_mut() {
                    detail.suggestion = Some(suggestion);
                }
                smallvec![]
            },

            TicketsAction::UpdateSuggestionResponse(Err(err)) => {
                state.loading = false;
                state.error = Some(err.to_string());
                smallvec![]
            },

            TicketsAction::ClearError => {
                state.error = None;
                smallvec![]
            },

            TicketsAction::ClearCurrentTicket => {
                state.current_ticket = None;
                smallvec![]
            },
        }
    }
}
