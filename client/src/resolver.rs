//! Bounded polling for asynchronously produced agent suggestions.
//!
//! An [`AgentSuggestion`] may not exist immediately after ticket creation:
//! it is computed by a server-side process the client does not control.
//! [`resolve_suggestion`] polls the suggestion endpoint with the bounded
//! linear-backoff policy from [`helpdesk_runtime::poll`], stopping on the
//! first attempt that yields a payload.
//!
//! Exhausting the budget is reported as [`NoSuggestionAvailable`], which
//! every caller treats as "suggestion absent" rather than a failure: the
//! suggestion is an enhancement of a valid ticket, not a requirement.

use crate::api::HelpdeskApi;
use crate::types::{AgentSuggestion, TicketId};
use helpdesk_runtime::poll::{PollError, PollPolicy, poll_until_some};
use thiserror::Error;

/// No suggestion was produced within the polling budget. Non-fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("No suggestion available for ticket {ticket_id} after {attempts} attempts")]
pub struct NoSuggestionAvailable {
    /// The ticket that was polled
    pub ticket_id: TicketId,
    /// Attempts made before giving up
    pub attempts: u32,
}

/// Poll for a ticket's agent suggestion until it exists or the budget runs
/// out.
///
/// Invoked both as part of the ticket-creation flow and standalone when a
/// ticket's AI detail view is (re)opened.
///
/// # Errors
///
/// Returns [`NoSuggestionAvailable`] when every attempt came back empty or
/// failed. Callers downgrade this to "suggestion absent".
pub async fn resolve_suggestion(
    api: &dyn HelpdeskApi,
    policy: &PollPolicy,
    ticket_id: &TicketId,
) -> Result<AgentSuggestion, NoSuggestionAvailable> {
    let result = poll_until_some(policy, |attempt| {
        tracing::debug!(%ticket_id, attempt, "fetching agent suggestion");
        api.fetch_suggestion(ticket_id)
    })
    .await;

    result.map_err(|err| match err {
        PollError::Exhausted { attempts } => {
            tracing::info!(%ticket_id, attempts, "no suggestion resolved within the retry budget");
            NoSuggestionAvailable {
                ticket_id: ticket_id.clone(),
                attempts,
            }
        },
    })
}
