//! Derived view selectors.
//!
//! Pure, stateless functions over slice state, recomputed by presentation
//! code on every state change. Nothing here caches or mutates.

use crate::types::{Article, Role, Ticket, TicketStatus, User};

/// Tickets visible to the given user.
///
/// Admins and agents see every ticket; a `user` role sees only tickets they
/// created; an unauthenticated viewer sees none.
#[must_use]
pub fn visible_tickets<'a>(tickets: &'a [Ticket], user: Option<&User>) -> Vec<&'a Ticket> {
    match user {
        Some(user) => match user.role {
            Role::Admin | Role::Agent => tickets.iter().collect(),
            Role::User => tickets
                .iter()
                .filter(|t| t.created_by == user.id)
                .collect(),
        },
        None => Vec::new(),
    }
}

/// Per-status ticket totals for summary displays.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    /// All tickets
    pub total: usize,
    /// Tickets with status `open`
    pub open: usize,
    /// Tickets with status `triaged`
    pub triaged: usize,
    /// Tickets with status `waiting_human`
    pub waiting_human: usize,
    /// Tickets with status `resolved`
    pub resolved: usize,
    /// Tickets with status `closed`
    pub closed: usize,
}

/// Count tickets by status.
#[must_use]
pub fn status_counts(tickets: &[Ticket]) -> StatusCounts {
    let mut counts = StatusCounts::default();
    for ticket in tickets {
        counts.total += 1;
        match ticket.status {
            TicketStatus::Open => counts.open += 1,
            TicketStatus::Triaged => counts.triaged += 1,
            TicketStatus::WaitingHuman => counts.waiting_human += 1,
            TicketStatus::Resolved => counts.resolved += 1,
            TicketStatus::Closed => counts.closed += 1,
        }
    }
    counts
}

/// Status filter with an "all" sentinel that disables the filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    /// Disable status filtering
    #[default]
    All,
    /// Keep only tickets with exactly this status
    Only(TicketStatus),
}

impl StatusFilter {
    /// Whether a ticket with the given status passes the filter
    #[must_use]
    pub fn matches(self, status: TicketStatus) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => status == wanted,
        }
    }
}

/// Filter tickets by a case-insensitive title substring AND a status.
///
/// An empty search term matches every title.
#[must_use]
pub fn filter_tickets<'a>(
    tickets: &'a [Ticket],
    search: &str,
    status: StatusFilter,
) -> Vec<&'a Ticket> {
    let needle = search.to_lowercase();
    tickets
        .iter()
        .filter(|t| t.title.to_lowercase().contains(&needle) && status.matches(t.status))
        .collect()
}

/// Filter articles by a case-insensitive substring over title, body, or any
/// tag.
#[must_use]
pub fn filter_articles<'a>(articles: &'a [Article], query: &str) -> Vec<&'a Article> {
    let needle = query.to_lowercase();
    articles
        .iter()
        .filter(|a| {
            a.title.to_lowercase().contains(&needle)
                || a.body.to_lowercase().contains(&needle)
                || a.tags.iter().any(|t| t.to_lowercase().contains(&needle))
        })
        .collect()
}

/// What a role is allowed to do.
///
/// The single capability-resolution point: presentation code branches on
/// these flags instead of re-deriving them from the role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// Create, edit, and delete knowledge-base articles
    pub can_manage_articles: bool,
    /// Assign tickets to agents
    pub can_assign_tickets: bool,
    /// Edit agent suggestions before sending
    pub can_edit_suggestions: bool,
    /// Edit the system configuration
    pub can_edit_config: bool,
    /// See tickets created by other users
    pub can_view_all_tickets: bool,
}

/// Resolve the capability set for a role.
#[must_use]
pub const fn capabilities_for(role: Role) -> Capabilities {
    match role {
        Role::Admin => Capabilities {
            can_manage_articles: true,
            can_assign_tickets: true,
            can_edit_suggestions: true,
            can_edit_config: true,
            can_view_all_tickets: true,
        },
        Role::Agent => Capabilities {
            can_manage_articles: false,
            can_assign_tickets: true,
            can_edit_suggestions: true,
            can_edit_config: false,
            can_view_all_tickets: true,
        },
        Role::User => Capabilities {
            can_manage_articles: false,
            can_assign_tickets: false,
            can_edit_suggestions: false,
            can_edit_config: false,
            can_view_all_tickets: false,
        },
    }
}
