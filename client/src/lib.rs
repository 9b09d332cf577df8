//! # Helpdesk Client
//!
//! Client-side state store for a helpdesk product: authentication, a ticket
//! workflow with AI suggestion polling, a knowledge-base browser/editor,
//! and an admin configuration panel, all backed by a remote REST API.
//!
//! The store is organized as four resource slices (session, tickets,
//! knowledge base, config) composed under one [`store::AppStore`]. Each
//! slice exposes async operations with a uniform `{data, loading, error}`
//! lifecycle; side effects are described as values and executed by the
//! `helpdesk-runtime` store. Presentation code dispatches actions (or calls
//! the high-level operations), reads state snapshots, and derives view
//! state with the pure functions in [`selectors`].
//!
//! ## Quick start
//!
//! ```ignore
//! use helpdesk_client::{AppEnvironment, AppStore};
//! use helpdesk_client::types::{NewTicket, TicketCategory, TicketFilter};
//!
//! let environment = AppEnvironment::production(
//!     "https://helpdesk.example.com/api",
//!     "helpdesk-credentials.json".into(),
//! );
//! let store = AppStore::new(environment); // rehydrates the session
//!
//! let session = store.login("user@demo.com", "User@123").await;
//! assert!(session.is_authenticated());
//!
//! // Creates the ticket, then polls for its AI suggestion (bounded)
//! let detail = store
//!     .create_ticket(NewTicket {
//!         title: "Printer on fire".into(),
//!         description: "Smoke everywhere".into(),
//!         category: Some(TicketCategory::Tech),
//!     })
//!     .await;
//! ```

/// REST API adapter (trait seam + reqwest implementation)
pub mod api;
/// Durable credential storage
pub mod credentials;
/// Injected dependencies for the reducers
pub mod environment;
/// API error taxonomy
pub mod error;
/// Scripted mocks for tests and embedding
pub mod mocks;
/// Bounded polling for agent suggestions
pub mod resolver;
/// Derived view selectors
pub mod selectors;
/// Resource slices (session, tickets, knowledge base, config)
pub mod slices;
/// Store composition and the application facade
pub mod store;
/// Domain types
pub mod types;

pub use environment::AppEnvironment;
pub use error::{ApiError, ApiResult};
pub use store::{AppAction, AppReducer, AppState, AppStore};
