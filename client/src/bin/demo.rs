//! Minimal driver for the helpdesk client store.
//!
//! Logs in (or reuses a rehydrated session), lists tickets, and prints the
//! status summary. Configuration comes from the environment:
//!
//! - `HELPDESK_API_URL` - base URL of the REST API (required)
//! - `HELPDESK_EMAIL` / `HELPDESK_PASSWORD` - credentials (required unless
//!   a previous session was persisted)
//! - `HELPDESK_CREDENTIALS` - credential file path (default
//!   `helpdesk-credentials.json`)

use anyhow::Context;
use helpdesk_client::types::TicketFilter;
use helpdesk_client::{AppEnvironment, AppStore, selectors};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let base_url =
        std::env::var("HELPDESK_API_URL").context("HELPDESK_API_URL must be set")?;
    let credentials_path = std::env::var("HELPDESK_CREDENTIALS")
        .unwrap_or_else(|_| "helpdesk-credentials.json".to_string());

    let environment = AppEnvironment::production(base_url, credentials_path.into());
    let store = AppStore::new(environment);

    if store.state(|s| s.session.is_authenticated()).await {
        tracing::info!("reusing persisted session");
    } else {
        let email =
            std::env::var("HELPDESK_EMAIL").context("HELPDESK_EMAIL must be set")?;
        let password =
            std::env::var("HELPDESK_PASSWORD").context("HELPDESK_PASSWORD must be set")?;

        let session = store.login(email, password).await;
        if let Some(error) = session.error {
            anyhow::bail!("login failed: {error}");
        }
    }

    let tickets = store.fetch_tickets(TicketFilter::default()).await;
    if let Some(error) = store.state(|s| s.tickets.error.clone()).await {
        anyhow::bail!("fetching tickets failed: {error}");
    }

    let user = store.state(|s| s.session.user.clone()).await;
    let visible = selectors::visible_tickets(&tickets, user.as_ref());
    let counts = selectors::status_counts(&tickets);

    println!(
        "{} tickets ({} open, {} waiting, {} resolved, {} closed)",
        counts.total, counts.open, counts.waiting_human, counts.resolved, counts.closed
    );
    for ticket in visible {
        println!("  [{}] {} - {}", ticket.status, ticket.id, ticket.title);
    }

    Ok(())
}
