//! Ticket refund with deferred ledger compensation.
//!
//! The ticket deletion is synchronous and must complete before the caller
//! gets its response. The associated bonus-ledger rollback runs afterwards
//! in a spawned task: poll for the ledger entry at a fixed interval, roll it
//! back once found, give up at the deadline. The caller is never signalled
//! about the rollback's fate — that is the accepted trade-off of decoupling
//! the financial correction from the deletion's latency.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use uuid::Uuid;

use crate::clients::{PrivilegeClient, TicketClient};
use crate::domain::TicketStatus;
use crate::error::{GatewayError, GatewayResult};
use crate::lifecycle::Shutdown;

/// Retry policy for the deferred rollback loop.
#[derive(Debug, Clone, Copy)]
pub struct RefundPolicy {
    /// Pause between rollback attempts.
    pub retry_interval: Duration,

    /// Total budget for the loop; expired attempts are abandoned silently.
    pub retry_deadline: Duration,
}

impl Default for RefundPolicy {
    fn default() -> Self {
        Self {
            retry_interval: Duration::from_secs(1),
            retry_deadline: Duration::from_secs(10),
        }
    }
}

/// Deletes the ticket immediately, then compensates the bonus ledger in the
/// background.
pub struct RefundCompensator {
    tickets: Arc<TicketClient>,
    privileges: Arc<PrivilegeClient>,
    policy: RefundPolicy,
    shutdown: Arc<Shutdown>,
}

impl RefundCompensator {
    pub fn new(
        tickets: Arc<TicketClient>,
        privileges: Arc<PrivilegeClient>,
        policy: RefundPolicy,
        shutdown: Arc<Shutdown>,
    ) -> Self {
        Self {
            tickets,
            privileges,
            policy,
            shutdown,
        }
    }

    /// Immediate phase: validate ownership and status, delete the ticket,
    /// then spawn the compensation loop and return.
    pub async fn refund(&self, username: &str, ticket_uid: Uuid) -> GatewayResult<()> {
        let ticket = self
            .tickets
            .get(ticket_uid)
            .await?
            .ok_or(GatewayError::NotFound("ticket"))?;

        if ticket.username != username {
            return Err(GatewayError::Ownership);
        }
        if ticket.status != TicketStatus::Paid {
            return Err(GatewayError::InvalidState(
                "ticket cannot be cancelled".to_string(),
            ));
        }

        self.tickets.delete(ticket_uid).await?;

        let privileges = self.privileges.clone();
        let policy = self.policy;
        let mut shutdown = self.shutdown.subscribe();
        let username = username.to_string();
        tokio::spawn(async move {
            tokio::select! {
                () = rollback_with_retry(&privileges, &username, ticket_uid, policy) => {}
                _ = shutdown.recv() => {
                    tracing::debug!(%ticket_uid, "Ledger rollback cancelled by shutdown");
                }
            }
        });

        Ok(())
    }
}

/// Bounded best-effort rollback: find the ledger entry for the ticket, then
/// reverse it. Unavailable backends are silently retried until the deadline.
async fn rollback_with_retry(
    privileges: &PrivilegeClient,
    username: &str,
    ticket_uid: Uuid,
    policy: RefundPolicy,
) {
    let deadline = Instant::now() + policy.retry_deadline;
    while Instant::now() < deadline {
        match try_rollback(privileges, username, ticket_uid).await {
            Ok(true) => {
                tracing::info!(%ticket_uid, username, "Ledger transaction rolled back");
                return;
            }
            // Entry not visible yet, or backend unavailable: poll again.
            Ok(false) | Err(_) => {}
        }
        tokio::time::sleep(policy.retry_interval).await;
    }
    tracing::warn!(
        %ticket_uid,
        username,
        "Giving up on ledger rollback after retry deadline"
    );
}

async fn try_rollback(
    privileges: &PrivilegeClient,
    username: &str,
    ticket_uid: Uuid,
) -> GatewayResult<bool> {
    if privileges
        .transaction_for_ticket(username, ticket_uid)
        .await?
        .is_some()
    {
        privileges.rollback_transaction(username, ticket_uid).await?;
        return Ok(true);
    }
    Ok(false)
}
