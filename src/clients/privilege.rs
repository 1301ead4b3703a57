//! Bonus/privilege service client.
//!
//! Balances are mutated only through ledger transactions; rollback is a
//! backend operation keyed by (username, ticket uid), not a local mutation.

use std::sync::Arc;

use uuid::Uuid;

use crate::clients::{expect_success, get_json, get_json_opt, normalize_base, CallError};
use crate::domain::{AddTransactionRequest, Privilege, PrivilegeHistoryEntry};
use crate::error::{GatewayError, GatewayResult};
use crate::resilience::CircuitBreaker;

/// Client for the bonus/privilege backend.
pub struct PrivilegeClient {
    base: String,
    http: reqwest::Client,
    breaker: Arc<CircuitBreaker>,
}

impl PrivilegeClient {
    /// Service name carried by the breaker and unavailable responses.
    pub const NAME: &'static str = "Bonus Service";

    pub fn new(base: &str, http: reqwest::Client, breaker: Arc<CircuitBreaker>) -> Self {
        Self {
            base: normalize_base(base),
            http,
            breaker,
        }
    }

    /// Unguarded health probe used by the active health monitor.
    pub async fn health(&self) -> bool {
        let url = format!("{}/manage/health", self.base);
        match self.http.get(&url).send().await {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }

    /// Bonus account by username; 404 maps to None.
    pub async fn for_user(&self, username: &str) -> GatewayResult<Option<Privilege>> {
        let url = format!("{}/privilege/{}", self.base, username);
        self.breaker.call(|| get_json_opt(&self.http, url)).await
    }

    /// Full ledger history for a user.
    pub async fn history(&self, username: &str) -> GatewayResult<Vec<PrivilegeHistoryEntry>> {
        let url = format!("{}/privilege/{}/history", self.base, username);
        self.breaker.call(|| get_json(&self.http, url)).await
    }

    /// The ledger entry tied to one ticket; 404 maps to None (the entry may
    /// not be visible yet when compensation starts polling).
    pub async fn transaction_for_ticket(
        &self,
        username: &str,
        ticket_uid: Uuid,
    ) -> GatewayResult<Option<PrivilegeHistoryEntry>> {
        let url = format!("{}/privilege/{}/history/{}", self.base, username, ticket_uid);
        self.breaker.call(|| get_json_opt(&self.http, url)).await
    }

    /// Append a ledger transaction (debit or accrual).
    pub async fn append_transaction(
        &self,
        username: &str,
        request: &AddTransactionRequest,
    ) -> GatewayResult<()> {
        let url = format!("{}/privilege/{}/history", self.base, username);
        self.breaker
            .call(|| async move {
                let resp = self.http.post(&url).json(request).send().await?;
                expect_success(resp)?;
                Ok::<_, CallError>(())
            })
            .await
    }

    /// Reverse the ledger transaction tied to a ticket.
    ///
    /// Deliberately not breaker-guarded: the compensation loop guards only
    /// its read half. Failures still collapse into the uniform unavailable
    /// signal, but record no breaker outcome.
    pub async fn rollback_transaction(
        &self,
        username: &str,
        ticket_uid: Uuid,
    ) -> GatewayResult<()> {
        let url = format!("{}/privilege/{}/history/{}", self.base, username, ticket_uid);
        let result = async {
            let resp = self.http.delete(&url).send().await?;
            expect_success(resp)?;
            Ok::<_, CallError>(())
        }
        .await;
        result.map_err(|cause| {
            tracing::warn!(service = Self::NAME, cause = %cause, "Ledger rollback failed");
            GatewayError::unavailable(Self::NAME)
        })
    }
}
