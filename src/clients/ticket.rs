//! Ticket records service client.

use std::sync::Arc;

use uuid::Uuid;

use crate::clients::{expect_success, get_json, get_json_opt, normalize_base, CallError};
use crate::domain::{Ticket, TicketCreateRequest};
use crate::error::GatewayResult;
use crate::resilience::CircuitBreaker;

/// Client for the ticket records backend.
pub struct TicketClient {
    base: String,
    http: reqwest::Client,
    breaker: Arc<CircuitBreaker>,
}

impl TicketClient {
    /// Service name carried by the breaker and unavailable responses.
    pub const NAME: &'static str = "Ticket Service";

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

    /// All tickets belonging to a user.
    pub async fn for_user(&self, username: &str) -> GatewayResult<Vec<Ticket>> {
        let url = format!("{}/tickets/user/{}", self.base, username);
        self.breaker.call(|| get_json(&self.http, url)).await
    }

    /// Ticket by uid; 404 maps to None.
    pub async fn get(&self, ticket_uid: Uuid) -> GatewayResult<Option<Ticket>> {
        let url = format!("{}/tickets/{}", self.base, ticket_uid);
        self.breaker.call(|| get_json_opt(&self.http, url)).await
    }

    /// Create a ticket record (status PAID at the backend).
    pub async fn create(&self, request: &TicketCreateRequest) -> GatewayResult<()> {
        let url = format!("{}/tickets", self.base);
        self.breaker
            .call(|| async move {
                let resp = self.http.post(&url).json(request).send().await?;
                expect_success(resp)?;
                Ok::<_, CallError>(())
            })
            .await
    }

    /// Delete a ticket record.
    pub async fn delete(&self, ticket_uid: Uuid) -> GatewayResult<()> {
        let url = format!("{}/tickets/{}", self.base, ticket_uid);
        self.breaker
            .call(|| async move {
                let resp = self.http.delete(&url).send().await?;
                expect_success(resp)?;
                Ok::<_, CallError>(())
            })
            .await
    }
}
