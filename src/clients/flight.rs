//! Flight inventory service client.

use std::sync::Arc;

use crate::clients::{expect_success, get_json_opt, normalize_base, CallError};
use crate::domain::{Flight, FlightPage};
use crate::error::GatewayResult;
use crate::resilience::CircuitBreaker;

/// Client for the flight inventory backend. Flights are read-only here.
pub struct FlightClient {
    base: String,
    http: reqwest::Client,
    breaker: Arc<CircuitBreaker>,
}

impl FlightClient {
    /// Service name carried by the breaker and unavailable responses.
    pub const NAME: &'static str = "Flights Service";

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

    /// Paginated flight listing.
    pub async fn list(&self, page: Option<u32>, size: Option<u32>) -> GatewayResult<FlightPage> {
        let url = format!("{}/flights", self.base);
        self.breaker
            .call(|| async move {
                let resp = self
                    .http
                    .get(&url)
                    .query(&[("page", page), ("size", size)])
                    .send()
                    .await?;
                Ok::<_, CallError>(expect_success(resp)?.json().await?)
            })
            .await
    }

    /// Look up one flight by number; 404 maps to None.
    pub async fn by_number(&self, number: &str) -> GatewayResult<Option<Flight>> {
        let url = format!("{}/flights/{}", self.base, number);
        self.breaker.call(|| get_json_opt(&self.http, url)).await
    }

    /// Degrading variant for read-aggregation paths: when the breaker
    /// signals unavailable (or the flight is gone), synthesize a placeholder
    /// record so ticket listings still render.
    pub async fn by_number_or_default(&self, number: &str) -> Flight {
        match self.by_number(number).await {
            Ok(Some(flight)) => flight,
            Ok(None) | Err(_) => Flight::placeholder(number),
        }
    }
}
