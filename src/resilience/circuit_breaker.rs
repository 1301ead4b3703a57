//! Circuit breaker for backend protection.
//!
//! # States
//! - Closed: normal operation, calls pass through
//! - Open: backend assumed down, calls fail fast
//! - Half-Open: testing if backend recovered
//!
//! # State Transitions
//! ```text
//! Closed → Open: failure outcomes in window >= threshold
//! Open → Half-Open: evaluated lazily once the recovery timeout elapses
//! Half-Open → Closed: probe succeeds (window cleared)
//! Half-Open → Open: probe fails (open_since reset)
//! ```
//!
//! # Design Decisions
//! - Per-service circuit breaker (not global, not per-operation)
//! - Bounded recent-outcomes window, so old failures age out
//! - Single probe in Half-Open (prevents hammering a recovering backend)
//! - Callers observe exactly two outcomes from a guarded call: a value, or
//!   `ServiceUnavailable`. The original downstream error is logged here and
//!   goes no further.

use std::collections::VecDeque;
use std::fmt;
use std::future::Future;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::error::{GatewayError, GatewayResult};
use crate::observability::metrics;

/// Breaker tuning parameters.
#[derive(Debug, Clone, Copy)]
pub struct BreakerConfig {
    /// Failure outcomes within the window that open the circuit.
    pub failure_threshold: usize,

    /// Capacity of the recent-outcomes window.
    pub window_size: usize,

    /// Time spent Open before the next call is admitted as a probe.
    pub recovery_timeout: Duration,
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 3,
            window_size: 10,
            recovery_timeout: Duration::from_secs(20),
        }
    }
}

/// Breaker state, one instance per backend service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

impl fmt::Display for CircuitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CircuitState::Closed => write!(f, "closed"),
            CircuitState::Open => write!(f, "open"),
            CircuitState::HalfOpen => write!(f, "half-open"),
        }
    }
}

#[derive(Debug)]
struct BreakerInner {
    state: CircuitState,
    /// Most recent call outcomes, oldest first. Length <= window_size.
    window: VecDeque<bool>,
    /// Set on every transition into Open. Meaningful only while Open.
    open_since: Option<Instant>,
}

/// Failure tracker and state machine guarding calls to one backend.
///
/// Shared across all concurrently executing requests for that backend;
/// the mutex is never held across an await, so state transitions are
/// observed in outcome-arrival order.
pub struct CircuitBreaker {
    service: &'static str,
    config: BreakerConfig,
    inner: Mutex<BreakerInner>,
}

impl CircuitBreaker {
    /// Create a breaker for the named service, initially Closed.
    pub fn new(service: &'static str, config: BreakerConfig) -> Self {
        Self {
            service,
            config,
            inner: Mutex::new(BreakerInner {
                state: CircuitState::Closed,
                window: VecDeque::with_capacity(config.window_size),
                open_since: None,
            }),
        }
    }

    /// The service name this breaker guards.
    pub fn service(&self) -> &'static str {
        self.service
    }

    /// Current state. Open → Half-Open is evaluated lazily on calls, so a
    /// timed-out Open breaker still reports Open until the next attempt.
    pub fn state(&self) -> CircuitState {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).state
    }

    /// Execute `op` under this breaker's guarded-call contract.
    ///
    /// Rejected immediately with `ServiceUnavailable` while Open (timeout
    /// not elapsed) or while a Half-Open probe is already in flight. Any
    /// error from `op` is recorded as a failure outcome and replaced by
    /// `ServiceUnavailable`; the cause is logged here for operability.
    pub async fn call<F, Fut, T, E>(&self, op: F) -> GatewayResult<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: fmt::Display,
    {
        if !self.admit() {
            metrics::record_breaker_rejection(self.service);
            return Err(GatewayError::unavailable(self.service));
        }

        match op().await {
            Ok(value) => {
                self.record_success();
                Ok(value)
            }
            Err(cause) => {
                tracing::warn!(
                    service = self.service,
                    cause = %cause,
                    "Downstream call failed"
                );
                self.record_failure();
                Err(GatewayError::unavailable(self.service))
            }
        }
    }

    /// Decide whether a call may proceed, transitioning Open → Half-Open
    /// when the recovery timeout has elapsed.
    fn admit(&self) -> bool {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        match inner.state {
            CircuitState::Closed => true,
            // A probe is already in flight; reject until its outcome lands.
            CircuitState::HalfOpen => false,
            CircuitState::Open => {
                let expired = inner
                    .open_since
                    .is_some_and(|since| since.elapsed() >= self.config.recovery_timeout);
                if expired {
                    self.transition(&mut inner, CircuitState::HalfOpen);
                    true
                } else {
                    false
                }
            }
        }
    }

    fn record_success(&self) {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        match inner.state {
            CircuitState::HalfOpen => {
                // Probe succeeded: discard stale failure history entirely.
                inner.window.clear();
                inner.open_since = None;
                self.transition(&mut inner, CircuitState::Closed);
            }
            _ => self.push_outcome(&mut inner, true),
        }
    }

    fn record_failure(&self) {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        match inner.state {
            CircuitState::HalfOpen => {
                inner.open_since = Some(Instant::now());
                self.transition(&mut inner, CircuitState::Open);
            }
            _ => {
                self.push_outcome(&mut inner, false);
                let failures = inner.window.iter().filter(|ok| !**ok).count();
                if inner.state == CircuitState::Closed && failures >= self.config.failure_threshold
                {
                    inner.open_since = Some(Instant::now());
                    self.transition(&mut inner, CircuitState::Open);
                }
            }
        }
    }

    /// Append an outcome, evicting the oldest entry once at capacity.
    fn push_outcome(&self, inner: &mut BreakerInner, ok: bool) {
        if inner.window.len() == self.config.window_size {
            inner.window.pop_front();
        }
        inner.window.push_back(ok);
    }

    fn transition(&self, inner: &mut BreakerInner, next: CircuitState) {
        tracing::info!(
            service = self.service,
            from = %inner.state,
            to = %next,
            "Circuit breaker transition"
        );
        inner.state = next;
        metrics::record_breaker_state(self.service, next);
    }

    #[cfg(test)]
    fn window_snapshot(&self) -> Vec<bool> {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .window
            .iter()
            .copied()
            .collect()
    }
}

impl fmt::Debug for CircuitBreaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CircuitBreaker")
            .field("service", &self.service)
            .field("state", &self.state())
            .finish()
    }
}
