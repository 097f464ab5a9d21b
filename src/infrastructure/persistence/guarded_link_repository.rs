//! Deadline and circuit-breaker decorator for link repositories.
//!
//! Storage calls never hang the caller: each one is bounded by a timeout, and a
//! run of consecutive faults opens a circuit that rejects calls immediately with
//! [`AppError::StoreUnavailable`] until a cool-down passes.

use async_trait::async_trait;
use serde_json::json;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};
use tracing::{info, warn};

use crate::domain::entities::{Link, NewLink};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;

/// Tuning for [`GuardedLinkRepository`].
#[derive(Debug, Clone, Copy)]
pub struct GuardSettings {
    /// Deadline applied to every store call.
    pub timeout: Duration,
    /// Consecutive store faults that open the circuit.
    pub failure_threshold: u32,
    /// How long an open circuit rejects calls before letting traffic through again.
    pub reset_after: Duration,
}

impl Default for GuardSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(2),
            failure_threshold: 3,
            reset_after: Duration::from_secs(60),
        }
    }
}

#[derive(Debug, Default)]
struct BreakerState {
    consecutive_failures: u32,
    opened_at: Option<Instant>,
    trial_in_flight: bool,
}

impl BreakerState {
    fn cooling_down(&self, reset_after: Duration) -> bool {
        self.opened_at
            .is_some_and(|opened_at| opened_at.elapsed() < reset_after)
    }
}

/// Consecutive-failure circuit breaker.
///
/// Closed: calls pass, faults are counted. Open: calls are rejected until
/// `reset_after` elapses. After that the circuit is half-open: exactly one
/// trial call is admitted, its success closes the circuit and its fault
/// reopens it. Other calls keep failing fast while the trial runs.
#[derive(Debug)]
pub struct CircuitBreaker {
    failure_threshold: u32,
    reset_after: Duration,
    state: Mutex<BreakerState>,
}

impl CircuitBreaker {
    pub fn new(failure_threshold: u32, reset_after: Duration) -> Self {
        Self {
            failure_threshold: failure_threshold.max(1),
            reset_after,
            state: Mutex::new(BreakerState::default()),
        }
    }

    /// Returns true if a call may proceed. In the half-open state this claims
    /// the single trial slot, so the caller must report the outcome.
    pub fn allows_call(&self) -> bool {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.opened_at.is_none() {
            return true;
        }
        if state.cooling_down(self.reset_after) || state.trial_in_flight {
            return false;
        }
        state.trial_in_flight = true;
        true
    }

    /// Returns true while the circuit rejects calls. Does not claim a trial.
    pub fn is_open(&self) -> bool {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.cooling_down(self.reset_after) || state.trial_in_flight
    }

    pub fn record_success(&self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.opened_at.take().is_some() {
            info!("Store circuit closed");
        }
        state.consecutive_failures = 0;
        state.trial_in_flight = false;
    }

    pub fn record_failure(&self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.consecutive_failures = state.consecutive_failures.saturating_add(1);
        state.trial_in_flight = false;

        let reopening = state.opened_at.is_some();
        if reopening || state.consecutive_failures >= self.failure_threshold {
            state.opened_at = Some(Instant::now());
            warn!(
                failures = state.consecutive_failures,
                reset_after_secs = self.reset_after.as_secs_f64(),
                "Store circuit opened"
            );
            metrics::counter!("shortlink_store_circuit_opened_total").increment(1);
        }
    }
}

/// Wraps a [`LinkRepository`] with a per-call deadline and a circuit breaker.
///
/// Only store faults ([`AppError::is_store_fault`]) count against the circuit;
/// `NotFound` and `Conflict` are healthy answers and reset the failure streak.
pub struct GuardedLinkRepository {
    inner: Arc<dyn LinkRepository>,
    timeout: Duration,
    breaker: CircuitBreaker,
}

impl GuardedLinkRepository {
    pub fn new(inner: Arc<dyn LinkRepository>, settings: GuardSettings) -> Self {
        Self {
            inner,
            timeout: settings.timeout,
            breaker: CircuitBreaker::new(settings.failure_threshold, settings.reset_after),
        }
    }

    pub fn breaker(&self) -> &CircuitBreaker {
        &self.breaker
    }

    async fn guarded<T, F>(&self, operation: &'static str, call: F) -> Result<T, AppError>
    where
        F: Future<Output = Result<T, AppError>> + Send,
    {
        if !self.breaker.allows_call() {
            return Err(AppError::store_unavailable(
                "Store circuit is open",
                json!({ "operation": operation }),
            ));
        }

        let result = match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(AppError::store_unavailable(
                "Store call timed out",
                json!({
                    "operation": operation,
                    "timeout_ms": u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
                }),
            )),
        };

        match &result {
            Err(e) if e.is_store_fault() => {
                warn!(operation, error = %e, "Store call failed");
                self.breaker.record_failure();
            }
            _ => self.breaker.record_success(),
        }

        result
    }
}

#[async_trait]
impl LinkRepository for GuardedLinkRepository {
    async fn insert(&self, new_link: NewLink) -> Result<Link, AppError> {
        self.guarded("insert", self.inner.insert(new_link)).await
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Link>, AppError> {
        self.guarded("find_by_code", self.inner.find_by_code(code))
            .await
    }

    async fn increment_clicks(&self, code: &str) -> Result<u64, AppError> {
        self.guarded("increment_clicks", self.inner.increment_clicks(code))
            .await
    }

    async fn health_check(&self) -> bool {
        if self.breaker.is_open() {
            return false;
        }

        tokio::time::timeout(self.timeout, self.inner.health_check())
            .await
            .unwrap_or(false)
    }
}
