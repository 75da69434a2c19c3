//! Process-wide circuit breaker guarding third-party API calls.
//!
//! # States
//! - Closed: calls pass through, consecutive failures are counted
//! - Open: calls fail fast without touching the network
//!
//! # Transitions
//! ```text
//! Closed -> Open:   consecutive_failures >= failure_threshold
//! Open   -> Closed: reset_timeout elapsed since the circuit opened
//! ```
//!
//! There is no half-open probe state: once the timer expires the counter is
//! zeroed and the next call goes through normally.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use serde::Serialize;

/// Default number of consecutive failures that opens the circuit.
pub const DEFAULT_FAILURE_THRESHOLD: u32 = 5;

/// Default time the circuit stays open before resetting.
pub const DEFAULT_RESET_TIMEOUT: Duration = Duration::from_secs(30);

/// Tunable parameters for [`CircuitBreaker`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CircuitBreakerConfig {
    /// Consecutive failures required to open the circuit. Zero is treated as one.
    pub failure_threshold: u32,
    /// How long the circuit stays open.
    pub reset_timeout: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: DEFAULT_FAILURE_THRESHOLD,
            reset_timeout: DEFAULT_RESET_TIMEOUT,
        }
    }
}

/// Returned by [`CircuitBreaker::check`] while the circuit is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Circuit breaker is open, retry in {}ms", retry_after.as_millis())]
pub struct CircuitOpen {
    /// Time left until the circuit resets.
    pub retry_after: Duration,
}

/// Observable breaker state, serialized into the health endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum CircuitState {
    Closed { consecutive_failures: u32 },
    Open { remaining_ms: u64 },
}

#[derive(Debug, Clone, Copy)]
enum Inner {
    Closed { failures: u32 },
    Open { opened_at: Instant },
}

/// Failure-counting guard shared by every upstream call in the process.
#[derive(Debug)]
pub struct CircuitBreaker {
    config: CircuitBreakerConfig,
    inner: Mutex<Inner>,
}

impl CircuitBreaker {
    pub fn new(config: CircuitBreakerConfig) -> Self {
        Self {
            config,
            inner: Mutex::new(Inner::Closed { failures: 0 }),
        }
    }

    pub fn config(&self) -> CircuitBreakerConfig {
        self.config
    }

    /// Ask permission to perform a call.
    pub fn check(&self) -> Result<(), CircuitOpen> {
        self.check_at(Instant::now())
    }

    /// [`check`](Self::check) evaluated at an explicit instant.
    ///
    /// An open circuit whose timeout has elapsed is closed here, so the call
    /// that observes the expiry is the first one let through.
    pub fn check_at(&self, now: Instant) -> Result<(), CircuitOpen> {
        let mut inner = self.lock();
        match *inner {
            Inner::Closed { .. } => Ok(()),
            Inner::Open { opened_at } => {
                let elapsed = now.saturating_duration_since(opened_at);
                if elapsed >= self.config.reset_timeout {
                    *inner = Inner::Closed { failures: 0 };
                    Ok(())
                } else {
                    Err(CircuitOpen {
                        retry_after: self.config.reset_timeout - elapsed,
                    })
                }
            }
        }
    }

    /// Reset the consecutive-failure counter.
    pub fn record_success(&self) {
        let mut inner = self.lock();
        if let Inner::Closed { failures } = &mut *inner {
            *failures = 0;
        }
    }

    /// Count a failed call, opening the circuit once the threshold is hit.
    pub fn record_failure(&self) {
        self.record_failure_at(Instant::now());
    }

    pub fn record_failure_at(&self, now: Instant) {
        let threshold = self.config.failure_threshold.max(1);
        let mut inner = self.lock();
        if let Inner::Closed { failures } = *inner {
            let failures = failures.saturating_add(1);
            if failures >= threshold {
                *inner = Inner::Open { opened_at: now };
            } else {
                *inner = Inner::Closed { failures };
            }
        }
    }

    pub fn state(&self) -> CircuitState {
        self.state_at(Instant::now())
    }

    /// Snapshot of the breaker. Does not perform the open -> closed
    /// transition; an expired open circuit reports zero remaining time.
    pub fn state_at(&self, now: Instant) -> CircuitState {
        match *self.lock() {
            Inner::Closed { failures } => CircuitState::Closed {
                consecutive_failures: failures,
            },
            Inner::Open { opened_at } => {
                let remaining = self
                    .config
                    .reset_timeout
                    .saturating_sub(now.saturating_duration_since(opened_at));
                CircuitState::Open {
                    remaining_ms: remaining.as_millis() as u64,
                }
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // The guarded data is plain `Copy` state; a poisoned lock still holds
        // a usable value.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for CircuitBreaker {
    fn default() -> Self {
        Self::new(CircuitBreakerConfig::default())
    }
}
