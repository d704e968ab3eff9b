//! Circuit Breaker Pattern
//!
//! Isolates a failing external dependency so that decision requests do not
//! pile up behind a dead network call.
//!
//! # States
//!
//! - **Closed**: Normal operation, calls pass through
//! - **Open**: Consecutive failures exceeded threshold, calls fail fast
//! - **HalfOpen**: Cool-down elapsed, a trial call is permitted
//!
//! # Example
//!
//! ```rust,ignore
//! use vigil_core::resilience::circuit_breaker::{CircuitBreaker, CircuitBreakerConfig};
//!
//! let config = CircuitBreakerConfig::default()
//!     .failure_threshold(5)
//!     .reset_timeout(Duration::from_secs(30));
//!
//! let cb = CircuitBreaker::new("model-inference", config);
//!
//! match cb.execute(|| async { client.predict(&request).await }).await {
//!     Ok(prediction) => { /* blend with rules */ }
//!     Err(ResilienceError::CircuitOpen { .. }) => { /* rules-only fallback */ }
//!     Err(e) => { /* record failure, rules-only fallback */ }
//! }
//! ```

use super::{ResilienceError, ResilienceResult};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// Circuit breaker state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CircuitState {
    /// Circuit is closed, calls pass through.
    #[default]
    Closed,
    /// Circuit is open, calls fail fast.
    Open,
    /// Circuit is half-open, testing recovery.
    HalfOpen,
}

impl std::fmt::Display for CircuitState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Closed => write!(f, "closed"),
            Self::Open => write!(f, "open"),
            Self::HalfOpen => write!(f, "half-open"),
        }
    }
}

/// Circuit breaker configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CircuitBreakerConfig {
    /// Number of consecutive failures before opening the circuit.
    pub failure_threshold: u32,
    /// Number of successes to close the circuit from half-open.
    pub success_threshold: u32,
    /// Cool-down before transitioning from open to half-open.
    pub reset_timeout: Duration,
    /// Maximum concurrent trial calls in half-open state.
    pub half_open_max_calls: u32,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            success_threshold: 1,
            reset_timeout: Duration::from_secs(30),
            half_open_max_calls: 1,
        }
    }
}

impl CircuitBreakerConfig {
    /// Set the consecutive-failure threshold.
    pub fn failure_threshold(mut self, threshold: u32) -> Self {
        self.failure_threshold = threshold;
        self
    }

    /// Set the success threshold for closing.
    pub fn success_threshold(mut self, threshold: u32) -> Self {
        self.success_threshold = threshold;
        self
    }

    /// Set the cool-down timeout.
    pub fn reset_timeout(mut self, timeout: Duration) -> Self {
        self.reset_timeout = timeout;
        self
    }

    /// Set the max concurrent calls in half-open state.
    pub fn half_open_max_calls(mut self, max: u32) -> Self {
        self.half_open_max_calls = max;
        self
    }
}

/// Circuit breaker protecting one named external dependency.
///
/// The only stateful, concurrently-mutated component in the decision core;
/// all state transitions are atomic and safe under concurrent scoring
/// requests. Clones share state.
pub struct CircuitBreaker {
    /// Dependency this circuit breaker protects.
    dependency: String,
    /// Configuration.
    config: CircuitBreakerConfig,
    /// Inner shared state.
    inner: Arc<CircuitBreakerInner>,
}

struct CircuitBreakerInner {
    state: RwLock<CircuitState>,
    failure_count: AtomicU32,
    success_count: AtomicU32,
    last_failure_time: RwLock<Option<Instant>>,
    half_open_calls: AtomicU32,
    total_calls: AtomicU64,
    total_failures: AtomicU64,
}

impl CircuitBreaker {
    /// Create a new circuit breaker.
    pub fn new(dependency: impl Into<String>, config: CircuitBreakerConfig) -> Self {
        Self {
            dependency: dependency.into(),
            config,
            inner: Arc::new(CircuitBreakerInner {
                state: RwLock::new(CircuitState::Closed),
                failure_count: AtomicU32::new(0),
                success_count: AtomicU32::new(0),
                last_failure_time: RwLock::new(None),
                half_open_calls: AtomicU32::new(0),
                total_calls: AtomicU64::new(0),
                total_failures: AtomicU64::new(0),
            }),
        }
    }

    /// Get the current state, transitioning to half-open when the
    /// cool-down has elapsed.
    pub async fn state(&self) -> CircuitState {
        let state = *self.inner.state.read().await;

        if state == CircuitState::Open {
            if let Some(last_failure) = *self.inner.last_failure_time.read().await {
                if last_failure.elapsed() >= self.config.reset_timeout {
                    return self.try_transition_to_half_open().await;
                }
            }
        }

        state
    }

    /// Get the protected dependency name.
    pub fn dependency(&self) -> &str {
        &self.dependency
    }

    /// Check if a call would be allowed right now.
    pub async fn is_allowed(&self) -> bool {
        match self.state().await {
            CircuitState::Closed => true,
            CircuitState::Open => false,
            CircuitState::HalfOpen => {
                self.inner.half_open_calls.load(Ordering::Relaxed) < self.config.half_open_max_calls
            }
        }
    }

    /// Execute a call with circuit breaker protection.
    ///
    /// When the circuit is open the future is never constructed; the call
    /// short-circuits to `ResilienceError::CircuitOpen` immediately.
    pub async fn execute<F, Fut, T, E>(&self, f: F) -> ResilienceResult<T>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<T, E>>,
        E: Into<crate::error::EngineError>,
    {
        self.inner.total_calls.fetch_add(1, Ordering::Relaxed);

        let state = self.state().await;
        match state {
            CircuitState::Open => {
                return Err(ResilienceError::CircuitOpen {
                    dependency: self.dependency.clone(),
                });
            }
            CircuitState::HalfOpen => {
                // Limit concurrent trial calls in half-open state
                let current = self.inner.half_open_calls.fetch_add(1, Ordering::Relaxed);
                if current >= self.config.half_open_max_calls {
                    self.inner.half_open_calls.fetch_sub(1, Ordering::Relaxed);
                    return Err(ResilienceError::CircuitOpen {
                        dependency: self.dependency.clone(),
                    });
                }
            }
            CircuitState::Closed => {}
        }

        let result = f().await;

        match &result {
            Ok(_) => self.record_success().await,
            Err(_) => self.record_failure().await,
        }

        if state == CircuitState::HalfOpen {
            self.inner.half_open_calls.fetch_sub(1, Ordering::Relaxed);
        }

        result.map_err(|e| ResilienceError::Call(e.into()))
    }

    /// Record a successful call.
    pub async fn record_success(&self) {
        let state = *self.inner.state.read().await;

        match state {
            CircuitState::Closed => {
                // Consecutive-failure counting: any success resets
                self.inner.failure_count.store(0, Ordering::Relaxed);
            }
            CircuitState::HalfOpen => {
                let successes = self.inner.success_count.fetch_add(1, Ordering::Relaxed) + 1;
                if successes >= self.config.success_threshold {
                    self.transition_to_closed().await;
                }
            }
            CircuitState::Open => {}
        }
    }

    /// Record a failed call.
    pub async fn record_failure(&self) {
        self.inner.total_failures.fetch_add(1, Ordering::Relaxed);
        *self.inner.last_failure_time.write().await = Some(Instant::now());

        let state = *self.inner.state.read().await;

        match state {
            CircuitState::Closed => {
                let failures = self.inner.failure_count.fetch_add(1, Ordering::Relaxed) + 1;
                if failures >= self.config.failure_threshold {
                    self.transition_to_open().await;
                }
            }
            CircuitState::HalfOpen => {
                // A failed trial call reopens the circuit
                self.transition_to_open().await;
            }
            CircuitState::Open => {}
        }
    }

    /// Manually reset the circuit breaker to closed.
    pub async fn reset(&self) {
        *self.inner.state.write().await = CircuitState::Closed;
        self.inner.failure_count.store(0, Ordering::Relaxed);
        self.inner.success_count.store(0, Ordering::Relaxed);
        self.inner.half_open_calls.store(0, Ordering::Relaxed);
        *self.inner.last_failure_time.write().await = None;
    }

    /// Get call statistics.
    pub fn stats(&self) -> CircuitBreakerStats {
        CircuitBreakerStats {
            total_calls: self.inner.total_calls.load(Ordering::Relaxed),
            total_failures: self.inner.total_failures.load(Ordering::Relaxed),
            consecutive_failures: self.inner.failure_count.load(Ordering::Relaxed),
        }
    }

    async fn transition_to_open(&self) {
        *self.inner.state.write().await = CircuitState::Open;
        self.inner.success_count.store(0, Ordering::Relaxed);
        tracing::warn!(
            dependency = %self.dependency,
            "Circuit breaker opened"
        );
    }

    async fn transition_to_closed(&self) {
        *self.inner.state.write().await = CircuitState::Closed;
        self.inner.failure_count.store(0, Ordering::Relaxed);
        self.inner.success_count.store(0, Ordering::Relaxed);
        tracing::info!(
            dependency = %self.dependency,
            "Circuit breaker closed"
        );
    }

    async fn try_transition_to_half_open(&self) -> CircuitState {
        let mut state = self.inner.state.write().await;
        if *state == CircuitState::Open {
            *state = CircuitState::HalfOpen;
            self.inner.success_count.store(0, Ordering::Relaxed);
            self.inner.half_open_calls.store(0, Ordering::Relaxed);
            tracing::info!(
                dependency = %self.dependency,
                "Circuit breaker half-open"
            );
        }
        *state
    }
}

impl Clone for CircuitBreaker {
    fn clone(&self) -> Self {
        Self {
            dependency: self.dependency.clone(),
            config: self.config.clone(),
            inner: self.inner.clone(),
        }
    }
}

/// Circuit breaker statistics.
#[derive(Debug, Clone)]
pub struct CircuitBreakerStats {
    /// Total calls through this breaker.
    pub total_calls: u64,
    /// Total failures recorded.
    pub total_failures: u64,
    /// Current consecutive-failure count.
    pub consecutive_failures: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;

    #[tokio::test]
    async fn test_circuit_breaker_starts_closed() {
        let cb = CircuitBreaker::new("model", CircuitBreakerConfig::default());
        assert_eq!(cb.state().await, CircuitState::Closed);
        assert!(cb.is_allowed().await);
    }

    #[tokio::test]
    async fn test_circuit_opens_after_consecutive_failures() {
        let config = CircuitBreakerConfig::default().failure_threshold(3);
        let cb = CircuitBreaker::new("model", config);

        for _ in 0..3 {
            cb.record_failure().await;
        }

        assert_eq!(cb.state().await, CircuitState::Open);
        assert!(!cb.is_allowed().await);
    }

    #[tokio::test]
    async fn test_success_resets_consecutive_failures() {
        let config = CircuitBreakerConfig::default().failure_threshold(3);
        let cb = CircuitBreaker::new("model", config);

        cb.record_failure().await;
        cb.record_failure().await;
        cb.record_success().await;

        assert_eq!(cb.stats().consecutive_failures, 0);
        assert_eq!(cb.state().await, CircuitState::Closed);
    }

    #[tokio::test]
    async fn test_open_circuit_short_circuits_without_calling() {
        let config = CircuitBreakerConfig::default().failure_threshold(1);
        let cb = CircuitBreaker::new("model", config);
        cb.record_failure().await;

        let called = std::sync::atomic::AtomicBool::new(false);
        let result: ResilienceResult<()> = cb
            .execute(|| {
                called.store(true, Ordering::Relaxed);
                async { Err(EngineError::dependency("unreachable")) }
            })
            .await;

        assert!(matches!(result, Err(ResilienceError::CircuitOpen { .. })));
        assert!(!called.load(Ordering::Relaxed));
    }

    #[tokio::test]
    async fn test_half_open_after_cooldown_then_closes_on_trial_success() {
        let config = CircuitBreakerConfig::default()
            .failure_threshold(1)
            .reset_timeout(Duration::from_millis(10));
        let cb = CircuitBreaker::new("model", config);

        cb.record_failure().await;
        assert_eq!(cb.state().await, CircuitState::Open);

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(cb.state().await, CircuitState::HalfOpen);

        let result: ResilienceResult<u32> = cb.execute(|| async { Ok::<_, EngineError>(7) }).await;
        assert_eq!(result.unwrap(), 7);
        assert_eq!(cb.state().await, CircuitState::Closed);
    }

    #[tokio::test]
    async fn test_failed_trial_call_reopens() {
        let config = CircuitBreakerConfig::default()
            .failure_threshold(1)
            .reset_timeout(Duration::from_millis(10));
        let cb = CircuitBreaker::new("model", config);

        cb.record_failure().await;
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(cb.state().await, CircuitState::HalfOpen);

        let result: ResilienceResult<()> = cb
            .execute(|| async { Err(EngineError::dependency("still down")) })
            .await;
        assert!(result.is_err());
        assert_eq!(cb.state().await, CircuitState::Open);
    }

    #[tokio::test]
    async fn test_manual_reset() {
        let config = CircuitBreakerConfig::default().failure_threshold(1);
        let cb = CircuitBreaker::new("model", config);

        cb.record_failure().await;
        assert_eq!(cb.state().await, CircuitState::Open);

        cb.reset().await;
        assert_eq!(cb.state().await, CircuitState::Closed);
    }

    #[test]
    fn test_config_builder() {
        let config = CircuitBreakerConfig::default()
            .failure_threshold(10)
            .reset_timeout(Duration::from_secs(60));

        assert_eq!(config.failure_threshold, 10);
        assert_eq!(config.reset_timeout, Duration::from_secs(60));
    }
}
