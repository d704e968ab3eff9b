//! Resilience patterns for external dependencies.
//!
//! The decision engine's only blocking operations are calls to external
//! scoring dependencies (model inference, policy authority). Those calls
//! are wrapped with:
//!
//! - **Circuit Breaker**: stop calling a failing dependency for a cool-down
//!   period, then permit a trial call to test recovery
//! - **Deadline**: a caller-supplied deadline bounds the entire pipeline;
//!   the shorter of caller deadline and per-call timeout governs
//!
//! # Example
//!
//! ```rust,ignore
//! use vigil_core::resilience::{CircuitBreaker, CircuitBreakerConfig};
//!
//! let cb = CircuitBreaker::new("model-inference", CircuitBreakerConfig::default());
//!
//! cb.execute(|| async { client.predict(&request).await }).await?;
//! ```

pub mod circuit_breaker;
pub mod timeout;

pub use circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitBreakerStats, CircuitState};
pub use timeout::DeadlineContext;

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Unified resilience configuration for one external dependency.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResilienceConfig {
    /// Circuit breaker configuration.
    pub circuit_breaker: CircuitBreakerConfig,
    /// Hard deadline for a single dependency call.
    pub call_timeout: Duration,
}

impl Default for ResilienceConfig {
    fn default() -> Self {
        Self {
            circuit_breaker: CircuitBreakerConfig::default(),
            call_timeout: Duration::from_millis(500),
        }
    }
}

impl ResilienceConfig {
    /// Set the circuit breaker configuration.
    pub fn with_circuit_breaker(mut self, config: CircuitBreakerConfig) -> Self {
        self.circuit_breaker = config;
        self
    }

    /// Set the per-call timeout.
    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }
}

/// Result type for resilience operations.
pub type ResilienceResult<T> = std::result::Result<T, ResilienceError>;

/// Errors from resilience patterns.
///
/// These never escape the decision engine as caller-visible failures;
/// they select the deterministic fallback path instead.
#[derive(Debug, thiserror::Error)]
pub enum ResilienceError {
    /// Circuit breaker is open; the call was short-circuited.
    #[error("Circuit breaker is open for {dependency}")]
    CircuitOpen {
        /// Name of the protected dependency.
        dependency: String,
    },

    /// The call exceeded its timeout.
    #[error("Call timed out after {timeout:?}")]
    Timeout {
        /// The timeout that was exceeded.
        timeout: Duration,
    },

    /// The caller-supplied deadline passed before the call could start.
    #[error("Deadline exceeded")]
    DeadlineExceeded,

    /// The dependency itself returned an error.
    #[error("Dependency call failed: {0}")]
    Call(#[from] crate::error::EngineError),
}
