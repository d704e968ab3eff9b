//! # Vigil Core
//!
//! Shared infrastructure for the Vigil risk and compliance decision engine.
//!
//! This crate provides:
//! - Error taxonomy and result alias
//! - Per-request decision context (tenant, actor, trace, deadline)
//! - Engine configuration with startup validation
//! - Resilience patterns (circuit breaker, deadline propagation)
//! - Event envelope and publication boundary
//! - Key-value storage boundary for decision records
//! - Guarded policy-authorization client

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod authz;
pub mod config;
pub mod context;
pub mod error;
pub mod events;
pub mod resilience;
pub mod store;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::authz::{AuthorizationClient, AuthzDecision, AuthzRequest, GuardedAuthorizer};
    pub use crate::config::{
        EngineConfig, FusionWeights, MonitoringConfig, RiskConfig, ScreeningConfig, TierThresholds,
    };
    pub use crate::context::DecisionContext;
    pub use crate::error::{EngineError, Result};
    pub use crate::events::{EventEnvelope, EventPublisher, InMemoryPublisher, topics};
    pub use crate::resilience::{
        CircuitBreaker, CircuitBreakerConfig, CircuitState, DeadlineContext, ResilienceConfig,
        ResilienceError,
    };
    pub use crate::store::{InMemoryStore, KeyValueStore};
}
