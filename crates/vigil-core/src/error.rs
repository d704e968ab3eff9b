//! Error types for the Vigil decision engine.

use thiserror::Error;

/// Result type alias using `EngineError`.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors that can occur during decision engine operations.
///
/// The taxonomy follows the engine's propagation policy: configuration
/// errors are fatal at startup, validation errors are surfaced to the
/// caller, and per-rule faults are isolated by the rule engine and never
/// fail a batch. Absence of a result (no matches, no model score) is
/// never an error.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration is invalid. Fatal at startup; the engine must not serve.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Input validation failed. Surfaced to the caller, never defaulted.
    #[error("Input validation failed: {0}")]
    Validation(String),

    /// A single rule failed during evaluation. Isolated and logged by the
    /// rule engine; treated as "rule did not fire".
    #[error("Rule evaluation failed for {rule_id}: {message}")]
    RuleEvaluation {
        /// Identifier of the failing rule.
        rule_id: String,
        /// Failure detail.
        message: String,
    },

    /// An external dependency (model inference, policy authority) failed.
    #[error("Dependency error: {0}")]
    Dependency(String),

    /// Decision store failure.
    #[error("Store error: {0}")]
    Store(String),

    /// Event publication failure.
    #[error("Event publish error: {0}")]
    Publish(String),

    /// Requested record does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl EngineError {
    /// Create a configuration error.
    #[must_use]
    pub fn config(msg: impl Into<String>) -> Self {
        EngineError::Config(msg.into())
    }

    /// Create a validation error.
    #[must_use]
    pub fn validation(msg: impl Into<String>) -> Self {
        EngineError::Validation(msg.into())
    }

    /// Create a dependency error.
    #[must_use]
    pub fn dependency(msg: impl Into<String>) -> Self {
        EngineError::Dependency(msg.into())
    }

    /// Create a store error.
    #[must_use]
    pub fn store(msg: impl Into<String>) -> Self {
        EngineError::Store(msg.into())
    }

    /// Create a rule evaluation error.
    #[must_use]
    pub fn rule(rule_id: impl Into<String>, msg: impl Into<String>) -> Self {
        EngineError::RuleEvaluation {
            rule_id: rule_id.into(),
            message: msg.into(),
        }
    }

    /// Returns true if this error represents expected dependency
    /// degradation rather than a caller or operator fault.
    #[must_use]
    pub fn is_degradation(&self) -> bool {
        matches!(self, EngineError::Dependency(_))
    }

    /// Returns true if the caller can fix this error (bad input).
    #[must_use]
    pub fn is_caller_fault(&self) -> bool {
        matches!(self, EngineError::Validation(_) | EngineError::NotFound(_))
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> Self {
        EngineError::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        assert!(EngineError::dependency("timeout").is_degradation());
        assert!(!EngineError::config("bad threshold").is_degradation());
        assert!(EngineError::validation("missing amount").is_caller_fault());
        assert!(!EngineError::store("io").is_caller_fault());
    }

    #[test]
    fn test_display() {
        let err = EngineError::rule("HIGH_VALUE", "missing field");
        assert_eq!(
            err.to_string(),
            "Rule evaluation failed for HIGH_VALUE: missing field"
        );
    }
}
