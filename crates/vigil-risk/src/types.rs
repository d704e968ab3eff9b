//! Risk fusion types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Model version recorded when a decision was computed without a model
/// score (inference unavailable, timed out, or circuit open).
pub const MODEL_VERSION_FALLBACK: &str = "rules_only";

/// Risk tier, ordered from least to most severe.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskTier {
    /// Routine activity.
    Low,
    /// Elevated, worth flagging.
    Medium,
    /// High risk, requires friction.
    High,
    /// Critical risk, requires blocking.
    Critical,
}

impl std::fmt::Display for RiskTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "LOW"),
            Self::Medium => write!(f, "MEDIUM"),
            Self::High => write!(f, "HIGH"),
            Self::Critical => write!(f, "CRITICAL"),
        }
    }
}

/// Action prescribed by the policy table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PolicyAction {
    /// Let the activity proceed.
    Allow,
    /// Proceed but mark for later review.
    Flag,
    /// Require additional authentication.
    StepUpAuth,
    /// Queue for analyst review.
    ManualReview,
    /// Stop the activity.
    Block,
}

impl std::fmt::Display for PolicyAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Allow => write!(f, "ALLOW"),
            Self::Flag => write!(f, "FLAG"),
            Self::StepUpAuth => write!(f, "STEP_UP_AUTH"),
            Self::ManualReview => write!(f, "MANUAL_REVIEW"),
            Self::Block => write!(f, "BLOCK"),
        }
    }
}

/// One prescribed action with its execution priority (lower runs first).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyStep {
    /// The action to take.
    pub action: PolicyAction,
    /// Execution priority; lower values run first.
    pub priority: u32,
}

/// One named contribution to a risk score, kept for explainability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskFactor {
    /// Factor name (e.g. "country_risk", "velocity").
    pub name: String,
    /// Contribution to the final score.
    pub contribution: f64,
    /// Human-readable explanation.
    pub description: String,
}

/// Behavioral context accompanying a scoring request. All fields are
/// optional; absent signals simply contribute nothing to the baseline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RiskContext {
    /// Counterparty or destination country (ISO alpha-2).
    pub country: Option<String>,
    /// Transaction amount under evaluation.
    pub amount: Option<f64>,
    /// Recent transaction count for the entity.
    pub transaction_count: Option<u32>,
    /// Entity account age in days.
    pub account_age_days: Option<u32>,
}

/// A request to score one entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskScoreRequest {
    /// Kind of entity being scored (e.g. "transaction", "customer").
    pub entity_type: String,
    /// Entity identifier within the tenant.
    pub entity_id: String,
    /// Feature vector forwarded to model inference.
    pub features: HashMap<String, f64>,
    /// Behavioral context for the rule baseline.
    pub context: RiskContext,
}

/// A completed, immutable risk decision.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskDecision {
    /// Decision identifier.
    pub decision_id: Uuid,
    /// Tenant that owns the entity.
    pub tenant_id: Uuid,
    /// Kind of entity scored.
    pub entity_type: String,
    /// Entity identifier.
    pub entity_id: String,
    /// Final fused score in `[0,1]`.
    pub score: f64,
    /// Tier the score maps to.
    pub tier: RiskTier,
    /// Contributions, ordered by contribution descending.
    pub factors: Vec<RiskFactor>,
    /// Prescribed actions, ordered by priority.
    pub policy_actions: Vec<PolicyStep>,
    /// Version of the model that contributed, or
    /// [`MODEL_VERSION_FALLBACK`] when scoring ran rules-only.
    pub model_version: String,
    /// When the decision was computed.
    pub computed_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_ordering() {
        assert!(RiskTier::Critical > RiskTier::High);
        assert!(RiskTier::High > RiskTier::Medium);
        assert!(RiskTier::Medium > RiskTier::Low);
    }

    #[test]
    fn test_action_serialization() {
        let json = serde_json::to_string(&PolicyAction::StepUpAuth).unwrap();
        assert_eq!(json, "\"STEP_UP_AUTH\"");
    }
}
