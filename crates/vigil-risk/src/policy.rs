//! Tier mapping and the tier-to-action policy table.

use crate::types::{PolicyAction, PolicyStep, RiskTier};
use std::collections::HashMap;
use vigil_core::config::TierThresholds;
use vigil_core::error::{EngineError, Result};

/// Map a score onto a tier. The partition of `[0,1]` is total; boundary
/// scores belong to the higher tier.
pub fn tier_for_score(score: f64, thresholds: &TierThresholds) -> RiskTier {
    if score >= thresholds.critical {
        RiskTier::Critical
    } else if score >= thresholds.high {
        RiskTier::High
    } else if score >= thresholds.medium {
        RiskTier::Medium
    } else {
        RiskTier::Low
    }
}

/// Maps each tier to its prescribed actions.
///
/// There is no default fallthrough: a tier missing from the table is a
/// configuration error caught by [`PolicyTable::validate`] before the
/// engine serves.
#[derive(Debug, Clone)]
pub struct PolicyTable {
    steps: HashMap<RiskTier, Vec<PolicyStep>>,
}

impl PolicyTable {
    /// The standard policy table.
    pub fn standard() -> Self {
        let mut steps = HashMap::new();
        steps.insert(
            RiskTier::Critical,
            vec![
                PolicyStep {
                    action: PolicyAction::Block,
                    priority: 1,
                },
                PolicyStep {
                    action: PolicyAction::ManualReview,
                    priority: 2,
                },
            ],
        );
        steps.insert(
            RiskTier::High,
            vec![
                PolicyStep {
                    action: PolicyAction::StepUpAuth,
                    priority: 1,
                },
                PolicyStep {
                    action: PolicyAction::ManualReview,
                    priority: 2,
                },
            ],
        );
        steps.insert(
            RiskTier::Medium,
            vec![PolicyStep {
                action: PolicyAction::Flag,
                priority: 1,
            }],
        );
        steps.insert(
            RiskTier::Low,
            vec![PolicyStep {
                action: PolicyAction::Allow,
                priority: 1,
            }],
        );
        Self { steps }
    }

    /// Build from an explicit mapping.
    pub fn new(steps: HashMap<RiskTier, Vec<PolicyStep>>) -> Self {
        Self { steps }
    }

    /// Check that every tier maps to at least one action.
    pub fn validate(&self) -> Result<()> {
        for tier in [
            RiskTier::Low,
            RiskTier::Medium,
            RiskTier::High,
            RiskTier::Critical,
        ] {
            match self.steps.get(&tier) {
                Some(actions) if !actions.is_empty() => {}
                _ => {
                    return Err(EngineError::config(format!(
                        "policy table has no actions for tier {tier}"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Actions for a tier, ordered by priority.
    pub fn actions_for(&self, tier: RiskTier) -> Result<Vec<PolicyStep>> {
        let mut actions = self
            .steps
            .get(&tier)
            .cloned()
            .ok_or_else(|| EngineError::config(format!("policy table has no actions for tier {tier}")))?;
        actions.sort_by_key(|s| s.priority);
        Ok(actions)
    }
}

impl Default for PolicyTable {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_boundaries_belong_to_higher_tier() {
        let thresholds = TierThresholds::default();
        assert_eq!(tier_for_score(0.8, &thresholds), RiskTier::Critical);
        assert_eq!(tier_for_score(0.79, &thresholds), RiskTier::High);
        assert_eq!(tier_for_score(0.6, &thresholds), RiskTier::High);
        assert_eq!(tier_for_score(0.4, &thresholds), RiskTier::Medium);
        assert_eq!(tier_for_score(0.39, &thresholds), RiskTier::Low);
        assert_eq!(tier_for_score(0.0, &thresholds), RiskTier::Low);
        assert_eq!(tier_for_score(1.0, &thresholds), RiskTier::Critical);
    }

    #[test]
    fn test_standard_table_validates() {
        PolicyTable::standard().validate().unwrap();
    }

    #[test]
    fn test_critical_actions_block_first() {
        let table = PolicyTable::standard();
        let actions = table.actions_for(RiskTier::Critical).unwrap();
        assert_eq!(actions[0].action, PolicyAction::Block);
        assert_eq!(actions[1].action, PolicyAction::ManualReview);
    }

    #[test]
    fn test_missing_tier_is_config_error() {
        let table = PolicyTable::new(HashMap::new());
        assert!(table.validate().is_err());
        assert!(matches!(
            table.actions_for(RiskTier::Low),
            Err(EngineError::Config(_))
        ));
    }
}
