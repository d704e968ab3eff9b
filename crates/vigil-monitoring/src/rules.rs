//! Monitoring rules.
//!
//! Each rule inspects a single observation in isolation and either fires
//! (producing a [`RuleHit`]) or stays silent. Rules are synchronous and
//! side-effect free; the engine owns alert construction and publication.

use crate::types::{AlertType, Severity, TransactionObservation};
use std::collections::HashSet;
use vigil_core::config::MonitoringConfig;
use vigil_core::error::Result;

/// Outcome of a rule that fired.
#[derive(Debug, Clone)]
pub struct RuleHit {
    /// Alert category the hit maps to.
    pub alert_type: AlertType,
    /// Severity of the hit.
    pub severity: Severity,
    /// Score in `[0,1]`.
    pub score: f64,
    /// Human-readable reasons.
    pub reasons: Vec<String>,
}

/// A single monitoring rule.
///
/// Implementations must be deterministic for a given observation. An `Err`
/// from `evaluate` is treated by the engine as "this rule did not fire";
/// it never aborts evaluation of the remaining rules.
pub trait MonitoringRule: Send + Sync {
    /// Stable rule identifier, recorded on every alert the rule raises.
    fn id(&self) -> &str;

    /// Evaluate the observation. `Ok(None)` means the rule did not fire.
    fn evaluate(&self, observation: &TransactionObservation) -> Result<Option<RuleHit>>;
}

/// Fires when the transaction amount exceeds the configured threshold.
///
/// Severity scales with how far past the threshold the amount lands:
/// MEDIUM up to 1.5x the threshold, HIGH beyond that.
pub struct HighValueRule {
    threshold: f64,
}

impl HighValueRule {
    /// Rule identifier.
    pub const ID: &'static str = "HIGH_VALUE";

    /// Create the rule with the given amount threshold.
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }
}

impl MonitoringRule for HighValueRule {
    fn id(&self) -> &str {
        Self::ID
    }

    fn evaluate(&self, observation: &TransactionObservation) -> Result<Option<RuleHit>> {
        if observation.amount <= self.threshold {
            return Ok(None);
        }

        let ratio = observation.amount / self.threshold;
        let severity = if ratio >= 1.5 {
            Severity::High
        } else {
            Severity::Medium
        };
        let score = (0.4 + 0.1 * ratio).min(0.9);

        Ok(Some(RuleHit {
            alert_type: AlertType::TransactionMonitoring,
            severity,
            score,
            reasons: vec![format!(
                "Amount {:.2} {} exceeds high-value threshold {:.2}",
                observation.amount, observation.currency, self.threshold
            )],
        }))
    }
}

/// Fires when the counterparty country is on the high-risk list.
pub struct CountryRiskRule {
    high_risk_countries: HashSet<String>,
}

impl CountryRiskRule {
    /// Rule identifier.
    pub const ID: &'static str = "HIGH_RISK_COUNTRY";

    /// Create the rule with the given country set.
    pub fn new(high_risk_countries: HashSet<String>) -> Self {
        Self { high_risk_countries }
    }
}

impl MonitoringRule for CountryRiskRule {
    fn id(&self) -> &str {
        Self::ID
    }

    fn evaluate(&self, observation: &TransactionObservation) -> Result<Option<RuleHit>> {
        let Some(country) = observation.counterparty_country.as_deref() else {
            return Ok(None);
        };
        if !self.high_risk_countries.contains(country) {
            return Ok(None);
        }

        Ok(Some(RuleHit {
            alert_type: AlertType::CountryRisk,
            severity: Severity::Critical,
            score: 0.95,
            reasons: vec![format!("Counterparty country {country} is high-risk")],
        }))
    }
}

/// Default rule set from configuration.
pub fn default_rules(config: &MonitoringConfig) -> Vec<Box<dyn MonitoringRule>> {
    vec![
        Box::new(HighValueRule::new(config.high_value_threshold)),
        Box::new(CountryRiskRule::new(config.high_risk_countries.clone())),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn observation(amount: f64, country: Option<&str>) -> TransactionObservation {
        TransactionObservation {
            id: Uuid::new_v4(),
            external_id: "txn-001".to_string(),
            customer_id: Uuid::new_v4(),
            amount,
            currency: "USD".to_string(),
            counterparty_name: Some("Acme Trading".to_string()),
            counterparty_account: None,
            counterparty_country: country.map(str::to_string),
            channel: Some("wire".to_string()),
            occurred_at: Utc::now(),
        }
    }

    #[test]
    fn test_high_value_rule_silent_at_threshold() {
        let rule = HighValueRule::new(10_000.0);
        assert!(rule.evaluate(&observation(10_000.0, None)).unwrap().is_none());
        assert!(rule.evaluate(&observation(500.0, None)).unwrap().is_none());
    }

    #[test]
    fn test_high_value_rule_medium_just_over_threshold() {
        let rule = HighValueRule::new(10_000.0);
        let hit = rule.evaluate(&observation(12_000.0, None)).unwrap().unwrap();
        assert_eq!(hit.severity, Severity::Medium);
        assert!(hit.score > 0.4 && hit.score < 0.9);
    }

    #[test]
    fn test_high_value_rule_high_far_over_threshold() {
        let rule = HighValueRule::new(10_000.0);
        let hit = rule.evaluate(&observation(75_000.0, None)).unwrap().unwrap();
        assert_eq!(hit.severity, Severity::High);
        assert_eq!(hit.score, 0.9);
    }

    #[test]
    fn test_country_risk_rule_fires_critical() {
        let rule = CountryRiskRule::new(["IR".to_string()].into_iter().collect());
        let hit = rule.evaluate(&observation(100.0, Some("IR"))).unwrap().unwrap();
        assert_eq!(hit.severity, Severity::Critical);
        assert_eq!(hit.score, 0.95);
        assert_eq!(hit.alert_type, AlertType::CountryRisk);
    }

    #[test]
    fn test_country_risk_rule_silent_without_country() {
        let rule = CountryRiskRule::new(["IR".to_string()].into_iter().collect());
        assert!(rule.evaluate(&observation(100.0, None)).unwrap().is_none());
        assert!(rule.evaluate(&observation(100.0, Some("DE"))).unwrap().is_none());
    }
}
