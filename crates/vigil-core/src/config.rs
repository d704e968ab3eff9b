//! Engine configuration.
//!
//! All thresholds, reference tables, and fusion weights live here. The
//! configuration is loaded once, validated at startup, and treated as
//! immutable for the lifetime of the process; evaluators read it without
//! synchronization. A configuration that fails validation must prevent the
//! engine from serving.

use crate::error::{EngineError, Result};
use crate::resilience::ResilienceConfig;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Screening evaluator configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreeningConfig {
    /// Minimum similarity score to retain a match.
    pub match_threshold: f64,
    /// Maximum number of matches returned per request.
    pub max_matches: usize,
}

impl Default for ScreeningConfig {
    fn default() -> Self {
        Self {
            match_threshold: 0.85,
            max_matches: 20,
        }
    }
}

/// Transaction monitoring configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    /// Absolute amount above which the magnitude rule fires.
    pub high_value_threshold: f64,
    /// ISO country codes treated as high-risk counterparty geographies.
    pub high_risk_countries: HashSet<String>,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            high_value_threshold: 10_000.0,
            high_risk_countries: ["IR", "KP", "SY", "CU"]
                .iter()
                .map(|c| (*c).to_string())
                .collect(),
        }
    }
}

/// Relative weights for blending model and rule scores.
///
/// The fixed weighting is deliberate: blend behavior stays fully
/// predictable and auditable. Kept configurable as a tunable.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FusionWeights {
    /// Weight applied to the external model score.
    pub model: f64,
    /// Weight applied to the rule baseline score.
    pub rules: f64,
}

impl Default for FusionWeights {
    fn default() -> Self {
        Self {
            model: 0.6,
            rules: 0.4,
        }
    }
}

/// Score boundaries partitioning `[0,1]` into risk tiers.
///
/// A score maps to CRITICAL at or above `critical`, HIGH at or above
/// `high`, MEDIUM at or above `medium`, and LOW below that. The partition
/// is total: no gaps, no overlaps.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TierThresholds {
    /// Lower bound of the CRITICAL tier.
    pub critical: f64,
    /// Lower bound of the HIGH tier.
    pub high: f64,
    /// Lower bound of the MEDIUM tier.
    pub medium: f64,
}

impl Default for TierThresholds {
    fn default() -> Self {
        Self {
            critical: 0.8,
            high: 0.6,
            medium: 0.4,
        }
    }
}

/// Risk fusion engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskConfig {
    /// Model/rules blend weights.
    pub fusion: FusionWeights,
    /// Tier partition boundaries.
    pub tiers: TierThresholds,
    /// Amount above which the high-value baseline signal contributes.
    pub high_value_threshold: f64,
    /// Transaction count above which the velocity signal contributes.
    pub velocity_count_threshold: u32,
    /// Account age in days below which the new-account signal contributes.
    pub new_account_days: u32,
    /// Per-country risk scores in `[0,1]`. Countries not listed use
    /// `default_country_risk`.
    pub country_risk: HashMap<String, f64>,
    /// Risk score for countries absent from the table.
    pub default_country_risk: f64,
}

impl Default for RiskConfig {
    fn default() -> Self {
        let country_risk = [("IR", 0.9), ("KP", 0.9), ("SY", 0.9), ("CU", 0.8)]
            .iter()
            .map(|(c, r)| ((*c).to_string(), *r))
            .collect();

        Self {
            fusion: FusionWeights::default(),
            tiers: TierThresholds::default(),
            high_value_threshold: 50_000.0,
            velocity_count_threshold: 10,
            new_account_days: 30,
            country_risk,
            default_country_risk: 0.1,
        }
    }
}

/// Top-level engine configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Screening section.
    pub screening: ScreeningConfig,
    /// Monitoring section.
    pub monitoring: MonitoringConfig,
    /// Risk fusion section.
    pub risk: RiskConfig,
    /// Resilience settings for external dependencies.
    pub resilience: ResilienceConfig,
}

impl EngineConfig {
    /// Validate the configuration. Any failure here is fatal at startup.
    pub fn validate(&self) -> Result<()> {
        check_unit_interval("screening.match_threshold", self.screening.match_threshold)?;
        if self.screening.max_matches == 0 {
            return Err(EngineError::config("screening.max_matches must be > 0"));
        }

        if self.monitoring.high_value_threshold <= 0.0 {
            return Err(EngineError::config(
                "monitoring.high_value_threshold must be positive",
            ));
        }
        for country in &self.monitoring.high_risk_countries {
            if country.len() != 2 || !country.chars().all(|c| c.is_ascii_uppercase()) {
                return Err(EngineError::config(format!(
                    "monitoring.high_risk_countries entry is not an ISO alpha-2 code: {country:?}"
                )));
            }
        }

        let weights = self.risk.fusion;
        if weights.model < 0.0 || weights.rules < 0.0 {
            return Err(EngineError::config("risk.fusion weights must be non-negative"));
        }
        if (weights.model + weights.rules - 1.0).abs() > 1e-9 {
            return Err(EngineError::config(format!(
                "risk.fusion weights must sum to 1.0, got {}",
                weights.model + weights.rules
            )));
        }

        let tiers = self.risk.tiers;
        for (name, value) in [
            ("risk.tiers.critical", tiers.critical),
            ("risk.tiers.high", tiers.high),
            ("risk.tiers.medium", tiers.medium),
        ] {
            check_unit_interval(name, value)?;
        }
        if !(tiers.medium < tiers.high && tiers.high < tiers.critical) {
            return Err(EngineError::config(
                "risk.tiers must satisfy medium < high < critical",
            ));
        }

        check_unit_interval("risk.default_country_risk", self.risk.default_country_risk)?;
        for (country, risk) in &self.risk.country_risk {
            check_unit_interval(&format!("risk.country_risk[{country}]"), *risk)?;
        }
        if self.risk.high_value_threshold <= 0.0 {
            return Err(EngineError::config(
                "risk.high_value_threshold must be positive",
            ));
        }
        if self.risk.new_account_days == 0 {
            return Err(EngineError::config("risk.new_account_days must be > 0"));
        }

        Ok(())
    }
}

fn check_unit_interval(name: &str, value: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&value) || !value.is_finite() {
        return Err(EngineError::config(format!(
            "{name} must be within [0,1], got {value}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        EngineConfig::default().validate().unwrap();
    }

    #[test]
    fn test_rejects_out_of_range_threshold() {
        let mut config = EngineConfig::default();
        config.screening.match_threshold = 1.5;
        assert!(matches!(
            config.validate(),
            Err(EngineError::Config(_))
        ));
    }

    #[test]
    fn test_rejects_weights_not_summing_to_one() {
        let mut config = EngineConfig::default();
        config.risk.fusion = FusionWeights {
            model: 0.6,
            rules: 0.6,
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_unordered_tier_boundaries() {
        let mut config = EngineConfig::default();
        config.risk.tiers = TierThresholds {
            critical: 0.4,
            high: 0.6,
            medium: 0.8,
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_bad_country_code() {
        let mut config = EngineConfig::default();
        config.monitoring.high_risk_countries.insert("iran".to_string());
        assert!(config.validate().is_err());
    }
}
