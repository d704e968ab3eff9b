//! Deterministic rule baseline score.
//!
//! The baseline is an additive model over at most four behavioral signals,
//! each weighted and saturating. It is the floor the fusion engine always
//! has available, whatever the state of model inference: fully
//! deterministic, explainable factor by factor, and clamped to `[0,1]`.

use crate::types::{RiskContext, RiskFactor};
use vigil_core::config::RiskConfig;

/// Amount at which the transaction-amount signal saturates.
const AMOUNT_SATURATION: f64 = 100_000.0;

/// Transaction count at which the velocity signal saturates.
const VELOCITY_SATURATION: f64 = 50.0;

const COUNTRY_WEIGHT: f64 = 0.3;
const AMOUNT_WEIGHT: f64 = 0.25;
const VELOCITY_WEIGHT: f64 = 0.2;
const ACCOUNT_AGE_WEIGHT: f64 = 0.15;

/// Country risk above which the geography signal contributes.
const COUNTRY_RISK_FLOOR: f64 = 0.3;

/// The baseline score with its contributing factors.
#[derive(Debug, Clone)]
pub struct BaselineScore {
    /// Sum of contributions, clamped to `[0,1]`.
    pub score: f64,
    /// Individual signal contributions.
    pub factors: Vec<RiskFactor>,
}

/// Computes the rule baseline from behavioral context.
pub struct BaselineScorer {
    config: RiskConfig,
}

impl BaselineScorer {
    /// Scorer using the given risk configuration.
    pub fn new(config: RiskConfig) -> Self {
        Self { config }
    }

    /// Compute the baseline. Absent context fields contribute nothing.
    pub fn compute(&self, context: &RiskContext) -> BaselineScore {
        let mut factors = Vec::new();

        if let Some(country) = context.country.as_deref() {
            let risk = self
                .config
                .country_risk
                .get(country)
                .copied()
                .unwrap_or(self.config.default_country_risk);
            if risk > COUNTRY_RISK_FLOOR {
                factors.push(RiskFactor {
                    name: "country_risk".to_string(),
                    contribution: risk * COUNTRY_WEIGHT,
                    description: format!("Destination country {country} has risk {risk:.2}"),
                });
            }
        }

        if let Some(amount) = context.amount {
            if amount > self.config.high_value_threshold {
                let saturated = (amount / AMOUNT_SATURATION).min(1.0);
                factors.push(RiskFactor {
                    name: "transaction_amount".to_string(),
                    contribution: saturated * AMOUNT_WEIGHT,
                    description: format!(
                        "Amount {amount:.2} exceeds {:.2}",
                        self.config.high_value_threshold
                    ),
                });
            }
        }

        if let Some(count) = context.transaction_count {
            if count > self.config.velocity_count_threshold {
                let saturated = (f64::from(count) / VELOCITY_SATURATION).min(1.0);
                factors.push(RiskFactor {
                    name: "velocity".to_string(),
                    contribution: saturated * VELOCITY_WEIGHT,
                    description: format!(
                        "{count} recent transactions exceed {}",
                        self.config.velocity_count_threshold
                    ),
                });
            }
        }

        if let Some(age) = context.account_age_days {
            if age < self.config.new_account_days {
                let freshness = 1.0 - f64::from(age) / f64::from(self.config.new_account_days);
                factors.push(RiskFactor {
                    name: "account_age".to_string(),
                    contribution: freshness * ACCOUNT_AGE_WEIGHT,
                    description: format!(
                        "Account is {age} days old, under {}",
                        self.config.new_account_days
                    ),
                });
            }
        }

        let score = factors
            .iter()
            .map(|f| f.contribution)
            .sum::<f64>()
            .clamp(0.0, 1.0);

        BaselineScore { score, factors }
    }
}
