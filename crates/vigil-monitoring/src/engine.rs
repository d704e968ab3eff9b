//! Rule engine: evaluates observations against the registered rule set.

use crate::rules::{default_rules, MonitoringRule};
use crate::types::{Alert, AlertStatus, TransactionObservation};
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;
use vigil_core::config::MonitoringConfig;
use vigil_core::context::DecisionContext;
use vigil_core::error::{EngineError, Result};
use vigil_core::events::{topics, EventEnvelope, EventPublisher};

/// Evaluates each observation against every registered rule and raises
/// one alert per rule that fires.
///
/// Rule failures are isolated: a rule returning `Err` is logged and
/// treated as not having fired, so one faulty rule cannot mask the rest
/// of the rule set.
pub struct RuleEngine {
    rules: Vec<Box<dyn MonitoringRule>>,
    publisher: Arc<dyn EventPublisher>,
}

impl RuleEngine {
    /// Engine with an explicit rule set.
    pub fn new(rules: Vec<Box<dyn MonitoringRule>>, publisher: Arc<dyn EventPublisher>) -> Self {
        Self { rules, publisher }
    }

    /// Engine with the built-in rules configured from `config`.
    pub fn with_defaults(config: &MonitoringConfig, publisher: Arc<dyn EventPublisher>) -> Self {
        Self::new(default_rules(config), publisher)
    }

    /// Register an additional rule.
    pub fn register(&mut self, rule: Box<dyn MonitoringRule>) {
        self.rules.push(rule);
    }

    /// Number of registered rules.
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Evaluate an observation, returning raised alerts ordered by
    /// severity descending (ties keep rule registration order).
    ///
    /// Publishes one alert-raised event per alert.
    pub async fn evaluate(
        &self,
        ctx: &DecisionContext,
        observation: &TransactionObservation,
    ) -> Result<Vec<Alert>> {
        if !observation.amount.is_finite() || observation.amount < 0.0 {
            return Err(EngineError::validation(format!(
                "transaction amount must be a non-negative finite number, got {}",
                observation.amount
            )));
        }
        if observation.currency.trim().is_empty() {
            return Err(EngineError::validation("transaction currency must not be blank"));
        }

        let mut alerts = Vec::new();
        for rule in &self.rules {
            match rule.evaluate(observation) {
                Ok(Some(hit)) => {
                    alerts.push(Alert {
                        id: Uuid::new_v4(),
                        tenant_id: ctx.tenant_id,
                        transaction_id: observation.id,
                        customer_id: observation.customer_id,
                        alert_type: hit.alert_type,
                        severity: hit.severity,
                        rule_id: rule.id().to_string(),
                        score: hit.score.clamp(0.0, 1.0),
                        reasons: hit.reasons,
                        status: AlertStatus::Open,
                        created_at: Utc::now(),
                    });
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(
                        rule_id = %rule.id(),
                        transaction_id = %observation.id,
                        trace_id = %ctx.trace_id,
                        error = %e,
                        "Rule evaluation failed, treating as not fired"
                    );
                }
            }
        }

        alerts.sort_by(|a, b| b.severity.cmp(&a.severity));

        for alert in &alerts {
            let envelope = EventEnvelope::new(topics::ALERT_RAISED, ctx, alert)?;
            self.publisher.publish(topics::ALERT_RAISED, envelope).await?;
        }

        tracing::info!(
            tenant_id = %ctx.tenant_id,
            trace_id = %ctx.trace_id,
            transaction_id = %observation.id,
            alert_count = alerts.len(),
            "Transaction evaluated"
        );

        Ok(alerts)
    }
}
