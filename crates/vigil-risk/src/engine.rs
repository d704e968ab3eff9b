//! Risk fusion engine.
//!
//! Combines the deterministic rule baseline with an optional external
//! model score, maps the fused score onto a tier, and resolves the tier
//! into policy actions. The model-inference dependency is guarded by a
//! circuit breaker and a per-call timeout derived from the caller's
//! deadline; any degradation of inference selects the rules-only path
//! rather than failing the request.

use crate::baseline::BaselineScorer;
use crate::inference::{ModelClient, ModelPrediction};
use crate::policy::{tier_for_score, PolicyTable};
use crate::store::DecisionRepository;
use crate::types::{RiskDecision, RiskFactor, RiskScoreRequest, MODEL_VERSION_FALLBACK};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;
use vigil_core::config::RiskConfig;
use vigil_core::context::DecisionContext;
use vigil_core::error::{EngineError, Result};
use vigil_core::events::{topics, EventEnvelope, EventPublisher};
use vigil_core::resilience::{CircuitBreaker, ResilienceConfig, ResilienceError};
use vigil_core::store::KeyValueStore;

/// The fusion engine. One instance serves concurrent scoring requests;
/// the circuit breaker is the only shared mutable state.
pub struct RiskFusionEngine {
    config: RiskConfig,
    policy: PolicyTable,
    baseline: BaselineScorer,
    model: Arc<dyn ModelClient>,
    breaker: CircuitBreaker,
    call_timeout: Duration,
    repository: DecisionRepository,
    publisher: Arc<dyn EventPublisher>,
}

impl RiskFusionEngine {
    /// Build an engine. Fails if the policy table does not cover every
    /// tier; a gap there must never surface mid-request.
    pub fn new(
        config: RiskConfig,
        resilience: &ResilienceConfig,
        policy: PolicyTable,
        model: Arc<dyn ModelClient>,
        store: Arc<dyn KeyValueStore>,
        publisher: Arc<dyn EventPublisher>,
    ) -> Result<Self> {
        policy.validate()?;
        Ok(Self {
            baseline: BaselineScorer::new(config.clone()),
            config,
            policy,
            model,
            breaker: CircuitBreaker::new("model-inference", resilience.circuit_breaker.clone()),
            call_timeout: resilience.call_timeout,
            repository: DecisionRepository::new(store),
            publisher,
        })
    }

    /// The breaker guarding model inference.
    pub fn breaker(&self) -> &CircuitBreaker {
        &self.breaker
    }

    /// Score an entity, persist the decision, and publish it.
    pub async fn score(
        &self,
        ctx: &DecisionContext,
        request: &RiskScoreRequest,
    ) -> Result<RiskDecision> {
        Self::validate_request(request)?;

        let baseline = self.baseline.compute(&request.context);
        let prediction = self.predict_guarded(ctx, request).await;

        let mut factors = baseline.factors;
        let weights = self.config.fusion;

        let (score, model_version) = match prediction {
            Some(prediction) => {
                let fused =
                    weights.model * prediction.score + weights.rules * baseline.score;
                factors.push(RiskFactor {
                    name: "model_score".to_string(),
                    contribution: weights.model * prediction.score,
                    description: format!(
                        "Model {} scored {:.4}",
                        prediction.model_version, prediction.score
                    ),
                });
                (fused, prediction.model_version)
            }
            None => (baseline.score, MODEL_VERSION_FALLBACK.to_string()),
        };

        let score = score.clamp(0.0, 1.0);
        let tier = tier_for_score(score, &self.config.tiers);
        let policy_actions = self.policy.actions_for(tier)?;

        factors.sort_by(|a, b| b.contribution.total_cmp(&a.contribution));

        let decision = RiskDecision {
            decision_id: Uuid::new_v4(),
            tenant_id: ctx.tenant_id,
            entity_type: request.entity_type.clone(),
            entity_id: request.entity_id.clone(),
            score,
            tier,
            factors,
            policy_actions,
            model_version,
            computed_at: Utc::now(),
        };

        self.repository.save(&decision).await?;

        let envelope = EventEnvelope::new(topics::RISK_SCORED, ctx, &decision)?;
        self.publisher.publish(topics::RISK_SCORED, envelope).await?;

        tracing::info!(
            tenant_id = %ctx.tenant_id,
            trace_id = %ctx.trace_id,
            decision_id = %decision.decision_id,
            entity_type = %decision.entity_type,
            score = decision.score,
            tier = %decision.tier,
            model_version = %decision.model_version,
            "Risk decision computed"
        );

        Ok(decision)
    }

    /// The most recent decision for an entity within the caller's tenant.
    pub async fn latest_decision(
        &self,
        ctx: &DecisionContext,
        entity_type: &str,
        entity_id: &str,
    ) -> Result<Option<RiskDecision>> {
        self.repository
            .latest_for_entity(ctx.tenant_id, entity_type, entity_id)
            .await
    }

    fn validate_request(request: &RiskScoreRequest) -> Result<()> {
        if request.entity_type.trim().is_empty() {
            return Err(EngineError::validation("entity_type must not be blank"));
        }
        if request.entity_id.trim().is_empty() {
            return Err(EngineError::validation("entity_id must not be blank"));
        }
        for (name, value) in &request.features {
            if !value.is_finite() {
                return Err(EngineError::validation(format!(
                    "feature {name} must be finite, got {value}"
                )));
            }
        }
        if let Some(amount) = request.context.amount {
            if !amount.is_finite() || amount < 0.0 {
                return Err(EngineError::validation(format!(
                    "context amount must be a non-negative finite number, got {amount}"
                )));
            }
        }
        Ok(())
    }

    /// Attempt a guarded model prediction. Returns `None` on any
    /// degradation: circuit open, timeout, expired deadline, call failure,
    /// or an out-of-range model score.
    async fn predict_guarded(
        &self,
        ctx: &DecisionContext,
        request: &RiskScoreRequest,
    ) -> Option<ModelPrediction> {
        let timeout = match &ctx.deadline {
            Some(deadline) => {
                if deadline.is_expired() {
                    tracing::debug!(
                        trace_id = %ctx.trace_id,
                        "Caller deadline expired, skipping model inference"
                    );
                    return None;
                }
                deadline.child_with_timeout(self.call_timeout).remaining()
            }
            None => self.call_timeout,
        };

        let outcome = self
            .breaker
            .execute(|| async {
                tokio::time::timeout(
                    timeout,
                    self.model
                        .predict(&request.entity_type, &request.entity_id, &request.features),
                )
                .await
                .map_err(|_| EngineError::dependency("model inference timed out"))?
            })
            .await;

        match outcome {
            Ok(prediction) => {
                if !(0.0..=1.0).contains(&prediction.score) || !prediction.score.is_finite() {
                    tracing::warn!(
                        trace_id = %ctx.trace_id,
                        score = prediction.score,
                        model_version = %prediction.model_version,
                        "Model returned out-of-range score, using rules only"
                    );
                    return None;
                }
                Some(prediction)
            }
            Err(ResilienceError::CircuitOpen { dependency }) => {
                tracing::debug!(
                    trace_id = %ctx.trace_id,
                    dependency = %dependency,
                    "Inference circuit open, using rules only"
                );
                None
            }
            Err(e) => {
                tracing::warn!(
                    trace_id = %ctx.trace_id,
                    error = %e,
                    "Model inference unavailable, using rules only"
                );
                None
            }
        }
    }
}
