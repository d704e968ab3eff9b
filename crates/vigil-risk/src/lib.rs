//! # Vigil Risk
//!
//! Risk fusion for the Vigil decision engine: deterministic rule baseline
//! scoring, guarded model inference, score blending, tier mapping, and
//! policy action resolution, with persisted and published decisions.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod baseline;
pub mod engine;
pub mod inference;
pub mod policy;
pub mod store;
pub mod types;

pub use baseline::{BaselineScore, BaselineScorer};
pub use engine::RiskFusionEngine;
pub use inference::{ModelClient, ModelPrediction};
pub use policy::{tier_for_score, PolicyTable};
pub use store::DecisionRepository;
pub use types::{
    PolicyAction, PolicyStep, RiskContext, RiskDecision, RiskFactor, RiskScoreRequest, RiskTier,
    MODEL_VERSION_FALLBACK,
};
