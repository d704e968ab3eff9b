//! Model inference boundary.
//!
//! Inference is an opaque external collaborator. The fusion engine only
//! sees this trait; transport, batching, and model serving are someone
//! else's problem. Every call site treats failure as expected degradation,
//! never as a pipeline fault.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use vigil_core::error::Result;

/// A model score with the version that produced it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelPrediction {
    /// Predicted risk score in `[0,1]`.
    pub score: f64,
    /// Version identifier of the serving model.
    pub model_version: String,
}

/// Boundary to the external model inference service.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Predict a risk score for one entity.
    async fn predict(
        &self,
        entity_type: &str,
        entity_id: &str,
        features: &HashMap<String, f64>,
    ) -> Result<ModelPrediction>;
}
