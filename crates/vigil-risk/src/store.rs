//! Decision persistence.
//!
//! Decisions are append-only audit records. Two key families are used:
//! one per decision, and one "latest" pointer per entity so the most
//! recent decision can be fetched without a scan.

use crate::types::RiskDecision;
use std::sync::Arc;
use uuid::Uuid;
use vigil_core::error::Result;
use vigil_core::store::KeyValueStore;

/// Typed repository for risk decisions over the key-value boundary.
#[derive(Clone)]
pub struct DecisionRepository {
    store: Arc<dyn KeyValueStore>,
}

impl DecisionRepository {
    /// Repository backed by the given store.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    fn decision_key(decision_id: Uuid) -> String {
        format!("risk-decision/{decision_id}")
    }

    fn latest_key(tenant_id: Uuid, entity_type: &str, entity_id: &str) -> String {
        format!("risk-decision/latest/{tenant_id}/{entity_type}/{entity_id}")
    }

    /// Persist a decision and update the latest pointer for its entity.
    pub async fn save(&self, decision: &RiskDecision) -> Result<()> {
        let value = serde_json::to_value(decision)?;
        self.store
            .put(Self::decision_key(decision.decision_id), value)
            .await?;
        self.store
            .put(
                Self::latest_key(decision.tenant_id, &decision.entity_type, &decision.entity_id),
                serde_json::to_value(decision.decision_id)?,
            )
            .await
    }

    /// Fetch a decision by identifier.
    pub async fn get(&self, decision_id: Uuid) -> Result<Option<RiskDecision>> {
        match self.store.get(&Self::decision_key(decision_id)).await? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    /// Fetch the most recent decision for an entity, if any.
    pub async fn latest_for_entity(
        &self,
        tenant_id: Uuid,
        entity_type: &str,
        entity_id: &str,
    ) -> Result<Option<RiskDecision>> {
        let key = Self::latest_key(tenant_id, entity_type, entity_id);
        match self.store.get(&key).await? {
            Some(value) => {
                let decision_id: Uuid = serde_json::from_value(value)?;
                self.get(decision_id).await
            }
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PolicyAction, PolicyStep, RiskTier};
    use chrono::Utc;
    use vigil_core::store::InMemoryStore;

    fn decision(tenant_id: Uuid, entity_id: &str, score: f64) -> RiskDecision {
        RiskDecision {
            decision_id: Uuid::new_v4(),
            tenant_id,
            entity_type: "transaction".to_string(),
            entity_id: entity_id.to_string(),
            score,
            tier: RiskTier::Low,
            factors: vec![],
            policy_actions: vec![PolicyStep {
                action: PolicyAction::Allow,
                priority: 1,
            }],
            model_version: "m-1".to_string(),
            computed_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_save_and_get_round_trip() {
        let repo = DecisionRepository::new(Arc::new(InMemoryStore::new()));
        let tenant = Uuid::new_v4();
        let original = decision(tenant, "txn-1", 0.25);

        repo.save(&original).await.unwrap();

        let loaded = repo.get(original.decision_id).await.unwrap().unwrap();
        assert_eq!(loaded.entity_id, "txn-1");
        assert_eq!(loaded.score, 0.25);
    }

    #[tokio::test]
    async fn test_latest_pointer_tracks_most_recent() {
        let repo = DecisionRepository::new(Arc::new(InMemoryStore::new()));
        let tenant = Uuid::new_v4();

        let first = decision(tenant, "txn-1", 0.2);
        let second = decision(tenant, "txn-1", 0.7);
        repo.save(&first).await.unwrap();
        repo.save(&second).await.unwrap();

        let latest = repo
            .latest_for_entity(tenant, "transaction", "txn-1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(latest.decision_id, second.decision_id);

        // The earlier decision remains readable; history is append-only
        assert!(repo.get(first.decision_id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_latest_is_tenant_scoped() {
        let repo = DecisionRepository::new(Arc::new(InMemoryStore::new()));
        let tenant_a = Uuid::new_v4();
        let tenant_b = Uuid::new_v4();

        repo.save(&decision(tenant_a, "txn-1", 0.3)).await.unwrap();

        assert!(repo
            .latest_for_entity(tenant_b, "transaction", "txn-1")
            .await
            .unwrap()
            .is_none());
    }
}
