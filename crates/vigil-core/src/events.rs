//! Decision event publication.
//!
//! Every completed decision (alert raised, screening completed, risk scored)
//! is published as a discrete message keyed by the subject's tenant, wrapped
//! in a common envelope carrying trace metadata. Delivery is at-least-once;
//! consumers deduplicate on the decision ID inside the payload.

use crate::context::DecisionContext;
use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

/// Schema version stamped on every envelope.
pub const SCHEMA_VERSION: &str = "1.0.0";

/// Topic names for decision events.
pub mod topics {
    /// A monitoring rule fired against a transaction.
    pub const ALERT_RAISED: &str = "vigil.alert.raised.v1";
    /// A screening request completed (with or without matches).
    pub const SCREENING_COMPLETED: &str = "vigil.screening.completed.v1";
    /// A risk fusion decision was computed.
    pub const RISK_SCORED: &str = "vigil.risk.scored.v1";
}

/// Common envelope for all decision events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// Unique identifier for this event instance.
    pub event_id: Uuid,
    /// Event type name (matches the topic family).
    pub event_type: String,
    /// Distributed tracing correlation ID.
    pub trace_id: Uuid,
    /// Tenant that owns the decision subject.
    pub tenant_id: Uuid,
    /// Identity that triggered the decision.
    pub actor_id: String,
    /// When the event occurred.
    pub occurred_at: DateTime<Utc>,
    /// Version of the payload schema.
    pub schema_version: String,
    /// The decision payload.
    pub payload: serde_json::Value,
}

impl EventEnvelope {
    /// Wrap a payload with metadata drawn from the decision context.
    pub fn new<T: Serialize>(
        event_type: impl Into<String>,
        ctx: &DecisionContext,
        payload: &T,
    ) -> Result<Self> {
        Ok(Self {
            event_id: Uuid::new_v4(),
            event_type: event_type.into(),
            trace_id: ctx.trace_id,
            tenant_id: ctx.tenant_id,
            actor_id: ctx.actor_id.clone(),
            occurred_at: Utc::now(),
            schema_version: SCHEMA_VERSION.to_string(),
            payload: serde_json::to_value(payload)?,
        })
    }
}

/// Boundary for publishing decision events.
///
/// The transport (message bus, outbox table) is a collaborator's concern;
/// the engine only guarantees that every completed decision produces
/// exactly one publish call keyed by tenant.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish an envelope to a topic, keyed by tenant.
    async fn publish(&self, topic: &str, envelope: EventEnvelope) -> Result<()>;
}

/// In-memory publisher that records envelopes, for tests and prototyping.
#[derive(Default)]
pub struct InMemoryPublisher {
    published: RwLock<Vec<(String, EventEnvelope)>>,
}

impl InMemoryPublisher {
    /// Create an empty publisher.
    pub fn new() -> Self {
        Self::default()
    }

    /// All envelopes published so far, with their topics.
    pub async fn published(&self) -> Vec<(String, EventEnvelope)> {
        self.published.read().await.clone()
    }

    /// Envelopes published to one topic.
    pub async fn published_to(&self, topic: &str) -> Vec<EventEnvelope> {
        self.published
            .read()
            .await
            .iter()
            .filter(|(t, _)| t == topic)
            .map(|(_, e)| e.clone())
            .collect()
    }
}

#[async_trait]
impl EventPublisher for InMemoryPublisher {
    async fn publish(&self, topic: &str, envelope: EventEnvelope) -> Result<()> {
        tracing::debug!(
            topic = topic,
            event_type = %envelope.event_type,
            tenant_id = %envelope.tenant_id,
            "Event published"
        );
        self.published
            .write()
            .await
            .push((topic.to_string(), envelope));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Payload {
        decision_id: Uuid,
        score: f64,
    }

    #[tokio::test]
    async fn test_envelope_carries_context_metadata() {
        let ctx = DecisionContext::new(Uuid::new_v4()).with_actor("svc-risk");
        let payload = Payload {
            decision_id: Uuid::new_v4(),
            score: 0.42,
        };

        let envelope = EventEnvelope::new("risk.scored", &ctx, &payload).unwrap();

        assert_eq!(envelope.tenant_id, ctx.tenant_id);
        assert_eq!(envelope.trace_id, ctx.trace_id);
        assert_eq!(envelope.actor_id, "svc-risk");
        assert_eq!(envelope.schema_version, SCHEMA_VERSION);
        assert_eq!(envelope.payload["score"], 0.42);
    }

    #[tokio::test]
    async fn test_in_memory_publisher_records_by_topic() {
        let ctx = DecisionContext::new(Uuid::new_v4());
        let publisher = InMemoryPublisher::new();

        let envelope = EventEnvelope::new("risk.scored", &ctx, &serde_json::json!({})).unwrap();
        publisher
            .publish(topics::RISK_SCORED, envelope)
            .await
            .unwrap();

        assert_eq!(publisher.published_to(topics::RISK_SCORED).await.len(), 1);
        assert!(publisher.published_to(topics::ALERT_RAISED).await.is_empty());
    }
}
