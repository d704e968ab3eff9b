//! Per-request decision context.
//!
//! Tenant, actor, and trace identity are threaded explicitly through every
//! evaluator call. The engine never reads ambient thread-local state; in a
//! pooled-thread runtime that is a cross-request leakage hazard.

use crate::resilience::DeadlineContext;
use std::time::Duration;
use uuid::Uuid;

/// Identity and cancellation context for a single decision request.
#[derive(Debug, Clone)]
pub struct DecisionContext {
    /// Tenant that owns the subject of the decision.
    pub tenant_id: Uuid,
    /// Identity that triggered the request.
    pub actor_id: String,
    /// Distributed tracing correlation ID.
    pub trace_id: Uuid,
    /// Optional caller-supplied deadline bounding the whole request.
    pub deadline: Option<DeadlineContext>,
}

impl DecisionContext {
    /// Create a context for the given tenant with a fresh trace ID and the
    /// `system` actor.
    pub fn new(tenant_id: Uuid) -> Self {
        Self {
            tenant_id,
            actor_id: "system".to_string(),
            trace_id: Uuid::new_v4(),
            deadline: None,
        }
    }

    /// Set the actor identity.
    pub fn with_actor(mut self, actor_id: impl Into<String>) -> Self {
        self.actor_id = actor_id.into();
        self
    }

    /// Set the trace ID.
    pub fn with_trace(mut self, trace_id: Uuid) -> Self {
        self.trace_id = trace_id;
        self
    }

    /// Bound the request by a deadline starting now.
    pub fn with_deadline(mut self, timeout: Duration) -> Self {
        self.deadline = Some(DeadlineContext::new(timeout));
        self
    }

    /// Remaining time before the caller deadline, if one was supplied.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline.as_ref().map(DeadlineContext::remaining)
    }

    /// Returns true if the caller deadline has passed.
    pub fn is_expired(&self) -> bool {
        self.deadline
            .as_ref()
            .is_some_and(DeadlineContext::is_expired)
    }
}
