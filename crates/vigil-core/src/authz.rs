//! Policy authorization boundary.
//!
//! Authorization decisions come from an external policy authority (an
//! OPA-style engine). The client is an opaque collaborator; this module
//! supplies the request/decision shapes and a guarded decorator applying
//! the same timeout and circuit-breaker discipline as the model-inference
//! boundary. Failures fail closed (deny) by default; the fail-open override
//! is reserved for non-production configurations.

use crate::context::DecisionContext;
use crate::error::Result;
use crate::resilience::{CircuitBreaker, ResilienceConfig, ResilienceError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

/// Input to a policy authorization check.
#[derive(Debug, Clone, Serialize)]
pub struct AuthzRequest {
    /// Action being attempted (e.g. "risk:score", "screening:read").
    pub action: String,
    /// Resource type being accessed.
    pub resource: String,
    /// Specific resource identifier, if any.
    pub resource_id: Option<String>,
    /// Acting identity.
    pub actor_id: String,
    /// Roles held by the actor.
    pub roles: Vec<String>,
    /// Tenant owning the resource.
    pub tenant_id: Uuid,
}

/// Outcome of a policy authorization check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthzDecision {
    /// Whether the action is permitted.
    pub allow: bool,
    /// Machine-readable reasons for the decision.
    pub reasons: Vec<String>,
}

/// Boundary to the external policy authority.
#[async_trait]
pub trait AuthorizationClient: Send + Sync {
    /// Evaluate an authorization request.
    async fn authorize(&self, request: &AuthzRequest) -> Result<AuthzDecision>;
}

/// Authorization decorator with timeout, circuit breaking, and a
/// deterministic deny-by-default fallback.
pub struct GuardedAuthorizer<C> {
    client: C,
    breaker: CircuitBreaker,
    call_timeout: Duration,
    fail_open: bool,
}

impl<C: AuthorizationClient> GuardedAuthorizer<C> {
    /// Wrap a client with the given resilience settings. Fails closed.
    pub fn new(client: C, config: &ResilienceConfig) -> Self {
        Self {
            client,
            breaker: CircuitBreaker::new("policy-authority", config.circuit_breaker.clone()),
            call_timeout: config.call_timeout,
            fail_open: false,
        }
    }

    /// Enable fail-open behavior. Non-production configurations only.
    pub fn fail_open(mut self, enabled: bool) -> Self {
        self.fail_open = enabled;
        self
    }

    /// The breaker guarding the policy authority.
    pub fn breaker(&self) -> &CircuitBreaker {
        &self.breaker
    }

    /// Check whether the action is allowed.
    ///
    /// Degradation of the policy authority (timeout, open circuit, call
    /// failure) never surfaces as an error; it resolves to the configured
    /// fallback decision.
    pub async fn is_allowed(&self, ctx: &DecisionContext, request: &AuthzRequest) -> bool {
        let timeout = ctx
            .remaining()
            .map_or(self.call_timeout, |r| r.min(self.call_timeout));

        let outcome = self
            .breaker
            .execute(|| async {
                tokio::time::timeout(timeout, self.client.authorize(request))
                    .await
                    .map_err(|_| {
                        crate::error::EngineError::dependency("policy authority timed out")
                    })?
            })
            .await;

        match outcome {
            Ok(decision) => {
                tracing::debug!(
                    action = %request.action,
                    resource = %request.resource,
                    allow = decision.allow,
                    "Authorization decision"
                );
                decision.allow
            }
            Err(ResilienceError::CircuitOpen { dependency }) => {
                tracing::warn!(
                    dependency = %dependency,
                    action = %request.action,
                    fail_open = self.fail_open,
                    "Authorization short-circuited, using fallback"
                );
                self.fail_open
            }
            Err(e) => {
                tracing::warn!(
                    action = %request.action,
                    error = %e,
                    fail_open = self.fail_open,
                    "Authorization check failed, using fallback"
                );
                self.fail_open
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use crate::resilience::CircuitBreakerConfig;
    use std::sync::atomic::{AtomicBool, Ordering};

    struct StaticClient {
        allow: bool,
    }

    #[async_trait]
    impl AuthorizationClient for StaticClient {
        async fn authorize(&self, _request: &AuthzRequest) -> Result<AuthzDecision> {
            Ok(AuthzDecision {
                allow: self.allow,
                reasons: vec![],
            })
        }
    }

    struct FailingClient {
        called: AtomicBool,
    }

    #[async_trait]
    impl AuthorizationClient for FailingClient {
        async fn authorize(&self, _request: &AuthzRequest) -> Result<AuthzDecision> {
            self.called.store(true, Ordering::Relaxed);
            Err(EngineError::dependency("connection refused"))
        }
    }

    fn request(tenant_id: Uuid) -> AuthzRequest {
        AuthzRequest {
            action: "risk:score".to_string(),
            resource: "risk-decision".to_string(),
            resource_id: None,
            actor_id: "analyst-1".to_string(),
            roles: vec!["analyst".to_string()],
            tenant_id,
        }
    }

    #[tokio::test]
    async fn test_allows_when_authority_allows() {
        let ctx = DecisionContext::new(Uuid::new_v4());
        let authz = GuardedAuthorizer::new(StaticClient { allow: true }, &ResilienceConfig::default());

        assert!(authz.is_allowed(&ctx, &request(ctx.tenant_id)).await);
    }

    #[tokio::test]
    async fn test_fails_closed_on_error() {
        let ctx = DecisionContext::new(Uuid::new_v4());
        let authz = GuardedAuthorizer::new(
            FailingClient {
                called: AtomicBool::new(false),
            },
            &ResilienceConfig::default(),
        );

        assert!(!authz.is_allowed(&ctx, &request(ctx.tenant_id)).await);
    }

    #[tokio::test]
    async fn test_fail_open_override() {
        let ctx = DecisionContext::new(Uuid::new_v4());
        let authz = GuardedAuthorizer::new(
            FailingClient {
                called: AtomicBool::new(false),
            },
            &ResilienceConfig::default(),
        )
        .fail_open(true);

        assert!(authz.is_allowed(&ctx, &request(ctx.tenant_id)).await);
    }

    #[tokio::test]
    async fn test_open_circuit_denies_without_calling() {
        let ctx = DecisionContext::new(Uuid::new_v4());
        let config = ResilienceConfig::default()
            .with_circuit_breaker(CircuitBreakerConfig::default().failure_threshold(1));
        let client = FailingClient {
            called: AtomicBool::new(false),
        };
        let authz = GuardedAuthorizer::new(client, &config);

        // First call fails and trips the breaker
        assert!(!authz.is_allowed(&ctx, &request(ctx.tenant_id)).await);
        authz.client.called.store(false, Ordering::Relaxed);

        // Second call short-circuits; the client is never reached
        assert!(!authz.is_allowed(&ctx, &request(ctx.tenant_id)).await);
        assert!(!authz.client.called.load(Ordering::Relaxed));
    }
}
