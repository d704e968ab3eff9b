//! Deadline management.
//!
//! A caller-supplied deadline bounds the entire decision pipeline, not just
//! the sub-call to an external dependency. `child_with_timeout` derives the
//! per-call deadline: the shorter of the remaining caller budget and the
//! dependency's own timeout governs.

use super::{ResilienceError, ResilienceResult};
use std::time::{Duration, Instant};

/// Propagatable absolute deadline for one request.
#[derive(Debug, Clone)]
pub struct DeadlineContext {
    /// Absolute deadline.
    deadline: Instant,
    /// Original timeout at creation.
    original_timeout: Duration,
}

impl DeadlineContext {
    /// Create a deadline expiring `timeout` from now.
    pub fn new(timeout: Duration) -> Self {
        Self {
            deadline: Instant::now() + timeout,
            original_timeout: timeout,
        }
    }

    /// Create from an absolute deadline.
    pub fn from_deadline(deadline: Instant) -> Self {
        let remaining = deadline.saturating_duration_since(Instant::now());
        Self {
            deadline,
            original_timeout: remaining,
        }
    }

    /// Remaining time until the deadline.
    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }

    /// Returns true if the deadline has passed.
    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.deadline
    }

    /// The timeout this context was created with.
    pub fn original_timeout(&self) -> Duration {
        self.original_timeout
    }

    /// Derive a child deadline capped by `max_timeout`.
    ///
    /// The child expires at whichever comes first: the parent deadline or
    /// `max_timeout` from now.
    pub fn child_with_timeout(&self, max_timeout: Duration) -> Self {
        let timeout = self.remaining().min(max_timeout);
        Self {
            deadline: Instant::now() + timeout,
            original_timeout: timeout,
        }
    }

    /// Execute a future bounded by this deadline.
    pub async fn execute<F, Fut, T, E>(&self, f: F) -> ResilienceResult<T>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<T, E>>,
        E: Into<crate::error::EngineError>,
    {
        if self.is_expired() {
            return Err(ResilienceError::DeadlineExceeded);
        }

        let remaining = self.remaining();
        match tokio::time::timeout(remaining, f()).await {
            Ok(Ok(result)) => Ok(result),
            Ok(Err(e)) => Err(ResilienceError::Call(e.into())),
            Err(_elapsed) => Err(ResilienceError::Timeout { timeout: remaining }),
        }
    }

    /// Return an error if the deadline has passed.
    pub fn check(&self) -> ResilienceResult<()> {
        if self.is_expired() {
            Err(ResilienceError::DeadlineExceeded)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;

    #[test]
    fn test_deadline_remaining() {
        let ctx = DeadlineContext::new(Duration::from_secs(10));
        assert!(!ctx.is_expired());
        assert!(ctx.remaining() <= Duration::from_secs(10));
    }

    #[test]
    fn test_child_capped_by_parent() {
        let parent = DeadlineContext::new(Duration::from_millis(100));
        let child = parent.child_with_timeout(Duration::from_secs(10));

        // Caller budget is shorter than the per-call timeout; it governs.
        assert!(child.original_timeout() <= Duration::from_millis(100));
    }

    #[test]
    fn test_child_capped_by_call_timeout() {
        let parent = DeadlineContext::new(Duration::from_secs(10));
        let child = parent.child_with_timeout(Duration::from_millis(500));

        assert!(child.original_timeout() <= Duration::from_millis(500));
    }

    #[tokio::test]
    async fn test_expired_deadline_rejects_without_executing() {
        let ctx = DeadlineContext::new(Duration::from_nanos(1));
        std::thread::sleep(Duration::from_millis(1));

        assert!(ctx.is_expired());
        assert!(ctx.check().is_err());

        let result: ResilienceResult<()> = ctx
            .execute(|| async { Ok::<_, EngineError>(()) })
            .await;
        assert!(matches!(result, Err(ResilienceError::DeadlineExceeded)));
    }

    #[tokio::test]
    async fn test_slow_call_times_out() {
        let ctx = DeadlineContext::new(Duration::from_millis(10));
        let result: ResilienceResult<()> = ctx
            .execute(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok::<_, EngineError>(())
            })
            .await;

        assert!(matches!(result, Err(ResilienceError::Timeout { .. })));
    }
}
