//! Watchlist screening evaluator.

use crate::similarity::{normalize, reason_codes, similarity_normalized};
use crate::types::{MatchResult, ScreeningDecision, WatchlistEntry};
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;
use vigil_core::config::ScreeningConfig;
use vigil_core::context::DecisionContext;
use vigil_core::error::{EngineError, Result};
use vigil_core::events::{topics, EventEnvelope, EventPublisher};

/// Screens queried names against a watchlist and records the outcome.
///
/// Evaluation is pure and deterministic: the same query against the same
/// list always yields the same decision. The evaluator never mutates the
/// list it screens against.
pub struct ScreeningEvaluator {
    config: ScreeningConfig,
    publisher: Arc<dyn EventPublisher>,
}

impl ScreeningEvaluator {
    /// Create an evaluator with the given configuration.
    pub fn new(config: ScreeningConfig, publisher: Arc<dyn EventPublisher>) -> Self {
        Self { config, publisher }
    }

    /// Score a query against every entry (canonical name and aliases),
    /// retaining candidates at or above `threshold` ranked by score
    /// descending. Ties keep list order, so rankings are reproducible.
    pub fn evaluate(
        query: &str,
        watchlist: &[WatchlistEntry],
        threshold: f64,
    ) -> Vec<MatchResult> {
        let query_norm = normalize(query);

        let mut matches: Vec<MatchResult> = watchlist
            .iter()
            .filter_map(|entry| Self::best_match(&query_norm, entry, threshold))
            .collect();

        matches.sort_by(|a, b| b.score.total_cmp(&a.score));
        matches
    }

    /// Best-scoring candidate among an entry's canonical name and aliases.
    fn best_match(
        query_norm: &str,
        entry: &WatchlistEntry,
        threshold: f64,
    ) -> Option<MatchResult> {
        let mut best: Option<(f64, &str)> = None;

        for candidate in std::iter::once(entry.name.as_str())
            .chain(entry.aliases.iter().map(String::as_str))
        {
            let candidate_norm = normalize(candidate);
            let score = similarity_normalized(query_norm, &candidate_norm);
            if best.map_or(true, |(s, _)| score > s) {
                best = Some((score, candidate));
            }
        }

        let (score, matched_name) = best?;
        if score < threshold {
            return None;
        }

        let matched_norm = normalize(matched_name);
        Some(MatchResult {
            entry_id: entry.id.clone(),
            matched_name: matched_name.to_string(),
            list_source: entry.list_source.clone(),
            score,
            reason_codes: reason_codes(query_norm, &matched_norm, score, threshold),
            metadata: entry.metadata.clone(),
        })
    }

    /// Screen a query and publish the completed decision.
    ///
    /// A blank query is a caller fault, not an empty result.
    pub async fn screen(
        &self,
        ctx: &DecisionContext,
        query: &str,
        watchlist: &[WatchlistEntry],
    ) -> Result<ScreeningDecision> {
        if query.trim().is_empty() {
            return Err(EngineError::validation("screening query must not be blank"));
        }

        let mut matches = Self::evaluate(query, watchlist, self.config.match_threshold);
        matches.truncate(self.config.max_matches);

        let decision = ScreeningDecision {
            request_id: Uuid::new_v4(),
            query: query.to_string(),
            match_count: matches.len(),
            matches,
            completed_at: Utc::now(),
        };

        tracing::info!(
            tenant_id = %ctx.tenant_id,
            trace_id = %ctx.trace_id,
            request_id = %decision.request_id,
            match_count = decision.match_count,
            "Screening completed"
        );

        let envelope = EventEnvelope::new(topics::SCREENING_COMPLETED, ctx, &decision)?;
        self.publisher
            .publish(topics::SCREENING_COMPLETED, envelope)
            .await?;

        Ok(decision)
    }
}
