//! Screening types and data structures.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// A reference-list record to screen against.
///
/// Read-only relative to the evaluator; the list lifecycle is owned by an
/// external ingestion process.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchlistEntry {
    /// Entry identifier.
    pub id: String,
    /// Canonical name.
    pub name: String,
    /// Alternative names.
    pub aliases: Vec<String>,
    /// Source list (e.g. "OFAC", "UN", "EU").
    pub list_source: String,
    /// Additional entry data.
    pub metadata: HashMap<String, String>,
}

/// Why a candidate matched, in precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReasonCode {
    /// Strings are equal after normalization.
    ExactNameMatch,
    /// One normalized string fully contains the other.
    PartialNameMatch,
    /// Similarity score at or above 0.95.
    HighSimilarityMatch,
    /// Similarity score at or above the configured threshold.
    FuzzyNameMatch,
}

impl std::fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ExactNameMatch => write!(f, "EXACT_NAME_MATCH"),
            Self::PartialNameMatch => write!(f, "PARTIAL_NAME_MATCH"),
            Self::HighSimilarityMatch => write!(f, "HIGH_SIMILARITY_MATCH"),
            Self::FuzzyNameMatch => write!(f, "FUZZY_NAME_MATCH"),
        }
    }
}

/// A single candidate match from screening.
///
/// Ephemeral: computed per request, persisted only as part of a
/// [`ScreeningDecision`]. Carries enough structured explanation that a
/// reviewer can reconstruct the match without re-running the comparison.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchResult {
    /// Matched entry identifier.
    pub entry_id: String,
    /// The entry name (or alias) that matched best.
    pub matched_name: String,
    /// Source list of the entry.
    pub list_source: String,
    /// Similarity score in `[0,1]`.
    pub score: f64,
    /// Reason codes explaining the match.
    pub reason_codes: Vec<ReasonCode>,
    /// Additional entry data.
    pub metadata: HashMap<String, String>,
}

/// Completed screening decision. Append-only once completed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreeningDecision {
    /// Request identifier.
    pub request_id: Uuid,
    /// The queried name as submitted.
    pub query: String,
    /// Matches at or above threshold, ranked by score descending.
    pub matches: Vec<MatchResult>,
    /// Total number of retained matches.
    pub match_count: usize,
    /// When the screening completed.
    pub completed_at: DateTime<Utc>,
}
