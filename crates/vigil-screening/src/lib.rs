//! # Vigil Screening
//!
//! Sanctions and PEP screening for the Vigil decision engine: name
//! normalization, multi-strategy fuzzy similarity scoring, and watchlist
//! evaluation with explainable match results.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod screening;
pub mod similarity;
pub mod types;

pub use screening::ScreeningEvaluator;
pub use similarity::{normalize, similarity};
pub use types::{MatchResult, ReasonCode, ScreeningDecision, WatchlistEntry};
