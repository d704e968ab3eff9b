//! # Vigil Monitoring
//!
//! Transaction monitoring for the Vigil decision engine: an open rule set
//! evaluated against observed transactions, raising workflow alerts with
//! per-rule fault isolation.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod engine;
pub mod rules;
pub mod types;

pub use engine::RuleEngine;
pub use rules::{CountryRiskRule, HighValueRule, MonitoringRule, RuleHit};
pub use types::{Alert, AlertStatus, AlertType, Severity, TransactionObservation};
