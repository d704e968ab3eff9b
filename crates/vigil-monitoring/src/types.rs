//! Monitoring types: observations, alerts, severities.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A transaction as observed by the monitoring pipeline.
///
/// Observations are read-only inputs; rules never mutate them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionObservation {
    /// Internal transaction identifier.
    pub id: Uuid,
    /// Identifier assigned by the originating system.
    pub external_id: String,
    /// Customer the transaction belongs to.
    pub customer_id: Uuid,
    /// Transaction amount in the transaction currency.
    pub amount: f64,
    /// ISO currency code.
    pub currency: String,
    /// Counterparty display name, if known.
    pub counterparty_name: Option<String>,
    /// Counterparty account identifier, if known.
    pub counterparty_account: Option<String>,
    /// Counterparty country (ISO alpha-2), if known.
    pub counterparty_country: Option<String>,
    /// Originating channel (e.g. "wire", "card"), if known.
    pub channel: Option<String>,
    /// When the transaction occurred.
    pub occurred_at: DateTime<Utc>,
}

/// Alert severity, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    /// Informational.
    Low,
    /// Worth attention.
    Medium,
    /// Requires review.
    High,
    /// Requires immediate review.
    Critical,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "LOW"),
            Self::Medium => write!(f, "MEDIUM"),
            Self::High => write!(f, "HIGH"),
            Self::Critical => write!(f, "CRITICAL"),
        }
    }
}

/// Category of a raised alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertType {
    /// Raised by a transaction-pattern rule.
    TransactionMonitoring,
    /// Raised by a counterparty-geography rule.
    CountryRisk,
}

/// Alert workflow state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertStatus {
    /// Newly raised, unassigned.
    Open,
    /// Assigned to an analyst.
    Assigned,
    /// Under active review.
    InReview,
    /// Escalated for senior review.
    Escalated,
    /// Closed, confirmed as genuine.
    ClosedTruePositive,
    /// Closed, confirmed as benign.
    ClosedFalsePositive,
}

/// A monitoring alert raised against a transaction.
///
/// Alerts open in [`AlertStatus::Open`] and move through the workflow
/// states from there; the engine itself only ever creates them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    /// Alert identifier.
    pub id: Uuid,
    /// Tenant the alert belongs to.
    pub tenant_id: Uuid,
    /// Transaction that triggered the alert.
    pub transaction_id: Uuid,
    /// Customer the transaction belongs to.
    pub customer_id: Uuid,
    /// Alert category.
    pub alert_type: AlertType,
    /// Severity at creation.
    pub severity: Severity,
    /// Identifier of the rule that fired.
    pub rule_id: String,
    /// Rule score in `[0,1]`.
    pub score: f64,
    /// Human-readable reasons the rule fired.
    pub reasons: Vec<String>,
    /// Workflow state.
    pub status: AlertStatus,
    /// When the alert was raised.
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Critical > Severity::High);
        assert!(Severity::High > Severity::Medium);
        assert!(Severity::Medium > Severity::Low);
    }

    #[test]
    fn test_severity_serializes_screaming_snake() {
        let json = serde_json::to_string(&Severity::Critical).unwrap();
        assert_eq!(json, "\"CRITICAL\"");
    }
}
