//! Engine error type.
//!
//! Only hard failures live here. Data-integrity anomalies (overlapping
//! assignments, competing exceptions) are carried as
//! [`Anomaly`](crate::models::Anomaly) values on the computed day instead,
//! and "no schedule for this user today" is a normal value, not an error.

use chrono::NaiveDate;
use thiserror::Error;

/// Result alias for engine operations.
pub type Result<T> = std::result::Result<T, RotationError>;

/// Errors produced by the rotation engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RotationError {
    /// Configuration is unusable (scheme start unset, bad cycle, dangling refs).
    ///
    /// Fatal to every computation until corrected.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A bounded rule has no occurrence in the searched direction.
    #[error("rule '{rule_id}' has no active date in range from {from}")]
    NoActiveDateInRange {
        /// Rule (or team pattern) that was searched.
        rule_id: String,
        /// Date the search started from.
        from: NaiveDate,
    },

    /// A team ID that the configured source does not know.
    #[error("unknown team '{0}'")]
    UnknownTeam(String),

    /// A rule ID missing from the rule catalog.
    #[error("unknown rule '{0}'")]
    UnknownRule(String),

    /// Attempted hard removal of a seeded (protected) rule.
    #[error("rule '{0}' is protected and can only be deactivated")]
    ProtectedRule(String),

    /// A date range whose start is after its end.
    #[error("invalid date range: {start} is after {end}")]
    InvalidRange {
        /// Range start.
        start: NaiveDate,
        /// Range end.
        end: NaiveDate,
    },
}

impl RotationError {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        Self::InvalidConfiguration(message.into())
    }

    pub(crate) fn no_active_date(rule_id: impl Into<String>, from: NaiveDate) -> Self {
        Self::NoActiveDateInRange {
            rule_id: rule_id.into(),
            from,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let e = RotationError::config("scheme start date is not set");
        assert_eq!(
            e.to_string(),
            "invalid configuration: scheme start date is not set"
        );

        let d = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let e = RotationError::no_active_date("weekdays", d);
        assert!(e.to_string().contains("weekdays"));
        assert!(e.to_string().contains("2024-03-01"));
    }
}
