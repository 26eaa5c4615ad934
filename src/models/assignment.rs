//! User-to-team assignment model.
//!
//! An assignment places a user on a team for a date range. Open-ended
//! assignments (`end_date = None`) are permanent. The write path keeps a
//! user's assignments non-overlapping; the engine still tolerates overlaps
//! and reports them.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// Assignment lifecycle state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssignmentStatus {
    /// Created but not yet confirmed.
    #[default]
    Pending,
    /// In force.
    Active,
    /// Past its end date.
    Expired,
    /// Withdrawn.
    Cancelled,
}

/// A time-bounded user-to-team assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserTeamAssignment {
    /// Unique assignment identifier.
    pub id: String,
    /// Assigned user.
    pub user_id: String,
    /// Target team.
    pub team_id: String,
    /// First day (inclusive).
    pub start_date: NaiveDate,
    /// Last day (inclusive); `None` = permanent.
    pub end_date: Option<NaiveDate>,
    /// Lifecycle state.
    pub status: AssignmentStatus,
    /// Recurrence rule the user follows while assigned (informational).
    pub recurrence_rule_id: Option<String>,
    /// Creation timestamp; newest wins when assignments overlap.
    pub created_at: NaiveDateTime,
}

impl UserTeamAssignment {
    /// Creates an active, permanent assignment.
    pub fn new(
        id: impl Into<String>,
        user_id: impl Into<String>,
        team_id: impl Into<String>,
        start_date: NaiveDate,
    ) -> Self {
        Self {
            id: id.into(),
            user_id: user_id.into(),
            team_id: team_id.into(),
            start_date,
            end_date: None,
            status: AssignmentStatus::Active,
            recurrence_rule_id: None,
            created_at: start_date.and_time(NaiveTime::MIN),
        }
    }

    /// Sets the last day.
    pub fn until(mut self, end_date: NaiveDate) -> Self {
        self.end_date = Some(end_date);
        self
    }

    /// Sets the status.
    pub fn with_status(mut self, status: AssignmentStatus) -> Self {
        self.status = status;
        self
    }

    /// Sets the recurrence rule reference.
    pub fn with_rule(mut self, rule_id: impl Into<String>) -> Self {
        self.recurrence_rule_id = Some(rule_id.into());
        self
    }

    /// Sets the creation timestamp.
    pub fn created_at(mut self, at: NaiveDateTime) -> Self {
        self.created_at = at;
        self
    }

    /// Whether the assignment never ends.
    #[inline]
    pub fn is_permanent(&self) -> bool {
        self.end_date.is_none()
    }

    /// Whether `date` lies in `[start_date, end_date]`.
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start_date && self.end_date.is_none_or(|end| date <= end)
    }

    /// Whether two assignments share at least one day.
    pub fn overlaps(&self, other: &Self) -> bool {
        let self_before_other = self.end_date.is_some_and(|end| end < other.start_date);
        let other_before_self = other.end_date.is_some_and(|end| end < self.start_date);
        !self_before_other && !other_before_self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_contains() {
        let a = UserTeamAssignment::new("a1", "u1", "A", d(2024, 1, 1)).until(d(2024, 3, 31));
        assert!(a.contains(d(2024, 1, 1)));
        assert!(a.contains(d(2024, 3, 31)));
        assert!(!a.contains(d(2024, 4, 1)));
        assert!(!a.contains(d(2023, 12, 31)));
        assert!(!a.is_permanent());
    }

    #[test]
    fn test_overlaps() {
        let a = UserTeamAssignment::new("a1", "u1", "A", d(2024, 1, 1)).until(d(2024, 3, 31));
        let b = UserTeamAssignment::new("a2", "u1", "B", d(2024, 4, 1));
        let c = UserTeamAssignment::new("a3", "u1", "C", d(2024, 3, 31));

        assert!(!a.overlaps(&b)); // adjacent, not overlapping
        assert!(a.overlaps(&c)); // share 2024-03-31
        assert!(b.overlaps(&c)); // both open-ended
    }
}
