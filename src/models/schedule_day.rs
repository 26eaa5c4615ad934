//! Computed schedule for one calendar day.
//!
//! A [`WorkScheduleDay`] is derived from configuration, assignments, and
//! exceptions; it is never persisted on its own. Instances are immutable
//! once built and shared behind `Arc` by the cache, so recomputing a day
//! must always yield an equal value.
//!
//! Data-integrity anomalies found while building the day travel with it
//! in [`WorkScheduleDay::anomalies`], in the same way a schedule carries
//! its constraint violations.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use super::Shift;

/// One shift on a given day with the teams (and, for user views, the
/// users) placed on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayShift {
    /// The shift definition.
    pub shift: Shift,
    /// Teams working this shift.
    pub teams: BTreeSet<String>,
    /// Users explicitly placed on this shift (user views only).
    pub users: Vec<UserPlacement>,
}

/// A user's presence on a shift.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPlacement {
    /// User ID.
    pub user_id: String,
    /// Effective start time (differs from the shift on reductions).
    pub start: NaiveTime,
    /// Effective end time.
    pub end: NaiveTime,
    /// Exception that produced or altered this placement.
    pub exception_id: Option<String>,
}

/// Per-user context of a user-oriented day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDayContext {
    /// User ID.
    pub user_id: String,
    /// Team resolved for the user on this date.
    pub team_id: String,
    /// Effective exception that was applied, if any.
    pub applied_exception_id: Option<String>,
}

/// Category of a data-integrity anomaly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnomalyKind {
    /// More than one assignment matched the date for a user.
    AssignmentOverlap,
    /// More than one effective exception matched the date for a user.
    MultipleEffectiveExceptions,
    /// An exception referenced a shift that is not configured.
    UnknownShiftReference,
    /// An assignment referenced a team the source does not know.
    UnknownTeamReference,
}

/// A non-fatal data-integrity finding.
///
/// The engine resolves the situation deterministically and reports it so
/// the source data can be fixed upstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Anomaly {
    /// Category.
    pub kind: AnomalyKind,
    /// Affected user.
    pub user_id: String,
    /// Affected date.
    pub date: NaiveDate,
    /// ID of the record that was used.
    pub chosen_id: Option<String>,
    /// IDs of the records that were set aside.
    pub discarded_ids: Vec<String>,
    /// Human-readable description.
    pub message: String,
}

/// Immutable schedule for one date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkScheduleDay {
    /// The date.
    pub date: NaiveDate,
    /// Position in the source's fixed cycle, when it has one.
    pub day_in_cycle: Option<u32>,
    /// Shifts of the day, in configured order.
    pub shifts: Vec<DayShift>,
    /// Teams not working any shift.
    pub off_teams: BTreeSet<String>,
    /// Present on user-oriented days.
    pub user: Option<UserDayContext>,
    /// Data-integrity findings.
    pub anomalies: Vec<Anomaly>,
}

impl WorkScheduleDay {
    /// Teams working any shift.
    pub fn working_teams(&self) -> BTreeSet<&str> {
        self.shifts
            .iter()
            .flat_map(|s| s.teams.iter().map(String::as_str))
            .collect()
    }

    /// Whether the team works any shift.
    pub fn is_team_working(&self, team_id: &str) -> bool {
        self.shifts.iter().any(|s| s.teams.contains(team_id))
    }

    /// Whether the team is off.
    pub fn is_team_off(&self, team_id: &str) -> bool {
        self.off_teams.contains(team_id)
    }

    /// The shift a team works, if any.
    pub fn shift_for_team(&self, team_id: &str) -> Option<&DayShift> {
        self.shifts.iter().find(|s| s.teams.contains(team_id))
    }

    /// A shift by ID.
    pub fn shift(&self, shift_id: &str) -> Option<&DayShift> {
        self.shifts.iter().find(|s| s.shift.id == shift_id)
    }

    /// Shifts the given user is placed on.
    pub fn shifts_for_user<'a>(&'a self, user_id: &'a str) -> impl Iterator<Item = &'a DayShift> {
        self.shifts
            .iter()
            .filter(move |s| s.users.iter().any(|u| u.user_id == user_id))
    }

    /// Whether the day's user is placed on any shift.
    pub fn is_user_working(&self) -> bool {
        self.user
            .as_ref()
            .is_some_and(|ctx| self.shifts_for_user(&ctx.user_id).next().is_some())
    }

    /// Whether no anomalies were found.
    pub fn is_clean(&self) -> bool {
        self.anomalies.is_empty()
    }

    /// Whether any team works this day.
    pub fn has_work(&self) -> bool {
        self.shifts.iter().any(|s| !s.teams.is_empty())
    }
}

/// Result of a user-oriented computation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DayForUser {
    /// A team was resolved; the day carries the user context.
    Scheduled(Arc<WorkScheduleDay>),
    /// No team could be resolved for the user on this date.
    ///
    /// Distinct from resting: the user has no schedule at all.
    Unassigned {
        /// The date.
        date: NaiveDate,
        /// The user.
        user_id: String,
    },
}

impl DayForUser {
    /// The scheduled day, if any.
    pub fn day(&self) -> Option<&Arc<WorkScheduleDay>> {
        match self {
            Self::Scheduled(day) => Some(day),
            Self::Unassigned { .. } => None,
        }
    }

    /// Whether no team was resolved.
    pub fn is_unassigned(&self) -> bool {
        matches!(self, Self::Unassigned { .. })
    }

    /// Whether the user works at least one shift.
    pub fn is_working(&self) -> bool {
        self.day().is_some_and(|d| d.is_user_working())
    }
}
