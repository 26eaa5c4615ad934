//! Rotation domain models.
//!
//! Input records (teams, shifts, recurrence rules, exceptions, team
//! assignments) and the computed per-day result.
//!
//! # Ownership
//!
//! | Model | Role |
//! |-------|------|
//! | `Team`, `Shift`, `RecurrenceRule` | Shared, read-mostly configuration |
//! | `UserTeamAssignment`, `ShiftException` | In-memory input data |
//! | `WorkScheduleDay` | Derived, immutable, cache-owned |

mod assignment;
mod exception;
mod recurrence;
mod schedule_day;
mod shift;
mod team;

pub use assignment::{AssignmentStatus, UserTeamAssignment};
pub use exception::{ApprovalStatus, ExceptionEffect, ExceptionType, ShiftException};
pub use recurrence::{CycleSpec, Frequency, RecurrenceRule, RuleEnd};
pub use schedule_day::{
    Anomaly, AnomalyKind, DayForUser, DayShift, UserDayContext, UserPlacement, WorkScheduleDay,
};
pub use shift::{Shift, ShiftType};
pub use team::{Team, STANDARD_TEAM_COUNT};

pub(crate) use shift::window_minutes;
