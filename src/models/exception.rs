//! Shift exception model.
//!
//! An exception is a per-user, per-date deviation from the computed base
//! schedule: an absence, a shift change or swap, a reduced day, or
//! overtime. Exceptions pass through an approval workflow; only
//! *effective* exceptions (approved, or not requiring approval and not
//! rejected) may override the base schedule.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// Kind of deviation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExceptionType {
    /// Planned vacation.
    AbsenceVacation,
    /// Sick leave.
    AbsenceSick,
    /// Other full-day absence (bereavement, jury duty, ...).
    AbsenceSpecial,
    /// Company-directed shift change.
    ChangeCompany,
    /// Shift swap with a colleague.
    ChangeSwap,
    /// Other shift change.
    ChangeSpecial,
    /// Personal reduction of hours.
    ReductionPersonal,
    /// Reduction using accrued leave hours.
    ReductionRol,
    /// Reduction for union activity.
    ReductionUnion,
    /// Extra shift on top of the base schedule.
    Overtime,
    /// Application-defined.
    Custom,
}

impl ExceptionType {
    /// Whether this type removes the user from every shift of the day.
    pub fn is_absence(self) -> bool {
        matches!(
            self,
            Self::AbsenceVacation | Self::AbsenceSick | Self::AbsenceSpecial
        )
    }

    /// Whether this type moves the user to another shift.
    pub fn is_change(self) -> bool {
        matches!(
            self,
            Self::ChangeCompany | Self::ChangeSwap | Self::ChangeSpecial
        )
    }

    /// Whether this type shortens the user's shift.
    pub fn is_reduction(self) -> bool {
        matches!(
            self,
            Self::ReductionPersonal | Self::ReductionRol | Self::ReductionUnion
        )
    }
}

/// Approval workflow state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApprovalStatus {
    /// Awaiting a decision.
    #[default]
    Pending,
    /// Approved.
    Approved,
    /// Rejected.
    Rejected,
}

/// What applying an exception does to the user's day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExceptionEffect {
    /// Remove the user from all shifts.
    RemoveFromAllShifts,
    /// Move the user from their base shift to the given shift.
    ReplaceShift(String),
    /// Keep the base shift with adjusted start/end times.
    AdjustTimes {
        /// New start time.
        start: NaiveTime,
        /// New end time.
        end: NaiveTime,
    },
    /// Place the user on the given shift in addition to any base shift.
    AddShift(String),
    /// Nothing to apply (missing target shift or times).
    NoOp,
}

/// A per-user, per-date override.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftException {
    /// Unique exception identifier.
    pub id: String,
    /// Affected user.
    pub user_id: String,
    /// Affected date.
    pub date: NaiveDate,
    /// Kind of deviation.
    pub exception_type: ExceptionType,
    /// Workflow state.
    pub status: ApprovalStatus,
    /// Whether the exception must be approved before it takes effect.
    pub requires_approval: bool,
    /// Target shift for changes, swaps, and overtime.
    pub target_shift_id: Option<String>,
    /// Adjusted start time for reductions.
    pub new_start: Option<NaiveTime>,
    /// Adjusted end time for reductions.
    pub new_end: Option<NaiveTime>,
    /// Colleague on the other side of a swap.
    pub swap_with_user_id: Option<String>,
    /// Approver ID.
    pub approved_by_id: Option<String>,
    /// Approver display name.
    pub approved_by_name: Option<String>,
    /// Approval timestamp.
    pub approved_at: Option<NaiveDateTime>,
    /// Reason given on rejection.
    pub rejection_reason: Option<String>,
    /// Creation timestamp; used as a deterministic tie-breaker.
    pub created_at: NaiveDateTime,
}

impl ShiftException {
    /// Creates a pending exception that requires approval.
    pub fn new(
        id: impl Into<String>,
        user_id: impl Into<String>,
        date: NaiveDate,
        exception_type: ExceptionType,
    ) -> Self {
        Self {
            id: id.into(),
            user_id: user_id.into(),
            date,
            exception_type,
            status: ApprovalStatus::Pending,
            requires_approval: true,
            target_shift_id: None,
            new_start: None,
            new_end: None,
            swap_with_user_id: None,
            approved_by_id: None,
            approved_by_name: None,
            approved_at: None,
            rejection_reason: None,
            created_at: date.and_time(NaiveTime::MIN),
        }
    }

    /// Sets the target shift.
    pub fn with_target_shift(mut self, shift_id: impl Into<String>) -> Self {
        self.target_shift_id = Some(shift_id.into());
        self
    }

    /// Sets adjusted times.
    pub fn with_times(mut self, start: NaiveTime, end: NaiveTime) -> Self {
        self.new_start = Some(start);
        self.new_end = Some(end);
        self
    }

    /// Sets the swap counterpart.
    pub fn with_swap_partner(mut self, user_id: impl Into<String>) -> Self {
        self.swap_with_user_id = Some(user_id.into());
        self
    }

    /// Sets the creation timestamp.
    pub fn created_at(mut self, at: NaiveDateTime) -> Self {
        self.created_at = at;
        self
    }

    /// Marks the exception as not needing approval.
    pub fn without_approval(mut self) -> Self {
        self.requires_approval = false;
        self
    }

    /// Approves the exception.
    pub fn approve(
        mut self,
        approver_id: impl Into<String>,
        approver_name: impl Into<String>,
        at: NaiveDateTime,
    ) -> Self {
        self.status = ApprovalStatus::Approved;
        self.approved_by_id = Some(approver_id.into());
        self.approved_by_name = Some(approver_name.into());
        self.approved_at = Some(at);
        self.rejection_reason = None;
        self
    }

    /// Rejects the exception.
    pub fn reject(mut self, reason: impl Into<String>) -> Self {
        self.status = ApprovalStatus::Rejected;
        self.rejection_reason = Some(reason.into());
        self.approved_by_id = None;
        self.approved_by_name = None;
        self.approved_at = None;
        self
    }

    /// Whether the exception may override the base schedule.
    pub fn is_effective(&self) -> bool {
        match self.status {
            ApprovalStatus::Approved => true,
            ApprovalStatus::Pending => !self.requires_approval,
            ApprovalStatus::Rejected => false,
        }
    }

    /// The effect of applying this exception.
    pub fn effect(&self) -> ExceptionEffect {
        let ty = self.exception_type;
        if ty.is_absence() {
            return ExceptionEffect::RemoveFromAllShifts;
        }
        if ty.is_change() {
            return match &self.target_shift_id {
                Some(id) => ExceptionEffect::ReplaceShift(id.clone()),
                None => ExceptionEffect::NoOp,
            };
        }
        if ty.is_reduction() {
            return match (self.new_start, self.new_end) {
                (Some(start), Some(end)) => ExceptionEffect::AdjustTimes { start, end },
                _ => ExceptionEffect::NoOp,
            };
        }
        match (&self.target_shift_id, self.new_start, self.new_end) {
            (Some(id), _, _) => ExceptionEffect::AddShift(id.clone()),
            (None, Some(start), Some(end)) => ExceptionEffect::AdjustTimes { start, end },
            _ => ExceptionEffect::NoOp,
        }
    }
}
