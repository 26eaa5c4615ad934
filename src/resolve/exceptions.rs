//! Exception overlay.
//!
//! Selects the effective exception for a user on a date and applies it
//! to that user's placement on the computed day.
//!
//! # Ordering
//! Effective exceptions are ordered by:
//! 1. [`ExceptionPriority`] rank (lower rank first)
//! 2. `created_at`, newest first
//! 3. ID, greatest first
//!
//! The first one is applied. Any others are a data-integrity anomaly and
//! are reported, never merged.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::models::{
    Anomaly, AnomalyKind, ExceptionEffect, ExceptionType, ShiftException, UserPlacement,
    WorkScheduleDay,
};

/// Priority ranking among exception types, highest first.
///
/// Types missing from the list rank below every listed type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExceptionPriority {
    order: Vec<ExceptionType>,
}

impl ExceptionPriority {
    /// Creates a ranking from highest to lowest.
    pub fn new(order: Vec<ExceptionType>) -> Self {
        Self { order }
    }

    /// Rank of a type (0 = highest).
    pub fn rank(&self, ty: ExceptionType) -> usize {
        self.order
            .iter()
            .position(|t| *t == ty)
            .unwrap_or(self.order.len())
    }
}

impl Default for ExceptionPriority {
    /// Absences, then changes, then reductions, then overtime and custom.
    fn default() -> Self {
        use ExceptionType::*;
        Self::new(vec![
            AbsenceSick,
            AbsenceVacation,
            AbsenceSpecial,
            ChangeCompany,
            ChangeSwap,
            ChangeSpecial,
            ReductionPersonal,
            ReductionRol,
            ReductionUnion,
            Overtime,
            Custom,
        ])
    }
}

/// Outcome of selecting an exception.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExceptionSelection {
    /// Exception to apply.
    pub chosen: Option<ShiftException>,
    /// Report when several exceptions competed.
    pub anomaly: Option<Anomaly>,
}

/// Applies effective exceptions on top of the base schedule.
#[derive(Debug, Clone, Default)]
pub struct ExceptionOverlay {
    priority: ExceptionPriority,
}

impl ExceptionOverlay {
    /// Creates an overlay with a priority ranking.
    pub fn new(priority: ExceptionPriority) -> Self {
        Self { priority }
    }

    /// Effective exceptions of `user_id` on `date`, highest priority first.
    pub fn effective_exceptions_for<'a>(
        &self,
        exceptions: &'a [ShiftException],
        user_id: &str,
        date: NaiveDate,
    ) -> Vec<&'a ShiftException> {
        let mut found: Vec<&ShiftException> = exceptions
            .iter()
            .filter(|e| e.user_id == user_id && e.date == date && e.is_effective())
            .collect();
        found.sort_by(|a, b| {
            self.priority
                .rank(a.exception_type)
                .cmp(&self.priority.rank(b.exception_type))
                .then_with(|| b.created_at.cmp(&a.created_at))
                .then_with(|| b.id.cmp(&a.id))
        });
        found
    }

    /// The exception to apply, plus a report if others competed.
    pub fn select(
        &self,
        exceptions: &[ShiftException],
        user_id: &str,
        date: NaiveDate,
    ) -> ExceptionSelection {
        let found = self.effective_exceptions_for(exceptions, user_id, date);
        let Some((chosen, rest)) = found.split_first() else {
            return ExceptionSelection::default();
        };

        let anomaly = (!rest.is_empty()).then(|| {
            let discarded: Vec<String> = rest.iter().map(|e| e.id.clone()).collect();
            warn!(
                user_id,
                %date,
                chosen = %chosen.id,
                discarded = ?discarded,
                "multiple effective exceptions"
            );
            Anomaly {
                kind: AnomalyKind::MultipleEffectiveExceptions,
                user_id: user_id.to_string(),
                date,
                chosen_id: Some(chosen.id.clone()),
                message: format!(
                    "{} effective exceptions on {date}; applying '{}' ({:?})",
                    found.len(),
                    chosen.id,
                    chosen.exception_type
                ),
                discarded_ids: discarded,
            }
        });

        ExceptionSelection {
            chosen: Some((*chosen).clone()),
            anomaly,
        }
    }

    /// Applies `exception` to the user's placements on `day`.
    ///
    /// Returns an `UnknownShiftReference` anomaly when the target shift is
    /// not part of the day; the base placement is then left untouched.
    pub fn apply(&self, day: &mut WorkScheduleDay, exception: &ShiftException) -> Option<Anomaly> {
        let user_id = exception.user_id.as_str();
        if let Some(ctx) = day.user.as_mut() {
            ctx.applied_exception_id = Some(exception.id.clone());
        }

        match exception.effect() {
            ExceptionEffect::RemoveFromAllShifts => {
                remove_user(day, user_id);
                None
            }
            ExceptionEffect::ReplaceShift(target) => {
                if day.shift(&target).is_none() {
                    return Some(unknown_shift(day.date, exception, &target));
                }
                remove_user(day, user_id);
                place_user(day, exception, &target);
                None
            }
            ExceptionEffect::AddShift(target) => {
                if day.shift(&target).is_none() {
                    return Some(unknown_shift(day.date, exception, &target));
                }
                place_user(day, exception, &target);
                None
            }
            ExceptionEffect::AdjustTimes { start, end } => {
                for placement in day
                    .shifts
                    .iter_mut()
                    .flat_map(|s| s.users.iter_mut())
                    .filter(|u| u.user_id == user_id)
                {
                    placement.start = start;
                    placement.end = end;
                    placement.exception_id = Some(exception.id.clone());
                }
                None
            }
            ExceptionEffect::NoOp => None,
        }
    }
}

fn remove_user(day: &mut WorkScheduleDay, user_id: &str) {
    for shift in &mut day.shifts {
        shift.users.retain(|u| u.user_id != user_id);
    }
}

fn place_user(day: &mut WorkScheduleDay, exception: &ShiftException, shift_id: &str) {
    if let Some(target) = day.shifts.iter_mut().find(|s| s.shift.id == shift_id) {
        if target.users.iter().any(|u| u.user_id == exception.user_id) {
            return;
        }
        target.users.push(UserPlacement {
            user_id: exception.user_id.clone(),
            start: target.shift.start,
            end: target.shift.end,
            exception_id: Some(exception.id.clone()),
        });
    }
}

fn unknown_shift(date: NaiveDate, exception: &ShiftException, shift_id: &str) -> Anomaly {
    warn!(
        user_id = %exception.user_id,
        %date,
        exception = %exception.id,
        shift_id,
        "exception targets unknown shift"
    );
    Anomaly {
        kind: AnomalyKind::UnknownShiftReference,
        user_id: exception.user_id.clone(),
        date,
        chosen_id: Some(exception.id.clone()),
        discarded_ids: Vec::new(),
        message: format!(
            "exception '{}' targets shift '{shift_id}' which is not scheduled",
            exception.id
        ),
    }
}
