//! Input validation for rotation configuration and data.
//!
//! Checks structural integrity before records reach the engine. Detects:
//! - Duplicate IDs
//! - Shift time invariants (`start != end`, break shorter than the shift)
//! - Rule invariants (interval, cycle layout, end after start)
//! - Dangling team / shift / rule references
//! - Assignment date order and per-user overlaps (write-time checks)
//!
//! Every check runs; all findings are returned together.

use std::collections::HashSet;

use crate::models::{
    AssignmentStatus, ExceptionEffect, Frequency, RecurrenceRule, Shift, ShiftException, Team,
    UserTeamAssignment,
};
use crate::recurrence::RuleCatalog;
use crate::source::RecurringShift;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two entities share the same ID.
    DuplicateId,
    /// Shift start equals shift end.
    InvalidShiftTimes,
    /// Break is not shorter than the shift.
    BreakTooLong,
    /// Rule interval is zero.
    InvalidInterval,
    /// Custom cycle missing or inconsistent.
    InvalidCycle,
    /// An end date precedes its start date.
    InvalidDateRange,
    /// Day of month outside `1..=31`.
    InvalidMonthDay,
    /// Two counting assignments of one user share a day.
    OverlappingAssignment,
    /// Reference to a team that doesn't exist.
    InvalidTeamReference,
    /// Reference to a shift that doesn't exist.
    InvalidShiftReference,
    /// Reference to a rule that doesn't exist.
    InvalidRuleReference,
    /// An exception lacks the data its type needs.
    IncompleteException,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

fn finish(errors: Vec<ValidationError>) -> ValidationResult {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validates one shift.
pub fn validate_shift(shift: &Shift) -> ValidationResult {
    let mut errors = Vec::new();
    check_shift(shift, &mut errors);
    finish(errors)
}

fn check_shift(shift: &Shift, errors: &mut Vec<ValidationError>) {
    if shift.start == shift.end {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidShiftTimes,
            format!("Shift '{}' starts and ends at {}", shift.id, shift.start),
        ));
        return;
    }
    if let Some(brk) = shift.break_minutes {
        if i64::from(brk) >= shift.duration_minutes() {
            errors.push(ValidationError::new(
                ValidationErrorKind::BreakTooLong,
                format!(
                    "Shift '{}' break of {brk} min is not shorter than its {} min duration",
                    shift.id,
                    shift.duration_minutes()
                ),
            ));
        }
    }
}

/// Validates one recurrence rule.
pub fn validate_rule(rule: &RecurrenceRule) -> ValidationResult {
    let mut errors = Vec::new();
    check_rule(rule, &mut errors);
    finish(errors)
}

fn check_rule(rule: &RecurrenceRule, errors: &mut Vec<ValidationError>) {
    if rule.interval == 0 {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidInterval,
            format!("Rule '{}' has interval 0", rule.id),
        ));
    }
    if rule.end_date().is_some_and(|end| end < rule.start_date) {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidDateRange,
            format!("Rule '{}' ends before it starts", rule.id),
        ));
    }
    if rule.frequency == Frequency::CustomCycle {
        match rule.cycle {
            None => errors.push(ValidationError::new(
                ValidationErrorKind::InvalidCycle,
                format!("Custom cycle rule '{}' has no cycle layout", rule.id),
            )),
            Some(layout) if !layout.is_consistent() => errors.push(ValidationError::new(
                ValidationErrorKind::InvalidCycle,
                format!(
                    "Rule '{}': cycle of {} days cannot hold {} work + {} rest days",
                    rule.id, layout.cycle_length, layout.work_days, layout.rest_days
                ),
            )),
            Some(_) => {}
        }
    }
    if let Some(day) = rule.by_month_day {
        if !(1..=31).contains(&day) {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidMonthDay,
                format!("Rule '{}' has day of month {day}", rule.id),
            ));
        }
    }
}

/// Validates engine configuration.
///
/// Checks:
/// 1. No duplicate team, shift, or rule IDs
/// 2. Every shift and rule satisfies its invariants
/// 3. Every pattern references an existing team, shift, and rule
pub fn validate_config(
    teams: &[Team],
    shifts: &[Shift],
    rules: &RuleCatalog,
    patterns: &[RecurringShift],
) -> ValidationResult {
    let mut errors = Vec::new();

    let team_ids = collect_ids(teams.iter().map(|t| t.id.as_str()), "team", &mut errors);
    let shift_ids = collect_ids(shifts.iter().map(|s| s.id.as_str()), "shift", &mut errors);

    for shift in shifts {
        check_shift(shift, &mut errors);
    }
    for rule in rules.iter() {
        check_rule(rule, &mut errors);
    }

    for p in patterns {
        if !team_ids.contains(p.team_id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidTeamReference,
                format!("Pattern references unknown team '{}'", p.team_id),
            ));
        }
        if !shift_ids.contains(p.shift_id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidShiftReference,
                format!("Pattern references unknown shift '{}'", p.shift_id),
            ));
        }
        if rules.get(&p.rule_id).is_none() {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidRuleReference,
                format!("Pattern references unknown rule '{}'", p.rule_id),
            ));
        }
    }

    finish(errors)
}

/// Write-time check of team assignments.
///
/// Checks:
/// 1. No duplicate assignment IDs
/// 2. `end_date >= start_date`
/// 3. Referenced teams exist
/// 4. A user's `Active`/`Pending` assignments do not overlap
pub fn validate_assignments(assignments: &[UserTeamAssignment], teams: &[Team]) -> ValidationResult {
    let mut errors = Vec::new();
    collect_ids(assignments.iter().map(|a| a.id.as_str()), "assignment", &mut errors);

    for a in assignments {
        if a.end_date.is_some_and(|end| end < a.start_date) {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidDateRange,
                format!("Assignment '{}' ends before it starts", a.id),
            ));
        }
        if !teams.iter().any(|t| t.id == a.team_id) {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidTeamReference,
                format!("Assignment '{}' references unknown team '{}'", a.id, a.team_id),
            ));
        }
    }

    let live: Vec<&UserTeamAssignment> = assignments
        .iter()
        .filter(|a| matches!(a.status, AssignmentStatus::Active | AssignmentStatus::Pending))
        .collect();
    for (i, a) in live.iter().enumerate() {
        for b in &live[i + 1..] {
            if a.user_id == b.user_id && a.overlaps(b) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::OverlappingAssignment,
                    format!(
                        "Assignments '{}' and '{}' of user '{}' overlap",
                        a.id, b.id, a.user_id
                    ),
                ));
            }
        }
    }

    finish(errors)
}

/// Write-time check of shift exceptions.
///
/// Checks:
/// 1. No duplicate exception IDs
/// 2. Changes, swaps, and reductions carry the data they need
/// 3. Target shifts exist
pub fn validate_exceptions(exceptions: &[ShiftException], shifts: &[Shift]) -> ValidationResult {
    let mut errors = Vec::new();
    collect_ids(exceptions.iter().map(|e| e.id.as_str()), "exception", &mut errors);

    for e in exceptions {
        let target = match e.effect() {
            ExceptionEffect::ReplaceShift(id) | ExceptionEffect::AddShift(id) => Some(id),
            ExceptionEffect::NoOp => {
                errors.push(ValidationError::new(
                    ValidationErrorKind::IncompleteException,
                    format!(
                        "Exception '{}' ({:?}) has no target shift or times",
                        e.id, e.exception_type
                    ),
                ));
                None
            }
            ExceptionEffect::RemoveFromAllShifts | ExceptionEffect::AdjustTimes { .. } => None,
        };
        if let Some(id) = target {
            if !shifts.iter().any(|s| s.id == id) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidShiftReference,
                    format!("Exception '{}' targets unknown shift '{id}'", e.id),
                ));
            }
        }
    }

    finish(errors)
}

fn collect_ids<'a>(
    ids: impl Iterator<Item = &'a str>,
    what: &str,
    errors: &mut Vec<ValidationError>,
) -> HashSet<&'a str> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate {what} ID: {id}"),
            ));
        }
    }
    seen
}
