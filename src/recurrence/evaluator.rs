//! Recurrence pattern evaluator.
//!
//! # Termination
//! Every searching function is bounded by [`period_days`]: an open-ended
//! rule that has any occurrence at all has one within that many days of
//! any date on or after its start. Bounded rules additionally stop at
//! their end date and report [`RotationError::NoActiveDateInRange`].

use std::num::NonZeroU32;

use chrono::{Datelike, Duration, NaiveDate};

use crate::cycle::{day_in_cycle, day_index};
use crate::error::{Result, RotationError};
use crate::models::{Frequency, RecurrenceRule};

/// Whether `rule` produces an occurrence on `date`.
///
/// # Example
/// ```
/// use chrono::NaiveDate;
/// use u_rotation::models::RecurrenceRule;
/// use u_rotation::recurrence::is_active_on;
///
/// let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
/// let rule = RecurrenceRule::custom_cycle("4-2", start, 6, 4, 2);
/// assert!(is_active_on(&rule, NaiveDate::from_ymd_opt(2024, 1, 4).unwrap()));
/// assert!(!is_active_on(&rule, NaiveDate::from_ymd_opt(2024, 1, 5).unwrap()));
/// ```
pub fn is_active_on(rule: &RecurrenceRule, date: NaiveDate) -> bool {
    if !rule.active || !rule.covers(date) {
        return false;
    }
    let start = rule.start_date;
    let interval = i64::from(rule.interval.max(1));

    match rule.frequency {
        Frequency::Daily => day_index(date, start) % interval == 0,
        Frequency::Weekly => {
            let weekday = date.weekday();
            let on_day = if rule.by_weekday.is_empty() {
                weekday == start.weekday()
            } else {
                rule.by_weekday.contains(&weekday)
            };
            on_day && week_offset(start, date) % interval == 0
        }
        Frequency::Monthly => {
            let target = rule.by_month_day.unwrap_or_else(|| start.day());
            month_offset(start, date) % interval == 0
                && date.day() == target.min(days_in_month(date.year(), date.month()))
        }
        Frequency::Yearly => {
            i64::from(date.year() - start.year()) % interval == 0
                && date.month() == start.month()
                && date.day() == start.day().min(days_in_month(date.year(), date.month()))
        }
        Frequency::CustomCycle => match rule.cycle {
            Some(layout) if layout.is_consistent() => NonZeroU32::new(layout.cycle_length)
                .is_some_and(|len| day_in_cycle(date, start, len) < layout.work_days),
            _ => false,
        },
    }
}

/// Search horizon in days for `rule`.
pub fn period_days(rule: &RecurrenceRule) -> u32 {
    let interval = rule.interval.max(1);
    match rule.frequency {
        Frequency::Daily => interval,
        Frequency::Weekly => 7 * interval,
        Frequency::Monthly => 31 * (interval + 1),
        Frequency::Yearly => 366 * (interval + 1),
        Frequency::CustomCycle => rule.cycle.map_or(1, |c| c.cycle_length.max(1)),
    }
}

/// First occurrence on or after `from`.
pub fn next_active_date(rule: &RecurrenceRule, from: NaiveDate) -> Result<NaiveDate> {
    let no_match = || RotationError::no_active_date(&rule.id, from);
    let begin = from.max(rule.start_date);
    if rule.end_date().is_some_and(|end| begin > end) {
        return Err(no_match());
    }

    let mut date = begin;
    for _ in 0..period_days(rule) {
        if !rule.covers(date) {
            break;
        }
        if is_active_on(rule, date) {
            return Ok(date);
        }
        date = date.succ_opt().ok_or_else(no_match)?;
    }
    Err(no_match())
}

/// Last occurrence on or before `from`.
pub fn previous_active_date(rule: &RecurrenceRule, from: NaiveDate) -> Result<NaiveDate> {
    let no_match = || RotationError::no_active_date(&rule.id, from);
    let begin = rule.end_date().map_or(from, |end| from.min(end));
    if begin < rule.start_date {
        return Err(no_match());
    }

    let mut date = begin;
    for _ in 0..period_days(rule) {
        if !rule.covers(date) {
            break;
        }
        if is_active_on(rule, date) {
            return Ok(date);
        }
        date = date.pred_opt().ok_or_else(no_match)?;
    }
    Err(no_match())
}

/// All occurrences in `[start, end]`.
pub fn occurrences_between(
    rule: &RecurrenceRule,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<NaiveDate>> {
    if start > end {
        return Err(RotationError::InvalidRange { start, end });
    }
    Ok(start
        .iter_days()
        .take_while(|d| *d <= end)
        .filter(|d| is_active_on(rule, *d))
        .collect())
}

/// Whole weeks between the Mondays of `start`'s and `date`'s weeks.
fn week_offset(start: NaiveDate, date: NaiveDate) -> i64 {
    let monday = |d: NaiveDate| d - Duration::days(i64::from(d.weekday().num_days_from_monday()));
    day_index(monday(date), monday(start)).div_euclid(7)
}

fn month_offset(start: NaiveDate, date: NaiveDate) -> i64 {
    let months = |d: NaiveDate| i64::from(d.year()) * 12 + i64::from(d.month0());
    months(date) - months(start)
}

fn days_in_month(year: i32, month: u32) -> u32 {
    let (y, m) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(y, m, 1)
        .and_then(|first| first.pred_opt())
        .map_or(31, |last| last.day())
}
