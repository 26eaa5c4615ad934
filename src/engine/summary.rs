//! Workload summaries over a date range.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Working days | Days with at least one shift |
//! | Rest days | Days with no shift (assigned days only, for users) |
//! | Unassigned days | Days with no resolved team (users only) |
//! | Shift days | Per-shift count of days worked |
//! | Net minutes | Sum of worked time minus breaks |
//!
//! Breaks are deducted only from full shifts; a placement whose times
//! were adjusted by an exception counts its window as is.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{window_minutes, DayForUser, DayShift, UserPlacement, WorkScheduleDay};

/// Workload over a date range.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleSummary {
    /// Days with at least one shift.
    pub working_days: u32,
    /// Days off.
    pub rest_days: u32,
    /// Days without a resolved team.
    pub unassigned_days: u32,
    /// Days worked per shift ID.
    pub shift_days: BTreeMap<String, u32>,
    /// Net worked minutes.
    pub net_minutes: i64,
}

impl ScheduleSummary {
    /// Summarizes a team over computed team days.
    pub fn for_team<'a>(
        days: impl IntoIterator<Item = &'a WorkScheduleDay>,
        team_id: &str,
    ) -> Self {
        let mut summary = Self::default();
        for day in days {
            let worked: Vec<&DayShift> =
                day.shifts.iter().filter(|s| s.teams.contains(team_id)).collect();
            summary.count_day(&worked);
            summary.net_minutes += worked
                .iter()
                .map(|s| s.shift.net_duration_minutes())
                .sum::<i64>();
        }
        summary
    }

    /// Summarizes one user over computed user days.
    pub fn for_user<'a>(days: impl IntoIterator<Item = (&'a NaiveDate, &'a DayForUser)>) -> Self {
        let mut summary = Self::default();
        for (_, result) in days {
            let Some(day) = result.day() else {
                summary.unassigned_days += 1;
                continue;
            };
            let Some(user_id) = day.user.as_ref().map(|ctx| ctx.user_id.as_str()) else {
                continue;
            };
            let worked: Vec<&DayShift> = day.shifts_for_user(user_id).collect();
            summary.count_day(&worked);
            for shift in &worked {
                summary.net_minutes += shift
                    .users
                    .iter()
                    .filter(|p| p.user_id == user_id)
                    .map(|p| placement_minutes(shift, p))
                    .sum::<i64>();
            }
        }
        summary
    }

    fn count_day(&mut self, worked: &[&DayShift]) {
        if worked.is_empty() {
            self.rest_days += 1;
            return;
        }
        self.working_days += 1;
        for shift in worked {
            *self.shift_days.entry(shift.shift.id.clone()).or_insert(0) += 1;
        }
    }

    /// Net worked hours.
    pub fn net_hours(&self) -> f64 {
        self.net_minutes as f64 / 60.0
    }
}

fn placement_minutes(shift: &DayShift, placement: &UserPlacement) -> i64 {
    if placement.start == shift.shift.start && placement.end == shift.shift.end {
        shift.shift.net_duration_minutes()
    } else {
        window_minutes(placement.start, placement.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cycle::RotationTable;
    use crate::source::ScheduleSource;
    use chrono::NaiveTime;
    use std::sync::Arc;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_team_summary_over_one_cycle() {
        let src = ScheduleSource::Standard42(RotationTable::standard().unwrap());
        let start = d(2024, 1, 1);
        let days: Vec<WorkScheduleDay> = start
            .iter_days()
            .take(18)
            .map(|date| src.base_day(date, start))
            .collect();

        let s = ScheduleSummary::for_team(&days, "A");
        assert_eq!(s.working_days, 12);
        assert_eq!(s.rest_days, 6);
        assert_eq!(s.shift_days.get("morning"), Some(&4));
        assert_eq!(s.shift_days.get("afternoon"), Some(&4));
        assert_eq!(s.shift_days.get("night"), Some(&4));
        assert_eq!(s.net_minutes, 12 * 8 * 60);
        assert!((s.net_hours() - 96.0).abs() < 1e-9);
    }

    #[test]
    fn test_user_summary_counts_unassigned_and_reductions() {
        let src = ScheduleSource::Standard42(RotationTable::standard().unwrap());
        let start = d(2024, 1, 1);
        let mut worked = src.base_day(start, start);
        let morning = worked.shift("morning").unwrap().shift.clone();
        worked.shifts[0].users.push(UserPlacement {
            user_id: "u1".into(),
            start: morning.start,
            end: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            exception_id: Some("red".into()),
        });
        worked.user = Some(crate::models::UserDayContext {
            user_id: "u1".into(),
            team_id: "A".into(),
            applied_exception_id: Some("red".into()),
        });

        let mut days = BTreeMap::new();
        days.insert(start, DayForUser::Scheduled(Arc::new(worked)));
        days.insert(
            d(2024, 1, 2),
            DayForUser::Unassigned {
                date: d(2024, 1, 2),
                user_id: "u1".into(),
            },
        );

        let s = ScheduleSummary::for_user(&days);
        assert_eq!(s.working_days, 1);
        assert_eq!(s.unassigned_days, 1);
        assert_eq!(s.net_minutes, 4 * 60);
    }
}
