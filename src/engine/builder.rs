//! Per-day composition.
//!
//! # Algorithm
//! 1. Base day from the source: `day_in_cycle` via the cycle clock, then
//!    per-team shift/rest from the rotation table or recurrence patterns
//! 2. With a user: resolve the team; none means [`DayForUser::Unassigned`]
//! 3. Place the user on every shift their team works
//! 4. Select and apply the effective exception, if any
//! 5. Freeze the result behind an `Arc`
//!
//! The builder holds borrowed inputs only; it keeps no state between calls.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::warn;

use crate::models::{
    Anomaly, AnomalyKind, DayForUser, ShiftException, UserDayContext, UserPlacement,
    UserTeamAssignment, WorkScheduleDay,
};
use crate::resolve::{AssignmentResolver, ExceptionOverlay};
use crate::source::ScheduleSource;

/// Composes one day from a source, assignments, and exceptions.
#[derive(Debug, Clone, Copy)]
pub struct ScheduleDayBuilder<'a> {
    source: &'a ScheduleSource,
    scheme_start: NaiveDate,
    assignments: &'a [UserTeamAssignment],
    exceptions: &'a [ShiftException],
    resolver: AssignmentResolver,
    overlay: &'a ExceptionOverlay,
}

impl<'a> ScheduleDayBuilder<'a> {
    /// Creates a builder over a source anchored at `scheme_start`.
    pub fn new(
        source: &'a ScheduleSource,
        scheme_start: NaiveDate,
        resolver: AssignmentResolver,
        overlay: &'a ExceptionOverlay,
    ) -> Self {
        Self {
            source,
            scheme_start,
            assignments: &[],
            exceptions: &[],
            resolver,
            overlay,
        }
    }

    /// Sets the assignment history.
    pub fn with_assignments(mut self, assignments: &'a [UserTeamAssignment]) -> Self {
        self.assignments = assignments;
        self
    }

    /// Sets the exceptions.
    pub fn with_exceptions(mut self, exceptions: &'a [ShiftException]) -> Self {
        self.exceptions = exceptions;
        self
    }

    /// Team-oriented day: no user context, no exceptions.
    pub fn build_team_day(&self, date: NaiveDate) -> WorkScheduleDay {
        self.source.base_day(date, self.scheme_start)
    }

    /// Builds the day, for one user when `user_id` is given.
    ///
    /// Without a user the result is always `Scheduled`.
    pub fn build(&self, date: NaiveDate, user_id: Option<&str>) -> DayForUser {
        match user_id {
            None => DayForUser::Scheduled(Arc::new(self.build_team_day(date))),
            Some(user_id) => self.build_for_user(date, user_id),
        }
    }

    fn build_for_user(&self, date: NaiveDate, user_id: &str) -> DayForUser {
        let resolution = self.resolver.team_for(self.assignments, user_id, date);
        let Some(team_id) = resolution.team_id else {
            return DayForUser::Unassigned {
                date,
                user_id: user_id.to_string(),
            };
        };

        let mut day = self.build_team_day(date);
        day.anomalies.extend(resolution.anomaly);

        if self.source.has_team(&team_id) {
            for shift in day.shifts.iter_mut().filter(|s| s.teams.contains(&team_id)) {
                shift.users.push(UserPlacement {
                    user_id: user_id.to_string(),
                    start: shift.shift.start,
                    end: shift.shift.end,
                    exception_id: None,
                });
            }
        } else {
            day.anomalies
                .push(unknown_team(user_id, date, &team_id, resolution.assignment_id));
        }

        day.user = Some(UserDayContext {
            user_id: user_id.to_string(),
            team_id,
            applied_exception_id: None,
        });

        let selection = self.overlay.select(self.exceptions, user_id, date);
        day.anomalies.extend(selection.anomaly);
        if let Some(exception) = selection.chosen {
            let anomaly = self.overlay.apply(&mut day, &exception);
            day.anomalies.extend(anomaly);
        }

        DayForUser::Scheduled(Arc::new(day))
    }
}

fn unknown_team(
    user_id: &str,
    date: NaiveDate,
    team_id: &str,
    assignment_id: Option<String>,
) -> Anomaly {
    warn!(user_id, %date, team_id, "assignment references unknown team");
    Anomaly {
        kind: AnomalyKind::UnknownTeamReference,
        user_id: user_id.to_string(),
        date,
        chosen_id: assignment_id,
        discarded_ids: Vec::new(),
        message: format!("team '{team_id}' is not part of the configured source"),
    }
}
