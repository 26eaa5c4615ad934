//! Base schedule sources.
//!
//! A [`ScheduleSource`] answers "which team works which shift on date D"
//! before any assignment or exception is considered. Two variants share
//! one interface:
//!
//! - [`ScheduleSource::Standard42`]: the static 18-day [`RotationTable`]
//!   anchored at the scheme start date
//! - [`ScheduleSource::GenericRecurrence`]: one [`RecurringShift`] per
//!   (team, shift) pair, each driven by a [`RecurrenceRule`]
//!
//! In the generic variant a team with several active patterns on one day
//! works all of those shifts; a team with none is off.

use std::collections::BTreeSet;
use std::num::NonZeroU32;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::cycle::{day_in_cycle, RotationTable};
use crate::error::{Result, RotationError};
use crate::models::{DayShift, Frequency, RecurrenceRule, Shift, Team, WorkScheduleDay};
use crate::recurrence::{self, RuleCatalog};

/// A team working a shift whenever a rule is active.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurringShift {
    /// Team ID.
    pub team_id: String,
    /// Shift ID.
    pub shift_id: String,
    /// Rule ID in the catalog.
    pub rule_id: String,
}

impl RecurringShift {
    /// Creates a pattern entry.
    pub fn new(
        team_id: impl Into<String>,
        shift_id: impl Into<String>,
        rule_id: impl Into<String>,
    ) -> Self {
        Self {
            team_id: team_id.into(),
            shift_id: shift_id.into(),
            rule_id: rule_id.into(),
        }
    }
}

/// A pattern with its shift index and rule resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ResolvedPattern {
    team_id: String,
    shift_index: usize,
    rule: RecurrenceRule,
}

/// Rule-driven schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenericSchedule {
    teams: Vec<Team>,
    shifts: Vec<Shift>,
    patterns: Vec<ResolvedPattern>,
}

impl GenericSchedule {
    /// Resolves pattern references against the catalog.
    ///
    /// Fails with `InvalidConfiguration` on unknown team, shift, or rule IDs.
    pub fn new(
        teams: Vec<Team>,
        shifts: Vec<Shift>,
        patterns: &[RecurringShift],
        catalog: &RuleCatalog,
    ) -> Result<Self> {
        let mut resolved = Vec::with_capacity(patterns.len());
        for p in patterns {
            if !teams.iter().any(|t| t.id == p.team_id) {
                return Err(RotationError::config(format!(
                    "pattern references unknown team '{}'",
                    p.team_id
                )));
            }
            let shift_index = shifts
                .iter()
                .position(|s| s.id == p.shift_id)
                .ok_or_else(|| {
                    RotationError::config(format!(
                        "pattern references unknown shift '{}'",
                        p.shift_id
                    ))
                })?;
            let rule = catalog.get(&p.rule_id).cloned().ok_or_else(|| {
                RotationError::config(format!("pattern references unknown rule '{}'", p.rule_id))
            })?;
            resolved.push(ResolvedPattern {
                team_id: p.team_id.clone(),
                shift_index,
                rule,
            });
        }
        Ok(Self {
            teams,
            shifts,
            patterns: resolved,
        })
    }

    fn patterns_for<'a>(&'a self, team_id: &'a str) -> impl Iterator<Item = &'a ResolvedPattern> {
        self.patterns.iter().filter(move |p| p.team_id == team_id)
    }

    /// Common period when every pattern is a custom cycle.
    fn cycle_length(&self) -> Option<NonZeroU32> {
        if self.patterns.is_empty() {
            return None;
        }
        self.patterns.iter().try_fold(NonZeroU32::MIN, |acc, p| {
            if p.rule.frequency != Frequency::CustomCycle {
                return None;
            }
            let len = NonZeroU32::new(p.rule.cycle?.cycle_length)?;
            NonZeroU32::new(lcm(acc.get(), len.get())?)
        })
    }

    /// Earliest rule start among the patterns; cycle positions count from it.
    fn cycle_anchor(&self) -> Option<NaiveDate> {
        self.patterns.iter().map(|p| p.rule.start_date).min()
    }
}

/// Base schedule source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleSource {
    /// Standard 4-2 rotation.
    Standard42(RotationTable),
    /// Rule-driven schedule.
    GenericRecurrence(GenericSchedule),
}

impl ScheduleSource {
    /// Participating teams.
    pub fn teams(&self) -> &[Team] {
        match self {
            Self::Standard42(table) => table.teams(),
            Self::GenericRecurrence(g) => &g.teams,
        }
    }

    /// Configured shifts in display order.
    pub fn shifts(&self) -> &[Shift] {
        match self {
            Self::Standard42(table) => table.shifts(),
            Self::GenericRecurrence(g) => &g.shifts,
        }
    }

    /// Whether the source knows the team.
    pub fn has_team(&self, team_id: &str) -> bool {
        self.teams().iter().any(|t| t.id == team_id)
    }

    /// Fixed repeat period, if the source has one.
    pub fn cycle_length(&self) -> Option<NonZeroU32> {
        match self {
            Self::Standard42(table) => Some(table.cycle_length()),
            Self::GenericRecurrence(g) => g.cycle_length(),
        }
    }

    /// Position of `date` in the source cycle.
    ///
    /// The standard rotation counts from `scheme_start`. A rule-driven
    /// source counts from the earliest start date of its cycle rules, so
    /// position 0 is the first work day of that rule; when the rules start
    /// on different dates only the earliest one is in phase.
    pub fn day_in_cycle(&self, date: NaiveDate, scheme_start: NaiveDate) -> Option<u32> {
        let len = self.cycle_length()?;
        let anchor = match self {
            Self::Standard42(_) => scheme_start,
            Self::GenericRecurrence(g) => g.cycle_anchor()?,
        };
        Some(day_in_cycle(date, anchor, len))
    }

    /// Team-level schedule for `date` (no user context, no anomalies).
    pub fn base_day(&self, date: NaiveDate, scheme_start: NaiveDate) -> WorkScheduleDay {
        let day_in_cycle = self.day_in_cycle(date, scheme_start);
        let shifts: Vec<DayShift> = match self {
            Self::Standard42(table) => table
                .teams_for_day(day_in_cycle.unwrap_or(0))
                .into_iter()
                .map(|(shift, teams)| DayShift {
                    shift: shift.clone(),
                    teams,
                    users: Vec::new(),
                })
                .collect(),
            Self::GenericRecurrence(g) => g
                .shifts
                .iter()
                .enumerate()
                .map(|(i, shift)| DayShift {
                    shift: shift.clone(),
                    teams: g
                        .patterns
                        .iter()
                        .filter(|p| p.shift_index == i && recurrence::is_active_on(&p.rule, date))
                        .map(|p| p.team_id.clone())
                        .collect(),
                    users: Vec::new(),
                })
                .collect(),
        };

        let off_teams: BTreeSet<String> = self
            .teams()
            .iter()
            .filter(|t| !shifts.iter().any(|s| s.teams.contains(&t.id)))
            .map(|t| t.id.clone())
            .collect();

        WorkScheduleDay {
            date,
            day_in_cycle,
            shifts,
            off_teams,
            user: None,
            anomalies: Vec::new(),
        }
    }

    /// Whether `team_id` works any shift on `date`.
    pub fn is_team_working(
        &self,
        team_id: &str,
        date: NaiveDate,
        scheme_start: NaiveDate,
    ) -> Result<bool> {
        if !self.has_team(team_id) {
            return Err(RotationError::UnknownTeam(team_id.to_string()));
        }
        Ok(match self {
            Self::Standard42(table) => {
                let day = day_in_cycle(date, scheme_start, table.cycle_length());
                table.shift_for_team(day, team_id).is_some()
            }
            Self::GenericRecurrence(g) => g
                .patterns_for(team_id)
                .any(|p| recurrence::is_active_on(&p.rule, date)),
        })
    }

    /// First working day of `team_id` strictly after `from`.
    pub fn next_working_day(
        &self,
        team_id: &str,
        from: NaiveDate,
        scheme_start: NaiveDate,
    ) -> Result<NaiveDate> {
        self.search(team_id, from, scheme_start, Direction::Forward)
    }

    /// Last working day of `team_id` strictly before `from`.
    pub fn previous_working_day(
        &self,
        team_id: &str,
        from: NaiveDate,
        scheme_start: NaiveDate,
    ) -> Result<NaiveDate> {
        self.search(team_id, from, scheme_start, Direction::Backward)
    }

    fn search(
        &self,
        team_id: &str,
        from: NaiveDate,
        scheme_start: NaiveDate,
        direction: Direction,
    ) -> Result<NaiveDate> {
        if !self.has_team(team_id) {
            return Err(RotationError::UnknownTeam(team_id.to_string()));
        }
        let no_match = || RotationError::no_active_date(team_id, from);
        let step = |d: NaiveDate| match direction {
            Direction::Forward => d.succ_opt(),
            Direction::Backward => d.pred_opt(),
        };
        let start = step(from).ok_or_else(no_match)?;

        match self {
            Self::Standard42(table) => {
                let mut date = start;
                for _ in 0..table.cycle_length().get() {
                    if self.is_team_working(team_id, date, scheme_start)? {
                        return Ok(date);
                    }
                    date = step(date).ok_or_else(no_match)?;
                }
                Err(no_match())
            }
            Self::GenericRecurrence(g) => {
                let candidates = g.patterns_for(team_id).filter_map(|p| match direction {
                    Direction::Forward => recurrence::next_active_date(&p.rule, start).ok(),
                    Direction::Backward => recurrence::previous_active_date(&p.rule, start).ok(),
                });
                let best = match direction {
                    Direction::Forward => candidates.min(),
                    Direction::Backward => candidates.max(),
                };
                best.ok_or_else(no_match)
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Direction {
    Forward,
    Backward,
}

fn gcd(a: u32, b: u32) -> u32 {
    if b == 0 {
        a
    } else {
        gcd(b, a % b)
    }
}

fn lcm(a: u32, b: u32) -> Option<u32> {
    (a / gcd(a, b)).checked_mul(b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn standard() -> ScheduleSource {
        ScheduleSource::Standard42(RotationTable::standard().unwrap())
    }

    fn generic() -> ScheduleSource {
        let start = d(2024, 1, 1);
        let catalog = RuleCatalog::new()
            .with_rule(RecurrenceRule::custom_cycle("a-cycle", start, 6, 4, 2))
            .with_rule(RecurrenceRule::weekly("b-weekend", start, &[Weekday::Sat]));
        let teams = vec![Team::new("A"), Team::new("B")];
        let shifts = vec![Shift::morning(), Shift::night()];
        let patterns = vec![
            RecurringShift::new("A", "morning", "a-cycle"),
            RecurringShift::new("B", "night", "b-weekend"),
        ];
        ScheduleSource::GenericRecurrence(
            GenericSchedule::new(teams, shifts, &patterns, &catalog).unwrap(),
        )
    }

    #[test]
    fn test_standard_base_day() {
        let start = d(2024, 1, 1);
        let day = standard().base_day(start, start);
        assert_eq!(day.day_in_cycle, Some(0));
        assert_eq!(day.shifts.len(), 3);
        assert_eq!(day.off_teams.len(), 3);
        assert!(day.is_team_working("A"));
        assert!(day.is_team_off("C"));
    }

    #[test]
    fn test_generic_base_day() {
        let source = generic();
        let start = d(2024, 1, 1);
        // 2024-01-06 is a Saturday and day 5 of A's cycle (rest)
        let day = source.base_day(d(2024, 1, 6), start);
        assert!(day.is_team_off("A"));
        assert_eq!(day.shift_for_team("B").unwrap().shift.id, "night");
        assert_eq!(day.day_in_cycle, None);

        let day = source.base_day(d(2024, 1, 2), start);
        assert_eq!(day.shift_for_team("A").unwrap().shift.id, "morning");
        assert!(day.is_team_off("B"));
    }

    #[test]
    fn test_generic_unknown_reference() {
        let catalog = RuleCatalog::new();
        let err = GenericSchedule::new(
            vec![Team::new("A")],
            vec![Shift::morning()],
            &[RecurringShift::new("A", "morning", "missing")],
            &catalog,
        )
        .unwrap_err();
        assert!(err.to_string().contains("missing"));
    }

    #[test]
    fn test_generic_cycle_length_lcm() {
        let start = d(2024, 1, 1);
        let catalog = RuleCatalog::new()
            .with_rule(RecurrenceRule::custom_cycle("six", start, 6, 4, 2))
            .with_rule(RecurrenceRule::custom_cycle("four", start, 4, 2, 2));
        let g = GenericSchedule::new(
            vec![Team::new("A"), Team::new("B")],
            vec![Shift::morning()],
            &[
                RecurringShift::new("A", "morning", "six"),
                RecurringShift::new("B", "morning", "four"),
            ],
            &catalog,
        )
        .unwrap();
        let source = ScheduleSource::GenericRecurrence(g);
        assert_eq!(source.cycle_length().map(NonZeroU32::get), Some(12));
        assert_eq!(source.day_in_cycle(d(2023, 12, 31), start), Some(11));
    }

    #[test]
    fn test_generic_day_in_cycle_follows_rule_start() {
        let rule_start = d(2024, 1, 1);
        let scheme_start = d(2024, 1, 3);
        let catalog =
            RuleCatalog::new().with_rule(RecurrenceRule::custom_cycle("six", rule_start, 6, 4, 2));
        let g = GenericSchedule::new(
            vec![Team::new("A")],
            vec![Shift::morning()],
            &[RecurringShift::new("A", "morning", "six")],
            &catalog,
        )
        .unwrap();
        let source = ScheduleSource::GenericRecurrence(g);

        assert_eq!(source.day_in_cycle(rule_start, scheme_start), Some(0));
        // first rest day of the rule is position 4
        let rest = d(2024, 1, 5);
        assert_eq!(source.day_in_cycle(rest, scheme_start), Some(4));
        assert!(!source.is_team_working("A", rest, scheme_start).unwrap());
        assert_eq!(source.base_day(rest, scheme_start).day_in_cycle, Some(4));
    }

    #[test]
    fn test_next_and_previous_working_day() {
        let source = standard();
        let start = d(2024, 1, 1);
        // A rests on cycle days 4-5
        assert_eq!(
            source.next_working_day("A", d(2024, 1, 4), start).unwrap(),
            d(2024, 1, 7)
        );
        assert_eq!(
            source.previous_working_day("A", d(2024, 1, 7), start).unwrap(),
            d(2024, 1, 4)
        );
        assert_eq!(
            source.next_working_day("Z", start, start).unwrap_err(),
            RotationError::UnknownTeam("Z".into())
        );

        let g = generic();
        assert_eq!(g.next_working_day("B", start, start).unwrap(), d(2024, 1, 6));
        assert_eq!(g.previous_working_day("B", d(2024, 1, 13), start).unwrap(), d(2024, 1, 6));
        assert!(g.previous_working_day("B", d(2024, 1, 6), start).is_err());
    }

    #[test]
    fn test_lcm() {
        assert_eq!(lcm(6, 4), Some(12));
        assert_eq!(lcm(18, 1), Some(18));
        assert_eq!(gcd(18, 12), 6);
    }
}
