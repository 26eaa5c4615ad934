//! Standard 4-2 rotation table.
//!
//! Nine teams rotate through morning, afternoon, and night shifts. Each
//! team follows the same 18-day base sequence
//!
//! ```text
//! day:  0 1 2 3 4 5 6 7 8 9 10 11 12 13 14 15 16 17
//!       M M M M R R A A A A R  R  N  N  N  N  R  R
//! ```
//!
//! shifted by its own offset (team `A` by 0, `B` by 2, ..., `I` by 16).
//! On every day exactly two teams cover each shift and three rest.
//!
//! The table is computed once at construction and then only read.

use std::collections::BTreeSet;
use std::num::NonZeroU32;

use crate::error::{Result, RotationError};
use crate::models::{Shift, Team, STANDARD_TEAM_COUNT};

/// Days after which the standard rotation repeats.
pub const STANDARD_CYCLE_LENGTH: u32 = 18;

const STANDARD_CYCLE: NonZeroU32 = match NonZeroU32::new(STANDARD_CYCLE_LENGTH) {
    Some(len) => len,
    None => unreachable!(),
};

const SHIFT_COUNT: usize = 3;
const TEAMS_PER_SHIFT: usize = 2;

/// A team's state on one day of the cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RotationSlot {
    /// First shift.
    Morning,
    /// Second shift.
    Afternoon,
    /// Third shift.
    Night,
    /// Off.
    Rest,
}

impl RotationSlot {
    /// Index into the table's shift list, `None` for rest.
    #[inline]
    pub fn shift_index(self) -> Option<usize> {
        match self {
            Self::Morning => Some(0),
            Self::Afternoon => Some(1),
            Self::Night => Some(2),
            Self::Rest => None,
        }
    }
}

use RotationSlot::{Afternoon as A, Morning as M, Night as N, Rest as R};

const BASE_SEQUENCE: [RotationSlot; STANDARD_CYCLE_LENGTH as usize] =
    [M, M, M, M, R, R, A, A, A, A, R, R, N, N, N, N, R, R];

/// Static lookup: `rows[day_in_cycle][team_index]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationTable {
    teams: Vec<Team>,
    shifts: Vec<Shift>,
    rows: Vec<Vec<RotationSlot>>,
}

impl RotationTable {
    /// Builds the table for nine teams and three shifts.
    ///
    /// Fails with `InvalidConfiguration` if the counts are wrong or the
    /// team offsets break the coverage invariant (two teams per shift and
    /// three resting, every day).
    pub fn new(teams: Vec<Team>, shifts: Vec<Shift>) -> Result<Self> {
        if teams.len() != STANDARD_TEAM_COUNT {
            return Err(RotationError::config(format!(
                "standard rotation needs {STANDARD_TEAM_COUNT} teams, got {}",
                teams.len()
            )));
        }
        if shifts.len() != SHIFT_COUNT {
            return Err(RotationError::config(format!(
                "standard rotation needs {SHIFT_COUNT} shifts, got {}",
                shifts.len()
            )));
        }

        let len = STANDARD_CYCLE_LENGTH as usize;
        let rows: Vec<Vec<RotationSlot>> = (0..len)
            .map(|day| {
                teams
                    .iter()
                    .map(|t| BASE_SEQUENCE[(day + t.offset_days as usize) % len])
                    .collect()
            })
            .collect();

        for (day, row) in rows.iter().enumerate() {
            let mut per_shift = [0usize; SHIFT_COUNT];
            for slot in row {
                if let Some(i) = slot.shift_index() {
                    per_shift[i] += 1;
                }
            }
            if per_shift.iter().any(|&n| n != TEAMS_PER_SHIFT) {
                return Err(RotationError::config(format!(
                    "team offsets break shift coverage on cycle day {day}: {per_shift:?}"
                )));
            }
        }

        Ok(Self {
            teams,
            shifts,
            rows,
        })
    }

    /// Standard teams `A`..`I` with morning/afternoon/night shifts.
    pub fn standard() -> Result<Self> {
        Self::new(Team::standard_set(), Shift::standard_set())
    }

    /// Days per cycle.
    pub fn cycle_length(&self) -> NonZeroU32 {
        STANDARD_CYCLE
    }

    /// Teams in rotation order.
    pub fn teams(&self) -> &[Team] {
        &self.teams
    }

    /// Shifts in rotation order.
    pub fn shifts(&self) -> &[Shift] {
        &self.shifts
    }

    /// State of one team on a cycle day (`None` for an unknown team).
    pub fn slot(&self, day_in_cycle: u32, team_id: &str) -> Option<RotationSlot> {
        let idx = self.teams.iter().position(|t| t.id == team_id)?;
        Some(self.row(day_in_cycle)[idx])
    }

    /// Shift worked by a team on a cycle day, `None` when resting or unknown.
    pub fn shift_for_team(&self, day_in_cycle: u32, team_id: &str) -> Option<&Shift> {
        self.slot(day_in_cycle, team_id)?
            .shift_index()
            .map(|i| &self.shifts[i])
    }

    /// Teams working each shift, in shift order.
    pub fn teams_for_day(&self, day_in_cycle: u32) -> Vec<(&Shift, BTreeSet<String>)> {
        let row = self.row(day_in_cycle);
        self.shifts
            .iter()
            .enumerate()
            .map(|(i, shift)| {
                let teams = self
                    .teams
                    .iter()
                    .zip(row)
                    .filter(|(_, slot)| slot.shift_index() == Some(i))
                    .map(|(t, _)| t.id.clone())
                    .collect();
                (shift, teams)
            })
            .collect()
    }

    /// Teams off on a cycle day.
    pub fn resting_teams(&self, day_in_cycle: u32) -> BTreeSet<String> {
        self.teams
            .iter()
            .zip(self.row(day_in_cycle))
            .filter(|(_, slot)| **slot == RotationSlot::Rest)
            .map(|(t, _)| t.id.clone())
            .collect()
    }

    fn row(&self, day_in_cycle: u32) -> &[RotationSlot] {
        &self.rows[(day_in_cycle % STANDARD_CYCLE_LENGTH) as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> RotationTable {
        RotationTable::standard().unwrap()
    }

    fn set(ids: &[&str]) -> BTreeSet<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_coverage_invariant() {
        let t = table();
        let all: BTreeSet<String> = t.teams().iter().map(|t| t.id.clone()).collect();

        for day in 0..STANDARD_CYCLE_LENGTH {
            let shifts = t.teams_for_day(day);
            let resting = t.resting_teams(day);
            assert_eq!(resting.len(), 3, "day {day}");

            let mut union = resting.clone();
            let mut total = resting.len();
            for (_, teams) in &shifts {
                assert_eq!(teams.len(), 2, "day {day}");
                total += teams.len();
                union.extend(teams.iter().cloned());
            }
            // pairwise disjoint iff sizes add up to the union size
            assert_eq!(total, union.len(), "day {day}");
            assert_eq!(union, all, "day {day}");
        }
    }

    #[test]
    fn test_day_zero_layout() {
        let t = table();
        let shifts = t.teams_for_day(0);
        assert_eq!(shifts[0].0.id, "morning");
        assert_eq!(shifts[0].1, set(&["A", "B"]));
        assert_eq!(shifts[1].1, set(&["D", "E"]));
        assert_eq!(shifts[2].1, set(&["G", "H"]));
        assert_eq!(t.resting_teams(0), set(&["C", "F", "I"]));
    }

    #[test]
    fn test_four_on_two_off() {
        let t = table();
        let worked: Vec<bool> = (0..STANDARD_CYCLE_LENGTH)
            .map(|d| t.slot(d, "A").unwrap() != RotationSlot::Rest)
            .collect();
        assert_eq!(
            worked,
            vec![
                true, true, true, true, false, false, true, true, true, true, false, false, true,
                true, true, true, false, false
            ]
        );
    }

    #[test]
    fn test_shift_for_team() {
        let t = table();
        assert_eq!(t.shift_for_team(0, "A").unwrap().id, "morning");
        assert_eq!(t.shift_for_team(6, "A").unwrap().id, "afternoon");
        assert!(t.shift_for_team(4, "A").is_none());
        assert!(t.shift_for_team(0, "Z").is_none());
    }

    #[test]
    fn test_cycle_length() {
        assert_eq!(table().cycle_length().get(), STANDARD_CYCLE_LENGTH);
        assert_eq!(STANDARD_CYCLE.get(), 18);
    }

    #[test]
    fn test_day_wraps() {
        let t = table();
        assert_eq!(t.resting_teams(18), t.resting_teams(0));
    }

    #[test]
    fn test_wrong_team_count() {
        let mut teams = Team::standard_set();
        teams.pop();
        let err = RotationTable::new(teams, Shift::standard_set()).unwrap_err();
        assert!(matches!(err, RotationError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_broken_offsets() {
        let teams: Vec<Team> = ('A'..='I').map(|c| Team::new(c.to_string())).collect();
        let err = RotationTable::new(teams, Shift::standard_set()).unwrap_err();
        assert!(err.to_string().contains("coverage"));
    }
}
