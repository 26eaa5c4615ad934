//! Shift model.
//!
//! A shift is a named working window inside one calendar day that may
//! cross midnight (e.g., 21:00–05:00). Durations are in minutes.
//!
//! # Invariants
//! - `start != end` (a zero-length or 24h-ambiguous shift is rejected)
//! - `break_minutes < duration_minutes()` when a break is present
//!
//! Both are checked by [`validate_shift`](crate::validation::validate_shift).

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

const MINUTES_PER_DAY: i64 = 24 * 60;

/// Which engine family a shift belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShiftType {
    /// Ad-hoc shift driven by a recurrence rule.
    Daily,
    /// Shift used by the standard 4-2 rotation.
    #[serde(rename = "CYCLE_42")]
    Cycle42,
}

/// A working window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shift {
    /// Unique shift identifier.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Start time of day.
    pub start: NaiveTime,
    /// End time of day (earlier than `start` when the shift crosses midnight).
    pub end: NaiveTime,
    /// Unpaid break inside the shift.
    pub break_minutes: Option<u32>,
    /// Presentation color (e.g., `"#4CAF50"`).
    pub color: Option<String>,
    /// Engine family.
    pub shift_type: ShiftType,
}

impl Shift {
    /// Creates a shift.
    pub fn new(id: impl Into<String>, start: NaiveTime, end: NaiveTime) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            start,
            end,
            break_minutes: None,
            color: None,
            shift_type: ShiftType::Daily,
        }
    }

    /// Sets the name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the break.
    pub fn with_break(mut self, minutes: u32) -> Self {
        self.break_minutes = Some(minutes);
        self
    }

    /// Sets the color label.
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// Sets the shift type.
    pub fn with_type(mut self, shift_type: ShiftType) -> Self {
        self.shift_type = shift_type;
        self
    }

    /// Standard morning shift, 05:00–13:00.
    pub fn morning() -> Self {
        Self::new("morning", hm(5, 0), hm(13, 0))
            .with_name("Morning")
            .with_type(ShiftType::Cycle42)
    }

    /// Standard afternoon shift, 13:00–21:00.
    pub fn afternoon() -> Self {
        Self::new("afternoon", hm(13, 0), hm(21, 0))
            .with_name("Afternoon")
            .with_type(ShiftType::Cycle42)
    }

    /// Standard night shift, 21:00–05:00.
    pub fn night() -> Self {
        Self::new("night", hm(21, 0), hm(5, 0))
            .with_name("Night")
            .with_type(ShiftType::Cycle42)
    }

    /// The three standard 4-2 shifts in rotation order.
    pub fn standard_set() -> Vec<Shift> {
        vec![Self::morning(), Self::afternoon(), Self::night()]
    }

    /// Whether the shift ends on the following calendar day.
    #[inline]
    pub fn crosses_midnight(&self) -> bool {
        self.end <= self.start
    }

    /// Gross duration in minutes (0 when `start == end`).
    pub fn duration_minutes(&self) -> i64 {
        window_minutes(self.start, self.end)
    }

    /// Duration minus break, in minutes.
    pub fn net_duration_minutes(&self) -> i64 {
        let brk = i64::from(self.break_minutes.unwrap_or(0));
        (self.duration_minutes() - brk).max(0)
    }
}

/// Minutes from `start` to `end`, wrapping past midnight.
pub(crate) fn window_minutes(start: NaiveTime, end: NaiveTime) -> i64 {
    if start == end {
        return 0;
    }
    let s = i64::from(start.num_seconds_from_midnight() / 60);
    let e = i64::from(end.num_seconds_from_midnight() / 60);
    (e - s).rem_euclid(MINUTES_PER_DAY)
}

fn hm(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap_or(NaiveTime::MIN)
}
