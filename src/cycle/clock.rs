//! Date to cycle-position mapping.

use std::num::NonZeroU32;

use chrono::NaiveDate;

/// Whole days from `scheme_start` to `date` (negative before the start).
///
/// # Example
/// ```
/// use chrono::NaiveDate;
/// use u_rotation::cycle::day_index;
///
/// let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
/// let before = NaiveDate::from_ymd_opt(2023, 12, 31).unwrap();
/// assert_eq!(day_index(before, start), -1);
/// ```
#[inline]
pub fn day_index(date: NaiveDate, scheme_start: NaiveDate) -> i64 {
    date.signed_duration_since(scheme_start).num_days()
}

/// Zero-based position of `date` inside a cycle of `cycle_length` days.
///
/// Always in `[0, cycle_length)`, including for dates before the start.
#[inline]
pub fn day_in_cycle(date: NaiveDate, scheme_start: NaiveDate, cycle_length: NonZeroU32) -> u32 {
    let len = i64::from(cycle_length.get());
    // rem_euclid with a positive modulus lies in [0, len)
    day_index(date, scheme_start).rem_euclid(len) as u32
}

/// A cycle anchored at a scheme start date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleClock {
    scheme_start: NaiveDate,
    cycle_length: NonZeroU32,
}

impl CycleClock {
    /// Creates a clock.
    pub fn new(scheme_start: NaiveDate, cycle_length: NonZeroU32) -> Self {
        Self {
            scheme_start,
            cycle_length,
        }
    }

    /// The anchor date.
    pub fn scheme_start(&self) -> NaiveDate {
        self.scheme_start
    }

    /// Days per cycle.
    pub fn cycle_length(&self) -> u32 {
        self.cycle_length.get()
    }

    /// See [`day_index`].
    pub fn day_index(&self, date: NaiveDate) -> i64 {
        day_index(date, self.scheme_start)
    }

    /// See [`day_in_cycle`].
    pub fn day_in_cycle(&self, date: NaiveDate) -> u32 {
        day_in_cycle(date, self.scheme_start, self.cycle_length)
    }

    /// Index of the whole cycle containing `date` (floor division).
    pub fn cycle_number(&self, date: NaiveDate) -> i64 {
        self.day_index(date)
            .div_euclid(i64::from(self.cycle_length.get()))
    }
}
