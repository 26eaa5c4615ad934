//! Recurrence rule model.
//!
//! A recurrence rule names a repeating pattern of active days. The
//! standard patterns are seeded once as protected rules: they can be
//! deactivated but never removed.
//!
//! # Invariants
//! - `interval >= 1`
//! - `CustomCycle` rules carry a [`CycleSpec`] with `cycle_length > 0` and
//!   `work_days + rest_days <= cycle_length`
//! - `end` (when bounded) is not before `start_date`

use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// Repetition frequency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Frequency {
    /// Every `interval` days.
    Daily,
    /// Selected weekdays, every `interval` weeks.
    Weekly,
    /// One day of the month, every `interval` months.
    Monthly,
    /// One day of the year, every `interval` years.
    Yearly,
    /// Work/rest cycle of fixed length.
    CustomCycle,
}

/// When a rule stops producing occurrences.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleEnd {
    /// Open-ended.
    #[default]
    Never,
    /// Last possible active date (inclusive).
    Until(NaiveDate),
}

/// Work/rest layout of a custom cycle.
///
/// Inside each cycle the first `work_days` days are active, followed by
/// `rest_days` inactive days. Any remainder up to `cycle_length` is also
/// inactive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleSpec {
    /// Days per repetition.
    pub cycle_length: u32,
    /// Active days at the start of each repetition.
    pub work_days: u32,
    /// Inactive days following the active block.
    pub rest_days: u32,
}

impl CycleSpec {
    /// Creates a cycle layout.
    pub fn new(cycle_length: u32, work_days: u32, rest_days: u32) -> Self {
        Self {
            cycle_length,
            work_days,
            rest_days,
        }
    }

    /// Whether the layout satisfies its invariants.
    pub fn is_consistent(&self) -> bool {
        self.cycle_length > 0
            && self
                .work_days
                .checked_add(self.rest_days)
                .is_some_and(|sum| sum <= self.cycle_length)
    }
}

/// A named recurrence pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurrenceRule {
    /// Unique rule identifier.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Repetition frequency.
    pub frequency: Frequency,
    /// Repeat every `interval` units of `frequency` (>= 1).
    pub interval: u32,
    /// First possible active date; also the anchor for intervals and cycles.
    pub start_date: NaiveDate,
    /// End condition.
    #[serde(default)]
    pub end: RuleEnd,
    /// Active weekdays for `Weekly` (empty = weekday of `start_date`).
    #[serde(default)]
    pub by_weekday: Vec<Weekday>,
    /// Day of month for `Monthly` (None = day of `start_date`).
    #[serde(default)]
    pub by_month_day: Option<u32>,
    /// Layout for `CustomCycle`.
    #[serde(default)]
    pub cycle: Option<CycleSpec>,
    /// Inactive rules never produce occurrences.
    #[serde(default = "default_true")]
    pub active: bool,
    /// Seeded rules are protected from hard removal.
    #[serde(default)]
    pub protected: bool,
}

fn default_true() -> bool {
    true
}

impl RecurrenceRule {
    /// Creates an active, open-ended rule with interval 1.
    pub fn new(id: impl Into<String>, frequency: Frequency, start_date: NaiveDate) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            frequency,
            interval: 1,
            start_date,
            end: RuleEnd::Never,
            by_weekday: Vec::new(),
            by_month_day: None,
            cycle: None,
            active: true,
            protected: false,
        }
    }

    /// Daily rule.
    pub fn daily(id: impl Into<String>, start_date: NaiveDate) -> Self {
        Self::new(id, Frequency::Daily, start_date)
    }

    /// Weekly rule on the given weekdays.
    pub fn weekly(id: impl Into<String>, start_date: NaiveDate, days: &[Weekday]) -> Self {
        Self::new(id, Frequency::Weekly, start_date).with_weekdays(days)
    }

    /// Monthly rule on the start date's day of month.
    pub fn monthly(id: impl Into<String>, start_date: NaiveDate) -> Self {
        Self::new(id, Frequency::Monthly, start_date)
    }

    /// Yearly rule on the start date's month and day.
    pub fn yearly(id: impl Into<String>, start_date: NaiveDate) -> Self {
        Self::new(id, Frequency::Yearly, start_date)
    }

    /// Custom work/rest cycle.
    pub fn custom_cycle(
        id: impl Into<String>,
        start_date: NaiveDate,
        cycle_length: u32,
        work_days: u32,
        rest_days: u32,
    ) -> Self {
        let mut rule = Self::new(id, Frequency::CustomCycle, start_date);
        rule.cycle = Some(CycleSpec::new(cycle_length, work_days, rest_days));
        rule
    }

    /// Sets the name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the interval.
    pub fn with_interval(mut self, interval: u32) -> Self {
        self.interval = interval;
        self
    }

    /// Bounds the rule at `end` (inclusive).
    pub fn until(mut self, end: NaiveDate) -> Self {
        self.end = RuleEnd::Until(end);
        self
    }

    /// Sets the weekday set.
    pub fn with_weekdays(mut self, days: &[Weekday]) -> Self {
        self.by_weekday = days.to_vec();
        self
    }

    /// Sets the day of month.
    pub fn with_month_day(mut self, day: u32) -> Self {
        self.by_month_day = Some(day);
        self
    }

    /// Marks the rule as a protected seed.
    pub fn protected(mut self) -> Self {
        self.protected = true;
        self
    }

    /// Last possible active date, if bounded.
    pub fn end_date(&self) -> Option<NaiveDate> {
        match self.end {
            RuleEnd::Never => None,
            RuleEnd::Until(d) => Some(d),
        }
    }

    /// Whether `date` lies in `[start_date, end]`.
    pub fn covers(&self, date: NaiveDate) -> bool {
        date >= self.start_date && self.end_date().is_none_or(|end| date <= end)
    }

    /// Seeded standard patterns, all protected.
    ///
    /// - `quattro-due`: 6-day cycle, 4 working then 2 resting
    /// - `weekdays`: Monday to Friday
    /// - `continuous`: every day
    pub fn seeded(start_date: NaiveDate) -> Vec<RecurrenceRule> {
        vec![
            Self::custom_cycle("quattro-due", start_date, 6, 4, 2)
                .with_name("4-2 rotation")
                .protected(),
            Self::weekly(
                "weekdays",
                start_date,
                &[
                    Weekday::Mon,
                    Weekday::Tue,
                    Weekday::Wed,
                    Weekday::Thu,
                    Weekday::Fri,
                ],
            )
            .with_name("Weekdays")
            .protected(),
            Self::daily("continuous", start_date)
                .with_name("Continuous")
                .protected(),
        ]
    }
}
