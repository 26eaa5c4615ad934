//! Engine configuration.
//!
//! Plain data, deserializable from JSON/TOML by the host application.
//! Every field except the scheme start date has a default, so a minimal
//! document is:
//!
//! ```json
//! { "scheme_start": "2024-01-01" }
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::cycle::RotationTable;
use crate::error::{Result, RotationError};
use crate::models::{Shift, Team};
use crate::recurrence::RuleCatalog;
use crate::resolve::{ExceptionPriority, PendingPolicy};
use crate::source::{GenericSchedule, RecurringShift, ScheduleSource};
use crate::validation;

/// Default number of cached days.
pub const DEFAULT_CACHE_CAPACITY: usize = 4096;

/// Which base schedule the engine computes from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceKind {
    /// Static 18-day rotation of nine teams.
    #[default]
    Standard42,
    /// One recurrence rule per (team, shift) pair.
    GenericRecurrence {
        /// Team/shift/rule triples.
        patterns: Vec<RecurringShift>,
    },
}

/// Engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Anchor of all cycle-day calculations. Required.
    #[serde(default)]
    pub scheme_start: Option<NaiveDate>,
    /// Participating teams.
    #[serde(default = "Team::standard_set")]
    pub teams: Vec<Team>,
    /// Shifts in display order.
    #[serde(default = "Shift::standard_set")]
    pub shifts: Vec<Shift>,
    /// Named recurrence rules.
    #[serde(default)]
    pub rules: RuleCatalog,
    /// Base schedule source.
    #[serde(default)]
    pub source: SourceKind,
    /// Whether pending assignments count.
    #[serde(default)]
    pub pending_policy: PendingPolicy,
    /// Ranking among competing exceptions.
    #[serde(default)]
    pub exception_priority: ExceptionPriority,
    /// Maximum cached days; 0 disables caching.
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,
}

fn default_cache_capacity() -> usize {
    DEFAULT_CACHE_CAPACITY
}

impl EngineConfig {
    /// Standard 4-2 setup: teams `A`..`I`, morning/afternoon/night shifts,
    /// and the protected seeded rules.
    pub fn standard(scheme_start: NaiveDate) -> Self {
        Self {
            scheme_start: Some(scheme_start),
            teams: Team::standard_set(),
            shifts: Shift::standard_set(),
            rules: RuleCatalog::seeded(scheme_start),
            source: SourceKind::Standard42,
            pending_policy: PendingPolicy::default(),
            exception_priority: ExceptionPriority::default(),
            cache_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }

    /// Rule-driven setup with no teams, shifts, or patterns yet.
    pub fn generic(scheme_start: NaiveDate) -> Self {
        Self {
            teams: Vec::new(),
            shifts: Vec::new(),
            source: SourceKind::GenericRecurrence {
                patterns: Vec::new(),
            },
            ..Self::standard(scheme_start)
        }
    }

    /// Sets the scheme start date.
    pub fn with_scheme_start(mut self, date: NaiveDate) -> Self {
        self.scheme_start = Some(date);
        self
    }

    /// Sets the teams.
    pub fn with_teams(mut self, teams: Vec<Team>) -> Self {
        self.teams = teams;
        self
    }

    /// Sets the shifts.
    pub fn with_shifts(mut self, shifts: Vec<Shift>) -> Self {
        self.shifts = shifts;
        self
    }

    /// Sets the rule catalog.
    pub fn with_rules(mut self, rules: RuleCatalog) -> Self {
        self.rules = rules;
        self
    }

    /// Switches to a rule-driven source with the given patterns.
    pub fn with_patterns(mut self, patterns: Vec<RecurringShift>) -> Self {
        self.source = SourceKind::GenericRecurrence { patterns };
        self
    }

    /// Sets the pending policy.
    pub fn with_pending_policy(mut self, policy: PendingPolicy) -> Self {
        self.pending_policy = policy;
        self
    }

    /// Sets the exception ranking.
    pub fn with_exception_priority(mut self, priority: ExceptionPriority) -> Self {
        self.exception_priority = priority;
        self
    }

    /// Sets the cache capacity.
    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    fn patterns(&self) -> &[RecurringShift] {
        match &self.source {
            SourceKind::Standard42 => &[],
            SourceKind::GenericRecurrence { patterns } => patterns,
        }
    }

    /// Checks the configuration, returning the scheme start date.
    ///
    /// All validation findings are folded into one `InvalidConfiguration`.
    pub fn validate(&self) -> Result<NaiveDate> {
        let scheme_start = self
            .scheme_start
            .ok_or_else(|| RotationError::config("scheme start date is not set"))?;

        validation::validate_config(&self.teams, &self.shifts, &self.rules, self.patterns())
            .map_err(|errors| {
                let joined: Vec<String> = errors.iter().map(|e| e.message.clone()).collect();
                RotationError::config(joined.join("; "))
            })?;

        Ok(scheme_start)
    }

    /// Builds the base schedule source.
    pub fn build_source(&self) -> Result<ScheduleSource> {
        match &self.source {
            SourceKind::Standard42 => Ok(ScheduleSource::Standard42(RotationTable::new(
                self.teams.clone(),
                self.shifts.clone(),
            )?)),
            SourceKind::GenericRecurrence { patterns } => {
                Ok(ScheduleSource::GenericRecurrence(GenericSchedule::new(
                    self.teams.clone(),
                    self.shifts.clone(),
                    patterns,
                    &self.rules,
                )?))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RecurrenceRule;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_standard_config_is_valid() {
        let config = EngineConfig::standard(d(2024, 1, 1));
        assert_eq!(config.validate().unwrap(), d(2024, 1, 1));
        assert!(matches!(config.build_source().unwrap(), ScheduleSource::Standard42(_)));
        assert_eq!(config.rules.len(), 3);
    }

    #[test]
    fn test_missing_scheme_start_fails_fast() {
        let mut config = EngineConfig::standard(d(2024, 1, 1));
        config.scheme_start = None;
        assert!(matches!(
            config.validate(),
            Err(RotationError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_bad_cycle_rule_rejected() {
        let config = EngineConfig::standard(d(2024, 1, 1))
            .with_rules(RuleCatalog::new().with_rule(RecurrenceRule::custom_cycle(
                "bad",
                d(2024, 1, 1),
                5,
                4,
                2,
            )));
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("bad"));
    }

    #[test]
    fn test_standard_source_needs_nine_teams() {
        let config = EngineConfig::standard(d(2024, 1, 1)).with_teams(vec![Team::new("A")]);
        assert!(config.validate().is_ok());
        assert!(config.build_source().is_err());
    }

    #[test]
    fn test_dangling_pattern_rejected() {
        let config = EngineConfig::generic(d(2024, 1, 1))
            .with_teams(vec![Team::new("X")])
            .with_shifts(vec![Shift::morning()])
            .with_patterns(vec![RecurringShift::new("X", "morning", "missing")]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_deserialize_minimal_json() {
        let config: EngineConfig =
            serde_json::from_str(r#"{ "scheme_start": "2024-01-01" }"#).unwrap();
        assert_eq!(config.scheme_start, Some(d(2024, 1, 1)));
        assert_eq!(config.teams.len(), 9);
        assert_eq!(config.shifts.len(), 3);
        assert_eq!(config.source, SourceKind::Standard42);
        assert_eq!(config.pending_policy, PendingPolicy::Exclude);
        assert_eq!(config.cache_capacity, DEFAULT_CACHE_CAPACITY);
        assert!(config.build_source().is_ok());
    }

    #[test]
    fn test_deserialize_generic_source() {
        let json = r#"{
            "scheme_start": "2024-01-01",
            "teams": [{ "id": "X", "name": "Office", "active": true, "offset_days": 0 }],
            "shifts": [{
                "id": "day", "name": "Day", "start": "09:00:00", "end": "17:00:00",
                "break_minutes": 60, "color": null, "shift_type": "DAILY"
            }],
            "source": {
                "kind": "generic_recurrence",
                "patterns": [{ "team_id": "X", "shift_id": "day", "rule_id": "weekdays" }]
            },
            "pending_policy": "include",
            "cache_capacity": 0
        }"#;
        let mut config: EngineConfig = serde_json::from_str(json).unwrap();
        config.rules = RuleCatalog::seeded(d(2024, 1, 1));
        assert_eq!(config.pending_policy, PendingPolicy::Include);
        assert_eq!(config.cache_capacity, 0);
        assert!(config.validate().is_ok());
        assert!(matches!(
            config.build_source().unwrap(),
            ScheduleSource::GenericRecurrence(_)
        ));
    }
}
