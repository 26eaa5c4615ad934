//! Rotation engine: the public entry point.
//!
//! Holds the current configuration and input data as one immutable
//! [`Snapshot`] behind an `RwLock<Arc<_>>`. Readers clone the `Arc` and
//! compute without holding the lock; administrative changes build a new
//! snapshot, swap it in, and move the cache to the new generation while
//! still holding the write lock. A reader therefore sees either the old or
//! the new configuration, never a mix, and nothing computed from the old
//! one reaches the cache after the swap.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, PoisonError, RwLock};

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::cycle::day_index;
use crate::error::{Result, RotationError};
use crate::models::{
    DayForUser, RecurrenceRule, ShiftException, UserTeamAssignment, WorkScheduleDay,
};
use crate::resolve::{AssignmentResolver, ExceptionOverlay, TeamResolution};
use crate::source::ScheduleSource;
use crate::validation::{self, ValidationError};

use super::builder::ScheduleDayBuilder;
use super::cache::{CacheKey, CacheStats, ScheduleCache};
use super::config::EngineConfig;
use super::summary::ScheduleSummary;

/// Immutable view of configuration and data.
#[derive(Debug, Clone)]
struct Snapshot {
    generation: u64,
    config: Arc<EngineConfig>,
    scheme_start: NaiveDate,
    source: Arc<ScheduleSource>,
    resolver: AssignmentResolver,
    overlay: Arc<ExceptionOverlay>,
    assignments: Arc<Vec<UserTeamAssignment>>,
    exceptions: Arc<Vec<ShiftException>>,
}

impl Snapshot {
    fn build(
        config: EngineConfig,
        generation: u64,
        assignments: Arc<Vec<UserTeamAssignment>>,
        exceptions: Arc<Vec<ShiftException>>,
    ) -> Result<Self> {
        let scheme_start = config.validate()?;
        let source = config.build_source()?;
        Ok(Self {
            generation,
            scheme_start,
            source: Arc::new(source),
            resolver: AssignmentResolver::new(config.pending_policy),
            overlay: Arc::new(ExceptionOverlay::new(config.exception_priority.clone())),
            config: Arc::new(config),
            assignments,
            exceptions,
        })
    }

    fn builder(&self) -> ScheduleDayBuilder<'_> {
        ScheduleDayBuilder::new(&self.source, self.scheme_start, self.resolver, &self.overlay)
            .with_assignments(&self.assignments)
            .with_exceptions(&self.exceptions)
    }
}

/// Thread-safe rotation engine.
///
/// # Example
/// ```
/// use chrono::NaiveDate;
/// use u_rotation::engine::{EngineConfig, RotationEngine};
/// use u_rotation::models::UserTeamAssignment;
///
/// let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
/// let engine = RotationEngine::new(EngineConfig::standard(start)).unwrap();
///
/// let day = engine.compute_day(start);
/// assert!(day.shift("morning").unwrap().teams.contains("A"));
/// assert!(day.is_team_off("C"));
///
/// engine.replace_assignments(vec![UserTeamAssignment::new("a1", "u1", "A", start)]);
/// assert!(engine.compute_day_for_user(start, "u1").is_working());
/// ```
#[derive(Debug)]
pub struct RotationEngine {
    state: RwLock<Arc<Snapshot>>,
    cache: ScheduleCache,
}

impl RotationEngine {
    /// Creates an engine with no assignments or exceptions.
    ///
    /// Fails with `InvalidConfiguration` on any configuration problem.
    pub fn new(config: EngineConfig) -> Result<Self> {
        let cache = ScheduleCache::new(config.cache_capacity);
        let snapshot = Snapshot::build(config, 0, Arc::default(), Arc::default())?;
        info!(
            scheme_start = %snapshot.scheme_start,
            teams = snapshot.source.teams().len(),
            shifts = snapshot.source.shifts().len(),
            "rotation engine ready"
        );
        Ok(Self {
            state: RwLock::new(Arc::new(snapshot)),
            cache,
        })
    }

    fn snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(&self.state.read().unwrap_or_else(PoisonError::into_inner))
    }

    // ======================== Queries ========================

    /// Team-oriented schedule of `date`.
    pub fn compute_day(&self, date: NaiveDate) -> Arc<WorkScheduleDay> {
        self.team_day(&self.snapshot(), date)
    }

    /// Schedule of `date` for one user, or `Unassigned`.
    pub fn compute_day_for_user(&self, date: NaiveDate, user_id: &str) -> DayForUser {
        self.user_day(&self.snapshot(), date, user_id)
    }

    /// Team-oriented days of `[start, end]`, one entry per calendar day.
    pub fn compute_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<BTreeMap<NaiveDate, Arc<WorkScheduleDay>>> {
        let snap = self.snapshot();
        Ok(days_between(start, end)?
            .map(|date| (date, self.team_day(&snap, date)))
            .collect())
    }

    /// User days of `[start, end]`, one entry per calendar day.
    pub fn compute_range_for_user(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        user_id: &str,
    ) -> Result<BTreeMap<NaiveDate, DayForUser>> {
        let snap = self.snapshot();
        Ok(days_between(start, end)?
            .map(|date| (date, self.user_day(&snap, date, user_id)))
            .collect())
    }

    fn team_day(&self, snap: &Snapshot, date: NaiveDate) -> Arc<WorkScheduleDay> {
        let key = CacheKey::team(date);
        if let Some(DayForUser::Scheduled(day)) = self.cache.get(&key, snap.generation) {
            return day;
        }
        let day = Arc::new(snap.builder().build_team_day(date));
        self.cache
            .insert(key, DayForUser::Scheduled(Arc::clone(&day)), snap.generation);
        day
    }

    fn user_day(&self, snap: &Snapshot, date: NaiveDate, user_id: &str) -> DayForUser {
        let key = CacheKey::user(date, user_id);
        if let Some(day) = self.cache.get(&key, snap.generation) {
            return day;
        }
        let day = snap.builder().build(date, Some(user_id));
        self.cache.insert(key, day.clone(), snap.generation);
        day
    }

    /// Position of `date` in the source cycle.
    ///
    /// Fails with `InvalidConfiguration` when the source has no fixed
    /// cycle (a rule-driven source with non-cyclic rules).
    pub fn day_in_cycle(&self, date: NaiveDate) -> Result<u32> {
        let snap = self.snapshot();
        snap.source
            .day_in_cycle(date, snap.scheme_start)
            .ok_or_else(|| RotationError::config("source has no fixed cycle length"))
    }

    /// Whole days from the scheme start to `date` (negative before it).
    pub fn days_from_scheme_start(&self, date: NaiveDate) -> i64 {
        day_index(date, self.snapshot().scheme_start)
    }

    /// The current scheme start date.
    pub fn scheme_start_date(&self) -> NaiveDate {
        self.snapshot().scheme_start
    }

    /// Whether `team_id` works on `date`; without a team, whether anyone does.
    pub fn is_working_day(&self, date: NaiveDate, team_id: Option<&str>) -> Result<bool> {
        let snap = self.snapshot();
        match team_id {
            Some(team_id) => snap.source.is_team_working(team_id, date, snap.scheme_start),
            None => Ok(self.team_day(&snap, date).has_work()),
        }
    }

    /// Whether `team_id` is off on `date`.
    pub fn is_rest_day(&self, date: NaiveDate, team_id: &str) -> Result<bool> {
        self.is_working_day(date, Some(team_id)).map(|working| !working)
    }

    /// First working day of `team_id` strictly after `from`.
    pub fn next_working_day(&self, team_id: &str, from: NaiveDate) -> Result<NaiveDate> {
        let snap = self.snapshot();
        snap.source.next_working_day(team_id, from, snap.scheme_start)
    }

    /// Last working day of `team_id` strictly before `from`.
    pub fn previous_working_day(&self, team_id: &str, from: NaiveDate) -> Result<NaiveDate> {
        let snap = self.snapshot();
        snap.source
            .previous_working_day(team_id, from, snap.scheme_start)
    }

    /// Team of `user_id` on `date`, with any overlap anomaly.
    pub fn team_for(&self, user_id: &str, date: NaiveDate) -> TeamResolution {
        let snap = self.snapshot();
        snap.resolver.team_for(&snap.assignments, user_id, date)
    }

    /// Workload of `team_id` over `[start, end]`.
    pub fn summarize_team(
        &self,
        team_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<ScheduleSummary> {
        let snap = self.snapshot();
        if !snap.source.has_team(team_id) {
            return Err(RotationError::UnknownTeam(team_id.to_string()));
        }
        let days: Vec<Arc<WorkScheduleDay>> = days_between(start, end)?
            .map(|date| self.team_day(&snap, date))
            .collect();
        Ok(ScheduleSummary::for_team(days.iter().map(Arc::as_ref), team_id))
    }

    /// Workload of `user_id` over `[start, end]`.
    pub fn summarize_user(
        &self,
        user_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<ScheduleSummary> {
        let days = self.compute_range_for_user(start, end, user_id)?;
        Ok(ScheduleSummary::for_user(&days))
    }

    /// Current configuration.
    pub fn config(&self) -> EngineConfig {
        self.snapshot().config.as_ref().clone()
    }

    /// Cache counters.
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Drops every cached day.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    // ======================== Administration ========================

    /// Moves the scheme start date. Invalidates the whole cache.
    pub fn update_scheme_start_date(&self, date: NaiveDate) -> Result<()> {
        self.reconfigure("scheme start updated", |config| {
            config.scheme_start = Some(date);
            Ok(())
        })
    }

    /// Inserts or replaces a rule. Invalidates the whole cache.
    pub fn upsert_rule(&self, rule: RecurrenceRule) -> Result<()> {
        self.reconfigure("rule upserted", |config| {
            config.rules.upsert(rule);
            Ok(())
        })
    }

    /// Deactivates a rule. Invalidates the whole cache.
    pub fn deactivate_rule(&self, rule_id: &str) -> Result<()> {
        self.reconfigure("rule deactivated", |config| {
            config.rules.deactivate(rule_id)
        })
    }

    /// Removes an unprotected rule. Invalidates the whole cache.
    ///
    /// Fails with `ProtectedRule` for seeded rules and with
    /// `InvalidConfiguration` if a pattern still references the rule.
    pub fn remove_rule(&self, rule_id: &str) -> Result<()> {
        self.reconfigure("rule removed", |config| {
            config.rules.remove(rule_id).map(|_| ())
        })
    }

    /// Replaces the whole configuration. Invalidates the whole cache.
    pub fn replace_config(&self, config: EngineConfig) -> Result<()> {
        self.reconfigure("configuration replaced", |current| {
            *current = config;
            Ok(())
        })
    }

    fn reconfigure(
        &self,
        action: &str,
        edit: impl FnOnce(&mut EngineConfig) -> Result<()>,
    ) -> Result<()> {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        let mut config = state.config.as_ref().clone();
        edit(&mut config)?;

        let generation = state.generation + 1;
        let next = Snapshot::build(
            config,
            generation,
            Arc::clone(&state.assignments),
            Arc::clone(&state.exceptions),
        )?;
        let scheme_start = next.scheme_start;
        let capacity = next.config.cache_capacity;
        *state = Arc::new(next);
        self.cache.invalidate_all(generation);
        self.cache.resize(capacity);
        info!(generation, %scheme_start, "{action}");
        Ok(())
    }

    /// Replaces the assignment history.
    ///
    /// Data is stored even when it fails write-time checks (the resolver
    /// tolerates overlaps); the findings are logged and returned. Cached
    /// days of affected users are invalidated.
    pub fn replace_assignments(&self, assignments: Vec<UserTeamAssignment>) -> Vec<ValidationError> {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        let findings = validation::validate_assignments(&assignments, state.source.teams())
            .err()
            .unwrap_or_default();
        log_findings("assignments", &findings);

        let users = changed_users(
            state.assignments.as_slice(),
            &assignments,
            |a| &a.id,
            |a| &a.user_id,
        );
        let mut next = (**state).clone();
        next.generation += 1;
        next.assignments = Arc::new(assignments);
        let generation = next.generation;
        let records = next.assignments.len();
        *state = Arc::new(next);
        self.cache.invalidate_users(generation, &users);
        info!(generation, records, users = users.len(), "assignments replaced");
        findings
    }

    /// Replaces the exceptions.
    ///
    /// Same contract as [`replace_assignments`](Self::replace_assignments).
    pub fn replace_exceptions(&self, exceptions: Vec<ShiftException>) -> Vec<ValidationError> {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        let findings = validation::validate_exceptions(&exceptions, state.source.shifts())
            .err()
            .unwrap_or_default();
        log_findings("exceptions", &findings);

        let users = changed_users(
            state.exceptions.as_slice(),
            &exceptions,
            |e| &e.id,
            |e| &e.user_id,
        );
        let mut next = (**state).clone();
        next.generation += 1;
        next.exceptions = Arc::new(exceptions);
        let generation = next.generation;
        let records = next.exceptions.len();
        *state = Arc::new(next);
        self.cache.invalidate_users(generation, &users);
        info!(generation, records, users = users.len(), "exceptions replaced");
        findings
    }
}

fn days_between(
    start: NaiveDate,
    end: NaiveDate,
) -> Result<impl Iterator<Item = NaiveDate>> {
    if start > end {
        return Err(RotationError::InvalidRange { start, end });
    }
    Ok(start.iter_days().take_while(move |d| *d <= end))
}

fn log_findings(what: &str, findings: &[ValidationError]) {
    for finding in findings {
        warn!(kind = ?finding.kind, "{what}: {}", finding.message);
    }
}

/// Users whose records differ between `old` and `new`.
///
/// Records are grouped by ID; when a group differs in any way, including
/// duplicates and order, every user in both versions of the group counts.
fn changed_users<T: PartialEq>(
    old: &[T],
    new: &[T],
    id: impl Fn(&T) -> &String,
    user: impl Fn(&T) -> &String,
) -> BTreeSet<String> {
    let mut groups: BTreeMap<&String, (Vec<&T>, Vec<&T>)> = BTreeMap::new();
    for record in old {
        groups.entry(id(record)).or_default().0.push(record);
    }
    for record in new {
        groups.entry(id(record)).or_default().1.push(record);
    }
    groups
        .into_values()
        .filter(|(before, after)| before != after)
        .flat_map(|(before, after)| before.into_iter().chain(after))
        .map(|record| user(record).clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AnomalyKind, ExceptionType, Shift, Team};
    use crate::recurrence::RuleCatalog;
    use crate::source::RecurringShift;
    use chrono::NaiveTime;
    use std::thread;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn engine() -> RotationEngine {
        RotationEngine::new(EngineConfig::standard(d(2024, 1, 1))).unwrap()
    }

    #[test]
    fn test_unset_scheme_start_fails() {
        let mut config = EngineConfig::standard(d(2024, 1, 1));
        config.scheme_start = None;
        assert!(matches!(
            RotationEngine::new(config),
            Err(RotationError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_day_in_cycle_before_start() {
        let e = engine();
        assert_eq!(e.day_in_cycle(d(2024, 1, 1)).unwrap(), 0);
        assert_eq!(e.day_in_cycle(d(2023, 12, 31)).unwrap(), 17);
        assert_eq!(e.days_from_scheme_start(d(2023, 12, 31)), -1);
        assert_eq!(e.days_from_scheme_start(d(2024, 1, 19)), 18);
    }

    #[test]
    fn test_compute_day_is_cached() {
        let e = engine();
        let first = e.compute_day(d(2024, 3, 5));
        let second = e.compute_day(d(2024, 3, 5));
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(e.cache_stats().hits, 1);

        e.clear_cache();
        let third = e.compute_day(d(2024, 3, 5));
        assert_eq!(*first, *third);
    }

    #[test]
    fn test_compute_range() {
        let e = engine();
        let range = e.compute_range(d(2024, 2, 27), d(2024, 3, 2)).unwrap();
        assert_eq!(range.len(), 5);
        assert!(range.contains_key(&d(2024, 2, 29)));

        assert!(matches!(
            e.compute_range(d(2024, 3, 2), d(2024, 3, 1)),
            Err(RotationError::InvalidRange { .. })
        ));
        assert_eq!(e.compute_range(d(2024, 3, 1), d(2024, 3, 1)).unwrap().len(), 1);
    }

    #[test]
    fn test_working_and_rest_days() {
        let e = engine();
        let start = d(2024, 1, 1);
        assert!(e.is_working_day(start, Some("A")).unwrap());
        assert!(e.is_rest_day(start, "C").unwrap());
        assert!(e.is_working_day(start, None).unwrap());
        assert!(matches!(
            e.is_working_day(start, Some("Z")),
            Err(RotationError::UnknownTeam(_))
        ));
    }

    #[test]
    fn test_next_and_previous_working_day() {
        let e = engine();
        // team A: works cycle days 0-3, rests 4-5
        assert_eq!(e.next_working_day("A", d(2024, 1, 4)).unwrap(), d(2024, 1, 7));
        assert_eq!(e.next_working_day("A", d(2024, 1, 1)).unwrap(), d(2024, 1, 2));
        assert_eq!(e.previous_working_day("A", d(2024, 1, 7)).unwrap(), d(2024, 1, 4));
    }

    #[test]
    fn test_scheme_start_update_invalidates() {
        let e = engine();
        let date = d(2024, 1, 1);
        let before = e.compute_day(date);
        assert_eq!(before.day_in_cycle, Some(0));

        e.update_scheme_start_date(d(2023, 12, 31)).unwrap();
        let after = e.compute_day(date);
        assert_eq!(after.day_in_cycle, Some(1));
        assert_eq!(e.scheme_start_date(), d(2023, 12, 31));
        assert_eq!(e.cache_stats().generation, 1);
    }

    #[test]
    fn test_protected_rule_cannot_be_removed() {
        let e = engine();
        assert!(matches!(
            e.remove_rule("quattro-due"),
            Err(RotationError::ProtectedRule(_))
        ));
        e.deactivate_rule("quattro-due").unwrap();
        assert!(!e.config().rules.get("quattro-due").unwrap().active);
        assert!(matches!(
            e.deactivate_rule("missing"),
            Err(RotationError::UnknownRule(_))
        ));
    }

    #[test]
    fn test_invalid_rule_edit_keeps_old_config() {
        let e = engine();
        let bad = RecurrenceRule::custom_cycle("bad", d(2024, 1, 1), 3, 4, 2);
        assert!(e.upsert_rule(bad).is_err());
        assert!(e.config().rules.get("bad").is_none());
        assert_eq!(e.cache_stats().generation, 0);
    }

    #[test]
    fn test_replace_assignments_invalidates_user() {
        let e = engine();
        let date = d(2024, 1, 1);
        assert!(e.compute_day_for_user(date, "u1").is_unassigned());

        let findings = e.replace_assignments(vec![UserTeamAssignment::new("a1", "u1", "A", date)]);
        assert!(findings.is_empty());
        assert!(e.compute_day_for_user(date, "u1").is_working());
        assert_eq!(e.team_for("u1", date).team_id.as_deref(), Some("A"));
    }

    #[test]
    fn test_overlapping_assignments_accepted_and_reported() {
        let e = engine();
        let date = d(2024, 1, 1);
        let findings = e.replace_assignments(vec![
            UserTeamAssignment::new("a1", "u1", "A", date),
            UserTeamAssignment::new("a2", "u1", "C", date)
                .created_at(date.and_time(NaiveTime::from_hms_opt(9, 0, 0).unwrap())),
        ]);
        assert_eq!(findings.len(), 1);

        let result = e.compute_day_for_user(date, "u1");
        let day = result.day().unwrap();
        assert_eq!(day.user.as_ref().unwrap().team_id, "C");
        assert_eq!(day.anomalies[0].kind, AnomalyKind::AssignmentOverlap);
    }

    #[test]
    fn test_replace_exceptions_applies_absence() {
        let e = engine();
        let date = d(2024, 1, 1);
        e.replace_assignments(vec![UserTeamAssignment::new("a1", "u1", "A", date)]);
        assert!(e.compute_day_for_user(date, "u1").is_working());

        e.replace_exceptions(vec![ShiftException::new(
            "e1",
            "u1",
            date,
            ExceptionType::AbsenceSick,
        )
        .approve("mgr", "Manager", date.and_time(NaiveTime::MIN))]);
        assert!(!e.compute_day_for_user(date, "u1").is_working());
        // team view is untouched
        assert!(e.compute_day(date).is_team_working("A"));
    }

    #[test]
    fn test_summaries() {
        let e = engine();
        let start = d(2024, 1, 1);
        let end = d(2024, 1, 18);
        let team = e.summarize_team("A", start, end).unwrap();
        assert_eq!(team.working_days, 12);
        assert!(matches!(
            e.summarize_team("Z", start, end),
            Err(RotationError::UnknownTeam(_))
        ));

        e.replace_assignments(vec![UserTeamAssignment::new("a1", "u1", "A", d(2024, 1, 4))]);
        let user = e.summarize_user("u1", start, end).unwrap();
        assert_eq!(user.unassigned_days, 3);
        assert_eq!(user.working_days, 9);
        assert_eq!(user.rest_days, 6);
    }

    #[test]
    fn test_generic_source_engine() {
        let start = d(2024, 1, 1); // Monday
        let config = EngineConfig::generic(start)
            .with_teams(vec![Team::new("X")])
            .with_shifts(vec![Shift::morning()])
            .with_rules(RuleCatalog::seeded(start))
            .with_patterns(vec![RecurringShift::new("X", "morning", "weekdays")]);
        let e = RotationEngine::new(config).unwrap();

        assert!(e.is_working_day(d(2024, 1, 5), Some("X")).unwrap());
        assert!(e.is_rest_day(d(2024, 1, 6), "X").unwrap());
        assert_eq!(e.next_working_day("X", d(2024, 1, 5)).unwrap(), d(2024, 1, 8));
        assert!(e.day_in_cycle(start).is_err());

        e.upsert_rule(RecurrenceRule::daily("extra", start)).unwrap();
        assert!(e.remove_rule("extra").is_ok());
        assert!(matches!(
            e.remove_rule("weekdays"),
            Err(RotationError::ProtectedRule(_))
        ));
    }

    #[test]
    fn test_concurrent_reads_during_update() {
        let e = Arc::new(engine());
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let e = Arc::clone(&e);
                thread::spawn(move || {
                    for offset in 0..50u64 {
                        let date = d(2024, 1, 1) + chrono::Days::new(offset + i);
                        let day = e.compute_day(date);
                        assert_eq!(day.working_teams().len(), 6);
                        assert_eq!(day.off_teams.len(), 3);
                    }
                })
            })
            .collect();
        e.update_scheme_start_date(d(2024, 1, 2)).unwrap();
        for h in handles {
            h.join().unwrap();
        }

        let date = d(2024, 1, 2);
        assert_eq!(e.compute_day(date).day_in_cycle, Some(0));
    }

    #[test]
    fn test_changed_users() {
        let date = d(2024, 1, 1);
        let old = vec![
            UserTeamAssignment::new("a1", "u1", "A", date),
            UserTeamAssignment::new("a2", "u2", "B", date),
            UserTeamAssignment::new("a3", "u3", "C", date),
        ];
        let new = vec![
            UserTeamAssignment::new("a1", "u1", "A", date),
            UserTeamAssignment::new("a2", "u2", "D", date),
            UserTeamAssignment::new("a4", "u4", "E", date),
        ];
        let users = changed_users(&old, &new, |a| &a.id, |a| &a.user_id);
        let expected: BTreeSet<String> =
            ["u2", "u3", "u4"].iter().map(|s| s.to_string()).collect();
        assert_eq!(users, expected);
    }

    #[test]
    fn test_changed_users_with_duplicate_ids() {
        let date = d(2024, 1, 1);
        let old = vec![UserTeamAssignment::new("a1", "u1", "A", date)];
        let new = vec![
            UserTeamAssignment::new("a1", "u2", "B", date),
            UserTeamAssignment::new("a1", "u1", "A", date),
        ];
        let users = changed_users(&old, &new, |a| &a.id, |a| &a.user_id);
        let expected: BTreeSet<String> = ["u1", "u2"].iter().map(|s| s.to_string()).collect();
        assert_eq!(users, expected);
    }

    #[test]
    fn test_duplicate_id_replacement_refreshes_cached_user() {
        let e = engine();
        let date = d(2024, 1, 1);
        e.replace_assignments(vec![UserTeamAssignment::new("a1", "u1", "A", date)]);
        assert!(e.compute_day_for_user(date, "u2").is_unassigned());

        let findings = e.replace_assignments(vec![
            UserTeamAssignment::new("a1", "u2", "B", date),
            UserTeamAssignment::new("a1", "u1", "A", date),
        ]);
        assert!(!findings.is_empty());
        assert!(!e.compute_day_for_user(date, "u2").is_unassigned());
        assert_eq!(e.team_for("u2", date).team_id.as_deref(), Some("B"));
    }

    #[test]
    fn test_replace_config_applies_cache_capacity() {
        let e = engine();
        e.compute_day(d(2024, 1, 1));
        assert_eq!(e.cache_stats().entries, 1);

        e.replace_config(EngineConfig::standard(d(2024, 1, 1)).with_cache_capacity(0))
            .unwrap();
        e.compute_day(d(2024, 1, 1));
        let stats = e.cache_stats();
        assert_eq!(stats.capacity, e.config().cache_capacity);
        assert_eq!(stats.capacity, 0);
        assert_eq!(stats.entries, 0);

        e.replace_config(EngineConfig::standard(d(2024, 1, 1)).with_cache_capacity(16))
            .unwrap();
        e.compute_day(d(2024, 1, 1));
        assert_eq!(e.cache_stats().capacity, 16);
        assert_eq!(e.cache_stats().entries, 1);
    }
}
