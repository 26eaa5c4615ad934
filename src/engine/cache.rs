//! Memoization of computed days.
//!
//! Keyed by `(date, user_id?)`. Values are immutable and recomputable, so
//! a miss race simply computes twice and the last write wins.
//!
//! # Generations
//! Every configuration or data change publishes a new snapshot with a
//! higher generation and moves the cache to it. Inserts carry the
//! generation of the snapshot they were computed from and are dropped
//! when it is stale, so a computation that raced an invalidation can
//! never repopulate the cache with an outdated day.
//!
//! # Eviction
//! Least recently used, via [`lru::LruCache`]. Capacity 0 disables
//! caching; [`ScheduleCache::resize`] applies a new capacity in place.

use std::collections::BTreeSet;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use chrono::NaiveDate;
use lru::LruCache;
use tracing::debug;

use crate::models::DayForUser;

/// Cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey {
    /// The date.
    pub date: NaiveDate,
    /// The user, `None` for team-oriented days.
    pub user_id: Option<String>,
}

impl CacheKey {
    /// Key of a team-oriented day.
    pub fn team(date: NaiveDate) -> Self {
        Self {
            date,
            user_id: None,
        }
    }

    /// Key of a user-oriented day.
    pub fn user(date: NaiveDate, user_id: impl Into<String>) -> Self {
        Self {
            date,
            user_id: Some(user_id.into()),
        }
    }
}

/// Cache counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    /// Lookups served from the cache.
    pub hits: u64,
    /// Lookups that required computation.
    pub misses: u64,
    /// Entries currently held.
    pub entries: usize,
    /// Maximum entries.
    pub capacity: usize,
    /// Generation the cache is serving.
    pub generation: u64,
}

impl CacheStats {
    /// Fraction of lookups served from the cache.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[derive(Debug)]
struct Entries {
    generation: u64,
    capacity: usize,
    days: LruCache<CacheKey, DayForUser>,
}

fn slots(capacity: usize) -> NonZeroUsize {
    NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN)
}

/// Bounded, generation-stamped day cache.
#[derive(Debug)]
pub struct ScheduleCache {
    entries: Mutex<Entries>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl ScheduleCache {
    /// Creates a cache at generation 0. Capacity 0 disables caching.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(Entries {
                generation: 0,
                capacity,
                days: LruCache::new(slots(capacity)),
            }),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Looks up `key` for a snapshot of `generation`.
    pub fn get(&self, key: &CacheKey, generation: u64) -> Option<DayForUser> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let found = if entries.generation == generation {
            entries.days.get(key).cloned()
        } else {
            None
        };
        match found {
            Some(_) => self.hits.fetch_add(1, Ordering::Relaxed),
            None => self.misses.fetch_add(1, Ordering::Relaxed),
        };
        found
    }

    /// Stores a value computed from a snapshot of `generation`.
    ///
    /// Returns `false` when the value was not stored (stale generation or
    /// caching disabled).
    pub fn insert(&self, key: CacheKey, value: DayForUser, generation: u64) -> bool {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        if entries.capacity == 0 {
            return false;
        }
        if entries.generation != generation {
            debug!(
                date = %key.date,
                generation,
                current = entries.generation,
                "dropping stale cache insert"
            );
            return false;
        }
        if let Some((victim, _)) = entries.days.push(key.clone(), value) {
            if victim != key {
                debug!(date = %victim.date, user_id = ?victim.user_id, "evicting cached day");
            }
        }
        true
    }

    /// Drops every entry and moves to `generation`.
    pub fn invalidate_all(&self, generation: u64) {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let dropped = entries.days.len();
        entries.days.clear();
        entries.generation = generation;
        debug!(generation, dropped, "cache invalidated");
    }

    /// Drops the entries of `users` and moves to `generation`.
    ///
    /// Team-oriented entries do not depend on user data and are kept.
    pub fn invalidate_users(&self, generation: u64, users: &BTreeSet<String>) {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let stale: Vec<CacheKey> = entries
            .days
            .iter()
            .filter(|(k, _)| k.user_id.as_ref().is_some_and(|u| users.contains(u)))
            .map(|(k, _)| k.clone())
            .collect();
        for key in &stale {
            entries.days.pop(key);
        }
        entries.generation = generation;
        debug!(
            generation,
            users = users.len(),
            dropped = stale.len(),
            "user cache entries invalidated"
        );
    }

    /// Applies a new capacity, evicting least recently used entries that
    /// no longer fit. Capacity 0 empties and disables the cache.
    pub fn resize(&self, capacity: usize) {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        if entries.capacity == capacity {
            return;
        }
        if capacity == 0 {
            entries.days.clear();
        }
        entries.days.resize(slots(capacity));
        debug!(from = entries.capacity, to = capacity, "cache resized");
        entries.capacity = capacity;
    }

    /// Drops every entry, keeping the generation.
    pub fn clear(&self) {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.days.clear();
        debug!("cache cleared");
    }

    /// Current counters.
    pub fn stats(&self) -> CacheStats {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: entries.days.len(),
            capacity: entries.capacity,
            generation: entries.generation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn value(day: u32) -> DayForUser {
        DayForUser::Unassigned {
            date: d(day),
            user_id: "u".into(),
        }
    }

    #[test]
    fn test_hit_and_miss() {
        let cache = ScheduleCache::new(8);
        assert!(cache.get(&CacheKey::team(d(1)), 0).is_none());
        assert!(cache.insert(CacheKey::team(d(1)), value(1), 0));
        assert_eq!(cache.get(&CacheKey::team(d(1)), 0), Some(value(1)));
        // user entries are keyed separately
        assert!(cache.get(&CacheKey::user(d(1), "u"), 0).is_none());

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 2);
        assert_eq!(stats.entries, 1);
    }

    #[test]
    fn test_stale_generation_rejected() {
        let cache = ScheduleCache::new(8);
        cache.insert(CacheKey::team(d(1)), value(1), 0);
        cache.invalidate_all(1);
        assert_eq!(cache.stats().entries, 0);

        // computed against the old snapshot
        assert!(!cache.insert(CacheKey::team(d(2)), value(2), 0));
        assert!(cache.get(&CacheKey::team(d(2)), 0).is_none());
        assert!(cache.get(&CacheKey::team(d(2)), 1).is_none());

        assert!(cache.insert(CacheKey::team(d(2)), value(2), 1));
        assert!(cache.get(&CacheKey::team(d(2)), 1).is_some());
    }

    #[test]
    fn test_evicts_least_recently_used() {
        let cache = ScheduleCache::new(3);
        for day in [1, 10, 20] {
            cache.insert(CacheKey::team(d(day)), value(day), 0);
        }
        // touch day 1 so day 10 becomes the oldest
        assert!(cache.get(&CacheKey::team(d(1)), 0).is_some());
        cache.insert(CacheKey::team(d(11)), value(11), 0);
        assert_eq!(cache.stats().entries, 3);
        assert!(cache.get(&CacheKey::team(d(10)), 0).is_none());
        assert!(cache.get(&CacheKey::team(d(1)), 0).is_some());
        assert!(cache.get(&CacheKey::team(d(20)), 0).is_some());
        assert!(cache.get(&CacheKey::team(d(11)), 0).is_some());
    }

    #[test]
    fn test_resize() {
        let cache = ScheduleCache::new(4);
        for day in 1..=4 {
            cache.insert(CacheKey::team(d(day)), value(day), 0);
        }
        cache.resize(2);
        let stats = cache.stats();
        assert_eq!(stats.capacity, 2);
        assert_eq!(stats.entries, 2);
        assert!(cache.get(&CacheKey::team(d(4)), 0).is_some());

        cache.resize(0);
        assert_eq!(cache.stats().entries, 0);
        assert!(!cache.insert(CacheKey::team(d(5)), value(5), 0));

        cache.resize(8);
        assert!(cache.insert(CacheKey::team(d(5)), value(5), 0));
        assert_eq!(cache.stats().capacity, 8);
    }

    #[test]
    fn test_overwrite_does_not_evict() {
        let cache = ScheduleCache::new(2);
        cache.insert(CacheKey::team(d(1)), value(1), 0);
        cache.insert(CacheKey::team(d(2)), value(2), 0);
        cache.insert(CacheKey::team(d(2)), value(2), 0);
        assert!(cache.get(&CacheKey::team(d(1)), 0).is_some());
    }

    #[test]
    fn test_invalidate_users_keeps_team_entries() {
        let cache = ScheduleCache::new(8);
        cache.insert(CacheKey::team(d(1)), value(1), 0);
        cache.insert(CacheKey::user(d(1), "u1"), value(1), 0);
        cache.insert(CacheKey::user(d(1), "u2"), value(1), 0);

        let users: BTreeSet<String> = ["u1".to_string()].into_iter().collect();
        cache.invalidate_users(1, &users);

        assert!(cache.get(&CacheKey::team(d(1)), 1).is_some());
        assert!(cache.get(&CacheKey::user(d(1), "u1"), 1).is_none());
        assert!(cache.get(&CacheKey::user(d(1), "u2"), 1).is_some());
    }

    #[test]
    fn test_zero_capacity_disables() {
        let cache = ScheduleCache::new(0);
        assert!(!cache.insert(CacheKey::team(d(1)), value(1), 0));
        assert_eq!(cache.stats().entries, 0);
    }

    #[test]
    fn test_hit_rate() {
        let stats = CacheStats {
            hits: 3,
            misses: 1,
            ..CacheStats::default()
        };
        assert!((stats.hit_rate() - 0.75).abs() < 1e-9);
        assert_eq!(CacheStats::default().hit_rate(), 0.0);
    }
}
