//! Rotation engine.
//!
//! # Components
//!
//! | Component | Role |
//! |-----------|------|
//! | [`EngineConfig`] | Deserializable configuration, validated on load |
//! | [`ScheduleDayBuilder`] | Stateless per-day composition |
//! | [`ScheduleCache`] | Bounded, generation-stamped memoization |
//! | [`RotationEngine`] | Thread-safe entry point with snapshot publishing |
//! | [`ScheduleSummary`] | Workload over a date range |
//!
//! # Data Flow
//! `(date, user)` → team via assignments → base day from the source →
//! exception overlay → cached and returned.

mod builder;
mod cache;
mod config;
mod core;
mod summary;

pub use builder::ScheduleDayBuilder;
pub use cache::{CacheKey, CacheStats, ScheduleCache};
pub use config::{EngineConfig, SourceKind, DEFAULT_CACHE_CAPACITY};
pub use self::core::RotationEngine;
pub use summary::ScheduleSummary;
