//! Rotating shift-cycle engine for the U-Engine ecosystem.
//!
//! Answers "who works which shift on date D" for a 24/7 operation running
//! a 4-2 rotation (four days on, two off) across nine teams and three
//! shifts, and for rule-driven schedules (daily, weekly, monthly, yearly,
//! custom work/rest cycles). Per-user views layer time-bounded team
//! assignments and approved exceptions (absences, swaps, reductions,
//! overtime) on top of the base pattern.
//!
//! # Modules
//!
//! - **`cycle`**: floor-modulo cycle clock and the static 18-day rotation table
//! - **`recurrence`**: rule evaluation (`is_active_on`, next/previous
//!   occurrence) and the rule catalog
//! - **`source`**: base schedule source, standard or rule-driven
//! - **`resolve`**: assignment resolution and exception overlay
//! - **`engine`**: configuration, per-day builder, cache, and the
//!   thread-safe [`RotationEngine`](engine::RotationEngine)
//! - **`models`**: domain types (`Team`, `Shift`, `RecurrenceRule`,
//!   `ShiftException`, `UserTeamAssignment`, `WorkScheduleDay`)
//! - **`validation`**: write-time integrity checks (duplicate IDs, shift and
//!   rule invariants, assignment overlap, dangling references)
//!
//! # Errors and Anomalies
//!
//! Configuration problems fail fast with [`RotationError`]. Conflicting
//! input data (overlapping assignments, competing exceptions) never fails:
//! the engine resolves it deterministically and reports an
//! [`Anomaly`](models::Anomaly) on the computed day.
//!
//! # Example
//!
//! ```
//! use chrono::NaiveDate;
//! use u_rotation::engine::{EngineConfig, RotationEngine};
//!
//! let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
//! let engine = RotationEngine::new(EngineConfig::standard(start)).unwrap();
//!
//! // the day before the scheme start is the last day of the cycle
//! let eve = NaiveDate::from_ymd_opt(2023, 12, 31).unwrap();
//! assert_eq!(engine.day_in_cycle(eve).unwrap(), 17);
//!
//! let day = engine.compute_day(start);
//! assert_eq!(day.working_teams().len(), 6);
//! assert_eq!(day.off_teams.len(), 3);
//! ```

pub mod cycle;
pub mod engine;
pub mod error;
pub mod models;
pub mod recurrence;
pub mod resolve;
pub mod source;
pub mod validation;

pub use error::{Result, RotationError};
