//! Per-user resolution on top of the base schedule.
//!
//! - [`AssignmentResolver`]: which team a user belongs to on a date
//! - [`ExceptionOverlay`]: which approved override applies, and what it
//!   does to the user's day
//!
//! Both resolve conflicting input deterministically and report it as an
//! [`Anomaly`](crate::models::Anomaly) instead of picking silently.

mod assignments;
mod exceptions;

pub use assignments::{AssignmentResolver, PendingPolicy, TeamResolution};
pub use exceptions::{ExceptionOverlay, ExceptionPriority, ExceptionSelection};
