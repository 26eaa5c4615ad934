//! Recurrence rule evaluation and the rule catalog.
//!
//! Generalizes the fixed 4-2 table to arbitrary [`RecurrenceRule`]s:
//!
//! | Frequency | Active when |
//! |-----------|-------------|
//! | `Daily` | `day_index % interval == 0` |
//! | `Weekly` | weekday in set AND `week_offset % interval == 0` |
//! | `Monthly` | day of month matches (clamped to short months) AND `month_offset % interval == 0` |
//! | `Yearly` | month/day match (Feb 29 clamps to Feb 28) AND `year_offset % interval == 0` |
//! | `CustomCycle` | `day_in_cycle < work_days` |
//!
//! No rule is active before its start date, after its end date, or while
//! deactivated.
//!
//! [`RecurrenceRule`]: crate::models::RecurrenceRule

mod catalog;
mod evaluator;

pub use catalog::RuleCatalog;
pub use evaluator::{
    is_active_on, next_active_date, occurrences_between, period_days, previous_active_date,
};
