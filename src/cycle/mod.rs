//! Cyclic day arithmetic and the standard 4-2 rotation.
//!
//! - [`day_index`] / [`day_in_cycle`]: map a calendar date onto a cycle
//!   anchored at the scheme start date
//! - [`RotationTable`]: static lookup of which team works which shift on
//!   each day of the 18-day standard cycle
//!
//! # Floor Modulo
//! Dates before the scheme start have negative day indices. The position
//! inside the cycle uses floor modulo (`rem_euclid`), so the day before the
//! scheme start maps to `cycle_length - 1`, never to a negative value.

mod clock;
mod rotation;

pub use clock::{day_in_cycle, day_index, CycleClock};
pub use rotation::{RotationSlot, RotationTable, STANDARD_CYCLE_LENGTH};
