//! Team (half-team) model.
//!
//! A team is one of the rotation groups that share an identical rotation
//! offset. The standard 4-2 rotation always uses nine teams, historically
//! named `A` through `I`.

use serde::{Deserialize, Serialize};

/// Number of teams in the standard rotation.
pub const STANDARD_TEAM_COUNT: usize = 9;

/// A rotation group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    /// Stable short code (e.g., `"A"`).
    pub id: String,
    /// Display name.
    pub name: String,
    /// Whether the team is currently staffed.
    ///
    /// Inactive teams keep their slot in the rotation; the flag is
    /// informational for callers.
    pub active: bool,
    /// Rotation offset in days, added to the day-in-cycle before lookup.
    pub offset_days: u32,
}

impl Team {
    /// Creates an active team with zero offset.
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: format!("Team {id}"),
            id,
            active: true,
            offset_days: 0,
        }
    }

    /// Sets the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the rotation offset.
    pub fn with_offset(mut self, offset_days: u32) -> Self {
        self.offset_days = offset_days;
        self
    }

    /// Marks the team inactive.
    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }

    /// The nine standard teams `A`..`I`, offset two days apart.
    pub fn standard_set() -> Vec<Team> {
        ('A'..='I')
            .enumerate()
            .map(|(i, c)| Team::new(c.to_string()).with_offset(2 * i as u32))
            .collect()
    }
}
