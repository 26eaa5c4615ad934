//! Team assignment resolution.
//!
//! # Algorithm
//! 1. Keep the user's assignments whose `[start_date, end_date]` contains
//!    the date and whose status counts under the [`PendingPolicy`].
//! 2. No match: the user is unassigned on that date.
//! 3. One match: its team.
//! 4. Several matches (overlap the write path should have rejected): the
//!    most recently created wins, ties broken by the greatest ID, and an
//!    `AssignmentOverlap` anomaly names the discarded records.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::models::{Anomaly, AnomalyKind, AssignmentStatus, UserTeamAssignment};

/// Whether `Pending` assignments count toward team resolution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PendingPolicy {
    /// Only `Active` assignments count.
    #[default]
    Exclude,
    /// `Active` and `Pending` assignments count.
    Include,
}

impl PendingPolicy {
    fn counts(self, status: AssignmentStatus) -> bool {
        match status {
            AssignmentStatus::Active => true,
            AssignmentStatus::Pending => self == Self::Include,
            AssignmentStatus::Expired | AssignmentStatus::Cancelled => false,
        }
    }
}

/// Outcome of resolving a user's team.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamResolution {
    /// Resolved team, `None` when unassigned.
    pub team_id: Option<String>,
    /// Assignment that was used.
    pub assignment_id: Option<String>,
    /// Overlap report, when several assignments matched.
    pub anomaly: Option<Anomaly>,
}

/// Resolves a user's team from their assignment history.
#[derive(Debug, Clone, Copy, Default)]
pub struct AssignmentResolver {
    policy: PendingPolicy,
}

impl AssignmentResolver {
    /// Creates a resolver.
    pub fn new(policy: PendingPolicy) -> Self {
        Self { policy }
    }

    /// The pending policy in force.
    pub fn policy(&self) -> PendingPolicy {
        self.policy
    }

    /// Team of `user_id` on `date`.
    ///
    /// `assignments` may contain other users' records; they are ignored.
    ///
    /// # Example
    /// ```
    /// use chrono::NaiveDate;
    /// use u_rotation::models::UserTeamAssignment;
    /// use u_rotation::resolve::AssignmentResolver;
    ///
    /// let d = |m, day| NaiveDate::from_ymd_opt(2024, m, day).unwrap();
    /// let history = vec![
    ///     UserTeamAssignment::new("a1", "u1", "X", d(1, 1)).until(d(3, 31)),
    ///     UserTeamAssignment::new("a2", "u1", "Y", d(4, 1)),
    /// ];
    /// let resolver = AssignmentResolver::default();
    /// assert_eq!(resolver.team_for(&history, "u1", d(2, 15)).team_id.as_deref(), Some("X"));
    /// assert_eq!(resolver.team_for(&history, "u1", d(5, 1)).team_id.as_deref(), Some("Y"));
    /// ```
    pub fn team_for(
        &self,
        assignments: &[UserTeamAssignment],
        user_id: &str,
        date: NaiveDate,
    ) -> TeamResolution {
        let mut matches: Vec<&UserTeamAssignment> = assignments
            .iter()
            .filter(|a| a.user_id == user_id && a.contains(date) && self.policy.counts(a.status))
            .collect();

        // newest first, then greatest ID
        matches.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });

        let Some((chosen, rest)) = matches.split_first() else {
            return TeamResolution {
                team_id: None,
                assignment_id: None,
                anomaly: None,
            };
        };

        let anomaly = (!rest.is_empty()).then(|| {
            let discarded: Vec<String> = rest.iter().map(|a| a.id.clone()).collect();
            warn!(
                user_id,
                %date,
                chosen = %chosen.id,
                discarded = ?discarded,
                "overlapping team assignments"
            );
            Anomaly {
                kind: AnomalyKind::AssignmentOverlap,
                user_id: user_id.to_string(),
                date,
                chosen_id: Some(chosen.id.clone()),
                message: format!(
                    "{} assignments match {date}; using '{}' (team {})",
                    matches.len(),
                    chosen.id,
                    chosen.team_id
                ),
                discarded_ids: discarded,
            }
        });

        TeamResolution {
            team_id: Some(chosen.team_id.clone()),
            assignment_id: Some(chosen.id.clone()),
            anomaly,
        }
    }
}
