//! Rule catalog.
//!
//! Holds the named recurrence rules, keyed by ID. Seeded standard rules
//! are protected: they may be edited or deactivated, never removed, and an
//! edit cannot lift the protection.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Result, RotationError};
use crate::models::RecurrenceRule;

/// Named recurrence rules.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<RecurrenceRule>", into = "Vec<RecurrenceRule>")]
pub struct RuleCatalog {
    rules: BTreeMap<String, RecurrenceRule>,
}

impl RuleCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog holding the protected standard rules.
    pub fn seeded(start_date: NaiveDate) -> Self {
        RecurrenceRule::seeded(start_date).into()
    }

    /// Adds a rule (builder style).
    pub fn with_rule(mut self, rule: RecurrenceRule) -> Self {
        self.upsert(rule);
        self
    }

    /// Inserts or replaces a rule, returning the previous version.
    pub fn upsert(&mut self, mut rule: RecurrenceRule) -> Option<RecurrenceRule> {
        if self.rules.get(&rule.id).is_some_and(|r| r.protected) {
            rule.protected = true;
        }
        self.rules.insert(rule.id.clone(), rule)
    }

    /// Looks up a rule.
    pub fn get(&self, id: &str) -> Option<&RecurrenceRule> {
        self.rules.get(id)
    }

    /// Deactivates a rule; it stays in the catalog but stops producing
    /// occurrences.
    pub fn deactivate(&mut self, id: &str) -> Result<()> {
        let rule = self
            .rules
            .get_mut(id)
            .ok_or_else(|| RotationError::UnknownRule(id.to_string()))?;
        rule.active = false;
        Ok(())
    }

    /// Removes an unprotected rule.
    pub fn remove(&mut self, id: &str) -> Result<RecurrenceRule> {
        match self.rules.get(id) {
            None => Err(RotationError::UnknownRule(id.to_string())),
            Some(rule) if rule.protected => Err(RotationError::ProtectedRule(id.to_string())),
            Some(_) => self
                .rules
                .remove(id)
                .ok_or_else(|| RotationError::UnknownRule(id.to_string())),
        }
    }

    /// Rules in ID order.
    pub fn iter(&self) -> impl Iterator<Item = &RecurrenceRule> {
        self.rules.values()
    }

    /// Number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl From<Vec<RecurrenceRule>> for RuleCatalog {
    fn from(rules: Vec<RecurrenceRule>) -> Self {
        let mut catalog = Self::new();
        for rule in rules {
            catalog.upsert(rule);
        }
        catalog
    }
}

impl From<RuleCatalog> for Vec<RecurrenceRule> {
    fn from(catalog: RuleCatalog) -> Self {
        catalog.rules.into_values().collect()
    }
}
