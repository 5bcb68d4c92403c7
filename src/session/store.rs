//! In-memory store of accepted submissions, one record per section.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The accepted values for one section, plus when they were accepted.
/// Resubmission overwrites; there is no history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmittedRecord {
    pub values: HashMap<String, String>,
    pub submitted_at: DateTime<Utc>,
}

impl SubmittedRecord {
    pub fn new(values: HashMap<String, String>) -> Self {
        Self {
            values,
            submitted_at: Utc::now(),
        }
    }
}

/// Section name → latest accepted record. Backed by a Vec so `entries()`
/// iterates in first-submission order, which is what the entry list renders.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubmissionStore {
    entries: Vec<(String, SubmittedRecord)>,
}

impl SubmissionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the record for `name`. Replacement keeps the
    /// entry's original position.
    pub fn upsert(&mut self, name: &str, record: SubmittedRecord) {
        match self.entries.iter_mut().find(|(n, _)| n == name) {
            Some((_, existing)) => *existing = record,
            None => self.entries.push((name.to_string(), record)),
        }
    }

    /// Remove the record for `name`; false if it was never there.
    pub fn delete(&mut self, name: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(n, _)| n != name);
        self.entries.len() != before
    }

    pub fn get(&self, name: &str) -> Option<&SubmittedRecord> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, r)| r)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &SubmittedRecord)> {
        self.entries.iter().map(|(n, r)| (n.as_str(), r))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
