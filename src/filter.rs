//! Multi-tag intersection filtering. An active filter set narrows the
//! collection to notes carrying every active tag (AND semantics), which
//! supports progressive narrowing; an empty set is the identity.

use crate::note::Note;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Default)]
pub struct TagFilter {
    active: BTreeSet<String>,
}

impl TagFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the tag if absent, remove it if present. Empty names after
    /// trimming are ignored.
    pub fn toggle(&mut self, tag: &str) {
        let tag = tag.trim();
        if tag.is_empty() {
            return;
        }
        if !self.active.remove(tag) {
            self.active.insert(tag.to_string());
        }
    }

    pub fn clear(&mut self) {
        self.active.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    pub fn matches(&self, note: &Note) -> bool {
        self.active.iter().all(|t| note.tags.iter().any(|n| n == t))
    }

    /// The subsequence of notes whose tag set is a superset of the active
    /// filters. With no active filters every note passes unchanged.
    pub fn apply<'a>(&self, notes: &'a [Note]) -> Vec<&'a Note> {
        notes.iter().filter(|n| self.matches(n)).collect()
    }
}
