use chrono::{DateTime, FixedOffset, Local};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// A single tagged note. Tags keep insertion order and never contain
/// duplicates within one note.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: DateTime<FixedOffset>,
    pub updated_at: DateTime<FixedOffset>,
}

impl Note {
    pub fn new(id: i64, title: String, body: String, tags: Vec<String>) -> Self {
        let now = now_fixed();
        Self {
            id,
            title,
            body,
            tags: dedup_tags(tags),
            created_at: now,
            updated_at: now,
        }
    }

    /// Append a tag unless the note already carries it. Empty names after
    /// trimming are a no-op. Returns whether the note changed.
    pub fn add_tag(&mut self, tag: &str) -> bool {
        let tag = tag.trim();
        if tag.is_empty() || self.tags.iter().any(|t| t == tag) {
            return false;
        }
        self.tags.push(tag.to_string());
        true
    }

    /// Remove a tag if present. Returns whether the note changed.
    pub fn remove_tag(&mut self, tag: &str) -> bool {
        let before = self.tags.len();
        self.tags.retain(|t| t != tag);
        self.tags.len() != before
    }

    pub fn touch(&mut self) {
        self.updated_at = now_fixed();
    }
}

pub fn now_fixed() -> DateTime<FixedOffset> {
    Local::now().with_timezone(Local::now().offset())
}

/// Normalize a tag list on ingest: trim, drop empties, keep the first
/// occurrence of each name in order.
pub fn dedup_tags(tags: Vec<String>) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for tag in tags {
        let tag = tag.trim();
        if !tag.is_empty() && !seen.iter().any(|t| t == tag) {
            seen.push(tag.to_string());
        }
    }
    seen
}

/// Ids are creation timestamps in milliseconds. On a burst of creations
/// within one millisecond (or a clock step backwards), bump past the
/// largest id already in the collection so ids stay unique and monotonic.
pub fn next_id(notes: &[Note]) -> i64 {
    let now = Local::now().timestamp_millis();
    let max_existing = notes.iter().map(|n| n.id).max().unwrap_or(0);
    if now > max_existing { now } else { max_existing + 1 }
}

pub fn cmp_titles(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase()).then_with(|| a.cmp(b))
}
