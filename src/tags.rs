//! Tag library: derives the tag universe from the note collection plus the
//! persisted color map, and hosts the collection-level tag operations.

use crate::color;
use crate::note::Note;
use std::collections::BTreeMap;

/// Tag name -> normalized `#rrggbb` color. Entries outlive the last note
/// that references them, so a tag can exist with zero usages.
pub type TagColorMap = BTreeMap<String, String>;

/// One row of the tag library view. Derived, never persisted directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagEntry {
    pub tag: String,
    pub count: usize,
    pub color: String,
}

/// Normalize a tag name for identity purposes: trim only. Tag names are
/// case-sensitive; an empty result means the input is unusable.
pub fn normalize_tag(tag: &str) -> String {
    tag.trim().to_string()
}

/// Recompute the tag library from every note's tag list plus the color map.
///
/// Usage counts come from the notes; tags that exist only in `colors`
/// (created by hand, or orphaned by note deletion) appear with count 0.
/// Colors are compute-or-insert: a tag without a stored color gets its
/// deterministic default cached back into `colors`, so the assignment is
/// stable for the rest of the session and persists with the next save.
pub fn rebuild(notes: &[Note], colors: &mut TagColorMap) -> Vec<TagEntry> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for note in notes {
        for tag in &note.tags {
            let tag = normalize_tag(tag);
            if tag.is_empty() {
                continue;
            }
            *counts.entry(tag).or_insert(0) += 1;
        }
    }
    for tag in colors.keys() {
        counts.entry(tag.clone()).or_insert(0);
    }

    let mut entries: Vec<TagEntry> = counts
        .into_iter()
        .map(|(tag, count)| {
            let color = colors
                .entry(tag.clone())
                .or_insert_with(|| color::color_from_string(&tag))
                .clone();
            TagEntry { tag, count, color }
        })
        .collect();

    entries.sort_by(|a, b| crate::note::cmp_titles(&a.tag, &b.tag));
    entries
}

/// Outcome of [`create_tag`]. Duplicates are informational, not errors: the
/// caller is expected to select the existing tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateTag {
    Created { color: String },
    AlreadyExists,
    EmptyName,
}

/// Add a zero-usage tag with a generated default color.
pub fn create_tag(name: &str, colors: &mut TagColorMap) -> CreateTag {
    let name = normalize_tag(name);
    if name.is_empty() {
        return CreateTag::EmptyName;
    }
    if colors.contains_key(&name) {
        return CreateTag::AlreadyExists;
    }
    let color = color::color_from_string(&name);
    colors.insert(name, color.clone());
    CreateTag::Created { color }
}

/// Set a tag's color. Returns `true` when the map actually changed; an
/// unchanged color is a no-op so callers do not trigger redundant saves.
pub fn set_color(name: &str, hex: &str, colors: &mut TagColorMap) -> bool {
    let name = normalize_tag(name);
    if name.is_empty() {
        return false;
    }
    let normalized = color::normalize_hex(hex);
    if colors.get(&name) == Some(&normalized) {
        return false;
    }
    colors.insert(name, normalized);
    true
}

/// Remove a tag from every note carrying it and from the color map.
/// Returns the number of notes that changed plus whether the color map
/// changed; `(0, false)` means the whole call was a no-op.
pub fn delete_tag(name: &str, notes: &mut [Note], colors: &mut TagColorMap) -> (usize, bool) {
    let name = normalize_tag(name);
    if name.is_empty() {
        return (0, false);
    }
    let mut touched = 0;
    for note in notes.iter_mut() {
        if note.remove_tag(&name) {
            note.touch();
            touched += 1;
        }
    }
    let had_color = colors.remove(&name).is_some();
    (touched, had_color)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::note::Note;

    fn note(id: i64, tags: &[&str]) -> Note {
        Note::new(
            id,
            format!("Note {id}"),
            String::new(),
            tags.iter().map(|t| t.to_string()).collect(),
        )
    }

    #[test]
    fn test_rebuild_counts_and_generated_colors() {
        let notes = vec![note(1, &["a", "b"]), note(2, &["b"])];
        let mut colors = TagColorMap::new();
        let entries = rebuild(&notes, &mut colors);

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].tag, "a");
        assert_eq!(entries[0].count, 1);
        assert_eq!(entries[1].tag, "b");
        assert_eq!(entries[1].count, 2);
        assert_eq!(entries[0].color, crate::color::color_from_string("a"));
        assert_eq!(entries[1].color, crate::color::color_from_string("b"));
    }

    #[test]
    fn test_rebuild_caches_generated_colors_back() {
        let notes = vec![note(1, &["a"])];
        let mut colors = TagColorMap::new();
        rebuild(&notes, &mut colors);
        assert_eq!(colors.get("a"), Some(&crate::color::color_from_string("a")));

        // A second rebuild returns the cached value, not a fresh computation.
        let entries = rebuild(&notes, &mut colors);
        assert_eq!(entries[0].color, colors["a"]);
    }

    #[test]
    fn test_rebuild_includes_zero_usage_map_entries() {
        let notes = vec![note(1, &["used"])];
        let mut colors = TagColorMap::new();
        colors.insert("orphan".to_string(), "#112233".to_string());
        let entries = rebuild(&notes, &mut colors);

        let orphan = entries.iter().find(|e| e.tag == "orphan").unwrap();
        assert_eq!(orphan.count, 0);
        assert_eq!(orphan.color, "#112233");
    }

    #[test]
    fn test_rebuild_sorts_case_insensitively() {
        let notes = vec![note(1, &["beta", "Alpha", "gamma"])];
        let mut colors = TagColorMap::new();
        let entries = rebuild(&notes, &mut colors);
        let names: Vec<&str> = entries.iter().map(|e| e.tag.as_str()).collect();
        assert_eq!(names, vec!["Alpha", "beta", "gamma"]);
    }

    #[test]
    fn test_create_tag_duplicate_and_empty() {
        let mut colors = TagColorMap::new();
        assert!(matches!(create_tag("todo", &mut colors), CreateTag::Created { .. }));
        assert_eq!(create_tag("todo", &mut colors), CreateTag::AlreadyExists);
        assert_eq!(create_tag("   ", &mut colors), CreateTag::EmptyName);
        // Case-sensitive: a different casing is a different tag.
        assert!(matches!(create_tag("Todo", &mut colors), CreateTag::Created { .. }));
    }

    #[test]
    fn test_set_color_no_op_when_unchanged() {
        let mut colors = TagColorMap::new();
        assert!(set_color("t", "#ABC", &mut colors));
        assert_eq!(colors["t"], "#aabbcc");
        assert!(!set_color("t", "aabbcc", &mut colors));
        assert!(set_color("t", "#ffffff", &mut colors));
        assert!(!set_color("", "#ffffff", &mut colors));
    }

    #[test]
    fn test_delete_tag_reports_what_changed() {
        let mut notes = vec![note(1, &["a", "b"]), note(2, &["b"])];
        let mut colors = TagColorMap::new();
        colors.insert("b".to_string(), "#112233".to_string());

        assert_eq!(delete_tag("b", &mut notes, &mut colors), (2, true));
        assert_eq!(notes[0].tags, vec!["a"]);
        assert!(notes[1].tags.is_empty());
        assert_eq!(delete_tag("b", &mut notes, &mut colors), (0, false));
        assert_eq!(delete_tag("missing", &mut notes, &mut colors), (0, false));
    }
}
