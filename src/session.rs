//! The working session: one explicit context object owning the note
//! collection, tag colors, palette, active filter and save coordinator.
//! Every mutation goes through here so the debounced persist always covers
//! the full current state, and state is never hidden in module globals.

use crate::filter::TagFilter;
use crate::note::{self, Note};
use crate::palette::PaletteStore;
use crate::save::{SaveCoordinator, SaveRequest};
use crate::store::{Gateway, SavePayload, StoreError};
use crate::tags::{self, CreateTag, TagColorMap, TagEntry};
use std::time::Duration;
use tracing::{debug, warn};

/// Outcome of one persisted write, for the surface layer to report.
/// Silent saves only surface failures; explicit saves surface both.
#[derive(Debug)]
pub struct SaveReport {
    pub reason: String,
    pub silent: bool,
    pub outcome: Result<usize, String>,
}

/// Field-level edits applied to one note.
#[derive(Debug, Default)]
pub struct NoteEdit {
    pub title: Option<String>,
    pub body: Option<String>,
    pub add_tags: Vec<String>,
    pub remove_tags: Vec<String>,
}

pub struct Session<G: Gateway> {
    gateway: G,
    saver: SaveCoordinator,
    pub notes: Vec<Note>,
    pub tag_colors: TagColorMap,
    pub palette: PaletteStore,
    pub filter: TagFilter,
}

impl<G: Gateway> Session<G> {
    /// Load the backing document and build a session around it. Missing or
    /// unreadable backing state comes back as empty collections, so a
    /// first run needs no setup.
    pub fn open(gateway: G) -> Result<Self, StoreError> {
        Self::open_with_window(gateway, crate::save::DEBOUNCE_WINDOW)
    }

    pub fn open_with_window(mut gateway: G, window: Duration) -> Result<Self, StoreError> {
        let loaded = gateway.load()?;
        let notes = loaded
            .notes
            .into_iter()
            .map(|mut n| {
                n.tags = note::dedup_tags(n.tags);
                n
            })
            .collect();
        Ok(Self {
            gateway,
            saver: SaveCoordinator::new(window),
            notes,
            tag_colors: loaded.tag_colors,
            palette: PaletteStore::from_saved(loaded.saved_colors),
            filter: TagFilter::new(),
        })
    }

    // ----- notes -----

    pub fn add_note(&mut self, title: String, body: String, tags: Vec<String>) -> &Note {
        let id = note::next_id(&self.notes);
        self.notes.push(Note::new(id, title, body, tags));
        self.saver.schedule("add-note", true);
        self.notes.last().expect("just pushed")
    }

    pub fn find_note(&self, id: i64) -> Option<&Note> {
        self.notes.iter().find(|n| n.id == id)
    }

    /// Apply edits to one note. Returns whether anything changed; only a
    /// real change schedules a save.
    pub fn edit_note(&mut self, id: i64, edit: NoteEdit) -> Option<bool> {
        let note = self.notes.iter_mut().find(|n| n.id == id)?;
        let mut changed = false;
        if let Some(title) = edit.title {
            if note.title != title {
                note.title = title;
                changed = true;
            }
        }
        if let Some(body) = edit.body {
            if note.body != body {
                note.body = body;
                changed = true;
            }
        }
        for tag in &edit.add_tags {
            changed |= note.add_tag(tag);
        }
        for tag in &edit.remove_tags {
            changed |= note.remove_tag(tag);
        }
        if changed {
            note.touch();
            self.saver.schedule("edit-note", true);
        }
        Some(changed)
    }

    pub fn delete_notes(&mut self, ids: &[i64]) -> usize {
        let before = self.notes.len();
        self.notes.retain(|n| !ids.contains(&n.id));
        let deleted = before - self.notes.len();
        if deleted > 0 {
            self.saver.schedule("delete-note", true);
        }
        deleted
    }

    /// Notes passing the active filter, in collection order.
    pub fn visible_notes(&self) -> Vec<&Note> {
        self.filter.apply(&self.notes)
    }

    // ----- tag library -----

    /// Current tag library view. Compute-or-insert: tags without a stored
    /// color get their generated default cached into the color map here,
    /// and a cache insertion schedules a silent save so the assignment
    /// survives the session.
    pub fn tag_library(&mut self) -> Vec<TagEntry> {
        let before = self.tag_colors.len();
        let entries = tags::rebuild(&self.notes, &mut self.tag_colors);
        if self.tag_colors.len() != before {
            self.saver.schedule("tag-color-cache", true);
        }
        entries
    }

    pub fn create_tag(&mut self, name: &str) -> CreateTag {
        let outcome = tags::create_tag(name, &mut self.tag_colors);
        if matches!(outcome, CreateTag::Created { .. }) {
            self.saver.schedule("create-tag", true);
        }
        outcome
    }

    pub fn set_tag_color(&mut self, name: &str, hex: &str) -> bool {
        let changed = tags::set_color(name, hex, &mut self.tag_colors);
        if changed {
            self.saver.schedule("tag-color-change", true);
        }
        changed
    }

    /// Destructive: strips the tag from every note and forgets its color.
    /// The caller is responsible for confirmation before calling.
    pub fn delete_tag(&mut self, name: &str) -> (usize, bool) {
        let (touched, map_changed) = tags::delete_tag(name, &mut self.notes, &mut self.tag_colors);
        if touched > 0 || map_changed {
            self.saver.schedule("remove-tag", true);
        }
        (touched, map_changed)
    }

    // ----- palette -----

    pub fn palette_add(&mut self, hex: &str) -> bool {
        let changed = self.palette.add(hex);
        if changed {
            self.saver.schedule("palette-add", true);
        }
        changed
    }

    pub fn palette_remove(&mut self, index: usize) -> bool {
        let changed = self.palette.remove(index);
        if changed {
            self.saver.schedule("palette-remove", true);
        }
        changed
    }

    pub fn palette_clear(&mut self) -> bool {
        let changed = self.palette.clear();
        if changed {
            self.saver.schedule("palette-clear", true);
        }
        changed
    }

    // ----- persistence -----

    /// Explicit user save: same debounce path, but the outcome is
    /// user-visible.
    pub fn request_save(&mut self) {
        self.saver.schedule("manual-save", false);
    }

    pub fn has_pending_save(&self) -> bool {
        self.saver.is_pending()
    }

    /// Fire the pending save if its quiet period has elapsed.
    pub fn pump(&mut self) -> Option<SaveReport> {
        let request = self.saver.take_due()?;
        Some(self.persist(request))
    }

    /// Fire the pending save immediately, if any. Called before shutdown
    /// so no scheduled write is lost.
    pub fn flush(&mut self) -> Option<SaveReport> {
        let request = self.saver.flush()?;
        Some(self.persist(request))
    }

    fn persist(&mut self, request: SaveRequest) -> SaveReport {
        let payload = SavePayload {
            notes: &self.notes,
            tag_colors: &self.tag_colors,
            saved_colors: self.palette.colors(),
        };
        match self.gateway.save(&payload) {
            Ok(echo) => {
                debug!(reason = %request.reason, saved = echo.saved, "persisted collection");
                // Reconcile: the gateway may have normalized or rejected
                // individual color entries.
                self.tag_colors = echo.tag_colors;
                self.palette = PaletteStore::from_saved(echo.saved_colors);
                SaveReport {
                    reason: request.reason,
                    silent: request.silent,
                    outcome: Ok(echo.saved),
                }
            }
            Err(e) => {
                // Optimistic-local: in-memory state stays as it was; the
                // next mutation reschedules a fresh attempt.
                warn!(reason = %request.reason, error = %e, "save failed, keeping local state");
                SaveReport {
                    reason: request.reason,
                    silent: request.silent,
                    outcome: Err(e.to_string()),
                }
            }
        }
    }
}
