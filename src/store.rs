//! Persistence boundary. The engine only ever sees `load` and `save` over
//! a whole JSON document; this module provides the trait plus the file
//! implementation the CLI uses.
//!
//! Load policy: a missing backing file is a clean first run, not an error.
//! Malformed content degrades to the same empty-but-usable state with a
//! logged warning. Any other read error propagates: a store that exists
//! but cannot be read must not be clobbered by a later write. Save policy: the caller's in-memory state is left alone
//! on failure; on success the gateway echoes the tag colors and saved
//! colors it actually stored (normalized) so the caller can reconcile.

use crate::color;
use crate::note::Note;
use crate::palette::PaletteStore;
use crate::tags::TagColorMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::warn;

pub const STORE_FILE: &str = "notes.json";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store io error: {0}")]
    Io(#[from] io::Error),
    #[error("store encoding error: {0}")]
    Encode(#[from] serde_json::Error),
}

/// The backing JSON document. External field names are fixed wire contract.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VaultDoc {
    #[serde(default)]
    notes: Vec<Note>,
    #[serde(default)]
    tag_colors: TagColorMap,
    #[serde(default)]
    saved_colors: Vec<String>,
}

/// Everything a load produces. Defaults are empty collections.
#[derive(Debug, Default)]
pub struct LoadedState {
    pub notes: Vec<Note>,
    pub tag_colors: TagColorMap,
    pub saved_colors: Vec<String>,
}

/// Full in-memory state handed to `save`. Always the entire collection,
/// never a diff.
#[derive(Debug)]
pub struct SavePayload<'a> {
    pub notes: &'a [Note],
    pub tag_colors: &'a TagColorMap,
    pub saved_colors: &'a [String],
}

/// What a successful save confirms: how many notes were written, plus the
/// stored color state for reconciliation.
#[derive(Debug)]
pub struct SaveEcho {
    pub saved: usize,
    pub tag_colors: TagColorMap,
    pub saved_colors: Vec<String>,
}

pub trait Gateway {
    fn load(&mut self) -> Result<LoadedState, StoreError>;
    fn save(&mut self, payload: &SavePayload<'_>) -> Result<SaveEcho, StoreError>;
}

/// JSON-file-backed gateway. The write rewrites the whole document, the
/// same shape the thin server endpoints used.
#[derive(Debug)]
pub struct JsonFileGateway {
    path: PathBuf,
}

impl JsonFileGateway {
    pub fn new(dir: &Path) -> Self {
        Self { path: dir.join(STORE_FILE) }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Gateway for JsonFileGateway {
    fn load(&mut self) -> Result<LoadedState, StoreError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Ok(LoadedState::default());
            }
            Err(e) => return Err(e.into()),
        };

        let doc: VaultDoc = match serde_json::from_str(&raw) {
            Ok(doc) => doc,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e,
                    "backing store unreadable, starting from empty state");
                VaultDoc::default()
            }
        };

        Ok(LoadedState {
            notes: doc.notes,
            tag_colors: normalize_tag_colors(doc.tag_colors),
            saved_colors: doc.saved_colors,
        })
    }

    fn save(&mut self, payload: &SavePayload<'_>) -> Result<SaveEcho, StoreError> {
        let tag_colors = normalize_tag_colors(payload.tag_colors.clone());
        let saved_colors = PaletteStore::from_saved(payload.saved_colors.to_vec()).to_vec();

        let doc = VaultDoc {
            notes: payload.notes.to_vec(),
            tag_colors: tag_colors.clone(),
            saved_colors: saved_colors.clone(),
        };
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(&doc)?)?;

        Ok(SaveEcho { saved: doc.notes.len(), tag_colors, saved_colors })
    }
}

/// The gateway is allowed to normalize individual entries: empty tag names
/// are dropped, color values are forced to `#rrggbb`.
fn normalize_tag_colors(colors: TagColorMap) -> TagColorMap {
    colors
        .into_iter()
        .filter_map(|(tag, hex)| {
            let tag = tag.trim().to_string();
            if tag.is_empty() {
                return None;
            }
            Some((tag, color::normalize_hex(&hex)))
        })
        .collect()
}
