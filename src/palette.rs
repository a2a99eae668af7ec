//! User-saved custom colors, independent of tag assignment. A small FIFO
//! list bounded to the most recent 24 insertions.

use crate::color;

pub const MAX_SAVED_COLORS: usize = 24;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaletteStore {
    colors: Vec<String>,
}

impl PaletteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from persisted data: normalize every entry, drop duplicates
    /// (keeping first occurrence), and keep only the newest entries if the
    /// stored list somehow exceeds the bound.
    pub fn from_saved(saved: Vec<String>) -> Self {
        let mut store = Self::new();
        for hex in saved {
            store.add(&hex);
        }
        store
    }

    /// Append a normalized color. Adding a color already present is a no-op
    /// (no re-insert, no reorder). Overflow evicts the oldest entry.
    /// Returns whether the list changed.
    pub fn add(&mut self, hex: &str) -> bool {
        let normalized = color::normalize_hex(hex);
        if self.colors.iter().any(|c| c == &normalized) {
            return false;
        }
        self.colors.push(normalized);
        if self.colors.len() > MAX_SAVED_COLORS {
            self.colors.remove(0);
        }
        true
    }

    /// Remove by position. Out-of-range indices are a no-op.
    pub fn remove(&mut self, index: usize) -> bool {
        if index >= self.colors.len() {
            return false;
        }
        self.colors.remove(index);
        true
    }

    pub fn clear(&mut self) -> bool {
        if self.colors.is_empty() {
            return false;
        }
        self.colors.clear();
        true
    }

    pub fn colors(&self) -> &[String] {
        &self.colors
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.colors.clone()
    }
}
