use crate::color;
use chrono::{DateTime, FixedOffset};
use yansi::Paint;

/// Theme colors for the chrome around note content (ids, timestamps,
/// headers). Tag chips use the per-tag colors from the library instead.
pub struct Theme {
    pub muted: (u8, u8, u8),
    pub header: (u8, u8, u8),
    pub timestamp: (u8, u8, u8),
    pub accent: (u8, u8, u8),
}

impl Theme {
    pub const CATPPUCCIN: Self = Self {
        muted: (108, 112, 134),     // Gray
        header: (148, 226, 213),    // Teal
        timestamp: (137, 180, 250), // Blue
        accent: (249, 226, 175),    // Yellow
    };
}

/// Formatting context threaded through all CLI output.
pub struct FormatContext {
    pub use_color: bool,
    pub theme: Theme,
}

impl FormatContext {
    pub fn new(use_color: bool) -> Self {
        Self { use_color, theme: Theme::CATPPUCCIN }
    }

    pub fn from_env() -> Self {
        Self::new(std::env::var("NO_COLOR").is_err())
    }

    pub fn format_id(&self, id: i64) -> String {
        let text = id.to_string();
        if self.use_color {
            let (r, g, b) = self.theme.muted;
            Paint::rgb(text.as_str(), r, g, b).to_string()
        } else {
            text
        }
    }

    pub fn format_header(&self, text: &str) -> String {
        if self.use_color {
            let (r, g, b) = self.theme.header;
            Paint::rgb(text, r, g, b).bold().to_string()
        } else {
            text.to_string()
        }
    }

    pub fn format_timestamp(&self, ts: &DateTime<FixedOffset>) -> String {
        let text = ts.format("%d%b%y %H:%M").to_string();
        if self.use_color {
            let (r, g, b) = self.theme.timestamp;
            Paint::rgb(text.as_str(), r, g, b).to_string()
        } else {
            text
        }
    }

    pub fn format_accent(&self, text: &str) -> String {
        if self.use_color {
            let (r, g, b) = self.theme.accent;
            Paint::rgb(text, r, g, b).bold().to_string()
        } else {
            text.to_string()
        }
    }

    pub fn format_muted(&self, text: &str) -> String {
        if self.use_color {
            let (r, g, b) = self.theme.muted;
            Paint::rgb(text, r, g, b).dim().to_string()
        } else {
            text.to_string()
        }
    }

    /// A tag chip: the tag's library color as background, with the
    /// luminance-picked foreground so the label stays readable on any
    /// generated color.
    pub fn format_tag(&self, tag: &str, hex: &str) -> String {
        let label = format!("#{tag}");
        if self.use_color {
            let (br, bg, bb) = color::hex_to_rgb(hex);
            let (fr, fg, fb) = color::hex_to_rgb(color::readable_text_color(hex));
            Paint::rgb(label.as_str(), fr, fg, fb).on_rgb(br, bg, bb).bold().to_string()
        } else {
            label
        }
    }

    /// A solid swatch block for palette listings.
    pub fn format_swatch(&self, hex: &str) -> String {
        if self.use_color {
            let (r, g, b) = color::hex_to_rgb(hex);
            Paint::rgb("██", r, g, b).to_string()
        } else {
            "  ".to_string()
        }
    }

    /// The tag library as an aligned chip / count / color listing. Column
    /// widths come from the plain tag names and counts, so painted chips
    /// never skew the layout and no escape-sequence measuring is needed.
    pub fn format_tag_table(&self, entries: &[crate::tags::TagEntry]) -> String {
        let chip_width = entries
            .iter()
            .map(|e| e.tag.chars().count() + 1)
            .max()
            .unwrap_or(0)
            .max("Tag".len());
        let count_width = entries
            .iter()
            .map(|e| e.count.to_string().len())
            .max()
            .unwrap_or(0)
            .max("Count".len());

        let mut out =
            self.format_header(&format!("{:<chip_width$}  {:>count_width$}  Color", "Tag", "Count"));
        for entry in entries {
            let pad = chip_width - (entry.tag.chars().count() + 1);
            out.push('\n');
            out.push_str(&self.format_tag(&entry.tag, &entry.color));
            out.push_str(&" ".repeat(pad));
            out.push_str(&format!("  {:>count_width$}  {}", entry.count, entry.color));
        }
        out
    }

    pub fn format_tag_list(&self, tags: &[String], colors: &crate::tags::TagColorMap) -> String {
        tags.iter()
            .map(|tag| {
                let hex = colors
                    .get(tag)
                    .cloned()
                    .unwrap_or_else(|| color::color_from_string(tag));
                self.format_tag(tag, &hex)
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}
