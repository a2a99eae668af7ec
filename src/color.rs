//! Pure color math: hex normalization, RGB/HSL conversion, contrast
//! selection, and deterministic tag colors.

/// Returned for any hex string we cannot make sense of. Color is cosmetic,
/// so malformed input degrades to a neutral gray instead of an error.
pub const FALLBACK_COLOR: &str = "#cccccc";

/// Foreground used on light backgrounds.
pub const DARK_TEXT: &str = "#222222";
/// Foreground used on dark backgrounds.
pub const LIGHT_TEXT: &str = "#ffffff";

const GENERATED_SATURATION: f64 = 0.60;
const GENERATED_LIGHTNESS: f64 = 0.72;

/// Normalize a hex color to lowercase `#rrggbb` form.
///
/// Accepts input with or without a leading `#`, and 3-digit shorthand
/// (each nibble doubled). Anything else yields [`FALLBACK_COLOR`].
pub fn normalize_hex(input: &str) -> String {
    let raw = input.trim().trim_start_matches('#');
    let expanded = match raw.len() {
        3 => raw.chars().flat_map(|c| [c, c]).collect::<String>(),
        6 => raw.to_string(),
        _ => return FALLBACK_COLOR.to_string(),
    };
    if !expanded.chars().all(|c| c.is_ascii_hexdigit()) {
        return FALLBACK_COLOR.to_string();
    }
    format!("#{}", expanded.to_lowercase())
}

/// Decode `#rrggbb` into channels. Malformed input decodes as the fallback.
pub fn hex_to_rgb(hex: &str) -> (u8, u8, u8) {
    let normalized = normalize_hex(hex);
    let digits = &normalized[1..];
    let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).unwrap_or(0);
    (channel(0), channel(2), channel(4))
}

pub fn rgb_to_hex(r: u8, g: u8, b: u8) -> String {
    format!("#{r:02x}{g:02x}{b:02x}")
}

/// Move each channel toward 255 (`percent > 0`) or toward 0 (`percent < 0`)
/// by `|percent|/100` of the remaining distance. Used to derive lighter and
/// darker shades of a base color without a shade table.
pub fn adjust(hex: &str, percent: f64) -> String {
    let (r, g, b) = hex_to_rgb(hex);
    let factor = percent.abs().min(100.0) / 100.0;
    let shift = |c: u8| -> u8 {
        let c = f64::from(c);
        let moved = if percent >= 0.0 {
            c + (255.0 - c) * factor
        } else {
            c - c * factor
        };
        moved.round().clamp(0.0, 255.0) as u8
    };
    rgb_to_hex(shift(r), shift(g), shift(b))
}

/// Standard HSL to RGB conversion. `h` in degrees, `s` and `l` in [0, 1].
pub fn hsl_to_hex(h: f64, s: f64, l: f64) -> String {
    let h = h.rem_euclid(360.0);
    let s = s.clamp(0.0, 1.0);
    let l = l.clamp(0.0, 1.0);

    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let x = c * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
    let m = l - c / 2.0;

    let (r, g, b) = match h {
        h if h < 60.0 => (c, x, 0.0),
        h if h < 120.0 => (x, c, 0.0),
        h if h < 180.0 => (0.0, c, x),
        h if h < 240.0 => (0.0, x, c),
        h if h < 300.0 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };

    let to_channel = |v: f64| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    rgb_to_hex(to_channel(r), to_channel(g), to_channel(b))
}

/// Pick a readable foreground for text drawn on `hex`.
///
/// Luminance is `0.299 R + 0.587 G + 0.114 B` normalized to [0, 1]; above
/// 0.6 the background is light enough for [`DARK_TEXT`], otherwise
/// [`LIGHT_TEXT`].
pub fn readable_text_color(hex: &str) -> &'static str {
    let (r, g, b) = hex_to_rgb(hex);
    let luminance =
        (0.299 * f64::from(r) + 0.587 * f64::from(g) + 0.114 * f64::from(b)) / 255.0;
    if luminance > 0.6 { DARK_TEXT } else { LIGHT_TEXT }
}

/// Deterministic default color for a tag name.
///
/// An additive character-code hash folds the name to a hue; saturation and
/// lightness are fixed so every generated color sits in the same pastel
/// band. The same name always maps to the same color, without any stored
/// state or server round-trip.
pub fn color_from_string(s: &str) -> String {
    let sum: u32 = s.chars().fold(0u32, |acc, c| acc.wrapping_add(c as u32));
    let hue = f64::from(sum % 360);
    hsl_to_hex(hue, GENERATED_SATURATION, GENERATED_LIGHTNESS)
}
