//! Stroke color strings.
//!
//! Colors travel through the editor as CSS-style strings (`#rgb`, `#rrggbb`,
//! `#rrggbbaa` or a handful of names) so that exported snapshots stay readable.

use crate::constants::DEFAULT_STROKE_COLOR;

/// Straight-alpha RGBA color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    pub const BLACK: Rgba8 = Rgba8::rgb(0, 0, 0);
    pub const WHITE: Rgba8 = Rgba8::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub fn to_hex(self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

/// Substitute the default stroke color when the selected color is blank
pub fn resolve_color(selected: &str) -> String {
    let trimmed = selected.trim();
    if trimmed.is_empty() {
        DEFAULT_STROKE_COLOR.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Parse a color string, returning `None` when it isn't understood
pub fn parse_color(value: &str) -> Option<Rgba8> {
    let value = value.trim();
    if let Some(hex) = value.strip_prefix('#') {
        return parse_hex(hex);
    }

    let named = match value.to_ascii_lowercase().as_str() {
        "black" => Rgba8::BLACK,
        "white" => Rgba8::WHITE,
        "red" => Rgba8::rgb(255, 0, 0),
        "green" => Rgba8::rgb(0, 128, 0),
        "blue" => Rgba8::rgb(0, 0, 255),
        "yellow" => Rgba8::rgb(255, 255, 0),
        "orange" => Rgba8::rgb(255, 165, 0),
        "purple" => Rgba8::rgb(128, 0, 128),
        "gray" | "grey" => Rgba8::rgb(128, 128, 128),
        _ => return None,
    };
    Some(named)
}

/// Parse a color string, falling back to black
pub fn parse_color_or_black(value: &str) -> Rgba8 {
    parse_color(value).unwrap_or(Rgba8::BLACK)
}

fn parse_hex(hex: &str) -> Option<Rgba8> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }

    let channel = |s: &str| u8::from_str_radix(s, 16).ok();
    let short = |c: &str| channel(c).map(|v| v * 17);

    match hex.len() {
        3 => Some(Rgba8::rgb(
            short(&hex[0..1])?,
            short(&hex[1..2])?,
            short(&hex[2..3])?,
        )),
        6 => Some(Rgba8::rgb(
            channel(&hex[0..2])?,
            channel(&hex[2..4])?,
            channel(&hex[4..6])?,
        )),
        8 => Some(Rgba8 {
            r: channel(&hex[0..2])?,
            g: channel(&hex[2..4])?,
            b: channel(&hex[4..6])?,
            a: channel(&hex[6..8])?,
        }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_color_resolves_to_black() {
        assert_eq!(resolve_color(""), "#000000");
        assert_eq!(resolve_color("   "), "#000000");
        assert_eq!(resolve_color("#FF0000"), "#FF0000");
    }

    #[test]
    fn test_parse_hex_forms() {
        assert_eq!(parse_color("#FF0000"), Some(Rgba8::rgb(255, 0, 0)));
        assert_eq!(parse_color("#0f0"), Some(Rgba8::rgb(0, 255, 0)));
        assert_eq!(
            parse_color("#0000ff80"),
            Some(Rgba8 { r: 0, g: 0, b: 255, a: 128 })
        );
    }

    #[test]
    fn test_parse_named_and_invalid() {
        assert_eq!(parse_color("Blue"), Some(Rgba8::rgb(0, 0, 255)));
        assert_eq!(parse_color("#12345"), None);
        assert_eq!(parse_color("#zzzzzz"), None);
        assert_eq!(parse_color_or_black("not a color"), Rgba8::BLACK);
    }

    #[test]
    fn test_to_hex() {
        assert_eq!(Rgba8::rgb(255, 16, 0).to_hex(), "#ff1000");
    }
}
