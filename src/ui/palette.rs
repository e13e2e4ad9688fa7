//! Color families offered in the tool settings bar.

use bevy_egui::egui::Color32;

use crate::annotation::{Rgba8, parse_color};

pub struct ColorFamily {
    pub name: &'static str,
    /// (hex, name)
    pub colors: [(&'static str, &'static str); 4],
}

pub const COLOR_FAMILIES: [ColorFamily; 6] = [
    ColorFamily {
        name: "Classic",
        colors: [
            ("#000000", "Black"),
            ("#ffffff", "White"),
            ("#808080", "Gray"),
            ("#c0c0c0", "Silver"),
        ],
    },
    ColorFamily {
        name: "Reds",
        colors: [
            ("#ff0000", "Red"),
            ("#dc143c", "Crimson"),
            ("#8b0000", "Dark Red"),
            ("#ffb6c1", "Light Pink"),
        ],
    },
    ColorFamily {
        name: "Blues",
        colors: [
            ("#0000ff", "Blue"),
            ("#4169e1", "Royal Blue"),
            ("#000080", "Navy"),
            ("#87ceeb", "Sky Blue"),
        ],
    },
    ColorFamily {
        name: "Greens",
        colors: [
            ("#008000", "Green"),
            ("#228b22", "Forest Green"),
            ("#006400", "Dark Green"),
            ("#90ee90", "Light Green"),
        ],
    },
    ColorFamily {
        name: "Warm",
        colors: [
            ("#ff4500", "Orange Red"),
            ("#ffa500", "Orange"),
            ("#ffff00", "Yellow"),
            ("#ffd700", "Gold"),
        ],
    },
    ColorFamily {
        name: "Cool",
        colors: [
            ("#00ffff", "Cyan"),
            ("#40e0d0", "Turquoise"),
            ("#800080", "Purple"),
            ("#4b0082", "Indigo"),
        ],
    },
];

/// egui color for a stored color string; unparseable values show as black
pub fn swatch(color: &str) -> Color32 {
    parse_color(color)
        .map(|c| Color32::from_rgb(c.r, c.g, c.b))
        .unwrap_or(Color32::BLACK)
}

/// Whether two color strings name the same color, ignoring case and format
pub fn same_color(a: &str, b: &str) -> bool {
    match (parse_color(a), parse_color(b)) {
        (Some(a), Some(b)) => a == b,
        _ => a.eq_ignore_ascii_case(b),
    }
}

pub fn to_hex(color: Color32) -> String {
    Rgba8::rgb(color.r(), color.g(), color.b()).to_hex()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_palette_entry_parses() {
        for family in &COLOR_FAMILIES {
            for (hex, name) in family.colors {
                assert!(parse_color(hex).is_some(), "{} ({}) failed to parse", name, hex);
            }
        }
    }

    #[test]
    fn test_same_color_ignores_case() {
        assert!(same_color("#FF0000", "#ff0000"));
        assert!(!same_color("#ff0000", "#00ff00"));
    }

    #[test]
    fn test_hex_round_trip_through_swatch() {
        assert_eq!(to_hex(swatch("#4169e1")), "#4169e1");
        assert_eq!(swatch("not a color"), Color32::BLACK);
    }
}
