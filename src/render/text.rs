//! Text annotations as filled glyph outlines.
//!
//! On screen egui paints text; rasters built off-screen (PNG and PDF export)
//! fill these outlines instead. The face is egui's proportional default so
//! both look alike.

use std::sync::OnceLock;

use bevy::log::{debug, warn};
use bevy_egui::egui::{FontDefinitions, FontFamily};
use rusttype::{Font, OutlineBuilder, Scale, point as rt_point};

use crate::annotation::Point;

use super::surface::PathCommand;

static TEXT_FONT: OnceLock<Option<Font<'static>>> = OnceLock::new();

fn load_text_font() -> Option<Font<'static>> {
    let definitions = FontDefinitions::default();
    let Some(data) = definitions
        .families
        .get(&FontFamily::Proportional)
        .and_then(|names| names.first())
        .and_then(|name| definitions.font_data.get(name))
    else {
        warn!("No proportional font bundled; exported text will be blank");
        return None;
    };

    let font = Font::try_from_vec_and_index(data.font.to_vec(), data.index);
    match &font {
        Some(_) => debug!("Loaded text font for raster export"),
        None => warn!("Bundled proportional font could not be parsed"),
    }
    font
}

/// Shared face for text rasterization, loaded on first use
pub fn text_font() -> Option<&'static Font<'static>> {
    TEXT_FONT.get_or_init(load_text_font).as_ref()
}

/// Collects glyph outlines, shifted to each glyph's pen position
struct OutlineCollector {
    origin: Point,
    commands: Vec<PathCommand>,
}

impl OutlineCollector {
    fn at(&self, x: f32, y: f32) -> Point {
        Point::new(self.origin.x + x, self.origin.y + y)
    }
}

impl OutlineBuilder for OutlineCollector {
    fn move_to(&mut self, x: f32, y: f32) {
        let p = self.at(x, y);
        self.commands.push(PathCommand::MoveTo(p));
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let p = self.at(x, y);
        self.commands.push(PathCommand::LineTo(p));
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        let ctrl = self.at(x1, y1);
        let to = self.at(x, y);
        self.commands.push(PathCommand::QuadTo(ctrl, to));
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        let c1 = self.at(x1, y1);
        let c2 = self.at(x2, y2);
        let to = self.at(x, y);
        self.commands.push(PathCommand::CubicTo(c1, c2, to));
    }

    fn close(&mut self) {
        self.commands.push(PathCommand::Close);
    }
}

/// Outline of `text` with its top-left corner at `anchor`, one line per
/// `\n`. `None` when there is nothing to fill.
pub fn text_outline(
    font: &Font,
    text: &str,
    anchor: Point,
    font_size: f32,
) -> Option<Vec<PathCommand>> {
    if !anchor.is_finite() || !font_size.is_finite() || font_size <= 0.0 {
        return None;
    }

    let scale = Scale::uniform(font_size);
    let v_metrics = font.v_metrics(scale);
    let line_height = v_metrics.ascent - v_metrics.descent + v_metrics.line_gap;

    let mut collector = OutlineCollector {
        origin: anchor,
        commands: Vec::new(),
    };
    let mut baseline = anchor.y + v_metrics.ascent;
    for line in text.lines() {
        for glyph in font.layout(line, scale, rt_point(anchor.x, baseline)) {
            let pen = glyph.position();
            collector.origin = Point::new(pen.x, pen.y);
            // Whitespace has no outline
            glyph.unpositioned().build_outline(&mut collector);
        }
        baseline += line_height;
    }

    (!collector.commands.is_empty()).then_some(collector.commands)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn points(path: &[PathCommand]) -> Vec<Point> {
        path.iter()
            .flat_map(|command| match *command {
                PathCommand::MoveTo(p) | PathCommand::LineTo(p) => vec![p],
                PathCommand::QuadTo(c, p) => vec![c, p],
                PathCommand::CubicTo(c1, c2, p) => vec![c1, c2, p],
                PathCommand::Close => vec![],
                PathCommand::Circle { center, .. } => vec![center],
            })
            .collect()
    }

    #[test]
    fn test_bundled_font_loads() {
        assert!(text_font().is_some());
    }

    #[test]
    fn test_outline_hangs_below_anchor() {
        let font = text_font().expect("font");
        let anchor = Point::new(40.0, 100.0);
        let outline = text_outline(font, "HELLO", anchor, 20.0).expect("outline");

        assert!(matches!(outline.first(), Some(PathCommand::MoveTo(_))));
        assert!(outline.contains(&PathCommand::Close));
        for p in points(&outline) {
            assert!(p.x >= anchor.x - 2.0, "x {} left of anchor", p.x);
            assert!(p.x <= anchor.x + 5.0 * 20.0, "x {} too far right", p.x);
            assert!(p.y >= anchor.y - 1.0, "y {} above anchor", p.y);
            assert!(p.y <= anchor.y + 20.0 * 1.5, "y {} below the line", p.y);
        }
    }

    #[test]
    fn test_second_line_sits_lower() {
        let font = text_font().expect("font");
        let anchor = Point::new(0.0, 0.0);
        let one = text_outline(font, "A", anchor, 20.0).expect("outline");
        let two = text_outline(font, "A\nA", anchor, 20.0).expect("outline");

        let lowest = |path: &[PathCommand]| {
            points(path).iter().map(|p| p.y).fold(f32::MIN, f32::max)
        };
        assert_eq!(two.len(), one.len() * 2);
        assert!(lowest(&two) > lowest(&one) + 15.0);
    }

    #[test]
    fn test_nothing_to_fill() {
        let font = text_font().expect("font");
        let anchor = Point::new(0.0, 0.0);
        assert_eq!(text_outline(font, "", anchor, 16.0), None);
        assert_eq!(text_outline(font, "   ", anchor, 16.0), None);
        assert_eq!(text_outline(font, "hi", anchor, f32::NAN), None);
        assert_eq!(text_outline(font, "hi", anchor, 0.0), None);
        assert_eq!(text_outline(font, "hi", Point::new(f32::INFINITY, 0.0), 16.0), None);
    }
}
