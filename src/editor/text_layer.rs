//! Text annotations, painted by egui over the overlay sprite.
//!
//! The on-screen overlay leaves text out; glyphs come from egui's font atlas
//! instead. Exports fill outlines of the same face (see `render::text`).

use bevy::prelude::*;
use bevy_egui::{EguiContexts, egui};

use crate::annotation::{Shape, parse_color_or_black};
use crate::document::OpenDocument;
use crate::store::AnnotationStore;
use crate::transform::ViewportTransform;

use super::surface::SurfaceLayout;

pub fn text_color(color: &str) -> egui::Color32 {
    let c = parse_color_or_black(color);
    egui::Color32::from_rgba_unmultiplied(c.r, c.g, c.b, c.a)
}

pub fn draw_text_annotations(
    mut contexts: EguiContexts,
    store: Res<AnnotationStore>,
    doc: Res<OpenDocument>,
    viewport: Res<ViewportTransform>,
    layout: Res<SurfaceLayout>,
) -> Result {
    let Some(origin) = layout.origin.filter(|_| doc.is_open() && layout.is_ready()) else {
        return Ok(());
    };

    let ctx = contexts.ctx_mut()?;
    let clip = egui::Rect::from_min_size(
        egui::pos2(origin.x, origin.y),
        egui::vec2(layout.size.x, layout.size.y),
    );
    let painter = ctx
        .layer_painter(egui::LayerId::background())
        .with_clip_rect(clip);

    for annotation in store.for_page(doc.page.max(1)) {
        let Shape::Text {
            anchor,
            text,
            font_size,
        } = &annotation.shape
        else {
            continue;
        };
        if !anchor.is_finite() || !font_size.is_finite() {
            continue;
        }

        let pos = viewport.to_device(*anchor, origin);
        painter.text(
            egui::pos2(pos.x, pos.y),
            egui::Align2::LEFT_TOP,
            text,
            egui::FontId::proportional((font_size * viewport.zoom).max(1.0)),
            text_color(&annotation.color),
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_color_falls_back_to_black() {
        assert_eq!(text_color("#ff0000"), egui::Color32::from_rgb(255, 0, 0));
        assert_eq!(text_color("nonsense"), egui::Color32::BLACK);
    }
}
