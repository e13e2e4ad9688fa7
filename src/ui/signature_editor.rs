//! Signature pad modal.
//!
//! Strokes are collected in pad pixels, rasterized with the same tiny-skia
//! surface the overlay uses, and stored on the annotation as a PNG data URL.

use bevy::prelude::*;
use bevy_egui::{EguiContexts, egui};
use image::RgbaImage;

use crate::annotation::{Point, Rgba8};
use crate::constants::{SIGNATURE_PAD_HEIGHT, SIGNATURE_PAD_WIDTH};
use crate::drawing::signature_annotation;
use crate::editor::{AnnotationEditorRequest, DrawSettings};
use crate::render::{PixmapSurface, SignatureCache, Surface, encode_png_data_url, path};
use crate::store::AnnotationStore;

const PEN_WIDTH: f32 = 2.0;

#[derive(Resource, Default)]
pub struct SignatureEditorState {
    pub is_open: bool,
    pub anchor: Point,
    pub page: u32,
    /// Strokes in pad pixels
    pub strokes: Vec<Vec<Point>>,
}

impl SignatureEditorState {
    pub fn open(&mut self, anchor: Point, page: u32) {
        self.is_open = true;
        self.anchor = anchor;
        self.page = page;
        self.strokes.clear();
    }

    pub fn close(&mut self) {
        self.is_open = false;
        self.strokes.clear();
    }

    pub fn has_ink(&self) -> bool {
        self.strokes.iter().any(|s| !s.is_empty())
    }
}

/// Rasterize pad strokes in black on a transparent background
pub fn rasterize_signature(strokes: &[Vec<Point>], width: u32, height: u32) -> Option<RgbaImage> {
    let mut surface = PixmapSurface::new(width, height)?;
    surface.clear();
    surface.reset_transform();

    for stroke in strokes {
        match stroke.as_slice() {
            [] => {}
            [dot] => {
                if let Some(circle) = path::circle(*dot, PEN_WIDTH / 2.0) {
                    surface.fill_path(&circle, Rgba8::BLACK, 1.0);
                }
            }
            points => {
                if let Some(line) = path::polyline(points) {
                    surface.stroke_path(&line, Rgba8::BLACK, PEN_WIDTH);
                }
            }
        }
    }
    Some(surface.to_rgba_image())
}

pub fn open_signature_editor(
    mut requests: MessageReader<AnnotationEditorRequest>,
    mut state: ResMut<SignatureEditorState>,
) {
    for request in requests.read() {
        if let AnnotationEditorRequest::Signature { anchor, page } = request {
            state.open(*anchor, *page);
        }
    }
}

pub fn signature_editor_ui(
    mut contexts: EguiContexts,
    mut state: ResMut<SignatureEditorState>,
    settings: Res<DrawSettings>,
    mut store: ResMut<AnnotationStore>,
    mut cache: ResMut<SignatureCache>,
) -> Result {
    if !state.is_open {
        return Ok(());
    }

    let mut should_add = false;
    let mut should_close = false;

    egui::Window::new("Add Signature")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(contexts.ctx_mut()?, |ui| {
            ui.label("Draw your signature below");
            ui.add_space(4.0);

            let (response, painter) = ui.allocate_painter(
                egui::vec2(SIGNATURE_PAD_WIDTH, SIGNATURE_PAD_HEIGHT),
                egui::Sense::drag(),
            );
            let rect = response.rect;
            painter.rect_filled(rect, 4.0, egui::Color32::WHITE);

            if response.drag_started() {
                state.strokes.push(Vec::new());
            }
            if response.dragged()
                && let Some(pos) = response.interact_pointer_pos()
                && rect.contains(pos)
                && let Some(stroke) = state.strokes.last_mut()
            {
                let local = Point::new(pos.x - rect.min.x, pos.y - rect.min.y);
                if stroke.last() != Some(&local) {
                    stroke.push(local);
                }
            }

            let pen = egui::Stroke::new(PEN_WIDTH, egui::Color32::BLACK);
            for stroke in &state.strokes {
                let points: Vec<egui::Pos2> = stroke
                    .iter()
                    .map(|p| rect.min + egui::vec2(p.x, p.y))
                    .collect();
                match points.len() {
                    0 => {}
                    1 => {
                        painter.circle_filled(points[0], PEN_WIDTH / 2.0, egui::Color32::BLACK);
                    }
                    _ => {
                        painter.add(egui::Shape::line(points, pen));
                    }
                }
            }

            ui.add_space(8.0);
            ui.horizontal(|ui| {
                if ui.button("Clear").clicked() {
                    state.strokes.clear();
                }
                if ui
                    .add_enabled(state.has_ink(), egui::Button::new("Add Signature"))
                    .clicked()
                {
                    should_add = true;
                }
                if ui.button("Cancel").clicked() {
                    should_close = true;
                }
            });
        });

    if should_add {
        let image = rasterize_signature(
            &state.strokes,
            SIGNATURE_PAD_WIDTH as u32,
            SIGNATURE_PAD_HEIGHT as u32,
        );
        match image.map(|image| encode_png_data_url(&image).map(|url| (url, image))) {
            Some(Ok((url, image))) => {
                let stamp = settings.stamp(state.page.max(1));
                store.add(signature_annotation(state.anchor, url.clone(), &stamp));
                cache.insert_ready(url, image);
                info!("Added signature on page {}", state.page);
            }
            Some(Err(e)) => error!("Failed to encode signature: {}", e),
            None => error!("Failed to allocate signature raster"),
        }
        state.close();
    }
    if should_close {
        state.close();
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::decode_data_url;

    #[test]
    fn test_empty_pad_has_no_ink() {
        let mut state = SignatureEditorState::default();
        state.open(Point::new(1.0, 2.0), 1);
        assert!(!state.has_ink());
        state.strokes.push(Vec::new());
        assert!(!state.has_ink());
        state.strokes.push(vec![Point::new(5.0, 5.0)]);
        assert!(state.has_ink());
    }

    #[test]
    fn test_rasterized_strokes_are_black_on_transparent() {
        let strokes = vec![vec![Point::new(10.0, 50.0), Point::new(390.0, 50.0)]];
        let image = rasterize_signature(&strokes, 400, 200).expect("raster");

        assert_eq!(image.dimensions(), (400, 200));
        assert!(image.get_pixel(200, 50)[3] > 200);
        assert_eq!(image.get_pixel(200, 50)[0], 0);
        assert_eq!(image.get_pixel(200, 150)[3], 0);
    }

    #[test]
    fn test_signature_survives_data_url() {
        let strokes = vec![vec![Point::new(20.0, 20.0), Point::new(80.0, 90.0)]];
        let image = rasterize_signature(&strokes, 400, 200).expect("raster");
        let url = encode_png_data_url(&image).expect("encode");
        assert!(url.starts_with("data:image/png;base64,"));
        assert_eq!(decode_data_url(&url).expect("decode"), image);
    }
}
