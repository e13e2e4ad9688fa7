//! Page raster plus annotation overlay, flattened into one image.

use bevy::math::Vec2;
use image::RgbaImage;

use crate::annotation::{Annotation, Rgba8};
use crate::constants::EXPORT_OVERLAY_ALPHA;
use crate::document::PageSize;
use crate::drawing::DrawingState;
use crate::render::{Frame, ImageLookup, PixmapSurface, render_frame, text_font};
use crate::transform::ViewportTransform;

use super::ExportError;

/// Origin and size that fit `source` inside `target`, preserving the aspect
/// ratio and centering the leftover space
pub fn fit_centered(source: Vec2, target: Vec2) -> (Vec2, Vec2) {
    if source.x <= 0.0 || source.y <= 0.0 {
        return (Vec2::ZERO, target);
    }
    let ratio = (target.x / source.x).min(target.y / source.y);
    let size = source * ratio;
    ((target - size) / 2.0, size)
}

pub struct CompositeInput<'a> {
    /// Rasterized page, if rendering succeeded
    pub page_image: Option<&'a RgbaImage>,
    pub page_size: PageSize,
    pub page: u32,
    pub annotations: &'a [Annotation],
    pub images: &'a dyn ImageLookup,
}

/// Flatten the current page and its annotations.
///
/// The canvas is page-sized in logical units. The page raster is fitted and
/// centered on white; the overlay, rendered at zoom 1 with no pan, is drawn
/// on top at reduced opacity. Without a page raster the overlay goes straight
/// onto white.
pub fn compose(input: &CompositeInput) -> Result<RgbaImage, ExportError> {
    let (width, height) = input.page_size.pixels(1.0);
    let canvas_size = Vec2::new(width as f32, height as f32);

    let mut overlay = PixmapSurface::new(width, height).ok_or(ExportError::EmptyImage)?;
    let idle = DrawingState::Idle;
    render_frame(
        &mut overlay,
        &Frame {
            annotations: input.annotations,
            page: input.page,
            viewport: ViewportTransform::default(),
            drawing: &idle,
            preview_color: "",
            preview_width: 0.0,
            selection: None,
            images: input.images,
            text_font: text_font(),
        },
    );

    let mut canvas = PixmapSurface::new(width, height).ok_or(ExportError::EmptyImage)?;
    canvas.fill_color(Rgba8::WHITE);

    if let Some(page_image) = input.page_image {
        let source = Vec2::new(page_image.width() as f32, page_image.height() as f32);
        let (origin, size) = fit_centered(source, canvas_size);
        canvas.draw_image_with_opacity(page_image, origin, size, 1.0);
    }

    canvas.draw_image_with_opacity(
        &overlay.to_rgba_image(),
        Vec2::ZERO,
        canvas_size,
        EXPORT_OVERLAY_ALPHA,
    );
    Ok(canvas.to_rgba_image())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::{Point, Shape, Stamp};
    use crate::render::NoImages;

    fn page_size() -> PageSize {
        PageSize {
            width: 100.0,
            height: 60.0,
        }
    }

    fn line_on_page_one() -> Vec<Annotation> {
        let stamp = Stamp {
            color: "#000000".to_string(),
            stroke_width: 6.0,
            page: 1,
            timestamp_ms: 0,
        };
        vec![Annotation::create(
            Shape::line(Point::new(0.0, 30.0), Point::new(100.0, 30.0)),
            &stamp,
        )]
    }

    #[test]
    fn test_fit_centered_letterboxes() {
        let (origin, size) = fit_centered(Vec2::new(200.0, 100.0), Vec2::new(100.0, 100.0));
        assert_eq!(size, Vec2::new(100.0, 50.0));
        assert_eq!(origin, Vec2::new(0.0, 25.0));

        let (origin, size) = fit_centered(Vec2::new(50.0, 100.0), Vec2::new(100.0, 100.0));
        assert_eq!(size, Vec2::new(50.0, 100.0));
        assert_eq!(origin, Vec2::new(25.0, 0.0));
    }

    #[test]
    fn test_overlay_drawn_at_reduced_opacity_over_white() {
        let annotations = line_on_page_one();
        let image = compose(&CompositeInput {
            page_image: None,
            page_size: page_size(),
            page: 1,
            annotations: &annotations,
            images: &NoImages,
        })
        .unwrap();

        assert_eq!(image.dimensions(), (100, 60));
        assert_eq!(image.get_pixel(50, 5).0, [255, 255, 255, 255]);
        // Black at 0.8 over white
        let [r, _, _, a] = image.get_pixel(50, 30).0;
        assert!((45..=60).contains(&r), "got {}", r);
        assert_eq!(a, 255);
    }

    #[test]
    fn test_page_raster_is_centered() {
        // Square gray raster on a wide page: gray in the middle, white margins
        let raster = RgbaImage::from_pixel(30, 30, image::Rgba([100, 100, 100, 255]));
        let image = compose(&CompositeInput {
            page_image: Some(&raster),
            page_size: page_size(),
            page: 1,
            annotations: &[],
            images: &NoImages,
        })
        .unwrap();

        assert_eq!(image.get_pixel(50, 30).0, [100, 100, 100, 255]);
        assert_eq!(image.get_pixel(5, 30).0, [255, 255, 255, 255]);
        assert_eq!(image.get_pixel(95, 30).0, [255, 255, 255, 255]);
    }

    #[test]
    fn test_text_is_rasterized_into_export() {
        let stamp = Stamp {
            color: "#000000".to_string(),
            stroke_width: 2.0,
            page: 1,
            timestamp_ms: 0,
        };
        let annotations = vec![Annotation::create(
            Shape::text(Point::new(10.0, 10.0), "HELLO WORLD", 30.0),
            &stamp,
        )];
        let image = compose(&CompositeInput {
            page_image: None,
            page_size: PageSize {
                width: 300.0,
                height: 80.0,
            },
            page: 1,
            annotations: &annotations,
            images: &NoImages,
        })
        .unwrap();

        let inked = image.pixels().filter(|px| px.0[0] < 128).count();
        assert!(inked > 100, "only {} dark pixels", inked);
        // Nothing above the anchor or past the last glyph
        assert_eq!(image.get_pixel(150, 2).0, [255, 255, 255, 255]);
        assert_eq!(image.get_pixel(295, 40).0, [255, 255, 255, 255]);
    }

    #[test]
    fn test_other_pages_are_not_composited() {
        let annotations = line_on_page_one();
        let image = compose(&CompositeInput {
            page_image: None,
            page_size: page_size(),
            page: 2,
            annotations: &annotations,
            images: &NoImages,
        })
        .unwrap();
        assert_eq!(image.get_pixel(50, 30).0, [255, 255, 255, 255]);
    }
}
