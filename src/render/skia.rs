//! CPU raster surface backed by a tiny-skia pixmap.

use bevy::math::Vec2;
use image::RgbaImage;
use tiny_skia::{
    ColorU8, FillRule, FilterQuality, LineCap, LineJoin, Paint, Path, PathBuilder, Pixmap,
    PixmapPaint, Stroke, Transform,
};

use crate::annotation::{Point, Rgba8};

use super::surface::{PathCommand, Surface};

pub struct PixmapSurface {
    pixmap: Pixmap,
    transform: Transform,
}

impl PixmapSurface {
    /// `None` for a zero-sized surface
    pub fn new(width: u32, height: u32) -> Option<Self> {
        Some(Self {
            pixmap: Pixmap::new(width, height)?,
            transform: Transform::identity(),
        })
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    /// Reallocate when the size changed. Returns whether it did.
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        if (self.pixmap.width(), self.pixmap.height()) == (width, height) {
            return false;
        }
        match Pixmap::new(width, height) {
            Some(pixmap) => {
                self.pixmap = pixmap;
                true
            }
            None => false,
        }
    }

    pub fn fill_color(&mut self, color: Rgba8) {
        self.pixmap
            .fill(tiny_skia::Color::from_rgba8(color.r, color.g, color.b, color.a));
    }

    /// Draw `image` into a device-space rectangle with the given opacity
    pub fn draw_image_with_opacity(
        &mut self,
        image: &RgbaImage,
        origin: Vec2,
        size: Vec2,
        opacity: f32,
    ) {
        let Some(source) = pixmap_from_image(image) else {
            return;
        };
        let transform = Transform::from_translate(origin.x, origin.y).pre_scale(
            size.x / source.width() as f32,
            size.y / source.height() as f32,
        );
        let paint = PixmapPaint {
            opacity: opacity.clamp(0.0, 1.0),
            quality: FilterQuality::Bilinear,
            ..Default::default()
        };
        self.pixmap
            .draw_pixmap(0, 0, source.as_ref(), &paint, transform, None);
    }

    /// Straight-alpha copy of the pixels
    pub fn to_rgba_image(&self) -> RgbaImage {
        image_from_pixmap(&self.pixmap)
    }
}

impl Surface for PixmapSurface {
    fn size(&self) -> (u32, u32) {
        (self.pixmap.width(), self.pixmap.height())
    }

    fn clear(&mut self) {
        self.pixmap.fill(tiny_skia::Color::TRANSPARENT);
    }

    fn set_transform(&mut self, pan: Vec2, zoom: f32) {
        self.transform = Transform::from_row(zoom, 0.0, 0.0, zoom, pan.x, pan.y);
    }

    fn reset_transform(&mut self) {
        self.transform = Transform::identity();
    }

    fn stroke_path(&mut self, path: &[PathCommand], color: Rgba8, width: f32) {
        let Some(path) = build_path(path) else {
            return;
        };
        let stroke = Stroke {
            width: width.max(0.0),
            line_cap: LineCap::Round,
            line_join: LineJoin::Round,
            ..Default::default()
        };
        self.pixmap
            .stroke_path(&path, &paint(color, 1.0), &stroke, self.transform, None);
    }

    fn fill_path(&mut self, path: &[PathCommand], color: Rgba8, alpha: f32) {
        let Some(path) = build_path(path) else {
            return;
        };
        self.pixmap.fill_path(
            &path,
            &paint(color, alpha),
            FillRule::Winding,
            self.transform,
            None,
        );
    }

    fn draw_image(&mut self, image: &RgbaImage, origin: Point, width: f32, height: f32) {
        let Some(source) = pixmap_from_image(image) else {
            return;
        };
        let transform = self
            .transform
            .pre_translate(origin.x, origin.y)
            .pre_scale(
                width / source.width() as f32,
                height / source.height() as f32,
            );
        let paint = PixmapPaint {
            quality: FilterQuality::Bilinear,
            ..Default::default()
        };
        self.pixmap
            .draw_pixmap(0, 0, source.as_ref(), &paint, transform, None);
    }
}

fn paint(color: Rgba8, alpha: f32) -> Paint<'static> {
    let a = (color.a as f32 * alpha.clamp(0.0, 1.0)).round() as u8;
    let mut paint = Paint::default();
    paint.set_color_rgba8(color.r, color.g, color.b, a);
    paint.anti_alias = true;
    paint
}

fn build_path(commands: &[PathCommand]) -> Option<Path> {
    let mut builder = PathBuilder::new();
    for command in commands {
        match *command {
            PathCommand::MoveTo(p) => builder.move_to(p.x, p.y),
            PathCommand::LineTo(p) => builder.line_to(p.x, p.y),
            PathCommand::QuadTo(ctrl, to) => builder.quad_to(ctrl.x, ctrl.y, to.x, to.y),
            PathCommand::CubicTo(c1, c2, to) => builder.cubic_to(c1.x, c1.y, c2.x, c2.y, to.x, to.y),
            PathCommand::Close => builder.close(),
            PathCommand::Circle { center, radius } => {
                builder.push_circle(center.x, center.y, radius)
            }
        }
    }
    builder.finish()
}

/// Premultiplied pixmap from a straight-alpha image
pub fn pixmap_from_image(image: &RgbaImage) -> Option<Pixmap> {
    let mut pixmap = Pixmap::new(image.width(), image.height())?;
    for (dst, src) in pixmap.pixels_mut().iter_mut().zip(image.pixels()) {
        let [r, g, b, a] = src.0;
        *dst = ColorU8::from_rgba(r, g, b, a).premultiply();
    }
    Some(pixmap)
}

/// Straight-alpha image from a premultiplied pixmap
pub fn image_from_pixmap(pixmap: &Pixmap) -> RgbaImage {
    let mut image = RgbaImage::new(pixmap.width(), pixmap.height());
    for (dst, src) in image.pixels_mut().zip(pixmap.pixels()) {
        let c = src.demultiply();
        dst.0 = [c.red(), c.green(), c.blue(), c.alpha()];
    }
    image
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::path;

    #[test]
    fn test_zero_size_surface_is_none() {
        assert!(PixmapSurface::new(0, 10).is_none());
    }

    #[test]
    fn test_stroke_marks_pixels() {
        let mut surface = PixmapSurface::new(40, 40).unwrap();
        surface.clear();
        surface.stroke_path(
            &path::segment(Point::new(0.0, 20.0), Point::new(40.0, 20.0)),
            Rgba8::rgb(255, 0, 0),
            4.0,
        );
        let image = surface.to_rgba_image();
        assert_eq!(image.get_pixel(20, 20).0, [255, 0, 0, 255]);
        assert_eq!(image.get_pixel(20, 2).0[3], 0);
    }

    #[test]
    fn test_transform_scales_geometry() {
        let mut surface = PixmapSurface::new(40, 40).unwrap();
        surface.set_transform(Vec2::new(10.0, 0.0), 2.0);
        // Logical (0..5, 0..5) lands on device (10..20, 0..10)
        let square = path::rectangle(Point::new(0.0, 0.0), Point::new(5.0, 5.0));
        surface.fill_path(&square, Rgba8::rgb(0, 0, 255), 1.0);
        let image = surface.to_rgba_image();
        assert_eq!(image.get_pixel(15, 5).0, [0, 0, 255, 255]);
        assert_eq!(image.get_pixel(5, 5).0[3], 0);
    }

    #[test]
    fn test_image_round_trip_keeps_opaque_pixels() {
        let mut image = RgbaImage::new(2, 1);
        image.put_pixel(0, 0, image::Rgba([10, 20, 30, 255]));
        let pixmap = pixmap_from_image(&image).unwrap();
        assert_eq!(image_from_pixmap(&pixmap).get_pixel(0, 0).0, [10, 20, 30, 255]);
        assert_eq!(image_from_pixmap(&pixmap).get_pixel(1, 0).0[3], 0);
    }
}
