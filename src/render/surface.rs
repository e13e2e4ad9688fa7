//! Drawing surface abstraction.
//!
//! The render pipeline only talks to [`Surface`], so the on-screen overlay,
//! export rasterization and tests can each plug in their own target.

use bevy::math::Vec2;
use image::RgbaImage;

use crate::annotation::{Point, Rgba8};

/// One step of a vector path, in logical coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCommand {
    MoveTo(Point),
    LineTo(Point),
    /// Quadratic bezier: control point, end point
    QuadTo(Point, Point),
    /// Cubic bezier: two control points, end point
    CubicTo(Point, Point, Point),
    Close,
    /// Full circle as its own subpath
    Circle { center: Point, radius: f32 },
}

/// Canvas-like 2D target.
///
/// Stroke widths are expressed in the current transform's units, like a
/// canvas `lineWidth`.
pub trait Surface {
    fn size(&self) -> (u32, u32);

    /// Clear to fully transparent
    fn clear(&mut self);

    /// Translate by `pan`, then scale by `zoom`
    fn set_transform(&mut self, pan: Vec2, zoom: f32);

    fn reset_transform(&mut self);

    /// Stroke with round caps and joins
    fn stroke_path(&mut self, path: &[PathCommand], color: Rgba8, width: f32);

    /// Fill (non-zero winding) at the given opacity
    fn fill_path(&mut self, path: &[PathCommand], color: Rgba8, alpha: f32);

    /// Draw an image into the logical rectangle at `origin` with the given size
    fn draw_image(&mut self, image: &RgbaImage, origin: Point, width: f32, height: f32);
}

/// A recorded surface call
#[cfg(test)]
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceOp {
    Clear,
    SetTransform { pan: Vec2, zoom: f32 },
    ResetTransform,
    Stroke {
        path: Vec<PathCommand>,
        color: Rgba8,
        width: f32,
    },
    Fill {
        path: Vec<PathCommand>,
        color: Rgba8,
        alpha: f32,
    },
    Image {
        origin: Point,
        width: f32,
        height: f32,
    },
}

/// Surface that records every call, for assertions in tests
#[cfg(test)]
#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub ops: Vec<SurfaceOp>,
}

#[cfg(test)]
impl RecordingSurface {
    pub fn strokes(&self) -> Vec<&SurfaceOp> {
        self.ops
            .iter()
            .filter(|op| matches!(op, SurfaceOp::Stroke { .. }))
            .collect()
    }

    pub fn fills(&self) -> Vec<&SurfaceOp> {
        self.ops
            .iter()
            .filter(|op| matches!(op, SurfaceOp::Fill { .. }))
            .collect()
    }
}

#[cfg(test)]
impl Surface for RecordingSurface {
    fn size(&self) -> (u32, u32) {
        (800, 600)
    }

    fn clear(&mut self) {
        self.ops.push(SurfaceOp::Clear);
    }

    fn set_transform(&mut self, pan: Vec2, zoom: f32) {
        self.ops.push(SurfaceOp::SetTransform { pan, zoom });
    }

    fn reset_transform(&mut self) {
        self.ops.push(SurfaceOp::ResetTransform);
    }

    fn stroke_path(&mut self, path: &[PathCommand], color: Rgba8, width: f32) {
        self.ops.push(SurfaceOp::Stroke {
            path: path.to_vec(),
            color,
            width,
        });
    }

    fn fill_path(&mut self, path: &[PathCommand], color: Rgba8, alpha: f32) {
        self.ops.push(SurfaceOp::Fill {
            path: path.to_vec(),
            color,
            alpha,
        });
    }

    fn draw_image(&mut self, _image: &RgbaImage, origin: Point, width: f32, height: f32) {
        self.ops.push(SurfaceOp::Image {
            origin,
            width,
            height,
        });
    }
}
