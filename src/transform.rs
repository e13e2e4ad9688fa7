//! Mapping between device (window) coordinates and logical document coordinates.
//!
//! Device coordinates are window pixels with the origin at the top-left. The
//! annotation surface sits at `origin` inside the window; within it, logical
//! points are scaled by `zoom` and shifted by `pan`.

use bevy::prelude::*;

use crate::annotation::Point;
use crate::constants::{FIT_MARGIN, MAX_ZOOM, MIN_ZOOM, ZOOM_STEP};

/// Current zoom and pan of the open document
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct ViewportTransform {
    pub zoom: f32,
    pub pan: Vec2,
}

impl Default for ViewportTransform {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            pan: Vec2::ZERO,
        }
    }
}

impl ViewportTransform {
    pub fn new(zoom: f32, pan: Vec2) -> Self {
        Self {
            zoom: zoom.clamp(MIN_ZOOM, MAX_ZOOM),
            pan,
        }
    }

    /// Device position to logical point.
    ///
    /// Returns the logical origin when the surface hasn't been laid out yet.
    pub fn to_logical(&self, device: Vec2, origin: Option<Vec2>) -> Point {
        let Some(origin) = origin else {
            return Point::ZERO;
        };
        let p = (device - origin - self.pan) / self.zoom;
        Point::new(p.x, p.y)
    }

    /// Logical point to device position (inverse of [`Self::to_logical`])
    pub fn to_device(&self, logical: Point, origin: Vec2) -> Vec2 {
        self.to_surface(logical) + origin
    }

    /// Surface-local position (device minus origin) of a logical point
    pub fn to_surface(&self, logical: Point) -> Vec2 {
        Vec2::from(logical) * self.zoom + self.pan
    }

    /// Zoom by `factor`, keeping the logical point under `anchor` (surface-local) fixed
    pub fn zoom_at(&mut self, anchor: Vec2, factor: f32) {
        let new_zoom = (self.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
        self.set_zoom_around(anchor, new_zoom);
    }

    pub fn zoom_in(&mut self, surface_size: Vec2) {
        let new_zoom = (self.zoom + ZOOM_STEP).clamp(MIN_ZOOM, MAX_ZOOM);
        self.set_zoom_around(surface_size / 2.0, new_zoom);
    }

    pub fn zoom_out(&mut self, surface_size: Vec2) {
        let new_zoom = (self.zoom - ZOOM_STEP).clamp(MIN_ZOOM, MAX_ZOOM);
        self.set_zoom_around(surface_size / 2.0, new_zoom);
    }

    pub fn pan_by(&mut self, delta: Vec2) {
        self.pan += delta;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Fit the page width into the surface, centered horizontally
    pub fn fit_page(&mut self, page_size: Vec2, surface_size: Vec2) {
        if page_size.x <= 0.0 || page_size.y <= 0.0 || surface_size.x <= 0.0 {
            self.reset();
            return;
        }

        let available = (surface_size.x - FIT_MARGIN * 2.0).max(1.0);
        self.zoom = (available / page_size.x).clamp(MIN_ZOOM, MAX_ZOOM);
        let scaled_width = page_size.x * self.zoom;
        self.pan = Vec2::new(((surface_size.x - scaled_width) / 2.0).max(0.0), FIT_MARGIN);
    }

    fn set_zoom_around(&mut self, anchor: Vec2, new_zoom: f32) {
        // Logical point under the anchor before the change
        let logical = (anchor - self.pan) / self.zoom;
        self.zoom = new_zoom;
        self.pan = anchor - logical * self.zoom;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_logical_formula() {
        let t = ViewportTransform::new(2.0, Vec2::new(10.0, 20.0));
        let p = t.to_logical(Vec2::new(110.0, 220.0), Some(Vec2::new(50.0, 100.0)));
        assert_eq!(p, Point::new(25.0, 50.0));
    }

    #[test]
    fn test_unmounted_surface_maps_to_origin() {
        let t = ViewportTransform::new(3.0, Vec2::new(5.0, 5.0));
        assert_eq!(t.to_logical(Vec2::new(100.0, 100.0), None), Point::ZERO);
    }

    #[test]
    fn test_round_trip_across_zoom_range() {
        let origin = Vec2::new(37.0, 81.0);
        let device = Vec2::new(512.5, 333.25);
        for zoom in [0.1, 0.25, 0.5, 1.0, 1.5, 3.0, 7.5, 10.0] {
            for pan in [Vec2::ZERO, Vec2::new(-120.0, 45.5), Vec2::new(900.0, -300.0)] {
                let t = ViewportTransform::new(zoom, pan);
                let back = t.to_device(t.to_logical(device, Some(origin)), origin);
                assert!((back - device).length() < 1e-2, "zoom {} pan {:?}", zoom, pan);
            }
        }
    }

    #[test]
    fn test_zoom_at_keeps_anchor_fixed() {
        let mut t = ViewportTransform::new(1.0, Vec2::new(30.0, 40.0));
        let anchor = Vec2::new(200.0, 150.0);
        let before = t.to_logical(anchor, Some(Vec2::ZERO));
        t.zoom_at(anchor, 1.5);
        let after = t.to_logical(anchor, Some(Vec2::ZERO));
        assert!(before.distance(after) < 1e-3);
        assert!((t.zoom - 1.5).abs() < 1e-6);
    }

    #[test]
    fn test_zoom_is_clamped() {
        let mut t = ViewportTransform::default();
        for _ in 0..50 {
            t.zoom_in(Vec2::new(800.0, 600.0));
        }
        assert_eq!(t.zoom, MAX_ZOOM);
        for _ in 0..50 {
            t.zoom_out(Vec2::new(800.0, 600.0));
        }
        assert_eq!(t.zoom, MIN_ZOOM);
    }

    #[test]
    fn test_fit_page_centers_horizontally() {
        let mut t = ViewportTransform::default();
        t.fit_page(Vec2::new(600.0, 800.0), Vec2::new(648.0, 500.0));
        assert!((t.zoom - 1.0).abs() < 1e-6);
        assert!((t.pan.x - 24.0).abs() < 1e-4);
    }
}
