//! Where the annotation surface sits inside the window.
//!
//! The central egui area left over after the panels is the surface. Its rect
//! is reported with [`SurfaceResized`] whenever it changes; the first report
//! is what makes the surface usable at all.

use bevy::prelude::*;
use bevy_egui::EguiContexts;

/// The central area moved or changed size (window logical pixels)
#[derive(Message, Debug, Clone, Copy, PartialEq)]
pub struct SurfaceResized {
    pub origin: Vec2,
    pub size: Vec2,
}

/// Last reported surface rect
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq)]
pub struct SurfaceLayout {
    /// `None` until the first layout
    pub origin: Option<Vec2>,
    pub size: Vec2,
}

impl SurfaceLayout {
    pub fn is_ready(&self) -> bool {
        self.origin.is_some() && self.size.x >= 1.0 && self.size.y >= 1.0
    }

    pub fn contains(&self, device: Vec2) -> bool {
        let Some(origin) = self.origin else {
            return false;
        };
        let local = device - origin;
        local.x >= 0.0 && local.y >= 0.0 && local.x < self.size.x && local.y < self.size.y
    }

    /// Pixel size of the overlay raster
    pub fn pixel_size(&self) -> (u32, u32) {
        (
            self.size.x.round().max(1.0) as u32,
            self.size.y.round().max(1.0) as u32,
        )
    }

    /// World-space center of a rect given in surface-local pixels.
    ///
    /// The editor camera sits at the world origin with y up, so the window
    /// center is (0, 0).
    pub fn world_center(&self, window_size: Vec2, local_origin: Vec2, local_size: Vec2) -> Vec2 {
        let device = self.origin.unwrap_or_default() + local_origin + local_size / 2.0;
        Vec2::new(device.x - window_size.x / 2.0, window_size.y / 2.0 - device.y)
    }
}

/// Report the central area after all panels have claimed their space
pub fn track_surface_rect(
    mut contexts: EguiContexts,
    layout: Res<SurfaceLayout>,
    mut resized: MessageWriter<SurfaceResized>,
) -> Result {
    let rect = contexts.ctx_mut()?.available_rect();
    let origin = Vec2::new(rect.min.x, rect.min.y);
    let size = Vec2::new(rect.width().max(0.0), rect.height().max(0.0));

    if layout.origin != Some(origin) || layout.size != size {
        resized.write(SurfaceResized { origin, size });
    }
    Ok(())
}

pub fn apply_surface_resized(
    mut events: MessageReader<SurfaceResized>,
    mut layout: ResMut<SurfaceLayout>,
) {
    let Some(event) = events.read().last() else {
        return;
    };
    let first = layout.origin.is_none();
    layout.origin = Some(event.origin);
    layout.size = event.size;
    if first {
        debug!("Surface ready at {:?}, {:?}", event.origin, event.size);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> SurfaceLayout {
        SurfaceLayout {
            origin: Some(Vec2::new(100.0, 50.0)),
            size: Vec2::new(400.0, 300.0),
        }
    }

    #[test]
    fn test_not_ready_before_first_layout() {
        assert!(!SurfaceLayout::default().is_ready());
        assert!(!SurfaceLayout::default().contains(Vec2::ZERO));
        assert!(layout().is_ready());
    }

    #[test]
    fn test_contains_is_half_open() {
        let layout = layout();
        assert!(layout.contains(Vec2::new(100.0, 50.0)));
        assert!(layout.contains(Vec2::new(499.0, 349.0)));
        assert!(!layout.contains(Vec2::new(500.0, 100.0)));
        assert!(!layout.contains(Vec2::new(99.0, 100.0)));
    }

    #[test]
    fn test_world_center_flips_y() {
        let layout = layout();
        let window = Vec2::new(800.0, 600.0);
        // Whole surface: device center (300, 200)
        let center = layout.world_center(window, Vec2::ZERO, layout.size);
        assert_eq!(center, Vec2::new(-100.0, 100.0));
    }

    #[test]
    fn test_pixel_size_never_zero() {
        let layout = SurfaceLayout {
            origin: Some(Vec2::ZERO),
            size: Vec2::new(0.2, 10.6),
        };
        assert_eq!(layout.pixel_size(), (1, 11));
    }
}
