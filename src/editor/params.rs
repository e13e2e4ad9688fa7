//! Common SystemParam bundles for editor systems.
//!
//! - [`SurfaceCursor`]: Cursor position in device and logical space
//! - [`is_cursor_over_ui`]: Check if cursor is over egui UI (for input gating)

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use bevy_egui::EguiContexts;

use crate::annotation::Point;
use crate::transform::ViewportTransform;

use super::surface::SurfaceLayout;

/// Bundled window, surface layout and viewport for cursor mapping
#[derive(SystemParam)]
pub struct SurfaceCursor<'w, 's> {
    pub window: Query<'w, 's, &'static Window, With<PrimaryWindow>>,
    pub layout: Res<'w, SurfaceLayout>,
    pub viewport: Res<'w, ViewportTransform>,
}

impl SurfaceCursor<'_, '_> {
    /// Cursor in window logical pixels, if it's inside the window
    pub fn device_pos(&self) -> Option<Vec2> {
        self.window.single().ok()?.cursor_position()
    }

    /// Cursor in document coordinates, only while over the surface
    pub fn logical_pos(&self) -> Option<Point> {
        let device = self.device_pos()?;
        if !self.layout.contains(device) {
            return None;
        }
        Some(self.viewport.to_logical(device, self.layout.origin))
    }

    /// Cursor in document coordinates wherever it is in the window
    pub fn logical_pos_unclipped(&self) -> Option<Point> {
        let device = self.device_pos()?;
        self.layout.origin?;
        Some(self.viewport.to_logical(device, self.layout.origin))
    }
}

/// Check if the cursor is over egui UI
pub fn is_cursor_over_ui(contexts: &mut EguiContexts) -> bool {
    contexts
        .ctx_mut()
        .map(|ctx| ctx.is_pointer_over_area())
        .unwrap_or(false)
}
