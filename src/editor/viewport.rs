use bevy::input::mouse::{MouseMotion, MouseScrollUnit, MouseWheel};
use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use bevy_egui::EguiContexts;

use crate::document::{DocumentOpened, PageChanged};
use crate::drawing::DrawingMachine;
use crate::store::{AnnotationStore, Selection};
use crate::transform::ViewportTransform;

use super::params::is_cursor_over_ui;
use super::surface::{SurfaceLayout, SurfaceResized};

#[derive(Component)]
pub struct EditorCamera;

/// Page waiting for the first surface layout before it can be fitted
#[derive(Resource, Default)]
pub struct PendingFit(pub Option<Vec2>);

pub fn spawn_camera(mut commands: Commands) {
    commands.spawn((
        Camera2d,
        EditorCamera,
        Transform::from_translation(Vec3::new(0.0, 0.0, 1000.0)),
    ));
}

/// Wheel steps to a multiplicative zoom factor
pub fn scroll_zoom_factor(unit: MouseScrollUnit, amount: f32) -> f32 {
    let step = match unit {
        MouseScrollUnit::Line => amount * 0.1,
        MouseScrollUnit::Pixel => amount * 0.001,
    };
    (1.0 + step).max(0.1)
}

/// Middle-drag pans the document
pub fn viewport_pan(
    mouse_button: Res<ButtonInput<MouseButton>>,
    mut mouse_motion: MessageReader<MouseMotion>,
    mut viewport: ResMut<ViewportTransform>,
) {
    if !mouse_button.pressed(MouseButton::Middle) {
        mouse_motion.clear();
        return;
    }

    let delta: Vec2 = mouse_motion.read().map(|event| event.delta).sum();
    if delta != Vec2::ZERO {
        viewport.pan_by(delta);
    }
}

/// Wheel zooms around the cursor
pub fn viewport_zoom(
    mut scroll_events: MessageReader<MouseWheel>,
    mut contexts: EguiContexts,
    window: Query<&Window, With<PrimaryWindow>>,
    layout: Res<SurfaceLayout>,
    mut viewport: ResMut<ViewportTransform>,
) {
    if is_cursor_over_ui(&mut contexts) {
        scroll_events.clear();
        return;
    }
    let anchor = window
        .single()
        .ok()
        .and_then(Window::cursor_position)
        .filter(|device| layout.contains(*device))
        .zip(layout.origin)
        .map(|(device, origin)| device - origin);
    let Some(anchor) = anchor else {
        scroll_events.clear();
        return;
    };

    let factor: f32 = scroll_events
        .read()
        .map(|event| scroll_zoom_factor(event.unit, event.y))
        .product();
    if factor != 1.0 {
        viewport.zoom_at(anchor, factor);
    }
}

/// A freshly opened document starts with an empty store, fitted to the surface
pub fn handle_document_opened(
    mut events: MessageReader<DocumentOpened>,
    mut store: ResMut<AnnotationStore>,
    mut selection: ResMut<Selection>,
    mut machine: ResMut<DrawingMachine>,
    mut viewport: ResMut<ViewportTransform>,
    mut pending: ResMut<PendingFit>,
    layout: Res<SurfaceLayout>,
) {
    let Some(opened) = events.read().last() else {
        return;
    };
    machine.cancel();
    selection.clear();
    store.reset();

    let page_size = opened.page_size.as_vec2();
    if layout.is_ready() {
        viewport.fit_page(page_size, layout.size);
    } else {
        pending.0 = Some(page_size);
    }
    info!("Opened document with {} pages", opened.page_count);
}

/// Fit a page that arrived before the surface was laid out
pub fn apply_pending_fit(
    mut events: MessageReader<SurfaceResized>,
    mut pending: ResMut<PendingFit>,
    mut viewport: ResMut<ViewportTransform>,
) {
    let Some(resized) = events.read().last() else {
        return;
    };
    if let Some(page_size) = pending.0.take() {
        viewport.fit_page(page_size, resized.size);
    }
}

pub fn handle_page_changed(
    mut events: MessageReader<PageChanged>,
    mut selection: ResMut<Selection>,
    mut machine: ResMut<DrawingMachine>,
) {
    if events.read().last().is_none() {
        return;
    }
    machine.cancel();
    selection.clear();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scroll_up_zooms_in() {
        assert!(scroll_zoom_factor(MouseScrollUnit::Line, 1.0) > 1.0);
        assert!(scroll_zoom_factor(MouseScrollUnit::Line, -1.0) < 1.0);
        assert!((scroll_zoom_factor(MouseScrollUnit::Pixel, 100.0) - 1.1).abs() < 1e-5);
    }

    #[test]
    fn test_huge_scroll_never_inverts() {
        assert!(scroll_zoom_factor(MouseScrollUnit::Line, -50.0) > 0.0);
    }
}
