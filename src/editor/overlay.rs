//! Sprites showing the page raster and the annotation overlay.
//!
//! The overlay is a CPU pixmap the size of the surface. It is redrawn from
//! scratch, but only on frames where one of its inputs changed, and then
//! uploaded into the overlay sprite's texture.

use bevy::prelude::*;
use bevy::render::render_resource::{Extent3d, TextureDimension, TextureFormat};
use bevy::window::PrimaryWindow;
use image::RgbaImage;

use crate::document::{OpenDocument, PageRaster};
use crate::drawing::DrawingMachine;
use crate::render::{Frame, FrameStats, PixmapSurface, SignatureCache, render_frame};
use crate::store::{AnnotationStore, Selection};
use crate::transform::ViewportTransform;

use super::surface::SurfaceLayout;
use super::tools::DrawSettings;

const PAGE_Z: f32 = 0.0;
const OVERLAY_Z: f32 = 1.0;

#[derive(Component)]
pub struct PageSprite;

#[derive(Component)]
pub struct OverlaySprite;

/// Raster the annotations are drawn into
#[derive(Resource, Default)]
pub struct OverlayCanvas {
    surface: Option<PixmapSurface>,
    /// Counters from the last redraw
    pub last_frame: FrameStats,
}

pub fn to_bevy_image(image: &RgbaImage) -> Image {
    Image::new(
        Extent3d {
            width: image.width().max(1),
            height: image.height().max(1),
            depth_or_array_layers: 1,
        },
        TextureDimension::D2,
        image.as_raw().clone(),
        TextureFormat::Rgba8UnormSrgb,
        default(),
    )
}

fn window_size(window: &Query<&Window, With<PrimaryWindow>>) -> Option<Vec2> {
    let window = window.single().ok()?;
    Some(Vec2::new(window.width(), window.height()))
}

pub fn spawn_canvas_sprites(mut commands: Commands, mut images: ResMut<Assets<Image>>) {
    let blank = RgbaImage::new(1, 1);
    let page_image = images.add(to_bevy_image(&blank));
    let overlay_image = images.add(to_bevy_image(&blank));

    commands.spawn((
        Sprite::from_image(page_image),
        Transform::from_xyz(0.0, 0.0, PAGE_Z),
        Visibility::Hidden,
        PageSprite,
    ));
    commands.spawn((
        Sprite::from_image(overlay_image),
        Transform::from_xyz(0.0, 0.0, OVERLAY_Z),
        Visibility::Hidden,
        OverlaySprite,
    ));
}

#[allow(clippy::too_many_arguments)]
pub fn sync_page_sprite(
    raster: Res<PageRaster>,
    doc: Res<OpenDocument>,
    layout: Res<SurfaceLayout>,
    viewport: Res<ViewportTransform>,
    window: Query<&Window, With<PrimaryWindow>>,
    mut images: ResMut<Assets<Image>>,
    mut sprite_query: Query<(&mut Sprite, &mut Transform, &mut Visibility), With<PageSprite>>,
) {
    let changed =
        raster.is_changed() || doc.is_changed() || layout.is_changed() || viewport.is_changed();
    if !changed {
        return;
    }
    let Ok((mut sprite, mut transform, mut visibility)) = sprite_query.single_mut() else {
        return;
    };

    if raster.is_changed()
        && let Some(page_image) = &raster.image
        && let Some(image) = images.get_mut(&sprite.image)
    {
        *image = to_bevy_image(page_image);
    }

    let shown = doc.is_open()
        && layout.is_ready()
        && raster.image.is_some()
        && raster.generation == doc.generation;
    let Some(window_size) = window_size(&window).filter(|_| shown) else {
        *visibility = Visibility::Hidden;
        return;
    };

    let size = raster.size.as_vec2() * viewport.zoom;
    sprite.custom_size = Some(size);
    transform.translation = layout
        .world_center(window_size, viewport.pan, size)
        .extend(PAGE_Z);
    *visibility = Visibility::Inherited;
}

#[allow(clippy::too_many_arguments)]
pub fn redraw_overlay(
    mut canvas: ResMut<OverlayCanvas>,
    layout: Res<SurfaceLayout>,
    store: Res<AnnotationStore>,
    selection: Res<Selection>,
    machine: Res<DrawingMachine>,
    viewport: Res<ViewportTransform>,
    settings: Res<DrawSettings>,
    doc: Res<OpenDocument>,
    signatures: Res<SignatureCache>,
    window: Query<&Window, With<PrimaryWindow>>,
    mut images: ResMut<Assets<Image>>,
    mut sprite_query: Query<(&mut Sprite, &mut Transform, &mut Visibility), With<OverlaySprite>>,
) {
    let dirty = layout.is_changed()
        || store.is_changed()
        || selection.is_changed()
        || machine.is_changed()
        || viewport.is_changed()
        || settings.is_changed()
        || doc.is_changed()
        || signatures.is_changed();
    if !dirty {
        return;
    }
    let Ok((mut sprite, mut transform, mut visibility)) = sprite_query.single_mut() else {
        return;
    };

    // No surface yet: skip the frame
    let Some(window_size) = window_size(&window).filter(|_| layout.is_ready() && doc.is_open())
    else {
        *visibility = Visibility::Hidden;
        return;
    };

    let (width, height) = layout.pixel_size();
    let canvas = &mut *canvas;
    if canvas.surface.is_none() {
        canvas.surface = PixmapSurface::new(width, height);
    }
    let Some(surface) = canvas.surface.as_mut() else {
        return;
    };
    if surface.resize(width, height) {
        debug!("Overlay resized to {}x{}", width, height);
    }

    canvas.last_frame = render_frame(
        surface,
        &Frame {
            annotations: store.annotations(),
            page: doc.page.max(1),
            viewport: *viewport,
            drawing: machine.state(),
            preview_color: &settings.color,
            preview_width: settings.stroke_width,
            selection: Some(&*selection),
            images: &*signatures,
            text_font: None,
        },
    );
    if canvas.last_frame.skipped > 0 {
        debug!("Skipped {} malformed annotations", canvas.last_frame.skipped);
    }

    if let Some(image) = images.get_mut(&sprite.image) {
        *image = to_bevy_image(&surface.to_rgba_image());
    }
    sprite.custom_size = Some(layout.size);
    transform.translation = layout
        .world_center(window_size, Vec2::ZERO, layout.size)
        .extend(OVERLAY_Z);
    *visibility = Visibility::Inherited;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bevy_image_keeps_pixels() {
        let source = RgbaImage::from_pixel(3, 2, image::Rgba([10, 20, 30, 40]));
        let image = to_bevy_image(&source);
        assert_eq!(image.width(), 3);
        assert_eq!(image.height(), 2);
        assert_eq!(image.data.as_deref().map(|d| d.len()), Some(24));
    }
}
