//! Bevy glue between input, the annotation model and the screen.
//!
//! ## Module Structure
//!
//! - [`surface`] - Central area layout and the [`SurfaceResized`] message
//! - [`viewport`] - Camera, pan/zoom input, document and page lifecycle
//! - [`tools`] - Current tool, draw settings, tool shortcuts, cursor icon
//! - [`input`] - Pointer events into the drawing machine
//! - [`shortcuts`] - Edit/zoom/page shortcuts
//! - [`commands`] - [`EditCommand`] handling shared with the toolbar
//! - [`overlay`] - Page and overlay sprites, redraw on change
//! - [`text_layer`] - Text annotations painted by egui
//! - [`params`] - SystemParam bundles
//! - [`conditions`] - Run conditions

pub mod commands;
pub mod conditions;
pub mod input;
pub mod overlay;
pub mod params;
pub mod shortcuts;
pub mod surface;
pub mod text_layer;
pub mod tools;
pub mod viewport;

pub use commands::{EditCommand, StatusMessage};
pub use input::AnnotationEditorRequest;
pub use surface::{SurfaceLayout, SurfaceResized};
pub use tools::{CurrentTool, DrawSettings};

use bevy::prelude::*;
use bevy_egui::EguiPrimaryContextPass;

use crate::config::ConfigLoaded;
use crate::drawing::DrawingMachine;
use crate::render::{SignatureCache, poll_signature_decodes, request_signature_decodes};
use crate::store::{AnnotationStore, Selection};
use crate::transform::ViewportTransform;
use crate::ui::PanelSet;

use conditions::{no_dialog_open, surface_is_live};

pub struct EditorPlugin;

impl Plugin for EditorPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<AnnotationStore>()
            .init_resource::<Selection>()
            .init_resource::<DrawingMachine>()
            .init_resource::<ViewportTransform>()
            .init_resource::<SignatureCache>()
            .init_resource::<CurrentTool>()
            .init_resource::<DrawSettings>()
            .init_resource::<SurfaceLayout>()
            .init_resource::<StatusMessage>()
            .init_resource::<viewport::PendingFit>()
            .init_resource::<overlay::OverlayCanvas>()
            .add_message::<SurfaceResized>()
            .add_message::<EditCommand>()
            .add_message::<AnnotationEditorRequest>()
            .add_systems(
                Startup,
                (
                    viewport::spawn_camera,
                    overlay::spawn_canvas_sprites,
                    tools::apply_config_defaults.after(ConfigLoaded),
                ),
            )
            .add_systems(
                Update,
                (
                    surface::apply_surface_resized,
                    viewport::apply_pending_fit,
                    viewport::handle_document_opened,
                    viewport::handle_page_changed,
                    tools::handle_tool_shortcuts,
                    tools::sync_machine_tool,
                    shortcuts::handle_edit_shortcuts,
                    commands::apply_edit_commands,
                )
                    .chain(),
            )
            .add_systems(
                Update,
                (
                    input::handle_pointer_input
                        .run_if(no_dialog_open)
                        .run_if(surface_is_live),
                    viewport::viewport_pan.run_if(no_dialog_open),
                    viewport::viewport_zoom.run_if(no_dialog_open),
                    tools::update_cursor_icon,
                )
                    .after(commands::apply_edit_commands),
            )
            .add_systems(
                Update,
                (
                    request_signature_decodes.run_if(resource_changed::<AnnotationStore>),
                    poll_signature_decodes,
                )
                    .chain()
                    .after(commands::apply_edit_commands),
            )
            // Redraw last, once every input of the frame has landed
            .add_systems(
                Update,
                (overlay::sync_page_sprite, overlay::redraw_overlay)
                    .after(input::handle_pointer_input)
                    .after(viewport::viewport_zoom)
                    .after(viewport::viewport_pan)
                    .after(poll_signature_decodes),
            )
            .add_systems(
                EguiPrimaryContextPass,
                (
                    surface::track_surface_rect.after(PanelSet),
                    text_layer::draw_text_annotations,
                ),
            );
    }
}
