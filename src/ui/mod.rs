//! egui panels and dialogs.
//!
//! ## Module Structure
//!
//! - [`toolbar`] - Document, tool, history, zoom and export controls
//! - [`palette`] - Color families for the tool settings bar
//! - [`annotation_list`] - Right side panel listing the page's annotations
//! - [`status_bar`] - Tool hint, gesture progress, zoom
//! - [`text_editor`] - Modal for new text annotations
//! - [`signature_editor`] - Modal signature pad
//! - [`dialogs`] - Document errors, export status, config reset, loading

mod annotation_list;
mod dialogs;
mod palette;
mod signature_editor;
mod status_bar;
mod text_editor;
mod toolbar;

pub use signature_editor::SignatureEditorState;
pub use text_editor::TextEditorState;

use bevy::prelude::*;
use bevy_egui::EguiPrimaryContextPass;

use crate::config::ConfigResetNotification;
use crate::document::DocumentState;
use crate::export::ExportStatus;

/// Resource that tracks whether any modal dialog is currently open.
/// Editor input handlers should check this to avoid processing input
/// when the user is interacting with a dialog.
#[derive(Resource, Default)]
pub struct DialogState {
    /// True when any modal dialog is open that should block editor input
    pub any_modal_open: bool,
}

/// Panels that claim screen space; the surface is whatever they leave
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct PanelSet;

/// System to aggregate all dialog open states into a single resource.
/// Runs in First schedule before input handlers.
fn update_dialog_state(
    text_editor: Res<TextEditorState>,
    signature_editor: Res<SignatureEditorState>,
    document_state: Res<DocumentState>,
    export_status: Res<ExportStatus>,
    config_reset: Res<ConfigResetNotification>,
    mut dialog_state: ResMut<DialogState>,
) {
    let any_modal_open = text_editor.is_open
        || signature_editor.is_open
        || config_reset.show
        || document_state.is_loading()
        || matches!(*document_state, DocumentState::Failed { .. })
        || *export_status != ExportStatus::Idle;

    if dialog_state.any_modal_open != any_modal_open {
        dialog_state.any_modal_open = any_modal_open;
    }
}

pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<DialogState>()
            .init_resource::<TextEditorState>()
            .init_resource::<SignatureEditorState>()
            .add_systems(
                Update,
                (
                    text_editor::open_text_editor,
                    signature_editor::open_signature_editor,
                ),
            )
            // Top and bottom panels first so the side panel fits between them
            .add_systems(
                EguiPrimaryContextPass,
                (
                    toolbar::toolbar_ui,
                    toolbar::tool_settings_ui,
                    status_bar::status_bar_ui,
                    annotation_list::annotation_list_ui,
                )
                    .chain()
                    .in_set(PanelSet),
            )
            .add_systems(
                EguiPrimaryContextPass,
                (
                    dialogs::empty_state_ui,
                    dialogs::loading_modal_ui,
                    dialogs::document_error_dialog_ui,
                    dialogs::export_status_dialog_ui,
                    dialogs::config_reset_notification_ui,
                    text_editor::text_editor_ui,
                    signature_editor::signature_editor_ui,
                )
                    .after(PanelSet),
            )
            // Update dialog state at the start of each frame
            .add_systems(First, update_dialog_state);
    }
}
