//! Run conditions for controlling when editor systems execute.

use bevy::prelude::*;

use crate::document::OpenDocument;
use crate::ui::DialogState;

use super::surface::SurfaceLayout;

/// Run condition: returns true when no modal dialog is open.
///
/// Use this to prevent editor input handlers from processing when
/// the user is interacting with a dialog.
///
/// Usage: `.run_if(no_dialog_open)`
pub fn no_dialog_open(dialog_state: Res<DialogState>) -> bool {
    !dialog_state.any_modal_open
}

/// Run condition: a document is loaded and the surface has been laid out
pub fn surface_is_live(doc: Res<OpenDocument>, layout: Res<SurfaceLayout>) -> bool {
    doc.is_open() && layout.is_ready()
}
