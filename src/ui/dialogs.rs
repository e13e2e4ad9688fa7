use bevy::prelude::*;
use bevy_egui::{EguiContexts, egui};

use crate::config::ConfigResetNotification;
use crate::document::{DocumentState, OpenDocument, PickDocumentRequest, RetryDocumentLoad};
use crate::export::ExportStatus;

/// Prompt shown in the central area before any document is open
pub fn empty_state_ui(
    mut contexts: EguiContexts,
    doc: Res<OpenDocument>,
    doc_state: Res<DocumentState>,
    mut pick_requests: MessageWriter<PickDocumentRequest>,
) -> Result {
    if doc.is_open() || *doc_state != DocumentState::Empty {
        return Ok(());
    }

    egui::Area::new(egui::Id::new("empty_state"))
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(contexts.ctx_mut()?, |ui| {
            ui.vertical_centered(|ui| {
                ui.heading("No document open");
                ui.add_space(8.0);
                ui.weak("Open a PDF to start annotating");
                ui.add_space(12.0);
                if ui
                    .add_sized([140.0, 32.0], egui::Button::new("Open PDF..."))
                    .clicked()
                {
                    pick_requests.write(PickDocumentRequest);
                }
            });
        });
    Ok(())
}

pub fn loading_modal_ui(mut contexts: EguiContexts, doc_state: Res<DocumentState>) -> Result {
    let DocumentState::Loading { path } = &*doc_state else {
        return Ok(());
    };

    egui::Window::new("Loading")
        .collapsible(false)
        .resizable(false)
        .title_bar(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(contexts.ctx_mut()?, |ui| {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label(format!("Loading {}...", path.display()));
            });
        });
    Ok(())
}

/// Load failure with retry
pub fn document_error_dialog_ui(
    mut contexts: EguiContexts,
    mut doc_state: ResMut<DocumentState>,
    doc: Res<OpenDocument>,
    mut retry_events: MessageWriter<RetryDocumentLoad>,
    mut pick_requests: MessageWriter<PickDocumentRequest>,
) -> Result {
    let DocumentState::Failed { path, message } = &*doc_state else {
        return Ok(());
    };

    let mut should_retry = false;
    let mut should_pick = false;
    let mut should_close = false;

    egui::Window::new("Could Not Open Document")
        .collapsible(false)
        .resizable(true)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(contexts.ctx_mut()?, |ui| {
            ui.label(egui::RichText::new(path.display().to_string()).weak());
            ui.add_space(8.0);
            egui::ScrollArea::vertical().max_height(200.0).show(ui, |ui| {
                ui.colored_label(egui::Color32::RED, message);
            });
            ui.add_space(12.0);
            ui.horizontal(|ui| {
                if ui.button("Retry").clicked() {
                    should_retry = true;
                }
                if ui.button("Open Another...").clicked() {
                    should_pick = true;
                }
                if ui.button("Close").clicked() {
                    should_close = true;
                }
            });
        });

    if should_retry {
        retry_events.write(RetryDocumentLoad);
    } else if should_pick || should_close {
        // The previous document, if any, is still loaded
        *doc_state = if doc.is_open() {
            DocumentState::Ready
        } else {
            DocumentState::Empty
        };
        if should_pick {
            pick_requests.write(PickDocumentRequest);
        }
    }
    Ok(())
}

/// Progress and result of exports and imports
pub fn export_status_dialog_ui(
    mut contexts: EguiContexts,
    mut status: ResMut<ExportStatus>,
) -> Result {
    let (title, message, color) = match &*status {
        ExportStatus::Idle => return Ok(()),
        ExportStatus::Working(message) => ("Working", message.clone(), None),
        ExportStatus::Finished(message) => ("Done", message.clone(), None),
        ExportStatus::Failed(message) => ("Error", message.clone(), Some(egui::Color32::RED)),
    };
    let busy = status.is_busy();
    let mut should_dismiss = false;

    egui::Window::new(title)
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(contexts.ctx_mut()?, |ui| {
            ui.horizontal(|ui| {
                if busy {
                    ui.spinner();
                }
                match color {
                    Some(color) => ui.colored_label(color, &message),
                    None => ui.label(&message),
                };
            });
            if !busy {
                ui.add_space(8.0);
                if ui.button("OK").clicked() {
                    should_dismiss = true;
                }
            }
        });

    if should_dismiss {
        status.dismiss();
    }
    Ok(())
}

/// Explains why the config was reset to defaults
pub fn config_reset_notification_ui(
    mut contexts: EguiContexts,
    mut notification: ResMut<ConfigResetNotification>,
) -> Result {
    if !notification.show {
        return Ok(());
    }

    let mut should_close = false;

    egui::Window::new("Settings Reset")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(contexts.ctx_mut()?, |ui| {
            ui.label("Your settings could not be loaded and were reset to defaults.");
            if let Some(reason) = &notification.reason {
                ui.add_space(4.0);
                ui.label(egui::RichText::new(reason).weak());
            }
            ui.add_space(8.0);
            if ui.button("OK").clicked() {
                should_close = true;
            }
        });

    if should_close {
        notification.show = false;
        notification.reason = None;
    }
    Ok(())
}
