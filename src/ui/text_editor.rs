use bevy::prelude::*;
use bevy_egui::{EguiContexts, egui};

use crate::annotation::Point;
use crate::drawing::text_annotation;
use crate::editor::{AnnotationEditorRequest, DrawSettings};
use crate::store::AnnotationStore;

/// State for the text entry modal
#[derive(Resource, Default)]
pub struct TextEditorState {
    pub is_open: bool,
    pub anchor: Point,
    pub page: u32,
    pub text: String,
    /// Focus the text field on the first frame after opening
    focus_pending: bool,
}

impl TextEditorState {
    pub fn open(&mut self, anchor: Point, page: u32) {
        self.is_open = true;
        self.anchor = anchor;
        self.page = page;
        self.text.clear();
        self.focus_pending = true;
    }

    pub fn close(&mut self) {
        self.is_open = false;
        self.text.clear();
    }
}

pub fn open_text_editor(
    mut requests: MessageReader<AnnotationEditorRequest>,
    mut state: ResMut<TextEditorState>,
) {
    for request in requests.read() {
        if let AnnotationEditorRequest::Text { anchor, page } = request {
            state.open(*anchor, *page);
        }
    }
}

pub fn text_editor_ui(
    mut contexts: EguiContexts,
    mut state: ResMut<TextEditorState>,
    settings: Res<DrawSettings>,
    mut store: ResMut<AnnotationStore>,
) -> Result {
    if !state.is_open {
        return Ok(());
    }

    let mut should_add = false;
    let mut should_close = false;

    egui::Window::new("Add Text")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(contexts.ctx_mut()?, |ui| {
            let response = ui.add(
                egui::TextEdit::singleline(&mut state.text)
                    .desired_width(280.0)
                    .hint_text("Enter text"),
            );
            if state.focus_pending {
                response.request_focus();
                state.focus_pending = false;
            }
            if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                should_add = true;
            }
            if ui.input(|i| i.key_pressed(egui::Key::Escape)) {
                should_close = true;
            }

            ui.add_space(8.0);
            ui.horizontal(|ui| {
                let has_text = !state.text.trim().is_empty();
                if ui.add_enabled(has_text, egui::Button::new("Add")).clicked() {
                    should_add = true;
                }
                if ui.button("Cancel").clicked() {
                    should_close = true;
                }
            });
        });

    if should_add {
        let stamp = settings.stamp(state.page.max(1));
        // Blank text keeps the dialog open
        if let Some(annotation) =
            text_annotation(state.anchor, &state.text, settings.font_size, &stamp)
        {
            debug!("Adding text annotation at ({}, {})", state.anchor.x, state.anchor.y);
            store.add(annotation);
            state.close();
        }
    }
    if should_close {
        state.close();
    }

    Ok(())
}
