use bevy::prelude::*;
use bevy_egui::{EguiContexts, egui};

use crate::config::AppConfig;
use crate::document::{DocumentState, OpenDocument, OpenDocumentRequest, PickDocumentRequest};
use crate::drawing::Tool;
use crate::editor::{CurrentTool, DrawSettings, EditCommand};
use crate::export::{ExportFormat, ExportRequest, ExportStatus, ImportRequest};
use crate::store::{AnnotationStore, Selection};
use crate::transform::ViewportTransform;

use super::palette::{COLOR_FAMILIES, same_color, swatch, to_hex};

/// Clicking the active tool again drops back to Select
pub fn next_tool(current: Tool, clicked: Tool) -> Tool {
    if current == clicked && clicked != Tool::Select {
        Tool::Select
    } else {
        clicked
    }
}

/// Main toolbar: document, tools, history, zoom and export
#[allow(clippy::too_many_arguments)]
pub fn toolbar_ui(
    mut contexts: EguiContexts,
    mut current_tool: ResMut<CurrentTool>,
    store: Res<AnnotationStore>,
    doc: Res<OpenDocument>,
    doc_state: Res<DocumentState>,
    viewport: Res<ViewportTransform>,
    config: Res<AppConfig>,
    export_status: Res<ExportStatus>,
    mut edit_commands: MessageWriter<EditCommand>,
    mut pick_requests: MessageWriter<PickDocumentRequest>,
    mut open_requests: MessageWriter<OpenDocumentRequest>,
    mut export_requests: MessageWriter<ExportRequest>,
    mut import_requests: MessageWriter<ImportRequest>,
) -> Result {
    let can_open = !doc_state.is_loading();
    let can_export = doc.is_open() && !export_status.is_busy();

    egui::TopBottomPanel::top("main_toolbar")
        .frame(
            egui::Frame::side_top_panel(&contexts.ctx_mut()?.style())
                .inner_margin(egui::Margin::symmetric(12, 8)),
        )
        .show(contexts.ctx_mut()?, |ui| {
            ui.horizontal(|ui| {
                ui.spacing_mut().item_spacing.x = 4.0;

                if ui
                    .add_enabled(can_open, egui::Button::new("Open PDF"))
                    .on_hover_text("Open a PDF document")
                    .clicked()
                {
                    pick_requests.write(PickDocumentRequest);
                }

                let has_recent = !config.data.recent_documents.is_empty();
                ui.add_enabled_ui(can_open && has_recent, |ui| {
                    ui.menu_button("Recent", |ui| {
                        for path in &config.data.recent_documents {
                            let name = path
                                .file_name()
                                .map(|n| n.to_string_lossy().into_owned())
                                .unwrap_or_else(|| path.to_string_lossy().into_owned());
                            if ui
                                .button(name)
                                .on_hover_text(path.display().to_string())
                                .clicked()
                            {
                                open_requests.write(OpenDocumentRequest { path: path.clone() });
                                ui.close();
                            }
                        }
                    });
                });

                ui.separator();

                // Page navigation
                if ui
                    .add_enabled(doc.has_previous(), egui::Button::new("◀"))
                    .on_hover_text("Previous page (PageUp)")
                    .clicked()
                {
                    edit_commands.write(EditCommand::PreviousPage);
                }
                if doc.is_open() {
                    ui.label(format!("{} / {}", doc.page, doc.page_count));
                } else {
                    ui.weak("- / -");
                }
                if ui
                    .add_enabled(doc.has_next(), egui::Button::new("▶"))
                    .on_hover_text("Next page (PageDown)")
                    .clicked()
                {
                    edit_commands.write(EditCommand::NextPage);
                }

                ui.add_space(8.0);
                ui.separator();
                ui.add_space(8.0);

                // Tool buttons with keyboard shortcuts
                for tool in Tool::all() {
                    let selected = current_tool.tool == *tool;
                    let button =
                        egui::Button::new(egui::RichText::new(tool.label()).size(14.0).strong())
                            .min_size(egui::vec2(0.0, 28.0))
                            .selected(selected);

                    let response = ui.add(button);
                    if response.clicked() {
                        current_tool.tool = next_tool(current_tool.tool, *tool);
                    }
                    response.on_hover_text(tool.display_name());
                }

                ui.add_space(8.0);
                ui.separator();
                ui.add_space(8.0);

                if ui
                    .add_enabled(store.can_undo(), egui::Button::new("Undo"))
                    .on_hover_text("Undo (Ctrl+Z)")
                    .clicked()
                {
                    edit_commands.write(EditCommand::Undo);
                }
                if ui
                    .add_enabled(store.can_redo(), egui::Button::new("Redo"))
                    .on_hover_text("Redo (Ctrl+Y)")
                    .clicked()
                {
                    edit_commands.write(EditCommand::Redo);
                }

                // Right-aligned zoom and export controls
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui
                        .add_enabled(doc.is_open(), egui::Button::new("Import JSON"))
                        .on_hover_text("Load annotations from a JSON snapshot")
                        .clicked()
                    {
                        import_requests.write(ImportRequest);
                    }

                    ui.add_enabled_ui(can_export, |ui| {
                        ui.menu_button("Export", |ui| {
                            for format in [ExportFormat::Pdf, ExportFormat::Png, ExportFormat::Json]
                            {
                                if ui.button(format.label()).clicked() {
                                    export_requests.write(ExportRequest { format });
                                    ui.close();
                                }
                            }
                        });
                    });

                    ui.separator();

                    if ui.button("Fit").on_hover_text("Fit page to view").clicked() {
                        edit_commands.write(EditCommand::FitPage);
                    }
                    if ui.button("+").on_hover_text("Zoom in (+)").clicked() {
                        edit_commands.write(EditCommand::ZoomIn);
                    }
                    if ui
                        .button(format!("{:.0}%", viewport.zoom * 100.0))
                        .on_hover_text("Reset zoom (0)")
                        .clicked()
                    {
                        edit_commands.write(EditCommand::ZoomReset);
                    }
                    if ui.button("−").on_hover_text("Zoom out (-)").clicked() {
                        edit_commands.write(EditCommand::ZoomOut);
                    }
                });
            });
        });
    Ok(())
}

/// Secondary toolbar: color, width and selection actions
pub fn tool_settings_ui(
    mut contexts: EguiContexts,
    current_tool: Res<CurrentTool>,
    mut settings: ResMut<DrawSettings>,
    mut selection: ResMut<Selection>,
    mut edit_commands: MessageWriter<EditCommand>,
) -> Result {
    egui::TopBottomPanel::top("tool_settings")
        .frame(
            egui::Frame::side_top_panel(&contexts.ctx_mut()?.style())
                .inner_margin(egui::Margin::symmetric(12, 6))
                .fill(egui::Color32::from_rgb(45, 45, 48)),
        )
        .show(contexts.ctx_mut()?, |ui| {
            ui.horizontal_wrapped(|ui| {
                ui.spacing_mut().item_spacing.x = 6.0;

                ui.label(egui::RichText::new("Color:").color(egui::Color32::LIGHT_GRAY));

                for family in &COLOR_FAMILIES {
                    for (hex, name) in family.colors {
                        let is_selected = same_color(&settings.color, hex);
                        let button = egui::Button::new("")
                            .fill(swatch(hex))
                            .min_size(egui::vec2(18.0, 18.0))
                            .stroke(if is_selected {
                                egui::Stroke::new(2.0, egui::Color32::WHITE)
                            } else {
                                egui::Stroke::new(1.0, egui::Color32::DARK_GRAY)
                            });
                        if ui
                            .add(button)
                            .on_hover_text(format!("{} ({})", name, family.name))
                            .clicked()
                        {
                            settings.color = hex.to_string();
                        }
                    }
                    ui.add_space(4.0);
                }

                // Custom color
                let mut custom = swatch(&settings.color);
                if ui
                    .color_edit_button_srgba(&mut custom)
                    .on_hover_text("Custom color")
                    .changed()
                {
                    settings.color = to_hex(custom);
                }

                ui.add_space(8.0);
                ui.separator();
                ui.add_space(8.0);

                // Copy out so an untouched slider doesn't flag the settings as changed
                let mut width = settings.stroke_width;
                ui.label("Width:");
                if ui
                    .add(egui::Slider::new(&mut width, 1.0..=10.0).step_by(1.0).suffix(" px"))
                    .changed()
                {
                    settings.stroke_width = width;
                }

                if current_tool.tool == Tool::Text {
                    let mut font_size = settings.font_size;
                    ui.label("Font:");
                    if ui
                        .add(egui::DragValue::new(&mut font_size).range(6.0..=96.0).suffix(" pt"))
                        .changed()
                    {
                        settings.font_size = font_size;
                    }
                }

                ui.add_space(8.0);
                ui.separator();
                ui.add_space(8.0);

                if ui
                    .add_enabled(
                        selection.polygons().len() >= 2,
                        egui::Button::new("Merge Polygons"),
                    )
                    .on_hover_text("Combine the selected polygons into one")
                    .clicked()
                {
                    edit_commands.write(EditCommand::MergePolygons);
                }
                if ui
                    .add_enabled(!selection.is_empty(), egui::Button::new("Delete"))
                    .on_hover_text("Delete selected (Del)")
                    .clicked()
                {
                    edit_commands.write(EditCommand::DeleteSelection);
                }
                if !selection.is_empty() {
                    if ui.button("Deselect All").clicked() {
                        selection.clear();
                    }
                    ui.label(
                        egui::RichText::new(format!("{} selected", selection.total()))
                            .color(egui::Color32::GRAY)
                            .size(11.0),
                    );
                }
            });
        });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clicking_active_tool_returns_to_select() {
        assert_eq!(next_tool(Tool::Line, Tool::Line), Tool::Select);
        assert_eq!(next_tool(Tool::Line, Tool::Circle), Tool::Circle);
        assert_eq!(next_tool(Tool::Select, Tool::Select), Tool::Select);
    }
}
