use bevy::prelude::*;
use bevy_egui::{EguiContexts, egui};
use chrono::{DateTime, Local};

use crate::annotation::Annotation;
use crate::document::OpenDocument;
use crate::editor::EditCommand;
use crate::store::{AnnotationStore, Selection};

/// Wall-clock time an annotation was created, `--:--:--` when out of range
fn created_at(timestamp_ms: i64) -> String {
    DateTime::from_timestamp_millis(timestamp_ms)
        .map(|t| t.with_timezone(&Local).format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "--:--:--".to_string())
}

fn row_subtitle(annotation: &Annotation) -> String {
    format!("Page {} • {}", annotation.page, created_at(annotation.timestamp))
}

/// Right panel listing the current page's annotations
pub fn annotation_list_ui(
    mut contexts: EguiContexts,
    store: Res<AnnotationStore>,
    mut selection: ResMut<Selection>,
    doc: Res<OpenDocument>,
    mut edit_commands: MessageWriter<EditCommand>,
) -> Result {
    egui::SidePanel::right("annotation_list")
        .default_width(220.0)
        .show(contexts.ctx_mut()?, |ui| {
            ui.heading("Annotations");
            ui.separator();

            if !doc.is_open() {
                ui.weak("No document open");
                return;
            }

            let page = doc.page.max(1);
            let on_page: Vec<&Annotation> = store.for_page(page).collect();

            ui.horizontal(|ui| {
                ui.label(format!("{} on this page, {} total", on_page.len(), store.len()));
            });
            ui.add_space(4.0);

            if on_page.is_empty() {
                ui.add_space(12.0);
                ui.vertical_centered(|ui| {
                    ui.weak("No annotations yet");
                });
                return;
            }

            egui::ScrollArea::vertical()
                .max_height(ui.available_height() - 40.0)
                .show(ui, |ui| {
                    // Newest first
                    for annotation in on_page.iter().rev() {
                        let is_selected = selection.contains(&annotation.id);
                        ui.horizontal(|ui| {
                            let swatch = super::palette::swatch(&annotation.color);
                            let (rect, _) = ui
                                .allocate_exact_size(egui::vec2(10.0, 10.0), egui::Sense::hover());
                            ui.painter().rect_filled(rect, 2.0, swatch);

                            ui.vertical(|ui| {
                                let title = egui::RichText::new(annotation.summary()).strong();
                                if ui
                                    .selectable_label(is_selected, title)
                                    .on_hover_text("Click to toggle selection")
                                    .clicked()
                                {
                                    selection.toggle(annotation);
                                }
                                ui.label(
                                    egui::RichText::new(row_subtitle(annotation))
                                        .color(egui::Color32::GRAY)
                                        .size(11.0),
                                );
                            });

                            ui.with_layout(
                                egui::Layout::right_to_left(egui::Align::Center),
                                |ui| {
                                    if ui.small_button("✖").on_hover_text("Delete").clicked() {
                                        edit_commands
                                            .write(EditCommand::Delete(annotation.id.clone()));
                                    }
                                },
                            );
                        });
                        ui.separator();
                    }
                });

            ui.with_layout(egui::Layout::bottom_up(egui::Align::Center), |ui| {
                ui.add_space(8.0);
                if ui
                    .add_sized([140.0, 28.0], egui::Button::new("Clear Page"))
                    .on_hover_text("Remove every annotation on this page")
                    .clicked()
                {
                    edit_commands.write(EditCommand::ClearPage);
                }
            });
        });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::{Point, Shape, Stamp};

    #[test]
    fn test_row_subtitle_names_page() {
        let stamp = Stamp {
            color: "#000000".to_string(),
            stroke_width: 1.0,
            page: 4,
            timestamp_ms: 0,
        };
        let annotation = Annotation::create(
            Shape::line(Point::new(0.0, 0.0), Point::new(1.0, 1.0)),
            &stamp,
        );
        let subtitle = row_subtitle(&annotation);
        assert!(subtitle.starts_with("Page 4 • "));
        assert_eq!(subtitle.len(), "Page 4 • ".len() + 8);
    }

    #[test]
    fn test_out_of_range_timestamp_is_placeholder() {
        assert_eq!(created_at(i64::MAX), "--:--:--");
    }
}
