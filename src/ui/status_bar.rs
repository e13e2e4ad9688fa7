use bevy::prelude::*;
use bevy_egui::{EguiContexts, egui};

use crate::document::OpenDocument;
use crate::drawing::{DrawingMachine, Tool};
use crate::editor::{CurrentTool, StatusMessage};
use crate::transform::ViewportTransform;

/// Left-hand status text: gesture progress while drawing, the tool hint otherwise
fn tool_status(tool: Tool, machine: &DrawingMachine) -> String {
    match machine.active_tool() {
        Some(active) if machine.point_count() > 0 => format!(
            "Drawing {} with {} points",
            active.label().to_lowercase(),
            machine.point_count()
        ),
        _ => tool.hint().to_string(),
    }
}

pub fn status_bar_ui(
    mut contexts: EguiContexts,
    current_tool: Res<CurrentTool>,
    machine: Res<DrawingMachine>,
    viewport: Res<ViewportTransform>,
    doc: Res<OpenDocument>,
    status: Res<StatusMessage>,
) -> Result {
    egui::TopBottomPanel::bottom("status_bar")
        .frame(
            egui::Frame::side_top_panel(&contexts.ctx_mut()?.style())
                .inner_margin(egui::Margin::symmetric(12, 4)),
        )
        .show(contexts.ctx_mut()?, |ui| {
            ui.horizontal(|ui| {
                ui.label(tool_status(current_tool.tool, &machine));

                if let Some(message) = &status.0 {
                    ui.separator();
                    ui.label(egui::RichText::new(message).color(egui::Color32::LIGHT_BLUE));
                }

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label(format!("{:.0}%", viewport.zoom * 100.0));
                    if doc.is_open() {
                        ui.separator();
                        ui.weak(format!(
                            "{} (page {} of {})",
                            doc.file_name(),
                            doc.page,
                            doc.page_count
                        ));
                    }
                });
            });
        });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::{Point, Stamp};
    use crate::drawing::ToolContext;

    #[test]
    fn test_idle_shows_tool_hint() {
        let machine = DrawingMachine::default();
        assert_eq!(tool_status(Tool::Polygon, &machine), Tool::Polygon.hint());
    }

    #[test]
    fn test_active_gesture_shows_point_count() {
        let mut machine = DrawingMachine::default();
        let ctx = ToolContext {
            tool: Tool::Polygon,
            stamp: Stamp {
                color: "#000000".to_string(),
                stroke_width: 1.0,
                page: 1,
                timestamp_ms: 0,
            },
        };
        machine.pointer_down(Point::new(0.0, 0.0), &ctx);
        machine.pointer_down(Point::new(50.0, 0.0), &ctx);
        assert_eq!(
            tool_status(Tool::Polygon, &machine),
            format!("Drawing polygon with {} points", machine.point_count())
        );
    }
}
