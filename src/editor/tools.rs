use bevy::prelude::*;
use bevy::window::{CursorIcon, PrimaryWindow, SystemCursorIcon};
use bevy_egui::EguiContexts;

use crate::annotation::Stamp;
use crate::config::AppConfig;
use crate::constants::{DEFAULT_FONT_SIZE, INITIAL_SELECTED_COLOR, INITIAL_STROKE_WIDTH};
use crate::document::OpenDocument;
use crate::drawing::{DrawingMachine, Tool, ToolContext};

use super::shortcuts::{ShortcutGate, command_held};

#[derive(Resource, Default)]
pub struct CurrentTool {
    pub tool: Tool,
}

/// Color, stroke width and font size applied to new annotations
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct DrawSettings {
    /// CSS-style color string; blank means the default stroke color
    pub color: String,
    pub stroke_width: f32,
    pub font_size: f32,
}

impl Default for DrawSettings {
    fn default() -> Self {
        Self {
            color: INITIAL_SELECTED_COLOR.to_string(),
            stroke_width: INITIAL_STROKE_WIDTH,
            font_size: DEFAULT_FONT_SIZE,
        }
    }
}

impl DrawSettings {
    pub fn stamp(&self, page: u32) -> Stamp {
        Stamp::now(&self.color, self.stroke_width, page)
    }
}

/// Sample the tool inputs at the moment of a pointer event
pub fn tool_context(tool: &CurrentTool, settings: &DrawSettings, doc: &OpenDocument) -> ToolContext {
    ToolContext {
        tool: tool.tool,
        stamp: settings.stamp(doc.page.max(1)),
    }
}

/// Seed the draw settings from the loaded config
pub fn apply_config_defaults(config: Res<AppConfig>, mut settings: ResMut<DrawSettings>) {
    settings.color = config.data.default_color.clone();
    settings.stroke_width = config.data.default_stroke_width;
    settings.font_size = config.data.default_font_size;
}

pub fn handle_tool_shortcuts(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut current_tool: ResMut<CurrentTool>,
    mut gate: ShortcutGate,
) {
    if !gate.allows_shortcuts() {
        return;
    }
    // Ctrl+letter belongs to edit commands
    if command_held(&keyboard) {
        return;
    }

    let new_tool = Tool::all()
        .iter()
        .find(|tool| keyboard.just_pressed(tool.shortcut()))
        .copied();

    if let Some(tool) = new_tool
        && tool != current_tool.tool
    {
        current_tool.tool = tool;
    }
}

/// A gesture belonging to another tool never survives a tool switch
pub fn sync_machine_tool(current_tool: Res<CurrentTool>, mut machine: ResMut<DrawingMachine>) {
    if machine.active_tool().is_some_and(|t| t != current_tool.tool) {
        machine.set_tool(current_tool.tool);
    }
}

pub fn update_cursor_icon(
    current_tool: Res<CurrentTool>,
    mut window_query: Query<(Entity, &Window), With<PrimaryWindow>>,
    mut commands: Commands,
    mut contexts: EguiContexts,
) {
    let Ok((entity, _window)) = window_query.single_mut() else {
        return;
    };

    // Use default cursor over UI, tool cursor on the surface
    if let Ok(ctx) = contexts.ctx_mut()
        && ctx.is_pointer_over_area()
    {
        commands
            .entity(entity)
            .insert(CursorIcon::System(SystemCursorIcon::Default));
        return;
    }

    commands.entity(entity).insert(current_tool.tool.cursor_icon());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = DrawSettings::default();
        assert_eq!(settings.color, "#FF0000");
        assert_eq!(settings.stroke_width, 2.0);
    }

    #[test]
    fn test_stamp_uses_settings() {
        let settings = DrawSettings {
            color: "blue".to_string(),
            stroke_width: 4.0,
            font_size: 12.0,
        };
        let stamp = settings.stamp(3);
        assert_eq!(stamp.color, "blue");
        assert_eq!(stamp.stroke_width, 4.0);
        assert_eq!(stamp.page, 3);
    }

    #[test]
    fn test_tool_context_never_uses_page_zero() {
        let ctx = tool_context(
            &CurrentTool { tool: Tool::Line },
            &DrawSettings::default(),
            &OpenDocument::default(),
        );
        assert_eq!(ctx.tool, Tool::Line);
        assert_eq!(ctx.stamp.page, 1);
    }
}
