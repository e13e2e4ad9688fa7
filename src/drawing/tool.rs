use bevy::prelude::*;
use bevy::window::{CursorIcon, SystemCursorIcon};

use crate::constants::{CURVE_CLOSE_TOLERANCE, POLYGON_CLOSE_TOLERANCE};

/// Annotation tools
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Tool {
    #[default]
    Select,
    Line,
    Rectangle,
    Circle,
    Triangle,
    Polygon,
    Curve,
    Pencil,
    Text,
    Signature,
}

/// How a tool turns pointer input into a shape
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gesture {
    /// Press, drag, release: anchor plus live second point
    Drag,
    /// One click per vertex, closes near the first point
    ClickToClose { tolerance: f32 },
    /// One click per vertex, commits at a fixed count
    ClickCount(usize),
    /// Continuous trace while the button is held
    Trace,
    /// Click opens a dialog
    Dialog,
    /// No drawing; clicks select
    None,
}

impl Tool {
    pub fn display_name(&self) -> &'static str {
        match self {
            Tool::Select => "Select (V)",
            Tool::Line => "Line (L)",
            Tool::Rectangle => "Rectangle (R)",
            Tool::Circle => "Circle (C)",
            Tool::Triangle => "Triangle (T)",
            Tool::Polygon => "Polygon (P)",
            Tool::Curve => "Curve (U)",
            Tool::Pencil => "Pencil (D)",
            Tool::Text => "Text (X)",
            Tool::Signature => "Signature (S)",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Tool::Select => "Select",
            Tool::Line => "Line",
            Tool::Rectangle => "Rect",
            Tool::Circle => "Circle",
            Tool::Triangle => "Triangle",
            Tool::Polygon => "Polygon",
            Tool::Curve => "Curve",
            Tool::Pencil => "Pencil",
            Tool::Text => "Text",
            Tool::Signature => "Sign",
        }
    }

    pub fn shortcut(&self) -> KeyCode {
        match self {
            Tool::Select => KeyCode::KeyV,
            Tool::Line => KeyCode::KeyL,
            Tool::Rectangle => KeyCode::KeyR,
            Tool::Circle => KeyCode::KeyC,
            Tool::Triangle => KeyCode::KeyT,
            Tool::Polygon => KeyCode::KeyP,
            Tool::Curve => KeyCode::KeyU,
            Tool::Pencil => KeyCode::KeyD,
            Tool::Text => KeyCode::KeyX,
            Tool::Signature => KeyCode::KeyS,
        }
    }

    /// Hint shown in the status bar while the tool is active
    pub fn hint(&self) -> &'static str {
        match self {
            Tool::Select => "Click an annotation to toggle its selection",
            Tool::Line | Tool::Rectangle | Tool::Circle => "Press and drag to draw",
            Tool::Triangle => "Click three corners",
            Tool::Polygon => "Click to add points, click the first point to close",
            Tool::Curve => "Click to add control points, click the first point to finish",
            Tool::Pencil => "Hold and drag to draw freehand",
            Tool::Text => "Click where the text should go",
            Tool::Signature => "Click where the signature should go",
        }
    }

    pub fn cursor_icon(&self) -> CursorIcon {
        match self {
            Tool::Select => CursorIcon::System(SystemCursorIcon::Default),
            Tool::Text => CursorIcon::System(SystemCursorIcon::Text),
            Tool::Signature => CursorIcon::System(SystemCursorIcon::Pointer),
            _ => CursorIcon::System(SystemCursorIcon::Crosshair),
        }
    }

    pub fn gesture(&self) -> Gesture {
        match self {
            Tool::Select => Gesture::None,
            Tool::Line | Tool::Rectangle | Tool::Circle => Gesture::Drag,
            Tool::Triangle => Gesture::ClickCount(3),
            Tool::Polygon => Gesture::ClickToClose {
                tolerance: POLYGON_CLOSE_TOLERANCE,
            },
            Tool::Curve => Gesture::ClickToClose {
                tolerance: CURVE_CLOSE_TOLERANCE,
            },
            Tool::Pencil => Gesture::Trace,
            Tool::Text | Tool::Signature => Gesture::Dialog,
        }
    }

    pub fn all() -> &'static [Tool] {
        &[
            Tool::Select,
            Tool::Line,
            Tool::Rectangle,
            Tool::Circle,
            Tool::Triangle,
            Tool::Polygon,
            Tool::Curve,
            Tool::Pencil,
            Tool::Text,
            Tool::Signature,
        ]
    }

    /// Tools whose color and stroke width settings matter
    pub fn is_drawing_tool(&self) -> bool {
        !matches!(self, Tool::Select)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_display_names_contain_shortcuts() {
        for tool in Tool::all() {
            let name = tool.display_name();
            assert!(name.contains('('), "Display name should contain shortcut: {}", name);
            assert!(name.contains(')'), "Display name should contain shortcut: {}", name);
        }
    }

    #[test]
    fn test_shortcuts_are_unique() {
        let keys: HashSet<KeyCode> = Tool::all().iter().map(|t| t.shortcut()).collect();
        assert_eq!(keys.len(), Tool::all().len());
    }

    #[test]
    fn test_default_tool_is_select() {
        assert_eq!(Tool::default(), Tool::Select);
        assert!(!Tool::Select.is_drawing_tool());
        assert!(Tool::Pencil.is_drawing_tool());
    }

    #[test]
    fn test_close_tolerances() {
        assert_eq!(
            Tool::Polygon.gesture(),
            Gesture::ClickToClose { tolerance: 10.0 }
        );
        assert_eq!(
            Tool::Curve.gesture(),
            Gesture::ClickToClose { tolerance: 15.0 }
        );
    }

    #[test]
    fn test_text_tool_has_text_cursor() {
        assert_eq!(
            Tool::Text.cursor_icon(),
            CursorIcon::System(SystemCursorIcon::Text)
        );
    }
}
