//! Keyboard shortcuts for edit, zoom and page commands.
//!
//! Tool shortcuts live in [`super::tools`]. Everything here is translated to
//! an [`EditCommand`] so the toolbar and the keyboard share one code path.

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use bevy_egui::EguiContexts;

use crate::config::AppConfig;
use crate::ui::DialogState;

use super::commands::EditCommand;

/// Decides whether keyboard shortcuts reach the editor this frame
#[derive(SystemParam)]
pub struct ShortcutGate<'w, 's> {
    contexts: EguiContexts<'w, 's>,
    config: Res<'w, AppConfig>,
    dialog_state: Res<'w, DialogState>,
}

impl ShortcutGate<'_, '_> {
    pub fn allows_shortcuts(&mut self) -> bool {
        if self.dialog_state.any_modal_open {
            return false;
        }
        if !self.config.data.suppress_shortcuts_in_text_fields {
            return true;
        }
        // Don't steal keys while typing in a text field
        !self
            .contexts
            .ctx_mut()
            .map(|ctx| ctx.wants_keyboard_input())
            .unwrap_or(false)
    }
}

/// Ctrl, or Cmd on macOS
pub fn command_held(keyboard: &ButtonInput<KeyCode>) -> bool {
    keyboard.any_pressed([
        KeyCode::ControlLeft,
        KeyCode::ControlRight,
        KeyCode::SuperLeft,
        KeyCode::SuperRight,
    ])
}

fn shift_held(keyboard: &ButtonInput<KeyCode>) -> bool {
    keyboard.any_pressed([KeyCode::ShiftLeft, KeyCode::ShiftRight])
}

/// Map this frame's key presses to a command
pub fn shortcut_command(keyboard: &ButtonInput<KeyCode>) -> Option<EditCommand> {
    let command = command_held(keyboard);
    let shift = shift_held(keyboard);

    if keyboard.just_pressed(KeyCode::Escape) {
        return Some(EditCommand::CancelGesture);
    }

    if command {
        // Ctrl+Y or Ctrl+Shift+Z = redo, Ctrl+Z = undo
        if keyboard.just_pressed(KeyCode::KeyY) || (shift && keyboard.just_pressed(KeyCode::KeyZ)) {
            return Some(EditCommand::Redo);
        }
        if keyboard.just_pressed(KeyCode::KeyZ) {
            return Some(EditCommand::Undo);
        }
        return None;
    }

    if keyboard.any_just_pressed([KeyCode::Delete, KeyCode::Backspace]) {
        return Some(EditCommand::DeleteSelection);
    }
    // `+` shares a key with `=`
    if keyboard.any_just_pressed([KeyCode::Equal, KeyCode::NumpadAdd]) {
        return Some(EditCommand::ZoomIn);
    }
    if keyboard.any_just_pressed([KeyCode::Minus, KeyCode::NumpadSubtract]) {
        return Some(EditCommand::ZoomOut);
    }
    if keyboard.any_just_pressed([KeyCode::Digit0, KeyCode::Numpad0]) {
        return Some(EditCommand::ZoomReset);
    }
    if keyboard.just_pressed(KeyCode::PageUp) {
        return Some(EditCommand::PreviousPage);
    }
    if keyboard.just_pressed(KeyCode::PageDown) {
        return Some(EditCommand::NextPage);
    }
    None
}

pub fn handle_edit_shortcuts(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut gate: ShortcutGate,
    mut commands: MessageWriter<EditCommand>,
) {
    if keyboard.get_just_pressed().next().is_none() || !gate.allows_shortcuts() {
        return;
    }
    if let Some(command) = shortcut_command(&keyboard) {
        commands.write(command);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(keys: &[KeyCode]) -> ButtonInput<KeyCode> {
        let mut input = ButtonInput::<KeyCode>::default();
        for key in keys {
            input.press(*key);
        }
        input
    }

    #[test]
    fn test_undo_and_redo_chords() {
        assert_eq!(
            shortcut_command(&press(&[KeyCode::ControlLeft, KeyCode::KeyZ])),
            Some(EditCommand::Undo)
        );
        assert_eq!(
            shortcut_command(&press(&[KeyCode::ControlLeft, KeyCode::KeyY])),
            Some(EditCommand::Redo)
        );
        assert_eq!(
            shortcut_command(&press(&[KeyCode::SuperLeft, KeyCode::ShiftLeft, KeyCode::KeyZ])),
            Some(EditCommand::Redo)
        );
    }

    #[test]
    fn test_plain_z_is_not_undo() {
        assert_eq!(shortcut_command(&press(&[KeyCode::KeyZ])), None);
    }

    #[test]
    fn test_escape_cancels() {
        assert_eq!(
            shortcut_command(&press(&[KeyCode::Escape])),
            Some(EditCommand::CancelGesture)
        );
    }

    #[test]
    fn test_delete_and_backspace_delete_selection() {
        assert_eq!(
            shortcut_command(&press(&[KeyCode::Delete])),
            Some(EditCommand::DeleteSelection)
        );
        assert_eq!(
            shortcut_command(&press(&[KeyCode::Backspace])),
            Some(EditCommand::DeleteSelection)
        );
    }

    #[test]
    fn test_zoom_and_page_keys() {
        assert_eq!(shortcut_command(&press(&[KeyCode::Equal])), Some(EditCommand::ZoomIn));
        assert_eq!(shortcut_command(&press(&[KeyCode::Minus])), Some(EditCommand::ZoomOut));
        assert_eq!(shortcut_command(&press(&[KeyCode::Digit0])), Some(EditCommand::ZoomReset));
        assert_eq!(
            shortcut_command(&press(&[KeyCode::PageDown])),
            Some(EditCommand::NextPage)
        );
        assert_eq!(
            shortcut_command(&press(&[KeyCode::PageUp])),
            Some(EditCommand::PreviousPage)
        );
    }

    #[test]
    fn test_held_keys_do_not_repeat() {
        let mut input = press(&[KeyCode::Delete]);
        input.clear();
        assert_eq!(shortcut_command(&input), None);
    }
}
