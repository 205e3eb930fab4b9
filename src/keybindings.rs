//! Keyboard mapping for the canvas.
//!
//! A stateless table from a key and its modifiers to a semantic editing
//! action. Keys arrive as DOM `KeyboardEvent.key` names.

/// Keys the canvas reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Enter,
    Delete,
    Backspace,
    Escape,
    Tab,
    Control,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    /// A printable character, lowercased
    Char(char),
}

impl Key {
    /// Parse a DOM key name. Unknown names yield `None`.
    pub fn from_dom_name(name: &str) -> Option<Key> {
        let key = match name {
            "Enter" => Key::Enter,
            "Delete" => Key::Delete,
            "Backspace" => Key::Backspace,
            "Escape" | "Esc" => Key::Escape,
            "Tab" => Key::Tab,
            "Control" => Key::Control,
            "ArrowUp" => Key::ArrowUp,
            "ArrowDown" => Key::ArrowDown,
            "ArrowLeft" => Key::ArrowLeft,
            "ArrowRight" => Key::ArrowRight,
            _ => {
                let mut chars = name.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Key::Char(c.to_ascii_lowercase()),
                    _ => return None,
                }
            }
        };
        Some(key)
    }
}

/// Modifier state at the time of a key event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
    };
    pub const CTRL: Modifiers = Modifiers {
        shift: false,
        ctrl: true,
    };
    pub const SHIFT: Modifiers = Modifiers {
        shift: true,
        ctrl: false,
    };
}

/// Camera nudge direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// Semantic action produced by a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    EditLabel,
    DeleteAnno,
    Undo,
    Redo,
    TraverseAnnos,
    TraverseAnnosBackwards,
    CamMove(Direction),
    CamMoveStop,
    CopyAnnotation,
    PasteAnnotation,
    ToggleImageJunk,
    RecreateAnno,
    DeleteAnnoInCreation,
    ToggleAnnoCommentInput,
    EnterAnnoAddMode,
    LeaveAnnoAddMode,
}

fn arrow_direction(key: Key) -> Option<Direction> {
    match key {
        Key::ArrowUp => Some(Direction::Up),
        Key::ArrowDown => Some(Direction::Down),
        Key::ArrowLeft => Some(Direction::Left),
        Key::ArrowRight => Some(Direction::Right),
        _ => None,
    }
}

/// Map a key press to an action.
pub fn map_key_down(key: Key, modifiers: Modifiers) -> Option<KeyAction> {
    let action = match (key, modifiers.ctrl, modifiers.shift) {
        (Key::Enter, _, _) => KeyAction::EditLabel,
        (Key::Delete | Key::Backspace, _, _) => KeyAction::DeleteAnno,
        (Key::Escape, _, _) => KeyAction::DeleteAnnoInCreation,
        (Key::Tab, _, false) => KeyAction::TraverseAnnos,
        (Key::Tab, _, true) => KeyAction::TraverseAnnosBackwards,
        (Key::Control, _, _) => KeyAction::EnterAnnoAddMode,
        (Key::Char('z'), true, false) => KeyAction::Undo,
        (Key::Char('z'), true, true) | (Key::Char('y'), true, _) => KeyAction::Redo,
        (Key::Char('c'), true, _) => KeyAction::CopyAnnotation,
        (Key::Char('v'), true, _) => KeyAction::PasteAnnotation,
        (Key::Char('c') | Key::Char('k'), false, _) => KeyAction::ToggleAnnoCommentInput,
        (Key::Char('j'), false, _) => KeyAction::ToggleImageJunk,
        (Key::Char('e'), false, _) => KeyAction::RecreateAnno,
        (arrow, _, _) => match arrow_direction(arrow) {
            Some(direction) => KeyAction::CamMove(direction),
            None => {
                log::debug!("Unmapped key {:?} ({:?})", key, modifiers);
                return None;
            }
        },
    };
    log::trace!("Key {:?} -> {:?}", key, action);
    Some(action)
}

/// Map a key release to an action.
pub fn map_key_up(key: Key) -> Option<KeyAction> {
    match key {
        Key::Control => Some(KeyAction::LeaveAnnoAddMode),
        k if arrow_direction(k).is_some() => Some(KeyAction::CamMoveStop),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dom_names_parse() {
        assert_eq!(Key::from_dom_name("ArrowLeft"), Some(Key::ArrowLeft));
        assert_eq!(Key::from_dom_name("Z"), Some(Key::Char('z')));
        assert_eq!(Key::from_dom_name("F13"), None);
    }

    #[test]
    fn undo_and_redo_chords() {
        assert_eq!(map_key_down(Key::Char('z'), Modifiers::CTRL), Some(KeyAction::Undo));
        let ctrl_shift = Modifiers { shift: true, ctrl: true };
        assert_eq!(map_key_down(Key::Char('z'), ctrl_shift), Some(KeyAction::Redo));
        assert_eq!(map_key_down(Key::Char('y'), Modifiers::CTRL), Some(KeyAction::Redo));
        // plain z does nothing
        assert_eq!(map_key_down(Key::Char('z'), Modifiers::NONE), None);
    }

    #[test]
    fn c_depends_on_ctrl() {
        assert_eq!(map_key_down(Key::Char('c'), Modifiers::CTRL), Some(KeyAction::CopyAnnotation));
        assert_eq!(
            map_key_down(Key::Char('c'), Modifiers::NONE),
            Some(KeyAction::ToggleAnnoCommentInput)
        );
    }

    #[test]
    fn tab_direction_follows_shift() {
        assert_eq!(map_key_down(Key::Tab, Modifiers::NONE), Some(KeyAction::TraverseAnnos));
        assert_eq!(
            map_key_down(Key::Tab, Modifiers::SHIFT),
            Some(KeyAction::TraverseAnnosBackwards)
        );
    }

    #[test]
    fn arrows_move_and_stop_camera() {
        assert_eq!(
            map_key_down(Key::ArrowUp, Modifiers::NONE),
            Some(KeyAction::CamMove(Direction::Up))
        );
        assert_eq!(map_key_up(Key::ArrowUp), Some(KeyAction::CamMoveStop));
        assert_eq!(map_key_up(Key::Char('a')), None);
    }

    #[test]
    fn control_toggles_add_mode() {
        assert_eq!(map_key_down(Key::Control, Modifiers::CTRL), Some(KeyAction::EnterAnnoAddMode));
        assert_eq!(map_key_up(Key::Control), Some(KeyAction::LeaveAnnoAddMode));
    }

    #[test]
    fn unknown_keys_are_ignored() {
        assert_eq!(map_key_down(Key::Char('q'), Modifiers::NONE), None);
    }
}
