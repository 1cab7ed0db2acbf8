//! Keyboard shortcut mapping.
//!
//! Turns a key event into a `ShortcutAction`; `Canvas::dispatch` runs it.
//! Ctrl and ⌘ (meta) are interchangeable so the same bindings work on
//! every platform.

/// Canvas commands reachable from the keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    Undo,
    Redo,
    Delete,
    SelectAll,
    Duplicate,
    Copy,
    Cut,
    Paste,
    Deselect,
}

pub struct ShortcutMap;

impl ShortcutMap {
    /// Resolve a `KeyboardEvent.key` plus modifiers. Letter keys match in
    /// either case since browsers report `"Z"` while shift is held.
    pub fn resolve(
        key: &str,
        ctrl: bool,
        shift: bool,
        _alt: bool,
        meta: bool,
    ) -> Option<ShortcutAction> {
        use ShortcutAction::*;

        let cmd = ctrl || meta;
        let key = key.to_ascii_lowercase();
        let action = match (cmd, shift, key.as_str()) {
            (true, true, "z") => Redo,
            (true, false, "z") => Undo,
            (true, false, "y") => Redo,
            (true, false, "a") => SelectAll,
            (true, false, "d") => Duplicate,
            (true, false, "c") => Copy,
            (true, false, "x") => Cut,
            (true, false, "v") => Paste,
            (false, false, "delete" | "backspace") => Delete,
            (false, false, "escape") => Deselect,
            _ => return None,
        };
        Some(action)
    }
}
