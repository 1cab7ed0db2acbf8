//! Canvas editing engine for Wordflow boards: mutations, selection,
//! clipboard, keyboard shortcuts and bounded undo/redo.

pub mod canvas;
pub mod clipboard;
pub mod history;
pub mod shortcuts;

pub use canvas::{Canvas, CanvasMutation};
pub use clipboard::Clipboard;
pub use history::{History, Snapshot};
pub use shortcuts::{ShortcutAction, ShortcutMap};
