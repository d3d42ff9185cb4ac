// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Keystroke routing over the token buffer, the completion engine and job control.
//!
//! [`LineEditor::handle_key`] takes one decoded [`KeyPress`] and returns an
//! [`EditorAction`]. While a job holds the foreground only Ctrl+C and Ctrl+Z get
//! through, as [`EditorAction::InterruptJob`] and [`EditorAction::SuspendJob`].

// Attach sources.
pub mod editor;
pub mod key_press;

// Re-export.
pub use editor::*;
pub use key_press::*;
