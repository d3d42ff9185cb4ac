// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! # `r3bl_lush`
//!
//! The engine of an interactive shell. Three components sit behind a line editor:
//!
//! 1. **Token buffer** ([`token_buffer`]). The line being edited is a sequence of typed
//!    [`Token`]s. Every keystroke edits the tokens in place (insert, delete, split,
//!    merge), and the edited tokens are checked against a [`TypeTable`] so that, for
//!    example, `echo` becomes a builtin and `42` a number. Concatenating the tokens
//!    always gives back exactly what was typed. A double space cycles the type of the
//!    word before the cursor.
//! 2. **Job control** ([`job_control`]). External commands run as [`Job`]s in the
//!    foreground or the background, and can be suspended, resumed, signalled, waited on
//!    and disowned. While a job holds the foreground, input is locked.
//! 3. **Completion** ([`completion`]). Tab runs a pipeline of candidate providers
//!    (folders, builtins, snippets, `PATH` executables, a ctags symbol index) off the
//!    async runtime, lays the results out in a grid, and lets the user navigate,
//!    commit or cancel. A keystroke makes a scan in flight stale.
//!
//! Token types come from a declarative JSON document ([`ShellConfig`]) compiled into a
//! [`TypeRegistry`], one [`TypeTable`] per mode. An invalid document is the one fatal
//! error: there is no safe default set of types to fall back on.
//!
//! # Example
//!
//! ```
//! use r3bl_lush::{ShellConfig, TypeRegistry, insert_char, tokenize};
//!
//! let config = ShellConfig::try_builtin().unwrap();
//! let registry = TypeRegistry::try_from_config(&config).unwrap();
//! let types = registry.table("shell").unwrap();
//!
//! let mut line = tokenize("echo 42");
//! insert_char(types, &mut line, 7, '0');
//! assert_eq!(line.text(), "echo 420");
//! ```

// Enforce strict error handling in production library code only. Tests are allowed to
// use .unwrap() (workspace `Cargo.toml` config allows it).
#![cfg_attr(not(test), deny(clippy::unwrap_in_result))]

// Attach modules.
pub mod completion;
pub mod core;
pub mod job_control;
pub mod line_editor;
pub mod token_buffer;
pub mod token_types;

// Re-export.
#[allow(ambiguous_glob_reexports)]
pub use completion::*;
#[allow(ambiguous_glob_reexports)]
pub use core::*;
#[allow(ambiguous_glob_reexports)]
pub use job_control::*;
#[allow(ambiguous_glob_reexports)]
pub use line_editor::*;
#[allow(ambiguous_glob_reexports)]
pub use token_buffer::*;
#[allow(ambiguous_glob_reexports)]
pub use token_types::*;
