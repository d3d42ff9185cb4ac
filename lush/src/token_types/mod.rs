// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Token types: named classifications for the segments of a line.
//!
//! Each editing mode has a [`TypeTable`] of [`TypeDescriptor`]s. A descriptor knows
//! whether some text can be of its type ([`Validator`]), how it is painted
//! ([`HighlightSpec`]), how much it should win against other types that also accept
//! the same text (`priority`), and whether edits may split it (`secable`).
//!
//! There is no global table. A [`TypeRegistry`] value is built from
//! [`crate::ShellConfig`] and passed to the code that needs it.

// Attach sources.
pub mod highlight_spec;
pub mod number_literal;
pub mod type_registry;
pub mod type_registry_error;
pub mod validator;

// Re-export.
pub use highlight_spec::*;
pub use number_literal::*;
pub use type_registry::*;
pub use type_registry_error::*;
pub use validator::*;

#[cfg(test)]
pub mod test_fixtures;
