// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! The typed line buffer.
//!
//! A [`TokenLine`] is a sequence of [`Token`]s whose texts, concatenated in order, are
//! exactly the characters the user typed. Every edit in this module keeps that
//! invariant, and none of them can fail: columns out of range are clamped, and an edit
//! that isn't allowed (splitting a non secable token) is a no-op that returns `false`.
//!
//! Columns and offsets count [`char`]s, not bytes.
//!
//! # Reclassification
//!
//! A leaf that is edited, split or merged is checked against the [`crate::TypeTable`]
//! and moved to its best valid type. [`crate::SPACE_TYPE`] and
//! [`crate::NAKED_STRING_TYPE`] leaves are left alone: a naked string stays naked until
//! the user cycles its type explicitly w/ [`rotate_type`].

// Attach sources.
pub mod edit_delete;
pub mod edit_insert;
pub mod edit_split;
pub mod leaf_locator;
pub mod multi_line;
pub mod normalize;
pub mod token;
pub mod tokenize;
pub mod type_rotation;

// Re-export.
pub use edit_delete::*;
pub use edit_insert::*;
pub use edit_split::*;
pub use leaf_locator::*;
pub use multi_line::*;
pub use normalize::*;
pub use token::*;
pub use tokenize::*;
pub use type_rotation::*;
