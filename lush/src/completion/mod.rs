// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Completion of the token under the cursor.
//!
//! A [`CompletionPipeline`] runs [`CandidateProvider`] stages in order (folders,
//! builtins, snippets, `PATH` executables, an external symbol index), reporting progress
//! as it goes. Results are merged, deduplicated by value and sorted.
//!
//! A [`CompletionEngine`] drives one round trip at a time: it snapshots the line, runs
//! the pipeline off the async runtime, lays the candidates out in a column major grid
//! ([`compute_layout`]), moves the selection ([`navigate`]), and finally commits the
//! selection or restores the snapshot.
//!
//! Listings that are costly to build (`PATH`, the symbol index) are kept in an
//! [`MtimeCache`] until their source is modified.

// Attach sources.
pub mod builtin_provider;
pub mod candidate;
pub mod directory_provider;
pub mod engine;
pub mod grid_layout;
pub mod mtime_cache;
pub mod path_executable_provider;
pub mod pipeline;
pub mod provider;
pub mod scan;
pub mod session;
pub mod snippet_provider;
pub mod symbol_index;

// Re-export.
pub use builtin_provider::*;
pub use candidate::*;
pub use directory_provider::*;
pub use engine::*;
pub use grid_layout::*;
pub use mtime_cache::*;
pub use path_executable_provider::*;
pub use pipeline::*;
pub use provider::*;
pub use scan::*;
pub use session::*;
pub use snippet_provider::*;
pub use symbol_index::*;
