// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Ambient plumbing shared by every component: error types, macros, tracing setup,
//! and the declarative shell configuration.

// Attach sources.
pub mod common;
pub mod config;
pub mod decl_macros;
pub mod log;

// Re-export.
pub use common::*;
pub use config::*;
pub use decl_macros::*;
pub use log::*;
