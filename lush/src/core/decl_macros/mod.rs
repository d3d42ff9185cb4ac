// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

// Attach sources.
pub mod macros;

// Re-export.
#[allow(unused_imports)]
pub use macros::*;
