// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

// Attach sources.
pub mod tracing_config;
pub mod tracing_layers;

// Re-export.
pub use tracing_config::*;
pub use tracing_layers::*;
