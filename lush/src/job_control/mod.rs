// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Job control: foreground and background processes, suspend and resume, waiting.
//!
//! A [`JobController`] tracks every [`Job`] and the single foreground slot. Processes
//! are spawned w/ [`spawn_job`] and signalled through a [`ProcessHandle`]; their exits
//! come back as [`JobEvent`]s that the controller applies in order. A job moves
//! between `Running` and `Stopped` until it is `Done`, which is terminal.
//!
//! The shell facing commands (`jobs`, `fg`, `bg`, `kill`, `wait`, `disown`,
//! `suspend-job`) are in [`run_job_builtin`].

// Attach sources.
pub mod job;
pub mod job_builtins;
pub mod job_controller;
pub mod job_event;
pub mod job_spec;
pub mod job_waiter;
pub mod process_handle;
pub mod process_spawn;

// Re-export.
pub use job::*;
pub use job_builtins::*;
pub use job_controller::*;
pub use job_event::*;
pub use job_spec::*;
pub use job_waiter::*;
pub use process_handle::*;
pub use process_spawn::*;
