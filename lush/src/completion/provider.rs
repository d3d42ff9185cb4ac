// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::path::PathBuf;

use crate::CompletionCandidate;

/// What the user is completing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionQuery {
    /// Text of the token being completed, possibly empty.
    pub prefix: String,
    /// Relative paths are resolved against this.
    pub cwd: PathBuf,
}

impl CompletionQuery {
    #[must_use]
    pub fn new(prefix: impl Into<String>, cwd: impl Into<PathBuf>) -> Self {
        Self {
            prefix: prefix.into(),
            cwd: cwd.into(),
        }
    }
}

/// One stage of the completion pipeline.
///
/// Providers do blocking I/O, the pipeline runs them off the async runtime. A provider
/// that fails only loses its own candidates.
pub trait CandidateProvider: Send + Sync {
    /// Progress label shown while this stage runs.
    fn label(&self) -> &'static str;

    /// Type names that candidates of this provider can have, most specific first. The
    /// first one declared in the active mode is used, and the stage is skipped if none
    /// is declared.
    fn token_type_aliases(&self) -> &'static [&'static str];

    /// # Errors
    ///
    /// Any error makes the pipeline skip this stage.
    fn collect(
        &self,
        query: &CompletionQuery,
        token_type: &str,
    ) -> miette::Result<Vec<CompletionCandidate>>;
}
