// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::process::ExitStatus;

use crate::{JobId, signal_name};

/// How a job's process ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    Exited {
        code: Option<i32>,
        signal: Option<String>,
    },
    /// The process could not be waited on. Recorded as exit code 1.
    Failed { message: String },
}

impl JobOutcome {
    #[must_use]
    pub fn exit_code(code: i32) -> Self {
        Self::Exited {
            code: Some(code),
            signal: None,
        }
    }

    #[must_use]
    pub fn killed_by(signal: impl Into<String>) -> Self {
        Self::Exited {
            code: None,
            signal: Some(signal.into()),
        }
    }
}

impl From<ExitStatus> for JobOutcome {
    fn from(status: ExitStatus) -> Self {
        #[cfg(unix)]
        let signal = {
            use std::os::unix::process::ExitStatusExt;
            status.signal().map(signal_name)
        };
        #[cfg(not(unix))]
        let signal = None;

        Self::Exited {
            code: status.code(),
            signal,
        }
    }
}

/// Delivered to the controller when a process of a job ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobEvent {
    pub job_id: JobId,
    pub outcome: JobOutcome,
}

/// What the controller asks of the terminal side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobNotice {
    /// Text to print above the prompt, eg `[1] Done make\n`.
    Output(String),
    RenderPrompt,
}
