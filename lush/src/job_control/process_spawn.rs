// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::{process::Stdio, sync::Arc};

use tokio::process::Command;

use crate::{JobControlError, JobController, JobEvent, JobId, JobOutcome,
            PidProcessHandle};

#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum JobSpawnError {
    #[error("Nothing to run")]
    #[diagnostic(code(r3bl_lush::job_control::empty_command))]
    EmptyCommand,

    #[error("Could not start `{program}`")]
    #[diagnostic(
        code(r3bl_lush::job_control::spawn_failed),
        help("Check that `{program}` is installed and on your PATH")
    )]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Control(#[from] JobControlError),
}

/// Spawns `argv` as a job of `controller` and starts a task that reports its exit to
/// [`JobController::event_sender`]. A background job gets no stdin and its own process
/// group, so Ctrl+C at the prompt doesn't reach it.
///
/// Must be called from within a tokio runtime.
///
/// # Errors
///
/// [`JobSpawnError::EmptyCommand`] for an empty `argv`, [`JobSpawnError::Spawn`] when
/// the OS could not start the program, [`JobSpawnError::Control`] for a foreground job
/// while another one holds the slot. No job is registered in any of these cases.
pub fn spawn_job(
    controller: &mut JobController,
    argv: &[String],
    background: bool,
) -> Result<JobId, JobSpawnError> {
    let Some((program, args)) = argv.split_first() else {
        return Err(JobSpawnError::EmptyCommand);
    };
    if let (false, Some(holder)) = (background, controller.foreground_holder()) {
        return Err(JobControlError::ForegroundBusy { holder }.into());
    }

    let mut command = Command::new(program);
    command.args(args);
    if background {
        command.stdin(Stdio::null());
        #[cfg(unix)]
        command.process_group(0);
    }

    let mut child = command.spawn().map_err(|source| JobSpawnError::Spawn {
        program: program.clone(),
        source,
    })?;

    let handle = Arc::new(PidProcessHandle::new(child.id()));
    let job_id = match controller.register(argv.join(" "), handle, background) {
        Ok(job_id) => job_id,
        Err(error) => {
            let _unused = child.start_kill();
            return Err(error.into());
        }
    };

    let sender = controller.event_sender();
    tokio::spawn(async move {
        let outcome = match child.wait().await {
            Ok(status) => JobOutcome::from(status),
            Err(error) => JobOutcome::Failed {
                message: error.to_string(),
            },
        };
        let _unused = sender.send(JobEvent { job_id, outcome });
    });

    Ok(job_id)
}
