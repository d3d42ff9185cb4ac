// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::{future::Future, sync::Arc};

use futures_util::future::join_all;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

use crate::{Job, JobCompletion, JobEvent, JobId, JobNotice, JobOutcome, JobSignal,
            JobStatus, JobWaiter, ProcessHandle, find_job};

const DEBUG_JOB_CONTROL: bool = false;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error, miette::Diagnostic)]
pub enum JobControlError {
    #[error("No such job: {job_id}")]
    #[diagnostic(code(r3bl_lush::job_control::no_such_job))]
    NoSuchJob { job_id: JobId },

    #[error("Job {holder} already holds the foreground")]
    #[diagnostic(
        code(r3bl_lush::job_control::foreground_busy),
        help("Suspend it w/ Ctrl+Z, or wait for it to finish")
    )]
    ForegroundBusy { holder: JobId },
}

#[derive(Debug)]
struct JobEntry {
    job: Job,
    handle: Arc<dyn ProcessHandle>,
    completion: JobCompletion,
}

/// Owns every job and the foreground slot.
///
/// All transitions happen on the owner's task: process exits arrive as [`JobEvent`]s
/// on the channel from [`JobController::event_sender`] and are applied one at a time
/// w/ [`JobController::handle_event`] (or [`JobController::drain_events`]). Anything
/// the terminal should show is sent as a [`JobNotice`].
///
/// While a job holds the foreground slot, input is locked: the line editor only
/// accepts the interrupt and suspend gestures.
#[derive(Debug)]
pub struct JobController {
    entries: Vec<JobEntry>,
    next_id: JobId,
    foreground: Option<JobId>,
    input_locked: bool,
    notices: UnboundedSender<JobNotice>,
    event_sender: UnboundedSender<JobEvent>,
    event_receiver: UnboundedReceiver<JobEvent>,
}

impl JobController {
    #[must_use]
    pub fn new(notices: UnboundedSender<JobNotice>) -> Self {
        let (event_sender, event_receiver) = unbounded_channel();
        Self {
            entries: vec![],
            next_id: 1,
            foreground: None,
            input_locked: false,
            notices,
            event_sender,
            event_receiver,
        }
    }

    /// Hand a clone to whatever waits on the processes.
    #[must_use]
    pub fn event_sender(&self) -> UnboundedSender<JobEvent> { self.event_sender.clone() }

    /// Visible jobs (not disowned), oldest first.
    #[must_use]
    pub fn jobs(&self) -> Vec<&Job> {
        self.entries
            .iter()
            .map(|entry| &entry.job)
            .filter(|job| !job.disowned)
            .collect()
    }

    /// Any job still tracked, disowned ones included.
    #[must_use]
    pub fn job(&self, id: JobId) -> Option<&Job> { self.entry(id).map(|it| &it.job) }

    #[must_use]
    pub fn foreground_job(&self) -> Option<&Job> {
        self.foreground.and_then(|id| self.job(id))
    }

    #[must_use]
    pub fn is_input_locked(&self) -> bool { self.input_locked }

    /// The job in the foreground slot, unless it is done.
    #[must_use]
    pub fn foreground_holder(&self) -> Option<JobId> {
        self.foreground_job()
            .filter(|job| !job.is_done())
            .map(|job| job.id)
    }

    fn claim_foreground(&mut self, id: JobId) -> Result<(), JobControlError> {
        match self.foreground_holder() {
            Some(holder) if holder != id => Err(JobControlError::ForegroundBusy { holder }),
            _ => {
                self.input_locked = true;
                self.foreground = Some(id);
                Ok(())
            }
        }
    }

    /// See [`find_job`].
    #[must_use]
    pub fn find(&self, spec: Option<&str>) -> Option<JobId> {
        find_job(&self.jobs(), spec).map(|job| job.id)
    }

    /// Starts tracking a process. A foreground job locks input and takes the slot.
    ///
    /// # Errors
    ///
    /// [`JobControlError::ForegroundBusy`] for a foreground job while another one holds
    /// the slot. Nothing is tracked then.
    pub fn register(
        &mut self,
        command: impl Into<String>,
        handle: Arc<dyn ProcessHandle>,
        background: bool,
    ) -> Result<JobId, JobControlError> {
        let id = self.next_id;
        if !background {
            self.claim_foreground(id)?;
        }
        self.next_id += 1;

        let job = Job::new(id, handle.pid(), command, background);
        if background {
            self.notify(JobNotice::Output(job.notice("Started")));
            self.notify(JobNotice::RenderPrompt);
        }

        DEBUG_JOB_CONTROL.then(|| {
            // % is Display, ? is Debug.
            tracing::debug!(message = "Registered job", job = %job);
        });

        self.entries.push(JobEntry {
            job,
            handle,
            completion: JobCompletion::new(),
        });
        Ok(id)
    }

    /// Applies a process exit. Returns `false` for unknown jobs and for jobs that are
    /// already done, so a job's waiters are resolved once.
    pub fn handle_event(&mut self, event: JobEvent) -> bool {
        let JobEvent { job_id, outcome } = event;
        let was_foreground = self.foreground == Some(job_id);

        let Some(entry) = self.entry_mut(job_id) else {
            // % is Display, ? is Debug.
            tracing::warn!(message = "Event for unknown job", job_id = %job_id);
            return false;
        };
        if entry.job.is_done() {
            return false;
        }

        match outcome {
            JobOutcome::Exited { code, signal } => {
                entry.job.exit_code = code;
                entry.job.signal = signal;
            }
            JobOutcome::Failed { message } => {
                // % is Display, ? is Debug.
                tracing::warn!(message = "Job failed", job_id = %job_id, error = %message);
                entry.job.exit_code = Some(1);
                entry.job.signal = None;
            }
        }
        entry.job.transition_to(JobStatus::Done);
        entry.completion.resolve();

        let notice = (!was_foreground && !entry.job.disowned)
            .then(|| entry.job.notice(&entry.job.status_label()));

        DEBUG_JOB_CONTROL.then(|| {
            // % is Display, ? is Debug.
            tracing::debug!(message = "Job done", job = %entry.job);
        });

        if was_foreground {
            self.release_foreground();
        }
        if let Some(notice) = notice {
            self.notify(JobNotice::Output(notice));
            self.notify(JobNotice::RenderPrompt);
        }
        true
    }

    /// Waits for the next process exit. Pair it w/ [`JobController::handle_event`] in a
    /// `tokio::select!` loop.
    pub async fn recv_event(&mut self) -> Option<JobEvent> { self.event_receiver.recv().await }

    /// Applies every exit that already arrived, returns how many.
    pub fn drain_events(&mut self) -> usize {
        let mut count = 0;
        while let Ok(event) = self.event_receiver.try_recv() {
            self.handle_event(event);
            count += 1;
        }
        count
    }

    /// Stops the foreground job (`SIGTSTP`) and gives input back. `false` when there is
    /// no foreground job or the signal could not be delivered.
    pub fn suspend_foreground(&mut self) -> bool {
        let Some(id) = self.foreground else {
            return false;
        };
        let Some(entry) = self.entry_mut(id) else {
            return false;
        };
        if !entry.handle.signal(JobSignal::TerminalStop) {
            return false;
        }
        entry.job.transition_to(JobStatus::Stopped);
        entry.job.background = false;
        let notice = format!("\n{}", entry.job.notice("Stopped"));

        self.release_foreground();
        self.notify(JobNotice::Output(notice));
        self.notify(JobNotice::RenderPrompt);
        true
    }

    /// Ctrl+C while a job holds the foreground. The job keeps its status until its exit
    /// arrives.
    pub fn interrupt_foreground(&self) -> bool {
        self.foreground
            .is_some_and(|id| self.signal(id, JobSignal::Interrupt))
    }

    /// Moves a job to the foreground and continues it. The returned waiter completes
    /// when the job is done; it is already complete for a job that is done.
    ///
    /// # Errors
    ///
    /// [`JobControlError::NoSuchJob`] for an unknown job,
    /// [`JobControlError::ForegroundBusy`] while another job holds the slot.
    pub fn resume_in_foreground(&mut self, id: JobId) -> Result<JobWaiter, JobControlError> {
        let Some(entry) = self.entry(id) else {
            return Err(JobControlError::NoSuchJob { job_id: id });
        };
        if entry.job.is_done() {
            return Ok(JobWaiter::resolved());
        }
        self.claim_foreground(id)?;

        let Some(entry) = self.entry_mut(id) else {
            return Err(JobControlError::NoSuchJob { job_id: id });
        };
        entry.job.transition_to(JobStatus::Running);
        entry.job.background = false;
        entry.handle.signal(JobSignal::Continue);
        Ok(entry.completion.subscribe())
    }

    /// Continues a job in the background. Input locking is left alone.
    pub fn resume_in_background(&mut self, id: JobId) -> bool {
        let Some(entry) = self.entry_mut(id) else {
            return false;
        };
        if entry.job.is_done() {
            return false;
        }
        entry.job.transition_to(JobStatus::Running);
        entry.job.background = true;
        entry.handle.signal(JobSignal::Continue);
        let notice = entry.job.notice("Continued");

        self.notify(JobNotice::Output(notice));
        self.notify(JobNotice::RenderPrompt);
        true
    }

    /// Hides the job and resolves its waiters. The process keeps running and its exit is
    /// still recorded, silently.
    pub fn disown(&mut self, id: JobId) -> bool {
        let Some(entry) = self.entry_mut(id) else {
            return false;
        };
        if entry.job.disowned {
            return false;
        }
        entry.job.disowned = true;
        entry.completion.resolve();
        true
    }

    /// Completes once, at the job's `Done` transition. Already complete for a done or
    /// disowned job. `None` for an unknown job.
    #[must_use]
    pub fn wait(&self, id: JobId) -> Option<JobWaiter> {
        self.entry(id).map(|entry| entry.completion.subscribe())
    }

    /// Completes when every visible running job is done. Stopped jobs are skipped, they
    /// may never finish.
    #[must_use]
    pub fn wait_all(&self) -> impl Future<Output = ()> + Send + use<> {
        let waiters = self
            .entries
            .iter()
            .filter(|entry| !entry.job.disowned && entry.job.status != JobStatus::Stopped)
            .map(|entry| entry.completion.subscribe().wait())
            .collect::<Vec<_>>();
        async move {
            join_all(waiters).await;
        }
    }

    /// Best effort. `false` for an unknown job or when the OS refuses.
    pub fn signal(&self, id: JobId, signal: JobSignal) -> bool {
        self.entry(id)
            .is_some_and(|entry| entry.handle.signal(signal))
    }

    /// Forgets jobs that are done, after they were reported. Returns how many.
    pub fn prune_done(&mut self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|entry| !entry.job.is_done());
        before - self.entries.len()
    }

    fn release_foreground(&mut self) {
        self.foreground = None;
        self.input_locked = false;
    }

    fn notify(&self, notice: JobNotice) { let _unused = self.notices.send(notice); }

    fn entry(&self, id: JobId) -> Option<&JobEntry> {
        self.entries.iter().find(|entry| entry.job.id == id)
    }

    fn entry_mut(&mut self, id: JobId) -> Option<&mut JobEntry> {
        self.entries.iter_mut().find(|entry| entry.job.id == id)
    }
}
