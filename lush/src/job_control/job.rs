// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::fmt::{Display, Formatter, Result};

use chrono::{DateTime, Local};
use strum_macros::{Display as StrumDisplay, EnumString};

pub type JobId = usize;

/// `Done` is terminal. A job can bounce between `Running` and `Stopped` any number of
/// times before that.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, StrumDisplay, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum JobStatus {
    Running,
    Stopped,
    Done,
}

impl JobStatus {
    /// `Running -> Running` is allowed: `fg` on a job that is already running in the
    /// background only moves it to the foreground.
    #[must_use]
    pub fn can_transition_to(self, next: JobStatus) -> bool {
        !matches!(
            (self, next),
            (JobStatus::Done, _) | (JobStatus::Stopped, JobStatus::Stopped)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub id: JobId,
    /// `None` when the process never reported one.
    pub pid: Option<u32>,
    pub command: String,
    pub status: JobStatus,
    pub background: bool,
    pub started_at: DateTime<Local>,
    pub stopped_at: Option<DateTime<Local>>,
    pub exit_code: Option<i32>,
    /// Name of the signal that ended the job, eg `SIGKILL`.
    pub signal: Option<String>,
    pub disowned: bool,
}

impl Job {
    #[must_use]
    pub fn new(
        id: JobId,
        pid: Option<u32>,
        command: impl Into<String>,
        background: bool,
    ) -> Self {
        Self {
            id,
            pid,
            command: command.into(),
            status: JobStatus::Running,
            background,
            started_at: Local::now(),
            stopped_at: None,
            exit_code: None,
            signal: None,
            disowned: false,
        }
    }

    #[must_use]
    pub fn is_done(&self) -> bool { self.status == JobStatus::Done }

    /// Moves the job to `next` and stamps [`Job::stopped_at`]. Returns `false` and
    /// leaves the job untouched when the move isn't allowed.
    pub fn transition_to(&mut self, next: JobStatus) -> bool {
        if !self.status.can_transition_to(next) {
            return false;
        }
        self.status = next;
        match next {
            JobStatus::Stopped => self.stopped_at = Some(Local::now()),
            JobStatus::Running => self.stopped_at = None,
            JobStatus::Done => {}
        }
        true
    }

    #[must_use]
    pub fn status_label(&self) -> String {
        match self.status {
            JobStatus::Running if self.background => "Running".into(),
            JobStatus::Running => "Foreground".into(),
            JobStatus::Stopped => "Stopped".into(),
            JobStatus::Done => match (&self.signal, self.exit_code) {
                (Some(signal), _) => format!("Terminated ({signal})"),
                (None, Some(0)) => "Done".into(),
                (None, Some(code)) => format!("Exit {code}"),
                (None, None) => "Exit ?".into(),
            },
        }
    }

    /// One line notice, eg `[1] Stopped sleep 10`.
    #[must_use]
    pub fn notice(&self, label: &str) -> String {
        format!("[{}] {label} {}\n", self.id, self.command)
    }
}

/// `[id] pid status command`, w/ `?` for an unknown pid.
impl Display for Job {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let pid = self
            .pid
            .map_or_else(|| "?".to_string(), |pid| pid.to_string());
        write!(f, "[{}] {pid} {} {}", self.id, self.status_label(), self.command)
    }
}

#[must_use]
pub fn format_job(job: &Job) -> String { job.to_string() }

#[cfg(test)]
mod tests_job {
    use super::*;
    use crate::assert_eq2;
    use test_case::test_case;

    #[test_case(JobStatus::Running, JobStatus::Stopped, true)]
    #[test_case(JobStatus::Running, JobStatus::Running, true)]
    #[test_case(JobStatus::Running, JobStatus::Done, true)]
    #[test_case(JobStatus::Stopped, JobStatus::Running, true)]
    #[test_case(JobStatus::Stopped, JobStatus::Done, true)]
    #[test_case(JobStatus::Stopped, JobStatus::Stopped, false)]
    #[test_case(JobStatus::Done, JobStatus::Running, false)]
    #[test_case(JobStatus::Done, JobStatus::Stopped, false)]
    #[test_case(JobStatus::Done, JobStatus::Done, false)]
    fn test_status_transitions(from: JobStatus, to: JobStatus, allowed: bool) {
        assert_eq2!(from.can_transition_to(to), allowed);
    }

    #[test]
    fn test_done_is_terminal() {
        let mut job = Job::new(1, Some(42), "sleep 1", false);
        assert!(job.transition_to(JobStatus::Stopped));
        assert!(job.stopped_at.is_some());
        assert!(job.transition_to(JobStatus::Running));
        assert!(job.stopped_at.is_none());
        assert!(job.transition_to(JobStatus::Done));
        assert!(!job.transition_to(JobStatus::Running));
        assert_eq2!(job.status, JobStatus::Done);
    }

    #[test]
    fn test_status_labels() {
        let mut job = Job::new(3, None, "make", true);
        assert_eq2!(job.status_label(), "Running");
        job.background = false;
        assert_eq2!(job.status_label(), "Foreground");
        job.transition_to(JobStatus::Stopped);
        assert_eq2!(job.status_label(), "Stopped");

        job.transition_to(JobStatus::Done);
        job.exit_code = Some(0);
        assert_eq2!(job.status_label(), "Done");
        job.exit_code = Some(2);
        assert_eq2!(job.status_label(), "Exit 2");
        job.exit_code = None;
        job.signal = Some("SIGKILL".into());
        assert_eq2!(job.status_label(), "Terminated (SIGKILL)");
    }

    #[test]
    fn test_format_job() {
        let mut job = Job::new(1, Some(4242), "sleep 10", true);
        assert_eq2!(format_job(&job), "[1] 4242 Running sleep 10");
        job.pid = None;
        assert_eq2!(format_job(&job), "[1] ? Running sleep 10");
        assert_eq2!(job.notice("Stopped"), "[1] Stopped sleep 10\n");
    }
}
