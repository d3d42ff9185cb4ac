// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::fmt::Debug;

use strum_macros::{Display, EnumString};

/// Signals the job controller and the `kill` builtin deliver. Parses w/ or w/o the
/// `SIG` prefix, in any case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum JobSignal {
    #[strum(to_string = "SIGHUP", serialize = "HUP")]
    Hangup,
    #[strum(to_string = "SIGINT", serialize = "INT")]
    Interrupt,
    #[strum(to_string = "SIGQUIT", serialize = "QUIT")]
    Quit,
    #[strum(to_string = "SIGKILL", serialize = "KILL")]
    Kill,
    #[strum(to_string = "SIGUSR1", serialize = "USR1")]
    User1,
    #[strum(to_string = "SIGUSR2", serialize = "USR2")]
    User2,
    #[strum(to_string = "SIGTERM", serialize = "TERM")]
    Terminate,
    #[strum(to_string = "SIGCONT", serialize = "CONT")]
    Continue,
    #[strum(to_string = "SIGSTOP", serialize = "STOP")]
    Stop,
    #[strum(to_string = "SIGTSTP", serialize = "TSTP")]
    TerminalStop,
}

impl JobSignal {
    /// A name (`TERM`, `sigterm`) or a platform signal number (`15`).
    #[must_use]
    pub fn parse_spec(text: &str) -> Option<Self> {
        match text.parse::<i32>() {
            Ok(number) => Self::from_number(number),
            Err(_) => text.parse().ok(),
        }
    }

    #[cfg(unix)]
    #[must_use]
    pub fn from_number(number: i32) -> Option<Self> {
        nix::sys::signal::Signal::try_from(number)
            .ok()
            .and_then(|signal| signal.as_str().parse().ok())
    }

    #[cfg(not(unix))]
    #[must_use]
    pub fn from_number(_number: i32) -> Option<Self> { None }
}

#[cfg(unix)]
impl From<JobSignal> for nix::sys::signal::Signal {
    fn from(signal: JobSignal) -> Self {
        use nix::sys::signal::Signal;
        match signal {
            JobSignal::Hangup => Signal::SIGHUP,
            JobSignal::Interrupt => Signal::SIGINT,
            JobSignal::Quit => Signal::SIGQUIT,
            JobSignal::Kill => Signal::SIGKILL,
            JobSignal::User1 => Signal::SIGUSR1,
            JobSignal::User2 => Signal::SIGUSR2,
            JobSignal::Terminate => Signal::SIGTERM,
            JobSignal::Continue => Signal::SIGCONT,
            JobSignal::Stop => Signal::SIGSTOP,
            JobSignal::TerminalStop => Signal::SIGTSTP,
        }
    }
}

/// Name of a raw signal number as the OS reports it in an exit status, eg `SIGSEGV`.
#[must_use]
pub fn signal_name(number: i32) -> String {
    #[cfg(unix)]
    if let Ok(signal) = nix::sys::signal::Signal::try_from(number) {
        return signal.as_str().to_string();
    }
    format!("SIG{number}")
}

/// # Errors
///
/// The OS refused: no such process, or not permitted.
#[cfg(unix)]
pub fn deliver_signal(pid: u32, signal: JobSignal) -> miette::Result<()> {
    use nix::{sys::signal::kill, unistd::Pid};

    let raw_pid = i32::try_from(pid).map_err(|_| miette::miette!("invalid pid {pid}"))?;
    kill(Pid::from_raw(raw_pid), nix::sys::signal::Signal::from(signal))
        .map_err(|errno| miette::miette!("({pid}) - {}", errno.desc()))
}

/// # Errors
///
/// Signals are not supported on this platform.
#[cfg(not(unix))]
pub fn deliver_signal(pid: u32, signal: JobSignal) -> miette::Result<()> {
    Err(miette::miette!("({pid}) - {signal} is not supported on this platform"))
}

/// The controller's view of a spawned process: its pid and a way to signal it.
pub trait ProcessHandle: Debug + Send + Sync {
    fn pid(&self) -> Option<u32>;

    /// Best effort. `false` when the signal could not be delivered.
    fn signal(&self, signal: JobSignal) -> bool;
}

/// Signals a process by pid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PidProcessHandle {
    pub pid: Option<u32>,
}

impl PidProcessHandle {
    #[must_use]
    pub fn new(pid: Option<u32>) -> Self { Self { pid } }
}

impl ProcessHandle for PidProcessHandle {
    fn pid(&self) -> Option<u32> { self.pid }

    fn signal(&self, signal: JobSignal) -> bool {
        let Some(pid) = self.pid else {
            return false;
        };
        match deliver_signal(pid, signal) {
            Ok(()) => true,
            Err(report) => {
                // % is Display, ? is Debug.
                tracing::warn!(
                    message = "Could not deliver signal",
                    signal = %signal,
                    error = %report
                );
                false
            }
        }
    }
}

#[cfg(test)]
pub mod test_handles {
    use std::sync::{Arc, Mutex};

    use super::{JobSignal, ProcessHandle};

    /// Records every signal instead of delivering it.
    #[derive(Debug, Clone, Default)]
    pub struct RecordingHandle {
        pub pid: Option<u32>,
        pub deliverable: bool,
        pub sent: Arc<Mutex<Vec<JobSignal>>>,
    }

    impl RecordingHandle {
        pub fn new(pid: u32) -> Self {
            Self {
                pid: Some(pid),
                deliverable: true,
                sent: Arc::default(),
            }
        }

        pub fn unreachable(pid: u32) -> Self {
            Self {
                deliverable: false,
                ..Self::new(pid)
            }
        }

        pub fn sent(&self) -> Vec<JobSignal> {
            self.sent.lock().map(|it| it.clone()).unwrap_or_default()
        }
    }

    impl ProcessHandle for RecordingHandle {
        fn pid(&self) -> Option<u32> { self.pid }

        fn signal(&self, signal: JobSignal) -> bool {
            if !self.deliverable {
                return false;
            }
            if let Ok(mut sent) = self.sent.lock() {
                sent.push(signal);
            }
            true
        }
    }
}
