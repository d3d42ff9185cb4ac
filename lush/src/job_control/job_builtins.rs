// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::fmt::{Debug, Formatter, Result};

use futures_util::{FutureExt, future::{BoxFuture, join_all}};

use crate::{JobController, JobSignal, JobStatus, deliver_signal, format_job};

/// Names and one line help of the job control builtins, for completion.
pub const JOB_BUILTINS: &[(&str, &str)] = &[
    ("jobs", "List tracked jobs"),
    ("fg", "Resume a job in the foreground"),
    ("bg", "Continue a stopped job in the background"),
    ("kill", "Send a signal to a job or pid"),
    ("wait", "Wait on the last job or provided IDs"),
    ("disown", "Remove jobs from tracking"),
    ("suspend-job", "Suspend the foreground job"),
];

/// What running a builtin produced. The caller prints `output` right away and, for
/// [`BuiltinCompletion::Deferred`], awaits `task` before it finalizes the command (eg
/// records it in history).
pub enum BuiltinCompletion {
    Immediate(String),
    Deferred {
        output: String,
        task: BoxFuture<'static, ()>,
    },
}

impl BuiltinCompletion {
    #[must_use]
    pub fn output(&self) -> &str {
        match self {
            BuiltinCompletion::Immediate(output)
            | BuiltinCompletion::Deferred { output, .. } => output,
        }
    }

    /// Awaits the deferred task, if any, and hands back the output.
    pub async fn finish(self) -> String {
        match self {
            BuiltinCompletion::Immediate(output) => output,
            BuiltinCompletion::Deferred { output, task } => {
                task.await;
                output
            }
        }
    }
}

impl Debug for BuiltinCompletion {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            BuiltinCompletion::Immediate(output) => {
                f.debug_tuple("Immediate").field(output).finish()
            }
            BuiltinCompletion::Deferred { output, .. } => f
                .debug_struct("Deferred")
                .field("output", output)
                .finish_non_exhaustive(),
        }
    }
}

#[must_use]
pub fn is_job_builtin(name: &str) -> bool {
    JOB_BUILTINS.iter().any(|(it, _)| *it == name)
}

/// Runs the job builtin `name`. `None` when `name` isn't one.
pub fn run_job_builtin(
    controller: &mut JobController,
    name: &str,
    args: &[String],
) -> Option<BuiltinCompletion> {
    let (_, help) = JOB_BUILTINS.iter().find(|(it, _)| *it == name)?;
    if matches!(args.first().map(String::as_str), Some("-h" | "--help")) {
        return Some(BuiltinCompletion::Immediate(format!("{name}: {help}\n")));
    }

    let it = match name {
        "jobs" => jobs(controller),
        "fg" => fg(controller, args),
        "bg" => bg(controller, args),
        "kill" => kill(controller, args),
        "wait" => wait(controller, args),
        "disown" => disown(controller, args),
        _ => suspend_job(controller),
    };
    Some(it)
}

fn jobs(controller: &JobController) -> BuiltinCompletion {
    let jobs = controller.jobs();
    if jobs.is_empty() {
        return BuiltinCompletion::Immediate("jobs: no active jobs\n".into());
    }
    let lines = jobs.into_iter().map(format_job).collect::<Vec<_>>();
    BuiltinCompletion::Immediate(format!("{}\n", lines.join("\n")))
}

fn fg(controller: &mut JobController, args: &[String]) -> BuiltinCompletion {
    let spec = args.first().map(String::as_str);
    let Some(id) = controller.find(spec) else {
        return BuiltinCompletion::Immediate(format!(
            "fg: no such job {}\n",
            spec.unwrap_or("%+")
        ));
    };
    let Some(job) = controller.job(id) else {
        return BuiltinCompletion::Immediate(String::new());
    };
    if job.is_done() {
        return BuiltinCompletion::Immediate(format!(
            "fg: job already complete {}\n",
            job.command
        ));
    }

    let output = format!("{}\n", job.command);
    match controller.resume_in_foreground(id) {
        Ok(waiter) => BuiltinCompletion::Deferred {
            output,
            task: waiter.wait().boxed(),
        },
        Err(error) => BuiltinCompletion::Immediate(format!("fg: {error}\n")),
    }
}

fn bg(controller: &mut JobController, args: &[String]) -> BuiltinCompletion {
    let spec = args.first().map(String::as_str);
    let Some(job) = controller.find(spec).and_then(|id| controller.job(id)) else {
        return BuiltinCompletion::Immediate(format!(
            "bg: no such job {}\n",
            spec.unwrap_or("%+")
        ));
    };
    if job.status != JobStatus::Stopped {
        return BuiltinCompletion::Immediate(format!(
            "bg: job not stopped ({})\n",
            job.status_label()
        ));
    }
    let id = job.id;
    controller.resume_in_background(id);
    BuiltinCompletion::Immediate(String::new())
}

/// `kill [-SIG] target...` where a target is a job spec or a raw pid.
fn kill(controller: &JobController, args: &[String]) -> BuiltinCompletion {
    let mut targets = args;
    let mut signal = JobSignal::Terminate;

    if let Some(value) = targets.first().and_then(|first| first.strip_prefix('-')) {
        match JobSignal::parse_spec(value) {
            Some(it) => signal = it,
            None => {
                return BuiltinCompletion::Immediate(format!(
                    "kill: invalid signal {value}\n"
                ));
            }
        }
        targets = &targets[1..];
    }
    if targets.is_empty() {
        return BuiltinCompletion::Immediate("kill: missing target\n".into());
    }

    let mut acc = String::new();
    for spec in targets {
        if let Some(id) = controller.find(Some(spec)) {
            if !controller.signal(id, signal) {
                acc.push_str(&format!("kill: failed for {spec}\n"));
            }
            continue;
        }
        let Ok(pid) = spec.parse::<u32>() else {
            acc.push_str(&format!("kill: invalid target {spec}\n"));
            continue;
        };
        if let Err(report) = deliver_signal(pid, signal) {
            acc.push_str(&format!("kill: {report}\n"));
        }
    }
    BuiltinCompletion::Immediate(acc)
}

fn wait(controller: &JobController, args: &[String]) -> BuiltinCompletion {
    if args.is_empty() {
        return BuiltinCompletion::Deferred {
            output: String::new(),
            task: controller.wait_all().boxed(),
        };
    }

    let mut output = String::new();
    let mut waiters = vec![];
    for spec in args {
        match controller.find(Some(spec)).and_then(|id| controller.wait(id)) {
            Some(waiter) => waiters.push(waiter.wait()),
            None => output.push_str(&format!("wait: no such job {spec}\n")),
        }
    }
    BuiltinCompletion::Deferred {
        output,
        task: async move {
            join_all(waiters).await;
        }
        .boxed(),
    }
}

fn disown(controller: &mut JobController, args: &[String]) -> BuiltinCompletion {
    if args.is_empty() {
        return BuiltinCompletion::Immediate("disown: missing job spec\n".into());
    }
    let mut acc = String::new();
    for spec in args {
        match controller.find(Some(spec)) {
            Some(id) => {
                controller.disown(id);
            }
            None => acc.push_str(&format!("disown: no such job {spec}\n")),
        }
    }
    BuiltinCompletion::Immediate(acc)
}

fn suspend_job(controller: &mut JobController) -> BuiltinCompletion {
    if controller.suspend_foreground() {
        BuiltinCompletion::Immediate(String::new())
    } else {
        BuiltinCompletion::Immediate("suspend-job: no foreground job\n".into())
    }
}
