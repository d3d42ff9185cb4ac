// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use tokio::sync::watch;

/// The controller side of a job's completion. It flips from pending to resolved once
/// and never back.
#[derive(Debug)]
pub struct JobCompletion {
    sender: watch::Sender<bool>,
}

impl Default for JobCompletion {
    fn default() -> Self { Self::new() }
}

impl JobCompletion {
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = watch::channel(false);
        Self { sender }
    }

    /// Returns `true` only the first time.
    pub fn resolve(&self) -> bool {
        self.sender.send_if_modified(|done| {
            if *done {
                false
            } else {
                *done = true;
                true
            }
        })
    }

    #[must_use]
    pub fn is_resolved(&self) -> bool { *self.sender.borrow() }

    #[must_use]
    pub fn subscribe(&self) -> JobWaiter {
        JobWaiter {
            receiver: self.sender.subscribe(),
        }
    }
}

/// A handle that completes when its job is done (or disowned). Waiting on a clone, or
/// after the fact, completes right away.
#[derive(Debug, Clone)]
pub struct JobWaiter {
    receiver: watch::Receiver<bool>,
}

impl JobWaiter {
    /// A waiter for a job that is already done.
    #[must_use]
    pub fn resolved() -> Self {
        let (_, receiver) = watch::channel(true);
        Self { receiver }
    }

    /// Also `true` when the controller side is gone, since nothing can resolve it then.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        *self.receiver.borrow() || self.receiver.has_changed().is_err()
    }

    pub async fn wait(mut self) {
        // An error means the controller side was dropped, which also ends the wait.
        let _unused = self.receiver.wait_for(|done| *done).await.map(|_| ());
    }
}
