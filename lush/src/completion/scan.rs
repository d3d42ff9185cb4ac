// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::{ops::ControlFlow,
          sync::{Arc,
                 atomic::{AtomicU64, Ordering}}};

use tokio::{sync::mpsc::UnboundedSender, task::JoinHandle};

use crate::{CompletionCandidate, CompletionPipeline, CompletionQuery, StageProgress,
            TypeTable};

/// Identifies one scan. Only the ticket handed out last is current.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScanTicket(pub u64);

/// Shared counter that makes every older [`ScanTicket`] stale. Cloning shares the
/// counter, so a running scan sees when it is superseded.
#[derive(Debug, Clone, Default)]
pub struct ScanGeneration {
    current: Arc<AtomicU64>,
}

impl ScanGeneration {
    /// Starts a new generation, superseding all outstanding tickets.
    pub fn next_ticket(&self) -> ScanTicket {
        ScanTicket(self.current.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Supersedes all outstanding tickets w/out issuing a new one.
    pub fn invalidate(&self) { self.current.fetch_add(1, Ordering::SeqCst); }

    #[must_use]
    pub fn is_current(&self, ticket: ScanTicket) -> bool {
        self.current.load(Ordering::SeqCst) == ticket.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanEvent {
    Progress {
        ticket: ScanTicket,
        progress: StageProgress,
    },
    Finished {
        ticket: ScanTicket,
        candidates: Vec<CompletionCandidate>,
    },
}

impl ScanEvent {
    #[must_use]
    pub fn ticket(&self) -> ScanTicket {
        match self {
            ScanEvent::Progress { ticket, .. } | ScanEvent::Finished { ticket, .. } => *ticket,
        }
    }
}

/// Runs `pipeline` on the blocking thread pool, sending [`ScanEvent`]s to `sender`.
/// The scan stops at the next stage boundary once `ticket` is no longer current, and a
/// stale scan never sends [`ScanEvent::Finished`].
pub fn spawn_scan(
    pipeline: Arc<CompletionPipeline>,
    types: Arc<TypeTable>,
    query: CompletionQuery,
    ticket: ScanTicket,
    generation: ScanGeneration,
    sender: UnboundedSender<ScanEvent>,
) -> JoinHandle<()> {
    tokio::task::spawn_blocking(move || {
        let candidates = pipeline.collect(&query, &types, |progress| {
            if !generation.is_current(ticket) {
                return ControlFlow::Break(());
            }
            let _unused = sender.send(ScanEvent::Progress { ticket, progress });
            ControlFlow::Continue(())
        });

        match candidates {
            Some(candidates) if generation.is_current(ticket) => {
                let _unused = sender.send(ScanEvent::Finished { ticket, candidates });
            }
            _ => {
                // % is Display, ? is Debug.
                tracing::debug!(message = "Completion scan superseded", ticket = ?ticket);
            }
        }
    })
}

#[cfg(test)]
mod tests_scan {
    use tokio::sync::mpsc::unbounded_channel;

    use super::*;
    use crate::{assert_eq2, completion::pipeline::test_providers::sample_pipeline,
                token_types::test_fixtures::shell_type_table};

    #[test]
    fn test_tickets() {
        let generation = ScanGeneration::default();
        let first = generation.next_ticket();
        assert!(generation.is_current(first));
        let second = generation.clone().next_ticket();
        assert!(!generation.is_current(first));
        assert!(generation.is_current(second));
        generation.invalidate();
        assert!(!generation.is_current(second));
    }

    #[tokio::test]
    async fn test_current_scan_reports_progress_then_results() {
        let generation = ScanGeneration::default();
        let ticket = generation.next_ticket();
        let (sender, mut receiver) = unbounded_channel();

        spawn_scan(
            Arc::new(sample_pipeline()),
            Arc::new(shell_type_table()),
            CompletionQuery::new("e", "/"),
            ticket,
            generation,
            sender,
        )
        .await
        .unwrap();

        let mut events = vec![];
        while let Ok(it) = receiver.try_recv() {
            events.push(it);
        }
        assert_eq2!(events.len(), 5);
        match events.last() {
            Some(ScanEvent::Finished { candidates, .. }) => {
                assert_eq2!(candidates.len(), 1);
                assert_eq2!(candidates[0].value, "echo");
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_stale_scan_sends_nothing() {
        let generation = ScanGeneration::default();
        let ticket = generation.next_ticket();
        generation.invalidate();
        let (sender, mut receiver) = unbounded_channel();

        spawn_scan(
            Arc::new(sample_pipeline()),
            Arc::new(shell_type_table()),
            CompletionQuery::new("", "/"),
            ticket,
            generation,
            sender,
        )
        .await
        .unwrap();

        assert!(receiver.try_recv().is_err());
    }
}
