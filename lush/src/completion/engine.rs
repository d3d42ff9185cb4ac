// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::{ops::ControlFlow,
          path::Path,
          sync::Arc};

use tokio::{sync::mpsc::UnboundedSender, task::JoinHandle};

use crate::{CompletionCandidate, CompletionConfig, CompletionPhase, CompletionPipeline,
            CompletionQuery, CompletionSession, CompletionSnapshot, NavDirection,
            ScanEvent, ScanGeneration, ScanTicket, TokenLine, TypeTable, Viewport,
            fit_layout, navigate, spawn_scan};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletionSettings {
    /// Upper bound on the rows of the grid, on top of the viewport height.
    pub max_rows: Option<usize>,
    /// More candidates than this need confirmation before they are shown.
    pub overflow_threshold: usize,
    pub viewport: Viewport,
}

impl Default for CompletionSettings {
    fn default() -> Self {
        Self {
            max_rows: Some(10),
            overflow_threshold: 100,
            viewport: Viewport {
                columns: 80,
                rows: 24,
            },
        }
    }
}

impl From<&CompletionConfig> for CompletionSettings {
    fn from(config: &CompletionConfig) -> Self {
        Self {
            max_rows: config.max_rows,
            overflow_threshold: config.overflow_threshold,
            ..Self::default()
        }
    }
}

/// What a caller needs to run a scan for [`CompletionEngine::begin`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanRequest {
    pub ticket: ScanTicket,
    pub query: CompletionQuery,
}

/// Drives one completion round trip at a time over a [`CompletionPipeline`].
///
/// The engine never blocks: scans run elsewhere (see [`CompletionEngine::start`]) and
/// their [`ScanEvent`]s are fed back w/ [`CompletionEngine::apply_scan_event`]. Events
/// of a scan that was superseded (a new trigger, or [`CompletionEngine::invalidate`]
/// after a keystroke) are dropped.
#[derive(Debug)]
pub struct CompletionEngine {
    pipeline: Arc<CompletionPipeline>,
    types: Arc<TypeTable>,
    settings: CompletionSettings,
    generation: ScanGeneration,
    phase: CompletionPhase,
    pending: Option<(ScanTicket, CompletionSnapshot)>,
    session: Option<CompletionSession>,
}

impl CompletionEngine {
    #[must_use]
    pub fn new(
        pipeline: Arc<CompletionPipeline>,
        types: Arc<TypeTable>,
        settings: CompletionSettings,
    ) -> Self {
        Self {
            pipeline,
            types,
            settings,
            generation: ScanGeneration::default(),
            phase: CompletionPhase::Idle,
            pending: None,
            session: None,
        }
    }

    #[must_use]
    pub fn phase(&self) -> CompletionPhase { self.phase }

    #[must_use]
    pub fn session(&self) -> Option<&CompletionSession> { self.session.as_ref() }

    #[must_use]
    pub fn settings(&self) -> &CompletionSettings { &self.settings }

    pub fn set_viewport(&mut self, viewport: Viewport) { self.settings.viewport = viewport; }

    #[must_use]
    pub fn types(&self) -> &Arc<TypeTable> { &self.types }

    /// Switching modes drops anything in flight.
    pub fn set_types(&mut self, types: Arc<TypeTable>) {
        self.invalidate();
        self.session = None;
        self.phase = CompletionPhase::Idle;
        self.types = types;
    }

    #[must_use]
    pub fn is_active(&self) -> bool { self.phase != CompletionPhase::Idle }

    /// Snapshots the line and moves to `Loading`. Any previous scan or session is
    /// dropped (w/out restoring the line, [`CompletionEngine::cancel`] first for that).
    pub fn begin(
        &mut self,
        line_index: usize,
        line: &TokenLine,
        cursor: usize,
        cwd: &Path,
    ) -> ScanRequest {
        let snapshot = CompletionSnapshot::new(line_index, line, cursor);
        let ticket = self.generation.next_ticket();
        let query = CompletionQuery::new(snapshot.prefix(), cwd);

        // % is Display, ? is Debug.
        tracing::debug!(message = "Completion triggered", prefix = ?query.prefix, ticket = ?ticket);

        self.pending = Some((ticket, snapshot));
        self.session = None;
        self.phase = CompletionPhase::Loading { progress: None };
        ScanRequest { ticket, query }
    }

    /// [`CompletionEngine::begin`], and runs the scan on the blocking pool. Must be
    /// called from inside a tokio runtime.
    pub fn start(
        &mut self,
        line_index: usize,
        line: &TokenLine,
        cursor: usize,
        cwd: &Path,
        sender: UnboundedSender<ScanEvent>,
    ) -> JoinHandle<()> {
        let ScanRequest { ticket, query } = self.begin(line_index, line, cursor, cwd);
        spawn_scan(
            self.pipeline.clone(),
            self.types.clone(),
            query,
            ticket,
            self.generation.clone(),
            sender,
        )
    }

    /// Runs the pipeline on the current thread, for one shot use.
    #[must_use]
    pub fn collect_now(&self, query: &CompletionQuery) -> Vec<CompletionCandidate> {
        self.pipeline
            .collect(query, &self.types, |_| ControlFlow::Continue(()))
            .unwrap_or_default()
    }

    /// Drops the scan in flight, if any. Returns `true` if there was one.
    pub fn invalidate(&mut self) -> bool {
        self.generation.invalidate();
        let was_loading = self.pending.take().is_some();
        if matches!(self.phase, CompletionPhase::Loading { .. }) {
            self.phase = CompletionPhase::Idle;
        }
        was_loading
    }

    /// Returns `true` if the event was current and changed the state.
    pub fn apply_scan_event(&mut self, event: ScanEvent) -> bool {
        let ticket = event.ticket();
        let is_pending = self.pending.as_ref().is_some_and(|(it, _)| *it == ticket);
        if !is_pending || !self.generation.is_current(ticket) {
            return false;
        }

        match event {
            ScanEvent::Progress { progress, .. } => {
                self.phase = CompletionPhase::Loading {
                    progress: Some(progress),
                };
            }
            ScanEvent::Finished { candidates, .. } => {
                let Some((_, snapshot)) = self.pending.take() else {
                    return false;
                };
                if candidates.is_empty() {
                    self.phase = CompletionPhase::Idle;
                    return true;
                }
                let layout = if candidates.len() > self.settings.overflow_threshold {
                    None
                } else {
                    let labels: Vec<&str> =
                        candidates.iter().map(|it| it.value.as_str()).collect();
                    fit_layout(&labels, self.settings.max_rows, self.settings.viewport)
                };
                self.session = Some(CompletionSession::new(candidates, layout, snapshot));
                self.phase = CompletionPhase::Ready;
            }
        }
        true
    }

    /// Accepts the flat list of an overflowing session.
    pub fn confirm_overflow(&mut self) -> bool {
        match self.session.as_mut() {
            Some(session) if session.awaiting_overflow_confirmation => {
                session.awaiting_overflow_confirmation = false;
                true
            }
            _ => false,
        }
    }

    /// Moves the active candidate and previews it in `line`. Returns the cursor after
    /// the preview, or `None` if there is no move to make (ring the bell).
    pub fn navigate(&mut self, direction: NavDirection, line: &mut TokenLine) -> Option<usize> {
        let session = self.session.as_ref()?;
        if session.awaiting_overflow_confirmation {
            return None;
        }
        let next = navigate(session.active_index, direction, &session.grid)?;
        self.select(next, line)
    }

    /// Previews the active candidate, then moves to the next one in list order on every
    /// call, wrapping. For repeated tab presses.
    pub fn select_next(&mut self, line: &mut TokenLine) -> Option<usize> {
        let session = self.session.as_ref()?;
        if session.awaiting_overflow_confirmation {
            return None;
        }
        // Nothing is previewed yet on the first press.
        let next = if self.phase == CompletionPhase::Ready {
            session.active_index
        } else {
            (session.active_index + 1) % session.candidates.len().max(1)
        };
        self.select(next, line)
    }

    fn select(&mut self, index: usize, line: &mut TokenLine) -> Option<usize> {
        let session = self.session.as_mut()?;
        let candidate = session.candidates.get(index)?;
        let (preview, cursor) = session.snapshot.apply(&self.types, candidate, false);
        session.active_index = index;
        *line = preview;
        self.phase = CompletionPhase::Navigating;
        Some(cursor)
    }

    /// Writes the active candidate into `line`, followed by a space unless one is
    /// already there. Returns the new cursor, or `None` if there is nothing to commit.
    pub fn commit(&mut self, line: &mut TokenLine) -> Option<usize> {
        let session = self.session.as_ref()?;
        if session.awaiting_overflow_confirmation {
            return None;
        }
        let candidate = session.active_candidate()?;
        let (committed, cursor) = session.snapshot.apply(&self.types, candidate, true);

        // % is Display, ? is Debug.
        tracing::debug!(message = "Completion committed", value = %candidate.value);

        *line = committed;
        self.session = None;
        self.phase = CompletionPhase::Idle;
        Some(cursor)
    }

    /// Closes the session and keeps whatever candidate is previewed in the line, eg when
    /// the user starts typing again. Returns `true` if anything was open.
    pub fn dismiss(&mut self) -> bool {
        let was_loading = self.invalidate();
        self.phase = CompletionPhase::Idle;
        self.session.take().is_some() || was_loading
    }

    /// Puts `line` back the way it was when completion was triggered. Returns the cursor
    /// from back then. A scan in flight is dropped, and `None` returned (the line was
    /// never touched).
    pub fn cancel(&mut self, line: &mut TokenLine) -> Option<usize> {
        self.invalidate();
        self.phase = CompletionPhase::Idle;
        let session = self.session.take()?;
        *line = session.snapshot.line;
        Some(session.snapshot.cursor)
    }
}
