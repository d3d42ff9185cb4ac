// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::{path::{Path, PathBuf},
          sync::Arc,
          time::{Duration, Instant}};

use tokio::sync::mpsc::UnboundedSender;

use crate::{CompletionEngine, CompletionPhase, EditorConfig, KeyPress, MultiLine,
            ScanEvent, ScanRequest, TokenLine, TypeTable, delete_char, delete_range,
            insert_char, normalize_with_types, promote_space_from_naked_string,
            rotate_type_at, should_submit_on_empty_last_line, split_line_at};

const DEBUG_LINE_EDITOR: bool = false;

/// Where the caret is. `column` counts [`char`]s in line `line_index`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EditorCursor {
    pub line_index: usize,
    pub column: usize,
}

/// What the caller should do after a keystroke.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorAction {
    /// The buffer, the cursor or the completion state changed.
    Redraw,
    /// The key had nothing to act on.
    Bell,
    /// The key was dropped: a job holds the foreground.
    Ignored,
    /// Enter w/ a complete command. The buffer has been reset.
    Submit(MultiLine),
    /// Ctrl+C at the prompt. The buffer has been reset.
    Cancelled,
    /// Ctrl+D on an empty buffer.
    Eof,
    /// Ctrl+C while a job holds the foreground.
    InterruptJob,
    /// Ctrl+Z while a job holds the foreground.
    SuspendJob,
}

/// Routes [`KeyPress`]es to the token buffer, the completion engine and the job
/// controller (the latter through [`EditorAction`]s).
#[derive(Debug)]
pub struct LineEditor {
    buffer: MultiLine,
    cursor: EditorCursor,
    types: Arc<TypeTable>,
    completion: CompletionEngine,
    cwd: PathBuf,
    scan_sender: Option<UnboundedSender<ScanEvent>>,
    double_space_window: Duration,
    last_space_at: Option<Instant>,
}

impl LineEditor {
    /// Completion runs synchronously on tab until [`LineEditor::with_scan_sender`] is
    /// set.
    #[must_use]
    pub fn new(completion: CompletionEngine, config: &EditorConfig) -> Self {
        Self {
            buffer: MultiLine::new(vec![TokenLine::default()]),
            cursor: EditorCursor::default(),
            types: completion.types().clone(),
            completion,
            cwd: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            scan_sender: None,
            double_space_window: Duration::from_millis(config.double_space_window_ms),
            last_space_at: None,
        }
    }

    /// Scans run on the blocking pool and report to `sender`; feed what arrives back w/
    /// [`LineEditor::apply_scan_event`].
    #[must_use]
    pub fn with_scan_sender(mut self, sender: UnboundedSender<ScanEvent>) -> Self {
        self.scan_sender = Some(sender);
        self
    }

    #[must_use]
    pub fn buffer(&self) -> &MultiLine { &self.buffer }

    #[must_use]
    pub fn cursor(&self) -> EditorCursor { self.cursor }

    #[must_use]
    pub fn completion(&self) -> &CompletionEngine { &self.completion }

    #[must_use]
    pub fn types(&self) -> &Arc<TypeTable> { &self.types }

    pub fn set_cwd(&mut self, cwd: impl Into<PathBuf>) { self.cwd = cwd.into(); }

    #[must_use]
    pub fn cwd(&self) -> &Path { &self.cwd }

    /// Switches modes. The buffer is re-validated against the new table.
    pub fn set_types(&mut self, types: Arc<TypeTable>) {
        self.completion.set_types(types.clone());
        for line in &mut self.buffer.lines {
            normalize_with_types(&types, line);
        }
        self.types = types;
    }

    /// Replaces the buffer, eg w/ a history entry. The cursor goes to the end.
    pub fn set_buffer(&mut self, buffer: MultiLine) {
        self.completion.dismiss();
        self.buffer = if buffer.lines.is_empty() {
            MultiLine::new(vec![TokenLine::default()])
        } else {
            buffer
        };
        let line_index = self.buffer.lines.len() - 1;
        self.cursor = EditorCursor {
            line_index,
            column: self.current_line().len_chars(),
        };
    }

    pub fn apply_scan_event(&mut self, event: ScanEvent) -> bool {
        self.completion.apply_scan_event(event)
    }

    pub fn handle_key(&mut self, key: KeyPress, input_locked: bool) -> EditorAction {
        self.handle_key_at(key, input_locked, Instant::now())
    }

    /// [`LineEditor::handle_key`] w/ an explicit clock for the double space window.
    pub fn handle_key_at(
        &mut self,
        key: KeyPress,
        input_locked: bool,
        now: Instant,
    ) -> EditorAction {
        DEBUG_LINE_EDITOR.then(|| {
            // % is Display, ? is Debug.
            tracing::debug!(message = "Key", key = ?key, input_locked = %input_locked);
        });

        if input_locked {
            return match key {
                KeyPress::Ctrl('c') => EditorAction::InterruptJob,
                KeyPress::Ctrl('z') => EditorAction::SuspendJob,
                _ => EditorAction::Ignored,
            };
        }

        if key != KeyPress::Char(' ') {
            self.last_space_at = None;
        }

        if let Some(action) = self.handle_completion_key(key) {
            return action;
        }

        match key {
            KeyPress::Char(' ') => self.handle_space(now),
            KeyPress::Char(ch) => self.handle_char(ch),
            KeyPress::Tab => self.trigger_completion(),
            KeyPress::Enter => self.handle_enter(),
            KeyPress::Backspace => self.handle_backspace(),
            KeyPress::Delete => self.handle_delete(),
            KeyPress::Left | KeyPress::Ctrl('b') => self.move_left(),
            KeyPress::Right | KeyPress::Ctrl('f') => self.move_right(),
            KeyPress::Up => self.move_vertically(-1),
            KeyPress::Down => self.move_vertically(1),
            KeyPress::Home | KeyPress::Ctrl('a') => self.move_to_column(0),
            KeyPress::End | KeyPress::Ctrl('e') => {
                let end = self.current_line().len_chars();
                self.move_to_column(end)
            }
            KeyPress::Ctrl('k') => self.kill_to_end(),
            KeyPress::Ctrl('u') => self.kill_to_start(),
            KeyPress::Ctrl('c') => {
                self.reset();
                EditorAction::Cancelled
            }
            KeyPress::Ctrl('d') if self.buffer.text().is_empty() => EditorAction::Eof,
            KeyPress::Ctrl('d') => self.handle_delete(),
            KeyPress::Escape | KeyPress::Ctrl(_) => EditorAction::Bell,
        }
    }

    /// Keys that belong to completion while it is active. `None` lets the key through
    /// to the editor, after the active completion was dropped (keeping the preview).
    fn handle_completion_key(&mut self, key: KeyPress) -> Option<EditorAction> {
        let phase = self.completion.phase();
        if phase == CompletionPhase::Idle {
            return None;
        }
        if !key.is_completion_navigation() {
            self.completion.invalidate();
        }

        let line = &mut self.buffer.lines[self.cursor.line_index];
        let moved = match (phase, key) {
            (CompletionPhase::Loading { .. }, KeyPress::Escape) => {
                self.completion.cancel(line);
                return Some(EditorAction::Redraw);
            }
            (CompletionPhase::Loading { .. }, KeyPress::Tab) => {
                return Some(EditorAction::Bell);
            }
            (CompletionPhase::Loading { .. }, _) => return None,
            (_, KeyPress::Escape) => self.completion.cancel(line),
            (_, KeyPress::Enter) => self.completion.commit(line),
            (_, KeyPress::Tab) => {
                if self.completion.confirm_overflow() {
                    return Some(EditorAction::Redraw);
                }
                self.completion.select_next(line)
            }
            (_, key) => match key.nav_direction() {
                Some(direction) => self.completion.navigate(direction, line),
                None => {
                    self.completion.dismiss();
                    return None;
                }
            },
        };

        Some(match moved {
            Some(column) => {
                self.cursor.column = column;
                EditorAction::Redraw
            }
            None => EditorAction::Bell,
        })
    }

    fn trigger_completion(&mut self) -> EditorAction {
        let line_index = self.cursor.line_index;
        let line = &self.buffer.lines[line_index];
        match &self.scan_sender {
            Some(sender) => {
                // The scan reports through `sender`, the handle isn't needed.
                let _unused = self.completion.start(
                    line_index,
                    line,
                    self.cursor.column,
                    &self.cwd,
                    sender.clone(),
                );
            }
            None => {
                let ScanRequest { ticket, query } =
                    self.completion
                        .begin(line_index, line, self.cursor.column, &self.cwd);
                let candidates = self.completion.collect_now(&query);
                self.completion
                    .apply_scan_event(ScanEvent::Finished { ticket, candidates });
                if self.completion.phase() == CompletionPhase::Idle {
                    return EditorAction::Bell;
                }
            }
        }
        EditorAction::Redraw
    }

    fn handle_char(&mut self, ch: char) -> EditorAction {
        let column = self.cursor.column;
        let line = &mut self.buffer.lines[self.cursor.line_index];
        if insert_char(&self.types, line, column, ch) {
            self.cursor.column += 1;
            EditorAction::Redraw
        } else {
            EditorAction::Bell
        }
    }

    /// A second space inside the window doesn't insert anything: it cycles the type of
    /// the word before the spaces instead.
    fn handle_space(&mut self, now: Instant) -> EditorAction {
        let is_double = self
            .last_space_at
            .is_some_and(|at| now.duration_since(at) <= self.double_space_window);
        if is_double && self.cursor.column > 0 {
            self.last_space_at = None;
            return self.cycle_type_before_cursor();
        }

        let action = self.handle_char(' ');
        self.last_space_at = (action == EditorAction::Redraw).then_some(now);
        action
    }

    /// Turns a space that a naked string absorbed into a space token, then rotates the
    /// type of the token before that space.
    fn cycle_type_before_cursor(&mut self) -> EditorAction {
        let column = self.cursor.column;
        let line = &mut self.buffer.lines[self.cursor.line_index];
        let Some(index) = line.token_index_at(column - 1) else {
            return EditorAction::Bell;
        };

        let space_index = if line.tokens[index].is_space() {
            Some(index)
        } else {
            let offset = column - line.tokens[index].x;
            promote_space_from_naked_string(line, index, offset, 0)
        };
        let Some(space) = space_index.and_then(|it| line.tokens.get(it)) else {
            return EditorAction::Bell;
        };

        let word_end = space.x;
        self.cursor.column = space.x + space.len_chars();
        if word_end > 0 && rotate_type_at(&self.types, line, word_end) {
            EditorAction::Redraw
        } else {
            EditorAction::Bell
        }
    }

    fn handle_enter(&mut self) -> EditorAction {
        let line_index = self.cursor.line_index;
        let line = &mut self.buffer.lines[line_index];

        // A trailing backslash continues the command on a new line.
        if line.text().ends_with('\\') {
            let end = line.len_chars();
            delete_char(&self.types, line, end - 1);
            self.buffer
                .lines
                .insert(line_index + 1, TokenLine::default());
            self.cursor = EditorCursor {
                line_index: line_index + 1,
                column: 0,
            };
            return EditorAction::Redraw;
        }

        if should_submit_on_empty_last_line(&self.buffer, line_index) {
            self.buffer.lines.pop();
        }
        let submitted = std::mem::replace(
            &mut self.buffer,
            MultiLine::new(vec![TokenLine::default()]),
        );
        self.cursor = EditorCursor::default();
        EditorAction::Submit(submitted)
    }

    /// At column 0 the line is joined to the previous one.
    fn handle_backspace(&mut self) -> EditorAction {
        let EditorCursor { line_index, column } = self.cursor;
        if column > 0 {
            let line = &mut self.buffer.lines[line_index];
            delete_char(&self.types, line, column - 1);
            self.cursor.column -= 1;
            return EditorAction::Redraw;
        }
        if line_index == 0 {
            return EditorAction::Bell;
        }
        let previous_len = self.buffer.lines[line_index - 1].len_chars();
        self.join_with_next(line_index - 1);
        self.cursor = EditorCursor {
            line_index: line_index - 1,
            column: previous_len,
        };
        EditorAction::Redraw
    }

    /// At the end of a line the next line is joined to it.
    fn handle_delete(&mut self) -> EditorAction {
        let EditorCursor { line_index, column } = self.cursor;
        let line = &mut self.buffer.lines[line_index];
        if column < line.len_chars() {
            delete_char(&self.types, line, column);
            return EditorAction::Redraw;
        }
        if line_index + 1 >= self.buffer.lines.len() {
            return EditorAction::Bell;
        }
        self.join_with_next(line_index);
        EditorAction::Redraw
    }

    fn join_with_next(&mut self, line_index: usize) {
        let next = self.buffer.lines.remove(line_index + 1);
        let line = &mut self.buffer.lines[line_index];
        line.tokens.extend(next.tokens);
        normalize_with_types(&self.types, line);
    }

    fn kill_to_end(&mut self) -> EditorAction {
        let column = self.cursor.column;
        let line = &mut self.buffer.lines[self.cursor.line_index];
        let end = line.len_chars();
        if delete_range(&self.types, line, column, end) == 0 {
            return EditorAction::Bell;
        }
        EditorAction::Redraw
    }

    fn kill_to_start(&mut self) -> EditorAction {
        let column = self.cursor.column;
        let line = &mut self.buffer.lines[self.cursor.line_index];
        if delete_range(&self.types, line, 0, column) == 0 {
            return EditorAction::Bell;
        }
        self.cursor.column = 0;
        EditorAction::Redraw
    }

    fn move_left(&mut self) -> EditorAction {
        let EditorCursor { line_index, column } = self.cursor;
        if column > 0 {
            self.cursor.column -= 1;
        } else if line_index > 0 {
            self.cursor = EditorCursor {
                line_index: line_index - 1,
                column: self.buffer.lines[line_index - 1].len_chars(),
            };
        } else {
            return EditorAction::Bell;
        }
        EditorAction::Redraw
    }

    fn move_right(&mut self) -> EditorAction {
        let EditorCursor { line_index, column } = self.cursor;
        if column < self.current_line().len_chars() {
            self.cursor.column += 1;
        } else if line_index + 1 < self.buffer.lines.len() {
            self.cursor = EditorCursor {
                line_index: line_index + 1,
                column: 0,
            };
        } else {
            return EditorAction::Bell;
        }
        EditorAction::Redraw
    }

    fn move_vertically(&mut self, delta: isize) -> EditorAction {
        let Some(line_index) = self
            .cursor
            .line_index
            .checked_add_signed(delta)
            .filter(|it| *it < self.buffer.lines.len())
        else {
            return EditorAction::Bell;
        };
        self.cursor = EditorCursor {
            line_index,
            column: self
                .cursor
                .column
                .min(self.buffer.lines[line_index].len_chars()),
        };
        EditorAction::Redraw
    }

    fn move_to_column(&mut self, column: usize) -> EditorAction {
        self.cursor.column = column.min(self.current_line().len_chars());
        EditorAction::Redraw
    }

    /// Splits the current line at the cursor into two lines.
    pub fn break_line(&mut self) {
        self.completion.dismiss();
        let EditorCursor { line_index, column } = self.cursor;
        let line = &mut self.buffer.lines[line_index];
        let rest = split_line_at(&self.types, line, column);
        self.buffer.lines.insert(line_index + 1, rest);
        self.cursor = EditorCursor {
            line_index: line_index + 1,
            column: 0,
        };
    }

    fn reset(&mut self) {
        self.completion.dismiss();
        self.buffer = MultiLine::new(vec![TokenLine::default()]);
        self.cursor = EditorCursor::default();
    }

    fn current_line(&self) -> &TokenLine { &self.buffer.lines[self.cursor.line_index] }
}

#[cfg(test)]
mod tests_line_editor {
    use super::*;
    use crate::{CompletionSettings, assert_eq2,
                completion::pipeline::test_providers::sample_pipeline,
                token_types::test_fixtures::{identifier_type_table, shell_type_table}};

    fn editor_with(types: TypeTable) -> LineEditor {
        let engine = CompletionEngine::new(
            Arc::new(sample_pipeline()),
            Arc::new(types),
            CompletionSettings::default(),
        );
        LineEditor::new(engine, &EditorConfig::default())
    }

    fn editor() -> LineEditor { editor_with(shell_type_table()) }

    fn type_text(editor: &mut LineEditor, text: &str) {
        let mut at = Instant::now();
        for ch in text.chars() {
            // Far enough apart to never be a double space.
            at += Duration::from_secs(1);
            editor.handle_key_at(KeyPress::Char(ch), false, at);
        }
    }

    fn press(editor: &mut LineEditor, keys: &[&str]) -> Vec<EditorAction> {
        keys.iter()
            .map(|name| editor.handle_key(name.parse().unwrap(), false))
            .collect()
    }

    fn token_summary(line: &TokenLine) -> Vec<(String, String)> {
        line.tokens
            .iter()
            .map(|it| (it.type_name.clone(), it.text()))
            .collect()
    }

    #[test]
    fn test_typing_builds_a_line() {
        let mut editor = editor();
        type_text(&mut editor, "echo 42");
        assert_eq2!(editor.buffer().text(), "echo 42");
        assert_eq2!(editor.cursor().column, 7);
    }

    #[test]
    fn test_foreground_job_locks_input() {
        let mut editor = editor();
        assert_eq2!(
            editor.handle_key(KeyPress::Char('a'), true),
            EditorAction::Ignored
        );
        assert_eq2!(editor.handle_key(KeyPress::Enter, true), EditorAction::Ignored);
        assert_eq2!(
            editor.handle_key(KeyPress::Ctrl('c'), true),
            EditorAction::InterruptJob
        );
        assert_eq2!(
            editor.handle_key(KeyPress::Ctrl('z'), true),
            EditorAction::SuspendJob
        );
        assert_eq2!(editor.buffer().text(), "");
    }

    #[test]
    fn test_movement_and_kills() {
        let mut editor = editor();
        type_text(&mut editor, "ls -la");
        press(&mut editor, &["ctrl-a", "right", "right"]);
        assert_eq2!(editor.cursor().column, 2);
        press(&mut editor, &["ctrl-k"]);
        assert_eq2!(editor.buffer().text(), "ls");
        press(&mut editor, &["left", "ctrl-u"]);
        assert_eq2!(editor.buffer().text(), "s");
        assert_eq2!(editor.cursor().column, 0);
        assert_eq2!(press(&mut editor, &["left"]), vec![EditorAction::Bell]);
        press(&mut editor, &["end"]);
        assert_eq2!(editor.cursor().column, 1);
    }

    #[test]
    fn test_backslash_continues_and_enter_submits() {
        let mut editor = editor();
        type_text(&mut editor, "echo \\");
        assert_eq2!(press(&mut editor, &["enter"]), vec![EditorAction::Redraw]);
        assert_eq2!(editor.buffer().lines.len(), 2);
        assert_eq2!(editor.buffer().lines[0].text(), "echo ");
        assert_eq2!(editor.cursor(), EditorCursor { line_index: 1, column: 0 });

        type_text(&mut editor, "42");
        let actions = press(&mut editor, &["enter"]);
        let [EditorAction::Submit(submitted)] = actions.as_slice() else {
            panic!("expected a submit, got {actions:?}");
        };
        assert_eq2!(submitted.text(), "echo \n42");
        assert_eq2!(editor.buffer().text(), "");
    }

    #[test]
    fn test_enter_on_empty_last_line_drops_it() {
        let mut editor = editor();
        type_text(&mut editor, "ls \\");
        press(&mut editor, &["enter"]);
        let actions = press(&mut editor, &["enter"]);
        let [EditorAction::Submit(submitted)] = actions.as_slice() else {
            panic!("expected a submit, got {actions:?}");
        };
        assert_eq2!(submitted.lines.len(), 1);
        assert_eq2!(submitted.text(), "ls ");
    }

    #[test]
    fn test_backspace_and_delete_join_lines() {
        let mut editor = editor();
        type_text(&mut editor, "ab\\");
        press(&mut editor, &["enter"]);
        type_text(&mut editor, "cd");
        press(&mut editor, &["home", "backspace"]);
        assert_eq2!(editor.buffer().lines.len(), 1);
        assert_eq2!(editor.buffer().text(), "abcd");
        assert_eq2!(editor.cursor(), EditorCursor { line_index: 0, column: 2 });

        editor.break_line();
        assert_eq2!(editor.buffer().text(), "ab\ncd");
        press(&mut editor, &["up", "end", "delete"]);
        assert_eq2!(editor.buffer().text(), "abcd");
        press(&mut editor, &["end"]);
        assert_eq2!(press(&mut editor, &["delete"]), vec![EditorAction::Bell]);
    }

    #[test]
    fn test_ctrl_c_and_ctrl_d_at_the_prompt() {
        let mut editor = editor();
        assert_eq2!(press(&mut editor, &["ctrl-d"]), vec![EditorAction::Eof]);
        type_text(&mut editor, "sleep");
        assert_eq2!(press(&mut editor, &["ctrl-c"]), vec![EditorAction::Cancelled]);
        assert_eq2!(editor.buffer().text(), "");
    }

    #[test]
    fn test_double_space_cycles_the_type_of_the_word() {
        let mut editor = editor_with(identifier_type_table());
        type_text(&mut editor, "42");
        let start = Instant::now();
        editor.handle_key_at(KeyPress::Char(' '), false, start);
        let action = editor.handle_key_at(
            KeyPress::Char(' '),
            false,
            start + Duration::from_millis(100),
        );
        assert_eq2!(action, EditorAction::Redraw);

        let line = &editor.buffer().lines[0];
        assert_eq2!(line.text(), "42 ");
        assert_eq2!(line.tokens[1].type_name, "Space");
        assert!(line.tokens[0].type_name != "NakedString");
        assert_eq2!(editor.cursor().column, 3);
    }

    #[test]
    fn test_double_space_promotes_an_absorbed_space() {
        let mut editor = editor();
        type_text(&mut editor, "ls");
        let start = Instant::now();
        editor.handle_key_at(KeyPress::Char(' '), false, start);
        assert_eq2!(
            token_summary(&editor.buffer().lines[0]),
            vec![("NakedString".to_string(), "ls ".to_string())]
        );

        editor.handle_key_at(KeyPress::Char(' '), false, start + Duration::from_millis(50));
        let line = &editor.buffer().lines[0];
        assert_eq2!(line.text(), "ls ");
        assert_eq2!(line.tokens.len(), 2);
        assert_eq2!(line.tokens[1].type_name, "Space");
    }

    #[test]
    fn test_slow_spaces_are_just_spaces() {
        let mut editor = editor();
        type_text(&mut editor, "42");
        let start = Instant::now();
        editor.handle_key_at(KeyPress::Char(' '), false, start);
        editor.handle_key_at(KeyPress::Char(' '), false, start + Duration::from_secs(5));
        assert_eq2!(editor.buffer().text(), "42  ");
    }

    #[test]
    fn test_tab_completes_and_enter_commits() {
        let mut editor = editor();
        type_text(&mut editor, "ca");
        assert_eq2!(press(&mut editor, &["tab"]), vec![EditorAction::Redraw]);
        assert_eq2!(editor.completion().phase(), CompletionPhase::Ready);

        press(&mut editor, &["tab"]);
        assert_eq2!(editor.buffer().text(), "cargo");
        press(&mut editor, &["enter"]);
        assert_eq2!(editor.buffer().text(), "cargo ");
        assert_eq2!(editor.cursor().column, 6);
        assert_eq2!(editor.completion().phase(), CompletionPhase::Idle);
    }

    #[test]
    fn test_escape_restores_the_line() {
        let mut editor = editor();
        type_text(&mut editor, "ca");
        press(&mut editor, &["tab", "tab", "escape"]);
        assert_eq2!(editor.buffer().text(), "ca");
        assert_eq2!(editor.cursor().column, 2);
        assert_eq2!(editor.completion().phase(), CompletionPhase::Idle);
    }

    #[test]
    fn test_typing_dismisses_completion_and_keeps_the_preview() {
        let mut editor = editor();
        type_text(&mut editor, "ca");
        press(&mut editor, &["tab", "tab"]);
        type_text(&mut editor, "x");
        assert_eq2!(editor.completion().phase(), CompletionPhase::Idle);
        assert_eq2!(editor.buffer().text(), "cargox");
    }

    #[test]
    fn test_tab_completes_a_later_word() {
        let mut editor = editor();
        type_text(&mut editor, "echo ca");
        assert_eq2!(
            token_summary(&editor.buffer().lines[0]),
            vec![("NakedString".to_string(), "echo ca".to_string())]
        );

        assert_eq2!(press(&mut editor, &["tab"]), vec![EditorAction::Redraw]);
        press(&mut editor, &["tab"]);
        assert_eq2!(editor.buffer().text(), "echo cargo");
        press(&mut editor, &["enter"]);
        assert_eq2!(editor.buffer().text(), "echo cargo ");
        assert_eq2!(editor.cursor().column, 11);
        assert_eq2!(
            token_summary(&editor.buffer().lines[0]),
            vec![
                ("NakedString".to_string(), "echo".to_string()),
                ("Space".to_string(), " ".to_string()),
                ("Builtin".to_string(), "cargo".to_string()),
                ("Space".to_string(), " ".to_string()),
            ]
        );
    }

    #[test]
    fn test_tab_completes_mid_line_before_trailing_text() {
        let mut editor = editor();
        type_text(&mut editor, "echo ca foo");
        press(&mut editor, &["home"]);
        press(&mut editor, &["right"; 7]);
        assert_eq2!(editor.cursor().column, 7);

        press(&mut editor, &["tab", "tab"]);
        assert_eq2!(editor.buffer().text(), "echo cargo foo");
        assert_eq2!(editor.cursor().column, 10);

        // The space after the word is already there.
        press(&mut editor, &["enter"]);
        assert_eq2!(editor.buffer().text(), "echo cargo foo");
        assert_eq2!(editor.cursor().column, 11);
    }

    #[test]
    fn test_escape_restores_a_multi_word_line() {
        let mut editor = editor();
        type_text(&mut editor, "echo ca foo");
        let before = editor.buffer().clone();
        press(&mut editor, &["home"]);
        press(&mut editor, &["right"; 7]);

        press(&mut editor, &["tab", "tab"]);
        assert_eq2!(editor.buffer().text(), "echo cargo foo");
        assert_eq2!(press(&mut editor, &["escape"]), vec![EditorAction::Redraw]);
        assert_eq2!(editor.buffer(), &before);
        assert_eq2!(editor.cursor().column, 7);
    }

    #[test]
    fn test_tab_without_candidates_rings_the_bell() {
        let mut editor = editor();
        type_text(&mut editor, "zzz");
        assert_eq2!(press(&mut editor, &["tab"]), vec![EditorAction::Bell]);
        assert_eq2!(editor.completion().phase(), CompletionPhase::Idle);
    }

    #[tokio::test]
    async fn test_keystroke_makes_an_async_scan_stale() {
        let (sender, mut receiver) = tokio::sync::mpsc::unbounded_channel();
        let mut editor = editor().with_scan_sender(sender);
        type_text(&mut editor, "ca");
        press(&mut editor, &["tab"]);
        assert!(matches!(
            editor.completion().phase(),
            CompletionPhase::Loading { .. }
        ));
        type_text(&mut editor, "r");

        // A stale scan stops early and never reports its results.
        let mut applied = 0;
        while let Ok(Some(event)) =
            tokio::time::timeout(Duration::from_millis(300), receiver.recv()).await
        {
            if editor.apply_scan_event(event) {
                applied += 1;
            }
        }
        assert_eq2!(applied, 0);
        assert_eq2!(editor.buffer().text(), "car");
        assert_eq2!(editor.completion().phase(), CompletionPhase::Idle);
    }

    #[test]
    fn test_set_buffer_moves_the_cursor_to_the_end() {
        let mut editor = editor();
        editor.set_buffer(MultiLine::new(vec![
            crate::tokenize("git"),
            crate::tokenize("status"),
        ]));
        assert_eq2!(editor.cursor(), EditorCursor { line_index: 1, column: 6 });
        editor.set_buffer(MultiLine::default());
        assert_eq2!(editor.buffer().lines.len(), 1);
    }
}
