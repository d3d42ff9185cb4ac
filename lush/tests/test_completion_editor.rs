// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Keystrokes through the line editor, w/ a completion pipeline over a real folder.

use std::{fs,
          sync::Arc,
          time::{Duration, Instant}};

use r3bl_lush::*;
use tempfile::TempDir;
use tokio::{sync::mpsc::unbounded_channel, time::timeout};

fn shell_types() -> TypeTable {
    let config = ShellConfig::try_builtin().unwrap();
    let registry = TypeRegistry::try_from_config(&config).unwrap();
    registry.try_table("shell").unwrap().clone()
}

/// Folders `alpha`, `alps` and `beta`, and a file `also.txt`.
fn sample_folder() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    for name in ["alpha", "alps", "beta"] {
        fs::create_dir(dir.path().join(name)).unwrap();
    }
    fs::write(dir.path().join("also.txt"), "").unwrap();
    fs::write(dir.path().join("alpha").join("README.md"), "").unwrap();
    dir
}

fn editor_in(dir: &TempDir) -> LineEditor {
    let pipeline = CompletionPipeline::new(vec![
        Arc::new(DirectoryProvider),
        Arc::new(BuiltinProvider::new([
            ("alias", Some("Define an alias".to_string())),
            ("fg", None),
        ])),
    ]);
    let engine = CompletionEngine::new(
        Arc::new(pipeline),
        Arc::new(shell_types()),
        CompletionSettings::from(&CompletionConfig::default()),
    );
    let mut editor = LineEditor::new(engine, &EditorConfig::default());
    editor.set_cwd(dir.path());
    editor
}

/// Types `text` w/ pauses long enough that spaces never pair up.
fn type_text(editor: &mut LineEditor, text: &str) {
    let mut at = Instant::now();
    for ch in text.chars() {
        at += Duration::from_secs(1);
        assert_eq2!(
            editor.handle_key_at(KeyPress::Char(ch), false, at),
            EditorAction::Redraw
        );
    }
}

/// Two quick spaces: the word before them gets its next type, and the space becomes a
/// real delimiter.
fn double_space(editor: &mut LineEditor) {
    let at = Instant::now();
    editor.handle_key_at(KeyPress::Char(' '), false, at);
    editor.handle_key_at(KeyPress::Char(' '), false, at + Duration::from_millis(100));
}

fn press(editor: &mut LineEditor, name: &str) -> EditorAction {
    editor.handle_key(name.parse().unwrap(), false)
}

fn text(editor: &LineEditor) -> String { editor.buffer().text() }

#[test]
fn test_tab_tab_enter_commits_a_folder() {
    let dir = sample_folder();
    let mut editor = editor_in(&dir);
    type_text(&mut editor, "cd");
    double_space(&mut editor);
    type_text(&mut editor, "al");

    // The first tab opens the grid w/out touching the line.
    assert_eq2!(press(&mut editor, "tab"), EditorAction::Redraw);
    assert_eq2!(editor.completion().phase(), CompletionPhase::Ready);
    let values = editor
        .completion()
        .session()
        .unwrap()
        .candidates
        .iter()
        .map(|it| it.value.clone())
        .collect::<Vec<_>>();
    assert_eq2!(values, vec!["alias", "alpha/", "alps/"]);
    assert_eq2!(text(&editor), "cd al");

    press(&mut editor, "tab");
    assert_eq2!(text(&editor), "cd alias");
    press(&mut editor, "tab");
    assert_eq2!(text(&editor), "cd alpha/");

    assert_eq2!(press(&mut editor, "enter"), EditorAction::Redraw);
    assert_eq2!(text(&editor), "cd alpha/ ");
    assert_eq2!(editor.cursor().column, 10);
    assert_eq2!(editor.completion().phase(), CompletionPhase::Idle);

    let line = &editor.buffer().lines[0];
    let committed = line.tokens.iter().find(|it| it.text() == "alpha/").unwrap();
    assert_eq2!(committed.type_name, "Folder");
    assert!(matches!(
        &committed.metadata,
        Some(CandidateMetadata::Folder { preview_entry: Some(entry), .. }) if entry == "README.md"
    ));
}

#[test]
fn test_escape_restores_the_line_and_typing_keeps_the_preview() {
    let dir = sample_folder();
    let mut editor = editor_in(&dir);
    type_text(&mut editor, "be");

    press(&mut editor, "tab");
    press(&mut editor, "tab");
    assert_eq2!(text(&editor), "beta/");
    assert_eq2!(press(&mut editor, "esc"), EditorAction::Redraw);
    assert_eq2!(text(&editor), "be");
    assert_eq2!(editor.cursor().column, 2);

    press(&mut editor, "tab");
    press(&mut editor, "tab");
    type_text(&mut editor, "x");
    assert_eq2!(text(&editor), "beta/x");
    assert_eq2!(editor.completion().phase(), CompletionPhase::Idle);

    // Nothing matches.
    assert_eq2!(press(&mut editor, "tab"), EditorAction::Bell);
}

#[test]
fn test_double_space_makes_the_command_a_builtin() {
    let dir = sample_folder();
    let mut editor = editor_in(&dir);
    type_text(&mut editor, "fg");

    // A single space is absorbed by the word.
    type_text(&mut editor, " ");
    assert_eq2!(editor.buffer().lines[0].tokens.len(), 1);
    press(&mut editor, "backspace");

    double_space(&mut editor);

    let line = &editor.buffer().lines[0];
    assert_eq2!(text(&editor), "fg ");
    assert_eq2!(line.tokens[0].type_name, "Builtin");
    assert!(line.tokens[1].is_space());
    assert_eq2!(editor.cursor().column, 3);
}

#[test]
fn test_locked_input_only_lets_job_keys_through() {
    let dir = sample_folder();
    let mut editor = editor_in(&dir);
    type_text(&mut editor, "sleep 5");

    assert_eq2!(
        editor.handle_key(KeyPress::Char('x'), true),
        EditorAction::Ignored
    );
    assert_eq2!(
        editor.handle_key(KeyPress::Enter, true),
        EditorAction::Ignored
    );
    assert_eq2!(
        editor.handle_key(KeyPress::Ctrl('c'), true),
        EditorAction::InterruptJob
    );
    assert_eq2!(
        editor.handle_key(KeyPress::Ctrl('z'), true),
        EditorAction::SuspendJob
    );
    assert_eq2!(text(&editor), "sleep 5");

    match press(&mut editor, "enter") {
        EditorAction::Submit(multi_line) => {
            assert_eq2!(multi_line.text(), "sleep 5");
        }
        it => panic!("expected a submit, got {it:?}"),
    }
    assert_eq2!(text(&editor), "");
}

#[tokio::test]
async fn test_async_scan_reports_progress_then_finishes() {
    let dir = sample_folder();
    let (sender, mut events) = unbounded_channel();
    let mut editor = editor_in(&dir).with_scan_sender(sender);
    type_text(&mut editor, "al");

    assert_eq2!(press(&mut editor, "tab"), EditorAction::Redraw);
    assert!(matches!(
        editor.completion().phase(),
        CompletionPhase::Loading { .. }
    ));
    // Still loading.
    assert_eq2!(press(&mut editor, "tab"), EditorAction::Bell);

    let mut stages = vec![];
    loop {
        let event = timeout(Duration::from_secs(10), events.recv())
            .await
            .unwrap()
            .unwrap();
        if let ScanEvent::Progress { progress, .. } = &event {
            stages.push(progress.label);
        }
        let finished = matches!(event, ScanEvent::Finished { .. });
        assert!(editor.apply_scan_event(event));
        if finished {
            break;
        }
    }

    assert_eq2!(
        stages,
        vec!["scanning folders", "loading builtins", FINAL_STAGE_LABEL]
    );
    assert_eq2!(editor.completion().phase(), CompletionPhase::Ready);
    assert_eq2!(editor.completion().session().unwrap().candidates.len(), 3);
}
