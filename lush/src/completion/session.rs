// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::ops::Range;

use crate::{CompletionCandidate, CompletionGrid, CompletionLayout, StageProgress, Token,
            TokenLine, TypeTable, build_grid, locate_leaf, normalize, split_at_char,
            split_line_at};

/// Where the engine is in a completion round trip.
///
/// `Idle` → `Loading` (scan running) → `Ready` (candidates shown) → `Navigating`, and
/// back to `Idle` on commit or cancel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompletionPhase {
    #[default]
    Idle,
    Loading {
        progress: Option<StageProgress>,
    },
    Ready,
    Navigating,
}

/// State of the line when completion was triggered. Restoring it makes a cancel
/// lossless.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionSnapshot {
    pub line_index: usize,
    pub line: TokenLine,
    pub cursor: usize,
    /// Top level token being completed. `None` when the cursor was on a space or an
    /// empty line, then the candidate is inserted at the cursor.
    pub target: Option<usize>,
    /// [`char`] range inside the target that the candidate replaces. The whole token,
    /// except in a naked string that absorbed spaces, where it is the word at the
    /// cursor.
    pub word: Range<usize>,
}

impl CompletionSnapshot {
    /// The word under (or just before) `cursor` is the one being completed, unless the
    /// cursor is on a space.
    #[must_use]
    pub fn new(line_index: usize, line: &TokenLine, cursor: usize) -> Self {
        let cursor = cursor.min(line.len_chars());
        let located = locate_leaf(&line.tokens, cursor, true)
            .and_then(|it| it.path.first().copied())
            .and_then(|index| line.tokens.get(index).map(|it| (index, it)))
            .filter(|(_, it)| !it.is_space())
            .and_then(|(index, token)| {
                word_at(token, cursor.saturating_sub(token.x)).map(|word| (index, word))
            });
        let (target, word) = match located {
            Some((index, word)) => (Some(index), word),
            None => (None, 0..0),
        };
        Self {
            line_index,
            line: line.clone(),
            cursor,
            target,
            word,
        }
    }

    #[must_use]
    pub fn original_token(&self) -> Option<&Token> { self.line.tokens.get(self.target?) }

    /// Text the candidates have to start w/.
    #[must_use]
    pub fn prefix(&self) -> String {
        self.original_token()
            .map(|it| {
                it.text()
                    .chars()
                    .skip(self.word.start)
                    .take(self.word.len())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// The snapshot line w/ `candidate` in place of the target word. Returns the line
    /// and the cursor, which sits after the candidate (and after the delimiter when one
    /// is added).
    #[must_use]
    pub fn apply(
        &self,
        types: &TypeTable,
        candidate: &CompletionCandidate,
        add_delimiter: bool,
    ) -> (TokenLine, usize) {
        let mut token = Token::new_text(&candidate.token_type, &candidate.value);
        token.metadata = Some(candidate.metadata.clone());

        let (tokens, start) = match self.target {
            Some(index) => {
                let mut tokens = self.line.tokens.clone();
                let original = &tokens[index];
                let start = original.x + self.word.start;
                let replacement = if self.word == (0..original.len_chars()) {
                    vec![token]
                } else {
                    splice_word(original, &self.word, token)
                };
                tokens.splice(index..=index, replacement);
                (tokens, start)
            }
            None => {
                let mut left = self.line.clone();
                let right = split_line_at(types, &mut left, self.cursor);
                let start = left.len_chars();
                let mut tokens = left.tokens;
                tokens.push(token);
                tokens.extend(right.tokens);
                (tokens, start)
            }
        };

        let end = start + candidate.value.chars().count();
        let mut line = TokenLine::new(tokens);
        normalize(&mut line);

        if !add_delimiter {
            return (line, end);
        }
        let next_is_space = line
            .token_index_at(end)
            .and_then(|index| line.tokens.get(index))
            .is_some_and(|it| it.is_space() && it.x == end);
        if !next_is_space {
            let at = line
                .tokens
                .iter()
                .position(|it| it.x >= end)
                .unwrap_or(line.tokens.len());
            line.tokens.insert(at, Token::new_space(" "));
            normalize(&mut line);
        }
        (line, end + 1)
    }
}

/// The space delimited word of `token` that contains `offset`, or ends at it. `None`
/// when `offset` follows a space. Only a naked string is split into words, any other
/// token is one word.
fn word_at(token: &Token, offset: usize) -> Option<Range<usize>> {
    let len = token.len_chars();
    if !token.is_naked_string() {
        return Some(0..len);
    }
    let chars: Vec<char> = token.text().chars().collect();
    let offset = offset.min(len);
    if offset > 0 && chars[offset - 1] == ' ' {
        return None;
    }
    let start = chars[..offset]
        .iter()
        .rposition(|it| *it == ' ')
        .map_or(0, |it| it + 1);
    let end = chars[offset..]
        .iter()
        .position(|it| *it == ' ')
        .map_or(len, |it| offset + it);
    (start < end).then_some(start..end)
}

/// `original` w/ `word` replaced by `token`. The spaces around the word become space
/// tokens, so the rest of the naked string stays on both sides.
fn splice_word(original: &Token, word: &Range<usize>, token: Token) -> Vec<Token> {
    let text = original.text();
    let (before, rest) = split_at_char(&text, word.start);
    let (_, after) = split_at_char(rest, word.len());

    let before_word = before.trim_end_matches(' ');
    let after_word = after.trim_start_matches(' ');
    [
        original.clone_with_text(before_word),
        Token::new_space(&before[before_word.len()..]),
        token,
        Token::new_space(&after[..after.len() - after_word.len()]),
        original.clone_with_text(after_word),
    ]
    .into_iter()
    .filter(|it| !it.is_empty())
    .collect()
}

/// Candidates of one completion round trip and the grid they are laid out in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionSession {
    pub candidates: Vec<CompletionCandidate>,
    pub active_index: usize,
    pub layout: CompletionLayout,
    pub grid: CompletionGrid,
    pub snapshot: CompletionSnapshot,
    /// Too many candidates, or they don't fit on screen. Nothing is shown until the user
    /// confirms, then they are shown as one flat list.
    pub awaiting_overflow_confirmation: bool,
}

impl CompletionSession {
    #[must_use]
    pub fn new(
        candidates: Vec<CompletionCandidate>,
        layout: Option<CompletionLayout>,
        snapshot: CompletionSnapshot,
    ) -> Self {
        let len = candidates.len();
        let (layout, awaiting_overflow_confirmation) = match layout {
            Some(it) => (it, false),
            None => (flat_layout(len), true),
        };
        Self {
            candidates,
            active_index: 0,
            layout,
            grid: build_grid(layout, len),
            snapshot,
            awaiting_overflow_confirmation,
        }
    }

    #[must_use]
    pub fn active_candidate(&self) -> Option<&CompletionCandidate> {
        self.candidates.get(self.active_index)
    }
}

/// One column holding every candidate.
#[must_use]
pub fn flat_layout(len: usize) -> CompletionLayout {
    CompletionLayout {
        columns: 1,
        rows: len,
    }
}
