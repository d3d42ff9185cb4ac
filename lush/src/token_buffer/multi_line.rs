// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::{MultiLine, Token, TokenLine};

#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum MultiLineFormatError {
    #[error("Invalid JSON")]
    #[diagnostic(code(r3bl_lush::token_buffer::invalid_json))]
    Json(#[from] serde_json::Error),

    #[error("Invalid token lines: expected array of token lines")]
    #[diagnostic(code(r3bl_lush::token_buffer::not_an_array_of_lines))]
    NotAnArrayOfLines,

    #[error("Invalid token lines: each line must be an array of tokens")]
    #[diagnostic(code(r3bl_lush::token_buffer::line_not_an_array))]
    LineNotAnArray { line_index: usize },
}

impl MultiLine {
    /// # Errors
    ///
    /// Serialization of the token tree can't fail in practice, any error comes from
    /// [`serde_json`].
    pub fn to_json(&self) -> Result<String, MultiLineFormatError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// The shape (array of arrays) is checked first so that a wrong document gets a
    /// useful message instead of a serde type error.
    ///
    /// # Errors
    ///
    /// See [`MultiLineFormatError`].
    pub fn try_from_json(json: &str) -> Result<Self, MultiLineFormatError> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        let lines = value
            .as_array()
            .ok_or(MultiLineFormatError::NotAnArrayOfLines)?;
        if let Some(line_index) = lines.iter().position(|it| !it.is_array()) {
            return Err(MultiLineFormatError::LineNotAnArray { line_index });
        }
        Ok(serde_json::from_value(value)?)
    }
}

/// The double space gesture on plain text. Makes sure there is a space before `cursor`
/// (inserting one if needed), and moves the cursor back to the start of that run of
/// spaces. Returns the new text and cursor, counted in [`char`]s.
#[must_use]
pub fn handle_double_space(text: &str, cursor: usize) -> (String, usize) {
    let mut chars: Vec<char> = text.chars().collect();
    let mut cursor = cursor.min(chars.len());

    if cursor == 0 || chars[cursor - 1] != ' ' {
        chars.insert(cursor, ' ');
        cursor += 1;
    }

    let mut start = cursor - 1;
    while start > 0 && chars[start - 1] == ' ' {
        start -= 1;
    }

    (chars.into_iter().collect(), start)
}

/// Text of every non space token, in order, across all lines. These are the argv of
/// the command being submitted.
#[must_use]
pub fn collect_argument_texts(multi_line: &MultiLine) -> Vec<String> {
    multi_line
        .lines
        .iter()
        .flat_map(|line| line.tokens.iter())
        .filter(|it| !it.is_space())
        .map(Token::text)
        .filter(|it| !it.is_empty())
        .collect()
}

/// Enter on an empty last line submits the whole command, if any other line has
/// content.
#[must_use]
pub fn should_submit_on_empty_last_line(multi_line: &MultiLine, active_index: usize) -> bool {
    let lines = &multi_line.lines;
    let Some(last_index) = lines.len().checked_sub(1) else {
        return false;
    };
    if active_index != last_index || !lines[active_index].is_empty() {
        return false;
    }
    lines
        .iter()
        .enumerate()
        .any(|(index, line)| index != active_index && line_has_content(line))
}

fn line_has_content(line: &TokenLine) -> bool { !line.text().trim().is_empty() }
