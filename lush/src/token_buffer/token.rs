// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use serde::{Deserialize, Serialize};

use crate::{CandidateMetadata, NAKED_STRING_TYPE, SPACE_TYPE};

/// A typed, positioned segment of a line.
///
/// - `index` is the position of the token in its container (the line, or the children
///   of a composite token).
/// - `x` is the column of the first character of the token, relative to the start of
///   the line (also for children).
///
/// Both are recomputed by [`crate::normalize`], don't maintain them by hand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub index: usize,
    #[serde(default)]
    pub x: usize,
    pub payload: TokenPayload,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<CandidateMetadata>,
}

/// Either literal text or child tokens, never both. The text of a composite token is
/// the concatenation of the text of its children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenPayload {
    Text(String),
    Children(Vec<Token>),
}

impl Token {
    #[must_use]
    pub fn new_text(type_name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            index: 0,
            x: 0,
            payload: TokenPayload::Text(text.into()),
            metadata: None,
        }
    }

    #[must_use]
    pub fn new_space(text: impl Into<String>) -> Self { Self::new_text(SPACE_TYPE, text) }

    #[must_use]
    pub fn new_naked_string(text: impl Into<String>) -> Self {
        Self::new_text(NAKED_STRING_TYPE, text)
    }

    #[must_use]
    pub fn new_composite(type_name: impl Into<String>, children: Vec<Token>) -> Self {
        Self {
            type_name: type_name.into(),
            index: 0,
            x: 0,
            payload: TokenPayload::Children(children),
            metadata: None,
        }
    }

    /// Same type and metadata, different text.
    #[must_use]
    pub fn clone_with_text(&self, text: impl Into<String>) -> Self {
        Self {
            type_name: self.type_name.clone(),
            index: self.index,
            x: self.x,
            payload: TokenPayload::Text(text.into()),
            metadata: self.metadata.clone(),
        }
    }

    /// Same type and metadata, different children.
    #[must_use]
    pub fn clone_with_children(&self, children: Vec<Token>) -> Self {
        Self {
            type_name: self.type_name.clone(),
            index: self.index,
            x: self.x,
            payload: TokenPayload::Children(children),
            metadata: self.metadata.clone(),
        }
    }

    /// The reconstructed text, recursing into children.
    #[must_use]
    pub fn text(&self) -> String {
        match &self.payload {
            TokenPayload::Text(text) => text.clone(),
            TokenPayload::Children(children) => children.iter().map(Token::text).collect(),
        }
    }

    #[must_use]
    pub fn len_chars(&self) -> usize {
        match &self.payload {
            TokenPayload::Text(text) => text.chars().count(),
            TokenPayload::Children(children) => children.iter().map(Token::len_chars).sum(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.len_chars() == 0 }

    #[must_use]
    pub fn is_space(&self) -> bool { self.type_name == SPACE_TYPE }

    #[must_use]
    pub fn is_naked_string(&self) -> bool { self.type_name == NAKED_STRING_TYPE }

    #[must_use]
    pub fn is_composite(&self) -> bool {
        matches!(self.payload, TokenPayload::Children(_))
    }

    #[must_use]
    pub fn leaf_text(&self) -> Option<&str> {
        match &self.payload {
            TokenPayload::Text(text) => Some(text),
            TokenPayload::Children(_) => None,
        }
    }

    #[must_use]
    pub fn children(&self) -> Option<&[Token]> {
        match &self.payload {
            TokenPayload::Text(_) => None,
            TokenPayload::Children(children) => Some(children),
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<Token>> {
        match &mut self.payload {
            TokenPayload::Text(_) => None,
            TokenPayload::Children(children) => Some(children),
        }
    }

    /// Replaces the text of a leaf. Composite tokens are left untouched and `false` is
    /// returned.
    pub fn set_leaf_text(&mut self, text: impl Into<String>) -> bool {
        match &mut self.payload {
            TokenPayload::Text(it) => {
                *it = text.into();
                true
            }
            TokenPayload::Children(_) => false,
        }
    }
}

/// One line of a command being composed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenLine {
    pub tokens: Vec<Token>,
}

impl TokenLine {
    #[must_use]
    pub fn new(tokens: Vec<Token>) -> Self { Self { tokens } }

    /// The raw string of the line.
    #[must_use]
    pub fn text(&self) -> String { self.tokens.iter().map(Token::text).collect() }

    #[must_use]
    pub fn len_chars(&self) -> usize { self.tokens.iter().map(Token::len_chars).sum() }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.len_chars() == 0 }

    /// Index of the top level token that covers `column`. A column on the boundary
    /// between two tokens belongs to the one on the right, except at the end of the
    /// line.
    #[must_use]
    pub fn token_index_at(&self, column: usize) -> Option<usize> {
        let last = self.tokens.len().checked_sub(1)?;
        self.tokens.iter().position(|it| {
            let end = it.x + it.len_chars();
            column < end || (column == end && it.index == last)
        })
    }
}

/// Several lines of a command being composed, before it is submitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MultiLine {
    pub lines: Vec<TokenLine>,
}

impl MultiLine {
    #[must_use]
    pub fn new(lines: Vec<TokenLine>) -> Self { Self { lines } }

    /// Lines joined w/ `\n`.
    #[must_use]
    pub fn text(&self) -> String {
        self.lines
            .iter()
            .map(TokenLine::text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Splits `text` at a [`char`] offset, clamped to the length of the text.
#[must_use]
pub fn split_at_char(text: &str, offset: usize) -> (&str, &str) {
    let byte_index = text
        .char_indices()
        .nth(offset)
        .map_or(text.len(), |(index, _)| index);
    text.split_at(byte_index)
}

#[cfg(test)]
mod tests_token {
    use super::*;
    use crate::assert_eq2;

    #[test]
    fn test_composite_text_is_concatenation() {
        let it = Token::new_composite(
            "Var",
            vec![Token::new_text("Sigil", "$"), Token::new_text("Name", "foo")],
        );
        assert_eq2!(it.text(), "$foo");
        assert_eq2!(it.len_chars(), 4);
        assert!(it.is_composite());
        assert_eq2!(it.leaf_text(), None);
    }

    #[test]
    fn test_split_at_char_counts_chars() {
        assert_eq2!(split_at_char("héllo", 2), ("hé", "llo"));
        assert_eq2!(split_at_char("abc", 10), ("abc", ""));
        assert_eq2!(split_at_char("abc", 0), ("", "abc"));
    }

    #[test]
    fn test_clone_with_text_keeps_type() {
        let it = Token::new_text("Builtin", "echo");
        let clone = it.clone_with_text("ho");
        assert_eq2!(clone.type_name, "Builtin");
        assert_eq2!(clone.text(), "ho");
    }

    #[test]
    fn test_multi_line_text() {
        let it = MultiLine::new(vec![
            TokenLine::new(vec![Token::new_naked_string("a")]),
            TokenLine::default(),
            TokenLine::new(vec![Token::new_naked_string("b")]),
        ]);
        assert_eq2!(it.text(), "a\n\nb");
    }
}
