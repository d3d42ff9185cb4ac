// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::{Token, TokenLine, TypeTable, normalize_with_types, reclassify_leaf,
            split_at_char};

/// Moves everything at or after `column` into a new line, which is returned. A token
/// that straddles the column is split in two (composite tokens split the straddling
/// child, recursively). A non secable token is never split: it moves to the new line
/// whole. Both lines are normalized.
pub fn split_line_at(types: &TypeTable, line: &mut TokenLine, column: usize) -> TokenLine {
    let (left, right) = split_tokens(types, std::mem::take(&mut line.tokens), column);

    line.tokens = left;
    normalize_with_types(types, line);

    let mut right = TokenLine::new(right);
    normalize_with_types(types, &mut right);
    right
}

/// Splits `token` at a [`char`] offset. An empty half is `None`.
#[must_use]
pub fn split_token(
    types: &TypeTable,
    token: Token,
    offset: usize,
) -> (Option<Token>, Option<Token>) {
    if offset == 0 {
        return (None, Some(token));
    }
    if offset >= token.len_chars() {
        return (Some(token), None);
    }

    match token.leaf_text() {
        Some(text) => {
            let (left, right) = split_at_char(text, offset);
            let mut lhs = token.clone_with_text(left);
            let mut rhs = token.clone_with_text(right);
            reclassify_leaf(types, &mut lhs);
            reclassify_leaf(types, &mut rhs);
            (Some(lhs), Some(rhs))
        }
        None => {
            let children = token.children().map(<[Token]>::to_vec).unwrap_or_default();
            let (left, right) = split_tokens(types, children, offset);
            let lhs = (!left.is_empty()).then(|| token.clone_with_children(left));
            let rhs = (!right.is_empty()).then(|| token.clone_with_children(right));
            (lhs, rhs)
        }
    }
}

fn split_tokens(types: &TypeTable, tokens: Vec<Token>, column: usize) -> (Vec<Token>, Vec<Token>) {
    let mut left = vec![];
    let mut right = vec![];
    let mut cursor = 0;

    for token in tokens {
        let start = cursor;
        let end = start + token.len_chars();
        cursor = end;

        if column <= start {
            right.push(token);
        } else if column >= end {
            left.push(token);
        } else if !types.is_secable(&token.type_name) {
            right.push(token);
        } else {
            let (lhs, rhs) = split_token(types, token, column - start);
            left.extend(lhs);
            right.extend(rhs);
        }
    }

    (left, right)
}
