// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::{DEBUG_TOKEN_TYPES_MOD, Token, TokenLine, TypeTable, locate_leaf, normalize,
            split_at_char, token_at_mut};

/// Cycles the type of a leaf to the next type that accepts its text, in priority order,
/// wrapping around. A token whose current type doesn't accept its text moves to the
/// highest priority one.
///
/// Returns `false` w/out touching the token for a space, a composite token, or text
/// that only one type (or none) accepts. Metadata is dropped when the type changes.
pub fn rotate_type(types: &TypeTable, token: &mut Token) -> bool {
    if token.is_space() || token.is_composite() {
        return false;
    }

    let text = token.text();
    let candidates = types.valid_types_for(&text);
    if candidates.len() <= 1 {
        return false;
    }

    let next = match candidates.iter().position(|it| it.name == token.type_name) {
        Some(current) => (current + 1) % candidates.len(),
        None => 0,
    };
    let Some(next) = candidates.get(next) else {
        return false;
    };
    if next.name == token.type_name {
        return false;
    }

    DEBUG_TOKEN_TYPES_MOD.then(|| {
        // % is Display, ? is Debug.
        tracing::debug!(
            message = "rotate_type",
            text = %text,
            from = %token.type_name,
            to = %next.name
        );
    });

    token.type_name = next.name.clone();
    token.metadata = None;
    true
}

/// [`rotate_type`] on the leaf under `column`. Inside a composite token, the child under
/// the cursor is rotated, never the composite token itself.
pub fn rotate_type_at(types: &TypeTable, line: &mut TokenLine, column: usize) -> bool {
    let column = column.min(line.len_chars());
    let Some(location) = locate_leaf(&line.tokens, column, true) else {
        return false;
    };
    let Some(leaf) = token_at_mut(&mut line.tokens, &location.path) else {
        return false;
    };
    let changed = rotate_type(types, leaf);
    if changed {
        normalize(line);
    }
    changed
}

/// Turns whitespace that a naked string absorbed into a real [`crate::SPACE_TYPE`]
/// token.
///
/// The top level naked string at `token_index` is split at `offset`. Spaces at the end
/// of the left piece and at the start of the right piece, plus `extra_spaces`, become
/// one space token between them. Returns the index of that space token after
/// normalization, or `None` if the token isn't a top level naked string, or there would
/// be no space at all.
pub fn promote_space_from_naked_string(
    line: &mut TokenLine,
    token_index: usize,
    offset: usize,
    extra_spaces: usize,
) -> Option<usize> {
    let token = line.tokens.get(token_index)?;
    if !token.is_naked_string() {
        return None;
    }
    let text = token.leaf_text()?;

    let (left, right) = split_at_char(text, offset);
    let left_word = left.trim_end_matches(' ');
    let right_word = right.trim_start_matches(' ');
    let absorbed = (left.len() - left_word.len()) + (right.len() - right_word.len());
    let space_len = absorbed + extra_spaces;
    if space_len == 0 {
        return None;
    }

    let space_column = token.x + left_word.chars().count();
    let replacement: Vec<Token> = [
        token.clone_with_text(left_word),
        Token::new_space(" ".repeat(space_len)),
        token.clone_with_text(right_word),
    ]
    .into_iter()
    .filter(|it| !it.is_empty())
    .collect();

    line.tokens.splice(token_index..=token_index, replacement);
    normalize(line);

    line.tokens.iter().position(|it| {
        it.is_space() && it.x <= space_column && space_column < it.x + it.len_chars()
    })
}

#[cfg(test)]
mod tests_type_rotation {
    use super::*;
    use crate::{assert_eq2, insert_text, normalize,
                token_types::test_fixtures::shell_type_table};

    #[test]
    fn test_rotate_naked_42_to_number() {
        let types = shell_type_table();
        let mut token = Token::new_naked_string("42");
        assert!(rotate_type(&types, &mut token));
        assert_eq2!(token.type_name, "Number");
        // And back.
        assert!(rotate_type(&types, &mut token));
        assert_eq2!(token.type_name, "NakedString");
    }

    #[test]
    fn test_rotate_needs_two_candidates() {
        let types = shell_type_table();
        let mut token = Token::new_naked_string("??");
        assert!(!rotate_type(&types, &mut token));
        assert_eq2!(token.type_name, "NakedString");

        let mut token = Token::new_space("  ");
        assert!(!rotate_type(&types, &mut token));

        let mut token =
            Token::new_composite("Var", vec![Token::new_text("Number", "1")]);
        assert!(!rotate_type(&types, &mut token));
    }

    #[test]
    fn test_rotate_from_undeclared_type() {
        let types = shell_type_table();
        let mut token = Token::new_text("Unknown", "42");
        assert!(rotate_type(&types, &mut token));
        assert_eq2!(token.type_name, "Number");
    }

    #[test]
    fn test_rotate_type_at_descends_into_children() {
        let types = shell_type_table();
        let mut line = TokenLine::new(vec![Token::new_composite(
            "Var",
            vec![Token::new_text("Sigil", "$"), Token::new_naked_string("7")],
        )]);
        normalize(&mut line);
        assert!(rotate_type_at(&types, &mut line, 2));
        assert_eq2!(line.tokens[0].type_name, "Var");
        assert_eq2!(line.tokens[0].children().unwrap()[1].type_name, "Number");
    }

    #[test]
    fn test_promote_trailing_space_w_extra() {
        let types = shell_type_table();
        let mut line = TokenLine::default();
        insert_text(&types, &mut line, 0, "42 ");
        assert!(line.tokens.iter().all(|it| !it.is_space()));

        let index = promote_space_from_naked_string(&mut line, 0, 3, 1);
        assert_eq2!(index, Some(1));
        assert_eq2!(line.tokens[1].text(), "  ");
        assert!(line.tokens[0].is_naked_string());
        assert_eq2!(line.tokens[0].text(), "42");
    }

    #[test]
    fn test_promote_trailing_space_wo_extra() {
        let types = shell_type_table();
        let mut line = TokenLine::default();
        insert_text(&types, &mut line, 0, "foo ");

        let index = promote_space_from_naked_string(&mut line, 0, 4, 0);
        assert_eq2!(index, Some(1));
        assert_eq2!(line.tokens[1].text(), " ");
        assert_eq2!(line.text(), "foo ");
    }

    #[test]
    fn test_promote_interior_space() {
        let mut line = TokenLine::new(vec![Token::new_naked_string("ec  ho")]);
        normalize(&mut line);
        let index = promote_space_from_naked_string(&mut line, 0, 3, 0);
        assert_eq2!(index, Some(1));
        let texts: Vec<String> = line.tokens.iter().map(Token::text).collect();
        assert_eq2!(texts, vec!["ec".to_string(), "  ".into(), "ho".into()]);
    }

    #[test]
    fn test_promote_needs_a_naked_string_and_a_space() {
        let mut line = TokenLine::new(vec![Token::new_text("Number", "42")]);
        assert_eq2!(promote_space_from_naked_string(&mut line, 0, 2, 1), None);

        let mut line = TokenLine::new(vec![Token::new_naked_string("foo")]);
        assert_eq2!(promote_space_from_naked_string(&mut line, 0, 3, 0), None);
        assert_eq2!(line.text(), "foo");
        assert_eq2!(promote_space_from_naked_string(&mut line, 4, 0, 1), None);
    }
}
