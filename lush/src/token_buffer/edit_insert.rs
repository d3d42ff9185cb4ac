// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::{Token, TokenLine, TokenPath, TypeTable, container_at_mut, locate_leaf,
            normalize_with_types, reclassify_leaf, split_at_char};

/// Inserts `ch` at `column` (clamped to the line). Returns `false` and leaves the line
/// untouched when the insertion would split a non secable token.
///
/// | Leaf under the cursor   | `' '`                                       | other char                              |
/// |-------------------------|---------------------------------------------|-----------------------------------------|
/// | none (empty line)       | new space                                   | new naked string                        |
/// | space                   | extended                                    | space split around a new naked string   |
/// | not secable             | rejected                                    | new naked string before / after, or rejected inside |
/// | naked string            | new space before it at offset 0, else absorbed | spliced in                           |
/// | any other type          | split into left, space, right               | spliced in                              |
///
/// Leaves whose text changed are reclassified, and the line is normalized.
pub fn insert_char(types: &TypeTable, line: &mut TokenLine, column: usize, ch: char) -> bool {
    let column = column.min(line.len_chars());

    let Some(location) = locate_leaf(&line.tokens, column, true) else {
        line.tokens.push(new_token_for_char(ch));
        normalize_with_types(types, line);
        return true;
    };
    let Some((parent_path, index)) = location.split_path() else {
        return false;
    };
    let parent_path: TokenPath = parent_path.into();
    let Some(container) = container_at_mut(&mut line.tokens, &parent_path) else {
        return false;
    };
    let Some(leaf) = container.get(index) else {
        return false;
    };

    let Some(replacement) = insert_into_leaf(types, leaf, location.offset, ch) else {
        return false;
    };
    container.splice(index..=index, replacement);
    normalize_with_types(types, line);
    true
}

/// Inserts every char of `text`, starting at `column`. Returns the number of chars
/// inserted, stopping at the first rejected one.
pub fn insert_text(types: &TypeTable, line: &mut TokenLine, column: usize, text: &str) -> usize {
    let mut column = column.min(line.len_chars());
    let mut count = 0;
    for ch in text.chars() {
        if !insert_char(types, line, column, ch) {
            break;
        }
        column += 1;
        count += 1;
    }
    count
}

fn new_token_for_char(ch: char) -> Token {
    if ch == ' ' {
        Token::new_space(" ")
    } else {
        Token::new_naked_string(ch.to_string())
    }
}

/// The tokens that replace `leaf`, or `None` if the insert is rejected.
fn insert_into_leaf(
    types: &TypeTable,
    leaf: &Token,
    offset: usize,
    ch: char,
) -> Option<Vec<Token>> {
    let text = leaf.leaf_text()?;
    let (left, right) = split_at_char(text, offset);
    let len = leaf.len_chars();
    let secable = types.is_secable(&leaf.type_name);

    let spliced = || {
        let mut it = leaf.clone_with_text(format!("{left}{ch}{right}"));
        reclassify_leaf(types, &mut it);
        it
    };

    let it = match (ch == ' ', leaf.is_space()) {
        (true, true) => vec![spliced()],
        (true, false) if !secable => return None,
        (true, false) if leaf.is_naked_string() => {
            if offset == 0 {
                vec![Token::new_space(" "), leaf.clone()]
            } else {
                vec![spliced()]
            }
        }
        (true, false) => {
            let mut lhs = leaf.clone_with_text(left);
            let mut rhs = leaf.clone_with_text(right);
            reclassify_leaf(types, &mut lhs);
            reclassify_leaf(types, &mut rhs);
            [lhs, Token::new_space(" "), rhs]
                .into_iter()
                .filter(|it| !it.is_empty())
                .collect()
        }
        (false, true) => [
            leaf.clone_with_text(left),
            Token::new_naked_string(ch.to_string()),
            leaf.clone_with_text(right),
        ]
        .into_iter()
        .filter(|it| !it.is_empty())
        .collect(),
        (false, false) if !secable => {
            let new_token = Token::new_naked_string(ch.to_string());
            if offset == 0 {
                vec![new_token, leaf.clone()]
            } else if offset >= len {
                vec![leaf.clone(), new_token]
            } else {
                return None;
            }
        }
        (false, false) => vec![spliced()],
    };
    Some(it)
}
