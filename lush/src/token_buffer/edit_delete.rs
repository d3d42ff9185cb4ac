// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::{TokenLine, TypeTable, locate_leaf, normalize_with_types, reclassify_leaf,
            split_at_char, token_at_mut};

/// Removes the char at `column`. Returns `false` if there is no char there (end of
/// line, or past it).
pub fn delete_char(types: &TypeTable, line: &mut TokenLine, column: usize) -> bool {
    let Some(location) = locate_leaf(&line.tokens, column, false) else {
        return false;
    };
    let Some(leaf) = token_at_mut(&mut line.tokens, &location.path) else {
        return false;
    };
    let Some(text) = leaf.leaf_text() else {
        return false;
    };
    if location.offset >= leaf.len_chars() {
        return false;
    }

    let (left, right) = split_at_char(text, location.offset);
    let remaining = format!("{left}{}", right.chars().skip(1).collect::<String>());
    leaf.set_leaf_text(remaining);
    reclassify_leaf(types, leaf);

    normalize_with_types(types, line);
    true
}

/// Removes the chars in `start..end`, one at a time. Stops early when the line runs
/// out. Returns the number of chars removed.
pub fn delete_range(types: &TypeTable, line: &mut TokenLine, start: usize, end: usize) -> usize {
    let mut count = 0;
    for _ in start..end {
        if !delete_char(types, line, start) {
            break;
        }
        count += 1;
    }
    count
}
