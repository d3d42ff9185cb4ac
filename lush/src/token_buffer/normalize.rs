// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::{Token, TokenLine, TypeTable};

/// 1. Prunes empty tokens, and composite tokens left w/out children.
/// 2. Merges adjacent leaves of the same type.
/// 3. Recomputes `index` and `x` of every token, recursively.
///
/// Idempotent.
pub fn normalize(line: &mut TokenLine) { normalize_tokens(&mut line.tokens, None); }

/// Same as [`normalize`], and merged leaves are also moved to their best valid type,
/// see [`reclassify_leaf`].
pub fn normalize_with_types(types: &TypeTable, line: &mut TokenLine) {
    normalize_tokens(&mut line.tokens, Some(types));
}

fn normalize_tokens(tokens: &mut Vec<Token>, types: Option<&TypeTable>) {
    prune_empty(tokens);
    merge_adjacent(tokens, types);
    prune_empty(tokens);
    update_positions(tokens, 0);
}

fn prune_empty(tokens: &mut Vec<Token>) {
    for token in tokens.iter_mut() {
        if let Some(children) = token.children_mut() {
            prune_empty(children);
        }
    }
    tokens.retain(|it| !it.is_empty());
}

fn merge_adjacent(tokens: &mut Vec<Token>, types: Option<&TypeTable>) {
    for token in tokens.iter_mut() {
        if let Some(children) = token.children_mut() {
            merge_adjacent(children, types);
        }
    }

    // The flag marks tokens that absorbed a neighbor.
    let mut acc: Vec<(Token, bool)> = Vec::with_capacity(tokens.len());
    for token in tokens.drain(..) {
        match acc.last_mut() {
            Some((prev, merged)) if can_merge(prev, &token) => {
                let combined = prev.text() + &token.text();
                prev.set_leaf_text(combined);
                *merged = true;
            }
            _ => acc.push((token, false)),
        }
    }

    for (mut token, merged) in acc {
        if let (true, Some(types)) = (merged, types) {
            reclassify_leaf(types, &mut token);
        }
        tokens.push(token);
    }
}

fn can_merge(lhs: &Token, rhs: &Token) -> bool {
    !lhs.is_composite() && !rhs.is_composite() && lhs.type_name == rhs.type_name
}

/// Returns the column after the last token.
fn update_positions(tokens: &mut [Token], start: usize) -> usize {
    let mut cursor = start;
    for (index, token) in tokens.iter_mut().enumerate() {
        token.index = index;
        token.x = cursor;
        cursor = match token.children_mut() {
            Some(children) => update_positions(children, cursor),
            None => cursor + token.len_chars(),
        };
    }
    cursor
}

/// Moves a leaf to the highest priority type that accepts its text, when that isn't
/// already its type. This happens even if the current type still accepts the text, so
/// a low priority `Name` "echo" becomes a `Builtin`. Space, naked string, composite
/// and undeclared tokens are never touched. Metadata is dropped when the type changes.
/// Returns `true` if the type changed.
pub fn reclassify_leaf(types: &TypeTable, token: &mut Token) -> bool {
    if token.is_composite()
        || token.is_space()
        || token.is_naked_string()
        || !types.is_declared(&token.type_name)
    {
        return false;
    }
    let text = token.text();
    let Some(best) = types.best_type_for(&text) else {
        return false;
    };
    if best == token.type_name {
        return false;
    }
    token.type_name = best.to_string();
    token.metadata = None;
    true
}
