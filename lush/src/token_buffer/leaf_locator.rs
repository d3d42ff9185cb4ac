// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use smallvec::SmallVec;

use crate::Token;

/// Indices from the line down to a token: `[2]` is the third top level token, `[2, 0]`
/// is the first child of that token.
pub type TokenPath = SmallVec<[usize; 4]>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeafLocation {
    pub path: TokenPath,
    /// [`char`] offset inside the leaf, `0..=len`.
    pub offset: usize,
}

impl LeafLocation {
    /// Path of the container that holds the leaf, and the index of the leaf in it.
    #[must_use]
    pub fn split_path(&self) -> Option<(&[usize], usize)> {
        self.path.split_last().map(|(last, parent)| (parent, *last))
    }
}

/// Finds the leaf that covers `column`, descending into composite tokens.
///
/// A column on the boundary between two tokens belongs to the token on the right,
/// unless `prefer_previous_on_boundary` is set (used for insertion, so that typing at
/// the end of a word extends that word). The end of the last token always belongs to
/// it. Returns `None` for an empty line, or a column past the end of the line.
#[must_use]
pub fn locate_leaf(
    tokens: &[Token],
    column: usize,
    prefer_previous_on_boundary: bool,
) -> Option<LeafLocation> {
    let mut path = TokenPath::new();
    let offset = locate_in(tokens, column, prefer_previous_on_boundary, &mut path)?;
    Some(LeafLocation { path, offset })
}

fn locate_in(
    tokens: &[Token],
    column: usize,
    prefer_previous_on_boundary: bool,
    path: &mut TokenPath,
) -> Option<usize> {
    let last = tokens.len().checked_sub(1)?;
    let mut cursor = 0;
    for (index, token) in tokens.iter().enumerate() {
        let len = token.len_chars();
        let start = cursor;
        let end = start + len;
        if column < end || (column == end && (prefer_previous_on_boundary || index == last))
        {
            path.push(index);
            return match token.children() {
                Some(children) if !children.is_empty() => locate_in(
                    children,
                    column - start,
                    prefer_previous_on_boundary,
                    path,
                ),
                _ => Some((column - start).min(len)),
            };
        }
        cursor = end;
    }
    None
}

#[must_use]
pub fn token_at<'a>(tokens: &'a [Token], path: &[usize]) -> Option<&'a Token> {
    let (first, rest) = path.split_first()?;
    let token = tokens.get(*first)?;
    if rest.is_empty() {
        Some(token)
    } else {
        token_at(token.children()?, rest)
    }
}

pub fn token_at_mut<'a>(tokens: &'a mut [Token], path: &[usize]) -> Option<&'a mut Token> {
    let (first, rest) = path.split_first()?;
    let token = tokens.get_mut(*first)?;
    if rest.is_empty() {
        Some(token)
    } else {
        token_at_mut(token.children_mut()?, rest)
    }
}

/// The vector that holds the tokens addressed by `parent_path`. An empty path is the
/// line itself.
pub fn container_at_mut<'a>(
    tokens: &'a mut Vec<Token>,
    parent_path: &[usize],
) -> Option<&'a mut Vec<Token>> {
    match parent_path.split_first() {
        None => Some(tokens),
        Some((first, rest)) => {
            container_at_mut(tokens.get_mut(*first)?.children_mut()?, rest)
        }
    }
}

#[cfg(test)]
mod tests_leaf_locator {
    use smallvec::smallvec;

    use super::*;
    use crate::{TokenLine, assert_eq2, normalize};

    fn sample() -> TokenLine {
        let mut line = TokenLine::new(vec![
            Token::new_text("Builtin", "echo"),
            Token::new_space(" "),
            Token::new_composite(
                "Var",
                vec![Token::new_text("Sigil", "$"), Token::new_text("Name", "foo")],
            ),
        ]);
        normalize(&mut line);
        line
    }

    #[test]
    fn test_boundary_preference() {
        let line = sample();
        let it = locate_leaf(&line.tokens, 4, false).unwrap();
        assert_eq2!(it, LeafLocation { path: smallvec![1], offset: 0 });
        let it = locate_leaf(&line.tokens, 4, true).unwrap();
        assert_eq2!(it, LeafLocation { path: smallvec![0], offset: 4 });
    }

    #[test]
    fn test_descends_into_children() {
        let line = sample();
        let it = locate_leaf(&line.tokens, 6, false).unwrap();
        assert_eq2!(it, LeafLocation { path: smallvec![2, 1], offset: 0 });
        // End of the line belongs to the last leaf.
        let it = locate_leaf(&line.tokens, 9, false).unwrap();
        assert_eq2!(it, LeafLocation { path: smallvec![2, 1], offset: 3 });
        assert_eq2!(token_at(&line.tokens, &it.path).unwrap().text(), "foo");
    }

    #[test]
    fn test_out_of_range_and_empty() {
        let line = sample();
        assert_eq2!(locate_leaf(&line.tokens, 10, true), None);
        assert_eq2!(locate_leaf(&[], 0, true), None);
    }

    #[test]
    fn test_container_at_mut() {
        let mut line = sample();
        let children = container_at_mut(&mut line.tokens, &[2]).unwrap();
        assert_eq2!(children.len(), 2);
        assert!(container_at_mut(&mut line.tokens, &[0]).is_none());
    }
}
