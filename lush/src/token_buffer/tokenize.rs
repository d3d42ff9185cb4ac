// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::{Token, TokenLine, normalize};

/// Partitions `text` into maximal runs of `' '` ([`crate::SPACE_TYPE`]) and runs of
/// anything else ([`crate::NAKED_STRING_TYPE`]). Empty text gives an empty line.
#[must_use]
pub fn tokenize(text: &str) -> TokenLine {
    let mut tokens: Vec<Token> = vec![];
    let mut run = String::new();
    let mut run_is_space = false;

    for ch in text.chars() {
        let is_space = ch == ' ';
        if !run.is_empty() && is_space != run_is_space {
            tokens.push(new_run_token(std::mem::take(&mut run), run_is_space));
        }
        run_is_space = is_space;
        run.push(ch);
    }
    if !run.is_empty() {
        tokens.push(new_run_token(run, run_is_space));
    }

    let mut line = TokenLine::new(tokens);
    normalize(&mut line);
    line
}

fn new_run_token(text: String, is_space: bool) -> Token {
    if is_space {
        Token::new_space(text)
    } else {
        Token::new_naked_string(text)
    }
}

#[cfg(test)]
mod tests_tokenize {
    use super::*;
    use crate::{NAKED_STRING_TYPE, SPACE_TYPE, assert_eq2};

    fn summary(line: &TokenLine) -> Vec<(String, String, usize, usize)> {
        line.tokens
            .iter()
            .map(|it| (it.type_name.clone(), it.text(), it.index, it.x))
            .collect()
    }

    #[test]
    fn test_echo_two_spaces_42() {
        let line = tokenize("echo  42");
        assert_eq2!(
            summary(&line),
            vec![
                (NAKED_STRING_TYPE.into(), "echo".into(), 0, 0),
                (SPACE_TYPE.into(), "  ".into(), 1, 4),
                (NAKED_STRING_TYPE.into(), "42".into(), 2, 6),
            ]
        );
    }

    #[test]
    fn test_empty_and_leading_space() {
        assert!(tokenize("").tokens.is_empty());
        let line = tokenize(" a");
        assert_eq2!(line.tokens.len(), 2);
        assert!(line.tokens[0].is_space());
        assert_eq2!(line.text(), " a");
    }

    #[test]
    fn test_text_is_preserved() {
        for text in ["  x  y ", "héllo wörld", "a\tb c", "   "] {
            assert_eq2!(tokenize(text).text(), text);
        }
    }
}
