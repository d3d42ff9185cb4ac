// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Numeric literal grammar, a total match (the whole text must be consumed).
//!
//! | Form              | Examples                          |
//! | :---------------- | :-------------------------------- |
//! | decimal integer   | `0`, `42`, `1_000`                |
//! | decimal float     | `1.`, `1.5`, `.5`, `1.5e-3`, `2E8` |
//! | hex / octal / bin | `0xFF`, `0o17`, `0b1010`, `0xff_ff` |
//! | big integer       | `42n`, `0xFFn`, `0b1n`            |
//!
//! Digit separators (`_`) may only appear between two digits. A decimal integer w/ more
//! than one digit can't start w/ `0`. Big integer suffixes can't follow a fraction or an
//! exponent.

use nom::{IResult, Parser,
          branch::alt,
          character::complete::{char, one_of, satisfy},
          combinator::{all_consuming, opt, recognize},
          multi::many0};

#[must_use]
pub fn is_number_literal(text: &str) -> bool { parse_number_literal(text).is_ok() }

/// # Errors
///
/// Returns a nom error if `input` (all of it) isn't a numeric literal.
pub fn parse_number_literal(input: &str) -> IResult<&str, &str> {
    alt((
        all_consuming(recognize((
            decimal_integer,
            char('.'),
            opt(decimal_digits),
            opt(exponent),
        ))),
        all_consuming(recognize((char('.'), decimal_digits, opt(exponent)))),
        all_consuming(recognize((decimal_integer, opt(exponent)))),
        all_consuming(recognize((radix_literal, opt(char('n'))))),
        all_consuming(recognize((decimal_integer, char('n')))),
    ))
    .parse(input)
}

/// `[d](_?[d])*` for the digit class `is_digit`.
fn digits_with_separators(input: &str, is_digit: fn(char) -> bool) -> IResult<&str, &str> {
    recognize((satisfy(is_digit), many0((opt(char('_')), satisfy(is_digit)))))
        .parse(input)
}

fn decimal_digits(input: &str) -> IResult<&str, &str> {
    digits_with_separators(input, |c| c.is_ascii_digit())
}

fn decimal_integer(input: &str) -> IResult<&str, &str> {
    alt((
        recognize((
            satisfy(|c| matches!(c, '1'..='9')),
            many0((opt(char('_')), satisfy(|c: char| c.is_ascii_digit()))),
        )),
        recognize(char('0')),
    ))
    .parse(input)
}

fn exponent(input: &str) -> IResult<&str, &str> {
    recognize((one_of("eE"), opt(one_of("+-")), decimal_digits)).parse(input)
}

fn radix_literal(input: &str) -> IResult<&str, &str> {
    alt((
        recognize((char('0'), one_of("xX"), hex_digits)),
        recognize((char('0'), one_of("oO"), octal_digits)),
        recognize((char('0'), one_of("bB"), binary_digits)),
    ))
    .parse(input)
}

fn hex_digits(input: &str) -> IResult<&str, &str> {
    digits_with_separators(input, |c| c.is_ascii_hexdigit())
}

fn octal_digits(input: &str) -> IResult<&str, &str> {
    digits_with_separators(input, |c| matches!(c, '0'..='7'))
}

fn binary_digits(input: &str) -> IResult<&str, &str> {
    digits_with_separators(input, |c| matches!(c, '0' | '1'))
}

#[cfg(test)]
mod tests_number_literal {
    use test_case::test_case;

    use super::*;

    #[test_case("0")]
    #[test_case("42")]
    #[test_case("1_000_000")]
    #[test_case("1.")]
    #[test_case("1.5")]
    #[test_case(".5")]
    #[test_case(".5e10")]
    #[test_case("1.5e-3")]
    #[test_case("2E+8")]
    #[test_case("0.0")]
    #[test_case("0xFF")]
    #[test_case("0Xff_ff")]
    #[test_case("0o17")]
    #[test_case("0b1010")]
    #[test_case("42n")]
    #[test_case("0n")]
    #[test_case("0xFFn")]
    #[test_case("0b1n")]
    fn test_accepts(text: &str) {
        assert!(is_number_literal(text), "{text} should be a number");
    }

    #[test_case("")]
    #[test_case("abc")]
    #[test_case("007")]
    #[test_case("1__0")]
    #[test_case("1_")]
    #[test_case("_1")]
    #[test_case("1e")]
    #[test_case("1.5n")]
    #[test_case("1e5n")]
    #[test_case("0x")]
    #[test_case("0xG")]
    #[test_case("0o8")]
    #[test_case("0b2")]
    #[test_case("42 ")]
    #[test_case("-1")]
    #[test_case(".")]
    #[test_case("1.2.3")]
    fn test_rejects(text: &str) {
        assert!(!is_number_literal(text), "{text} should not be a number");
    }
}
