// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::str::FromStr;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::NavDirection;

/// A decoded keystroke. Build one from a crossterm [`KeyEvent`] or from a normalized key
/// name (`"ctrl-c"`, `"backspace"`, `"x"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyPress {
    Char(char),
    /// Ctrl + a letter, lowercase.
    Ctrl(char),
    Backspace,
    Delete,
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
    Tab,
    Enter,
    Escape,
}

impl KeyPress {
    /// `None` for key releases and keys the editor has no use for.
    #[must_use]
    pub fn from_key_event(event: KeyEvent) -> Option<Self> {
        if event.kind == KeyEventKind::Release {
            return None;
        }
        let it = match event.code {
            KeyCode::Char(ch) if event.modifiers.contains(KeyModifiers::CONTROL) => {
                KeyPress::Ctrl(ch.to_ascii_lowercase())
            }
            KeyCode::Char(ch) => KeyPress::Char(ch),
            KeyCode::Backspace => KeyPress::Backspace,
            KeyCode::Delete => KeyPress::Delete,
            KeyCode::Left => KeyPress::Left,
            KeyCode::Right => KeyPress::Right,
            KeyCode::Up => KeyPress::Up,
            KeyCode::Down => KeyPress::Down,
            KeyCode::Home => KeyPress::Home,
            KeyCode::End => KeyPress::End,
            KeyCode::Tab | KeyCode::BackTab => KeyPress::Tab,
            KeyCode::Enter => KeyPress::Enter,
            KeyCode::Esc => KeyPress::Escape,
            _ => return None,
        };
        Some(it)
    }

    /// Keys that move around an open completion grid. Everything else makes a
    /// completion scan in flight stale.
    #[must_use]
    pub fn is_completion_navigation(self) -> bool {
        matches!(
            self,
            KeyPress::Tab | KeyPress::Up | KeyPress::Down | KeyPress::Left | KeyPress::Right
        )
    }

    #[must_use]
    pub fn nav_direction(self) -> Option<NavDirection> {
        match self {
            KeyPress::Up => Some(NavDirection::Up),
            KeyPress::Down => Some(NavDirection::Down),
            KeyPress::Left => Some(NavDirection::Left),
            KeyPress::Right => Some(NavDirection::Right),
            _ => None,
        }
    }
}

impl TryFrom<KeyEvent> for KeyPress {
    type Error = miette::Report;

    fn try_from(event: KeyEvent) -> Result<Self, Self::Error> {
        Self::from_key_event(event).ok_or_else(|| miette::miette!("Unsupported key {event:?}"))
    }
}

impl FromStr for KeyPress {
    type Err = miette::Report;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let it = match name {
            "backspace" => KeyPress::Backspace,
            "delete" => KeyPress::Delete,
            "left" => KeyPress::Left,
            "right" => KeyPress::Right,
            "up" => KeyPress::Up,
            "down" => KeyPress::Down,
            "home" => KeyPress::Home,
            "end" => KeyPress::End,
            "tab" => KeyPress::Tab,
            "enter" | "return" => KeyPress::Enter,
            "escape" | "esc" => KeyPress::Escape,
            "space" => KeyPress::Char(' '),
            _ => {
                let it = match name.strip_prefix("ctrl-") {
                    Some(letter) => single_char(letter)
                        .map(|ch| KeyPress::Ctrl(ch.to_ascii_lowercase())),
                    None => single_char(name).map(KeyPress::Char),
                };
                return it.ok_or_else(|| miette::miette!("Unknown key name {name:?}"));
            }
        };
        Ok(it)
    }
}

fn single_char(text: &str) -> Option<char> {
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(ch), None) => Some(ch),
        _ => None,
    }
}

#[cfg(test)]
mod tests_key_press {
    use super::*;
    use crate::assert_eq2;
    use test_case::test_case;

    #[test_case("ctrl-c", KeyPress::Ctrl('c'))]
    #[test_case("ctrl-Z", KeyPress::Ctrl('z'))]
    #[test_case("backspace", KeyPress::Backspace)]
    #[test_case("return", KeyPress::Enter)]
    #[test_case("space", KeyPress::Char(' '))]
    #[test_case("x", KeyPress::Char('x'))]
    #[test_case("é", KeyPress::Char('é'))]
    fn test_parse_key_names(name: &str, expected: KeyPress) {
        assert_eq2!(name.parse::<KeyPress>().unwrap(), expected);
    }

    #[test_case("ctrl-"; "no letter")]
    #[test_case("ctrl-ab"; "two letters")]
    #[test_case("xy"; "word")]
    #[test_case(""; "empty")]
    fn test_unknown_key_names(name: &str) {
        assert!(name.parse::<KeyPress>().is_err());
    }

    #[test]
    fn test_from_crossterm() {
        let ctrl_c = KeyEvent::new(KeyCode::Char('C'), KeyModifiers::CONTROL);
        assert_eq2!(KeyPress::from_key_event(ctrl_c), Some(KeyPress::Ctrl('c')));

        let shifted = KeyEvent::new(KeyCode::Char('A'), KeyModifiers::SHIFT);
        assert_eq2!(KeyPress::try_from(shifted).unwrap(), KeyPress::Char('A'));

        let f1 = KeyEvent::new(KeyCode::F(1), KeyModifiers::NONE);
        assert!(KeyPress::try_from(f1).is_err());

        let mut released = KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE);
        released.kind = KeyEventKind::Release;
        assert_eq2!(KeyPress::from_key_event(released), None);
    }

    #[test]
    fn test_navigation_keys() {
        assert!(KeyPress::Tab.is_completion_navigation());
        assert!(!KeyPress::Char('a').is_completion_navigation());
        assert!(!KeyPress::Enter.is_completion_navigation());
        assert_eq2!(KeyPress::Left.nav_direction(), Some(NavDirection::Left));
        assert_eq2!(KeyPress::Home.nav_direction(), None);
    }
}
