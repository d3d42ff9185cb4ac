// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crossterm::style::{Attribute, Color, ContentStyle};

/// A parsed highlight chain such as `"green.bold"` or `"bgBlue.whiteBright.italic"`.
///
/// Each dot separated step is a foreground color, a background color (`bg` prefix), or
/// a text attribute. Later steps override earlier ones for the same slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HighlightSpec {
    pub style: ContentStyle,
}

impl HighlightSpec {
    /// # Errors
    ///
    /// Returns the first step that isn't a known color or attribute. A chain with no
    /// steps at all is reported as the empty step.
    pub fn try_parse(spec: &str) -> Result<Self, &str> {
        let mut style = ContentStyle::new();
        let mut step_count = 0;

        for step in spec.split('.').map(str::trim).filter(|it| !it.is_empty()) {
            step_count += 1;
            let lower = step.to_ascii_lowercase();
            if let Some(attribute) = parse_attribute(&lower) {
                style.attributes.set(attribute);
            } else if let Some(color) = lower.strip_prefix("bg").and_then(parse_color) {
                style.background_color = Some(color);
            } else if let Some(color) = parse_color(&lower) {
                style.foreground_color = Some(color);
            } else {
                return Err(step);
            }
        }

        if step_count == 0 {
            return Err("");
        }

        Ok(Self { style })
    }

    /// Paints `text` w/ ANSI escape sequences.
    #[must_use]
    pub fn apply(&self, text: &str) -> String { self.style.apply(text).to_string() }
}

fn parse_attribute(step: &str) -> Option<Attribute> {
    Some(match step {
        "bold" => Attribute::Bold,
        "dim" => Attribute::Dim,
        "italic" => Attribute::Italic,
        "underline" => Attribute::Underlined,
        "inverse" => Attribute::Reverse,
        "hidden" => Attribute::Hidden,
        "strikethrough" => Attribute::CrossedOut,
        _ => return None,
    })
}

/// Plain names are the normal intensity colors, `...bright` the bright ones.
fn parse_color(step: &str) -> Option<Color> {
    Some(match step {
        "black" => Color::Black,
        "red" => Color::DarkRed,
        "green" => Color::DarkGreen,
        "yellow" => Color::DarkYellow,
        "blue" => Color::DarkBlue,
        "magenta" => Color::DarkMagenta,
        "cyan" => Color::DarkCyan,
        "white" => Color::Grey,
        "gray" | "grey" | "blackbright" => Color::DarkGrey,
        "redbright" => Color::Red,
        "greenbright" => Color::Green,
        "yellowbright" => Color::Yellow,
        "bluebright" => Color::Blue,
        "magentabright" => Color::Magenta,
        "cyanbright" => Color::Cyan,
        "whitebright" => Color::White,
        _ => return None,
    })
}
