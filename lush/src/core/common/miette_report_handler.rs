// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use miette::MietteHandlerOpts;

/// Fallback width when the terminal size can't be queried (eg: output is piped).
pub const DEFAULT_REPORT_WIDTH: u16 = 80;

/// Registers the graphical [`miette`] report handler used when `main()` returns an
/// error, eg: a broken type registry config at startup.
///
/// The hook is lazy. The terminal width is only measured when a report is actually
/// printed.
pub fn setup_default_miette_global_report_handler(issues_url: &'static str) {
    miette::set_hook(Box::new(|_report| {
        let width = crossterm::terminal::size()
            .map_or(DEFAULT_REPORT_WIDTH, |(columns, _rows)| columns);
        // % is Display, ? is Debug.
        tracing::debug!(message = "miette report width", width = %width);
        Box::new(
            MietteHandlerOpts::new()
                .width(usize::from(width))
                .wrap_lines(true)
                .force_graphical(true)
                .unicode(true)
                .context_lines(2)
                .with_cause_chain()
                .footer(issues_url.to_string())
                .build(),
        )
    }))
    .ok();
}
