// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::path::Path;

use tracing_appender::rolling::RollingFileAppender;
use tracing_core::LevelFilter;
use tracing_subscriber::{Layer, registry::LookupSpan};

use crate::{DisplayPreference, TracingConfig};

/// Avoid gnarly type annotations by using a macro to create the `fmt` layer.
#[macro_export]
macro_rules! create_fmt {
    () => {
        tracing_subscriber::fmt::layer()
            .compact()
            .without_time()
            .with_thread_ids(false)
            .with_target(false)
            .with_file(false)
            .with_line_number(false)
    };
}

/// Type alias for a boxed layer.
pub type DynLayer<S> = dyn Layer<S> + Send + Sync + 'static;

/// Returns the layers described by `config`, this does not install them. See
/// [`TracingConfig::install_global`] for that.
///
/// # Errors
///
/// Returns an error if the log file can't be created.
pub fn try_create_layers(
    config: &TracingConfig,
) -> miette::Result<Vec<Box<DynLayer<tracing_subscriber::Registry>>>> {
    let mut layers: Vec<Box<DynLayer<tracing_subscriber::Registry>>> =
        vec![Box::new(config.level_filter)];

    if let Some(preference) = config.writer_config.display_preference() {
        layers.push(create_display_layer(config.level_filter, preference));
    }

    if let Some(file_path) = config.writer_config.file_path() {
        layers.push(try_create_file_layer(config.level_filter, file_path)?);
    }

    Ok(layers)
}

pub fn create_display_layer<S>(
    level_filter: LevelFilter,
    preference: DisplayPreference,
) -> Box<DynLayer<S>>
where
    S: tracing_core::Subscriber,
    for<'a> S: LookupSpan<'a>,
{
    let fmt_layer = create_fmt!();
    match preference {
        DisplayPreference::Stdout => Box::new(
            fmt_layer
                .with_writer(std::io::stdout)
                .with_filter(level_filter),
        ),
        DisplayPreference::Stderr => Box::new(
            fmt_layer
                .with_writer(std::io::stderr)
                .with_filter(level_filter),
        ),
    }
}

/// # Errors
///
/// Returns an error if the path has no parent folder or no file name.
pub fn try_create_file_layer<S>(
    level_filter: LevelFilter,
    file_path: &str,
) -> miette::Result<Box<DynLayer<S>>>
where
    S: tracing_core::Subscriber,
    for<'a> S: LookupSpan<'a>,
{
    let appender = try_create_file_appender(file_path)?;
    Ok(Box::new(
        create_fmt!()
            .with_ansi(false)
            .with_writer(appender)
            .with_filter(level_filter),
    ))
}

/// Wrapping this in `tracing_appender::non_blocking` drops lines when the shell exits
/// quickly, so the appender is used directly.
///
/// # Errors
///
/// Returns an error if the path has no parent folder or no file name.
pub fn try_create_file_appender(file_path: &str) -> miette::Result<RollingFileAppender> {
    let path = Path::new(file_path);
    let parent = match path.parent() {
        Some(it) if it.as_os_str().is_empty() => Path::new("."),
        Some(it) => it,
        None => miette::bail!("Log file path {} has no parent folder", path.display()),
    };
    let Some(file_name) = path.file_name() else {
        miette::bail!("Log file path {} has no file name", path.display());
    };
    Ok(tracing_appender::rolling::never(parent, file_name))
}
