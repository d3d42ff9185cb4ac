// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::{collections::BTreeSet,
          env,
          path::{Path, PathBuf}};

use regex::Regex;

use crate::is_number_literal;

/// Compiled form of [`crate::ValidatorSpec`]. Every variant is a total predicate over
/// the text of a leaf token, it never panics and never fails.
#[derive(Debug, Clone)]
pub enum Validator {
    NakedString,
    Space,
    Number,
    /// Anchored at both ends when compiled.
    Regex(Regex),
    Instances(BTreeSet<String>),
    Variable,
    Executable,
    ExistingPath,
}

impl Validator {
    #[must_use]
    pub fn accepts(&self, text: &str) -> bool {
        if text.is_empty() {
            return false;
        }
        match self {
            Validator::NakedString => true,
            Validator::Space => text.chars().all(|c| c == ' '),
            Validator::Number => is_number_literal(text),
            Validator::Regex(regex) => regex.is_match(text),
            Validator::Instances(instances) => instances.contains(text),
            Validator::Variable => is_variable_name(text),
            Validator::Executable => is_executable_on_path(text),
            Validator::ExistingPath => expand_home(text).exists(),
        }
    }

    /// Wraps `pattern` so that it has to match the whole text.
    ///
    /// # Errors
    ///
    /// Returns the [`regex::Error`] if the pattern doesn't compile.
    pub fn try_new_regex(pattern: &str) -> Result<Self, regex::Error> {
        Regex::new(&format!("^(?:{pattern})$")).map(Validator::Regex)
    }
}

/// `$name`, `@name`, `%name`, w/ an optional `*` twigil after the sigil.
fn is_variable_name(text: &str) -> bool {
    let Some(rest) = text.strip_prefix(['$', '@', '%']) else {
        return false;
    };
    let rest = rest.strip_prefix('*').unwrap_or(rest);
    !rest.is_empty() && rest.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Text w/ a `/` is checked as a path, everything else is looked up in `PATH`.
fn is_executable_on_path(text: &str) -> bool {
    if text.contains('/') {
        return is_executable_file(&expand_home(text));
    }
    env::var_os("PATH").is_some_and(|path_var| {
        env::split_paths(&path_var).any(|dir| is_executable_file(&dir.join(text)))
    })
}

#[cfg(unix)]
pub fn is_executable_file(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path)
        .is_ok_and(|it| it.is_file() && it.permissions().mode() & 0o111 != 0)
}

#[cfg(not(unix))]
pub fn is_executable_file(path: &Path) -> bool { path.is_file() }

/// Replaces a leading `~` w/ the home folder.
#[must_use]
pub fn expand_home(text: &str) -> PathBuf {
    let home = dirs::home_dir();
    match (text, home) {
        ("~", Some(home)) => home,
        (it, Some(home)) if it.starts_with("~/") => home.join(&it[2..]),
        (it, _) => PathBuf::from(it),
    }
}
