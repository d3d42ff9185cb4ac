// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::{fs,
          path::{Path, PathBuf}};

use miette::IntoDiagnostic;

use crate::{CandidateMetadata, CandidateProvider, CompletionCandidate, CompletionQuery,
            expand_home};

/// Sub directories of the directory named by the prefix.
///
/// The prefix is split at its last `/`: the part before it (kept as typed, e.g. `~/`
/// or `../src/`) names the directory to list, the part after it filters entries by
/// case insensitive prefix. Values are `base + name + "/"`.
#[derive(Debug, Default)]
pub struct DirectoryProvider;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPrefix {
    /// Everything up to and including the last `/`, as typed.
    pub base: String,
    /// Lowercased text after the last `/`.
    pub partial: String,
    pub dir: PathBuf,
}

impl PathPrefix {
    #[must_use]
    pub fn parse(prefix: &str, cwd: &Path) -> Self {
        let prefix = if prefix.trim().is_empty() { "" } else { prefix };
        let (base, partial) = match prefix.rfind('/') {
            Some(index) => prefix.split_at(index + 1),
            None => ("", prefix),
        };
        Self {
            base: base.to_string(),
            partial: partial.to_lowercase(),
            dir: resolve_dir(base, cwd),
        }
    }
}

fn resolve_dir(base: &str, cwd: &Path) -> PathBuf {
    let trimmed = base.strip_suffix('/').unwrap_or(base);
    match trimmed {
        "" if base.is_empty() => cwd.to_path_buf(),
        // The prefix was `/`.
        "" => PathBuf::from("/"),
        _ => {
            let expanded = expand_home(trimmed);
            if expanded.is_absolute() {
                expanded
            } else {
                cwd.join(expanded)
            }
        }
    }
}

/// Name of the first file or directory inside `dir`.
fn first_entry(dir: &Path) -> Option<String> {
    fs::read_dir(dir)
        .ok()?
        .filter_map(Result::ok)
        .find(|it| it.file_type().is_ok_and(|it| it.is_file() || it.is_dir()))
        .map(|it| it.file_name().to_string_lossy().into_owned())
}

impl CandidateProvider for DirectoryProvider {
    fn label(&self) -> &'static str { "scanning folders" }

    fn token_type_aliases(&self) -> &'static [&'static str] { &["Folder"] }

    fn collect(
        &self,
        query: &CompletionQuery,
        token_type: &str,
    ) -> miette::Result<Vec<CompletionCandidate>> {
        let parts = PathPrefix::parse(&query.prefix, &query.cwd);
        let mut acc = vec![];

        for entry in fs::read_dir(&parts.dir).into_diagnostic()? {
            let Ok(entry) = entry else { continue };
            // Follows symlinks, a link to a directory is offered too.
            let full_path = entry.path();
            if !full_path.is_dir() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if !name.to_lowercase().starts_with(&parts.partial) {
                continue;
            }
            let value = format!("{}{name}/", parts.base);
            acc.push(CompletionCandidate {
                value: value.clone(),
                token_type: token_type.to_string(),
                metadata: CandidateMetadata::Folder {
                    label: name,
                    description: value,
                    path: full_path.display().to_string(),
                    preview_entry: first_entry(&full_path),
                },
            });
        }

        Ok(acc)
    }
}
