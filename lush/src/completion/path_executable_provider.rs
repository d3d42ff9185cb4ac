// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::{collections::BTreeMap,
          env,
          ffi::OsString,
          fs,
          path::{Path, PathBuf},
          sync::Arc,
          time::SystemTime};

use crate::{CandidateMetadata, CandidateProvider, CompletionCandidate, CompletionQuery,
            MtimeCache, is_executable_file, matches_prefix, mtime_of, newest_mtime};

pub const DEBUG_PATH_EXECUTABLES: bool = false;

/// Executable name to full path.
pub type ExecutableListing = BTreeMap<String, PathBuf>;

/// Executables found in the directories of `PATH`.
///
/// The listing is cached per set of `PATH` directories that exist, and rebuilt when one
/// of them is modified (an install or uninstall touches the directory). A directory that
/// appears or disappears changes the set, so it is a different entry.
#[derive(Debug, Default)]
pub struct PathExecutableProvider {
    /// Used instead of the `PATH` environment variable when set.
    path_var: Option<OsString>,
    cache: MtimeCache<ExecutableListing>,
}

impl PathExecutableProvider {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    #[must_use]
    pub fn with_path_var(path_var: impl Into<OsString>) -> Self {
        Self {
            path_var: Some(path_var.into()),
            cache: MtimeCache::new(),
        }
    }

    fn search_dirs(&self, cwd: &Path) -> Vec<PathBuf> {
        let Some(path_var) = self.path_var.clone().or_else(|| env::var_os("PATH")) else {
            return vec![];
        };
        env::split_paths(&path_var)
            .filter(|it| !it.as_os_str().is_empty())
            .map(|it| if it.is_absolute() { it } else { cwd.join(it) })
            .collect()
    }

    /// The cached listing for the current `PATH`, rebuilt if stale.
    #[must_use]
    pub fn listing(&self, cwd: &Path) -> Arc<ExecutableListing> {
        let dirs: Vec<PathBuf> = self
            .search_dirs(cwd)
            .into_iter()
            .filter(|it| mtime_of(it).is_some())
            .collect();
        let key = env::join_paths(&dirs)
            .map(|it| it.to_string_lossy().into_owned())
            .unwrap_or_default();
        // An empty `PATH` has nothing to go stale.
        let mtime = newest_mtime(&dirs).unwrap_or(SystemTime::UNIX_EPOCH);
        self.cache
            .get_or_load(&key, Some(mtime), || list_executables(&dirs))
    }

    #[must_use]
    pub fn cache(&self) -> &MtimeCache<ExecutableListing> { &self.cache }
}

/// When several directories hold an executable w/ the same name, the first directory
/// wins, like the shell's own lookup.
#[must_use]
pub fn list_executables(dirs: &[PathBuf]) -> ExecutableListing {
    let mut acc = ExecutableListing::new();
    for dir in dirs {
        let Ok(entries) = fs::read_dir(dir) else {
            continue;
        };
        for entry in entries.filter_map(Result::ok) {
            let is_file_or_link = entry
                .file_type()
                .is_ok_and(|it| it.is_file() || it.is_symlink());
            let path = entry.path();
            if !is_file_or_link || !is_executable_file(&path) {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            acc.entry(name).or_insert(path);
        }
    }

    DEBUG_PATH_EXECUTABLES.then(|| {
        // % is Display, ? is Debug.
        tracing::debug!(
            message = "Listed executables",
            dirs = ?dirs,
            count = %acc.len()
        );
    });

    acc
}

impl CandidateProvider for PathExecutableProvider {
    fn label(&self) -> &'static str { "finding commands" }

    fn token_type_aliases(&self) -> &'static [&'static str] { &["ShCommandName", "Command"] }

    fn collect(
        &self,
        query: &CompletionQuery,
        token_type: &str,
    ) -> miette::Result<Vec<CompletionCandidate>> {
        Ok(self
            .listing(&query.cwd)
            .iter()
            .filter(|(name, _)| matches_prefix(name, &query.prefix))
            .map(|(name, path)| CompletionCandidate {
                value: name.clone(),
                token_type: token_type.to_string(),
                metadata: CandidateMetadata::Command {
                    label: name.clone(),
                    description: path.display().to_string(),
                },
            })
            .collect())
    }
}
