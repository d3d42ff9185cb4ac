// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::{collections::HashMap,
          fs,
          path::{Path, PathBuf},
          sync::{Arc, Mutex},
          time::SystemTime};

/// Values computed from files or directories, reused until the source is modified.
///
/// Each entry is stamped w/ the modification time of its source when it was loaded.
/// A lookup w/ a newer (or unknown) time reloads the value. Nothing is evicted eagerly.
#[derive(Debug)]
pub struct MtimeCache<V> {
    entries: Mutex<HashMap<String, (SystemTime, Arc<V>)>>,
}

impl<V> Default for MtimeCache<V> {
    fn default() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }
}

impl<V> MtimeCache<V> {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Returns the cached value for `key` if it was loaded at or after `mtime`, else
    /// calls `load` and caches its result under `mtime`. When `mtime` is `None` (the
    /// source can't be stat'ed) the value is loaded and not cached.
    pub fn get_or_load(
        &self,
        key: &str,
        mtime: Option<SystemTime>,
        load: impl FnOnce() -> V,
    ) -> Arc<V> {
        let Some(mtime) = mtime else {
            self.invalidate(key);
            return Arc::new(load());
        };

        if let Some(hit) = self.lookup(key, mtime) {
            return hit;
        }

        let value = Arc::new(load());
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key.to_string(), (mtime, value.clone()));
        }
        value
    }

    fn lookup(&self, key: &str, mtime: SystemTime) -> Option<Arc<V>> {
        let entries = self.entries.lock().ok()?;
        let (stamp, value) = entries.get(key)?;
        (mtime <= *stamp).then(|| value.clone())
    }

    pub fn invalidate(&self, key: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.remove(key);
        }
    }

    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.clear();
        }
    }

    #[must_use]
    pub fn len(&self) -> usize { self.entries.lock().map_or(0, |it| it.len()) }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.len() == 0 }
}

#[must_use]
pub fn mtime_of(path: &Path) -> Option<SystemTime> { fs::metadata(path).ok()?.modified().ok() }

/// Newest modification time of the `paths` that exist. `None` if none of them does.
#[must_use]
pub fn newest_mtime(paths: &[PathBuf]) -> Option<SystemTime> {
    paths.iter().filter_map(|it| mtime_of(it)).max()
}
