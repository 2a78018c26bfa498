// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! File system watching for theme reloads.
//!
//! This module provides `FileWatcher` for monitoring theme and plugin
//! directories while the server runs in debug mode.
//!
//! # Features
//!
//! - Debounced file change events (750ms)
//! - Filters for view files (.htm)
//! - Recursive directory watching

use notify::{RecommendedWatcher, RecursiveMode};
use notify_debouncer_full::{new_debouncer, DebouncedEvent, Debouncer, RecommendedCache};
use spring_cms::theme::VIEW_EXTENSION;
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEBOUNCE: Duration = Duration::from_millis(750);

/// Watches directories for changes to view files.
pub struct FileWatcher {
    _debouncer: Debouncer<RecommendedWatcher, RecommendedCache>,
}

impl FileWatcher {
    /// Creates a new file watcher over `dirs`.
    ///
    /// # Arguments
    ///
    /// * `dirs` - Directories to watch recursively; missing ones are skipped
    /// * `base_path` - Base path for computing relative paths
    /// * `on_change` - Callback invoked when view files change, receives relative paths
    pub fn new<F>(dirs: &[PathBuf], base_path: PathBuf, on_change: F) -> anyhow::Result<Self>
    where
        F: Fn(Vec<PathBuf>) + Send + 'static,
    {
        let mut debouncer = new_debouncer(
            DEBOUNCE,
            None,
            move |result: Result<Vec<DebouncedEvent>, Vec<notify::Error>>| match result {
                Ok(events) => {
                    let paths = events.iter().flat_map(|e| e.paths.iter());
                    let changed = changed_views(paths, &base_path);
                    if !changed.is_empty() {
                        on_change(changed);
                    }
                }
                Err(errors) => {
                    for e in errors {
                        tracing::warn!("Watch error: {}", e);
                    }
                }
            },
        )?;

        for dir in dirs.iter().filter(|dir| dir.is_dir()) {
            debouncer.watch(dir, RecursiveMode::Recursive)?;
            tracing::debug!("Watching {}", dir.display());
        }

        Ok(Self {
            _debouncer: debouncer,
        })
    }
}

fn is_view(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some(VIEW_EXTENSION)
}

fn changed_views<'a>(paths: impl Iterator<Item = &'a PathBuf>, base_path: &Path) -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = paths
        .filter(|p| is_view(p))
        .map(|p| p.strip_prefix(base_path).unwrap_or(p).to_path_buf())
        .collect();
    paths.sort();
    paths.dedup();
    paths
}
