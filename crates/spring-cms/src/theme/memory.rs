// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::cache::ViewCache;
use crate::theme::Theme;
use crate::view::{View, ViewKind};

/// Theme that keeps view sources in memory.
///
/// Sources can be added or removed at any time; parsed views are cached
/// until [`Theme::reset`] is called.
///
/// # Example
///
/// ```rust
/// use spring_cms::{MemoryTheme, Theme};
///
/// let theme = MemoryTheme::new("demo")
///     .with_page("home", "[cfg]\nurl = /\n[/cfg]\n<h1>Home</h1>")
///     .with_layout("default", "<body>{{ page }}</body>");
///
/// assert_eq!(theme.pages().len(), 1);
/// assert!(theme.layout("default").is_some());
/// ```
#[derive(Debug)]
pub struct MemoryTheme {
    name: String,
    sources: RwLock<BTreeMap<(ViewKind, String), String>>,
    component_sources: RwLock<BTreeMap<(PathBuf, String), String>>,
    cache: ViewCache,
}

impl MemoryTheme {
    /// Creates an empty theme.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sources: RwLock::new(BTreeMap::new()),
            component_sources: RwLock::new(BTreeMap::new()),
            cache: ViewCache::default(),
        }
    }

    /// Adds a page source.
    pub fn with_page(self, name: &str, source: &str) -> Self {
        self.add(ViewKind::Page, name, source);
        self
    }

    /// Adds a layout source.
    pub fn with_layout(self, name: &str, source: &str) -> Self {
        self.add(ViewKind::Layout, name, source);
        self
    }

    /// Adds a partial source.
    pub fn with_partial(self, name: &str, source: &str) -> Self {
        self.add(ViewKind::Partial, name, source);
        self
    }

    /// Adds a component partial shipped by the plugin at `plugin_dir`.
    pub fn with_component_partial(self, plugin_dir: impl AsRef<Path>, name: &str, source: &str) -> Self {
        self.component_sources
            .write()
            .insert((plugin_dir.as_ref().to_path_buf(), name.to_string()), source.to_string());
        self
    }

    /// Adds or replaces a view source.
    pub fn add(&self, kind: ViewKind, name: &str, source: &str) {
        self.sources
            .write()
            .insert((kind, name.to_string()), source.to_string());
    }

    /// Removes a view source. Cached views stay until the next reset.
    pub fn remove(&self, kind: ViewKind, name: &str) {
        self.sources.write().remove(&(kind, name.to_string()));
    }

    fn load(&self, kind: ViewKind, name: &str) -> Option<Arc<View>> {
        self.cache.get_or_load(ViewCache::key(kind, name), || {
            let sources = self.sources.read();
            let source = sources.get(&(kind, name.to_string()))?;
            parse_or_warn(kind, name, source)
        })
    }
}

fn parse_or_warn(kind: ViewKind, name: &str, source: &str) -> Option<View> {
    match View::parse(kind, name, source) {
        Ok(view) => Some(view),
        Err(e) => {
            tracing::warn!("Skipping view {}: {}", name, e);
            None
        }
    }
}

impl Theme for MemoryTheme {
    fn name(&self) -> &str {
        &self.name
    }

    fn pages(&self) -> Vec<Arc<View>> {
        let names: Vec<String> = self
            .sources
            .read()
            .keys()
            .filter(|(kind, _)| *kind == ViewKind::Page)
            .map(|(_, name)| name.clone())
            .collect();

        names.iter().filter_map(|name| self.page(name)).collect()
    }

    fn page(&self, name: &str) -> Option<Arc<View>> {
        self.load(ViewKind::Page, name)
    }

    fn layout(&self, name: &str) -> Option<Arc<View>> {
        self.load(ViewKind::Layout, name)
    }

    fn partial(&self, name: &str) -> Option<Arc<View>> {
        self.load(ViewKind::Partial, name)
    }

    fn component_partial(&self, plugin_dir: &Path, name: &str) -> Option<Arc<View>> {
        let key = format!("component:{}:{}", plugin_dir.display(), name);
        self.cache.get_or_load(key, || {
            let sources = self.component_sources.read();
            let source = sources.get(&(plugin_dir.to_path_buf(), name.to_string()))?;
            parse_or_warn(ViewKind::Partial, name, source)
        })
    }

    fn reset(&self) {
        self.cache.clear();
    }
}
