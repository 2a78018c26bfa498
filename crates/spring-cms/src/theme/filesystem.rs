// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use crate::cache::ViewCache;
use crate::error::{CmsError, Result};
use crate::theme::{Theme, COMPONENTS_DIR};
use crate::view::{View, ViewKind};

/// Extension of view files.
pub const VIEW_EXTENSION: &str = "htm";

const PAGES_DIR: &str = "pages";
const LAYOUTS_DIR: &str = "layouts";
const PARTIALS_DIR: &str = "partials";

/// Converts a Path to a string with forward slashes.
fn path_to_string<P: AsRef<Path>>(path: P) -> String {
    path.as_ref()
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Theme loaded from `<themes_path>/<name>/`.
///
/// ```text
/// themes/demo/
/// ├── pages/home.htm          → page "home"
/// ├── pages/blog/post.htm     → page "blog/post"
/// ├── layouts/default.htm     → layout "default"
/// ├── partials/footer.htm     → partial "footer"
/// └── assets/                 → served under /themes/demo/assets
/// ```
///
/// # Examples
///
/// ```rust,ignore
/// use spring_cms::{FileSystemTheme, Theme};
///
/// let theme = FileSystemTheme::new("./themes", "demo");
/// for page in theme.pages() {
///     println!("{} -> {:?}", page.name(), page.url_pattern());
/// }
/// ```
#[derive(Debug)]
pub struct FileSystemTheme {
    name: String,
    root: PathBuf,
    cache: ViewCache,
}

impl FileSystemTheme {
    /// Creates a theme rooted at `<themes_path>/<name>`.
    pub fn new<P: AsRef<Path>>(themes_path: P, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            root: themes_path.as_ref().join(&name),
            name,
            cache: ViewCache::default(),
        }
    }

    /// The theme directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The directory holding the theme's static assets.
    pub fn assets_dir(&self) -> PathBuf {
        self.root.join("assets")
    }

    /// Fails when the theme directory does not exist.
    pub fn validate(&self) -> Result<()> {
        if self.root.is_dir() {
            Ok(())
        } else {
            Err(CmsError::Config(format!(
                "theme directory not found: {}",
                self.root.display()
            )))
        }
    }

    fn kind_dir(&self, kind: ViewKind) -> PathBuf {
        self.root.join(match kind {
            ViewKind::Page => PAGES_DIR,
            ViewKind::Layout => LAYOUTS_DIR,
            ViewKind::Partial => PARTIALS_DIR,
        })
    }

    fn load(&self, kind: ViewKind, name: &str) -> Option<Arc<View>> {
        let base = self.kind_dir(kind);
        self.cache
            .get_or_load(ViewCache::key(kind, name), || read_view(&base, kind, name))
    }

    /// Names of every view of a kind, sorted.
    fn list(&self, kind: ViewKind) -> Vec<String> {
        let base = self.kind_dir(kind);
        let pattern = format!("{}/**/*.{}", base.display(), VIEW_EXTENSION);

        let paths = match glob::glob(&pattern) {
            Ok(paths) => paths,
            Err(e) => {
                tracing::warn!("Invalid view pattern {}: {}", pattern, e);
                return Vec::new();
            }
        };

        let mut names: Vec<String> = paths
            .filter_map(|entry| entry.ok())
            .filter(|path| path.is_file())
            .filter_map(|path| {
                let relative = path.strip_prefix(&base).ok()?;
                Some(path_to_string(relative.with_extension("")))
            })
            .collect();
        names.sort();
        names
    }
}

/// Rejects names that would escape the kind directory.
fn is_safe_name(name: &str) -> bool {
    !name.is_empty()
        && Path::new(name)
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
}

fn read_view(base: &Path, kind: ViewKind, name: &str) -> Option<View> {
    if !is_safe_name(name) {
        tracing::warn!("Rejecting view name {}", name);
        return None;
    }

    let file = base.join(format!("{}.{}", name, VIEW_EXTENSION));
    if !file.is_file() {
        return None;
    }

    let source = match std::fs::read_to_string(&file) {
        Ok(source) => source,
        Err(e) => {
            tracing::warn!("Cannot read '{}': {}", file.display(), e);
            return None;
        }
    };

    match View::parse(kind, name, &source) {
        Ok(view) => Some(view.with_file(file)),
        Err(e) => {
            tracing::warn!("Skipping view {}: {}", file.display(), e);
            None
        }
    }
}

impl Theme for FileSystemTheme {
    fn name(&self) -> &str {
        &self.name
    }

    fn pages(&self) -> Vec<Arc<View>> {
        self.list(ViewKind::Page)
            .iter()
            .filter_map(|name| self.page(name))
            .collect()
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
        let base = plugin_dir.join(COMPONENTS_DIR);
        let key = format!("component:{}:{}", base.display(), name);
        self.cache
            .get_or_load(key, || read_view(&base, ViewKind::Partial, name))
    }

    fn reset(&self) {
        self.cache.clear();
    }
}
