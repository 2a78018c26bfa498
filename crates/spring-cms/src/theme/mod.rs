// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Theme data sources.
//!
//! A theme supplies pages, layouts and partials as parsed [`View`]s. The
//! engine only consumes the [`Theme`] trait; two implementations ship with
//! the crate:
//!
//! - [`MemoryTheme`]: views from in-memory sources (tests, embedding)
//! - [`FileSystemTheme`]: views from `<themes>/<theme>/{pages,layouts,partials}`
//!
//! View names are paths relative to their kind directory without extension,
//! e.g. `blog/post` for `pages/blog/post.htm`.

mod memory;
#[cfg(feature = "filesystem")]
mod filesystem;

use std::path::Path;
use std::sync::Arc;

pub use memory::MemoryTheme;
#[cfg(feature = "filesystem")]
pub use filesystem::{FileSystemTheme, VIEW_EXTENSION};

use crate::view::View;

/// Directory (inside a plugin) holding component partials.
pub const COMPONENTS_DIR: &str = "components";

/// A source of parsed theme views.
///
/// Implementations must be thread-safe; they are shared by every request.
pub trait Theme: Send + Sync {
    /// Theme directory name (e.g. `demo`).
    fn name(&self) -> &str;

    /// All pages, ordered by name.
    fn pages(&self) -> Vec<Arc<View>>;

    /// A page by name.
    fn page(&self, name: &str) -> Option<Arc<View>>;

    /// A layout by name.
    fn layout(&self, name: &str) -> Option<Arc<View>>;

    /// A theme partial by name.
    fn partial(&self, name: &str) -> Option<Arc<View>>;

    /// A partial shipped by a plugin under `<plugin_dir>/components/<name>.htm`.
    fn component_partial(&self, plugin_dir: &Path, name: &str) -> Option<Arc<View>>;

    /// Public URL prefix of the theme's assets.
    fn assets_url(&self) -> String {
        format!("/themes/{}/assets", self.name())
    }

    /// Drops every cached view so the next access reloads it.
    fn reset(&self);
}
