// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Page lookup by URL and by name.
//!
//! The catalog owns the active theme and a router built from every page
//! declaring a `url` property. The router is built lazily and dropped on
//! [`CatalogState::reload`], so edits on disk become visible after a reset.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::router::{Params, Router};
use crate::theme::Theme;
use crate::url;
use crate::view::View;

/// Shared page catalog of the active theme.
pub struct CatalogState {
    theme: Arc<dyn Theme>,
    router: RwLock<Option<Router>>,
}

impl CatalogState {
    /// Creates a catalog over a theme.
    pub fn new(theme: Arc<dyn Theme>) -> Self {
        Self {
            theme,
            router: RwLock::new(None),
        }
    }

    /// The active theme.
    pub fn theme(&self) -> &Arc<dyn Theme> {
        &self.theme
    }

    /// Drops cached views and the router.
    pub fn reload(&self) {
        tracing::debug!("Reloading theme {}", self.theme.name());
        self.theme.reset();
        *self.router.write() = None;
    }

    fn build_router(&self) -> Router {
        let mut router = Router::new();
        for page in self.theme.pages() {
            if let Some(pattern) = page.url_pattern() {
                router.route(page.name(), pattern);
            }
        }
        router.sort();
        tracing::debug!("Built router with {} route(s)", router.rules().len());
        router
    }

    /// Runs `f` against the router, building it first if needed.
    pub fn with_router<R>(&self, f: impl FnOnce(&Router) -> R) -> R {
        {
            let guard = self.router.read();
            if let Some(router) = guard.as_ref() {
                return f(router);
            }
        }
        let mut guard = self.router.write();
        let router = guard.get_or_insert_with(|| self.build_router());
        f(router)
    }

    /// Resolves a URL to a page and its route parameters.
    ///
    /// When the matched page is gone (deleted since the router was built)
    /// the catalog reloads once and retries.
    pub fn find_by_url(&self, url: &str) -> Option<(Arc<View>, Params)> {
        let path = url::normalize(url);

        for pass in 0..2 {
            let (name, params) = self.with_router(|router| {
                router
                    .find(&path)
                    .map(|(rule, params)| (rule.name.clone(), params))
            })?;

            if let Some(page) = self.theme.page(&name).filter(|page| page.exists()) {
                return Some((page, params));
            }

            if pass == 0 {
                tracing::debug!("Page {} vanished, reloading", name);
                self.reload();
            }
        }

        None
    }

    /// Generates the URL of a page from named parameters.
    pub fn find_by_page_name(&self, name: &str, params: &Params) -> Option<String> {
        self.with_router(|router| router.url(name, params))
    }
}

impl std::fmt::Debug for CatalogState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogState")
            .field("theme", &self.theme.name())
            .finish()
    }
}
