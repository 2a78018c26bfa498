// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Request execution.
//!
//! The [`Controller`] resolves a request URL to a page, instantiates the
//! components declared by its layout and the page, then either dispatches an
//! AJAX handler (answering with JSON) or runs the page cycle and renders the
//! page inside its layout.
//!
//! ```rust
//! use std::sync::Arc;
//! use spring_cms::{CatalogState, CmsRequest, ComponentManager, Controller, ControllerOptions, MemoryTheme};
//!
//! let theme = MemoryTheme::new("demo")
//!     .with_page("home", "[cfg]\nurl = /\ntitle = Welcome\n[/cfg]\n<h1>{{ page.title }}</h1>")
//!     .with_layout("default", "<main>{{ page }}</main>");
//!
//! let controller = Controller::new(
//!     Arc::new(CatalogState::new(Arc::new(theme))),
//!     Arc::new(ComponentManager::new()),
//!     ControllerOptions::default(),
//! );
//!
//! let response = controller.handle(&CmsRequest::new("/", "GET"));
//! assert_eq!(response.html_body(), Some("<main><h1>Welcome</h1></main>"));
//! ```

mod current;
mod cycle;

use std::sync::Arc;

use crate::catalog::CatalogState;
use crate::component::{ComponentManager, HandlerOutcome};
use crate::error::{CmsError, Result};
use crate::request::{CmsRequest, FORM_HANDLER_FIELD};
use crate::response::{CmsResponse, ERROR_HTML};
use crate::router::Params;
use crate::view::View;

pub use current::Current;

use cycle::PageCycle;

/// Status used when no page exists for the error's own status.
const FALLBACK_ERROR_STATUS: u16 = 500;

/// Controller settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerOptions {
    /// Reload the theme and router on every request.
    pub debug: bool,
    /// Layout used by pages that do not name one; empty disables it.
    pub default_layout: String,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            debug: false,
            default_layout: "default".to_string(),
        }
    }
}

/// Executes requests against the active theme.
#[derive(Debug, Clone)]
pub struct Controller {
    catalog: Arc<CatalogState>,
    manager: Arc<ComponentManager>,
    options: ControllerOptions,
}

impl Controller {
    /// Creates a controller.
    pub fn new(catalog: Arc<CatalogState>, manager: Arc<ComponentManager>, options: ControllerOptions) -> Self {
        Self {
            catalog,
            manager,
            options,
        }
    }

    /// The page catalog.
    pub fn catalog(&self) -> &Arc<CatalogState> {
        &self.catalog
    }

    /// The component registry.
    pub fn manager(&self) -> &Arc<ComponentManager> {
        &self.manager
    }

    /// Controller settings.
    pub fn options(&self) -> &ControllerOptions {
        &self.options
    }

    /// Serves a request, turning errors into error responses.
    pub fn handle(&self, request: &CmsRequest) -> CmsResponse {
        match self.run(request) {
            Ok(response) => response,
            Err(err) => self.error_response(request, &err),
        }
    }

    /// Serves a request.
    pub fn run(&self, request: &CmsRequest) -> Result<CmsResponse> {
        if self.options.debug {
            self.catalog.reload();
        }

        let (page, route_params) = self
            .catalog
            .find_by_url(&request.path)
            .ok_or_else(|| CmsError::RouteNotFound(request.path.clone()))?;

        if page.is_hidden() {
            tracing::debug!("Page {} is hidden", page.name());
            return Err(CmsError::RouteNotFound(request.path.clone()));
        }

        self.run_page(request, page, route_params, true)
    }

    /// Runs a resolved page. With `use_ajax` unset handler dispatch is
    /// skipped, as for error pages.
    pub fn run_page(
        &self,
        request: &CmsRequest,
        page: Arc<View>,
        route_params: Params,
        use_ajax: bool,
    ) -> Result<CmsResponse> {
        let layout = self.resolve_layout(&page)?;
        let current = Current::new(
            Arc::new(request.clone()),
            Arc::clone(self.catalog.theme()),
            page,
            layout,
            route_params,
        );

        let mut cycle = PageCycle::new(&self.catalog, &self.manager, current);
        cycle.init_components()?;

        if use_ajax && request.is_post() {
            if request.is_ajax() {
                if let Some(body) = cycle.exec_ajax_handlers()? {
                    return Ok(CmsResponse::json(200, body));
                }
            }

            if let Some(handler) = request
                .form_value(FORM_HANDLER_FIELD)
                .filter(|handler| !handler.is_empty())
            {
                if let HandlerOutcome::Handled(response) = cycle.run_ajax_handler(&handler)? {
                    if let Some(body) = response.into_json() {
                        return Ok(CmsResponse::json(200, body));
                    }
                }
            }
        }

        if let Some(body) = cycle.exec_page_cycle() {
            return Ok(CmsResponse::html(200, body));
        }

        Ok(CmsResponse::html(200, cycle.render_page()?))
    }

    fn resolve_layout(&self, page: &View) -> Result<Option<Arc<View>>> {
        let theme = self.catalog.theme();
        match page.layout_name() {
            Some(name) => theme
                .layout(name)
                .map(Some)
                .ok_or_else(|| CmsError::LayoutNotFound(name.to_string())),
            None if self.options.default_layout.is_empty() => Ok(None),
            None => Ok(theme.layout(&self.options.default_layout)),
        }
    }

    /// Builds the response for a failed request.
    ///
    /// AJAX and JSON-accepting clients get `{"message": ...}`. Others get the
    /// theme page routed at `/<status>`, then the page at `/error` (with
    /// status 500), then a fixed document.
    pub fn error_response(&self, request: &CmsRequest, err: &CmsError) -> CmsResponse {
        let mut status = err.status();

        if request.is_ajax() || request.accepts_json() {
            let message = if status == 500 && !self.options.debug {
                "Internal Server Error".to_string()
            } else {
                err.to_string()
            };
            return CmsResponse::error(status, message);
        }

        if err.is_not_found() {
            tracing::debug!("{} {}: {}", request.method, request.path, err);
        } else {
            tracing::error!("{} {}: {}", request.method, request.path, err);
        }

        let error_page = match self.catalog.find_by_url(&format!("/{}", status)) {
            Some(found) => Some(found),
            None => {
                status = FALLBACK_ERROR_STATUS;
                self.catalog.find_by_url("/error")
            }
        };

        let body = error_page
            .and_then(|(page, params)| match self.run_page(request, page, params, false) {
                Ok(response) => response.html_body().map(str::to_string),
                Err(e) => {
                    tracing::error!("Error page failed: {}", e);
                    None
                }
            })
            .filter(|body| !body.is_empty())
            .unwrap_or_else(|| ERROR_HTML.to_string());

        CmsResponse::html(status, body)
    }
}
