// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

// Warn on missing documentation for public items
#![warn(missing_docs)]

//! # Spring CMS
//!
//! Routing and page execution engine for theme-based websites.
//!
//! A theme is a set of pages, layouts and partials. Pages declare a URL
//! pattern and the components they use in a `[cfg]` block; the engine
//! matches request URLs against those patterns, instantiates the declared
//! components, lets them handle AJAX updates and renders the page inside its
//! layout.
//!
//! ## Features
//!
//! - URL patterns with named, optional, wildcard and regex-constrained segments
//! - Reverse routing (`page_url`) from page names and parameters
//! - Components supplied by plugins, with property binding and AJAX handlers
//! - Re-entrant partial rendering with scoped component visibility
//! - Component-registered stylesheets and scripts for layouts
//! - Themed error pages with a JSON variant for AJAX clients
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use spring_cms::{CatalogState, CmsRequest, ComponentManager, Controller, ControllerOptions, FileSystemTheme};
//!
//! let theme = Arc::new(FileSystemTheme::new("./themes", "demo"));
//! let controller = Controller::new(
//!     Arc::new(CatalogState::new(theme)),
//!     Arc::new(ComponentManager::new()),
//!     ControllerOptions::default(),
//! );
//!
//! let response = controller.handle(&CmsRequest::new("/blog/hello-world", "GET"));
//! ```

/// URL path helpers and route segment grammar.
pub mod url;
/// Pattern router with reverse URL generation.
pub mod router;
/// Error types.
pub mod error;
/// HTTP request abstraction for the engine.
pub mod request;
/// HTTP response abstraction for the engine.
pub mod response;
/// Shared request body parsing helpers.
mod body;
/// Template language.
pub mod template;
/// Stylesheets and scripts registered by components.
pub mod assets;
/// Parsed pages, layouts and partials.
pub mod view;
/// Parsed view caching.
pub mod cache;
/// Theme data sources.
pub mod theme;
/// Component runtime, plugins and handlers.
pub mod component;
/// Page lookup by URL and name.
pub mod catalog;
/// Request execution.
pub mod controller;

pub use assets::{AssetAttr, ViewAssets};
pub use body::FormData;
pub use catalog::CatalogState;
pub use component::{
    Capabilities, Component, ComponentDetails, ComponentInstance, ComponentManager, HandlerResponse,
    Handlers, Plugin, PluginDetails, Properties,
};
pub use controller::{Controller, ControllerOptions, Current};
pub use error::{CmsError, Result};
pub use request::CmsRequest;
pub use response::CmsResponse;
pub use router::{Params, Router, Rule};
pub use template::{RenderScope, Template};
#[cfg(feature = "filesystem")]
pub use theme::FileSystemTheme;
pub use theme::{MemoryTheme, Theme};
pub use view::{View, ViewKind};
