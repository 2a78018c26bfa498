// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Error types for the Spring CMS engine.
//!
//! This module defines [`CmsError`], the main error enum, and the mapping
//! from error kinds to HTTP status codes used by the controller when it
//! renders error pages.
//!
//! # Error Categories
//!
//! - **Routing errors**: no route or page for the request URL
//! - **Theme errors**: missing layouts, unparsable templates
//! - **Component errors**: unknown factories, failing constructors
//! - **AJAX protocol errors**: malformed handler or partial names, unknown handlers
//! - **Render errors**: template execution failures

use thiserror::Error;

/// The main error type for Spring CMS operations.
#[derive(Error, Debug)]
pub enum CmsError {
    /// No route rule (or no existing page) matches the request URL.
    #[error("Route not found: {0}")]
    RouteNotFound(String),

    /// The page names a layout the active theme does not provide.
    #[error("Layout not found: {0}")]
    LayoutNotFound(String),

    /// No component factory is registered under this name.
    #[error("Component factory not found \"{0}\", check the component plugin")]
    ComponentNotFound(String),

    /// The AJAX handler header does not follow the `alias::OnName` grammar.
    #[error("Ajax handler invalid name: {0}")]
    HandlerNameInvalid(String),

    /// A requested partial name contains characters outside the allowed set.
    #[error("Partial invalid name: {0}")]
    PartialNameInvalid(String),

    /// No component in scope exposes the requested handler.
    #[error("Ajax handler {0} not found")]
    HandlerNotFound(String),

    /// A component factory or the property binding step failed.
    #[error("Component {component} failed to initialize: {message}")]
    ComponentInit {
        /// The component name or alias.
        component: String,
        /// Error message.
        message: String,
    },

    /// An update handler returned an error.
    #[error("Handler {handler} failed: {message}")]
    Handler {
        /// The handler name as requested.
        handler: String,
        /// Error message.
        message: String,
    },

    /// Template execution failed.
    #[error("Render error in {view}: {message}")]
    Render {
        /// The view being rendered.
        view: String,
        /// Error message.
        message: String,
    },

    /// A template source could not be parsed.
    #[error("Template error in {view}: {message}")]
    Template {
        /// The view being parsed.
        view: String,
        /// Error message.
        message: String,
    },

    /// Invalid engine or theme configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CmsError {
    /// Creates a render error for the given view.
    pub fn render(view: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Render {
            view: view.into(),
            message: message.into(),
        }
    }

    /// Creates a template parse error for the given view.
    pub fn template(view: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Template {
            view: view.into(),
            message: message.into(),
        }
    }

    /// Creates a component initialization error.
    pub fn component_init(component: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ComponentInit {
            component: component.into(),
            message: message.into(),
        }
    }

    /// Creates an error for a failing update handler.
    pub fn handler(handler: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Handler {
            handler: handler.into(),
            message: message.into(),
        }
    }

    /// Returns the HTTP status code this error is reported with.
    pub fn status(&self) -> u16 {
        match self {
            Self::RouteNotFound(_) | Self::HandlerNotFound(_) => 404,
            Self::HandlerNameInvalid(_) | Self::PartialNameInvalid(_) => 400,
            _ => 500,
        }
    }

    /// Returns true for errors that mean "nothing lives at this URL".
    pub fn is_not_found(&self) -> bool {
        self.status() == 404
    }
}

/// Convenience type alias for Results with [`CmsError`].
pub type Result<T> = std::result::Result<T, CmsError>;
