// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! HTTP response abstraction for the Spring CMS engine.
//!
//! The controller returns one of these after handling a request. Adapters
//! convert it to their platform-specific response format.

use std::collections::HashMap;

use serde_json::Value as JsonValue;

/// The fixed document served when neither the status page nor the `/error`
/// page of the theme can be rendered.
pub const ERROR_HTML: &str = "<!doctype html><html lang=\"en\"><head><meta charset=\"UTF-8\"><title>Spring CMS - Error</title></head><body><div class=\"container\"><h1>Error</h1><p>We're sorry, but something went wrong and the page cannot be displayed.</p></div></body></html>";

/// A transport-agnostic HTTP response.
///
/// # Example
///
/// ```rust
/// use spring_cms::CmsResponse;
///
/// let html = CmsResponse::html(200, "<h1>Hello</h1>");
/// let json = CmsResponse::json(200, serde_json::json!({"success": true}));
/// assert!(html.is_success() && json.is_success());
/// ```
#[derive(Debug, Clone)]
pub enum CmsResponse {
    /// HTML response (rendered page)
    Html {
        /// HTTP status code
        status: u16,
        /// HTTP headers
        headers: HashMap<String, String>,
        /// HTML body
        body: String,
    },

    /// JSON response (AJAX handlers)
    Json {
        /// HTTP status code
        status: u16,
        /// HTTP headers
        headers: HashMap<String, String>,
        /// JSON body
        body: JsonValue,
    },

    /// Error response, rendered by the adapter as `{"message": ...}` or text
    Error {
        /// HTTP status code
        status: u16,
        /// Error message
        message: String,
    },
}

impl CmsResponse {
    /// Creates an HTML response.
    pub fn html(status: u16, body: impl Into<String>) -> Self {
        Self::Html {
            status,
            headers: HashMap::new(),
            body: body.into(),
        }
    }

    /// Creates a JSON response.
    pub fn json(status: u16, body: JsonValue) -> Self {
        Self::Json {
            status,
            headers: HashMap::new(),
            body,
        }
    }

    /// Creates an error response.
    pub fn error(status: u16, message: impl Into<String>) -> Self {
        Self::Error {
            status,
            message: message.into(),
        }
    }

    /// Creates a 404 Not Found response.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::error(404, message)
    }

    /// Returns the status code.
    pub fn status(&self) -> u16 {
        match self {
            Self::Html { status, .. } | Self::Json { status, .. } | Self::Error { status, .. } => {
                *status
            }
        }
    }

    /// Returns true if this is a success response (2xx).
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status())
    }

    /// Returns true if this is an error response (4xx or 5xx).
    pub fn is_error(&self) -> bool {
        self.status() >= 400
    }

    /// Returns the HTML body, if this is an HTML response.
    pub fn html_body(&self) -> Option<&str> {
        match self {
            Self::Html { body, .. } => Some(body),
            _ => None,
        }
    }

    /// Returns the JSON body, if this is a JSON response.
    pub fn json_body(&self) -> Option<&JsonValue> {
        match self {
            Self::Json { body, .. } => Some(body),
            _ => None,
        }
    }

    /// Adds a header to the response (only for Html and Json variants).
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        match &mut self {
            Self::Html { headers, .. } | Self::Json { headers, .. } => {
                headers.insert(key.into(), value.into());
            }
            Self::Error { .. } => {}
        }
        self
    }
}

impl Default for CmsResponse {
    fn default() -> Self {
        Self::html(200, "")
    }
}
