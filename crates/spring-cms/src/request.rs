// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! HTTP request abstraction for the Spring CMS engine.
//!
//! This module provides a transport-agnostic request type that adapters
//! (the axum server, tests, embedders) use to hand request data to the
//! controller.

use std::collections::HashMap;

use crate::body::{parse_form_body, FormData};

/// Header carrying the AJAX update handler name (`alias::OnName` or `OnName`).
pub const HEADER_REQUEST_HANDLER: &str = "X_SPRING_REQUEST_HANDLER";

/// Header carrying the `&`-joined list of partials to re-render.
pub const HEADER_REQUEST_PARTIALS: &str = "X_SPRING_REQUEST_PARTIALS";

/// Form field naming a handler on plain (non-AJAX) POST submissions.
pub const FORM_HANDLER_FIELD: &str = "_handler";

/// A transport-agnostic HTTP request.
///
/// # Example
///
/// ```rust
/// use spring_cms::CmsRequest;
///
/// let request = CmsRequest::new("/blog/hello", "POST")
///     .with_header("X-Requested-With", "XMLHttpRequest")
///     .with_header("X_SPRING_REQUEST_HANDLER", "todo::OnFetchData");
///
/// assert!(request.is_ajax());
/// assert_eq!(request.header("x_spring_request_handler"), Some("todo::OnFetchData"));
/// ```
#[derive(Debug, Clone)]
pub struct CmsRequest {
    /// The request path (e.g., "/blog/hello")
    pub path: String,

    /// The HTTP method (e.g., "GET", "POST")
    pub method: String,

    /// HTTP headers
    pub headers: HashMap<String, String>,

    /// Request body (for POST/PUT/PATCH)
    pub body: Option<Vec<u8>>,

    /// Query parameters (parsed from URL)
    pub query: HashMap<String, String>,
}

impl CmsRequest {
    /// Creates a new request with the given path and method.
    pub fn new(path: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            method: method.into(),
            headers: HashMap::new(),
            body: None,
            query: HashMap::new(),
        }
    }

    /// Replaces the request headers.
    pub fn with_headers(mut self, headers: HashMap<String, String>) -> Self {
        self.headers = headers;
        self
    }

    /// Adds a single header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Adds a body to the request.
    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = Some(body);
        self
    }

    /// Adds a url-encoded form body and the matching content type.
    pub fn with_form<'a, I>(self, fields: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let body = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(fields)
            .finish();
        self.with_header("Content-Type", "application/x-www-form-urlencoded")
            .with_body(body.into_bytes())
    }

    /// Adds query parameters to the request.
    pub fn with_query(mut self, query: HashMap<String, String>) -> Self {
        self.query = query;
        self
    }

    /// Looks up a header by name, ignoring case.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Returns the body as a string, if present and valid UTF-8.
    pub fn body_str(&self) -> Option<&str> {
        self.body.as_ref().and_then(|b| std::str::from_utf8(b).ok())
    }

    /// Returns the Content-Type header, if present.
    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// Returns true for POST requests.
    pub fn is_post(&self) -> bool {
        self.method.eq_ignore_ascii_case("POST")
    }

    /// Checks for an asynchronous update request (`X-Requested-With: XMLHttpRequest`).
    pub fn is_ajax(&self) -> bool {
        self.header("x-requested-with")
            .is_some_and(|value| value.eq_ignore_ascii_case("XMLHttpRequest"))
    }

    /// Checks whether the client prefers a JSON answer.
    pub fn accepts_json(&self) -> bool {
        self.header("accept").is_some_and(|accept| {
            accept
                .split(',')
                .any(|part| part.trim().starts_with("application/json"))
        })
    }

    /// Parsed form fields of the body, empty when the body is not a form.
    pub fn form(&self) -> FormData {
        match &self.body {
            Some(body) => parse_form_body(body, self.content_type()),
            None => FormData::new(),
        }
    }

    /// A single form field value.
    pub fn form_value(&self, name: &str) -> Option<String> {
        self.form().remove(name)
    }
}

impl Default for CmsRequest {
    fn default() -> Self {
        Self::new("/", "GET")
    }
}
