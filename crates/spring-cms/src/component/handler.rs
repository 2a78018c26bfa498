// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! AJAX update handlers.
//!
//! Every component type declares its handlers in an explicit registry,
//! built once per instance:
//!
//! ```rust
//! use spring_cms::component::{HandlerResponse, Handlers, Properties};
//! use spring_cms::{CmsRequest, Result};
//!
//! #[derive(Default)]
//! struct Counter {
//!     count: u32,
//! }
//!
//! fn on_increment(c: &mut Counter, _props: &Properties, _req: &CmsRequest) -> Result<HandlerResponse> {
//!     c.count += 1;
//!     Ok(HandlerResponse::data(serde_json::json!({ "count": c.count })))
//! }
//!
//! let handlers = Handlers::new().on("OnIncrement", on_increment);
//! assert!(handlers.contains("OnIncrement"));
//! ```

use serde::Serialize;
use serde_json::{Map, Value as JsonValue};

use crate::error::Result;
use crate::request::CmsRequest;

use super::Properties;

/// Signature of a handler on component type `C`.
pub type HandlerFn<C> = fn(&mut C, &Properties, &CmsRequest) -> Result<HandlerResponse>;

/// What a handler produced.
///
/// The controller merges the response into the AJAX answer: `Data` entries
/// are merged next to the rendered partials, a `Value` lands under
/// `"result"`, and a `Record` replaces the whole body.
#[derive(Debug, Clone, PartialEq)]
pub enum HandlerResponse {
    /// Nothing to report.
    Empty,
    /// Key/value pairs merged into the response object.
    Data(Map<String, JsonValue>),
    /// A scalar or list, reported under `"result"`.
    Value(JsonValue),
    /// A structured record sent as the whole response body.
    Record(JsonValue),
}

impl HandlerResponse {
    /// Wraps a JSON value: objects become [`HandlerResponse::Data`], null
    /// becomes [`HandlerResponse::Empty`], anything else a
    /// [`HandlerResponse::Value`].
    pub fn data(value: JsonValue) -> Self {
        match value {
            JsonValue::Null => Self::Empty,
            JsonValue::Object(map) => Self::Data(map),
            other => Self::Value(other),
        }
    }

    /// A text result.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Value(JsonValue::String(text.into()))
    }

    /// Serializes a record to be sent as the whole response body.
    pub fn record<T: Serialize>(record: &T) -> Result<Self> {
        Ok(Self::Record(serde_json::to_value(record)?))
    }

    /// True for [`HandlerResponse::Empty`].
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// The response as a standalone JSON value; `None` when empty.
    pub fn into_json(self) -> Option<JsonValue> {
        match self {
            Self::Empty => None,
            Self::Data(map) => Some(JsonValue::Object(map)),
            Self::Value(value) | Self::Record(value) => Some(value),
        }
    }
}

impl Default for HandlerResponse {
    fn default() -> Self {
        Self::Empty
    }
}

/// Result of dispatching a handler name to a component.
#[derive(Debug, Clone, PartialEq)]
pub enum HandlerOutcome {
    /// No component in scope exposes the handler.
    NotFound,
    /// The handler ran.
    Handled(HandlerResponse),
}

/// Name → handler registry for component type `C`.
pub struct Handlers<C> {
    entries: Vec<(&'static str, HandlerFn<C>)>,
}

impl<C> Handlers<C> {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Registers a handler. Names must start with `On`; others are ignored.
    pub fn on(mut self, name: &'static str, handler: HandlerFn<C>) -> Self {
        if !name.starts_with("On") {
            tracing::warn!("Ignoring handler {}: names must start with On", name);
            return self;
        }
        self.entries.retain(|(existing, _)| *existing != name);
        self.entries.push((name, handler));
        self
    }

    /// Looks up a handler.
    pub fn get(&self, name: &str) -> Option<HandlerFn<C>> {
        self.entries
            .iter()
            .find(|(existing, _)| *existing == name)
            .map(|(_, handler)| *handler)
    }

    /// True when a handler is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Registered handler names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(name, _)| *name)
    }
}

impl<C> Default for Handlers<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> std::fmt::Debug for Handlers<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
