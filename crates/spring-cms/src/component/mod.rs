// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Component runtime.
//!
//! Components are reusable units declared in a view's configuration block
//! (`[todo list]`). Each request builds fresh instances through factories
//! registered by plugins, binds their properties, initializes them and
//! gives them a chance to run before the page renders.
//!
//! A component type implements [`Component`]. Optional lifecycle hooks are
//! advertised through [`Component::CAPABILITIES`] so the controller can
//! skip them, and AJAX handlers are declared in an explicit [`Handlers`]
//! registry:
//!
//! ```rust
//! use spring_cms::component::{
//!     Capabilities, Component, ComponentDetails, HandlerResponse, Handlers, Properties,
//! };
//! use spring_cms::{CmsRequest, Result};
//!
//! #[derive(Default)]
//! struct Greeter;
//!
//! impl Component for Greeter {
//!     const CAPABILITIES: Capabilities = Capabilities::RENDER;
//!
//!     fn details(&self) -> ComponentDetails {
//!         ComponentDetails::new("greeter", "Greeter")
//!     }
//!
//!     fn handlers() -> Handlers<Self> {
//!         Handlers::new().on("OnGreet", |_, props, _| {
//!             let name = props.get("name").map_or("", String::as_str);
//!             Ok(HandlerResponse::text(format!("hello {}", name)))
//!         })
//!     }
//!
//!     fn on_render(&mut self, props: &Properties) -> Option<String> {
//!         Some(format!("<p>Hello {}</p>", props.get("name")?))
//!     }
//! }
//! ```

mod handler;
mod manager;
mod partial_stack;
mod plugin;

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Arc;

use bitflags::bitflags;
use serde::Serialize;

use crate::assets::ViewAssets;
use crate::error::Result;
use crate::request::CmsRequest;
use crate::view::View;

pub use handler::{HandlerFn, HandlerOutcome, HandlerResponse, Handlers};
pub use manager::ComponentManager;
pub use partial_stack::PartialStack;
pub use plugin::{Plugin, PluginDetails, PluginInfo};

/// Component property values keyed by property name.
pub type Properties = HashMap<String, String>;

/// A component instance shared within one request.
pub type SharedComponent = Rc<RefCell<ComponentInstance>>;

/// Builds a fresh component instance for the view that declared it.
pub type Factory = Arc<dyn Fn(&View, Properties) -> Result<ComponentInstance> + Send + Sync>;

/// Wraps a constructor into a [`Factory`] for a [`Default`] component.
pub fn factory<C: Component + Default>() -> Factory {
    Arc::new(|_view: &View, properties: Properties| {
        Ok(ComponentInstance::new(C::default(), properties))
    })
}

/// Descriptive metadata of a component type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ComponentDetails {
    /// Registration code, used to find the owning plugin.
    pub code: String,
    /// Human-readable name.
    pub name: String,
    /// Short description.
    pub description: String,
    /// Partial rendered when `on_render` yields nothing (`default` if empty).
    pub view_file: String,
}

impl ComponentDetails {
    /// Details with a code and a name.
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the fallback view file.
    pub fn with_view_file(mut self, view_file: impl Into<String>) -> Self {
        self.view_file = view_file.into();
        self
    }
}

bitflags! {
    /// Optional lifecycle hooks a component type implements.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Capabilities: u8 {
        /// `init` runs after property binding.
        const INIT = 1;
        /// `on_run` runs during the page cycle.
        const RUN = 1 << 1;
        /// `on_render` runs when the component is rendered directly.
        const RENDER = 1 << 2;
    }
}

/// A component type.
pub trait Component: 'static {
    /// Lifecycle hooks this type implements.
    const CAPABILITIES: Capabilities = Capabilities::empty();

    /// Metadata of the component.
    fn details(&self) -> ComponentDetails;

    /// AJAX handlers exposed by the component.
    fn handlers() -> Handlers<Self>
    where
        Self: Sized,
    {
        Handlers::new()
    }

    /// Called once properties are bound. Stylesheets and scripts the
    /// component needs are registered on `assets`.
    fn init(&mut self, _props: &Properties, _assets: &mut ViewAssets) -> Result<()> {
        Ok(())
    }

    /// Called before the page renders; non-empty output short-circuits it.
    fn on_run(&mut self, _props: &Properties, _request: &CmsRequest) -> Option<String> {
        None
    }

    /// Renders the component; `None` falls back to its view file.
    fn on_render(&mut self, _props: &Properties) -> Option<String> {
        None
    }

    /// A computed value exposed to templates as `{{ alias.key }}`.
    fn value(&self, _key: &str) -> Option<String> {
        None
    }
}

/// Object-safe face of a [`Component`] with its handler registry.
trait DynComponent {
    fn details(&self) -> ComponentDetails;
    fn init(&mut self, props: &Properties, assets: &mut ViewAssets) -> Result<()>;
    fn on_run(&mut self, props: &Properties, request: &CmsRequest) -> Option<String>;
    fn on_render(&mut self, props: &Properties) -> Option<String>;
    fn value(&self, key: &str) -> Option<String>;
    fn has_handler(&self, name: &str) -> bool;
    fn call_handler(
        &mut self,
        name: &str,
        props: &Properties,
        request: &CmsRequest,
    ) -> Option<Result<HandlerResponse>>;
}

struct Erased<C: Component> {
    component: C,
    handlers: Handlers<C>,
}

impl<C: Component> DynComponent for Erased<C> {
    fn details(&self) -> ComponentDetails {
        self.component.details()
    }

    fn init(&mut self, props: &Properties, assets: &mut ViewAssets) -> Result<()> {
        self.component.init(props, assets)
    }

    fn on_run(&mut self, props: &Properties, request: &CmsRequest) -> Option<String> {
        self.component.on_run(props, request)
    }

    fn on_render(&mut self, props: &Properties) -> Option<String> {
        self.component.on_render(props)
    }

    fn value(&self, key: &str) -> Option<String> {
        self.component.value(key)
    }

    fn has_handler(&self, name: &str) -> bool {
        self.handlers.contains(name)
    }

    fn call_handler(
        &mut self,
        name: &str,
        props: &Properties,
        request: &CmsRequest,
    ) -> Option<Result<HandlerResponse>> {
        let handler = self.handlers.get(name)?;
        Some(handler(&mut self.component, props, request))
    }
}

/// A live component: its implementation plus request-scoped state.
pub struct ComponentInstance {
    alias: String,
    properties: Properties,
    external_names: HashMap<String, String>,
    capabilities: Capabilities,
    inner: Box<dyn DynComponent>,
}

impl ComponentInstance {
    /// Wraps a component with its initial properties.
    pub fn new<C: Component>(component: C, properties: Properties) -> Self {
        let alias = component.details().code;
        Self {
            alias,
            properties,
            external_names: HashMap::new(),
            capabilities: C::CAPABILITIES,
            inner: Box::new(Erased {
                component,
                handlers: C::handlers(),
            }),
        }
    }

    /// Metadata of the underlying component.
    pub fn details(&self) -> ComponentDetails {
        self.inner.details()
    }

    /// Lifecycle hooks implemented by the component.
    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    /// Name the component is known by in its view.
    pub fn alias(&self) -> &str {
        &self.alias
    }

    /// Sets the alias.
    pub fn set_alias(&mut self, alias: impl Into<String>) {
        self.alias = alias.into();
    }

    /// All properties.
    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    /// A property value, empty when unset.
    pub fn property(&self, name: &str) -> &str {
        self.properties.get(name).map(String::as_str).unwrap_or_default()
    }

    /// Sets a property.
    pub fn set_property(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.properties.insert(name.into(), value.into());
    }

    /// Records the external parameter a property was bound from, e.g.
    /// `:slug` for a route parameter.
    pub fn set_external_property_name(&mut self, name: impl Into<String>, external: impl Into<String>) {
        self.external_names.insert(name.into(), external.into());
    }

    /// The external name a property was bound from.
    pub fn external_property_name(&self, name: &str) -> Option<&str> {
        self.external_names.get(name).map(String::as_str)
    }

    /// The parameter name behind a bound property, without the route
    /// marker.
    pub fn param_name(&self, name: &str) -> Option<&str> {
        self.external_property_name(name)
            .map(|external| external.strip_prefix(':').unwrap_or(external))
    }

    /// A template value: computed by the component, else the property.
    pub fn value(&self, key: &str) -> Option<String> {
        self.inner
            .value(key)
            .or_else(|| self.properties.get(key).cloned())
    }

    /// Runs `init` if the component implements it.
    pub fn init(&mut self, assets: &mut ViewAssets) -> Result<()> {
        if !self.capabilities.contains(Capabilities::INIT) {
            return Ok(());
        }
        self.inner.init(&self.properties, assets)
    }

    /// Runs `on_run` if the component implements it.
    pub fn on_run(&mut self, request: &CmsRequest) -> Option<String> {
        if !self.capabilities.contains(Capabilities::RUN) {
            return None;
        }
        self.inner.on_run(&self.properties, request)
    }

    /// Runs `on_render` if the component implements it.
    pub fn on_render(&mut self) -> Option<String> {
        if !self.capabilities.contains(Capabilities::RENDER) {
            return None;
        }
        self.inner.on_render(&self.properties)
    }

    /// True when the component exposes the handler.
    pub fn has_handler(&self, name: &str) -> bool {
        self.inner.has_handler(name)
    }

    /// Invokes a handler by name.
    pub fn call_handler(&mut self, name: &str, request: &CmsRequest) -> Result<HandlerOutcome> {
        match self.inner.call_handler(name, &self.properties, request) {
            None => Ok(HandlerOutcome::NotFound),
            Some(result) => Ok(HandlerOutcome::Handled(result?)),
        }
    }

    /// Wraps the instance for sharing within a request.
    pub fn into_shared(self) -> SharedComponent {
        Rc::new(RefCell::new(self))
    }
}

impl std::fmt::Debug for ComponentInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentInstance")
            .field("alias", &self.alias)
            .field("code", &self.details().code)
            .field("properties", &self.properties)
            .field("capabilities", &self.capabilities)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CmsError;

    #[derive(Default)]
    struct Counter {
        count: u32,
        initialized: bool,
    }

    fn on_increment(c: &mut Counter, props: &Properties, _: &CmsRequest) -> Result<HandlerResponse> {
        let step: u32 = props.get("step").and_then(|s| s.parse().ok()).unwrap_or(1);
        c.count += step;
        Ok(HandlerResponse::data(serde_json::json!({ "count": c.count })))
    }

    fn on_fail(_: &mut Counter, _: &Properties, _: &CmsRequest) -> Result<HandlerResponse> {
        Err(CmsError::handler("OnFail", "boom"))
    }

    impl Component for Counter {
        const CAPABILITIES: Capabilities = Capabilities::INIT.union(Capabilities::RUN);

        fn details(&self) -> ComponentDetails {
            ComponentDetails::new("counter", "Counter").with_view_file("list")
        }

        fn handlers() -> Handlers<Self> {
            Handlers::new()
                .on("OnIncrement", on_increment)
                .on("OnFail", on_fail)
        }

        fn init(&mut self, _props: &Properties, assets: &mut ViewAssets) -> Result<()> {
            self.initialized = true;
            assets.add_css("css/counter.css", vec![]);
            Ok(())
        }

        fn on_run(&mut self, _props: &Properties, _request: &CmsRequest) -> Option<String> {
            Some(format!("count={}", self.count))
        }

        fn on_render(&mut self, _props: &Properties) -> Option<String> {
            Some("never".into())
        }

        fn value(&self, key: &str) -> Option<String> {
            match key {
                "count" => Some(self.count.to_string()),
                "initialized" => Some(self.initialized.to_string()),
                _ => None,
            }
        }
    }

    #[test]
    fn test_instance_lifecycle() {
        let mut props = Properties::new();
        props.insert("step".into(), "2".into());
        let mut instance = ComponentInstance::new(Counter::default(), props);

        assert_eq!(instance.alias(), "counter");
        assert_eq!(instance.value("initialized").as_deref(), Some("false"));
        let mut assets = ViewAssets::new();
        instance.init(&mut assets).unwrap();
        assert_eq!(instance.value("initialized").as_deref(), Some("true"));
        assert_eq!(
            assets.styles("/a"),
            "<link rel=\"stylesheet\" href=\"/a/css/counter.css\">\n"
        );

        let request = CmsRequest::default();
        let outcome = instance.call_handler("OnIncrement", &request).unwrap();
        assert!(matches!(outcome, HandlerOutcome::Handled(HandlerResponse::Data(_))));
        assert_eq!(instance.value("count").as_deref(), Some("2"));
        assert_eq!(instance.on_run(&request).as_deref(), Some("count=2"));

        // RENDER is not advertised, so on_render is skipped.
        assert_eq!(instance.on_render(), None);
    }

    #[test]
    fn test_handler_dispatch() {
        let mut instance = ComponentInstance::new(Counter::default(), Properties::new());
        let request = CmsRequest::default();

        assert!(instance.has_handler("OnIncrement"));
        assert!(!instance.has_handler("OnMissing"));
        assert_eq!(
            instance.call_handler("OnMissing", &request).unwrap(),
            HandlerOutcome::NotFound
        );
        assert!(instance.call_handler("OnFail", &request).is_err());
    }

    #[test]
    fn test_properties() {
        let mut instance = ComponentInstance::new(Counter::default(), Properties::new());
        instance.set_alias("items");
        instance.set_property("slug", "hello");
        instance.set_external_property_name("slug", ":slug");
        instance.set_property("page", "2");
        instance.set_external_property_name("page", "page");

        assert_eq!(instance.alias(), "items");
        assert_eq!(instance.property("slug"), "hello");
        assert_eq!(instance.property("missing"), "");
        assert_eq!(instance.param_name("slug"), Some("slug"));
        assert_eq!(instance.external_property_name("slug"), Some(":slug"));
        assert_eq!(instance.param_name("page"), Some("page"));
        assert_eq!(instance.param_name("missing"), None);
        assert_eq!(instance.value("slug").as_deref(), Some("hello"));
        assert_eq!(instance.details().view_file, "list");
    }
}
