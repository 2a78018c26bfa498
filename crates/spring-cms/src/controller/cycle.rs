// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! One request's pass through a page: component setup, handler dispatch,
//! page-cycle hooks and rendering.

use std::sync::Arc;

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{Map, Value as JsonValue};

use crate::assets::ViewAssets;
use crate::catalog::CatalogState;
use crate::component::{
    ComponentInstance, ComponentManager, HandlerOutcome, HandlerResponse, PartialStack,
    SharedComponent,
};
use crate::error::{CmsError, Result};
use crate::request::{HEADER_REQUEST_HANDLER, HEADER_REQUEST_PARTIALS};
use crate::router::Params;
use crate::template::RenderScope;
use crate::view::{ComponentDecl, View, ViewKind};

use super::Current;

lazy_static! {
    static ref HANDLER_NAME: Regex =
        Regex::new(r"^(?:\w+::)?On[A-Z]\w*$").expect("handler name regex");
    static ref PARTIAL_NAME: Regex =
        Regex::new(r"^(?:\w+::)?[\w\-./]+$").expect("partial name regex");
    static ref PLACEHOLDER: Regex = Regex::new(r"^\{\{([^}]+)\}\}$").expect("placeholder regex");
}

const DEFAULT_VIEW_FILE: &str = "default";
const NOOP_HANDLER: &str = "OnAjax";
/// Partials nested deeper than this render as empty text.
const MAX_PARTIAL_DEPTH: usize = 32;

pub(crate) struct PageCycle<'a> {
    catalog: &'a CatalogState,
    manager: &'a ComponentManager,
    current: Current,
    page_components: Vec<(String, SharedComponent)>,
    layout_components: Vec<(String, SharedComponent)>,
    partial_stack: PartialStack,
    partial_depth: usize,
    page_assets: ViewAssets,
    layout_assets: ViewAssets,
    /// Component handling the current handler call or component render.
    active: Option<SharedComponent>,
    page_contents: String,
}

impl<'a> PageCycle<'a> {
    pub(crate) fn new(catalog: &'a CatalogState, manager: &'a ComponentManager, current: Current) -> Self {
        Self {
            catalog,
            manager,
            current,
            page_components: Vec::new(),
            layout_components: Vec::new(),
            partial_stack: PartialStack::new(),
            partial_depth: 0,
            page_assets: ViewAssets::new(),
            layout_assets: ViewAssets::new(),
            active: None,
            page_contents: String::new(),
        }
    }

    /// Instantiates the layout's components, then the page's.
    pub(crate) fn init_components(&mut self) -> Result<()> {
        self.page_components.clear();
        self.layout_components.clear();
        self.current.components.clear();
        self.page_assets.clear();
        self.layout_assets.clear();

        if let Some(layout) = self.current.layout.clone() {
            for decl in layout.declared_components() {
                let component = self.make_component(decl, &layout)?;
                self.layout_components.push((decl.alias.clone(), component));
            }
        }

        let page = Arc::clone(&self.current.page);
        for decl in page.declared_components() {
            let component = self.make_component(decl, &page)?;
            self.page_components.push((decl.alias.clone(), component));
        }

        Ok(())
    }

    fn make_component(&mut self, decl: &ComponentDecl, view: &View) -> Result<SharedComponent> {
        tracing::debug!("Creating component {} as {} for {}", decl.name, decl.alias, view.name());
        let mut instance = self
            .manager
            .make_component(&decl.name, view, decl.props.clone())?;
        instance.set_alias(decl.alias.clone());
        self.bind_properties(&mut instance);

        let assets = match view.kind() {
            ViewKind::Layout => &mut self.layout_assets,
            _ => &mut self.page_assets,
        };
        instance.init(assets).map_err(|e| match e {
            e @ CmsError::ComponentInit { .. } => e,
            other => CmsError::component_init(&decl.alias, other.to_string()),
        })?;

        let component = instance.into_shared();
        self.current
            .components
            .insert(decl.alias.clone(), component.clone());
        Ok(component)
    }

    /// Resolves `{{ name }}` property values against the parameter bag and
    /// `{{ :name }}` against the route parameters.
    fn bind_properties(&self, instance: &mut ComponentInstance) {
        let bindings: Vec<(String, String)> = instance
            .properties()
            .iter()
            .filter_map(|(prop, value)| {
                let captures = PLACEHOLDER.captures(value)?;
                Some((prop.clone(), captures[1].trim().to_string()))
            })
            .collect();

        for (prop, external) in bindings {
            let value = match external.strip_prefix(':') {
                Some(name) => self.current.route_params.get(name),
                None => self.current.params.get(&external),
            };
            instance.set_property(prop.clone(), value.cloned().unwrap_or_default());
            instance.set_external_property_name(prop, external);
        }
    }

    /// Runs the handler named by the AJAX headers and renders the requested
    /// partials. `None` when the request names no handler.
    pub(crate) fn exec_ajax_handlers(&mut self) -> Result<Option<JsonValue>> {
        let request = Arc::clone(&self.current.request);
        let handler = match request.header(HEADER_REQUEST_HANDLER).map(str::trim) {
            Some(handler) if !handler.is_empty() => handler,
            _ => return Ok(None),
        };
        if !HANDLER_NAME.is_match(handler) {
            return Err(CmsError::HandlerNameInvalid(handler.to_string()));
        }

        let partials: Vec<&str> = request
            .header(HEADER_REQUEST_PARTIALS)
            .unwrap_or_default()
            .split('&')
            .map(str::trim)
            .filter(|partial| !partial.is_empty())
            .collect();
        if let Some(invalid) = partials.iter().find(|p| !PARTIAL_NAME.is_match(p)) {
            return Err(CmsError::PartialNameInvalid(invalid.to_string()));
        }

        let response = match self.run_ajax_handler(handler)? {
            HandlerOutcome::NotFound => return Err(CmsError::HandlerNotFound(handler.to_string())),
            HandlerOutcome::Handled(HandlerResponse::Record(record)) => return Ok(Some(record)),
            HandlerOutcome::Handled(response) => response,
        };

        let mut body = Map::new();
        for partial in partials {
            let html = self.render_partial(partial, Vec::new());
            body.insert(partial.to_string(), JsonValue::String(html));
        }

        match response {
            HandlerResponse::Data(data) => body.extend(data),
            HandlerResponse::Value(value) => {
                body.insert("result".to_string(), value);
            }
            HandlerResponse::Empty | HandlerResponse::Record(_) => {}
        }

        Ok(Some(JsonValue::Object(body)))
    }

    /// Dispatches `alias::OnName` or a bare `OnName` to a component.
    pub(crate) fn run_ajax_handler(&mut self, handler: &str) -> Result<HandlerOutcome> {
        let target = match handler.split_once("::") {
            Some((alias, method)) => self.find_component_by_name(alias).map(|c| (c, method)),
            None => self.find_component_by_handler(handler).map(|c| (c, handler)),
        };

        let Some((component, method)) = target else {
            if handler == NOOP_HANDLER {
                return Ok(HandlerOutcome::Handled(HandlerResponse::Empty));
            }
            return Ok(HandlerOutcome::NotFound);
        };

        tracing::debug!("Dispatching {} to {}", method, component.borrow().alias());
        self.active = Some(component.clone());
        let request = Arc::clone(&self.current.request);
        let outcome = component.borrow_mut().call_handler(method, &request)?;
        Ok(outcome)
    }

    /// Runs `on_run` on layout then page components; the first non-empty
    /// output replaces the page.
    pub(crate) fn exec_page_cycle(&self) -> Option<String> {
        let request = &self.current.request;
        self.layout_components
            .iter()
            .chain(self.page_components.iter())
            .find_map(|(_, component)| {
                component
                    .borrow_mut()
                    .on_run(request)
                    .filter(|output| !output.is_empty())
            })
    }

    /// Renders the page, wrapped in its layout when there is one.
    pub(crate) fn render_page(&mut self) -> Result<String> {
        let page = Arc::clone(&self.current.page);
        let contents = page.render(self)?;

        let Some(layout) = self.current.layout.clone() else {
            return Ok(contents);
        };
        self.page_contents = contents;
        layout.render(self)
    }

    /// Layout registrations first, then the page's and its partials'.
    fn view_assets(&self) -> ViewAssets {
        let mut assets = self.layout_assets.clone();
        assets.merge(&self.page_assets);
        assets
    }

    fn find_component_by_name(&self, alias: &str) -> Option<SharedComponent> {
        self.page_components
            .iter()
            .chain(self.layout_components.iter())
            .find(|(name, _)| name == alias)
            .map(|(_, component)| component.clone())
            .or_else(|| self.partial_stack.component(alias))
    }

    fn find_component_by_handler(&self, handler: &str) -> Option<SharedComponent> {
        self.page_components
            .iter()
            .chain(self.layout_components.iter())
            .find(|(_, component)| component.borrow().has_handler(handler))
            .map(|(_, component)| component.clone())
    }

    fn find_component_by_partial(&self, partial: &str) -> Option<SharedComponent> {
        self.page_components
            .iter()
            .chain(self.layout_components.iter())
            .find(|(_, component)| self.component_partial(component, partial).is_some())
            .map(|(_, component)| component.clone())
    }

    /// Locates `<alias>/<name>` in the theme, then in the plugin that
    /// registered the component.
    fn component_partial(&self, component: &SharedComponent, name: &str) -> Option<Arc<View>> {
        let (path, code) = {
            let component = component.borrow();
            (format!("{}/{}", component.alias(), name), component.details().code)
        };

        if let Some(view) = self.current.theme.partial(&path) {
            return Some(view);
        }
        let plugin = self.manager.find_plugin(&code)?;
        self.current.theme.component_partial(&plugin.dir, &path)
    }

    fn render_partial_view(&mut self, name: &str) -> Result<String> {
        let view = match name.split_once("::") {
            Some((alias, partial)) => {
                let component = if alias.is_empty() {
                    self.active
                        .clone()
                        .or_else(|| self.find_component_by_partial(partial))
                } else {
                    self.find_component_by_name(alias)
                }
                .ok_or_else(|| CmsError::render(name, "no component in scope"))?;

                let view = self
                    .component_partial(&component, partial)
                    .ok_or_else(|| CmsError::render(name, "component partial not found"))?;
                self.active = Some(component.clone());
                self.current.this = Some(component);
                view
            }
            None => self
                .current
                .theme
                .partial(name)
                .ok_or_else(|| CmsError::render(name, "partial not found"))?,
        };

        self.partial_stack.stack_partial();
        let result = self.run_partial(&view);
        self.partial_stack.unstack_partial();
        result
    }

    fn run_partial(&mut self, view: &View) -> Result<String> {
        let page = Arc::clone(&self.current.page);
        let mut components = Vec::new();
        for decl in view.declared_components() {
            let component = self.make_component(decl, &page)?;
            self.partial_stack
                .add_component(decl.alias.clone(), component.clone());
            components.push(component);
        }

        let request = Arc::clone(&self.current.request);
        for component in &components {
            component.borrow_mut().on_run(&request);
        }

        view.render(self)
    }
}

impl RenderScope for PageCycle<'_> {
    fn page_contents(&self) -> String {
        self.page_contents.clone()
    }

    fn render_partial(&mut self, name: &str, params: Vec<(String, String)>) -> String {
        let working = self.current.for_partial(params);
        let saved = std::mem::replace(&mut self.current, working);
        let saved_active = self.active.clone();

        let result = if self.partial_depth >= MAX_PARTIAL_DEPTH {
            Err(CmsError::render(name, "partials nested too deeply"))
        } else {
            self.partial_depth += 1;
            let result = self.render_partial_view(name);
            self.partial_depth -= 1;
            result
        };

        self.current = saved;
        self.active = saved_active;

        result.unwrap_or_else(|e| {
            tracing::warn!("Partial {} not rendered: {}", name, e);
            String::new()
        })
    }

    fn render_component(&mut self, name: &str, params: Vec<(String, String)>) -> String {
        let Some(component) = self.find_component_by_name(name) else {
            tracing::warn!("Component {} not found", name);
            return String::new();
        };

        let previous = self.active.replace(component.clone());
        let rendered = {
            let mut instance = component.borrow_mut();
            for (key, value) in params {
                instance.set_property(key, value);
            }
            instance.on_render()
        };

        let output = match rendered.filter(|output| !output.is_empty()) {
            Some(output) => output,
            None => {
                let view_file = component.borrow().details().view_file;
                let view_file = if view_file.is_empty() {
                    DEFAULT_VIEW_FILE.to_string()
                } else {
                    view_file
                };
                self.render_partial(&format!("{}::{}", name, view_file), Vec::new())
            }
        };

        self.active = previous;
        output
    }

    fn page_url(&self, name: &str, params: &Params) -> String {
        self.catalog
            .find_by_page_name(name, params)
            .unwrap_or_default()
    }

    fn is_page(&self, name: &str) -> bool {
        self.current.page.name().to_lowercase() == name.to_lowercase()
    }

    fn assets(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.current.theme.assets_url(),
            path.trim_start_matches('/')
        )
    }

    fn styles(&self) -> String {
        self.view_assets().styles(&self.current.theme.assets_url())
    }

    fn scripts(&self) -> String {
        self.view_assets().scripts(&self.current.theme.assets_url())
    }

    fn lookup(&self, scope: &str, key: &str) -> Option<String> {
        match scope {
            "param" => self.current.params.get(key).cloned(),
            "route" => self.current.route_params.get(key).cloned(),
            "page" => self.current.page.props().get(key).cloned(),
            "layout" => self
                .current
                .layout
                .as_ref()
                .and_then(|layout| layout.props().get(key).cloned()),
            "this" => self
                .current
                .this
                .as_ref()
                .and_then(|component| component.borrow().value(key)),
            alias => self
                .current
                .components
                .get(alias)
                .and_then(|component| component.borrow().value(key)),
        }
    }
}
