// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Demo plugin.
//!
//! Ships a `todo` component that keeps a short item list and answers a few
//! AJAX handlers. Its default partial lives in
//! `<plugins_path>/demo/components/todo/default.htm`; its script is expected
//! at `js/todo.js` in the theme's assets.

use std::path::PathBuf;

use serde::Deserialize;
use serde_json::json;
use spring_cms::component::{factory, Factory};
use spring_cms::{
    AssetAttr, Capabilities, CmsError, CmsRequest, Component, ComponentDetails, HandlerResponse, Handlers, Plugin,
    PluginDetails, Properties, Result, ViewAssets,
};

/// Plugin code, also the plugin's directory name.
pub const PLUGIN_CODE: &str = "demo";

const DEFAULT_MAX: usize = 10;
const SCRIPT: &str = "js/todo.js";

/// The demo plugin.
#[derive(Debug, Clone)]
pub struct DemoPlugin {
    dir: PathBuf,
}

impl DemoPlugin {
    /// Creates the plugin with its resource directory.
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }
}

impl Plugin for DemoPlugin {
    fn details(&self) -> PluginDetails {
        PluginDetails {
            code: PLUGIN_CODE.to_string(),
            name: "Demo".to_string(),
            description: "Example components".to_string(),
            author: "Maravilla Labs".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    fn dir(&self) -> PathBuf {
        self.dir.clone()
    }

    fn register_components(&self) -> Vec<(String, Factory)> {
        vec![("todo".to_string(), factory::<Todo>())]
    }
}

/// A todo list seeded from the `items` property (comma separated) and
/// capped at `max` entries.
#[derive(Debug, Default)]
pub struct Todo {
    items: Vec<String>,
    max: usize,
}

#[derive(Deserialize)]
struct FetchData {
    #[serde(default)]
    foo: String,
}

fn on_add_item(todo: &mut Todo, _props: &Properties, request: &CmsRequest) -> Result<HandlerResponse> {
    let item = request
        .form_value("item")
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .ok_or_else(|| CmsError::handler("OnAddItem", "item is required"))?;

    if todo.items.len() >= todo.max {
        return Err(CmsError::handler(
            "OnAddItem",
            format!("the list holds at most {} items", todo.max),
        ));
    }

    todo.items.push(item);
    Ok(HandlerResponse::data(json!({
        "items": todo.items,
        "count": todo.items.len(),
    })))
}

fn on_fetch_data(_todo: &mut Todo, _props: &Properties, request: &CmsRequest) -> Result<HandlerResponse> {
    let data: FetchData = match request.body_str().map(str::trim) {
        Some(body) if !body.is_empty() => serde_json::from_str(body)?,
        _ => FetchData { foo: String::new() },
    };
    Ok(HandlerResponse::data(json!({ "foo": data.foo })))
}

fn on_fetch_form(_todo: &mut Todo, _props: &Properties, request: &CmsRequest) -> Result<HandlerResponse> {
    let title = request.form_value("title").unwrap_or_default();
    Ok(HandlerResponse::data(json!({ "title": title })))
}

impl Component for Todo {
    const CAPABILITIES: Capabilities = Capabilities::INIT.union(Capabilities::RUN);

    fn details(&self) -> ComponentDetails {
        ComponentDetails::new("todo", "Todo Component")
            .with_description("A short list of things to do")
            .with_view_file("default")
    }

    fn handlers() -> Handlers<Self> {
        Handlers::new()
            .on("OnAddItem", on_add_item)
            .on("OnFetchData", on_fetch_data)
            .on("OnFetchForm", on_fetch_form)
    }

    fn init(&mut self, props: &Properties, assets: &mut ViewAssets) -> Result<()> {
        self.max = match props.get("max").map(|max| max.trim()) {
            Some(max) if !max.is_empty() => max
                .parse()
                .map_err(|_| CmsError::component_init("todo", format!("invalid max {:?}", max)))?,
            _ => DEFAULT_MAX,
        };
        self.items = props
            .get("items")
            .map(|items| {
                items
                    .split(',')
                    .map(str::trim)
                    .filter(|item| !item.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        self.items.truncate(self.max);
        assets.add_js(SCRIPT, vec![AssetAttr::flag("defer")]);
        Ok(())
    }

    fn on_run(&mut self, _props: &Properties, request: &CmsRequest) -> Option<String> {
        tracing::debug!("todo running for {}", request.path);
        None
    }

    fn value(&self, key: &str) -> Option<String> {
        match key {
            "count" => Some(self.items.len().to_string()),
            "max" => Some(self.max.to_string()),
            "items" => Some(self.items.join(", ")),
            _ => None,
        }
    }
}
