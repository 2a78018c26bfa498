// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Stylesheets and scripts registered by components while a request runs.
//!
//! Components add entries from `init`; layouts print them with the
//! `{{ styles }}` and `{{ scripts }}` tags. Names starting with `http` are
//! used as-is, anything else is resolved against the theme's assets URL.

use crate::template::escape_html;

/// An HTML attribute on a generated `<link>` or `<script>` tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetAttr {
    /// Attribute name
    pub name: String,
    /// Attribute value; `None` renders a bare flag such as `defer`
    pub value: Option<String>,
}

impl AssetAttr {
    /// A `name="value"` attribute.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: Some(value.into()),
        }
    }

    /// A valueless attribute.
    pub fn flag(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
        }
    }
}

#[derive(Debug, Clone)]
struct Asset {
    name: String,
    attrs: Vec<AssetAttr>,
}

/// Stylesheets and scripts registered for one view, in registration order.
///
/// Registering the same name twice keeps its first position and replaces
/// its attributes.
#[derive(Debug, Clone, Default)]
pub struct ViewAssets {
    styles: Vec<Asset>,
    scripts: Vec<Asset>,
}

impl ViewAssets {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a stylesheet.
    pub fn add_css(&mut self, name: impl Into<String>, attrs: Vec<AssetAttr>) {
        upsert(&mut self.styles, name.into(), attrs);
    }

    /// Registers a script.
    pub fn add_js(&mut self, name: impl Into<String>, attrs: Vec<AssetAttr>) {
        upsert(&mut self.scripts, name.into(), attrs);
    }

    /// Appends `other`'s entries; names already registered here keep their
    /// position and take `other`'s attributes.
    pub fn merge(&mut self, other: &ViewAssets) {
        for asset in &other.styles {
            upsert(&mut self.styles, asset.name.clone(), asset.attrs.clone());
        }
        for asset in &other.scripts {
            upsert(&mut self.scripts, asset.name.clone(), asset.attrs.clone());
        }
    }

    /// True when nothing has been registered.
    pub fn is_empty(&self) -> bool {
        self.styles.is_empty() && self.scripts.is_empty()
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.styles.clear();
        self.scripts.clear();
    }

    /// One `<link rel="stylesheet">` line per stylesheet.
    pub fn styles(&self, assets_url: &str) -> String {
        self.styles
            .iter()
            .map(|asset| {
                format!(
                    "<link rel=\"stylesheet\" href=\"{}\"{}>\n",
                    escape_html(&resolve(assets_url, &asset.name)),
                    render_attrs(&asset.attrs)
                )
            })
            .collect()
    }

    /// One `<script>` line per script.
    pub fn scripts(&self, assets_url: &str) -> String {
        self.scripts
            .iter()
            .map(|asset| {
                format!(
                    "<script src=\"{}\"{}></script>\n",
                    escape_html(&resolve(assets_url, &asset.name)),
                    render_attrs(&asset.attrs)
                )
            })
            .collect()
    }
}

fn upsert(entries: &mut Vec<Asset>, name: String, attrs: Vec<AssetAttr>) {
    match entries.iter_mut().find(|asset| asset.name == name) {
        Some(asset) => asset.attrs = attrs,
        None => entries.push(Asset { name, attrs }),
    }
}

fn resolve(assets_url: &str, name: &str) -> String {
    if name.starts_with("http") {
        return name.to_string();
    }
    format!(
        "{}/{}",
        assets_url.trim_end_matches('/'),
        name.trim_start_matches('/')
    )
}

fn render_attrs(attrs: &[AssetAttr]) -> String {
    attrs
        .iter()
        .map(|attr| match &attr.value {
            Some(value) => format!(" {}=\"{}\"", attr.name, escape_html(value)),
            None => format!(" {}", attr.name),
        })
        .collect()
}
