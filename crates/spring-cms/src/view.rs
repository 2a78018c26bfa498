// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Theme views: pages, layouts and partials.
//!
//! A view file starts with an optional configuration block followed by the
//! template body:
//!
//! ```text
//! [cfg]
//! url = "/blog/:slug"
//! layout = "default"
//! title = "Blog post"
//!
//! [blogPost post]
//! slug = "{{ :slug }}"
//! [/cfg]
//! <article>{{ post.title }}</article>
//! ```
//!
//! Keys before the first section are view properties. Every `[name alias]`
//! (or `[name]`, where the alias equals the name) section declares a
//! component instance with its raw properties.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use nom::branch::alt;
use nom::bytes::complete::{is_not, take_until};
use nom::character::complete::{char, space0};
use nom::combinator::{all_consuming, rest};
use nom::sequence::{delimited, separated_pair};
use nom::{IResult, Parser};

use crate::error::{CmsError, Result};
use crate::template::{RenderScope, Template};

/// Raw string properties (view properties or component properties).
pub type Props = HashMap<String, String>;

const CFG_START: &str = "[cfg]";
const CFG_END: &str = "[/cfg]";

/// The kind of a view within a theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ViewKind {
    /// Routable page
    Page,
    /// Wrapper rendered around a page
    Layout,
    /// Reusable fragment (theme or component partial)
    Partial,
}

/// A component declared in a view's configuration block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentDecl {
    /// Factory name
    pub name: String,
    /// Alias, unique within the view
    pub alias: String,
    /// Raw properties, possibly holding `{{ placeholder }}` references
    pub props: Props,
}

/// A parsed, immutable view.
///
/// Views are shared between requests; everything request-specific (component
/// instances, parameters) lives in the controller's render cycle.
#[derive(Debug, Clone)]
pub struct View {
    kind: ViewKind,
    name: String,
    file: Option<PathBuf>,
    props: Props,
    components: Vec<ComponentDecl>,
    template: Template,
}

impl View {
    /// Parses a view from source.
    pub fn parse(kind: ViewKind, name: impl Into<String>, source: &str) -> Result<Self> {
        let name = name.into();
        let (cfg, body) = split_cfg(&name, source)?;
        let (props, components) = parse_cfg(&name, &cfg)?;
        let template = Template::parse(&name, &body)?;

        Ok(Self {
            kind,
            name,
            file: None,
            props,
            components,
            template,
        })
    }

    /// Records the file the view was loaded from, enabling [`View::exists`].
    pub fn with_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.file = Some(file.into());
        self
    }

    /// The view kind.
    pub fn kind(&self) -> ViewKind {
        self.kind
    }

    /// The view name (path relative to its kind directory, no extension).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The backing file, if any.
    pub fn file(&self) -> Option<&Path> {
        self.file.as_deref()
    }

    /// False once the backing file has disappeared. In-memory views always exist.
    pub fn exists(&self) -> bool {
        self.file.as_ref().map_or(true, |f| f.is_file())
    }

    /// All view properties.
    pub fn props(&self) -> &Props {
        &self.props
    }

    /// A single view property, empty when absent.
    pub fn prop(&self, name: &str) -> &str {
        self.props.get(name).map(String::as_str).unwrap_or("")
    }

    /// The `layout` property, if set and non-empty.
    pub fn layout_name(&self) -> Option<&str> {
        Some(self.prop("layout")).filter(|s| !s.is_empty())
    }

    /// The `url` route pattern of a page, if set and non-empty.
    pub fn url_pattern(&self) -> Option<&str> {
        Some(self.prop("url")).filter(|s| !s.is_empty())
    }

    /// True if the `is_hidden` property is `1`.
    pub fn is_hidden(&self) -> bool {
        self.prop("is_hidden") == "1"
    }

    /// Declared components in declaration order.
    pub fn declared_components(&self) -> &[ComponentDecl] {
        &self.components
    }

    /// The parsed template body.
    pub fn template(&self) -> &Template {
        &self.template
    }

    /// Renders the template body against a scope.
    pub fn render(&self, scope: &mut dyn RenderScope) -> Result<String> {
        self.template.render(scope)
    }
}

/// Splits every `[cfg]...[/cfg]` block out of the source.
fn split_cfg(view: &str, source: &str) -> Result<(String, String)> {
    let mut content = source.to_string();
    let mut cfg = String::new();

    while let Some(start) = content.find(CFG_START) {
        let end = content[start..]
            .find(CFG_END)
            .map(|pos| start + pos)
            .ok_or_else(|| CmsError::template(view, format!("{} not found", CFG_END)))?;

        cfg.push_str(content[start + CFG_START.len()..end].trim());
        cfg.push('\n');
        content = format!("{}{}", &content[..start], &content[end + CFG_END.len()..])
            .trim()
            .to_string();
    }

    Ok((cfg, content))
}

enum CfgLine<'a> {
    Section(&'a str),
    Pair(&'a str, &'a str),
}

fn section(input: &str) -> IResult<&str, CfgLine<'_>> {
    delimited(char('['), take_until("]"), char(']'))
        .map(|name: &str| CfgLine::Section(name.trim()))
        .parse(input)
}

fn pair(input: &str) -> IResult<&str, CfgLine<'_>> {
    separated_pair(is_not("=:"), delimited(space0, alt((char('='), char(':'))), space0), rest)
        .map(|(k, v): (&str, &str)| CfgLine::Pair(k.trim(), unquote(v.trim())))
        .parse(input)
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}

/// Parses the INI content of the configuration block.
fn parse_cfg(view: &str, cfg: &str) -> Result<(Props, Vec<ComponentDecl>)> {
    let mut props = Props::new();
    let mut components: Vec<ComponentDecl> = Vec::new();
    let mut current: Option<usize> = None;

    for (number, line) in cfg.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
            continue;
        }

        let (_, parsed) = all_consuming(alt((section, pair)))
            .parse(line)
            .map_err(|_| CmsError::template(view, format!("invalid cfg line {}: {}", number + 1, line)))?;

        match parsed {
            CfgLine::Section(header) => {
                let (name, alias) = match header.split_once(' ') {
                    Some((name, alias)) => (name.trim(), alias.trim()),
                    None => (header, header),
                };
                let decl = ComponentDecl {
                    name: name.to_string(),
                    alias: alias.to_string(),
                    props: Props::new(),
                };
                // a repeated alias replaces the earlier declaration
                match components.iter().position(|c| c.alias == decl.alias) {
                    Some(index) => {
                        components[index] = decl;
                        current = Some(index);
                    }
                    None => {
                        components.push(decl);
                        current = Some(components.len() - 1);
                    }
                }
            }
            CfgLine::Pair(key, value) => {
                let target = match current {
                    Some(index) => &mut components[index].props,
                    None => &mut props,
                };
                target.insert(key.to_string(), value.to_string());
            }
        }
    }

    Ok((props, components))
}
