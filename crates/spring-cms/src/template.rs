// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! The template language used by theme views.
//!
//! A template is literal text interleaved with `{{ ... }}` tags:
//!
//! | Tag | Output |
//! |-----|--------|
//! | `{{ page }}` | the rendered page, inside a layout |
//! | `{{ partial "name" key="v" other=param.x }}` | a rendered partial |
//! | `{{ component "alias" key="v" }}` | a rendered component |
//! | `{{ page_url "page" slug="x" }}` | a reverse-routed URL |
//! | `{{ assets "css/site.css" }}` | a theme asset URL |
//! | `{{ is_page "home" }}` | `true` or `false` |
//! | `{{ styles }}` | `<link>` tags for stylesheets registered by components |
//! | `{{ scripts }}` | `<script>` tags for scripts registered by components |
//! | `{{ scope.key }}` | a looked-up value, HTML-escaped |
//!
//! Lookup scopes are `param`, `route`, `this`, `page`, `layout` or the alias
//! of a component in scope. Tag output that is itself markup (`page`,
//! `partial`, `component`, `styles`, `scripts`) is not escaped.
//!
//! Templates are parsed once with the pest grammar in `template.pest` and
//! rendered against a [`RenderScope`], which the controller implements.

use pest::iterators::Pair;
use pest::Parser;

use crate::error::{CmsError, Result};
use crate::router::Params;

mod grammar {
    use pest_derive::Parser;

    #[derive(Parser)]
    #[grammar = "template.pest"]
    pub struct TemplateParser;
}

use grammar::{Rule, TemplateParser};

/// A `scope.key` value reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lookup {
    /// Scope name (`param`, `route`, `this`, `page`, `layout`, or an alias)
    pub scope: String,
    /// Key within the scope
    pub key: String,
}

/// A tag argument value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// A quoted string literal.
    Literal(String),
    /// A value looked up at render time.
    Lookup(Lookup),
}

/// A `key=value` tag argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Arg {
    /// Argument name
    pub name: String,
    /// Argument value
    pub value: Expr,
}

/// Template AST nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Literal text, emitted as-is.
    Text(String),
    /// `{{ page }}`
    Page,
    /// `{{ partial "name" ... }}`
    Partial {
        /// Partial name, `alias::name` for a component partial
        name: String,
        /// Call-site parameters
        args: Vec<Arg>,
    },
    /// `{{ component "alias" ... }}`
    Component {
        /// Component alias
        name: String,
        /// Property overrides
        args: Vec<Arg>,
    },
    /// `{{ page_url "page" ... }}`
    PageUrl {
        /// Page name
        name: String,
        /// Route parameters
        args: Vec<Arg>,
    },
    /// `{{ assets "path" }}`
    Assets(String),
    /// `{{ is_page "name" }}`
    IsPage(String),
    /// `{{ styles }}`
    Styles,
    /// `{{ scripts }}`
    Scripts,
    /// `{{ scope.key }}`
    Value(Lookup),
}

/// What a template needs from its surroundings while rendering.
///
/// Partial and component rendering never fail from the template's point of
/// view: a failing partial renders as empty text and the scope logs why.
pub trait RenderScope {
    /// The rendered page body (only meaningful inside a layout).
    fn page_contents(&self) -> String;

    /// Renders a partial with call-site parameters.
    fn render_partial(&mut self, name: &str, params: Vec<(String, String)>) -> String;

    /// Renders a component in scope with property overrides.
    fn render_component(&mut self, name: &str, params: Vec<(String, String)>) -> String;

    /// Reverse-routes a page name to a URL.
    fn page_url(&self, name: &str, params: &Params) -> String;

    /// True if `name` is the page being rendered.
    fn is_page(&self, name: &str) -> bool;

    /// URL of a theme asset.
    fn assets(&self, path: &str) -> String;

    /// Stylesheet tags registered by the layout and page components.
    fn styles(&self) -> String;

    /// Script tags registered by the layout and page components.
    fn scripts(&self) -> String;

    /// Resolves a `scope.key` reference.
    fn lookup(&self, scope: &str, key: &str) -> Option<String>;
}

/// A parsed template.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Template {
    nodes: Vec<Node>,
}

impl Template {
    /// Parses template source. `view` names the source in error messages.
    pub fn parse(view: &str, source: &str) -> Result<Self> {
        let mut pairs = TemplateParser::parse(Rule::template, source)
            .map_err(|e| CmsError::template(view, e.to_string()))?;

        let mut nodes = Vec::new();
        if let Some(template) = pairs.next() {
            for pair in template.into_inner() {
                match pair.as_rule() {
                    Rule::text => nodes.push(Node::Text(pair.as_str().to_string())),
                    Rule::tag => {
                        if let Some(directive) = pair.into_inner().next() {
                            nodes.push(build_tag(directive));
                        }
                    }
                    _ => {}
                }
            }
        }

        Ok(Self { nodes })
    }

    /// The parsed nodes.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Renders the template against a scope.
    pub fn render(&self, scope: &mut dyn RenderScope) -> Result<String> {
        let mut out = String::new();

        for node in &self.nodes {
            match node {
                Node::Text(text) => out.push_str(text),
                Node::Page => out.push_str(&scope.page_contents()),
                Node::Partial { name, args } => {
                    let params = eval_args(&*scope, args);
                    out.push_str(&scope.render_partial(name, params));
                }
                Node::Component { name, args } => {
                    let params = eval_args(&*scope, args);
                    out.push_str(&scope.render_component(name, params));
                }
                Node::PageUrl { name, args } => {
                    let params: Params = eval_args(&*scope, args).into_iter().collect();
                    out.push_str(&escape_html(&scope.page_url(name, &params)));
                }
                Node::Assets(path) => out.push_str(&escape_html(&scope.assets(path))),
                Node::IsPage(name) => out.push_str(if scope.is_page(name) { "true" } else { "false" }),
                Node::Styles => out.push_str(&scope.styles()),
                Node::Scripts => out.push_str(&scope.scripts()),
                Node::Value(lookup) => {
                    let value = scope.lookup(&lookup.scope, &lookup.key).unwrap_or_default();
                    out.push_str(&escape_html(&value));
                }
            }
        }

        Ok(out)
    }
}

fn eval_args(scope: &dyn RenderScope, args: &[Arg]) -> Vec<(String, String)> {
    args.iter()
        .map(|arg| {
            let value = match &arg.value {
                Expr::Literal(s) => s.clone(),
                Expr::Lookup(l) => scope.lookup(&l.scope, &l.key).unwrap_or_default(),
            };
            (arg.name.clone(), value)
        })
        .collect()
}

fn build_tag(pair: Pair<'_, Rule>) -> Node {
    let rule = pair.as_rule();

    if rule == Rule::lookup {
        return Node::Value(build_lookup(pair));
    }
    match rule {
        Rule::page_tag => return Node::Page,
        Rule::styles_tag => return Node::Styles,
        Rule::scripts_tag => return Node::Scripts,
        _ => {}
    }

    let mut inner = pair.into_inner();
    let name = inner.next().map(unquote).unwrap_or_default();
    let args: Vec<Arg> = inner.filter(|p| p.as_rule() == Rule::arg).map(build_arg).collect();

    match rule {
        Rule::partial_tag => Node::Partial { name, args },
        Rule::component_tag => Node::Component { name, args },
        Rule::page_url_tag => Node::PageUrl { name, args },
        Rule::assets_tag => Node::Assets(name),
        _ => Node::IsPage(name),
    }
}

fn build_arg(pair: Pair<'_, Rule>) -> Arg {
    let mut inner = pair.into_inner();
    let name = inner.next().map(|p| p.as_str().to_string()).unwrap_or_default();
    let value = match inner.next() {
        Some(p) if p.as_rule() == Rule::lookup => Expr::Lookup(build_lookup(p)),
        Some(p) => Expr::Literal(unquote(p)),
        None => Expr::Literal(String::new()),
    };
    Arg { name, value }
}

fn build_lookup(pair: Pair<'_, Rule>) -> Lookup {
    let mut inner = pair.into_inner();
    let scope = inner.next().map(|p| p.as_str().to_string()).unwrap_or_default();
    let key = inner.next().map(|p| p.as_str().to_string()).unwrap_or_default();
    Lookup { scope, key }
}

fn unquote(pair: Pair<'_, Rule>) -> String {
    let raw = pair.into_inner().next().map(|p| p.as_str()).unwrap_or("");
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some(other) => out.push(other),
            None => {}
        }
    }
    out
}

/// Escapes text for inclusion in HTML.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
