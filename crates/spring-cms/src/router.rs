// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Pattern-based routing for the Spring CMS engine.
//!
//! Routes are registered by name with a pattern built from the grammar in
//! [`crate::url`]:
//! - `/blog` → literal segments, compared case-insensitively
//! - `/blog/:slug` → required parameter
//! - `/page/:n?` → optional parameter (with optional default `:n?1`)
//! - `/docs/:path*` → wildcard, captures the rest of the path
//! - `/blog/:year|^\d{4}$` → regex constraint
//!
//! The router also works in reverse: [`Router::url`] and [`Router::uri`]
//! generate paths from a route name and parameter values.

use std::collections::HashMap;

use regex::Regex;

use crate::url;

/// Route parameters extracted by a match, keyed by parameter name.
pub type Params = HashMap<String, String>;

/// Value used in generated URLs for a segment that has no value.
pub const FALLBACK_VALUE: &str = "default";

/// A compiled dynamic segment.
#[derive(Debug, Clone)]
pub struct DynamicSegment {
    /// Parameter name
    pub name: String,
    /// `?` modifier present
    pub optional: bool,
    /// `*` modifier present
    pub wildcard: bool,
    /// Default literal for optional segments
    pub default: String,
    /// Constraint applied to the matched value
    pub regex: Option<Regex>,
}

/// One segment of a compiled pattern.
#[derive(Debug, Clone)]
pub enum Segment {
    /// Literal text (e.g. "blog")
    Literal(String),
    /// Parameter descriptor (e.g. ":slug?")
    Dynamic(DynamicSegment),
}

impl Segment {
    /// Compiles a single pattern segment.
    pub fn parse(segment: &str) -> Self {
        if !url::is_dynamic(segment) {
            return Segment::Literal(segment.to_string());
        }
        Segment::Dynamic(DynamicSegment {
            name: url::parameter_name(segment).to_string(),
            optional: url::is_optional(segment),
            wildcard: url::is_wildcard(segment),
            default: url::default_value(segment).to_string(),
            regex: url::segment_regex(segment),
        })
    }

    fn optional(&self) -> bool {
        matches!(self, Segment::Dynamic(d) if d.optional)
    }

    fn wildcard(&self) -> bool {
        matches!(self, Segment::Dynamic(d) if d.wildcard)
    }
}

/// A named, compiled route pattern. Immutable once built.
#[derive(Debug, Clone)]
pub struct Rule {
    /// Route name (the page name for CMS routes)
    pub name: String,
    /// The pattern as registered
    pub pattern: String,
    /// Compiled segments
    pub segments: Vec<Segment>,
    /// Number of literal segments
    pub static_segment_count: usize,
    /// Number of parameter segments
    pub dynamic_segment_count: usize,
    /// Number of wildcard segments
    pub wild_segment_count: usize,
}

impl Rule {
    /// Compiles a pattern into a rule.
    pub fn new(name: impl Into<String>, pattern: impl Into<String>) -> Self {
        let pattern = pattern.into();
        let segments: Vec<Segment> = url::segmentize(&pattern)
            .iter()
            .map(|s| Segment::parse(s))
            .collect();

        let dynamic_segment_count = segments
            .iter()
            .filter(|s| matches!(s, Segment::Dynamic(_)))
            .count();
        let wild_segment_count = segments.iter().filter(|s| s.wildcard()).count();

        Self {
            name: name.into(),
            static_segment_count: segments.len() - dynamic_segment_count,
            dynamic_segment_count,
            wild_segment_count,
            segments,
            pattern,
        }
    }

    /// Tries to match a path, returning the extracted parameters.
    pub fn resolve(&self, path: &str) -> Option<Params> {
        let mut params = Params::new();
        let mut path_segments = url::segmentize(path);
        let mut wild_segments = Vec::new();

        if self.wild_segment_count == 1 {
            (path_segments, wild_segments) = self.capture_wildcard_segments(path_segments);
        }

        if path_segments.len() > self.segments.len() {
            return None;
        }

        for (index, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Literal(literal) => {
                    let value = path_segments.get(index)?;
                    if literal.to_lowercase() != value.to_lowercase() {
                        return None;
                    }
                }
                Segment::Dynamic(dynamic) => {
                    // Optional only if every following segment is optional too.
                    let optional = dynamic.optional
                        && self.segments[index + 1..].iter().all(Segment::optional);

                    let Some(value) = path_segments.get(index) else {
                        if optional {
                            params.insert(dynamic.name.clone(), dynamic.default.clone());
                            continue;
                        }
                        return None;
                    };

                    if let Some(re) = &dynamic.regex {
                        if !re.is_match(value) {
                            return None;
                        }
                    }

                    let value = if dynamic.wildcard && !wild_segments.is_empty() {
                        let mut all = Vec::with_capacity(wild_segments.len() + 1);
                        all.push(value.clone());
                        all.extend(wild_segments.iter().cloned());
                        url::rebuild(&all)
                    } else if dynamic.wildcard {
                        url::rebuild(&[value])
                    } else {
                        value.clone()
                    };

                    params.insert(dynamic.name.clone(), value);
                }
            }
        }

        Some(params)
    }

    /// Splits off the surplus path segments that follow the wildcard position.
    fn capture_wildcard_segments(&self, path_segments: Vec<String>) -> (Vec<String>, Vec<String>) {
        let surplus = path_segments.len().saturating_sub(self.segments.len());
        let mut kept = Vec::with_capacity(path_segments.len());
        let mut wild = Vec::with_capacity(surplus);
        let mut wild_mode = false;
        let mut done = false;

        for (index, segment) in path_segments.into_iter().enumerate() {
            if !done {
                if wild_mode {
                    if wild.len() < surplus {
                        wild.push(segment);
                        continue;
                    }
                    done = true;
                } else if self.segments.get(index).is_some_and(Segment::wildcard) {
                    wild_mode = true;
                }
            }
            kept.push(segment);
        }

        (kept, wild)
    }
}

/// An ordered set of route rules with match state.
///
/// # Example
///
/// ```rust
/// use spring_cms::Router;
///
/// let mut router = Router::new();
/// router.route("blog-post", "/blog/:slug");
/// router.route("home", "/");
/// router.sort();
///
/// assert!(router.match_path("/blog/hello-world"));
/// assert_eq!(router.matched_name(), Some("blog-post"));
/// assert_eq!(router.params().get("slug").map(String::as_str), Some("hello-world"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Router {
    rules: Vec<Rule>,
    matched: Option<usize>,
    params: Params,
}

impl Router {
    /// Creates a new empty router.
    pub fn new() -> Self {
        Self::default()
    }

    /// Compiles a pattern and appends it under the given name.
    ///
    /// Names are not checked for uniqueness; reverse lookups use the first
    /// rule registered under a name.
    pub fn route(&mut self, name: impl Into<String>, pattern: impl Into<String>) {
        self.rules.push(Rule::new(name, pattern));
    }

    /// Orders rules by specificity: more literal segments first, then fewer
    /// parameter segments. Ties keep registration order.
    pub fn sort(&mut self) {
        self.rules.sort_by(|a, b| {
            b.static_segment_count
                .cmp(&a.static_segment_count)
                .then(a.dynamic_segment_count.cmp(&b.dynamic_segment_count))
        });
        self.matched = None;
    }

    /// Matches a path against the rules in order; the first success wins.
    ///
    /// On failure the previous match state is cleared.
    pub fn match_path(&mut self, path: &str) -> bool {
        self.matched = None;
        self.params.clear();

        match self.position(path) {
            Some((index, params)) => {
                self.matched = Some(index);
                self.params = params;
                true
            }
            None => false,
        }
    }

    /// Matches a path without touching the router's match state.
    pub fn find(&self, path: &str) -> Option<(&Rule, Params)> {
        self.position(path)
            .map(|(index, params)| (&self.rules[index], params))
    }

    fn position(&self, path: &str) -> Option<(usize, Params)> {
        let path = url::normalize(path);
        self.rules.iter().enumerate().find_map(|(index, rule)| {
            let params = rule.resolve(&path)?;
            tracing::debug!("Route {} matched {} ({})", rule.name, path, rule.pattern);
            Some((index, params))
        })
    }

    /// Name of the last matched rule.
    pub fn matched_name(&self) -> Option<&str> {
        self.matched
            .and_then(|index| self.rules.get(index))
            .map(|rule| rule.name.as_str())
    }

    /// Parameters produced by the last successful match.
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// All rules in their current order.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    fn find_rule(&self, name: &str) -> Option<&Rule> {
        self.rules.iter().find(|rule| rule.name == name)
    }

    /// Generates a path for the named route from positional values.
    ///
    /// Returns `None` when no rule has that name.
    pub fn uri<S: AsRef<str>>(&self, name: &str, params: &[S]) -> Option<String> {
        self.find_rule(name)
            .map(|rule| self.uri_from_pattern(&rule.pattern, params))
    }

    /// Generates a path from a pattern, consuming values left to right.
    pub fn uri_from_pattern<S: AsRef<str>>(&self, pattern: &str, params: &[S]) -> String {
        let mut values = params.iter().map(AsRef::as_ref);
        from_pattern(pattern, |segment| {
            let value = values.next()?;
            (!value.is_empty() && value != url::default_value(segment)).then(|| value.to_string())
        })
    }

    /// Generates a path for the named route from named values.
    ///
    /// Returns `None` when no rule has that name.
    pub fn url(&self, name: &str, params: &Params) -> Option<String> {
        self.find_rule(name)
            .map(|rule| self.url_from_pattern(&rule.pattern, params))
    }

    /// Generates a path from a pattern and named values.
    ///
    /// Names may be given with a leading `:`.
    pub fn url_from_pattern(&self, pattern: &str, params: &Params) -> String {
        let params: Params = params
            .iter()
            .map(|(k, v)| (k.strip_prefix(':').unwrap_or(k).to_string(), v.clone()))
            .collect();

        from_pattern(pattern, |segment| {
            let value = params.get(url::parameter_name(segment))?;
            (!value.is_empty() && value != url::default_value(segment)).then(|| value.clone())
        })
    }
}

/// Builds a path from a pattern, asking `value_of` for each dynamic segment.
///
/// Literals and required segments count as populated; an optional segment
/// without a value contributes its default (or [`FALLBACK_VALUE`]) but does
/// not. The output is cut after the last populated segment.
fn from_pattern<F>(pattern: &str, mut value_of: F) -> String
where
    F: FnMut(&str) -> Option<String>,
{
    let mut out = Vec::new();
    let mut last_populated = None;

    for (index, segment) in url::segmentize(pattern).iter().enumerate() {
        if url::is_dynamic(segment) {
            if let Some(value) = value_of(segment) {
                out.push(value);
            } else if url::is_optional(segment) {
                let default = url::default_value(segment);
                out.push(if default.is_empty() { FALLBACK_VALUE } else { default }.to_string());
                continue;
            } else {
                out.push(FALLBACK_VALUE.to_string());
            }
        } else {
            out.push(segment.clone());
        }
        last_populated = Some(index);
    }

    out.truncate(last_populated.map_or(0, |index| index + 1));
    url::rebuild(&out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> Params {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_rule_counts() {
        let rule = Rule::new("docs", "/docs/:lang/:path*");
        assert_eq!(rule.static_segment_count, 1);
        assert_eq!(rule.dynamic_segment_count, 2);
        assert_eq!(rule.wild_segment_count, 1);
    }

    #[test]
    fn test_static_match_is_case_insensitive() {
        let mut router = Router::new();
        router.route("about", "/about/team");

        assert!(router.match_path("/About/TEAM"));
        assert!(router.match_path("about/team/"));
        assert!(!router.match_path("/about"));
        assert!(!router.match_path("/about/team/extra"));
    }

    #[test]
    fn test_dynamic_match() {
        let mut router = Router::new();
        router.route("blog-post", "/blog/:slug");

        assert!(router.match_path("/blog/hello-world"));
        assert_eq!(router.matched_name(), Some("blog-post"));
        assert_eq!(router.params(), &params(&[("slug", "hello-world")]));
    }

    #[test]
    fn test_regex_constraint() {
        let mut router = Router::new();
        router.route("archive", "/blog/:year|^\\d{4}$");

        assert!(!router.match_path("/blog/abcd"));
        assert_eq!(router.matched_name(), None);
        assert!(router.params().is_empty());

        assert!(router.match_path("/blog/2024"));
        assert_eq!(router.params().get("year").unwrap(), "2024");
    }

    #[test]
    fn test_wildcard_match() {
        let mut router = Router::new();
        router.route("docs", "/docs/:path*");

        assert!(router.match_path("/docs/a/b/c"));
        assert_eq!(router.params().get("path").unwrap(), "/a/b/c");

        assert!(router.match_path("/docs/a"));
        assert_eq!(router.params().get("path").unwrap(), "/a");
    }

    #[test]
    fn test_wildcard_in_the_middle() {
        let mut router = Router::new();
        router.route("file", "/files/:path*/edit");

        assert!(router.match_path("/files/a/b/edit"));
        assert_eq!(router.params().get("path").unwrap(), "/a/b");
    }

    #[test]
    fn test_optional_segment() {
        let mut router = Router::new();
        router.route("paged", "/page/:n?");

        assert!(router.match_path("/page"));
        assert_eq!(router.params().get("n").unwrap(), "");

        assert!(router.match_path("/page/5"));
        assert_eq!(router.params().get("n").unwrap(), "5");
    }

    #[test]
    fn test_optional_default_value() {
        let mut router = Router::new();
        router.route("paged", "/list/:page?1");

        assert!(router.match_path("/list"));
        assert_eq!(router.params().get("page").unwrap(), "1");
    }

    #[test]
    fn test_optional_followed_by_required_is_required() {
        let mut router = Router::new();
        router.route("odd", "/x/:a?/:b");

        assert!(!router.match_path("/x"));
        assert!(router.match_path("/x/1/2"));
    }

    #[test]
    fn test_sort_prefers_static_segments() {
        let mut router = Router::new();
        router.route("two", "/blog/post/:slug");
        router.route("three", "/blog/post/featured");
        router.sort();

        assert_eq!(router.rules()[0].name, "three");
        assert!(router.match_path("/blog/post/featured"));
        assert_eq!(router.matched_name(), Some("three"));
    }

    #[test]
    fn test_sort_is_stable_for_ties() {
        let mut router = Router::new();
        router.route("first", "/a/:x");
        router.route("second", "/b/:y");
        router.route("third", "/a/:z");
        router.sort();

        let names: Vec<&str> = router.rules().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_match_is_idempotent() {
        let mut router = Router::new();
        router.route("blog-post", "/blog/:slug");

        assert!(router.match_path("/blog/one"));
        let first = router.params().clone();
        assert!(router.match_path("/blog/one"));
        assert_eq!(router.params(), &first);
        assert_eq!(router.matched_name(), Some("blog-post"));
    }

    #[test]
    fn test_find_leaves_match_state_alone() {
        let mut router = Router::new();
        router.route("blog-post", "/blog/:slug");
        router.route("about", "/about");

        assert!(router.match_path("/about"));
        let (rule, params) = router.find("/blog/two").unwrap();
        assert_eq!(rule.name, "blog-post");
        assert_eq!(params.get("slug").map(String::as_str), Some("two"));
        assert_eq!(router.matched_name(), Some("about"));
        assert!(router.find("/nope").is_none());
    }

    #[test]
    fn test_url_generation() {
        let mut router = Router::new();
        router.route("blog", "/blog/:slug?|foo");

        assert_eq!(router.url("blog", &Params::new()).unwrap(), "/blog");
        assert_eq!(
            router.url("blog", &params(&[("slug", "bar")])).unwrap(),
            "/blog/bar"
        );
        assert_eq!(
            router.url("blog", &params(&[(":slug", "bar")])).unwrap(),
            "/blog/bar"
        );
        assert!(router.url("missing", &Params::new()).is_none());
    }

    #[test]
    fn test_url_required_segment_falls_back() {
        let router = Router::new();
        assert_eq!(
            router.url_from_pattern("/blog/:slug/comments", &Params::new()),
            "/blog/default/comments"
        );
    }

    #[test]
    fn test_url_default_value_is_omitted() {
        let router = Router::new();
        let pattern = "/list/:page?1/:sort?";
        assert_eq!(router.url_from_pattern(pattern, &params(&[("page", "1")])), "/list");
        assert_eq!(
            router.url_from_pattern(pattern, &params(&[("sort", "asc")])),
            "/list/1/asc"
        );
    }

    #[test]
    fn test_uri_positional() {
        let mut router = Router::new();
        router.route("post", "/blog/:year/:slug?");

        assert_eq!(router.uri("post", &["2024", "hello"]).unwrap(), "/blog/2024/hello");
        assert_eq!(router.uri("post", &["2024"]).unwrap(), "/blog/2024");
        assert_eq!(router.uri::<&str>("post", &[]).unwrap(), "/blog/default");
    }
}
