// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! URL grammar for route patterns.
//!
//! Patterns are `/`-separated segment lists. A segment starting with `:` is
//! dynamic and may carry modifiers after its parameter name:
//!
//! - `:name?default` → optional, with an optional default literal
//! - `:name*` → wildcard, swallows surplus path segments
//! - `:name|^\d+$` → regex constraint on the matched value
//!
//! Modifiers combine, e.g. `:page?1|^[0-9]+$` or `:path?index*`.

use regex::Regex;

/// Trims slashes from both ends and re-adds exactly one leading slash.
pub fn normalize(path: &str) -> String {
    format!("/{}", path.trim_matches('/'))
}

/// Splits a path into its non-empty segments.
pub fn segmentize(path: &str) -> Vec<String> {
    normalize(path)
        .split('/')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Joins segments back into a normalized path, skipping empty ones.
pub fn rebuild<S: AsRef<str>>(segments: &[S]) -> String {
    let mut path = String::new();
    for segment in segments.iter().map(AsRef::as_ref) {
        if !segment.is_empty() {
            path.push('/');
            path.push_str(segment);
        }
    }
    normalize(&path)
}

/// Returns true for segments that start with `:`.
pub fn is_dynamic(segment: &str) -> bool {
    segment.starts_with(':')
}

/// Byte position of the regex marker, if any.
fn regex_marker(segment: &str) -> Option<usize> {
    segment.find('|')
}

/// Returns true when a `*` appears before any `|`.
///
/// A `*` inside the regex part is regex syntax, not the wildcard modifier.
pub fn is_wildcard(segment: &str) -> bool {
    if !is_dynamic(segment) {
        return false;
    }
    let head = match regex_marker(segment) {
        Some(pos) => &segment[..pos],
        None => segment,
    };
    head.contains('*')
}

/// Returns true when a `?` appears before any `|`.
pub fn is_optional(segment: &str) -> bool {
    if !is_dynamic(segment) {
        return false;
    }
    match (segment.find('?'), regex_marker(segment)) {
        (Some(opt), Some(re)) => opt < re,
        (Some(_), None) => true,
        _ => false,
    }
}

/// The parameter name: text after `:` up to the first `?`, `*` or `|`.
pub fn parameter_name(segment: &str) -> &str {
    let name = segment.strip_prefix(':').unwrap_or(segment);
    match name.find(['?', '*', '|']) {
        Some(end) => &name[..end],
        None => name,
    }
}

/// The default literal of an optional segment.
///
/// Runs from after `?` to the first `*` or `|`; empty when the segment is not
/// optional.
pub fn default_value(segment: &str) -> &str {
    if !is_optional(segment) {
        return "";
    }
    let Some(start) = segment.find('?') else {
        return "";
    };
    let value = &segment[start + 1..];
    match value.find(['*', '|']) {
        Some(end) => &value[..end],
        None => value,
    }
}

/// Compiles the regex constraint of a segment.
///
/// A constraint that fails to compile is treated as absent.
pub fn segment_regex(segment: &str) -> Option<Regex> {
    let pos = regex_marker(segment)?;
    match Regex::new(&segment[pos + 1..]) {
        Ok(re) => Some(re),
        Err(e) => {
            tracing::warn!("Ignoring invalid route constraint in {}: {}", segment, e);
            None
        }
    }
}
