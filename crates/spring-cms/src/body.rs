// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Request body parsing for form submissions.

use std::collections::HashMap;

/// Form fields keyed by name. Repeated fields keep the last value.
pub type FormData = HashMap<String, String>;

/// Errors that can occur while parsing a request body.
#[derive(Debug, thiserror::Error)]
pub enum BodyParseError {
    #[error("Invalid multipart data: {0}")]
    InvalidMultipart(String),
}

/// Parses the fields of a form body.
///
/// Url-encoded and multipart bodies are understood; anything else (or a
/// malformed multipart body) yields no fields.
pub fn parse_form_body(body: &[u8], content_type: Option<&str>) -> FormData {
    let content_type = content_type.unwrap_or("");

    if content_type.contains("application/x-www-form-urlencoded") {
        return parse_form_urlencoded(body);
    }

    if content_type.contains("multipart/form-data") {
        return parse_multipart_basic(body, content_type).unwrap_or_else(|e| {
            tracing::warn!("Ignoring form body: {}", e);
            FormData::new()
        });
    }

    FormData::new()
}

fn parse_form_urlencoded(bytes: &[u8]) -> FormData {
    form_urlencoded::parse(bytes)
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect()
}

fn parse_multipart_basic(bytes: &[u8], content_type: &str) -> Result<FormData, BodyParseError> {
    let boundary = content_type
        .split(';')
        .find_map(|s| s.trim().strip_prefix("boundary="))
        .ok_or_else(|| BodyParseError::InvalidMultipart("Missing boundary".to_string()))?;

    let delimiter = format!("--{}", boundary.trim_matches('"'));
    let body_str = String::from_utf8_lossy(bytes);
    let mut form_data = FormData::new();

    for part in body_str.split(&delimiter) {
        if part.trim().is_empty() || part.starts_with("--") {
            continue;
        }

        if let Some(idx) = part.find("\r\n\r\n") {
            let headers_str = &part[..idx];
            let content = part[idx + 4..].trim_end_matches("\r\n");

            // file uploads are not form values
            if headers_str.contains("filename=") {
                continue;
            }
            if let Some(name) = extract_form_field_name(headers_str) {
                form_data.insert(name.to_string(), content.to_string());
            }
        }
    }

    Ok(form_data)
}

fn extract_form_field_name(headers: &str) -> Option<&str> {
    headers
        .lines()
        .filter(|line| line.to_lowercase().starts_with("content-disposition:"))
        .find_map(|line| line.split(';').find_map(|s| s.trim().strip_prefix("name=")))
        .map(|name| name.trim_matches('"'))
}
