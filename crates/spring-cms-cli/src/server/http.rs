// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! HTTP adapter around the Spring CMS controller.
//!
//! Theme assets are served as static files from
//! `/themes/<theme>/assets`; every other path goes through the controller.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Request, State},
    http::{header, Method, StatusCode},
    response::{IntoResponse, Response},
    Router,
};
use serde_json::json;
use spring_cms::response::ERROR_HTML;
use spring_cms::{
    CatalogState, CmsRequest, CmsResponse, ComponentManager, Controller, FileSystemTheme,
};
use tower_http::services::ServeDir;

use crate::config::Config;
use crate::plugins;

const MAX_BODY_SIZE: usize = 1024 * 1024;

/// Shared application state for the server.
pub struct AppState {
    /// The request controller.
    pub controller: Controller,
    /// Application configuration.
    pub config: Config,
    /// Directory of the active theme's static assets.
    pub assets_dir: PathBuf,
}

impl AppState {
    /// Builds the theme, registers the bundled plugins and creates the
    /// controller for the project at `root`.
    ///
    /// # Errors
    ///
    /// Returns an error if the active theme directory does not exist.
    pub fn from_config(config: Config, root: &Path) -> anyhow::Result<Self> {
        let theme = FileSystemTheme::new(config.themes_dir(root), &config.cms.active_theme);
        theme.validate()?;
        let assets_dir = theme.assets_dir();

        let manager = ComponentManager::new();
        let bundled = plugins::builtin(&config, root);
        manager.load(bundled.iter().map(|plugin| plugin.as_ref()));

        let catalog = CatalogState::new(Arc::new(theme));
        let controller = Controller::new(
            Arc::new(catalog),
            Arc::new(manager),
            config.controller_options(),
        );

        Ok(Self {
            controller,
            config,
            assets_dir,
        })
    }

    /// The page catalog, for reloading on file changes.
    pub fn catalog(&self) -> &Arc<CatalogState> {
        self.controller.catalog()
    }
}

/// Creates the Axum router for the application.
pub fn create_app(state: Arc<AppState>) -> Router {
    let assets_url = state.config.assets_url();
    let assets = ServeDir::new(&state.assets_dir);

    Router::new()
        .nest_service(&assets_url, assets)
        .fallback(fallback_handler)
        .with_state(state)
}

async fn fallback_handler(State(state): State<Arc<AppState>>, request: Request<Body>) -> Response {
    let cms_request = match to_cms_request(request).await {
        Ok(request) => request,
        Err(response) => return response,
    };

    let worker_state = Arc::clone(&state);
    let result =
        tokio::task::spawn_blocking(move || worker_state.controller.handle(&cms_request)).await;

    match result {
        Ok(response) => cms_response_to_http(response),
        Err(e) => {
            tracing::error!("Request worker failed: {}", e);
            html_response(StatusCode::INTERNAL_SERVER_ERROR, ERROR_HTML.to_string())
        }
    }
}

async fn to_cms_request(request: Request<Body>) -> Result<CmsRequest, Response> {
    let (parts, body) = request.into_parts();
    let path = parts.uri.path().to_string();

    let query: HashMap<String, String> =
        form_urlencoded::parse(parts.uri.query().unwrap_or_default().as_bytes())
            .into_owned()
            .collect();

    let headers: HashMap<String, String> = parts
        .headers
        .iter()
        .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.to_string(), v.to_string())))
        .collect();

    let mut cms_request = CmsRequest::new(path, parts.method.as_str())
        .with_query(query)
        .with_headers(headers);

    if parts.method != Method::GET && parts.method != Method::HEAD {
        match axum::body::to_bytes(body, MAX_BODY_SIZE).await {
            Ok(bytes) if !bytes.is_empty() => cms_request = cms_request.with_body(bytes.to_vec()),
            Ok(_) => {}
            Err(_) => return Err((StatusCode::BAD_REQUEST, "Body too large").into_response()),
        }
    }

    Ok(cms_request)
}

/// Converts a controller response to an HTTP response.
pub fn cms_response_to_http(response: CmsResponse) -> Response {
    match response {
        CmsResponse::Html {
            status,
            headers,
            body,
        } => build_response(status, headers, "text/html; charset=utf-8", body),
        CmsResponse::Json {
            status,
            headers,
            body,
        } => build_response(status, headers, "application/json", body.to_string()),
        CmsResponse::Error { status, message } => build_response(
            status,
            HashMap::new(),
            "application/json",
            json!({ "message": message }).to_string(),
        ),
    }
}

fn build_response(
    status: u16,
    headers: HashMap<String, String>,
    content_type: &str,
    body: String,
) -> Response {
    let status_code = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let has_content_type = headers
        .keys()
        .any(|key| key.eq_ignore_ascii_case(header::CONTENT_TYPE.as_str()));

    let mut builder = Response::builder().status(status_code);
    for (key, value) in headers {
        builder = builder.header(key, value);
    }
    if !has_content_type {
        builder = builder.header(header::CONTENT_TYPE, content_type);
    }

    builder.body(Body::from(body)).unwrap_or_else(|e| {
        tracing::error!("Failed to build response: {}", e);
        (StatusCode::INTERNAL_SERVER_ERROR, "Failed to build response").into_response()
    })
}

fn html_response(status: StatusCode, body: String) -> Response {
    build_response(status.as_u16(), HashMap::new(), "text/html; charset=utf-8", body)
}
