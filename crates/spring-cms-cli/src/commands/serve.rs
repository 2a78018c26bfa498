// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Server command.
//!
//! Serves the active theme from `spring.toml` in the current directory.
//! In debug mode the theme and plugin directories are watched and the page
//! catalog is reloaded when a view changes.

use std::path::PathBuf;
use std::sync::Arc;

use console::style;

use crate::config::Config;
use crate::server::http::{create_app, AppState};
use crate::watcher::FileWatcher;

/// Runs the server until interrupted.
///
/// `host`, `port` and `debug` override the values from `spring.toml`.
pub async fn run(host: Option<String>, port: Option<u16>, debug: bool) -> anyhow::Result<()> {
    let mut config = Config::load()?;
    if debug {
        config.app.debug = true;
    }
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    let working_dir = std::env::current_dir()?;
    let watch_dirs: Vec<PathBuf> = vec![
        config.themes_dir(&working_dir).join(&config.cms.active_theme),
        working_dir.join(&config.cms.plugins_path),
    ];

    let state = Arc::new(AppState::from_config(config.clone(), &working_dir)?);

    println!(
        "{} {}",
        style(&config.app.name).bold(),
        style(format!("v{}", env!("CARGO_PKG_VERSION"))).dim()
    );
    println!(
        "{} {}",
        style("Theme:").cyan(),
        style(&config.cms.active_theme).dim()
    );

    // Keeps the watcher alive for the lifetime of the server.
    let _watcher = if config.app.debug {
        let catalog = Arc::clone(state.catalog());
        let watcher = FileWatcher::new(&watch_dirs, working_dir.clone(), move |paths| {
            let display = paths
                .iter()
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(", ");
            catalog.reload();
            println!(
                "{} {}",
                style("✓").green(),
                style(format!("reloaded {}", display)).dim()
            );
        })?;
        println!(
            "{} {}",
            style("Status:").cyan(),
            style("Debug mode, watching for changes...").dim()
        );
        Some(watcher)
    } else {
        None
    };

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    println!(
        "{} {}",
        style("Server:").cyan(),
        style(format!("http://{}", addr)).green().bold()
    );
    println!();

    tracing::info!("Listening on {}", addr);
    axum::serve(listener, create_app(state)).await?;

    Ok(())
}
