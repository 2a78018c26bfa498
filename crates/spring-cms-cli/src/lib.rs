// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

// Warn on missing documentation for public items
#![warn(missing_docs)]

//! Spring CMS CLI library.
//!
//! This crate provides the `spring` binary: an HTTP server that runs every
//! request through the Spring CMS controller, plus a few project commands.
//!
//! # Usage
//!
//! ```bash
//! spring serve            # Serve the active theme
//! spring serve --debug    # Reload on every request, watch theme files
//! spring routes           # List the theme's routes
//! ```
//!
//! # Configuration
//!
//! Projects are configured via `spring.toml` at the project root.

/// CLI commands (serve, routes).
pub mod commands;
/// Project configuration from `spring.toml`.
pub mod config;
/// Plugins bundled with the CLI.
pub mod plugins;
/// HTTP adapter around the controller.
pub mod server;
/// File system watching for theme reloads.
pub mod watcher;
