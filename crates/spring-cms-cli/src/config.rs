// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Spring CMS project configuration.
//!
//! Configuration is loaded from `spring.toml` at the project root. Every
//! section and key is optional.
//!
//! # Example Configuration
//!
//! ```toml
//! [app]
//! name = "My Site"
//! debug = false
//!
//! [server]
//! host = "127.0.0.1"
//! port = 3000
//!
//! [cms]
//! themes_path = "themes"
//! active_theme = "demo"
//! plugins_path = "plugins"
//! default_layout = "default"
//! ```

use serde::Deserialize;
use spring_cms::ControllerOptions;
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the configuration file.
pub const CONFIG_FILE: &str = "spring.toml";

/// Main configuration structure loaded from `spring.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Application settings.
    #[serde(default)]
    pub app: AppConfig,
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Theme and plugin settings.
    #[serde(default)]
    pub cms: CmsConfig,
}

/// Application settings.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Site name (default: "Spring CMS").
    #[serde(default = "default_app_name")]
    pub name: String,
    /// Reload the theme and router on every request (default: false).
    #[serde(default)]
    pub debug: bool,
}

/// HTTP server settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Server host (default: "127.0.0.1").
    #[serde(default = "default_host")]
    pub host: String,
    /// Server port (default: 3000).
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Theme and plugin settings.
#[derive(Debug, Clone, Deserialize)]
pub struct CmsConfig {
    /// Directory holding the themes (default: "themes").
    #[serde(default = "default_themes_path")]
    pub themes_path: String,
    /// Theme served by the site (default: "demo").
    #[serde(default = "default_active_theme")]
    pub active_theme: String,
    /// Directory holding plugin resources (default: "plugins").
    #[serde(default = "default_plugins_path")]
    pub plugins_path: String,
    /// Layout for pages that do not name one (default: "default").
    #[serde(default = "default_layout")]
    pub default_layout: String,
}

fn default_app_name() -> String {
    "Spring CMS".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_themes_path() -> String {
    "themes".to_string()
}

fn default_active_theme() -> String {
    "demo".to_string()
}

fn default_plugins_path() -> String {
    "plugins".to_string()
}

fn default_layout() -> String {
    "default".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: default_app_name(),
            debug: false,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for CmsConfig {
    fn default() -> Self {
        Self {
            themes_path: default_themes_path(),
            active_theme: default_active_theme(),
            plugins_path: default_plugins_path(),
            default_layout: default_layout(),
        }
    }
}

impl Config {
    /// Loads configuration from `spring.toml` in the current directory.
    ///
    /// If no configuration file exists, returns default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file exists but cannot be parsed.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(Path::new(CONFIG_FILE))
    }

    /// Loads configuration from the given file, defaulting when it is missing.
    pub fn load_from(config_path: &Path) -> anyhow::Result<Self> {
        if !config_path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(config_path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Directory holding the themes, relative to `root`.
    pub fn themes_dir(&self, root: &Path) -> PathBuf {
        root.join(&self.cms.themes_path)
    }

    /// Directory of a bundled plugin, relative to `root`.
    pub fn plugin_dir(&self, root: &Path, code: &str) -> PathBuf {
        root.join(&self.cms.plugins_path).join(code)
    }

    /// Public URL prefix of the active theme's assets.
    pub fn assets_url(&self) -> String {
        format!("/themes/{}/assets", self.cms.active_theme)
    }

    /// Controller settings derived from the configuration.
    pub fn controller_options(&self) -> ControllerOptions {
        ControllerOptions {
            debug: self.app.debug,
            default_layout: self.cms.default_layout.clone(),
        }
    }
}
