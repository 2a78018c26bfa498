// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

use std::path::PathBuf;

use serde::Serialize;

use super::Factory;

/// Descriptive metadata of a plugin.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PluginDetails {
    /// Unique plugin code.
    pub code: String,
    /// Human-readable name.
    pub name: String,
    /// Short description.
    pub description: String,
    /// Author.
    pub author: String,
    /// Version string.
    pub version: String,
}

/// A bundle of components.
///
/// The plugin directory holds the default partials of its components under
/// `components/<alias>/<name>.htm`.
pub trait Plugin: Send + Sync {
    /// Metadata of the plugin.
    fn details(&self) -> PluginDetails;

    /// Directory of the plugin's resources.
    fn dir(&self) -> PathBuf;

    /// Component factories keyed by component name.
    fn register_components(&self) -> Vec<(String, Factory)>;
}

/// What the component manager remembers about the plugin owning a
/// component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginInfo {
    /// Plugin metadata.
    pub details: PluginDetails,
    /// Plugin directory.
    pub dir: PathBuf,
}

impl PluginInfo {
    /// Captures the info of a plugin.
    pub fn of(plugin: &dyn Plugin) -> Self {
        Self {
            details: plugin.details(),
            dir: plugin.dir(),
        }
    }
}
