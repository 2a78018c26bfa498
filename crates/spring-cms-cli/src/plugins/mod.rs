// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Plugins compiled into the CLI.

use std::path::Path;

use spring_cms::Plugin;

use crate::config::Config;

/// The demo plugin with its `todo` component.
pub mod demo;

/// Every bundled plugin, with resources under `<plugins_path>/<code>`.
pub fn builtin(config: &Config, root: &Path) -> Vec<Box<dyn Plugin>> {
    vec![Box::new(demo::DemoPlugin::new(
        config.plugin_dir(root, demo::PLUGIN_CODE),
    ))]
}
