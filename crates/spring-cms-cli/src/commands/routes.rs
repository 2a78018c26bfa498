// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Routes command: prints the page routes of the active theme in match
//! order.

use console::style;

use crate::config::Config;
use crate::server::http::AppState;

/// Prints every routed page with its URL pattern.
pub fn run() -> anyhow::Result<()> {
    let config = Config::load()?;
    let working_dir = std::env::current_dir()?;
    let state = AppState::from_config(config, &working_dir)?;

    let rules: Vec<(String, String)> = state.catalog().with_router(|router| {
        router
            .rules()
            .iter()
            .map(|rule| (rule.name.clone(), rule.pattern.clone()))
            .collect()
    });

    if rules.is_empty() {
        println!("{}", style("No routed pages").yellow());
        return Ok(());
    }

    let width = rules.iter().map(|(name, _)| name.len()).max().unwrap_or(0);
    for (name, pattern) in rules {
        println!(
            "  {}  {}",
            style(format!("{:<width$}", name, width = width)).cyan(),
            pattern
        );
    }

    Ok(())
}
