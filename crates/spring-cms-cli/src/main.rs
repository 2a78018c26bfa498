// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

use clap::{Parser, Subcommand};
use spring_cms_cli::commands;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "spring")]
#[command(author = "Maravilla Labs")]
#[command(version)]
#[command(about = "Theme-based CMS server", long_about = None)]
struct Cli {
    /// Log level: error, warn, info, debug, trace
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the active theme
    Serve {
        /// Port to run the server on (overrides spring.toml)
        #[arg(short, long)]
        port: Option<u16>,
        /// Host to bind to (overrides spring.toml)
        #[arg(long)]
        host: Option<String>,
        /// Reload the theme on every request and watch it for changes
        #[arg(long)]
        debug: bool,
    },
    /// List the routes of the active theme
    Routes,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with the specified log level
    let filter = EnvFilter::try_new(&cli.log_level).unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Serve { port, host, debug } => commands::serve::run(host, port, debug).await,
        Commands::Routes => commands::routes::run(),
    }
}
