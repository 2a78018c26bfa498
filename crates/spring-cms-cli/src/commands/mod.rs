// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! CLI command implementations.
//!
//! - `serve`: Run the HTTP server for the active theme
//! - `routes`: Print the route table of the active theme

/// Route listing command.
pub mod routes;
/// Server command.
pub mod serve;
