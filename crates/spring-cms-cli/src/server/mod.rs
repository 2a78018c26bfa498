// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! HTTP server components.
//!
//! The server is a thin adapter: it converts HTTP requests to `CmsRequest`,
//! runs the controller on a blocking worker and converts the `CmsResponse`
//! back to HTTP.

/// HTTP server implementation using Axum.
pub mod http;
