//! blastkb-server: HTTP API and command-line front end for blastkb.
//!
//! Retrieval, calculators, and message routing live in `blastkb-core`.

/// REST API layer: Axum router, HTTP handlers, models, metrics.
pub mod api;
/// Command-line arguments and the interactive chat loop.
pub mod cli;
