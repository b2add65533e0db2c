//! Odap · Wrong-Answer Notebook Backend
//!
//! - Axum HTTP API for logging, listing, and reviewing wrong math answers
//! - Spreadsheet-backed record store reached over HTTP
//! - Optional Gemini image categorization (via environment variables)
//! - Static SPA fallback (./static/index.html)
//!
//! Important env variables:
//!   PORT              : u16 (default 3000)
//!   RECORD_STORE_URL  : endpoint of the record store (reads are empty without it)
//!   GEMINI_API_KEY    : enables image categorization if present
//!   GEMINI_BASE_URL   : default "https://generativelanguage.googleapis.com/v1beta"
//!   GEMINI_MODELS     : comma-separated candidate models, tried in order
//!   APP_CONFIG_PATH   : path to TOML config (prompt + curriculum overrides)
//!   LOG_LEVEL         : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT        : "pretty" (default) or "json"

mod telemetry;
mod util;
mod domain;
mod error;
mod config;
mod curriculum;
mod filter;
mod stats;
mod worksheet;
mod store;
mod gemini;
mod state;
mod protocol;
mod logic;
mod routes;
#[cfg(test)]
mod testutil;

use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::info;

use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  // Build shared application state (store client, Gemini client, prompts, curriculum).
  let state = Arc::new(AppState::new());

  // Build the HTTP router with routes, CORS and tracing layers.
  let app = build_router(state);

  // Read port from env or default to 3000.
  let addr: SocketAddr = std::env::var("PORT")
    .ok()
    .and_then(|p| p.parse::<u16>().ok())
    .map(|port| SocketAddr::from(([0, 0, 0, 0], port)))
    .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

  let listener = TcpListener::bind(addr).await?;
  info!(target: "odap_backend", %addr, "HTTP server listening");
  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await?;
  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    tracing::error!(target: "odap_backend", error = %e, "Failed to listen for shutdown signal");
    return;
  }
  info!(target: "odap_backend", "Shutdown signal received");
}
