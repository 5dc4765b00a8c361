//! Mode routing
//!
//! - Server mode (HTTP server, always built, default command)
//! - CLI mode (one-off lookups and config generation)

pub mod server;

#[cfg(feature = "cli")]
pub mod cli;

pub use server::run_server;

#[cfg(feature = "cli")]
pub use cli::{config_generate, run_lookup};
