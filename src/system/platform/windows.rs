//! Windows platform implementation
//!
//! Socket activation does not exist here; only Ctrl+C is observed.

use std::net::TcpListener;

use tracing::warn;

use super::TerminationSignal;

/// Always empty on Windows.
pub fn take_activated_listeners() -> std::io::Result<Vec<TcpListener>> {
    Ok(Vec::new())
}

/// Wait for Ctrl+C.
pub async fn wait_for_termination() -> TerminationSignal {
    match tokio::signal::ctrl_c().await {
        Ok(()) => TerminationSignal::Interrupt,
        Err(e) => {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending().await
        }
    }
}
