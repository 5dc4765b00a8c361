//! Platform abstraction layer
//!
//! This module hides the differences between Unix/Linux and Windows for the
//! two things the server needs from the operating system:
//! - Listening sockets inherited from the service manager (systemd socket activation)
//! - Termination signals (SIGINT / SIGTERM / SIGQUIT, or Ctrl+C on Windows)
//!
//! # Architecture
//! - `unix.rs`: Unix/Linux implementation
//! - `windows.rs`: Windows implementation

use std::fmt;

#[cfg(unix)]
mod unix;
#[cfg(windows)]
mod windows;

#[cfg(unix)]
pub use unix::*;
#[cfg(windows)]
pub use windows::*;

/// 收到的终止信号
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationSignal {
    Interrupt,
    Terminate,
    Quit,
}

impl fmt::Display for TerminationSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TerminationSignal::Interrupt => write!(f, "SIGINT"),
            TerminationSignal::Terminate => write!(f, "SIGTERM"),
            TerminationSignal::Quit => write!(f, "SIGQUIT"),
        }
    }
}

/// Get the platform name for logging/debugging
pub fn platform_name() -> &'static str {
    #[cfg(unix)]
    return "Unix/Linux";
    #[cfg(windows)]
    return "Windows";
}
