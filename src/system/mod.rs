//! System-level modules
//!
//! - Logging initialization
//! - Panic handling
//! - Platform abstraction (socket activation, termination signals)

pub mod logging;
pub mod panic_handler;
pub mod platform;
