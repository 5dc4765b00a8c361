//! Startup preparation and shutdown coordination for server mode

pub mod shutdown;
pub mod startup;
