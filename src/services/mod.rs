//! Service layer
//!
//! Lookup logic shared between the HTTP API and the command-line tools.

pub mod geoip;

pub use geoip::{GeoIpLookup, GeoIpProvider, GeoRecord, MaxMindProvider};
