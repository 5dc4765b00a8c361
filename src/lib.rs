//! geoserve - GeoIP lookup service for installer timezone detection
//!
//! Answers "where is this client?" from a local MaxMind GeoLite2 City
//! database, in the two wire formats installers expect:
//! - Calamares: `GET /v1/calamares` -> `{"time_zone":"Europe/Vienna"}`
//! - Ubiquity: `GET /v1/ubiquity` -> `<Response>...</Response>` (geoip.ubuntu.com/lookup compatible)
//!
//! # Features
//! - **cli** (default): `lookup` and `config generate` commands
//!
//! The HTTP server is always built and is the default command.
//!
//! # Architecture
//! - `services`: GeoIP database access
//! - `models`: response formats and record mapping
//! - `api`: HTTP services and middleware
//! - `config`: Configuration management
//! - `runtime`: Application lifecycle and execution modes
//! - `system`: Logging, panic handling and platform abstraction

pub mod api;
pub mod cli;
pub mod config;
pub mod errors;
pub mod models;
pub mod runtime;
pub mod services;
pub mod system;
pub mod utils;
