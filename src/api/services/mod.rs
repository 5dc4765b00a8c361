pub mod docs;
pub mod geoip;
pub mod health;

pub use docs::{DocsService, docs_routes};
pub use geoip::{GeoIpService, geoip_routes};
pub use health::{HealthService, health_routes};
