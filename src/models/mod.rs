//! Response models
//!
//! Pure projections of a [`GeoRecord`](crate::services::GeoRecord) into the
//! two legacy wire formats.

pub mod calamares;
pub mod ubiquity;

pub use calamares::CalamaresGeoIP;
pub use ubiquity::UbiquityGeoIP;
