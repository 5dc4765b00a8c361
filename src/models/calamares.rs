//! Calamares locale module format
//!
//! ```json
//! {"time_zone":"Europe/Vienna"}
//! ```

use serde::{Deserialize, Serialize};

use crate::services::GeoRecord;

/// Calamares-style geoip data (time zone only)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalamaresGeoIP {
    pub time_zone: String,
}

impl CalamaresGeoIP {
    pub fn from_record(record: &GeoRecord) -> Self {
        Self {
            time_zone: record.location.time_zone.clone(),
        }
    }
}

impl From<&GeoRecord> for CalamaresGeoIP {
    fn from(record: &GeoRecord) -> Self {
        Self::from_record(record)
    }
}
