//! Ubiquity format (compatible with geoip.ubuntu.com/lookup)
//!
//! ```xml
//! <Response>
//!   <Ip>193.81.57.56</Ip>
//!   <Status>OK</Status>
//!   <CountryCode>AT</CountryCode>
//!   <CountryCode3/>
//!   <CountryName>Austria</CountryName>
//!   <RegionCode>4</RegionCode>
//!   <RegionName>Upper Austria</RegionName>
//!   <City>Gmunden</City>
//!   <ZipPostalCode>4810</ZipPostalCode>
//!   <Latitude>47.9022</Latitude>
//!   <Longitude>13.7642</Longitude>
//!   <AreaCode>0</AreaCode>
//!   <TimeZone>Europe/Vienna</TimeZone>
//! </Response>
//! ```
//!
//! Field order is part of the wire format and follows declaration order.

use serde::{Deserialize, Serialize};

use crate::errors::{GeoserveError, Result};
use crate::services::GeoRecord;
use crate::services::geoip::localized_name;

const STATUS_OK: &str = "OK";

/// Ubiquity-style geoip data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename = "Response", rename_all = "PascalCase")]
pub struct UbiquityGeoIP {
    pub ip: String,
    pub status: String,
    pub country_code: String,
    /// 第三方格式保留字段，始终为空
    pub country_code3: String,
    pub country_name: String,
    pub region_code: String,
    pub region_name: String,
    pub city: String,
    pub zip_postal_code: String,
    pub latitude: f64,
    pub longitude: f64,
    pub area_code: u32,
    pub time_zone: String,
}

impl UbiquityGeoIP {
    /// Build the ubiquity entity for `ip` from a database record.
    ///
    /// Region fields come from the first subdivision only.
    pub fn from_record(ip: &str, record: &GeoRecord) -> Self {
        let (region_code, region_name) = record
            .subdivisions
            .first()
            .map(|sub| (sub.iso_code.clone(), localized_name(&sub.names)))
            .unwrap_or_default();

        Self {
            ip: ip.to_string(),
            status: STATUS_OK.to_string(),
            country_code: record.country.iso_code.clone(),
            country_code3: String::new(),
            country_name: localized_name(&record.country.names),
            region_code,
            region_name,
            city: localized_name(&record.city.names),
            zip_postal_code: record.postal.code.clone(),
            latitude: record.location.latitude,
            longitude: record.location.longitude,
            area_code: record.location.metro_code,
            time_zone: record.location.time_zone.clone(),
        }
    }

    /// Serialize to the `<Response>` document (no XML declaration).
    pub fn to_xml(&self) -> Result<String> {
        quick_xml::se::to_string(self).map_err(|e| GeoserveError::serialization(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::geoip::{Names, Subdivision};

    fn names(en: &str) -> Names {
        let mut names = Names::new();
        names.insert("en".to_string(), en.to_string());
        names.insert("fr".to_string(), format!("{} (fr)", en));
        names
    }

    fn london() -> GeoRecord {
        let mut record = GeoRecord::default();
        record.country.iso_code = "GB".to_string();
        record.country.names = names("United Kingdom");
        record.city.names = names("London");
        record.postal.code = "EC2V".to_string();
        record.location.latitude = 51.5142;
        record.location.longitude = -0.0931;
        record.location.time_zone = "Europe/London".to_string();
        record.subdivisions = vec![
            Subdivision {
                iso_code: "ENG".to_string(),
                names: names("England"),
            },
            Subdivision {
                iso_code: "LND".to_string(),
                names: names("City of London"),
            },
        ];
        record
    }

    #[test]
    fn test_field_mapping() {
        let data = UbiquityGeoIP::from_record("91.189.93.5", &london());

        assert_eq!(data.ip, "91.189.93.5");
        assert_eq!(data.status, "OK");
        assert_eq!(data.country_code, "GB");
        assert_eq!(data.country_code3, "");
        assert_eq!(data.country_name, "United Kingdom");
        assert_eq!(data.city, "London");
        assert_eq!(data.zip_postal_code, "EC2V");
        assert_eq!(data.latitude, 51.5142);
        assert_eq!(data.longitude, -0.0931);
        assert_eq!(data.area_code, 0);
        assert_eq!(data.time_zone, "Europe/London");
    }

    #[test]
    fn test_first_subdivision_wins() {
        let data = UbiquityGeoIP::from_record("91.189.93.5", &london());
        assert_eq!(data.region_code, "ENG");
        assert_eq!(data.region_name, "England");
    }

    #[test]
    fn test_no_subdivisions_leaves_region_empty() {
        let mut record = london();
        record.subdivisions.clear();

        let data = UbiquityGeoIP::from_record("91.189.93.5", &record);
        assert_eq!(data.region_code, "");
        assert_eq!(data.region_name, "");
    }

    #[test]
    fn test_missing_english_name_is_empty() {
        let mut record = london();
        record.city.names.remove("en");
        record.subdivisions[0].names.remove("en");

        let data = UbiquityGeoIP::from_record("91.189.93.5", &record);
        assert_eq!(data.city, "");
        assert_eq!(data.region_name, "");
        assert_eq!(data.region_code, "ENG");
    }

    #[test]
    fn test_empty_record() {
        let data = UbiquityGeoIP::from_record("2001:db8::1", &GeoRecord::default());

        assert_eq!(data.ip, "2001:db8::1");
        assert_eq!(data.status, "OK");
        assert_eq!(data.country_code3, "");
        assert_eq!(data.latitude, 0.0);
        assert_eq!(data.area_code, 0);
        assert_eq!(data.time_zone, "");
    }

    #[test]
    fn test_metro_code_passes_through() {
        let mut record = london();
        record.location.metro_code = 807;

        let data = UbiquityGeoIP::from_record("8.8.8.8", &record);
        assert_eq!(data.area_code, 807);
    }

    #[test]
    fn test_mapping_is_pure() {
        let record = london();
        let first = UbiquityGeoIP::from_record("91.189.93.5", &record);
        let second = UbiquityGeoIP::from_record("91.189.93.5", &record);
        assert_eq!(first, second);
        assert_eq!(record, london());
    }

    #[test]
    fn test_xml_element_names_and_order() {
        let xml = UbiquityGeoIP::from_record("91.189.93.5", &london())
            .to_xml()
            .unwrap();

        assert!(xml.starts_with("<Response>"), "{}", xml);
        assert!(xml.ends_with("</Response>"), "{}", xml);
        assert!(xml.contains("<Ip>91.189.93.5</Ip>"));
        assert!(xml.contains("<Status>OK</Status>"));
        assert!(xml.contains("<TimeZone>Europe/London</TimeZone>"));

        let tags = [
            "<Ip>",
            "<Status>",
            "<CountryCode>",
            "<CountryCode3",
            "<CountryName>",
            "<RegionCode>",
            "<RegionName>",
            "<City>",
            "<ZipPostalCode>",
            "<Latitude>",
            "<Longitude>",
            "<AreaCode>",
            "<TimeZone>",
        ];
        let positions: Vec<usize> = tags
            .iter()
            .map(|tag| xml.find(tag).unwrap_or_else(|| panic!("{} missing in {}", tag, xml)))
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "{}", xml);
    }

    #[test]
    fn test_xml_keeps_empty_elements() {
        let xml = UbiquityGeoIP::from_record("192.0.2.1", &GeoRecord::default())
            .to_xml()
            .unwrap();

        let parsed: UbiquityGeoIP = quick_xml::de::from_str(&xml).unwrap();
        assert_eq!(parsed.country_code3, "");
        assert_eq!(parsed.region_code, "");
        assert_eq!(parsed.city, "");
        assert_eq!(parsed.status, "OK");
    }

    #[test]
    fn test_xml_escapes_text() {
        let mut record = london();
        record.city.names = names("Saint-Jean <& Co>");

        let xml = UbiquityGeoIP::from_record("91.189.93.5", &record)
            .to_xml()
            .unwrap();
        assert!(!xml.contains("<& Co>"));

        let parsed: UbiquityGeoIP = quick_xml::de::from_str(&xml).unwrap();
        assert_eq!(parsed.city, "Saint-Jean <& Co>");
    }
}
