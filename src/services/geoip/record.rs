//! GeoLite2-City 记录结构
//!
//! 直接从 mmdb 解码，所有字段缺省时取默认值（空字符串 / 0），
//! 下游映射不会因为字段缺失而失败。

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// 本地化名称：语言代码 → 名称
pub type Names = BTreeMap<String, String>;

/// 名称查找使用的固定语言
pub const NAME_LOCALE: &str = "en";

/// 取固定语言的名称，不存在时返回空字符串
pub fn localized_name(names: &Names) -> String {
    names.get(NAME_LOCALE).cloned().unwrap_or_default()
}

/// 一次 IP 查询的结果
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeoRecord {
    pub continent: Continent,
    pub country: Country,
    pub registered_country: Country,
    pub city: City,
    pub postal: Postal,
    pub location: Location,
    pub subdivisions: Vec<Subdivision>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Continent {
    pub code: String,
    pub names: Names,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Country {
    pub iso_code: String,
    pub names: Names,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct City {
    pub names: Names,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Postal {
    pub code: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    /// 美国 metro code，其余地区为 0
    pub metro_code: u32,
    /// IANA 时区，例如 "Europe/London"
    pub time_zone: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Subdivision {
    pub iso_code: String,
    pub names: Names,
}
