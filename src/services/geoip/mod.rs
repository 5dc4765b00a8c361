//! GeoIP 服务模块
//!
//! 提供 IP 地址地理位置查询功能：
//! - MaxMind GeoLite2-City 本地数据库（内存映射）
//! - 统一的 `GeoIpLookup` 接口，便于测试替换

mod maxmind;
mod provider;
mod record;

pub use maxmind::MaxMindProvider;
pub use provider::{GeoIpLookup, GeoIpProvider};
pub use record::{
    City, Continent, Country, GeoRecord, Location, NAME_LOCALE, Names, Postal, Subdivision,
    localized_name,
};
