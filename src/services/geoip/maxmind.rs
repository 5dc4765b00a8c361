//! MaxMind GeoLite2 数据库实现
//!
//! 使用本地 GeoLite2-City.mmdb 文件（内存映射）进行 IP 地理位置查询

use std::fs::File;
use std::net::IpAddr;
use std::path::Path;

use maxminddb::Reader;
use memmap2::Mmap;
use tracing::{debug, info, trace};

use super::provider::GeoIpLookup;
use super::record::GeoRecord;
use crate::errors::{GeoserveError, Result};

/// MaxMind GeoIP Provider
pub struct MaxMindProvider {
    reader: Reader<Mmap>,
}

impl MaxMindProvider {
    /// 从文件路径创建 MaxMind Provider
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            GeoserveError::database_open(format!("{}: {}", path.display(), e))
        })?;

        // SAFETY: 刷新任务通过 rename 替换数据库文件，不会原地修改已映射的内容
        let mmap = unsafe { Mmap::map(&file) }.map_err(|e| {
            GeoserveError::database_open(format!("failed to map {}: {}", path.display(), e))
        })?;

        let reader = Reader::from_source(mmap).map_err(|e| {
            GeoserveError::database_open(format!("{}: {}", path.display(), e))
        })?;

        info!(
            "GeoIP: Opened {} database at {} (build epoch {})",
            reader.metadata.database_type,
            path.display(),
            reader.metadata.build_epoch
        );

        Ok(Self { reader })
    }
}

impl GeoIpLookup for MaxMindProvider {
    fn lookup(&self, ip: IpAddr) -> Result<GeoRecord> {
        let result = self
            .reader
            .lookup(ip)
            .map_err(|e| GeoserveError::malformed_record(format!("lookup of {}: {}", ip, e)))?;

        let record: Option<GeoRecord> = result
            .decode()
            .map_err(|e| GeoserveError::malformed_record(format!("decode of {}: {}", ip, e)))?;

        match record {
            Some(record) => {
                trace!(
                    "MaxMind lookup for {}: country={:?}, tz={:?}",
                    ip, record.country.iso_code, record.location.time_zone
                );
                Ok(record)
            }
            None => {
                debug!("MaxMind lookup for {}: no entry", ip);
                Err(GeoserveError::not_found(format!("no database entry for {}", ip)))
            }
        }
    }

    fn name(&self) -> &'static str {
        "MaxMind"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_open_missing_file() {
        let err = MaxMindProvider::open("/nonexistent/GeoLite2-City.mmdb")
            .err()
            .expect("opening a missing file must fail");
        assert!(matches!(err, GeoserveError::DatabaseOpen(_)));
    }

    #[test]
    fn test_open_garbage_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"definitely not a maxmind database").unwrap();

        let err = MaxMindProvider::open(file.path())
            .err()
            .expect("opening garbage must fail");
        assert!(matches!(err, GeoserveError::DatabaseOpen(_)));
    }

    /// 使用真实的 GeoLite2-City.mmdb 测试（需要先下载数据库）
    /// GEOSERVE_TEST_MMDB=/path/to/GeoLite2-City.mmdb cargo test -- --ignored
    #[test]
    #[ignore]
    fn test_real_database_lookup() {
        let path = std::env::var("GEOSERVE_TEST_MMDB")
            .unwrap_or_else(|_| "GeoLite2-City.mmdb".to_string());
        let provider = MaxMindProvider::open(path).unwrap();

        let record = provider.lookup("91.189.93.5".parse().unwrap()).unwrap();
        assert_eq!(record.country.iso_code, "GB");

        // 文档保留地址不在数据库中
        let err = provider.lookup("192.0.2.1".parse().unwrap()).unwrap_err();
        assert!(matches!(err, GeoserveError::NotFound(_)));
    }
}
