//! GeoIP Provider 抽象层
//!
//! 统一的 GeoIP 查询接口。数据库在启动时打开一次，之后以不可变的
//! `Arc` 句柄在所有 worker 之间共享，查询无需加锁。
//! 刷新数据库 = 优雅关闭 + 进程重启，不做运行时替换。

use std::net::IpAddr;
use std::path::Path;
use std::sync::Arc;

use tracing::info;

use super::maxmind::MaxMindProvider;
use super::record::GeoRecord;
use crate::errors::Result;

/// GeoIP 查询 trait
///
/// 实现必须是只读的：同一个实例会被并发调用。
pub trait GeoIpLookup: Send + Sync {
    /// 查询 IP 地址对应的记录
    ///
    /// - 数据库中没有该 IP：`GeoserveError::NotFound`
    /// - 数据损坏无法解码：`GeoserveError::MalformedRecord`
    fn lookup(&self, ip: IpAddr) -> Result<GeoRecord>;

    /// 获取 provider 名称（用于日志）
    fn name(&self) -> &'static str;
}

/// 统一 GeoIP Provider，克隆只增加引用计数
#[derive(Clone)]
pub struct GeoIpProvider {
    inner: Arc<dyn GeoIpLookup>,
}

impl GeoIpProvider {
    /// 从 mmdb 文件打开 MaxMind 数据库
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let provider = MaxMindProvider::open(path)?;
        info!("GeoIP: Initialized with {} provider", provider.name());
        Ok(Self::from_lookup(Arc::new(provider)))
    }

    /// 使用任意查询实现（测试中使用内存实现）
    pub fn from_lookup(inner: Arc<dyn GeoIpLookup>) -> Self {
        Self { inner }
    }

    /// 查询 IP 地址对应的记录
    pub fn lookup(&self, ip: IpAddr) -> Result<GeoRecord> {
        self.inner.lookup(ip)
    }

    /// 获取当前使用的 provider 名称
    pub fn provider_name(&self) -> &'static str {
        self.inner.name()
    }
}

impl std::fmt::Debug for GeoIpProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeoIpProvider")
            .field("provider", &self.inner.name())
            .finish()
    }
}
