//! 服务器启动前的准备工作
//!
//! - 打开 GeoLite2 数据库（失败则拒绝启动）
//! - 检查数据库文件是否过期
//! - 根据配置构造客户端 IP 策略

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::config::StaticConfig;
use crate::services::GeoIpProvider;
use crate::utils::ip::ClientIpPolicy;

pub struct StartupContext {
    pub geoip: GeoIpProvider,
    pub client_ip_policy: ClientIpPolicy,
}

/// 准备服务器启动的上下文
pub fn prepare_server_startup(config: &StaticConfig) -> Result<StartupContext> {
    let start_time = Instant::now();
    debug!("Starting pre-startup processing...");

    let db_path = Path::new(&config.database.path);
    let geoip = GeoIpProvider::open(db_path).with_context(|| {
        format!(
            "Failed to open GeoIP database at {} (is the file present and readable?)",
            db_path.display()
        )
    })?;
    info!("GeoIP provider ready: {}", geoip.provider_name());

    check_database_age(db_path, config.database.max_age_days);

    let client_ip_policy = ClientIpPolicy::from(&config.client_ip);
    if !client_ip_policy.honor_forwarded_headers {
        info!("Forwarded headers are ignored, using peer address only");
    } else if client_ip_policy.trusted_proxies.is_empty() {
        info!("No trusted proxies configured, forwarded headers are honored for private peers");
    } else {
        info!(
            "Forwarded headers are honored for {} trusted proxy range(s)",
            client_ip_policy.trusted_proxies.len()
        );
    }

    debug!(
        "Pre-startup processing completed in {} ms",
        start_time.elapsed().as_millis()
    );

    Ok(StartupContext {
        geoip,
        client_ip_policy,
    })
}

/// 数据库文件超过 `max_age_days` 未更新时给出警告（0 = 不检查）
fn check_database_age(path: &Path, max_age_days: u64) {
    if max_age_days == 0 {
        return;
    }

    let modified = match std::fs::metadata(path).and_then(|m| m.modified()) {
        Ok(modified) => DateTime::<Utc>::from(modified),
        Err(e) => {
            debug!("Cannot read mtime of {}: {}", path.display(), e);
            return;
        }
    };

    let age_days = database_age_days(modified, Utc::now());
    if age_days > max_age_days as i64 {
        warn!(
            "GeoIP database {} is {} days old (limit {}), is the refresh job running?",
            path.display(),
            age_days,
            max_age_days
        );
    } else {
        debug!("GeoIP database is {} days old", age_days);
    }
}

fn database_age_days(modified: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    now.signed_duration_since(modified).num_days()
}
