//! Configuration loading tests
//!
//! Environment variables are process-global, so everything that touches
//! them lives in a single test.

use std::io::Write;

use geoserve::config::StaticConfig;

#[test]
fn test_file_and_env_layering() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(
        file,
        r#"
[server]
host = "::1"
port = 9000

[database]
path = "/var/lib/geoip/GeoLite2-City.mmdb"
max_age_days = 30

[client_ip]
trusted_proxies = ["10.0.0.0/8"]
"#
    )
    .unwrap();
    let path = file.path().to_string_lossy().to_string();

    let config = StaticConfig::try_load(Some(&path)).unwrap();
    assert_eq!(config.server.bind_address(), "[::1]:9000");
    assert_eq!(config.database.path, "/var/lib/geoip/GeoLite2-City.mmdb");
    assert_eq!(config.database.max_age_days, 30);
    assert_eq!(config.client_ip.trusted_proxies, vec!["10.0.0.0/8"]);
    // 未出现的段落使用默认值
    assert_eq!(config.logging.level, "info");

    // SAFETY: 本测试文件中只有这一个测试修改环境变量
    unsafe {
        std::env::set_var("GEOSERVE__DATABASE__MAX_AGE_DAYS", "3");
        std::env::set_var("PORT", "9100");
    }
    let config = StaticConfig::try_load(Some(&path)).unwrap();
    assert_eq!(config.database.max_age_days, 3);
    assert_eq!(config.server.port, 9100);
    assert_eq!(config.server.host, "::1");

    unsafe {
        std::env::remove_var("GEOSERVE__DATABASE__MAX_AGE_DAYS");
        std::env::remove_var("PORT");
    }
}

#[test]
fn test_missing_file_uses_defaults() {
    let config = StaticConfig::load(Some("/nonexistent/geoserve.toml"));
    assert_eq!(config.database.path, "GeoLite2-City.mmdb");
}
