//! 客户端 IP 解析
//!
//! 决定一次请求要查询的 IP：
//! - `ip` 查询参数（非空时）优先，用于测试和管理查询
//! - 否则使用连接地址，按代理策略决定是否采用 X-Forwarded-For / X-Real-IP
//!
//! 代理策略支持：
//! - 可信代理配置（trusted_proxies，单 IP 或 CIDR）
//! - 未配置时对私有地址的连接自动信任代理头

use std::net::{IpAddr, SocketAddr};

use actix_web::HttpRequest;
use actix_web::http::header::HeaderMap;
use actix_web::web::Query;
use serde::Deserialize;
use tracing::{debug, error};

use crate::config::ClientIpConfig;
use crate::errors::{GeoserveError, Result};

/// 查询参数名
pub const IP_QUERY_PARAM: &str = "ip";

/// 客户端 IP 策略（启动时从配置构造，之后只读）
#[derive(Debug, Clone)]
pub struct ClientIpPolicy {
    pub honor_forwarded_headers: bool,
    pub trusted_proxies: Vec<String>,
}

impl ClientIpPolicy {
    /// 只使用连接地址，忽略所有代理头
    pub fn peer_only() -> Self {
        Self {
            honor_forwarded_headers: false,
            trusted_proxies: Vec::new(),
        }
    }

    /// 根据连接地址选择客户端 IP 字符串
    ///
    /// 策略（按优先级）：
    /// 1. 不信任代理头 → 连接 IP
    /// 2. 显式配置 trusted_proxies 且匹配 → X-Forwarded-For / X-Real-IP
    /// 3. 显式配置但不匹配 → 连接 IP（防止伪造）
    /// 4. 未配置且连接来自私有 IP → 自动检测代理，使用代理头
    /// 5. 默认 → 连接 IP
    pub fn select<F>(&self, peer: Option<&str>, get_forwarded_ip: F) -> Option<String>
    where
        F: FnOnce() -> Option<String>,
    {
        let Some(peer_ip) = peer else {
            // 没有连接地址（例如 Unix socket），只能依赖代理头
            return if self.honor_forwarded_headers {
                get_forwarded_ip()
            } else {
                None
            };
        };

        if !self.honor_forwarded_headers {
            return Some(peer_ip.to_string());
        }

        if !self.trusted_proxies.is_empty() {
            if is_trusted_proxy(peer_ip, &self.trusted_proxies) {
                let real_ip = get_forwarded_ip().unwrap_or_else(|| peer_ip.to_string());
                debug!("Trusted proxy (explicit): {} -> {}", peer_ip, real_ip);
                return Some(real_ip);
            }
            debug!(
                "Connection from {}, not in trusted_proxies, using peer IP",
                peer_ip
            );
            return Some(peer_ip.to_string());
        }

        if let Some(ip_addr) = parse_host_ip(peer_ip)
            && is_private_or_local(&ip_addr)
        {
            if let Some(real_ip) = get_forwarded_ip() {
                debug!(
                    "Auto-detect proxy (private IP {}): using forwarded IP {}",
                    peer_ip, real_ip
                );
                return Some(real_ip);
            }
            debug!("Private IP {} without X-Forwarded-For", peer_ip);
        }

        Some(peer_ip.to_string())
    }
}

/// 默认策略与 `ClientIpConfig::default()` 一致
impl Default for ClientIpPolicy {
    fn default() -> Self {
        Self::from(&ClientIpConfig::default())
    }
}

impl From<&ClientIpConfig> for ClientIpPolicy {
    fn from(config: &ClientIpConfig) -> Self {
        Self {
            honor_forwarded_headers: config.honor_forwarded_headers,
            trusted_proxies: config.trusted_proxies.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct IpQuery {
    ip: Option<String>,
}

/// 确定请求要查询的 IP 地址
///
/// - `?ip=` 非空：按字面解析，格式错误直接失败，不回退到连接地址
/// - 否则：按 `policy` 从连接信息中提取
/// - 完全无法确定地址：`UnresolvedAddress`
pub fn resolve_subject_ip(req: &HttpRequest, policy: &ClientIpPolicy) -> Result<IpAddr> {
    if let Some(literal) = ip_override(req) {
        return parse_ip_literal(&literal);
    }

    let conn_info = req.connection_info();
    let candidate = policy
        .select(conn_info.peer_addr(), || {
            extract_forwarded_ip_from_headers(req.headers())
        })
        .ok_or_else(|| {
            error!("Couldn't resolve client IP for {}", req.path());
            GeoserveError::unresolved_address("request carries no peer address")
        })?;

    parse_ip_literal(&candidate)
}

/// 读取非空的 `ip` 查询参数
fn ip_override(req: &HttpRequest) -> Option<String> {
    Query::<IpQuery>::from_query(req.query_string())
        .ok()
        .and_then(|q| q.into_inner().ip)
        .filter(|ip| !ip.is_empty())
}

/// 解析 IP 字面量，接受 `ip`、`ip:port`、`[v6]`、`[v6]:port`
///
/// IPv4-mapped IPv6（`::ffff:a.b.c.d`）规范化为 IPv4
pub fn parse_ip_literal(literal: &str) -> Result<IpAddr> {
    parse_host_ip(literal.trim())
        .map(|ip| ip.to_canonical())
        .ok_or_else(|| GeoserveError::invalid_address(format!("'{}' is not an IP address", literal)))
}

/// 先尝试 SocketAddr（支持 ip:port），再尝试纯 IpAddr 和带方括号的 IPv6
fn parse_host_ip(value: &str) -> Option<IpAddr> {
    if let Ok(socket_addr) = value.parse::<SocketAddr>() {
        return Some(socket_addr.ip());
    }
    if let Ok(ip_addr) = value.parse::<IpAddr>() {
        return Some(ip_addr);
    }
    value
        .strip_prefix('[')
        .and_then(|v| v.strip_suffix(']'))
        .and_then(|v| v.parse::<IpAddr>().ok())
}

/// 检查 IP 是否为私有地址或 localhost
pub fn is_private_or_local(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => v4.is_private() || v4.is_loopback(),
        IpAddr::V6(v6) => {
            // - fc00::/7 (ULA, RFC 4193)
            // - fe80::/10 (Link-local)
            // - ::1 (Loopback)
            v6.is_loopback()
                || (v6.segments()[0] & 0xfe00) == 0xfc00
                || (v6.segments()[0] & 0xffc0) == 0xfe80
        }
    }
}

/// 检查 IP 是否在可信代理列表中
pub fn is_trusted_proxy(ip: &str, trusted_proxies: &[String]) -> bool {
    let Some(ip_addr) = parse_host_ip(ip) else {
        return false;
    };

    trusted_proxies.iter().any(|proxy| {
        if proxy.contains('/') {
            ip_in_cidr(&ip_addr, proxy)
        } else {
            proxy.parse::<IpAddr>().is_ok_and(|proxy_addr| ip_addr == proxy_addr)
        }
    })
}

/// CIDR 检查
pub fn ip_in_cidr(ip: &IpAddr, cidr: &str) -> bool {
    let Some((network, prefix_len)) = cidr.split_once('/') else {
        return false;
    };

    let Ok(prefix_len): std::result::Result<u8, _> = prefix_len.parse() else {
        return false;
    };

    let Ok(network_addr) = network.parse::<IpAddr>() else {
        return false;
    };

    match (ip, network_addr) {
        (IpAddr::V4(ip), IpAddr::V4(net)) => {
            if prefix_len > 32 {
                return false;
            }
            let mask = u32::MAX.checked_shl(32 - prefix_len as u32).unwrap_or(0);
            let ip_bits = u32::from_be_bytes(ip.octets());
            let net_bits = u32::from_be_bytes(net.octets());
            (ip_bits & mask) == (net_bits & mask)
        }
        (IpAddr::V6(ip), IpAddr::V6(net)) => {
            if prefix_len > 128 {
                return false;
            }
            let mask = u128::MAX.checked_shl(128 - prefix_len as u32).unwrap_or(0);
            let ip_bits = u128::from_be_bytes(ip.octets());
            let net_bits = u128::from_be_bytes(net.octets());
            (ip_bits & mask) == (net_bits & mask)
        }
        _ => false,
    }
}

/// 从 HeaderMap 提取转发的 IP
pub fn extract_forwarded_ip_from_headers(headers: &HeaderMap) -> Option<String> {
    // 优先 X-Forwarded-For（取第一个，即原始客户端 IP）
    headers
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .or_else(|| {
            headers
                .get("x-real-ip")
                .and_then(|h| h.to_str().ok())
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    fn peer(addr: &str) -> SocketAddr {
        addr.parse().unwrap()
    }

    #[test]
    fn test_override_wins_over_peer() {
        let req = TestRequest::with_uri("/v1/ubiquity?ip=8.8.8.8")
            .peer_addr(peer("91.189.93.5:1234"))
            .to_http_request();

        let ip = resolve_subject_ip(&req, &ClientIpPolicy::default()).unwrap();
        assert_eq!(ip, "8.8.8.8".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn test_override_round_trips() {
        for literal in ["1.2.3.4", "255.255.255.255", "2001:db8::1", "::1", "fe80::1"] {
            let req = TestRequest::with_uri(&format!("/debug?ip={}", literal))
                .peer_addr(peer("91.189.93.5:1234"))
                .to_http_request();

            let ip = resolve_subject_ip(&req, &ClientIpPolicy::default()).unwrap();
            assert_eq!(ip, literal.parse::<IpAddr>().unwrap());
            assert_eq!(ip.to_string().parse::<IpAddr>().unwrap(), ip);
        }
    }

    #[test]
    fn test_empty_override_falls_back_to_peer() {
        let req = TestRequest::with_uri("/v1/calamares?ip=")
            .peer_addr(peer("91.189.93.5:1234"))
            .to_http_request();

        let ip = resolve_subject_ip(&req, &ClientIpPolicy::default()).unwrap();
        assert_eq!(ip, "91.189.93.5".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn test_malformed_override_fails() {
        let req = TestRequest::with_uri("/v1/calamares?ip=not-an-ip")
            .peer_addr(peer("91.189.93.5:1234"))
            .to_http_request();

        let err = resolve_subject_ip(&req, &ClientIpPolicy::default()).unwrap_err();
        assert!(matches!(err, GeoserveError::InvalidAddress(_)));
    }

    #[test]
    fn test_default_policy_matches_default_config() {
        let policy = ClientIpPolicy::default();
        let config = ClientIpConfig::default();
        assert_eq!(policy.honor_forwarded_headers, config.honor_forwarded_headers);
        assert!(policy.honor_forwarded_headers);
        assert!(policy.trusted_proxies.is_empty());
    }

    #[test]
    fn test_peer_address_v4() {
        let req = TestRequest::with_uri("/foo")
            .peer_addr(peer("91.189.93.5:1234"))
            .to_http_request();

        let ip = resolve_subject_ip(&req, &ClientIpPolicy::default()).unwrap();
        assert_eq!(ip, "91.189.93.5".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn test_peer_address_v6() {
        let req = TestRequest::with_uri("/foo")
            .peer_addr(peer("[2001:1af8:4100:a08c:22::10]:1234"))
            .to_http_request();

        let ip = resolve_subject_ip(&req, &ClientIpPolicy::default()).unwrap();
        assert_eq!(ip, "2001:1af8:4100:a08c:22::10".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn test_no_peer_address_is_unresolved() {
        let req = TestRequest::with_uri("/foo").to_http_request();

        let err = resolve_subject_ip(&req, &ClientIpPolicy::peer_only()).unwrap_err();
        assert!(matches!(err, GeoserveError::UnresolvedAddress(_)));
    }

    #[test]
    fn test_forwarded_header_from_private_peer() {
        let req = TestRequest::with_uri("/foo")
            .peer_addr(peer("10.0.0.2:50000"))
            .insert_header(("X-Forwarded-For", "91.189.93.5, 10.0.0.1"))
            .to_http_request();

        let ip = resolve_subject_ip(&req, &ClientIpPolicy::default()).unwrap();
        assert_eq!(ip, "91.189.93.5".parse::<IpAddr>().unwrap());

        let ip = resolve_subject_ip(&req, &ClientIpPolicy::peer_only()).unwrap();
        assert_eq!(ip, "10.0.0.2".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn test_forwarded_header_ignored_from_public_peer() {
        let req = TestRequest::with_uri("/foo")
            .peer_addr(peer("91.189.93.5:1234"))
            .insert_header(("X-Forwarded-For", "8.8.8.8"))
            .to_http_request();

        let ip = resolve_subject_ip(&req, &ClientIpPolicy::default()).unwrap();
        assert_eq!(ip, "91.189.93.5".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn test_bracketed_ipv6_in_forwarded_header() {
        let req = TestRequest::with_uri("/foo")
            .peer_addr(peer("127.0.0.1:40000"))
            .insert_header(("X-Forwarded-For", "[2001:1af8:4100:a08c:22::10]:1234"))
            .to_http_request();

        let ip = resolve_subject_ip(&req, &ClientIpPolicy::default()).unwrap();
        assert_eq!(ip, "2001:1af8:4100:a08c:22::10".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn test_explicit_trusted_proxies() {
        let policy = ClientIpPolicy {
            honor_forwarded_headers: true,
            trusted_proxies: vec!["203.0.113.0/24".to_string()],
        };

        let trusted = TestRequest::with_uri("/foo")
            .peer_addr(peer("203.0.113.7:443"))
            .insert_header(("X-Real-IP", "8.8.4.4"))
            .to_http_request();
        assert_eq!(
            resolve_subject_ip(&trusted, &policy).unwrap(),
            "8.8.4.4".parse::<IpAddr>().unwrap()
        );

        // 私有地址但不在列表中：不信任代理头
        let untrusted = TestRequest::with_uri("/foo")
            .peer_addr(peer("10.0.0.2:443"))
            .insert_header(("X-Real-IP", "8.8.4.4"))
            .to_http_request();
        assert_eq!(
            resolve_subject_ip(&untrusted, &policy).unwrap(),
            "10.0.0.2".parse::<IpAddr>().unwrap()
        );
    }

    #[test]
    fn test_parse_ip_literal_forms() {
        let v6: IpAddr = "2001:1af8:4100:a08c:22::10".parse().unwrap();
        assert_eq!(parse_ip_literal("[2001:1af8:4100:a08c:22::10]:1234").unwrap(), v6);
        assert_eq!(parse_ip_literal("[2001:1af8:4100:a08c:22::10]").unwrap(), v6);
        assert_eq!(parse_ip_literal("2001:1af8:4100:a08c:22::10").unwrap(), v6);
        assert_eq!(
            parse_ip_literal("91.189.93.5:1234").unwrap(),
            "91.189.93.5".parse::<IpAddr>().unwrap()
        );
        assert_eq!(
            parse_ip_literal("::ffff:91.189.93.5").unwrap(),
            "91.189.93.5".parse::<IpAddr>().unwrap()
        );
        assert!(parse_ip_literal("").is_err());
        assert!(parse_ip_literal("999.1.1.1").is_err());
        assert!(parse_ip_literal("example.org").is_err());
    }

    #[test]
    fn test_is_private_or_local_ipv4() {
        assert!(is_private_or_local(&"10.0.0.1".parse().unwrap()));
        assert!(is_private_or_local(&"172.16.0.1".parse().unwrap()));
        assert!(is_private_or_local(&"192.168.1.1".parse().unwrap()));
        assert!(is_private_or_local(&"127.0.0.1".parse().unwrap()));
        assert!(!is_private_or_local(&"8.8.8.8".parse().unwrap()));
        assert!(!is_private_or_local(&"91.189.93.5".parse().unwrap()));
    }

    #[test]
    fn test_is_private_or_local_ipv6() {
        assert!(is_private_or_local(&"::1".parse().unwrap()));
        assert!(is_private_or_local(&"fd00::1".parse().unwrap()));
        assert!(is_private_or_local(&"fe80::1".parse().unwrap()));
        assert!(!is_private_or_local(&"2001:4860:4860::8888".parse().unwrap()));
    }

    #[test]
    fn test_ip_in_cidr() {
        let ip: IpAddr = "192.168.1.100".parse().unwrap();
        assert!(ip_in_cidr(&ip, "192.168.1.0/24"));
        assert!(ip_in_cidr(&ip, "192.168.0.0/16"));
        assert!(!ip_in_cidr(&ip, "192.168.2.0/24"));
        assert!(!ip_in_cidr(&ip, "192.168.1.0/33"));
        assert!(!ip_in_cidr(&ip, "2001:db8::/32"));

        let ip: IpAddr = "2001:db8::1".parse().unwrap();
        assert!(ip_in_cidr(&ip, "2001:db8::/32"));
        assert!(!ip_in_cidr(&ip, "2001:db9::/32"));
    }

    #[test]
    fn test_is_trusted_proxy() {
        let proxies = vec!["127.0.0.1".to_string(), "192.168.1.0/24".to_string()];

        assert!(is_trusted_proxy("127.0.0.1", &proxies));
        assert!(is_trusted_proxy("127.0.0.1:8080", &proxies));
        assert!(is_trusted_proxy("192.168.1.50", &proxies));
        assert!(!is_trusted_proxy("8.8.8.8", &proxies));
        assert!(!is_trusted_proxy("garbage", &proxies));
    }
}
