//! GeoIP 查询接口
//!
//! - `GET /v1/calamares`：Calamares locale 模块使用的 JSON 格式
//! - `GET /v1/ubiquity`：兼容 geoip.ubuntu.com/lookup 的 XML 格式
//! - `GET /debug`：原始数据库记录，格式不稳定，仅供排查
//!
//! 所有接口都接受可选的 `?ip=` 覆盖连接地址。
//! 任何失败（地址无法解析、数据库无记录、数据损坏）都返回 500。

use std::net::IpAddr;

use actix_web::{HttpRequest, HttpResponse, web};
use tracing::{debug, error, trace};

use crate::errors::Result;
use crate::models::{CalamaresGeoIP, UbiquityGeoIP};
use crate::services::{GeoIpProvider, GeoRecord};
use crate::utils::ip::{ClientIpPolicy, resolve_subject_ip};

pub struct GeoIpService;

impl GeoIpService {
    /// Calamares-style JSON geoip data
    ///
    /// ```json
    /// {"time_zone":"Europe/Vienna"}
    /// ```
    pub async fn calamares(
        req: HttpRequest,
        geoip: web::Data<GeoIpProvider>,
        policy: web::Data<ClientIpPolicy>,
    ) -> Result<HttpResponse> {
        let (_, record) = Self::lookup_subject(&req, &geoip, &policy)?;

        Ok(HttpResponse::Ok().json(CalamaresGeoIP::from_record(&record)))
    }

    /// Ubiquity-style XML geoip data, equivalent to geoip.ubuntu.com/lookup
    pub async fn ubiquity(
        req: HttpRequest,
        geoip: web::Data<GeoIpProvider>,
        policy: web::Data<ClientIpPolicy>,
    ) -> Result<HttpResponse> {
        let (ip, record) = Self::lookup_subject(&req, &geoip, &policy)?;

        let body = UbiquityGeoIP::from_record(&ip.to_string(), &record)
            .to_xml()
            .inspect_err(|e| error!("Failed to encode ubiquity response for {}: {}", ip, e))?;

        Ok(HttpResponse::Ok()
            .content_type("application/xml; charset=utf-8")
            .body(body))
    }

    /// Semi-internal data inspection. The format is undefined.
    pub async fn debug(
        req: HttpRequest,
        geoip: web::Data<GeoIpProvider>,
        policy: web::Data<ClientIpPolicy>,
    ) -> Result<HttpResponse> {
        let (ip, record) = Self::lookup_subject(&req, &geoip, &policy)?;
        debug!("Debug record for {}: {:?}", ip, record);

        Ok(HttpResponse::Ok().json(record))
    }

    /// 解析请求 IP 并查询数据库，失败时记录日志后交给 ResponseError 转成 500
    fn lookup_subject(
        req: &HttpRequest,
        geoip: &GeoIpProvider,
        policy: &ClientIpPolicy,
    ) -> Result<(IpAddr, GeoRecord)> {
        let ip = resolve_subject_ip(req, policy).inspect_err(|e| {
            error!("[{}] IP resolution failed for {}: {}", e.code(), req.path(), e)
        })?;
        trace!("Resolved subject IP {} for {}", ip, req.path());

        let record = geoip
            .lookup(ip)
            .inspect_err(|e| error!("[{}] Lookup of {} failed: {}", e.code(), ip, e))?;

        Ok((ip, record))
    }
}

/// GeoIP 路由配置
pub fn geoip_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/v1/calamares", web::get().to(GeoIpService::calamares))
        .route("/v1/ubiquity", web::get().to(GeoIpService::ubiquity))
        .route("/debug", web::get().to(GeoIpService::debug));
}
