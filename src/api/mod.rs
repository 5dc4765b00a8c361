//! HTTP API
//!
//! - `services`: route handlers (geoip formats, health, docs)
//! - `middleware`: request id and access logging

pub mod middleware;
pub mod services;

use actix_web::web;

/// 注册全部路由（服务器与集成测试共用）
///
/// 处理器依赖 `web::Data<GeoIpProvider>` 与 `web::Data<ClientIpPolicy>`，
/// 由调用方通过 `app_data` 注入。
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(services::health_routes())
        .configure(services::geoip_routes)
        .configure(services::docs_routes);
}
