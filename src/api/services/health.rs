use actix_web::{HttpResponse, Responder, web};
use tracing::trace;

pub struct HealthService;

impl HealthService {
    /// 存活检查，进程能处理请求即返回 OK
    pub async fn ping() -> impl Responder {
        trace!("Received ping request");

        HttpResponse::Ok()
            .append_header(("Content-Type", "text/plain; charset=utf-8"))
            .body("OK")
    }
}

/// Health 路由配置
pub fn health_routes() -> actix_web::Scope {
    web::scope("/ping")
        .route("", web::get().to(HealthService::ping))
        .route("", web::head().to(HealthService::ping))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{App, test as actix_test};

    #[actix_web::test]
    async fn test_ping() {
        let app = actix_test::init_service(App::new().service(health_routes())).await;

        let req = actix_test::TestRequest::get().uri("/ping").to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body = actix_test::read_body(resp).await;
        assert_eq!(body, "OK");
    }
}
