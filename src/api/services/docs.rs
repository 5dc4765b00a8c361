use actix_web::{HttpRequest, HttpResponse, Result, web};
use rust_embed::Embed;
use tracing::{debug, trace};

// 使用 RustEmbed 嵌入 API 文档
#[derive(Embed)]
#[folder = "doc/"]
struct DocAssets;

/// 文档挂载路径
pub const DOC_PREFIX: &str = "/doc";

pub struct DocsService;

impl DocsService {
    /// 根路径永久重定向到文档
    pub async fn handle_root() -> HttpResponse {
        HttpResponse::MovedPermanently()
            .append_header(("Location", format!("{}/", DOC_PREFIX)))
            .finish()
    }

    /// 处理文档首页
    pub async fn handle_index(req: HttpRequest) -> Result<HttpResponse> {
        // 路径规范化（添加尾部斜杠），保证相对资源路径正确
        let path = req.path();
        if !path.ends_with('/') {
            trace!("Redirecting {} to {}/", path, path);
            return Ok(HttpResponse::Found()
                .append_header(("Location", format!("{}/", path)))
                .finish());
        }

        match DocAssets::get("index.html") {
            Some(content) => {
                let html = String::from_utf8_lossy(&content.data)
                    .replace("%GEOSERVE_VERSION%", env!("CARGO_PKG_VERSION"));
                Ok(HttpResponse::Ok()
                    .content_type("text/html; charset=utf-8")
                    .body(html))
            }
            None => Ok(HttpResponse::NotFound().body("File not found")),
        }
    }

    /// 处理文档静态资源
    pub async fn handle_static(req: HttpRequest) -> Result<HttpResponse> {
        let path = req.match_info().query("path");
        trace!("Serving doc file: {}", path);

        if path.is_empty() || path == "index.html" {
            return Self::handle_index(req).await;
        }

        match DocAssets::get(path) {
            Some(content) => Ok(HttpResponse::Ok()
                .content_type(Self::get_content_type(path))
                .body(content.data.into_owned())),
            None => {
                debug!("Doc file not found: {}", path);
                Ok(HttpResponse::NotFound().body("File not found"))
            }
        }
    }

    /// 根据文件扩展名确定 Content-Type
    fn get_content_type(path: &str) -> &'static str {
        match path.rsplit('.').next() {
            Some("html") => "text/html; charset=utf-8",
            Some("css") => "text/css; charset=utf-8",
            Some("js") => "application/javascript; charset=utf-8",
            Some("json") => "application/json",
            Some("png") => "image/png",
            Some("svg") => "image/svg+xml",
            Some("ico") => "image/x-icon",
            _ => "application/octet-stream",
        }
    }
}

/// 文档路由配置
pub fn docs_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(DocsService::handle_root))
        .route(DOC_PREFIX, web::get().to(DocsService::handle_index))
        .route(
            &format!("{}/{{path:.*}}", DOC_PREFIX),
            web::get().to(DocsService::handle_static),
        );
}
