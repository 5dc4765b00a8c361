use std::fmt;

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};

#[derive(Debug, Clone)]
pub enum GeoserveError {
    InvalidAddress(String),
    UnresolvedAddress(String),
    NotFound(String),
    MalformedRecord(String),
    DatabaseOpen(String),
    Serialization(String),
    FileOperation(String),
    Config(String),
}

impl GeoserveError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            GeoserveError::InvalidAddress(_) => "E001",
            GeoserveError::UnresolvedAddress(_) => "E002",
            GeoserveError::NotFound(_) => "E003",
            GeoserveError::MalformedRecord(_) => "E004",
            GeoserveError::DatabaseOpen(_) => "E005",
            GeoserveError::Serialization(_) => "E006",
            GeoserveError::FileOperation(_) => "E007",
            GeoserveError::Config(_) => "E008",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            GeoserveError::InvalidAddress(_) => "Invalid IP Address",
            GeoserveError::UnresolvedAddress(_) => "Unresolved Client Address",
            GeoserveError::NotFound(_) => "Address Not Found",
            GeoserveError::MalformedRecord(_) => "Malformed Database Record",
            GeoserveError::DatabaseOpen(_) => "Database Open Error",
            GeoserveError::Serialization(_) => "Serialization Error",
            GeoserveError::FileOperation(_) => "File Operation Error",
            GeoserveError::Config(_) => "Configuration Error",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            GeoserveError::InvalidAddress(msg) => msg,
            GeoserveError::UnresolvedAddress(msg) => msg,
            GeoserveError::NotFound(msg) => msg,
            GeoserveError::MalformedRecord(msg) => msg,
            GeoserveError::DatabaseOpen(msg) => msg,
            GeoserveError::Serialization(msg) => msg,
            GeoserveError::FileOperation(msg) => msg,
            GeoserveError::Config(msg) => msg,
        }
    }

    /// 格式化为彩色输出（用于 Server 模式启动失败）
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        format!(
            "{} {} {}\n  {}",
            "[ERROR]".red().bold(),
            self.code().yellow(),
            self.error_type().red(),
            self.message().white()
        )
    }

    /// 格式化为简洁输出（用于日志与 CLI）
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for GeoserveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for GeoserveError {}

// 便捷的构造函数
impl GeoserveError {
    pub fn invalid_address<T: Into<String>>(msg: T) -> Self {
        GeoserveError::InvalidAddress(msg.into())
    }

    pub fn unresolved_address<T: Into<String>>(msg: T) -> Self {
        GeoserveError::UnresolvedAddress(msg.into())
    }

    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        GeoserveError::NotFound(msg.into())
    }

    pub fn malformed_record<T: Into<String>>(msg: T) -> Self {
        GeoserveError::MalformedRecord(msg.into())
    }

    pub fn database_open<T: Into<String>>(msg: T) -> Self {
        GeoserveError::DatabaseOpen(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        GeoserveError::Serialization(msg.into())
    }

    pub fn file_operation<T: Into<String>>(msg: T) -> Self {
        GeoserveError::FileOperation(msg.into())
    }

    pub fn config<T: Into<String>>(msg: T) -> Self {
        GeoserveError::Config(msg.into())
    }
}

impl From<std::io::Error> for GeoserveError {
    fn from(err: std::io::Error) -> Self {
        GeoserveError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for GeoserveError {
    fn from(err: serde_json::Error) -> Self {
        GeoserveError::Serialization(err.to_string())
    }
}

impl From<std::net::AddrParseError> for GeoserveError {
    fn from(err: std::net::AddrParseError) -> Self {
        GeoserveError::InvalidAddress(err.to_string())
    }
}

/// HTTP 边界：所有错误统一映射为 500，响应体不包含任何成功格式的片段
impl ResponseError for GeoserveError {
    fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header(("Content-Type", "text/plain; charset=utf-8"))
            .body("Internal Server Error")
    }
}

pub type Result<T> = std::result::Result<T, GeoserveError>;
