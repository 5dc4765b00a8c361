use serde::{Deserialize, Serialize};

/// 默认配置文件路径
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// 环境变量前缀（GEOSERVE__SERVER__PORT=9000）
const ENV_PREFIX: &str = "GEOSERVE";

/// 静态配置（从 TOML 加载，启动时使用）
///
/// 包含：
/// - server: 监听地址、端口、worker 数量、关闭与定期重启
/// - database: GeoLite2 数据库文件
/// - client_ip: 客户端 IP 解析策略（代理头信任）
/// - logging: 日志配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StaticConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub client_ip: ClientIpConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl StaticConfig {
    /// 从 TOML 文件和环境变量加载配置
    ///
    /// 优先级：ENV > config.toml > 默认值
    /// ENV 前缀：GEOSERVE，分隔符：__
    /// 另外兼容旧部署使用的 HOST / PORT 环境变量
    pub fn load(path: Option<&str>) -> Self {
        match Self::try_load(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("[ERROR] Failed to load config: {}", e);
                Self::default()
            }
        }
    }

    /// 加载配置，失败时返回错误而不是回退到默认值
    pub fn try_load(path: Option<&str>) -> Result<Self, config::ConfigError> {
        use config::{Config, Environment, File};

        let path = path.unwrap_or(DEFAULT_CONFIG_PATH);

        let settings = Config::builder()
            // 1. 从 TOML 文件加载（可选）
            .add_source(File::with_name(path).required(false))
            // 2. 从环境变量覆盖
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            // 3. 旧版 HOST / PORT
            .set_override_option("server.host", std::env::var("HOST").ok())?
            .set_override_option("server.port", std::env::var("PORT").ok())?
            .build()?;

        let config = settings.try_deserialize::<StaticConfig>()?;
        if std::path::Path::new(path).exists() {
            eprintln!("[INFO] Configuration loaded from: {}", path);
        }
        Ok(config)
    }

    /// 生成示例 TOML 配置文件
    pub fn generate_sample_config() -> String {
        let sample_config = Self::default();
        toml::to_string_pretty(&sample_config)
            .unwrap_or_else(|e| format!("Error generating sample config: {}", e))
    }

    /// 保存配置到 TOML 文件
    pub fn save_to_file<P: AsRef<std::path::Path>>(
        &self,
        path: P,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let content = toml::to_string_pretty(self)?;

        if let Some(parent) = path.as_ref().parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }
}

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// 监听地址，空字符串表示所有接口
    #[serde(default)]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
    #[serde(default = "default_cpu_count")]
    pub cpu_count: usize,
    /// 优雅关闭时等待进行中请求的秒数
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout_secs: u64,
    /// 定期退出以便 supervisor 带着新数据库重启（0 = 禁用）
    #[serde(default = "default_restart_interval")]
    pub restart_interval_hours: u64,
    /// 使用 systemd 传入的监听 socket（LISTEN_FDS）
    #[serde(default = "default_true")]
    pub socket_activation: bool,
}

impl ServerConfig {
    /// 拼接 bind 地址，空 host 监听所有接口
    pub fn bind_address(&self) -> String {
        let host = if self.host.is_empty() {
            "0.0.0.0"
        } else {
            self.host.as_str()
        };
        if host.contains(':') && !host.starts_with('[') {
            format!("[{}]:{}", host, self.port)
        } else {
            format!("{}:{}", host, self.port)
        }
    }
}

/// GeoLite2 数据库配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_path")]
    pub path: String,
    /// 超过该天数未更新时启动时给出警告
    #[serde(default = "default_max_age_days")]
    pub max_age_days: u64,
}

/// 客户端 IP 解析配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientIpConfig {
    /// 是否读取 X-Forwarded-For / X-Real-IP
    #[serde(default = "default_true")]
    pub honor_forwarded_headers: bool,
    /// 可信代理（IP 或 CIDR），为空时对私有地址的连接自动信任代理头
    #[serde(default)]
    pub trusted_proxies: Vec<String>,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default = "default_max_backups")]
    pub max_backups: u32,
    #[serde(default = "default_true")]
    pub enable_rotation: bool,
}

// ============================================================
// Default value functions
// ============================================================

fn default_server_port() -> u16 {
    8080
}

fn default_cpu_count() -> usize {
    num_cpus::get()
}

fn default_shutdown_timeout() -> u64 {
    4
}

fn default_restart_interval() -> u64 {
    14 * 24
}

fn default_true() -> bool {
    true
}

fn default_database_path() -> String {
    "GeoLite2-City.mmdb".to_string()
}

fn default_max_age_days() -> u64 {
    8
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_max_backups() -> u32 {
    5
}

// ============================================================
// Default implementations
// ============================================================

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: default_server_port(),
            cpu_count: default_cpu_count(),
            shutdown_timeout_secs: default_shutdown_timeout(),
            restart_interval_hours: default_restart_interval(),
            socket_activation: true,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
            max_age_days: default_max_age_days(),
        }
    }
}

impl Default for ClientIpConfig {
    fn default() -> Self {
        Self {
            honor_forwarded_headers: true,
            trusted_proxies: Vec::new(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
            max_backups: default_max_backups(),
            enable_rotation: true,
        }
    }
}
