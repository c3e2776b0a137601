use serde::{Deserialize, Serialize};

/// 应用配置结构体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub app: AppSettings,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub cors: CorsConfig,
    pub grading: GradingConfig,
}

/// 应用设置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    pub system_name: String,
    pub environment: String,
    pub log_level: String,
}

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub unix_socket_path: String,
    pub workers: usize,
    pub max_workers: usize,
    pub timeouts: TimeoutConfig,
    pub limits: LimitConfig,
}

/// 超时配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeoutConfig {
    pub client_request: u64,
    pub client_disconnect: u64,
    pub keep_alive: u64,
}

/// 限制配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitConfig {
    pub max_payload_size: usize,
}

/// 数据库配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,    // 数据库连接 URL（从 scheme 自动推断类型，memory:// 为内存存储）
    pub pool_size: u32, // 连接池大小
    pub timeout: u64,   // 连接超时 (秒)
}

/// CORS 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
    pub max_age: usize,
}

/// 远程服务端点
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceEndpoint {
    pub base_url: String,
}

/// 评分流水线配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradingConfig {
    pub ocr: ServiceEndpoint,       // 文字识别服务
    pub evaluator: ServiceEndpoint, // 评分服务
    pub request_timeout_secs: u64,  // 单次远程调用总超时
    pub connect_timeout_secs: u64,
    #[serde(default)]
    pub max_retries: u32, // 0 表示不重试
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
    #[serde(default)]
    pub exclusive_per_submission: bool, // 开启后同一提交同时只允许一个进行中的评分任务
}

fn default_retry_backoff_ms() -> u64 {
    500
}

impl Default for GradingConfig {
    fn default() -> Self {
        Self {
            ocr: ServiceEndpoint {
                base_url: "http://localhost:8001".to_string(),
            },
            evaluator: ServiceEndpoint {
                base_url: "http://localhost:8003".to_string(),
            },
            request_timeout_secs: 60,
            connect_timeout_secs: 5,
            max_retries: 0,
            retry_backoff_ms: default_retry_backoff_ms(),
            exclusive_per_submission: false,
        }
    }
}
