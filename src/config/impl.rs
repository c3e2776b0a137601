use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use std::sync::OnceLock;

use super::AppConfig;

static APP_CONFIG: OnceLock<AppConfig> = OnceLock::new();

type Builder = ConfigBuilder<DefaultState>;

// 服务自身的直接环境变量覆盖：(配置键, 环境变量)
const SERVER_ENV_OVERRIDES: &[(&str, &str)] = &[
    ("app.environment", "APP_ENV"),
    ("app.log_level", "RUST_LOG"),
    ("server.host", "SERVER_HOST"),
    ("server.port", "SERVER_PORT"),
    ("server.unix_socket_path", "UNIX_SOCKET"),
    ("server.workers", "CPU_COUNT"),
    ("database.url", "DATABASE_URL"),
];

// 评分流水线依赖的远程服务地址
const GRADING_ENV_OVERRIDES: &[(&str, &str)] = &[
    ("grading.ocr.base_url", "OCR_SERVICE_URL"),
    ("grading.evaluator.base_url", "EVALUATOR_SERVICE_URL"),
];

fn apply_overrides(
    builder: Builder,
    overrides: &[(&str, &str)],
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<Builder, ConfigError> {
    overrides
        .iter()
        .try_fold(builder, |builder, (key, var)| {
            builder.set_override_option(*key, lookup(var))
        })
}

impl AppConfig {
    /// 加载配置
    ///
    /// 优先级从低到高：config.toml、config.{APP_ENV}、AUTOGRADER__* 环境变量、直接覆盖变量
    pub fn load() -> Result<Self, ConfigError> {
        let builder = Config::builder()
            .add_source(File::with_name("config").required(false))
            .add_source(
                File::with_name(&format!(
                    "config.{}",
                    std::env::var("APP_ENV").unwrap_or_else(|_| "development".into())
                ))
                .required(false),
            )
            .add_source(
                Environment::with_prefix("AUTOGRADER")
                    .separator("__")
                    .try_parsing(true),
            );

        let env = |var: &str| std::env::var(var).ok();
        let builder = apply_overrides(builder, SERVER_ENV_OVERRIDES, env)?;
        let builder = apply_overrides(builder, GRADING_ENV_OVERRIDES, env)?;
        Self::from_builder(builder)
    }

    fn from_builder(builder: Builder) -> Result<Self, ConfigError> {
        let mut app_config: AppConfig = builder.build()?.try_deserialize()?;

        // 0 表示按 CPU 数决定
        if app_config.server.workers == 0 {
            app_config.server.workers = num_cpus::get().min(app_config.server.max_workers);
        }

        Ok(app_config)
    }

    /// 获取全局配置实例
    pub fn get() -> &'static AppConfig {
        APP_CONFIG.get_or_init(|| {
            Self::load().unwrap_or_else(|e| {
                eprintln!("Failed to load configuration: {e}");
                std::process::exit(1);
            })
        })
    }

    /// 初始化配置 (在应用启动时调用)
    pub fn init() -> Result<(), ConfigError> {
        let config = Self::load()?;
        APP_CONFIG
            .set(config)
            .map_err(|_| ConfigError::Message("Configuration already initialized".to_string()))?;
        Ok(())
    }

    /// 检查是否为开发环境
    pub fn is_development(&self) -> bool {
        self.app.environment == "development"
    }

    /// 获取服务器绑定地址
    pub fn server_bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// 获取 Unix 套接字路径 (如果配置了)
    #[cfg(unix)]
    pub fn unix_socket_path(&self) -> Option<&str> {
        if self.server.unix_socket_path.is_empty() {
            None
        } else {
            Some(&self.server.unix_socket_path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    const MINIMAL: &str = r#"
        [app]
        system_name = "AutoGrader"
        environment = "test"
        log_level = "info"

        [server]
        host = "127.0.0.1"
        port = 8080
        unix_socket_path = ""
        workers = 2
        max_workers = 8
        timeouts = { client_request = 5000, client_disconnect = 1000, keep_alive = 75 }
        limits = { max_payload_size = 1048576 }

        [database]
        url = "memory://"
        pool_size = 1
        timeout = 5

        [cors]
        allowed_origins = []
        max_age = 0

        [grading]
        request_timeout_secs = 60
        connect_timeout_secs = 5
        ocr = { base_url = "http://localhost:8001" }
        evaluator = { base_url = "http://localhost:8003" }
    "#;

    fn minimal() -> Builder {
        Config::builder().add_source(File::from_str(MINIMAL, FileFormat::Toml))
    }

    #[test]
    fn test_grading_optional_keys_default() {
        let config = AppConfig::from_builder(minimal()).unwrap();
        assert_eq!(config.grading.max_retries, 0);
        assert_eq!(config.grading.retry_backoff_ms, 500);
        assert!(!config.grading.exclusive_per_submission);
        assert_eq!(config.server.workers, 2);
    }

    #[test]
    fn test_service_urls_are_overridable() {
        let lookup = |var: &str| match var {
            "EVALUATOR_SERVICE_URL" => Some("http://grader:9000".to_string()),
            _ => None,
        };
        let builder = apply_overrides(minimal(), GRADING_ENV_OVERRIDES, lookup).unwrap();
        let config = AppConfig::from_builder(builder).unwrap();
        assert_eq!(config.grading.evaluator.base_url, "http://grader:9000");
        assert_eq!(config.grading.ocr.base_url, "http://localhost:8001");
    }
}
