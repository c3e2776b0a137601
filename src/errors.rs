//! 统一错误处理模块
//!
//! 使用宏自动生成错误类型，支持错误代码和类型名称。

use std::fmt;

/// 定义错误类型的宏
///
/// 自动生成：
/// - enum 定义
/// - code() 方法 - 返回错误代码
/// - error_type() 方法 - 返回错误类型名称
/// - message() 方法 - 返回错误详情
/// - 便捷构造函数
macro_rules! define_autograder_errors {
    ($(
        $variant:ident($code:literal, $type_name:literal)
    ),* $(,)?) => {
        #[derive(Debug, Clone, PartialEq)]
        pub enum AutograderError {
            $($variant(String),)*
        }

        impl AutograderError {
            /// 获取错误代码
            pub fn code(&self) -> &'static str {
                match self {
                    $(AutograderError::$variant(_) => $code,)*
                }
            }

            /// 获取错误类型名称
            pub fn error_type(&self) -> &'static str {
                match self {
                    $(AutograderError::$variant(_) => $type_name,)*
                }
            }

            /// 获取错误详情
            pub fn message(&self) -> &str {
                match self {
                    $(AutograderError::$variant(msg) => msg,)*
                }
            }
        }

        // 生成便捷构造函数
        paste::paste! {
            impl AutograderError {
                $(
                    pub fn [<$variant:snake>]<T: Into<String>>(msg: T) -> Self {
                        AutograderError::$variant(msg.into())
                    }
                )*
            }
        }
    };
}

define_autograder_errors! {
    DatabaseConfig("E001", "Database Configuration Error"),
    DatabaseConnection("E002", "Database Connection Error"),
    DatabaseOperation("E003", "Database Operation Error"),
    FileOperation("E004", "File Operation Error"),
    Validation("E005", "Validation Error"),
    NotFound("E006", "Resource Not Found"),
    Serialization("E007", "Serialization Error"),
    ExternalService("E008", "External Service Error"),
    Conflict("E009", "Conflict"),
    InvalidState("E010", "Invalid State Transition"),
}

impl AutograderError {
    /// 格式化为彩色输出（用于开发环境）
    #[cfg(debug_assertions)]
    pub fn format_colored(&self) -> String {
        format!(
            "\x1b[1;31m[ERROR]\x1b[0m \x1b[33m{}\x1b[0m \x1b[31m{}\x1b[0m\n  {}",
            self.code(),
            self.error_type(),
            self.message()
        )
    }

    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for AutograderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for AutograderError {}

// 为常见的错误类型实现 From trait
impl From<sea_orm::DbErr> for AutograderError {
    fn from(err: sea_orm::DbErr) -> Self {
        AutograderError::DatabaseOperation(err.to_string())
    }
}

impl From<std::io::Error> for AutograderError {
    fn from(err: std::io::Error) -> Self {
        AutograderError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for AutograderError {
    fn from(err: serde_json::Error) -> Self {
        AutograderError::Serialization(err.to_string())
    }
}

// 远程调用的所有传输层错误（连接失败、超时、响应体解析失败）都归入外部服务错误
impl From<reqwest::Error> for AutograderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AutograderError::ExternalService(format!("request timed out: {err}"))
        } else if err.is_decode() {
            AutograderError::ExternalService(format!("malformed response: {err}"))
        } else {
            AutograderError::ExternalService(err.to_string())
        }
    }
}

pub type Result<T> = std::result::Result<T, AutograderError>;
