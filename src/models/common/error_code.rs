use crate::errors::AutograderError;

/// 业务错误码（写入 ApiResponse.code）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ErrorCode {
    Success = 0,

    // 通用错误
    BadRequest = 1000,
    NotFound = 1004,
    Conflict = 1009,
    InternalServerError = 1500,
    ExternalServiceUnavailable = 1502,

    // 作业相关
    AssignmentNotFound = 2004,
    AssignmentCreationFailed = 2010,
    AssignmentInvalid = 2022,

    // 提交相关
    SubmissionNotFound = 3004,
    SubmissionCreationFailed = 3010,
    SubmissionInvalid = 3022,

    // 评分相关
    GradingJobNotFound = 4004,
    GradingResultNotFound = 4005,
    GradingAlreadyInProgress = 4009,
    GradingStartFailed = 4010,
}

impl ErrorCode {
    /// 将内部错误映射为对外错误码
    pub fn from_error(err: &AutograderError) -> Self {
        match err {
            AutograderError::NotFound(_) => ErrorCode::NotFound,
            AutograderError::Conflict(_) => ErrorCode::Conflict,
            AutograderError::Validation(_) => ErrorCode::BadRequest,
            AutograderError::ExternalService(_) => ErrorCode::ExternalServiceUnavailable,
            _ => ErrorCode::InternalServerError,
        }
    }
}
