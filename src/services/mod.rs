pub mod assignments;
pub mod grading;
pub mod submissions;

pub use assignments::AssignmentService;
pub use grading::GradingService;
pub use submissions::SubmissionService;

use actix_web::{HttpRequest, HttpResponse, HttpResponseBuilder, web};

use crate::errors::AutograderError;
use crate::models::{ApiResponse, ErrorCode};

/// 从 app_data 中取出共享状态
pub(crate) fn app_state<T: Clone + 'static>(request: &HttpRequest) -> actix_web::Result<T> {
    request
        .app_data::<web::Data<T>>()
        .map(|data| data.get_ref().clone())
        .ok_or_else(|| {
            actix_web::error::ErrorInternalServerError(format!(
                "{} not found in app data",
                std::any::type_name::<T>()
            ))
        })
}

/// 内部错误对应的 HTTP 状态
fn error_status(err: &AutograderError) -> HttpResponseBuilder {
    match err {
        AutograderError::NotFound(_) => HttpResponse::NotFound(),
        AutograderError::Conflict(_) => HttpResponse::Conflict(),
        AutograderError::Validation(_) => HttpResponse::BadRequest(),
        AutograderError::ExternalService(_) => HttpResponse::BadGateway(),
        _ => HttpResponse::InternalServerError(),
    }
}

/// 以指定错误码返回错误
pub(crate) fn error_response(
    err: &AutograderError,
    code: ErrorCode,
    message: impl Into<String>,
) -> HttpResponse {
    error_status(err).json(ApiResponse::error_empty(code, message))
}

/// 按错误类型映射错误码返回错误
pub(crate) fn default_error_response(err: &AutograderError) -> HttpResponse {
    error_status(err).json(ApiResponse::from_error(err))
}
