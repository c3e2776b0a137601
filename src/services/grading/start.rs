use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::GradingService;
use crate::errors::AutograderError;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::error_response;

/// 发起评分，任务创建后立即返回 202，评分在后台进行
pub async fn start_grading(
    service: &GradingService,
    request: &HttpRequest,
    submission_id: i64,
) -> ActixResult<HttpResponse> {
    let pipeline = service.get_pipeline(request)?;

    match pipeline.start_grading(submission_id).await {
        Ok(started) => Ok(HttpResponse::Accepted().json(ApiResponse::success(
            started.job,
            "评分任务已创建",
        ))),
        Err(e) => {
            let code = match &e {
                AutograderError::NotFound(_) => ErrorCode::SubmissionNotFound,
                AutograderError::Conflict(_) => ErrorCode::GradingAlreadyInProgress,
                _ => ErrorCode::GradingStartFailed,
            };
            Ok(error_response(&e, code, e.message()))
        }
    }
}
