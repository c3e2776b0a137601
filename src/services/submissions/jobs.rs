use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::SubmissionService;
use crate::errors::AutograderError;
use crate::models::grading::responses::SubmissionJobsResponse;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::default_error_response;

/// 列出提交的评分任务（新的在前）
pub async fn list_submission_jobs(
    service: &SubmissionService,
    request: &HttpRequest,
    submission_id: i64,
) -> ActixResult<HttpResponse> {
    let pipeline = service.get_pipeline(request)?;

    match pipeline.submission_jobs(submission_id).await {
        Ok(items) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            SubmissionJobsResponse {
                submission_id,
                items,
            },
            "查询成功",
        ))),
        Err(AutograderError::NotFound(msg)) => Ok(HttpResponse::NotFound()
            .json(ApiResponse::error_empty(ErrorCode::SubmissionNotFound, msg))),
        Err(e) => Ok(default_error_response(&e)),
    }
}
