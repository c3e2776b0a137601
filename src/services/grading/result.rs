use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::GradingService;
use crate::errors::AutograderError;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::default_error_response;

/// 获取评分结果，任务未完成时返回 404
pub async fn get_job_result(
    service: &GradingService,
    request: &HttpRequest,
    job_id: i64,
) -> ActixResult<HttpResponse> {
    let pipeline = service.get_pipeline(request)?;

    match pipeline.job_result(job_id).await {
        Ok(result) => Ok(HttpResponse::Ok().json(ApiResponse::success(result, "查询成功"))),
        Err(AutograderError::NotFound(msg)) => Ok(HttpResponse::NotFound()
            .json(ApiResponse::error_empty(ErrorCode::GradingResultNotFound, msg))),
        Err(e) => Ok(default_error_response(&e)),
    }
}
