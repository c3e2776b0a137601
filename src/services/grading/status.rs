use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::GradingService;
use crate::errors::AutograderError;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::default_error_response;

pub async fn get_job(
    service: &GradingService,
    request: &HttpRequest,
    job_id: i64,
) -> ActixResult<HttpResponse> {
    let pipeline = service.get_pipeline(request)?;

    match pipeline.job_status(job_id).await {
        Ok(job) => Ok(HttpResponse::Ok().json(ApiResponse::success(job, "查询成功"))),
        Err(AutograderError::NotFound(msg)) => Ok(HttpResponse::NotFound()
            .json(ApiResponse::error_empty(ErrorCode::GradingJobNotFound, msg))),
        Err(e) => Ok(default_error_response(&e)),
    }
}
