use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::models::grading::requests::StartGradingRequest;
use crate::services::GradingService;
use crate::utils::SafeIDI64;

// 懒加载的全局 GradingService 实例
static GRADING_SERVICE: Lazy<GradingService> = Lazy::new(GradingService::new_lazy);

// 发起评分
pub async fn start_grading(
    req: HttpRequest,
    body: web::Json<StartGradingRequest>,
) -> ActixResult<HttpResponse> {
    GRADING_SERVICE
        .start_grading(&req, body.into_inner().submission_id)
        .await
}

// 查询评分任务
pub async fn get_job(req: HttpRequest, path: SafeIDI64) -> ActixResult<HttpResponse> {
    GRADING_SERVICE.get_job(&req, path.0).await
}

// 查询评分结果
pub async fn get_job_result(req: HttpRequest, path: SafeIDI64) -> ActixResult<HttpResponse> {
    GRADING_SERVICE.get_job_result(&req, path.0).await
}

// 配置路由
pub fn configure_grading_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/grading")
            .service(web::resource("/jobs").route(web::post().to(start_grading)))
            .service(web::resource("/jobs/{id}").route(web::get().to(get_job)))
            .service(web::resource("/jobs/{id}/result").route(web::get().to(get_job_result))),
    );
}
