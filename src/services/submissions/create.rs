use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::{info, warn};

use super::SubmissionService;
use crate::models::submissions::{
    requests::CreateSubmissionRequest, responses::SubmissionCreatedResponse,
};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::error_response;

pub async fn create_submission(
    service: &SubmissionService,
    request: &HttpRequest,
    req: CreateSubmissionRequest,
) -> ActixResult<HttpResponse> {
    if let Err(e) = req.validate() {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::SubmissionInvalid, e.message())));
    }

    let storage = service.get_storage(request)?;

    // 作业必须存在
    match storage.get_assignment_by_id(req.assignment_id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::AssignmentNotFound,
                "作业不存在",
            )));
        }
        Err(e) => {
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("查询作业失败: {e}"),
                )),
            );
        }
    }

    let auto_grade = req.auto_grade;
    let mut submission = match storage.create_submission(req).await {
        Ok(submission) => submission,
        Err(e) => {
            return Ok(error_response(
                &e,
                ErrorCode::SubmissionCreationFailed,
                format!("提交创建失败: {}", e.message()),
            ));
        }
    };
    info!(
        "Submission {} created for assignment {} by student {}",
        submission.id, submission.assignment_id, submission.student_id
    );

    if !auto_grade {
        return Ok(HttpResponse::Created().json(ApiResponse::success(
            SubmissionCreatedResponse {
                submission,
                grading_job: None,
            },
            "提交成功",
        )));
    }

    // 提交已经落库，评分启动失败不影响创建结果
    let pipeline = service.get_pipeline(request)?;
    match pipeline.start_grading(submission.id).await {
        Ok(started) => {
            submission.status = started.job.status.submission_status();
            Ok(HttpResponse::Created().json(ApiResponse::success(
                SubmissionCreatedResponse {
                    submission,
                    grading_job: Some(started.job),
                },
                "提交成功，已开始评分",
            )))
        }
        Err(e) => {
            warn!(
                "Submission {} created but grading could not start: {}",
                submission.id, e
            );
            Ok(HttpResponse::Created().json(ApiResponse::success(
                SubmissionCreatedResponse {
                    submission,
                    grading_job: None,
                },
                format!("提交成功，但评分启动失败: {}", e.message()),
            )))
        }
    }
}
