use serde::Serialize;
use ts_rs::TS;

use super::entities::Submission;
use crate::models::grading::entities::GradingJob;

/// 创建提交的响应，开启自动评分时附带新建的评分任务
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/submission.ts")]
pub struct SubmissionCreatedResponse {
    pub submission: Submission,
    pub grading_job: Option<GradingJob>,
}
