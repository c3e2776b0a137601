use serde::Serialize;
use ts_rs::TS;

use super::entities::GradingJob;

/// 某个提交的全部评分任务（按创建时间倒序）
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grading.ts")]
pub struct SubmissionJobsResponse {
    pub submission_id: i64,
    pub items: Vec<GradingJob>,
}
