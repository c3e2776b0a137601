use chrono::{DateTime, Utc};
use serde::Deserialize;
use ts_rs::TS;

use super::entities::GradingJobStatus;
use crate::gateway::Evaluation;

/// 发起评分请求
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grading.ts")]
pub struct StartGradingRequest {
    pub submission_id: i64,
}

/// 新建评分任务（id 由存储层分配）
#[derive(Debug, Clone)]
pub struct CreateGradingJobRequest {
    pub submission_id: i64,
    pub status: GradingJobStatus,
    pub started_at: Option<DateTime<Utc>>,
}

/// 新建评分结果（id 由存储层分配）
#[derive(Debug, Clone, PartialEq)]
pub struct CreateGradingResultRequest {
    pub job_id: i64,
    pub score: f64,
    pub max_score: f64,
    pub feedback_json: String,
    pub confidence_score: f64,
    pub ocr_text: String,
    pub requires_review: bool,
}

impl CreateGradingResultRequest {
    pub fn from_evaluation(job_id: i64, ocr_text: String, evaluation: Evaluation) -> Self {
        Self {
            job_id,
            score: evaluation.score,
            max_score: evaluation.max_score,
            feedback_json: evaluation.feedback_json,
            confidence_score: evaluation.confidence_score,
            ocr_text,
            requires_review: evaluation.requires_review,
        }
    }
}
