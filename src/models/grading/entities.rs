use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::errors::{AutograderError, Result};
use crate::models::submissions::entities::SubmissionStatus;

// 评分任务状态
//
// PENDING -> PROCESSING -> COMPLETED | FAILED，终态不可再迁移。
// 流水线直接以 PROCESSING 创建任务，PENDING 仅作为保留的入口状态。
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, TS)]
#[serde(rename_all = "UPPERCASE")]
#[ts(export, export_to = "../frontend/src/types/generated/grading.ts")]
pub enum GradingJobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl GradingJobStatus {
    pub const PENDING: &'static str = "PENDING";
    pub const PROCESSING: &'static str = "PROCESSING";
    pub const COMPLETED: &'static str = "COMPLETED";
    pub const FAILED: &'static str = "FAILED";

    pub fn is_terminal(&self) -> bool {
        matches!(self, GradingJobStatus::Completed | GradingJobStatus::Failed)
    }

    /// 状态只能单调前进
    pub fn can_transition_to(&self, next: GradingJobStatus) -> bool {
        use GradingJobStatus::*;
        matches!(
            (self, next),
            (Pending, Processing) | (Pending, Failed) | (Processing, Completed) | (Processing, Failed)
        )
    }

    /// 与任务状态同步的提交状态
    pub fn submission_status(&self) -> SubmissionStatus {
        match self {
            GradingJobStatus::Pending => SubmissionStatus::Pending,
            GradingJobStatus::Processing => SubmissionStatus::Processing,
            GradingJobStatus::Completed => SubmissionStatus::Graded,
            GradingJobStatus::Failed => SubmissionStatus::Failed,
        }
    }
}

impl<'de> Deserialize<'de> for GradingJobStatus {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(|_| {
            serde::de::Error::custom(format!(
                "无效的任务状态: '{s}'. 支持的状态: PENDING, PROCESSING, COMPLETED, FAILED"
            ))
        })
    }
}

impl std::fmt::Display for GradingJobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GradingJobStatus::Pending => write!(f, "{}", GradingJobStatus::PENDING),
            GradingJobStatus::Processing => write!(f, "{}", GradingJobStatus::PROCESSING),
            GradingJobStatus::Completed => write!(f, "{}", GradingJobStatus::COMPLETED),
            GradingJobStatus::Failed => write!(f, "{}", GradingJobStatus::FAILED),
        }
    }
}

impl std::str::FromStr for GradingJobStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            GradingJobStatus::PENDING => Ok(GradingJobStatus::Pending),
            GradingJobStatus::PROCESSING => Ok(GradingJobStatus::Processing),
            GradingJobStatus::COMPLETED => Ok(GradingJobStatus::Completed),
            GradingJobStatus::FAILED => Ok(GradingJobStatus::Failed),
            _ => Err(format!("Invalid grading job status: {s}")),
        }
    }
}

// 评分任务：一次针对单个提交的评分尝试
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grading.ts")]
pub struct GradingJob {
    pub id: i64,
    pub submission_id: i64,
    pub status: GradingJobStatus,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl GradingJob {
    fn transition(&mut self, next: GradingJobStatus) -> Result<()> {
        if !self.status.can_transition_to(next) {
            return Err(AutograderError::invalid_state(format!(
                "评分任务 {} 不能从 {} 迁移到 {}",
                self.id, self.status, next
            )));
        }
        self.status = next;
        Ok(())
    }

    /// 标记为已完成
    pub fn complete(&mut self, now: DateTime<Utc>) -> Result<()> {
        self.transition(GradingJobStatus::Completed)?;
        self.completed_at = Some(now);
        Ok(())
    }

    /// 标记为失败，错误信息保证非空
    pub fn fail(&mut self, message: impl Into<String>, now: DateTime<Utc>) -> Result<()> {
        self.transition(GradingJobStatus::Failed)?;
        let message = message.into();
        self.error_message = Some(if message.trim().is_empty() {
            "grading failed without an error description".to_string()
        } else {
            message
        });
        self.completed_at = Some(now);
        Ok(())
    }
}

// 评分结果：仅在任务成功完成时创建一次
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grading.ts")]
pub struct GradingResult {
    pub id: i64,
    pub job_id: i64,
    pub score: f64,
    pub max_score: f64,
    // 每个评分项一条的结构化反馈（不透明的 JSON 字符串）
    pub feedback_json: String,
    // 0.0 ~ 1.0
    pub confidence_score: f64,
    // 学生答卷的识别文本
    pub ocr_text: String,
    pub requires_review: bool,
    pub reviewed_by: Option<i64>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn processing_job() -> GradingJob {
        GradingJob {
            id: 1,
            submission_id: 42,
            status: GradingJobStatus::Processing,
            error_message: None,
            created_at: Utc::now(),
            started_at: Some(Utc::now()),
            completed_at: None,
        }
    }

    #[test]
    fn test_complete_sets_timestamp() {
        let mut job = processing_job();
        let now = Utc::now();
        job.complete(now).unwrap();
        assert_eq!(job.status, GradingJobStatus::Completed);
        assert_eq!(job.completed_at, Some(now));
        assert!(job.error_message.is_none());
    }

    #[test]
    fn test_fail_keeps_message_non_empty() {
        let mut job = processing_job();
        job.fail("", Utc::now()).unwrap();
        assert_eq!(job.status, GradingJobStatus::Failed);
        assert!(!job.error_message.unwrap().is_empty());
    }

    #[test]
    fn test_terminal_states_are_final() {
        let mut job = processing_job();
        job.complete(Utc::now()).unwrap();
        let err = job.fail("late failure", Utc::now()).unwrap_err();
        assert_eq!(err.code(), "E010");
        assert_eq!(job.status, GradingJobStatus::Completed);

        let mut job = processing_job();
        job.fail("ocr down", Utc::now()).unwrap();
        assert!(job.complete(Utc::now()).is_err());
        assert_eq!(job.error_message.as_deref(), Some("ocr down"));
    }

    #[test]
    fn test_no_backward_transitions() {
        assert!(!GradingJobStatus::Processing.can_transition_to(GradingJobStatus::Pending));
        assert!(!GradingJobStatus::Completed.can_transition_to(GradingJobStatus::Processing));
        assert!(!GradingJobStatus::Pending.can_transition_to(GradingJobStatus::Completed));
        assert!(GradingJobStatus::Pending.can_transition_to(GradingJobStatus::Processing));
    }

    #[test]
    fn test_submission_status_lock_step() {
        assert_eq!(
            GradingJobStatus::Processing.submission_status(),
            SubmissionStatus::Processing
        );
        assert_eq!(
            GradingJobStatus::Completed.submission_status(),
            SubmissionStatus::Graded
        );
        assert_eq!(
            GradingJobStatus::Failed.submission_status(),
            SubmissionStatus::Failed
        );
    }
}
