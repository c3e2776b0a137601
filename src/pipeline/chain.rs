use std::sync::Arc;

use chrono::Utc;
use dashmap::DashSet;
use tracing::{debug, error, info, warn};

use crate::errors::Result;
use crate::gateway::{Evaluation, EvaluationGateway};
use crate::models::{
    assignments::entities::Assignment,
    grading::{
        entities::{GradingJob, GradingJobStatus},
        requests::CreateGradingResultRequest,
    },
    submissions::entities::Submission,
};
use crate::storage::Storage;

/// 进行中的提交标记，drop 时释放
pub(super) struct InFlightGuard {
    set: Arc<DashSet<i64>>,
    submission_id: i64,
}

impl InFlightGuard {
    /// 标记提交为进行中，已被占用时返回 None
    pub(super) fn acquire(set: &Arc<DashSet<i64>>, submission_id: i64) -> Option<Self> {
        if set.insert(submission_id) {
            Some(Self {
                set: set.clone(),
                submission_id,
            })
        } else {
            None
        }
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.set.remove(&self.submission_id);
    }
}

/// 一次评分链：识别 -> 评分 -> 持久化
///
/// 链内的所有错误都在这里被吸收并写入任务状态，不会传播给发起者。
pub(super) struct GradingChain {
    pub storage: Arc<dyn Storage>,
    pub gateway: Arc<dyn EvaluationGateway>,
    pub job: GradingJob,
    pub submission: Submission,
    pub assignment: Assignment,
    pub guard: Option<InFlightGuard>,
}

impl GradingChain {
    pub async fn run(self) -> GradingJobStatus {
        let status = match self.extract_and_evaluate().await {
            Ok((text, evaluation)) => self.finish_completed(text, evaluation).await,
            Err(e) => {
                warn!(
                    "Grading job {} for submission {} failed: {}",
                    self.job.id, self.submission.id, e
                );
                self.record_failure(e.message().to_string()).await
            }
        };
        drop(self.guard);
        status
    }

    async fn extract_and_evaluate(&self) -> Result<(String, Evaluation)> {
        let text = self
            .gateway
            .extract_text(&self.submission.file_path)
            .await?;
        debug!(
            "Grading job {}: extracted {} chars of text",
            self.job.id,
            text.len()
        );

        let evaluation = self
            .gateway
            .evaluate(
                &text,
                &self.assignment.reference_solution_text,
                &self.assignment.rubric_text,
            )
            .await?;
        // 任何网关实现的结果都要在落库前校验
        evaluation.validate()?;
        debug!(
            "Grading job {}: evaluator returned {}/{} (confidence {})",
            self.job.id, evaluation.score, evaluation.max_score, evaluation.confidence_score
        );
        Ok((text, evaluation))
    }

    async fn finish_completed(&self, text: String, evaluation: Evaluation) -> GradingJobStatus {
        let mut job = self.job.clone();
        if let Err(e) = job.complete(Utc::now()) {
            error!("Grading job {}: {}", self.job.id, e);
            return self.job.status;
        }
        let mut submission = self.submission.clone();
        submission.status = job.status.submission_status();
        let result = CreateGradingResultRequest::from_evaluation(job.id, text, evaluation);

        match self
            .storage
            .complete_grading(&job, &submission, result)
            .await
        {
            Ok(result) => {
                info!(
                    "Grading job {} completed: submission {} scored {}/{}{}",
                    job.id,
                    submission.id,
                    result.score,
                    result.max_score,
                    if result.requires_review {
                        " (requires review)"
                    } else {
                        ""
                    }
                );
                GradingJobStatus::Completed
            }
            Err(e) => {
                error!(
                    "Grading job {}: failed to persist grading result: {}",
                    job.id, e
                );
                self.record_failure(format!("failed to persist grading result: {}", e.message()))
                    .await
            }
        }
    }

    /// 记录失败，只尝试一次；写入失败时任务可能停留在 PROCESSING
    async fn record_failure(&self, message: String) -> GradingJobStatus {
        let mut job = self.job.clone();
        if let Err(e) = job.fail(message, Utc::now()) {
            error!("Grading job {}: {}", self.job.id, e);
            return self.job.status;
        }

        if let Err(e) = self.storage.save_grading_job(&job).await {
            error!(
                "Grading job {}: could not record failure, job may remain {}: {}",
                job.id, self.job.status, e
            );
            return self.job.status;
        }

        let mut submission = self.submission.clone();
        submission.status = job.status.submission_status();
        if let Err(e) = self.storage.save_submission(&submission).await {
            error!(
                "Grading job {}: could not mark submission {} as {}: {}",
                job.id, submission.id, submission.status, e
            );
        }
        GradingJobStatus::Failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_is_exclusive_and_released_on_drop() {
        let set = Arc::new(DashSet::new());
        let guard = InFlightGuard::acquire(&set, 42).unwrap();
        assert!(InFlightGuard::acquire(&set, 42).is_none());
        assert!(InFlightGuard::acquire(&set, 43).is_some());

        drop(guard);
        assert!(!set.contains(&42));
        assert!(InFlightGuard::acquire(&set, 42).is_some());
    }
}
