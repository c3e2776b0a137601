//! 异步评分流水线
//!
//! `start_grading` 同步完成校验与任务创建，随后把
//! 识别 -> 评分 -> 持久化 这条链交给一个独立的 tokio 任务执行。
//! 调用方之后只能通过任务和提交的状态观察结果。

mod chain;

use std::sync::Arc;

use chrono::Utc;
use dashmap::DashSet;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::config::GradingConfig;
use crate::errors::{AutograderError, Result};
use crate::gateway::EvaluationGateway;
use crate::models::grading::{
    entities::{GradingJob, GradingJobStatus, GradingResult},
    requests::CreateGradingJobRequest,
};
use crate::storage::Storage;
use chain::{GradingChain, InFlightGuard};

/// 已发起的评分
pub struct StartedGrading {
    /// 刚创建的任务（PROCESSING）
    pub job: GradingJob,
    /// 评分链结束时产出任务的最终状态
    pub handle: JoinHandle<GradingJobStatus>,
}

/// 评分流水线
#[derive(Clone)]
pub struct GradingPipeline {
    storage: Arc<dyn Storage>,
    gateway: Arc<dyn EvaluationGateway>,
    in_flight: Arc<DashSet<i64>>,
    exclusive: bool,
}

impl GradingPipeline {
    pub fn new(
        storage: Arc<dyn Storage>,
        gateway: Arc<dyn EvaluationGateway>,
        config: &GradingConfig,
    ) -> Self {
        Self {
            storage,
            gateway,
            in_flight: Arc::new(DashSet::new()),
            exclusive: config.exclusive_per_submission,
        }
    }

    /// 为提交发起一次评分
    ///
    /// 成功返回时任务已经以 PROCESSING 持久化，提交也已同步为 PROCESSING。
    /// 提交或作业不存在时返回 `NotFound`，同一提交已有进行中的评分时返回
    /// `Conflict`，两种情况都不会创建任务。
    pub async fn start_grading(&self, submission_id: i64) -> Result<StartedGrading> {
        let guard = if self.exclusive {
            match InFlightGuard::acquire(&self.in_flight, submission_id) {
                Some(guard) => Some(guard),
                None => {
                    return Err(AutograderError::conflict(format!(
                        "提交 {submission_id} 正在评分中"
                    )));
                }
            }
        } else {
            None
        };

        let mut submission = self
            .storage
            .get_submission_by_id(submission_id)
            .await?
            .ok_or_else(|| AutograderError::not_found(format!("提交 {submission_id} 不存在")))?;
        let assignment = self
            .storage
            .get_assignment_by_id(submission.assignment_id)
            .await?
            .ok_or_else(|| {
                AutograderError::not_found(format!(
                    "提交 {} 所属的作业 {} 不存在",
                    submission_id, submission.assignment_id
                ))
            })?;

        let job = self
            .storage
            .create_grading_job(CreateGradingJobRequest {
                submission_id,
                status: GradingJobStatus::Processing,
                started_at: Some(Utc::now()),
            })
            .await?;

        submission.status = job.status.submission_status();
        if let Err(e) = self.storage.save_submission(&submission).await {
            // 任务已存在，尽量不留下悬空的 PROCESSING 任务
            let mut failed = job.clone();
            if failed
                .fail(format!("failed to update submission: {}", e.message()), Utc::now())
                .is_ok()
                && let Err(save_err) = self.storage.save_grading_job(&failed).await
            {
                error!(
                    "Grading job {}: could not record failure after submission update error: {}",
                    job.id, save_err
                );
            }
            return Err(e);
        }

        info!(
            "Grading job {} started for submission {} (assignment {})",
            job.id, submission_id, assignment.id
        );

        let chain = GradingChain {
            storage: self.storage.clone(),
            gateway: self.gateway.clone(),
            job: job.clone(),
            submission,
            assignment,
            guard,
        };
        let handle = tokio::spawn(chain.run());

        Ok(StartedGrading { job, handle })
    }

    /// 查询任务
    pub async fn job_status(&self, job_id: i64) -> Result<GradingJob> {
        self.storage
            .get_grading_job_by_id(job_id)
            .await?
            .ok_or_else(|| AutograderError::not_found(format!("评分任务 {job_id} 不存在")))
    }

    /// 查询任务的评分结果，任务未完成时返回 `NotFound`
    pub async fn job_result(&self, job_id: i64) -> Result<GradingResult> {
        let job = self.job_status(job_id).await?;
        if job.status != GradingJobStatus::Completed {
            return Err(AutograderError::not_found(format!(
                "评分任务 {} 尚无结果，当前状态 {}",
                job_id, job.status
            )));
        }
        self.storage
            .get_grading_result_by_job_id(job_id)
            .await?
            .ok_or_else(|| AutograderError::not_found(format!("评分任务 {job_id} 的结果不存在")))
    }

    /// 提交的全部评分任务，新的在前
    pub async fn submission_jobs(&self, submission_id: i64) -> Result<Vec<GradingJob>> {
        if self
            .storage
            .get_submission_by_id(submission_id)
            .await?
            .is_none()
        {
            return Err(AutograderError::not_found(format!(
                "提交 {submission_id} 不存在"
            )));
        }
        self.storage
            .list_grading_jobs_by_submission(submission_id)
            .await
    }
}
