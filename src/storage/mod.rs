use std::sync::Arc;

use crate::config::DatabaseConfig;
use crate::models::{
    assignments::{entities::Assignment, requests::CreateAssignmentRequest},
    grading::{
        entities::{GradingJob, GradingResult},
        requests::{CreateGradingJobRequest, CreateGradingResultRequest},
    },
    submissions::{entities::Submission, requests::CreateSubmissionRequest},
};

use crate::errors::Result;

pub mod memory_storage;
pub mod sea_orm_storage;

/// 评分流水线使用的实体存储
///
/// 每个 `save_*` 都是对整条记录的 upsert，读-改-写的顺序由调用方负责，
/// 存储层不提供乐观锁。
#[async_trait::async_trait]
pub trait Storage: Send + Sync {
    /// 作业管理方法
    // 创建作业
    async fn create_assignment(&self, req: CreateAssignmentRequest) -> Result<Assignment>;
    // 通过ID获取作业
    async fn get_assignment_by_id(&self, id: i64) -> Result<Option<Assignment>>;

    /// 提交管理方法
    // 创建提交（状态为 PENDING）
    async fn create_submission(&self, req: CreateSubmissionRequest) -> Result<Submission>;
    // 通过ID获取提交
    async fn get_submission_by_id(&self, id: i64) -> Result<Option<Submission>>;
    // 保存提交
    async fn save_submission(&self, submission: &Submission) -> Result<()>;

    /// 评分任务方法
    // 创建评分任务
    async fn create_grading_job(&self, req: CreateGradingJobRequest) -> Result<GradingJob>;
    // 通过ID获取评分任务
    async fn get_grading_job_by_id(&self, id: i64) -> Result<Option<GradingJob>>;
    // 列出提交的全部评分任务（新的在前）
    async fn list_grading_jobs_by_submission(&self, submission_id: i64)
    -> Result<Vec<GradingJob>>;
    // 保存评分任务
    async fn save_grading_job(&self, job: &GradingJob) -> Result<()>;

    /// 评分结果方法
    // 保存评分结果
    async fn save_grading_result(&self, req: CreateGradingResultRequest) -> Result<GradingResult>;
    // 通过任务ID获取评分结果
    async fn get_grading_result_by_job_id(&self, job_id: i64) -> Result<Option<GradingResult>>;
    // 在同一事务内写入结果、完成任务、更新提交状态
    async fn complete_grading(
        &self,
        job: &GradingJob,
        submission: &Submission,
        result: CreateGradingResultRequest,
    ) -> Result<GradingResult>;
}

/// 根据数据库 URL 选择存储后端
pub async fn create_storage(config: &DatabaseConfig) -> Result<Arc<dyn Storage>> {
    if memory_storage::MemoryStorage::accepts(&config.url) {
        tracing::warn!("Using in-memory storage, data will not survive a restart");
        return Ok(Arc::new(memory_storage::MemoryStorage::new()));
    }
    let storage = sea_orm_storage::SeaOrmStorage::new_async(config).await?;
    Ok(Arc::new(storage))
}
