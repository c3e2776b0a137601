//! 评分任务存储操作

use super::SeaOrmStorage;
use crate::entity::grading_jobs::{ActiveModel, Column, Entity as GradingJobs};
use crate::errors::{AutograderError, Result};
use crate::models::grading::{entities::GradingJob, requests::CreateGradingJobRequest};
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};

impl SeaOrmStorage {
    /// 创建评分任务
    pub async fn create_grading_job_impl(&self, req: CreateGradingJobRequest) -> Result<GradingJob> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            submission_id: Set(req.submission_id),
            status: Set(req.status.to_string()),
            error_message: Set(None),
            created_at: Set(now),
            started_at: Set(req.started_at.map(|t| t.timestamp())),
            completed_at: Set(None),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| AutograderError::database_operation(format!("创建评分任务失败: {e}")))?;

        result.into_grading_job()
    }

    /// 通过 ID 获取评分任务
    pub async fn get_grading_job_by_id_impl(&self, job_id: i64) -> Result<Option<GradingJob>> {
        let result = GradingJobs::find_by_id(job_id)
            .one(&self.db)
            .await
            .map_err(|e| AutograderError::database_operation(format!("查询评分任务失败: {e}")))?;

        result.map(|m| m.into_grading_job()).transpose()
    }

    /// 列出提交的评分任务
    pub async fn list_grading_jobs_by_submission_impl(
        &self,
        submission_id: i64,
    ) -> Result<Vec<GradingJob>> {
        let results = GradingJobs::find()
            .filter(Column::SubmissionId.eq(submission_id))
            .order_by_desc(Column::CreatedAt)
            .order_by_desc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| AutograderError::database_operation(format!("查询评分任务列表失败: {e}")))?;

        results.into_iter().map(|m| m.into_grading_job()).collect()
    }

    /// 整条写入评分任务（存在则覆盖，submission_id 不参与更新）
    pub(super) async fn save_grading_job_impl<C: ConnectionTrait>(
        &self,
        conn: &C,
        job: &GradingJob,
    ) -> Result<()> {
        let model = ActiveModel {
            id: Set(job.id),
            submission_id: Set(job.submission_id),
            status: Set(job.status.to_string()),
            error_message: Set(job.error_message.clone()),
            created_at: Set(job.created_at.timestamp()),
            started_at: Set(job.started_at.map(|t| t.timestamp())),
            completed_at: Set(job.completed_at.map(|t| t.timestamp())),
        };

        GradingJobs::insert(model)
            .on_conflict(
                OnConflict::column(Column::Id)
                    .update_columns([
                        Column::Status,
                        Column::ErrorMessage,
                        Column::StartedAt,
                        Column::CompletedAt,
                    ])
                    .to_owned(),
            )
            .exec(conn)
            .await
            .map_err(|e| AutograderError::database_operation(format!("保存评分任务失败: {e}")))?;

        Ok(())
    }
}
