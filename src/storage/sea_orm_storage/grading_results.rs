//! 评分结果存储操作

use super::SeaOrmStorage;
use crate::entity::grading_results::{ActiveModel, Column, Entity as GradingResults};
use crate::errors::{AutograderError, Result};
use crate::models::{
    grading::{
        entities::{GradingJob, GradingResult},
        requests::CreateGradingResultRequest,
    },
    submissions::entities::Submission,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};

impl SeaOrmStorage {
    /// 写入评分结果
    pub(super) async fn save_grading_result_impl<C: ConnectionTrait>(
        &self,
        conn: &C,
        req: CreateGradingResultRequest,
    ) -> Result<GradingResult> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            job_id: Set(req.job_id),
            score: Set(req.score),
            max_score: Set(req.max_score),
            feedback_json: Set(req.feedback_json),
            confidence_score: Set(req.confidence_score),
            ocr_text: Set(req.ocr_text),
            requires_review: Set(req.requires_review),
            reviewed_by: Set(None),
            created_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(conn)
            .await
            .map_err(|e| AutograderError::database_operation(format!("保存评分结果失败: {e}")))?;

        Ok(result.into_grading_result())
    }

    /// 通过任务 ID 获取评分结果
    pub async fn get_grading_result_by_job_id_impl(
        &self,
        job_id: i64,
    ) -> Result<Option<GradingResult>> {
        let result = GradingResults::find()
            .filter(Column::JobId.eq(job_id))
            .one(&self.db)
            .await
            .map_err(|e| AutograderError::database_operation(format!("查询评分结果失败: {e}")))?;

        Ok(result.map(|m| m.into_grading_result()))
    }

    /// 结果、任务、提交三者在一个事务内落库
    pub async fn complete_grading_impl(
        &self,
        job: &GradingJob,
        submission: &Submission,
        req: CreateGradingResultRequest,
    ) -> Result<GradingResult> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AutograderError::database_operation(format!("开启事务失败: {e}")))?;

        let result = self.save_grading_result_impl(&txn, req).await?;
        self.save_grading_job_impl(&txn, job).await?;
        self.save_submission_impl(&txn, submission).await?;

        txn.commit()
            .await
            .map_err(|e| AutograderError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(result)
    }
}
