//! 提交存储操作

use super::SeaOrmStorage;
use crate::entity::submissions::{ActiveModel, Column, Entity as Submissions};
use crate::errors::{AutograderError, Result};
use crate::models::submissions::{
    entities::{Submission, SubmissionStatus},
    requests::CreateSubmissionRequest,
};
use sea_orm::sea_query::OnConflict;
use sea_orm::{ActiveModelTrait, ConnectionTrait, EntityTrait, Set};

impl SeaOrmStorage {
    /// 创建提交
    pub async fn create_submission_impl(&self, req: CreateSubmissionRequest) -> Result<Submission> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            assignment_id: Set(req.assignment_id),
            student_id: Set(req.student_id),
            file_path: Set(req.file_path),
            file_type: Set(req.file_type),
            status: Set(SubmissionStatus::Pending.to_string()),
            submitted_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| AutograderError::database_operation(format!("创建提交失败: {e}")))?;

        result.into_submission()
    }

    /// 通过 ID 获取提交
    pub async fn get_submission_by_id_impl(&self, submission_id: i64) -> Result<Option<Submission>> {
        let result = Submissions::find_by_id(submission_id)
            .one(&self.db)
            .await
            .map_err(|e| AutograderError::database_operation(format!("查询提交失败: {e}")))?;

        result.map(|m| m.into_submission()).transpose()
    }

    /// 整条写入提交（存在则覆盖）
    pub(super) async fn save_submission_impl<C: ConnectionTrait>(
        &self,
        conn: &C,
        submission: &Submission,
    ) -> Result<()> {
        let model = ActiveModel {
            id: Set(submission.id),
            assignment_id: Set(submission.assignment_id),
            student_id: Set(submission.student_id),
            file_path: Set(submission.file_path.clone()),
            file_type: Set(submission.file_type.clone()),
            status: Set(submission.status.to_string()),
            submitted_at: Set(submission.submitted_at.timestamp()),
        };

        Submissions::insert(model)
            .on_conflict(
                OnConflict::column(Column::Id)
                    .update_columns([
                        Column::AssignmentId,
                        Column::StudentId,
                        Column::FilePath,
                        Column::FileType,
                        Column::Status,
                        Column::SubmittedAt,
                    ])
                    .to_owned(),
            )
            .exec(conn)
            .await
            .map_err(|e| AutograderError::database_operation(format!("保存提交失败: {e}")))?;

        Ok(())
    }
}
