//! 评分任务实体

use sea_orm::entity::prelude::*;

use crate::errors::AutograderError;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "grading_jobs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub submission_id: i64,
    pub status: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub error_message: Option<String>,
    pub created_at: i64,
    pub started_at: Option<i64>,
    pub completed_at: Option<i64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::submissions::Entity",
        from = "Column::SubmissionId",
        to = "super::submissions::Column::Id"
    )]
    Submission,
    #[sea_orm(has_one = "super::grading_results::Entity")]
    GradingResult,
}

impl Related<super::submissions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Submission.def()
    }
}

impl Related<super::grading_results::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GradingResult.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// 从数据库模型转换为业务模型
impl Model {
    pub fn into_grading_job(
        self,
    ) -> crate::errors::Result<crate::models::grading::entities::GradingJob> {
        use crate::models::grading::entities::GradingJob;

        let status = self.status.parse().map_err(|e| {
            AutograderError::database_operation(format!("评分任务 {} 状态无效: {e}", self.id))
        })?;

        Ok(GradingJob {
            id: self.id,
            submission_id: self.submission_id,
            status,
            error_message: self.error_message,
            created_at: super::from_timestamp(self.created_at),
            started_at: self.started_at.map(super::from_timestamp),
            completed_at: self.completed_at.map(super::from_timestamp),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::grading::entities::GradingJobStatus;

    fn model(status: &str) -> Model {
        Model {
            id: 3,
            submission_id: 9,
            status: status.to_string(),
            error_message: None,
            created_at: 1_700_000_000,
            started_at: Some(1_700_000_001),
            completed_at: None,
        }
    }

    #[test]
    fn test_into_grading_job() {
        let job = model("PROCESSING").into_grading_job().unwrap();
        assert_eq!(job.status, GradingJobStatus::Processing);
        assert_eq!(job.submission_id, 9);
        assert_eq!(job.started_at.unwrap().timestamp(), 1_700_000_001);
    }

    #[test]
    fn test_unknown_status_is_rejected() {
        let err = model("RUNNING").into_grading_job().unwrap_err();
        assert_eq!(err.code(), "E003");
    }
}
