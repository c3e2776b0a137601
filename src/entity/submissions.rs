//! 提交实体

use sea_orm::entity::prelude::*;

use crate::errors::AutograderError;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "submissions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub assignment_id: i64,
    pub student_id: i64,
    pub file_path: String,
    pub file_type: Option<String>,
    pub status: String,
    pub submitted_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::assignments::Entity",
        from = "Column::AssignmentId",
        to = "super::assignments::Column::Id"
    )]
    Assignment,
    #[sea_orm(has_many = "super::grading_jobs::Entity")]
    GradingJobs,
}

impl Related<super::assignments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Assignment.def()
    }
}

impl Related<super::grading_jobs::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GradingJobs.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// 从数据库模型转换为业务模型
impl Model {
    pub fn into_submission(
        self,
    ) -> crate::errors::Result<crate::models::submissions::entities::Submission> {
        use crate::models::submissions::entities::Submission;

        let status = self.status.parse().map_err(|e| {
            AutograderError::database_operation(format!("提交 {} 状态无效: {e}", self.id))
        })?;

        Ok(Submission {
            id: self.id,
            assignment_id: self.assignment_id,
            student_id: self.student_id,
            file_path: self.file_path,
            file_type: self.file_type,
            status,
            submitted_at: super::from_timestamp(self.submitted_at),
        })
    }
}
