//! 评分结果实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "grading_results")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub job_id: i64,
    pub score: f64,
    pub max_score: f64,
    #[sea_orm(column_type = "Text")]
    pub feedback_json: String,
    pub confidence_score: f64,
    #[sea_orm(column_type = "Text")]
    pub ocr_text: String,
    pub requires_review: bool,
    pub reviewed_by: Option<i64>,
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::grading_jobs::Entity",
        from = "Column::JobId",
        to = "super::grading_jobs::Column::Id"
    )]
    GradingJob,
}

impl Related<super::grading_jobs::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GradingJob.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// 从数据库模型转换为业务模型
impl Model {
    pub fn into_grading_result(self) -> crate::models::grading::entities::GradingResult {
        use crate::models::grading::entities::GradingResult;

        GradingResult {
            id: self.id,
            job_id: self.job_id,
            score: self.score,
            max_score: self.max_score,
            feedback_json: self.feedback_json,
            confidence_score: self.confidence_score,
            ocr_text: self.ocr_text,
            requires_review: self.requires_review,
            reviewed_by: self.reviewed_by,
            created_at: super::from_timestamp(self.created_at),
        }
    }
}
