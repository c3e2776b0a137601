use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 创建作业表（评分标准与参考答案）
        manager
            .create_table(
                Table::create()
                    .table(Assignments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Assignments::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Assignments::Title).string().not_null())
                    .col(ColumnDef::new(Assignments::RubricText).text().not_null())
                    .col(
                        ColumnDef::new(Assignments::ReferenceSolutionText)
                            .text()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Assignments::TotalPoints).double().not_null())
                    .col(
                        ColumnDef::new(Assignments::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建提交表
        manager
            .create_table(
                Table::create()
                    .table(Submissions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Submissions::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Submissions::AssignmentId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Submissions::StudentId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Submissions::FilePath).string().not_null())
                    .col(ColumnDef::new(Submissions::FileType).string().null())
                    .col(ColumnDef::new(Submissions::Status).string().not_null())
                    .col(
                        ColumnDef::new(Submissions::SubmittedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Submissions::Table, Submissions::AssignmentId)
                            .to(Assignments::Table, Assignments::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建评分任务表
        manager
            .create_table(
                Table::create()
                    .table(GradingJobs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(GradingJobs::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(GradingJobs::SubmissionId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(GradingJobs::Status).string().not_null())
                    .col(ColumnDef::new(GradingJobs::ErrorMessage).text().null())
                    .col(
                        ColumnDef::new(GradingJobs::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(GradingJobs::StartedAt).big_integer().null())
                    .col(
                        ColumnDef::new(GradingJobs::CompletedAt)
                            .big_integer()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(GradingJobs::Table, GradingJobs::SubmissionId)
                            .to(Submissions::Table, Submissions::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建评分结果表
        manager
            .create_table(
                Table::create()
                    .table(GradingResults::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(GradingResults::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(GradingResults::JobId)
                            .big_integer()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(GradingResults::Score).double().not_null())
                    .col(ColumnDef::new(GradingResults::MaxScore).double().not_null())
                    .col(ColumnDef::new(GradingResults::FeedbackJson).text().not_null())
                    .col(
                        ColumnDef::new(GradingResults::ConfidenceScore)
                            .double()
                            .not_null(),
                    )
                    .col(ColumnDef::new(GradingResults::OcrText).text().not_null())
                    .col(
                        ColumnDef::new(GradingResults::RequiresReview)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(GradingResults::ReviewedBy)
                            .big_integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(GradingResults::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(GradingResults::Table, GradingResults::JobId)
                            .to(GradingJobs::Table, GradingJobs::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建索引
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_submissions_assignment_id")
                    .table(Submissions::Table)
                    .col(Submissions::AssignmentId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_grading_jobs_submission_id")
                    .table(GradingJobs::Table)
                    .col(GradingJobs::SubmissionId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_grading_jobs_status")
                    .table(GradingJobs::Table)
                    .col(GradingJobs::Status)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 按照创建的相反顺序删除
        manager
            .drop_table(Table::drop().table(GradingResults::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(GradingJobs::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Submissions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Assignments::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Assignments {
    #[sea_orm(iden = "assignments")]
    Table,
    Id,
    Title,
    RubricText,
    ReferenceSolutionText,
    TotalPoints,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Submissions {
    #[sea_orm(iden = "submissions")]
    Table,
    Id,
    AssignmentId,
    StudentId,
    FilePath,
    FileType,
    Status,
    SubmittedAt,
}

#[derive(DeriveIden)]
enum GradingJobs {
    #[sea_orm(iden = "grading_jobs")]
    Table,
    Id,
    SubmissionId,
    Status,
    ErrorMessage,
    CreatedAt,
    StartedAt,
    CompletedAt,
}

#[derive(DeriveIden)]
enum GradingResults {
    #[sea_orm(iden = "grading_results")]
    Table,
    Id,
    JobId,
    Score,
    MaxScore,
    FeedbackJson,
    ConfidenceScore,
    OcrText,
    RequiresReview,
    ReviewedBy,
    CreatedAt,
}
