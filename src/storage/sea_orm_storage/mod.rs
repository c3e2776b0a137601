//! SeaORM 存储实现
//!
//! 统一的数据库存储层，支持 SQLite、PostgreSQL 和 MySQL。

mod assignments;
mod grading_jobs;
mod grading_results;
mod submissions;

use crate::config::DatabaseConfig;
use crate::errors::{AutograderError, Result};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::time::Duration;
use tracing::info;

/// SeaORM 存储实现
#[derive(Clone)]
pub struct SeaOrmStorage {
    pub(crate) db: DatabaseConnection,
}

impl SeaOrmStorage {
    /// 创建新的 SeaORM 存储实例并执行迁移
    pub async fn new_async(config: &DatabaseConfig) -> Result<Self> {
        let db_url = Self::build_database_url(&config.url)?;

        // 根据数据库类型选择连接方式
        let db = if db_url.starts_with("sqlite:") {
            Self::connect_sqlite(&db_url, config).await?
        } else {
            Self::connect_generic(&db_url, config).await?
        };

        // 运行迁移
        Migrator::up(&db, None)
            .await
            .map_err(|e| AutograderError::database_operation(format!("数据库迁移失败: {e}")))?;

        info!("SeaORM 存储初始化完成，数据库: {}", db_url);

        Ok(Self { db })
    }

    /// SQLite 专用连接（WAL + pragma 优化）
    async fn connect_sqlite(url: &str, config: &DatabaseConfig) -> Result<DatabaseConnection> {
        use sea_orm::SqlxSqliteConnector;
        use sea_orm::sqlx::sqlite::{
            SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
        };
        use std::str::FromStr;

        let opt = SqliteConnectOptions::from_str(url)
            .map_err(|e| AutograderError::database_config(format!("SQLite URL 解析失败: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(5))
            .pragma("cache_size", "-64000")
            .pragma("temp_store", "memory");

        // 内存数据库每个连接相互独立，只能使用单连接且不能被回收
        let in_memory = url.contains(":memory:");
        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new()
                .max_connections(config.pool_size)
                .min_connections(1)
                .idle_timeout(Duration::from_secs(300))
        };

        let pool = pool_options
            .test_before_acquire(true)
            .acquire_timeout(Duration::from_secs(config.timeout))
            .connect_with(opt)
            .await
            .map_err(|e| AutograderError::database_connection(format!("SQLite 连接失败: {e}")))?;

        Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
    }

    /// 通用连接（PostgreSQL、MySQL 等）
    async fn connect_generic(url: &str, config: &DatabaseConfig) -> Result<DatabaseConnection> {
        let mut opt = ConnectOptions::new(url);
        opt.max_connections(config.pool_size)
            .min_connections(2)
            .connect_timeout(Duration::from_secs(config.timeout))
            .acquire_timeout(Duration::from_secs(config.timeout))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
            .sqlx_logging(false);

        Database::connect(opt)
            .await
            .map_err(|e| AutograderError::database_connection(format!("无法连接到数据库: {e}")))
    }

    /// 从 URL 自动推断数据库类型并构建连接 URL
    fn build_database_url(url: &str) -> Result<String> {
        if url.starts_with("sqlite:") {
            Ok(url.to_string())
        } else if url == ":memory:" {
            Ok("sqlite::memory:".to_string())
        } else if url.ends_with(".db") || url.ends_with(".sqlite") {
            Ok(format!("sqlite://{}?mode=rwc", url))
        } else if url.starts_with("postgres://")
            || url.starts_with("postgresql://")
            || url.starts_with("mysql://")
            || url.starts_with("mariadb://")
        {
            Ok(url.to_string())
        } else {
            Err(AutograderError::database_config(format!(
                "无法从 URL 推断数据库类型: {url}. 支持: sqlite://, postgres://, mysql://, memory://, 或 .db/.sqlite 文件路径"
            )))
        }
    }
}

// Storage trait 实现
use crate::models::{
    assignments::{entities::Assignment, requests::CreateAssignmentRequest},
    grading::{
        entities::{GradingJob, GradingResult},
        requests::{CreateGradingJobRequest, CreateGradingResultRequest},
    },
    submissions::{entities::Submission, requests::CreateSubmissionRequest},
};
use crate::storage::Storage;
use async_trait::async_trait;

#[async_trait]
impl Storage for SeaOrmStorage {
    // 作业模块
    async fn create_assignment(&self, req: CreateAssignmentRequest) -> Result<Assignment> {
        self.create_assignment_impl(req).await
    }

    async fn get_assignment_by_id(&self, id: i64) -> Result<Option<Assignment>> {
        self.get_assignment_by_id_impl(id).await
    }

    // 提交模块
    async fn create_submission(&self, req: CreateSubmissionRequest) -> Result<Submission> {
        self.create_submission_impl(req).await
    }

    async fn get_submission_by_id(&self, id: i64) -> Result<Option<Submission>> {
        self.get_submission_by_id_impl(id).await
    }

    async fn save_submission(&self, submission: &Submission) -> Result<()> {
        self.save_submission_impl(&self.db, submission).await
    }

    // 评分任务模块
    async fn create_grading_job(&self, req: CreateGradingJobRequest) -> Result<GradingJob> {
        self.create_grading_job_impl(req).await
    }

    async fn get_grading_job_by_id(&self, id: i64) -> Result<Option<GradingJob>> {
        self.get_grading_job_by_id_impl(id).await
    }

    async fn list_grading_jobs_by_submission(
        &self,
        submission_id: i64,
    ) -> Result<Vec<GradingJob>> {
        self.list_grading_jobs_by_submission_impl(submission_id)
            .await
    }

    async fn save_grading_job(&self, job: &GradingJob) -> Result<()> {
        self.save_grading_job_impl(&self.db, job).await
    }

    // 评分结果模块
    async fn save_grading_result(&self, req: CreateGradingResultRequest) -> Result<GradingResult> {
        self.save_grading_result_impl(&self.db, req).await
    }

    async fn get_grading_result_by_job_id(&self, job_id: i64) -> Result<Option<GradingResult>> {
        self.get_grading_result_by_job_id_impl(job_id).await
    }

    async fn complete_grading(
        &self,
        job: &GradingJob,
        submission: &Submission,
        result: CreateGradingResultRequest,
    ) -> Result<GradingResult> {
        self.complete_grading_impl(job, submission, result).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::grading::entities::GradingJobStatus;
    use crate::models::submissions::entities::SubmissionStatus;

    async fn memory_db() -> SeaOrmStorage {
        let config = DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            pool_size: 1,
            timeout: 5,
        };
        SeaOrmStorage::new_async(&config)
            .await
            .expect("in-memory sqlite should open")
    }

    async fn seed_submission(storage: &SeaOrmStorage) -> Submission {
        let assignment = storage
            .create_assignment(CreateAssignmentRequest {
                title: "Derivatives".to_string(),
                rubric_text: "Award 5 pts for correct derivative".to_string(),
                reference_solution_text: "f'(x)=2x".to_string(),
                total_points: 5.0,
            })
            .await
            .unwrap();
        storage
            .create_submission(CreateSubmissionRequest {
                assignment_id: assignment.id,
                student_id: 7,
                file_path: "/tmp/sub.png".to_string(),
                file_type: Some("png".to_string()),
                auto_grade: false,
            })
            .await
            .unwrap()
    }

    #[test]
    fn test_build_database_url() {
        assert_eq!(
            SeaOrmStorage::build_database_url("grades.db").unwrap(),
            "sqlite://grades.db?mode=rwc"
        );
        assert_eq!(
            SeaOrmStorage::build_database_url(":memory:").unwrap(),
            "sqlite::memory:"
        );
        assert!(SeaOrmStorage::build_database_url("postgres://u@h/db").is_ok());
        let err = SeaOrmStorage::build_database_url("ftp://nowhere").unwrap_err();
        assert_eq!(err.code(), "E001");
    }

    #[tokio::test]
    async fn test_submission_reads_are_stable() {
        let storage = memory_db().await;
        let submission = seed_submission(&storage).await;
        assert_eq!(submission.status, SubmissionStatus::Pending);

        let first = storage.get_submission_by_id(submission.id).await.unwrap();
        let second = storage.get_submission_by_id(submission.id).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first, Some(submission));
        assert!(storage.get_submission_by_id(999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_complete_grading_writes_all_records() {
        let storage = memory_db().await;
        let mut submission = seed_submission(&storage).await;
        let mut job = storage
            .create_grading_job(CreateGradingJobRequest {
                submission_id: submission.id,
                status: GradingJobStatus::Processing,
                started_at: Some(chrono::Utc::now()),
            })
            .await
            .unwrap();

        job.complete(chrono::Utc::now()).unwrap();
        submission.status = SubmissionStatus::Graded;
        let result = storage
            .complete_grading(
                &job,
                &submission,
                CreateGradingResultRequest {
                    job_id: job.id,
                    score: 5.0,
                    max_score: 5.0,
                    feedback_json: "{}".to_string(),
                    confidence_score: 0.93,
                    ocr_text: "f'(x) = 2x".to_string(),
                    requires_review: false,
                },
            )
            .await
            .unwrap();

        let stored_job = storage.get_grading_job_by_id(job.id).await.unwrap().unwrap();
        assert_eq!(stored_job.status, GradingJobStatus::Completed);
        assert!(stored_job.completed_at.is_some());

        let stored_result = storage
            .get_grading_result_by_job_id(job.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored_result, result);
        assert_eq!(stored_result.ocr_text, "f'(x) = 2x");

        let stored_submission = storage
            .get_submission_by_id(submission.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored_submission.status, SubmissionStatus::Graded);
    }

    #[tokio::test]
    async fn test_save_grading_job_overwrites_record() {
        let storage = memory_db().await;
        let submission = seed_submission(&storage).await;
        let mut job = storage
            .create_grading_job(CreateGradingJobRequest {
                submission_id: submission.id,
                status: GradingJobStatus::Processing,
                started_at: Some(chrono::Utc::now()),
            })
            .await
            .unwrap();

        job.fail("ocr service unreachable", chrono::Utc::now())
            .unwrap();
        storage.save_grading_job(&job).await.unwrap();

        let jobs = storage
            .list_grading_jobs_by_submission(submission.id)
            .await
            .unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].status, GradingJobStatus::Failed);
        assert_eq!(
            jobs[0].error_message.as_deref(),
            Some("ocr service unreachable")
        );
    }
}
