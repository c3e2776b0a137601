//! 内存存储实现
//!
//! 进程内的存储后端，用于测试和演示。所有表放在同一把锁下，
//! 因此 `complete_grading` 的三次写入对读者是原子的。

use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::errors::{AutograderError, Result};
use crate::models::{
    assignments::{entities::Assignment, requests::CreateAssignmentRequest},
    grading::{
        entities::{GradingJob, GradingResult},
        requests::{CreateGradingJobRequest, CreateGradingResultRequest},
    },
    submissions::{
        entities::{Submission, SubmissionStatus},
        requests::CreateSubmissionRequest,
    },
};
use crate::storage::Storage;

const MEMORY_URL_SCHEME: &str = "memory://";

#[derive(Debug, Default)]
struct Tables {
    next_id: i64,
    assignments: BTreeMap<i64, Assignment>,
    submissions: BTreeMap<i64, Submission>,
    grading_jobs: BTreeMap<i64, GradingJob>,
    grading_results: BTreeMap<i64, GradingResult>,
}

impl Tables {
    fn allocate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn insert_result(&mut self, req: CreateGradingResultRequest) -> Result<GradingResult> {
        if self.grading_results.values().any(|r| r.job_id == req.job_id) {
            return Err(AutograderError::database_operation(format!(
                "评分任务 {} 已存在评分结果",
                req.job_id
            )));
        }
        let result = GradingResult {
            id: self.allocate_id(),
            job_id: req.job_id,
            score: req.score,
            max_score: req.max_score,
            feedback_json: req.feedback_json,
            confidence_score: req.confidence_score,
            ocr_text: req.ocr_text,
            requires_review: req.requires_review,
            reviewed_by: None,
            created_at: now(),
        };
        self.grading_results.insert(result.id, result.clone());
        Ok(result)
    }

    // 任务所属提交创建后不可变
    fn upsert_job(&mut self, job: &GradingJob) {
        let submission_id = self
            .grading_jobs
            .get(&job.id)
            .map_or(job.submission_id, |existing| existing.submission_id);
        let mut job = job.clone();
        job.submission_id = submission_id;
        self.grading_jobs.insert(job.id, job);
    }
}

// 与数据库后端保持一致，时间戳精确到秒
fn now() -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(Utc::now().timestamp(), 0).unwrap_or_default()
}

/// 内存存储
#[derive(Debug, Default)]
pub struct MemoryStorage {
    tables: RwLock<Tables>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// 是否为内存存储的 URL
    pub fn accepts(url: &str) -> bool {
        url.starts_with(MEMORY_URL_SCHEME)
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>> {
        self.tables
            .read()
            .map_err(|_| AutograderError::database_operation("内存存储锁已损坏"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>> {
        self.tables
            .write()
            .map_err(|_| AutograderError::database_operation("内存存储锁已损坏"))
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn create_assignment(&self, req: CreateAssignmentRequest) -> Result<Assignment> {
        let mut tables = self.write()?;
        let assignment = Assignment {
            id: tables.allocate_id(),
            title: req.title,
            rubric_text: req.rubric_text,
            reference_solution_text: req.reference_solution_text,
            total_points: req.total_points,
            created_at: now(),
        };
        tables.assignments.insert(assignment.id, assignment.clone());
        Ok(assignment)
    }

    async fn get_assignment_by_id(&self, id: i64) -> Result<Option<Assignment>> {
        Ok(self.read()?.assignments.get(&id).cloned())
    }

    async fn create_submission(&self, req: CreateSubmissionRequest) -> Result<Submission> {
        let mut tables = self.write()?;
        if !tables.assignments.contains_key(&req.assignment_id) {
            return Err(AutograderError::database_operation(format!(
                "外键约束失败: 作业 {} 不存在",
                req.assignment_id
            )));
        }
        let submission = Submission {
            id: tables.allocate_id(),
            assignment_id: req.assignment_id,
            student_id: req.student_id,
            file_path: req.file_path,
            file_type: req.file_type,
            status: SubmissionStatus::Pending,
            submitted_at: now(),
        };
        tables.submissions.insert(submission.id, submission.clone());
        Ok(submission)
    }

    async fn get_submission_by_id(&self, id: i64) -> Result<Option<Submission>> {
        Ok(self.read()?.submissions.get(&id).cloned())
    }

    async fn save_submission(&self, submission: &Submission) -> Result<()> {
        self.write()?
            .submissions
            .insert(submission.id, submission.clone());
        Ok(())
    }

    async fn create_grading_job(&self, req: CreateGradingJobRequest) -> Result<GradingJob> {
        let mut tables = self.write()?;
        if !tables.submissions.contains_key(&req.submission_id) {
            return Err(AutograderError::database_operation(format!(
                "外键约束失败: 提交 {} 不存在",
                req.submission_id
            )));
        }
        let job = GradingJob {
            id: tables.allocate_id(),
            submission_id: req.submission_id,
            status: req.status,
            error_message: None,
            created_at: now(),
            started_at: req.started_at,
            completed_at: None,
        };
        tables.grading_jobs.insert(job.id, job.clone());
        Ok(job)
    }

    async fn get_grading_job_by_id(&self, id: i64) -> Result<Option<GradingJob>> {
        Ok(self.read()?.grading_jobs.get(&id).cloned())
    }

    async fn list_grading_jobs_by_submission(
        &self,
        submission_id: i64,
    ) -> Result<Vec<GradingJob>> {
        // id 单调递增，倒序即为创建时间倒序
        Ok(self
            .read()?
            .grading_jobs
            .values()
            .rev()
            .filter(|job| job.submission_id == submission_id)
            .cloned()
            .collect())
    }

    async fn save_grading_job(&self, job: &GradingJob) -> Result<()> {
        self.write()?.upsert_job(job);
        Ok(())
    }

    async fn save_grading_result(&self, req: CreateGradingResultRequest) -> Result<GradingResult> {
        self.write()?.insert_result(req)
    }

    async fn get_grading_result_by_job_id(&self, job_id: i64) -> Result<Option<GradingResult>> {
        Ok(self
            .read()?
            .grading_results
            .values()
            .find(|r| r.job_id == job_id)
            .cloned())
    }

    async fn complete_grading(
        &self,
        job: &GradingJob,
        submission: &Submission,
        result: CreateGradingResultRequest,
    ) -> Result<GradingResult> {
        let mut tables = self.write()?;
        let result = tables.insert_result(result)?;
        tables.upsert_job(job);
        tables
            .submissions
            .insert(submission.id, submission.clone());
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::grading::entities::GradingJobStatus;

    async fn seeded() -> (MemoryStorage, Submission) {
        let storage = MemoryStorage::new();
        let assignment = storage
            .create_assignment(CreateAssignmentRequest {
                title: "Integration".to_string(),
                rubric_text: "5 pts power rule".to_string(),
                reference_solution_text: "(x^3)/3 + C".to_string(),
                total_points: 10.0,
            })
            .await
            .unwrap();
        let submission = storage
            .create_submission(CreateSubmissionRequest {
                assignment_id: assignment.id,
                student_id: 3,
                file_path: "/uploads/a.png".to_string(),
                file_type: None,
                auto_grade: false,
            })
            .await
            .unwrap();
        (storage, submission)
    }

    fn result_for(job_id: i64) -> CreateGradingResultRequest {
        CreateGradingResultRequest {
            job_id,
            score: 8.0,
            max_score: 10.0,
            feedback_json: "[]".to_string(),
            confidence_score: 0.5,
            ocr_text: "x^3/3".to_string(),
            requires_review: true,
        }
    }

    #[test]
    fn test_accepts_memory_scheme_only() {
        assert!(MemoryStorage::accepts("memory://"));
        assert!(!MemoryStorage::accepts("sqlite::memory:"));
    }

    #[tokio::test]
    async fn test_submission_lookup_is_idempotent() {
        let (storage, submission) = seeded().await;
        let a = storage.get_submission_by_id(submission.id).await.unwrap();
        let b = storage.get_submission_by_id(submission.id).await.unwrap();
        assert_eq!(a, b);
        assert!(storage.get_submission_by_id(-1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_second_result_for_same_job_is_rejected() {
        let (storage, submission) = seeded().await;
        let job = storage
            .create_grading_job(CreateGradingJobRequest {
                submission_id: submission.id,
                status: GradingJobStatus::Processing,
                started_at: None,
            })
            .await
            .unwrap();

        storage.save_grading_result(result_for(job.id)).await.unwrap();
        let err = storage
            .save_grading_result(result_for(job.id))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "E003");
    }

    #[tokio::test]
    async fn test_job_submission_reference_is_immutable() {
        let (storage, submission) = seeded().await;
        let mut job = storage
            .create_grading_job(CreateGradingJobRequest {
                submission_id: submission.id,
                status: GradingJobStatus::Processing,
                started_at: None,
            })
            .await
            .unwrap();

        job.submission_id = 12345;
        storage.save_grading_job(&job).await.unwrap();
        let stored = storage.get_grading_job_by_id(job.id).await.unwrap().unwrap();
        assert_eq!(stored.submission_id, submission.id);
    }

    #[tokio::test]
    async fn test_job_for_missing_submission_is_rejected() {
        let storage = MemoryStorage::new();
        let err = storage
            .create_grading_job(CreateGradingJobRequest {
                submission_id: 999,
                status: GradingJobStatus::Processing,
                started_at: None,
            })
            .await
            .unwrap_err();
        assert_eq!(err.code(), "E003");
    }

    #[tokio::test]
    async fn test_completion_keeps_job_submission_reference() {
        let (storage, submission) = seeded().await;
        let mut job = storage
            .create_grading_job(CreateGradingJobRequest {
                submission_id: submission.id,
                status: GradingJobStatus::Processing,
                started_at: Some(Utc::now()),
            })
            .await
            .unwrap();

        job.complete(Utc::now()).unwrap();
        job.submission_id = 12345;
        storage
            .complete_grading(&job, &submission, result_for(job.id))
            .await
            .unwrap();

        let stored = storage.get_grading_job_by_id(job.id).await.unwrap().unwrap();
        assert_eq!(stored.status, GradingJobStatus::Completed);
        assert_eq!(stored.submission_id, submission.id);
        assert_eq!(
            storage
                .list_grading_jobs_by_submission(submission.id)
                .await
                .unwrap()
                .len(),
            1
        );
    }
}
