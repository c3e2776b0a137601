pub mod assignments;

pub mod submissions;

pub mod grading;

pub use assignments::configure_assignments_routes;
pub use grading::configure_grading_routes;
pub use submissions::configure_submissions_routes;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GradingConfig;
    use crate::models::grading::entities::GradingJobStatus;
    use crate::pipeline::GradingPipeline;
    use crate::pipeline::tests::ScriptedGateway;
    use crate::storage::{Storage, memory_storage::MemoryStorage};
    use crate::utils::{json_error_handler, query_error_handler};
    use actix_web::http::StatusCode;
    use actix_web::{App, test, web};
    use serde_json::{Value, json};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::Semaphore;

    fn state(gateway: ScriptedGateway) -> (Arc<dyn Storage>, GradingPipeline) {
        state_with(gateway, &GradingConfig::default())
    }

    fn state_with(
        gateway: ScriptedGateway,
        config: &GradingConfig,
    ) -> (Arc<dyn Storage>, GradingPipeline) {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        let pipeline = GradingPipeline::new(storage.clone(), Arc::new(gateway), config);
        (storage, pipeline)
    }

    macro_rules! init_app {
        ($storage:expr, $pipeline:expr) => {
            test::init_service(
                App::new()
                    .app_data(web::QueryConfig::default().error_handler(query_error_handler))
                    .app_data(web::JsonConfig::default().error_handler(json_error_handler))
                    .app_data(web::Data::new($storage.clone()))
                    .app_data(web::Data::new($pipeline.clone()))
                    .configure(configure_assignments_routes)
                    .configure(configure_submissions_routes)
                    .configure(configure_grading_routes),
            )
            .await
        };
    }

    macro_rules! send {
        ($app:expr, $req:expr) => {{
            let resp = test::call_service(&$app, $req.to_request()).await;
            let status = resp.status();
            let body: Value = test::read_body_json(resp).await;
            (status, body)
        }};
    }

    async fn wait_for_terminal(storage: &Arc<dyn Storage>, job_id: i64) -> GradingJobStatus {
        for _ in 0..200 {
            let job = storage.get_grading_job_by_id(job_id).await.unwrap().unwrap();
            if job.status.is_terminal() {
                return job.status;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("grading job {job_id} did not finish");
    }

    fn assignment_body() -> Value {
        json!({
            "title": "Derivatives",
            "rubric_text": "Award 5 pts for correct derivative",
            "reference_solution_text": "f'(x)=2x",
            "total_points": 5.0
        })
    }

    #[actix_web::test]
    async fn test_manual_grading_flow() {
        let (storage, pipeline) = state(ScriptedGateway::derivative_full_marks());
        let app = init_app!(storage, pipeline);

        let (status, body) = send!(
            app,
            test::TestRequest::post()
                .uri("/api/v1/assignments")
                .set_json(assignment_body())
        );
        assert_eq!(status, StatusCode::CREATED);
        let assignment_id = body["data"]["id"].as_i64().unwrap();

        let (status, body) = send!(
            app,
            test::TestRequest::post()
                .uri("/api/v1/submissions")
                .set_json(json!({
                    "assignment_id": assignment_id,
                    "student_id": 1001,
                    "file_path": "/uploads/derivative.png",
                    "auto_grade": false
                }))
        );
        assert_eq!(status, StatusCode::CREATED);
        assert!(body["data"]["grading_job"].is_null());
        assert_eq!(body["data"]["submission"]["status"], "PENDING");
        let submission_id = body["data"]["submission"]["id"].as_i64().unwrap();

        let (status, body) = send!(
            app,
            test::TestRequest::post()
                .uri("/api/v1/grading/jobs")
                .set_json(json!({ "submission_id": submission_id }))
        );
        assert_eq!(status, StatusCode::ACCEPTED);
        assert_eq!(body["code"], 0);
        assert_eq!(body["data"]["status"], "PROCESSING");
        let job_id = body["data"]["id"].as_i64().unwrap();

        assert_eq!(
            wait_for_terminal(&storage, job_id).await,
            GradingJobStatus::Completed
        );

        let (status, body) = send!(
            app,
            test::TestRequest::get().uri(&format!("/api/v1/grading/jobs/{job_id}"))
        );
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["status"], "COMPLETED");

        let (status, body) = send!(
            app,
            test::TestRequest::get().uri(&format!("/api/v1/grading/jobs/{job_id}/result"))
        );
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["score"], 5.0);
        assert_eq!(body["data"]["ocr_text"], "f'(x) = 2x");
        assert_eq!(body["data"]["requires_review"], false);

        let (_, body) = send!(
            app,
            test::TestRequest::get().uri(&format!("/api/v1/submissions/{submission_id}"))
        );
        assert_eq!(body["data"]["status"], "GRADED");

        let (status, body) = send!(
            app,
            test::TestRequest::get().uri(&format!("/api/v1/submissions/{submission_id}/jobs"))
        );
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["items"].as_array().unwrap().len(), 1);
    }

    #[actix_web::test]
    async fn test_submission_starts_grading_by_default() {
        let (storage, pipeline) = state(ScriptedGateway::derivative_full_marks());
        let app = init_app!(storage, pipeline);

        let (_, body) = send!(
            app,
            test::TestRequest::post()
                .uri("/api/v1/assignments")
                .set_json(assignment_body())
        );
        let assignment_id = body["data"]["id"].as_i64().unwrap();

        let (status, body) = send!(
            app,
            test::TestRequest::post()
                .uri("/api/v1/submissions")
                .set_json(json!({
                    "assignment_id": assignment_id,
                    "student_id": 7,
                    "file_path": "/uploads/seven.png"
                }))
        );
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["data"]["submission"]["status"], "PROCESSING");
        let job_id = body["data"]["grading_job"]["id"].as_i64().unwrap();
        assert_eq!(
            wait_for_terminal(&storage, job_id).await,
            GradingJobStatus::Completed
        );
    }

    #[actix_web::test]
    async fn test_start_grading_for_missing_submission() {
        let (storage, pipeline) = state(ScriptedGateway::derivative_full_marks());
        let app = init_app!(storage, pipeline);

        let (status, body) = send!(
            app,
            test::TestRequest::post()
                .uri("/api/v1/grading/jobs")
                .set_json(json!({ "submission_id": 999 }))
        );
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], 3004);
        assert!(
            storage
                .list_grading_jobs_by_submission(999)
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[actix_web::test]
    async fn test_duplicate_start_conflicts_and_result_is_pending() {
        let gate = Arc::new(Semaphore::new(0));
        let config = GradingConfig {
            exclusive_per_submission: true,
            ..GradingConfig::default()
        };
        let (storage, pipeline) = state_with(
            ScriptedGateway {
                gate: Some(gate.clone()),
                ..ScriptedGateway::derivative_full_marks()
            },
            &config,
        );
        let submission = crate::pipeline::tests::seed(storage.as_ref()).await;
        let app = init_app!(storage, pipeline);

        let (status, body) = send!(
            app,
            test::TestRequest::post()
                .uri("/api/v1/grading/jobs")
                .set_json(json!({ "submission_id": submission.id }))
        );
        assert_eq!(status, StatusCode::ACCEPTED);
        let job_id = body["data"]["id"].as_i64().unwrap();

        let (status, body) = send!(
            app,
            test::TestRequest::post()
                .uri("/api/v1/grading/jobs")
                .set_json(json!({ "submission_id": submission.id }))
        );
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], 4009);

        let (status, body) = send!(
            app,
            test::TestRequest::get().uri(&format!("/api/v1/grading/jobs/{job_id}/result"))
        );
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], 4005);

        gate.add_permits(1);
        assert_eq!(
            wait_for_terminal(&storage, job_id).await,
            GradingJobStatus::Completed
        );
    }

    #[actix_web::test]
    async fn test_bad_requests_use_envelope() {
        let (storage, pipeline) = state(ScriptedGateway::derivative_full_marks());
        let app = init_app!(storage, pipeline);

        let (status, body) = send!(
            app,
            test::TestRequest::post()
                .uri("/api/v1/grading/jobs")
                .insert_header(("content-type", "application/json"))
                .set_payload("{\"submission_id\": \"forty-two\"}")
        );
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], 1000);

        let (status, _) = send!(
            app,
            test::TestRequest::get().uri("/api/v1/grading/jobs/abc")
        );
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = send!(
            app,
            test::TestRequest::post()
                .uri("/api/v1/assignments")
                .set_json(json!({ "title": "  ", "total_points": 5.0 }))
        );
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], 2022);

        let (status, body) = send!(
            app,
            test::TestRequest::post()
                .uri("/api/v1/submissions")
                .set_json(json!({
                    "assignment_id": 12345,
                    "student_id": 1,
                    "file_path": "/uploads/x.png"
                }))
        );
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], 2004);
    }
}
