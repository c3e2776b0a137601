pub mod result;
pub mod start;
pub mod status;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::pipeline::GradingPipeline;

pub struct GradingService {
    pipeline: Option<GradingPipeline>,
}

impl GradingService {
    pub fn new_lazy() -> Self {
        Self { pipeline: None }
    }

    pub(crate) fn get_pipeline(&self, request: &HttpRequest) -> ActixResult<GradingPipeline> {
        match &self.pipeline {
            Some(pipeline) => Ok(pipeline.clone()),
            None => super::app_state::<GradingPipeline>(request),
        }
    }

    pub async fn start_grading(
        &self,
        request: &HttpRequest,
        submission_id: i64,
    ) -> ActixResult<HttpResponse> {
        start::start_grading(self, request, submission_id).await
    }

    pub async fn get_job(&self, request: &HttpRequest, job_id: i64) -> ActixResult<HttpResponse> {
        status::get_job(self, request, job_id).await
    }

    pub async fn get_job_result(
        &self,
        request: &HttpRequest,
        job_id: i64,
    ) -> ActixResult<HttpResponse> {
        result::get_job_result(self, request, job_id).await
    }
}
