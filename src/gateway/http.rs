use std::path::Path;
use std::time::Duration;

use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::{
    Evaluation, EvaluationGateway, EvaluationRequest, EvaluationResponse, ExtractionResponse,
};
use crate::config::GradingConfig;
use crate::errors::{AutograderError, Result};

const EXTRACT_PATH: &str = "/api/ocr/extract";
const EVALUATE_PATH: &str = "/api/grade/evaluate";
// 错误信息中最多保留的响应体长度
const MAX_ERROR_BODY: usize = 200;

/// 基于 HTTP 的评分网关
#[derive(Debug, Clone)]
pub struct HttpEvaluationGateway {
    client: reqwest::Client,
    extract_url: String,
    evaluate_url: String,
}

impl HttpEvaluationGateway {
    pub fn new(config: &GradingConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()
            .map_err(|e| AutograderError::external_service(format!("HTTP 客户端构建失败: {e}")))?;

        Ok(Self {
            client,
            extract_url: endpoint(&config.ocr.base_url, EXTRACT_PATH),
            evaluate_url: endpoint(&config.evaluator.base_url, EVALUATE_PATH),
        })
    }

    async fn parse_response<T: DeserializeOwned>(
        service: &str,
        response: reqwest::Response,
    ) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let body: String = body.chars().take(MAX_ERROR_BODY).collect();
            return Err(AutograderError::external_service(format!(
                "{service} service returned {status}: {body}"
            )));
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| {
            AutograderError::external_service(format!("malformed {service} response: {e}"))
        })
    }
}

fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), path)
}

#[async_trait::async_trait]
impl EvaluationGateway for HttpEvaluationGateway {
    async fn extract_text(&self, file_path: &str) -> Result<String> {
        let bytes = tokio::fs::read(file_path).await.map_err(|e| {
            AutograderError::external_service(format!(
                "cannot read submission file {file_path}: {e}"
            ))
        })?;
        let file_name = Path::new(file_path)
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("submission")
            .to_string();

        debug!(
            "Sending {} bytes of {} to OCR service",
            bytes.len(),
            file_name
        );
        let form = Form::new().part("file", Part::bytes(bytes).file_name(file_name));
        let response = self
            .client
            .post(&self.extract_url)
            .multipart(form)
            .send()
            .await?;

        let extraction: ExtractionResponse = Self::parse_response("OCR", response).await?;
        Ok(extraction.text)
    }

    async fn evaluate(
        &self,
        student_text: &str,
        reference_solution_text: &str,
        rubric_text: &str,
    ) -> Result<Evaluation> {
        let request = EvaluationRequest {
            student_answer: student_text,
            reference_solution: reference_solution_text,
            rubric_text,
        };
        let response = self
            .client
            .post(&self.evaluate_url)
            .json(&request)
            .send()
            .await?;

        let raw: EvaluationResponse = Self::parse_response("evaluator", response).await?;
        Evaluation::try_from(raw)
    }
}
