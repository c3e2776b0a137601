//! 评分网关
//!
//! 封装两个远程调用：文字识别（OCR）与评分。网关只负责请求/响应映射和
//! 错误归类，所有失败都以 `ExternalService` 返回，不包含任何流水线逻辑。

mod http;
mod retry;

pub use http::HttpEvaluationGateway;
pub use retry::RetryingGateway;

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::GradingConfig;
use crate::errors::{AutograderError, Result};

#[async_trait::async_trait]
pub trait EvaluationGateway: Send + Sync {
    /// 读取提交文件并返回识别出的文本
    async fn extract_text(&self, file_path: &str) -> Result<String>;

    /// 根据参考答案和评分标准为学生答案打分
    async fn evaluate(
        &self,
        student_text: &str,
        reference_solution_text: &str,
        rubric_text: &str,
    ) -> Result<Evaluation>;
}

/// 文字识别响应
#[derive(Debug, Deserialize)]
pub(crate) struct ExtractionResponse {
    pub text: String,
}

/// 评分请求
#[derive(Debug, Serialize)]
pub(crate) struct EvaluationRequest<'a> {
    pub student_answer: &'a str,
    pub reference_solution: &'a str,
    pub rubric_text: &'a str,
}

/// 评分服务原始响应，`requires_review` 可缺省或为 null
#[derive(Debug, Deserialize)]
pub(crate) struct EvaluationResponse {
    pub score: f64,
    pub max_score: f64,
    pub feedback_json: String,
    pub confidence_score: f64,
    #[serde(default)]
    pub requires_review: Option<bool>,
}

/// 评分结果
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub score: f64,
    pub max_score: f64,
    pub feedback_json: String,
    pub confidence_score: f64,
    pub requires_review: bool,
}

impl Evaluation {
    /// 分数必须是有限数，置信度必须落在 [0, 1]
    pub fn validate(&self) -> Result<()> {
        if !self.score.is_finite() || !self.max_score.is_finite() {
            return Err(AutograderError::external_service(
                "malformed evaluation response: score is not a finite number",
            ));
        }
        if !(0.0..=1.0).contains(&self.confidence_score) {
            return Err(AutograderError::external_service(format!(
                "malformed evaluation response: confidence_score {} is outside [0, 1]",
                self.confidence_score
            )));
        }
        Ok(())
    }
}

impl TryFrom<EvaluationResponse> for Evaluation {
    type Error = AutograderError;

    fn try_from(raw: EvaluationResponse) -> Result<Self> {
        let evaluation = Self {
            score: raw.score,
            max_score: raw.max_score,
            feedback_json: raw.feedback_json,
            confidence_score: raw.confidence_score,
            requires_review: raw.requires_review.unwrap_or(false),
        };
        evaluation.validate()?;
        Ok(evaluation)
    }
}

/// 按配置构建网关，配置了重试时在外层包一层重试
pub fn create_gateway(config: &GradingConfig) -> Result<Arc<dyn EvaluationGateway>> {
    Ok(with_retry_policy(HttpEvaluationGateway::new(config)?, config))
}

fn with_retry_policy<G>(gateway: G, config: &GradingConfig) -> Arc<dyn EvaluationGateway>
where
    G: EvaluationGateway + 'static,
{
    if config.max_retries == 0 {
        return Arc::new(gateway);
    }
    tracing::warn!(
        "Remote calls will be retried up to {} time(s) with {} ms initial backoff",
        config.max_retries,
        config.retry_backoff_ms
    );
    Arc::new(RetryingGateway::new(
        gateway,
        config.max_retries,
        std::time::Duration::from_millis(config.retry_backoff_ms),
    ))
}
