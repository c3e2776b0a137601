use std::time::Duration;

use tracing::warn;

use super::{Evaluation, EvaluationGateway};
use crate::errors::{AutograderError, Result};

// 退避时间最多翻倍的次数
const MAX_BACKOFF_SHIFT: u32 = 6;

/// 为任意网关增加指数退避重试
///
/// 只重试 `ExternalService` 错误，其余错误原样返回。
pub struct RetryingGateway<G> {
    inner: G,
    max_retries: u32,
    backoff: Duration,
}

impl<G: EvaluationGateway> RetryingGateway<G> {
    pub fn new(inner: G, max_retries: u32, backoff: Duration) -> Self {
        Self {
            inner,
            max_retries,
            backoff,
        }
    }

    fn delay_for(&self, attempt: u32) -> Duration {
        self.backoff
            .checked_mul(2u32.pow(attempt.min(MAX_BACKOFF_SHIFT)))
            .unwrap_or(Duration::MAX)
    }

    async fn with_retry<T, F, Fut>(&self, operation: &str, call: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<T>>,
    {
        let mut attempt = 0;
        loop {
            match call().await {
                Err(AutograderError::ExternalService(msg)) if attempt < self.max_retries => {
                    let delay = self.delay_for(attempt);
                    attempt += 1;
                    warn!(
                        "{} failed (attempt {}/{}), retrying in {:?}: {}",
                        operation,
                        attempt,
                        self.max_retries + 1,
                        delay,
                        msg
                    );
                    tokio::time::sleep(delay).await;
                }
                other => return other,
            }
        }
    }
}

#[async_trait::async_trait]
impl<G: EvaluationGateway> EvaluationGateway for RetryingGateway<G> {
    async fn extract_text(&self, file_path: &str) -> Result<String> {
        self.with_retry("extract_text", || self.inner.extract_text(file_path))
            .await
    }

    async fn evaluate(
        &self,
        student_text: &str,
        reference_solution_text: &str,
        rubric_text: &str,
    ) -> Result<Evaluation> {
        self.with_retry("evaluate", || {
            self.inner
                .evaluate(student_text, reference_solution_text, rubric_text)
        })
        .await
    }
}
