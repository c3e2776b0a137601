use crate::config::AppConfig;
use crate::errors::Result;
use crate::gateway::create_gateway;
use crate::pipeline::GradingPipeline;
use crate::storage::{Storage, create_storage};
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct StartupContext {
    pub storage: Arc<dyn Storage>,
    pub pipeline: GradingPipeline,
}

/// 准备服务器启动的上下文
/// 包括存储（含迁移）、评分网关和评分流水线
pub async fn prepare_server_startup(config: &AppConfig) -> Result<StartupContext> {
    let storage = create_storage(&config.database).await?;
    warn!("Storage backend initialized and migrations completed");

    let grading = &config.grading;
    let gateway = create_gateway(grading)?;
    debug!(
        "Evaluation gateway ready (ocr: {}, evaluator: {}, timeout: {}s)",
        grading.ocr.base_url, grading.evaluator.base_url, grading.request_timeout_secs
    );

    let pipeline = GradingPipeline::new(storage.clone(), gateway, grading);
    if grading.exclusive_per_submission {
        info!("Per-submission grading exclusivity enabled, duplicate starts return 409");
    } else {
        debug!("Per-submission grading exclusivity disabled, duplicate starts create extra jobs");
    }

    Ok(StartupContext { storage, pipeline })
}
