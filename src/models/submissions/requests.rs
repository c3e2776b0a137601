use serde::Deserialize;
use ts_rs::TS;

use crate::errors::{AutograderError, Result};

/// 创建提交请求
///
/// 文件上传不在本服务内处理，这里只登记已保存文件的路径。
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/submission.ts")]
pub struct CreateSubmissionRequest {
    pub assignment_id: i64,
    pub student_id: i64,
    pub file_path: String,
    pub file_type: Option<String>,
    /// 创建后立即开始评分，默认开启
    #[serde(default = "default_auto_grade")]
    pub auto_grade: bool,
}

fn default_auto_grade() -> bool {
    true
}

impl CreateSubmissionRequest {
    pub fn validate(&self) -> Result<()> {
        if self.file_path.trim().is_empty() {
            return Err(AutograderError::validation("文件路径不能为空"));
        }
        Ok(())
    }
}
