use serde::Deserialize;
use ts_rs::TS;

use crate::errors::{AutograderError, Result};

/// 创建作业请求
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/assignment.ts")]
pub struct CreateAssignmentRequest {
    pub title: String,
    // 评分标准和参考答案允许为空字符串，流水线不做校验
    #[serde(default)]
    pub rubric_text: String,
    #[serde(default)]
    pub reference_solution_text: String,
    pub total_points: f64,
}

impl CreateAssignmentRequest {
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(AutograderError::validation("作业标题不能为空"));
        }
        if !self.total_points.is_finite() || self.total_points < 0.0 {
            return Err(AutograderError::validation("作业总分必须为非负数"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(title: &str, total_points: f64) -> CreateAssignmentRequest {
        CreateAssignmentRequest {
            title: title.to_string(),
            rubric_text: String::new(),
            reference_solution_text: String::new(),
            total_points,
        }
    }

    #[test]
    fn test_empty_rubric_is_accepted() {
        assert!(request("Calculus Quiz", 10.0).validate().is_ok());
    }

    #[test]
    fn test_rejects_blank_title_and_bad_points() {
        assert!(request("  ", 10.0).validate().is_err());
        assert!(request("Quiz", -1.0).validate().is_err());
        assert!(request("Quiz", f64::NAN).validate().is_err());
    }
}
