use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 提交状态
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, TS)]
#[serde(rename_all = "UPPERCASE")]
#[ts(export, export_to = "../frontend/src/types/generated/submission.ts")]
pub enum SubmissionStatus {
    Pending,    // 待评分
    Processing, // 评分中
    Graded,     // 已评分
    Failed,     // 评分失败
}

impl SubmissionStatus {
    pub const PENDING: &'static str = "PENDING";
    pub const PROCESSING: &'static str = "PROCESSING";
    pub const GRADED: &'static str = "GRADED";
    pub const FAILED: &'static str = "FAILED";
}

impl<'de> Deserialize<'de> for SubmissionStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(|_| {
            serde::de::Error::custom(format!(
                "无效的提交状态: '{s}'. 支持的状态: PENDING, PROCESSING, GRADED, FAILED"
            ))
        })
    }
}

impl std::fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubmissionStatus::Pending => write!(f, "{}", SubmissionStatus::PENDING),
            SubmissionStatus::Processing => write!(f, "{}", SubmissionStatus::PROCESSING),
            SubmissionStatus::Graded => write!(f, "{}", SubmissionStatus::GRADED),
            SubmissionStatus::Failed => write!(f, "{}", SubmissionStatus::FAILED),
        }
    }
}

impl std::str::FromStr for SubmissionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            SubmissionStatus::PENDING => Ok(SubmissionStatus::Pending),
            SubmissionStatus::PROCESSING => Ok(SubmissionStatus::Processing),
            SubmissionStatus::GRADED => Ok(SubmissionStatus::Graded),
            SubmissionStatus::FAILED => Ok(SubmissionStatus::Failed),
            _ => Err(format!("Invalid submission status: {s}")),
        }
    }
}

// 提交实体
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/submission.ts")]
pub struct Submission {
    pub id: i64,
    // 所属作业，流水线据此读取评分标准与参考答案
    pub assignment_id: i64,
    pub student_id: i64,
    // 已落盘的扫描件路径
    pub file_path: String,
    pub file_type: Option<String>,
    pub status: SubmissionStatus,
    pub submitted_at: chrono::DateTime<chrono::Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trips_through_strings() {
        for status in [
            SubmissionStatus::Pending,
            SubmissionStatus::Processing,
            SubmissionStatus::Graded,
            SubmissionStatus::Failed,
        ] {
            assert_eq!(status.to_string().parse::<SubmissionStatus>(), Ok(status));
        }
    }

    #[test]
    fn test_status_rejects_unknown_value() {
        assert!("graded".parse::<SubmissionStatus>().is_err());
        let parsed: Result<SubmissionStatus, _> = serde_json::from_str("\"LATE\"");
        assert!(parsed.is_err());
    }

    #[test]
    fn test_status_serializes_upper_case() {
        let json = serde_json::to_string(&SubmissionStatus::Graded).unwrap();
        assert_eq!(json, "\"GRADED\"");
    }
}
