use serde::{Deserialize, Serialize};
use ts_rs::TS;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/assignment.ts")]
pub struct Assignment {
    // 唯一 ID
    pub id: i64,
    // 作业标题
    pub title: String,
    // 自然语言评分标准
    pub rubric_text: String,
    // 参考答案的识别文本
    pub reference_solution_text: String,
    // 作业总分
    pub total_points: f64,
    // 创建时间
    pub created_at: chrono::DateTime<chrono::Utc>,
}
