//! SeaORM 实体定义
//!
//! 这些实体用于数据库操作，与 models 模块中的业务实体分离。
//! Storage 层使用这些实体进行读写，然后转换为 models 中的业务实体。

pub mod prelude;

pub mod assignments;
pub mod grading_jobs;
pub mod grading_results;
pub mod submissions;

use chrono::{DateTime, Utc};

/// 数据库中的时间戳统一为 Unix 秒
pub(crate) fn from_timestamp(ts: i64) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(ts, 0).unwrap_or_default()
}
