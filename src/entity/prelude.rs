//! 预导入模块，方便使用

pub use super::assignments::{
    ActiveModel as AssignmentActiveModel, Entity as Assignments, Model as AssignmentModel,
};
pub use super::grading_jobs::{
    ActiveModel as GradingJobActiveModel, Entity as GradingJobs, Model as GradingJobModel,
};
pub use super::grading_results::{
    ActiveModel as GradingResultActiveModel, Entity as GradingResults,
    Model as GradingResultModel,
};
pub use super::submissions::{
    ActiveModel as SubmissionActiveModel, Entity as Submissions, Model as SubmissionModel,
};
