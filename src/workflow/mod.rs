pub mod review_flow;
pub mod submission_ctx;

pub use review_flow::{ReviewFlow, TaskVerdict};
pub use submission_ctx::SubmissionCtx;
