//! Merge plan building
//!
//! Turns an operator's basket into something actionable:
//! 1. Command - the VCS invocation that merges the candidates
//! 2. Message - the commit message for the merge
//! 3. Plan - both of the above plus dependency alerts (pure, testable)

mod command;
mod message;
mod plan;

pub use command::build_command;
pub use message::build_message;
pub use plan::{MergePlan, MergePlanOptions, create_merge_plan};
