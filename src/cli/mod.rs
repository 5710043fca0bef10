//! CLI command handlers

pub mod basket;
pub mod branch;
pub mod context;
pub mod import;
pub mod plan;
pub mod profile;
pub mod status;
pub mod style;

pub use import::{ImportArgs, run_import};
pub use plan::run_plan;
pub use status::{StatusOptions, run_status};
