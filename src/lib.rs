//! mfc-tracker - track which trunk commits still need to be merged into
//! maintenance branches
//!
//! The library imports commit history from a VCS, keeps the "merged into"
//! relation in sync with the VCS's own merge metadata, checks declared
//! commit dependencies, and renders merge plans (command + message) for an
//! operator's basket of commits.

pub mod basket;
pub mod branch;
pub mod config;
pub mod dependency;
pub mod error;
pub mod filter;
pub mod import;
pub mod merge;
pub mod mergeinfo;
pub mod message;
pub mod profile;
pub mod ranges;
pub mod store;
pub mod tracking;
pub mod types;
pub mod vcs;

pub use error::{Error, Result};
