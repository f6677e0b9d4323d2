//! Core types, configuration, and error handling for proofread.
//!
//! This crate provides the shared foundation used by the review crate and
//! the binary:
//! - [`ProofreadError`]: unified error type using `thiserror`
//! - [`Config`]: run configuration loaded from `INPUT_*` variables
//! - Shared types: [`Category`], [`Issue`], [`FailOn`], [`LogLevel`]

mod config;
mod error;
mod types;

pub use config::{Config, GitHubConfig, LlmConfig};
pub use error::ProofreadError;
pub use types::{Category, FailOn, Issue, LogLevel};

/// A convenience `Result` type for proofread operations.
pub type Result<T> = std::result::Result<T, ProofreadError>;
