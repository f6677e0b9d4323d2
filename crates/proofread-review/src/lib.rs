//! Spelling and grammar review of pull-request files.
//!
//! Provides the review pipeline: file reading and line annotation, the
//! completion client, prompt construction and response parsing, and the
//! pull-request comment manager.

pub mod files;
pub mod github;
pub mod llm;
pub mod pipeline;
pub mod prompt;
