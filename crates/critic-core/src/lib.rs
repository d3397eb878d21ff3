//! Core types, configuration, and error handling for critic.
//!
//! This crate provides the shared foundation used by the review pipeline and
//! the `critic` binary:
//! - [`CriticError`]: unified error type using `thiserror`
//! - [`CriticConfig`]: configuration loaded from `.critic.toml`
//! - Shared types: [`PullRequestRef`], [`ChangedFile`], [`PullRequestMeta`],
//!   [`ReviewOutcome`]

mod config;
mod error;
mod types;

pub use config::{
    CriticConfig, GitHubConfig, LlmConfig, ReviewConfig, DEFAULT_MAX_DIFF_CHARS,
    DEFAULT_MAX_FILES,
};
pub use error::CriticError;
pub use types::{ChangedFile, PullRequestMeta, PullRequestRef, ReviewOutcome};

/// A convenience `Result` type for critic operations.
pub type Result<T> = std::result::Result<T, CriticError>;
