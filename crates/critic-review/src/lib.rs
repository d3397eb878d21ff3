//! Pull request review pipeline.
//!
//! Provides the GitHub client, the LLM client, prompt construction, and the
//! orchestration that ties them together behind injectable traits.

pub mod github;
pub mod llm;
pub mod pipeline;
pub mod prompt;
