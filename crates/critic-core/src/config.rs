use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::CriticError;

/// Maximum number of changed files listed in the prompt.
pub const DEFAULT_MAX_FILES: usize = 20;

/// Maximum number of diff characters embedded in the prompt.
pub const DEFAULT_MAX_DIFF_CHARS: usize = 50_000;

/// Top-level configuration loaded from `.critic.toml`.
///
/// Resolution order: CLI flags > config file > defaults. Credentials are only
/// ever taken from the command line.
///
/// # Examples
///
/// ```
/// use critic_core::CriticConfig;
///
/// let config = CriticConfig::default();
/// assert_eq!(config.review.max_files, 20);
/// assert_eq!(config.llm.max_tokens, 2000);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CriticConfig {
    /// LLM provider settings.
    #[serde(default)]
    pub llm: LlmConfig,
    /// GitHub API settings.
    #[serde(default)]
    pub github: GitHubConfig,
    /// Prompt size limits.
    #[serde(default)]
    pub review: ReviewConfig,
}

impl CriticConfig {
    /// Load configuration from a TOML file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`CriticError::Io`] if the file cannot be read, or
    /// [`CriticError::Toml`] if the content is not valid TOML.
    pub fn from_file(path: &Path) -> Result<Self, CriticError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`CriticError::Toml`] if parsing fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use critic_core::CriticConfig;
    ///
    /// let toml = r#"
    /// [review]
    /// max_files = 50
    /// "#;
    /// let config = CriticConfig::from_toml(toml).unwrap();
    /// assert_eq!(config.review.max_files, 50);
    /// assert_eq!(config.review.max_diff_chars, 50_000);
    /// ```
    pub fn from_toml(content: &str) -> Result<Self, CriticError> {
        let config: Self = toml::from_str(content)?;
        Ok(config)
    }
}

/// OpenAI-compatible chat completion settings.
///
/// # Examples
///
/// ```
/// use critic_core::LlmConfig;
///
/// let config = LlmConfig::default();
/// assert_eq!(config.model, "gpt-4-turbo-preview");
/// assert_eq!(config.temperature, 0.3);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Model identifier.
    #[serde(default = "default_model")]
    pub model: String,
    /// API key. Filled from `--openai-api-key`, never from the file.
    #[serde(skip)]
    pub api_key: Option<String>,
    /// Custom base URL for API requests (default: `https://api.openai.com`).
    pub base_url: Option<String>,
    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Upper bound on generated tokens.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Request timeout in seconds.
    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,
}

fn default_model() -> String {
    "gpt-4-turbo-preview".into()
}

fn default_temperature() -> f32 {
    0.3
}

fn default_max_tokens() -> u32 {
    2000
}

fn default_llm_timeout() -> u64 {
    120
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            api_key: None,
            base_url: None,
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_llm_timeout(),
        }
    }
}

/// GitHub REST API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubConfig {
    /// API root, override for GitHub Enterprise.
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Request timeout in seconds.
    #[serde(default = "default_github_timeout")]
    pub timeout_secs: u64,
    /// `User-Agent` header sent with raw requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_api_base() -> String {
    "https://api.github.com".into()
}

fn default_github_timeout() -> u64 {
    30
}

fn default_user_agent() -> String {
    "critic".into()
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            timeout_secs: default_github_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

/// Prompt size limits.
///
/// # Examples
///
/// ```
/// use critic_core::{ReviewConfig, DEFAULT_MAX_DIFF_CHARS, DEFAULT_MAX_FILES};
///
/// let config = ReviewConfig::default();
/// assert_eq!(config.max_files, DEFAULT_MAX_FILES);
/// assert_eq!(config.max_diff_chars, DEFAULT_MAX_DIFF_CHARS);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewConfig {
    /// Changed files listed before the "... and N more files" line (default: 20).
    #[serde(default = "default_max_files")]
    pub max_files: usize,
    /// Diff characters kept in the prompt (default: 50000).
    #[serde(default = "default_max_diff_chars")]
    pub max_diff_chars: usize,
}

fn default_max_files() -> usize {
    DEFAULT_MAX_FILES
}

fn default_max_diff_chars() -> usize {
    DEFAULT_MAX_DIFF_CHARS
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            max_files: default_max_files(),
            max_diff_chars: default_max_diff_chars(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_expected_values() {
        let config = CriticConfig::default();
        assert_eq!(config.review.max_files, 20);
        assert_eq!(config.review.max_diff_chars, 50_000);
        assert_eq!(config.llm.model, "gpt-4-turbo-preview");
        assert_eq!(config.llm.temperature, 0.3);
        assert_eq!(config.llm.max_tokens, 2000);
        assert_eq!(config.llm.timeout_secs, 120);
        assert!(config.llm.api_key.is_none());
        assert_eq!(config.github.api_base, "https://api.github.com");
        assert_eq!(config.github.timeout_secs, 30);
    }

    #[test]
    fn parse_full_toml() {
        let toml = r#"
[llm]
model = "gpt-4o"
base_url = "http://localhost:11434"
temperature = 0.0
max_tokens = 4000
timeout_secs = 300

[github]
api_base = "https://github.example.com/api/v3"
timeout_secs = 10

[review]
max_files = 5
max_diff_chars = 1000
"#;
        let config = CriticConfig::from_toml(toml).unwrap();
        assert_eq!(config.llm.model, "gpt-4o");
        assert_eq!(config.llm.base_url.as_deref(), Some("http://localhost:11434"));
        assert_eq!(config.llm.max_tokens, 4000);
        assert_eq!(config.llm.timeout_secs, 300);
        assert_eq!(config.github.api_base, "https://github.example.com/api/v3");
        assert_eq!(config.github.user_agent, "critic");
        assert_eq!(config.review.max_files, 5);
        assert_eq!(config.review.max_diff_chars, 1000);
    }

    #[test]
    fn api_key_is_never_read_from_file() {
        let toml = r#"
[llm]
api_key = "sk-should-be-ignored"
"#;
        let config = CriticConfig::from_toml(toml).unwrap();
        assert!(config.llm.api_key.is_none());
    }

    #[test]
    fn empty_toml_gives_defaults() {
        let config = CriticConfig::from_toml("").unwrap();
        assert_eq!(config.review.max_files, 20);
        assert_eq!(config.llm.model, "gpt-4-turbo-preview");
    }

    #[test]
    fn invalid_toml_returns_error() {
        let result = CriticConfig::from_toml("{{invalid}}");
        assert!(result.is_err());
    }
}
