/// Errors that can occur while reviewing a pull request.
///
/// Each variant wraps a specific error domain. Library crates use this type
/// directly; the binary reports it through `miette` at the boundary.
///
/// # Examples
///
/// ```
/// use critic_core::CriticError;
///
/// let err = CriticError::Config("missing API key".into());
/// assert!(err.to_string().contains("missing API key"));
/// ```
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum CriticError {
    /// Filesystem I/O failure.
    #[error("IO error: {0}")]
    #[diagnostic(code(critic::io))]
    Io(#[from] std::io::Error),

    /// Invalid or missing configuration.
    #[error("configuration error: {0}")]
    #[diagnostic(
        code(critic::config),
        help("check the command-line flags and the [llm], [github] and [review] sections of .critic.toml")
    )]
    Config(String),

    /// GitHub API failure, including non-2xx responses.
    #[error("GitHub error: {0}")]
    #[diagnostic(
        code(critic::github),
        help("verify the token can read the repository and that the pull request exists")
    )]
    GitHub(String),

    /// LLM API or response error.
    #[error("LLM error: {0}")]
    #[diagnostic(code(critic::llm))]
    Llm(String),

    /// TOML deserialization failure.
    #[error("TOML parse error: {0}")]
    #[diagnostic(code(critic::toml))]
    Toml(#[from] toml::de::Error),
}
