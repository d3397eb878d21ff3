use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::CriticError;

/// A pull request in a GitHub repository.
///
/// # Examples
///
/// ```
/// use critic_core::PullRequestRef;
///
/// let pr = PullRequestRef::new("acme/widgets", 42).unwrap();
/// assert_eq!(pr.owner, "acme");
/// assert_eq!(pr.repo, "widgets");
/// assert_eq!(pr.to_string(), "acme/widgets#42");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestRef {
    /// Repository owner (user or organization).
    pub owner: String,
    /// Repository name.
    pub repo: String,
    /// Pull request number.
    pub number: u64,
}

impl PullRequestRef {
    /// Build a reference from an `owner/repo` full name and a PR number.
    ///
    /// # Errors
    ///
    /// Returns [`CriticError::Config`] if `full_name` is not `owner/repo`.
    pub fn new(full_name: &str, number: u64) -> Result<Self, CriticError> {
        let invalid = || {
            CriticError::Config(format!(
                "invalid repository '{full_name}', expected owner/repo"
            ))
        };
        let (owner, repo) = full_name.split_once('/').ok_or_else(invalid)?;
        if owner.is_empty() || repo.is_empty() || repo.contains('/') {
            return Err(invalid());
        }
        Ok(Self {
            owner: owner.to_string(),
            repo: repo.to_string(),
            number,
        })
    }

    /// The `owner/repo` form of the repository.
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }
}

impl fmt::Display for PullRequestRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}#{}", self.owner, self.repo, self.number)
    }
}

/// Parses the `owner/repo#number` shorthand.
///
/// ```
/// use critic_core::PullRequestRef;
///
/// let pr: PullRequestRef = "octocat/hello-world#7".parse().unwrap();
/// assert_eq!(pr.number, 7);
/// ```
impl FromStr for PullRequestRef {
    type Err = CriticError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some((full_name, number_str)) = s.split_once('#') else {
            return Err(CriticError::Config(format!(
                "invalid PR reference '{s}', expected owner/repo#number"
            )));
        };
        let number: u64 = number_str
            .parse()
            .map_err(|_| CriticError::Config(format!("invalid PR number: {number_str}")))?;
        Self::new(full_name, number)
    }
}

/// One entry of the pull request "files" listing.
///
/// Field names follow the GitHub REST payload; the file path arrives as
/// `filename`.
///
/// # Examples
///
/// ```
/// use critic_core::ChangedFile;
///
/// let json = r#"{"filename":"src/lib.rs","status":"modified","additions":3,"deletions":1,"changes":4}"#;
/// let file: ChangedFile = serde_json::from_str(json).unwrap();
/// assert_eq!(file.path, "src/lib.rs");
/// assert_eq!(file.additions, 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChangedFile {
    /// Path of the file relative to the repository root.
    #[serde(rename = "filename")]
    pub path: String,
    /// Change status reported by GitHub (`added`, `modified`, `removed`, ...).
    pub status: String,
    /// Lines added.
    #[serde(default)]
    pub additions: u64,
    /// Lines deleted.
    #[serde(default)]
    pub deletions: u64,
}

impl ChangedFile {
    /// Convenience constructor, mostly for tests and fixtures.
    pub fn new(
        path: impl Into<String>,
        status: impl Into<String>,
        additions: u64,
        deletions: u64,
    ) -> Self {
        Self {
            path: path.into(),
            status: status.into(),
            additions,
            deletions,
        }
    }
}

/// Title and description of a pull request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PullRequestMeta {
    /// Pull request title, if GitHub returned one.
    pub title: Option<String>,
    /// Pull request body; an absent body is stored as the empty string.
    pub description: String,
}

/// Result of asking the model for a review.
///
/// # Examples
///
/// ```
/// use critic_core::ReviewOutcome;
///
/// let failed = ReviewOutcome::Failed("connection reset".into());
/// assert!(failed.is_failed());
/// assert!(failed.to_string().starts_with("Error"));
///
/// let done = ReviewOutcome::Completed("Looks good".into());
/// assert_eq!(done.review(), Some("Looks good"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewOutcome {
    /// The model produced review text.
    Completed(String),
    /// The request failed; carries the reason.
    Failed(String),
}

impl ReviewOutcome {
    /// Returns `true` for [`ReviewOutcome::Failed`].
    pub fn is_failed(&self) -> bool {
        matches!(self, ReviewOutcome::Failed(_))
    }

    /// The generated review text, if the request completed.
    pub fn review(&self) -> Option<&str> {
        match self {
            ReviewOutcome::Completed(text) => Some(text),
            ReviewOutcome::Failed(_) => None,
        }
    }
}

impl fmt::Display for ReviewOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReviewOutcome::Completed(text) => write!(f, "{text}"),
            ReviewOutcome::Failed(reason) => write!(f, "Error during AI review: {reason}"),
        }
    }
}
