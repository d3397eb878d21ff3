use std::time::Duration;

use async_trait::async_trait;
use critic_core::{ChangedFile, CriticError, GitHubConfig, PullRequestMeta, PullRequestRef};
use tracing::debug;

use crate::pipeline::{CommentSink, PullRequestSource};

const DIFF_MEDIA_TYPE: &str = "application/vnd.github.v3.diff";
const JSON_MEDIA_TYPE: &str = "application/vnd.github.v3+json";

/// Entries requested per page of the files listing.
const FILES_PER_PAGE: usize = 100;

/// GitHub stops listing files after 3000 entries.
const MAX_FILE_PAGES: usize = 30;

/// GitHub Pull Request client for fetching diffs and posting comments.
///
/// Raw media-type requests go through `reqwest`; typed endpoints go through
/// `octocrab`. Both share the same token and timeout.
///
/// # Examples
///
/// ```
/// use critic_core::GitHubConfig;
/// use critic_review::github::GitHubClient;
///
/// # #[tokio::main]
/// # async fn main() {
/// let client = GitHubClient::new("ghp_xxxx", &GitHubConfig::default()).unwrap();
/// # }
/// ```
pub struct GitHubClient {
    octocrab: octocrab::Octocrab,
    http: reqwest::Client,
    token: String,
    api_base: String,
    user_agent: String,
}

impl GitHubClient {
    /// Create a client from an explicit token.
    ///
    /// # Errors
    ///
    /// Returns [`CriticError::Config`] if the token is empty or the API base
    /// URL is invalid, or [`CriticError::GitHub`] if a client cannot be built.
    pub fn new(token: &str, config: &GitHubConfig) -> Result<Self, CriticError> {
        if token.trim().is_empty() {
            return Err(CriticError::Config("GitHub token is empty".into()));
        }
        let timeout = Duration::from_secs(config.timeout_secs);
        let api_base = config.api_base.trim_end_matches('/').to_string();

        let octocrab = octocrab::Octocrab::builder()
            .personal_token(token.to_string())
            .base_uri(api_base.as_str())
            .map_err(|e| CriticError::Config(format!("invalid GitHub API base '{api_base}': {e}")))?
            .set_connect_timeout(Some(timeout))
            .set_read_timeout(Some(timeout))
            .build()
            .map_err(|e| CriticError::GitHub(format!("failed to create GitHub client: {e}")))?;

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CriticError::GitHub(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            octocrab,
            http,
            token: token.to_string(),
            api_base,
            user_agent: config.user_agent.clone(),
        })
    }

    fn pull_url(&self, pr: &PullRequestRef) -> String {
        format!(
            "{}/repos/{}/{}/pulls/{}",
            self.api_base, pr.owner, pr.repo, pr.number
        )
    }

    fn files_page_url(&self, pr: &PullRequestRef, page: usize) -> String {
        format!(
            "{}/files?per_page={FILES_PER_PAGE}&page={page}",
            self.pull_url(pr)
        )
    }

    async fn get(&self, url: &str, accept: &str) -> Result<reqwest::Response, CriticError> {
        debug!(%url, accept, "GitHub GET");
        let response = self
            .http
            .get(url)
            .header("Accept", accept)
            .header("Authorization", format!("Bearer {}", self.token))
            .header("User-Agent", &self.user_agent)
            .send()
            .await
            .map_err(|e| CriticError::GitHub(format!("request to {url} failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CriticError::GitHub(format!(
                "GitHub API error {status}: {body}"
            )));
        }
        Ok(response)
    }

    /// Fetch the unified diff for a pull request.
    ///
    /// # Errors
    ///
    /// Returns [`CriticError::GitHub`] on network errors or non-2xx responses.
    pub async fn get_pr_diff(&self, pr: &PullRequestRef) -> Result<String, CriticError> {
        self.get(&self.pull_url(pr), DIFF_MEDIA_TYPE)
            .await?
            .text()
            .await
            .map_err(|e| CriticError::GitHub(format!("failed to read diff response: {e}")))
    }

    /// Fetch every changed file of a pull request, in API order.
    ///
    /// # Errors
    ///
    /// Returns [`CriticError::GitHub`] on network errors or non-2xx responses.
    pub async fn get_changed_files(
        &self,
        pr: &PullRequestRef,
    ) -> Result<Vec<ChangedFile>, CriticError> {
        let mut files = Vec::new();
        for page in 1..=MAX_FILE_PAGES {
            let batch: Vec<ChangedFile> = self
                .get(&self.files_page_url(pr, page), JSON_MEDIA_TYPE)
                .await?
                .json()
                .await
                .map_err(|e| CriticError::GitHub(format!("failed to parse files response: {e}")))?;
            let last = batch.len() < FILES_PER_PAGE;
            files.extend(batch);
            if last {
                break;
            }
        }
        Ok(files)
    }

    /// Fetch the pull request title and description.
    ///
    /// # Errors
    ///
    /// Returns [`CriticError::GitHub`] on API errors.
    pub async fn get_pr_meta(&self, pr: &PullRequestRef) -> Result<PullRequestMeta, CriticError> {
        let pull = self
            .octocrab
            .pulls(&pr.owner, &pr.repo)
            .get(pr.number)
            .await
            .map_err(|e| CriticError::GitHub(format!("failed to fetch pull request: {e}")))?;

        Ok(PullRequestMeta {
            title: pull.title,
            description: pull.body.unwrap_or_default(),
        })
    }

    /// Post `body` as a new comment on the pull request conversation.
    ///
    /// Calling this twice creates two comments.
    ///
    /// # Errors
    ///
    /// Returns [`CriticError::GitHub`] on API errors.
    pub async fn create_comment(&self, pr: &PullRequestRef, body: &str) -> Result<(), CriticError> {
        let comment = self
            .octocrab
            .issues(&pr.owner, &pr.repo)
            .create_comment(pr.number, body)
            .await
            .map_err(|e| CriticError::GitHub(format!("failed to post comment: {e}")))?;
        debug!(url = %comment.html_url, "comment created");
        Ok(())
    }
}

#[async_trait]
impl PullRequestSource for GitHubClient {
    async fn fetch_diff(&self, pr: &PullRequestRef) -> Result<String, CriticError> {
        self.get_pr_diff(pr).await
    }

    async fn fetch_changed_files(
        &self,
        pr: &PullRequestRef,
    ) -> Result<Vec<ChangedFile>, CriticError> {
        self.get_changed_files(pr).await
    }

    async fn fetch_meta(&self, pr: &PullRequestRef) -> Result<PullRequestMeta, CriticError> {
        self.get_pr_meta(pr).await
    }
}

#[async_trait]
impl CommentSink for GitHubClient {
    async fn post_comment(&self, pr: &PullRequestRef, body: &str) -> Result<(), CriticError> {
        self.create_comment(pr, body).await
    }
}
