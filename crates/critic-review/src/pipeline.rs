use std::fmt;

use async_trait::async_trait;
use critic_core::{ChangedFile, CriticError, PullRequestMeta, PullRequestRef, ReviewOutcome};
use tracing::{debug, info};

use crate::prompt::{self, PromptLimits};

/// Read access to a pull request on the hosting service.
#[async_trait]
pub trait PullRequestSource: Send + Sync {
    /// Unified diff text of the pull request.
    async fn fetch_diff(&self, pr: &PullRequestRef) -> Result<String, CriticError>;
    /// Changed files in the order the host returns them.
    async fn fetch_changed_files(&self, pr: &PullRequestRef)
        -> Result<Vec<ChangedFile>, CriticError>;
    /// Title and description.
    async fn fetch_meta(&self, pr: &PullRequestRef) -> Result<PullRequestMeta, CriticError>;
}

/// A model that turns a review prompt into review text.
///
/// Failures are reported as [`ReviewOutcome::Failed`], never as `Err`.
#[async_trait]
pub trait ReviewBackend: Send + Sync {
    /// Model identifier, for reporting.
    fn model(&self) -> &str;
    /// Request a review for `prompt`.
    async fn request_review(&self, prompt: &str) -> ReviewOutcome;
}

/// Destination for the finished review comment.
#[async_trait]
pub trait CommentSink: Send + Sync {
    /// Create a new comment on the pull request.
    async fn post_comment(&self, pr: &PullRequestRef, body: &str) -> Result<(), CriticError>;
}

/// Whether a completed review is posted or only rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PublishMode {
    /// Create the comment on the pull request.
    #[default]
    Post,
    /// Render the comment without posting it.
    DryRun,
}

/// Summary of one pipeline run.
///
/// # Examples
///
/// ```
/// use critic_core::ReviewOutcome;
/// use critic_review::pipeline::PipelineReport;
///
/// let report = PipelineReport {
///     outcome: ReviewOutcome::Failed("timeout".into()),
///     model_used: "gpt-4-turbo-preview".into(),
///     files_changed: 3,
///     diff_chars: 120,
///     diff_truncated: false,
///     comment: None,
///     published: false,
/// };
/// assert!(!report.succeeded());
/// ```
#[derive(Debug, Clone)]
pub struct PipelineReport {
    /// What the model returned.
    pub outcome: ReviewOutcome,
    /// Model identifier used for the review.
    pub model_used: String,
    /// Number of changed files reported by the host.
    pub files_changed: usize,
    /// Diff length in characters, before truncation.
    pub diff_chars: usize,
    /// `true` when the diff exceeded the prompt limit.
    pub diff_truncated: bool,
    /// Rendered comment body, present when the review completed.
    pub comment: Option<String>,
    /// `true` once the comment was created on the pull request.
    pub published: bool,
}

impl PipelineReport {
    /// `true` when the review completed; a dry run also counts.
    pub fn succeeded(&self) -> bool {
        !self.outcome.is_failed()
    }
}

impl fmt::Display for PipelineReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Model: {} | Files: {} | Diff: {} chars{}",
            self.model_used,
            self.files_changed,
            self.diff_chars,
            if self.diff_truncated { " (truncated)" } else { "" },
        )
    }
}

/// Review orchestrator: fetch, prompt, review, publish.
///
/// Every collaborator is injected, so the pipeline runs against test doubles
/// as easily as against GitHub and OpenAI.
pub struct ReviewPipeline<'a> {
    source: &'a dyn PullRequestSource,
    backend: &'a dyn ReviewBackend,
    sink: &'a dyn CommentSink,
    limits: PromptLimits,
}

impl<'a> ReviewPipeline<'a> {
    /// Create a pipeline from its collaborators and prompt limits.
    pub fn new(
        source: &'a dyn PullRequestSource,
        backend: &'a dyn ReviewBackend,
        sink: &'a dyn CommentSink,
        limits: PromptLimits,
    ) -> Self {
        Self {
            source,
            backend,
            sink,
            limits,
        }
    }

    /// Run the full review for `pr`.
    ///
    /// A failed model call is not an error: it is returned in
    /// [`PipelineReport::outcome`] and nothing is published.
    ///
    /// # Errors
    ///
    /// Returns the first [`CriticError`] raised by the source or the sink.
    pub async fn run(
        &self,
        pr: &PullRequestRef,
        mode: PublishMode,
    ) -> Result<PipelineReport, CriticError> {
        info!(%pr, "fetching PR diff");
        let diff = self.source.fetch_diff(pr).await?;

        info!(%pr, "fetching changed files");
        let files = self.source.fetch_changed_files(pr).await?;

        let meta = self.source.fetch_meta(pr).await?;
        info!(
            title = meta.title.as_deref().unwrap_or_default(),
            changed_files = files.len(),
            "fetched PR metadata"
        );

        let diff_chars = diff.chars().count();
        let diff_truncated = diff_chars > self.limits.max_diff_chars;
        let user_prompt = prompt::build_review_prompt(&diff, &files, &meta, self.limits);

        info!(model = self.backend.model(), "generating AI review");
        let outcome = self.backend.request_review(&user_prompt).await;

        let mut report = PipelineReport {
            outcome,
            model_used: self.backend.model().to_string(),
            files_changed: files.len(),
            diff_chars,
            diff_truncated,
            comment: None,
            published: false,
        };

        let Some(body) = report.outcome.review().map(prompt::render_comment) else {
            debug!("review failed, skipping comment");
            return Ok(report);
        };

        if mode == PublishMode::Post {
            info!(%pr, "posting review comment");
            self.sink.post_comment(pr, &body).await?;
            report.published = true;
        }
        report.comment = Some(body);

        Ok(report)
    }
}
