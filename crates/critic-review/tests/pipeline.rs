use std::sync::Mutex;

use async_trait::async_trait;
use critic_core::{ChangedFile, CriticError, PullRequestMeta, PullRequestRef, ReviewOutcome};
use critic_review::pipeline::{
    CommentSink, PublishMode, PullRequestSource, ReviewBackend, ReviewPipeline,
};
use critic_review::prompt::PromptLimits;

struct FakeSource {
    diff: String,
    files: Vec<ChangedFile>,
    meta: PullRequestMeta,
    fail_diff: bool,
}

impl FakeSource {
    fn new(diff: &str, file_count: usize) -> Self {
        let files = (0..file_count)
            .map(|i| ChangedFile::new(format!("src/mod_{i}.rs"), "modified", 5, 2))
            .collect();
        Self {
            diff: diff.to_string(),
            files,
            meta: PullRequestMeta {
                title: Some("Add widget cache".into()),
                description: "Caches widgets per tenant.".into(),
            },
            fail_diff: false,
        }
    }
}

#[async_trait]
impl PullRequestSource for FakeSource {
    async fn fetch_diff(&self, _pr: &PullRequestRef) -> Result<String, CriticError> {
        if self.fail_diff {
            return Err(CriticError::GitHub("GitHub API error 404 Not Found".into()));
        }
        Ok(self.diff.clone())
    }

    async fn fetch_changed_files(
        &self,
        _pr: &PullRequestRef,
    ) -> Result<Vec<ChangedFile>, CriticError> {
        Ok(self.files.clone())
    }

    async fn fetch_meta(&self, _pr: &PullRequestRef) -> Result<PullRequestMeta, CriticError> {
        Ok(self.meta.clone())
    }
}

struct FakeBackend {
    outcome: ReviewOutcome,
    prompts: Mutex<Vec<String>>,
}

impl FakeBackend {
    fn completing(text: &str) -> Self {
        Self {
            outcome: ReviewOutcome::Completed(text.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    fn failing(reason: &str) -> Self {
        Self {
            outcome: ReviewOutcome::Failed(reason.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    fn last_prompt(&self) -> String {
        self.prompts.lock().unwrap().last().cloned().unwrap()
    }
}

#[async_trait]
impl ReviewBackend for FakeBackend {
    fn model(&self) -> &str {
        "fake-model"
    }

    async fn request_review(&self, prompt: &str) -> ReviewOutcome {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.outcome.clone()
    }
}

#[derive(Default)]
struct RecordingSink {
    posted: Mutex<Vec<(PullRequestRef, String)>>,
}

impl RecordingSink {
    fn calls(&self) -> usize {
        self.posted.lock().unwrap().len()
    }
}

#[async_trait]
impl CommentSink for RecordingSink {
    async fn post_comment(&self, pr: &PullRequestRef, body: &str) -> Result<(), CriticError> {
        self.posted
            .lock()
            .unwrap()
            .push((pr.clone(), body.to_string()));
        Ok(())
    }
}

fn acme_pr() -> PullRequestRef {
    PullRequestRef::new("acme/widgets", 42).unwrap()
}

fn summary_lines(prompt: &str) -> Vec<&str> {
    let start = prompt.find("Changed Files:\n").unwrap() + "Changed Files:\n".len();
    let end = start + prompt[start..].find("\n\nDiff:").unwrap();
    prompt[start..end].lines().collect()
}

#[tokio::test]
async fn small_pull_request_is_reviewed_and_posted() {
    let diff = format!("+{}", "x".repeat(119));
    assert_eq!(diff.len(), 120);
    let source = FakeSource::new(&diff, 3);
    let backend = FakeBackend::completing("Looks solid.");
    let sink = RecordingSink::default();

    let pipeline = ReviewPipeline::new(&source, &backend, &sink, PromptLimits::default());
    let report = pipeline.run(&acme_pr(), PublishMode::Post).await.unwrap();

    assert!(report.succeeded());
    assert!(report.published);
    assert_eq!(report.files_changed, 3);
    assert_eq!(report.diff_chars, 120);
    assert!(!report.diff_truncated);

    let prompt = backend.last_prompt();
    let lines = summary_lines(&prompt);
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "- src/mod_0.rs (modified, +5/-2)");
    assert!(!prompt.contains("more files"));
    assert!(prompt.contains(&format!("```\n{diff}\n```")));
    assert!(prompt.contains("Pull Request Title: Add widget cache"));

    let posted = sink.posted.lock().unwrap();
    assert_eq!(posted.len(), 1);
    assert_eq!(posted[0].0, acme_pr());
    assert!(posted[0].1.contains("\n\nLooks solid.\n\n---\n"));
}

#[tokio::test]
async fn many_files_collapse_into_more_line() {
    let source = FakeSource::new("+a", 25);
    let backend = FakeBackend::completing("ok");
    let sink = RecordingSink::default();

    let pipeline = ReviewPipeline::new(&source, &backend, &sink, PromptLimits::default());
    pipeline.run(&acme_pr(), PublishMode::Post).await.unwrap();

    let prompt = backend.last_prompt();
    let lines = summary_lines(&prompt);
    assert_eq!(lines.len(), 21);
    assert_eq!(lines[19], "- src/mod_19.rs (modified, +5/-2)");
    assert_eq!(lines[20], "... and 5 more files");
}

#[tokio::test]
async fn failed_review_is_never_published() {
    let source = FakeSource::new("+a", 2);
    let backend = FakeBackend::failing("request failed: connection refused");
    let sink = RecordingSink::default();

    let pipeline = ReviewPipeline::new(&source, &backend, &sink, PromptLimits::default());
    let report = pipeline.run(&acme_pr(), PublishMode::Post).await.unwrap();

    assert!(!report.succeeded());
    assert!(report.outcome.to_string().starts_with("Error"));
    assert!(!report.published);
    assert!(report.comment.is_none());
    assert_eq!(sink.calls(), 0);
}

#[tokio::test]
async fn review_text_starting_with_error_is_still_posted() {
    let source = FakeSource::new("+a", 1);
    let backend = FakeBackend::completing("Error handling in parse() swallows failures.");
    let sink = RecordingSink::default();

    let pipeline = ReviewPipeline::new(&source, &backend, &sink, PromptLimits::default());
    let report = pipeline.run(&acme_pr(), PublishMode::Post).await.unwrap();

    assert!(report.succeeded());
    assert_eq!(sink.calls(), 1);
}

#[tokio::test]
async fn dry_run_renders_without_posting() {
    let source = FakeSource::new("+a", 1);
    let backend = FakeBackend::completing("Nice work.");
    let sink = RecordingSink::default();

    let pipeline = ReviewPipeline::new(&source, &backend, &sink, PromptLimits::default());
    let report = pipeline.run(&acme_pr(), PublishMode::DryRun).await.unwrap();

    assert!(report.succeeded());
    assert!(!report.published);
    assert!(report.comment.unwrap().contains("Nice work."));
    assert_eq!(sink.calls(), 0);
}

#[tokio::test]
async fn fetch_error_aborts_before_review() {
    let mut source = FakeSource::new("+a", 1);
    source.fail_diff = true;
    let backend = FakeBackend::completing("unused");
    let sink = RecordingSink::default();

    let pipeline = ReviewPipeline::new(&source, &backend, &sink, PromptLimits::default());
    let err = pipeline.run(&acme_pr(), PublishMode::Post).await.unwrap_err();

    assert!(matches!(err, CriticError::GitHub(_)));
    assert!(backend.prompts.lock().unwrap().is_empty());
    assert_eq!(sink.calls(), 0);
}

#[tokio::test]
async fn custom_limits_flow_into_prompt() {
    let source = FakeSource::new(&"+".repeat(100), 4);
    let backend = FakeBackend::completing("ok");
    let sink = RecordingSink::default();
    let limits = PromptLimits {
        max_files: 2,
        max_diff_chars: 10,
    };

    let pipeline = ReviewPipeline::new(&source, &backend, &sink, limits);
    let report = pipeline.run(&acme_pr(), PublishMode::DryRun).await.unwrap();

    assert!(report.diff_truncated);
    let prompt = backend.last_prompt();
    assert_eq!(summary_lines(&prompt).len(), 3);
    assert!(prompt.contains(&format!("```\n{}\n```", "+".repeat(10))));
    assert!(!prompt.contains(&"+".repeat(11)));
}
