use critic_core::{ChangedFile, PullRequestMeta, ReviewConfig, DEFAULT_MAX_DIFF_CHARS, DEFAULT_MAX_FILES};

const SYSTEM_PROMPT: &str = "You are an expert software engineer and code reviewer with deep \
knowledge of best practices, security, performance, and code quality.";

const REVIEW_INSTRUCTIONS: &str = "\
Please provide a comprehensive code review focusing on:
1. Code quality and best practices
2. Potential bugs or security issues
3. Performance considerations
4. Code style and consistency
5. Documentation and comments
6. Test coverage (if applicable)

Format your review as:
- **Summary**: Brief overview
- **Issues Found**: List of issues with severity (Critical/High/Medium/Low)
- **Suggestions**: Actionable improvement suggestions
- **Positive Feedback**: What was done well

Be constructive, specific, and provide code examples when helpful.";

const COMMENT_HEADER: &str = "## \u{1f916} AI Code Review";

const COMMENT_FOOTER: &str = "*This review was generated automatically by AI PR Reviewer*";

const PLACEHOLDER: &str = "N/A";

/// Size limits applied while building the review prompt.
///
/// # Examples
///
/// ```
/// use critic_review::prompt::PromptLimits;
///
/// let limits = PromptLimits::default();
/// assert_eq!(limits.max_files, 20);
/// assert_eq!(limits.max_diff_chars, 50_000);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptLimits {
    /// Files listed before the remainder is collapsed into one line.
    pub max_files: usize,
    /// Diff characters kept; the rest is dropped.
    pub max_diff_chars: usize,
}

impl Default for PromptLimits {
    fn default() -> Self {
        Self {
            max_files: DEFAULT_MAX_FILES,
            max_diff_chars: DEFAULT_MAX_DIFF_CHARS,
        }
    }
}

impl From<&ReviewConfig> for PromptLimits {
    fn from(config: &ReviewConfig) -> Self {
        Self {
            max_files: config.max_files,
            max_diff_chars: config.max_diff_chars,
        }
    }
}

/// Build the system message sent ahead of the review prompt.
pub fn build_system_prompt() -> String {
    SYSTEM_PROMPT.to_string()
}

/// Summarize changed files, one line per file, capped at `max_files`.
///
/// # Examples
///
/// ```
/// use critic_core::ChangedFile;
/// use critic_review::prompt::summarize_files;
///
/// let files = vec![
///     ChangedFile::new("src/a.rs", "modified", 3, 1),
///     ChangedFile::new("src/b.rs", "added", 10, 0),
/// ];
/// let summary = summarize_files(&files, 1);
/// assert_eq!(summary, "- src/a.rs (modified, +3/-1)\n... and 1 more files");
/// ```
pub fn summarize_files(files: &[ChangedFile], max_files: usize) -> String {
    let mut summary = files
        .iter()
        .take(max_files)
        .map(|f| {
            format!(
                "- {} ({}, +{}/-{})",
                f.path, f.status, f.additions, f.deletions
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    if files.len() > max_files {
        if !summary.is_empty() {
            summary.push('\n');
        }
        summary.push_str(&format!("... and {} more files", files.len() - max_files));
    }
    summary
}

/// Keep the first `max_chars` characters of `diff`.
///
/// Counts Unicode scalar values, so a multi-byte character is never split.
///
/// # Examples
///
/// ```
/// use critic_review::prompt::truncate_diff;
///
/// assert_eq!(truncate_diff("+héllo", 3), "+hé");
/// assert_eq!(truncate_diff("+x", 10), "+x");
/// ```
pub fn truncate_diff(diff: &str, max_chars: usize) -> &str {
    match diff.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &diff[..byte_idx],
        None => diff,
    }
}

/// Build the user prompt for a pull request review.
///
/// The output is deterministic: same inputs, same prompt.
///
/// # Examples
///
/// ```
/// use critic_core::{ChangedFile, PullRequestMeta};
/// use critic_review::prompt::{build_review_prompt, PromptLimits};
///
/// let files = vec![ChangedFile::new("src/lib.rs", "modified", 1, 1)];
/// let meta = PullRequestMeta::default();
/// let prompt = build_review_prompt("+new line", &files, &meta, PromptLimits::default());
/// assert!(prompt.contains("+new line"));
/// assert!(prompt.contains("Pull Request Title: N/A"));
/// ```
pub fn build_review_prompt(
    diff: &str,
    files: &[ChangedFile],
    meta: &PullRequestMeta,
    limits: PromptLimits,
) -> String {
    let title = non_empty_or_placeholder(meta.title.as_deref());
    let description = non_empty_or_placeholder(Some(&meta.description));
    let file_summary = summarize_files(files, limits.max_files);
    let diff = truncate_diff(diff, limits.max_diff_chars);

    format!(
        "You are an expert code reviewer. Review the following pull request changes and \
provide constructive feedback.

Pull Request Title: {title}
Pull Request Description: {description}

Changed Files:
{file_summary}

Diff:
```
{diff}
```

{REVIEW_INSTRUCTIONS}"
    )
}

/// Wrap the model's review in the comment template posted to GitHub.
///
/// # Examples
///
/// ```
/// use critic_review::prompt::render_comment;
///
/// let body = render_comment("All good.");
/// assert!(body.starts_with("## "));
/// assert!(body.contains("\n\nAll good.\n\n---\n"));
/// ```
pub fn render_comment(review: &str) -> String {
    format!("{COMMENT_HEADER}\n\n{review}\n\n---\n{COMMENT_FOOTER}")
}

fn non_empty_or_placeholder(value: Option<&str>) -> &str {
    match value {
        Some(v) if !v.is_empty() => v,
        _ => PLACEHOLDER,
    }
}
