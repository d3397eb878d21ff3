use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use critic_core::{CriticConfig, PullRequestRef};
use critic_review::github::GitHubClient;
use critic_review::llm::LlmClient;
use critic_review::pipeline::{PublishMode, ReviewPipeline};
use critic_review::prompt::PromptLimits;
use miette::Result;
use tracing::info;

const DEFAULT_CONFIG_FILE: &str = ".critic.toml";

#[derive(Parser)]
#[command(
    name = "critic",
    version,
    about = "AI pull request reviewer",
    long_about = "Fetches a pull request's diff and metadata from GitHub, asks an\n\
                  OpenAI-compatible model for a code review, and posts the review\n\
                  back as a comment on the pull request.\n\n\
                  Example:\n  \
                    critic --repo acme/widgets --pr-number 42 \\\n    \
                      --github-token $GITHUB_TOKEN --openai-api-key $OPENAI_API_KEY"
)]
struct Cli {
    /// OpenAI API key
    #[arg(long)]
    openai_api_key: String,

    /// GitHub token
    #[arg(long)]
    github_token: String,

    /// OpenAI model to use (default: gpt-4-turbo-preview)
    #[arg(long)]
    openai_model: Option<String>,

    /// Pull request number
    #[arg(long)]
    pr_number: u64,

    /// Repository full name (owner/repo)
    #[arg(long)]
    repo: String,

    /// PR head SHA (recorded in logs only)
    #[arg(long)]
    pr_sha: Option<String>,

    /// Path to configuration file (default: .critic.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the review comment instead of posting it
    #[arg(long)]
    dry_run: bool,

    /// Enable verbose output
    #[arg(long, short)]
    verbose: bool,
}

fn default_log_level(verbose: bool) -> &'static str {
    if verbose {
        "debug"
    } else {
        "info"
    }
}

fn init_tracing(verbose: bool) {
    let default_level = default_log_level(verbose);
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_level.into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<CriticConfig> {
    let config = match path {
        Some(path) => CriticConfig::from_file(path)?,
        None => {
            let default_path = Path::new(DEFAULT_CONFIG_FILE);
            if default_path.exists() {
                CriticConfig::from_file(default_path)?
            } else {
                CriticConfig::default()
            }
        }
    };
    Ok(config)
}

fn spinner(message: String) -> Option<indicatif::ProgressBar> {
    if !std::io::stderr().is_terminal() {
        return None;
    }
    let pb = indicatif::ProgressBar::new_spinner();
    pb.set_style(
        indicatif::ProgressStyle::with_template("{spinner:.cyan} {msg} ({elapsed})")
            .unwrap_or_else(|_| indicatif::ProgressStyle::default_spinner()),
    );
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(120));
    Some(pb)
}

#[tokio::main]
async fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .build(),
        )
    }))?;
    human_panic::setup_panic!();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = load_config(cli.config.as_deref())?;
    if let Some(model) = &cli.openai_model {
        config.llm.model = model.clone();
    }
    config.llm.api_key = Some(cli.openai_api_key.clone());

    let pr = PullRequestRef::new(&cli.repo, cli.pr_number)?;
    info!(%pr, head_sha = cli.pr_sha.as_deref().unwrap_or("unknown"), "reviewing pull request");

    let github = GitHubClient::new(&cli.github_token, &config.github)?;
    let llm = LlmClient::new(&config.llm)?;
    let pipeline = ReviewPipeline::new(&github, &llm, &github, PromptLimits::from(&config.review));
    let mode = if cli.dry_run {
        PublishMode::DryRun
    } else {
        PublishMode::Post
    };

    let progress = if cli.verbose {
        None
    } else {
        spinner(format!("Reviewing {pr} with {}...", llm.model()))
    };
    let result = pipeline.run(&pr, mode).await;
    if let Some(pb) = &progress {
        pb.finish_and_clear();
    }
    let report = result?;
    info!(%report, "review finished");

    if !report.succeeded() {
        eprintln!("\u{274c} {}", report.outcome);
        std::process::exit(1);
    }

    match (mode, &report.comment) {
        (PublishMode::DryRun, Some(body)) => println!("{body}"),
        _ => eprintln!("\u{2705} Posted review comment on PR #{}", pr.number),
    }

    Ok(())
}
