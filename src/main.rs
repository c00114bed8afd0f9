mod config;
mod domain;
mod logging;
mod repo;
mod usecase;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;

use config::{GateConfig, RawInputs};
use domain::pull_request::PullRequestRef;
use repo::PullRequestSource;
use repo::github::{GithubSource, graphql_base_uri};
use repo::github::auth::resolve_github_token;
use repo::github::event::pull_request_from_env;
use repo::memory::InMemoryPullRequestSource;
use usecase::gate::{self, GateReport};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Fail a pull request check until enough reviewers approve, as required by its labels",
    long_about = None
)]
struct Args {
    /// Labels starting with this prefix set the required approvals, e.g. `required-reviews/3`
    #[arg(long, env = "INPUT_LABEL_PREFIX")]
    label_prefix: String,

    /// Required approvals when no label matches
    #[arg(long, env = "INPUT_DEFAULT_REVIEWERS", allow_hyphen_values = true)]
    default_reviewers: String,

    /// GitHub token (falls back to GITHUB_TOKEN)
    #[arg(long, env = "INPUT_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Pull request to check as owner/repo#number (default: the triggering Actions event)
    #[arg(long)]
    pull_request: Option<PullRequestRef>,

    /// Evaluate recorded snapshots from this JSON file instead of calling GitHub
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// GitHub REST API base URL, for GitHub Enterprise
    #[arg(long, env = "GITHUB_API_URL")]
    api_url: Option<String>,

    /// GitHub GraphQL endpoint; takes precedence over --api-url
    #[arg(long, env = "GITHUB_GRAPHQL_URL")]
    graphql_url: Option<String>,
}

fn main() -> ExitCode {
    logging::init();
    let args = Args::parse();

    match run(args) {
        Ok(report) if report.passed() => ExitCode::SUCCESS,
        Ok(_) => ExitCode::FAILURE,
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<GateReport> {
    let cfg = GateConfig::from_inputs(RawInputs {
        label_prefix: args.label_prefix,
        default_reviewers: args.default_reviewers,
        token: args.token,
    })?;

    let pr = match args.pull_request {
        Some(pr) => pr,
        None => pull_request_from_env()?,
    };

    let source: Box<dyn PullRequestSource> = match args.snapshot {
        Some(path) => Box::new(InMemoryPullRequestSource::load(path)?),
        None => {
            let env_token = std::env::var("GITHUB_TOKEN").ok();
            let token = resolve_github_token(cfg.token.as_deref(), env_token.as_deref())?;
            let base = graphql_base_uri(args.graphql_url.as_deref(), args.api_url.as_deref());
            Box::new(GithubSource::new(token, base))
        }
    };

    tracing::info!(
        %pr,
        prefix = %cfg.threshold.label_prefix,
        default = cfg.threshold.default_threshold,
        "checking required reviews"
    );
    let snapshot = source.fetch(&pr)?;
    let report = gate::evaluate(&snapshot, &cfg.threshold);
    report.log();
    Ok(report)
}
