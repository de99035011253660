//! Issue triage CLI entry point.
//!
//! This binary is the composition root for the entire system. Responsibilities:
//!
//! 1. **Validate inputs** — parse the command line; any missing, empty, or zero
//!    required argument prints usage to stderr and exits with status 1 before
//!    any I/O happens.
//! 2. **Wire observability** — configure `tracing-subscriber` (text or JSON)
//!    and, when requested through the environment, an OpenTelemetry OTLP
//!    exporter. All `tracing` spans and events emitted by every crate in the
//!    workspace flow through this subscriber.
//! 3. **Load configuration** — read the YAML file, raise the log level if it
//!    asks for debug output, and resolve the requested command.
//! 4. **Construct infrastructure** — create `GithubClient`, `OpenAiProvider`,
//!    and `FsRepositorySource` and inject them into a `TriageExecutor`.
//! 5. **Run once** — execute the pipeline and map the result to an exit code.

mod args;
mod config;
mod observability;

use std::process::ExitCode;
use std::sync::Arc;

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use github::GithubClient;
use llm::OpenAiProvider;
use pipeline::{CommandCatalog, Invocation, TriageError, TriageExecutor, TriageOutcome};
use repository::FsRepositorySource;
use tracing::{error, info};

use crate::args::Cli;
use crate::config::load_config;
use crate::observability::Observability;

const USAGE_EXIT: u8 = 1;
const FAILURE_EXIT: u8 = 1;

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => return usage_error(err),
    };

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build();
    let runtime = match runtime {
        Ok(runtime) => runtime,
        Err(err) => {
            eprintln!("failed to start async runtime: {err}");
            return ExitCode::from(FAILURE_EXIT);
        }
    };

    runtime.block_on(run(cli))
}

fn usage_error(err: clap::Error) -> ExitCode {
    if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) {
        let _ = err.print();
        return ExitCode::SUCCESS;
    }
    let _ = err.print();
    eprintln!("\n{}", Cli::command().render_help());
    ExitCode::from(USAGE_EXIT)
}

async fn run(cli: Cli) -> ExitCode {
    let invocation = match Invocation::new(
        &cli.owner,
        &cli.repo,
        cli.issue,
        &cli.command,
        &cli.github_token,
        &cli.api_key,
    ) {
        Ok(invocation) => invocation,
        Err(err) => {
            eprintln!("{err}\n\n{}", Cli::command().render_help());
            return ExitCode::from(USAGE_EXIT);
        }
    };

    let observability = match Observability::init(cli.log_format) {
        Ok(observability) => observability,
        Err(err) => {
            eprintln!("{err:#}");
            return ExitCode::from(FAILURE_EXIT);
        }
    };

    match triage(&cli, &invocation, &observability).await {
        Ok(outcome) => {
            info!(
                run_id = %outcome.run_id,
                issue = %outcome.issue,
                command = %outcome.command,
                model = %outcome.model,
                comment_id = %outcome.comment.id,
                url = %outcome.comment.url,
                prompt_bytes = outcome.prompt_bytes,
                comments = outcome.included_comments,
                skipped_comments = outcome.skipped_comments,
                files = outcome.files,
                degraded = outcome.degraded.len(),
                started_at = %outcome.started_at,
                finished_at = %outcome.finished_at,
                "Triage complete"
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(stage = %err.stage(), "Triage failed: {err}");
            ExitCode::from(FAILURE_EXIT)
        }
    }
}

async fn triage(
    cli: &Cli,
    invocation: &Invocation,
    observability: &Observability,
) -> Result<TriageOutcome, TriageError> {
    let config = load_config(&cli.config).await?;
    if config.debug_enabled() {
        if let Err(err) = observability.enable_debug() {
            error!("{err:#}");
        }
    }

    let catalog = CommandCatalog::from_config(&config.ai)?;
    let description = catalog.description(&invocation.command).unwrap_or_default();
    info!(
        config = %cli.config.display(),
        command = %invocation.command,
        description,
        "Configuration loaded"
    );

    let tracker = GithubClient::new(&config.github.api_url, invocation.github_token.clone())
        .map_err(|e| TriageError::Configuration {
            message: format!("cannot build GitHub client: {e}"),
        })?;
    let completions = OpenAiProvider::new(&config.ai.base_url, invocation.api_key.clone())
        .map_err(|e| TriageError::Configuration {
            message: format!("cannot build completion client: {e}"),
        })?;
    let source = FsRepositorySource::new(&cli.source_root);
    info!(root = %source.root().display(), "Reading repository files");

    let executor = TriageExecutor::new(
        Arc::new(tracker),
        Arc::new(completions),
        Arc::new(source),
        config.system.failure_policy,
    );
    executor.execute(invocation, &catalog).await
}
