//! The triage executor: drives one run from fetch to post-back.
//!
//! Stages run strictly in order and each external call is made exactly once:
//!
//! ```text
//! FetchIssue → AssemblePrompt → Dispatch → Complete → PostComment → Done
//! ```
//!
//! `ValidateInputs` and `LoadConfig` happen before an executor exists, because
//! the adapters it holds are built from the validated credentials and the
//! loaded configuration. [`TriageExecutor::execute`] performs command
//! resolution so an unknown command never reaches the network.

use std::sync::Arc;

use tracing::{debug, info, info_span, warn, Instrument};

use crate::dispatch::{CommandCatalog, ResolvedCommand};
use crate::errors::FetchError;
use crate::ports::{CompletionProvider, CompletionRequest, IssueTracker, RepositorySource};
use crate::prompt::{assemble_prompt, AUTOMATION_BOT_LOGIN};
use crate::{
    CommandName, FailurePolicy, Invocation, IssueRef, IssueSnapshot, ModelName, PostedComment,
    RunId, Stage, Timestamp, TriageError,
};

const PROMPT_COLOR: &str = "\x1b[34m";
const RESPONSE_COLOR: &str = "\x1b[32m";
const RESET_COLOR: &str = "\x1b[0m";

/// An input that was replaced by an empty value under [`FailurePolicy::Degrade`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Degradation {
    IssueDetails,
    Comments,
    RepositoryFiles,
    Completion,
}

impl Degradation {
    fn stage(self) -> Stage {
        match self {
            Degradation::Completion => Stage::Complete,
            _ => Stage::FetchIssue,
        }
    }
}

impl std::fmt::Display for Degradation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Degradation::IssueDetails => "issue details",
            Degradation::Comments => "issue comments",
            Degradation::RepositoryFiles => "repository files",
            Degradation::Completion => "completion",
        })
    }
}

/// Summary of a successful run.
#[derive(Debug, Clone, PartialEq)]
pub struct TriageOutcome {
    pub run_id: RunId,
    pub issue: IssueRef,
    pub command: CommandName,
    pub model: ModelName,
    pub comment: PostedComment,
    /// Size of the submitted prompt in bytes.
    pub prompt_bytes: usize,
    pub included_comments: usize,
    pub skipped_comments: usize,
    pub files: usize,
    /// Inputs that failed and were replaced by empty values.
    pub degraded: Vec<Degradation>,
    pub started_at: Timestamp,
    pub finished_at: Timestamp,
}

/// Runs the triage stages against injected infrastructure.
pub struct TriageExecutor {
    tracker: Arc<dyn IssueTracker>,
    completions: Arc<dyn CompletionProvider>,
    source: Arc<dyn RepositorySource>,
    policy: FailurePolicy,
}

impl TriageExecutor {
    pub fn new(
        tracker: Arc<dyn IssueTracker>,
        completions: Arc<dyn CompletionProvider>,
        source: Arc<dyn RepositorySource>,
        policy: FailurePolicy,
    ) -> Self {
        Self {
            tracker,
            completions,
            source,
            policy,
        }
    }

    /// Resolves the invocation's command against `catalog`, then runs it.
    pub async fn execute(
        &self,
        invocation: &Invocation,
        catalog: &CommandCatalog,
    ) -> Result<TriageOutcome, TriageError> {
        let command = catalog.resolve(&invocation.command)?;
        self.run(&invocation.issue, &command).await
    }

    /// Runs every stage for `issue` using an already resolved command.
    pub async fn run(
        &self,
        issue: &IssueRef,
        command: &ResolvedCommand,
    ) -> Result<TriageOutcome, TriageError> {
        let run_id = RunId::new_random();
        let span = info_span!(
            "triage",
            run_id = %run_id,
            issue = %issue,
            command = %command.name,
            model = %command.model,
        );
        self.run_stages(run_id, issue, command)
            .instrument(span)
            .await
    }

    async fn run_stages(
        &self,
        run_id: RunId,
        issue: &IssueRef,
        command: &ResolvedCommand,
    ) -> Result<TriageOutcome, TriageError> {
        let started_at = Timestamp::now();
        let mut degraded = Vec::new();

        info!(stage = %Stage::FetchIssue, "Fetching issue");
        let details = self.absorb(
            self.tracker
                .get_issue(issue)
                .await
                .map_err(FetchError::Issue),
            Degradation::IssueDetails,
            &mut degraded,
        )?;
        debug!("Title: {}", details.title);
        debug!("Body: {}", details.body);

        let comments = self.absorb(
            self.tracker
                .list_comments(issue)
                .await
                .map_err(FetchError::Comments),
            Degradation::Comments,
            &mut degraded,
        )?;
        for comment in comments.iter().filter(|c| c.author != AUTOMATION_BOT_LOGIN) {
            debug!("{}: {}", comment.author, comment.body);
        }

        let files = self.absorb(
            self.source
                .list_files()
                .await
                .map_err(FetchError::Repository),
            Degradation::RepositoryFiles,
            &mut degraded,
        )?;

        let snapshot = IssueSnapshot {
            title: details.title,
            body: details.body,
            comments,
        };

        info!(stage = %Stage::AssemblePrompt, files = files.len(), "Assembling prompt");
        let assembled = assemble_prompt(&snapshot, &files, &command.system_prompt);

        info!(
            stage = %Stage::Dispatch,
            prompt_bytes = assembled.prompt.as_str().len(),
            included_comments = assembled.included_comments,
            skipped_comments = assembled.skipped_comments,
            "Dispatching prompt"
        );
        let request = CompletionRequest {
            model: command.model.clone(),
            prompt: assembled.prompt,
        };
        debug!("{}", highlight(PROMPT_COLOR, "Prompt", request.prompt.as_str()));

        info!(stage = %Stage::Complete, "Requesting completion");
        let completion = self.absorb(
            self.completions.complete(&request).await,
            Degradation::Completion,
            &mut degraded,
        )?;
        debug!("{}", highlight(RESPONSE_COLOR, "Response", &completion));

        info!(stage = %Stage::PostComment, bytes = completion.len(), "Posting comment");
        let comment = self
            .tracker
            .post_comment(issue, &completion)
            .await
            .map_err(TriageError::Post)?;

        info!(stage = %Stage::Done, comment_id = %comment.id, url = %comment.url, "Comment posted");

        Ok(TriageOutcome {
            run_id,
            issue: issue.clone(),
            command: command.name.clone(),
            model: request.model,
            comment,
            prompt_bytes: request.prompt.as_str().len(),
            included_comments: assembled.included_comments,
            skipped_comments: assembled.skipped_comments,
            files: assembled.files,
            degraded,
            started_at,
            finished_at: Timestamp::now(),
        })
    }

    /// Applies the failure policy to the result of one fetch or completion.
    fn absorb<T, E>(
        &self,
        result: Result<T, E>,
        what: Degradation,
        degraded: &mut Vec<Degradation>,
    ) -> Result<T, TriageError>
    where
        T: Default,
        E: Into<TriageError> + std::fmt::Display,
    {
        match result {
            Ok(value) => Ok(value),
            Err(err) => match self.policy {
                FailurePolicy::Abort => Err(err.into()),
                FailurePolicy::Degrade => {
                    warn!(
                        stage = %what.stage(),
                        error = %err,
                        "Failed to obtain {what}; continuing with an empty value"
                    );
                    degraded.push(what);
                    Ok(T::default())
                }
            },
        }
    }
}

fn highlight(color: &str, label: &str, text: &str) -> String {
    format!("{color}{label}: |\n{text}{RESET_COLOR}")
}
