//! Validated invocation parameters.

use crate::{
    CommandName, IssueNumber, IssueRef, RepositoryName, RepositoryOwner, Secret, TriageError,
};

/// The six required inputs of a run, all checked before any I/O happens.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub issue: IssueRef,
    pub command: CommandName,
    pub github_token: Secret,
    pub api_key: Secret,
}

impl Invocation {
    /// Validates raw parameters.
    ///
    /// Every missing parameter is reported in one [`TriageError::Usage`],
    /// named by its command-line flag.
    pub fn new(
        owner: &str,
        repo: &str,
        issue: u64,
        command: &str,
        github_token: &str,
        api_key: &str,
    ) -> Result<Self, TriageError> {
        let owner = RepositoryOwner::new(owner);
        let repo = RepositoryName::new(repo);
        let number = IssueNumber::new(issue);
        let command = CommandName::new(command);
        let github_token = Secret::new(github_token);
        let api_key = Secret::new(api_key);

        let mut missing = Vec::new();
        if repo.is_none() {
            missing.push("--repo");
        }
        if owner.is_none() {
            missing.push("--owner");
        }
        if number.is_none() {
            missing.push("--issue");
        }
        if command.is_none() {
            missing.push("--command");
        }
        if github_token.is_none() {
            missing.push("--github-token");
        }
        if api_key.is_none() {
            missing.push("--api-key");
        }

        match (owner, repo, number, command, github_token, api_key) {
            (
                Some(owner),
                Some(repo),
                Some(number),
                Some(command),
                Some(github_token),
                Some(api_key),
            ) => Ok(Self {
                issue: IssueRef {
                    owner,
                    repo,
                    number,
                },
                command,
                github_token,
                api_key,
            }),
            _ => Err(TriageError::Usage {
                message: format!("missing required arguments: {}", missing.join(", ")),
            }),
        }
    }
}
