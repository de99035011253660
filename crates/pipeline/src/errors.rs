//! Top-level error types for the triage pipeline.
//!
//! [`TriageError`] covers every condition that ends a run. Port-level errors
//! (tracker, completion, repository failures) are defined in [`crate::ports`]
//! and wrapped here with the stage that observed them.
//!
//! Whether a fetch or completion failure ends the run at all is decided by
//! [`crate::FailurePolicy`]; configuration and post failures always do.

use thiserror::Error;

use crate::ports::{CompletionError, IssueTrackerError, RepositoryError};
use crate::Stage;

// ---------------------------------------------------------------------------
// Fetch failures
// ---------------------------------------------------------------------------

/// A read from the tracker or the repository failed.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("issue details: {0}")]
    Issue(#[source] IssueTrackerError),

    #[error("issue comments: {0}")]
    Comments(#[source] IssueTrackerError),

    #[error("repository files: {0}")]
    Repository(#[source] RepositoryError),
}

// ---------------------------------------------------------------------------
// Pipeline-level errors
// ---------------------------------------------------------------------------

/// Errors that end a triage run.
#[derive(Debug, Error)]
pub enum TriageError {
    /// Required invocation parameters are missing or invalid.
    ///
    /// Raised before any I/O is attempted.
    #[error("Invalid invocation: {message}")]
    Usage {
        /// Description naming the offending parameters.
        message: String,
    },

    /// The configuration file could not be read, parsed, or validated.
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration problem.
        message: String,
    },

    /// The requested command has no entry in the configuration.
    #[error("Unknown command '{command}' (available: {})", available.join(", "))]
    UnknownCommand {
        /// The command name as given on the command line.
        command: String,
        /// Configured command names, sorted.
        available: Vec<String>,
    },

    /// Reading issue data or repository files failed.
    #[error("Failed to fetch {0}")]
    Fetch(#[from] FetchError),

    /// The completion service did not return a completion.
    #[error(transparent)]
    Completion(#[from] CompletionError),

    /// Posting the result comment failed.
    #[error("Failed to post comment: {0}")]
    Post(#[source] IssueTrackerError),
}

impl TriageError {
    /// The pipeline stage in which this error is raised.
    pub fn stage(&self) -> Stage {
        match self {
            TriageError::Usage { .. } => Stage::ValidateInputs,
            TriageError::Configuration { .. } | TriageError::UnknownCommand { .. } => {
                Stage::LoadConfig
            }
            TriageError::Fetch(_) => Stage::FetchIssue,
            TriageError::Completion(_) => Stage::Complete,
            TriageError::Post(_) => Stage::PostComment,
        }
    }

    pub(crate) fn configuration(message: impl Into<String>) -> Self {
        TriageError::Configuration {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_command_lists_available_names() {
        let err = TriageError::UnknownCommand {
            command: "summarise".into(),
            available: vec!["describe".into(), "suggest".into()],
        };
        assert_eq!(
            err.to_string(),
            "Unknown command 'summarise' (available: describe, suggest)"
        );
        assert_eq!(err.stage(), Stage::LoadConfig);
    }

    #[test]
    fn fetch_errors_name_the_failed_read() {
        let err = TriageError::from(FetchError::Comments(IssueTrackerError::Status {
            status: 404,
            message: "Not Found".into(),
        }));
        assert_eq!(
            err.to_string(),
            "Failed to fetch issue comments: Issue tracker returned HTTP 404: Not Found"
        );
        assert_eq!(err.stage(), Stage::FetchIssue);
    }

    #[test]
    fn post_errors_are_reported_in_post_stage() {
        let err = TriageError::Post(IssueTrackerError::Transport {
            message: "connection reset".into(),
        });
        assert_eq!(err.stage(), Stage::PostComment);
    }
}
