//! Shared value types for the triage pipeline.
//!
//! Unlike the newtype identifiers in [`crate::identifiers`], these types carry
//! the data that flows through one run: the fetched issue, the repository
//! files, the assembled prompt, and the comment posted back.

use chrono::{DateTime, Utc};

use crate::{CommentId, IssueNumber, RepositoryName, RepositoryOwner};

// ---------------------------------------------------------------------------
// Credentials
// ---------------------------------------------------------------------------

/// A credential string whose `Debug` and `Display` output is redacted.
///
/// Adapters call [`Secret::expose`] at the single point where the value is
/// written into a request header.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    /// Wraps a credential, returning `None` if it is empty.
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let v = value.into();
        if v.is_empty() {
            None
        } else {
            Some(Self(v))
        }
    }

    /// Returns the raw credential.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Secret([REDACTED])")
    }
}

impl std::fmt::Display for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[REDACTED]")
    }
}

// ---------------------------------------------------------------------------
// Issue data
// ---------------------------------------------------------------------------

/// Fully qualified reference to one issue: `owner/repo#number`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IssueRef {
    /// Repository owner.
    pub owner: RepositoryOwner,
    /// Repository name.
    pub repo: RepositoryName,
    /// Issue number within the repository.
    pub number: IssueNumber,
}

impl std::fmt::Display for IssueRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}#{}", self.owner, self.repo, self.number)
    }
}

/// Title and description of an issue as returned by the tracker.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IssueDetails {
    pub title: String,
    pub body: String,
}

/// One comment on an issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    /// Login of the comment author.
    pub author: String,
    /// Comment text, verbatim.
    pub body: String,
}

impl Comment {
    pub fn new(author: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            author: author.into(),
            body: body.into(),
        }
    }
}

/// Everything fetched from the tracker for one issue.
///
/// Comments keep the order in which the tracker returned them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IssueSnapshot {
    pub title: String,
    pub body: String,
    pub comments: Vec<Comment>,
}

/// A comment created by the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostedComment {
    pub id: CommentId,
    /// Browser URL of the comment.
    pub url: String,
}

// ---------------------------------------------------------------------------
// Repository content
// ---------------------------------------------------------------------------

/// One file from the repository, keyed by its path relative to the walk root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Forward-slash separated path relative to the repository root.
    pub path: String,
    pub contents: String,
}

impl FileEntry {
    pub fn new(path: impl Into<String>, contents: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            contents: contents.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Prompt
// ---------------------------------------------------------------------------

/// The single text payload submitted to the completion service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt(String);

impl Prompt {
    pub(crate) fn from_string(text: String) -> Self {
        Self(text)
    }

    /// Returns the prompt text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Prompt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Pipeline stages
// ---------------------------------------------------------------------------

/// The linear sequence of states one run passes through.
///
/// A run never moves backwards; a fatal error ends it in the stage that
/// raised it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    ValidateInputs,
    LoadConfig,
    FetchIssue,
    AssemblePrompt,
    Dispatch,
    Complete,
    PostComment,
    Done,
}

impl Stage {
    /// Stable lowercase name used in log fields.
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::ValidateInputs => "validate_inputs",
            Stage::LoadConfig => "load_config",
            Stage::FetchIssue => "fetch_issue",
            Stage::AssemblePrompt => "assemble_prompt",
            Stage::Dispatch => "dispatch",
            Stage::Complete => "complete",
            Stage::PostComment => "post_comment",
            Stage::Done => "done",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// A UTC wall-clock timestamp.
///
/// Wraps [`chrono::DateTime<Utc>`] so callers never depend on `chrono` types
/// directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Returns the current UTC time as a [`Timestamp`].
    pub fn now() -> Self {
        Self(Utc::now())
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}
