//! Port traits implemented by infrastructure crates.
//!
//! The executor only ever talks to these traits. `github` implements
//! [`IssueTracker`], `llm` implements [`CompletionProvider`], and `repository`
//! implements [`RepositorySource`]. Each port owns its error type so adapters
//! can report transport and decoding failures without depending on each other.

use async_trait::async_trait;
use thiserror::Error;

use crate::{Comment, FileEntry, IssueDetails, IssueRef, ModelName, PostedComment, Prompt};

// ---------------------------------------------------------------------------
// Issue tracker
// ---------------------------------------------------------------------------

/// Failure talking to the issue tracker.
#[derive(Debug, Error)]
pub enum IssueTrackerError {
    /// The request never produced an HTTP response.
    #[error("Issue tracker request failed: {message}")]
    Transport { message: String },

    /// The tracker answered with a non-success status.
    #[error("Issue tracker returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// The response body did not have the expected shape.
    #[error("Unexpected issue tracker response: {message}")]
    Decode { message: String },
}

/// Read and write access to one issue tracker.
#[async_trait]
pub trait IssueTracker: Send + Sync {
    /// Fetches the title and body of `issue`.
    async fn get_issue(&self, issue: &IssueRef) -> Result<IssueDetails, IssueTrackerError>;

    /// Fetches every comment on `issue`, oldest first.
    async fn list_comments(&self, issue: &IssueRef) -> Result<Vec<Comment>, IssueTrackerError>;

    /// Appends a comment with `body` to `issue`.
    async fn post_comment(
        &self,
        issue: &IssueRef,
        body: &str,
    ) -> Result<PostedComment, IssueTrackerError>;
}

// ---------------------------------------------------------------------------
// Completion service
// ---------------------------------------------------------------------------

/// Failure obtaining a completion.
#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("Completion request failed: {message}")]
    Transport { message: String },

    #[error("Completion service returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Unexpected completion response: {message}")]
    Decode { message: String },

    /// The service answered successfully but produced no choices.
    #[error("Completion service returned no choices")]
    NoChoices,
}

/// A prompt bound to the model that should answer it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    pub model: ModelName,
    pub prompt: Prompt,
}

/// A language-model completion endpoint.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Submits `request` and returns the generated text verbatim.
    ///
    /// An empty string is a valid completion.
    async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError>;
}

// ---------------------------------------------------------------------------
// Repository content
// ---------------------------------------------------------------------------

/// Failure enumerating or reading repository files.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Failed to walk '{path}': {message}")]
    Walk { path: String, message: String },

    #[error("Failed to read '{path}': {message}")]
    Read { path: String, message: String },
}

/// Lists the files of the repository being triaged.
#[async_trait]
pub trait RepositorySource: Send + Sync {
    /// Returns every readable text file, sorted by path.
    async fn list_files(&self) -> Result<Vec<FileEntry>, RepositoryError>;
}
