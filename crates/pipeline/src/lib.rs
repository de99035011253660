//! Core triage domain.
//!
//! This crate contains every domain concept, newtype identifier, shared value
//! type, and error type used by the triage pipeline, plus the port traits the
//! infrastructure crates implement. It turns one issue and one repository into
//! one prompt, and one completion into one posted comment.
//!
//! ## Architectural Layer
//!
//! **Business logic + port definitions.** This crate has no I/O dependencies.
//! It defines *what* is needed; infrastructure crates define *how* to supply it.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype identifiers (`IssueNumber`, `CommandName`, etc.) |
//! | [`types`] | Shared value types (`IssueSnapshot`, `FileEntry`, `Prompt`, etc.) |
//! | [`errors`] | Pipeline error taxonomy |
//! | [`config`] | YAML configuration model and [`FailurePolicy`] |
//! | [`invocation`] | Validation of the required run parameters |
//! | [`dispatch`] | Command name → system prompt and model |
//! | [`prompt`] | Prompt assembly |
//! | [`ports`] | Traits implemented by `github`, `llm`, and `repository` |
//! | [`executor`] | Stage-by-stage driver for one run |

pub mod config;
pub mod dispatch;
pub mod errors;
pub mod executor;
pub mod identifiers;
pub mod invocation;
pub mod ports;
pub mod prompt;
pub mod types;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use config::{FailurePolicy, TriageConfig};
pub use dispatch::{CommandCatalog, ResolvedCommand};
pub use errors::{FetchError, TriageError};
pub use executor::{Degradation, TriageExecutor, TriageOutcome};
pub use identifiers::{
    CommandName, CommentId, IssueNumber, ModelName, RepositoryName, RepositoryOwner, RunId,
};
pub use invocation::Invocation;
pub use ports::{
    CompletionError, CompletionProvider, CompletionRequest, IssueTracker, IssueTrackerError,
    RepositoryError, RepositorySource,
};
pub use prompt::{assemble_prompt, AssembledPrompt, AUTOMATION_BOT_LOGIN, SOURCE_DIVIDER};
pub use types::{
    Comment, FileEntry, IssueDetails, IssueRef, IssueSnapshot, PostedComment, Prompt, Secret,
    Stage, Timestamp,
};
