//! GitHub REST payloads. Only the fields the adapter reads are declared.

use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub(crate) struct IssueResponse {
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UserResponse {
    pub login: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CommentResponse {
    /// `null` when the author account no longer exists.
    #[serde(default)]
    pub user: Option<UserResponse>,
    #[serde(default)]
    pub body: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct CreateCommentRequest<'a> {
    pub body: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CreatedCommentResponse {
    pub id: u64,
    pub html_url: String,
}
