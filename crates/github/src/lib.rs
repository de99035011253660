//! GitHub infrastructure adapter.
//!
//! Implements the [`pipeline::IssueTracker`] port over the GitHub REST API
//! using `reqwest`: one request to read the issue, paginated requests to read
//! its comments, and one request to post the result.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** This crate must not contain domain rules.
//! Authentication, pagination, and response decoding are handled here; the
//! [`pipeline`] crate never sees them. Every call is attempted once.

mod wire;

use async_trait::async_trait;
use pipeline::{
    Comment, CommentId, IssueDetails, IssueRef, IssueTracker, IssueTrackerError, PostedComment,
    Secret,
};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::wire::{CommentResponse, CreateCommentRequest, CreatedCommentResponse, IssueResponse};

/// Page size used when listing comments (the GitHub maximum).
const COMMENTS_PER_PAGE: usize = 100;
/// Upper bound on comment pages read for one issue.
const MAX_COMMENT_PAGES: u32 = 50;
const GITHUB_ACCEPT: &str = "application/vnd.github+json";
const GITHUB_API_VERSION_HEADER: &str = "x-github-api-version";
const GITHUB_API_VERSION: &str = "2022-11-28";
const USER_AGENT: &str = concat!("issue-triage/", env!("CARGO_PKG_VERSION"));
/// Login reported for comments whose author account has been deleted.
const GHOST_LOGIN: &str = "ghost";

/// GitHub REST client bound to one API root and one token.
#[derive(Clone)]
pub struct GithubClient {
    http: reqwest::Client,
    api_url: String,
    token: Secret,
    max_comment_pages: u32,
}

impl std::fmt::Debug for GithubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GithubClient")
            .field("api_url", &self.api_url)
            .field("token", &self.token)
            .finish()
    }
}

impl GithubClient {
    /// Creates a client for `api_url` (e.g. `https://api.github.com`).
    pub fn new(api_url: impl Into<String>, token: Secret) -> Result<Self, IssueTrackerError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(GITHUB_ACCEPT));
        headers.insert(
            GITHUB_API_VERSION_HEADER,
            HeaderValue::from_static(GITHUB_API_VERSION),
        );

        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()
            .map_err(|e| IssueTrackerError::Transport {
                message: format!("Failed to create HTTP client: {e}"),
            })?;

        Ok(Self {
            http,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            token,
            max_comment_pages: MAX_COMMENT_PAGES,
        })
    }

    fn issue_url(&self, issue: &IssueRef) -> String {
        format!(
            "{}/repos/{}/{}/issues/{}",
            self.api_url, issue.owner, issue.repo, issue.number
        )
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request.header(AUTHORIZATION, format!("Bearer {}", self.token.expose()))
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, IssueTrackerError> {
        let response = self
            .authorized(request)
            .send()
            .await
            .map_err(|e| IssueTrackerError::Transport {
                message: e.to_string(),
            })?;
        decode(response).await
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, IssueTrackerError> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| IssueTrackerError::Transport {
            message: format!("Failed to read response body: {e}"),
        })?;

    if !status.is_success() {
        let message = extract_error_message(&body).unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("GitHub API request failed")
                .to_string()
        });
        return Err(IssueTrackerError::Status {
            status: status.as_u16(),
            message,
        });
    }

    serde_json::from_str(&body).map_err(|e| IssueTrackerError::Decode {
        message: e.to_string(),
    })
}

fn extract_error_message(body: &str) -> Option<String> {
    let parsed = serde_json::from_str::<serde_json::Value>(body).ok()?;
    parsed
        .get("message")
        .and_then(|message| message.as_str())
        .map(ToOwned::to_owned)
}

#[async_trait]
impl IssueTracker for GithubClient {
    async fn get_issue(&self, issue: &IssueRef) -> Result<IssueDetails, IssueTrackerError> {
        let response: IssueResponse =
            self.send_json(self.http.get(self.issue_url(issue))).await?;
        Ok(IssueDetails {
            title: response.title,
            body: response.body.unwrap_or_default(),
        })
    }

    async fn list_comments(&self, issue: &IssueRef) -> Result<Vec<Comment>, IssueTrackerError> {
        let url = format!("{}/comments", self.issue_url(issue));
        let mut comments = Vec::new();

        for page in 1..=self.max_comment_pages {
            let batch: Vec<CommentResponse> = self
                .send_json(self.http.get(&url).query(&[
                    ("per_page", COMMENTS_PER_PAGE.to_string()),
                    ("page", page.to_string()),
                ]))
                .await?;
            let fetched = batch.len();
            debug!(page, fetched, "Fetched comment page");

            comments.extend(batch.into_iter().map(|c| {
                Comment::new(
                    c.user.map_or_else(|| GHOST_LOGIN.to_string(), |u| u.login),
                    c.body.unwrap_or_default(),
                )
            }));

            if fetched < COMMENTS_PER_PAGE {
                return Ok(comments);
            }
        }

        warn!(
            issue = %issue,
            pages = self.max_comment_pages,
            comments = comments.len(),
            "Comment page limit reached; remaining comments are ignored"
        );
        Ok(comments)
    }

    async fn post_comment(
        &self,
        issue: &IssueRef,
        body: &str,
    ) -> Result<PostedComment, IssueTrackerError> {
        let url = format!("{}/comments", self.issue_url(issue));
        let created: CreatedCommentResponse = self
            .send_json(self.http.post(url).json(&CreateCommentRequest { body }))
            .await?;
        Ok(PostedComment {
            id: CommentId::new(created.id),
            url: created.html_url,
        })
    }
}
