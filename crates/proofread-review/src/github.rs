use proofread_core::{GitHubConfig, ProofreadError};
use serde::{Deserialize, Serialize};

/// A review comment as returned by the pull-request comments listing.
#[derive(Debug, Clone, Deserialize)]
pub struct PullComment {
    /// Comment id, used in the delete route.
    pub id: u64,
    /// Author of the comment; absent for deleted accounts.
    pub user: Option<CommentAuthor>,
}

/// Author of a review comment.
#[derive(Debug, Clone, Deserialize)]
pub struct CommentAuthor {
    pub login: String,
}

#[derive(Deserialize)]
struct PullRequest {
    head: Head,
}

#[derive(Deserialize)]
struct Head {
    sha: String,
}

#[derive(Serialize)]
struct ListParams {
    per_page: u8,
}

/// Manages this automation's review comments on one pull request.
///
/// Comments are owned by the configured bot login: [`delete_existing_comments`]
/// removes only those, so every run starts from a clean slate without touching
/// human reviewers' threads.
///
/// [`delete_existing_comments`]: GitHubClient::delete_existing_comments
pub struct GitHubClient {
    octocrab: octocrab::Octocrab,
    repository: String,
    pr_number: u64,
    bot_login: String,
}

impl GitHubClient {
    /// Create a client for the configured repository and pull request.
    ///
    /// # Errors
    ///
    /// Returns [`ProofreadError::Config`] if the API URL is not a valid URI,
    /// or [`ProofreadError::GitHub`] if the client cannot be built.
    pub fn new(config: &GitHubConfig) -> Result<Self, ProofreadError> {
        let octocrab = octocrab::Octocrab::builder()
            .base_uri(config.api_url.as_str())
            .map_err(|e| {
                ProofreadError::Config(format!("invalid GitHub API URL '{}': {e}", config.api_url))
            })?
            .personal_token(config.token.clone())
            .build()
            .map_err(|e| ProofreadError::GitHub(format!("failed to create GitHub client: {e}")))?;

        Ok(Self {
            octocrab,
            repository: config.repository.clone(),
            pr_number: config.pr_number,
            bot_login: config.bot_login.clone(),
        })
    }

    /// List the review comments currently on the pull request.
    ///
    /// # Errors
    ///
    /// Returns [`ProofreadError::GitHub`] on network or API errors.
    pub async fn list_comments(&self) -> Result<Vec<PullComment>, ProofreadError> {
        let route = format!("/repos/{}/pulls/{}/comments", self.repository, self.pr_number);
        self.octocrab
            .get(route, Some(&ListParams { per_page: 100 }))
            .await
            .map_err(|e| ProofreadError::GitHub(format!("failed to get comments: {e}")))
    }

    /// Delete a single review comment.
    ///
    /// # Errors
    ///
    /// Returns [`ProofreadError::GitHub`] on network errors or a non-success status.
    pub async fn delete_comment(&self, comment_id: u64) -> Result<(), ProofreadError> {
        let route = format!("/repos/{}/pulls/comments/{comment_id}", self.repository);
        let response = self
            .octocrab
            ._delete(route, None::<&()>)
            .await
            .map_err(|e| ProofreadError::GitHub(format!("failed to delete comment: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProofreadError::GitHub(format!(
                "GitHub API error {status} deleting comment {comment_id}"
            )));
        }
        Ok(())
    }

    /// Delete every comment on the pull request authored by the bot login.
    ///
    /// Failures are logged per comment and never abort the pass. Returns the
    /// number of comments deleted.
    pub async fn delete_existing_comments(&self) -> usize {
        let comments = match self.list_comments().await {
            Ok(c) => c,
            Err(e) => {
                tracing::error!("{e}");
                return 0;
            }
        };

        let mut deleted = 0;
        for comment in comments.iter().filter(|c| self.is_own(c)) {
            match self.delete_comment(comment.id).await {
                Ok(()) => {
                    tracing::info!(comment_id = comment.id, "deleted comment");
                    deleted += 1;
                }
                Err(e) => tracing::error!(comment_id = comment.id, "{e}"),
            }
        }
        deleted
    }

    /// Fetch the head commit SHA of the pull request.
    ///
    /// # Errors
    ///
    /// Returns [`ProofreadError::GitHub`] on network or API errors.
    pub async fn latest_commit(&self) -> Result<String, ProofreadError> {
        let route = format!("/repos/{}/pulls/{}", self.repository, self.pr_number);
        let pr: PullRequest = self
            .octocrab
            .get(route, None::<&()>)
            .await
            .map_err(|e| ProofreadError::GitHub(format!("failed to get latest commit SHA: {e}")))?;
        Ok(pr.head.sha)
    }

    /// Create a line comment on the right side of the diff at `commit_id`.
    ///
    /// # Errors
    ///
    /// Returns [`ProofreadError::GitHub`] on network or API errors.
    pub async fn create_comment(
        &self,
        commit_id: &str,
        path: &str,
        line: u32,
        body: &str,
    ) -> Result<(), ProofreadError> {
        let route = format!("/repos/{}/pulls/{}/comments", self.repository, self.pr_number);
        let payload = serde_json::json!({
            "body": body,
            "commit_id": commit_id,
            "path": path,
            "side": "RIGHT",
            "line": line,
        });

        let _created: serde_json::Value = self
            .octocrab
            .post(route, Some(&payload))
            .await
            .map_err(|e| ProofreadError::GitHub(format!("failed to post comment: {e}")))?;
        Ok(())
    }

    /// Post a comment anchored to the pull request's latest commit.
    ///
    /// Resolves the head commit first; if that or the post fails, the error
    /// is logged and `false` is returned. Nothing here aborts the run.
    pub async fn post_comment(&self, path: &str, line: u32, body: &str) -> bool {
        let commit_id = match self.latest_commit().await {
            Ok(sha) => sha,
            Err(e) => {
                tracing::error!(path, line, "cannot post comment without a commit id: {e}");
                return false;
            }
        };

        match self.create_comment(&commit_id, path, line, body).await {
            Ok(()) => {
                tracing::info!(path, line, "posted comment");
                true
            }
            Err(e) => {
                tracing::error!(path, line, "{e}");
                false
            }
        }
    }

    fn is_own(&self, comment: &PullComment) -> bool {
        comment
            .user
            .as_ref()
            .is_some_and(|u| u.login.eq_ignore_ascii_case(&self.bot_login))
    }
}

#[cfg(test)]
mod tests {
    use httpmock::prelude::*;
    use serde_json::json;

    use super::*;

    fn client_for(server: &MockServer) -> GitHubClient {
        GitHubClient::new(&GitHubConfig {
            repository: "octocat/docs".into(),
            pr_number: 7,
            token: "ghs_test".into(),
            api_url: server.base_url(),
            bot_login: "github-actions[bot]".into(),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn delete_existing_only_removes_bot_comments() {
        let server = MockServer::start_async().await;
        let listing = server.mock(|when, then| {
            when.method(GET).path("/repos/octocat/docs/pulls/7/comments");
            then.status(200).json_body(json!([
                {"id": 1, "user": {"login": "github-actions[bot]"}},
                {"id": 2, "user": {"login": "alice"}},
                {"id": 3, "user": {"login": "github-actions[bot]"}},
                {"id": 4, "user": null}
            ]));
        });
        let delete_1 = server.mock(|when, then| {
            when.method(DELETE).path("/repos/octocat/docs/pulls/comments/1");
            then.status(204);
        });
        let delete_2 = server.mock(|when, then| {
            when.method(DELETE).path("/repos/octocat/docs/pulls/comments/2");
            then.status(204);
        });
        let delete_3 = server.mock(|when, then| {
            when.method(DELETE).path("/repos/octocat/docs/pulls/comments/3");
            then.status(204);
        });
        let delete_4 = server.mock(|when, then| {
            when.method(DELETE).path("/repos/octocat/docs/pulls/comments/4");
            then.status(204);
        });

        let client = client_for(&server);
        assert_eq!(client.delete_existing_comments().await, 2);
        assert_eq!(listing.calls(), 1);
        assert_eq!(delete_1.calls(), 1);
        assert_eq!(delete_2.calls(), 0);
        assert_eq!(delete_3.calls(), 1);
        assert_eq!(delete_4.calls(), 0);
    }

    #[tokio::test]
    async fn delete_existing_continues_after_failure() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/repos/octocat/docs/pulls/7/comments");
            then.status(200).json_body(json!([
                {"id": 10, "user": {"login": "github-actions[bot]"}},
                {"id": 11, "user": {"login": "github-actions[bot]"}}
            ]));
        });
        server.mock(|when, then| {
            when.method(DELETE).path("/repos/octocat/docs/pulls/comments/10");
            then.status(403);
        });
        let second = server.mock(|when, then| {
            when.method(DELETE).path("/repos/octocat/docs/pulls/comments/11");
            then.status(204);
        });

        let client = client_for(&server);
        assert_eq!(client.delete_existing_comments().await, 1);
        assert_eq!(second.calls(), 1);
    }

    #[tokio::test]
    async fn delete_existing_survives_listing_failure() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/repos/octocat/docs/pulls/7/comments");
            then.status(500).json_body(json!({"message": "boom"}));
        });

        let client = client_for(&server);
        assert_eq!(client.delete_existing_comments().await, 0);
    }

    #[tokio::test]
    async fn latest_commit_reads_head_sha() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET)
                .path("/repos/octocat/docs/pulls/7")
                .header_exists("authorization");
            then.status(200)
                .json_body(json!({"number": 7, "head": {"sha": "abc123", "ref": "fix-typos"}}));
        });

        let client = client_for(&server);
        assert_eq!(client.latest_commit().await.unwrap(), "abc123");
    }

    #[tokio::test]
    async fn post_comment_anchors_to_head_commit() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/repos/octocat/docs/pulls/7");
            then.status(200).json_body(json!({"head": {"sha": "abc123"}}));
        });
        let create = server.mock(|when, then| {
            when.method(POST)
                .path("/repos/octocat/docs/pulls/7/comments")
                .body_includes("\"commit_id\":\"abc123\"")
                .body_includes("\"path\":\"README.md\"")
                .body_includes("\"side\":\"RIGHT\"")
                .body_includes("\"line\":3")
                .body_includes("\"body\":\"hello\"");
            then.status(201).json_body(json!({"id": 99}));
        });

        let client = client_for(&server);
        assert!(client.post_comment("README.md", 3, "hello").await);
        assert_eq!(create.calls(), 1);
    }

    #[tokio::test]
    async fn post_comment_skips_without_commit() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/repos/octocat/docs/pulls/7");
            then.status(404).json_body(json!({"message": "Not Found"}));
        });
        let create = server.mock(|when, then| {
            when.method(POST).path("/repos/octocat/docs/pulls/7/comments");
            then.status(201).json_body(json!({"id": 1}));
        });

        let client = client_for(&server);
        assert!(!client.post_comment("README.md", 1, "hello").await);
        assert_eq!(create.calls(), 0);
    }

    #[tokio::test]
    async fn post_comment_reports_rejection() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/repos/octocat/docs/pulls/7");
            then.status(200).json_body(json!({"head": {"sha": "abc123"}}));
        });
        let create = server.mock(|when, then| {
            when.method(POST).path("/repos/octocat/docs/pulls/7/comments");
            then.status(422).json_body(json!({
                "message": "Validation Failed",
                "documentation_url": "https://docs.github.com/rest"
            }));
        });

        let client = client_for(&server);
        assert!(!client.post_comment("README.md", 400, "hello").await);
        assert_eq!(create.calls(), 1);
    }
}
