use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};

use proofread_core::{Config, FailOn, Issue, ProofreadError};

use crate::files;
use crate::github::GitHubClient;
use crate::llm::{ChatMessage, LlmClient, Role};
use crate::prompt;

/// Outcome of a completed run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOutcome {
    /// Files that produced a model response.
    pub files_checked: usize,
    /// Files skipped because they were unreadable, empty, or the request failed.
    pub files_skipped: usize,
    /// Issues that passed validation.
    pub issues_found: usize,
    /// Comments the PR API accepted.
    pub comments_posted: usize,
    /// Issues whose category matches an enabled fail-on flag.
    pub failing_issues: usize,
    /// Old bot comments removed before checking.
    pub comments_deleted: usize,
}

impl RunOutcome {
    /// Whether at least one issue matched an enabled fail-on flag.
    pub fn is_failing(&self) -> bool {
        self.failing_issues > 0
    }

    /// Process exit code: 1 when failing, else 0.
    pub fn exit_code(&self) -> i32 {
        if self.is_failing() {
            1
        } else {
            0
        }
    }
}

impl fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "files checked: {} | skipped: {} | issues: {} | comments posted: {} | failing: {}",
            self.files_checked,
            self.files_skipped,
            self.issues_found,
            self.comments_posted,
            self.failing_issues,
        )
    }
}

/// Drives a full proofreading run over the configured files.
///
/// Deletes the bot's previous comments, then for each file in order:
/// read, annotate, ask the model, parse, and post one comment per issue.
/// Every step after configuration is recoverable; the run always completes.
pub struct SpellCheckRun {
    llm: LlmClient,
    github: GitHubClient,
    files: Vec<PathBuf>,
    default_language: String,
    fail_on: FailOn,
    results_file: Option<PathBuf>,
}

impl SpellCheckRun {
    /// Build the completion and PR-API clients from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if either HTTP client cannot be constructed.
    pub fn new(config: &Config) -> Result<Self, ProofreadError> {
        Ok(Self {
            llm: LlmClient::new(&config.llm)?,
            github: GitHubClient::new(&config.github)?,
            files: config.files.clone(),
            default_language: config.default_language.clone(),
            fail_on: config.fail_on,
            results_file: None,
        })
    }

    /// Append each file's parsed issues to `path` as JSON lines.
    pub fn with_results_file(mut self, path: Option<PathBuf>) -> Self {
        self.results_file = path;
        self
    }

    /// Run the whole check and return the aggregated outcome.
    pub async fn run(&self) -> RunOutcome {
        let mut outcome = RunOutcome {
            comments_deleted: self.github.delete_existing_comments().await,
            ..RunOutcome::default()
        };

        let mut all_issues = Vec::new();
        for path in &self.files {
            let issues = self.check_file(path, &mut outcome).await;
            all_issues.extend(issues);
        }

        outcome.issues_found = all_issues.len();
        outcome.failing_issues = count_failing(&all_issues, self.fail_on);
        tracing::info!(model = self.llm.model(), "run finished: {outcome}");
        outcome
    }

    async fn check_file(&self, path: &Path, outcome: &mut RunOutcome) -> Vec<Issue> {
        let Some(lines) = files::read_lines(path) else {
            tracing::error!(path = %path.display(), "skipping file due to read error");
            outcome.files_skipped += 1;
            return Vec::new();
        };
        if lines.is_empty() {
            tracing::info!(path = %path.display(), "file is empty, nothing to check");
            outcome.files_skipped += 1;
            return Vec::new();
        }

        let annotated = files::annotate_lines(&lines);
        let response = match self.detect(&annotated).await {
            Ok(r) => r,
            Err(e) => {
                tracing::error!(path = %path.display(), "{e}");
                outcome.files_skipped += 1;
                return Vec::new();
            }
        };
        outcome.files_checked += 1;
        tracing::debug!(path = %path.display(), %response, "model response");

        let issues: Vec<Issue> = prompt::parse_issues(&response)
            .into_iter()
            .filter(|issue| {
                let in_range = issue.line_number as usize <= lines.len();
                if !in_range {
                    tracing::warn!(
                        path = %path.display(),
                        line = issue.line_number,
                        lines = lines.len(),
                        "dropping issue outside the file"
                    );
                }
                in_range
            })
            .collect();

        if let Some(results) = &self.results_file {
            append_results(results, path, &issues);
        }

        let comment_path = path.to_string_lossy();
        for issue in &issues {
            if self
                .github
                .post_comment(&comment_path, issue.line_number, &issue.comment_body())
                .await
            {
                outcome.comments_posted += 1;
            }
        }
        issues
    }

    async fn detect(&self, annotated: &[String]) -> Result<String, ProofreadError> {
        let messages = vec![
            ChatMessage {
                role: Role::System,
                content: prompt::build_system_prompt(),
            },
            ChatMessage {
                role: Role::User,
                content: prompt::build_check_prompt(annotated, &self.default_language),
            },
        ];
        self.llm.chat(messages).await
    }
}

/// Count the issues whose category trips an enabled fail-on flag.
pub fn count_failing(issues: &[Issue], fail_on: FailOn) -> usize {
    issues
        .iter()
        .filter(|issue| fail_on.matches(issue.category))
        .count()
}

fn append_results(results: &Path, path: &Path, issues: &[Issue]) {
    let record = serde_json::json!({
        "path": path.to_string_lossy(),
        "issues": issues,
    });
    let written = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(results)
        .and_then(|mut file| writeln!(file, "{record}"));
    if let Err(e) = written {
        tracing::error!(results = %results.display(), "failed to save results: {e}");
    }
}
