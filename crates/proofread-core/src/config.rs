use std::fmt;
use std::path::PathBuf;

use crate::error::ProofreadError;
use crate::types::{FailOn, LogLevel};

const DEFAULT_LANGUAGE: &str = "English";
const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";
const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";
const DEFAULT_BOT_LOGIN: &str = "github-actions[bot]";

/// Run configuration, built once at startup from `INPUT_*` variables.
///
/// Every field is resolved before any file is read or any request is sent;
/// a missing required value aborts the run with [`ProofreadError::Config`].
///
/// # Examples
///
/// ```
/// use std::collections::HashMap;
/// use proofread_core::Config;
///
/// let env: HashMap<&str, &str> = HashMap::from([
///     ("INPUT_GITHUB_REPOSITORY", "octocat/docs"),
///     ("INPUT_GITHUB_TOKEN", "ghs_xxx"),
///     ("INPUT_PR_NUMBER", "7"),
///     ("INPUT_FILES", "README.md, docs/guide.md"),
///     ("INPUT_OPENAI_API_KEY", "sk-xxx"),
///     ("INPUT_OPENAI_MODEL", "gpt-4o-mini"),
///     ("INPUT_MODEL_MAX_TOKEN", "1024"),
///     ("INPUT_FAIL_ON_SPELLING", "True"),
/// ]);
/// let config = Config::from_lookup(|key| env.get(key).map(|v| v.to_string())).unwrap();
/// assert_eq!(config.github.pr_number, 7);
/// assert_eq!(config.files.len(), 2);
/// assert!(config.fail_on.spelling);
/// assert!(!config.fail_on.grammar);
/// ```
#[derive(Clone)]
pub struct Config {
    /// Pull-request API settings.
    pub github: GitHubConfig,
    /// Completion API settings.
    pub llm: LlmConfig,
    /// Files to check, in the order given.
    pub files: Vec<PathBuf>,
    /// Language the model should assume the text is written in.
    pub default_language: String,
    /// Categories that fail the run.
    pub fail_on: FailOn,
    /// Log verbosity.
    pub log_level: LogLevel,
}

/// Pull-request API configuration.
#[derive(Clone)]
pub struct GitHubConfig {
    /// Repository in `owner/name` form.
    pub repository: String,
    /// Pull request number.
    pub pr_number: u64,
    /// Token sent as a bearer credential.
    pub token: String,
    /// Base URL of the REST API.
    pub api_url: String,
    /// Login whose comments belong to this automation.
    pub bot_login: String,
}

/// Completion API configuration.
///
/// # Examples
///
/// ```
/// use proofread_core::LlmConfig;
///
/// let config = LlmConfig::default();
/// assert_eq!(config.base_url, "https://api.openai.com");
/// ```
#[derive(Clone)]
pub struct LlmConfig {
    /// API key for the provider.
    pub api_key: String,
    /// Model identifier.
    pub model: String,
    /// Cap on completion tokens per request.
    pub max_tokens: u32,
    /// Base URL; requests go to `{base_url}/v1/chat/completions`.
    pub base_url: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: "gpt-4o-mini".into(),
            max_tokens: 1024,
            base_url: DEFAULT_OPENAI_BASE_URL.into(),
        }
    }
}

impl Config {
    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ProofreadError::Config`] naming every required variable
    /// that is missing, empty or malformed.
    pub fn from_env() -> Result<Self, ProofreadError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// Values are trimmed and empty values count as missing.
    ///
    /// # Errors
    ///
    /// Returns [`ProofreadError::Config`] naming every required variable
    /// that is missing, empty or malformed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ProofreadError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut vars = Vars {
            lookup,
            problems: Vec::new(),
        };

        let repository = vars.required("INPUT_GITHUB_REPOSITORY");
        if let Some(repo) = &repository {
            if !is_owner_and_name(repo) {
                vars.problems.push(format!(
                    "INPUT_GITHUB_REPOSITORY must be owner/name, got '{repo}'"
                ));
            }
        }
        let token = vars.required("INPUT_GITHUB_TOKEN");
        let pr_number = vars.positive::<u64>("INPUT_PR_NUMBER");
        let files = vars.required("INPUT_FILES").map(|raw| split_files(&raw));
        if matches!(&files, Some(list) if list.is_empty()) {
            vars.problems
                .push("INPUT_FILES does not name any file".to_string());
        }
        let api_key = vars.required("INPUT_OPENAI_API_KEY");
        let model = vars.required("INPUT_OPENAI_MODEL");
        let max_tokens = vars.positive::<u32>("INPUT_MODEL_MAX_TOKEN");

        let default_language = vars
            .optional("INPUT_DEFAULT_LANGUAGE")
            .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());
        let fail_on = FailOn {
            spelling: vars.flag("INPUT_FAIL_ON_SPELLING"),
            grammar: vars.flag("INPUT_FAIL_ON_GRAMMAR"),
            both: vars.flag("INPUT_FAIL_ON_BOTH"),
        };
        let log_level = vars
            .optional("INPUT_LOG_LEVEL")
            .and_then(|raw| raw.parse().ok())
            .unwrap_or_default();
        let api_url = vars
            .optional("INPUT_GITHUB_API_URL")
            .unwrap_or_else(|| DEFAULT_GITHUB_API_URL.to_string());
        let bot_login = vars
            .optional("INPUT_BOT_LOGIN")
            .unwrap_or_else(|| DEFAULT_BOT_LOGIN.to_string());
        let base_url = vars
            .optional("INPUT_OPENAI_BASE_URL")
            .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string());

        match (
            repository, token, pr_number, files, api_key, model, max_tokens,
        ) {
            (
                Some(repository),
                Some(token),
                Some(pr_number),
                Some(files),
                Some(api_key),
                Some(model),
                Some(max_tokens),
            ) if vars.problems.is_empty() => Ok(Self {
                github: GitHubConfig {
                    repository,
                    pr_number,
                    token,
                    api_url: api_url.trim_end_matches('/').to_string(),
                    bot_login,
                },
                llm: LlmConfig {
                    api_key,
                    model,
                    max_tokens,
                    base_url: base_url.trim_end_matches('/').to_string(),
                },
                files,
                default_language,
                fail_on,
                log_level,
            }),
            _ => Err(ProofreadError::Config(vars.problems.join("; "))),
        }
    }
}

struct Vars<F> {
    lookup: F,
    problems: Vec<String>,
}

impl<F> Vars<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn optional(&self, key: &str) -> Option<String> {
        (self.lookup)(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn required(&mut self, key: &str) -> Option<String> {
        let value = self.optional(key);
        if value.is_none() {
            self.problems.push(format!("{key} is not set"));
        }
        value
    }

    fn positive<T>(&mut self, key: &str) -> Option<T>
    where
        T: std::str::FromStr + PartialOrd + Default,
    {
        let raw = self.required(key)?;
        match raw.parse::<T>() {
            Ok(n) if n > T::default() => Some(n),
            _ => {
                self.problems
                    .push(format!("{key} must be a positive integer, got '{raw}'"));
                None
            }
        }
    }

    fn flag(&self, key: &str) -> bool {
        self.optional(key)
            .is_some_and(|v| v.eq_ignore_ascii_case("true"))
    }
}

fn split_files(raw: &str) -> Vec<PathBuf> {
    raw.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(PathBuf::from)
        .collect()
}

fn is_owner_and_name(repo: &str) -> bool {
    match repo.split_once('/') {
        Some((owner, name)) => !owner.is_empty() && !name.is_empty() && !name.contains('/'),
        None => false,
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("github", &self.github)
            .field("llm", &self.llm)
            .field("files", &self.files)
            .field("default_language", &self.default_language)
            .field("fail_on", &self.fail_on)
            .field("log_level", &self.log_level)
            .finish()
    }
}

impl fmt::Debug for GitHubConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitHubConfig")
            .field("repository", &self.repository)
            .field("pr_number", &self.pr_number)
            .field("token", &"<redacted>")
            .field("api_url", &self.api_url)
            .field("bot_login", &self.bot_login)
            .finish()
    }
}

impl fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmConfig")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    const REQUIRED: [&str; 7] = [
        "INPUT_GITHUB_REPOSITORY",
        "INPUT_GITHUB_TOKEN",
        "INPUT_PR_NUMBER",
        "INPUT_FILES",
        "INPUT_OPENAI_API_KEY",
        "INPUT_OPENAI_MODEL",
        "INPUT_MODEL_MAX_TOKEN",
    ];

    fn full_env() -> HashMap<String, String> {
        [
            ("INPUT_GITHUB_REPOSITORY", "octocat/docs"),
            ("INPUT_GITHUB_TOKEN", "ghs_token"),
            ("INPUT_PR_NUMBER", "42"),
            ("INPUT_FILES", "README.md,docs/intro.md"),
            ("INPUT_OPENAI_API_KEY", "sk-test"),
            ("INPUT_OPENAI_MODEL", "gpt-4o-mini"),
            ("INPUT_MODEL_MAX_TOKEN", "2048"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    fn load(env: &HashMap<String, String>) -> Result<Config, ProofreadError> {
        Config::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn full_environment_loads() {
        let config = load(&full_env()).unwrap();
        assert_eq!(config.github.repository, "octocat/docs");
        assert_eq!(config.github.pr_number, 42);
        assert_eq!(config.github.api_url, "https://api.github.com");
        assert_eq!(config.github.bot_login, "github-actions[bot]");
        assert_eq!(
            config.files,
            vec![PathBuf::from("README.md"), PathBuf::from("docs/intro.md")]
        );
        assert_eq!(config.llm.model, "gpt-4o-mini");
        assert_eq!(config.llm.max_tokens, 2048);
        assert_eq!(config.default_language, "English");
        assert_eq!(config.fail_on, FailOn::default());
        assert_eq!(config.log_level, LogLevel::Error);
    }

    #[test]
    fn each_missing_required_value_is_rejected() {
        for key in REQUIRED {
            let mut env = full_env();
            env.remove(key);
            let err = load(&env).unwrap_err();
            assert!(
                err.to_string().contains(key),
                "error for missing {key} was: {err}"
            );
        }
    }

    #[test]
    fn blank_value_counts_as_missing() {
        let mut env = full_env();
        env.insert("INPUT_GITHUB_TOKEN".into(), "   ".into());
        assert!(load(&env).is_err());
    }

    #[test]
    fn all_problems_reported_together() {
        let err = Config::from_lookup(|_| None).unwrap_err();
        let message = err.to_string();
        for key in REQUIRED {
            assert!(message.contains(key), "{key} missing from: {message}");
        }
    }

    #[test]
    fn invalid_numbers_are_rejected() {
        let mut env = full_env();
        env.insert("INPUT_PR_NUMBER".into(), "abc".into());
        assert!(load(&env).is_err());

        let mut env = full_env();
        env.insert("INPUT_MODEL_MAX_TOKEN".into(), "0".into());
        assert!(load(&env).is_err());
    }

    #[test]
    fn repository_must_be_owner_and_name() {
        for bad in ["docs", "/docs", "octocat/", "a/b/c"] {
            let mut env = full_env();
            env.insert("INPUT_GITHUB_REPOSITORY".into(), bad.into());
            assert!(load(&env).is_err(), "accepted {bad}");
        }
    }

    #[test]
    fn file_list_is_trimmed_and_empty_entries_dropped() {
        let mut env = full_env();
        env.insert("INPUT_FILES".into(), " a.md , ,b.md,".into());
        let config = load(&env).unwrap();
        assert_eq!(
            config.files,
            vec![PathBuf::from("a.md"), PathBuf::from("b.md")]
        );

        env.insert("INPUT_FILES".into(), " , ".into());
        assert!(load(&env).is_err());
    }

    #[test]
    fn flags_are_true_only_for_true() {
        let mut env = full_env();
        env.insert("INPUT_FAIL_ON_SPELLING".into(), "TRUE".into());
        env.insert("INPUT_FAIL_ON_GRAMMAR".into(), "yes".into());
        env.insert("INPUT_FAIL_ON_BOTH".into(), "true".into());
        let config = load(&env).unwrap();
        assert!(config.fail_on.spelling);
        assert!(!config.fail_on.grammar);
        assert!(config.fail_on.both);
    }

    #[test]
    fn optional_overrides_apply() {
        let mut env = full_env();
        env.insert("INPUT_DEFAULT_LANGUAGE".into(), "German".into());
        env.insert("INPUT_LOG_LEVEL".into(), "debug".into());
        env.insert("INPUT_GITHUB_API_URL".into(), "https://ghe.example.com/api/v3/".into());
        env.insert("INPUT_OPENAI_BASE_URL".into(), "http://localhost:11434".into());
        env.insert("INPUT_BOT_LOGIN".into(), "docs-bot[bot]".into());
        let config = load(&env).unwrap();
        assert_eq!(config.default_language, "German");
        assert_eq!(config.log_level, LogLevel::Debug);
        assert_eq!(config.github.api_url, "https://ghe.example.com/api/v3");
        assert_eq!(config.llm.base_url, "http://localhost:11434");
        assert_eq!(config.github.bot_login, "docs-bot[bot]");
    }

    #[test]
    fn unknown_log_level_falls_back_to_error() {
        let mut env = full_env();
        env.insert("INPUT_LOG_LEVEL".into(), "chatty".into());
        assert_eq!(load(&env).unwrap().log_level, LogLevel::Error);
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let config = load(&full_env()).unwrap();
        let debug = format!("{config:?}");
        assert!(!debug.contains("ghs_token"));
        assert!(!debug.contains("sk-test"));
        assert!(debug.contains("<redacted>"));
    }
}
