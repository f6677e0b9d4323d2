use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

/// Kind of problem the model reported for a piece of text.
///
/// Parsing is lenient about case and accepts both the long form the prompt
/// asks for (`"spelling issue"`) and the bare word (`"spelling"`). Anything
/// else becomes [`Category::Unknown`], which never causes a failure and is
/// dropped before a comment is posted.
///
/// # Examples
///
/// ```
/// use proofread_core::Category;
///
/// assert_eq!(Category::from_label("Spelling Issue"), Category::Spelling);
/// assert_eq!(Category::from_label("both"), Category::Both);
/// assert_eq!(Category::from_label("style"), Category::Unknown);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// A misspelled word.
    Spelling,
    /// A grammatical error.
    Grammar,
    /// A word that is both misspelled and grammatically wrong.
    Both,
    /// A category the model invented or omitted.
    Unknown,
}

impl Category {
    /// Classify a raw category string from the model response.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "spelling issue" | "spelling" => Category::Spelling,
            "grammar issue" | "grammar" => Category::Grammar,
            "both" => Category::Both,
            _ => Category::Unknown,
        }
    }

    /// Wire form used in the prompt schema and the results log.
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Spelling => "spelling issue",
            Category::Grammar => "grammar issue",
            Category::Both => "both",
            Category::Unknown => "unknown",
        }
    }

    /// Heading shown at the top of a review comment.
    ///
    /// # Examples
    ///
    /// ```
    /// use proofread_core::Category;
    ///
    /// assert_eq!(Category::Spelling.heading(), "Spelling issue");
    /// assert_eq!(Category::Both.heading(), "Both");
    /// ```
    pub fn heading(self) -> &'static str {
        match self {
            Category::Spelling => "Spelling issue",
            Category::Grammar => "Grammar issue",
            Category::Both => "Both",
            Category::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Category {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// A single spelling or grammar finding, anchored to a line of the original file.
///
/// # Examples
///
/// ```
/// use proofread_core::{Category, Issue};
///
/// let issue = Issue {
///     original_text: "teh".into(),
///     suggested_text: "the".into(),
///     line_number: 1,
///     category: Category::Spelling,
/// };
/// assert!(issue.comment_body().contains("`the`"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    /// The exact erroneous word or phrase.
    pub original_text: String,
    /// The replacement the model proposes.
    pub suggested_text: String,
    /// 1-based line number in the original file.
    pub line_number: u32,
    /// What kind of problem this is.
    pub category: Category,
}

impl Issue {
    /// Markdown body of the review comment for this issue.
    pub fn comment_body(&self) -> String {
        format!(
            "**{}**: `{}`\n**Suggestion**: `{}`",
            self.category.heading(),
            self.original_text,
            self.suggested_text
        )
    }
}

/// Which issue categories make the run fail.
///
/// # Examples
///
/// ```
/// use proofread_core::{Category, FailOn};
///
/// let fail_on = FailOn { spelling: true, grammar: false, both: false };
/// assert!(fail_on.matches(Category::Spelling));
/// assert!(!fail_on.matches(Category::Grammar));
/// assert!(fail_on.matches(Category::Both));
/// assert!(!fail_on.matches(Category::Unknown));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FailOn {
    /// Fail on spelling issues.
    pub spelling: bool,
    /// Fail on grammar issues.
    pub grammar: bool,
    /// Fail on issues categorised as both.
    pub both: bool,
}

impl FailOn {
    /// Returns `true` if an issue of `category` should fail the run.
    ///
    /// A `both` issue is a spelling issue and a grammar issue at once, so it
    /// also trips either single-category flag.
    pub fn matches(self, category: Category) -> bool {
        match category {
            Category::Spelling => self.spelling,
            Category::Grammar => self.grammar,
            Category::Both => self.both || self.spelling || self.grammar,
            Category::Unknown => false,
        }
    }
}

/// Log verbosity accepted in `INPUT_LOG_LEVEL`.
///
/// # Examples
///
/// ```
/// use proofread_core::LogLevel;
///
/// let level: LogLevel = "warning".parse().unwrap();
/// assert_eq!(level, LogLevel::Warning);
/// assert_eq!(LogLevel::default(), LogLevel::Error);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    #[default]
    Error,
    Critical,
}

impl LogLevel {
    /// Directive understood by `tracing_subscriber::EnvFilter`.
    ///
    /// `tracing` has no level above `error`, so `Critical` shares it.
    pub fn directive(self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warning => "warn",
            LogLevel::Error | LogLevel::Critical => "error",
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "DEBUG" => Ok(LogLevel::Debug),
            "INFO" => Ok(LogLevel::Info),
            "WARNING" | "WARN" => Ok(LogLevel::Warning),
            "ERROR" => Ok(LogLevel::Error),
            "CRITICAL" => Ok(LogLevel::Critical),
            other => Err(format!("unknown log level: {other}")),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warning => write!(f, "WARNING"),
            LogLevel::Error => write!(f, "ERROR"),
            LogLevel::Critical => write!(f, "CRITICAL"),
        }
    }
}
