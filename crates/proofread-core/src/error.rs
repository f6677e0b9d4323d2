/// Errors that can occur while checking a pull request.
///
/// Library code returns this type directly. Only [`ProofreadError::Config`]
/// is fatal; every other variant is logged and the run moves on to the next
/// unit of work.
///
/// # Examples
///
/// ```
/// use proofread_core::ProofreadError;
///
/// let err = ProofreadError::Config("INPUT_FILES is not set".into());
/// assert!(err.to_string().contains("INPUT_FILES"));
/// ```
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum ProofreadError {
    /// Filesystem I/O failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid or missing configuration.
    #[error("configuration error: {0}")]
    #[diagnostic(
        code(proofread::config),
        help("set the listed INPUT_* variables in the workflow step's `with:` block")
    )]
    Config(String),

    /// Pull-request API failure.
    #[error("GitHub error: {0}")]
    GitHub(String),

    /// Completion API or response error.
    #[error("LLM error: {0}")]
    Llm(String),

    /// Model response could not be interpreted.
    #[error("parse error: {0}")]
    Parse(String),

    /// JSON serialization / deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
