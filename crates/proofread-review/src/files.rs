use std::path::Path;

use proofread_core::ProofreadError;

/// Read a file as an ordered list of lines.
///
/// Returns `None` and logs the cause when the file cannot be read, including
/// when it is not valid UTF-8. Callers treat `None` as "skip this file".
pub fn read_lines(path: &Path) -> Option<Vec<String>> {
    match try_read_lines(path) {
        Ok(lines) => Some(lines),
        Err(e) => {
            tracing::error!(path = %path.display(), "error reading file: {e}");
            None
        }
    }
}

fn try_read_lines(path: &Path) -> Result<Vec<String>, ProofreadError> {
    let content = std::fs::read_to_string(path)?;
    Ok(content.lines().map(str::to_string).collect())
}

/// Prefix every line with its 1-based line number.
///
/// Trailing whitespace is trimmed; the number before `": "` is what the model
/// echoes back as `line_number`.
pub fn annotate_lines<S: AsRef<str>>(lines: &[S]) -> Vec<String> {
    lines
        .iter()
        .enumerate()
        .map(|(idx, line)| format!("{}: {}", idx + 1, line.as_ref().trim_end()))
        .collect()
}
