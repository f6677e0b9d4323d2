use proofread_core::{Category, Issue, ProofreadError};
use serde::Deserialize;
use serde_json::Value;

const SYSTEM_PROMPT: &str = "You are a helpful assistant checking spelling and grammar.";

/// Message the model returns when every line is correct.
pub const ALL_CLEAR_MESSAGE: &str = "everything looks good to me 🎉";

/// Build the system prompt establishing the proofreading persona.
pub fn build_system_prompt() -> String {
    SYSTEM_PROMPT.to_string()
}

/// Build the user prompt: issue schema, language hint, and the annotated lines.
///
/// The annotated lines are appended verbatim, one per line, after the
/// instructions.
pub fn build_check_prompt<S: AsRef<str>>(annotated: &[S], default_language: &str) -> String {
    let mut prompt = format!(
        "You are a helpful assistant that checks and corrects only spelling and grammar issues \
in markdown files, without altering any other content such as indentation, line numbers, or formatting.
Unless a line is clearly written in another language, assume the text is written in {default_language}.
For each line provided, identify the specific word with the issue and provide its correction.
Return a JSON array of objects with the following fields only if the category is not 'none':
- original_text: contains only the specific word in the line that has a spelling or grammar issue
- suggested_text: contains the corrected word
- line_number: the exact line number of the original md file, as shown before the colon
- category: either 'spelling issue', 'grammar issue', or 'both'

Only include entries where the category is 'spelling issue', 'grammar issue', or 'both'.
If all lines are correct, return a single object in a list with the message: '{ALL_CLEAR_MESSAGE}'.

Here are the lines:
"
    );
    for line in annotated {
        prompt.push_str(line.as_ref());
        prompt.push('\n');
    }
    prompt
}

#[derive(Deserialize)]
struct RawIssue {
    original_text: Option<String>,
    suggested_text: Option<String>,
    line_number: Option<Value>,
    category: Option<String>,
}

/// Parse the model response into validated [`Issue`] entries.
///
/// Handles markdown code fences around JSON. The all-clear sentinel (an
/// object carrying `message`) contributes nothing. Returns an empty vec and
/// logs when the response is not a JSON array.
pub fn parse_issues(response: &str) -> Vec<Issue> {
    match decode_issues(response) {
        Ok(issues) => issues,
        Err(e) => {
            tracing::error!("failed to parse model response: {e}");
            Vec::new()
        }
    }
}

fn decode_issues(response: &str) -> Result<Vec<Issue>, ProofreadError> {
    let cleaned = strip_code_fences(response);
    let parsed: Value = serde_json::from_str(cleaned)?;
    let Value::Array(entries) = parsed else {
        return Err(ProofreadError::Parse(format!(
            "expected a JSON array, got: {cleaned}"
        )));
    };

    let mut issues = Vec::new();
    for entry in entries {
        if !entry.is_object() {
            tracing::warn!(%entry, "skipping non-object entry");
            continue;
        }
        if entry.get("message").is_some() {
            tracing::debug!(%entry, "model reported no issues");
            continue;
        }

        let raw: RawIssue = match serde_json::from_value(entry.clone()) {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(%entry, "skipping malformed entry: {e}");
                continue;
            }
        };

        let Some(line_number) = raw.line_number.as_ref().and_then(line_number_of) else {
            tracing::warn!(%entry, "skipping entry without a usable line_number");
            continue;
        };

        let category = raw
            .category
            .as_deref()
            .map(Category::from_label)
            .unwrap_or(Category::Unknown);
        if category == Category::Unknown {
            tracing::warn!(%entry, "skipping entry with unknown category");
            continue;
        }

        issues.push(Issue {
            original_text: raw.original_text.unwrap_or_default(),
            suggested_text: raw.suggested_text.unwrap_or_default(),
            line_number,
            category,
        });
    }

    Ok(issues)
}

fn line_number_of(value: &Value) -> Option<u32> {
    let n = match value {
        Value::Number(n) => n.as_u64()?,
        Value::String(s) => s.trim().parse().ok()?,
        _ => return None,
    };
    if n == 0 {
        return None;
    }
    u32::try_from(n).ok()
}

/// Strip a surrounding markdown code fence, with or without a `json` tag.
pub fn strip_code_fences(s: &str) -> &str {
    let trimmed = s.trim();
    if let Some(rest) = trimmed.strip_prefix("```json") {
        if let Some(inner) = rest.strip_suffix("```") {
            return inner.trim();
        }
    }
    if let Some(rest) = trimmed.strip_prefix("```") {
        if let Some(inner) = rest.strip_suffix("```") {
            return inner.trim();
        }
    }
    trimmed
}
