use std::fmt;

use serde_json::Value;
use thiserror::Error;

/// Recoverable problems with the shape of a generative API response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ResponseIssue {
    #[error("Error: Null response data")]
    NullResponse,
    #[error("Error: No candidates found in response")]
    NoCandidates,
    #[error("Error: Candidates are empty")]
    EmptyCandidates,
    #[error("Error: Missing content or parts in candidate")]
    MissingContent,
}

/// Outcome of unwrapping one response body.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedResponse {
    /// The body as a whole was unusable.
    Rejected(ResponseIssue),
    /// One entry per candidate, in response order.
    Candidates(Vec<Result<String, ResponseIssue>>),
}

impl ParsedResponse {
    /// The plain newline-joined text, with diagnostics inlined where a candidate
    /// was malformed.
    pub fn legacy_text(&self) -> String {
        match self {
            ParsedResponse::Rejected(issue) => issue.to_string(),
            ParsedResponse::Candidates(candidates) => candidates
                .iter()
                .map(|candidate| match candidate {
                    Ok(text) => text.clone(),
                    Err(issue) => issue.to_string(),
                })
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }

    /// A recipe when at least one candidate produced text, a diagnostic otherwise.
    pub fn into_result(self) -> RecipeResult {
        let text = self.legacy_text();
        match self {
            ParsedResponse::Candidates(candidates) if candidates.iter().any(Result::is_ok) => {
                RecipeResult::Recipe(text)
            }
            _ => RecipeResult::Diagnostic(text),
        }
    }
}

/// A generated recipe, or a diagnostic standing in for one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecipeResult {
    Recipe(String),
    Diagnostic(String),
}

impl RecipeResult {
    pub fn text(&self) -> &str {
        match self {
            RecipeResult::Recipe(text) | RecipeResult::Diagnostic(text) => text,
        }
    }

    pub fn is_recipe(&self) -> bool {
        matches!(self, RecipeResult::Recipe(_))
    }
}

impl fmt::Display for RecipeResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

fn part_text(part: &Value) -> Option<String> {
    match part.get("text") {
        None | Some(Value::Null) => None,
        Some(Value::String(text)) => Some(text.clone()),
        Some(other) => Some(other.to_string()),
    }
}

fn parse_candidate(candidate: &Value) -> Result<String, ResponseIssue> {
    // `get` on a null content yields None as well
    let parts = candidate
        .get("content")
        .and_then(|content| content.get("parts"))
        .and_then(Value::as_array)
        .ok_or(ResponseIssue::MissingContent)?;

    Ok(parts.iter().filter_map(part_text).collect::<Vec<_>>().join("\n"))
}

/// Unwraps `candidates[].content.parts[].text`. Never fails: every absent field maps
/// to a [`ResponseIssue`], and a bad candidate among good ones only affects its own line.
pub fn parse_response(raw: &Value) -> ParsedResponse {
    if raw.is_null() {
        return ParsedResponse::Rejected(ResponseIssue::NullResponse);
    }
    let Some(candidates) = raw.get("candidates").and_then(Value::as_array) else {
        return ParsedResponse::Rejected(ResponseIssue::NoCandidates);
    };
    if candidates.is_empty() {
        return ParsedResponse::Rejected(ResponseIssue::EmptyCandidates);
    }

    ParsedResponse::Candidates(candidates.iter().map(parse_candidate).collect())
}
