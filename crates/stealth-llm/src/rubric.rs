//! The scoring rubric sent to models, and validation of what comes back.

use stealth_types::ScoreVector;

use crate::error::{ProviderError, Result};

const RUBRIC: &str = "\
- clarity: How clear, well-structured, and easy to understand is the pitch?
- originality: How innovative, unique, and differentiated is the solution?
- team_strength: How capable and experienced does the team appear?
- market_fit: How well does the solution address a real market need?";

const FORMAT: &str = "\
Return ONLY valid JSON in this exact format with decimal scores:
{\"clarity\": 8.5, \"originality\": 7.2, \"team_strength\": 9.1, \"market_fit\": 8.8}

No additional text, explanations, or formatting.";

/// System message for chat-style providers. The pitch goes in a separate
/// user message.
pub fn system_prompt() -> String {
    format!(
        "You are an expert startup pitch evaluator. Analyze the pitch and return ONLY a valid \
         JSON object with scores from 0-10 for these exact categories:\n\n{RUBRIC}\n\n{FORMAT}"
    )
}

/// One self-contained prompt for single-field providers, with the pitch
/// embedded between the rubric and the format instructions.
pub fn single_prompt(text: &str) -> String {
    format!(
        "You are an expert startup pitch evaluator. Analyze the following pitch and return ONLY \
         a valid JSON object with scores from 0-10 for these exact categories:\n\n{RUBRIC}\n\n\
         Pitch to analyze:\n{text}\n\n{FORMAT}"
    )
}

/// Strip a surrounding markdown code fence (```` ```json ```` or ```` ``` ````).
pub fn strip_markdown_fences(input: &str) -> &str {
    let trimmed = input.trim();

    let after_open = if let Some(stripped) = trimmed.strip_prefix("```json") {
        stripped
    } else if let Some(stripped) = trimmed.strip_prefix("```") {
        stripped
    } else {
        return trimmed;
    };

    match after_open.trim_end().strip_suffix("```") {
        Some(inner) => inner.trim(),
        None => after_open.trim(),
    }
}

/// Validate a model's text answer as a score vector.
///
/// Fails on empty text, non-JSON, a missing or non-numeric or out-of-range
/// key, and on a vector whose four scores are all exactly zero.
pub fn parse_scores(content: &str) -> Result<ScoreVector> {
    let body = strip_markdown_fences(content);
    if body.is_empty() {
        return Err(ProviderError::EmptyResponse);
    }
    let value: serde_json::Value = serde_json::from_str(body)?;
    let scores = ScoreVector::from_value(&value)?;
    if scores.is_all_zero() {
        return Err(ProviderError::AllZeroScores);
    }
    Ok(scores)
}
