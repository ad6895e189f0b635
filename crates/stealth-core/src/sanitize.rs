//! Input sanitation for recovered plaintext.
//!
//! Strips markup-significant characters, caps length, and trims. The output
//! is what gets embedded in model prompts.

use zeroize::Zeroizing;

/// Longest submission, in characters, sent to a model.
pub const MAX_SUBMISSION_CHARS: usize = 10_000;

/// Characters removed from submissions.
pub const FORBIDDEN_CHARS: [char; 5] = ['<', '>', '&', '"', '\''];

/// Remove [`FORBIDDEN_CHARS`], truncate to [`MAX_SUBMISSION_CHARS`], trim.
///
/// Idempotent: `sanitize(&sanitize(x)) == sanitize(x)`.
pub fn sanitize(text: &str) -> Zeroizing<String> {
    let filtered: Zeroizing<String> = Zeroizing::new(
        text.chars()
            .filter(|c| !FORBIDDEN_CHARS.contains(c))
            .take(MAX_SUBMISSION_CHARS)
            .collect(),
    );
    Zeroizing::new(filtered.trim().to_owned())
}
