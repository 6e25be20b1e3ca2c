//! Pattern-based scrubbing of obvious identifiers.
//!
//! Runs before any text leaves the process; both the persisted record and
//! the prompt sent to the model only ever see redacted content.

use once_cell::sync::Lazy;
use regex::Regex;

pub const EMAIL_PLACEHOLDER: &str = "[REDACTED_EMAIL]";
pub const NUMBER_PLACEHOLDER: &str = "[REDACTED_NUMBER]";

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[\w.-]+@[\w.-]+\.\w{2,}\b").expect("email pattern"));
static LONG_NUMBER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\d{6,}\b").expect("number pattern"));

/// Replace email-shaped substrings and runs of 6+ digits with fixed
/// placeholder tokens. Idempotent; the empty string is returned unchanged.
pub fn redact(text: &str) -> String {
    let text = EMAIL_RE.replace_all(text, EMAIL_PLACEHOLDER);
    LONG_NUMBER_RE.replace_all(&text, NUMBER_PLACEHOLDER).into_owned()
}
