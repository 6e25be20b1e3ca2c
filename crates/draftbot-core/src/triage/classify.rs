//! Heuristic gate deciding whether a message warrants a drafted reply.

/// Keywords that mark a message as a likely support question.
const QUESTION_KEYWORDS: [&str; 12] = [
    "how", "what", "why", "when", "where", "issue", "bug", "error", "help", "support", "price",
    "fees",
];

/// Casual/closing tokens that mark a message as chatter.
const CASUAL_TOKENS: [&str; 4] = ["lol", "haha", "thanks", "gg"];

/// Quick heuristic classifier for support questions.
///
/// Precedence: too-short rejects, then question mark accepts, then keyword
/// accepts, then casual-token rejects. Ambiguous text is **accepted** by
/// default: this gate exists to cheaply skip obvious chatter before the
/// expensive generation step, and a false positive only costs one draft.
pub fn is_candidate(text: &str) -> bool {
    let text = text.trim().to_lowercase();
    if text.chars().count() < 5 {
        return false;
    }
    if text.contains('?') {
        return true;
    }
    if QUESTION_KEYWORDS.iter().any(|kw| text.contains(kw)) {
        return true;
    }
    if CASUAL_TOKENS.iter().any(|tok| text.contains(tok)) {
        return false;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_empty_and_short() {
        assert!(!is_candidate(""));
        assert!(!is_candidate("hi"));
        assert!(!is_candidate("   ok  "));
    }

    #[test]
    fn test_accepts_question_mark() {
        assert!(is_candidate("What are the fees?"));
        assert!(is_candidate("anyone?"));
    }

    #[test]
    fn test_accepts_keywords_case_insensitive() {
        assert!(is_candidate("HELP with my deposit"));
        assert!(is_candidate("getting an Error on swap"));
        assert!(is_candidate("the price seems off"));
    }

    #[test]
    fn test_rejects_casual_closings() {
        assert!(!is_candidate("thanks lol"));
        assert!(!is_candidate("haha nice one"));
        assert!(!is_candidate("gg everyone"));
    }

    #[test]
    fn test_keyword_wins_over_casual_token() {
        // Keyword check runs before the casual-token rejection.
        assert!(is_candidate("thanks, but my withdrawal shows an error"));
    }

    #[test]
    fn test_ambiguous_text_defaults_to_accept() {
        assert!(is_candidate("my deposit never arrived"));
        assert!(is_candidate("cannot connect wallet"));
    }
}
