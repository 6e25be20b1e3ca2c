//! Prompt composition: persona framing plus whole-document grounding.

/// Character cap applied to the user's message inside the prompt.
pub const MAX_USER_CHARS: usize = 2000;
pub const USER_TRUNCATION_MARKER: &str = " ...[truncated]";

/// Compose the instruction block sent to the model.
///
/// Grounding here is whole-document inclusion: the entire brand context is
/// embedded verbatim and the model is told not to invent facts beyond it.
pub fn compose(user_text: &str, brand_name: &str, brand_tone: &str, context: &str) -> String {
    let trimmed = user_text.trim();
    let user_msg = match trimmed.char_indices().nth(MAX_USER_CHARS) {
        Some((byte_idx, _)) => format!("{}{}", &trimmed[..byte_idx], USER_TRUNCATION_MARKER),
        None => trimmed.to_string(),
    };

    format!(
        r#"You are a customer success assistant for {brand_name}.
Tone: {brand_tone}.

Brand context (do not invent facts; use only what's below; if info is missing, ask a clarifying question):
{context}

User message:
"""{user_msg}"""

Instructions:
1) Answer concisely and accurately using ONLY the Brand context above when available.
2) If the exact answer is not in the Brand context, say you don't know and ask for clarifying info (e.g., tx hash, network).
3) Do NOT request private keys or sensitive data.
4) End with a suggested next step (e.g., "Please share your tx hash" or "Escalate to ops").

Format: Plain text reply, one paragraph. Keep it under 150 words.
"#
    )
}
