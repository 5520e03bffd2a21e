// Shared prompt fragments. Each feature that talks to a provider keeps its
// own prompts.rs alongside it and reuses these pieces.

/// Appended to every prompt that expects a machine-readable answer.
pub const JSON_ONLY_INSTRUCTION: &str = "Output strictly valid JSON. \
    Do not add markdown formatting, explanations or apologies, just the raw JSON object.";

/// Keeps replies to recruiters and candidates in the product's language.
pub const RUSSIAN_ONLY_INSTRUCTION: &str = "Общайтесь только на русском языке.";

/// Truncates `text` to at most `max_chars` characters on a char boundary.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_chars_respects_multibyte() {
        assert_eq!(truncate_chars("Привет, мир", 6), "Привет");
        assert_eq!(truncate_chars("short", 100), "short");
        assert_eq!(truncate_chars("", 3), "");
    }
}
