//! Secret redaction for user input
//!
//! Every piece of text headed for a renderer or an exporter passes through
//! [`sanitize`] first. Token-shaped secrets (long alphanumeric runs mixing
//! letters and digits) are replaced with [`REDACTION_MARKER`].

use regex::{Captures, Regex};
use std::borrow::Cow;
use std::sync::LazyLock;

/// Minimum length of an alphanumeric run treated as a token
pub const MIN_TOKEN_LEN: usize = 24;

/// Replacement for every redacted span
///
/// Contains no digits and is shorter than [`MIN_TOKEN_LEN`], so it can never
/// match itself.
pub const REDACTION_MARKER: &str = "[REDACTED]";

// Leftmost-greedy matching always starts at the first character of a run,
// so every match is a maximal run.
static TOKEN_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z0-9]{24,}").expect("invalid token regex"));

/// Redact token-shaped secrets from `text`
///
/// Text outside matched spans is left untouched, and the function is
/// idempotent.
pub fn sanitize(text: &str) -> String {
    sanitize_cow(text).into_owned()
}

/// Like [`sanitize`] but borrows when nothing was redacted
pub fn sanitize_cow(text: &str) -> Cow<'_, str> {
    TOKEN_RUN.replace_all(text, |caps: &Captures<'_>| {
        let run = &caps[0];
        if is_token(run) {
            REDACTION_MARKER.to_string()
        } else {
            run.to_string()
        }
    })
}

/// Number of spans [`sanitize`] would redact
pub fn count_tokens(text: &str) -> usize {
    TOKEN_RUN
        .find_iter(text)
        .filter(|m| is_token(m.as_str()))
        .count()
}

fn is_token(run: &str) -> bool {
    run.len() >= MIN_TOKEN_LEN
        && run.bytes().any(|b| b.is_ascii_alphabetic())
        && run.bytes().any(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOKEN: &str = "sk4f9Qz81LmN0pX7rT2vW5yB";

    #[test]
    fn test_redacts_mixed_token() {
        let input = format!("key = {TOKEN};");
        assert_eq!(sanitize(&input), "key = [REDACTED];");
    }

    #[test]
    fn test_short_run_is_kept() {
        let input = "abc123def456ghi789jkl01"; // 23 chars
        assert_eq!(sanitize(input), input);
    }

    #[test]
    fn test_letters_only_run_is_kept() {
        let input = "abcdefghijklmnopqrstuvwxyzabcdef";
        assert_eq!(sanitize(input), input);
    }

    #[test]
    fn test_digits_only_run_is_kept() {
        let input = "1234567890123456789012345678";
        assert_eq!(sanitize(input), input);
    }

    #[test]
    fn test_whole_run_is_replaced() {
        let long = format!("{TOKEN}{TOKEN}");
        assert_eq!(sanitize(&long), REDACTION_MARKER);
    }

    #[test]
    fn test_surrounding_text_untouched() {
        let input = format!("# Title\n\nuse `{TOKEN}` here\n| a | {TOKEN} |\n");
        let output = sanitize(&input);
        assert_eq!(output, "# Title\n\nuse `[REDACTED]` here\n| a | [REDACTED] |\n");
    }

    #[test]
    fn test_identity_without_tokens() {
        let input = "Plain markdown with **bold** and a table |a|b|\n\nDone.";
        assert_eq!(sanitize(input), input);
        assert!(matches!(sanitize_cow(input), Cow::Borrowed(_)));
    }

    #[test]
    fn test_idempotent() {
        let inputs = [
            format!("{TOKEN} and {TOKEN}"),
            format!("x{TOKEN}-{TOKEN}y"),
            "nothing here".to_string(),
            REDACTION_MARKER.repeat(5),
            String::new(),
        ];
        for input in &inputs {
            let once = sanitize(input);
            assert_eq!(sanitize(&once), once, "input: {input}");
        }
    }

    #[test]
    fn test_count_tokens() {
        let input = format!("{TOKEN} short {TOKEN}");
        assert_eq!(count_tokens(&input), 2);
        assert_eq!(count_tokens("nothing"), 0);
    }
}
