//! Utilities module for UtiliCraft Markdown
//!
//! Shared helper functions including:
//! - HTML escaping
//! - Path utilities
//! - Text utilities

use std::path::Path;

/// HTML utilities
pub mod html {
    /// Escape text for safe insertion into HTML content or attributes
    pub fn escape(text: &str) -> String {
        let mut escaped = String::with_capacity(text.len());
        for c in text.chars() {
            match c {
                '&' => escaped.push_str("&amp;"),
                '<' => escaped.push_str("&lt;"),
                '>' => escaped.push_str("&gt;"),
                '"' => escaped.push_str("&quot;"),
                '\'' => escaped.push_str("&#39;"),
                _ => escaped.push(c),
            }
        }
        escaped
    }
}

/// Path utilities
pub mod path {
    use super::*;

    /// Get the file name without extension
    pub fn file_stem(path: &Path) -> Option<String> {
        path.file_stem()
            .and_then(|s| s.to_str())
            .map(|s| s.to_string())
    }

    /// Check if path has a markdown extension
    pub fn is_markdown(path: &Path) -> bool {
        matches!(
            path.extension().and_then(|s| s.to_str()),
            Some("md" | "markdown" | "mdown" | "mkd")
        )
    }

    /// Turn arbitrary text into a safe file stem
    pub fn sanitize_file_stem(text: &str) -> String {
        let stem: String = text
            .trim()
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '-' })
            .collect();
        let stem = stem.trim_matches('-');
        if stem.is_empty() {
            "document".to_string()
        } else {
            stem.to_string()
        }
    }
}

/// Text utilities
pub mod text {
    /// Count words in text
    pub fn word_count(text: &str) -> usize {
        text.split_whitespace().count()
    }

    /// Count characters (Unicode scalar values) in text
    pub fn char_count(text: &str) -> usize {
        text.chars().count()
    }

    /// Count lines in text
    pub fn line_count(text: &str) -> usize {
        if text.is_empty() {
            0
        } else {
            text.lines().count()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            html::escape(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
        assert_eq!(html::escape("plain"), "plain");
    }

    #[test]
    fn test_is_markdown() {
        assert!(path::is_markdown(Path::new("test.md")));
        assert!(path::is_markdown(Path::new("test.markdown")));
        assert!(!path::is_markdown(Path::new("test.txt")));
    }

    #[test]
    fn test_sanitize_file_stem() {
        assert_eq!(path::sanitize_file_stem("My Notes: v2"), "My-Notes--v2");
        assert_eq!(path::sanitize_file_stem("///"), "document");
    }

    #[test]
    fn test_word_count() {
        assert_eq!(text::word_count("hello world"), 2);
        assert_eq!(text::word_count("  "), 0);
        assert_eq!(text::word_count("one"), 1);
    }

    #[test]
    fn test_char_count_is_unicode_aware() {
        assert_eq!(text::char_count("héllo"), 5);
        assert_eq!(text::line_count(""), 0);
        assert_eq!(text::line_count("a\nb"), 2);
    }
}
