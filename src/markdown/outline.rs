//! Document outline and statistics
//!
//! Lightweight scans over raw markdown used for the status line and the
//! optional table of contents in HTML exports.

use crate::utils::{html::escape, text};
use serde::Serialize;

/// A heading found in the document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Heading {
    pub level: u8,
    pub text: String,
}

/// Counters shown next to the editor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct DocumentStats {
    pub words: usize,
    pub characters: usize,
    pub lines: usize,
    pub headings: usize,
    pub has_tables: bool,
}

impl DocumentStats {
    /// Compute statistics for markdown text
    pub fn from_text(markdown: &str) -> Self {
        Self {
            words: text::word_count(markdown),
            characters: text::char_count(markdown),
            lines: text::line_count(markdown),
            headings: extract_headings(markdown).len(),
            has_tables: has_tables(markdown),
        }
    }
}

/// Extract ATX headings, skipping fenced code blocks
pub fn extract_headings(markdown: &str) -> Vec<Heading> {
    let mut headings = Vec::new();
    let mut in_fence = false;

    for line in markdown.lines() {
        if line.trim_start().starts_with("```") {
            in_fence = !in_fence;
            continue;
        }
        if in_fence || !line.starts_with('#') {
            continue;
        }

        let level = line.chars().take_while(|c| *c == '#').count();
        if level > 6 {
            continue;
        }
        let rest = &line[level..];
        if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
            continue;
        }
        let title = rest.trim();
        if title.is_empty() {
            continue;
        }

        headings.push(Heading {
            level: level as u8,
            text: title.to_string(),
        });
    }

    headings
}

/// Headings as a JSON array of `{"level": n, "text": "..."}`
pub fn headings_json(markdown: &str) -> Result<String, serde_json::Error> {
    serde_json::to_string(&extract_headings(markdown))
}

/// Whether any line looks like a pipe table row
pub fn has_tables(markdown: &str) -> bool {
    markdown.lines().any(|line| {
        let trimmed = line.trim();
        trimmed.len() >= 2 && trimmed.starts_with('|') && trimmed.ends_with('|')
    })
}

/// Build a table of contents as an HTML list
pub fn table_of_contents(markdown: &str) -> String {
    let mut toc = String::from("<ul class=\"toc\">\n");

    for heading in extract_headings(markdown) {
        let indent = "  ".repeat(heading.level as usize);
        toc.push_str(&format!(
            "{}<li class=\"toc-h{}\">{}</li>\n",
            indent,
            heading.level,
            escape(&heading.text)
        ));
    }

    toc.push_str("</ul>");
    toc
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_headings() {
        let headings = extract_headings("# One\ntext\n## Two\n#tag\n####### seven");
        assert_eq!(
            headings,
            vec![
                Heading { level: 1, text: "One".to_string() },
                Heading { level: 2, text: "Two".to_string() },
            ]
        );
    }

    #[test]
    fn test_headings_inside_fence_are_skipped() {
        let headings = extract_headings("```\n# comment\n```\n# Real");
        assert_eq!(headings.len(), 1);
        assert_eq!(headings[0].text, "Real");
    }

    #[test]
    fn test_headings_json() {
        let json = headings_json("### Three \"quoted\"").unwrap();
        assert_eq!(json, r#"[{"level":3,"text":"Three \"quoted\""}]"#);
    }

    #[test]
    fn test_has_tables() {
        assert!(has_tables("text\n  | a | b |  \n"));
        assert!(!has_tables("a | b\n|"));
    }

    #[test]
    fn test_table_of_contents() {
        let toc = table_of_contents("# A & B\n## Sub");
        assert_eq!(
            toc,
            "<ul class=\"toc\">\n  <li class=\"toc-h1\">A &amp; B</li>\n    <li class=\"toc-h2\">Sub</li>\n</ul>"
        );
    }

    #[test]
    fn test_document_stats() {
        let stats = DocumentStats::from_text("# Title\n\nsome words here\n|a|b|");
        assert_eq!(stats.words, 6);
        assert_eq!(stats.lines, 4);
        assert_eq!(stats.headings, 1);
        assert!(stats.has_tables);
    }
}
