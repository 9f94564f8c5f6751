//! Minimal regex-driven markdown renderer
//!
//! Used only when the primary parser is unavailable. It understands a small
//! subset, each construct handled independently line by line:
//! - ATX headings (`#` to `######` followed by whitespace)
//! - Pipe tables, with a dash/colon separator row marking the header
//! - Fenced code blocks with an optional language tag
//! - Blank lines as visible line breaks
//!
//! Every literal fragment is HTML-escaped; user text never becomes markup.

use crate::error::FallbackError;
use crate::utils::html::escape;
use regex::Regex;

/// Compiled line patterns of the fallback renderer
#[derive(Debug, Clone)]
pub struct FallbackRenderer {
    heading: Regex,
    table_row: Regex,
    separator: Regex,
    fence: Regex,
}

/// A pipe table being accumulated; only the first row can be a header
#[derive(Debug, Default)]
struct TableBlock {
    header: bool,
    rows: Vec<Vec<String>>,
}

/// An open fenced code block
#[derive(Debug)]
struct CodeBlock {
    language: Option<String>,
    lines: Vec<String>,
}

impl FallbackRenderer {
    /// Compile the line patterns
    pub fn new() -> Result<Self, FallbackError> {
        Ok(Self {
            heading: Regex::new(r"^(#{1,6})\s+(.*?)\s*$")?,
            table_row: Regex::new(r"^\s*\|(.*)\|\s*$")?,
            separator: Regex::new(r"^[\s|:]*-[\s|:-]*$")?,
            fence: Regex::new(r"^\s*```\s*([\w+#.-]*)\s*$")?,
        })
    }

    /// Convert markdown text to an HTML fragment
    pub fn render(&self, text: &str) -> String {
        let mut out: Vec<String> = Vec::new();
        let mut table: Option<TableBlock> = None;
        let mut code: Option<CodeBlock> = None;

        for line in text.lines() {
            if let Some(block) = code.as_mut() {
                if self.fence.is_match(line) {
                    if let Some(block) = code.take() {
                        out.push(render_code(&block));
                    }
                } else {
                    block.lines.push(line.to_string());
                }
                continue;
            }

            if let Some(caps) = self.table_row.captures(line) {
                let block = table.get_or_insert_with(TableBlock::default);
                if self.separator.is_match(line) {
                    // Always dropped; promotes the row above only when it opened the table.
                    if block.rows.len() == 1 {
                        block.header = true;
                    }
                } else {
                    block.rows.push(split_cells(&caps[1]));
                }
                continue;
            }

            if let Some(block) = table.take() {
                out.extend(render_table(&block));
            }

            if let Some(caps) = self.fence.captures(line) {
                let language = Some(caps[1].to_string()).filter(|l| !l.is_empty());
                code = Some(CodeBlock {
                    language,
                    lines: Vec::new(),
                });
            } else if let Some(caps) = self.heading.captures(line) {
                let level = caps[1].len();
                out.push(format!("<h{level}>{}</h{level}>", escape(&caps[2])));
            } else if line.trim().is_empty() {
                out.push("<br>".to_string());
            } else {
                out.push(escape(line));
            }
        }

        if let Some(block) = table.take() {
            out.extend(render_table(&block));
        }
        // An unterminated fence runs to the end of the document.
        if let Some(block) = code.take() {
            out.push(render_code(&block));
        }

        out.join("\n")
    }
}

fn split_cells(inner: &str) -> Vec<String> {
    inner.split('|').map(|cell| escape(cell.trim())).collect()
}

fn render_table(block: &TableBlock) -> Option<String> {
    if block.rows.is_empty() {
        return None;
    }

    let row_html = |row: &[String], tag: &str| {
        let cells: String = row
            .iter()
            .map(|cell| format!("<{tag}>{cell}</{tag}>"))
            .collect();
        format!("<tr>{cells}</tr>\n")
    };

    let mut html = String::from("<table>\n");
    let mut body = block.rows.iter();
    if block.header {
        if let Some(first) = body.next() {
            html.push_str("<thead>\n");
            html.push_str(&row_html(first.as_slice(), "th"));
            html.push_str("</thead>\n");
        }
    }
    html.push_str("<tbody>\n");
    for row in body {
        html.push_str(&row_html(row.as_slice(), "td"));
    }
    html.push_str("</tbody>\n</table>");
    Some(html)
}

fn render_code(block: &CodeBlock) -> String {
    let body = escape(&block.lines.join("\n"));
    match &block.language {
        Some(lang) => format!(
            "<pre><code class=\"language-{}\">{}</code></pre>",
            escape(lang),
            body
        ),
        None => format!("<pre><code>{}</code></pre>", body),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(text: &str) -> String {
        FallbackRenderer::new().unwrap().render(text)
    }

    #[test]
    fn test_heading_levels() {
        assert_eq!(render("### Title"), "<h3>Title</h3>");
        assert_eq!(render("# One"), "<h1>One</h1>");
        assert_eq!(render("###### Six"), "<h6>Six</h6>");
    }

    #[test]
    fn test_heading_requires_whitespace_and_max_six() {
        assert_eq!(render("#hashtag"), "#hashtag");
        assert_eq!(render("####### Seven"), "####### Seven");
    }

    #[test]
    fn test_heading_text_is_escaped() {
        assert_eq!(
            render("## <script>alert(1)</script>"),
            "<h2>&lt;script&gt;alert(1)&lt;/script&gt;</h2>"
        );
    }

    #[test]
    fn test_table_with_separator() {
        let html = render("| Name | Age |\n| --- | :-: |\n| Ann | 30 |");
        assert_eq!(html.matches("<table>").count(), 1);
        assert_eq!(html.matches("<thead>").count(), 1);
        assert_eq!(html.matches("<tr>").count(), 2);
        assert!(html.contains("<tr><th>Name</th><th>Age</th></tr>"));
        assert!(html.contains("<tr><td>Ann</td><td>30</td></tr>"));
        assert!(!html.contains("---"));
    }

    #[test]
    fn test_table_without_separator_has_no_header() {
        let html = render("|a|b|\n|c|d|");
        assert!(!html.contains("<thead>"));
        assert!(html.contains("<tr><td>a</td><td>b</td></tr>"));
        assert!(html.contains("<tr><td>c</td><td>d</td></tr>"));
    }

    #[test]
    fn test_table_closes_at_first_non_matching_line() {
        let html = render("|a|b|\n|-|-|\n|1|2|\nafter");
        assert!(html.ends_with("</table>\nafter"));
    }

    #[test]
    fn test_table_cells_escaped() {
        let html = render("|<b>|&|");
        assert!(html.contains("<td>&lt;b&gt;</td><td>&amp;</td>"));
    }

    #[test]
    fn test_fenced_code_with_language() {
        let html = render("```rust\nlet x = a < b;\n```");
        assert_eq!(
            html,
            "<pre><code class=\"language-rust\">let x = a &lt; b;</code></pre>"
        );
    }

    #[test]
    fn test_fenced_code_without_language_keeps_markup_literal() {
        let html = render("```\n# not a heading\n|a|b|\n```");
        assert_eq!(html, "<pre><code># not a heading\n|a|b|</code></pre>");
    }

    #[test]
    fn test_unterminated_fence_runs_to_end() {
        let html = render("```\ncode");
        assert_eq!(html, "<pre><code>code</code></pre>");
    }

    #[test]
    fn test_blank_line_becomes_break_soft_break_kept() {
        assert_eq!(render("one\ntwo\n\nthree"), "one\ntwo\n<br>\nthree");
    }

    #[test]
    fn test_plain_text_escaped() {
        assert_eq!(render("a <b> & c"), "a &lt;b&gt; &amp; c");
    }

    #[test]
    fn test_late_separator_keeps_row_order() {
        let html = render("|a|\n|b|\n|-|\n|c|");
        assert!(!html.contains("<thead>"));
        assert!(!html.contains("<th>"));
        assert_eq!(
            html,
            "<table>\n<tbody>\n<tr><td>a</td></tr>\n<tr><td>b</td></tr>\n<tr><td>c</td></tr>\n</tbody>\n</table>"
        );
    }

    #[test]
    fn test_second_separator_adds_no_header() {
        let html = render("|h|\n|-|\n|x|\n|-|\n|y|");
        assert_eq!(html.matches("<th>").count(), 1);
        let x = html.find("<td>x</td>").unwrap();
        let y = html.find("<td>y</td>").unwrap();
        assert!(html.find("<th>h</th>").unwrap() < x && x < y);
    }
}
