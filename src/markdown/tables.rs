//! Table normalization applied to every rendered fragment
//!
//! Each `<table>` receives the marker class, and tables without a header
//! section get their first row promoted into a `<thead>`. Running the
//! normalizer twice yields the same HTML as running it once.

use regex::{Captures, NoExpand, Regex};
use std::sync::LazyLock;

static TABLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<table\b([^>]*)>(.*?)</table>").expect("invalid table regex"));

static CLASS_ATTR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(^|\s)class\s*=\s*"([^"]*)""#).expect("invalid class regex"));

static FIRST_ROW: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<tr\b[^>]*>.*?</tr>").expect("invalid row regex"));

static DATA_CELL_OPEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<td\b").expect("invalid cell regex"));

/// Normalize every table in an HTML fragment
pub fn normalize_tables(html: &str, marker_class: &str) -> String {
    TABLE
        .replace_all(html, |caps: &Captures<'_>| {
            let attrs = with_marker_class(&caps[1], marker_class);
            let body = with_header_section(&caps[2]);
            format!("<table{attrs}>{body}</table>")
        })
        .into_owned()
}

fn with_marker_class(attrs: &str, marker_class: &str) -> String {
    match CLASS_ATTR.captures(attrs) {
        Some(caps) => {
            let classes = &caps[2];
            if classes.split_whitespace().any(|c| c == marker_class) {
                return attrs.to_string();
            }
            let merged = if classes.trim().is_empty() {
                marker_class.to_string()
            } else {
                format!("{} {}", classes.trim(), marker_class)
            };
            let replacement = format!("{}class=\"{}\"", &caps[1], merged);
            CLASS_ATTR.replace(attrs, NoExpand(&replacement)).into_owned()
        }
        None => format!(" class=\"{}\"{}", marker_class, attrs),
    }
}

fn with_header_section(body: &str) -> String {
    if body.contains("<thead") {
        return body.to_string();
    }
    let Some(row) = FIRST_ROW.find(body) else {
        return body.to_string();
    };

    let header_row = DATA_CELL_OPEN
        .replace_all(row.as_str(), "<th")
        .replace("</td>", "</th>");

    let mut rest = String::with_capacity(body.len());
    rest.push_str(&body[..row.start()]);
    rest.push_str(&body[row.end()..]);

    format!("\n<thead>\n{}\n</thead>{}", header_row, rest)
}
