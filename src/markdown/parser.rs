//! Primary markdown parser
//!
//! The primary parser is an opaque collaborator exposing a single
//! `parse_markdown(text) -> html` entry point. It is initialized once at
//! startup; until (and unless) that succeeds the pipeline uses the
//! fallback renderer.

use crate::error::ParserError;
use pulldown_cmark::{html, Options, Parser};
use std::fmt;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

/// Version reported by [`CmarkParser`]
pub const PARSER_VERSION: &str = "1.1.0";

/// A markdown to HTML converter
pub trait MarkdownParser: Send + Sync {
    /// Convert markdown text to an HTML fragment
    fn parse_markdown(&self, text: &str) -> Result<String, ParserError>;

    /// Human-readable version of the parser
    fn version(&self) -> &str {
        "unknown"
    }
}

/// pulldown-cmark backed primary parser
#[derive(Debug, Clone, Copy)]
pub struct CmarkParser {
    options: Options,
}

impl CmarkParser {
    /// Create a parser with all extensions enabled
    pub fn new() -> Self {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_FOOTNOTES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TASKLISTS);
        options.insert(Options::ENABLE_SMART_PUNCTUATION);
        options.insert(Options::ENABLE_HEADING_ATTRIBUTES);

        Self { options }
    }
}

impl Default for CmarkParser {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkdownParser for CmarkParser {
    fn parse_markdown(&self, text: &str) -> Result<String, ParserError> {
        let parser = Parser::new_ext(text, self.options);
        let mut html_output = String::with_capacity(text.len() * 3 / 2);
        html::push_html(&mut html_output, parser);
        Ok(html_output)
    }

    fn version(&self) -> &str {
        PARSER_VERSION
    }
}

/// Why the primary parser cannot be used
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unavailable {
    /// Initialization has not finished yet
    Pending,
    /// Initialization failed; permanent for the session
    Failed(String),
    /// Disabled by configuration
    Disabled,
}

/// Capability handle for the primary parser, resolved once at startup
#[derive(Clone)]
pub enum ParserHandle {
    /// The parser is loaded and callable
    Available(Arc<dyn MarkdownParser>),
    /// The parser cannot be used
    Unavailable(Unavailable),
}

impl ParserHandle {
    /// Handle wrapping the built-in pulldown-cmark parser
    pub fn cmark() -> Self {
        Self::Available(Arc::new(CmarkParser::new()))
    }

    /// Handle for a parser whose initialization is still running
    pub fn pending() -> Self {
        Self::Unavailable(Unavailable::Pending)
    }

    /// Whether the primary parser can be called
    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available(_))
    }

    /// Whether initialization has not finished yet
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Unavailable(Unavailable::Pending))
    }

    /// Call the parser, converting panics into render failures
    ///
    /// Returns `None` when the parser is unavailable.
    pub fn parse(&self, text: &str) -> Option<Result<String, ParserError>> {
        let Self::Available(parser) = self else {
            return None;
        };

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| parser.parse_markdown(text)));
        Some(outcome.unwrap_or_else(|payload| {
            Err(ParserError::RenderFailure(panic_message(&*payload)))
        }))
    }
}

impl fmt::Debug for ParserHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Available(parser) => write!(f, "Available({})", parser.version()),
            Self::Unavailable(reason) => write!(f, "Unavailable({reason:?})"),
        }
    }
}

/// Await the parser's initialization and resolve a handle
///
/// Failure is logged and degrades to a permanent fallback.
pub async fn load_parser<F>(init: F) -> ParserHandle
where
    F: Future<Output = Result<Arc<dyn MarkdownParser>, ParserError>>,
{
    match init.await {
        Ok(parser) => {
            log::info!("Markdown parser {} loaded", parser.version());
            ParserHandle::Available(parser)
        }
        Err(e) => {
            log::warn!("Failed to load markdown parser, using fallback renderer: {}", e);
            ParserHandle::Unavailable(Unavailable::Failed(e.to_string()))
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "parser panicked".to_string()
    }
}
