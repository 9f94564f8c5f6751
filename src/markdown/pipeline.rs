//! Render pipeline
//!
//! sanitize → primary parser or fallback renderer → table normalization →
//! atomic preview replacement. The pipeline holds no formatting state
//! between calls: a fixed input and a fixed parser handle always produce
//! byte-identical output.

use super::fallback::FallbackRenderer;
use super::parser::ParserHandle;
use super::preview::PreviewSurface;
use super::tables::normalize_tables;
use crate::config::{RenderConfig, DEFAULT_TABLE_CLASS};
use crate::error::ParserError;
use crate::sanitizer::{count_tokens, sanitize_cow};
use crate::utils::html::escape;
use serde::Serialize;
use std::borrow::Cow;

/// Which path produced a render result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    /// The primary parser succeeded
    Primary,
    /// The fallback renderer was used
    Fallback,
    /// The primary parser failed on this input
    Error,
}

/// Rendered HTML plus the path that produced it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderResult {
    pub html: String,
    pub provenance: Provenance,
}

/// Orchestrates one render pass
#[derive(Debug)]
pub struct RenderPipeline {
    parser: ParserHandle,
    fallback: Option<FallbackRenderer>,
    table_class: String,
    force_fallback: bool,
}

impl RenderPipeline {
    /// Create a pipeline with default configuration
    pub fn new(parser: ParserHandle) -> Self {
        Self::with_config(parser, &RenderConfig::default())
    }

    /// Create a pipeline from configuration
    pub fn with_config(parser: ParserHandle, config: &RenderConfig) -> Self {
        let fallback = match FallbackRenderer::new() {
            Ok(renderer) => Some(renderer),
            Err(e) => {
                log::error!("Fallback renderer unavailable, showing raw text instead: {}", e);
                None
            }
        };

        log::debug!("Render pipeline using parser {:?}", parser);

        let table_class = if is_css_identifier(&config.table_class) {
            config.table_class.clone()
        } else {
            log::warn!(
                "Invalid table class {:?}, using {}",
                config.table_class,
                DEFAULT_TABLE_CLASS
            );
            DEFAULT_TABLE_CLASS.to_string()
        };

        Self {
            parser,
            fallback,
            table_class,
            force_fallback: config.force_fallback,
        }
    }

    /// Current parser handle
    pub fn parser(&self) -> &ParserHandle {
        &self.parser
    }

    /// Install the outcome of parser initialization
    ///
    /// Only a pending handle can be resolved; later calls are ignored and
    /// return `false`.
    pub fn resolve_parser(&mut self, handle: ParserHandle) -> bool {
        if !self.parser.is_pending() {
            log::debug!("Ignoring parser resolution, already {:?}", self.parser);
            return false;
        }
        log::debug!("Parser resolved: {:?}", handle);
        self.parser = handle;
        true
    }

    /// Render raw editor text
    pub fn render(&self, raw: &str) -> RenderResult {
        let clean = sanitize_cow(raw);
        if let Cow::Owned(_) = &clean {
            let redacted = count_tokens(raw);
            if redacted > 0 {
                log::debug!("Redacted {} token(s) before rendering", redacted);
            }
        }

        let primary = if self.force_fallback {
            None
        } else {
            self.parser.parse(&clean)
        };

        let (html, provenance) = match primary {
            Some(Ok(html)) => (html, Provenance::Primary),
            Some(Err(e)) => {
                log::error!("Markdown render failed: {}", e);
                (error_html(&e, &clean), Provenance::Error)
            }
            None => (self.render_fallback(&clean), Provenance::Fallback),
        };

        RenderResult {
            html: normalize_tables(&html, &self.table_class),
            provenance,
        }
    }

    /// Render and replace the surface's content in one step
    ///
    /// Scroll is reset to the top when the new content overflows the
    /// viewport.
    pub fn render_into(&self, raw: &str, surface: &mut dyn PreviewSurface) -> RenderResult {
        let result = self.render(raw);
        surface.replace_content(&result.html);
        if surface.content_height() > surface.viewport_height() {
            surface.scroll_to_top();
        }
        result
    }

    fn render_fallback(&self, clean: &str) -> String {
        match &self.fallback {
            Some(renderer) => renderer.render(clean),
            None => format!("<div><pre>{}</pre></div>", escape(clean)),
        }
    }
}

/// Letters, digits, `-` and `_`, not starting with a digit
fn is_css_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '-' || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        }
        _ => false,
    }
}

fn error_html(error: &ParserError, clean: &str) -> String {
    format!(
        "<div class=\"render-error\">\n<p class=\"render-error-message\">Error rendering markdown: {}</p>\n<pre>{}</pre>\n</div>",
        escape(&error.to_string()),
        escape(clean)
    )
}
