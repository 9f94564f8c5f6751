//! Editor session message types
//!
//! Every event the session reacts to arrives as one [`Message`]; every
//! reaction reports back one [`Outcome`].

use crate::markdown::{ExportArtifact, ParserHandle, Provenance};
use crate::theme::Resolution;
use std::path::PathBuf;

/// Events handled by [`crate::app::MarkdownEditor::update`]
#[derive(Debug, Clone)]
pub enum Message {
    /// The text area content changed
    Input(String),

    /// Primary parser initialization finished
    ParserLoaded(ParserHandle),

    /// Cross-context message from the embedding page
    Inbound(serde_json::Value),

    /// Parent theme polling interval elapsed
    PollTick,

    /// Export button: standalone HTML
    ExportHtml,

    /// Export button: PDF
    ExportPdf,
}

/// What a message did
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The preview was replaced
    Rendered(Provenance),

    /// An artifact was generated and delivered
    Exported {
        artifact: ExportArtifact,
        path: PathBuf,
    },

    /// A user-facing warning; nothing was written
    Warning(String),

    /// The theme was reconciled
    Theme(Resolution),

    /// Nothing changed
    None,
}
