//! Markdown module for UtiliCraft Markdown
//!
//! Handles Markdown rendering and export including:
//! - Primary parser capability handle
//! - Fallback rendering
//! - Table normalization
//! - Live preview surface
//! - Outline and statistics
//! - Export functionality (HTML, PDF)

pub mod export;
pub mod fallback;
pub mod outline;
pub mod parser;
pub mod pipeline;
pub mod preview;
pub mod tables;

pub use export::{
    DirectorySink, DownloadSink, ExportArtifact, ExportFormat, HtmlExportOptions,
    MarkdownExporter, Orientation, PageFormat, PdfJob, PdfOptions, PdfRasterizer,
};
pub use fallback::FallbackRenderer;
pub use outline::{extract_headings, has_tables, table_of_contents, DocumentStats, Heading};
pub use parser::{load_parser, CmarkParser, MarkdownParser, ParserHandle, Unavailable};
pub use pipeline::{Provenance, RenderPipeline, RenderResult};
pub use preview::{PreviewPane, PreviewSurface};
pub use tables::normalize_tables;
