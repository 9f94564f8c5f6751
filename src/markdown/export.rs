//! Export of the current document
//!
//! Both exports re-run the render pipeline on the current document rather
//! than copying the preview, so the artifact always reflects the latest
//! edit:
//! - HTML: a standalone document with embedded print-friendly styles
//! - PDF: a detached, pagination-friendly copy handed to a [`PdfRasterizer`]
//!
//! Artifacts are never cached; each export produces a fresh one.

use super::outline::table_of_contents;
use super::pipeline::RenderPipeline;
use crate::config::{ExportConfig, DEFAULT_PDF_MARGIN_MM, DEFAULT_PDF_SCALE};
use crate::document::Document;
use crate::error::{ExportError, ExportResult};
use crate::file_handler::{ensure_dir, write_file_atomic_sync};
use crate::utils::{html::escape, path::sanitize_file_stem};
use std::path::{Path, PathBuf};

/// Export format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Html,
    Pdf,
}

impl ExportFormat {
    /// Get the file extension for the format
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Html => "html",
            ExportFormat::Pdf => "pdf",
        }
    }

    /// Get display name for the format
    pub fn display_name(&self) -> &'static str {
        match self {
            ExportFormat::Html => "HTML",
            ExportFormat::Pdf => "PDF",
        }
    }
}

/// Options for HTML export
#[derive(Debug, Clone, Default)]
pub struct HtmlExportOptions {
    /// Document title
    pub title: Option<String>,
    /// Include table of contents
    pub include_toc: bool,
    /// Use dark mode styles; follows the applied theme
    pub dark_mode: bool,
}

/// Paper size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageFormat {
    #[default]
    A4,
}

/// Page orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    #[default]
    Portrait,
}

/// Settings handed to the rasterizer
#[derive(Debug, Clone, PartialEq)]
pub struct PdfOptions {
    /// Margins in millimetres: top, right, bottom, left
    pub margins_mm: [f32; 4],
    /// Rasterization scale factor
    pub scale: f32,
    pub format: PageFormat,
    pub orientation: Orientation,
}

impl Default for PdfOptions {
    fn default() -> Self {
        Self {
            margins_mm: [DEFAULT_PDF_MARGIN_MM; 4],
            scale: DEFAULT_PDF_SCALE,
            format: PageFormat::A4,
            orientation: Orientation::Portrait,
        }
    }
}

/// One rasterization request
#[derive(Debug, Clone)]
pub struct PdfJob {
    /// Standalone HTML of the detached export container
    pub html: String,
    pub options: PdfOptions,
    pub file_name: String,
}

/// External layout/PDF collaborator
pub trait PdfRasterizer {
    /// Lay out and rasterize the job, returning PDF bytes
    fn rasterize(&self, job: &PdfJob) -> Result<Vec<u8>, String>;
}

/// A generated, downloadable file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub file_name: String,
    pub format: ExportFormat,
    pub bytes: Vec<u8>,
}

impl ExportArtifact {
    /// The artifact's content as text, for HTML artifacts
    pub fn as_text(&self) -> Option<&str> {
        std::str::from_utf8(&self.bytes).ok()
    }
}

/// Where finished artifacts go (the client-side download)
pub trait DownloadSink {
    /// Hand over an artifact; returns where it ended up
    fn deliver(&mut self, artifact: &ExportArtifact) -> ExportResult<PathBuf>;
}

/// Writes artifacts into a directory
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    /// Create a sink targeting `dir`
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Target directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl DownloadSink for DirectorySink {
    fn deliver(&mut self, artifact: &ExportArtifact) -> ExportResult<PathBuf> {
        ensure_dir(&self.dir)?;
        let path = self.dir.join(&artifact.file_name);
        write_file_atomic_sync(&path, &artifact.bytes)?;
        log::info!(
            "Exported {} ({} bytes) to {}",
            artifact.format.display_name(),
            artifact.bytes.len(),
            path.display()
        );
        Ok(path)
    }
}

/// Main exporter for markdown documents
pub struct MarkdownExporter {
    html_options: HtmlExportOptions,
    pdf_options: PdfOptions,
    rasterizer: Option<Box<dyn PdfRasterizer>>,
}

impl MarkdownExporter {
    /// Create an exporter without PDF support
    pub fn new() -> Self {
        Self {
            html_options: HtmlExportOptions::default(),
            pdf_options: PdfOptions::default(),
            rasterizer: None,
        }
    }

    /// Create an exporter from configuration
    pub fn with_config(config: &ExportConfig) -> Self {
        Self {
            html_options: HtmlExportOptions {
                title: config.title.clone(),
                include_toc: config.include_toc,
                ..HtmlExportOptions::default()
            },
            pdf_options: PdfOptions {
                margins_mm: [config.pdf_margin_mm; 4],
                scale: config.pdf_scale,
                ..PdfOptions::default()
            },
            rasterizer: None,
        }
    }

    /// Attach the PDF collaborator
    pub fn with_rasterizer(mut self, rasterizer: Box<dyn PdfRasterizer>) -> Self {
        self.rasterizer = Some(rasterizer);
        self
    }

    /// HTML options in use
    pub fn html_options_mut(&mut self) -> &mut HtmlExportOptions {
        &mut self.html_options
    }

    /// Whether PDF export is possible
    pub fn supports_pdf(&self) -> bool {
        self.rasterizer.is_some()
    }

    /// Build a standalone HTML artifact from the current document
    pub fn build_html(
        &self,
        document: &Document,
        pipeline: &RenderPipeline,
    ) -> ExportResult<ExportArtifact> {
        let text = checked_text(document)?;
        let fragment = pipeline.render(&text).html;

        let toc = if self.html_options.include_toc {
            table_of_contents(&crate::sanitizer::sanitize(&text))
        } else {
            String::new()
        };

        let title = self.title_for(document);
        let html = standalone_document(&title, &toc, &fragment, &self.html_options, "");

        Ok(ExportArtifact {
            file_name: self.file_name_for(document, ExportFormat::Html),
            format: ExportFormat::Html,
            bytes: html.into_bytes(),
        })
    }

    /// Build a PDF artifact from the current document
    pub fn build_pdf(
        &self,
        document: &Document,
        pipeline: &RenderPipeline,
    ) -> ExportResult<ExportArtifact> {
        let text = checked_text(document)?;
        let rasterizer = self
            .rasterizer
            .as_ref()
            .ok_or(ExportError::RasterizerUnavailable)?;

        let fragment = pipeline.render(&text).html;
        let container = format!("<div class=\"pdf-export\">\n{}\n</div>", fragment);
        let options = HtmlExportOptions {
            dark_mode: false,
            ..self.html_options.clone()
        };
        let html = standalone_document(
            &self.title_for(document),
            "",
            &container,
            &options,
            PAGINATION_CSS,
        );

        let job = PdfJob {
            html,
            options: self.pdf_options.clone(),
            file_name: self.file_name_for(document, ExportFormat::Pdf),
        };
        let bytes = rasterizer.rasterize(&job).map_err(ExportError::Rasterize)?;

        Ok(ExportArtifact {
            file_name: job.file_name,
            format: ExportFormat::Pdf,
            bytes,
        })
    }

    /// Build and deliver an HTML export
    pub fn export_html(
        &self,
        document: &Document,
        pipeline: &RenderPipeline,
        sink: &mut dyn DownloadSink,
    ) -> ExportResult<ExportArtifact> {
        let artifact = self.build_html(document, pipeline)?;
        sink.deliver(&artifact)?;
        Ok(artifact)
    }

    /// Build and deliver a PDF export
    pub fn export_pdf(
        &self,
        document: &Document,
        pipeline: &RenderPipeline,
        sink: &mut dyn DownloadSink,
    ) -> ExportResult<ExportArtifact> {
        let artifact = self.build_pdf(document, pipeline)?;
        sink.deliver(&artifact)?;
        Ok(artifact)
    }

    fn title_for(&self, document: &Document) -> String {
        self.html_options
            .title
            .clone()
            .unwrap_or_else(|| document.title())
    }

    fn file_name_for(&self, document: &Document, format: ExportFormat) -> String {
        let stem = match (&self.html_options.title, &document.path) {
            (Some(title), _) => sanitize_file_stem(title),
            (None, Some(_)) => sanitize_file_stem(&document.title()),
            (None, None) => format!(
                "markdown-export-{}",
                chrono::Local::now().format("%Y%m%d-%H%M%S")
            ),
        };
        format!("{}.{}", stem, format.extension())
    }
}

impl Default for MarkdownExporter {
    fn default() -> Self {
        Self::new()
    }
}

fn checked_text(document: &Document) -> ExportResult<String> {
    if document.is_blank() {
        log::warn!("Export requested for an empty document");
        return Err(ExportError::EmptyInput);
    }
    Ok(document.text())
}

const PAGINATION_CSS: &str = r#"
        .pdf-export table, .pdf-export pre, .pdf-export blockquote, .pdf-export tr {
            page-break-inside: avoid;
            break-inside: avoid;
        }

        .pdf-export h1, .pdf-export h2, .pdf-export h3,
        .pdf-export h4, .pdf-export h5, .pdf-export h6 {
            page-break-after: avoid;
            break-after: avoid;
        }

        .pdf-export img {
            page-break-inside: avoid;
            max-width: 100%;
        }

        body {
            max-width: none;
            padding: 0;
        }"#;

fn standalone_document(
    title: &str,
    toc: &str,
    fragment: &str,
    options: &HtmlExportOptions,
    extra_css: &str,
) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <meta name="generator" content="UtiliCraft Markdown">
    <title>{}</title>
    {}
</head>
<body>
    <article class="markdown-body">
        {}
        {}
    </article>
</body>
</html>"#,
        escape(title),
        styles(options.dark_mode, extra_css),
        toc,
        fragment
    )
}

fn styles(dark_mode: bool, extra_css: &str) -> String {
    let theme_styles = if dark_mode {
        r#"
        :root {
            --color-bg: #131620;
            --color-text: #d7dae3;
            --color-link: #6ea8fe;
            --color-code-bg: #1c2030;
            --color-border: #2e3448;
            --color-muted: #8b93a7;
        }"#
    } else {
        r#"
        :root {
            --color-bg: #ffffff;
            --color-text: #24292e;
            --color-link: #0366d6;
            --color-code-bg: #f6f8fa;
            --color-border: #e1e4e8;
            --color-muted: #6a737d;
        }"#
    };

    format!(
        r#"<style>
        {}

        body {{
            font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Helvetica, Arial, sans-serif;
            font-size: 16px;
            line-height: 1.6;
            color: var(--color-text);
            background-color: var(--color-bg);
            max-width: 900px;
            margin: 0 auto;
            padding: 2rem;
        }}

        .markdown-body h1, .markdown-body h2 {{
            border-bottom: 1px solid var(--color-border);
            padding-bottom: .3em;
        }}

        .markdown-body a {{ color: var(--color-link); }}

        .markdown-body code {{
            background-color: var(--color-code-bg);
            padding: .2em .4em;
            border-radius: 6px;
            font-size: 85%;
            font-family: "SFMono-Regular", Consolas, "Liberation Mono", Menlo, monospace;
        }}

        .markdown-body pre {{
            background-color: var(--color-code-bg);
            padding: 16px;
            overflow: auto;
            border-radius: 6px;
        }}

        .markdown-body pre code {{ background: transparent; padding: 0; }}

        .markdown-body blockquote {{
            margin: 16px 0;
            padding: 0 1em;
            color: var(--color-muted);
            border-left: .25em solid var(--color-border);
        }}

        .markdown-body table {{
            border-collapse: collapse;
            width: 100%;
            margin: 16px 0;
        }}

        .markdown-body th, .markdown-body td {{
            padding: 6px 13px;
            border: 1px solid var(--color-border);
        }}

        .markdown-body th {{ background-color: var(--color-code-bg); }}

        .render-error-message {{ color: #d73a49; font-weight: 600; }}

        .toc {{ list-style: none; padding-left: 0; }}

        @media print {{
            body {{ max-width: none; padding: 1cm; background: #ffffff; color: #000000; }}
            pre, blockquote, table {{ page-break-inside: avoid; }}
            h1, h2, h3, h4, h5, h6 {{ page-break-after: avoid; }}
        }}
        {}
    </style>"#,
        theme_styles,
        extra_css
    )
}
