//! Editor session
//!
//! [`MarkdownEditor`] ties the document, render pipeline, preview,
//! exporter and theme synchronizer together. All state changes go through
//! [`MarkdownEditor::update`], one message at a time.

use crate::config::Config;
use crate::document::Document;
use crate::error::ExportResult;
use crate::markdown::{
    DocumentStats, DownloadSink, ExportArtifact, MarkdownExporter, ParserHandle, PdfRasterizer,
    PreviewPane, Provenance, RenderPipeline,
};
use crate::message::{Message, Outcome};
use crate::theme::{start_parent_poll, PollHandle, ThemeState, ThemeSynchronizer, Trigger};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// One editing session
pub struct MarkdownEditor {
    /// The text being edited
    document: Document,

    /// Sanitize, parse and post-process
    pipeline: RenderPipeline,

    /// Live preview
    preview: PreviewPane,

    /// Standalone HTML/PDF generation
    exporter: MarkdownExporter,

    /// Where exports are delivered
    sink: Box<dyn DownloadSink>,

    /// Shared with the parent poll task
    theme: Arc<Mutex<ThemeSynchronizer>>,

    /// Status line counters
    stats: DocumentStats,

    /// Poll interval from configuration
    poll_interval: Duration,
}

impl MarkdownEditor {
    /// Start a session on the welcome document
    ///
    /// Resolves the theme and renders the first preview immediately, even
    /// when the parser handle is still pending.
    pub fn new(
        config: &Config,
        parser: ParserHandle,
        theme: ThemeSynchronizer,
        sink: Box<dyn DownloadSink>,
    ) -> Self {
        let mut editor = Self {
            document: Document::welcome(),
            pipeline: RenderPipeline::with_config(parser, &config.render),
            preview: PreviewPane::new(),
            exporter: MarkdownExporter::with_config(&config.export),
            sink,
            theme: Arc::new(Mutex::new(theme)),
            stats: DocumentStats::default(),
            poll_interval: Duration::from_millis(config.theme.poll_interval_ms),
        };

        editor.reconcile_theme(Trigger::Load);
        editor.refresh();
        editor
    }

    /// Replace the starting document
    pub fn with_document(mut self, document: Document) -> Self {
        self.document = document;
        self.refresh();
        self
    }

    /// Enable PDF export
    pub fn with_rasterizer(mut self, rasterizer: Box<dyn PdfRasterizer>) -> Self {
        self.exporter = self.exporter.with_rasterizer(rasterizer);
        self
    }

    /// Handle one message
    pub fn update(&mut self, message: Message) -> Outcome {
        match message {
            Message::Input(text) => {
                self.document.set_text(&text);
                Outcome::Rendered(self.refresh())
            }
            Message::ParserLoaded(handle) => {
                if self.pipeline.resolve_parser(handle) {
                    Outcome::Rendered(self.refresh())
                } else {
                    Outcome::None
                }
            }
            Message::Inbound(value) => self.reconcile_theme(Trigger::Inbound(value)),
            Message::PollTick => self.reconcile_theme(Trigger::PollTick),
            Message::ExportHtml => {
                let dark = self.theme_state().is_dark();
                self.exporter.html_options_mut().dark_mode = dark;
                let built = self.exporter.build_html(&self.document, &self.pipeline);
                self.deliver(built)
            }
            Message::ExportPdf => {
                let built = self.exporter.build_pdf(&self.document, &self.pipeline);
                self.deliver(built)
            }
        }
    }

    /// Start polling the parent's theme when it is readable
    pub fn start_theme_poll(&self) -> Option<PollHandle> {
        start_parent_poll(self.theme.clone(), self.poll_interval)
    }

    /// Current document
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Current preview
    pub fn preview(&self) -> &PreviewPane {
        &self.preview
    }

    /// Status line counters for the current document
    pub fn stats(&self) -> DocumentStats {
        self.stats
    }

    /// Status line text
    pub fn status_line(&self) -> String {
        format!(
            "{} words, {} characters",
            self.stats.words, self.stats.characters
        )
    }

    /// Applied theme; the default when the synchronizer is unusable
    pub fn theme_state(&self) -> ThemeState {
        match self.theme.lock() {
            Ok(sync) => sync.state(),
            Err(e) => {
                log::error!("Theme synchronizer lock poisoned: {}", e);
                ThemeState::default()
            }
        }
    }

    /// Render the current document into the preview
    fn refresh(&mut self) -> Provenance {
        let text = self.document.text();
        let result = self.pipeline.render_into(&text, &mut self.preview);
        self.stats = DocumentStats::from_text(&text);
        result.provenance
    }

    fn reconcile_theme(&mut self, trigger: Trigger) -> Outcome {
        match self.theme.lock() {
            Ok(mut sync) => Outcome::Theme(sync.reconcile(trigger)),
            Err(e) => {
                log::error!("Theme synchronizer lock poisoned: {}", e);
                Outcome::None
            }
        }
    }

    fn deliver(&mut self, built: ExportResult<ExportArtifact>) -> Outcome {
        let delivered = built.and_then(|artifact| {
            let path: PathBuf = self.sink.deliver(&artifact)?;
            Ok((artifact, path))
        });

        match delivered {
            Ok((artifact, path)) => Outcome::Exported { artifact, path },
            Err(e) => {
                log::warn!("Export failed: {}", e);
                Outcome::Warning(e.user_message())
            }
        }
    }
}

impl std::fmt::Debug for MarkdownEditor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarkdownEditor")
            .field("document", &self.document.id)
            .field("parser", self.pipeline.parser())
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExportError;
    use crate::markdown::{ExportFormat, PdfJob};
    use crate::theme::{MemoryStore, RootElement, ThemeSource, TopLevel};
    use serde_json::json;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Records deliveries instead of writing files
    #[derive(Clone, Default)]
    struct RecordingSink(Rc<RefCell<Vec<String>>>);

    impl DownloadSink for RecordingSink {
        fn deliver(&mut self, artifact: &ExportArtifact) -> ExportResult<PathBuf> {
            self.0.borrow_mut().push(artifact.file_name.clone());
            Ok(PathBuf::from("/downloads").join(&artifact.file_name))
        }
    }

    struct FakeRasterizer;

    impl PdfRasterizer for FakeRasterizer {
        fn rasterize(&self, _job: &PdfJob) -> Result<Vec<u8>, String> {
            Ok(b"%PDF-1.7".to_vec())
        }
    }

    fn theme() -> ThemeSynchronizer {
        let config = Config::default();
        ThemeSynchronizer::new(
            &config.theme,
            Box::new(MemoryStore::new()),
            Box::new(None::<ThemeState>),
            Box::new(TopLevel),
            Box::new(RootElement::new()),
        )
    }

    fn editor(parser: ParserHandle) -> (MarkdownEditor, RecordingSink) {
        let sink = RecordingSink::default();
        let editor = MarkdownEditor::new(&Config::default(), parser, theme(), Box::new(sink.clone()));
        (editor, sink)
    }

    #[test]
    fn test_starts_with_rendered_welcome() {
        let (editor, _) = editor(ParserHandle::cmark());
        assert!(editor.preview().html().contains("<h1>Welcome to the Markdown Editor</h1>"));
        assert!(editor.stats().words > 0);
        assert_eq!(editor.theme_state(), ThemeState::Dark);
    }

    #[test]
    fn test_input_renders_synchronously() {
        let (mut editor, _) = editor(ParserHandle::cmark());
        let outcome = editor.update(Message::Input("## Fresh".to_string()));

        assert_eq!(outcome, Outcome::Rendered(Provenance::Primary));
        assert!(editor.preview().html().contains("<h2>Fresh</h2>"));
        assert_eq!(editor.status_line(), "2 words, 8 characters");
    }

    #[test]
    fn test_pending_parser_then_loaded() {
        let (mut editor, _) = editor(ParserHandle::pending());
        assert_eq!(
            editor.update(Message::Input("# Title".to_string())),
            Outcome::Rendered(Provenance::Fallback)
        );

        assert_eq!(
            editor.update(Message::ParserLoaded(ParserHandle::cmark())),
            Outcome::Rendered(Provenance::Primary)
        );

        // A second resolution is ignored
        assert_eq!(
            editor.update(Message::ParserLoaded(ParserHandle::pending())),
            Outcome::None
        );
    }

    #[test]
    fn test_inbound_theme_message() {
        let (mut editor, _) = editor(ParserHandle::cmark());
        let outcome = editor.update(Message::Inbound(json!({
            "type": "theme-change",
            "isDarkTheme": false
        })));

        assert!(matches!(
            outcome,
            Outcome::Theme(resolution) if resolution.source == ThemeSource::Message
        ));
        assert_eq!(editor.theme_state(), ThemeState::Light);
    }

    #[test]
    fn test_poll_tick_without_parent_is_noop() {
        let (mut editor, _) = editor(ParserHandle::cmark());
        assert!(matches!(
            editor.update(Message::PollTick),
            Outcome::Theme(resolution) if resolution.source == ThemeSource::Unchanged
        ));
        assert!(editor.start_theme_poll().is_none());
    }

    #[test]
    fn test_export_html_delivers_artifact() {
        let (mut editor, sink) = editor(ParserHandle::cmark());
        editor.update(Message::Input("# Notes".to_string()));

        match editor.update(Message::ExportHtml) {
            Outcome::Exported { artifact, path } => {
                assert_eq!(artifact.format, ExportFormat::Html);
                assert!(artifact.as_text().unwrap().contains("<h1>Notes</h1>"));
                assert!(path.starts_with("/downloads"));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert_eq!(sink.0.borrow().len(), 1);
    }

    #[test]
    fn test_html_export_uses_applied_theme() {
        let (mut editor, _) = editor(ParserHandle::cmark());
        let export = |editor: &mut MarkdownEditor| match editor.update(Message::ExportHtml) {
            Outcome::Exported { artifact, .. } => artifact.as_text().unwrap().to_string(),
            other => panic!("unexpected outcome: {other:?}"),
        };

        assert!(export(&mut editor).contains("--color-bg: #131620"));

        editor.update(Message::Inbound(json!({
            "type": "theme-change",
            "isDarkTheme": false
        })));
        assert!(export(&mut editor).contains("--color-bg: #ffffff"));
    }

    #[test]
    fn test_empty_export_warns_without_writing() {
        let (mut editor, sink) = editor(ParserHandle::cmark());
        let mut editor = editor.with_rasterizer(Box::new(FakeRasterizer));
        editor.update(Message::Input("   \n".to_string()));

        let expected = ExportError::EmptyInput.user_message();
        assert_eq!(editor.update(Message::ExportHtml), Outcome::Warning(expected.clone()));
        assert_eq!(editor.update(Message::ExportPdf), Outcome::Warning(expected));
        assert!(sink.0.borrow().is_empty());
    }

    #[test]
    fn test_export_pdf_with_rasterizer() {
        let (editor, _) = editor(ParserHandle::cmark());
        let mut editor = editor.with_rasterizer(Box::new(FakeRasterizer));
        assert!(matches!(
            editor.update(Message::ExportPdf),
            Outcome::Exported { ref artifact, .. } if artifact.format == ExportFormat::Pdf
        ));
    }

    #[test]
    fn test_export_pdf_without_rasterizer_warns() {
        let (mut editor, sink) = editor(ParserHandle::cmark());
        assert_eq!(
            editor.update(Message::ExportPdf),
            Outcome::Warning(ExportError::RasterizerUnavailable.user_message())
        );
        assert!(sink.0.borrow().is_empty());
    }
}
