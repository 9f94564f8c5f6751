//! The editing surface's text buffer
//!
//! One [`Document`] lives per session. It is mutated on every input event
//! and never persisted.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

/// Content the editor starts with
pub const WELCOME_MARKDOWN: &str = "# Welcome to the Markdown Editor\n\nThis is a simple markdown editor that renders in real-time.\n\n## Features\n- Real-time preview\n- Supports standard markdown syntax\n- Synchronized with the main site's theme";

/// Unique identifier for documents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentId(Uuid);

impl DocumentId {
    /// Create a new unique document ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Get the underlying UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for DocumentId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The raw markdown buffer
#[derive(Debug, Clone)]
pub struct Document {
    /// Unique identifier for this document
    pub id: DocumentId,

    /// Source file, when loaded from disk
    pub path: Option<PathBuf>,

    /// Document content as a rope
    content: ropey::Rope,

    /// Number of edits applied since creation
    revision: u64,
}

impl Document {
    /// Create a new empty document
    pub fn new() -> Self {
        Self::from_text("")
    }

    /// Create a document holding the welcome text
    pub fn welcome() -> Self {
        Self::from_text(WELCOME_MARKDOWN)
    }

    /// Create a document from text
    pub fn from_text(text: &str) -> Self {
        Self {
            id: DocumentId::new(),
            path: None,
            content: ropey::Rope::from_str(text),
            revision: 0,
        }
    }

    /// Create a document from file content
    pub fn from_file(path: PathBuf, text: &str) -> Self {
        Self {
            path: Some(path),
            ..Self::from_text(text)
        }
    }

    /// Replace the whole buffer (one input event)
    pub fn set_text(&mut self, text: &str) {
        self.content = ropey::Rope::from_str(text);
        self.revision += 1;
    }

    /// Full content as a string
    pub fn text(&self) -> String {
        self.content.to_string()
    }

    /// Length in characters
    pub fn len_chars(&self) -> usize {
        self.content.len_chars()
    }

    /// Whether the document has no characters at all
    pub fn is_empty(&self) -> bool {
        self.content.len_chars() == 0
    }

    /// Whether the document has nothing but whitespace
    pub fn is_blank(&self) -> bool {
        self.content.chars().all(char::is_whitespace)
    }

    /// Number of edits applied
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Title for display and export file names
    pub fn title(&self) -> String {
        self.path
            .as_deref()
            .and_then(crate::utils::path::file_stem)
            .unwrap_or_else(|| "Untitled".to_string())
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}
