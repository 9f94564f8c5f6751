//! UtiliCraft Markdown - an embeddable Markdown editor core
//!
//! Sanitized live preview with a primary parser and a regex fallback,
//! theme synchronization between a hosting page and embedded tools, and
//! standalone HTML/PDF export.

pub mod app;
pub mod config;
pub mod document;
pub mod error;
pub mod file_handler;
pub mod markdown;
pub mod message;
pub mod sanitizer;
pub mod theme;
pub mod utils;

pub use app::MarkdownEditor;
pub use config::Config;
pub use document::Document;
pub use error::{AppError, AppResult};
pub use message::{Message, Outcome};
