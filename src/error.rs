//! Error types for UtiliCraft Markdown
//!
//! This module defines all custom error types used throughout the crate.
//! Error types are organized by category; none of them is fatal to the
//! page, every failure path ends in a degraded-but-functional state.

use std::path::PathBuf;
use thiserror::Error;

/// Main application error type encompassing all error categories
#[derive(Error, Debug)]
pub enum AppError {
    /// File I/O related errors
    #[error(transparent)]
    FileIO(#[from] FileError),

    /// Configuration errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Primary parser errors
    #[error(transparent)]
    Parser(#[from] ParserError),

    /// Export errors
    #[error(transparent)]
    Export(#[from] ExportError),

    /// Preference storage errors
    #[error(transparent)]
    Store(#[from] StoreError),

    /// File watcher errors
    #[error("File watcher error: {0}")]
    Watcher(#[from] notify::Error),
}

/// File I/O related errors
#[derive(Error, Debug)]
pub enum FileError {
    /// File not found at specified path
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// Error reading file
    #[error("Could not read file: {path}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error writing file
    #[error("Could not save file: {path}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Directory operation error
    #[error("Directory error: {path}")]
    DirectoryError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Configuration related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Error loading configuration file
    #[error("Could not load configuration: {0}")]
    LoadError(String),

    /// Error saving configuration
    #[error("Could not save configuration: {0}")]
    SaveError(String),

    /// Error parsing configuration
    #[error("Invalid configuration format: {0}")]
    ParseError(String),

    /// Configuration directory error
    #[error("Could not access configuration directory")]
    DirectoryError,
}

/// Primary parser errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParserError {
    /// The parser module failed to load or initialize
    #[error("Markdown parser unavailable: {0}")]
    Unavailable(String),

    /// The parser failed on a specific input
    #[error("Markdown parser failed: {0}")]
    RenderFailure(String),
}

/// Fallback renderer errors
#[derive(Error, Debug, Clone)]
pub enum FallbackError {
    /// One of the line patterns failed to compile
    #[error("Fallback pattern failed to compile: {0}")]
    Pattern(#[from] regex::Error),
}

/// Export errors
#[derive(Error, Debug)]
pub enum ExportError {
    /// The document is empty
    #[error("Nothing to export: the document is empty")]
    EmptyInput,

    /// No PDF rasterizer was configured
    #[error("PDF export is unavailable")]
    RasterizerUnavailable,

    /// The rasterizer failed
    #[error("PDF rasterization failed: {0}")]
    Rasterize(String),

    /// The artifact could not be delivered
    #[error(transparent)]
    File(#[from] FileError),
}

/// Persisted preference storage errors
#[derive(Error, Debug)]
pub enum StoreError {
    /// Storage is not accessible (disabled, quota, sandbox)
    #[error("Preference storage unavailable: {0}")]
    Unavailable(String),

    /// Stored data is malformed
    #[error("Preference storage corrupt: {0}")]
    Corrupt(String),

    /// Underlying file error
    #[error(transparent)]
    File(#[from] FileError),
}

/// Outcome of reading the parent context's visual state
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParentAccessError {
    /// This context is top-level; there is no parent to read
    #[error("not running inside a parent context")]
    NotEmbedded,

    /// The parent exists but is behind a cross-origin boundary
    #[error("parent context is cross-origin: {0}")]
    CrossOrigin(String),
}

/// A single subordinate could not be notified
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    /// The subordinate context is gone
    #[error("subordinate context unreachable")]
    Unreachable,

    /// The subordinate refused the message
    #[error("subordinate context rejected message: {0}")]
    Rejected(String),
}

/// Result type alias for operations that can fail with AppError
pub type AppResult<T> = Result<T, AppError>;

/// Result type alias for file operations
pub type FileResult<T> = Result<T, FileError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type alias for export operations
pub type ExportResult<T> = Result<T, ExportError>;

/// Result type alias for preference storage operations
pub type StoreResult<T> = Result<T, StoreError>;

impl ExportError {
    /// Create a user-friendly warning suitable for display
    pub fn user_message(&self) -> String {
        match self {
            ExportError::EmptyInput => {
                "Please enter some markdown content before exporting.".to_string()
            }
            ExportError::RasterizerUnavailable => {
                "PDF export is not available right now. Try exporting to HTML instead.".to_string()
            }
            ExportError::Rasterize(_) => {
                "The PDF could not be generated. Please try again.".to_string()
            }
            ExportError::File(_) => {
                "Could not save the exported file. Check disk space and permissions.".to_string()
            }
        }
    }
}
