//! File handler module for UtiliCraft Markdown
//!
//! Handles all file system operations including:
//! - Reading markdown input
//! - Atomic writes for export artifacts and preferences
//! - File watching for the command line's watch mode

pub mod io;
pub mod watcher;

pub use io::*;
pub use watcher::*;
