//! File system watcher for re-rendering on external edits
//!
//! Used by the command line's watch mode: every modification of the
//! watched markdown file is one input event for the render pipeline.

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

/// Events from the file watcher
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    /// The file was created or modified
    Changed(PathBuf),

    /// The file was removed
    Removed(PathBuf),

    /// Watcher error occurred
    Error(String),
}

/// Configuration for the file watcher
#[derive(Debug, Clone)]
pub struct WatcherConfig {
    /// Debounce interval in milliseconds
    pub debounce_ms: u64,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self { debounce_ms: 200 }
    }
}

/// Watches one file for changes
pub struct FileWatcher {
    /// The underlying notify watcher
    _watcher: RecommendedWatcher,

    /// Receiver for events
    event_rx: Receiver<notify::Result<Event>>,

    /// Path being watched
    path: PathBuf,

    /// Configuration
    config: WatcherConfig,
}

impl FileWatcher {
    /// Start watching `path`
    pub fn new(path: impl AsRef<Path>, config: WatcherConfig) -> Result<Self, notify::Error> {
        let path = path.as_ref().to_path_buf();
        let (tx, rx) = channel();

        let mut watcher = RecommendedWatcher::new(
            move |res| {
                let _ = tx.send(res);
            },
            Config::default(),
        )?;
        watcher.watch(&path, RecursiveMode::NonRecursive)?;

        Ok(Self {
            _watcher: watcher,
            event_rx: rx,
            path,
            config,
        })
    }

    /// Path being watched
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Block until the next relevant event, coalescing bursts
    ///
    /// Returns `None` once the watcher has shut down.
    pub fn next_event(&self) -> Option<WatchEvent> {
        loop {
            let first = match self.event_rx.recv() {
                Ok(result) => result,
                Err(_) => return None,
            };
            let Some(mut event) = convert_event(first) else {
                continue;
            };

            // Drain the burst that usually follows a save
            let deadline = Instant::now() + Duration::from_millis(self.config.debounce_ms);
            loop {
                let remaining = deadline.saturating_duration_since(Instant::now());
                match self.event_rx.recv_timeout(remaining) {
                    Ok(next) => {
                        if let Some(next) = convert_event(next) {
                            event = next;
                        }
                    }
                    Err(RecvTimeoutError::Timeout) => break,
                    Err(RecvTimeoutError::Disconnected) => return Some(event),
                }
            }
            return Some(event);
        }
    }
}

fn convert_event(result: notify::Result<Event>) -> Option<WatchEvent> {
    let event = match result {
        Ok(event) => event,
        Err(e) => return Some(WatchEvent::Error(e.to_string())),
    };
    let path = event.paths.into_iter().next()?;

    match event.kind {
        EventKind::Create(_) | EventKind::Modify(_) => Some(WatchEvent::Changed(path)),
        EventKind::Remove(_) => Some(WatchEvent::Removed(path)),
        _ => None,
    }
}
