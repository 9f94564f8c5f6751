//! File I/O with atomic writes
//!
//! Export artifacts and persisted preferences are written through a temp
//! file in the same directory followed by a rename, so a reader never sees
//! a half-written file.

use crate::error::{FileError, FileResult};
use std::io::Write;
use std::path::Path;
use std::time::SystemTime;

/// Maximum markdown file size accepted by the command line (10 MB)
pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Read a markdown file as UTF-8, replacing invalid sequences
pub fn read_markdown(path: impl AsRef<Path>) -> FileResult<String> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(FileError::NotFound(path.to_path_buf()));
    }

    let bytes = std::fs::read(path).map_err(|e| FileError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;

    if bytes.len() as u64 > MAX_FILE_SIZE {
        log::warn!(
            "{} is {} bytes, larger than {} bytes",
            path.display(),
            bytes.len(),
            MAX_FILE_SIZE
        );
    }

    // Strip a UTF-8 BOM if present
    let bytes = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(&bytes);
    Ok(String::from_utf8_lossy(bytes).into_owned())
}

/// Write bytes to a file using atomic write
///
/// This ensures the file is either fully written or unchanged,
/// preventing data loss from interrupted writes.
pub fn write_file_atomic_sync(path: impl AsRef<Path>, content: &[u8]) -> FileResult<()> {
    let path = path.as_ref();
    let path_buf = path.to_path_buf();

    // Generate temp filename in same directory
    let parent = path.parent().unwrap_or(Path::new("."));
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "file".to_string());

    let timestamp = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);

    let temp_path = parent.join(format!(".{}.{}.tmp", filename, timestamp));

    // Write to temp file
    let write_result = (|| {
        let mut file = std::fs::File::create(&temp_path)?;
        file.write_all(content)?;
        file.flush()?;
        file.sync_all()?;
        Ok::<(), std::io::Error>(())
    })();

    if let Err(e) = write_result {
        // Clean up temp file on failure
        let _ = std::fs::remove_file(&temp_path);
        return Err(FileError::WriteError {
            path: path_buf,
            source: e,
        });
    }

    // Atomic rename
    if let Err(e) = std::fs::rename(&temp_path, path) {
        let _ = std::fs::remove_file(&temp_path);
        return Err(FileError::WriteError {
            path: path_buf,
            source: e,
        });
    }

    Ok(())
}

/// Ensure a directory exists
pub fn ensure_dir(path: impl AsRef<Path>) -> FileResult<()> {
    let path = path.as_ref();
    if !path.exists() {
        std::fs::create_dir_all(path).map_err(|e| FileError::DirectoryError {
            path: path.to_path_buf(),
            source: e,
        })?;
    }
    Ok(())
}
