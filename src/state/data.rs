/// Shared data structures for the application state
///
/// These structs represent the data model that flows between
/// the batch worker and the UI layer.
use std::path::PathBuf;

use crate::error::{CompressError, CompressResult};

/// Bytes per megabyte as shown to the user
const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Convert a byte count to megabytes
pub fn human_mb(bytes: u64) -> f64 {
    bytes as f64 / BYTES_PER_MB
}

/// Space saved by compression, in percent of the original.
/// Zero when the original is empty.
pub fn saved_percent(original_bytes: u64, compressed_bytes: u64) -> f64 {
    if original_bytes == 0 {
        return 0.0;
    }
    (original_bytes as f64 - compressed_bytes as f64) / original_bytes as f64 * 100.0
}

/// A source video discovered by a folder scan or picked directly
#[derive(Debug, Clone, PartialEq)]
pub struct VideoFile {
    /// Full path to the source file
    pub path: PathBuf,
    /// Filename only (e.g., "holiday.MOV")
    pub name: String,
    /// Size in bytes at discovery time
    pub size: u64,
}

impl VideoFile {
    /// Stat `path` and build a VideoFile from it
    pub fn from_path(path: impl Into<PathBuf>) -> CompressResult<Self> {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .ok_or_else(|| CompressError::InvalidInputPath { path: path.clone() })?;
        let size = std::fs::metadata(&path)
            .map_err(|source| CompressError::SourceUnreadable {
                path: path.clone(),
                source,
            })?
            .len();

        Ok(Self { path, name, size })
    }
}

/// Aggregate counters for one batch
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchState {
    /// Number of files in the batch
    pub total: usize,
    /// Files that reached a terminal event (success or per-file failure)
    pub processed: usize,
    /// Files that compressed successfully
    pub succeeded: usize,
    /// One human-readable line per successful file, in batch order
    pub summaries: Vec<String>,
}

impl BatchState {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            ..Self::default()
        }
    }

    /// Record a successful file
    pub fn record_success(&mut self, summary: String) {
        self.processed += 1;
        self.succeeded += 1;
        self.summaries.push(summary);
    }

    /// Record a file that was attempted but produced no output
    pub fn record_failure(&mut self) {
        self.processed += 1;
    }

    /// Overall progress in percent, counting attempted files
    pub fn overall_percent(&self) -> f64 {
        self.processed as f64 / self.total.max(1) as f64 * 100.0
    }

    /// Final summary text for the end-of-batch dialog
    pub fn summary(&self) -> String {
        if self.summaries.is_empty() {
            "No files processed.".to_string()
        } else {
            self.summaries.join("\n")
        }
    }
}
