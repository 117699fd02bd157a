/// Error types for the compressor
///
/// Every failure the batch can hit is one variant here. Parsing of the
/// encoder's diagnostic lines never produces an error, it only yields "no match".
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompressError {
    /// The encoder binary is not on PATH or could not be launched.
    /// Fatal to the whole batch.
    #[error("FFmpeg is not installed or not in your system PATH ({program})")]
    EncoderUnavailable { program: String },

    /// The source could not be stat'ed (deleted between discovery and run)
    #[error("Could not read source file {}: {source}", path.display())]
    SourceUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The encoder exited but the destination file does not exist
    #[error("Output file missing for {name}.")]
    OutputMissing { name: String },

    /// A folder scan matched no recognized video extension
    #[error("No video files found in {}", dir.display())]
    NoVideosFound { dir: PathBuf },

    #[error("Invalid input path: {}", path.display())]
    InvalidInputPath { path: PathBuf },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Settings error: {0}")]
    Settings(#[from] serde_json::Error),
}

pub type CompressResult<T> = Result<T, CompressError>;
