/// Video encoding module
///
/// This module handles:
/// - Parsing FFmpeg's diagnostic stream into duration and progress (progress.rs)
/// - Launching the encoder process (encoder.rs)
/// - Compressing a single file (task.rs)
/// - Running a whole batch sequentially (batch.rs)

pub mod batch;
pub mod encoder;
pub mod progress;
pub mod task;

pub use batch::run_batch_async;
