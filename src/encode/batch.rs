/// Batch runner
///
/// Runs the single-file task over an ordered list of videos, one at a time,
/// and closes the batch with exactly one BatchCompleted event. A file that
/// fails on its own is skipped; an encoder that cannot be launched stops the
/// batch immediately.
use std::path::{Path, PathBuf};
use tokio::task;
use tracing::{debug, error, info, warn};

use super::encoder::{Encoder, FfmpegEncoder};
use super::task::{CompressionTask, TaskSummary};
use crate::error::{CompressError, CompressResult};
use crate::state::data::VideoFile;
use crate::state::events::{EventSender, EventSink, FailureKind, LifecycleEvent};
use crate::state::settings::EncoderSettings;

/// What happened to every file of a finished batch
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchReport {
    pub total: usize,
    pub succeeded: Vec<TaskSummary>,
    /// Names of the files that were attempted but produced nothing
    pub failed: Vec<String>,
}

impl BatchReport {
    /// Files that reached a terminal event
    pub fn processed(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }
}

pub struct BatchRunner<E: Encoder> {
    encoder: E,
}

impl<E: Encoder> BatchRunner<E> {
    pub fn new(encoder: E) -> Self {
        Self { encoder }
    }

    /// Run every file in order, writing outputs into `out_dir`.
    ///
    /// Returns `Err(EncoderUnavailable)` when the batch was aborted; in that
    /// case no BatchCompleted event is emitted.
    pub fn run(&self, files: &[VideoFile], out_dir: &Path, sink: &mut dyn EventSink) -> CompressResult<BatchReport> {
        if let Err(e) = self.encoder.probe() {
            sink.emit(LifecycleEvent::failed(FailureKind::EncoderUnavailable, &e));
            return Err(e);
        }

        // Tasks whose encoder cannot write there will end as OutputMissing
        if let Err(e) = std::fs::create_dir_all(out_dir) {
            warn!("⚠️  Could not create {}: {}", out_dir.display(), e);
        }

        info!(
            "🛠️ Starting compression of {} file(s) → {}",
            files.len(),
            out_dir.display()
        );

        let total = files.len();
        let mut report = BatchReport {
            total,
            ..BatchReport::default()
        };

        for (i, file) in files.iter().enumerate() {
            let destination = out_dir.join(&file.name);
            let mut task = CompressionTask::new(file.path.clone(), destination, i + 1, total);

            let result = task.run(&self.encoder, sink);
            debug!(
                "{} ended at {:.1}% (duration {:?}s)",
                file.name,
                task.percent(),
                task.total_duration()
            );

            match result {
                Ok(summary) => report.succeeded.push(summary),
                Err(e @ CompressError::EncoderUnavailable { .. }) => {
                    error!("❌ Aborting batch after {} of {} file(s)", i, total);
                    return Err(e);
                }
                Err(_) => report.failed.push(file.name.clone()),
            }
        }

        info!(
            "✅ All done! {} of {} file(s) compressed",
            report.succeeded.len(),
            total
        );
        sink.emit(LifecycleEvent::BatchCompleted);

        Ok(report)
    }
}

/// Run a batch on the blocking thread pool, streaming events into `sender`.
///
/// Returns the error text when the batch was aborted, so it can travel in a
/// UI message.
pub async fn run_batch_async(
    files: Vec<VideoFile>,
    out_dir: PathBuf,
    settings: EncoderSettings,
    sender: EventSender,
) -> Result<BatchReport, String> {
    // The worker blocks on the encoder's stderr for the whole run
    task::spawn_blocking(move || {
        let mut sender = sender;
        BatchRunner::new(FfmpegEncoder::new(settings))
            .run(&files, &out_dir, &mut sender)
            .map_err(|e| e.to_string())
    })
    .await
    .map_err(|e| format!("Task join error: {}", e))?
}
