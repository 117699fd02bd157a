/// Single-file compression task
///
/// Runs the encoder against one source file and reports its lifecycle:
/// FileStarted, an optional DurationDetected, any number of ProgressUpdated,
/// then exactly one of FileCompleted or TaskFailed.
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::encoder::Encoder;
use super::progress::ProgressTracker;
use crate::error::{CompressError, CompressResult};
use crate::state::data::{human_mb, saved_percent};
use crate::state::events::{EventSink, FailureKind, LifecycleEvent};

/// Outcome of a successful task
#[derive(Debug, Clone, PartialEq)]
pub struct TaskSummary {
    pub name: String,
    pub original_bytes: u64,
    pub compressed_bytes: u64,
    pub saved_percent: f64,
}

impl TaskSummary {
    pub fn original_mb(&self) -> f64 {
        human_mb(self.original_bytes)
    }

    pub fn compressed_mb(&self) -> f64 {
        human_mb(self.compressed_bytes)
    }
}

/// One file's encode attempt
#[derive(Debug)]
pub struct CompressionTask {
    pub source: PathBuf,
    pub destination: PathBuf,
    /// 1-based position in the batch
    pub index: usize,
    pub total: usize,
    original_size: u64,
    tracker: ProgressTracker,
}

impl CompressionTask {
    pub fn new(source: PathBuf, destination: PathBuf, index: usize, total: usize) -> Self {
        Self {
            source,
            destination,
            index,
            total,
            original_size: 0,
            tracker: ProgressTracker::new(),
        }
    }

    /// Filename of the source as shown to the user
    pub fn name(&self) -> String {
        display_name(&self.source)
    }

    /// Detected total duration, once the encoder has reported it
    pub fn total_duration(&self) -> Option<f64> {
        self.tracker.total_duration()
    }

    pub fn percent(&self) -> f64 {
        self.tracker.percent()
    }

    /// Run the task to its terminal event.
    ///
    /// The terminal event is always emitted before returning, including on
    /// error, so the caller only needs the result to decide whether the
    /// batch can go on.
    pub fn run(&mut self, encoder: &dyn Encoder, sink: &mut dyn EventSink) -> CompressResult<TaskSummary> {
        match self.execute(encoder, sink) {
            Ok(summary) => {
                info!(
                    "✅ {}: {:.2} MB → {:.2} MB (saved {:.1}%)",
                    summary.name,
                    summary.original_mb(),
                    summary.compressed_mb(),
                    summary.saved_percent
                );
                sink.emit(LifecycleEvent::FileCompleted {
                    name: summary.name.clone(),
                    original_mb: summary.original_mb(),
                    compressed_mb: summary.compressed_mb(),
                    saved_percent: summary.saved_percent,
                });
                Ok(summary)
            }
            Err(e) => {
                // Anything outside the task taxonomy still ends this file only
                let kind = FailureKind::of(&e).unwrap_or(FailureKind::OutputMissing);
                warn!("⚠️  {} failed: {}", self.name(), e);
                sink.emit(LifecycleEvent::failed(kind, &e));
                Err(e)
            }
        }
    }

    fn execute(&mut self, encoder: &dyn Encoder, sink: &mut dyn EventSink) -> CompressResult<TaskSummary> {
        let name = self.name();

        let metadata = std::fs::metadata(&self.source);
        self.original_size = metadata.as_ref().map_or(0, |meta| meta.len());

        // Every file gets its FileStarted, even one that vanished since the scan
        sink.emit(LifecycleEvent::FileStarted {
            name: name.clone(),
            index: self.index,
            total: self.total,
            original_size_mb: human_mb(self.original_size),
        });
        if let Err(source) = metadata {
            return Err(CompressError::SourceUnreadable {
                path: self.source.clone(),
                source,
            });
        }
        info!(
            "🔄 Compressing ({}/{}): {} ({:.2} MB)",
            self.index,
            self.total,
            name,
            human_mb(self.original_size)
        );

        // Success is judged by the destination existing afterwards, so a stale
        // file from an earlier run must not count
        remove_stale(&self.destination)?;

        let tracker = &mut self.tracker;
        let encoded = encoder.encode(&self.source, &self.destination, &mut |line| {
            let update = tracker.feed(line);
            if let Some(seconds) = update.duration {
                debug!("Duration detected: {:.2}s", seconds);
                sink.emit(LifecycleEvent::DurationDetected { seconds });
            }
            if let Some(percent) = update.percent {
                debug!("Progress: {:.2}%", percent);
                sink.emit(LifecycleEvent::ProgressUpdated { percent });
            }
        });

        debug!(
            "{} stream ended at {:?}s of {:?}s",
            name,
            tracker.elapsed(),
            tracker.total_duration()
        );

        match encoded {
            Err(e @ CompressError::EncoderUnavailable { .. }) => return Err(e),
            // The exit status is not trusted either way, only the output file is
            Err(e) => warn!("⚠️  Encoder did not exit cleanly for {}: {}", name, e),
            Ok(()) => {}
        }

        let compressed_size = match std::fs::metadata(&self.destination) {
            Ok(meta) => meta.len(),
            Err(_) => return Err(CompressError::OutputMissing { name }),
        };

        Ok(TaskSummary {
            name,
            original_bytes: self.original_size,
            compressed_bytes: compressed_size,
            saved_percent: saved_percent(self.original_size, compressed_size),
        })
    }
}

/// Filename of `path`, or the whole path when it has none
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

fn remove_stale(path: &Path) -> CompressResult<()> {
    match std::fs::remove_file(path) {
        Ok(()) => {
            debug!("Removed existing output {}", path.display());
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::cell::RefCell;
    use tempfile::tempdir;

    /// Replays canned diagnostic lines and optionally writes an output file
    pub(crate) struct FakeEncoder {
        pub lines: Vec<String>,
        /// Output size per call, `None` simulates a crash with no output
        pub outputs: RefCell<Vec<Option<u64>>>,
        pub available: bool,
        /// 1-based encode call that fails to launch, after a successful probe
        pub fail_launch_at: Option<usize>,
        pub calls: RefCell<Vec<PathBuf>>,
    }

    impl FakeEncoder {
        pub(crate) fn new(outputs: Vec<Option<u64>>) -> Self {
            Self {
                lines: vec![
                    "Input #0, mov,mp4,m4a,3gp,3g2,mj2, from 'in.mp4':".to_string(),
                    "  Duration: 00:00:10.00, start: 0.000000, bitrate: 1000 kb/s".to_string(),
                    "frame=  50 fps=0.0 q=28.0 size=     256kB time=00:00:02.50 bitrate= 838.9kbits/s".to_string(),
                    "frame= 100 fps= 99 q=28.0 size=     512kB time=00:00:05.00 bitrate= 838.9kbits/s".to_string(),
                    "frame= 250 fps= 99 q=-1.0 Lsize=   1024kB time=00:00:10.40 bitrate= 806.6kbits/s".to_string(),
                ],
                outputs: RefCell::new(outputs),
                available: true,
                fail_launch_at: None,
                calls: RefCell::new(Vec::new()),
            }
        }

        pub(crate) fn unavailable() -> Self {
            let mut encoder = Self::new(Vec::new());
            encoder.available = false;
            encoder
        }
    }

    impl Encoder for FakeEncoder {
        fn probe(&self) -> CompressResult<PathBuf> {
            if self.available {
                Ok(PathBuf::from("/usr/bin/ffmpeg"))
            } else {
                Err(CompressError::EncoderUnavailable {
                    program: "ffmpeg".to_string(),
                })
            }
        }

        fn encode(&self, src: &Path, dst: &Path, on_line: &mut dyn FnMut(&str)) -> CompressResult<()> {
            if !self.available {
                return Err(CompressError::EncoderUnavailable {
                    program: "ffmpeg".to_string(),
                });
            }
            self.calls.borrow_mut().push(src.to_path_buf());
            if self.fail_launch_at == Some(self.calls.borrow().len()) {
                return Err(CompressError::EncoderUnavailable {
                    program: "ffmpeg".to_string(),
                });
            }
            for line in &self.lines {
                on_line(line);
            }
            let output = {
                let mut outputs = self.outputs.borrow_mut();
                if outputs.is_empty() {
                    None
                } else {
                    outputs.remove(0)
                }
            };
            if let Some(size) = output {
                std::fs::File::create(dst)?.set_len(size)?;
            }
            Ok(())
        }
    }

    fn write_source(dir: &Path, name: &str, size: usize) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, vec![1u8; size]).unwrap();
        path
    }

    #[test]
    fn test_successful_task_event_sequence() {
        let dir = tempdir().unwrap();
        let src = write_source(dir.path(), "clip.mp4", 1000);
        let dst = dir.path().join("clip_out.mp4");
        let encoder = FakeEncoder::new(vec![Some(400)]);

        let mut events = Vec::new();
        let mut task = CompressionTask::new(src, dst.clone(), 1, 3);
        let summary = task.run(&encoder, &mut events).unwrap();

        assert_eq!(summary.original_bytes, 1000);
        assert_eq!(summary.compressed_bytes, 400);
        assert!((summary.saved_percent - 60.0).abs() < 1e-9);
        assert!(dst.exists());
        assert_eq!(task.total_duration(), Some(10.0));
        assert_eq!(task.percent(), 100.0);

        assert_eq!(
            events[0],
            LifecycleEvent::FileStarted {
                name: "clip.mp4".to_string(),
                index: 1,
                total: 3,
                original_size_mb: human_mb(1000),
            }
        );
        assert_eq!(events[1], LifecycleEvent::DurationDetected { seconds: 10.0 });
        assert_eq!(events[2], LifecycleEvent::ProgressUpdated { percent: 25.0 });
        assert_eq!(events[3], LifecycleEvent::ProgressUpdated { percent: 50.0 });
        // Over-reported final time is clamped
        assert_eq!(events[4], LifecycleEvent::ProgressUpdated { percent: 100.0 });
        assert!(matches!(
            &events[5],
            LifecycleEvent::FileCompleted { name, .. } if name == "clip.mp4"
        ));
        assert_eq!(events.len(), 6);
    }

    #[test]
    fn test_missing_output_fails_task() {
        let dir = tempdir().unwrap();
        let src = write_source(dir.path(), "broken.mov", 10);
        let encoder = FakeEncoder::new(vec![None]);

        let mut events = Vec::new();
        let mut task = CompressionTask::new(src, dir.path().join("out.mov"), 1, 1);
        let result = task.run(&encoder, &mut events);

        assert!(matches!(result, Err(CompressError::OutputMissing { .. })));
        assert!(matches!(events.first(), Some(LifecycleEvent::FileStarted { .. })));
        assert_eq!(
            events.last(),
            Some(&LifecycleEvent::TaskFailed {
                kind: FailureKind::OutputMissing,
                message: "Output file missing for broken.mov.".to_string(),
            })
        );
    }

    #[test]
    fn test_stale_output_does_not_count_as_success() {
        let dir = tempdir().unwrap();
        let src = write_source(dir.path(), "clip.mp4", 10);
        let dst = dir.path().join("clip_out.mp4");
        std::fs::write(&dst, b"old run").unwrap();
        let encoder = FakeEncoder::new(vec![None]);

        let mut events = Vec::new();
        let result = CompressionTask::new(src, dst.clone(), 1, 1).run(&encoder, &mut events);

        assert!(matches!(result, Err(CompressError::OutputMissing { .. })));
        assert!(!dst.exists());
    }

    #[test]
    fn test_unreadable_source_is_started_then_failed() {
        let dir = tempdir().unwrap();
        let encoder = FakeEncoder::new(vec![Some(1)]);

        let mut events = Vec::new();
        let mut task = CompressionTask::new(
            dir.path().join("deleted.mp4"),
            dir.path().join("out.mp4"),
            1,
            1,
        );
        let result = task.run(&encoder, &mut events);

        assert!(matches!(result, Err(CompressError::SourceUnreadable { .. })));
        assert_eq!(events.len(), 2);
        assert_eq!(
            events[0],
            LifecycleEvent::FileStarted {
                name: "deleted.mp4".to_string(),
                index: 1,
                total: 1,
                original_size_mb: 0.0,
            }
        );
        assert!(matches!(
            events[1],
            LifecycleEvent::TaskFailed {
                kind: FailureKind::SourceUnreadable,
                ..
            }
        ));
        assert!(encoder.calls.borrow().is_empty());
    }

    #[test]
    fn test_empty_source_saves_nothing() {
        let dir = tempdir().unwrap();
        let src = write_source(dir.path(), "empty.mp4", 0);
        let encoder = FakeEncoder::new(vec![Some(128)]);

        let mut events = Vec::new();
        let summary = CompressionTask::new(src, dir.path().join("o.mp4"), 1, 1)
            .run(&encoder, &mut events)
            .unwrap();
        assert_eq!(summary.saved_percent, 0.0);
    }

    #[test]
    fn test_no_progress_before_duration() {
        let dir = tempdir().unwrap();
        let src = write_source(dir.path(), "clip.mp4", 10);
        let mut encoder = FakeEncoder::new(vec![Some(5)]);
        encoder.lines = vec![
            "frame=1 time=00:00:01.00".to_string(),
            "frame=2 time=00:00:02.00".to_string(),
        ];

        let mut events = Vec::new();
        CompressionTask::new(src, dir.path().join("o.mp4"), 1, 1)
            .run(&encoder, &mut events)
            .unwrap();

        assert!(!events
            .iter()
            .any(|e| matches!(e, LifecycleEvent::ProgressUpdated { .. })));
        assert_eq!(events.len(), 2);
    }
}
