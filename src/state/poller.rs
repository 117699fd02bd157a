/// UI-side state and the event poller
///
/// `AppState` is everything the window shows. It is owned by the UI thread
/// and only ever changed by applying lifecycle events drained from the
/// channel on a fixed tick.
use chrono::Local;
use std::path::Path;
use std::time::Duration;
use tokio::sync::mpsc::error::TryRecvError;

use super::data::BatchState;
use super::events::{EventReceiver, LifecycleEvent};

/// How often the UI drains the event channel
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Severity of a modal notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// A modal dialog the presentation layer should show
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub message: String,
}

impl Notice {
    pub fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            title: title.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AppState {
    /// A batch is in flight; selection buttons are disabled
    pub running: bool,
    pub current_file: Option<String>,
    /// Total duration of the current file, once known
    pub current_duration: Option<f64>,
    /// Progress of the current file (0-100)
    pub file_percent: f64,
    pub batch: BatchState,
    /// Log lines, oldest first
    pub log: Vec<String>,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset everything for a new batch of `total` files
    pub fn begin_batch(&mut self, total: usize, out_dir: &Path) {
        self.running = true;
        self.current_file = None;
        self.current_duration = None;
        self.file_percent = 0.0;
        self.batch = BatchState::new(total);
        self.push_log(format!(
            "🛠️ Starting compression of {} file(s) → {}",
            total,
            out_dir.display()
        ));
    }

    pub fn push_log(&mut self, line: impl Into<String>) {
        self.log
            .push(format!("[{}] {}", Local::now().format("%H:%M:%S"), line.into()));
    }

    pub fn current_file_label(&self) -> String {
        match &self.current_file {
            Some(label) => format!("Current file: {}", label),
            None => "Current file: —".to_string(),
        }
    }

    /// Total duration of the current file as `H:MM:SS`, once known
    pub fn duration_label(&self) -> String {
        match self.current_duration {
            Some(seconds) => {
                let whole = seconds.max(0.0) as u64;
                format!(
                    "Duration: {}:{:02}:{:02}",
                    whole / 3600,
                    whole / 60 % 60,
                    whole % 60
                )
            }
            None => "Duration: —".to_string(),
        }
    }

    pub fn file_progress_label(&self) -> String {
        format!("File progress: {:.2}%", self.file_percent)
    }

    pub fn overall_label(&self) -> String {
        format!(
            "Overall progress: {:.2}% ({}/{})",
            self.batch.overall_percent(),
            self.batch.processed,
            self.batch.total
        )
    }

    /// Apply one event. Returns a notice when the event needs a dialog.
    pub fn apply(&mut self, event: LifecycleEvent) -> Option<Notice> {
        match event {
            LifecycleEvent::FileStarted {
                name,
                index,
                total,
                original_size_mb,
            } => {
                self.current_file = Some(format!("({}/{}) {}", index, total, name));
                self.current_duration = None;
                self.file_percent = 0.0;
                self.push_log(format!("• {} — Original: {:.2} MB", name, original_size_mb));
                None
            }
            LifecycleEvent::DurationDetected { seconds } => {
                self.current_duration = Some(seconds);
                None
            }
            LifecycleEvent::ProgressUpdated { percent } => {
                self.file_percent = percent;
                None
            }
            LifecycleEvent::FileCompleted {
                name,
                original_mb,
                compressed_mb,
                saved_percent,
            } => {
                self.batch.record_success(format!(
                    "{} — {:.2} MB → {:.2} MB (Saved {:.1}%)",
                    name, original_mb, compressed_mb, saved_percent
                ));
                self.push_log(format!(
                    "  ↳ Compressed: {:.2} MB (saved {:.1}%)",
                    compressed_mb, saved_percent
                ));
                None
            }
            LifecycleEvent::TaskFailed { kind, message } => {
                self.push_log(format!("ERROR: {}", message));
                if kind.is_fatal() {
                    self.running = false;
                    Some(Notice::error("FFmpeg Not Found", message))
                } else {
                    self.batch.record_failure();
                    None
                }
            }
            LifecycleEvent::BatchCompleted => {
                self.running = false;
                self.current_file = None;
                let summary = self.batch.summary();
                self.push_log(format!("✅ All done!\n{}", summary));
                Some(Notice::info(
                    "Compression Summary",
                    format!("All videos processed.\n\n{}", summary),
                ))
            }
        }
    }
}

/// Drain every pending event into `state` without blocking.
///
/// Returns the notices raised, in event order, and whether the producer has
/// hung up.
pub fn drain(receiver: &mut EventReceiver, state: &mut AppState) -> (Vec<Notice>, bool) {
    let mut notices = Vec::new();
    loop {
        match receiver.try_recv() {
            Ok(event) => notices.extend(state.apply(event)),
            Err(TryRecvError::Empty) => return (notices, false),
            Err(TryRecvError::Disconnected) => return (notices, true),
        }
    }
}
