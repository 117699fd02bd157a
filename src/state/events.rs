/// Lifecycle events and the worker -> UI channel
///
/// The batch worker is the only producer and the UI poller the only consumer.
/// Delivery is FIFO so per-file ordering survives the hand-off.
use tokio::sync::mpsc;

use crate::error::CompressError;

/// Why a task failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The encoder could not be found or launched; the batch stops
    EncoderUnavailable,
    /// The source file vanished before it could be read
    SourceUnreadable,
    /// The encoder ran but left no output file
    OutputMissing,
}

impl FailureKind {
    /// Whether this failure ends the whole batch
    pub fn is_fatal(&self) -> bool {
        matches!(self, FailureKind::EncoderUnavailable)
    }

    /// Classify a task error. `None` for errors that are not task failures.
    pub fn of(error: &CompressError) -> Option<Self> {
        match error {
            CompressError::EncoderUnavailable { .. } => Some(FailureKind::EncoderUnavailable),
            CompressError::SourceUnreadable { .. } => Some(FailureKind::SourceUnreadable),
            CompressError::OutputMissing { .. } => Some(FailureKind::OutputMissing),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LifecycleEvent {
    FileStarted {
        name: String,
        /// 1-based position in the batch
        index: usize,
        total: usize,
        original_size_mb: f64,
    },
    DurationDetected {
        seconds: f64,
    },
    ProgressUpdated {
        percent: f64,
    },
    FileCompleted {
        name: String,
        original_mb: f64,
        compressed_mb: f64,
        saved_percent: f64,
    },
    TaskFailed {
        kind: FailureKind,
        message: String,
    },
    BatchCompleted,
}

impl LifecycleEvent {
    /// Build a TaskFailed event from a task error
    pub fn failed(kind: FailureKind, error: &CompressError) -> Self {
        LifecycleEvent::TaskFailed {
            kind,
            message: error.to_string(),
        }
    }
}

/// Anything that accepts lifecycle events
pub trait EventSink {
    fn emit(&mut self, event: LifecycleEvent);
}

pub type EventSender = mpsc::UnboundedSender<LifecycleEvent>;
pub type EventReceiver = mpsc::UnboundedReceiver<LifecycleEvent>;

pub fn create_event_channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}

impl EventSink for EventSender {
    fn emit(&mut self, event: LifecycleEvent) {
        // The receiver only goes away when the window closes mid-batch
        let _ = self.send(event);
    }
}

impl EventSink for Vec<LifecycleEvent> {
    fn emit(&mut self, event: LifecycleEvent) {
        self.push(event);
    }
}
