/// Diagnostic stream parsing
///
/// FFmpeg writes a `Duration: 00:01:23.45` line once while probing the input
/// and then repeats `... time=00:00:12.34 ...` progress lines while encoding.
/// This module turns those lines into seconds and a completion percentage.
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref DURATION_PATTERN: Regex =
        Regex::new(r"Duration:\s*(\d+):(\d+):(\d+(?:\.\d+)?)").unwrap();
    static ref TIME_PATTERN: Regex = Regex::new(r"time=(\d+):(\d+):(\d+(?:\.\d+)?)").unwrap();
}

/// Extract the total duration (in seconds) from one diagnostic line
pub fn parse_duration(line: &str) -> Option<f64> {
    captures_to_seconds(&DURATION_PATTERN, line)
}

/// Extract the current elapsed time (in seconds) from one diagnostic line
pub fn parse_elapsed(line: &str) -> Option<f64> {
    captures_to_seconds(&TIME_PATTERN, line)
}

fn captures_to_seconds(pattern: &Regex, line: &str) -> Option<f64> {
    let caps = pattern.captures(line)?;
    let hours: u64 = caps.get(1)?.as_str().parse().ok()?;
    let minutes: u64 = caps.get(2)?.as_str().parse().ok()?;
    let seconds: f64 = caps.get(3)?.as_str().parse().ok()?;

    // Absurdly long fields are noise, not a timestamp
    let whole = hours.checked_mul(3600)?.checked_add(minutes.checked_mul(60)?)?;
    Some(whole as f64 + seconds)
}

/// Completion percentage of `elapsed` over `total`, clamped to [0, 100].
///
/// Returns `None` when the total is unknown or not positive.
pub fn percent(elapsed: f64, total: f64) -> Option<f64> {
    if total.is_nan() || total <= 0.0 {
        return None;
    }
    Some((elapsed / total * 100.0).clamp(0.0, 100.0))
}

/// What a single line changed in the tracker
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LineUpdate {
    /// Set only on the line where the duration was first found
    pub duration: Option<f64>,
    /// Set when the line carried an elapsed time and the duration is known
    pub percent: Option<f64>,
}

/// Per-task parse state for one encoder run
#[derive(Debug, Clone, Default)]
pub struct ProgressTracker {
    total_duration: Option<f64>,
    elapsed: Option<f64>,
    percent: f64,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one diagnostic line
    pub fn feed(&mut self, line: &str) -> LineUpdate {
        let mut update = LineUpdate::default();

        // First duration wins, later ones (e.g. from a second input) are ignored
        if self.total_duration.is_none() {
            if let Some(duration) = parse_duration(line) {
                self.total_duration = Some(duration);
                update.duration = Some(duration);
            }
        }

        if let Some(elapsed) = parse_elapsed(line) {
            self.elapsed = Some(elapsed);
            if let Some(pct) = self.total_duration.and_then(|total| percent(elapsed, total)) {
                self.percent = pct;
                update.percent = Some(pct);
            }
        }

        update
    }

    pub fn total_duration(&self) -> Option<f64> {
        self.total_duration
    }

    pub fn elapsed(&self) -> Option<f64> {
        self.elapsed
    }

    /// Last computed percentage, 0 if none yet
    pub fn percent(&self) -> f64 {
        self.percent
    }
}
