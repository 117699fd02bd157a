/// FFmpeg process adapter
///
/// Launches the external encoder for one file and streams its stderr back
/// line by line. The `Encoder` trait is the seam the task and batch runner
/// depend on, so they can be driven without a real FFmpeg install.
use std::ffi::OsString;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::{debug, error, warn};

use crate::error::{CompressError, CompressResult};
use crate::state::settings::EncoderSettings;

pub trait Encoder {
    /// Locate the encoder executable. Called once before a batch starts.
    fn probe(&self) -> CompressResult<PathBuf>;

    /// Encode `src` into `dst`, calling `on_line` for every diagnostic line.
    /// Returns once the encoder process has exited.
    fn encode(&self, src: &Path, dst: &Path, on_line: &mut dyn FnMut(&str)) -> CompressResult<()>;
}

/// The real encoder: an `ffmpeg` child process
#[derive(Debug, Clone)]
pub struct FfmpegEncoder {
    settings: EncoderSettings,
}

impl FfmpegEncoder {
    pub fn new(settings: EncoderSettings) -> Self {
        Self { settings }
    }

    fn unavailable(&self) -> CompressError {
        CompressError::EncoderUnavailable {
            program: self.settings.program.clone(),
        }
    }
}

impl Encoder for FfmpegEncoder {
    fn probe(&self) -> CompressResult<PathBuf> {
        which::which(&self.settings.program).map_err(|e| {
            error!("❌ Encoder '{}' not found: {}", self.settings.program, e);
            self.unavailable()
        })
    }

    fn encode(&self, src: &Path, dst: &Path, on_line: &mut dyn FnMut(&str)) -> CompressResult<()> {
        let mut child = Command::new(&self.settings.program)
            .args(build_args(&self.settings, src, dst))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                error!("❌ Could not launch {}: {}", self.settings.program, e);
                self.unavailable()
            })?;

        if let Some(stderr) = child.stderr.take() {
            if let Err(e) = pump_lines(BufReader::new(stderr), on_line) {
                // Nobody is reading the pipe anymore, so the child could block on it forever
                error!("❌ Encoder stderr unreadable, stopping {}: {}", src.display(), e);
                if let Err(e) = child.kill() {
                    warn!("⚠️  Could not stop encoder: {}", e);
                }
            }
        }

        let status = child.wait()?;
        if !status.success() {
            debug!("Encoder exited with {:?} for {}", status.code(), src.display());
        }

        Ok(())
    }
}

/// Command-line arguments for one encode, program name excluded
pub fn build_args(settings: &EncoderSettings, src: &Path, dst: &Path) -> Vec<OsString> {
    let crf = settings.crf.to_string();
    let mut args: Vec<OsString> = vec!["-y".into(), "-i".into(), src.into()];
    for arg in [
        "-vcodec",
        settings.video_codec.as_str(),
        "-crf",
        crf.as_str(),
        "-preset",
        settings.preset.as_str(),
        "-acodec",
        settings.audio_codec.as_str(),
        "-b:a",
        settings.audio_bitrate.as_str(),
    ] {
        args.push(arg.into());
    }
    args.push(dst.into());
    args
}

/// Stream lines into `on_line` until EOF.
///
/// When the stream breaks mid-way the rest is still read and discarded so the
/// writer never stalls on a full pipe; only the progress lines are lost. An
/// error is returned only when even that drain fails.
pub fn pump_lines<R: BufRead>(mut reader: R, on_line: &mut dyn FnMut(&str)) -> io::Result<()> {
    if let Err(e) = for_each_line(&mut reader, on_line) {
        warn!("⚠️  Lost encoder diagnostic stream: {}", e);
        io::copy(&mut reader, &mut io::sink())?;
    }
    Ok(())
}

/// Split a byte stream into lines on `\n` or `\r`.
///
/// FFmpeg redraws its progress line with a bare carriage return, so splitting
/// on newlines alone would hold every progress update until the very end.
/// Empty lines are dropped and invalid UTF-8 is replaced, never rejected.
pub fn for_each_line<R: BufRead>(mut reader: R, on_line: &mut dyn FnMut(&str)) -> io::Result<()> {
    let mut pending: Vec<u8> = Vec::new();

    loop {
        let buf = reader.fill_buf()?;
        if buf.is_empty() {
            break;
        }
        let len = buf.len();

        for &byte in buf {
            if byte == b'\n' || byte == b'\r' {
                if !pending.is_empty() {
                    on_line(&String::from_utf8_lossy(&pending));
                    pending.clear();
                }
            } else {
                pending.push(byte);
            }
        }

        reader.consume(len);
    }

    if !pending.is_empty() {
        on_line(&String::from_utf8_lossy(&pending));
    }

    Ok(())
}
