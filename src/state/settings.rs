/// Encoder settings
///
/// The compression parameters are fixed per run. They are kept in one struct
/// so they can be persisted as JSON and handed to the encoder as a unit.
/// Left at defaults, the encoder is invoked exactly as the stock behaviour:
/// libx264 at CRF 28 with the `slow` preset, AAC audio at 128k.
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::error::{CompressError, CompressResult};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct EncoderSettings {
    /// Executable name or path, resolved through PATH
    pub program: String,
    /// Video codec passed to `-vcodec`
    pub video_codec: String,
    /// Constant rate factor (lower = higher quality, larger size; typical 23-28)
    pub crf: u8,
    /// faster | fast | medium | slow | slower | veryslow
    pub preset: String,
    /// Audio codec passed to `-acodec`
    pub audio_codec: String,
    /// Audio bitrate passed to `-b:a`
    pub audio_bitrate: String,
}

impl Default for EncoderSettings {
    fn default() -> Self {
        Self {
            program: "ffmpeg".to_string(),
            video_codec: "libx264".to_string(),
            crf: 28,
            preset: "slow".to_string(),
            audio_codec: "aac".to_string(),
            audio_bitrate: "128k".to_string(),
        }
    }
}

impl EncoderSettings {
    /// Convert to JSON string for the settings file
    pub fn to_json(&self) -> CompressResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse from JSON string (missing fields fall back to defaults)
    pub fn from_json(json: &str) -> CompressResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Get the path where the settings file lives:
    /// - Linux: ~/.config/video-compressor/settings.json
    /// - macOS: ~/Library/Application Support/video-compressor/settings.json
    /// - Windows: %APPDATA%\video-compressor\settings.json
    pub fn default_path() -> Option<PathBuf> {
        let mut path = dirs::config_dir().or_else(dirs::home_dir)?;
        path.push("video-compressor");
        path.push("settings.json");
        Some(path)
    }

    /// Load settings from `path`.
    ///
    /// A missing file is not an error. An unreadable or invalid file is logged
    /// and replaced by the defaults.
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(path)
            .map_err(CompressError::from)
            .and_then(|json| Self::from_json(&json))
        {
            Ok(settings) => {
                info!("⚙️  Loaded encoder settings from {}", path.display());
                settings
            }
            Err(e) => {
                warn!("⚠️  Ignoring settings file {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Load from the default settings location
    pub fn load() -> Self {
        match Self::default_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    pub fn save_to(&self, path: &Path) -> CompressResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_match_stock_parameters() {
        let settings = EncoderSettings::default();
        assert_eq!(settings.program, "ffmpeg");
        assert_eq!(settings.video_codec, "libx264");
        assert_eq!(settings.crf, 28);
        assert_eq!(settings.preset, "slow");
        assert_eq!(settings.audio_codec, "aac");
        assert_eq!(settings.audio_bitrate, "128k");
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let settings = EncoderSettings::from_json(r#"{ "crf": 23 }"#).unwrap();
        assert_eq!(settings.crf, 23);
        assert_eq!(settings.preset, "slow");
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let settings = EncoderSettings::load_from(&dir.path().join("nope.json"));
        assert_eq!(settings, EncoderSettings::default());
    }

    #[test]
    fn test_invalid_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert_eq!(EncoderSettings::load_from(&path), EncoderSettings::default());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");

        let mut settings = EncoderSettings::default();
        settings.preset = "medium".to_string();
        settings.save_to(&path).unwrap();

        assert_eq!(EncoderSettings::load_from(&path), settings);
    }
}
