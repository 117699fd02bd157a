/// Input selection and destination resolution
///
/// Two ways to pick videos:
/// - a whole folder (flat scan, outputs go to a `<folder>_compressed` sibling)
/// - individual files (outputs go to `compressed/` next to the first file)
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

use super::data::VideoFile;
use crate::error::{CompressError, CompressResult};

/// Recognized video extensions, matched case-insensitively
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "avi", "mkv", "flv", "wmv"];

/// How the user picked the inputs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionMode {
    Folder,
    Files,
}

/// An ordered set of inputs plus where their outputs go
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub mode: SelectionMode,
    pub files: Vec<VideoFile>,
    pub out_dir: PathBuf,
}

/// Check whether a path has a recognized video extension
pub fn is_video(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .map(|ext| VIDEO_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}

/// List the video files directly inside `dir`, sorted by file name.
///
/// Subdirectories are not descended into.
pub fn scan_folder(dir: &Path) -> CompressResult<Vec<VideoFile>> {
    if !dir.is_dir() {
        return Err(CompressError::InvalidInputPath {
            path: dir.to_path_buf(),
        });
    }

    info!("🔍 Scanning folder: {}", dir.display());

    let mut videos = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if !entry.file_type().is_file() || !is_video(path) {
            continue;
        }

        match VideoFile::from_path(path) {
            Ok(video) => videos.push(video),
            Err(e) => debug!("Skipping {}: {}", path.display(), e),
        }
    }

    Ok(videos)
}

/// Output directory for a whole-folder selection: `<parent>/<name>_compressed`
pub fn folder_output_dir(folder: &Path) -> CompressResult<PathBuf> {
    let invalid = || CompressError::InvalidInputPath {
        path: folder.to_path_buf(),
    };
    let name = folder.file_name().ok_or_else(invalid)?;
    let parent = folder.parent().ok_or_else(invalid)?;

    Ok(parent.join(format!("{}_compressed", name.to_string_lossy())))
}

/// Output directory for individual files: `compressed/` beside the first one
pub fn files_output_dir(first: &Path) -> CompressResult<PathBuf> {
    let parent = first.parent().ok_or_else(|| CompressError::InvalidInputPath {
        path: first.to_path_buf(),
    })?;

    Ok(parent.join("compressed"))
}

impl Selection {
    /// Build a selection from a picked folder
    pub fn from_folder(folder: &Path) -> CompressResult<Self> {
        let files = scan_folder(folder)?;
        if files.is_empty() {
            return Err(CompressError::NoVideosFound {
                dir: folder.to_path_buf(),
            });
        }

        Ok(Self {
            mode: SelectionMode::Folder,
            files,
            out_dir: folder_output_dir(folder)?,
        })
    }

    /// Build a selection from individually picked files, keeping their order
    pub fn from_files(paths: &[PathBuf]) -> CompressResult<Self> {
        let first = paths.first().ok_or_else(|| CompressError::InvalidInputPath {
            path: PathBuf::new(),
        })?;
        let out_dir = files_output_dir(first)?;

        let files = paths
            .iter()
            .map(VideoFile::from_path)
            .collect::<CompressResult<Vec<_>>>()?;

        Ok(Self {
            mode: SelectionMode::Files,
            files,
            out_dir,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn touch(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, b"data").unwrap();
        path
    }

    #[test]
    fn test_is_video_case_insensitive() {
        assert!(is_video(Path::new("a.MP4")));
        assert!(is_video(Path::new("/x/y/b.MoV")));
        assert!(is_video(Path::new("c.wmv")));
        assert!(!is_video(Path::new("notes.txt")));
        assert!(!is_video(Path::new("mp4")));
        assert!(!is_video(Path::new("archive.mp4.zip")));
    }

    #[test]
    fn test_scan_returns_only_videos() {
        let dir = tempdir().unwrap();
        for name in ["one.mp4", "two.MOV", "three.avi", "readme.txt", "cover.jpg"] {
            touch(dir.path(), name);
        }

        let names: Vec<String> = scan_folder(dir.path())
            .unwrap()
            .into_iter()
            .map(|v| v.name)
            .collect();
        assert_eq!(names, vec!["one.mp4", "three.avi", "two.MOV"]);
    }

    #[test]
    fn test_scan_is_flat() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "top.mkv");
        let sub = dir.path().join("sub");
        std::fs::create_dir(&sub).unwrap();
        touch(&sub, "deep.mkv");
        std::fs::create_dir(dir.path().join("folder.mp4")).unwrap();

        let files = scan_folder(dir.path()).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].name, "top.mkv");
    }

    #[test]
    fn test_scan_rejects_non_directory() {
        let dir = tempdir().unwrap();
        let file = touch(dir.path(), "clip.mp4");
        assert!(matches!(
            scan_folder(&file),
            Err(CompressError::InvalidInputPath { .. })
        ));
    }

    #[test]
    fn test_folder_without_videos() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "notes.txt");
        assert!(matches!(
            Selection::from_folder(dir.path()),
            Err(CompressError::NoVideosFound { .. })
        ));
    }

    #[test]
    fn test_folder_selection_output_is_sibling() {
        let root = tempdir().unwrap();
        let folder = root.path().join("holiday");
        std::fs::create_dir(&folder).unwrap();
        touch(&folder, "beach.mp4");

        let selection = Selection::from_folder(&folder).unwrap();
        assert_eq!(selection.mode, SelectionMode::Folder);
        assert_eq!(selection.out_dir, root.path().join("holiday_compressed"));
    }

    #[test]
    fn test_files_selection_output_is_inside_parent() {
        let dir = tempdir().unwrap();
        let b = touch(dir.path(), "b.mp4");
        let a = touch(dir.path(), "a.mov");

        let selection = Selection::from_files(&[b, a]).unwrap();
        assert_eq!(selection.mode, SelectionMode::Files);
        assert_eq!(selection.out_dir, dir.path().join("compressed"));
        // Picked order is kept
        assert_eq!(selection.files[0].name, "b.mp4");
        assert_eq!(selection.files[1].name, "a.mov");
    }

    #[test]
    fn test_files_selection_with_missing_file() {
        let dir = tempdir().unwrap();
        let result = Selection::from_files(&[dir.path().join("gone.mp4")]);
        assert!(matches!(result, Err(CompressError::SourceUnreadable { .. })));
    }

    #[test]
    fn test_empty_files_selection() {
        assert!(matches!(
            Selection::from_files(&[]),
            Err(CompressError::InvalidInputPath { .. })
        ));
    }

    #[test]
    fn test_root_folder_has_no_sibling() {
        assert!(folder_output_dir(Path::new("/")).is_err());
    }
}
