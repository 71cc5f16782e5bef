//! The media directory: where MP3 files and thumbnails live, and how they are named.

use anyhow::Context;
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::extractors::MediaInfo;
use crate::utils::{is_filename_char, sanitize_filename};
use crate::{GrabberError, Result};

const MP3_EXTENSION: &str = "mp3";
const THUMBNAIL_EXTENSION: &str = "jpg";
// `_` never survives sanitizing, so scratch names cannot collide with titles
const SCRATCH_PREFIX: &str = "_fetch-";

/// An MP3 file already present in the library
#[derive(Debug, Clone)]
pub struct MediaEntry {
    pub filename: String,
    pub size: u64,
    pub modified: Option<DateTime<Local>>,
}

/// Filesystem-backed store of fetched media
#[derive(Debug, Clone)]
pub struct MediaLibrary {
    root: PathBuf,
}

impl MediaLibrary {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the media directory if it does not exist yet
    pub async fn ensure_exists(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .with_context(|| format!("Failed to create media directory {}", self.root.display()))
    }

    /// Derive the MP3 filename for resolved media.
    ///
    /// Falls back to the extractor id when the title has nothing usable left
    /// after sanitizing.
    pub fn mp3_filename(info: &MediaInfo) -> Result<String> {
        let from_title = sanitize_filename(&format!("{}.{}", info.title, MP3_EXTENSION));
        if has_usable_stem(&from_title) {
            return Ok(from_title);
        }

        let from_id = sanitize_filename(&format!("{}.{}", info.id, MP3_EXTENSION));
        if has_usable_stem(&from_id) {
            return Ok(from_id);
        }

        Err(GrabberError::UnusableTitle(info.title.clone()).into())
    }

    /// Thumbnail filename stored alongside an MP3
    pub fn thumbnail_filename(filename: &str) -> String {
        let stem = match filename.rfind('.') {
            Some(dot) if dot > 0 => &filename[..dot],
            _ => filename,
        };
        format!("{}.{}", stem, THUMBNAIL_EXTENSION)
    }

    /// Whether a requested name can refer to a file in the library.
    ///
    /// Only names made of sanitized characters qualify, which rules out path
    /// separators and therefore any traversal out of the media directory.
    pub fn is_safe_name(name: &str) -> bool {
        !name.is_empty()
            && name != "."
            && name != ".."
            && name.chars().all(is_filename_char)
    }

    /// Path of a file in the library, or `None` if the name is unsafe
    pub fn path_for(&self, name: &str) -> Option<PathBuf> {
        Self::is_safe_name(name).then(|| self.root.join(name))
    }

    /// Whether a regular file with this name exists in the library
    pub async fn contains(&self, name: &str) -> bool {
        match self.path_for(name) {
            Some(path) => tokio::fs::metadata(&path)
                .await
                .map(|meta| meta.is_file())
                .unwrap_or(false),
            None => false,
        }
    }

    /// Open a library file for reading; `None` when it does not exist
    pub async fn open(&self, name: &str) -> Option<tokio::fs::File> {
        let path = self.path_for(name)?;
        let meta = tokio::fs::metadata(&path).await.ok()?;
        if !meta.is_file() {
            return None;
        }

        match tokio::fs::File::open(&path).await {
            Ok(file) => Some(file),
            Err(err) => {
                tracing::warn!("Cannot open {}: {}", path.display(), err);
                None
            }
        }
    }

    /// Create a scratch directory for one fetch.
    ///
    /// It lives inside the media directory so finished files can be renamed
    /// into place; it is removed when the returned handle is dropped.
    pub fn scratch_dir(&self) -> Result<TempDir> {
        tempfile::Builder::new()
            .prefix(SCRATCH_PREFIX)
            .tempdir_in(&self.root)
            .context("Failed to create scratch directory")
    }

    /// Move a finished file into the library under `name`
    pub async fn install(&self, source: &Path, name: &str) -> Result<PathBuf> {
        let target = self
            .path_for(name)
            .ok_or_else(|| anyhow::anyhow!("Refusing to store unsafe filename {:?}", name))?;

        tokio::fs::rename(source, &target)
            .await
            .with_context(|| format!("Failed to move {} into {}", source.display(), target.display()))?;

        Ok(target)
    }

    /// List MP3 files, newest first
    pub async fn list_mp3(&self) -> Result<Vec<MediaEntry>> {
        let mut entries = Vec::new();

        let mut dir = match tokio::fs::read_dir(&self.root).await {
            Ok(dir) => dir,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(entries),
            Err(err) => {
                return Err(err).with_context(|| format!("Failed to list {}", self.root.display()))
            }
        };

        while let Some(entry) = dir.next_entry().await? {
            let Ok(filename) = entry.file_name().into_string() else {
                continue;
            };
            if !Self::is_safe_name(&filename) || !is_mp3(&filename) {
                continue;
            }

            let meta = entry.metadata().await?;
            if !meta.is_file() {
                continue;
            }

            entries.push(MediaEntry {
                filename,
                size: meta.len(),
                modified: meta.modified().ok().map(DateTime::<Local>::from),
            });
        }

        entries.sort_by(|a, b| b.modified.cmp(&a.modified).then_with(|| a.filename.cmp(&b.filename)));
        Ok(entries)
    }
}

/// Whether a filename carries the MP3 extension
pub fn is_mp3(filename: &str) -> bool {
    Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case(MP3_EXTENSION))
        .unwrap_or(false)
}

/// Content type used when serving a library file
pub fn content_type_for(filename: &str) -> &'static str {
    let ext = Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());

    match ext.as_deref() {
        Some("mp3") => "audio/mpeg",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}

fn has_usable_stem(filename: &str) -> bool {
    filename
        .strip_suffix(&format!(".{}", MP3_EXTENSION))
        .map(|stem| stem.chars().any(|c| c.is_ascii_alphanumeric()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(title: &str, id: &str) -> MediaInfo {
        MediaInfo {
            id: id.to_string(),
            title: title.to_string(),
            original_url: "https://example.com/watch?v=1".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_mp3_filename_from_title() {
        let name = MediaLibrary::mp3_filename(&info("Daft Punk - One More Time (Official Video)", "x")).unwrap();
        assert_eq!(name, "Daft Punk - One More Time Official Video.mp3");
    }

    #[test]
    fn test_mp3_filename_strips_separators() {
        let name = MediaLibrary::mp3_filename(&info("../../etc/passwd", "x")).unwrap();
        assert!(!name.contains('/'));
        assert_eq!(name, "....etcpasswd.mp3");
        assert!(MediaLibrary::is_safe_name(&name));
    }

    #[test]
    fn test_mp3_filename_falls_back_to_id() {
        let name = MediaLibrary::mp3_filename(&info("日本語のタイトル", "abc_123")).unwrap();
        assert_eq!(name, "abc123.mp3");

        assert!(MediaLibrary::mp3_filename(&info("???", "")).is_err());
    }

    #[test]
    fn test_thumbnail_filename() {
        assert_eq!(MediaLibrary::thumbnail_filename("Song.mp3"), "Song.jpg");
        assert_eq!(MediaLibrary::thumbnail_filename("a.mp3 remix.mp3"), "a.mp3 remix.jpg");
        assert_eq!(MediaLibrary::thumbnail_filename("noext"), "noext.jpg");
    }

    #[test]
    fn test_is_safe_name() {
        assert!(MediaLibrary::is_safe_name("Song 1.mp3"));
        assert!(!MediaLibrary::is_safe_name(""));
        assert!(!MediaLibrary::is_safe_name(".."));
        assert!(!MediaLibrary::is_safe_name("../secret.mp3"));
        assert!(!MediaLibrary::is_safe_name("dir/file.mp3"));
        assert!(!MediaLibrary::is_safe_name("..\\file.mp3"));
        assert!(!MediaLibrary::is_safe_name("_fetch-abc"));
        assert!(MediaLibrary::is_safe_name(".fetch-me.mp3"));
    }

    #[test]
    fn test_content_type_for() {
        assert_eq!(content_type_for("Song.mp3"), "audio/mpeg");
        assert_eq!(content_type_for("Song.MP3"), "audio/mpeg");
        assert_eq!(content_type_for("Song.jpg"), "image/jpeg");
        assert_eq!(content_type_for("notes"), "application/octet-stream");
    }

    #[tokio::test]
    async fn test_contains_and_open() {
        let dir = tempfile::tempdir().unwrap();
        let library = MediaLibrary::new(dir.path());
        fs_err::write(dir.path().join("Song.mp3"), b"ID3").unwrap();
        fs_err::create_dir(dir.path().join("folder.mp3")).unwrap();

        assert!(library.contains("Song.mp3").await);
        assert!(!library.contains("Other.mp3").await);
        assert!(!library.contains("folder.mp3").await);
        assert!(library.open("Song.mp3").await.is_some());
        assert!(library.open("folder.mp3").await.is_none());
    }

    #[tokio::test]
    async fn test_install_moves_file_into_place() {
        let dir = tempfile::tempdir().unwrap();
        let library = MediaLibrary::new(dir.path());
        let scratch = library.scratch_dir().unwrap();
        let staged = scratch.path().join("out.mp3");
        fs_err::write(&staged, b"mp3 data").unwrap();

        let installed = library.install(&staged, "Final.mp3").await.unwrap();
        assert_eq!(installed, dir.path().join("Final.mp3"));
        assert!(!staged.exists());
        assert!(library.contains("Final.mp3").await);

        assert!(library.install(&installed, "../escape.mp3").await.is_err());
    }

    #[tokio::test]
    async fn test_list_mp3_skips_other_files() {
        let dir = tempfile::tempdir().unwrap();
        let library = MediaLibrary::new(dir.path());
        fs_err::write(dir.path().join("One.mp3"), b"1").unwrap();
        fs_err::write(dir.path().join("One.jpg"), b"jpg").unwrap();
        fs_err::write(dir.path().join("Two.mp3"), b"22").unwrap();
        let _scratch = library.scratch_dir().unwrap();

        let entries = library.list_mp3().await.unwrap();
        let mut names: Vec<_> = entries.iter().map(|e| e.filename.as_str()).collect();
        names.sort();
        assert_eq!(names, vec!["One.mp3", "Two.mp3"]);
    }

    #[tokio::test]
    async fn test_list_mp3_missing_directory_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let library = MediaLibrary::new(dir.path().join("missing"));
        assert!(library.list_mp3().await.unwrap().is_empty());
    }
}
