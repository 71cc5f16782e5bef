use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub mod ytdlp;

pub use ytdlp::YtDlpExtractor;

use crate::Result;

/// Metadata resolved for a media URL
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MediaInfo {
    /// Extractor-specific media id
    pub id: String,

    /// Title of the media, used to derive the MP3 filename
    pub title: String,

    /// Thumbnail image URL if available
    pub thumbnail: Option<String>,

    /// Duration in seconds if available
    pub duration: Option<f64>,

    /// Name of the extractor that handled the URL (e.g. "youtube")
    pub extractor: Option<String>,

    /// Canonical page URL reported by the extractor
    pub webpage_url: Option<String>,

    /// Original URL that was processed
    pub original_url: String,
}

/// Resolves URLs to media metadata and downloads their best audio stream
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaExtractor: Send + Sync {
    /// Resolve a URL to its metadata
    async fn resolve(&self, url: &str) -> Result<MediaInfo>;

    /// Download the audio stream of a resolved media into `output_path`
    async fn download_audio(&self, info: &MediaInfo, output_path: &Path) -> Result<()>;

    /// Get the name of this extractor
    fn name(&self) -> &'static str;
}
