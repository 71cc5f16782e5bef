//! MP3 Grabber - a small web front-end that turns video URLs into MP3 files
//!
//! The heavy lifting is delegated to external tools: `yt-dlp` resolves the URL and
//! downloads the best audio stream, `ffmpeg` re-encodes it to MP3. This crate glues
//! the two together, keeps the results in a media directory and serves them over HTTP.

pub mod cli;
pub mod config;
pub mod extractors;
pub mod library;
pub mod pipeline;
pub mod transcode;
pub mod utils;
pub mod web;

pub use cli::{Cli, Commands};
pub use config::Config;
pub use extractors::{MediaExtractor, MediaInfo};
pub use library::MediaLibrary;
pub use pipeline::{AudioPipeline, FetchOutcome};
pub use transcode::AudioTranscoder;

/// Result type used throughout the library
pub type Result<T> = anyhow::Result<T>;

/// Error types specific to the grabber
#[derive(thiserror::Error, Debug)]
pub enum GrabberError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Media resolution failed: {0}")]
    ResolutionFailed(String),

    #[error("Audio download failed: {0}")]
    DownloadFailed(String),

    #[error("Transcoding failed: {0}")]
    TranscodeFailed(String),

    #[error("Cannot derive a filename from title {0:?}")]
    UnusableTitle(String),
}
