use anyhow::Context;
use futures_util::StreamExt;
use reqwest::Client;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;

use crate::config::Config;
use crate::extractors::{MediaExtractor, MediaInfo, YtDlpExtractor};
use crate::library::MediaLibrary;
use crate::transcode::{AudioTranscoder, FfmpegTranscoder};
use crate::utils::validate_and_normalize_url;
use crate::Result;

/// Result of fetching one URL
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    /// MP3 filename inside the media directory
    pub filename: String,

    /// Full path of the MP3 file
    pub path: PathBuf,

    /// Thumbnail filename, when one is stored next to the MP3
    pub thumbnail: Option<String>,

    /// The MP3 was already present and nothing was downloaded
    pub cached: bool,

    /// Metadata reported by the extractor
    pub info: MediaInfo,
}

/// Resolve → cache-check → download → transcode → thumbnail
pub struct AudioPipeline {
    extractor: Arc<dyn MediaExtractor>,
    transcoder: Arc<dyn AudioTranscoder>,
    library: MediaLibrary,
    client: Client,
    thumbnails: bool,
}

impl AudioPipeline {
    pub fn new(
        extractor: Arc<dyn MediaExtractor>,
        transcoder: Arc<dyn AudioTranscoder>,
        library: MediaLibrary,
    ) -> Self {
        Self {
            extractor,
            transcoder,
            library,
            client: Client::new(),
            thumbnails: true,
        }
    }

    /// Build the pipeline with yt-dlp and ffmpeg as configured
    pub fn from_config(config: &Config) -> Self {
        let extractor = YtDlpExtractor::new(&config.tools.yt_dlp_path, &config.tools.format);
        let transcoder = FfmpegTranscoder::new(&config.tools.ffmpeg_path, &config.media.bitrate);

        Self::new(
            Arc::new(extractor),
            Arc::new(transcoder),
            MediaLibrary::new(&config.media.dir),
        )
        .with_thumbnails(config.media.thumbnails)
    }

    /// Enable or disable thumbnail downloads
    pub fn with_thumbnails(mut self, enabled: bool) -> Self {
        self.thumbnails = enabled;
        self
    }

    pub fn library(&self) -> &MediaLibrary {
        &self.library
    }

    /// Fetch a URL into the media directory.
    ///
    /// If an MP3 with the derived filename already exists, neither the audio
    /// download nor the transcoder runs again.
    pub async fn fetch(&self, url: &str) -> Result<FetchOutcome> {
        let url = validate_and_normalize_url(url)?;
        tracing::info!("Resolving {} with {}", url, self.extractor.name());

        let info = self
            .extractor
            .resolve(&url)
            .await
            .with_context(|| format!("Failed to resolve {}", url))?;

        let filename = MediaLibrary::mp3_filename(&info)?;
        let cached = self.library.contains(&filename).await;

        let path = if cached {
            tracing::info!("{} already exists, skipping download", filename);
            self.library.root().join(&filename)
        } else {
            self.download_and_convert(&info, &filename).await?
        };

        let thumbnail = if self.thumbnails {
            self.store_thumbnail(&info, &filename).await?
        } else {
            None
        };

        Ok(FetchOutcome {
            filename,
            path,
            thumbnail,
            cached,
            info,
        })
    }

    async fn download_and_convert(&self, info: &MediaInfo, filename: &str) -> Result<PathBuf> {
        self.library.ensure_exists().await?;
        let scratch = self.library.scratch_dir()?;

        let downloaded = scratch.path().join("download.webm");
        tracing::info!("Downloading audio for \"{}\"", info.title);
        self.extractor
            .download_audio(info, &downloaded)
            .await
            .with_context(|| format!("Failed to download audio for \"{}\"", info.title))?;

        let encoded = scratch.path().join("encoded.mp3");
        tracing::info!("Converting \"{}\" to MP3", info.title);
        self.transcoder
            .transcode_to_mp3(&downloaded, &encoded)
            .await
            .with_context(|| format!("Failed to convert \"{}\" to MP3", info.title))?;

        let path = self.library.install(&encoded, filename).await?;
        tracing::info!("Stored {}", path.display());

        Ok(path)
    }

    /// Download the thumbnail next to the MP3.
    ///
    /// Network failures are logged and yield `None`; failures writing the
    /// file are errors.
    async fn store_thumbnail(&self, info: &MediaInfo, mp3_filename: &str) -> Result<Option<String>> {
        let Some(thumbnail_url) = info.thumbnail.as_deref() else {
            return Ok(None);
        };

        let filename = MediaLibrary::thumbnail_filename(mp3_filename);
        if self.library.contains(&filename).await {
            return Ok(Some(filename));
        }

        let response = match self.client.get(thumbnail_url).send().await {
            Ok(response) if response.status().is_success() => response,
            Ok(response) => {
                tracing::warn!("Thumbnail {} returned HTTP {}", thumbnail_url, response.status());
                return Ok(None);
            }
            Err(err) => {
                tracing::warn!("Failed to fetch thumbnail {}: {}", thumbnail_url, err);
                return Ok(None);
            }
        };

        self.library.ensure_exists().await?;
        let scratch = self.library.scratch_dir()?;
        let staged = scratch.path().join("thumbnail");
        let mut file = tokio::fs::File::create(&staged)
            .await
            .context("Failed to create thumbnail file")?;

        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(err) => {
                    tracing::warn!("Thumbnail download from {} interrupted: {}", thumbnail_url, err);
                    return Ok(None);
                }
            };
            file.write_all(&chunk)
                .await
                .context("Failed to write thumbnail")?;
        }
        file.flush().await.context("Failed to write thumbnail")?;
        drop(file);

        self.library.install(&staged, &filename).await?;
        Ok(Some(filename))
    }
}
