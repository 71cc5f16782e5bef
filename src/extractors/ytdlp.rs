use anyhow::Context;
use async_trait::async_trait;
use serde_json::Value;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

use super::{MediaExtractor, MediaInfo};
use crate::{GrabberError, Result};

/// Media extractor backed by the yt-dlp executable
pub struct YtDlpExtractor {
    yt_dlp_path: String,
    format: String,
}

impl YtDlpExtractor {
    pub fn new(yt_dlp_path: impl Into<String>, format: impl Into<String>) -> Self {
        Self {
            yt_dlp_path: yt_dlp_path.into(),
            format: format.into(),
        }
    }

    /// Check if yt-dlp is available
    pub async fn check_availability(&self) -> bool {
        Command::new(&self.yt_dlp_path)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map(|status| status.success())
            .unwrap_or(false)
    }

    /// Get media information using yt-dlp
    async fn get_video_info(&self, url: &str) -> Result<Value> {
        tracing::debug!("Extracting media info for: {}", url);

        let output = Command::new(&self.yt_dlp_path)
            .args(["--dump-json", "--no-playlist", "--", url])
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .with_context(|| format!("Failed to run {}", self.yt_dlp_path))?;

        if !output.status.success() {
            let error = String::from_utf8_lossy(&output.stderr);
            return Err(GrabberError::ResolutionFailed(error.trim().to_string()).into());
        }

        let info: Value = serde_json::from_slice(&output.stdout)
            .context("yt-dlp returned invalid JSON")?;

        Ok(info)
    }
}

/// Build a [`MediaInfo`] from the JSON document printed by `yt-dlp --dump-json`
pub fn parse_media_info(info: &Value, url: &str) -> Result<MediaInfo> {
    let title = info["title"]
        .as_str()
        .ok_or_else(|| GrabberError::ResolutionFailed(format!("no title reported for {}", url)))?
        .to_string();

    // Ids are strings for most extractors, numbers for a few
    let id = match &info["id"] {
        Value::String(id) => id.clone(),
        Value::Number(id) => id.to_string(),
        _ => String::new(),
    };

    let thumbnail = info["thumbnail"]
        .as_str()
        .filter(|thumb| !thumb.is_empty())
        .map(|thumb| thumb.to_string());

    Ok(MediaInfo {
        id,
        title,
        thumbnail,
        duration: info["duration"].as_f64(),
        extractor: info["extractor"].as_str().map(|s| s.to_string()),
        webpage_url: info["webpage_url"].as_str().map(|s| s.to_string()),
        original_url: url.to_string(),
    })
}

#[async_trait]
impl MediaExtractor for YtDlpExtractor {
    async fn resolve(&self, url: &str) -> Result<MediaInfo> {
        let info = self.get_video_info(url).await?;
        parse_media_info(&info, url)
    }

    async fn download_audio(&self, info: &MediaInfo, output_path: &Path) -> Result<()> {
        let source = info.webpage_url.as_deref().unwrap_or(&info.original_url);
        tracing::debug!(
            "Downloading audio ({}) for {} to {}",
            self.format,
            source,
            output_path.display()
        );

        let output = Command::new(&self.yt_dlp_path)
            .arg("--format")
            .arg(&self.format)
            .args(["--no-playlist", "--no-part", "--quiet", "--no-warnings"])
            .arg("--output")
            .arg(output_path)
            .arg("--")
            .arg(source)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .with_context(|| format!("Failed to run {}", self.yt_dlp_path))?;

        if !output.status.success() {
            let error = String::from_utf8_lossy(&output.stderr);
            return Err(GrabberError::DownloadFailed(error.trim().to_string()).into());
        }

        if !output_path.exists() {
            return Err(GrabberError::DownloadFailed(format!(
                "yt-dlp finished but {} was not written",
                output_path.display()
            ))
            .into());
        }

        Ok(())
    }

    fn name(&self) -> &'static str {
        "yt-dlp"
    }
}
