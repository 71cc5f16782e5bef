use anyhow::Context;
use async_trait::async_trait;
use std::ffi::OsString;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

use crate::{GrabberError, Result};

/// Converts a downloaded container into an MP3 file
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AudioTranscoder: Send + Sync {
    /// Transcode `input` to MP3 at `output`, overwriting it if present
    async fn transcode_to_mp3(&self, input: &Path, output: &Path) -> Result<()>;
}

/// Transcoder backed by the ffmpeg executable
pub struct FfmpegTranscoder {
    ffmpeg_path: String,
    bitrate: String,
}

impl FfmpegTranscoder {
    pub fn new(ffmpeg_path: impl Into<String>, bitrate: impl Into<String>) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.into(),
            bitrate: bitrate.into(),
        }
    }

    /// Arguments passed to ffmpeg for one conversion
    pub fn build_args(&self, input: &Path, output: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = ["-hide_banner", "-loglevel", "error", "-y", "-i"]
            .into_iter()
            .map(OsString::from)
            .collect();
        args.push(input.as_os_str().to_owned());
        args.extend(
            [
                "-map", "0:a", // Audio streams only
                "-vn",
                "-codec:a", "libmp3lame",
                "-b:a", self.bitrate.as_str(),
            ]
            .into_iter()
            .map(OsString::from),
        );
        args.push(output.as_os_str().to_owned());
        args
    }
}

#[async_trait]
impl AudioTranscoder for FfmpegTranscoder {
    async fn transcode_to_mp3(&self, input: &Path, output: &Path) -> Result<()> {
        tracing::debug!(
            "Converting {} to MP3 at {} ({})",
            input.display(),
            output.display(),
            self.bitrate
        );

        let result = Command::new(&self.ffmpeg_path)
            .args(self.build_args(input, output))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .with_context(|| format!("Failed to run {}", self.ffmpeg_path))?;

        if !result.status.success() {
            let error = String::from_utf8_lossy(&result.stderr);
            return Err(GrabberError::TranscodeFailed(error.trim().to_string()).into());
        }

        Ok(())
    }
}
