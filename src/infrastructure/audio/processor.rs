use super::{probe, trimmed_path, wav, AudioError, AudioFormat, AudioProcessor};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{error, info};

/// Production processor: symphonia for probing, a RIFF rewrite for WAV
/// trims and ffmpeg for MP3 trims.
#[derive(Clone, Debug)]
pub struct MediaProcessor {
    ffmpeg_path: String,
}

impl MediaProcessor {
    pub fn new(ffmpeg_path: impl Into<String>) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.into(),
        }
    }

    async fn probe(&self, path: &Path) -> Result<f64, AudioError> {
        let path = path.to_path_buf();
        tokio::task::spawn_blocking(move || probe::probe_duration(&path))
            .await
            .map_err(|e| AudioError::Io(std::io::Error::other(e)))?
    }

    /// Re-encodes `input` into `output`, cut to `limit` seconds when given.
    async fn encode_mp3(&self, input: &Path, output: &Path, limit: Option<f64>) -> Result<(), AudioError> {
        let mut cmd = Command::new(&self.ffmpeg_path);
        cmd.args(["-hide_banner", "-loglevel", "error", "-y", "-i"])
            .arg(input);
        if let Some(seconds) = limit {
            cmd.arg("-t").arg(format!("{:.3}", seconds));
        }
        cmd.args(["-c:a", "libmp3lame", "-b:a", "320k", "-q:a", "0"])
            .arg(output);

        let result = cmd
            .output()
            .await
            .map_err(|e| AudioError::Transcode(format!("could not run {}: {}", self.ffmpeg_path, e)))?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr).trim().to_string();
            error!("❌ FFmpeg failed on {}: {}", input.display(), stderr);
            let _ = tokio::fs::remove_file(output).await;
            return Err(AudioError::Transcode(stderr));
        }

        Ok(())
    }
}

#[async_trait]
impl AudioProcessor for MediaProcessor {
    async fn duration_seconds(&self, path: &Path) -> Result<f64, AudioError> {
        self.probe(path).await
    }

    async fn trim(&self, path: &Path, seconds: f64) -> Result<PathBuf, AudioError> {
        let format = AudioFormat::from_path(path)?;
        let seconds = seconds.max(0.0);
        let output = trimmed_path(path);

        info!("✂️ Trimming {} to {}s", path.display(), seconds);

        match format {
            AudioFormat::Wav => {
                let (input, out) = (path.to_path_buf(), output.clone());
                tokio::task::spawn_blocking(move || wav::trim_file(&input, &out, seconds))
                    .await
                    .map_err(|e| AudioError::Io(std::io::Error::other(e)))??;
            }
            AudioFormat::Mp3 => {
                // Probe first so undecodable input reports as corrupt, not as an ffmpeg failure.
                let source = self.probe(path).await?;
                // ffmpeg rejects huge `-t` values; a cut at or past the end is the whole file.
                let limit = (seconds < source).then_some(seconds);
                self.encode_mp3(path, &output, limit).await?;
            }
        }

        Ok(output)
    }
}
