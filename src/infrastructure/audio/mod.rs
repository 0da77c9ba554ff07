use async_trait::async_trait;
use std::path::{Path, PathBuf};

pub mod probe;
pub mod processor;
pub mod wav;

pub use processor::MediaProcessor;

#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    #[error("Invalid file type. Only MP3 and WAV files are allowed")]
    UnsupportedFormat,
    #[error("Could not decode audio: {0}")]
    Corrupt(String),
    #[error("Transcoding failed: {0}")]
    Transcode(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AudioFormat {
    Mp3,
    Wav,
}

impl AudioFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "mp3" => Some(AudioFormat::Mp3),
            "wav" => Some(AudioFormat::Wav),
            _ => None,
        }
    }

    /// Accepted formats are decided by extension only.
    pub fn from_path(path: &Path) -> Result<Self, AudioError> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
            .ok_or(AudioError::UnsupportedFormat)
    }

    pub fn from_file_name(name: &str) -> Option<Self> {
        name.rsplit_once('.')
            .and_then(|(_, ext)| Self::from_extension(ext))
    }

    pub fn extension(&self) -> &'static str {
        match self {
            AudioFormat::Mp3 => "mp3",
            AudioFormat::Wav => "wav",
        }
    }
}

/// The audio work the service delegates: probing and trimming.
#[async_trait]
pub trait AudioProcessor: Send + Sync {
    async fn duration_seconds(&self, path: &Path) -> Result<f64, AudioError>;

    /// Writes a copy of `path` cut to at most `seconds` next to it and
    /// returns the new path. Asking for more than the source holds yields
    /// the whole source.
    async fn trim(&self, path: &Path, seconds: f64) -> Result<PathBuf, AudioError>;
}

pub fn trimmed_path(input: &Path) -> PathBuf {
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    input.with_file_name(format!("trimmed_{}", name))
}
