use crate::config::env::{self, EnvKey};
use cron::Schedule;
use std::path::PathBuf;
use std::str::FromStr;

pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;
pub const DEFAULT_JOB_TTL_SECS: i64 = 3600;
pub const DEFAULT_REAPER_SCHEDULE: &str = "0 */5 * * * *";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    #[error("invalid reaper schedule {0:?}: {1}")]
    InvalidSchedule(String, String),
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub server_port: u16,
    pub api_key: String,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub public_base_url: String,
    pub job_ttl_secs: i64,
    pub reaper_schedule: Schedule,
    pub ffmpeg_path: String,
}

impl AppConfig {
    pub fn new() -> Result<Self, ConfigError> {
        let server_port = env::get_parsed(EnvKey::ServerPort, 5001);
        let api_key = env::get(EnvKey::ApiKey)
            .ok()
            .filter(|key| !key.is_empty())
            .ok_or(ConfigError::Missing(EnvKey::ApiKey.as_str()))?;
        let schedule = env::get_or(EnvKey::ReaperSchedule, DEFAULT_REAPER_SCHEDULE);

        Ok(Self {
            server_port,
            api_key,
            upload_dir: PathBuf::from(env::get_or(EnvKey::UploadDir, "./uploads")),
            max_upload_bytes: env::get_parsed(EnvKey::MaxUploadBytes, DEFAULT_MAX_UPLOAD_BYTES),
            public_base_url: env::get_or(
                EnvKey::PublicBaseUrl,
                &format!("http://localhost:{}", server_port),
            ),
            job_ttl_secs: env::get_parsed(EnvKey::JobTtlSecs, DEFAULT_JOB_TTL_SECS),
            reaper_schedule: parse_schedule(&schedule)?,
            ffmpeg_path: env::get_or(EnvKey::FfmpegPath, "ffmpeg"),
        })
    }

    pub fn job_ttl(&self) -> time::Duration {
        time::Duration::seconds(self.job_ttl_secs)
    }

    pub fn download_url(&self, file_id: &uuid::Uuid) -> String {
        format!("{}/download/{}", self.public_base_url.trim_end_matches('/'), file_id)
    }
}

pub fn parse_schedule(expr: &str) -> Result<Schedule, ConfigError> {
    Schedule::from_str(expr)
        .map_err(|e| ConfigError::InvalidSchedule(expr.to_string(), e.to_string()))
}
