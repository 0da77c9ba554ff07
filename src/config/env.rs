use std::env;
use std::str::FromStr;

pub enum EnvKey {
    ServerPort,
    ApiKey,
    UploadDir,
    MaxUploadBytes,
    PublicBaseUrl,
    JobTtlSecs,
    ReaperSchedule,
    FfmpegPath,
}

impl EnvKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnvKey::ServerPort => "APP_PORT",
            EnvKey::ApiKey => "API_KEY",
            EnvKey::UploadDir => "UPLOAD_DIR",
            EnvKey::MaxUploadBytes => "MAX_UPLOAD_BYTES",
            EnvKey::PublicBaseUrl => "PUBLIC_BASE_URL",
            EnvKey::JobTtlSecs => "JOB_TTL_SECS",
            EnvKey::ReaperSchedule => "REAPER_SCHEDULE",
            EnvKey::FfmpegPath => "FFMPEG_PATH",
        }
    }
}

pub fn get(key: EnvKey) -> Result<String, env::VarError> {
    env::var(key.as_str())
}

pub fn get_or(key: EnvKey, default: &str) -> String {
    env::var(key.as_str()).unwrap_or_else(|_| default.to_string())
}

pub fn get_parsed<T: FromStr>(key: EnvKey, default: T) -> T {
    match get(key) {
        Ok(val) => val.parse::<T>().unwrap_or(default),
        Err(_) => default,
    }
}
