use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use time::OffsetDateTime;
use uuid::Uuid;

/// A finished trim waiting to be downloaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    pub id: Uuid,
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl JobRecord {
    pub fn new(id: Uuid, input_path: PathBuf, output_path: PathBuf) -> Self {
        Self {
            id,
            input_path,
            output_path,
            created_at: OffsetDateTime::now_utc(),
        }
    }

    pub fn is_expired(&self, ttl: time::Duration, now: OffsetDateTime) -> bool {
        now - self.created_at > ttl
    }

    pub fn output_file_name(&self) -> String {
        self.output_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| format!("{}.bin", self.id))
    }
}
