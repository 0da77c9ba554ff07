use super::dto::{DurationResponse, TrimResponse};
use crate::common::error::AppError;
use crate::common::upload::{receive_audio_form, AudioForm};
use crate::infrastructure::storage::local::StorageError;
use crate::modules::jobs::JobRecord;
use crate::state::AppState;
use axum::extract::Multipart;
use std::collections::HashMap;
use tracing::{info, warn};
use uuid::Uuid;

pub const DURATION_FIELD: &str = "duration";

/// Where a trim request got to before it finished or failed.
///
/// The file name is checked before anything is written, but the `duration`
/// field may trail the file in the body, so the request is only fully
/// validated once the upload sits in its slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrimStage {
    Received,
    Stored,
    Validated,
    Transcoded,
    Registered,
    Responded,
}

/// Reads the requested length in seconds from the form.
pub fn parse_trim_seconds(fields: &HashMap<String, String>) -> Result<f64, AppError> {
    let raw = fields
        .get(DURATION_FIELD)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::BadRequest("No duration provided".to_string()))?;

    let seconds: f64 = raw
        .parse()
        .map_err(|_| AppError::BadRequest("Invalid duration value".to_string()))?;

    if !seconds.is_finite() || seconds < 0.0 {
        return Err(AppError::BadRequest(
            "Duration must be a non-negative number of seconds".to_string(),
        ));
    }

    Ok(seconds)
}

pub struct AudioService;

impl AudioService {
    /// Stores the upload just long enough to probe it. The slot is released
    /// before answering, whatever the probe said.
    pub async fn duration(state: AppState, multipart: Multipart) -> Result<DurationResponse, AppError> {
        let id = Uuid::new_v4();
        let form = receive_audio_form(&state.storage, id, multipart).await?;

        let probed = state.processor.duration_seconds(&form.audio.path).await;
        form.slot.release().await;
        let duration = probed?;
        info!("⏱️ {} is {:.3}s long", form.audio.file_name, duration);

        Ok(DurationResponse {
            duration,
            filename: form.audio.file_name,
        })
    }

    pub async fn trim(state: AppState, multipart: Multipart) -> Result<TrimResponse, AppError> {
        let id = Uuid::new_v4();
        let mut stage = TrimStage::Received;

        match Self::run_trim(&state, id, multipart, &mut stage).await {
            Ok(response) => {
                info!(file_id = %id, "✅ Trim job registered");
                Ok(response)
            }
            Err(e) => {
                warn!(file_id = %id, ?stage, "Trim request failed: {}", e);
                Err(e)
            }
        }
    }

    async fn run_trim(
        state: &AppState,
        id: Uuid,
        multipart: Multipart,
        stage: &mut TrimStage,
    ) -> Result<TrimResponse, AppError> {
        let form = receive_audio_form(&state.storage, id, multipart).await?;
        *stage = TrimStage::Stored;

        match Self::register_trim(state, id, &form, stage).await {
            Ok(response) => {
                form.slot.keep();
                Ok(response)
            }
            Err(e) => {
                form.slot.release().await;
                Err(e)
            }
        }
    }

    /// Everything between a stored upload and a live registry entry. The
    /// registry insert is the last fallible step.
    async fn register_trim(
        state: &AppState,
        id: Uuid,
        form: &AudioForm,
        stage: &mut TrimStage,
    ) -> Result<TrimResponse, AppError> {
        let seconds = parse_trim_seconds(&form.fields)?;
        *stage = TrimStage::Validated;

        let output = state.processor.trim(&form.audio.path, seconds).await?;
        *stage = TrimStage::Transcoded;

        let record = JobRecord::new(id, form.audio.path.clone(), output);
        let metadata = serde_json::to_vec_pretty(&record).map_err(|e| StorageError::Io(e.into()))?;
        state.storage.write_metadata(form.slot.slot(), &metadata).await?;

        // The slot directory was freshly created for `id`, so a clash here
        // cannot belong to another live job's files.
        state.jobs.put(record)?;
        *stage = TrimStage::Registered;

        let response = TrimResponse {
            message: "File trimmed successfully".to_string(),
            download_url: state.config.download_url(&id),
            file_id: id,
        };
        *stage = TrimStage::Responded;
        Ok(response)
    }
}
