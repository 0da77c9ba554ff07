use crate::common::error::AppError;
use crate::infrastructure::audio::AudioFormat;
use crate::infrastructure::storage::local::{sanitize_file_name, BlobStore, SlotGuard};
use axum::extract::Multipart;
use futures_util::TryStreamExt;
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::info;
use uuid::Uuid;

pub const AUDIO_FIELD: &str = "audio";

#[derive(Debug)]
pub struct StoredAudio {
    pub path: PathBuf,
    pub file_name: String,
}

pub struct AudioForm {
    pub slot: SlotGuard,
    pub audio: StoredAudio,
    pub fields: HashMap<String, String>,
}

/// Checks the client's file name before anything touches the disk.
pub fn validate_audio_name(file_name: Option<&str>) -> Result<(String, AudioFormat), AppError> {
    let file_name = file_name.ok_or_else(|| AppError::BadRequest("No audio file provided".to_string()))?;

    if file_name.is_empty() {
        return Err(AppError::BadRequest("No selected file".to_string()));
    }

    let format = AudioFormat::from_file_name(file_name).ok_or_else(|| {
        AppError::BadRequest("Invalid file type. Only MP3 and WAV files are allowed".to_string())
    })?;

    let safe = sanitize_file_name(file_name)
        .ok_or_else(|| AppError::BadRequest("Invalid file name".to_string()))?;

    Ok((safe, format))
}

/// Drains a multipart request, streaming the `audio` file into a fresh slot
/// named `id` and collecting every other field as text.
///
/// The slot is only allocated once a file name has passed validation, and
/// on any error after that the stored file is deleted before returning.
pub async fn receive_audio_form(
    store: &BlobStore,
    id: Uuid,
    mut multipart: Multipart,
) -> Result<AudioForm, AppError> {
    let mut slot: Option<SlotGuard> = None;
    let mut audio = None;
    let mut fields = HashMap::new();

    if let Err(e) = read_fields(store, id, &mut multipart, &mut slot, &mut audio, &mut fields).await {
        if let Some(slot) = slot {
            slot.release().await;
        }
        return Err(e);
    }

    match (slot, audio) {
        (Some(slot), Some(audio)) => Ok(AudioForm {
            slot,
            audio,
            fields,
        }),
        (slot, _) => {
            if let Some(slot) = slot {
                slot.release().await;
            }
            Err(AppError::BadRequest("No audio file provided".to_string()))
        }
    }
}

async fn read_fields(
    store: &BlobStore,
    id: Uuid,
    multipart: &mut Multipart,
    slot: &mut Option<SlotGuard>,
    audio: &mut Option<StoredAudio>,
    fields: &mut HashMap<String, String>,
) -> Result<(), AppError> {
    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or("").to_string();

        if name == AUDIO_FIELD {
            if audio.is_some() {
                continue;
            }

            let (file_name, format) = validate_audio_name(field.file_name())?;
            info!("Receiving {:?} upload {} into {}", format, file_name, id);

            let guard = slot.insert(SlotGuard::new(store.clone(), store.allocate(id).await?));
            let path = store
                .save(guard.slot(), &file_name, field.map_err(AppError::from))
                .await?;

            *audio = Some(StoredAudio { path, file_name });
        } else if !name.is_empty() {
            let value = field.text().await?;
            fields.insert(name, value);
        }
    }
    Ok(())
}
