use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};
use uuid::Uuid;

pub const METADATA_FILE: &str = "metadata.json";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Invalid file name")]
    InvalidName,
    #[error("storage I/O failed: {0}")]
    Io(#[from] io::Error),
}

/// Filesystem blob store. Every request gets its own directory named after
/// its identity, so two uploads with the same original name never collide.
#[derive(Clone, Debug)]
pub struct BlobStore {
    root: PathBuf,
}

/// A directory reserved for one identity.
#[derive(Clone, Debug)]
pub struct UploadSlot {
    pub id: Uuid,
    pub dir: PathBuf,
}

impl BlobStore {
    pub async fn new(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root = root.into();
        fs::create_dir_all(&root).await?;
        info!("✅ Blob store ready at {}", root.display());
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn slot_dir(&self, id: &Uuid) -> PathBuf {
        self.root.join(id.to_string())
    }

    pub async fn allocate(&self, id: Uuid) -> Result<UploadSlot, StorageError> {
        let dir = self.slot_dir(&id);
        // create_dir (not create_dir_all) so a reused identity fails loudly
        fs::create_dir(&dir).await?;
        Ok(UploadSlot { id, dir })
    }

    /// Streams `body` into the slot under the sanitized form of
    /// `suggested_name`. A partially written file is removed on failure.
    pub async fn save<S, E>(
        &self,
        slot: &UploadSlot,
        suggested_name: &str,
        body: S,
    ) -> Result<PathBuf, E>
    where
        S: Stream<Item = Result<Bytes, E>>,
        E: From<StorageError>,
    {
        let name = sanitize_file_name(suggested_name).ok_or(StorageError::InvalidName)?;
        let path = slot.dir.join(name);

        let mut file = fs::File::create(&path).await.map_err(StorageError::from)?;
        let mut written: u64 = 0;
        futures_util::pin_mut!(body);

        while let Some(chunk) = body.next().await {
            let chunk = match chunk {
                Ok(c) => c,
                Err(e) => {
                    drop(file);
                    self.delete(&path).await;
                    return Err(e);
                }
            };

            if let Err(e) = file.write_all(&chunk).await {
                drop(file);
                self.delete(&path).await;
                return Err(StorageError::from(e).into());
            }
            written += chunk.len() as u64;
        }

        if let Err(e) = file.flush().await {
            drop(file);
            self.delete(&path).await;
            return Err(StorageError::from(e).into());
        }

        debug!(path = %path.display(), size_bytes = written, "Upload stored");
        Ok(path)
    }

    /// Removes a single file. A file that is already gone is not an error.
    pub async fn delete(&self, path: &Path) {
        match fs::remove_file(path).await {
            Ok(()) => debug!(path = %path.display(), "Deleted file"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "File already gone");
            }
            Err(e) => warn!(path = %path.display(), "Failed to delete file: {}", e),
        }
    }

    /// Removes the identity directory and everything in it.
    pub async fn purge(&self, id: &Uuid) {
        let dir = self.slot_dir(id);
        match fs::remove_dir_all(&dir).await {
            Ok(()) => debug!(dir = %dir.display(), "Purged upload directory"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!(dir = %dir.display(), "Failed to purge upload directory: {}", e),
        }
    }

    /// Synchronous variant of [`BlobStore::purge`].
    pub fn purge_blocking(&self, id: &Uuid) {
        let dir = self.slot_dir(id);
        match std::fs::remove_dir_all(&dir) {
            Ok(()) => debug!(dir = %dir.display(), "Purged upload directory"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!(dir = %dir.display(), "Failed to purge upload directory: {}", e),
        }
    }

    /// Purge for `Drop` impls: runs on the blocking pool when a runtime is
    /// available so async workers never wait on the filesystem.
    pub fn purge_detached(&self, id: Uuid) {
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let store = self.clone();
                handle.spawn_blocking(move || store.purge_blocking(&id));
            }
            Err(_) => self.purge_blocking(&id),
        }
    }

    pub async fn write_metadata(&self, slot: &UploadSlot, json: &[u8]) -> Result<(), StorageError> {
        fs::write(slot.dir.join(METADATA_FILE), json).await?;
        Ok(())
    }
}

/// Owns an allocated slot until the job is handed to the registry. Dropping
/// an armed guard deletes the slot directory in the background; request
/// paths call [`SlotGuard::release`] to have it gone before they answer.
pub struct SlotGuard {
    store: BlobStore,
    slot: UploadSlot,
    armed: bool,
}

impl SlotGuard {
    pub fn new(store: BlobStore, slot: UploadSlot) -> Self {
        Self {
            store,
            slot,
            armed: true,
        }
    }

    pub fn slot(&self) -> &UploadSlot {
        &self.slot
    }

    /// Deletes the slot now, off the async workers, and disarms the guard.
    pub async fn release(mut self) {
        self.armed = false;
        self.store.purge(&self.slot.id).await;
    }

    /// Releases ownership; the files now belong to whoever registered them.
    pub fn keep(mut self) -> UploadSlot {
        self.armed = false;
        self.slot.clone()
    }
}

impl Drop for SlotGuard {
    fn drop(&mut self) {
        if self.armed {
            self.store.purge_detached(self.slot.id);
        }
    }
}

/// Reduces a client-supplied file name to a safe single path component.
pub fn sanitize_file_name(name: &str) -> Option<String> {
    let base = name.rsplit(['/', '\\']).next().unwrap_or("");

    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    let mut cleaned = cleaned.trim_start_matches('.').to_string();
    while cleaned.contains("..") {
        cleaned = cleaned.replace("..", ".");
    }

    if cleaned.is_empty() || cleaned == METADATA_FILE || !cleaned.contains('.') {
        return None;
    }
    Some(cleaned)
}
