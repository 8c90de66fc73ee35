//! File-based storage backend implementation.
//!
//! Forms are JSON documents under `<root>/forms/<form_id>.json`; responses live
//! under `<root>/responses/<form_id>/<response_id>.json`.

use super::{StorageError, traits::*};
use crate::models::{Answer, FormRecord, FormResponse, FormSnapshot, FormUpdate};
use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, warn};
use uuid::Uuid;

/// File-based storage backend.
#[derive(Debug, Clone)]
pub struct FileFormStore {
    root: PathBuf,
    // Serializes read-modify-write cycles on form documents.
    write_lock: Arc<Mutex<()>>,
}

impl FileFormStore {
    /// Open (creating if needed) a store rooted at `root`.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root = root.into();
        fs::create_dir_all(root.join("forms")).await?;
        fs::create_dir_all(root.join("responses")).await?;
        debug!("File form store opened at {:?}", root);
        Ok(Self {
            root,
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn form_path(&self, form_id: Uuid) -> PathBuf {
        self.root.join("forms").join(format!("{}.json", form_id))
    }

    fn responses_dir(&self, form_id: Uuid) -> PathBuf {
        self.root.join("responses").join(form_id.to_string())
    }

    async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, StorageError> {
        match fs::read(path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Write through a temp file and rename so readers never see a partial document.
    async fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), StorageError> {
        let bytes = serde_json::to_vec_pretty(value)?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, bytes).await?;
        fs::rename(&tmp, path).await?;
        Ok(())
    }

    async fn read_dir_json<T: DeserializeOwned>(dir: &Path) -> Result<Vec<T>, StorageError> {
        let mut entries = match fs::read_dir(dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut items = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            match Self::read_json::<T>(&path).await {
                Ok(Some(item)) => items.push(item),
                Ok(None) => {}
                Err(e) => warn!("Skipping unreadable document {:?}: {}", path, e),
            }
        }
        Ok(items)
    }
}

#[async_trait]
impl FormStore for FileFormStore {
    async fn create_form(
        &self,
        owner: &UserContext,
        snapshot: FormSnapshot,
    ) -> Result<Uuid, StorageError> {
        let record = FormRecord::from_snapshot(&owner.user_id, snapshot);
        let _guard = self.write_lock.lock().await;
        Self::write_json(&self.form_path(record.id), &record).await?;
        Ok(record.id)
    }

    async fn get_form(&self, form_id: Uuid) -> Result<Option<FormRecord>, StorageError> {
        Self::read_json(&self.form_path(form_id)).await
    }

    async fn update_form(
        &self,
        form_id: Uuid,
        update: FormUpdate,
    ) -> Result<FormRecord, StorageError> {
        let _guard = self.write_lock.lock().await;
        let path = self.form_path(form_id);
        let mut record: FormRecord = Self::read_json(&path)
            .await?
            .ok_or_else(|| StorageError::form_not_found(form_id))?;
        record.apply_update(update);
        Self::write_json(&path, &record).await?;
        Ok(record)
    }

    async fn delete_form(&self, form_id: Uuid) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().await;
        match fs::remove_file(self.form_path(form_id)).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StorageError::form_not_found(form_id));
            }
            Err(e) => return Err(e.into()),
        }
        match fs::remove_dir_all(self.responses_dir(form_id)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn list_forms_by_owner(&self, owner_id: &str) -> Result<Vec<FormRecord>, StorageError> {
        let mut records: Vec<FormRecord> = Self::read_dir_json::<FormRecord>(&self.root.join("forms"))
            .await?
            .into_iter()
            .filter(|r| r.created_by == owner_id)
            .collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records)
    }

    async fn save_response(
        &self,
        form_id: Uuid,
        answers: Vec<Answer>,
    ) -> Result<FormResponse, StorageError> {
        // Held across the check and the write so a concurrent delete cannot
        // leave an orphaned responses directory behind.
        let _guard = self.write_lock.lock().await;
        if fs::metadata(self.form_path(form_id)).await.is_err() {
            return Err(StorageError::form_not_found(form_id));
        }

        let response = FormResponse::new(form_id, answers);
        let dir = self.responses_dir(form_id);
        fs::create_dir_all(&dir).await?;
        Self::write_json(&dir.join(format!("{}.json", response.id)), &response).await?;
        Ok(response)
    }

    async fn list_responses(&self, form_id: Uuid) -> Result<Vec<FormResponse>, StorageError> {
        if fs::metadata(self.form_path(form_id)).await.is_err() {
            return Err(StorageError::form_not_found(form_id));
        }

        let mut responses: Vec<FormResponse> =
            Self::read_dir_json(&self.responses_dir(form_id)).await?;
        responses.sort_by(|a, b| a.submitted_at.cmp(&b.submitted_at));
        Ok(responses)
    }
}
