//! In-memory storage backend.
//!
//! Used when neither a database nor a data directory is configured, and by tests.

use super::{StorageError, traits::*};
use crate::models::{Answer, FormRecord, FormResponse, FormSnapshot, FormUpdate};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Clone)]
struct StoredForm {
    record: FormRecord,
    responses: Vec<FormResponse>,
}

/// Form store kept entirely in process memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryFormStore {
    forms: Arc<RwLock<HashMap<Uuid, StoredForm>>>,
}

impl MemoryFormStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FormStore for MemoryFormStore {
    async fn create_form(
        &self,
        owner: &UserContext,
        snapshot: FormSnapshot,
    ) -> Result<Uuid, StorageError> {
        let record = FormRecord::from_snapshot(&owner.user_id, snapshot);
        let form_id = record.id;
        self.forms.write().await.insert(
            form_id,
            StoredForm {
                record,
                responses: Vec::new(),
            },
        );
        Ok(form_id)
    }

    async fn get_form(&self, form_id: Uuid) -> Result<Option<FormRecord>, StorageError> {
        Ok(self
            .forms
            .read()
            .await
            .get(&form_id)
            .map(|stored| stored.record.clone()))
    }

    async fn update_form(
        &self,
        form_id: Uuid,
        update: FormUpdate,
    ) -> Result<FormRecord, StorageError> {
        let mut forms = self.forms.write().await;
        let stored = forms
            .get_mut(&form_id)
            .ok_or_else(|| StorageError::form_not_found(form_id))?;
        stored.record.apply_update(update);
        Ok(stored.record.clone())
    }

    async fn delete_form(&self, form_id: Uuid) -> Result<(), StorageError> {
        self.forms
            .write()
            .await
            .remove(&form_id)
            .map(|_| ())
            .ok_or_else(|| StorageError::form_not_found(form_id))
    }

    async fn list_forms_by_owner(&self, owner_id: &str) -> Result<Vec<FormRecord>, StorageError> {
        let mut records: Vec<FormRecord> = self
            .forms
            .read()
            .await
            .values()
            .filter(|stored| stored.record.created_by == owner_id)
            .map(|stored| stored.record.clone())
            .collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records)
    }

    async fn save_response(
        &self,
        form_id: Uuid,
        answers: Vec<Answer>,
    ) -> Result<FormResponse, StorageError> {
        let mut forms = self.forms.write().await;
        let stored = forms
            .get_mut(&form_id)
            .ok_or_else(|| StorageError::form_not_found(form_id))?;
        let response = FormResponse::new(form_id, answers);
        stored.responses.push(response.clone());
        Ok(response)
    }

    async fn list_responses(&self, form_id: Uuid) -> Result<Vec<FormResponse>, StorageError> {
        let forms = self.forms.read().await;
        let stored = forms
            .get(&form_id)
            .ok_or_else(|| StorageError::form_not_found(form_id))?;
        Ok(stored.responses.clone())
    }
}
