//! Storage trait definitions for the form store backends.

use crate::models::{Answer, FormRecord, FormResponse, FormSnapshot, FormUpdate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User context for storage operations
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserContext {
    pub user_id: String,
    pub email: String,
}

/// Document store holding published forms and their responses.
#[async_trait::async_trait]
pub trait FormStore: Send + Sync {
    /// Persist a published snapshot as a new form owned by `owner`; returns the new form id.
    async fn create_form(
        &self,
        owner: &UserContext,
        snapshot: FormSnapshot,
    ) -> Result<Uuid, super::StorageError>;

    /// Load a form by id
    async fn get_form(&self, form_id: Uuid) -> Result<Option<FormRecord>, super::StorageError>;

    /// Merge a partial update into an existing form
    async fn update_form(
        &self,
        form_id: Uuid,
        update: FormUpdate,
    ) -> Result<FormRecord, super::StorageError>;

    /// Delete a form together with its responses
    async fn delete_form(&self, form_id: Uuid) -> Result<(), super::StorageError>;

    /// List forms created by `owner_id`, newest first
    async fn list_forms_by_owner(
        &self,
        owner_id: &str,
    ) -> Result<Vec<FormRecord>, super::StorageError>;

    /// Store a submission under a form
    async fn save_response(
        &self,
        form_id: Uuid,
        answers: Vec<Answer>,
    ) -> Result<FormResponse, super::StorageError>;

    /// List a form's submissions, oldest first
    async fn list_responses(
        &self,
        form_id: Uuid,
    ) -> Result<Vec<FormResponse>, super::StorageError>;
}
