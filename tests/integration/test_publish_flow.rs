//! Integration tests for publishing drafts into the form store

use async_trait::async_trait;
use axum::http::StatusCode;
use axum_test::TestServer;
use form_builder_api::builder::{FormDraft, PublishTarget};
use form_builder_api::models::{
    Answer, FieldType, FormRecord, FormResponse, FormSnapshot, FormUpdate,
};
use form_builder_api::routes::{self, AppState};
use form_builder_api::services::JwtService;
use form_builder_api::storage::{FormStore, MemoryFormStore, StorageError, UserContext};
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

const SECRET: &str = "test-secret-key-at-least-32-chars";

fn alice() -> UserContext {
    UserContext {
        user_id: "alice".to_string(),
        email: "alice@example.com".to_string(),
    }
}

/// Store whose every call fails as if the backend were down.
struct UnavailableStore;

fn down() -> StorageError {
    StorageError::ConnectionError("connection refused".to_string())
}

#[async_trait]
impl FormStore for UnavailableStore {
    async fn create_form(&self, _: &UserContext, _: FormSnapshot) -> Result<Uuid, StorageError> {
        Err(down())
    }
    async fn get_form(&self, _: Uuid) -> Result<Option<FormRecord>, StorageError> {
        Err(down())
    }
    async fn update_form(&self, _: Uuid, _: FormUpdate) -> Result<FormRecord, StorageError> {
        Err(down())
    }
    async fn delete_form(&self, _: Uuid) -> Result<(), StorageError> {
        Err(down())
    }
    async fn list_forms_by_owner(&self, _: &str) -> Result<Vec<FormRecord>, StorageError> {
        Err(down())
    }
    async fn save_response(&self, _: Uuid, _: Vec<Answer>) -> Result<FormResponse, StorageError> {
        Err(down())
    }
    async fn list_responses(&self, _: Uuid) -> Result<Vec<FormResponse>, StorageError> {
        Err(down())
    }
}

/// Memory store whose form creation takes a while to answer.
struct SlowStore {
    inner: MemoryFormStore,
    delay: Duration,
}

#[async_trait]
impl FormStore for SlowStore {
    async fn create_form(
        &self,
        owner: &UserContext,
        snapshot: FormSnapshot,
    ) -> Result<Uuid, StorageError> {
        tokio::time::sleep(self.delay).await;
        self.inner.create_form(owner, snapshot).await
    }
    async fn get_form(&self, form_id: Uuid) -> Result<Option<FormRecord>, StorageError> {
        self.inner.get_form(form_id).await
    }
    async fn update_form(&self, form_id: Uuid, update: FormUpdate) -> Result<FormRecord, StorageError> {
        self.inner.update_form(form_id, update).await
    }
    async fn delete_form(&self, form_id: Uuid) -> Result<(), StorageError> {
        self.inner.delete_form(form_id).await
    }
    async fn list_forms_by_owner(&self, owner_id: &str) -> Result<Vec<FormRecord>, StorageError> {
        self.inner.list_forms_by_owner(owner_id).await
    }
    async fn save_response(&self, form_id: Uuid, answers: Vec<Answer>) -> Result<FormResponse, StorageError> {
        self.inner.save_response(form_id, answers).await
    }
    async fn list_responses(&self, form_id: Uuid) -> Result<Vec<FormResponse>, StorageError> {
        self.inner.list_responses(form_id).await
    }
}

#[tokio::test]
async fn test_publish_new_form_applies_defaults() {
    let store = MemoryFormStore::new();
    let mut draft = FormDraft::new();
    draft.update_title("");
    let field_id = draft.add_field(FieldType::Select);

    let form_id = draft
        .publish(&store, &PublishTarget::NewForm(alice()))
        .await
        .unwrap();

    let record = store.get_form(form_id).await.unwrap().unwrap();
    assert_eq!(record.title, "Untitled Form");
    assert_eq!(record.created_by, "alice");
    assert_eq!(record.settings.background_color, "#ffffff");
    assert_eq!(record.fields[0].id, field_id);
    assert_eq!(record.fields[0].options, Some(vec!["Option 1".to_string()]));
    // Publishing leaves the draft as it was
    assert_eq!(draft.meta().title, "");
}

#[tokio::test]
async fn test_publish_existing_form_overwrites_content() {
    let store = MemoryFormStore::new();
    let mut draft = FormDraft::new();
    draft.add_field(FieldType::ShortText);
    let form_id = draft
        .publish(&store, &PublishTarget::NewForm(alice()))
        .await
        .unwrap();

    let record = store.get_form(form_id).await.unwrap().unwrap();
    let mut edit = FormDraft::from_record(&record);
    edit.update_title("Edited");
    edit.add_field(FieldType::Email);

    let same_id = edit
        .publish(&store, &PublishTarget::ExistingForm(form_id))
        .await
        .unwrap();

    assert_eq!(same_id, form_id);
    let updated = store.get_form(form_id).await.unwrap().unwrap();
    assert_eq!(updated.title, "Edited");
    assert_eq!(updated.fields.len(), 2);
    assert_eq!(updated.created_by, "alice");
    assert_eq!(updated.created_at, record.created_at);
}

#[tokio::test]
async fn test_publish_to_missing_form_fails() {
    let store = MemoryFormStore::new();
    let err = FormDraft::new()
        .publish(&store, &PublishTarget::ExistingForm(Uuid::new_v4()))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_failed_publish_leaves_draft_intact() {
    let jwt = JwtService::new(SECRET);
    let token = jwt
        .generate_token_pair(&alice(), "session-1")
        .unwrap()
        .access_token;
    let server =
        TestServer::new(routes::create_app(AppState::new(Arc::new(UnavailableStore), jwt)))
            .unwrap();

    let draft: Value = server
        .post("/api/v1/drafts")
        .authorization_bearer(&token)
        .await
        .json();
    let draft_id = draft["draft_id"].as_str().unwrap().to_string();
    let path = format!("/api/v1/drafts/{}", draft_id);

    server
        .post(&format!("{}/commands", path))
        .authorization_bearer(&token)
        .json(&json!({"op": "add_field", "type": "email"}))
        .await;
    let before: Value = server.get(&path).authorization_bearer(&token).await.json();

    let response = server
        .post(&format!("{}/publish", path))
        .authorization_bearer(&token)
        .await;
    assert_eq!(response.status_code(), StatusCode::SERVICE_UNAVAILABLE);

    let after: Value = server.get(&path).authorization_bearer(&token).await.json();
    assert_eq!(after, before);
}

#[tokio::test]
async fn test_publish_route_creates_then_updates() {
    let jwt = JwtService::new(SECRET);
    let token = jwt
        .generate_token_pair(&alice(), "session-1")
        .unwrap()
        .access_token;
    let server = TestServer::new(routes::create_app(AppState::in_memory(jwt))).unwrap();

    let draft: Value = server
        .post("/api/v1/drafts")
        .authorization_bearer(&token)
        .await
        .json();
    let draft_id = draft["draft_id"].as_str().unwrap().to_string();
    server
        .post(&format!("/api/v1/drafts/{}/commands", draft_id))
        .authorization_bearer(&token)
        .json(&json!({"op": "update_title", "title": "Launch survey"}))
        .await;

    let response = server
        .post(&format!("/api/v1/drafts/{}/publish", draft_id))
        .authorization_bearer(&token)
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    let published: Value = response.json();
    assert_eq!(published["created"], true);
    let form_id = published["form_id"].as_str().unwrap().to_string();

    // The draft is closed once published
    let response = server
        .get(&format!("/api/v1/drafts/{}", draft_id))
        .authorization_bearer(&token)
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

    // Reopen for editing and publish again over the same form
    let response = server
        .post("/api/v1/drafts")
        .authorization_bearer(&token)
        .json(&json!({"form_id": form_id}))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    let edit: Value = response.json();
    assert_eq!(edit["form_id"], form_id.as_str());
    assert_eq!(edit["meta"]["title"], "Launch survey");
    let edit_id = edit["draft_id"].as_str().unwrap().to_string();

    server
        .post(&format!("/api/v1/drafts/{}/commands", edit_id))
        .authorization_bearer(&token)
        .json(&json!({"op": "add_field", "type": "boolean"}))
        .await;
    let response = server
        .post(&format!("/api/v1/drafts/{}/publish", edit_id))
        .authorization_bearer(&token)
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(
        response.json::<Value>(),
        json!({"form_id": form_id, "created": false})
    );

    let form: Value = server
        .get(&format!("/api/v1/forms/{}", form_id))
        .authorization_bearer(&token)
        .await
        .json();
    assert_eq!(form["fields"][0]["type"], "boolean");
}

#[tokio::test]
async fn test_concurrent_publish_creates_one_form() {
    let jwt = JwtService::new(SECRET);
    let token = jwt
        .generate_token_pair(&alice(), "session-1")
        .unwrap()
        .access_token;
    let store = SlowStore {
        inner: MemoryFormStore::new(),
        delay: Duration::from_millis(300),
    };
    let server = TestServer::new(routes::create_app(AppState::new(Arc::new(store), jwt))).unwrap();

    let draft: Value = server
        .post("/api/v1/drafts")
        .authorization_bearer(&token)
        .await
        .json();
    let draft_id = draft["draft_id"].as_str().unwrap().to_string();
    let publish_path = format!("/api/v1/drafts/{}/publish", draft_id);
    let command_path = format!("/api/v1/drafts/{}/commands", draft_id);

    let first = server
        .post(&publish_path)
        .authorization_bearer(&token)
        .into_future();
    let second = async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        server.post(&publish_path).authorization_bearer(&token).await
    };
    let edit = async {
        tokio::time::sleep(Duration::from_millis(100)).await;
        server
            .post(&command_path)
            .authorization_bearer(&token)
            .json(&json!({"op": "update_title", "title": "Too late"}))
            .await
    };
    let (first, second, edit) = tokio::join!(first, second, edit);

    assert_eq!(first.status_code(), StatusCode::CREATED);
    assert_eq!(second.status_code(), StatusCode::CONFLICT);
    assert_eq!(edit.status_code(), StatusCode::CONFLICT);
    assert_eq!(edit.json::<Value>()["status"], 409);

    let forms: Value = server
        .get("/api/v1/forms")
        .authorization_bearer(&token)
        .await
        .json();
    assert_eq!(forms.as_array().unwrap().len(), 1);
    assert_eq!(forms[0]["title"], "Untitled Form");

    let response = server
        .get(&format!("/api/v1/drafts/{}", draft_id))
        .authorization_bearer(&token)
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_failed_publish_can_be_retried() {
    let jwt = JwtService::new(SECRET);
    let token = jwt
        .generate_token_pair(&alice(), "session-1")
        .unwrap()
        .access_token;
    let server =
        TestServer::new(routes::create_app(AppState::new(Arc::new(UnavailableStore), jwt)))
            .unwrap();

    let draft: Value = server
        .post("/api/v1/drafts")
        .authorization_bearer(&token)
        .await
        .json();
    let draft_id = draft["draft_id"].as_str().unwrap().to_string();
    let path = format!("/api/v1/drafts/{}", draft_id);

    for _ in 0..2 {
        let response = server
            .post(&format!("{}/publish", path))
            .authorization_bearer(&token)
            .await;
        assert_eq!(response.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    }

    let response = server
        .post(&format!("{}/commands", path))
        .authorization_bearer(&token)
        .json(&json!({"op": "add_field", "type": "date"}))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let response = server.delete(&path).authorization_bearer(&token).await;
    assert_eq!(response.status_code(), StatusCode::NO_CONTENT);
}
