//! Draft route integration tests

use axum::http::StatusCode;
use axum_test::TestServer;
use form_builder_api::routes::{self, AppState};
use form_builder_api::services::JwtService;
use form_builder_api::storage::UserContext;
use serde_json::{Value, json};

const SECRET: &str = "test-secret-key-at-least-32-chars";

struct Harness {
    server: TestServer,
    alice: String,
    bob: String,
}

fn token(jwt: &JwtService, user_id: &str) -> String {
    let user = UserContext {
        user_id: user_id.to_string(),
        email: format!("{}@example.com", user_id),
    };
    jwt.generate_token_pair(&user, &format!("{}-session", user_id))
        .unwrap()
        .access_token
}

fn setup() -> Harness {
    let jwt = JwtService::new(SECRET);
    let alice = token(&jwt, "alice");
    let bob = token(&jwt, "bob");
    let server = TestServer::new(routes::create_app(AppState::in_memory(jwt))).unwrap();
    Harness { server, alice, bob }
}

impl Harness {
    async fn open_draft(&self) -> String {
        let response = self
            .server
            .post("/api/v1/drafts")
            .authorization_bearer(&self.alice)
            .await;
        assert_eq!(response.status_code(), StatusCode::CREATED);
        response.json::<Value>()["draft_id"]
            .as_str()
            .unwrap()
            .to_string()
    }

    async fn command(&self, draft_id: &str, command: Value) -> Value {
        let response = self
            .server
            .post(&format!("/api/v1/drafts/{}/commands", draft_id))
            .authorization_bearer(&self.alice)
            .json(&command)
            .await;
        assert_eq!(response.status_code(), StatusCode::OK);
        response.json()
    }
}

fn field_ids(view: &Value) -> Vec<String> {
    view["fields"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["id"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_open_empty_draft() {
    let h = setup();

    let response = h
        .server
        .post("/api/v1/drafts")
        .authorization_bearer(&h.alice)
        .json(&json!({}))
        .await;

    assert_eq!(response.status_code(), StatusCode::CREATED);
    let view: Value = response.json();
    assert_eq!(view["fields"], json!([]));
    assert_eq!(view["form_id"], Value::Null);
    assert_eq!(view["meta"]["title"], "Untitled Form");
    assert_eq!(view["settings"]["backgroundColor"], "#ffffff");
}

#[tokio::test]
async fn test_drafts_require_auth() {
    let h = setup();
    let response = h.server.post("/api/v1/drafts").await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_commands_edit_the_draft() {
    let h = setup();
    let draft_id = h.open_draft().await;

    h.command(&draft_id, json!({"op": "add_field", "type": "short_text"}))
        .await;
    h.command(&draft_id, json!({"op": "add_field", "type": "long_text"}))
        .await;
    let view = h
        .command(&draft_id, json!({"op": "add_field", "type": "radio_group"}))
        .await;
    let ids = field_ids(&view);
    assert_eq!(view["fields"][2]["options"], json!(["Option 1"]));
    assert_eq!(view["fields"][0]["label"], "Untitled Question");

    // [A, B, C] -> [B, C, A] -> remove C -> [B, A]
    let reordered = json!([view["fields"][1], view["fields"][2], view["fields"][0]]);
    h.command(&draft_id, json!({"op": "reorder_fields", "fields": reordered}))
        .await;
    let view = h
        .command(&draft_id, json!({"op": "remove_field", "id": ids[2]}))
        .await;
    assert_eq!(field_ids(&view), vec![ids[1].clone(), ids[0].clone()]);

    let view = h
        .command(
            &draft_id,
            json!({"op": "update_label", "id": ids[0], "label": "Full name"}),
        )
        .await;
    let view_after_required = h
        .command(
            &draft_id,
            json!({"op": "toggle_required", "id": ids[0], "required": true}),
        )
        .await;
    assert_eq!(view["fields"][1]["label"], "Full name");
    assert_eq!(view_after_required["fields"][1]["required"], true);

    let view = h
        .command(&draft_id, json!({"op": "move_field", "from": 1, "to": 0}))
        .await;
    assert_eq!(field_ids(&view), vec![ids[0].clone(), ids[1].clone()]);

    h.command(&draft_id, json!({"op": "update_title", "title": "Intro"}))
        .await;
    h.command(&draft_id, json!({"op": "update_subtitle", "subtitle": "Team only"}))
        .await;
    let view = h
        .command(
            &draft_id,
            json!({"op": "update_background_color", "color": "#e0f2fe"}),
        )
        .await;
    assert_eq!(view["meta"], json!({"title": "Intro", "subtitle": "Team only"}));
    assert_eq!(view["settings"]["backgroundColor"], "#e0f2fe");

    let fetched: Value = h
        .server
        .get(&format!("/api/v1/drafts/{}", draft_id))
        .authorization_bearer(&h.alice)
        .await
        .json();
    assert_eq!(fetched["fields"], view["fields"]);
}

#[tokio::test]
async fn test_invalid_command_is_rejected() {
    let h = setup();
    let draft_id = h.open_draft().await;

    let response = h
        .server
        .post(&format!("/api/v1/drafts/{}/commands", draft_id))
        .authorization_bearer(&h.alice)
        .json(&json!({"op": "add_field", "type": "signature"}))
        .await;

    assert!(response.status_code().is_client_error());
}

#[tokio::test]
async fn test_drafts_are_private() {
    let h = setup();
    let draft_id = h.open_draft().await;
    let path = format!("/api/v1/drafts/{}", draft_id);

    let response = h.server.get(&path).authorization_bearer(&h.bob).await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

    let response = h
        .server
        .post(&format!("{}/commands", path))
        .authorization_bearer(&h.bob)
        .json(&json!({"op": "update_title", "title": "Hijacked"}))
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

    let response = h.server.delete(&path).authorization_bearer(&h.bob).await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

    let response = h.server.get(&path).authorization_bearer(&h.alice).await;
    assert_eq!(response.json::<Value>()["meta"]["title"], "Untitled Form");
}

#[tokio::test]
async fn test_discard_draft() {
    let h = setup();
    let draft_id = h.open_draft().await;
    let path = format!("/api/v1/drafts/{}", draft_id);

    let response = h.server.delete(&path).authorization_bearer(&h.alice).await;
    assert_eq!(response.status_code(), StatusCode::NO_CONTENT);

    let response = h.server.get(&path).authorization_bearer(&h.alice).await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(response.json::<Value>()["error"], "Draft not found");
}

#[tokio::test]
async fn test_open_draft_for_missing_form() {
    let h = setup();

    let response = h
        .server
        .post("/api/v1/drafts")
        .authorization_bearer(&h.alice)
        .json(&json!({"form_id": uuid::Uuid::new_v4()}))
        .await;

    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_malformed_command_gets_json_error() {
    let h = setup();
    let draft_id = h.open_draft().await;
    let path = format!("/api/v1/drafts/{}/commands", draft_id);

    let response = h
        .server
        .post(&path)
        .authorization_bearer(&h.alice)
        .json(&json!({"op": "rename_everything"}))
        .await;
    assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json();
    assert_eq!(body["status"], 422);
    assert!(body["error"].as_str().unwrap().contains("rename_everything"));

    let response = h
        .server
        .post(&path)
        .authorization_bearer(&h.alice)
        .text("add_field")
        .await;
    assert_eq!(response.status_code(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(response.json::<Value>()["status"], 415);

    // The draft is untouched
    let view: Value = h
        .server
        .get(&format!("/api/v1/drafts/{}", draft_id))
        .authorization_bearer(&h.alice)
        .await
        .json();
    assert!(view["fields"].as_array().unwrap().is_empty());
}
