use super::field::FormField;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Title used when a form is published without one.
pub const DEFAULT_FORM_TITLE: &str = "Untitled Form";

/// Background color used when none is configured.
pub const DEFAULT_BACKGROUND_COLOR: &str = "#ffffff";

/// Display settings for a form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FormSettings {
    #[serde(default = "default_background_color")]
    pub background_color: String,
}

fn default_background_color() -> String {
    DEFAULT_BACKGROUND_COLOR.to_string()
}

impl Default for FormSettings {
    fn default() -> Self {
        Self {
            background_color: default_background_color(),
        }
    }
}

/// Public title and internal subtitle of a form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct FormMeta {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
}

impl Default for FormMeta {
    fn default() -> Self {
        Self {
            title: DEFAULT_FORM_TITLE.to_string(),
            subtitle: String::new(),
        }
    }
}

/// Persistence-ready copy of a draft with all defaults applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct FormSnapshot {
    pub fields: Vec<FormField>,
    pub settings: FormSettings,
    pub meta: FormMeta,
}

/// A published form as held by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct FormRecord {
    pub id: Uuid,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(default)]
    pub fields: Vec<FormField>,
    #[serde(default)]
    pub settings: FormSettings,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FormRecord {
    /// Build a fresh record for `owner_id` from a published snapshot.
    pub fn from_snapshot(owner_id: &str, snapshot: FormSnapshot) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: snapshot.meta.title,
            subtitle: snapshot.meta.subtitle,
            fields: snapshot.fields,
            settings: snapshot.settings,
            created_by: owner_id.to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Merge a partial update into this record, bumping `updated_at`.
    pub fn apply_update(&mut self, update: FormUpdate) {
        if let Some(title) = update.title {
            self.title = title;
        }
        if let Some(subtitle) = update.subtitle {
            self.subtitle = subtitle;
        }
        if let Some(fields) = update.fields {
            self.fields = fields;
        }
        if let Some(settings) = update.settings {
            self.settings = settings;
        }
        self.updated_at = Utc::now();
    }

    pub fn meta(&self) -> FormMeta {
        FormMeta {
            title: self.title.clone(),
            subtitle: self.subtitle.clone(),
        }
    }

    pub fn field(&self, field_id: &str) -> Option<&FormField> {
        self.fields.iter().find(|f| f.id == field_id)
    }
}

/// Partial update of a form record; absent members are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct FormUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<FormField>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<FormSettings>,
}

impl From<FormSnapshot> for FormUpdate {
    fn from(snapshot: FormSnapshot) -> Self {
        Self {
            title: Some(snapshot.meta.title),
            subtitle: Some(snapshot.meta.subtitle),
            fields: Some(snapshot.fields),
            settings: Some(snapshot.settings),
        }
    }
}

/// What respondents see: the form without ownership details.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct PublicForm {
    pub id: Uuid,
    pub title: String,
    pub subtitle: String,
    pub fields: Vec<FormField>,
    pub settings: FormSettings,
}

impl From<FormRecord> for PublicForm {
    fn from(record: FormRecord) -> Self {
        Self {
            id: record.id,
            title: record.title,
            subtitle: record.subtitle,
            fields: record.fields,
            settings: record.settings,
        }
    }
}

/// Dashboard listing entry for one form.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct FormSummary {
    pub id: Uuid,
    pub title: String,
    pub subtitle: String,
    pub field_count: usize,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&FormRecord> for FormSummary {
    fn from(record: &FormRecord) -> Self {
        Self {
            id: record.id,
            title: record.title.clone(),
            subtitle: record.subtitle.clone(),
            field_count: record.fields.len(),
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}
