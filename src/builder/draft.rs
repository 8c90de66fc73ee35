//! In-progress state of a form being authored.

use super::command::DraftCommand;
use super::reorder::move_item;
use crate::models::form::{DEFAULT_BACKGROUND_COLOR, DEFAULT_FORM_TITLE};
use crate::models::{FieldType, FormField, FormMeta, FormRecord, FormSettings, FormSnapshot};
use crate::storage::{FormStore, StorageError, UserContext};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

/// Where a published snapshot goes.
#[derive(Debug, Clone)]
pub enum PublishTarget {
    /// Create a new form owned by this user.
    NewForm(UserContext),
    /// Overwrite an existing form's content (edit flow).
    ExistingForm(Uuid),
}

/// Editable fields, metadata and display settings for one form.
///
/// Every mutation is synchronous and touches only this value. Operations that
/// address a field by id silently do nothing when the id is unknown.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormDraft {
    fields: Vec<FormField>,
    settings: FormSettings,
    meta: FormMeta,
}

impl FormDraft {
    /// Empty draft for a brand new form.
    pub fn new() -> Self {
        Self::default()
    }

    /// Draft pre-populated with existing content.
    pub fn with_content(fields: Vec<FormField>, settings: FormSettings, meta: FormMeta) -> Self {
        Self {
            fields,
            settings,
            meta,
        }
    }

    /// Draft for editing a persisted form. A blank stored title opens as the placeholder.
    pub fn from_record(record: &FormRecord) -> Self {
        let mut meta = record.meta();
        if meta.title.is_empty() {
            meta.title = DEFAULT_FORM_TITLE.to_string();
        }
        Self::with_content(record.fields.clone(), record.settings.clone(), meta)
    }

    pub fn fields(&self) -> &[FormField] {
        &self.fields
    }

    pub fn settings(&self) -> &FormSettings {
        &self.settings
    }

    pub fn meta(&self) -> &FormMeta {
        &self.meta
    }

    pub fn field(&self, id: &str) -> Option<&FormField> {
        self.fields.iter().find(|f| f.id == id)
    }

    fn field_mut(&mut self, id: &str) -> Option<&mut FormField> {
        self.fields.iter_mut().find(|f| f.id == id)
    }

    /// Append a new question and return its generated id.
    pub fn add_field(&mut self, field_type: FieldType) -> String {
        let field = FormField::new(field_type);
        let id = field.id.clone();
        self.fields.push(field);
        id
    }

    pub fn update_label(&mut self, id: &str, label: impl Into<String>) {
        if let Some(field) = self.field_mut(id) {
            field.label = label.into();
        }
    }

    /// Replace a field's options verbatim: no trimming, blanks and duplicates kept.
    pub fn update_options(&mut self, id: &str, options: Vec<String>) {
        if let Some(field) = self.field_mut(id) {
            field.options = Some(options);
        }
    }

    pub fn toggle_required(&mut self, id: &str, required: bool) {
        if let Some(field) = self.field_mut(id) {
            field.required = required;
        }
    }

    pub fn remove_field(&mut self, id: &str) {
        self.fields.retain(|f| f.id != id);
    }

    /// Replace the field order wholesale. The sequence is trusted as-is.
    pub fn reorder_fields(&mut self, fields: Vec<FormField>) {
        self.fields = fields;
    }

    /// Move the field at `from` to `to`. Returns whether anything was applied.
    pub fn move_field(&mut self, from: usize, to: usize) -> bool {
        move_item(&mut self.fields, from, to)
    }

    /// Move the dragged field (`active_id`) to the slot of the field it was dropped on.
    pub fn move_field_by_id(&mut self, active_id: &str, over_id: &str) -> bool {
        if active_id == over_id {
            return false;
        }
        let from = self.fields.iter().position(|f| f.id == active_id);
        let to = self.fields.iter().position(|f| f.id == over_id);
        match (from, to) {
            (Some(from), Some(to)) => self.move_field(from, to),
            _ => false,
        }
    }

    pub fn update_title(&mut self, title: impl Into<String>) {
        self.meta.title = title.into();
    }

    pub fn update_subtitle(&mut self, subtitle: impl Into<String>) {
        self.meta.subtitle = subtitle.into();
    }

    pub fn update_background_color(&mut self, color: impl Into<String>) {
        self.settings.background_color = color.into();
    }

    /// Apply one builder command.
    pub fn apply(&mut self, command: DraftCommand) {
        debug!("Applying draft command: {}", command.name());
        match command {
            DraftCommand::AddField { field_type } => {
                self.add_field(field_type);
            }
            DraftCommand::UpdateLabel { id, label } => self.update_label(&id, label),
            DraftCommand::UpdateOptions { id, options } => self.update_options(&id, options),
            DraftCommand::ToggleRequired { id, required } => self.toggle_required(&id, required),
            DraftCommand::RemoveField { id } => self.remove_field(&id),
            DraftCommand::ReorderFields { fields } => self.reorder_fields(fields),
            DraftCommand::MoveField { from, to } => {
                self.move_field(from, to);
            }
            DraftCommand::MoveFieldById { active_id, over_id } => {
                if let Some(over_id) = over_id {
                    self.move_field_by_id(&active_id, &over_id);
                }
            }
            DraftCommand::UpdateTitle { title } => self.update_title(title),
            DraftCommand::UpdateSubtitle { subtitle } => self.update_subtitle(subtitle),
            DraftCommand::UpdateBackgroundColor { color } => self.update_background_color(color),
        }
    }

    /// Sanitized, persistence-ready copy of the draft.
    ///
    /// This is the only place defaults are enforced: absent options become an
    /// empty list, a blank title becomes "Untitled Form" and a blank background
    /// color falls back to the neutral default.
    pub fn snapshot(&self) -> FormSnapshot {
        let title = if self.meta.title.is_empty() {
            DEFAULT_FORM_TITLE.to_string()
        } else {
            self.meta.title.clone()
        };
        let background_color = if self.settings.background_color.is_empty() {
            DEFAULT_BACKGROUND_COLOR.to_string()
        } else {
            self.settings.background_color.clone()
        };

        FormSnapshot {
            fields: self.fields.iter().map(FormField::sanitized).collect(),
            settings: FormSettings { background_color },
            meta: FormMeta {
                title,
                subtitle: self.meta.subtitle.clone(),
            },
        }
    }

    /// Hand the sanitized snapshot to the store. Returns the id of the published form.
    ///
    /// The draft is never modified; on failure the caller may simply retry.
    pub async fn publish(
        &self,
        store: &dyn FormStore,
        target: &PublishTarget,
    ) -> Result<Uuid, StorageError> {
        let snapshot = self.snapshot();
        let field_count = snapshot.fields.len();

        let form_id = match target {
            PublishTarget::NewForm(owner) => store.create_form(owner, snapshot).await?,
            PublishTarget::ExistingForm(form_id) => {
                store.update_form(*form_id, snapshot.into()).await?.id
            }
        };

        info!("Published form {} with {} field(s)", form_id, field_count);
        Ok(form_id)
    }
}
