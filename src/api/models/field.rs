use super::enums::FieldType;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Label given to freshly added questions.
pub const DEFAULT_FIELD_LABEL: &str = "Untitled Question";

/// Seed option for freshly added option-bearing questions.
pub const DEFAULT_OPTION_LABEL: &str = "Option 1";

/// One question in a form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct FormField {
    pub id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
}

impl FormField {
    /// Build a new question of the given type with a freshly generated id.
    pub fn new(field_type: FieldType) -> Self {
        let options = if field_type.has_options() {
            vec![DEFAULT_OPTION_LABEL.to_string()]
        } else {
            Vec::new()
        };

        Self {
            id: Uuid::new_v4().to_string(),
            label: DEFAULT_FIELD_LABEL.to_string(),
            field_type,
            required: false,
            options: Some(options),
        }
    }

    /// Options as a slice, empty when absent.
    pub fn options(&self) -> &[String] {
        self.options.as_deref().unwrap_or(&[])
    }

    /// Copy of this field with `options` always present.
    pub fn sanitized(&self) -> Self {
        Self {
            options: Some(self.options.clone().unwrap_or_default()),
            ..self.clone()
        }
    }
}
