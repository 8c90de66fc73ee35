//! Builder commands sent by the rendering layer.

use crate::models::{FieldType, FormField};
use serde::{Deserialize, Serialize};

/// One edit to a draft, tagged by `op`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DraftCommand {
    AddField {
        #[serde(rename = "type")]
        field_type: FieldType,
    },
    UpdateLabel {
        id: String,
        label: String,
    },
    UpdateOptions {
        id: String,
        options: Vec<String>,
    },
    ToggleRequired {
        id: String,
        required: bool,
    },
    RemoveField {
        id: String,
    },
    ReorderFields {
        fields: Vec<FormField>,
    },
    /// Positions reported by a completed drag gesture.
    MoveField {
        from: usize,
        to: usize,
    },
    /// Ids reported by a completed drag gesture; `over_id` is absent when
    /// the field was dropped outside the list.
    MoveFieldById {
        active_id: String,
        #[serde(default)]
        over_id: Option<String>,
    },
    UpdateTitle {
        title: String,
    },
    UpdateSubtitle {
        subtitle: String,
    },
    UpdateBackgroundColor {
        color: String,
    },
}

impl DraftCommand {
    /// The `op` tag, for logging.
    pub fn name(&self) -> &'static str {
        match self {
            DraftCommand::AddField { .. } => "add_field",
            DraftCommand::UpdateLabel { .. } => "update_label",
            DraftCommand::UpdateOptions { .. } => "update_options",
            DraftCommand::ToggleRequired { .. } => "toggle_required",
            DraftCommand::RemoveField { .. } => "remove_field",
            DraftCommand::ReorderFields { .. } => "reorder_fields",
            DraftCommand::MoveField { .. } => "move_field",
            DraftCommand::MoveFieldById { .. } => "move_field_by_id",
            DraftCommand::UpdateTitle { .. } => "update_title",
            DraftCommand::UpdateSubtitle { .. } => "update_subtitle",
            DraftCommand::UpdateBackgroundColor { .. } => "update_background_color",
        }
    }
}
