use serde::{Deserialize, Serialize};

/// Kind of question a form field asks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    ShortText,
    LongText,
    Email,
    CheckboxGroup,
    RadioGroup,
    Boolean,
    Select,
    Date,
    Number,
}

impl FieldType {
    /// Every field type, in builder palette order.
    pub const ALL: [FieldType; 9] = [
        FieldType::ShortText,
        FieldType::LongText,
        FieldType::Email,
        FieldType::CheckboxGroup,
        FieldType::RadioGroup,
        FieldType::Boolean,
        FieldType::Select,
        FieldType::Date,
        FieldType::Number,
    ];

    /// Whether fields of this type carry a list of options.
    pub fn has_options(&self) -> bool {
        match self {
            FieldType::CheckboxGroup | FieldType::RadioGroup | FieldType::Select => true,
            FieldType::ShortText
            | FieldType::LongText
            | FieldType::Email
            | FieldType::Boolean
            | FieldType::Date
            | FieldType::Number => false,
        }
    }

    /// Wire name, matching the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::ShortText => "short_text",
            FieldType::LongText => "long_text",
            FieldType::Email => "email",
            FieldType::CheckboxGroup => "checkbox_group",
            FieldType::RadioGroup => "radio_group",
            FieldType::Boolean => "boolean",
            FieldType::Select => "select",
            FieldType::Date => "date",
            FieldType::Number => "number",
        }
    }

    /// Name shown on the builder's "add field" palette.
    pub fn display_name(&self) -> &'static str {
        match self {
            FieldType::ShortText => "Short Text",
            FieldType::LongText => "Paragraph",
            FieldType::Email => "Email",
            FieldType::CheckboxGroup => "Checkboxes",
            FieldType::RadioGroup => "Multiple Choice",
            FieldType::Boolean => "Yes/No",
            FieldType::Select => "Dropdown",
            FieldType::Date => "Date",
            FieldType::Number => "Number",
        }
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for FieldType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FieldType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("Unknown field type: {}", s))
    }
}
