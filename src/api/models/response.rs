use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Value given for one question.
///
/// Checkbox groups answer with a list of choices, yes/no questions with a flag,
/// everything else with text. An unanswered radio group is `null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Flag(bool),
    Text(String),
    Choices(Vec<String>),
    #[default]
    Empty,
}

impl AnswerValue {
    /// Whether this answer counts as "not answered" for required checks.
    pub fn is_blank(&self) -> bool {
        match self {
            AnswerValue::Flag(_) => false,
            AnswerValue::Text(text) => text.trim().is_empty(),
            AnswerValue::Choices(choices) => choices.is_empty(),
            AnswerValue::Empty => true,
        }
    }

    /// Flat text form used for tables and CSV cells.
    pub fn display(&self) -> String {
        match self {
            AnswerValue::Flag(flag) => flag.to_string(),
            AnswerValue::Text(text) => text.clone(),
            AnswerValue::Choices(choices) => choices.join(", "),
            AnswerValue::Empty => String::new(),
        }
    }
}

/// One stored answer, keyed by field id and labelled as the form was at submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Answer {
    pub id: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub value: AnswerValue,
}

/// A respondent's submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct FormResponse {
    pub id: Uuid,
    pub form_id: Uuid,
    pub answers: Vec<Answer>,
    pub submitted_at: DateTime<Utc>,
}

impl FormResponse {
    pub fn new(form_id: Uuid, answers: Vec<Answer>) -> Self {
        Self {
            id: Uuid::new_v4(),
            form_id,
            answers,
            submitted_at: Utc::now(),
        }
    }

    pub fn answer(&self, field_id: &str) -> Option<&Answer> {
        self.answers.iter().find(|a| a.id == field_id)
    }
}

/// Raw answer as posted by a respondent.
#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
pub struct SubmittedAnswer {
    pub id: String,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub value: AnswerValue,
}

/// Body of a public submission.
#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
pub struct SubmissionRequest {
    #[serde(default)]
    pub answers: Vec<SubmittedAnswer>,
}
