//! Validation of public form submissions.
//!
//! Respondents post raw answers keyed by field id. Before anything is stored the
//! answers are checked against the published form and normalized: labels come
//! from the form, unknown ids are dropped and answers follow field order.

use crate::models::{Answer, AnswerValue, FieldType, FormField, FormRecord, SubmittedAnswer};
use chrono::NaiveDate;
use std::collections::HashMap;
use thiserror::Error;
use tracing::warn;

/// Why a submission was rejected.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SubmissionError {
    #[error("Field \"{label}\" is required")]
    MissingRequired { field_id: String, label: String },
    #[error("Field \"{label}\" expects {expected}")]
    WrongShape {
        field_id: String,
        label: String,
        expected: &'static str,
    },
    #[error("Field \"{label}\" has no option \"{value}\"")]
    UnknownOption {
        field_id: String,
        label: String,
        value: String,
    },
    #[error("Field \"{label}\" is not a valid {field_type}: \"{value}\"")]
    InvalidValue {
        field_id: String,
        label: String,
        field_type: FieldType,
        value: String,
    },
}

/// Submission validation service.
pub struct SubmissionService;

impl SubmissionService {
    /// Check `submitted` against `form` and produce the answers to store.
    pub fn prepare_answers(
        form: &FormRecord,
        submitted: Vec<SubmittedAnswer>,
    ) -> Result<Vec<Answer>, SubmissionError> {
        let mut by_id: HashMap<String, AnswerValue> = HashMap::new();
        for answer in submitted {
            if form.field(&answer.id).is_none() {
                warn!(
                    "Dropping answer for unknown field {} on form {}",
                    answer.id, form.id
                );
                continue;
            }
            by_id.insert(answer.id, answer.value);
        }

        let mut answers = Vec::with_capacity(form.fields.len());
        for field in &form.fields {
            let value = by_id.remove(&field.id).unwrap_or_default();
            Self::check_field(field, &value)?;
            answers.push(Answer {
                id: field.id.clone(),
                label: field.label.clone(),
                value,
            });
        }
        Ok(answers)
    }

    fn check_field(field: &FormField, value: &AnswerValue) -> Result<(), SubmissionError> {
        if value.is_blank() {
            return if field.required {
                Err(SubmissionError::MissingRequired {
                    field_id: field.id.clone(),
                    label: field.label.clone(),
                })
            } else {
                Ok(())
            };
        }

        match field.field_type {
            FieldType::Boolean => match value {
                AnswerValue::Flag(_) => Ok(()),
                _ => Err(Self::wrong_shape(field, "a yes/no value")),
            },
            FieldType::CheckboxGroup => match value {
                AnswerValue::Choices(choices) => choices
                    .iter()
                    .try_for_each(|choice| Self::check_option(field, choice)),
                _ => Err(Self::wrong_shape(field, "a list of choices")),
            },
            FieldType::RadioGroup | FieldType::Select => match value {
                AnswerValue::Text(text) => Self::check_option(field, text),
                _ => Err(Self::wrong_shape(field, "a single choice")),
            },
            FieldType::ShortText | FieldType::LongText => match value {
                AnswerValue::Text(_) => Ok(()),
                _ => Err(Self::wrong_shape(field, "text")),
            },
            FieldType::Email => match value {
                AnswerValue::Text(text) if text.contains('@') => Ok(()),
                AnswerValue::Text(text) => Err(Self::invalid(field, text)),
                _ => Err(Self::wrong_shape(field, "text")),
            },
            FieldType::Number => match value {
                AnswerValue::Text(text) if text.trim().parse::<f64>().is_ok() => Ok(()),
                AnswerValue::Text(text) => Err(Self::invalid(field, text)),
                _ => Err(Self::wrong_shape(field, "text")),
            },
            FieldType::Date => match value {
                AnswerValue::Text(text)
                    if NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d").is_ok() =>
                {
                    Ok(())
                }
                AnswerValue::Text(text) => Err(Self::invalid(field, text)),
                _ => Err(Self::wrong_shape(field, "text")),
            },
        }
    }

    fn check_option(field: &FormField, value: &str) -> Result<(), SubmissionError> {
        if field.options().iter().any(|option| option == value) {
            Ok(())
        } else {
            Err(SubmissionError::UnknownOption {
                field_id: field.id.clone(),
                label: field.label.clone(),
                value: value.to_string(),
            })
        }
    }

    fn wrong_shape(field: &FormField, expected: &'static str) -> SubmissionError {
        SubmissionError::WrongShape {
            field_id: field.id.clone(),
            label: field.label.clone(),
            expected,
        }
    }

    fn invalid(field: &FormField, value: &str) -> SubmissionError {
        SubmissionError::InvalidValue {
            field_id: field.id.clone(),
            label: field.label.clone(),
            field_type: field.field_type,
            value: value.to_string(),
        }
    }
}
