// Models module - contains form fields, form records, and respondent submissions

#[path = "enums.rs"]
pub mod enums;
pub mod field;
pub mod form;
pub mod response;

pub use enums::FieldType;
pub use field::FormField;
pub use form::{
    FormMeta, FormRecord, FormSettings, FormSnapshot, FormSummary, FormUpdate, PublicForm,
};
pub use response::{Answer, AnswerValue, FormResponse, SubmissionRequest, SubmittedAnswer};
