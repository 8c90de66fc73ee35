//! Unit tests for the field and form models

use form_builder_api::models::{
    AnswerValue, FieldType, FormField, FormRecord, FormSettings, FormSnapshot, FormUpdate,
};
use serde_json::json;
use std::str::FromStr;

#[test]
fn test_field_type_wire_names() {
    assert_eq!(
        serde_json::to_value(FieldType::CheckboxGroup).unwrap(),
        json!("checkbox_group")
    );
    for field_type in FieldType::ALL {
        assert_eq!(FieldType::from_str(field_type.as_str()), Ok(field_type));
        assert_eq!(field_type.to_string(), field_type.as_str());
    }
    assert!(FieldType::from_str("signature").is_err());
}

#[test]
fn test_field_type_options() {
    let with_options: Vec<_> = FieldType::ALL
        .into_iter()
        .filter(FieldType::has_options)
        .collect();
    assert_eq!(
        with_options,
        vec![
            FieldType::CheckboxGroup,
            FieldType::RadioGroup,
            FieldType::Select
        ]
    );
    assert_eq!(FieldType::Boolean.display_name(), "Yes/No");
}

#[test]
fn test_field_serializes_type_key() {
    let field = FormField {
        id: "q1".to_string(),
        label: "Name".to_string(),
        field_type: FieldType::ShortText,
        required: true,
        options: None,
    };
    let value = serde_json::to_value(&field).unwrap();
    assert_eq!(
        value,
        json!({"id": "q1", "label": "Name", "type": "short_text", "required": true})
    );
}

#[test]
fn test_field_missing_optional_keys() {
    let field: FormField =
        serde_json::from_value(json!({"id": "q1", "label": "Pick", "type": "select"})).unwrap();
    assert!(!field.required);
    assert_eq!(field.options, None);
    assert!(field.options().is_empty());
    assert_eq!(field.sanitized().options, Some(Vec::new()));
}

#[test]
fn test_settings_use_camel_case() {
    let settings = FormSettings {
        background_color: "#abcdef".to_string(),
    };
    assert_eq!(
        serde_json::to_value(&settings).unwrap(),
        json!({"backgroundColor": "#abcdef"})
    );
    let parsed: FormSettings = serde_json::from_value(json!({})).unwrap();
    assert_eq!(parsed.background_color, "#ffffff");
}

#[test]
fn test_record_update_merges() {
    let mut record = FormRecord::from_snapshot(
        "owner",
        FormSnapshot {
            fields: vec![FormField::new(FieldType::Email)],
            settings: FormSettings::default(),
            meta: Default::default(),
        },
    );
    let created_at = record.created_at;

    record.apply_update(FormUpdate {
        title: Some("Renamed".to_string()),
        ..Default::default()
    });

    assert_eq!(record.title, "Renamed");
    assert_eq!(record.fields.len(), 1);
    assert_eq!(record.created_by, "owner");
    assert!(record.updated_at >= created_at);
}

#[test]
fn test_answer_value_shapes() {
    let flag: AnswerValue = serde_json::from_value(json!(true)).unwrap();
    let text: AnswerValue = serde_json::from_value(json!("hi")).unwrap();
    let choices: AnswerValue = serde_json::from_value(json!(["a", "b"])).unwrap();
    let empty: AnswerValue = serde_json::from_value(json!(null)).unwrap();

    assert_eq!(flag, AnswerValue::Flag(true));
    assert_eq!(choices.display(), "a, b");
    assert_eq!(text.display(), "hi");
    assert!(empty.is_blank());
    assert!(AnswerValue::Text("   ".to_string()).is_blank());
    assert!(AnswerValue::Choices(Vec::new()).is_blank());
    assert!(!AnswerValue::Flag(false).is_blank());
}
