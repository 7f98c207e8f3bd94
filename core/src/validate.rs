//! Schema validation shared by the client form path and the server endpoints.
//!
//! A `Schema` is a static table of field rules. `validate` checks an untyped
//! JSON candidate against it and returns either the normalized payload
//! (unknown fields dropped) or the first error per field. Pure; cheap enough
//! to run on every keystroke.
//!
//! Length bounds count Unicode scalar values and do not trim: `"  "` has
//! length 2.

use std::collections::BTreeMap;
use std::fmt;

use serde::ser::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::types::{CreateTodo, UpdateTodo};

pub const TITLE_MIN: usize = 2;
pub const TITLE_MAX: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    Text { min: usize, max: usize },
    Flag,
}

impl Rule {
    fn expected(self) -> &'static str {
        match self {
            Rule::Text { .. } => "string",
            Rule::Flag => "boolean",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub name: &'static str,
    pub rule: Rule,
    pub required: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct Schema {
    pub fields: &'static [FieldRule],
}

const TITLE_RULE: Rule = Rule::Text {
    min: TITLE_MIN,
    max: TITLE_MAX,
};

pub const CREATE_SCHEMA: Schema = Schema {
    fields: &[FieldRule {
        name: "title",
        rule: TITLE_RULE,
        required: true,
    }],
};

pub const UPDATE_SCHEMA: Schema = Schema {
    fields: &[
        FieldRule {
            name: "title",
            rule: TITLE_RULE,
            required: false,
        },
        FieldRule {
            name: "completed",
            rule: Rule::Flag,
            required: false,
        },
    ],
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldErrorKind {
    Required,
    WrongType { expected: &'static str },
    TooShort { min: usize },
    TooLong { max: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub kind: FieldErrorKind,
}

impl FieldError {
    /// Localization key for this failure kind.
    pub fn message_key(&self) -> &'static str {
        match self.kind {
            FieldErrorKind::Required => "validation.required",
            FieldErrorKind::WrongType { .. } => "validation.wrong_type",
            FieldErrorKind::TooShort { .. } => "validation.too_short",
            FieldErrorKind::TooLong { .. } => "validation.too_long",
        }
    }

    /// Interpolation arguments for `message_key`, except `field`, whose label
    /// the caller localizes.
    pub fn args(&self) -> Vec<(&'static str, String)> {
        match self.kind {
            FieldErrorKind::Required => Vec::new(),
            FieldErrorKind::WrongType { expected } => vec![("expected", expected.to_string())],
            FieldErrorKind::TooShort { min } => vec![("min", min.to_string())],
            FieldErrorKind::TooLong { max } => vec![("max", max.to_string())],
        }
    }

    /// Deterministic English message.
    pub fn message(&self) -> String {
        let label = label(self.field);
        match self.kind {
            FieldErrorKind::Required => format!("{label} is required"),
            FieldErrorKind::WrongType { expected } => format!("{label} must be a {expected}"),
            FieldErrorKind::TooShort { min } => {
                format!("{label} must be at least {min} characters")
            }
            FieldErrorKind::TooLong { max } => {
                format!("{label} must be at most {max} characters")
            }
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

fn label(field: &str) -> String {
    let mut chars = field.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// First error per field, ordered by field name.
///
/// Serializes as a `{ field: message }` map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<&'static str, FieldError>);

impl FieldErrors {
    fn push(&mut self, error: FieldError) {
        self.0.entry(error.field).or_insert(error);
    }

    pub fn get(&self, field: &str) -> Option<&FieldError> {
        self.0.get(field)
    }

    pub fn message(&self, field: &str) -> Option<String> {
        self.get(field).map(FieldError::message)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.values()
    }
}

impl Serialize for FieldErrors {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|(field, error)| (*field, error.message())))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation<T> {
    Valid(T),
    Invalid(FieldErrors),
}

impl<T> Validation<T> {
    pub fn is_valid(&self) -> bool {
        matches!(self, Validation::Valid(_))
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Validation<U> {
        match self {
            Validation::Valid(data) => Validation::Valid(f(data)),
            Validation::Invalid(errors) => Validation::Invalid(errors),
        }
    }

    pub fn into_result(self) -> Result<T, FieldErrors> {
        match self {
            Validation::Valid(data) => Ok(data),
            Validation::Invalid(errors) => Err(errors),
        }
    }
}

fn check(rule: &FieldRule, value: &Value) -> Result<(), FieldErrorKind> {
    let wrong_type = FieldErrorKind::WrongType {
        expected: rule.rule.expected(),
    };
    match (rule.rule, value) {
        (Rule::Text { min, max }, Value::String(text)) => {
            let len = text.chars().count();
            if len < min {
                Err(FieldErrorKind::TooShort { min })
            } else if len > max {
                Err(FieldErrorKind::TooLong { max })
            } else {
                Ok(())
            }
        }
        (Rule::Flag, Value::Bool(_)) => Ok(()),
        _ => Err(wrong_type),
    }
}

/// Validate `candidate` against `schema`. Non-object candidates are treated
/// as an empty object.
pub fn validate(candidate: &Value, schema: &Schema) -> Validation<Map<String, Value>> {
    let empty = Map::new();
    let object = candidate.as_object().unwrap_or(&empty);

    let mut data = Map::new();
    let mut errors = FieldErrors::default();
    for rule in schema.fields {
        match object.get(rule.name) {
            None if rule.required => errors.push(FieldError {
                field: rule.name,
                kind: FieldErrorKind::Required,
            }),
            None => {}
            Some(value) => match check(rule, value) {
                Ok(()) => {
                    data.insert(rule.name.to_string(), value.clone());
                }
                Err(kind) => errors.push(FieldError {
                    field: rule.name,
                    kind,
                }),
            },
        }
    }

    if errors.is_empty() {
        Validation::Valid(data)
    } else {
        Validation::Invalid(errors)
    }
}

fn take_text(data: &mut Map<String, Value>, name: &str) -> Option<String> {
    match data.remove(name) {
        Some(Value::String(text)) => Some(text),
        _ => None,
    }
}

pub fn validate_create(candidate: &Value) -> Validation<CreateTodo> {
    validate(candidate, &CREATE_SCHEMA).map(|mut data| CreateTodo {
        title: take_text(&mut data, "title").unwrap_or_default(),
    })
}

pub fn validate_update(candidate: &Value) -> Validation<UpdateTodo> {
    validate(candidate, &UPDATE_SCHEMA).map(|mut data| UpdateTodo {
        title: take_text(&mut data, "title"),
        completed: data.get("completed").and_then(Value::as_bool),
    })
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use serde_json::json;

    use super::*;

    fn title_error(candidate: Value) -> String {
        match validate_create(&candidate) {
            Validation::Invalid(errors) => errors.message("title").unwrap(),
            Validation::Valid(data) => panic!("expected failure, got {data:?}"),
        }
    }

    #[test]
    fn accepts_valid_create_and_drops_unknown_fields() {
        let result = validate_create(&json!({ "title": "Buy milk", "extra": 1 }));
        assert_eq!(result, Validation::Valid(CreateTodo::new("Buy milk")));
    }

    #[test]
    fn create_messages_are_deterministic() {
        assert_eq!(title_error(json!({})), "Title is required");
        assert_eq!(title_error(json!({ "title": 5 })), "Title must be a string");
        assert_eq!(title_error(json!({ "title": null })), "Title must be a string");
        assert_eq!(
            title_error(json!({ "title": "a" })),
            "Title must be at least 2 characters"
        );
        assert_eq!(
            title_error(json!({ "title": "x".repeat(101) })),
            "Title must be at most 100 characters"
        );
    }

    #[test]
    fn whitespace_counts_toward_length() {
        assert!(validate_create(&json!({ "title": "  " })).is_valid());
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        assert!(validate_create(&json!({ "title": "é".repeat(100) })).is_valid());
        assert!(!validate_create(&json!({ "title": "é".repeat(101) })).is_valid());
    }

    #[test]
    fn non_object_candidate_reports_required() {
        assert_eq!(title_error(json!("Buy milk")), "Title is required");
    }

    #[test]
    fn update_fields_are_optional_but_bounded() {
        assert_eq!(
            validate_update(&json!({})),
            Validation::Valid(UpdateTodo::default())
        );
        assert_eq!(
            validate_update(&json!({ "completed": true })),
            Validation::Valid(UpdateTodo::completed(true))
        );

        let Validation::Invalid(errors) = validate_update(&json!({ "title": "a", "completed": "yes" }))
        else {
            panic!("expected failure");
        };
        assert_eq!(errors.len(), 2);
        assert_eq!(
            errors.message("completed").as_deref(),
            Some("Completed must be a boolean")
        );
        assert_eq!(errors.get("title").unwrap().message_key(), "validation.too_short");
    }

    #[test]
    fn field_errors_serialize_as_message_map() {
        let Validation::Invalid(errors) = validate_create(&json!({ "title": "" })) else {
            panic!("expected failure");
        };
        assert_eq!(
            serde_json::to_value(&errors).unwrap(),
            json!({ "title": "Title must be at least 2 characters" })
        );
    }

    proptest! {
        #[test]
        fn in_range_titles_pass(title in "[a-zA-Z0-9 ]{2,100}") {
            let candidate = json!({ "title": title });
            prop_assert!(validate_create(&candidate).is_valid());
        }

        #[test]
        fn short_titles_fail(title in "[a-z]{0,1}") {
            let candidate = json!({ "title": title });
            prop_assert!(!validate_create(&candidate).is_valid());
        }

        #[test]
        fn long_titles_fail(title in "[a-z]{101,200}") {
            let candidate = json!({ "title": title });
            prop_assert!(!validate_update(&candidate).is_valid());
        }

        #[test]
        fn non_string_titles_fail(n in any::<i64>(), flag in any::<bool>()) {
            let number = json!({ "title": n });
            let boolean = json!({ "title": flag });
            prop_assert!(!validate_create(&number).is_valid());
            prop_assert!(!validate_create(&boolean).is_valid());
        }

        #[test]
        fn non_boolean_completed_fails(n in any::<i64>(), text in ".*") {
            let number = json!({ "completed": n });
            let string = json!({ "completed": text });
            prop_assert!(!validate_update(&number).is_valid());
            prop_assert!(!validate_update(&string).is_valid());
        }
    }
}
