use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::ApiError;

pub const REQUIRED: &str = "This field is required.";
pub const MAY_NOT_BE_NULL: &str = "This field may not be null.";
pub const MAY_NOT_BE_BLANK: &str = "This field may not be blank.";
pub const NOT_A_STRING: &str = "Not a valid string.";
pub const NULL_CHARACTERS: &str = "Null characters are not allowed.";
pub const NO_DATA: &str = "No data provided";

/// Key used for problems with the body as a whole rather than one field.
pub const NON_FIELD_ERRORS: &str = "non_field_errors";

/// Field name to the reasons it was rejected. Serializes as a plain JSON object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, Vec<String>>);

impl ValidationErrors {
    pub fn add(&mut self, field: &str, reason: impl Into<String>) {
        self.0.entry(field.to_string()).or_default().push(reason.into());
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn single(field: &str, reason: impl Into<String>) -> Self {
        let mut errors = ValidationErrors::default();
        errors.add(field, reason);
        errors
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|(field, reasons)| format!("{}: {}", field, reasons.join(" ")))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

/// A title and author that passed validation, ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookFields {
    pub title: String,
    pub author: String,
}

/// The decoded JSON object of a create or update request.
#[derive(Debug, Clone, Default)]
pub struct BookPayload(Map<String, Value>);

impl BookPayload {
    /// Decodes a raw request body. An empty body counts as `{}`.
    pub fn parse(body: &[u8]) -> Result<Self, ApiError> {
        if body.is_empty() {
            return Ok(BookPayload::default());
        }

        let value: Value =
            serde_json::from_slice(body).map_err(|e| ApiError::MalformedJson(e.to_string()))?;

        match value {
            Value::Object(map) => Ok(BookPayload(map)),
            Value::Null => Err(ValidationErrors::single(NON_FIELD_ERRORS, NO_DATA).into()),
            other => Err(ValidationErrors::single(
                NON_FIELD_ERRORS,
                format!("Invalid data. Expected a dictionary, but got {}.", kind_of(&other)),
            )
            .into()),
        }
    }

    /// Checks the body as a complete book. Create and update share this:
    /// an update body must also carry both fields.
    pub fn validate(&self) -> Result<BookFields, ValidationErrors> {
        let mut errors = ValidationErrors::default();
        let title = self.field("title", &mut errors);
        let author = self.field("author", &mut errors);

        match (title, author) {
            (Some(title), Some(author)) if errors.is_empty() => Ok(BookFields { title, author }),
            _ => Err(errors),
        }
    }

    fn field(&self, name: &str, errors: &mut ValidationErrors) -> Option<String> {
        let checked = match self.0.get(name) {
            Some(value) => text_value(value),
            None => Err(REQUIRED),
        };

        checked.map_err(|reason| errors.add(name, reason)).ok()
    }
}

/// Accepts strings (trimmed) and numbers (as written); everything else is rejected.
fn text_value(value: &Value) -> Result<String, &'static str> {
    let text = match value {
        Value::Null => return Err(MAY_NOT_BE_NULL),
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(_) | Value::Array(_) | Value::Object(_) => return Err(NOT_A_STRING),
    };

    if text.is_empty() {
        return Err(MAY_NOT_BE_BLANK);
    }
    // storage truncates text at the first NUL
    if text.contains('\0') {
        return Err(NULL_CHARACTERS);
    }
    Ok(text)
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "NoneType",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "int",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(value: Value) -> BookPayload {
        BookPayload::parse(value.to_string().as_bytes()).unwrap()
    }

    #[test]
    fn test_valid_create() {
        let fields = payload(json!({"title": "Dune", "author": "Frank Herbert"}))
            .validate()
            .unwrap();
        assert_eq!(fields.title, "Dune");
        assert_eq!(fields.author, "Frank Herbert");
    }

    #[test]
    fn test_create_reports_every_bad_field() {
        let errors = payload(json!({"title": ""})).validate().unwrap_err();
        assert_eq!(errors.get("title"), Some(&[MAY_NOT_BE_BLANK.to_string()][..]));
        assert_eq!(errors.get("author"), Some(&[REQUIRED.to_string()][..]));
    }

    #[test]
    fn test_whitespace_is_trimmed_and_blank_rejected() {
        let fields = payload(json!({"title": "  Emma ", "author": "Jane Austen"}))
            .validate()
            .unwrap();
        assert_eq!(fields.title, "Emma");

        let errors = payload(json!({"title": "   ", "author": "Jane Austen"}))
            .validate()
            .unwrap_err();
        assert_eq!(errors.get("title"), Some(&[MAY_NOT_BE_BLANK.to_string()][..]));
        assert!(errors.get("author").is_none());
    }

    #[test]
    fn test_null_and_non_string_values() {
        let errors = payload(json!({"title": null, "author": true}))
            .validate()
            .unwrap_err();
        assert_eq!(errors.get("title"), Some(&[MAY_NOT_BE_NULL.to_string()][..]));
        assert_eq!(errors.get("author"), Some(&[NOT_A_STRING.to_string()][..]));

        let errors = payload(json!({"title": ["a"], "author": {"name": "b"}}))
            .validate()
            .unwrap_err();
        assert_eq!(errors.get("title"), Some(&[NOT_A_STRING.to_string()][..]));
        assert_eq!(errors.get("author"), Some(&[NOT_A_STRING.to_string()][..]));
    }

    #[test]
    fn test_numbers_are_stored_as_text() {
        let fields = payload(json!({"title": 1984, "author": "George Orwell"}))
            .validate()
            .unwrap();
        assert_eq!(fields.title, "1984");
    }

    #[test]
    fn test_id_in_body_is_ignored() {
        let fields = payload(json!({"id": 42, "title": "Dune", "author": "Frank Herbert"}))
            .validate()
            .unwrap();
        assert_eq!(
            fields,
            BookFields {
                title: "Dune".to_string(),
                author: "Frank Herbert".to_string(),
            }
        );
    }

    #[test]
    fn test_body_missing_a_field_is_rejected() {
        let errors = payload(json!({"author": "F. Herbert"})).validate().unwrap_err();
        assert_eq!(errors.get("title"), Some(&[REQUIRED.to_string()][..]));
        assert!(errors.get("author").is_none());
    }

    #[test]
    fn test_null_characters_are_rejected() {
        let errors = payload(json!({"title": "\u{0}", "author": "Frank Herbert"}))
            .validate()
            .unwrap_err();
        assert_eq!(errors.get("title"), Some(&[NULL_CHARACTERS.to_string()][..]));

        let errors = payload(json!({"title": "Dune", "author": "Frank\u{0} Herbert"}))
            .validate()
            .unwrap_err();
        assert_eq!(errors.get("author"), Some(&[NULL_CHARACTERS.to_string()][..]));
        assert!(errors.get("title").is_none());
    }

    #[test]
    fn test_empty_body_is_empty_object() {
        let errors = BookPayload::parse(b"").unwrap().validate().unwrap_err();
        assert_eq!(errors.get("title"), Some(&[REQUIRED.to_string()][..]));
        assert_eq!(errors.get("author"), Some(&[REQUIRED.to_string()][..]));
    }

    #[test]
    fn test_malformed_json() {
        let err = BookPayload::parse(b"{\"title\": ").unwrap_err();
        assert!(matches!(err, ApiError::MalformedJson(_)));
    }

    #[test]
    fn test_non_object_bodies() {
        let err = BookPayload::parse(b"[1, 2]").unwrap_err();
        match err {
            ApiError::Validation(errors) => assert_eq!(
                errors.get(NON_FIELD_ERRORS),
                Some(&["Invalid data. Expected a dictionary, but got list.".to_string()][..])
            ),
            other => panic!("unexpected error: {other:?}"),
        }

        let err = BookPayload::parse(b"null").unwrap_err();
        match err {
            ApiError::Validation(errors) => {
                assert_eq!(errors.get(NON_FIELD_ERRORS), Some(&[NO_DATA.to_string()][..]))
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_errors_serialize_as_field_map() {
        let errors = payload(json!({"title": ""})).validate().unwrap_err();
        assert_eq!(
            serde_json::to_value(&errors).unwrap(),
            json!({
                "title": [MAY_NOT_BE_BLANK],
                "author": [REQUIRED],
            })
        );
    }
}
