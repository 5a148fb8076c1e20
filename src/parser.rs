//! Strict structured-output parsing for model responses.
//!
//! The model text must be one complete JSON document matching the declared
//! [`SchemaDescriptor`] exactly — no markdown-fence stripping, no bracket
//! hunting, no repair. Anything else is a [`ParseError`] carrying the reason
//! and a truncated copy of the raw text, which the HTTP layer surfaces as a
//! client-visible 422.

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use crate::schema::{
    DiaryAnalysis, FieldSpec, SchemaDescriptor, Shape, TaskList, TaskReview, DIARY_SCHEMA,
    REVIEW_SCHEMA, TASK_LIST_SCHEMA,
};

/// Errors returned by the structured-output parser.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The model response was empty or whitespace-only.
    #[error("empty model response")]
    EmptyResponse,

    /// The response is not well-formed JSON.
    #[error("model output is not valid JSON: {reason} (raw: {raw})")]
    Syntax { reason: String, raw: String },

    /// The top-level JSON value has the wrong shape for the schema.
    #[error("model output must be a JSON {expected} (raw: {raw})")]
    WrongShape {
        expected: &'static str,
        raw: String,
    },

    /// A required object field is absent.
    #[error("required field '{field}' is missing (raw: {raw})")]
    MissingField {
        field: &'static str,
        raw: String,
    },

    /// A field's value does not satisfy its declared shape.
    #[error("field '{field}' must be a {expected} (raw: {raw})")]
    TypeMismatch {
        field: &'static str,
        expected: &'static str,
        raw: String,
    },

    /// A string field holds a value outside its allowed set.
    #[error("field '{field}' has disallowed value '{value}' (allowed: {allowed:?})")]
    DisallowedValue {
        field: &'static str,
        value: String,
        allowed: &'static [&'static str],
    },

    /// The task array was empty.
    #[error("task list must contain at least one task (raw: {raw})")]
    EmptyTaskList { raw: String },

    /// A task string was empty after trimming.
    #[error("task at index {index} is empty after trimming")]
    BlankTask { index: usize },
}

/// Truncate to at most `max_chars` characters, appending "..." if truncated.
pub(crate) fn truncate(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}...", &s[..byte_idx]),
        None => s.to_string(),
    }
}

/// Parse `raw` as one complete JSON document and validate it against `schema`.
pub fn parse_value(raw: &str, schema: &SchemaDescriptor) -> Result<Value, ParseError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ParseError::EmptyResponse);
    }

    let value: Value = serde_json::from_str(trimmed).map_err(|e| ParseError::Syntax {
        reason: e.to_string(),
        raw: truncate(trimmed, 200),
    })?;

    validate(&value, schema, trimmed)?;
    Ok(value)
}

/// Parse and deserialize into a typed `T` after schema validation.
fn parse_typed<T: DeserializeOwned>(raw: &str, schema: &SchemaDescriptor) -> Result<T, ParseError> {
    let value = parse_value(raw, schema)?;
    serde_json::from_value(value).map_err(|e| ParseError::Syntax {
        reason: e.to_string(),
        raw: truncate(raw.trim(), 200),
    })
}

/// Parse planner output: a bare top-level array of ≥1 non-empty strings.
pub fn parse_task_list(raw: &str) -> Result<TaskList, ParseError> {
    let tasks: Vec<String> = parse_typed(raw, &TASK_LIST_SCHEMA)?;
    Ok(TaskList { tasks })
}

/// Parse diary-analyzer output: `{mood, emoji, keywords, suggestions}`.
pub fn parse_diary_analysis(raw: &str) -> Result<DiaryAnalysis, ParseError> {
    parse_typed(raw, &DIARY_SCHEMA)
}

/// Parse reviewer output: `{valid, missing_tasks, issues}`.
pub fn parse_task_review(raw: &str) -> Result<TaskReview, ParseError> {
    parse_typed(raw, &REVIEW_SCHEMA)
}

/// Field-by-field validation walk.
fn validate(value: &Value, schema: &SchemaDescriptor, raw: &str) -> Result<(), ParseError> {
    match schema {
        SchemaDescriptor::NonEmptyStringArray => {
            let items = value.as_array().ok_or_else(|| ParseError::WrongShape {
                expected: "array",
                raw: truncate(raw, 200),
            })?;
            if items.is_empty() {
                return Err(ParseError::EmptyTaskList {
                    raw: truncate(raw, 200),
                });
            }
            for (index, item) in items.iter().enumerate() {
                let text = item.as_str().ok_or_else(|| ParseError::TypeMismatch {
                    field: "[]",
                    expected: "string",
                    raw: truncate(raw, 200),
                })?;
                if text.trim().is_empty() {
                    return Err(ParseError::BlankTask { index });
                }
            }
            Ok(())
        }
        SchemaDescriptor::Object(fields) => {
            let obj = value.as_object().ok_or_else(|| ParseError::WrongShape {
                expected: "object",
                raw: truncate(raw, 200),
            })?;
            for field in *fields {
                match obj.get(field.name) {
                    Some(v) => check_shape(field, v, raw)?,
                    None if field.required => {
                        return Err(ParseError::MissingField {
                            field: field.name,
                            raw: truncate(raw, 200),
                        })
                    }
                    None => {}
                }
            }
            Ok(())
        }
    }
}

fn check_shape(field: &FieldSpec, value: &Value, raw: &str) -> Result<(), ParseError> {
    let mismatch = |expected: &'static str| ParseError::TypeMismatch {
        field: field.name,
        expected,
        raw: truncate(raw, 200),
    };

    match field.shape {
        Shape::String => {
            value.as_str().ok_or_else(|| mismatch("string"))?;
        }
        Shape::Bool => {
            value.as_bool().ok_or_else(|| mismatch("boolean"))?;
        }
        Shape::StringArray => {
            let items = value.as_array().ok_or_else(|| mismatch("array of strings"))?;
            if !items.iter().all(Value::is_string) {
                return Err(mismatch("array of strings"));
            }
        }
        Shape::Enum(allowed) => {
            let text = value.as_str().ok_or_else(|| mismatch("string"))?;
            if !allowed.contains(&text) {
                return Err(ParseError::DisallowedValue {
                    field: field.name,
                    value: text.to_string(),
                    allowed,
                });
            }
        }
    }
    Ok(())
}
