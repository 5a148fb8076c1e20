//! Typed result models and their declared schemas.
//!
//! Each pipeline declares the shape of the model output it expects as a
//! [`SchemaDescriptor`]. The descriptors are data, not code — the validation
//! walk lives in [`crate::parser`]. Note the deliberate asymmetry: the task
//! planner expects a bare top-level JSON array while the diary and review
//! pipelines expect top-level objects.

use serde::{Deserialize, Serialize};

/// Ordered development tasks decomposed from a feature request.
///
/// Invariant: non-empty, and every task is non-empty after trimming.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskList {
    pub tasks: Vec<String>,
}

/// Overall diary mood.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Positive,
    Negative,
    Neutral,
}

impl Mood {
    pub fn as_str(self) -> &'static str {
        match self {
            Mood::Positive => "positive",
            Mood::Negative => "negative",
            Mood::Neutral => "neutral",
        }
    }
}

/// Structured diary-sentiment result.
///
/// `keywords` (4–5) and `suggestions` (3) counts are steered by the prompt,
/// not enforced by the parser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiaryAnalysis {
    pub mood: Mood,
    pub emoji: String,
    pub keywords: Vec<String>,
    pub suggestions: Vec<String>,
}

/// Reviewer verdict on a task list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskReview {
    pub valid: bool,
    #[serde(default)]
    pub missing_tasks: Vec<String>,
    #[serde(default)]
    pub issues: Vec<String>,
}

/// Shape of a single JSON field.
#[derive(Debug, Clone, Copy)]
pub enum Shape {
    String,
    Bool,
    StringArray,
    /// A string restricted to a fixed set of values.
    Enum(&'static [&'static str]),
}

/// One required or optional field of an object schema.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub shape: Shape,
    pub required: bool,
}

/// Declared schema for one pipeline's model output.
#[derive(Debug, Clone, Copy)]
pub enum SchemaDescriptor {
    /// A bare top-level JSON array of ≥1 non-empty strings.
    NonEmptyStringArray,
    /// A top-level JSON object with the given fields.
    Object(&'static [FieldSpec]),
}

/// Task planner output: `["task1", "task2", ...]` — top-level array,
/// not wrapped in an object.
pub const TASK_LIST_SCHEMA: SchemaDescriptor = SchemaDescriptor::NonEmptyStringArray;

/// Diary analyzer output object.
pub const DIARY_SCHEMA: SchemaDescriptor = SchemaDescriptor::Object(&[
    FieldSpec {
        name: "mood",
        shape: Shape::Enum(&["positive", "negative", "neutral"]),
        required: true,
    },
    FieldSpec {
        name: "emoji",
        shape: Shape::String,
        required: true,
    },
    FieldSpec {
        name: "keywords",
        shape: Shape::StringArray,
        required: true,
    },
    FieldSpec {
        name: "suggestions",
        shape: Shape::StringArray,
        required: true,
    },
]);

/// Task reviewer output object. The list fields default to empty when absent.
pub const REVIEW_SCHEMA: SchemaDescriptor = SchemaDescriptor::Object(&[
    FieldSpec {
        name: "valid",
        shape: Shape::Bool,
        required: true,
    },
    FieldSpec {
        name: "missing_tasks",
        shape: Shape::StringArray,
        required: false,
    },
    FieldSpec {
        name: "issues",
        shape: Shape::StringArray,
        required: false,
    },
]);
