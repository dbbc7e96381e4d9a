//! Validation failures and their message format
//!
//! A failure message lists every engine error as `<path> <message>`,
//! separated by `"; "`. Paths are instance pointers rewritten to
//! accessor notation: `/items/0/name` becomes `items[0].name`.

use serde::Serialize;
use thiserror::Error;

/// One failure reported by the validation engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorEntry {
    /// JSON pointer into the validated value
    pub instance_path: String,
    /// JSON pointer into the schema
    pub schema_path: String,
    pub message: String,
}

impl ErrorEntry {
    pub(crate) fn from_engine(error: &jsonschema::ValidationError<'_>) -> Self {
        Self {
            instance_path: error.instance_path.to_string(),
            schema_path: error.schema_path.to_string(),
            message: error.to_string(),
        }
    }
}

/// Raised when data fails a compiled validator
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct ColumnValidationError {
    message: String,
    errors: Vec<ErrorEntry>,
}

impl ColumnValidationError {
    pub fn new(errors: Vec<ErrorEntry>, label: Option<&str>) -> Self {
        Self {
            message: format_errors(&errors, label),
            errors,
        }
    }

    /// A failure with no engine errors behind it
    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            errors: Vec::new(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn errors(&self) -> &[ErrorEntry] {
        &self.errors
    }
}

/// Rewrites a JSON pointer to accessor notation
pub fn pointer_to_path(pointer: &str) -> String {
    let mut path = String::new();

    for segment in pointer.split('/').skip(1) {
        let segment = segment.replace("~1", "/").replace("~0", "~");

        if !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit()) {
            path.push('[');
            path.push_str(&segment);
            path.push(']');
        } else {
            if !path.is_empty() {
                path.push('.');
            }
            path.push_str(&segment);
        }
    }

    path
}

/// Joins engine errors into one message.
///
/// `label` names the validated value; paths are reported relative to it.
pub fn format_errors(errors: &[ErrorEntry], label: Option<&str>) -> String {
    errors
        .iter()
        .map(|error| {
            let path = pointer_to_path(&error.instance_path);
            let target = match label {
                Some(label) if path.is_empty() => label.to_string(),
                Some(label) if path.starts_with('[') => format!("{}{}", label, path),
                Some(label) => format!("{}.{}", label, path),
                None => path,
            };

            if target.is_empty() {
                error.message.clone()
            } else {
                format!("{} {}", target, error.message)
            }
        })
        .collect::<Vec<_>>()
        .join("; ")
}
