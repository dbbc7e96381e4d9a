//! Storage directive vocabularies
//!
//! Column directives configure the relational column of one property.
//! Model options configure the entity as a whole. Both vocabularies are
//! closed: every other key belongs to the validation document.

use serde_json::Value;

use super::errors::{SchemaError, SchemaResult};

/// JSON kinds a directive value may take
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Any,
    Boolean,
    String,
    Object,
    Array,
}

impl Kind {
    fn matches(&self, value: &Value) -> bool {
        match self {
            Kind::Any => true,
            Kind::Boolean => value.is_boolean(),
            Kind::String => value.is_string(),
            Kind::Object => value.is_object(),
            Kind::Array => value.is_array(),
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            Kind::Any => "any",
            Kind::Boolean => "boolean",
            Kind::String => "string",
            Kind::Object => "object",
            Kind::Array => "array",
        }
    }
}

const COLUMN_DIRECTIVES: &[(&str, &[Kind])] = &[
    ("defaultValue", &[Kind::Any]),
    ("unique", &[Kind::Boolean, Kind::String, Kind::Object]),
    ("primaryKey", &[Kind::Boolean]),
    ("autoIncrement", &[Kind::Boolean]),
    ("autoIncrementIdentity", &[Kind::Boolean]),
    ("comment", &[Kind::String]),
    ("references", &[Kind::String, Kind::Object]),
    ("onUpdate", &[Kind::String]),
    ("onDelete", &[Kind::String]),
    ("validate", &[Kind::Object]),
    ("values", &[Kind::Array]),
    ("allowNull", &[Kind::Boolean]),
    ("field", &[Kind::String]),
];

const MODEL_OPTIONS: &[&str] = &[
    "tableName",
    "freezeTableName",
    "modelName",
    "timestamps",
    "paranoid",
    "underscored",
    "createdAt",
    "updatedAt",
    "deletedAt",
    "version",
    "engine",
    "charset",
    "collate",
    "comment",
    "initialAutoIncrement",
    "indexes",
    "omitNull",
    "hasTrigger",
    "schema",
    "schemaDelimiter",
];

/// Returns whether `key` is a column directive
pub fn is_column_directive(key: &str) -> bool {
    COLUMN_DIRECTIVES.iter().any(|(name, _)| *name == key)
}

/// Returns whether `key` is a model option
pub fn is_model_option(key: &str) -> bool {
    MODEL_OPTIONS.contains(&key)
}

/// Checks a directive value against the kinds the ORM accepts
pub fn check_directive(key: &str, value: &Value) -> SchemaResult<()> {
    let Some((_, kinds)) = COLUMN_DIRECTIVES.iter().find(|(name, _)| *name == key) else {
        return Ok(());
    };

    if kinds.iter().any(|kind| kind.matches(value)) {
        return Ok(());
    }

    let expected = kinds
        .iter()
        .map(Kind::as_str)
        .collect::<Vec<_>>()
        .join(" or ");
    Err(SchemaError::invalid_directive(key, &expected))
}
