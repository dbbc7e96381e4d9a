//! Validation fragments tagged with an optional storage type

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::errors::{SchemaError, SchemaResult};
use crate::datatype::{DataTypeRef, Modifier};

/// A JSON-Schema subtree plus the storage type it was declared with.
///
/// The storage type travels next to the schema instead of inside it, so it
/// can never collide with a JSON-Schema keyword. On the wire it is the
/// `dataType` key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Fragment {
    #[serde(rename = "dataType", default, skip_serializing_if = "Option::is_none")]
    pub data_type: Option<DataTypeRef>,
    #[serde(flatten)]
    pub schema: Map<String, Value>,
}

impl Fragment {
    pub fn new(schema: Map<String, Value>) -> Self {
        Self {
            data_type: None,
            schema,
        }
    }

    /// Decodes a fragment from its wire form
    pub fn from_json(value: Value) -> SchemaResult<Fragment> {
        if !value.is_object() {
            return Err(SchemaError::malformed_document(format!(
                "expected a schema object, got {}",
                value
            )));
        }
        serde_json::from_value(value).map_err(|e| SchemaError::malformed_document(e.to_string()))
    }

    pub fn with_data_type(mut self, data_type: impl Into<DataTypeRef>) -> Self {
        self.data_type = Some(data_type.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.schema.get(key)
    }

    /// The declared JSON type, when it is a single type name
    pub fn declared_type(&self) -> Option<&str> {
        self.schema.get("type").and_then(Value::as_str)
    }

    /// Sets a modifier on the attached descriptor, in place.
    ///
    /// A plain type name is promoted to a descriptor first.
    pub fn set_modifier(&mut self, modifier: Modifier, state: bool) -> SchemaResult<&mut Self> {
        let data_type = self
            .data_type
            .as_mut()
            .ok_or_else(|| SchemaError::missing_data_type(modifier))?;
        data_type.descriptor_mut().modifiers.set(modifier, state);
        Ok(self)
    }

    pub fn unsigned(&mut self) -> SchemaResult<&mut Self> {
        self.set_modifier(Modifier::Unsigned, true)
    }

    pub fn zerofill(&mut self) -> SchemaResult<&mut Self> {
        self.set_modifier(Modifier::Zerofill, true)
    }

    pub fn binary(&mut self) -> SchemaResult<&mut Self> {
        self.set_modifier(Modifier::Binary, true)
    }

    /// Returns the plain JSON-Schema value without the storage tag
    pub fn to_schema(&self) -> Value {
        Value::Object(self.schema.clone())
    }
}

/// Returns whether a schema accepts `null` through a union branch or its
/// own declared type
pub fn is_null_tolerant(schema: &Map<String, Value>) -> bool {
    let null_branch = schema
        .get("anyOf")
        .and_then(Value::as_array)
        .map(|branches| {
            branches
                .iter()
                .any(|branch| branch.get("type").and_then(Value::as_str) == Some("null"))
        })
        .unwrap_or(false);

    let null_type = match schema.get("type") {
        Some(Value::String(ty)) => ty == "null",
        Some(Value::Array(types)) => types.iter().any(|ty| ty.as_str() == Some("null")),
        _ => false,
    };

    null_branch || null_type
}
