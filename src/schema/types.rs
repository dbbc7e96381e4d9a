//! Compiler input and output types
//!
//! - `SchemaNode`: parsed entity tree handed over by the DSL parser
//! - `ColumnSpec`: storage-facing description of one property
//! - `CompiledArtifact`: `{name, columns, options, schema}` for one entity

use indexmap::IndexMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

use super::fragment::Fragment;
use crate::datatype::NativeType;

/// A parsed property: validation keywords mixed with storage directives
pub type PropertyNode = Fragment;

/// Parsed intermediate tree for one entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaNode {
    /// Entity name
    pub title: String,
    /// Required property names, in declaration order
    #[serde(default)]
    pub required: Vec<String>,
    /// Properties, in declaration order
    #[serde(default)]
    pub properties: IndexMap<String, PropertyNode>,
    /// Remaining top-level keys: model options and schema keywords
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

impl SchemaNode {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            required: Vec::new(),
            properties: IndexMap::new(),
            rest: Map::new(),
        }
    }

    /// Adds a property, marking it required when asked
    pub fn property(mut self, name: impl Into<String>, node: PropertyNode, required: bool) -> Self {
        let name = name.into();
        if required && !self.required.contains(&name) {
            self.required.push(name.clone());
        }
        self.properties.insert(name, node);
        self
    }

    /// Sets a top-level key
    pub fn option(mut self, key: impl Into<String>, value: Value) -> Self {
        self.rest.insert(key.into(), value);
        self
    }

    pub fn is_required(&self, name: &str) -> bool {
        self.required.iter().any(|r| r == name)
    }
}

/// Column default: a plain value or a native type constant such as `NOW`
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnDefault {
    Value(Value),
    Native(NativeType),
}

impl Serialize for ColumnDefault {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ColumnDefault::Value(value) => value.serialize(serializer),
            ColumnDefault::Native(ty) => ty.serialize(serializer),
        }
    }
}

/// Storage-facing output for one property
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnSpec {
    #[serde(rename = "type")]
    pub data_type: NativeType,
    pub allow_null: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<ColumnDefault>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_key: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<Value>>,
    /// Remaining directives, passed through to the ORM untouched
    #[serde(flatten)]
    pub options: Map<String, Value>,
}

impl ColumnSpec {
    pub fn new(data_type: NativeType) -> Self {
        Self {
            data_type,
            allow_null: false,
            default_value: None,
            primary_key: None,
            comment: None,
            values: None,
            options: Map::new(),
        }
    }
}

/// Compiled unit for one entity
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompiledArtifact {
    /// Entity name
    pub name: String,
    /// Columns keyed by property name, in property order
    pub columns: IndexMap<String, ColumnSpec>,
    /// Model-level options
    pub options: Map<String, Value>,
    /// Validation document
    pub schema: Value,
}

impl CompiledArtifact {
    /// Property schemas of the validation document
    pub fn properties(&self) -> Option<&Map<String, Value>> {
        self.schema.get("properties").and_then(Value::as_object)
    }

    /// Required property names of the validation document
    pub fn required(&self) -> Vec<&str> {
        self.schema
            .get("required")
            .and_then(Value::as_array)
            .map(|names| names.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }
}
