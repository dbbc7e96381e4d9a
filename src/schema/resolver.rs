//! Native storage type resolution
//!
//! Resolution order when no storage type is given explicitly:
//! 1. an `enum` whose values all have the declared runtime type -> `ENUM`
//! 2. an `anyOf` / `allOf` union whose non-null branches share one type
//! 3. the declared type through the fixed mapping table

use serde_json::{Map, Value};
use tracing::trace;

use super::errors::{SchemaError, SchemaResult};
use crate::datatype::{DataTypeRef, DataTypes, NativeArg, NativeType};

/// Outcome of resolving one property
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub data_type: NativeType,
    /// Enumerated values collected from the schema, in order
    pub enum_values: Option<Vec<Value>>,
}

impl Resolution {
    fn plain(data_type: NativeType) -> Self {
        Self {
            data_type,
            enum_values: None,
        }
    }
}

/// Runtime type of a JSON value as the validation engine's host sees it
fn runtime_type(value: &Value) -> &'static str {
    match value {
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Bool(_) => "boolean",
        Value::Null | Value::Array(_) | Value::Object(_) => "object",
    }
}

fn branch_type(branch: &Value) -> Option<&str> {
    branch.get("type").and_then(Value::as_str)
}

/// Resolves native types against a namespace
pub struct TypeResolver<'a> {
    types: &'a DataTypes,
    json_type: &'a NativeType,
}

impl<'a> TypeResolver<'a> {
    pub fn new(types: &'a DataTypes, json_type: &'a NativeType) -> Self {
        Self { types, json_type }
    }

    /// Resolves the storage type of a property.
    ///
    /// `schema` is the validation fragment as declared, before any null
    /// union was injected by the normalizer.
    pub fn resolve(
        &self,
        schema: &Map<String, Value>,
        explicit: Option<&DataTypeRef>,
    ) -> SchemaResult<Resolution> {
        if let Some(data_type) = explicit {
            return Ok(Resolution::plain(data_type.evaluate(self.types)?));
        }

        if let Some(values) = self.enum_values(schema) {
            trace!(count = values.len(), "resolved enumerated type");
            let data_type = self.native("ENUM", "enum")?;
            return Ok(Resolution {
                data_type,
                enum_values: Some(values),
            });
        }

        for keyword in ["anyOf", "allOf"] {
            if let Some(branches) = schema.get(keyword).and_then(Value::as_array) {
                return self.resolve_union(keyword, branches).map(Resolution::plain);
            }
        }

        self.map_declared(schema.get("type"), schema)
            .map(Resolution::plain)
    }

    fn enum_values(&self, schema: &Map<String, Value>) -> Option<Vec<Value>> {
        let declared = schema.get("type").and_then(Value::as_str)?;
        let values = schema.get("enum").and_then(Value::as_array)?;

        values
            .iter()
            .all(|value| runtime_type(value) == declared)
            .then(|| values.clone())
    }

    fn resolve_union(&self, keyword: &str, branches: &[Value]) -> SchemaResult<NativeType> {
        let meaningful: Vec<&Value> = branches
            .iter()
            .filter(|branch| branch_type(branch) != Some("null"))
            .collect();

        if branches.len() < 2 || meaningful.is_empty() {
            return Err(SchemaError::empty_union(keyword));
        }

        let first = meaningful[0];
        let shared = branch_type(first).ok_or_else(|| SchemaError::mixed_union_type(keyword))?;

        if meaningful.iter().any(|branch| branch_type(branch) != Some(shared)) {
            return Err(SchemaError::mixed_union_type(keyword));
        }

        let constraints = first.as_object().cloned().unwrap_or_default();
        self.map_declared(first.get("type"), &constraints)
    }

    /// Maps a declared JSON type to its native counterpart
    fn map_declared(
        &self,
        declared: Option<&Value>,
        schema: &Map<String, Value>,
    ) -> SchemaResult<NativeType> {
        let name = match declared {
            Some(Value::String(name)) => name.as_str(),
            Some(other) => return Err(SchemaError::unknown_native_type(other)),
            None => return Err(SchemaError::unknown_native_type("undefined")),
        };

        match name {
            "object" | "array" => Ok(self.json_type.clone()),
            "number" => self.native("INTEGER", name),
            _ => {
                let ty = self.native(&name.to_uppercase(), name)?;

                let max_length = schema
                    .get("maxLength")
                    .filter(|value| value.as_f64().map_or(false, |n| n > 0.0));

                match (name, max_length) {
                    ("string", Some(length)) => ty.call(vec![NativeArg::Literal(length.clone())]),
                    _ => Ok(ty),
                }
            }
        }
    }

    fn native(&self, path: &str, declared: &str) -> SchemaResult<NativeType> {
        self.types
            .resolve(path)
            .ok_or_else(|| SchemaError::unknown_native_type(format!("{:?}", declared)))
    }
}
