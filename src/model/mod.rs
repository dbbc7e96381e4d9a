//! Registered entity models
//!
//! A `Model` pairs a compiled artifact with its validator cache and exposes
//! the runtime validation surface: single-property and property-set
//! validators, whole-record checks and per-column hooks.

use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::{json, Map, Value};

use crate::builder::SchemaBuilder;
use crate::error::Result;
use crate::schema::{ColumnSpec, CompiledArtifact, SchemaError, SchemaResult};
use crate::validator::{ColumnValidationError, Validator, ValidatorCache, ValidatorKey};

#[derive(Debug)]
pub struct Model {
    artifact: CompiledArtifact,
    validators: ValidatorCache,
}

impl Model {
    pub fn new(artifact: CompiledArtifact, validators: ValidatorCache) -> Self {
        Self {
            artifact,
            validators,
        }
    }

    pub fn name(&self) -> &str {
        &self.artifact.name
    }

    pub fn artifact(&self) -> &CompiledArtifact {
        &self.artifact
    }

    pub fn columns(&self) -> &IndexMap<String, ColumnSpec> {
        &self.artifact.columns
    }

    pub fn options(&self) -> &Map<String, Value> {
        &self.artifact.options
    }

    /// Builder over a copy of the validation document
    pub fn schema(&self) -> SchemaBuilder {
        SchemaBuilder::new(&self.artifact.schema)
    }

    /// Name the entity's instances go by in column messages (`userProfile`)
    pub fn instance_name(&self) -> String {
        let mut chars = self.artifact.name.chars();
        match chars.next() {
            Some(first) => first.to_lowercase().chain(chars).collect(),
            None => String::new(),
        }
    }

    /// Validator for one property, cached by name
    pub fn prop_validator(&self, name: &str) -> SchemaResult<Arc<Validator>> {
        if name.is_empty() {
            return Err(SchemaError::empty_args("prop_validator"));
        }

        let schema = self.property_schema(name)?.clone();
        self.validators
            .get_or_compile(ValidatorKey::Prop(name.to_string()), || {
                Validator::compile(&schema, Some(name.to_string()))
            })
            .map_err(|e| e.in_entity(self.name()))
    }

    /// Validator for a set of properties, all required.
    ///
    /// The cache key ignores the order of `names`.
    pub fn props_validator<S: AsRef<str>>(&self, names: &[S]) -> SchemaResult<Arc<Validator>> {
        if names.is_empty() {
            return Err(SchemaError::empty_args("props_validator"));
        }

        let key = ValidatorKey::props(names);
        let sorted = key.names();

        let mut properties = Map::new();
        for name in sorted {
            properties.insert(name.clone(), self.property_schema(name)?.clone());
        }
        let schema = json!({
            "type": "object",
            "additionalProperties": false,
            "required": sorted,
            "properties": properties,
        });

        self.validators
            .get_or_compile(key.clone(), || Validator::compile(&schema, None))
            .map_err(|e| e.in_entity(self.name()))
    }

    /// Validates a record against the properties it carries
    pub fn validate_props(&self, data: &Value) -> Result<()> {
        let Some(record) = data.as_object() else {
            return Err(ColumnValidationError::with_message(format!(
                "{} expected an object, got {}",
                self.instance_name(),
                data
            ))
            .into());
        };

        let names: Vec<&str> = record.keys().map(String::as_str).collect();
        let validator = self.props_validator(names.as_slice())?;
        validator.validate(data)?;
        Ok(())
    }

    /// Column-level hook: checks one value, labelled `instance.prop`
    pub fn validate_column(&self, prop: &str, value: &Value) -> Result<()> {
        let schema = self.property_schema(prop)?;
        let label = format!("{}.{}", self.instance_name(), prop);

        let validator = self
            .validators
            .get_or_compile(ValidatorKey::Column(prop.to_string()), || {
                Validator::compile(schema, Some(label))
            })
            .map_err(|e| e.in_entity(self.name()))?;

        validator.validate(value)?;
        Ok(())
    }

    fn property_schema(&self, name: &str) -> SchemaResult<&Value> {
        self.artifact
            .properties()
            .and_then(|properties| properties.get(name))
            .ok_or_else(|| SchemaError::undefined_property(name).in_entity(self.name()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CompilerConfig;
    use crate::schema::{Compiler, Fragment, SchemaNode};
    use crate::Error;

    fn model() -> Model {
        let node = SchemaNode::new("UserProfile")
            .property("id", Fragment::from_json(json!({"type": "integer", "minimum": 1})).unwrap(), true)
            .property("name", Fragment::from_json(json!({"type": "string", "minLength": 2})).unwrap(), true)
            .property(
                "tags",
                Fragment::from_json(json!({"type": "array", "items": {"type": "string"}})).unwrap(),
                false,
            );
        Compiler::new(CompilerConfig::default())
            .unwrap()
            .define(&node)
            .unwrap()
    }

    #[test]
    fn test_instance_name() {
        assert_eq!(model().instance_name(), "userProfile");
    }

    #[test]
    fn test_prop_validator() {
        let model = model();
        let id = model.prop_validator("id").unwrap();

        let err = id.validate(&json!(0)).unwrap_err();
        assert!(err.message().contains("id"));
        assert!(id.validate(&json!(1)).is_ok());

        assert!(Arc::ptr_eq(&id, &model.prop_validator("id").unwrap()));
        assert_eq!(
            model.prop_validator("ghost").unwrap_err().code().code(),
            "SCHEMA_UNDEFINED_PROPERTY"
        );
    }

    #[test]
    fn test_props_validator_key_is_order_independent() {
        let model = model();
        let ab = model.props_validator(&["name", "id"]).unwrap();
        let ba = model.props_validator(&["id", "name"]).unwrap();
        assert!(Arc::ptr_eq(&ab, &ba));

        let none: [&str; 0] = [];
        assert_eq!(
            model.props_validator(&none).unwrap_err().code().code(),
            "SCHEMA_EMPTY_ARGS"
        );
    }

    #[test]
    fn test_validate_props() {
        let model = model();
        assert!(model.validate_props(&json!({"id": 3, "name": "Ann"})).is_ok());

        let err = model.validate_props(&json!({"id": 0, "name": "A"})).unwrap_err();
        let Error::Validation(err) = err else {
            panic!("expected a validation error");
        };
        assert_eq!(err.errors().len(), 2);
        assert!(err.message().contains("id "));
        assert!(err.message().contains("name "));

        assert!(matches!(
            model.validate_props(&json!([1])),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            model.validate_props(&json!({"ghost": 1})),
            Err(Error::Schema(_))
        ));
    }

    #[test]
    fn test_validate_column_label() {
        let model = model();
        let err = model.validate_column("tags", &json!(["a", 2])).unwrap_err();
        assert!(err.to_string().starts_with("userProfile.tags[1] "));
        assert!(model.validate_column("tags", &json!(["a"])).is_ok());
    }
}
