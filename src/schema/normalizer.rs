//! Per-property normalization
//!
//! Splits a parsed property into its validation fragment and its column
//! directives, derives nullability and defaults, and resolves the native
//! storage type.

use serde_json::{json, Map, Value};
use tracing::debug;

use super::directives::{check_directive, is_column_directive};
use super::errors::SchemaResult;
use super::fragment::is_null_tolerant;
use super::resolver::TypeResolver;
use super::types::{ColumnDefault, ColumnSpec, PropertyNode};
use crate::datatype::{DataTypes, TypeDescriptor};

/// A property split into its two synchronized halves
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedProperty {
    /// Validation fragment for the document's `properties`
    pub schema: Value,
    /// Column for the ORM
    pub column: ColumnSpec,
}

pub struct PropertyNormalizer<'a> {
    types: &'a DataTypes,
    resolver: TypeResolver<'a>,
}

impl<'a> PropertyNormalizer<'a> {
    pub fn new(types: &'a DataTypes, resolver: TypeResolver<'a>) -> Self {
        Self { types, resolver }
    }

    /// Normalizes one property.
    ///
    /// `required` tells whether the entity lists the property as required.
    pub fn normalize(
        &self,
        name: &str,
        node: &PropertyNode,
        required: bool,
    ) -> SchemaResult<NormalizedProperty> {
        self.normalize_inner(node, required)
            .map_err(|e| e.in_property(name))
            .map(|normalized| {
                debug!(
                    property = name,
                    data_type = %normalized.column.data_type,
                    allow_null = normalized.column.allow_null,
                    "normalized property"
                );
                normalized
            })
    }

    fn normalize_inner(&self, node: &PropertyNode, required: bool) -> SchemaResult<NormalizedProperty> {
        let mut validation = Map::new();
        let mut directives = Map::new();

        for (key, value) in &node.schema {
            if is_column_directive(key) {
                check_directive(key, value)?;
                directives.insert(key.clone(), value.clone());
            } else {
                validation.insert(key.clone(), value.clone());
            }
        }

        if !directives.contains_key("comment") {
            if let Some(description) = validation.get("description").filter(|d| d.is_string()) {
                directives.insert("comment".into(), description.clone());
            }
        }

        let resolution = self.resolver.resolve(&validation, node.data_type.as_ref())?;

        let explicit_allow_null = directives.shift_remove("allowNull").and_then(|v| v.as_bool());
        let null_tolerant = is_null_tolerant(&validation);
        let allow_null = explicit_allow_null.unwrap_or(!required || null_tolerant);
        let is_array = validation.get("type").and_then(Value::as_str) == Some("array");

        let schema = if explicit_allow_null == Some(true) && !null_tolerant {
            json!({"anyOf": [Value::Object(validation), {"type": "null"}]})
        } else {
            Value::Object(validation)
        };

        let mut column = ColumnSpec::new(resolution.data_type);
        column.allow_null = allow_null;

        column.default_value = match directives.shift_remove("defaultValue") {
            Some(value) => match TypeDescriptor::from_value(&value)? {
                Some(descriptor) => Some(ColumnDefault::Native(descriptor.evaluate(self.types)?)),
                None => Some(ColumnDefault::Value(value)),
            },
            None if !allow_null && column.data_type.is_json() && is_array => {
                Some(ColumnDefault::Value(json!([])))
            }
            None => None,
        };

        column.values = match directives.shift_remove("values") {
            Some(Value::Array(values)) => Some(values),
            _ => resolution.enum_values,
        };
        column.primary_key = directives.shift_remove("primaryKey").and_then(|v| v.as_bool());
        column.comment = directives
            .shift_remove("comment")
            .and_then(|v| v.as_str().map(str::to_string));
        column.options = directives;

        Ok(NormalizedProperty { schema, column })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datatype::{functions, DataTypeRef};
    use crate::schema::Fragment;

    fn normalize(node: Value, required: bool) -> SchemaResult<NormalizedProperty> {
        normalize_fragment(Fragment::from_json(node).unwrap(), required)
    }

    fn normalize_fragment(node: Fragment, required: bool) -> SchemaResult<NormalizedProperty> {
        let types = DataTypes::standard();
        let json_type = types.get("JSONB").unwrap();
        let normalizer = PropertyNormalizer::new(&types, TypeResolver::new(&types, &json_type));
        normalizer.normalize("prop", &node, required)
    }

    #[test]
    fn test_directives_are_split_off() {
        let normalized = normalize(
            json!({"type": "integer", "minimum": 1, "primaryKey": true, "field": "user_id"}),
            true,
        )
        .unwrap();

        assert_eq!(normalized.schema, json!({"type": "integer", "minimum": 1}));
        assert_eq!(normalized.column.primary_key, Some(true));
        assert_eq!(normalized.column.options.get("field"), Some(&json!("user_id")));
        assert!(!normalized.column.allow_null);
    }

    #[test]
    fn test_explicit_allow_null_wraps_fragment() {
        let normalized = normalize(
            json!({"type": "string", "minLength": 2, "maxLength": 10, "allowNull": true}),
            false,
        )
        .unwrap();

        assert!(normalized.column.allow_null);
        assert_eq!(normalized.column.data_type.to_string(), "STRING(10)");
        assert_eq!(
            normalized.schema,
            json!({"anyOf": [{"type": "string", "minLength": 2, "maxLength": 10}, {"type": "null"}]})
        );
    }

    #[test]
    fn test_existing_null_union_is_not_wrapped() {
        let normalized = normalize(
            json!({"anyOf": [{"type": "string"}, {"type": "null"}], "allowNull": true}),
            true,
        )
        .unwrap();
        assert_eq!(
            normalized.schema,
            json!({"anyOf": [{"type": "string"}, {"type": "null"}]})
        );
    }

    #[test]
    fn test_derived_nullability() {
        let optional = normalize(json!({"type": "number", "minimum": 0}), false).unwrap();
        assert!(optional.column.allow_null);
        assert_eq!(optional.schema, json!({"type": "number", "minimum": 0}));

        let union = normalize(json!({"anyOf": [{"type": "string"}, {"type": "null"}]}), true).unwrap();
        assert!(union.column.allow_null);

        let explicit = normalize(json!({"type": "string", "allowNull": false}), false).unwrap();
        assert!(!explicit.column.allow_null);
    }

    #[test]
    fn test_description_promoted_to_comment() {
        let normalized = normalize(json!({"type": "string", "description": "Name desc"}), true).unwrap();
        assert_eq!(normalized.column.comment.as_deref(), Some("Name desc"));
        assert_eq!(normalized.schema["description"], json!("Name desc"));

        let explicit = normalize(
            json!({"type": "string", "description": "Name desc", "comment": "Own"}),
            true,
        )
        .unwrap();
        assert_eq!(explicit.column.comment.as_deref(), Some("Own"));
    }

    #[test]
    fn test_enum_values_populated() {
        let normalized = normalize(json!({"type": "string", "enum": ["a", "b"]}), true).unwrap();
        assert_eq!(normalized.column.data_type.name(), "ENUM");
        assert_eq!(normalized.column.values, Some(vec![json!("a"), json!("b")]));

        let explicit = normalize(
            json!({"type": "string", "enum": ["a", "b"], "values": ["b", "a"]}),
            true,
        )
        .unwrap();
        assert_eq!(explicit.column.values, Some(vec![json!("b"), json!("a")]));
    }

    #[test]
    fn test_default_array_injection() {
        let injected = normalize(json!({"type": "array", "items": {"type": "number"}}), true).unwrap();
        assert_eq!(injected.column.default_value, Some(ColumnDefault::Value(json!([]))));

        let given = normalize(
            json!({"type": "array", "items": {"type": "number"}, "defaultValue": [1]}),
            true,
        )
        .unwrap();
        assert_eq!(given.column.default_value, Some(ColumnDefault::Value(json!([1]))));

        let nullable = normalize(
            json!({"type": "array", "items": {"type": "number"}, "allowNull": true}),
            true,
        )
        .unwrap();
        assert_eq!(nullable.column.default_value, None);

        let native_array = normalize_fragment(
            functions::array_of(vec![functions::scalar("INTEGER", vec![]).unwrap()]),
            true,
        )
        .unwrap();
        assert_eq!(native_array.column.data_type.to_string(), "ARRAY(INTEGER)");
        assert_eq!(native_array.column.default_value, None);
    }

    #[test]
    fn test_descriptor_default_is_evaluated() {
        let normalized = normalize(
            json!({"type": "string", "format": "uuid", "defaultValue": {"kind": "DataType", "path": "UUIDV4"}}),
            true,
        )
        .unwrap();
        assert_eq!(
            normalized.column.default_value,
            Some(ColumnDefault::Native(DataTypes::standard().get("UUIDV4").unwrap()))
        );
    }

    #[test]
    fn test_explicit_null_default_is_kept() {
        let normalized = normalize(
            json!({"anyOf": [{"type": "string"}, {"type": "null"}], "defaultValue": null}),
            true,
        )
        .unwrap();
        assert_eq!(normalized.column.default_value, Some(ColumnDefault::Value(Value::Null)));
    }

    #[test]
    fn test_explicit_data_type() {
        let node = Fragment::from_json(json!({"type": "string", "minLength": 1, "autoIncrement": true}))
            .unwrap()
            .with_data_type(DataTypeRef::Name("INTEGER".into()));
        let normalized = normalize_fragment(node, true).unwrap();
        assert_eq!(normalized.column.data_type.name(), "INTEGER");
        assert_eq!(normalized.column.options.get("autoIncrement"), Some(&json!(true)));
        assert_eq!(normalized.schema, json!({"type": "string", "minLength": 1}));
    }

    #[test]
    fn test_errors_carry_property_name() {
        let err = normalize(json!({"anyOf": [{"type": "string"}, {"type": "integer"}]}), true).unwrap_err();
        assert_eq!(err.property(), Some("prop"));

        let err = normalize(json!({"type": "string", "primaryKey": "yes"}), true).unwrap_err();
        assert_eq!(err.code().code(), "SCHEMA_INVALID_DIRECTIVE");
    }
}
