//! Copy-on-write schema builder
//!
//! Derives sub-schemas from a compiled validation document. Every
//! derivation returns a new builder over a deep copy; the source document
//! is never touched.

use serde_json::{json, Map, Value};

use crate::schema::{SchemaError, SchemaResult};

#[derive(Debug, Clone, PartialEq)]
pub struct SchemaBuilder {
    schema: Value,
}

impl SchemaBuilder {
    /// Wraps a copy of `schema`
    pub fn new(schema: &Value) -> Self {
        Self {
            schema: schema.clone(),
        }
    }

    pub fn as_json(&self) -> &Value {
        &self.schema
    }

    pub fn to_json(&self) -> Value {
        self.schema.clone()
    }

    pub fn into_json(self) -> Value {
        self.schema
    }

    /// Returns a copy with `key` set to `value`
    pub fn set(&self, key: &str, value: impl Into<Value>) -> Self {
        self.derive(|schema| {
            schema.insert(key.to_string(), value.into());
        })
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.schema.get(key)
    }

    pub fn not(&self, schema: impl Into<Value>) -> Self {
        self.set("not", schema)
    }

    pub fn id(&self, id: &str) -> Self {
        self.set("$id", id)
    }

    pub fn reference(&self, reference: &str) -> Self {
        self.set("$ref", reference)
    }

    /// Builder over one property's sub-schema
    pub fn prop(&self, name: &str) -> SchemaResult<Self> {
        if name.is_empty() {
            return Err(SchemaError::empty_args("prop"));
        }

        self.property(name)
            .map(SchemaBuilder::new)
            .ok_or_else(|| SchemaError::undefined_property(name))
    }

    /// Builder over a fresh object schema holding only `names`, all required
    pub fn props<S: AsRef<str>>(&self, names: &[S]) -> SchemaResult<Self> {
        let names = non_empty(names, "props")?;

        let mut properties = Map::new();
        for name in &names {
            let schema = self
                .property(name)
                .ok_or_else(|| SchemaError::undefined_property(name))?;
            properties.insert(name.to_string(), schema.clone());
        }

        Ok(Self {
            schema: json!({
                "type": "object",
                "additionalProperties": false,
                "required": names,
                "properties": properties,
            }),
        })
    }

    pub fn pick<S: AsRef<str>>(&self, names: &[S]) -> SchemaResult<Self> {
        self.props(names)
    }

    /// Shallow-merges `properties` into the document's properties
    pub fn add(&self, properties: &Map<String, Value>) -> Self {
        self.derive(|schema| {
            let target = object_entry(schema, "properties");
            for (name, property) in properties {
                target.insert(name.clone(), property.clone());
            }
        })
    }

    pub fn merge(&self, properties: &Map<String, Value>) -> Self {
        self.add(properties)
    }

    pub fn assign(&self, properties: &Map<String, Value>) -> Self {
        self.add(properties)
    }

    pub fn extend(&self, properties: &Map<String, Value>) -> Self {
        self.add(properties)
    }

    /// Drops properties and their required entries
    pub fn remove<S: AsRef<str>>(&self, names: &[S]) -> SchemaResult<Self> {
        self.remove_named(names, "remove")
    }

    pub fn omit<S: AsRef<str>>(&self, names: &[S]) -> SchemaResult<Self> {
        self.remove_named(names, "omit")
    }

    fn remove_named<S: AsRef<str>>(&self, names: &[S], method: &str) -> SchemaResult<Self> {
        let names = non_empty(names, method)?;

        Ok(self.derive(|schema| {
            array_entry(schema, "required")
                .retain(|entry| !entry.as_str().map_or(false, |n| names.contains(&n)));
            let properties = object_entry(schema, "properties");
            for name in &names {
                properties.shift_remove(*name);
            }
        }))
    }

    /// Appends existing properties to `required`, skipping ones already there
    pub fn required<S: AsRef<str>>(&self, names: &[S]) -> SchemaResult<Self> {
        let names = non_empty(names, "required")?;

        for name in &names {
            if self.property(name).is_none() {
                return Err(SchemaError::undefined_property(name));
            }
        }

        Ok(self.derive(|schema| {
            let required = array_entry(schema, "required");
            for name in &names {
                if !required.iter().any(|entry| entry.as_str() == Some(*name)) {
                    required.push(Value::String(name.to_string()));
                }
            }
        }))
    }

    /// Replaces `required` verbatim.
    ///
    /// Unlike `required`, names are not checked against the properties.
    pub fn required_list(&self, names: Vec<String>) -> Self {
        self.set("required", names)
    }

    pub fn not_required<S: AsRef<str>>(&self, names: &[S]) -> SchemaResult<Self> {
        self.drop_required(names, "not_required")
    }

    pub fn optional<S: AsRef<str>>(&self, names: &[S]) -> SchemaResult<Self> {
        self.drop_required(names, "optional")
    }

    fn drop_required<S: AsRef<str>>(&self, names: &[S], method: &str) -> SchemaResult<Self> {
        let names = non_empty(names, method)?;

        Ok(self.derive(|schema| {
            array_entry(schema, "required")
                .retain(|entry| !entry.as_str().map_or(false, |n| names.contains(&n)));
        }))
    }

    // Object keywords

    pub fn additional_properties(&self, value: impl Into<Value>) -> Self {
        self.set("additionalProperties", value)
    }

    pub fn dependencies(&self, value: impl Into<Value>) -> Self {
        self.set("dependencies", value)
    }

    pub fn dependent_required(&self, value: impl Into<Value>) -> Self {
        self.set("dependentRequired", value)
    }

    pub fn dependent_schemas(&self, value: impl Into<Value>) -> Self {
        self.set("dependentSchemas", value)
    }

    pub fn max_properties(&self, value: u64) -> Self {
        self.set("maxProperties", value)
    }

    pub fn min_properties(&self, value: u64) -> Self {
        self.set("minProperties", value)
    }

    pub fn pattern_properties(&self, value: impl Into<Value>) -> Self {
        self.set("patternProperties", value)
    }

    pub fn property_names(&self, value: impl Into<Value>) -> Self {
        self.set("propertyNames", value)
    }

    pub fn unevaluated_properties(&self, value: impl Into<Value>) -> Self {
        self.set("unevaluatedProperties", value)
    }

    // String keywords

    pub fn min_length(&self, value: u64) -> Self {
        self.set("minLength", value)
    }

    pub fn max_length(&self, value: u64) -> Self {
        self.set("maxLength", value)
    }

    pub fn pattern(&self, value: &str) -> Self {
        self.set("pattern", value)
    }

    pub fn format(&self, value: &str) -> Self {
        self.set("format", value)
    }

    // Number keywords

    pub fn minimum(&self, value: impl Into<Value>) -> Self {
        self.set("minimum", value)
    }

    pub fn maximum(&self, value: impl Into<Value>) -> Self {
        self.set("maximum", value)
    }

    pub fn exclusive_minimum(&self, value: impl Into<Value>) -> Self {
        self.set("exclusiveMinimum", value)
    }

    pub fn exclusive_maximum(&self, value: impl Into<Value>) -> Self {
        self.set("exclusiveMaximum", value)
    }

    pub fn multiple_of(&self, value: impl Into<Value>) -> Self {
        self.set("multipleOf", value)
    }

    // Array keywords

    pub fn items(&self, value: impl Into<Value>) -> Self {
        self.set("items", value)
    }

    pub fn min_items(&self, value: u64) -> Self {
        self.set("minItems", value)
    }

    pub fn max_items(&self, value: u64) -> Self {
        self.set("maxItems", value)
    }

    pub fn unique_items(&self, state: bool) -> Self {
        self.set("uniqueItems", state)
    }

    pub fn additional_items(&self, value: impl Into<Value>) -> Self {
        self.set("additionalItems", value)
    }

    pub fn contains(&self, schema: impl Into<Value>) -> Self {
        self.set("contains", schema)
    }

    pub fn min_contains(&self, value: u64) -> Self {
        self.set("minContains", value)
    }

    pub fn max_contains(&self, value: u64) -> Self {
        self.set("maxContains", value)
    }

    pub fn unevaluated_items(&self, value: impl Into<Value>) -> Self {
        self.set("unevaluatedItems", value)
    }

    fn property(&self, name: &str) -> Option<&Value> {
        self.schema.get("properties").and_then(|p| p.get(name))
    }

    /// Copies the document and applies `change` to the copy.
    ///
    /// A boolean schema is replaced by an empty object first.
    fn derive(&self, change: impl FnOnce(&mut Map<String, Value>)) -> Self {
        let mut schema = match &self.schema {
            Value::Object(map) => map.clone(),
            _ => Map::new(),
        };
        change(&mut schema);
        Self {
            schema: Value::Object(schema),
        }
    }
}

fn non_empty<'a, S: AsRef<str>>(names: &'a [S], method: &str) -> SchemaResult<Vec<&'a str>> {
    if names.is_empty() {
        return Err(SchemaError::empty_args(method));
    }
    Ok(names.iter().map(AsRef::as_ref).collect())
}

fn object_entry<'a>(schema: &'a mut Map<String, Value>, key: &str) -> &'a mut Map<String, Value> {
    let entry = schema
        .entry(key.to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    if !entry.is_object() {
        *entry = Value::Object(Map::new());
    }
    match entry {
        Value::Object(map) => map,
        _ => unreachable!("replaced above"),
    }
}

fn array_entry<'a>(schema: &'a mut Map<String, Value>, key: &str) -> &'a mut Vec<Value> {
    let entry = schema
        .entry(key.to_string())
        .or_insert_with(|| Value::Array(Vec::new()));
    if !entry.is_array() {
        *entry = Value::Array(Vec::new());
    }
    match entry {
        Value::Array(items) => items,
        _ => unreachable!("replaced above"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source() -> Value {
        json!({
            "title": "User",
            "type": "object",
            "additionalProperties": false,
            "required": ["id", "name"],
            "properties": {
                "id": {"type": "integer", "minimum": 1},
                "name": {"type": "string", "minLength": 2},
                "tags": {"type": "array", "items": {"type": "string"}},
            },
        })
    }

    #[test]
    fn test_set_does_not_touch_source() {
        let base = SchemaBuilder::new(&source());
        let derived = base.id("urn:user").max_properties(2);

        assert_eq!(base.get("$id"), None);
        assert_eq!(derived.get("$id"), Some(&json!("urn:user")));
        assert_eq!(derived.get("maxProperties"), Some(&json!(2)));
    }

    #[test]
    fn test_prop() {
        let base = SchemaBuilder::new(&source());
        let id = base.prop("id").unwrap();
        assert_eq!(id.to_json(), json!({"type": "integer", "minimum": 1}));

        let err = base.prop("missing").unwrap_err();
        assert_eq!(err.code().code(), "SCHEMA_UNDEFINED_PROPERTY");
    }

    #[test]
    fn test_props_builds_fresh_object() {
        let picked = SchemaBuilder::new(&source()).pick(&["name", "id"]).unwrap();
        assert_eq!(
            picked.to_json(),
            json!({
                "type": "object",
                "additionalProperties": false,
                "required": ["name", "id"],
                "properties": {
                    "name": {"type": "string", "minLength": 2},
                    "id": {"type": "integer", "minimum": 1},
                },
            })
        );
    }

    #[test]
    fn test_props_errors() {
        let base = SchemaBuilder::new(&source());
        let none: [&str; 0] = [];
        assert_eq!(base.props(&none).unwrap_err().code().code(), "SCHEMA_EMPTY_ARGS");
        assert_eq!(
            base.props(&["id", "nope"]).unwrap_err().property(),
            Some("nope")
        );
    }

    #[test]
    fn test_add_and_remove() {
        let base = SchemaBuilder::new(&source());
        let mut extra = Map::new();
        extra.insert("age".into(), json!({"type": "integer"}));

        let extended = base.extend(&extra);
        assert!(extended.prop("age").is_ok());
        assert!(base.prop("age").is_err());

        let trimmed = extended.omit(&["name", "age"]).unwrap();
        assert_eq!(trimmed.get("required"), Some(&json!(["id"])));
        assert!(trimmed.prop("name").is_err());
        assert!(extended.prop("name").is_ok());
    }

    #[test]
    fn test_required_toggling() {
        let base = SchemaBuilder::new(&source());

        let required = base.required(&["tags", "id"]).unwrap();
        assert_eq!(required.get("required"), Some(&json!(["id", "name", "tags"])));

        let err = base.required(&["ghost"]).unwrap_err();
        assert_eq!(err.code().code(), "SCHEMA_UNDEFINED_PROPERTY");

        let optional = required.optional(&["id"]).unwrap();
        assert_eq!(optional.get("required"), Some(&json!(["name", "tags"])));
    }

    #[test]
    fn test_required_list_is_verbatim() {
        let replaced = SchemaBuilder::new(&source()).required_list(vec!["ghost".into()]);
        assert_eq!(replaced.get("required"), Some(&json!(["ghost"])));
    }

    #[test]
    fn test_into_json_is_independent() {
        let original = source();
        let mut json = SchemaBuilder::new(&original).pick(&["tags"]).unwrap().into_json();
        json["properties"]["tags"]["items"]["type"] = json!("integer");

        assert_eq!(original["properties"]["tags"]["items"]["type"], json!("string"));
    }
}
