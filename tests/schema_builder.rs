//! Schema Builder Tests
//!
//! - Derived schemas never share state with their source
//! - Property selection builds fresh object schemas
//! - Required lists are edited without duplicates

use schemac::schema::Compiler;
use schemac::{CompilerConfig, Model, SchemaBuilder, SchemaNode};
use serde_json::{json, Map, Value};

// =============================================================================
// Helper Functions
// =============================================================================

fn model() -> Model {
    let node: SchemaNode = serde_json::from_value(json!({
        "title": "Account",
        "required": ["id", "email"],
        "properties": {
            "id": {"type": "integer", "minimum": 1},
            "email": {"type": "string", "format": "email"},
            "bio": {"type": "string", "maxLength": 200}
        }
    }))
    .unwrap();

    Compiler::new(CompilerConfig::default())
        .unwrap()
        .define(&node)
        .unwrap()
}

fn property_names(builder: &SchemaBuilder) -> Vec<String> {
    builder.as_json()["properties"]
        .as_object()
        .map(|p| p.keys().cloned().collect())
        .unwrap_or_default()
}

// =============================================================================
// Isolation Tests
// =============================================================================

#[test]
fn test_pick_is_isolated_from_source() {
    let model = model();
    let source = model.schema();

    let picked = source.pick(&["email"]).unwrap();
    let changed = picked.prop("email").unwrap().max_length(5);

    assert_eq!(changed.get("maxLength"), Some(&json!(5)));
    assert!(source.as_json()["properties"]["email"].get("maxLength").is_none());
    assert!(model.artifact().schema["properties"]["email"]
        .get("maxLength")
        .is_none());
}

#[test]
fn test_setters_leave_receiver_untouched() {
    let base = SchemaBuilder::new(&json!({"type": "string"}));
    let derived = base.min_length(1).pattern("^a").format("email");

    assert_eq!(base.to_json(), json!({"type": "string"}));
    assert_eq!(
        derived.into_json(),
        json!({"type": "string", "minLength": 1, "pattern": "^a", "format": "email"})
    );
}

// =============================================================================
// Selection Tests
// =============================================================================

#[test]
fn test_props_builds_object_schema() {
    let picked = model().schema().props(&["bio", "id"]).unwrap();

    assert_eq!(
        picked.into_json(),
        json!({
            "type": "object",
            "additionalProperties": false,
            "required": ["bio", "id"],
            "properties": {
                "bio": {"type": "string", "maxLength": 200},
                "id": {"type": "integer", "minimum": 1}
            }
        })
    );
}

#[test]
fn test_selection_errors() {
    let schema = model().schema();
    let empty: [&str; 0] = [];

    let err = schema.props(&empty).unwrap_err();
    assert_eq!(err.code().code(), "SCHEMA_EMPTY_ARGS");

    let err = schema.pick(&["phone"]).unwrap_err();
    assert_eq!(err.code().code(), "SCHEMA_UNDEFINED_PROPERTY");

    let err = schema.prop("").unwrap_err();
    assert_eq!(err.code().code(), "SCHEMA_EMPTY_ARGS");
}

#[test]
fn test_omit_drops_required_entries() {
    let omitted = model().schema().omit(&["email"]).unwrap();

    assert_eq!(property_names(&omitted), vec!["id", "bio"]);
    assert_eq!(omitted.get("required"), Some(&json!(["id"])));
}

#[test]
fn test_add_appends_properties() {
    let mut extra = Map::new();
    extra.insert("age".to_string(), json!({"type": "integer"}));

    let added = model().schema().add(&extra);
    assert_eq!(property_names(&added), vec!["id", "email", "bio", "age"]);
    assert_eq!(added.get("required"), Some(&json!(["id", "email"])));
}

// =============================================================================
// Required List Tests
// =============================================================================

#[test]
fn test_required_skips_duplicates() {
    let schema = model().schema().required(&["email", "bio"]).unwrap();
    assert_eq!(schema.get("required"), Some(&json!(["id", "email", "bio"])));
}

#[test]
fn test_required_checks_properties() {
    let err = model().schema().required(&["phone"]).unwrap_err();
    assert_eq!(err.code().code(), "SCHEMA_UNDEFINED_PROPERTY");
}

#[test]
fn test_required_list_replaces_verbatim() {
    let schema = model()
        .schema()
        .required_list(vec!["phone".to_string()]);
    assert_eq!(schema.get("required"), Some(&json!(["phone"])));
}

#[test]
fn test_optional_removes_names() {
    let schema = model().schema().optional(&["id"]).unwrap();
    assert_eq!(schema.get("required"), Some(&json!(["email"])));

    let unchanged: Value = model().schema().into_json();
    assert_eq!(unchanged["required"], json!(["id", "email"]));
}
