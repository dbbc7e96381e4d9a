//! Descriptor constructors exposed to schema sources
//!
//! Each constructor returns a validation fragment tagged with the
//! descriptor of the storage type it declares. `ARRAY` and `RANGE` take
//! schemas as arguments; the scalar families take literal sizing
//! arguments which are forwarded to the native constructor verbatim.

use serde_json::{json, Map, Value};

use super::descriptor::{DescriptorArg, TypeDescriptor};
use crate::schema::{Fragment, SchemaError, SchemaResult};

const STRING_FAMILY: &[&str] = &["STRING", "CHAR", "TEXT", "CITEXT", "DATE", "GEOMETRY", "BLOB"];
const INTEGER_FAMILY: &[&str] = &["TINYINT", "SMALLINT", "MEDIUMINT", "INTEGER", "BIGINT"];
const NUMBER_FAMILY: &[&str] = &["FLOAT", "REAL", "DOUBLE", "DECIMAL"];

/// Returns the JSON type a scalar constructor validates as
pub fn scalar_family(name: &str) -> Option<&'static str> {
    if STRING_FAMILY.contains(&name) {
        Some("string")
    } else if INTEGER_FAMILY.contains(&name) {
        Some("integer")
    } else if NUMBER_FAMILY.contains(&name) {
        Some("number")
    } else {
        None
    }
}

/// Returns whether `name` is a known constructor
pub fn is_function(name: &str) -> bool {
    matches!(name, "ARRAY" | "RANGE") || scalar_family(name).is_some()
}

fn tagged(schema: Value, descriptor: TypeDescriptor) -> Fragment {
    let schema = match schema {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    Fragment::new(schema).with_data_type(descriptor)
}

fn composite(path: &str, args: Vec<Fragment>) -> Fragment {
    let args = args
        .into_iter()
        .map(|fragment| DescriptorArg::Fragment(Box::new(fragment)))
        .collect();
    tagged(json!({"type": "array"}), TypeDescriptor::new(path).with_args(args))
}

/// `ARRAY(schema...)`
pub fn array_of(args: Vec<Fragment>) -> Fragment {
    composite("ARRAY", args)
}

/// `RANGE(schema...)`
pub fn range_of(args: Vec<Fragment>) -> Fragment {
    composite("RANGE", args)
}

/// A scalar constructor such as `STRING(10)` or `FLOAT(11, 10)`
pub fn scalar(name: &str, args: Vec<Value>) -> SchemaResult<Fragment> {
    let family = scalar_family(name).ok_or_else(|| SchemaError::unknown_data_type(name))?;
    let args = args.into_iter().map(DescriptorArg::Literal).collect();
    Ok(tagged(
        json!({ "type": family }),
        TypeDescriptor::new(name).with_args(args),
    ))
}

/// Compiles a schema expression used as a constructor argument.
///
/// A bare constructor name stands for calling it without arguments.
fn schema_arg(value: Value) -> SchemaResult<Fragment> {
    match value {
        Value::String(name) if is_function(&name) => call(&name, Vec::new()),
        Value::Object(_) => Fragment::from_json(value),
        other => Err(SchemaError::invalid_data_type(format!(
            "{} is not a schema expression",
            other
        ))),
    }
}

/// Calls a constructor by name with wire-form arguments
pub fn call(name: &str, args: Vec<Value>) -> SchemaResult<Fragment> {
    match name {
        "ARRAY" | "RANGE" => {
            let args = args
                .into_iter()
                .map(schema_arg)
                .collect::<SchemaResult<Vec<_>>>()?;
            Ok(composite(name, args))
        }
        _ => scalar(name, args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datatype::{DataTypeRef, DataTypes};

    #[test]
    fn test_scalar_validates_as_family() {
        let fragment = scalar("FLOAT", vec![json!(11), json!(10)]).unwrap();
        assert_eq!(fragment.to_schema(), json!({"type": "number"}));

        let types = DataTypes::standard();
        let ty = fragment.data_type.unwrap().evaluate(&types).unwrap();
        assert_eq!(ty.to_string(), "FLOAT(11, 10)");
    }

    #[test]
    fn test_unknown_constructor() {
        let err = call("VARCHAR2", vec![]).unwrap_err();
        assert_eq!(err.code().code(), "SCHEMA_UNKNOWN_DATA_TYPE");
    }

    #[test]
    fn test_array_keeps_argument_fragments() {
        let inner = scalar("INTEGER", vec![json!(5)]).unwrap();
        let fragment = array_of(vec![inner.clone()]);

        assert_eq!(fragment.to_schema(), json!({"type": "array"}));
        let Some(DataTypeRef::Descriptor(descriptor)) = &fragment.data_type else {
            panic!("expected descriptor");
        };
        assert_eq!(descriptor.args, vec![DescriptorArg::Fragment(Box::new(inner))]);
    }

    #[test]
    fn test_range_of_bare_name() {
        let fragment = call("RANGE", vec![json!("INTEGER")]).unwrap();
        let types = DataTypes::standard();
        let ty = fragment.data_type.unwrap().evaluate(&types).unwrap();
        assert_eq!(ty.to_string(), "RANGE(INTEGER)");
    }

    #[test]
    fn test_array_rejects_literal_argument() {
        let err = call("ARRAY", vec![json!(3)]).unwrap_err();
        assert_eq!(err.code().code(), "SCHEMA_INVALID_DATA_TYPE");
    }
}
