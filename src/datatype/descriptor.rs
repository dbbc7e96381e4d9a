//! Type descriptors: deferred native type expressions
//!
//! A descriptor names a constructor in the native type namespace together
//! with its arguments and modifiers. Evaluation against a `DataTypes`
//! namespace turns it into a concrete `NativeType`.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::native::{DataTypes, Modifier, NativeArg, NativeType};
use crate::schema::{Fragment, SchemaError, SchemaResult};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
enum DescriptorKind {
    #[default]
    DataType,
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// Modifier flags carried by a descriptor
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    #[serde(rename = "UNSIGNED", default, skip_serializing_if = "is_false")]
    pub unsigned: bool,
    #[serde(rename = "ZEROFILL", default, skip_serializing_if = "is_false")]
    pub zerofill: bool,
    #[serde(rename = "BINARY", default, skip_serializing_if = "is_false")]
    pub binary: bool,
}

impl Modifiers {
    pub fn is_set(&self, modifier: Modifier) -> bool {
        match modifier {
            Modifier::Unsigned => self.unsigned,
            Modifier::Zerofill => self.zerofill,
            Modifier::Binary => self.binary,
        }
    }

    pub fn set(&mut self, modifier: Modifier, state: bool) {
        match modifier {
            Modifier::Unsigned => self.unsigned = state,
            Modifier::Zerofill => self.zerofill = state,
            Modifier::Binary => self.binary = state,
        }
    }
}

/// Argument of a descriptor
///
/// Objects tagged `"kind": "DataType"` are nested descriptors, any other
/// object is a validation fragment, everything else is a literal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DescriptorArg {
    Descriptor(TypeDescriptor),
    Fragment(Box<Fragment>),
    Literal(Value),
}

impl DescriptorArg {
    fn evaluate(&self, types: &DataTypes) -> SchemaResult<NativeArg> {
        match self {
            DescriptorArg::Descriptor(descriptor) => Ok(NativeArg::Type(descriptor.evaluate(types)?)),
            DescriptorArg::Fragment(fragment) => match &fragment.data_type {
                Some(data_type) => Ok(NativeArg::Type(data_type.evaluate(types)?)),
                None => Err(SchemaError::invalid_data_type(format!(
                    "type argument {} has no data type",
                    Value::Object(fragment.schema.clone())
                ))),
            },
            DescriptorArg::Literal(value) => Ok(NativeArg::Literal(value.clone())),
        }
    }
}

/// A native type expression: constructor path, arguments, modifiers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDescriptor {
    kind: DescriptorKind,
    pub path: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<DescriptorArg>,
    #[serde(flatten)]
    pub modifiers: Modifiers,
}

impl TypeDescriptor {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            kind: DescriptorKind::DataType,
            path: path.into(),
            args: Vec::new(),
            modifiers: Modifiers::default(),
        }
    }

    pub fn with_args(mut self, args: Vec<DescriptorArg>) -> Self {
        self.args = args;
        self
    }

    pub fn with_modifier(mut self, modifier: Modifier) -> Self {
        self.modifiers.set(modifier, true);
        self
    }

    /// Decodes a descriptor from a directive value.
    ///
    /// Returns `Ok(None)` for values that are not tagged as descriptors.
    pub fn from_value(value: &Value) -> SchemaResult<Option<TypeDescriptor>> {
        let tagged = value
            .as_object()
            .and_then(|obj| obj.get("kind"))
            .and_then(Value::as_str)
            == Some("DataType");

        if !tagged {
            return Ok(None);
        }

        serde_json::from_value(value.clone())
            .map(Some)
            .map_err(|e| SchemaError::invalid_data_type(format!("malformed descriptor: {}", e)))
    }

    /// Evaluates the descriptor into a concrete native type.
    ///
    /// Arguments are evaluated in order and passed to the constructor, then
    /// modifiers are applied as UNSIGNED, ZEROFILL, BINARY.
    pub fn evaluate(&self, types: &DataTypes) -> SchemaResult<NativeType> {
        let mut ty = types.get(&self.path)?;

        if !self.args.is_empty() {
            let args = self
                .args
                .iter()
                .map(|arg| arg.evaluate(types))
                .collect::<SchemaResult<Vec<_>>>()?;
            ty = ty.call(args)?;
        }

        for modifier in Modifier::ORDER {
            if self.modifiers.is_set(modifier) {
                ty = ty.modifier(modifier)?;
            }
        }

        Ok(ty)
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)?;
        if !self.args.is_empty() {
            write!(f, "(..{})", self.args.len())?;
        }
        for modifier in Modifier::ORDER {
            if self.modifiers.is_set(modifier) {
                write!(f, ".{}", modifier)?;
            }
        }
        Ok(())
    }
}

/// Storage type reference attached to a fragment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DataTypeRef {
    /// Plain catalog name, looked up directly
    Name(String),
    /// Descriptor expression, evaluated
    Descriptor(TypeDescriptor),
}

impl DataTypeRef {
    pub fn evaluate(&self, types: &DataTypes) -> SchemaResult<NativeType> {
        match self {
            DataTypeRef::Name(name) => types
                .resolve(name)
                .ok_or_else(|| SchemaError::invalid_data_type(format!("{:?}", name))),
            DataTypeRef::Descriptor(descriptor) => descriptor.evaluate(types),
        }
    }

    /// Returns the descriptor, promoting a plain name in place
    pub fn descriptor_mut(&mut self) -> &mut TypeDescriptor {
        if let DataTypeRef::Name(name) = self {
            *self = DataTypeRef::Descriptor(TypeDescriptor::new(std::mem::take(name)));
        }
        match self {
            DataTypeRef::Descriptor(descriptor) => descriptor,
            DataTypeRef::Name(_) => unreachable!("promoted above"),
        }
    }
}

impl From<TypeDescriptor> for DataTypeRef {
    fn from(descriptor: TypeDescriptor) -> Self {
        DataTypeRef::Descriptor(descriptor)
    }
}

impl From<&str> for DataTypeRef {
    fn from(name: &str) -> Self {
        DataTypeRef::Name(name.to_string())
    }
}
