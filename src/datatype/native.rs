//! Native column types and the namespace that catalogs them
//!
//! A `NativeType` is the concrete value an ORM column definition receives:
//! a catalog entry, optionally called with arguments and refined by
//! chained modifiers (`INTEGER(10).UNSIGNED.ZEROFILL`).

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use crate::schema::{SchemaError, SchemaResult};

/// Chained type modifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Modifier {
    Unsigned,
    Zerofill,
    Binary,
}

impl Modifier {
    /// Modifiers in the order evaluation applies them
    pub const ORDER: [Modifier; 3] = [Modifier::Unsigned, Modifier::Zerofill, Modifier::Binary];

    /// Returns the sub-property name used by the ORM
    pub fn as_str(&self) -> &'static str {
        match self {
            Modifier::Unsigned => "UNSIGNED",
            Modifier::Zerofill => "ZEROFILL",
            Modifier::Binary => "BINARY",
        }
    }

    /// Parses a sub-property name
    pub fn from_name(name: &str) -> Option<Modifier> {
        match name {
            "UNSIGNED" => Some(Modifier::Unsigned),
            "ZEROFILL" => Some(Modifier::Zerofill),
            "BINARY" => Some(Modifier::Binary),
            _ => None,
        }
    }
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Family a native type belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeClass {
    String,
    Integer,
    Number,
    Boolean,
    Temporal,
    Json,
    Enum,
    Array,
    Range,
    Geometry,
    Binary,
    /// A value, not a type constructor (`NOW`, `UUIDV4`)
    Constant,
    Other,
}

impl TypeClass {
    /// Returns whether the class supports the given modifier
    pub fn supports(&self, modifier: Modifier) -> bool {
        match modifier {
            Modifier::Unsigned | Modifier::Zerofill => {
                matches!(self, TypeClass::Integer | TypeClass::Number)
            }
            Modifier::Binary => matches!(self, TypeClass::String),
        }
    }

    /// Returns whether types of this class can be called with arguments
    pub fn is_constructor(&self) -> bool {
        !matches!(self, TypeClass::Constant)
    }
}

/// Argument passed to a native type constructor
#[derive(Debug, Clone, PartialEq)]
pub enum NativeArg {
    Literal(Value),
    Type(NativeType),
}

impl fmt::Display for NativeArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NativeArg::Literal(Value::String(s)) => write!(f, "'{}'", s.replace('\'', "\\'")),
            NativeArg::Literal(other) => write!(f, "{}", other),
            NativeArg::Type(ty) => write!(f, "{}", ty),
        }
    }
}

/// A concrete native column type
#[derive(Debug, Clone, PartialEq)]
pub struct NativeType {
    name: String,
    class: TypeClass,
    args: Option<Vec<NativeArg>>,
    modifiers: Vec<Modifier>,
}

impl NativeType {
    /// Creates a bare catalog type
    pub fn new(name: impl Into<String>, class: TypeClass) -> Self {
        Self {
            name: name.into(),
            class,
            args: None,
            modifiers: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn class(&self) -> TypeClass {
        self.class
    }

    /// Constructor arguments, `None` when the type was never called
    pub fn args(&self) -> Option<&[NativeArg]> {
        self.args.as_deref()
    }

    pub fn modifiers(&self) -> &[Modifier] {
        &self.modifiers
    }

    /// Returns whether values of this type are stored as free-form JSON
    pub fn is_json(&self) -> bool {
        self.class == TypeClass::Json
    }

    /// Calls the type constructor.
    ///
    /// Calling with no arguments yields the bare type, the same way
    /// `STRING()` and `STRING` describe the same column.
    pub fn call(&self, args: Vec<NativeArg>) -> SchemaResult<NativeType> {
        if !self.class.is_constructor() {
            return Err(SchemaError::invalid_data_type(format!(
                "{} is not a type constructor",
                self
            )));
        }
        if self.args.is_some() || !self.modifiers.is_empty() {
            return Err(SchemaError::invalid_data_type(format!(
                "{} has already been constructed",
                self
            )));
        }

        let mut ty = self.clone();
        if !args.is_empty() {
            ty.args = Some(args);
        }
        Ok(ty)
    }

    /// Looks up a modifier sub-property on this type
    pub fn modifier(&self, modifier: Modifier) -> SchemaResult<NativeType> {
        if !self.class.supports(modifier) {
            return Err(SchemaError::unknown_data_type(format!("{}.{}", self, modifier)));
        }

        let mut ty = self.clone();
        ty.modifiers.push(modifier);
        Ok(ty)
    }
}

impl fmt::Display for NativeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if let Some(args) = &self.args {
            f.write_str("(")?;
            for (i, arg) in args.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{}", arg)?;
            }
            f.write_str(")")?;
        }
        for modifier in &self.modifiers {
            write!(f, ".{}", modifier)?;
        }
        Ok(())
    }
}

impl Serialize for NativeType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Catalog of native type constructors, the ORM's `DataTypes`
#[derive(Debug, Clone)]
pub struct DataTypes {
    types: IndexMap<String, TypeClass>,
}

impl DataTypes {
    /// Creates an empty namespace
    pub fn empty() -> Self {
        Self {
            types: IndexMap::new(),
        }
    }

    /// Creates the standard relational catalog
    pub fn standard() -> Self {
        let mut types = Self::empty();

        for (name, class) in [
            ("STRING", TypeClass::String),
            ("CHAR", TypeClass::String),
            ("TEXT", TypeClass::String),
            ("CITEXT", TypeClass::String),
            ("TINYINT", TypeClass::Integer),
            ("SMALLINT", TypeClass::Integer),
            ("MEDIUMINT", TypeClass::Integer),
            ("INTEGER", TypeClass::Integer),
            ("BIGINT", TypeClass::Integer),
            ("FLOAT", TypeClass::Number),
            ("REAL", TypeClass::Number),
            ("DOUBLE", TypeClass::Number),
            ("DECIMAL", TypeClass::Number),
            ("BOOLEAN", TypeClass::Boolean),
            ("DATE", TypeClass::Temporal),
            ("DATEONLY", TypeClass::Temporal),
            ("TIME", TypeClass::Temporal),
            ("NOW", TypeClass::Constant),
            ("UUID", TypeClass::Other),
            ("UUIDV1", TypeClass::Constant),
            ("UUIDV4", TypeClass::Constant),
            ("JSON", TypeClass::Json),
            ("JSONB", TypeClass::Json),
            ("BLOB", TypeClass::Binary),
            ("ENUM", TypeClass::Enum),
            ("ARRAY", TypeClass::Array),
            ("RANGE", TypeClass::Range),
            ("GEOMETRY", TypeClass::Geometry),
            ("GEOGRAPHY", TypeClass::Geometry),
            ("INET", TypeClass::Other),
            ("CIDR", TypeClass::Other),
            ("MACADDR", TypeClass::Other),
            ("HSTORE", TypeClass::Other),
        ] {
            types.register(name, class);
        }

        types
    }

    /// Adds or replaces a catalog entry
    pub fn register(&mut self, name: impl Into<String>, class: TypeClass) -> &mut Self {
        self.types.insert(name.into(), class);
        self
    }

    /// Returns whether `path` resolves
    pub fn contains(&self, path: &str) -> bool {
        self.resolve(path).is_some()
    }

    /// Resolves a possibly dotted path.
    ///
    /// The first segment names a catalog entry, every following segment is
    /// a modifier sub-property of the value resolved so far.
    pub fn resolve(&self, path: &str) -> Option<NativeType> {
        let mut segments = path.split('.');
        let head = segments.next()?;
        let class = *self.types.get(head)?;
        let mut ty = NativeType::new(head, class);

        for segment in segments {
            let modifier = Modifier::from_name(segment)?;
            ty = ty.modifier(modifier).ok()?;
        }

        Some(ty)
    }

    /// Resolves a path, failing with `UnknownDataType`
    pub fn get(&self, path: &str) -> SchemaResult<NativeType> {
        self.resolve(path)
            .ok_or_else(|| SchemaError::unknown_data_type(path))
    }

    /// Iterates catalog names in registration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }
}

impl Default for DataTypes {
    fn default() -> Self {
        Self::standard()
    }
}
