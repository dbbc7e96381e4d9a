//! Schema compiler error types
//!
//! Error codes:
//! - SCHEMA_UNKNOWN_DATA_TYPE (FATAL)
//! - SCHEMA_INVALID_DATA_TYPE (FATAL)
//! - SCHEMA_UNKNOWN_NATIVE_TYPE (FATAL)
//! - SCHEMA_MIXED_UNION_TYPE (FATAL)
//! - SCHEMA_EMPTY_UNION (FATAL)
//! - SCHEMA_MISSING_DATA_TYPE (FATAL)
//! - SCHEMA_INVALID_DIRECTIVE (FATAL)
//! - SCHEMA_MALFORMED_DOCUMENT (FATAL)
//! - SCHEMA_MALFORMED_FILE (FATAL)
//! - SCHEMA_DUPLICATE (REJECT)
//! - SCHEMA_UNDEFINED_PROPERTY (REJECT)
//! - SCHEMA_EMPTY_ARGS (REJECT)

use std::fmt;

/// Severity levels for schema errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Caller misuse of a runtime API, the caller may retry with other input
    Reject,
    /// Compilation of the current entity is aborted
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Reject => write!(f, "REJECT"),
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

/// Schema error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaErrorCode {
    /// Descriptor path or modifier not found in the native type namespace
    UnknownDataType,
    /// Explicit storage type is not a usable native type reference
    InvalidDataType,
    /// Declared validation type has no native counterpart
    UnknownNativeType,
    /// Union branches disagree on their declared type
    MixedUnionType,
    /// Union has too few meaningful branches
    EmptyUnion,
    /// Modifier applied to a fragment without a storage type
    MissingDataType,
    /// Storage directive carries a value of the wrong kind
    InvalidDirective,
    /// Assembled document is not a legal schema
    MalformedDocument,
    /// Serialized schema file cannot be read or decoded
    MalformedFile,
    /// Entity registered twice
    Duplicate,
    /// Reference to a property the schema does not define
    UndefinedProperty,
    /// Variadic call made without arguments
    EmptyArgs,
}

impl SchemaErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            SchemaErrorCode::UnknownDataType => "SCHEMA_UNKNOWN_DATA_TYPE",
            SchemaErrorCode::InvalidDataType => "SCHEMA_INVALID_DATA_TYPE",
            SchemaErrorCode::UnknownNativeType => "SCHEMA_UNKNOWN_NATIVE_TYPE",
            SchemaErrorCode::MixedUnionType => "SCHEMA_MIXED_UNION_TYPE",
            SchemaErrorCode::EmptyUnion => "SCHEMA_EMPTY_UNION",
            SchemaErrorCode::MissingDataType => "SCHEMA_MISSING_DATA_TYPE",
            SchemaErrorCode::InvalidDirective => "SCHEMA_INVALID_DIRECTIVE",
            SchemaErrorCode::MalformedDocument => "SCHEMA_MALFORMED_DOCUMENT",
            SchemaErrorCode::MalformedFile => "SCHEMA_MALFORMED_FILE",
            SchemaErrorCode::Duplicate => "SCHEMA_DUPLICATE",
            SchemaErrorCode::UndefinedProperty => "SCHEMA_UNDEFINED_PROPERTY",
            SchemaErrorCode::EmptyArgs => "SCHEMA_EMPTY_ARGS",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        match self {
            SchemaErrorCode::Duplicate
            | SchemaErrorCode::UndefinedProperty
            | SchemaErrorCode::EmptyArgs => Severity::Reject,
            _ => Severity::Fatal,
        }
    }
}

impl fmt::Display for SchemaErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Schema error type with full context
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaError {
    /// Error code
    code: SchemaErrorCode,
    /// Human-readable message
    message: String,
    /// Entity being compiled, if known
    entity: Option<String>,
    /// Property being compiled, if known
    property: Option<String>,
}

impl SchemaError {
    fn new(code: SchemaErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            entity: None,
            property: None,
        }
    }

    /// Create an unknown data type error
    pub fn unknown_data_type(path: impl AsRef<str>) -> Self {
        Self::new(
            SchemaErrorCode::UnknownDataType,
            format!("Unknown data type: {:?}", path.as_ref()),
        )
    }

    /// Create an invalid data type error
    pub fn invalid_data_type(reason: impl Into<String>) -> Self {
        Self::new(
            SchemaErrorCode::InvalidDataType,
            format!("Invalid column data type: {}", reason.into()),
        )
    }

    /// Create an unknown native type error
    pub fn unknown_native_type(ty: impl fmt::Display) -> Self {
        Self::new(
            SchemaErrorCode::UnknownNativeType,
            format!("Invalid column validator type: {}", ty),
        )
    }

    /// Create a mixed union type error
    pub fn mixed_union_type(keyword: &str) -> Self {
        Self::new(
            SchemaErrorCode::MixedUnionType,
            format!("All items in {:?} must be same type", keyword),
        )
    }

    /// Create an empty union error
    pub fn empty_union(keyword: &str) -> Self {
        Self::new(
            SchemaErrorCode::EmptyUnion,
            format!("Invalid number of items in {:?}", keyword),
        )
    }

    /// Create a missing data type error for a modifier
    pub fn missing_data_type(modifier: impl fmt::Display) -> Self {
        Self::new(
            SchemaErrorCode::MissingDataType,
            format!("Modifier {} requires a preceding data type", modifier),
        )
    }

    /// Create an invalid directive error
    pub fn invalid_directive(name: &str, expected: &str) -> Self {
        Self::new(
            SchemaErrorCode::InvalidDirective,
            format!("Directive {:?} expects {}", name, expected),
        )
    }

    /// Create a malformed document error
    pub fn malformed_document(reason: impl Into<String>) -> Self {
        Self::new(
            SchemaErrorCode::MalformedDocument,
            format!("Assembled schema is invalid: {}", reason.into()),
        )
    }

    /// Create an error for a malformed schema file
    pub fn malformed_file(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(
            SchemaErrorCode::MalformedFile,
            format!("Malformed schema file '{}': {}", path.into(), reason.into()),
        )
    }

    /// Create a duplicate entity error
    pub fn duplicate(name: impl AsRef<str>) -> Self {
        Self::new(
            SchemaErrorCode::Duplicate,
            format!("Entity {:?} is already registered", name.as_ref()),
        )
    }

    /// Create an undefined property error
    pub fn undefined_property(name: impl AsRef<str>) -> Self {
        let name = name.as_ref();
        let mut err = Self::new(
            SchemaErrorCode::UndefinedProperty,
            format!("Undefined property {:?}", name),
        );
        err.property = Some(name.to_string());
        err
    }

    /// Create an empty arguments error
    pub fn empty_args(method: &str) -> Self {
        Self::new(
            SchemaErrorCode::EmptyArgs,
            format!("Method {:?} requires at least one argument", method),
        )
    }

    /// Attaches the entity name, keeping any name already present
    pub fn in_entity(mut self, entity: impl Into<String>) -> Self {
        if self.entity.is_none() {
            self.entity = Some(entity.into());
        }
        self
    }

    /// Attaches the property name, keeping any name already present
    pub fn in_property(mut self, property: impl Into<String>) -> Self {
        if self.property.is_none() {
            self.property = Some(property.into());
        }
        self
    }

    /// Returns the error code
    pub fn code(&self) -> SchemaErrorCode {
        self.code
    }

    /// Returns the severity level
    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the entity name if known
    pub fn entity(&self) -> Option<&str> {
        self.entity.as_deref()
    }

    /// Returns the property name if known
    pub fn property(&self) -> Option<&str> {
        self.property.as_deref()
    }

    /// Returns whether this error aborts compilation
    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.code.severity(), self.code.code(), self.message)?;
        match (&self.entity, &self.property) {
            (Some(entity), Some(property)) => write!(f, " (at {}.{})", entity, property),
            (Some(entity), None) => write!(f, " (at {})", entity),
            (None, Some(property)) => write!(f, " (at {})", property),
            (None, None) => Ok(()),
        }
    }
}

impl std::error::Error for SchemaError {}

/// Result type for schema operations
pub type SchemaResult<T> = Result<T, SchemaError>;
