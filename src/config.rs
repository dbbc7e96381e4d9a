//! Compiler configuration
//!
//! Loaded from a JSON file:
//!
//! ```json
//! {
//!   "dialect": "postgres",
//!   "default_json_type": "JSONB",
//!   "custom_types": {"LTREE": "string"},
//!   "schema_dir": "./entities",
//!   "extra_schemas": {"Email": {"type": "string", "format": "email"}}
//! }
//! ```
//!
//! Every field is optional.

use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::datatype::{DataTypes, NativeType, TypeClass};
use crate::error::{Error, Result};
use crate::schema::{builtin_schemas, Fragment, SharedSchemas};

/// Target SQL dialect
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    #[default]
    Postgres,
    Mysql,
    Mariadb,
    Sqlite,
    Mssql,
}

impl Dialect {
    /// Storage type of `object` and `array` properties when none is configured
    pub fn default_json_type(&self) -> &'static str {
        match self {
            Dialect::Postgres => "JSONB",
            _ => "JSON",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompilerConfig {
    #[serde(default)]
    pub dialect: Dialect,

    /// Overrides the dialect's JSON storage type
    #[serde(default)]
    pub default_json_type: Option<String>,

    /// Extra catalog entries, by name
    #[serde(default)]
    pub custom_types: IndexMap<String, TypeClass>,

    /// Directory of serialized entities
    #[serde(default)]
    pub schema_dir: Option<PathBuf>,

    /// Shared schemas added to the built-in ones, by name
    #[serde(default)]
    pub extra_schemas: IndexMap<String, Fragment>,
}

impl CompilerConfig {
    /// Load configuration from file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| Error::config(format!("Failed to read config: {}", e)))?;

        let config: CompilerConfig = serde_json::from_str(&content)
            .map_err(|e| Error::config(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        for name in self.custom_types.keys() {
            let well_formed = !name.is_empty()
                && name
                    .chars()
                    .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_');
            if !well_formed {
                return Err(Error::config(format!(
                    "Invalid custom type name: '{}'. Use uppercase letters, digits and '_'.",
                    name
                )));
            }
        }

        let types = self.data_types();
        for (name, fragment) in &self.extra_schemas {
            if let Some(data_type) = &fragment.data_type {
                data_type.evaluate(&types).map_err(|e| {
                    Error::config(format!("Invalid extra schema '{}': {}", name, e.message()))
                })?;
            }
        }

        let json_type = self.json_type_name();
        match types.resolve(json_type) {
            Some(ty) if ty.is_json() => Ok(()),
            Some(_) => Err(Error::config(format!(
                "default_json_type '{}' is not a JSON type",
                json_type
            ))),
            None => Err(Error::config(format!(
                "default_json_type '{}' is not a known type",
                json_type
            ))),
        }
    }

    /// Standard catalog extended with the custom types
    pub fn data_types(&self) -> DataTypes {
        let mut types = DataTypes::standard();
        for (name, class) in &self.custom_types {
            types.register(name.clone(), *class);
        }
        types
    }

    pub fn json_type_name(&self) -> &str {
        self.default_json_type
            .as_deref()
            .unwrap_or_else(|| self.dialect.default_json_type())
    }

    /// Built-in shared schemas overlaid with `extra_schemas`
    pub fn shared_schemas(&self) -> SharedSchemas {
        let mut schemas = builtin_schemas();
        for (name, fragment) in &self.extra_schemas {
            schemas.insert(name.clone(), fragment.clone());
        }
        schemas
    }

    /// Resolves the JSON storage type against `types`
    pub fn json_type(&self, types: &DataTypes) -> Result<NativeType> {
        types.get(self.json_type_name()).map_err(Error::from)
    }
}
