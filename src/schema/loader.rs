//! Entity loader for reading serialized schema nodes from disk
//!
//! - One entity per `*.json` file, in `SchemaNode` wire form
//! - A property given as a string names a shared schema (`"DATE"`)
//! - Entities are keyed by title and immutable once registered
//! - Unreadable or undecodable files are FATAL

use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde_json::{json, Map, Value};
use tracing::debug;

use super::errors::{SchemaError, SchemaResult};
use super::fragment::Fragment;
use super::types::SchemaNode;

/// Named fragments a property can refer to by name
pub type SharedSchemas = IndexMap<String, Fragment>;

/// Entity loader that reads schema files and keeps an in-memory registry.
pub struct SchemaLoader {
    /// Directory containing entity files
    schema_dir: PathBuf,
    /// Shared schemas used to expand named properties
    shared: SharedSchemas,
    /// Loaded entities in load order, keyed by title
    schemas: IndexMap<String, SchemaNode>,
}

impl SchemaLoader {
    /// Creates a loader for the given directory with the built-in shared schemas.
    pub fn new(schema_dir: &Path) -> Self {
        Self::with_shared(schema_dir, builtin_schemas())
    }

    /// Creates a loader that expands named properties from `shared`.
    pub fn with_shared(schema_dir: &Path, shared: SharedSchemas) -> Self {
        Self {
            schema_dir: schema_dir.to_path_buf(),
            shared,
            schemas: IndexMap::new(),
        }
    }

    /// Returns the entity directory path.
    pub fn schema_dir(&self) -> &Path {
        &self.schema_dir
    }

    /// Returns the shared schemas named properties resolve against.
    pub fn shared(&self) -> &SharedSchemas {
        &self.shared
    }

    /// Loads every entity file of the directory, in file name order.
    ///
    /// A missing directory holds no entities.
    pub fn load_all(&mut self) -> SchemaResult<()> {
        if !self.schema_dir.exists() {
            return Ok(());
        }

        let entries = fs::read_dir(&self.schema_dir).map_err(|e| {
            SchemaError::malformed_file(
                self.schema_dir.display().to_string(),
                format!("Failed to read schema directory: {}", e),
            )
        })?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| {
                SchemaError::malformed_file(
                    self.schema_dir.display().to_string(),
                    format!("Failed to read directory entry: {}", e),
                )
            })?;

            let path = entry.path();
            if path.extension().map_or(false, |ext| ext == "json") {
                paths.push(path);
            }
        }
        paths.sort();

        for path in paths {
            self.load_file(&path)?;
        }

        Ok(())
    }

    /// Loads and registers a single entity file.
    pub fn load_file(&mut self, path: &Path) -> SchemaResult<()> {
        let node = read_node(path, &self.shared)?;
        debug!(path = %path.display(), entity = %node.title, "loaded entity");
        self.register(node)
    }

    /// Registers an entity directly.
    pub fn register(&mut self, node: SchemaNode) -> SchemaResult<()> {
        if self.schemas.contains_key(&node.title) {
            return Err(SchemaError::duplicate(&node.title));
        }

        self.schemas.insert(node.title.clone(), node);
        Ok(())
    }

    /// Gets an entity by title.
    pub fn get(&self, title: &str) -> Option<&SchemaNode> {
        self.schemas.get(title)
    }

    /// Checks if an entity exists.
    pub fn exists(&self, title: &str) -> bool {
        self.schemas.contains_key(title)
    }

    /// Returns all loaded entities, in load order.
    pub fn all_schemas(&self) -> impl Iterator<Item = &SchemaNode> {
        self.schemas.values()
    }

    /// Returns the number of loaded entities.
    pub fn schema_count(&self) -> usize {
        self.schemas.len()
    }
}

/// Reads one entity file, expanding named properties from `shared`.
pub fn read_node(path: &Path, shared: &SharedSchemas) -> SchemaResult<SchemaNode> {
    let malformed = |reason: String| SchemaError::malformed_file(path.display().to_string(), reason);

    let content = fs::read_to_string(path)
        .map_err(|e| malformed(format!("Failed to read file: {}", e)))?;

    let mut value: Value =
        serde_json::from_str(&content).map_err(|e| malformed(format!("Invalid JSON: {}", e)))?;

    expand_shared(&mut value, shared).map_err(malformed)?;

    serde_json::from_value(value).map_err(|e| malformed(format!("Invalid entity: {}", e)))
}

/// Replaces every property written as a name with a copy of that shared schema
pub fn expand_shared(node: &mut Value, shared: &SharedSchemas) -> Result<(), String> {
    let Some(properties) = node.get_mut("properties").and_then(Value::as_object_mut) else {
        return Ok(());
    };

    for (name, property) in properties.iter_mut() {
        let Some(reference) = property.as_str().map(str::to_string) else {
            continue;
        };

        let fragment = shared
            .get(&reference)
            .ok_or_else(|| format!("Unknown schema {:?} for property {:?}", reference, name))?;
        *property = serde_json::to_value(fragment).map_err(|e| e.to_string())?;
    }

    Ok(())
}

/// Shared schemas available to every entity
pub fn builtin_schemas() -> SharedSchemas {
    let mut date = Map::new();
    date.insert("type".to_string(), json!("string"));

    let mut schemas = IndexMap::new();
    schemas.insert("DATE".to_string(), Fragment::new(date).with_data_type("DATE"));
    schemas
}
