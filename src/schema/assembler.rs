//! Entity compilation
//!
//! Folds normalized properties into one `CompiledArtifact`: the column map,
//! the model options and the validation document. The document is compiled
//! by the validation engine before it is handed out.

use indexmap::IndexMap;
use jsonschema::Draft;
use serde_json::{json, Map, Value};
use tracing::debug;

use super::directives::is_model_option;
use super::errors::{SchemaError, SchemaResult};
use super::normalizer::PropertyNormalizer;
use super::resolver::TypeResolver;
use super::types::{CompiledArtifact, SchemaNode};
use crate::config::CompilerConfig;
use crate::datatype::{DataTypes, NativeType};
use crate::error::Result;
use crate::model::Model;
use crate::validator::ValidatorCache;

/// Schema-to-storage compiler
#[derive(Debug, Clone)]
pub struct Compiler {
    types: DataTypes,
    json_type: NativeType,
}

impl Compiler {
    pub fn new(config: CompilerConfig) -> Result<Self> {
        config.validate()?;
        let types = config.data_types();
        let json_type = config.json_type(&types)?;

        Ok(Self { types, json_type })
    }

    /// Creates a compiler over an explicit namespace
    pub fn with_types(types: DataTypes, json_type: NativeType) -> Self {
        Self { types, json_type }
    }

    pub fn data_types(&self) -> &DataTypes {
        &self.types
    }

    pub fn json_type(&self) -> &NativeType {
        &self.json_type
    }

    /// Compiles one entity.
    ///
    /// The result owns all of its data; compiling the same node twice
    /// yields equal artifacts.
    pub fn compile(&self, node: &SchemaNode) -> SchemaResult<CompiledArtifact> {
        let artifact = self
            .assemble(node)
            .map_err(|e| e.in_entity(node.title.clone()))?;

        debug!(
            entity = %artifact.name,
            columns = artifact.columns.len(),
            options = artifact.options.len(),
            "compiled entity"
        );
        Ok(artifact)
    }

    /// Compiles one entity and registers it with a fresh validator cache
    pub fn define(&self, node: &SchemaNode) -> SchemaResult<Model> {
        let artifact = self.compile(node)?;
        Ok(Model::new(artifact, ValidatorCache::new()))
    }

    fn assemble(&self, node: &SchemaNode) -> SchemaResult<CompiledArtifact> {
        let normalizer =
            PropertyNormalizer::new(&self.types, TypeResolver::new(&self.types, &self.json_type));

        let mut columns = IndexMap::with_capacity(node.properties.len());
        let mut properties = Map::new();

        for (name, property) in &node.properties {
            let normalized = normalizer.normalize(name, property, node.is_required(name))?;
            properties.insert(name.clone(), normalized.schema);
            columns.insert(name.clone(), normalized.column);
        }

        let mut options = Map::new();
        let mut schema = Map::new();
        schema.insert("title".into(), Value::String(node.title.clone()));

        for (key, value) in &node.rest {
            if is_model_option(key) {
                options.insert(key.clone(), value.clone());
            } else {
                schema.insert(key.clone(), value.clone());
            }
        }

        if !options.contains_key("comment") {
            if let Some(description) = node.rest.get("description").filter(|d| d.is_string()) {
                options.insert("comment".into(), description.clone());
            }
        }

        schema.insert("type".into(), json!("object"));
        schema.insert("additionalProperties".into(), Value::Bool(false));
        schema.insert("required".into(), json!(node.required));
        schema.insert("properties".into(), Value::Object(properties));

        let schema = Value::Object(schema);
        check_document(&schema)?;

        Ok(CompiledArtifact {
            name: node.title.clone(),
            columns,
            options,
            schema,
        })
    }
}

/// Compiles the document with the validation engine
fn check_document(schema: &Value) -> SchemaResult<()> {
    jsonschema::options()
        .with_draft(Draft::Draft7)
        .build(schema)
        .map(|_| ())
        .map_err(|e| SchemaError::malformed_document(e.to_string()))
}
