//! Schema-to-storage compiler
//!
//! Compiles one parsed entity (`SchemaNode`) into a `CompiledArtifact`:
//! a column map for the ORM, model options, and a JSON-Schema validation
//! document kept in sync with the columns.
//!
//! # Pipeline
//!
//! - `normalizer`: splits each property into validation keywords and column
//!   directives, derives nullability and defaults
//! - `resolver`: picks the native storage type of each property
//! - `assembler`: folds the properties into the artifact and checks the
//!   document against the validation engine
//!
//! Compilation is pure and deterministic.

mod assembler;
mod directives;
mod errors;
mod fragment;
mod loader;
mod normalizer;
mod resolver;
mod types;

pub use assembler::Compiler;
pub use directives::{check_directive, is_column_directive, is_model_option};
pub use errors::{SchemaError, SchemaErrorCode, SchemaResult, Severity};
pub use fragment::{is_null_tolerant, Fragment};
pub use loader::{builtin_schemas, expand_shared, read_node, SchemaLoader, SharedSchemas};
pub use normalizer::{NormalizedProperty, PropertyNormalizer};
pub use resolver::{Resolution, TypeResolver};
pub use types::{ColumnDefault, ColumnSpec, CompiledArtifact, PropertyNode, SchemaNode};
