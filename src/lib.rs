//! schemac - compiles entity schemas into storage columns and validators
//!
//! One entity description yields two synchronized artifacts: a JSON-Schema
//! validation document and the column definitions an ORM registers.
//! Compiled models then hand out cached validators for single properties
//! and property subsets.

pub mod builder;
pub mod cli;
pub mod config;
pub mod datatype;
pub mod error;
pub mod model;
pub mod schema;
pub mod validator;

pub use builder::SchemaBuilder;
pub use config::{CompilerConfig, Dialect};
pub use error::{Error, Result};
pub use model::Model;
pub use schema::{CompiledArtifact, Compiler, SchemaError, SchemaNode};
pub use validator::{ColumnValidationError, Validator};
