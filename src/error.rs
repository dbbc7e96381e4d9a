//! Crate-level error umbrella

use thiserror::Error;

use crate::schema::SchemaError;
use crate::validator::ColumnValidationError;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Validation(#[from] ColumnValidationError),

    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    pub fn config(message: impl Into<String>) -> Self {
        Error::Config(message.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
