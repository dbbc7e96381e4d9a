//! Runtime validators derived from compiled documents
//!
//! - `cache`: lazily compiled validators keyed by property set
//! - `errors`: `ColumnValidationError` and the failure message format

mod cache;
mod errors;

pub use cache::{Validator, ValidatorCache, ValidatorKey};
pub use errors::{format_errors, pointer_to_path, ColumnValidationError, ErrorEntry};
