//! Compiled validators and their per-model cache
//!
//! Validators are compiled lazily, once per key, and shared through `Arc`.
//! Compilation runs under the cache lock, so concurrent first requests for
//! one key compile once.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use jsonschema::Draft;
use serde_json::Value;
use tracing::trace;

use super::errors::{ColumnValidationError, ErrorEntry};
use crate::schema::{SchemaError, SchemaResult};

/// A compiled predicate plus the errors of its last call
pub struct Validator {
    compiled: jsonschema::Validator,
    label: Option<String>,
    errors: Mutex<Option<Vec<ErrorEntry>>>,
}

impl Validator {
    /// Compiles `schema`.
    ///
    /// `label` names the validated value in failure messages.
    pub fn compile(schema: &Value, label: Option<String>) -> SchemaResult<Self> {
        let compiled = jsonschema::options()
            .with_draft(Draft::Draft7)
            .build(schema)
            .map_err(|e| SchemaError::malformed_document(e.to_string()))?;

        Ok(Self {
            compiled,
            label,
            errors: Mutex::new(None),
        })
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Checks `value`, replacing the stored errors with this call's
    pub fn is_valid(&self, value: &Value) -> bool {
        let errors = match self.compiled.validate(value) {
            Ok(()) => None,
            Err(errors) => Some(errors.map(|e| ErrorEntry::from_engine(&e)).collect::<Vec<_>>()),
        };
        let valid = errors.is_none();

        *self.errors.lock().unwrap_or_else(PoisonError::into_inner) = errors;
        valid
    }

    /// Errors of the last `is_valid` call, `None` when it passed
    pub fn errors(&self) -> Option<Vec<ErrorEntry>> {
        self.errors
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn validate(&self, value: &Value) -> Result<(), ColumnValidationError> {
        if self.is_valid(value) {
            return Ok(());
        }

        let errors = self.errors().unwrap_or_default();
        Err(ColumnValidationError::new(errors, self.label()))
    }
}

impl std::fmt::Debug for Validator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Validator")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

/// Cache key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ValidatorKey {
    /// One property, labelled with its name
    Prop(String),
    /// A sorted set of properties
    Props(Vec<String>),
    /// One property, labelled as a column of an instance
    Column(String),
}

impl ValidatorKey {
    /// Key for a property set, independent of order and repetition
    pub fn props<S: AsRef<str>>(names: &[S]) -> Self {
        let mut names: Vec<String> = names.iter().map(|n| n.as_ref().to_string()).collect();
        names.sort();
        names.dedup();
        ValidatorKey::Props(names)
    }

    /// Property names covered by the key
    pub fn names(&self) -> &[String] {
        match self {
            ValidatorKey::Prop(name) | ValidatorKey::Column(name) => std::slice::from_ref(name),
            ValidatorKey::Props(names) => names,
        }
    }
}

#[derive(Debug, Default)]
pub struct ValidatorCache {
    validators: Mutex<HashMap<ValidatorKey, Arc<Validator>>>,
}

impl ValidatorCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached validator for `key`, compiling it on first use
    pub fn get_or_compile(
        &self,
        key: ValidatorKey,
        compile: impl FnOnce() -> SchemaResult<Validator>,
    ) -> SchemaResult<Arc<Validator>> {
        let mut validators = self
            .validators
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if let Some(validator) = validators.get(&key) {
            trace!(?key, "validator cache hit");
            return Ok(Arc::clone(validator));
        }

        let validator = Arc::new(compile()?);
        validators.insert(key, Arc::clone(&validator));
        Ok(validator)
    }

    pub fn len(&self) -> usize {
        self.validators
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
