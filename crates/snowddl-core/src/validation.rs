//! Validation combinators shared by every options struct.
//!
//! The combinators work over any mix of field types through the
//! [`ValueSet`] trait, so a rule such as "exactly one of `set`, `unset`,
//! `rename`" reads the same whether the fields are options, lists or nested
//! structs:
//!
//! ```rust
//! use snowddl_core::validation::{err_exactly_one_of, exactly_one_value_set};
//!
//! let set: Option<u32> = Some(300);
//! let unset: Option<bool> = None;
//! let rename: Vec<String> = Vec::new();
//!
//! assert!(exactly_one_value_set(&[&set, &unset, &rename]));
//! let err = err_exactly_one_of("AlterWarehouseOptions", &["set", "unset", "rename"]);
//! assert!(err.to_string().contains("[set unset rename]"));
//! ```

use thiserror::Error;

use crate::ddl::ValueSet;
use crate::error::{Error, Result};
use crate::ident::{IdentifierError, ObjectIdentifier};

/// An options struct failed one of its preconditions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationError {
    message: String,
}

impl ValidationError {
    /// Creates an error with a custom message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Returns the message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Returns whether `value` is set.
#[must_use]
pub fn value_set(value: &dyn ValueSet) -> bool {
    value.is_value_set()
}

/// Returns whether at least one value is set.
#[must_use]
pub fn any_value_set(values: &[&dyn ValueSet]) -> bool {
    values.iter().any(|v| v.is_value_set())
}

/// Returns whether every value is set.
#[must_use]
pub fn every_value_set(values: &[&dyn ValueSet]) -> bool {
    values.iter().all(|v| v.is_value_set())
}

/// Returns whether no value is set.
#[must_use]
pub fn every_value_nil(values: &[&dyn ValueSet]) -> bool {
    !any_value_set(values)
}

/// Returns whether exactly one value is set.
#[must_use]
pub fn exactly_one_value_set(values: &[&dyn ValueSet]) -> bool {
    values.iter().filter(|v| v.is_value_set()).count() == 1
}

/// Returns whether two or more values are set.
#[must_use]
pub fn more_than_one_value_set(values: &[&dyn ValueSet]) -> bool {
    values.iter().filter(|v| v.is_value_set()).count() > 1
}

/// "exactly one of `structure` fields [...] must be set".
#[must_use]
pub fn err_exactly_one_of(structure: &str, fields: &[&str]) -> ValidationError {
    ValidationError::new(format!(
        "exactly one of {structure} fields [{}] must be set",
        fields.join(" ")
    ))
}

/// "at least one of `structure` fields [...] must be set".
#[must_use]
pub fn err_at_least_one_of(structure: &str, fields: &[&str]) -> ValidationError {
    ValidationError::new(format!(
        "at least one of {structure} fields [{}] must be set",
        fields.join(" ")
    ))
}

/// "fields [...] are incompatible and cannot be set at the same time".
#[must_use]
pub fn err_one_of(structure: &str, fields: &[&str]) -> ValidationError {
    ValidationError::new(format!(
        "{structure} fields [{}] are incompatible and cannot be set at the same time",
        fields.join(" ")
    ))
}

/// "`structure` field `field` must be set".
#[must_use]
pub fn err_not_set(structure: &str, field: &str) -> ValidationError {
    ValidationError::new(format!("{structure} field `{field}` must be set"))
}

/// Invalid identifier in `structure.field`.
#[must_use]
pub const fn err_invalid_identifier(structure: &'static str, field: &'static str) -> Error {
    Error::InvalidIdentifier(IdentifierError::InvalidField { structure, field })
}

/// Trait implemented by every options struct.
pub trait Validate {
    /// Checks the options before emission.
    ///
    /// # Errors
    ///
    /// Returns the joined validation and identifier errors.
    fn validate(&self) -> Result<()>;
}

impl<T: Validate> Validate for Option<T> {
    fn validate(&self) -> Result<()> {
        self.as_ref().map_or(Ok(()), Validate::validate)
    }
}

/// Accumulates the failures of one validation run.
#[derive(Debug, Default)]
pub struct ValidationErrors {
    errors: Vec<Error>,
}

impl ValidationErrors {
    /// Creates an empty collector.
    #[must_use]
    pub const fn new() -> Self {
        Self { errors: Vec::new() }
    }

    /// Records an error.
    pub fn push(&mut self, error: impl Into<Error>) {
        self.errors.push(error.into());
    }

    /// Records `error` when `failed` holds.
    pub fn check(&mut self, failed: bool, error: impl FnOnce() -> ValidationError) {
        if failed {
            self.push(error());
        }
    }

    /// Records an invalid-identifier error unless `id` is valid.
    pub fn identifier(
        &mut self,
        id: &impl ObjectIdentifier,
        structure: &'static str,
        field: &'static str,
    ) {
        if !id.is_valid() {
            self.push(err_invalid_identifier(structure, field));
        }
    }

    /// Runs a nested validation, keeping its errors.
    pub fn nested(&mut self, result: Result<()>) {
        if let Err(error) = result {
            self.push(error);
        }
    }

    /// Returns whether no error was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Finishes the run, joining every recorded error.
    ///
    /// # Errors
    ///
    /// Returns the single error, or [`Error::Joined`] for several.
    pub fn finish(self) -> Result<()> {
        Error::join(self.errors).map_or(Ok(()), Err)
    }
}
