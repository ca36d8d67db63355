//! Error taxonomy shared by every layer of the SDK.
//!
//! Validation and emission errors are raised before anything is sent to the
//! warehouse. Driver errors are classified by the client into the ambiguous
//! "does not exist" kinds so that the safe wrappers can reason about them.

use std::error::Error as StdError;
use std::fmt;

use thiserror::Error;

use crate::ddl::EmissionError;
use crate::ident::IdentifierError;
use crate::row::ScanError;
use crate::validation::ValidationError;

/// Coarse classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Identifier is empty or malformed.
    InvalidIdentifier,
    /// Options failed a precondition predicate.
    Validation,
    /// Metadata inconsistency detected during emission.
    Emission,
    /// A show-by-identifier lookup found no match.
    ObjectNotFound,
    /// The warehouse reported "does not exist or not authorized".
    ObjectNotExistOrAuthorized,
    /// The warehouse reported "does not exist, or operation cannot be performed".
    DoesNotExistOrOperationCannotBePerformed,
    /// Any other error surfaced by the driver.
    Driver,
    /// A result row could not be decoded.
    Scan,
    /// The operation context was cancelled.
    Cancelled,
    /// The operation deadline elapsed.
    Timeout,
    /// Several errors joined together.
    Joined,
}

/// Errors produced by SDK operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Identifier is empty or malformed.
    #[error("invalid identifier: {0}")]
    InvalidIdentifier(#[from] IdentifierError),

    /// Options failed validation.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The emitter found inconsistent metadata.
    #[error("emission error: {0}")]
    Emission(#[from] EmissionError),

    /// No object matched a show-by-identifier lookup.
    #[error("object not found: {0}")]
    ObjectNotFound(String),

    /// Ambiguous "missing or unauthorized" error from the warehouse.
    #[error("object does not exist or not authorized: {0}")]
    ObjectNotExistOrAuthorized(DriverError),

    /// Ambiguous "missing or operation not possible" error from the warehouse.
    #[error("object does not exist, or operation cannot be performed: {0}")]
    DoesNotExistOrOperationCannotBePerformed(DriverError),

    /// Any other driver error.
    #[error("driver error: {0}")]
    Driver(DriverError),

    /// A row could not be decoded.
    #[error("scan error: {0}")]
    Scan(#[from] ScanError),

    /// The operation context was cancelled.
    #[error("operation cancelled")]
    Cancelled,

    /// The operation did not finish before its deadline.
    #[error("operation timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// Several errors occurred.
    #[error("{}", .0.iter().map(ToString::to_string).collect::<Vec<_>>().join("\n"))]
    Joined(Vec<Error>),
}

impl Error {
    /// Returns the kind of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidIdentifier(_) => ErrorKind::InvalidIdentifier,
            Self::Validation(_) => ErrorKind::Validation,
            Self::Emission(_) => ErrorKind::Emission,
            Self::ObjectNotFound(_) => ErrorKind::ObjectNotFound,
            Self::ObjectNotExistOrAuthorized(_) => ErrorKind::ObjectNotExistOrAuthorized,
            Self::DoesNotExistOrOperationCannotBePerformed(_) => {
                ErrorKind::DoesNotExistOrOperationCannotBePerformed
            }
            Self::Driver(_) => ErrorKind::Driver,
            Self::Scan(_) => ErrorKind::Scan,
            Self::Cancelled => ErrorKind::Cancelled,
            Self::Timeout(_) => ErrorKind::Timeout,
            Self::Joined(_) => ErrorKind::Joined,
        }
    }

    /// Returns whether this error, or any error joined into it, has `kind`.
    #[must_use]
    pub fn is(&self, kind: ErrorKind) -> bool {
        match self {
            Self::Joined(errors) => kind == ErrorKind::Joined || errors.iter().any(|e| e.is(kind)),
            other => other.kind() == kind,
        }
    }

    /// Joins errors into one.
    ///
    /// Nested joins are flattened. Returns `None` for an empty list and the
    /// error itself when only one is given.
    #[must_use]
    pub fn join(errors: impl IntoIterator<Item = Self>) -> Option<Self> {
        let mut flat = Vec::new();
        for error in errors {
            match error {
                Self::Joined(inner) => flat.extend(inner),
                other => flat.push(other),
            }
        }
        match flat.len() {
            0 => None,
            1 => flat.pop(),
            _ => Some(Self::Joined(flat)),
        }
    }

    /// Returns the joined errors, or a one-element slice for a single error.
    #[must_use]
    pub fn errors(&self) -> &[Self] {
        match self {
            Self::Joined(errors) => errors,
            other => std::slice::from_ref(other),
        }
    }
}

/// Result type alias for SDK operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error surfaced by a database driver.
#[derive(Debug)]
pub struct DriverError {
    message: String,
    code: Option<String>,
    source: Option<Box<dyn StdError + Send + Sync>>,
}

impl DriverError {
    /// Creates a driver error from its message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
            source: None,
        }
    }

    /// Attaches the driver's error or SQL state code.
    #[must_use]
    pub fn with_code(mut self, code: Option<String>) -> Self {
        self.code = code;
        self
    }

    /// Attaches the underlying driver error.
    #[must_use]
    pub fn with_source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Returns the error message as reported by the driver.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the driver's error code, if any.
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.code {
            Some(code) => write!(f, "{} ({code})", self.message),
            None => f.write_str(&self.message),
        }
    }
}

impl StdError for DriverError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_deref()
            .map(|source| source as &(dyn StdError + 'static))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn not_found(name: &str) -> Error {
        Error::ObjectNotFound(name.to_string())
    }

    #[test]
    fn test_join_empty_is_none() {
        assert!(Error::join(Vec::new()).is_none());
    }

    #[test]
    fn test_join_single_is_unwrapped() {
        let joined = Error::join([not_found("a")]).unwrap();
        assert_eq!(joined.kind(), ErrorKind::ObjectNotFound);
    }

    #[test]
    fn test_join_flattens_nested() {
        let inner = Error::join([not_found("a"), not_found("b")]).unwrap();
        let outer = Error::join([inner, Error::Cancelled]).unwrap();
        assert_eq!(outer.errors().len(), 3);
    }

    #[test]
    fn test_is_searches_joined_errors() {
        let joined = Error::join([
            Error::ObjectNotExistOrAuthorized(DriverError::new("boom")),
            not_found("db"),
        ])
        .unwrap();
        assert!(joined.is(ErrorKind::ObjectNotFound));
        assert!(joined.is(ErrorKind::ObjectNotExistOrAuthorized));
        assert!(!joined.is(ErrorKind::Timeout));
    }

    #[test]
    fn test_joined_display_is_line_separated() {
        let joined = Error::join([not_found("a"), not_found("b")]).unwrap();
        assert_eq!(
            joined.to_string(),
            "object not found: a\nobject not found: b"
        );
    }

    #[test]
    fn test_driver_error_display_with_code() {
        let error = DriverError::new("SQL compilation error").with_code(Some("002003".into()));
        assert_eq!(error.to_string(), "SQL compilation error (002003)");
        assert_eq!(error.code(), Some("002003"));
    }
}
