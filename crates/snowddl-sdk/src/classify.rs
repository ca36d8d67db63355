//! Promotion of driver errors to the SDK's error kinds.
//!
//! The warehouse reports missing objects with English phrases rather than
//! stable codes, so classification matches the message text against a single
//! phrase table. A server-side rewording silently downgrades the error to
//! [`Error::Driver`]; keep this table in sync when that happens.

use std::sync::OnceLock;

use regex::RegexSet;
use snowddl_core::{DriverError, Error, ErrorKind};
use tracing::warn;

/// Known phrases and the kind each one maps to, in priority order.
const PHRASES: &[(&str, ErrorKind)] = &[
    (
        r"(?i)does not exist or not authorized",
        ErrorKind::ObjectNotExistOrAuthorized,
    ),
    (
        r"(?i)does not exist,? or operation cannot be performed",
        ErrorKind::DoesNotExistOrOperationCannotBePerformed,
    ),
];

fn phrase_set() -> &'static RegexSet {
    static SET: OnceLock<RegexSet> = OnceLock::new();
    SET.get_or_init(|| {
        // The table is static; a bad pattern falls back to matching nothing.
        RegexSet::new(PHRASES.iter().map(|(pattern, _)| *pattern))
            .unwrap_or_else(|_| RegexSet::empty())
    })
}

/// Returns the kind a driver message classifies as.
#[must_use]
pub fn classify_message(message: &str) -> ErrorKind {
    phrase_set()
        .matches(message)
        .iter()
        .next()
        .map_or(ErrorKind::Driver, |index| PHRASES[index].1)
}

/// Converts a driver error into an SDK error.
#[must_use]
pub fn classify(err: DriverError) -> Error {
    match classify_message(err.message()) {
        ErrorKind::ObjectNotExistOrAuthorized => {
            warn!(error = %err, "classified as object does not exist or not authorized");
            Error::ObjectNotExistOrAuthorized(err)
        }
        ErrorKind::DoesNotExistOrOperationCannotBePerformed => {
            warn!(error = %err, "classified as object does not exist or operation cannot be performed");
            Error::DoesNotExistOrOperationCannotBePerformed(err)
        }
        _ => Error::Driver(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_exist_or_not_authorized() {
        let err = classify(DriverError::new(
            "002003 (02000): SQL compilation error:\nSchema 'DB.SC' does not exist or not authorized.",
        ));
        assert_eq!(err.kind(), ErrorKind::ObjectNotExistOrAuthorized);
    }

    #[test]
    fn test_operation_cannot_be_performed() {
        let err = classify(DriverError::new(
            "Object 'DB.SC.A' does not exist, or operation cannot be performed.",
        ));
        assert_eq!(err.kind(), ErrorKind::DoesNotExistOrOperationCannotBePerformed);
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(
            classify_message("DOES NOT EXIST OR NOT AUTHORIZED"),
            ErrorKind::ObjectNotExistOrAuthorized
        );
    }

    #[test]
    fn test_unknown_passes_through() {
        let err = classify(DriverError::new("syntax error line 1 at position 7").with_code(Some("001003".into())));
        assert_eq!(err.kind(), ErrorKind::Driver);
        assert!(err.to_string().contains("001003"));
    }
}
