//! Error and advisory types.
//!
//! Three channels exist:
//!
//! - [`ValidationError`]: a value was rejected by a validator. Raised at the
//!   offending `set_*`/`add_*` call, before anything is written.
//! - [`Error`]: everything a builder, serializer or reader can fail with,
//!   including wrapped validation errors.
//! - [`Advisory`]: non-fatal findings (non-UTC timestamps, extension terms)
//!   that are reported on the `tracing` warning channel and never abort.

use std::fmt;

use thiserror::Error;

/// A value rejected by one of the validators.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The URI contains a reserved or unsafe character.
    #[error("invalid character {found:?} at position {position} in URI {uri:?}; special characters must be encoded")]
    InvalidUri {
        uri: String,
        found: char,
        position: usize,
    },
    /// Identifiers must be `http` or `https` URIs.
    #[error("identifier must start with http or https: {0}")]
    NotHttp(String),
    /// Both an explicit identifier and a base-URL suffix were given.
    #[error("set the identifier from an explicit URI or from a base-URL suffix, not both")]
    ConflictingIdentifier,
    /// Neither an explicit identifier nor a suffix was given.
    #[error("no identifier given")]
    MissingIdentifier,
    /// Joining would glue the base URL and suffix without a `/`.
    #[error("cannot join base URL {base:?} with {suffix:?}: add a '/' to one of them")]
    BaseUrlJoin { base: String, suffix: String },
    /// Media type is malformed or not registered.
    #[error("invalid format {format:?}: {reason}")]
    InvalidFormat { format: String, reason: &'static str },
    /// Value is not an XSD dateTime literal with a timezone.
    #[error("value must be an XSD dateTime literal with a timezone, was: {0}")]
    InvalidTimestamp(String),
    /// Language tag is not in the configured table.
    #[error("language must be a known BCP-47 tag or \"none\", was: {0}")]
    UnknownLanguage(String),
    /// Value outside a closed vocabulary.
    #[error("{field} must be one of {allowed}, was: {value}")]
    DisallowedValue {
        field: &'static str,
        value: String,
        allowed: &'static str,
    },
    /// Audience types and properties must use the `schema:` prefix.
    #[error("{0} must start with the schema: prefix")]
    MissingSchemaPrefix(String),
    /// Generic resource `type` not in the configured vocabulary.
    #[error("{0} is a non-standard resource type; add it to the configured resource types")]
    UnknownResourceType(String),
}

/// Errors raised while building, serializing or reading documents.
#[derive(Debug, Error)]
pub enum Error {
    /// A validator rejected a value.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A child of the wrong family was attached to a node.
    #[error("{child} object cannot be added to {owner}")]
    TypeMismatch {
        child: &'static str,
        owner: &'static str,
    },

    /// A value conflicts with the kind of values already held by a field.
    #[error("cannot add a {found} value to {field}, which holds {expected} values")]
    IncompatibleValue {
        field: String,
        expected: &'static str,
        found: &'static str,
    },

    /// Strict serialization reached an unmet `Required` field.
    #[error("missing required field {path}: {description}")]
    MissingRequiredField { path: String, description: String },

    /// File I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing or serialization failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Lookup-table or settings failure.
    #[error(transparent)]
    Registry(#[from] wadm_registry::RegistryError),

    /// An input document could not be mapped back onto nodes.
    #[error("cannot rehydrate document: {0}")]
    Rehydrate(String),
}

/// Convenience alias for results with [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// A non-fatal finding produced by a validator.
///
/// Setters report advisories with [`Advisory::emit`]; the pure validators in
/// [`crate::validate`] return them so callers can inspect them directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advisory {
    /// Timestamp uses a numeric offset instead of `Z`.
    NonUtcTimestamp(String),
    /// Motivation or purpose outside the standard vocabulary.
    NonStandardTerm { field: &'static str, term: String },
    /// A collection identifier that is not an HTTP(S) URI.
    NonHttpIdentifier(String),
}

impl Advisory {
    /// Reports the advisory on the `tracing` warning channel.
    pub fn emit(&self) {
        match self {
            Advisory::NonUtcTimestamp(value) => {
                tracing::warn!(value = %value, "Timestamp should be given in UTC with the Z suffix");
            }
            Advisory::NonStandardTerm { field, term } => {
                tracing::warn!(field = %field, term = %term, "Term is not in the standard motivation vocabulary");
            }
            Advisory::NonHttpIdentifier(id) => {
                tracing::warn!(id = %id, "Annotation collections should use an HTTP(S) identifier");
            }
        }
    }
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Advisory::NonUtcTimestamp(value) => {
                write!(f, "timestamp {value} should be given in UTC with the Z suffix")
            }
            Advisory::NonStandardTerm { field, term } => {
                write!(f, "{field} term {term:?} is not in the standard vocabulary")
            }
            Advisory::NonHttpIdentifier(id) => write!(f, "identifier {id} is not HTTP(S)"),
        }
    }
}

/// Emits `advisory` if there is one.
pub(crate) fn report(advisory: Option<Advisory>) {
    if let Some(advisory) = advisory {
        advisory.emit();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_converts() {
        let err: Error = ValidationError::NotHttp("ftp://x".into()).into();
        assert!(matches!(err, Error::Validation(ValidationError::NotHttp(_))));
        assert_eq!(err.to_string(), "identifier must start with http or https: ftp://x");
    }

    #[test]
    fn test_type_mismatch_names_both_sides() {
        let err = Error::TypeMismatch {
            child: "Choice",
            owner: "Annotation",
        };
        assert_eq!(err.to_string(), "Choice object cannot be added to Annotation");
    }

    #[test]
    fn test_advisory_display() {
        let advisory = Advisory::NonStandardTerm {
            field: "motivation",
            term: "painting".into(),
        };
        assert!(advisory.to_string().contains("painting"));
    }
}
