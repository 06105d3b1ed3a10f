use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::validate::check_uri;

/// A URI reference that passed [`check_uri`].
///
/// Used wherever a field holds a bare link: body/target references,
/// `rights`, `via`, `conformsTo`, `next`/`prev`, agent homepages.
///
/// # Examples
///
/// ```
/// use wadm_core::Iri;
///
/// let iri = Iri::parse("http://example.com/image1#xywh=100,100,300,300").unwrap();
/// assert_eq!(iri, *"http://example.com/image1#xywh=100,100,300,300");
/// assert!(Iri::parse("http://example.org/a b").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Iri(String);

impl Iri {
    /// Checks `value` and wraps it.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidUri`] on a reserved character.
    pub fn parse(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        check_uri(&value)?;
        Ok(Self(value))
    }

    /// Wraps an identifier that was already checked by the caller.
    pub(crate) fn trusted(value: String) -> Self {
        Self(value)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Iri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Iri {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for Iri {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Iri {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl TryFrom<&str> for Iri {
    type Error = ValidationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<Iri> for String {
    fn from(iri: Iri) -> Self {
        iri.0
    }
}

impl PartialEq<str> for Iri {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Iri {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let iri: Iri = "http://example.org/page1".parse().unwrap();
        assert_eq!(iri.to_string(), "http://example.org/page1");
        assert_eq!(iri, "http://example.org/page1");
    }

    #[test]
    fn test_serde_rejects_invalid() {
        let ok: Iri = serde_json::from_str("\"http://example.org/x\"").unwrap();
        assert_eq!(ok.as_str(), "http://example.org/x");
        assert!(serde_json::from_str::<Iri>("\"http://example.org/<x>\"").is_err());
    }
}
