//! Obligation markers for unmet Required/Recommended fields.
//!
//! A field that the data model says MUST or SHOULD be present starts out
//! holding a [`Marker`] instead of a value. The marker is invisible in strict
//! output (or an error, for `Required`), and rendered as
//! `{"Required": "<description>"}` in diagnostic output so unmet obligations
//! can be counted.
//!
//! # Examples
//!
//! ```
//! use wadm_core::{Marker, Obligation};
//!
//! let a = Marker::required("A target is required.");
//! let b = Marker::required("Something else entirely.");
//! assert_eq!(a, b);
//! assert_ne!(a, Marker::recommended("A target is required."));
//! assert_eq!(a.level(), Obligation::Required);
//! ```

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// How strongly the data model asks for a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Obligation {
    /// MUST be present; strict serialization fails while unmet.
    Required,
    /// SHOULD be present; silently omitted while unmet.
    Recommended,
}

impl Obligation {
    /// The key used for this level in diagnostic output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Obligation::Required => "Required",
            Obligation::Recommended => "Recommended",
        }
    }
}

/// Placeholder recording an unmet obligation.
///
/// Two markers are equal when their levels are equal; the description is
/// informational only.
#[derive(Debug, Clone)]
pub struct Marker {
    level: Obligation,
    description: Cow<'static, str>,
}

impl Marker {
    /// A `Required` marker.
    pub fn required(description: impl Into<Cow<'static, str>>) -> Self {
        Self {
            level: Obligation::Required,
            description: description.into(),
        }
    }

    /// A `Recommended` marker.
    pub fn recommended(description: impl Into<Cow<'static, str>>) -> Self {
        Self {
            level: Obligation::Recommended,
            description: description.into(),
        }
    }

    pub fn level(&self) -> Obligation {
        self.level
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn is_required(&self) -> bool {
        self.level == Obligation::Required
    }
}

impl PartialEq for Marker {
    fn eq(&self, other: &Self) -> bool {
        self.level == other.level
    }
}

impl Eq for Marker {}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} attribute: {}", self.level.as_str(), self.description)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markers_compare_by_level_only() {
        assert_eq!(Marker::recommended("a"), Marker::recommended("b"));
        assert_ne!(Marker::required("a"), Marker::recommended("a"));
    }

    #[test]
    fn test_marker_display() {
        let marker = Marker::required("An id is required.");
        assert_eq!(marker.to_string(), "Required attribute: An id is required.");
        assert!(marker.is_required());
        assert_eq!(marker.description(), "An id is required.");
    }
}
