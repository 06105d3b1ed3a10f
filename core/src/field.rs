//! The field cardinality engine.
//!
//! Every attribute of a node is a [`Field`]. A field is in exactly one of
//! these states:
//!
//! - **unset**: absent from output;
//! - **pending**: unset, but holding an obligation [`Marker`];
//! - **one**: a single value, serialized as a scalar;
//! - **many**: an ordered list of values, serialized as an array.
//!
//! [`Field::push`] implements append-or-upgrade: the first value becomes a
//! scalar and the second turns the field into a two-element list. Order is
//! preserved and nothing is deduplicated. [`Field::append`] always produces
//! a list, even for a single value.
//!
//! # Examples
//!
//! ```
//! use wadm_core::{Field, FieldState};
//!
//! let mut motivation: Field<String> = Field::recommended("Should have a motivation.");
//! assert!(motivation.is_unset());
//!
//! motivation.push("commenting".to_string());
//! assert!(matches!(motivation.state(), FieldState::One(_)));
//!
//! motivation.push("tagging".to_string());
//! motivation.push("tagging".to_string());
//! assert_eq!(motivation.values(), ["commenting", "tagging", "tagging"]);
//! ```

use std::borrow::Cow;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use wadm_registry::Config;

use crate::error::{Error, Result};
use crate::node::{Entry, Render, Slot};
use crate::obligation::Marker;

/// A node attribute with absent/scalar/list cardinality.
#[derive(Debug, Clone, PartialEq)]
pub struct Field<T> {
    values: Vec<T>,
    listed: bool,
    marker: Option<Marker>,
}

/// Borrowed view of a [`Field`]'s current state.
#[derive(Debug, PartialEq)]
pub enum FieldState<'a, T> {
    Unset,
    Pending(&'a Marker),
    One(&'a T),
    Many(&'a [T]),
}

impl<T> Default for Field<T> {
    fn default() -> Self {
        Self {
            values: Vec::new(),
            listed: false,
            marker: None,
        }
    }
}

impl<T> Field<T> {
    /// An unset optional field.
    pub fn new() -> Self {
        Self::default()
    }

    /// An unset field holding a `Required` marker.
    pub fn required(description: impl Into<Cow<'static, str>>) -> Self {
        Self::pending(Marker::required(description))
    }

    /// An unset field holding a `Recommended` marker.
    pub fn recommended(description: impl Into<Cow<'static, str>>) -> Self {
        Self::pending(Marker::recommended(description))
    }

    /// An unset field holding `marker`.
    pub fn pending(marker: Marker) -> Self {
        Self {
            marker: Some(marker),
            ..Self::default()
        }
    }

    /// Returns the current state.
    pub fn state(&self) -> FieldState<'_, T> {
        match (self.values.as_slice(), self.listed) {
            ([], _) => match &self.marker {
                Some(marker) => FieldState::Pending(marker),
                None => FieldState::Unset,
            },
            ([one], false) => FieldState::One(one),
            (many, _) => FieldState::Many(many),
        }
    }

    /// Returns `true` for unset fields, with or without a marker.
    ///
    /// Populated fields are never unset, whatever the value (empty strings
    /// and zeros included).
    pub fn is_unset(&self) -> bool {
        self.values.is_empty()
    }

    /// The obligation marker, while the field is unset.
    pub fn marker(&self) -> Option<&Marker> {
        if self.values.is_empty() {
            self.marker.as_ref()
        } else {
            None
        }
    }

    /// Replaces the obligation attached to the field.
    ///
    /// Has no visible effect until the field is cleared again if it already
    /// holds values.
    pub fn mark(&mut self, marker: Marker) {
        self.marker = Some(marker);
    }

    /// Downgrades a pending `Required` marker to `Recommended`.
    pub fn relax(&mut self, description: impl Into<Cow<'static, str>>) {
        if self.is_unset() && self.marker.as_ref().is_some_and(Marker::is_required) {
            self.marker = Some(Marker::recommended(description));
        }
    }

    /// Replaces the contents with a single scalar value.
    pub fn set(&mut self, value: T) -> &mut T {
        self.values.clear();
        self.listed = false;
        self.insert(value)
    }

    /// Append-or-upgrade: scalar when empty, list from the second value on.
    pub fn push(&mut self, value: T) -> &mut T {
        self.insert(value)
    }

    /// Appends to a list, creating the list if the field is empty.
    pub fn append(&mut self, value: T) -> &mut T {
        self.listed = true;
        self.insert(value)
    }

    /// Drops all values, returning the field to its unset or pending state.
    pub fn clear(&mut self) {
        self.values.clear();
        self.listed = false;
    }

    /// Keeps the field serialized as a list even with a single value.
    pub(crate) fn force_list(&mut self) {
        if !self.values.is_empty() {
            self.listed = true;
        }
    }

    pub fn values(&self) -> &[T] {
        &self.values
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.values.iter_mut()
    }

    pub fn first(&self) -> Option<&T> {
        self.values.first()
    }

    pub fn last_mut(&mut self) -> Option<&mut T> {
        self.values.last_mut()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn insert(&mut self, value: T) -> &mut T {
        self.values.push(value);
        let last = self.values.len() - 1;
        &mut self.values[last]
    }
}

impl<T: Render> Field<T> {
    /// The serializer's view of the field.
    pub fn entry(&self) -> Entry<'_> {
        match self.state() {
            FieldState::Unset => Entry::Absent,
            FieldState::Pending(marker) => Entry::Marker(marker),
            FieldState::One(value) => value.entry(),
            FieldState::Many(values) => Entry::List(values.iter().map(Render::entry).collect()),
        }
    }
}

impl<T: Slot> Field<T> {
    /// Rebinds every held child node to `config`.
    pub(crate) fn rebind(&mut self, config: &Arc<Config>) {
        for value in &mut self.values {
            value.rebind(config);
        }
    }
}

/// Values whose runtime kind must match across a field.
pub trait Compatible {
    /// Short name of the value's kind, used in error messages.
    fn kind_name(&self) -> &'static str;
}

impl<T: Compatible> Field<T> {
    /// Like [`Field::push`], but rejects values whose kind differs from the
    /// values already held.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IncompatibleValue`] naming `field` and both kinds.
    pub fn try_push(&mut self, field: &str, value: T) -> Result<&mut T> {
        if let Some(existing) = self.values.first() {
            if existing.kind_name() != value.kind_name() {
                return Err(Error::IncompatibleValue {
                    field: field.to_string(),
                    expected: existing.kind_name(),
                    found: value.kind_name(),
                });
            }
        }
        Ok(self.push(value))
    }
}

/// A loosely typed literal, for properties whose type is chosen by the
/// caller (audience properties, image rotation).
///
/// # Examples
///
/// ```
/// use wadm_core::Scalar;
///
/// assert_eq!(Scalar::from("teacher"), Scalar::Text("teacher".into()));
/// assert_eq!(Scalar::from(90), Scalar::Integer(90));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Boolean(bool),
    Integer(i64),
    Number(f64),
    Text(String),
}

impl Compatible for Scalar {
    fn kind_name(&self) -> &'static str {
        match self {
            Scalar::Boolean(_) => "boolean",
            Scalar::Integer(_) => "integer",
            Scalar::Number(_) => "number",
            Scalar::Text(_) => "text",
        }
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::Text(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Scalar::Text(value)
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar::Integer(value)
    }
}

impl From<i32> for Scalar {
    fn from(value: i32) -> Self {
        Scalar::Integer(value.into())
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Scalar::Number(value)
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Scalar::Boolean(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::obligation::Obligation;

    #[test]
    fn test_push_upgrades_scalar_to_list() {
        let mut field: Field<String> = Field::new();
        field.push("v1".into());
        assert_eq!(field.state(), FieldState::One(&"v1".to_string()));

        field.push("v2".into());
        assert!(matches!(field.state(), FieldState::Many(values) if values == ["v1", "v2"]));

        field.push("v3".into());
        assert_eq!(field.values(), ["v1", "v2", "v3"]);
    }

    #[test]
    fn test_push_keeps_duplicates() {
        let mut field: Field<u64> = Field::new();
        field.push(1);
        field.push(1);
        assert_eq!(field.values(), [1, 1]);
    }

    #[test]
    fn test_append_always_lists() {
        let mut field: Field<u64> = Field::new();
        field.append(7);
        assert!(matches!(field.state(), FieldState::Many([7])));
    }

    #[test]
    fn test_set_replaces_list_with_scalar() {
        let mut field: Field<u64> = Field::new();
        field.append(1);
        field.push(2);
        field.set(3);
        assert_eq!(field.state(), FieldState::One(&3));
    }

    #[test]
    fn test_unset_detection() {
        let required: Field<String> = Field::required("needed");
        let recommended: Field<String> = Field::recommended("wanted");
        let optional: Field<String> = Field::new();
        assert!(required.is_unset());
        assert!(recommended.is_unset());
        assert!(optional.is_unset());

        let mut empty_text: Field<String> = Field::required("needed");
        empty_text.set(String::new());
        assert!(!empty_text.is_unset());

        let mut zero: Field<u64> = Field::new();
        zero.set(0);
        assert!(!zero.is_unset());
    }

    #[test]
    fn test_clear_restores_marker() {
        let mut field: Field<String> = Field::required("needed");
        field.set("x".into());
        assert!(field.marker().is_none());
        field.clear();
        assert_eq!(field.marker().map(Marker::level), Some(Obligation::Required));
    }

    #[test]
    fn test_relax_only_downgrades_pending_required() {
        let mut field: Field<String> = Field::required("needed");
        field.relax("now optional-ish");
        assert_eq!(field.marker().map(Marker::level), Some(Obligation::Recommended));

        let mut populated: Field<String> = Field::required("needed");
        populated.set("x".into());
        populated.relax("ignored");
        populated.clear();
        assert_eq!(populated.marker().map(Marker::level), Some(Obligation::Required));
    }

    #[test]
    fn test_try_push_rejects_mixed_kinds() {
        let mut field: Field<Scalar> = Field::new();
        field.try_push("schema:age", Scalar::from(12)).unwrap();
        field.try_push("schema:age", Scalar::from(13)).unwrap();
        let err = field.try_push("schema:age", Scalar::from("x")).unwrap_err();
        match err {
            Error::IncompatibleValue { field, expected, found } => {
                assert_eq!(field, "schema:age");
                assert_eq!(expected, "integer");
                assert_eq!(found, "text");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(field.len(), 2);
    }
}
