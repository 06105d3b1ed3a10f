//! The node abstraction shared by every resource in the catalog.
//!
//! A [`Node`] describes itself to the serializer as an explicit, ordered
//! list of `(key, Entry)` pairs. Nothing is discovered by reflection: the
//! order of [`Node::entries`] is the order of keys in the output.
//!
//! Polymorphic fields hold a closed *slot* enum (for example
//! [`Resource`](crate::Resource) for bodies and targets). Anything that can
//! be placed in a slot implements [`Member`] for it, so one `add_*` method
//! per field accepts a bare URI, a concrete node, or a ready-made slot value,
//! and hands back a mutable reference to the attached child for further
//! configuration.

use std::fmt::Debug;
use std::sync::Arc;

use wadm_registry::Config;

use crate::error::{Error, Result};
use crate::field::{Field, Scalar};
use crate::iri::Iri;
use crate::obligation::Marker;
use crate::validate::TextDirection;

/// The serializer's view of one field value.
#[derive(Debug)]
pub enum Entry<'a> {
    /// Omitted from every output.
    Absent,
    /// An unmet obligation.
    Marker(&'a Marker),
    Text(&'a str),
    Number(serde_json::Number),
    Boolean(bool),
    /// A nested node, rendered as an object.
    Node(&'a dyn Node),
    /// An ordered array of entries.
    List(Vec<Entry<'a>>),
}

/// A resource that renders as a JSON object.
pub trait Node: Debug {
    /// Class name used in error messages and paths (`Annotation`,
    /// `TextQuoteSelector`, ...).
    fn kind(&self) -> &'static str;

    /// The node's keys in output order.
    fn entries(&self) -> Vec<(&str, Entry<'_>)>;

    /// The session this node was created in, if it tracks one.
    fn config(&self) -> Option<&Arc<Config>> {
        None
    }

    /// Moves the node and its children into another session.
    fn rebind(&mut self, _config: &Arc<Config>) {}

    /// The node's session, or the process default for nodes without one.
    fn session(&self) -> Arc<Config> {
        self.config().cloned().unwrap_or_else(crate::config::shared)
    }
}

/// Values that can appear as a field entry.
pub trait Render {
    fn entry(&self) -> Entry<'_>;
}

impl Render for String {
    fn entry(&self) -> Entry<'_> {
        Entry::Text(self)
    }
}

impl Render for Iri {
    fn entry(&self) -> Entry<'_> {
        Entry::Text(self.as_str())
    }
}

impl Render for u64 {
    fn entry(&self) -> Entry<'_> {
        Entry::Number((*self).into())
    }
}

impl Render for i64 {
    fn entry(&self) -> Entry<'_> {
        Entry::Number((*self).into())
    }
}

impl Render for f64 {
    fn entry(&self) -> Entry<'_> {
        // NaN and infinities have no JSON form.
        serde_json::Number::from_f64(*self).map_or(Entry::Absent, Entry::Number)
    }
}

impl Render for bool {
    fn entry(&self) -> Entry<'_> {
        Entry::Boolean(*self)
    }
}

impl Render for TextDirection {
    fn entry(&self) -> Entry<'_> {
        Entry::Text(self.as_str())
    }
}

impl Render for Scalar {
    fn entry(&self) -> Entry<'_> {
        match self {
            Scalar::Boolean(value) => value.entry(),
            Scalar::Integer(value) => value.entry(),
            Scalar::Number(value) => value.entry(),
            Scalar::Text(value) => value.entry(),
        }
    }
}

/// A closed set of values a polymorphic field may hold.
pub trait Slot: Render + Debug {
    /// Kind of the held value, for [`Error::TypeMismatch`].
    fn kind(&self) -> &'static str;

    fn rebind(&mut self, config: &Arc<Config>);
}

/// A value that can be placed into slot `S`.
pub trait Member<S> {
    /// What the attaching method returns a reference to.
    type Handle;

    /// Converts into the slot, checking URIs and adopting `config`.
    fn into_slot(self, config: &Arc<Config>) -> Result<S>;

    /// Projects the attached slot back to the handle.
    fn handle(slot: &mut S) -> Option<&mut Self::Handle>;
}

/// How a child is written into its field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Attach {
    /// Replace the field with a scalar.
    Set,
    /// Append-or-upgrade.
    Push,
    /// Always store a list.
    Append,
}

/// Converts, checks and writes `member` into `field`.
///
/// `accepts` is consulted before anything is written, so a rejected child
/// leaves the field untouched.
pub(crate) fn attach<'f, S: Slot, M: Member<S>>(
    field: &'f mut Field<S>,
    member: M,
    config: &Arc<Config>,
    mode: Attach,
    owner: &'static str,
    accepts: fn(&S) -> bool,
) -> Result<&'f mut M::Handle> {
    let slot = member.into_slot(config)?;
    let child = slot.kind();
    if !accepts(&slot) {
        return Err(Error::TypeMismatch { child, owner });
    }
    let slot = match mode {
        Attach::Set => field.set(slot),
        Attach::Push => field.push(slot),
        Attach::Append => field.append(slot),
    };
    M::handle(slot).ok_or(Error::TypeMismatch { child, owner })
}

/// Accepts every member of a slot.
pub(crate) fn any<S>(_: &S) -> bool {
    true
}

/// Declares a slot enum: an `Iri` variant plus one boxed variant per node
/// type, with `Render`, `Slot` and `Member` implementations.
macro_rules! slot_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident($node:ty)),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        pub enum $name {
            Iri($crate::Iri),
            $($variant(Box<$node>)),+
        }

        impl $crate::node::Render for $name {
            fn entry(&self) -> $crate::node::Entry<'_> {
                match self {
                    $name::Iri(iri) => $crate::node::Render::entry(iri),
                    $($name::$variant(node) => $crate::node::Entry::Node(&**node)),+
                }
            }
        }

        impl $crate::node::Slot for $name {
            fn kind(&self) -> &'static str {
                match self {
                    $name::Iri(_) => "Iri",
                    $($name::$variant(node) => $crate::node::Node::kind(&**node)),+
                }
            }

            fn rebind(&mut self, config: &::std::sync::Arc<::wadm_registry::Config>) {
                match self {
                    $name::Iri(_) => {}
                    $($name::$variant(node) => $crate::node::Node::rebind(&mut **node, config)),+
                }
            }
        }

        impl $crate::node::Member<$name> for $name {
            type Handle = $name;

            fn into_slot(
                mut self,
                config: &::std::sync::Arc<::wadm_registry::Config>,
            ) -> $crate::Result<$name> {
                $crate::node::Slot::rebind(&mut self, config);
                Ok(self)
            }

            fn handle(slot: &mut $name) -> Option<&mut $name> {
                Some(slot)
            }
        }

        $crate::node::iri_member!($name, &str);
        $crate::node::iri_member!($name, String);

        impl $crate::node::Member<$name> for $crate::Iri {
            type Handle = $crate::Iri;

            fn into_slot(
                self,
                _config: &::std::sync::Arc<::wadm_registry::Config>,
            ) -> $crate::Result<$name> {
                Ok($name::Iri(self))
            }

            fn handle(slot: &mut $name) -> Option<&mut $crate::Iri> {
                match slot {
                    $name::Iri(iri) => Some(iri),
                    #[allow(unreachable_patterns)]
                    _ => None,
                }
            }
        }

        $(
            impl $crate::node::Member<$name> for $node {
                type Handle = $node;

                fn into_slot(
                    mut self,
                    config: &::std::sync::Arc<::wadm_registry::Config>,
                ) -> $crate::Result<$name> {
                    $crate::node::Node::rebind(&mut self, config);
                    Ok($name::$variant(Box::new(self)))
                }

                fn handle(slot: &mut $name) -> Option<&mut $node> {
                    match slot {
                        $name::$variant(node) => Some(&mut **node),
                        #[allow(unreachable_patterns)]
                        _ => None,
                    }
                }
            }
        )+
    };
}

/// Lets a string be placed into the `Iri` variant of a slot.
macro_rules! iri_member {
    ($name:ident, $source:ty) => {
        impl $crate::node::Member<$name> for $source {
            type Handle = $crate::Iri;

            fn into_slot(
                self,
                _config: &::std::sync::Arc<::wadm_registry::Config>,
            ) -> $crate::Result<$name> {
                Ok($name::Iri($crate::Iri::parse(self)?))
            }

            fn handle(slot: &mut $name) -> Option<&mut $crate::Iri> {
                match slot {
                    $name::Iri(iri) => Some(iri),
                    #[allow(unreachable_patterns)]
                    _ => None,
                }
            }
        }
    };
}

/// Implements [`Render`] for node types by nesting them as objects.
macro_rules! render_node {
    ($($node:ty),+ $(,)?) => {
        $(
            impl $crate::node::Render for $node {
                fn entry(&self) -> $crate::node::Entry<'_> {
                    $crate::node::Entry::Node(self)
                }
            }
        )+
    };
}

pub(crate) use iri_member;
pub(crate) use render_node;
pub(crate) use slot_enum;

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Leaf {
        value: Field<String>,
    }

    impl Node for Leaf {
        fn kind(&self) -> &'static str {
            "Leaf"
        }

        fn entries(&self) -> Vec<(&str, Entry<'_>)> {
            vec![("type", Entry::Text("Leaf")), ("value", self.value.entry())]
        }
    }

    #[test]
    fn test_entries_follow_field_state() {
        let mut leaf = Leaf {
            value: Field::required("A leaf needs a value."),
        };
        assert!(matches!(leaf.entries()[1].1, Entry::Marker(_)));
        leaf.value.set("x".into());
        assert!(matches!(leaf.entries()[1].1, Entry::Text("x")));
    }

    #[test]
    fn test_non_finite_numbers_are_absent() {
        assert!(matches!(f64::NAN.entry(), Entry::Absent));
        assert!(matches!(Scalar::from(1.5).entry(), Entry::Number(_)));
    }

    #[test]
    fn test_session_falls_back_to_shared() {
        let leaf = Leaf { value: Field::new() };
        assert!(leaf.config().is_none());
        assert_eq!(leaf.session().context, crate::config::shared().context);
    }
}
