//! Turns a node graph into a JSON document.
//!
//! The walk follows each node's [`Node::entries`] in order. Absent entries
//! are dropped. What happens to an obligation marker depends on the mode:
//!
//! | Mode | `Required` marker | `Recommended` marker |
//! |------|-------------------|----------------------|
//! | strict (default) | [`Error::MissingRequiredField`] | dropped |
//! | diagnostic | `{"Required": description}` | `{"Recommended": description}` |
//! | fast (session switch) | dropped | dropped |
//!
//! `@context` is always the first key of the document.

use serde_json::{Map, Value};
use tracing::debug;
use wadm_registry::Context;

use crate::error::{Error, Result};
use crate::node::{Entry, Node};
use crate::obligation::{Marker, Obligation};

/// Output switches for [`render_document`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderOptions {
    /// Render unmet obligations instead of failing on them.
    pub diagnostic: bool,
    /// Sort object keys, `@`-prefixed keys first.
    pub sort_keys: bool,
    /// Serialize without indentation.
    pub compact: bool,
    /// Overrides the session's `@context`.
    pub context: Option<Context>,
}

impl RenderOptions {
    pub fn diagnostic() -> Self {
        Self {
            diagnostic: true,
            ..Self::default()
        }
    }

    pub fn with_sort_keys(mut self, sort_keys: bool) -> Self {
        self.sort_keys = sort_keys;
        self
    }

    pub fn with_compact(mut self, compact: bool) -> Self {
        self.compact = compact;
        self
    }

    pub fn with_context(mut self, context: impl Into<Context>) -> Self {
        self.context = Some(context.into());
        self
    }
}

/// A rendered document with its unmet obligations counted.
#[derive(Debug, Clone, PartialEq)]
pub struct Inspection {
    pub document: Value,
    pub missing_required: usize,
    pub missing_recommended: usize,
}

impl Inspection {
    /// `true` when strict rendering would succeed.
    pub fn is_complete(&self) -> bool {
        self.missing_required == 0
    }
}

struct Walker {
    diagnostic: bool,
    fast: bool,
    missing_required: usize,
    missing_recommended: usize,
}

impl Walker {
    fn object(&mut self, node: &dyn Node, path: &str) -> Result<Map<String, Value>> {
        let mut map = Map::new();
        for (key, entry) in node.entries() {
            let child_path = format!("{path}.{key}");
            if let Some(value) = self.value(entry, &child_path)? {
                map.insert(key.to_string(), value);
            }
        }
        Ok(map)
    }

    fn value(&mut self, entry: Entry<'_>, path: &str) -> Result<Option<Value>> {
        let value = match entry {
            Entry::Absent => None,
            Entry::Marker(marker) => self.marker(marker, path)?,
            Entry::Text(text) => Some(Value::String(text.to_string())),
            Entry::Number(number) => Some(Value::Number(number)),
            Entry::Boolean(flag) => Some(Value::Bool(flag)),
            Entry::Node(node) => Some(Value::Object(self.object(node, path)?)),
            Entry::List(entries) => {
                let mut items = Vec::with_capacity(entries.len());
                for (index, entry) in entries.into_iter().enumerate() {
                    if let Some(value) = self.value(entry, &format!("{path}[{index}]"))? {
                        items.push(value);
                    }
                }
                Some(Value::Array(items))
            }
        };
        Ok(value)
    }

    fn marker(&mut self, marker: &Marker, path: &str) -> Result<Option<Value>> {
        if self.fast {
            return Ok(None);
        }
        match marker.level() {
            Obligation::Required => self.missing_required += 1,
            Obligation::Recommended => self.missing_recommended += 1,
        }
        if self.diagnostic {
            let mut map = Map::new();
            map.insert(
                marker.level().as_str().to_string(),
                Value::String(marker.description().to_string()),
            );
            return Ok(Some(Value::Object(map)));
        }
        if marker.is_required() {
            return Err(Error::MissingRequiredField {
                path: path.to_string(),
                description: marker.description().to_string(),
            });
        }
        Ok(None)
    }
}

/// Renders `node` as a complete document, `@context` first.
///
/// # Errors
///
/// In strict mode, returns [`Error::MissingRequiredField`] with the dotted
/// path of the first unmet `Required` field (for example
/// `Annotation.target`).
pub fn render_document(node: &dyn Node, options: &RenderOptions) -> Result<Inspection> {
    let session = node.session();
    let mut walker = Walker {
        diagnostic: options.diagnostic,
        fast: session.fast_mode,
        missing_required: 0,
        missing_recommended: 0,
    };

    let context = options.context.as_ref().unwrap_or(&session.context);
    let mut document = Map::new();
    document.insert("@context".to_string(), serde_json::to_value(context)?);
    document.extend(walker.object(node, node.kind())?);

    let mut document = Value::Object(document);
    if options.sort_keys {
        document = sort_keys(document);
    }

    debug!(
        kind = node.kind(),
        diagnostic = options.diagnostic,
        missing_required = walker.missing_required,
        missing_recommended = walker.missing_recommended,
        "Rendered document"
    );
    Ok(Inspection {
        document,
        missing_required: walker.missing_required,
        missing_recommended: walker.missing_recommended,
    })
}

/// Recursively sorts object keys, keeping `@` keywords in front.
fn sort_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|(a, _), (b, _)| {
                (!a.starts_with('@'), a.as_str()).cmp(&(!b.starts_with('@'), b.as_str()))
            });
            Value::Object(entries.into_iter().map(|(k, v)| (k, sort_keys(v))).collect())
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sort_keys).collect()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Field;
    use serde_json::json;

    #[derive(Debug)]
    struct Card {
        label: Field<String>,
        note: Field<String>,
    }

    impl Node for Card {
        fn kind(&self) -> &'static str {
            "Card"
        }

        fn entries(&self) -> Vec<(&str, Entry<'_>)> {
            vec![
                ("type", Entry::Text("Card")),
                ("label", self.label.entry()),
                ("note", self.note.entry()),
            ]
        }
    }

    fn card() -> Card {
        Card {
            label: Field::required("A card needs a label."),
            note: Field::recommended("A card should have a note."),
        }
    }

    #[test]
    fn test_strict_mode_names_missing_field() {
        let err = render_document(&card(), &RenderOptions::default()).unwrap_err();
        match err {
            Error::MissingRequiredField { path, description } => {
                assert_eq!(path, "Card.label");
                assert_eq!(description, "A card needs a label.");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_recommended_markers_are_dropped() {
        let mut node = card();
        node.label.set("x".into());
        let rendered = render_document(&node, &RenderOptions::default()).unwrap();
        assert_eq!(rendered.missing_recommended, 1);
        assert_eq!(
            rendered.document,
            json!({"@context": "http://www.w3.org/ns/anno.jsonld", "type": "Card", "label": "x"})
        );
    }

    #[test]
    fn test_diagnostic_mode_renders_markers() {
        let rendered = render_document(&card(), &RenderOptions::diagnostic()).unwrap();
        assert_eq!(rendered.missing_required, 1);
        assert!(!rendered.is_complete());
        assert_eq!(rendered.document["label"], json!({"Required": "A card needs a label."}));
        assert_eq!(rendered.document["note"], json!({"Recommended": "A card should have a note."}));
    }

    #[test]
    fn test_context_comes_first() {
        let mut node = card();
        node.label.set("x".into());
        let options = RenderOptions::default().with_context(vec![
            "http://www.w3.org/ns/anno.jsonld".to_string(),
            "http://iiif.io/api/presentation/3/context.json".to_string(),
        ]);
        let rendered = render_document(&node, &options).unwrap();
        let keys: Vec<&String> = rendered.document.as_object().unwrap().keys().collect();
        assert_eq!(keys, ["@context", "type", "label"]);
        assert!(rendered.document["@context"].is_array());
    }

    #[test]
    fn test_sort_keys_keeps_keywords_first() {
        let sorted = sort_keys(json!({"type": "x", "@context": "c", "id": "i", "body": {"z": 1, "a": 2}}));
        let keys: Vec<&String> = sorted.as_object().unwrap().keys().collect();
        assert_eq!(keys, ["@context", "body", "id", "type"]);
        let inner: Vec<&String> = sorted["body"].as_object().unwrap().keys().collect();
        assert_eq!(inner, ["a", "z"]);
    }
}
