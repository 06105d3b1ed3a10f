//! Reads annotation documents back into nodes.
//!
//! Documents are rebuilt by replaying the construction API, so every value
//! passes through the same validators it would when built by hand. Arrays
//! holding a single value are kept as arrays on output.
//!
//! Embedded objects without a `type` are read as a `SpecificResource` (with
//! its `type` omitted again on output) when they carry one of the keys only
//! a specific resource has, and as a generic resource otherwise.
//!
//! # Examples
//!
//! ```
//! use serde_json::json;
//! use wadm_core::rehydrate;
//!
//! let document = json!({
//!     "@context": "http://www.w3.org/ns/anno.jsonld",
//!     "id": "http://example.org/anno1",
//!     "type": "Annotation",
//!     "body": "http://example.org/post1",
//!     "target": "http://example.com/page1"
//! });
//!
//! let rehydrated = rehydrate::from_json(&document).unwrap();
//! assert_eq!(rehydrated.to_json().unwrap(), document);
//! ```

use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::debug;
use wadm_registry::{Config, Context};

use crate::agent::{Agent, AgentRef};
use crate::annotation::{Annotation, Audience, AudienceRef, CssStylesheet, StylesheetRef};
use crate::collection::{AnnotationCollection, AnnotationPage, CollectionLink, PageLink};
use crate::config;
use crate::error::{Error, Result};
use crate::field::Scalar;
use crate::iri::Iri;
use crate::node::{Entry, Node};
use crate::render::{RenderOptions, render_document};
use crate::resource::{
    Choice, ExternalResource, Resource, SetKind, SpecificResource, TargetSet, TextualBody,
};
use crate::selector::{
    CssSelector, DataPositionSelector, FragmentSelector, ImageApiSelector, PointSelector,
    RangeSelector, Refinable, Selector, SvgSelector, TextPositionSelector, TextQuoteSelector,
    XPathSelector,
};
use crate::state::{HttpRequestState, Refinement, State, StateReference, TimeState};
use crate::traits::{Anchored, Formatted, Identified, Licensed, Lifecycle, Localized, Purposeful};

/// Keys that mark an untyped object as a specific resource.
const SPECIFIC_KEYS: [&str; 7] = [
    "source",
    "selector",
    "state",
    "styleClass",
    "renderedVia",
    "scope",
    "purpose",
];

/// The top-level node of a rehydrated document.
#[derive(Debug, Clone)]
pub enum Root {
    Annotation(Annotation),
    Page(AnnotationPage),
    Collection(AnnotationCollection),
}

impl Root {
    fn node(&self) -> &dyn Node {
        match self {
            Root::Annotation(node) => node,
            Root::Page(node) => node,
            Root::Collection(node) => node,
        }
    }

    fn node_mut(&mut self) -> &mut dyn Node {
        match self {
            Root::Annotation(node) => node,
            Root::Page(node) => node,
            Root::Collection(node) => node,
        }
    }

    pub fn as_annotation(&self) -> Option<&Annotation> {
        match self {
            Root::Annotation(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_page(&self) -> Option<&AnnotationPage> {
        match self {
            Root::Page(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_collection(&self) -> Option<&AnnotationCollection> {
        match self {
            Root::Collection(node) => Some(node),
            _ => None,
        }
    }
}

impl Node for Root {
    fn kind(&self) -> &'static str {
        self.node().kind()
    }

    fn entries(&self) -> Vec<(&str, Entry<'_>)> {
        self.node().entries()
    }

    fn config(&self) -> Option<&Arc<Config>> {
        self.node().config()
    }

    fn rebind(&mut self, config: &Arc<Config>) {
        self.node_mut().rebind(config);
    }
}

/// A rebuilt document: its root node and the `@context` it declared.
#[derive(Debug, Clone)]
pub struct Rehydrated {
    pub context: Option<Context>,
    pub root: Root,
}

impl Rehydrated {
    /// Renders the document again, keeping the `@context` it was read with.
    pub fn to_json(&self) -> Result<Value> {
        self.to_json_with(&RenderOptions::default())
    }

    /// Renders with `options`; an explicit `options.context` wins over the
    /// document's own.
    pub fn to_json_with(&self, options: &RenderOptions) -> Result<Value> {
        let mut options = options.clone();
        if options.context.is_none() {
            options.context = self.context.clone();
        }
        Ok(render_document(&self.root, &options)?.document)
    }
}

/// Rebuilds `document` in the process-wide default session.
///
/// # Errors
///
/// Returns [`Error::Rehydrate`] for structurally malformed documents or
/// unknown `type` tags, and any validation or type error raised while
/// replaying the document.
pub fn from_json(document: &Value) -> Result<Rehydrated> {
    from_json_with(document, config::shared())
}

/// Rebuilds `document` in the session described by `config`.
pub fn from_json_with(document: &Value, config: Arc<Config>) -> Result<Rehydrated> {
    let map = object(document, "document")?;
    let context = match map.get("@context") {
        Some(context) => Some(serde_json::from_value(context.clone())?),
        None => None,
    };
    let reader = Reader { config };
    let root = match map.get("type").and_then(Value::as_str) {
        Some("Annotation") => Root::Annotation(reader.annotation(map)?),
        Some("AnnotationPage") => Root::Page(reader.page(map)?),
        Some("AnnotationCollection") => Root::Collection(reader.collection(map)?),
        Some(other) => return Err(malformed(format!("unsupported document type {other:?}"))),
        None => return Err(malformed("document has no type")),
    };
    debug!(kind = root.kind(), "Rehydrated document");
    Ok(Rehydrated { context, root })
}

/// Parses and rebuilds a JSON document held in a string.
pub fn from_str(text: &str) -> Result<Rehydrated> {
    let document: Value = serde_json::from_str(text)?;
    from_json(&document)
}

/// Reads and rebuilds a JSON document from `path`.
pub fn read_file(path: impl AsRef<Path>) -> Result<Rehydrated> {
    let file = std::fs::File::open(path)?;
    let document: Value = serde_json::from_reader(BufReader::new(file))?;
    from_json(&document)
}

fn malformed(message: impl Into<String>) -> Error {
    Error::Rehydrate(message.into())
}

fn object<'v>(value: &'v Value, what: &str) -> Result<&'v Map<String, Value>> {
    value
        .as_object()
        .ok_or_else(|| malformed(format!("{what} must be an object")))
}

fn text<'v>(value: &'v Value, key: &str) -> Result<&'v str> {
    value
        .as_str()
        .ok_or_else(|| malformed(format!("{key} must be a string")))
}

fn uint(value: &Value, key: &str) -> Result<u64> {
    value
        .as_u64()
        .ok_or_else(|| malformed(format!("{key} must be a non-negative integer")))
}

fn scalar(value: &Value, key: &str) -> Result<Scalar> {
    match value {
        Value::Bool(flag) => Ok(Scalar::Boolean(*flag)),
        Value::String(text) => Ok(Scalar::Text(text.clone())),
        Value::Number(number) => number
            .as_i64()
            .map(Scalar::Integer)
            .or_else(|| number.as_f64().map(Scalar::Number))
            .ok_or_else(|| malformed(format!("{key} is out of range"))),
        _ => Err(malformed(format!("{key} must be a string, number or boolean"))),
    }
}

/// Feeds each value of a possibly-array `value` to `add`. Returns `true`
/// when `value` was an array.
fn replay(value: &Value, mut add: impl FnMut(&Value) -> Result<()>) -> Result<bool> {
    match value {
        Value::Array(items) => {
            for item in items {
                add(item)?;
            }
            Ok(true)
        }
        single => {
            add(single)?;
            Ok(false)
        }
    }
}

/// Visits every key but `@context` and `type`, logging the ones `visit`
/// does not handle.
fn each_key(
    map: &Map<String, Value>,
    kind: &str,
    mut visit: impl FnMut(&str, &Value) -> Result<bool>,
) -> Result<()> {
    for (key, value) in map {
        if key == "@context" || key == "type" {
            continue;
        }
        if !visit(key, value)? {
            debug!(key = %key, kind = kind, "Skipping unknown key");
        }
    }
    Ok(())
}

fn expect_kind(map: &Map<String, Value>, expected: &str) -> Result<()> {
    match map.get("type").and_then(Value::as_str) {
        Some(kind) if kind != expected => {
            Err(malformed(format!("expected {expected}, found {kind}")))
        }
        _ => Ok(()),
    }
}

fn state_kind(value: &Value) -> Option<&'static str> {
    match value.get("type").and_then(Value::as_str) {
        Some("TimeState") => Some("TimeState"),
        Some("HttpRequestState") => Some("HttpRequestState"),
        _ => None,
    }
}

fn licensed<N: Licensed>(node: &mut N, key: &str, value: &Value) -> Result<bool> {
    match key {
        "rights" => {
            if replay(value, |item| node.add_rights(text(item, "rights")?))? {
                node.rights_mut().rights.force_list();
            }
        }
        "canonical" => node.set_canonical(text(value, key)?),
        "via" => {
            if replay(value, |item| node.add_via(text(item, "via")?))? {
                node.rights_mut().via.force_list();
            }
        }
        _ => return Ok(false),
    }
    Ok(true)
}

fn localized<N: Localized>(node: &mut N, key: &str, value: &Value) -> Result<bool> {
    match key {
        "language" => {
            if replay(value, |item| node.add_language(text(item, "language")?))? {
                node.locale_mut().language.force_list();
            }
        }
        "processingLanguage" => node.set_processing_language(text(value, key)?)?,
        "textDirection" => node.set_text_direction(text(value, key)?)?,
        _ => return Ok(false),
    }
    Ok(true)
}

fn formatted<N: Formatted>(node: &mut N, key: &str, value: &Value) -> Result<bool> {
    if key != "format" {
        return Ok(false);
    }
    if replay(value, |item| node.add_format(text(item, "format")?))? {
        node.media_format_mut().format.force_list();
    }
    Ok(true)
}

fn purposeful<N: Purposeful>(node: &mut N, key: &str, value: &Value) -> Result<bool> {
    if key != "purpose" {
        return Ok(false);
    }
    let listed = replay(value, |item| {
        node.add_purpose(text(item, "purpose")?);
        Ok(())
    })?;
    if listed {
        node.purpose_mut().purpose.force_list();
    }
    Ok(true)
}

struct Reader {
    config: Arc<Config>,
}

impl Reader {
    fn session(&self) -> Arc<Config> {
        Arc::clone(&self.config)
    }

    fn lifecycle<N: Lifecycle>(&self, node: &mut N, key: &str, value: &Value) -> Result<bool> {
        match key {
            "creator" => {
                let listed = replay(value, |item| {
                    node.add_creator(self.agent(item)?)?;
                    Ok(())
                })?;
                if listed {
                    node.provenance_mut().creator.force_list();
                }
            }
            "generator" => {
                let listed = replay(value, |item| {
                    node.add_generator(self.agent(item)?)?;
                    Ok(())
                })?;
                if listed {
                    node.provenance_mut().generator.force_list();
                }
            }
            "created" => node.set_created(text(value, key)?)?,
            "modified" => node.set_modified(text(value, key)?)?,
            "generated" => node.set_generated(text(value, key)?)?,
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn anchored<N: Anchored>(&self, node: &mut N, key: &str, value: &Value) -> Result<bool> {
        match key {
            "source" => {
                node.set_source(self.resource(value)?)?;
            }
            "selector" => {
                let listed = replay(value, |item| {
                    node.add_selector(self.selector(item)?)?;
                    Ok(())
                })?;
                if listed {
                    node.linkage_mut().selector.force_list();
                }
            }
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn annotation(&self, map: &Map<String, Value>) -> Result<Annotation> {
        expect_kind(map, "Annotation")?;
        let mut anno = Annotation::with_config(self.session());
        each_key(map, "Annotation", |key, value| {
            match key {
                "id" => anno.set_id(text(value, key)?)?,
                "motivation" => {
                    let listed = replay(value, |item| {
                        anno.add_motivation(text(item, "motivation")?);
                        Ok(())
                    })?;
                    if listed {
                        anno.motivation.force_list();
                    }
                }
                "audience" => {
                    let listed = replay(value, |item| {
                        anno.add_audience(self.audience(item)?)?;
                        Ok(())
                    })?;
                    if listed {
                        anno.audience.force_list();
                    }
                }
                "stylesheet" => {
                    anno.set_stylesheet(self.stylesheet(value)?)?;
                }
                "bodyValue" => anno.set_body_value(text(value, key)?),
                "body" => {
                    let listed = replay(value, |item| {
                        anno.add_body(self.resource(item)?)?;
                        Ok(())
                    })?;
                    if listed {
                        anno.body.force_list();
                    }
                }
                "target" => {
                    let listed = replay(value, |item| {
                        anno.add_target(self.resource(item)?)?;
                        Ok(())
                    })?;
                    if listed {
                        anno.target.force_list();
                    }
                }
                _ => return Ok(self.lifecycle(&mut anno, key, value)? || licensed(&mut anno, key, value)?),
            }
            Ok(true)
        })?;
        Ok(anno)
    }

    fn agent(&self, value: &Value) -> Result<AgentRef> {
        if let Value::String(uri) = value {
            return Ok(AgentRef::Iri(Iri::parse(uri.as_str())?));
        }
        let map = object(value, "agent")?;
        let mut agent = Agent::with_config(self.session());
        if let Some(kind) = map.get("type") {
            agent.set_type(text(kind, "type")?)?;
        }
        each_key(map, agent.kind(), |key, value| {
            match key {
                "id" => agent.set_id(text(value, key)?)?,
                "name" => {
                    if replay(value, |item| {
                        agent.add_name(text(item, "name")?);
                        Ok(())
                    })? {
                        agent.name.force_list();
                    }
                }
                "nickname" => agent.set_nickname(text(value, key)?),
                "email" => agent.set_email(text(value, key)?),
                "email_sha1" => agent.set_email_sha1(text(value, key)?),
                "homepage" => agent.set_homepage(text(value, key)?)?,
                "schema:softwareVersion" => agent.set_software_version(text(value, key)?),
                _ => return Ok(false),
            }
            Ok(true)
        })?;
        Ok(AgentRef::Agent(Box::new(agent)))
    }

    fn audience(&self, value: &Value) -> Result<AudienceRef> {
        if let Value::String(uri) = value {
            return Ok(AudienceRef::Iri(Iri::parse(uri.as_str())?));
        }
        let map = object(value, "audience")?;
        let mut audience = Audience::with_config(self.session());
        if let Some(kind) = map.get("type") {
            if replay(kind, |item| audience.add_type(text(item, "type")?))? {
                audience.kind.force_list();
            }
        }
        each_key(map, "Audience", |key, value| {
            if key == "id" {
                audience.set_id(text(value, key)?)?;
                return Ok(true);
            }
            if !key.starts_with("schema:") {
                return Ok(false);
            }
            let listed = replay(value, |item| audience.add_schema_property(key, scalar(item, key)?))?;
            if listed {
                if let Some((_, field)) = audience.properties.iter_mut().find(|(name, _)| name == key) {
                    field.force_list();
                }
            }
            Ok(true)
        })?;
        Ok(AudienceRef::Audience(Box::new(audience)))
    }

    fn stylesheet(&self, value: &Value) -> Result<StylesheetRef> {
        if let Value::String(uri) = value {
            return Ok(StylesheetRef::Iri(Iri::parse(uri.as_str())?));
        }
        let map = object(value, "stylesheet")?;
        expect_kind(map, "CssStylesheet")?;
        let mut css = CssStylesheet::with_config(self.session());
        if map.contains_key("type") {
            css.include_type();
        }
        each_key(map, "CssStylesheet", |key, value| {
            match key {
                "id" => css.set_id(text(value, key)?)?,
                "value" => css.set_value(text(value, key)?),
                _ => return Ok(false),
            }
            Ok(true)
        })?;
        Ok(StylesheetRef::Css(Box::new(css)))
    }

    fn resource(&self, value: &Value) -> Result<Resource> {
        if let Value::String(uri) = value {
            return Ok(Resource::Iri(Iri::parse(uri.as_str())?));
        }
        let map = object(value, "resource")?;
        let resource = match map.get("type").and_then(Value::as_str) {
            Some("TextualBody") => Resource::Textual(Box::new(self.textual(map)?)),
            Some("SpecificResource") => Resource::Specific(Box::new(self.specific(map)?)),
            Some("Choice") => Resource::Choice(Box::new(self.choice(map)?)),
            Some(kind @ ("List" | "Composite" | "Independents")) => {
                let kind: SetKind = kind.parse()?;
                Resource::Set(Box::new(self.target_set(map, kind)?))
            }
            Some(_) => Resource::External(Box::new(self.external(map)?)),
            None if SPECIFIC_KEYS.iter().any(|key| map.contains_key(*key)) => {
                Resource::Specific(Box::new(self.specific(map)?))
            }
            None => Resource::External(Box::new(self.external(map)?)),
        };
        Ok(resource)
    }

    fn external(&self, map: &Map<String, Value>) -> Result<ExternalResource> {
        let mut node = ExternalResource::with_config(self.session());
        if let Some(kind) = map.get("type") {
            node.set_type(text(kind, "type")?)?;
        }
        each_key(map, "ExternalResource", |key, value| {
            match key {
                "id" => node.set_id(text(value, key)?)?,
                "accessibility" => {
                    let listed = replay(value, |item| {
                        node.add_accessibility(text(item, "accessibility")?);
                        Ok(())
                    })?;
                    if listed {
                        node.accessibility.force_list();
                    }
                }
                _ => {
                    return Ok(formatted(&mut node, key, value)?
                        || localized(&mut node, key, value)?
                        || self.lifecycle(&mut node, key, value)?
                        || licensed(&mut node, key, value)?
                        || self.anchored(&mut node, key, value)?);
                }
            }
            Ok(true)
        })?;
        Ok(node)
    }

    fn textual(&self, map: &Map<String, Value>) -> Result<TextualBody> {
        let mut node = TextualBody::with_config(self.session());
        each_key(map, "TextualBody", |key, value| {
            match key {
                "id" => node.set_id(text(value, key)?)?,
                "value" => node.set_value(text(value, key)?),
                _ => {
                    return Ok(purposeful(&mut node, key, value)?
                        || formatted(&mut node, key, value)?
                        || localized(&mut node, key, value)?
                        || self.lifecycle(&mut node, key, value)?
                        || licensed(&mut node, key, value)?);
                }
            }
            Ok(true)
        })?;
        Ok(node)
    }

    fn specific(&self, map: &Map<String, Value>) -> Result<SpecificResource> {
        let mut node = SpecificResource::with_config(self.session());
        if !map.contains_key("type") {
            node.omit_type();
        }
        each_key(map, "SpecificResource", |key, value| {
            match key {
                "id" => node.set_id(text(value, key)?)?,
                "state" => {
                    let listed = replay(value, |item| {
                        node.add_state(self.state(item)?)?;
                        Ok(())
                    })?;
                    if listed {
                        node.state.force_list();
                    }
                }
                "styleClass" => node.set_style_class(text(value, key)?),
                "renderedVia" => {
                    let listed = replay(value, |item| {
                        node.add_rendered_via(self.agent(item)?)?;
                        Ok(())
                    })?;
                    if listed {
                        node.rendered_via.force_list();
                    }
                }
                "scope" => {
                    if replay(value, |item| node.add_scope(text(item, "scope")?))? {
                        node.scope.force_list();
                    }
                }
                _ => {
                    return Ok(purposeful(&mut node, key, value)?
                        || self.anchored(&mut node, key, value)?);
                }
            }
            Ok(true)
        })?;
        Ok(node)
    }

    fn choice(&self, map: &Map<String, Value>) -> Result<Choice> {
        let mut node = Choice::with_config(self.session());
        each_key(map, "Choice", |key, value| {
            match key {
                "id" => node.set_id(text(value, key)?)?,
                "items" => {
                    replay(value, |item| {
                        node.add_item(self.resource(item)?)?;
                        Ok(())
                    })?;
                }
                _ => return Ok(false),
            }
            Ok(true)
        })?;
        Ok(node)
    }

    fn target_set(&self, map: &Map<String, Value>, kind: SetKind) -> Result<TargetSet> {
        let mut node = TargetSet::with_config(kind, self.session());
        each_key(map, kind.as_str(), |key, value| {
            match key {
                "id" => node.set_id(text(value, key)?)?,
                "items" => {
                    replay(value, |item| {
                        node.add_item(self.resource(item)?)?;
                        Ok(())
                    })?;
                }
                _ => return Ok(false),
            }
            Ok(true)
        })?;
        Ok(node)
    }

    fn state(&self, value: &Value) -> Result<State> {
        if let Value::String(uri) = value {
            return Ok(State::Iri(Iri::parse(uri.as_str())?));
        }
        let map = object(value, "state")?;
        let state = match map.get("type").and_then(Value::as_str) {
            Some("TimeState") => {
                let mut state = TimeState::with_config(self.session());
                each_key(map, "TimeState", |key, value| {
                    match key {
                        "sourceDate" => {
                            let listed = replay(value, |item| {
                                state.add_source_date(text(item, "sourceDate")?)
                            })?;
                            if listed {
                                state.source_date.force_list();
                            }
                        }
                        "sourceDateStart" => state.set_source_date_start(text(value, key)?)?,
                        "sourceDateEnd" => state.set_source_date_end(text(value, key)?)?,
                        "cached" => {
                            if replay(value, |item| state.add_cached(text(item, "cached")?))? {
                                state.cached.force_list();
                            }
                        }
                        "refinedBy" => self.refine_state(&mut state, value)?,
                        _ => return Ok(false),
                    }
                    Ok(true)
                })?;
                State::Time(Box::new(state))
            }
            Some("HttpRequestState") => {
                let mut state = HttpRequestState::with_config(self.session());
                each_key(map, "HttpRequestState", |key, value| {
                    match key {
                        "value" => state.set_value(text(value, key)?),
                        "refinedBy" => self.refine_state(&mut state, value)?,
                        _ => return Ok(false),
                    }
                    Ok(true)
                })?;
                State::HttpRequest(Box::new(state))
            }
            Some(other) => return Err(malformed(format!("unknown state type {other:?}"))),
            None => {
                let id = map
                    .get("id")
                    .ok_or_else(|| malformed("state must have a type or an id"))?;
                State::Reference(Box::new(StateReference::new(text(id, "id")?)?))
            }
        };
        Ok(state)
    }

    fn refine_state<N: Refinable<Refinement>>(&self, node: &mut N, value: &Value) -> Result<()> {
        let listed = replay(value, |item| {
            let refinement = if state_kind(item).is_some() {
                Refinement::State(self.state(item)?)
            } else {
                Refinement::Selector(self.selector(item)?)
            };
            node.add_refined_by(refinement)?;
            Ok(())
        })?;
        if listed {
            node.refinements_mut().force_list();
        }
        Ok(())
    }

    fn refine_selector<N: Refinable<Selector>>(&self, node: &mut N, value: &Value) -> Result<()> {
        let listed = replay(value, |item| {
            if let Some(child) = state_kind(item) {
                return Err(Error::TypeMismatch {
                    child,
                    owner: node.kind(),
                });
            }
            node.add_refined_by(self.selector(item)?)?;
            Ok(())
        })?;
        if listed {
            node.refinements_mut().force_list();
        }
        Ok(())
    }

    fn selector(&self, value: &Value) -> Result<Selector> {
        if let Value::String(uri) = value {
            return Ok(Selector::Iri(Iri::parse(uri.as_str())?));
        }
        let map = object(value, "selector")?;
        let kind = map
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| malformed("selector has no type"))?;
        let selector = match kind {
            "FragmentSelector" => {
                let mut selector = FragmentSelector::with_config(self.session());
                each_key(map, kind, |key, value| {
                    match key {
                        "value" => selector.set_value(text(value, key)?),
                        "conformsTo" => selector.set_conforms_to(text(value, key)?)?,
                        "refinedBy" => self.refine_selector(&mut selector, value)?,
                        _ => return Ok(false),
                    }
                    Ok(true)
                })?;
                Selector::Fragment(Box::new(selector))
            }
            "CssSelector" => {
                let mut selector = CssSelector::with_config(self.session());
                each_key(map, kind, |key, value| {
                    match key {
                        "value" => selector.set_value(text(value, key)?),
                        "refinedBy" => self.refine_selector(&mut selector, value)?,
                        _ => return Ok(false),
                    }
                    Ok(true)
                })?;
                Selector::Css(Box::new(selector))
            }
            "XPathSelector" => {
                let mut selector = XPathSelector::with_config(self.session());
                each_key(map, kind, |key, value| {
                    match key {
                        "value" => selector.set_value(text(value, key)?),
                        "refinedBy" => self.refine_selector(&mut selector, value)?,
                        _ => return Ok(false),
                    }
                    Ok(true)
                })?;
                Selector::XPath(Box::new(selector))
            }
            "TextQuoteSelector" => {
                let mut selector = TextQuoteSelector::with_config(self.session());
                each_key(map, kind, |key, value| {
                    match key {
                        "exact" => selector.set_exact(text(value, key)?),
                        "prefix" => selector.set_prefix(text(value, key)?),
                        "suffix" => selector.set_suffix(text(value, key)?),
                        "refinedBy" => self.refine_selector(&mut selector, value)?,
                        _ => return Ok(false),
                    }
                    Ok(true)
                })?;
                Selector::TextQuote(Box::new(selector))
            }
            "TextPositionSelector" => {
                let mut selector = TextPositionSelector::with_config(self.session());
                each_key(map, kind, |key, value| {
                    match key {
                        "start" => selector.set_start(uint(value, key)?),
                        "end" => selector.set_end(uint(value, key)?),
                        "refinedBy" => self.refine_selector(&mut selector, value)?,
                        _ => return Ok(false),
                    }
                    Ok(true)
                })?;
                Selector::TextPosition(Box::new(selector))
            }
            "DataPositionSelector" => {
                let mut selector = DataPositionSelector::with_config(self.session());
                each_key(map, kind, |key, value| {
                    match key {
                        "start" => selector.set_start(uint(value, key)?),
                        "end" => selector.set_end(uint(value, key)?),
                        "refinedBy" => self.refine_selector(&mut selector, value)?,
                        _ => return Ok(false),
                    }
                    Ok(true)
                })?;
                Selector::DataPosition(Box::new(selector))
            }
            "SvgSelector" => {
                let mut selector = SvgSelector::with_config(self.session());
                each_key(map, kind, |key, value| {
                    match key {
                        "id" => selector.set_id(text(value, key)?)?,
                        "value" => selector.set_value(text(value, key)?),
                        "refinedBy" => self.refine_selector(&mut selector, value)?,
                        _ => return Ok(false),
                    }
                    Ok(true)
                })?;
                Selector::Svg(Box::new(selector))
            }
            "RangeSelector" => {
                let mut selector = RangeSelector::with_config(self.session());
                each_key(map, kind, |key, value| {
                    match key {
                        "startSelector" => {
                            selector.set_start_selector(self.selector(value)?)?;
                        }
                        "endSelector" => {
                            selector.set_end_selector(self.selector(value)?)?;
                        }
                        "refinedBy" => self.refine_selector(&mut selector, value)?,
                        _ => return Ok(false),
                    }
                    Ok(true)
                })?;
                Selector::Range(Box::new(selector))
            }
            "PointSelector" => {
                let mut selector = PointSelector::with_config(self.session());
                each_key(map, kind, |key, value| {
                    match key {
                        "x" => selector.set_x(uint(value, key)?),
                        "y" => selector.set_y(uint(value, key)?),
                        "t" => selector.set_t(
                            value
                                .as_f64()
                                .ok_or_else(|| malformed("t must be a number"))?,
                        ),
                        "refinedBy" => self.refine_selector(&mut selector, value)?,
                        _ => return Ok(false),
                    }
                    Ok(true)
                })?;
                Selector::Point(Box::new(selector))
            }
            "ImageApiSelector" => {
                let mut selector = ImageApiSelector::with_config(self.session());
                each_key(map, kind, |key, value| {
                    match key {
                        "region" => selector.set_region(text(value, key)?),
                        "size" => selector.set_size(text(value, key)?),
                        "rotation" => selector.set_rotation(scalar(value, key)?),
                        "quality" => selector.set_quality(text(value, key)?),
                        "refinedBy" => self.refine_selector(&mut selector, value)?,
                        _ => return formatted(&mut selector, key, value),
                    }
                    Ok(true)
                })?;
                Selector::ImageApi(Box::new(selector))
            }
            other => return Err(malformed(format!("unknown selector type {other:?}"))),
        };
        Ok(selector)
    }

    fn page(&self, map: &Map<String, Value>) -> Result<AnnotationPage> {
        expect_kind(map, "AnnotationPage")?;
        let mut page = AnnotationPage::with_config(self.session());
        each_key(map, "AnnotationPage", |key, value| {
            match key {
                "id" => page.set_id(text(value, key)?)?,
                "partOf" => {
                    let link = match value {
                        Value::String(uri) => CollectionLink::Iri(Iri::parse(uri.as_str())?),
                        other => CollectionLink::Collection(Box::new(
                            self.collection(object(other, "partOf")?)?,
                        )),
                    };
                    page.set_part_of(link)?;
                }
                "next" => page.set_next(text(value, key)?)?,
                "prev" => page.set_prev(text(value, key)?)?,
                "startIndex" => page.set_start_index(uint(value, key)?),
                "items" => {
                    replay(value, |item| {
                        page.add_item(self.annotation(object(item, "item")?)?);
                        Ok(())
                    })?;
                }
                _ => return self.lifecycle(&mut page, key, value),
            }
            Ok(true)
        })?;
        Ok(page)
    }

    fn page_link(&self, value: &Value) -> Result<PageLink> {
        match value {
            Value::String(uri) => Ok(PageLink::Iri(Iri::parse(uri.as_str())?)),
            other => Ok(PageLink::Page(Box::new(self.page(object(other, "page")?)?))),
        }
    }

    fn collection(&self, map: &Map<String, Value>) -> Result<AnnotationCollection> {
        expect_kind(map, "AnnotationCollection")?;
        let mut collection = AnnotationCollection::with_config(self.session());
        if !map.contains_key("type") {
            collection.omit_type();
        }
        each_key(map, "AnnotationCollection", |key, value| {
            match key {
                "id" => collection.set_id(text(value, key)?)?,
                "label" => {
                    let listed = replay(value, |item| {
                        collection.add_label(text(item, "label")?);
                        Ok(())
                    })?;
                    if listed {
                        collection.label.force_list();
                    }
                }
                "total" => collection.set_total(uint(value, key)?),
                "first" => {
                    collection.set_first(self.page_link(value)?)?;
                }
                "last" => {
                    collection.set_last(self.page_link(value)?)?;
                }
                _ => return self.lifecycle(&mut collection, key, value),
            }
            Ok(true)
        })?;
        Ok(collection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_untyped_objects_are_classified() {
        let reader = Reader {
            config: config::shared(),
        };
        let specific = reader
            .resource(&json!({"source": "http://example.org/page1"}))
            .unwrap();
        assert!(matches!(specific, Resource::Specific(ref node) if !node.include_type));

        let external = reader.resource(&json!({"id": "http://example.org/img1"})).unwrap();
        assert!(matches!(external, Resource::External(_)));
    }

    #[test]
    fn test_selector_refined_by_state_is_rejected() {
        let reader = Reader {
            config: config::shared(),
        };
        let err = reader
            .selector(&json!({
                "type": "FragmentSelector",
                "value": "page=10",
                "refinedBy": {"type": "TimeState", "sourceDate": "2016-02-01T12:05:23Z"}
            }))
            .unwrap_err();
        assert!(matches!(
            err,
            Error::TypeMismatch {
                child: "TimeState",
                owner: "FragmentSelector"
            }
        ));
    }

    #[test]
    fn test_unknown_document_type() {
        let err = from_json(&json!({"type": "Canvas"})).unwrap_err();
        assert!(matches!(err, Error::Rehydrate(_)));
    }

    #[test]
    fn test_state_reference() {
        let reader = Reader {
            config: config::shared(),
        };
        let state = reader.state(&json!({"id": "http://example.org/state1"})).unwrap();
        assert!(matches!(state, State::Reference(ref reference) if reference.id() == "http://example.org/state1"));
    }
}
