//! Bodies and targets.
//!
//! Every body, target, choice item and source is a [`Resource`]: either a
//! bare URI or one of the resource nodes defined here. Which variants a
//! field accepts depends on the role:
//!
//! | Role | Accepts |
//! |------|---------|
//! | `body` | anything except a [`TargetSet`] |
//! | `target` | anything except a [`Choice`] |
//! | `source` | a URI or an [`ExternalResource`] |
//! | `items` of [`Choice`] / [`TargetSet`] | neither a `Choice` nor a `TargetSet` |

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use wadm_registry::Config;

use crate::agent::{AgentKind, AgentRef};
use crate::config;
use crate::error::{Result, ValidationError};
use crate::field::Field;
use crate::iri::Iri;
use crate::node::{Attach, Entry, Member, Node, attach, render_node, slot_enum};
use crate::state::State;
use crate::traits::{
    Identity, Linkage, Locale, MediaFormat, Provenance, Purpose, Rights, capabilities,
};
use crate::validate::check_resource_type;

slot_enum! {
    /// A body, target, source or container item.
    Resource {
        External(ExternalResource),
        Textual(TextualBody),
        Specific(SpecificResource),
        Choice(Choice),
        Set(TargetSet),
    }
}

pub(crate) fn is_body(slot: &Resource) -> bool {
    !matches!(slot, Resource::Set(_))
}

pub(crate) fn is_target(slot: &Resource) -> bool {
    !matches!(slot, Resource::Choice(_))
}

pub(crate) fn is_item(slot: &Resource) -> bool {
    !matches!(slot, Resource::Choice(_) | Resource::Set(_))
}

/// A web resource described in place: an image, a video, a page.
///
/// Its `type` is optional and, when set, must come from the session's
/// resource type vocabulary.
#[derive(Debug, Clone)]
pub struct ExternalResource {
    pub(crate) identity: Identity,
    pub(crate) kind: Field<String>,
    pub(crate) format: MediaFormat,
    pub(crate) locale: Locale,
    pub(crate) accessibility: Field<String>,
    pub(crate) provenance: Provenance,
    pub(crate) rights: Rights,
    pub(crate) linkage: Linkage,
}

impl Default for ExternalResource {
    fn default() -> Self {
        Self::new()
    }
}

impl ExternalResource {
    pub fn new() -> Self {
        Self::with_config(config::shared())
    }

    pub fn with_config(config: Arc<Config>) -> Self {
        Self {
            identity: Identity::required(config, "resource"),
            kind: Field::new(),
            format: MediaFormat::recommended(),
            locale: Locale::default(),
            accessibility: Field::new(),
            provenance: Provenance::default(),
            rights: Rights::default(),
            linkage: Linkage::default(),
        }
    }

    /// Sets the resource class (`Image`, `Text`, ...).
    pub fn set_type(&mut self, kind: &str) -> Result<()> {
        check_resource_type(kind, &self.identity.config.vocabulary.resource_types)?;
        self.kind.set(kind.to_string());
        Ok(())
    }

    pub fn resource_type(&self) -> Option<&str> {
        self.kind.first().map(String::as_str)
    }

    /// Adds an accessibility feature such as `captions`.
    pub fn add_accessibility(&mut self, feature: &str) {
        self.accessibility.push(feature.to_string());
    }
}

impl Node for ExternalResource {
    fn kind(&self) -> &'static str {
        "ExternalResource"
    }

    fn entries(&self) -> Vec<(&str, Entry<'_>)> {
        let mut out = Vec::with_capacity(16);
        self.identity.extend(&mut out);
        out.push(("type", self.kind.entry()));
        self.format.extend(&mut out);
        self.locale.extend(&mut out);
        out.push(("accessibility", self.accessibility.entry()));
        self.provenance.extend(&mut out);
        self.rights.extend(&mut out);
        self.linkage.extend_source(&mut out);
        self.linkage.extend_selector(&mut out);
        out
    }

    fn config(&self) -> Option<&Arc<Config>> {
        Some(&self.identity.config)
    }

    fn rebind(&mut self, config: &Arc<Config>) {
        self.identity.rebind(config);
        self.provenance.rebind(config);
        self.linkage.rebind(config);
    }
}

capabilities!(ExternalResource {
    Identified(identity),
    Lifecycle(provenance),
    Licensed(rights),
    Localized(locale),
    Formatted(format),
    Anchored(linkage),
});

/// An embedded textual body.
///
/// # Examples
///
/// ```
/// use wadm_core::{Formatted, Localized, TextualBody};
///
/// let mut body = TextualBody::new();
/// body.set_value("<p>j'adore !</p>");
/// body.set_format("text/html").unwrap();
/// body.set_language("fr").unwrap();
/// assert!(body.set_format("text/nonsense").is_err());
/// ```
#[derive(Debug, Clone)]
pub struct TextualBody {
    pub(crate) identity: Identity,
    pub(crate) purpose: Purpose,
    pub(crate) value: Field<String>,
    pub(crate) format: MediaFormat,
    pub(crate) locale: Locale,
    pub(crate) provenance: Provenance,
    pub(crate) rights: Rights,
}

impl Default for TextualBody {
    fn default() -> Self {
        Self::new()
    }
}

impl TextualBody {
    pub fn new() -> Self {
        Self::with_config(config::shared())
    }

    pub fn with_config(config: Arc<Config>) -> Self {
        Self {
            identity: Identity::optional(config),
            purpose: Purpose::default(),
            value: Field::required(
                "There must be exactly 1 value property associated with the TextualBody.",
            ),
            format: MediaFormat::recommended(),
            locale: Locale::default(),
            provenance: Provenance::default(),
            rights: Rights::default(),
        }
    }

    /// Sets the character content.
    pub fn set_value(&mut self, value: &str) {
        self.value.set(value.to_string());
    }

    pub fn value(&self) -> Option<&str> {
        self.value.first().map(String::as_str)
    }
}

impl Node for TextualBody {
    fn kind(&self) -> &'static str {
        "TextualBody"
    }

    fn entries(&self) -> Vec<(&str, Entry<'_>)> {
        let mut out = Vec::with_capacity(16);
        self.identity.extend(&mut out);
        out.push(("type", Entry::Text("TextualBody")));
        self.purpose.extend(&mut out);
        out.push(("value", self.value.entry()));
        self.format.extend(&mut out);
        self.locale.extend(&mut out);
        self.provenance.extend(&mut out);
        self.rights.extend(&mut out);
        out
    }

    fn config(&self) -> Option<&Arc<Config>> {
        Some(&self.identity.config)
    }

    fn rebind(&mut self, config: &Arc<Config>) {
        self.identity.rebind(config);
        self.provenance.rebind(config);
    }
}

capabilities!(TextualBody {
    Identified(identity),
    Lifecycle(provenance),
    Licensed(rights),
    Localized(locale),
    Formatted(format),
    Purposeful(purpose),
});

/// A resource narrowed by selectors, states, styling or scope.
///
/// Embedded specific resources are often written without a `type`; call
/// [`omit_type`](SpecificResource::omit_type) to produce that form.
#[derive(Debug, Clone)]
pub struct SpecificResource {
    pub(crate) identity: Identity,
    pub(crate) include_type: bool,
    pub(crate) purpose: Purpose,
    pub(crate) linkage: Linkage,
    pub(crate) state: Field<State>,
    pub(crate) style_class: Field<String>,
    pub(crate) rendered_via: Field<AgentRef>,
    pub(crate) scope: Field<Iri>,
}

impl Default for SpecificResource {
    fn default() -> Self {
        Self::new()
    }
}

fn is_renderer(slot: &AgentRef) -> bool {
    match slot {
        AgentRef::Iri(_) => true,
        AgentRef::Agent(agent) => agent.agent_kind() == Some(AgentKind::Software),
    }
}

impl SpecificResource {
    pub fn new() -> Self {
        Self::with_config(config::shared())
    }

    pub fn with_config(config: Arc<Config>) -> Self {
        Self {
            identity: Identity::recommended(config, "SpecificResource"),
            include_type: true,
            purpose: Purpose::default(),
            linkage: Linkage::default(),
            state: Field::new(),
            style_class: Field::new(),
            rendered_via: Field::new(),
            scope: Field::new(),
        }
    }

    /// Leaves `type` out of the output.
    pub fn omit_type(&mut self) -> &mut Self {
        self.include_type = false;
        self
    }

    /// Replaces the state with a single value.
    pub fn set_state<M: Member<State>>(&mut self, state: M) -> Result<&mut M::Handle> {
        let config = Arc::clone(&self.identity.config);
        attach(&mut self.state, state, &config, Attach::Set, "SpecificResource", crate::node::any)
    }

    /// Adds a state with append-or-upgrade semantics.
    pub fn add_state<M: Member<State>>(&mut self, state: M) -> Result<&mut M::Handle> {
        let config = Arc::clone(&self.identity.config);
        attach(&mut self.state, state, &config, Attach::Push, "SpecificResource", crate::node::any)
    }

    /// Adds a state, always serializing `state` as a list.
    pub fn append_state<M: Member<State>>(&mut self, state: M) -> Result<&mut M::Handle> {
        let config = Arc::clone(&self.identity.config);
        attach(&mut self.state, state, &config, Attach::Append, "SpecificResource", crate::node::any)
    }

    pub fn set_style_class(&mut self, class: &str) {
        self.style_class.set(class.to_string());
    }

    /// Adds the software that rendered the source: a URI or a `Software`
    /// agent.
    pub fn add_rendered_via<M: Member<AgentRef>>(&mut self, agent: M) -> Result<&mut M::Handle> {
        let config = Arc::clone(&self.identity.config);
        attach(&mut self.rendered_via, agent, &config, Attach::Push, "SpecificResource", is_renderer)
    }

    pub fn add_scope(&mut self, scope: &str) -> Result<()> {
        self.scope.push(Iri::parse(scope)?);
        Ok(())
    }
}

impl Node for SpecificResource {
    fn kind(&self) -> &'static str {
        "SpecificResource"
    }

    fn entries(&self) -> Vec<(&str, Entry<'_>)> {
        let mut out = Vec::with_capacity(10);
        self.identity.extend(&mut out);
        if self.include_type {
            out.push(("type", Entry::Text("SpecificResource")));
        }
        self.purpose.extend(&mut out);
        self.linkage.extend_source(&mut out);
        self.linkage.extend_selector(&mut out);
        out.push(("state", self.state.entry()));
        out.push(("styleClass", self.style_class.entry()));
        out.push(("renderedVia", self.rendered_via.entry()));
        out.push(("scope", self.scope.entry()));
        out
    }

    fn config(&self) -> Option<&Arc<Config>> {
        Some(&self.identity.config)
    }

    fn rebind(&mut self, config: &Arc<Config>) {
        self.identity.rebind(config);
        self.linkage.rebind(config);
        self.state.rebind(config);
        self.rendered_via.rebind(config);
    }
}

capabilities!(SpecificResource {
    Identified(identity),
    Purposeful(purpose),
    Anchored(linkage),
});

/// Alternative resources, of which a client should pick one.
#[derive(Debug, Clone)]
pub struct Choice {
    pub(crate) identity: Identity,
    pub(crate) items: Field<Resource>,
}

impl Default for Choice {
    fn default() -> Self {
        Self::new()
    }
}

impl Choice {
    pub fn new() -> Self {
        Self::with_config(config::shared())
    }

    pub fn with_config(config: Arc<Config>) -> Self {
        Self {
            identity: Identity::recommended(config, "Choice"),
            items: Field::required("A Choice must have at least one item."),
        }
    }

    /// Appends an alternative. `items` is always a list.
    pub fn add_item<M: Member<Resource>>(&mut self, item: M) -> Result<&mut M::Handle> {
        let config = Arc::clone(&self.identity.config);
        attach(&mut self.items, item, &config, Attach::Append, "Choice", is_item)
    }

    pub fn items(&self) -> &[Resource] {
        self.items.values()
    }
}

impl Node for Choice {
    fn kind(&self) -> &'static str {
        "Choice"
    }

    fn entries(&self) -> Vec<(&str, Entry<'_>)> {
        let mut out = Vec::with_capacity(3);
        self.identity.extend(&mut out);
        out.push(("type", Entry::Text("Choice")));
        out.push(("items", self.items.entry()));
        out
    }

    fn config(&self) -> Option<&Arc<Config>> {
        Some(&self.identity.config)
    }

    fn rebind(&mut self, config: &Arc<Config>) {
        self.identity.rebind(config);
        self.items.rebind(config);
    }
}

capabilities!(Choice { Identified(identity) });

/// How the members of a [`TargetSet`] relate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SetKind {
    /// Ordered; all members together.
    List,
    /// Unordered; all members together.
    Composite,
    /// Each member separately.
    Independents,
}

impl SetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SetKind::List => "List",
            SetKind::Composite => "Composite",
            SetKind::Independents => "Independents",
        }
    }
}

impl fmt::Display for SetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SetKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "List" => Ok(SetKind::List),
            "Composite" => Ok(SetKind::Composite),
            "Independents" => Ok(SetKind::Independents),
            _ => Err(ValidationError::DisallowedValue {
                field: "type",
                value: s.to_string(),
                allowed: "List, Composite, Independents",
            }),
        }
    }
}

/// A `List`, `Composite` or `Independents` grouping of targets.
///
/// # Examples
///
/// ```
/// use wadm_core::{Document, TargetSet};
///
/// let mut set = TargetSet::composite();
/// set.add_item("http://example.com/page1").unwrap();
/// let json = set.to_json().unwrap();
/// assert_eq!(json["type"], "Composite");
/// assert_eq!(json["items"][0], "http://example.com/page1");
/// ```
#[derive(Debug, Clone)]
pub struct TargetSet {
    pub(crate) identity: Identity,
    pub(crate) set_kind: SetKind,
    pub(crate) items: Field<Resource>,
}

impl TargetSet {
    pub fn new(kind: SetKind) -> Self {
        Self::with_config(kind, config::shared())
    }

    pub fn with_config(kind: SetKind, config: Arc<Config>) -> Self {
        Self {
            identity: Identity::optional(config),
            set_kind: kind,
            items: Field::required("A set of targets must have at least one item."),
        }
    }

    pub fn list() -> Self {
        Self::new(SetKind::List)
    }

    pub fn composite() -> Self {
        Self::new(SetKind::Composite)
    }

    pub fn independents() -> Self {
        Self::new(SetKind::Independents)
    }

    pub fn set_kind(&self) -> SetKind {
        self.set_kind
    }

    /// Appends a member. `items` is always a list.
    pub fn add_item<M: Member<Resource>>(&mut self, item: M) -> Result<&mut M::Handle> {
        let config = Arc::clone(&self.identity.config);
        let owner = self.set_kind.as_str();
        attach(&mut self.items, item, &config, Attach::Append, owner, is_item)
    }

    pub fn items(&self) -> &[Resource] {
        self.items.values()
    }
}

impl Node for TargetSet {
    fn kind(&self) -> &'static str {
        self.set_kind.as_str()
    }

    fn entries(&self) -> Vec<(&str, Entry<'_>)> {
        let mut out = Vec::with_capacity(3);
        self.identity.extend(&mut out);
        out.push(("type", Entry::Text(self.set_kind.as_str())));
        out.push(("items", self.items.entry()));
        out
    }

    fn config(&self) -> Option<&Arc<Config>> {
        Some(&self.identity.config)
    }

    fn rebind(&mut self, config: &Arc<Config>) {
        self.identity.rebind(config);
        self.items.rebind(config);
    }
}

capabilities!(TargetSet { Identified(identity) });

render_node!(ExternalResource, TextualBody, SpecificResource, Choice, TargetSet);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::traits::{Anchored, Identified};

    #[test]
    fn test_resource_type_vocabulary() {
        let mut resource = ExternalResource::new();
        resource.set_type("Image").unwrap();
        assert_eq!(resource.resource_type(), Some("Image"));
        assert!(matches!(
            resource.set_type("Audio"),
            Err(Error::Validation(ValidationError::UnknownResourceType(_)))
        ));

        let config = Arc::new(Config::default().with_resource_type("Audio"));
        let mut audio = ExternalResource::with_config(config);
        audio.set_type("Audio").unwrap();
    }

    #[test]
    fn test_source_relaxes_required_id() {
        let mut resource = ExternalResource::new();
        assert!(resource.identity.id.marker().is_some_and(|m| m.is_required()));
        resource.set_source("http://example.org/page1").unwrap();
        assert!(resource.identity.id.marker().is_some_and(|m| !m.is_required()));
    }

    #[test]
    fn test_source_rejects_textual_body() {
        let mut specific = SpecificResource::new();
        let err = specific.set_source(TextualBody::new()).unwrap_err();
        assert_eq!(err.to_string(), "TextualBody object cannot be added to SpecificResource");
        assert!(specific.linkage.source.is_unset());
        assert!(specific.set_source("ftp://example.org/x").is_err());
    }

    #[test]
    fn test_source_accepts_external_resource() {
        let mut specific = SpecificResource::new();
        let source = specific.set_source(ExternalResource::new()).unwrap();
        source.set_id("http://example.org/comment1").unwrap();
        assert!(matches!(specific.linkage.source.values(), [Resource::External(_)]));
    }

    #[test]
    fn test_choice_rejects_nested_containers() {
        let mut choice = Choice::new();
        assert!(choice.add_item(Choice::new()).is_err());
        assert!(choice.add_item(TargetSet::list()).is_err());
        choice.add_item(TextualBody::new()).unwrap();
        assert_eq!(choice.items().len(), 1);
    }

    #[test]
    fn test_rendered_via_requires_software() {
        let mut specific = SpecificResource::new();
        assert!(specific.add_rendered_via(crate::Agent::person()).is_err());
        specific.add_rendered_via(crate::Agent::software()).unwrap();
        specific.add_rendered_via("http://example.org/renderer").unwrap();
        assert_eq!(specific.rendered_via.len(), 2);
    }

    #[test]
    fn test_set_kind_parse() {
        assert_eq!("Independents".parse::<SetKind>(), Ok(SetKind::Independents));
        assert!("Bag".parse::<SetKind>().is_err());
    }
}
