//! The `Annotation` node, with its audience and stylesheet companions.

use std::sync::Arc;

use wadm_registry::Config;

use crate::config;
use crate::error::{Result, report};
use crate::field::{Field, Scalar};
use crate::node::{Attach, Entry, Member, Node, any, attach, render_node, slot_enum};
use crate::resource::{Resource, is_body, is_target};
use crate::traits::{Identity, Provenance, Rights, capabilities};
use crate::validate::{check_schema_prefix, check_term};

slot_enum! {
    /// An `audience` value.
    AudienceRef { Audience(Audience) }
}

slot_enum! {
    /// A `stylesheet` value.
    StylesheetRef { Css(CssStylesheet) }
}

/// Associates bodies with targets.
///
/// `target` is `Required`, `body` is `Recommended`. Bare URIs, resource
/// nodes and ready-made [`Resource`] values are all accepted by the body
/// and target methods, which return the attached child for further
/// configuration.
///
/// # Examples
///
/// ```
/// use wadm_core::{Annotation, Document, Identified, TextualBody};
///
/// let mut anno = Annotation::new();
/// anno.set_id("http://example.org/anno9").unwrap();
/// anno.add_body("http://example.org/description1").unwrap();
/// anno.add_body(TextualBody::new()).unwrap().set_value("tag1");
/// anno.add_target("http://example.org/image1").unwrap();
/// anno.add_target("http://example.org/image2").unwrap();
///
/// let json = anno.to_json().unwrap();
/// assert_eq!(json["body"][1]["value"], "tag1");
/// assert_eq!(json["target"][1], "http://example.org/image2");
/// ```
#[derive(Debug, Clone)]
pub struct Annotation {
    pub(crate) identity: Identity,
    pub(crate) motivation: Field<String>,
    pub(crate) provenance: Provenance,
    pub(crate) rights: Rights,
    pub(crate) audience: Field<AudienceRef>,
    pub(crate) stylesheet: Field<StylesheetRef>,
    pub(crate) body_value: Field<String>,
    pub(crate) body: Field<Resource>,
    pub(crate) target: Field<Resource>,
}

impl Default for Annotation {
    fn default() -> Self {
        Self::new()
    }
}

impl Annotation {
    pub fn new() -> Self {
        Self::with_config(config::shared())
    }

    pub fn with_config(config: Arc<Config>) -> Self {
        Self {
            identity: Identity::required(config, "Annotation"),
            motivation: Field::new(),
            provenance: Provenance::default(),
            rights: Rights::default(),
            audience: Field::new(),
            stylesheet: Field::new(),
            body_value: Field::new(),
            body: Field::recommended(
                "There should be 1 or more body relationships associated with an Annotation but there may be 0.",
            ),
            target: Field::required(
                "There must be 1 or more target relationships associated with an Annotation.",
            ),
        }
    }

    fn session_config(&self) -> Arc<Config> {
        Arc::clone(&self.identity.config)
    }

    /// Adds a motivation. Terms outside the standard vocabulary are kept
    /// and reported as advisories.
    pub fn add_motivation(&mut self, motivation: &str) {
        report(check_term("motivation", motivation));
        self.motivation.push(motivation.to_string());
    }

    /// Replaces the body. A [`TargetSet`](crate::TargetSet) is rejected.
    pub fn set_body<M: Member<Resource>>(&mut self, body: M) -> Result<&mut M::Handle> {
        let config = self.session_config();
        attach(&mut self.body, body, &config, Attach::Set, "Annotation", is_body)
    }

    /// Adds a body with append-or-upgrade semantics.
    pub fn add_body<M: Member<Resource>>(&mut self, body: M) -> Result<&mut M::Handle> {
        let config = self.session_config();
        attach(&mut self.body, body, &config, Attach::Push, "Annotation", is_body)
    }

    /// Replaces the target. A [`Choice`](crate::Choice) is rejected.
    pub fn set_target<M: Member<Resource>>(&mut self, target: M) -> Result<&mut M::Handle> {
        let config = self.session_config();
        attach(&mut self.target, target, &config, Attach::Set, "Annotation", is_target)
    }

    /// Adds a target with append-or-upgrade semantics.
    pub fn add_target<M: Member<Resource>>(&mut self, target: M) -> Result<&mut M::Handle> {
        let config = self.session_config();
        attach(&mut self.target, target, &config, Attach::Push, "Annotation", is_target)
    }

    /// Sets `bodyValue`, a plain-text body embedded in the annotation.
    pub fn set_body_value(&mut self, value: &str) {
        self.body_value.set(value.to_string());
    }

    pub fn set_audience<M: Member<AudienceRef>>(&mut self, audience: M) -> Result<&mut M::Handle> {
        let config = self.session_config();
        attach(&mut self.audience, audience, &config, Attach::Set, "Annotation", any)
    }

    pub fn add_audience<M: Member<AudienceRef>>(&mut self, audience: M) -> Result<&mut M::Handle> {
        let config = self.session_config();
        attach(&mut self.audience, audience, &config, Attach::Push, "Annotation", any)
    }

    /// Sets the stylesheet: a URI or an embedded [`CssStylesheet`].
    pub fn set_stylesheet<M: Member<StylesheetRef>>(
        &mut self,
        stylesheet: M,
    ) -> Result<&mut M::Handle> {
        let config = self.session_config();
        attach(&mut self.stylesheet, stylesheet, &config, Attach::Set, "Annotation", any)
    }

    pub fn bodies(&self) -> &[Resource] {
        self.body.values()
    }

    pub fn targets(&self) -> &[Resource] {
        self.target.values()
    }
}

impl Node for Annotation {
    fn kind(&self) -> &'static str {
        "Annotation"
    }

    fn entries(&self) -> Vec<(&str, Entry<'_>)> {
        let mut out = Vec::with_capacity(16);
        self.identity.extend(&mut out);
        out.push(("type", Entry::Text("Annotation")));
        out.push(("motivation", self.motivation.entry()));
        self.provenance.extend(&mut out);
        self.rights.extend(&mut out);
        out.push(("audience", self.audience.entry()));
        out.push(("stylesheet", self.stylesheet.entry()));
        out.push(("bodyValue", self.body_value.entry()));
        out.push(("body", self.body.entry()));
        out.push(("target", self.target.entry()));
        out
    }

    fn config(&self) -> Option<&Arc<Config>> {
        Some(&self.identity.config)
    }

    fn rebind(&mut self, config: &Arc<Config>) {
        self.identity.rebind(config);
        self.provenance.rebind(config);
        self.audience.rebind(config);
        self.stylesheet.rebind(config);
        self.body.rebind(config);
        self.target.rebind(config);
    }
}

capabilities!(Annotation {
    Identified(identity),
    Lifecycle(provenance),
    Licensed(rights),
});

/// The intended audience of an annotation, described with schema.org
/// terms.
///
/// # Examples
///
/// ```
/// use wadm_core::{Audience, Identified};
///
/// let mut audience = Audience::new();
/// audience.set_id("http://example.edu/roles/teacher").unwrap();
/// audience.set_type("schema:EducationalAudience").unwrap();
/// audience.add_schema_property("schema:educationalRole", "teacher").unwrap();
/// assert!(audience.set_type("EducationalAudience").is_err());
/// ```
#[derive(Debug, Clone)]
pub struct Audience {
    pub(crate) identity: Identity,
    pub(crate) kind: Field<String>,
    pub(crate) properties: Vec<(String, Field<Scalar>)>,
}

impl Default for Audience {
    fn default() -> Self {
        Self::new()
    }
}

impl Audience {
    pub fn new() -> Self {
        Self::with_config(config::shared())
    }

    pub fn with_config(config: Arc<Config>) -> Self {
        Self {
            identity: Identity::recommended(config, "Audience"),
            kind: Field::recommended(
                "The Audience should have 1 or more types and they should come from the schema.org class structure.",
            ),
            properties: Vec::new(),
        }
    }

    pub fn set_type(&mut self, kind: &str) -> Result<()> {
        check_schema_prefix(kind)?;
        self.kind.set(kind.to_string());
        Ok(())
    }

    pub fn add_type(&mut self, kind: &str) -> Result<()> {
        check_schema_prefix(kind)?;
        self.kind.push(kind.to_string());
        Ok(())
    }

    /// Adds a value to a `schema:` property.
    ///
    /// Repeated values for the same property follow append-or-upgrade and
    /// must all be of the same kind.
    pub fn add_schema_property(&mut self, property: &str, value: impl Into<Scalar>) -> Result<()> {
        check_schema_prefix(property)?;
        let index = match self.properties.iter().position(|(name, _)| name == property) {
            Some(index) => index,
            None => {
                self.properties.push((property.to_string(), Field::new()));
                self.properties.len() - 1
            }
        };
        let value = value.into();
        let (_, field) = &mut self.properties[index];
        let pushed = field.try_push(property, value).map(|_| ());
        if pushed.is_err() && field.is_empty() {
            self.properties.remove(index);
        }
        pushed
    }

    /// The values held for `property`.
    pub fn schema_property(&self, property: &str) -> Option<&Field<Scalar>> {
        self.properties
            .iter()
            .find(|(name, _)| name == property)
            .map(|(_, field)| field)
    }
}

impl Node for Audience {
    fn kind(&self) -> &'static str {
        "Audience"
    }

    fn entries(&self) -> Vec<(&str, Entry<'_>)> {
        let mut out = Vec::with_capacity(2 + self.properties.len());
        self.identity.extend(&mut out);
        out.push(("type", self.kind.entry()));
        for (name, field) in &self.properties {
            out.push((name.as_str(), field.entry()));
        }
        out
    }

    fn config(&self) -> Option<&Arc<Config>> {
        Some(&self.identity.config)
    }

    fn rebind(&mut self, config: &Arc<Config>) {
        self.identity.rebind(config);
    }
}

capabilities!(Audience { Identified(identity) });

/// An embedded or linked CSS stylesheet.
///
/// `type` is optional for stylesheets; call
/// [`include_type`](CssStylesheet::include_type) to emit it.
#[derive(Debug, Clone)]
pub struct CssStylesheet {
    pub(crate) identity: Identity,
    pub(crate) include_type: bool,
    pub(crate) value: Field<String>,
}

impl Default for CssStylesheet {
    fn default() -> Self {
        Self::new()
    }
}

impl CssStylesheet {
    pub fn new() -> Self {
        Self::with_config(config::shared())
    }

    pub fn with_config(config: Arc<Config>) -> Self {
        Self {
            identity: Identity::optional(config),
            include_type: false,
            value: Field::new(),
        }
    }

    /// Emits `"type": "CssStylesheet"`.
    pub fn include_type(&mut self) -> &mut Self {
        self.include_type = true;
        self
    }

    /// Embeds the style rules.
    pub fn set_value(&mut self, css: &str) {
        self.value.set(css.to_string());
    }
}

impl Node for CssStylesheet {
    fn kind(&self) -> &'static str {
        "CssStylesheet"
    }

    fn entries(&self) -> Vec<(&str, Entry<'_>)> {
        let mut out = Vec::with_capacity(3);
        self.identity.extend(&mut out);
        if self.include_type {
            out.push(("type", Entry::Text("CssStylesheet")));
        }
        out.push(("value", self.value.entry()));
        out
    }

    fn config(&self) -> Option<&Arc<Config>> {
        Some(&self.identity.config)
    }

    fn rebind(&mut self, config: &Arc<Config>) {
        self.identity.rebind(config);
    }
}

capabilities!(CssStylesheet { Identified(identity) });

render_node!(Annotation, Audience, CssStylesheet);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::field::FieldState;
    use crate::resource::{Choice, TargetSet, TextualBody};

    #[test]
    fn test_motivations_upgrade_in_order() {
        let mut anno = Annotation::new();
        anno.add_motivation("commenting");
        anno.add_motivation("tagging");
        anno.add_motivation("painting");
        assert_eq!(anno.motivation.values(), ["commenting", "tagging", "painting"]);
    }

    #[test]
    fn test_body_rejects_target_sets() {
        let mut anno = Annotation::new();
        let err = anno.add_body(TargetSet::list()).unwrap_err();
        assert!(matches!(
            err,
            Error::TypeMismatch {
                child: "List",
                owner: "Annotation"
            }
        ));
        assert!(anno.body.is_unset());
    }

    #[test]
    fn test_target_rejects_choice() {
        let mut anno = Annotation::new();
        assert!(anno.set_target(Choice::new()).is_err());
        assert!(anno.target.marker().is_some());
        anno.set_target(TargetSet::composite()).unwrap();
    }

    #[test]
    fn test_mixed_bodies_keep_insertion_order() {
        let mut anno = Annotation::new();
        anno.add_body("http://example.org/description1").unwrap();
        anno.add_body(TextualBody::new()).unwrap().set_value("tag1");
        match anno.body.state() {
            FieldState::Many([Resource::Iri(iri), Resource::Textual(body)]) => {
                assert_eq!(iri, "http://example.org/description1");
                assert_eq!(body.value(), Some("tag1"));
            }
            other => panic!("unexpected state: {other:?}"),
        }
    }

    #[test]
    fn test_children_adopt_parent_session() {
        let config = Arc::new(Config::default().with_base_url("https://example.org/"));
        let mut anno = Annotation::with_config(Arc::clone(&config));
        let body = anno.add_body(TextualBody::new()).unwrap();
        assert!(Arc::ptr_eq(&body.identity.config, &config));
    }

    #[test]
    fn test_audience_properties_keep_kind() {
        let mut audience = Audience::new();
        audience.add_schema_property("schema:age", 12).unwrap();
        audience.add_schema_property("schema:age", 13).unwrap();
        assert!(audience.add_schema_property("schema:age", "old").is_err());
        assert!(audience.add_schema_property("age", 1).is_err());
        assert_eq!(audience.schema_property("schema:age").map(Field::len), Some(2));
        assert!(audience.schema_property("age").is_none());
    }

    #[test]
    fn test_stylesheet_type_is_opt_in() {
        let mut css = CssStylesheet::new();
        css.set_value(".red { color: red }");
        assert!(!css.entries().iter().any(|(key, _)| *key == "type"));
        css.include_type();
        assert!(css.entries().iter().any(|(key, _)| *key == "type"));
    }
}
