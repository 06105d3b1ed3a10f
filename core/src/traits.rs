//! Capability components and the traits that expose them.
//!
//! Each capability is a plain struct embedded by value in the node types
//! that carry it ([`Identity`], [`Provenance`], [`Rights`], [`Locale`],
//! [`MediaFormat`], [`Purpose`], [`Linkage`]), paired with a trait whose
//! provided methods implement the setters once for every carrier. A node
//! opts in by embedding the component and implementing the two accessors.

use std::sync::Arc;

use chrono::Utc;
use wadm_registry::Config;

use crate::agent::AgentRef;
use crate::error::{Advisory, Error, Result, ValidationError, report};
use crate::field::Field;
use crate::iri::Iri;
use crate::node::{Attach, Entry, Member, Node, Slot, any, attach};
use crate::resource::Resource;
use crate::selector::Selector;
use crate::validate::{
    TextDirection, check_format, check_identifier, check_language, check_term, check_timestamp,
};

/// The `id` of a node together with the session it was created in.
#[derive(Debug, Clone)]
pub struct Identity {
    pub(crate) id: Field<String>,
    pub(crate) config: Arc<Config>,
    lenient: bool,
}

impl Identity {
    pub(crate) fn new(config: Arc<Config>, id: Field<String>) -> Self {
        Self {
            id,
            config,
            lenient: false,
        }
    }

    pub(crate) fn required(config: Arc<Config>, kind: &str) -> Self {
        Self::new(config, Field::required(format!("A {kind} must have the id property.")))
    }

    pub(crate) fn recommended(config: Arc<Config>, kind: &str) -> Self {
        Self::new(config, Field::recommended(format!("A {kind} should have the id property.")))
    }

    pub(crate) fn optional(config: Arc<Config>) -> Self {
        Self::new(config, Field::new())
    }

    /// Accept explicit identifiers that fail the HTTP(S) checks, with an
    /// advisory instead of an error.
    pub(crate) fn lenient(mut self) -> Self {
        self.lenient = true;
        self
    }

    pub(crate) fn assign(&mut self, explicit: Option<&str>, suffix: Option<&str>) -> Result<()> {
        let id = match (check_identifier(explicit, suffix, &self.config.base_url), explicit) {
            (Ok(id), _) => id,
            (
                Err(ValidationError::NotHttp(_) | ValidationError::InvalidUri { .. }),
                Some(explicit),
            ) if self.lenient => {
                Advisory::NonHttpIdentifier(explicit.to_string()).emit();
                explicit.to_string()
            }
            (Err(err), _) => return Err(err.into()),
        };
        self.id.set(id);
        Ok(())
    }

    pub(crate) fn rebind(&mut self, config: &Arc<Config>) {
        self.config = Arc::clone(config);
    }

    pub(crate) fn extend<'a>(&'a self, out: &mut Vec<(&'a str, Entry<'a>)>) {
        out.push(("id", self.id.entry()));
    }
}

/// Nodes with an `id`.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use wadm_core::{Annotation, Config, Identified};
///
/// let config = Arc::new(Config::default().with_base_url("https://example.org/"));
/// let mut anno = Annotation::with_config(config);
/// anno.set_id_under_base("anno1").unwrap();
/// assert_eq!(anno.id(), Some("https://example.org/anno1"));
/// assert!(anno.set_id("ftp://example.org/anno1").is_err());
/// ```
pub trait Identified: Node {
    fn identity(&self) -> &Identity;

    fn identity_mut(&mut self) -> &mut Identity;

    /// Sets an absolute HTTP(S) identifier.
    fn set_id(&mut self, id: &str) -> Result<()> {
        self.identity_mut().assign(Some(id), None)
    }

    /// Sets the identifier to the session base URL followed by `suffix`.
    fn set_id_under_base(&mut self, suffix: &str) -> Result<()> {
        self.identity_mut().assign(None, Some(suffix))
    }

    /// Low-level form of [`set_id`](Identified::set_id) taking both
    /// arguments; exactly one must be given.
    fn assign_id(&mut self, explicit: Option<&str>, suffix: Option<&str>) -> Result<()> {
        self.identity_mut().assign(explicit, suffix)
    }

    fn id(&self) -> Option<&str> {
        self.identity().id.first().map(String::as_str)
    }
}

/// Creation and generation metadata.
#[derive(Debug, Clone, Default)]
pub struct Provenance {
    pub(crate) creator: Field<AgentRef>,
    pub(crate) created: Field<String>,
    pub(crate) modified: Field<String>,
    pub(crate) generator: Field<AgentRef>,
    pub(crate) generated: Field<String>,
}

impl Provenance {
    pub(crate) fn rebind(&mut self, config: &Arc<Config>) {
        self.creator.rebind(config);
        self.generator.rebind(config);
    }

    pub(crate) fn extend<'a>(&'a self, out: &mut Vec<(&'a str, Entry<'a>)>) {
        out.push(("creator", self.creator.entry()));
        out.push(("created", self.created.entry()));
        out.push(("modified", self.modified.entry()));
        out.push(("generator", self.generator.entry()));
        out.push(("generated", self.generated.entry()));
    }
}

fn stamp(field: &mut Field<String>, value: &str) -> Result<()> {
    report(check_timestamp(value)?);
    field.set(value.to_string());
    Ok(())
}

/// Nodes carrying `creator`, `created`, `modified`, `generator` and
/// `generated`.
///
/// Agents are attached through [`Member<AgentRef>`]: pass a URI string, an
/// [`Iri`] or an [`Agent`](crate::Agent).
pub trait Lifecycle: Identified {
    fn provenance(&self) -> &Provenance;

    fn provenance_mut(&mut self) -> &mut Provenance;

    fn set_creator<M: Member<AgentRef>>(&mut self, creator: M) -> Result<&mut M::Handle>
    where
        Self: Sized,
    {
        let config = Arc::clone(&self.identity().config);
        let owner = self.kind();
        attach(&mut self.provenance_mut().creator, creator, &config, Attach::Set, owner, any)
    }

    fn add_creator<M: Member<AgentRef>>(&mut self, creator: M) -> Result<&mut M::Handle>
    where
        Self: Sized,
    {
        let config = Arc::clone(&self.identity().config);
        let owner = self.kind();
        attach(&mut self.provenance_mut().creator, creator, &config, Attach::Push, owner, any)
    }

    fn set_generator<M: Member<AgentRef>>(&mut self, generator: M) -> Result<&mut M::Handle>
    where
        Self: Sized,
    {
        let config = Arc::clone(&self.identity().config);
        let owner = self.kind();
        attach(&mut self.provenance_mut().generator, generator, &config, Attach::Set, owner, any)
    }

    fn add_generator<M: Member<AgentRef>>(&mut self, generator: M) -> Result<&mut M::Handle>
    where
        Self: Sized,
    {
        let config = Arc::clone(&self.identity().config);
        let owner = self.kind();
        attach(&mut self.provenance_mut().generator, generator, &config, Attach::Push, owner, any)
    }

    /// Sets `created`; the value must be an XSD `dateTime`.
    fn set_created(&mut self, timestamp: &str) -> Result<()> {
        stamp(&mut self.provenance_mut().created, timestamp)
    }

    /// Sets `created` to the current UTC time, to the second.
    fn set_created_now(&mut self) -> Result<()> {
        let now = Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string();
        stamp(&mut self.provenance_mut().created, &now)
    }

    fn set_modified(&mut self, timestamp: &str) -> Result<()> {
        stamp(&mut self.provenance_mut().modified, timestamp)
    }

    fn set_generated(&mut self, timestamp: &str) -> Result<()> {
        stamp(&mut self.provenance_mut().generated, timestamp)
    }
}

/// `rights`, `canonical` and `via`.
#[derive(Debug, Clone, Default)]
pub struct Rights {
    pub(crate) rights: Field<Iri>,
    pub(crate) canonical: Field<String>,
    pub(crate) via: Field<Iri>,
}

impl Rights {
    pub(crate) fn extend<'a>(&'a self, out: &mut Vec<(&'a str, Entry<'a>)>) {
        out.push(("rights", self.rights.entry()));
        out.push(("canonical", self.canonical.entry()));
        out.push(("via", self.via.entry()));
    }
}

pub trait Licensed: Node {
    fn rights(&self) -> &Rights;

    fn rights_mut(&mut self) -> &mut Rights;

    /// Adds a license link.
    fn add_rights(&mut self, rights: &str) -> Result<()> {
        let rights = Iri::parse(rights)?;
        self.rights_mut().rights.push(rights);
        Ok(())
    }

    /// Sets the canonical identifier. Any IRI scheme is allowed here,
    /// `urn:uuid:` included.
    fn set_canonical(&mut self, canonical: &str) {
        self.rights_mut().canonical.set(canonical.to_string());
    }

    fn add_via(&mut self, via: &str) -> Result<()> {
        let via = Iri::parse(via)?;
        self.rights_mut().via.push(via);
        Ok(())
    }
}

/// `language`, `processingLanguage` and `textDirection`.
#[derive(Debug, Clone)]
pub struct Locale {
    pub(crate) language: Field<String>,
    pub(crate) processing_language: Field<String>,
    pub(crate) text_direction: Field<TextDirection>,
}

impl Default for Locale {
    fn default() -> Self {
        Self {
            language: Field::recommended("It should have at least one language."),
            processing_language: Field::recommended("It should have one processing language."),
            text_direction: Field::new(),
        }
    }
}

impl Locale {
    pub(crate) fn extend<'a>(&'a self, out: &mut Vec<(&'a str, Entry<'a>)>) {
        out.push(("language", self.language.entry()));
        out.push(("textDirection", self.text_direction.entry()));
        out.push(("processingLanguage", self.processing_language.entry()));
    }
}

/// Language tagging, checked against the session's language table.
pub trait Localized: Node {
    fn locale(&self) -> &Locale;

    fn locale_mut(&mut self) -> &mut Locale;

    fn set_language(&mut self, tag: &str) -> Result<()> {
        check_language(tag, &self.session().vocabulary.languages)?;
        self.locale_mut().language.set(tag.to_string());
        Ok(())
    }

    fn add_language(&mut self, tag: &str) -> Result<()> {
        check_language(tag, &self.session().vocabulary.languages)?;
        self.locale_mut().language.push(tag.to_string());
        Ok(())
    }

    fn set_processing_language(&mut self, tag: &str) -> Result<()> {
        check_language(tag, &self.session().vocabulary.languages)?;
        self.locale_mut().processing_language.set(tag.to_string());
        Ok(())
    }

    /// Accepts `ltr`, `rtl` or `auto`.
    fn set_text_direction(&mut self, direction: &str) -> Result<()> {
        let direction: TextDirection = direction.parse()?;
        self.locale_mut().text_direction.set(direction);
        Ok(())
    }
}

/// The `format` field.
#[derive(Debug, Clone)]
pub struct MediaFormat {
    pub(crate) format: Field<String>,
}

impl MediaFormat {
    pub(crate) fn recommended() -> Self {
        Self {
            format: Field::recommended("It should have at least one format."),
        }
    }

    pub(crate) fn optional() -> Self {
        Self { format: Field::new() }
    }

    pub(crate) fn extend<'a>(&'a self, out: &mut Vec<(&'a str, Entry<'a>)>) {
        out.push(("format", self.format.entry()));
    }
}

/// Media types, checked against the session's IANA table.
pub trait Formatted: Node {
    fn media_format(&self) -> &MediaFormat;

    fn media_format_mut(&mut self) -> &mut MediaFormat;

    fn set_format(&mut self, format: &str) -> Result<()> {
        check_format(format, &self.session().vocabulary.media_types)?;
        self.media_format_mut().format.set(format.to_string());
        Ok(())
    }

    fn add_format(&mut self, format: &str) -> Result<()> {
        check_format(format, &self.session().vocabulary.media_types)?;
        self.media_format_mut().format.push(format.to_string());
        Ok(())
    }
}

/// The `purpose` field.
#[derive(Debug, Clone, Default)]
pub struct Purpose {
    pub(crate) purpose: Field<String>,
}

impl Purpose {
    pub(crate) fn extend<'a>(&'a self, out: &mut Vec<(&'a str, Entry<'a>)>) {
        out.push(("purpose", self.purpose.entry()));
    }
}

pub trait Purposeful: Node {
    fn purpose(&self) -> &Purpose;

    fn purpose_mut(&mut self) -> &mut Purpose;

    /// Adds a purpose. Terms outside the motivation vocabulary are kept and
    /// reported as advisories.
    fn add_purpose(&mut self, purpose: &str) {
        report(check_term("purpose", purpose));
        self.purpose_mut().purpose.push(purpose.to_string());
    }
}

/// `source` and `selector`.
#[derive(Debug, Clone, Default)]
pub struct Linkage {
    pub(crate) source: Field<Resource>,
    pub(crate) selector: Field<Selector>,
}

impl Linkage {
    pub(crate) fn rebind(&mut self, config: &Arc<Config>) {
        self.source.rebind(config);
        self.selector.rebind(config);
    }

    pub(crate) fn extend_source<'a>(&'a self, out: &mut Vec<(&'a str, Entry<'a>)>) {
        out.push(("source", self.source.entry()));
    }

    pub(crate) fn extend_selector<'a>(&'a self, out: &mut Vec<(&'a str, Entry<'a>)>) {
        out.push(("selector", self.selector.entry()));
    }
}

fn is_source(slot: &Resource) -> bool {
    matches!(slot, Resource::Iri(_) | Resource::External(_))
}

const RELAXED_ID: &str = "An id is recommended for resources that have a source.";

/// Nodes pointing at a `source` resource through `selector`s.
pub trait Anchored: Identified {
    fn linkage(&self) -> &Linkage;

    fn linkage_mut(&mut self) -> &mut Linkage;

    /// Sets the source: an HTTP(S) URI or an
    /// [`ExternalResource`](crate::ExternalResource).
    ///
    /// A still-unset required `id` on this node becomes recommended.
    fn set_source<M: Member<Resource>>(&mut self, source: M) -> Result<&mut M::Handle>
    where
        Self: Sized,
    {
        let config = Arc::clone(&self.identity().config);
        let owner = self.kind();
        let slot = source.into_slot(&config)?;
        if let Resource::Iri(iri) = &slot {
            if !iri.as_str().starts_with("http") {
                return Err(ValidationError::NotHttp(iri.to_string()).into());
            }
        }
        if !is_source(&slot) {
            return Err(Error::TypeMismatch {
                child: Slot::kind(&slot),
                owner,
            });
        }
        self.identity_mut().id.relax(RELAXED_ID);
        let slot = attach(&mut self.linkage_mut().source, slot, &config, Attach::Set, owner, is_source)?;
        let child = Slot::kind(slot);
        M::handle(slot).ok_or(Error::TypeMismatch { child, owner })
    }

    /// Sets the source to the session base URL followed by `suffix`.
    fn set_source_under_base(&mut self, suffix: &str) -> Result<&mut Iri>
    where
        Self: Sized,
    {
        let joined = check_identifier(None, Some(suffix), &self.identity().config.base_url)?;
        self.set_source(Iri::trusted(joined))
    }

    fn set_selector<M: Member<Selector>>(&mut self, selector: M) -> Result<&mut M::Handle>
    where
        Self: Sized,
    {
        let config = Arc::clone(&self.identity().config);
        let owner = self.kind();
        attach(&mut self.linkage_mut().selector, selector, &config, Attach::Set, owner, any)
    }

    fn add_selector<M: Member<Selector>>(&mut self, selector: M) -> Result<&mut M::Handle>
    where
        Self: Sized,
    {
        let config = Arc::clone(&self.identity().config);
        let owner = self.kind();
        attach(&mut self.linkage_mut().selector, selector, &config, Attach::Push, owner, any)
    }
}

/// Implements capability traits by pointing each one at an embedded
/// component field.
macro_rules! capabilities {
    (@one $node:ty, Identified, $field:ident) => {
        impl $crate::traits::Identified for $node {
            fn identity(&self) -> &$crate::traits::Identity {
                &self.$field
            }

            fn identity_mut(&mut self) -> &mut $crate::traits::Identity {
                &mut self.$field
            }
        }
    };
    (@one $node:ty, Lifecycle, $field:ident) => {
        impl $crate::traits::Lifecycle for $node {
            fn provenance(&self) -> &$crate::traits::Provenance {
                &self.$field
            }

            fn provenance_mut(&mut self) -> &mut $crate::traits::Provenance {
                &mut self.$field
            }
        }
    };
    (@one $node:ty, Licensed, $field:ident) => {
        impl $crate::traits::Licensed for $node {
            fn rights(&self) -> &$crate::traits::Rights {
                &self.$field
            }

            fn rights_mut(&mut self) -> &mut $crate::traits::Rights {
                &mut self.$field
            }
        }
    };
    (@one $node:ty, Localized, $field:ident) => {
        impl $crate::traits::Localized for $node {
            fn locale(&self) -> &$crate::traits::Locale {
                &self.$field
            }

            fn locale_mut(&mut self) -> &mut $crate::traits::Locale {
                &mut self.$field
            }
        }
    };
    (@one $node:ty, Formatted, $field:ident) => {
        impl $crate::traits::Formatted for $node {
            fn media_format(&self) -> &$crate::traits::MediaFormat {
                &self.$field
            }

            fn media_format_mut(&mut self) -> &mut $crate::traits::MediaFormat {
                &mut self.$field
            }
        }
    };
    (@one $node:ty, Purposeful, $field:ident) => {
        impl $crate::traits::Purposeful for $node {
            fn purpose(&self) -> &$crate::traits::Purpose {
                &self.$field
            }

            fn purpose_mut(&mut self) -> &mut $crate::traits::Purpose {
                &mut self.$field
            }
        }
    };
    (@one $node:ty, Anchored, $field:ident) => {
        impl $crate::traits::Anchored for $node {
            fn linkage(&self) -> &$crate::traits::Linkage {
                &self.$field
            }

            fn linkage_mut(&mut self) -> &mut $crate::traits::Linkage {
                &mut self.$field
            }
        }
    };
    ($node:ty { $($capability:ident($field:ident)),+ $(,)? }) => {
        $( $crate::traits::capabilities!(@one $node, $capability, $field); )+
    };
}

pub(crate) use capabilities;
