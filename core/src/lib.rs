//! Builder, validator and serializer for W3C Web Annotation documents.
//!
//! The crate models the Web Annotation Data Model as a tree of strongly
//! typed nodes:
//!
//! - [`Annotation`]: the root object tying bodies to targets.
//! - Bodies and targets: [`ExternalResource`], [`TextualBody`],
//!   [`SpecificResource`], [`Choice`] and [`TargetSet`] (`List`,
//!   `Composite`, `Independents`).
//! - Selectors ([`FragmentSelector`], [`TextQuoteSelector`], ...) and states
//!   ([`TimeState`], [`HttpRequestState`]) with `refinedBy` chains.
//! - Paging: [`AnnotationCollection`] and [`AnnotationPage`].
//!
//! Every setter validates its input against the session [`Config`] and
//! fails with [`ValidationError`] before anything is stored. Fields track an
//! [`Obligation`] while unset; strict rendering refuses documents missing a
//! `Required` field, and [`Document::inspect`] lists what is missing.
//!
//! # Example
//!
//! ```
//! use serde_json::json;
//! use wadm_core::*;
//!
//! let mut anno = Annotation::new();
//! anno.set_id("http://example.org/anno2").unwrap();
//! let body = anno.set_body(ExternalResource::new()).unwrap();
//! body.set_id("http://example.org/analysis1.mp3").unwrap();
//! body.set_format("audio/mpeg").unwrap();
//! body.add_language("fr").unwrap();
//! let target = anno.set_target(ExternalResource::new()).unwrap();
//! target.set_id("http://example.gov/patent1.pdf").unwrap();
//! target.set_format("application/pdf").unwrap();
//! target.add_language("en").unwrap();
//!
//! let json = anno.to_json().unwrap();
//! assert_eq!(json["body"]["language"], "fr");
//! assert_eq!(json["target"]["format"], "application/pdf");
//! ```

mod agent;
mod annotation;
mod collection;
pub mod config;
mod document;
mod error;
mod field;
mod iri;
mod node;
mod obligation;
pub mod rehydrate;
mod render;
mod resource;
mod selector;
mod state;
mod traits;
pub mod validate;

pub use agent::{Agent, AgentKind, AgentRef};
pub use annotation::{Annotation, Audience, AudienceRef, CssStylesheet, StylesheetRef};
pub use collection::{AnnotationCollection, AnnotationPage, CollectionLink, PageLink};
pub use document::Document;
pub use error::{Advisory, Error, Result, ValidationError};
pub use field::{Compatible, Field, FieldState, Scalar};
pub use iri::Iri;
pub use node::{Entry, Member, Node, Render, Slot};
pub use obligation::{Marker, Obligation};
pub use render::{Inspection, RenderOptions, render_document};
pub use resource::{
    Choice, ExternalResource, Resource, SetKind, SpecificResource, TargetSet, TextualBody,
};
pub use selector::{
    CssSelector, DataPositionSelector, FragmentSelector, ImageApiSelector, PointSelector,
    RangeSelector, Refinable, Selector, SvgSelector, TextPositionSelector, TextQuoteSelector,
    XPathSelector,
};
pub use state::{HttpRequestState, Refinement, State, StateReference, TimeState};
pub use traits::{
    Anchored, Formatted, Identified, Identity, Licensed, Lifecycle, Linkage, Locale, Localized,
    MediaFormat, Provenance, Purpose, Purposeful, Rights,
};
pub use validate::TextDirection;
pub use wadm_registry::{Config, Context};
