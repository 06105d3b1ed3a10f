//! Paging: annotation collections and the pages that hold their members.

use std::sync::Arc;

use wadm_registry::Config;

use crate::annotation::Annotation;
use crate::config;
use crate::error::Result;
use crate::field::Field;
use crate::iri::Iri;
use crate::node::{Attach, Entry, Member, Node, any, attach, render_node, slot_enum};
use crate::traits::{Identity, Provenance, capabilities};

slot_enum! {
    /// A `first` or `last` value.
    PageLink { Page(AnnotationPage) }
}

slot_enum! {
    /// A `partOf` value.
    CollectionLink { Collection(AnnotationCollection) }
}

/// One page of annotations in a collection.
///
/// # Examples
///
/// ```
/// use wadm_core::{AnnotationPage, Document, Identified};
///
/// let mut page = AnnotationPage::new();
/// page.set_id("http://example.org/page1").unwrap();
/// page.set_start_index(0);
/// let anno = page.add_annotation();
/// anno.set_id("http://example.org/anno1").unwrap();
/// anno.set_body("http://example.net/comment1").unwrap();
/// anno.set_target("http://example.com/book/chapter1").unwrap();
///
/// let json = page.to_json().unwrap();
/// assert_eq!(json["items"][0]["id"], "http://example.org/anno1");
/// assert_eq!(json["startIndex"], 0);
/// ```
#[derive(Debug, Clone)]
pub struct AnnotationPage {
    pub(crate) identity: Identity,
    pub(crate) provenance: Provenance,
    pub(crate) part_of: Field<CollectionLink>,
    pub(crate) next: Field<Iri>,
    pub(crate) prev: Field<Iri>,
    pub(crate) start_index: Field<u64>,
    pub(crate) items: Field<Annotation>,
}

impl Default for AnnotationPage {
    fn default() -> Self {
        Self::new()
    }
}

impl AnnotationPage {
    pub fn new() -> Self {
        Self::with_config(config::shared())
    }

    pub fn with_config(config: Arc<Config>) -> Self {
        Self {
            identity: Identity::required(config, "AnnotationPage"),
            provenance: Provenance::default(),
            part_of: Field::new(),
            next: Field::new(),
            prev: Field::new(),
            start_index: Field::new(),
            items: Field::recommended("The annotation page should include at least one item."),
        }
    }

    /// Links the collection this page belongs to: its URI, or an embedded
    /// [`AnnotationCollection`] with some of its properties.
    pub fn set_part_of<M: Member<CollectionLink>>(&mut self, collection: M) -> Result<&mut M::Handle> {
        let config = Arc::clone(&self.identity.config);
        attach(&mut self.part_of, collection, &config, Attach::Set, "AnnotationPage", any)
    }

    pub fn set_next(&mut self, next: &str) -> Result<()> {
        self.next.set(Iri::parse(next)?);
        Ok(())
    }

    pub fn set_prev(&mut self, prev: &str) -> Result<()> {
        self.prev.set(Iri::parse(prev)?);
        Ok(())
    }

    /// Position of the first item relative to the whole collection.
    pub fn set_start_index(&mut self, index: u64) {
        self.start_index.set(index);
    }

    /// Appends an annotation. `items` is always a list.
    pub fn add_item(&mut self, mut annotation: Annotation) -> &mut Annotation {
        annotation.rebind(&self.identity.config);
        self.items.append(annotation)
    }

    /// Appends a new, empty annotation and returns it.
    pub fn add_annotation(&mut self) -> &mut Annotation {
        let annotation = Annotation::with_config(Arc::clone(&self.identity.config));
        self.items.append(annotation)
    }

    pub fn items(&self) -> &[Annotation] {
        self.items.values()
    }
}

impl Node for AnnotationPage {
    fn kind(&self) -> &'static str {
        "AnnotationPage"
    }

    fn entries(&self) -> Vec<(&str, Entry<'_>)> {
        let mut out = Vec::with_capacity(12);
        self.identity.extend(&mut out);
        out.push(("type", Entry::Text("AnnotationPage")));
        self.provenance.extend(&mut out);
        out.push(("partOf", self.part_of.entry()));
        out.push(("next", self.next.entry()));
        out.push(("prev", self.prev.entry()));
        out.push(("startIndex", self.start_index.entry()));
        out.push(("items", self.items.entry()));
        out
    }

    fn config(&self) -> Option<&Arc<Config>> {
        Some(&self.identity.config)
    }

    fn rebind(&mut self, config: &Arc<Config>) {
        self.identity.rebind(config);
        self.provenance.rebind(config);
        self.part_of.rebind(config);
        for annotation in self.items.values_mut() {
            annotation.rebind(config);
        }
    }
}

capabilities!(AnnotationPage {
    Identified(identity),
    Lifecycle(provenance),
});

/// An ordered collection of annotations, split into pages.
///
/// Identifiers that are not HTTP(S) URIs are accepted here with a warning,
/// unlike every other node.
#[derive(Debug, Clone)]
pub struct AnnotationCollection {
    pub(crate) identity: Identity,
    pub(crate) include_type: bool,
    pub(crate) label: Field<String>,
    pub(crate) provenance: Provenance,
    pub(crate) total: Field<u64>,
    pub(crate) first: Field<PageLink>,
    pub(crate) last: Field<PageLink>,
}

impl Default for AnnotationCollection {
    fn default() -> Self {
        Self::new()
    }
}

impl AnnotationCollection {
    pub fn new() -> Self {
        Self::with_config(config::shared())
    }

    pub fn with_config(config: Arc<Config>) -> Self {
        Self {
            identity: Identity::required(config, "AnnotationCollection").lenient(),
            include_type: true,
            label: Field::recommended(
                "An Annotation Collection should have the label property with at least one entry.",
            ),
            provenance: Provenance::default(),
            total: Field::new(),
            first: Field::new(),
            last: Field::new(),
        }
    }

    /// Leaves `type` out of the output, as embedded `partOf` collections
    /// usually do.
    pub fn omit_type(&mut self) -> &mut Self {
        self.include_type = false;
        self
    }

    pub fn add_label(&mut self, label: &str) {
        self.label.push(label.to_string());
    }

    /// The total number of annotations in the collection.
    pub fn set_total(&mut self, total: u64) {
        self.total.set(total);
    }

    pub fn set_first<M: Member<PageLink>>(&mut self, page: M) -> Result<&mut M::Handle> {
        let config = Arc::clone(&self.identity.config);
        attach(&mut self.first, page, &config, Attach::Set, "AnnotationCollection", any)
    }

    pub fn set_last<M: Member<PageLink>>(&mut self, page: M) -> Result<&mut M::Handle> {
        let config = Arc::clone(&self.identity.config);
        attach(&mut self.last, page, &config, Attach::Set, "AnnotationCollection", any)
    }
}

impl Node for AnnotationCollection {
    fn kind(&self) -> &'static str {
        "AnnotationCollection"
    }

    fn entries(&self) -> Vec<(&str, Entry<'_>)> {
        let mut out = Vec::with_capacity(12);
        self.identity.extend(&mut out);
        if self.include_type {
            out.push(("type", Entry::Text("AnnotationCollection")));
        }
        out.push(("label", self.label.entry()));
        self.provenance.extend(&mut out);
        out.push(("total", self.total.entry()));
        out.push(("first", self.first.entry()));
        out.push(("last", self.last.entry()));
        out
    }

    fn config(&self) -> Option<&Arc<Config>> {
        Some(&self.identity.config)
    }

    fn rebind(&mut self, config: &Arc<Config>) {
        self.identity.rebind(config);
        self.provenance.rebind(config);
        self.first.rebind(config);
        self.last.rebind(config);
    }
}

capabilities!(AnnotationCollection {
    Identified(identity),
    Lifecycle(provenance),
});

render_node!(AnnotationPage, AnnotationCollection);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldState;
    use crate::traits::Identified;

    #[test]
    fn test_collection_accepts_non_http_id() {
        let mut collection = AnnotationCollection::new();
        collection.set_id("urn:uuid:dbfb1861-0ecf-41ad-be94-a584e5c4f1df").unwrap();
        assert_eq!(collection.id(), Some("urn:uuid:dbfb1861-0ecf-41ad-be94-a584e5c4f1df"));

        let mut page = AnnotationPage::new();
        assert!(page.set_id("urn:uuid:dbfb1861-0ecf-41ad-be94-a584e5c4f1df").is_err());
    }

    #[test]
    fn test_single_item_is_listed() {
        let mut page = AnnotationPage::new();
        page.add_annotation();
        assert!(matches!(page.items.state(), FieldState::Many([_])));
    }

    #[test]
    fn test_embedded_first_page() {
        let mut collection = AnnotationCollection::new();
        let page = collection.set_first(AnnotationPage::new()).unwrap();
        page.set_start_index(0);
        assert!(matches!(collection.first.values(), [PageLink::Page(_)]));
        collection.set_last("http://example.org/page42").unwrap();
        assert!(matches!(collection.last.values(), [PageLink::Iri(_)]));
    }

    #[test]
    fn test_next_is_uri_checked() {
        let mut page = AnnotationPage::new();
        assert!(page.set_next("http://example.org/page 2").is_err());
        page.set_next("http://example.org/page2").unwrap();
    }
}
