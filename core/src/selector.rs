//! Selectors: descriptions of a segment of a source resource.
//!
//! Every selector carries a `refinedBy` chain through [`Refinable`]. A
//! selector can only be refined by another selector; states may be refined
//! by either family (see [`crate::state::Refinement`]). The restriction is
//! enforced by the type system: only selector types implement
//! `Member<Selector>`.
//!
//! # Examples
//!
//! ```
//! use wadm_core::{Document, FragmentSelector, Refinable, TextQuoteSelector};
//!
//! let mut fragment = FragmentSelector::new();
//! fragment.set_value("para5");
//! let quote = fragment.add_refined_by(TextQuoteSelector::new()).unwrap();
//! quote.set_exact("Selected Text");
//!
//! let json = fragment.to_json().unwrap();
//! assert_eq!(json["refinedBy"]["type"], "TextQuoteSelector");
//! assert_eq!(json["refinedBy"]["exact"], "Selected Text");
//! ```

use std::sync::Arc;

use wadm_registry::Config;

use crate::config;
use crate::error::Result;
use crate::field::{Field, Scalar};
use crate::iri::Iri;
use crate::node::{Attach, Entry, Member, Node, Slot, any, attach, render_node, slot_enum};
use crate::traits::{Formatted, MediaFormat};

slot_enum! {
    /// A `selector`, `refinedBy`, `startSelector` or `endSelector` value.
    Selector {
        Fragment(FragmentSelector),
        Css(CssSelector),
        XPath(XPathSelector),
        TextQuote(TextQuoteSelector),
        TextPosition(TextPositionSelector),
        DataPosition(DataPositionSelector),
        Svg(SvgSelector),
        Range(RangeSelector),
        Point(PointSelector),
        ImageApi(ImageApiSelector),
    }
}

/// Nodes with a `refinedBy` chain of slot `S`.
///
/// Repeated refinements follow append-or-upgrade: the second one turns
/// `refinedBy` into a list.
pub trait Refinable<S: Slot + 'static>: Node {
    fn refinements(&self) -> &Field<S>;

    fn refinements_mut(&mut self) -> &mut Field<S>;

    /// Attaches a refinement and returns it for further configuration.
    fn add_refined_by<M: Member<S>>(&mut self, refinement: M) -> Result<&mut M::Handle>
    where
        Self: Sized,
    {
        let config = self.session();
        let owner = self.kind();
        attach(self.refinements_mut(), refinement, &config, Attach::Push, owner, any)
    }
}

/// Implements [`Refinable`] over a node's `refined_by` field.
macro_rules! refinable {
    ($slot:ty => $($node:ty),+ $(,)?) => {
        $(
            impl $crate::selector::Refinable<$slot> for $node {
                fn refinements(&self) -> &$crate::field::Field<$slot> {
                    &self.refined_by
                }

                fn refinements_mut(&mut self) -> &mut $crate::field::Field<$slot> {
                    &mut self.refined_by
                }
            }
        )+
    };
}

pub(crate) use refinable;

/// Selects by a media-type specific fragment identifier.
#[derive(Debug, Clone)]
pub struct FragmentSelector {
    pub(crate) config: Arc<Config>,
    pub(crate) value: Field<String>,
    pub(crate) conforms_to: Field<Iri>,
    pub(crate) refined_by: Field<Selector>,
}

impl Default for FragmentSelector {
    fn default() -> Self {
        Self::new()
    }
}

impl FragmentSelector {
    pub fn new() -> Self {
        Self::with_config(config::shared())
    }

    pub fn with_config(config: Arc<Config>) -> Self {
        Self {
            config,
            value: Field::required("A FragmentSelector must have a value."),
            conforms_to: Field::recommended(
                "A FragmentSelector should have exactly 1 conformsTo link to the specification that defines the syntax of the fragment.",
            ),
            refined_by: Field::new(),
        }
    }

    pub fn set_value(&mut self, value: &str) {
        self.value.set(value.to_string());
    }

    /// Sets a media fragment rectangle, `xywh=x,y,w,h`.
    pub fn set_xywh(&mut self, x: u64, y: u64, w: u64, h: u64) {
        self.value.set(format!("xywh={x},{y},{w},{h}"));
    }

    /// Links the specification that defines the fragment syntax.
    pub fn set_conforms_to(&mut self, specification: &str) -> Result<()> {
        self.conforms_to.set(Iri::parse(specification)?);
        Ok(())
    }
}

impl Node for FragmentSelector {
    fn kind(&self) -> &'static str {
        "FragmentSelector"
    }

    fn entries(&self) -> Vec<(&str, Entry<'_>)> {
        vec![
            ("type", Entry::Text("FragmentSelector")),
            ("value", self.value.entry()),
            ("conformsTo", self.conforms_to.entry()),
            ("refinedBy", self.refined_by.entry()),
        ]
    }

    fn config(&self) -> Option<&Arc<Config>> {
        Some(&self.config)
    }

    fn rebind(&mut self, config: &Arc<Config>) {
        self.config = Arc::clone(config);
        self.refined_by.rebind(config);
    }
}

/// Selects DOM elements with a CSS selector.
#[derive(Debug, Clone)]
pub struct CssSelector {
    pub(crate) config: Arc<Config>,
    pub(crate) value: Field<String>,
    pub(crate) refined_by: Field<Selector>,
}

impl Default for CssSelector {
    fn default() -> Self {
        Self::new()
    }
}

impl CssSelector {
    pub fn new() -> Self {
        Self::with_config(config::shared())
    }

    pub fn with_config(config: Arc<Config>) -> Self {
        Self {
            config,
            value: Field::required("A CssSelector must have a value."),
            refined_by: Field::new(),
        }
    }

    pub fn set_value(&mut self, value: &str) {
        self.value.set(value.to_string());
    }
}

impl Node for CssSelector {
    fn kind(&self) -> &'static str {
        "CssSelector"
    }

    fn entries(&self) -> Vec<(&str, Entry<'_>)> {
        vec![
            ("type", Entry::Text("CssSelector")),
            ("value", self.value.entry()),
            ("refinedBy", self.refined_by.entry()),
        ]
    }

    fn config(&self) -> Option<&Arc<Config>> {
        Some(&self.config)
    }

    fn rebind(&mut self, config: &Arc<Config>) {
        self.config = Arc::clone(config);
        self.refined_by.rebind(config);
    }
}

/// Selects DOM nodes with an XPath expression.
#[derive(Debug, Clone)]
pub struct XPathSelector {
    pub(crate) config: Arc<Config>,
    pub(crate) value: Field<String>,
    pub(crate) refined_by: Field<Selector>,
}

impl Default for XPathSelector {
    fn default() -> Self {
        Self::new()
    }
}

impl XPathSelector {
    pub fn new() -> Self {
        Self::with_config(config::shared())
    }

    pub fn with_config(config: Arc<Config>) -> Self {
        Self {
            config,
            value: Field::required("An XPathSelector must have a value."),
            refined_by: Field::new(),
        }
    }

    pub fn set_value(&mut self, value: &str) {
        self.value.set(value.to_string());
    }
}

impl Node for XPathSelector {
    fn kind(&self) -> &'static str {
        "XPathSelector"
    }

    fn entries(&self) -> Vec<(&str, Entry<'_>)> {
        vec![
            ("type", Entry::Text("XPathSelector")),
            ("value", self.value.entry()),
            ("refinedBy", self.refined_by.entry()),
        ]
    }

    fn config(&self) -> Option<&Arc<Config>> {
        Some(&self.config)
    }

    fn rebind(&mut self, config: &Arc<Config>) {
        self.config = Arc::clone(config);
        self.refined_by.rebind(config);
    }
}

/// Selects a quoted run of text, disambiguated by its surroundings.
#[derive(Debug, Clone)]
pub struct TextQuoteSelector {
    pub(crate) config: Arc<Config>,
    pub(crate) exact: Field<String>,
    pub(crate) prefix: Field<String>,
    pub(crate) suffix: Field<String>,
    pub(crate) refined_by: Field<Selector>,
}

impl Default for TextQuoteSelector {
    fn default() -> Self {
        Self::new()
    }
}

impl TextQuoteSelector {
    pub fn new() -> Self {
        Self::with_config(config::shared())
    }

    pub fn with_config(config: Arc<Config>) -> Self {
        Self {
            config,
            exact: Field::required("A TextQuoteSelector must have exactly 1 exact property."),
            prefix: Field::new(),
            suffix: Field::new(),
            refined_by: Field::new(),
        }
    }

    /// The selected text, after normalization.
    pub fn set_exact(&mut self, exact: &str) {
        self.exact.set(exact.to_string());
    }

    /// Text immediately before the selection.
    pub fn set_prefix(&mut self, prefix: &str) {
        self.prefix.set(prefix.to_string());
    }

    /// Text immediately after the selection.
    pub fn set_suffix(&mut self, suffix: &str) {
        self.suffix.set(suffix.to_string());
    }
}

impl Node for TextQuoteSelector {
    fn kind(&self) -> &'static str {
        "TextQuoteSelector"
    }

    fn entries(&self) -> Vec<(&str, Entry<'_>)> {
        vec![
            ("type", Entry::Text("TextQuoteSelector")),
            ("exact", self.exact.entry()),
            ("prefix", self.prefix.entry()),
            ("suffix", self.suffix.entry()),
            ("refinedBy", self.refined_by.entry()),
        ]
    }

    fn config(&self) -> Option<&Arc<Config>> {
        Some(&self.config)
    }

    fn rebind(&mut self, config: &Arc<Config>) {
        self.config = Arc::clone(config);
        self.refined_by.rebind(config);
    }
}

/// Selects characters `start..end` of the text content.
///
/// Position 0 is the first character; `end` is exclusive.
#[derive(Debug, Clone)]
pub struct TextPositionSelector {
    pub(crate) config: Arc<Config>,
    pub(crate) start: Field<u64>,
    pub(crate) end: Field<u64>,
    pub(crate) refined_by: Field<Selector>,
}

impl Default for TextPositionSelector {
    fn default() -> Self {
        Self::new()
    }
}

impl TextPositionSelector {
    pub fn new() -> Self {
        Self::with_config(config::shared())
    }

    pub fn with_config(config: Arc<Config>) -> Self {
        Self {
            config,
            start: Field::required("A TextPositionSelector must have exactly 1 start property."),
            end: Field::required("A TextPositionSelector must have exactly 1 end property."),
            refined_by: Field::new(),
        }
    }

    pub fn set_start(&mut self, start: u64) {
        self.start.set(start);
    }

    pub fn set_end(&mut self, end: u64) {
        self.end.set(end);
    }
}

impl Node for TextPositionSelector {
    fn kind(&self) -> &'static str {
        "TextPositionSelector"
    }

    fn entries(&self) -> Vec<(&str, Entry<'_>)> {
        vec![
            ("type", Entry::Text("TextPositionSelector")),
            ("start", self.start.entry()),
            ("end", self.end.entry()),
            ("refinedBy", self.refined_by.entry()),
        ]
    }

    fn config(&self) -> Option<&Arc<Config>> {
        Some(&self.config)
    }

    fn rebind(&mut self, config: &Arc<Config>) {
        self.config = Arc::clone(config);
        self.refined_by.rebind(config);
    }
}

/// Selects bytes `start..end` of the representation.
#[derive(Debug, Clone)]
pub struct DataPositionSelector {
    pub(crate) config: Arc<Config>,
    pub(crate) start: Field<u64>,
    pub(crate) end: Field<u64>,
    pub(crate) refined_by: Field<Selector>,
}

impl Default for DataPositionSelector {
    fn default() -> Self {
        Self::new()
    }
}

impl DataPositionSelector {
    pub fn new() -> Self {
        Self::with_config(config::shared())
    }

    pub fn with_config(config: Arc<Config>) -> Self {
        Self {
            config,
            start: Field::required("A DataPositionSelector must have exactly 1 start property."),
            end: Field::required("A DataPositionSelector must have exactly 1 end property."),
            refined_by: Field::new(),
        }
    }

    pub fn set_start(&mut self, start: u64) {
        self.start.set(start);
    }

    pub fn set_end(&mut self, end: u64) {
        self.end.set(end);
    }
}

impl Node for DataPositionSelector {
    fn kind(&self) -> &'static str {
        "DataPositionSelector"
    }

    fn entries(&self) -> Vec<(&str, Entry<'_>)> {
        vec![
            ("type", Entry::Text("DataPositionSelector")),
            ("start", self.start.entry()),
            ("end", self.end.entry()),
            ("refinedBy", self.refined_by.entry()),
        ]
    }

    fn config(&self) -> Option<&Arc<Config>> {
        Some(&self.config)
    }

    fn rebind(&mut self, config: &Arc<Config>) {
        self.config = Arc::clone(config);
        self.refined_by.rebind(config);
    }
}

/// Selects a non-rectangular region with an SVG shape, embedded as `value`
/// or published under `id`.
#[derive(Debug, Clone)]
pub struct SvgSelector {
    pub(crate) config: Arc<Config>,
    pub(crate) id: Field<Iri>,
    pub(crate) value: Field<String>,
    pub(crate) refined_by: Field<Selector>,
}

impl Default for SvgSelector {
    fn default() -> Self {
        Self::new()
    }
}

impl SvgSelector {
    pub fn new() -> Self {
        Self::with_config(config::shared())
    }

    pub fn with_config(config: Arc<Config>) -> Self {
        Self {
            config,
            id: Field::new(),
            value: Field::new(),
            refined_by: Field::new(),
        }
    }

    /// Points at an external SVG document.
    pub fn set_id(&mut self, id: &str) -> Result<()> {
        self.id.set(Iri::parse(id)?);
        Ok(())
    }

    /// Embeds the SVG markup.
    pub fn set_value(&mut self, svg: &str) {
        self.value.set(svg.to_string());
    }
}

impl Node for SvgSelector {
    fn kind(&self) -> &'static str {
        "SvgSelector"
    }

    fn entries(&self) -> Vec<(&str, Entry<'_>)> {
        vec![
            ("id", self.id.entry()),
            ("type", Entry::Text("SvgSelector")),
            ("value", self.value.entry()),
            ("refinedBy", self.refined_by.entry()),
        ]
    }

    fn config(&self) -> Option<&Arc<Config>> {
        Some(&self.config)
    }

    fn rebind(&mut self, config: &Arc<Config>) {
        self.config = Arc::clone(config);
        self.refined_by.rebind(config);
    }
}

/// Selects everything from the start of one selection to the end of
/// another.
#[derive(Debug, Clone)]
pub struct RangeSelector {
    pub(crate) config: Arc<Config>,
    pub(crate) start_selector: Field<Selector>,
    pub(crate) end_selector: Field<Selector>,
    pub(crate) refined_by: Field<Selector>,
}

impl Default for RangeSelector {
    fn default() -> Self {
        Self::new()
    }
}

impl RangeSelector {
    pub fn new() -> Self {
        Self::with_config(config::shared())
    }

    pub fn with_config(config: Arc<Config>) -> Self {
        Self {
            config,
            start_selector: Field::required("A RangeSelector must have exactly 1 startSelector."),
            end_selector: Field::required("A RangeSelector must have exactly 1 endSelector."),
            refined_by: Field::new(),
        }
    }

    pub fn set_start_selector<M: Member<Selector>>(&mut self, selector: M) -> Result<&mut M::Handle> {
        let config = Arc::clone(&self.config);
        attach(&mut self.start_selector, selector, &config, Attach::Set, "RangeSelector", any)
    }

    pub fn set_end_selector<M: Member<Selector>>(&mut self, selector: M) -> Result<&mut M::Handle> {
        let config = Arc::clone(&self.config);
        attach(&mut self.end_selector, selector, &config, Attach::Set, "RangeSelector", any)
    }
}

impl Node for RangeSelector {
    fn kind(&self) -> &'static str {
        "RangeSelector"
    }

    fn entries(&self) -> Vec<(&str, Entry<'_>)> {
        vec![
            ("type", Entry::Text("RangeSelector")),
            ("startSelector", self.start_selector.entry()),
            ("endSelector", self.end_selector.entry()),
            ("refinedBy", self.refined_by.entry()),
        ]
    }

    fn config(&self) -> Option<&Arc<Config>> {
        Some(&self.config)
    }

    fn rebind(&mut self, config: &Arc<Config>) {
        self.config = Arc::clone(config);
        self.start_selector.rebind(config);
        self.end_selector.rebind(config);
        self.refined_by.rebind(config);
    }
}

/// A point in space and/or time (IIIF).
///
/// `x` and `y` are relative to the target's dimensions, `t` is in seconds
/// relative to its duration.
#[derive(Debug, Clone)]
pub struct PointSelector {
    pub(crate) config: Arc<Config>,
    pub(crate) x: Field<u64>,
    pub(crate) y: Field<u64>,
    pub(crate) t: Field<f64>,
    pub(crate) refined_by: Field<Selector>,
}

impl Default for PointSelector {
    fn default() -> Self {
        Self::new()
    }
}

impl PointSelector {
    pub fn new() -> Self {
        Self::with_config(config::shared())
    }

    pub fn with_config(config: Arc<Config>) -> Self {
        Self {
            config,
            x: Field::new(),
            y: Field::new(),
            t: Field::new(),
            refined_by: Field::new(),
        }
    }

    pub fn set_x(&mut self, x: u64) {
        self.x.set(x);
    }

    pub fn set_y(&mut self, y: u64) {
        self.y.set(y);
    }

    pub fn set_t(&mut self, t: f64) {
        self.t.set(t);
    }
}

impl Node for PointSelector {
    fn kind(&self) -> &'static str {
        "PointSelector"
    }

    fn entries(&self) -> Vec<(&str, Entry<'_>)> {
        vec![
            ("type", Entry::Text("PointSelector")),
            ("x", self.x.entry()),
            ("y", self.y.entry()),
            ("t", self.t.entry()),
            ("refinedBy", self.refined_by.entry()),
        ]
    }

    fn config(&self) -> Option<&Arc<Config>> {
        Some(&self.config)
    }

    fn rebind(&mut self, config: &Arc<Config>) {
        self.config = Arc::clone(config);
        self.refined_by.rebind(config);
    }
}

/// The parameters of a IIIF Image API request.
///
/// # Examples
///
/// ```
/// use wadm_core::{Document, Formatted, ImageApiSelector};
///
/// let mut selector = ImageApiSelector::new();
/// selector.set_region("pct:0,0,50,50");
/// selector.set_rotation(90);
/// selector.set_format("image/png").unwrap();
///
/// let json = selector.to_json().unwrap();
/// assert_eq!(json["rotation"], 90);
/// ```
#[derive(Debug, Clone)]
pub struct ImageApiSelector {
    pub(crate) config: Arc<Config>,
    pub(crate) region: Field<String>,
    pub(crate) size: Field<String>,
    pub(crate) rotation: Field<Scalar>,
    pub(crate) quality: Field<String>,
    pub(crate) format: MediaFormat,
    pub(crate) refined_by: Field<Selector>,
}

impl Default for ImageApiSelector {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageApiSelector {
    pub fn new() -> Self {
        Self::with_config(config::shared())
    }

    pub fn with_config(config: Arc<Config>) -> Self {
        Self {
            config,
            region: Field::new(),
            size: Field::new(),
            rotation: Field::new(),
            quality: Field::new(),
            format: MediaFormat::optional(),
            refined_by: Field::new(),
        }
    }

    pub fn set_region(&mut self, region: &str) {
        self.region.set(region.to_string());
    }

    pub fn set_size(&mut self, size: &str) {
        self.size.set(size.to_string());
    }

    /// Degrees, or a string such as `"!90"` for mirrored rotation.
    pub fn set_rotation(&mut self, rotation: impl Into<Scalar>) {
        self.rotation.set(rotation.into());
    }

    pub fn set_quality(&mut self, quality: &str) {
        self.quality.set(quality.to_string());
    }
}

impl Node for ImageApiSelector {
    fn kind(&self) -> &'static str {
        "ImageApiSelector"
    }

    fn entries(&self) -> Vec<(&str, Entry<'_>)> {
        let mut out = vec![
            ("type", Entry::Text("ImageApiSelector")),
            ("region", self.region.entry()),
            ("size", self.size.entry()),
            ("rotation", self.rotation.entry()),
            ("quality", self.quality.entry()),
        ];
        self.format.extend(&mut out);
        out.push(("refinedBy", self.refined_by.entry()));
        out
    }

    fn config(&self) -> Option<&Arc<Config>> {
        Some(&self.config)
    }

    fn rebind(&mut self, config: &Arc<Config>) {
        self.config = Arc::clone(config);
        self.refined_by.rebind(config);
    }
}

impl Formatted for ImageApiSelector {
    fn media_format(&self) -> &MediaFormat {
        &self.format
    }

    fn media_format_mut(&mut self) -> &mut MediaFormat {
        &mut self.format
    }
}

refinable!(Selector =>
    FragmentSelector,
    CssSelector,
    XPathSelector,
    TextQuoteSelector,
    TextPositionSelector,
    DataPositionSelector,
    SvgSelector,
    RangeSelector,
    PointSelector,
    ImageApiSelector,
);

render_node!(
    FragmentSelector,
    CssSelector,
    XPathSelector,
    TextQuoteSelector,
    TextPositionSelector,
    DataPositionSelector,
    SvgSelector,
    RangeSelector,
    PointSelector,
    ImageApiSelector,
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldState;

    #[test]
    fn test_xywh_value() {
        let mut selector = FragmentSelector::new();
        selector.set_xywh(100, 100, 300, 300);
        assert_eq!(selector.value.first().map(String::as_str), Some("xywh=100,100,300,300"));
    }

    #[test]
    fn test_second_refinement_upgrades_to_list() {
        let mut selector = FragmentSelector::new();
        selector.add_refined_by(TextQuoteSelector::new()).unwrap();
        assert!(matches!(selector.refinements().state(), FieldState::One(_)));

        selector.add_refined_by(CssSelector::new()).unwrap();
        match selector.refinements().state() {
            FieldState::Many([first, second]) => {
                assert_eq!(first.kind(), "TextQuoteSelector");
                assert_eq!(second.kind(), "CssSelector");
            }
            other => panic!("unexpected state: {other:?}"),
        }
    }

    #[test]
    fn test_refinement_handle_is_the_child() {
        let mut range = RangeSelector::new();
        let start = range.set_start_selector(XPathSelector::new()).unwrap();
        start.set_value("//table[1]/tr[1]/td[2]");
        let end = range.set_end_selector(XPathSelector::new()).unwrap();
        end.add_refined_by(TextPositionSelector::new()).unwrap().set_start(2);
        assert_eq!(range.start_selector.len(), 1);
        assert!(range.end_selector.marker().is_none());
    }

    #[test]
    fn test_conforms_to_is_uri_checked() {
        let mut selector = FragmentSelector::new();
        assert!(selector.set_conforms_to("http://www.w3.org/TR/media frags/").is_err());
        selector.set_conforms_to("http://www.w3.org/TR/media-frags/").unwrap();
    }

    #[test]
    fn test_point_time_is_optional() {
        let mut point = PointSelector::new();
        point.set_x(10);
        let keys: Vec<&str> = point
            .entries()
            .into_iter()
            .filter(|(_, entry)| !matches!(entry, Entry::Absent))
            .map(|(key, _)| key)
            .collect();
        assert_eq!(keys, ["type", "x"]);
    }
}
