//! States: how to retrieve the representation of a source that the
//! annotation was made against.
//!
//! A state's `refinedBy` may hold further states or selectors, so its slot
//! is [`Refinement`] rather than [`State`].
//!
//! # Examples
//!
//! ```
//! use wadm_core::{Document, FragmentSelector, HttpRequestState, Refinable, TimeState};
//!
//! let mut time = TimeState::new();
//! time.add_source_date("2016-02-01T12:05:23Z").unwrap();
//! let request = time.add_refined_by(HttpRequestState::new()).unwrap();
//! request.set_value("Accept: application/pdf");
//! let fragment = request.add_refined_by(FragmentSelector::new()).unwrap();
//! fragment.set_value("page=10");
//!
//! let json = time.to_json().unwrap();
//! assert_eq!(json["refinedBy"]["refinedBy"]["type"], "FragmentSelector");
//! ```

use std::sync::Arc;

use wadm_registry::Config;

use crate::config;
use crate::error::{Result, report};
use crate::field::Field;
use crate::iri::Iri;
use crate::node::{Entry, Member, Node, Render, Slot, render_node, slot_enum};
use crate::obligation::Marker;
use crate::selector::{
    CssSelector, DataPositionSelector, FragmentSelector, ImageApiSelector, PointSelector,
    RangeSelector, Selector, SvgSelector, TextPositionSelector, TextQuoteSelector, XPathSelector,
    refinable,
};
use crate::validate::check_timestamp;

slot_enum! {
    /// A `state` value.
    State {
        Time(TimeState),
        HttpRequest(HttpRequestState),
        Reference(StateReference),
    }
}

/// The `refinedBy` slot of a state: another state or a selector.
#[derive(Debug, Clone)]
pub enum Refinement {
    State(State),
    Selector(Selector),
}

impl Render for Refinement {
    fn entry(&self) -> Entry<'_> {
        match self {
            Refinement::State(state) => state.entry(),
            Refinement::Selector(selector) => selector.entry(),
        }
    }
}

impl Slot for Refinement {
    fn kind(&self) -> &'static str {
        match self {
            Refinement::State(state) => state.kind(),
            Refinement::Selector(selector) => selector.kind(),
        }
    }

    fn rebind(&mut self, config: &Arc<Config>) {
        match self {
            Refinement::State(state) => state.rebind(config),
            Refinement::Selector(selector) => selector.rebind(config),
        }
    }
}

impl Member<Refinement> for Refinement {
    type Handle = Refinement;

    fn into_slot(mut self, config: &Arc<Config>) -> Result<Refinement> {
        self.rebind(config);
        Ok(self)
    }

    fn handle(slot: &mut Refinement) -> Option<&mut Refinement> {
        Some(slot)
    }
}

impl Member<Refinement> for State {
    type Handle = State;

    fn into_slot(self, config: &Arc<Config>) -> Result<Refinement> {
        Ok(Refinement::State(<State as Member<State>>::into_slot(self, config)?))
    }

    fn handle(slot: &mut Refinement) -> Option<&mut State> {
        match slot {
            Refinement::State(state) => Some(state),
            Refinement::Selector(_) => None,
        }
    }
}

impl Member<Refinement> for Selector {
    type Handle = Selector;

    fn into_slot(self, config: &Arc<Config>) -> Result<Refinement> {
        Ok(Refinement::Selector(<Selector as Member<Selector>>::into_slot(self, config)?))
    }

    fn handle(slot: &mut Refinement) -> Option<&mut Selector> {
        match slot {
            Refinement::Selector(selector) => Some(selector),
            Refinement::State(_) => None,
        }
    }
}

/// Lets the node types of `$family` be placed into a [`Refinement`].
macro_rules! refinement_member {
    ($family:ident: $($variant:ident($node:ty)),+ $(,)?) => {
        $(
            impl Member<Refinement> for $node {
                type Handle = $node;

                fn into_slot(self, config: &Arc<Config>) -> Result<Refinement> {
                    Ok(Refinement::$family(<$node as Member<$family>>::into_slot(self, config)?))
                }

                fn handle(slot: &mut Refinement) -> Option<&mut $node> {
                    match slot {
                        Refinement::$family($family::$variant(node)) => Some(&mut **node),
                        _ => None,
                    }
                }
            }
        )+
    };
}

refinement_member!(State:
    Time(TimeState),
    HttpRequest(HttpRequestState),
    Reference(StateReference),
);

refinement_member!(Selector:
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
);

/// The time at which, or interval over which, the source should be
/// interpreted.
///
/// Use either `sourceDate` or the `sourceDateStart`/`sourceDateEnd` pair.
/// Giving one end of the interval makes the other `Required`.
#[derive(Debug, Clone)]
pub struct TimeState {
    pub(crate) config: Arc<Config>,
    pub(crate) source_date: Field<String>,
    pub(crate) source_date_start: Field<String>,
    pub(crate) source_date_end: Field<String>,
    pub(crate) cached: Field<Iri>,
    pub(crate) refined_by: Field<Refinement>,
}

impl Default for TimeState {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeState {
    pub fn new() -> Self {
        Self::with_config(config::shared())
    }

    pub fn with_config(config: Arc<Config>) -> Self {
        Self {
            config,
            source_date: Field::new(),
            source_date_start: Field::new(),
            source_date_end: Field::new(),
            cached: Field::new(),
            refined_by: Field::new(),
        }
    }

    /// Adds an alternative timestamp (append-or-upgrade).
    pub fn add_source_date(&mut self, timestamp: &str) -> Result<()> {
        report(check_timestamp(timestamp)?);
        self.source_date.push(timestamp.to_string());
        Ok(())
    }

    pub fn set_source_date_start(&mut self, timestamp: &str) -> Result<()> {
        report(check_timestamp(timestamp)?);
        self.source_date_start.set(timestamp.to_string());
        if self.source_date_end.is_unset() {
            self.source_date_end.mark(Marker::required(
                "If sourceDateStart is provided then sourceDateEnd must also be provided.",
            ));
        }
        Ok(())
    }

    pub fn set_source_date_end(&mut self, timestamp: &str) -> Result<()> {
        report(check_timestamp(timestamp)?);
        self.source_date_end.set(timestamp.to_string());
        if self.source_date_start.is_unset() {
            self.source_date_start.mark(Marker::required(
                "If sourceDateEnd is provided then sourceDateStart must also be provided.",
            ));
        }
        Ok(())
    }

    /// Adds a link to a cached copy of the source's representation.
    pub fn add_cached(&mut self, cached: &str) -> Result<()> {
        self.cached.push(Iri::parse(cached)?);
        Ok(())
    }
}

impl Node for TimeState {
    fn kind(&self) -> &'static str {
        "TimeState"
    }

    fn entries(&self) -> Vec<(&str, Entry<'_>)> {
        vec![
            ("type", Entry::Text("TimeState")),
            ("sourceDate", self.source_date.entry()),
            ("sourceDateStart", self.source_date_start.entry()),
            ("sourceDateEnd", self.source_date_end.entry()),
            ("cached", self.cached.entry()),
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

/// The HTTP request headers to send to retrieve the representation.
#[derive(Debug, Clone)]
pub struct HttpRequestState {
    pub(crate) config: Arc<Config>,
    pub(crate) value: Field<String>,
    pub(crate) refined_by: Field<Refinement>,
}

impl Default for HttpRequestState {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpRequestState {
    pub fn new() -> Self {
        Self::with_config(config::shared())
    }

    pub fn with_config(config: Arc<Config>) -> Self {
        Self {
            config,
            value: Field::required("An HttpRequestState must have exactly 1 value property."),
            refined_by: Field::new(),
        }
    }

    /// Sets the headers as a single, complete string.
    pub fn set_value(&mut self, headers: &str) {
        self.value.set(headers.to_string());
    }
}

impl Node for HttpRequestState {
    fn kind(&self) -> &'static str {
        "HttpRequestState"
    }

    fn entries(&self) -> Vec<(&str, Entry<'_>)> {
        vec![
            ("type", Entry::Text("HttpRequestState")),
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

/// A state published elsewhere, embedded as `{"id": ...}`.
#[derive(Debug, Clone, PartialEq)]
pub struct StateReference {
    pub(crate) id: Iri,
}

impl StateReference {
    pub fn new(id: &str) -> Result<Self> {
        Ok(Self { id: Iri::parse(id)? })
    }

    pub fn id(&self) -> &str {
        self.id.as_str()
    }
}

impl Node for StateReference {
    fn kind(&self) -> &'static str {
        "StateReference"
    }

    fn entries(&self) -> Vec<(&str, Entry<'_>)> {
        vec![("id", self.id.entry())]
    }
}

refinable!(Refinement => TimeState, HttpRequestState);

render_node!(TimeState, HttpRequestState, StateReference);
