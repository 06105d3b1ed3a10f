//! Advisories are not errors: the setter succeeds and one warning is
//! emitted through `tracing`.

use std::fmt;
use std::sync::{Arc, Mutex};

use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
use wadm_core::*;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Collects the message of every WARN event.
#[derive(Clone, Default)]
struct Warnings(Arc<Mutex<Vec<String>>>);

struct MessageVisitor<'a>(&'a mut String);

impl Visit for MessageVisitor<'_> {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            *self.0 = format!("{value:?}");
        }
    }
}

impl<S: Subscriber> Layer<S> for Warnings {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() == Level::WARN {
            let mut message = String::new();
            event.record(&mut MessageVisitor(&mut message));
            self.0.lock().unwrap().push(message);
        }
    }
}

fn warnings_during(action: impl FnOnce()) -> Vec<String> {
    let warnings = Warnings::default();
    let subscriber = tracing_subscriber::registry().with(warnings.clone());
    tracing::subscriber::with_default(subscriber, action);
    warnings.0.lock().unwrap().clone()
}

// ---------------------------------------------------------------------------
// Timestamps
// ---------------------------------------------------------------------------

#[test]
fn test_utc_created_is_silent() {
    let mut anno = Annotation::new();
    let warnings = warnings_during(|| anno.set_created("2015-01-28T12:00:00Z").unwrap());
    assert!(warnings.is_empty(), "{warnings:?}");
}

#[test]
fn test_offset_created_warns_once() {
    let mut anno = Annotation::new();
    let warnings = warnings_during(|| anno.set_created("2015-01-28T12:00:00+01:00").unwrap());
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("UTC"), "{warnings:?}");
    assert_eq!(
        anno.to_json_with(&RenderOptions::diagnostic()).unwrap()["created"],
        "2015-01-28T12:00:00+01:00"
    );
}

#[test]
fn test_offset_modified_warns_once() {
    let mut body = TextualBody::new();
    let warnings = warnings_during(|| body.set_modified("2015-02-01T08:30:00-05:00").unwrap());
    assert_eq!(warnings.len(), 1);
}

#[test]
fn test_rejected_timestamp_does_not_warn() {
    let mut anno = Annotation::new();
    let warnings = warnings_during(|| assert!(anno.set_created("2015-01-28").is_err()));
    assert!(warnings.is_empty(), "{warnings:?}");
}

// ---------------------------------------------------------------------------
// Vocabulary terms
// ---------------------------------------------------------------------------

#[test]
fn test_standard_motivation_is_silent() {
    let mut anno = Annotation::new();
    let warnings = warnings_during(|| anno.add_motivation("commenting"));
    assert!(warnings.is_empty(), "{warnings:?}");
}

#[test]
fn test_custom_motivation_warns_once() {
    let mut anno = Annotation::new();
    let warnings = warnings_during(|| anno.add_motivation("oa:transcribing"));
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("motivation vocabulary"), "{warnings:?}");
}

#[test]
fn test_custom_purpose_warns_once() {
    let mut body = TextualBody::new();
    let warnings = warnings_during(|| {
        body.add_purpose("tagging");
        body.add_purpose("translating");
    });
    assert_eq!(warnings.len(), 1);
}

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

#[test]
fn test_collection_urn_warns_once() {
    let mut collection = AnnotationCollection::new();
    let warnings = warnings_during(|| {
        collection
            .set_id("urn:uuid:dc48bd9a-43a8-4a13-9bb7-4ac1ec5e7cd4")
            .unwrap();
    });
    assert_eq!(warnings.len(), 1);
    assert_eq!(collection.id(), Some("urn:uuid:dc48bd9a-43a8-4a13-9bb7-4ac1ec5e7cd4"));
}

#[test]
fn test_annotation_urn_is_an_error_not_a_warning() {
    let mut anno = Annotation::new();
    let warnings = warnings_during(|| {
        assert!(anno.set_id("urn:uuid:dc48bd9a-43a8-4a13-9bb7-4ac1ec5e7cd4").is_err());
    });
    assert!(warnings.is_empty(), "{warnings:?}");
}
