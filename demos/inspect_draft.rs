//! Inspecting an unfinished annotation.
//!
//! Strict serialization refuses a document with unmet `Required` fields.
//! `inspect` renders the markers in place instead and counts them.
//!
//! # Usage
//!
//! ```bash
//! cargo run -p wadm-demos --example inspect_draft
//! ```

use wadm_core::{
    Anchored, Annotation, Document, Identified, Lifecycle, SpecificResource, TextPositionSelector,
    TimeState,
};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wadm_core=info".into()),
        )
        .with_target(false)
        .init();

    let mut draft = Annotation::new();
    // Accepted with a warning: not UTC.
    draft.set_created("2015-01-28T12:00:00+01:00").unwrap();
    // Kept as an extension term, with a warning.
    draft.add_motivation("oa:transcribing");

    let target = draft.set_target(SpecificResource::new()).unwrap();
    target.set_source("http://example.org/ebook1").unwrap();
    target.set_selector(TextPositionSelector::new()).unwrap().set_start(412);
    target
        .set_state(TimeState::new())
        .unwrap()
        .set_source_date_start("2015-01-01T00:00:00Z")
        .unwrap();

    match draft.to_json() {
        Ok(_) => println!("Draft is complete"),
        Err(err) => println!("Strict serialization failed: {err}"),
    }

    let report = draft.inspect().unwrap();
    println!(
        "{} required and {} recommended fields missing",
        report.missing_required, report.missing_recommended
    );
    println!("{}", serde_json::to_string_pretty(&report.document).unwrap());

    if let Err(err) = draft.set_id("http://example.org/anno 1") {
        println!("Rejected identifier: {err}");
    }
}
