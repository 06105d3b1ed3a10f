//! Building a single annotation.
//!
//! Creates a comment on a web page with a textual body, a creator and a
//! quoted passage as target, then prints the document.
//!
//! # Usage
//!
//! ```bash
//! cargo run -p wadm-demos --example basic_annotation
//! ```

use wadm_core::{
    Agent, Anchored, Annotation, Document, Formatted, Identified, Lifecycle, Localized,
    RenderOptions, SpecificResource, TextQuoteSelector, TextualBody,
};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wadm_core=info".into()),
        )
        .with_target(false)
        .init();

    let mut anno = Annotation::new();
    anno.set_id("http://example.org/anno1").unwrap();
    anno.add_motivation("commenting");
    anno.set_created_now().unwrap();

    let creator = anno.set_creator(Agent::person()).unwrap();
    creator.set_id("http://example.org/user1").unwrap();
    creator.set_name("A. Person");
    creator.set_nickname("aperson");

    let body = anno.set_body(TextualBody::new()).unwrap();
    body.set_value("<p>Worth re-reading.</p>");
    body.set_format("text/html").unwrap();
    body.set_language("en").unwrap();

    let target = anno.set_target(SpecificResource::new()).unwrap();
    target.set_source("http://example.org/page1").unwrap();
    let quote = target.set_selector(TextQuoteSelector::new()).unwrap();
    quote.set_exact("anotation");
    quote.set_prefix("this is an ");
    quote.set_suffix(" that has some");

    println!("{}", anno.json_dumps(&RenderOptions::default()).unwrap());
}
