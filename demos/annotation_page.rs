//! Paging a collection of annotations.
//!
//! Builds an `AnnotationCollection` whose first page is embedded, saves the
//! page to a temporary file and reads it back.
//!
//! # Usage
//!
//! ```bash
//! cargo run -p wadm-demos --example annotation_page
//! ```

use wadm_core::{
    AnnotationCollection, AnnotationPage, Document, Identified, RenderOptions, rehydrate,
};

const TARGETS: [&str; 3] = [
    "http://example.com/book/chapter1",
    "http://example.com/book/chapter2",
    "http://example.com/book/chapter3",
];

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wadm_core=debug".into()),
        )
        .with_target(false)
        .init();

    let mut page = AnnotationPage::new();
    page.set_id("http://example.org/page1").unwrap();
    page.set_next("http://example.org/page2").unwrap();
    page.set_start_index(0);

    for (n, target) in TARGETS.iter().enumerate() {
        let anno = page.add_annotation();
        anno.set_id(&format!("http://example.org/anno{}", n + 1))
            .unwrap();
        anno.set_body(format!("http://example.net/comment{}", n + 1).as_str())
            .unwrap();
        anno.set_target(*target).unwrap();
    }

    let collection = page.set_part_of(AnnotationCollection::new()).unwrap();
    collection.set_id("http://example.org/collection1").unwrap();
    collection.add_label("Steampunk Annotations");
    collection.set_total(TARGETS.len() as u64);
    collection.omit_type();

    let path = std::env::temp_dir().join("wadm_annotation_page.json");
    page.json_save(&path, &RenderOptions::default()).unwrap();
    println!("Saved page to {}", path.display());

    let rehydrated = rehydrate::read_file(&path).unwrap();
    let items = rehydrated
        .root
        .as_page()
        .map(|page| page.items().len())
        .unwrap_or_default();
    println!("Read back {items} annotations");
    let identical = rehydrated.to_json().unwrap() == page.to_json().unwrap();
    println!("Round trip identical: {identical}");

    std::fs::remove_file(&path).unwrap();
}
