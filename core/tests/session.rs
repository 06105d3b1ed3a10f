//! The process-wide default is global state, so these tests live in their
//! own binary and run as a single test.

use wadm_core::*;

#[test]
fn test_install_applies_to_new_nodes_only() {
    let before = Annotation::new();

    let installed = config::install(
        Config::default()
            .with_base_url("http://example.org/annotations/")
            .with_resource_type("Audio"),
    );
    assert_eq!(installed.base_url, "http://example.org/annotations/");

    let mut after = Annotation::new();
    after.set_id_under_base("anno1").unwrap();
    assert_eq!(after.id(), Some("http://example.org/annotations/anno1"));

    let mut sound = ExternalResource::new();
    sound.set_type("Audio").unwrap();

    // Snapshot taken before the install.
    assert_eq!(before.session().base_url, "https://");

    config::install(Config::default());
    let mut late = ExternalResource::new();
    assert!(late.set_type("Audio").is_err());
}
