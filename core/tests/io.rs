use serde_json::json;
use tempfile::TempDir;
use wadm_core::*;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn tagged_annotation() -> Annotation {
    let mut anno = Annotation::new();
    anno.set_id("http://example.org/anno1").unwrap();
    anno.add_motivation("tagging");
    let body = anno.set_body(TextualBody::new()).unwrap();
    body.set_value("love");
    body.add_purpose("tagging");
    anno.set_target("http://example.org/photo1").unwrap();
    anno
}

// ---------------------------------------------------------------------------
// Strings
// ---------------------------------------------------------------------------

#[test]
fn test_dumps_pretty_by_default() {
    let anno = tagged_annotation();
    let text = anno.json_dumps(&RenderOptions::default()).unwrap();
    assert!(text.starts_with("{\n  \"@context\""));
    assert_eq!(serde_json::from_str::<serde_json::Value>(&text).unwrap(), anno.to_json().unwrap());
}

#[test]
fn test_dumps_compact_keeps_insertion_order() {
    let anno = tagged_annotation();
    let text = anno
        .json_dumps(&RenderOptions::default().with_compact(true))
        .unwrap();
    assert!(!text.contains('\n'));
    assert!(text.starts_with(
        r#"{"@context":"http://www.w3.org/ns/anno.jsonld","id":"http://example.org/anno1","type":"Annotation","#
    ));
}

#[test]
fn test_dumps_sorted() {
    let anno = tagged_annotation();
    let options = RenderOptions::default()
        .with_compact(true)
        .with_sort_keys(true);
    let text = anno.json_dumps(&options).unwrap();
    let body = text.find(r#""body":{"purpose":"tagging","type":"TextualBody","value":"love"}"#);
    assert!(body.is_some(), "{text}");
    assert!(text.find(r#""body""#) < text.find(r#""id""#));
}

// ---------------------------------------------------------------------------
// Files
// ---------------------------------------------------------------------------

#[test]
fn test_save_then_read_back() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("anno1.json");

    let anno = tagged_annotation();
    anno.json_save(&path, &RenderOptions::default()).unwrap();

    let rehydrated = rehydrate::read_file(&path).unwrap();
    assert_eq!(rehydrated.to_json().unwrap(), anno.to_json().unwrap());
}

#[test]
fn test_save_overwrites() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("anno.json");
    std::fs::write(&path, "{\"stale\": true, \"padding\": \"the previous document was longer\"}").unwrap();

    let mut anno = Annotation::new();
    anno.set_id("http://example.org/anno1").unwrap();
    anno.set_target("http://example.com/page1").unwrap();
    anno.json_save(&path, &RenderOptions::default().with_compact(true))
        .unwrap();

    let written: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(
        written,
        json!({
            "@context": "http://www.w3.org/ns/anno.jsonld",
            "id": "http://example.org/anno1",
            "type": "Annotation",
            "target": "http://example.com/page1"
        })
    );
}

#[test]
fn test_incomplete_document_is_not_written() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("incomplete.json");

    let anno = Annotation::new();
    let err = anno.json_save(&path, &RenderOptions::default()).unwrap_err();
    assert!(matches!(err, Error::MissingRequiredField { .. }));
    assert!(!path.exists());
}

#[test]
fn test_diagnostic_save_writes_markers() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("draft.json");

    let anno = Annotation::new();
    anno.json_save(&path, &RenderOptions::diagnostic()).unwrap();

    let written: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert!(written["id"].get("Required").is_some());
    assert!(written["body"].get("Recommended").is_some());
}

#[test]
fn test_read_missing_file() {
    let dir = TempDir::new().unwrap();
    let err = rehydrate::read_file(dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, Error::Io(_)));
}
