use std::sync::Arc;

use serde_json::{Value, json};
use wadm_core::*;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn round_trip(document: &Value) -> Value {
    rehydrate::from_json(document).unwrap().to_json().unwrap()
}

fn minimal(extra: Value) -> Value {
    let mut document = json!({
        "@context": "http://www.w3.org/ns/anno.jsonld",
        "id": "http://example.org/anno1",
        "type": "Annotation",
        "target": "http://example.com/page1"
    });
    if let (Some(map), Value::Object(extra)) = (document.as_object_mut(), extra) {
        map.extend(extra);
    }
    document
}

// ---------------------------------------------------------------------------
// Documents
// ---------------------------------------------------------------------------

#[test]
fn test_context_list_is_preserved() {
    let document = json!({
        "@context": [
            "http://www.w3.org/ns/anno.jsonld",
            "http://iiif.io/api/presentation/3/context.json"
        ],
        "id": "http://example.org/anno1",
        "type": "Annotation",
        "target": "http://example.com/page1"
    });
    let rehydrated = rehydrate::from_json(&document).unwrap();
    assert!(matches!(rehydrated.context, Some(Context::Multiple(ref list)) if list.len() == 2));
    assert_eq!(rehydrated.to_json().unwrap(), document);
}

#[test]
fn test_singleton_arrays_stay_arrays() {
    let document = minimal(json!({
        "target": ["http://example.com/page1"],
        "motivation": ["commenting"],
        "body": [{"type": "TextualBody", "value": "note", "language": ["en"]}]
    }));
    assert_eq!(round_trip(&document), document);
}

#[test]
fn test_unknown_keys_are_dropped() {
    let document = minimal(json!({"x-internal": {"score": 3}}));
    let output = round_trip(&document);
    assert!(output.get("x-internal").is_none());
    assert_eq!(output, minimal(json!({})));
}

#[test]
fn test_from_str() {
    let text = r#"{
        "@context": "http://www.w3.org/ns/anno.jsonld",
        "id": "http://example.org/anno1",
        "type": "Annotation",
        "bodyValue": "Comment text",
        "target": "http://example.org/target1"
    }"#;
    let rehydrated = rehydrate::from_str(text).unwrap();
    let anno = rehydrated.root.as_annotation().unwrap();
    assert_eq!(anno.id(), Some("http://example.org/anno1"));
    assert_eq!(rehydrated.to_json().unwrap()["bodyValue"], "Comment text");
}

#[test]
fn test_page_with_embedded_collection() {
    let document = json!({
        "@context": "http://www.w3.org/ns/anno.jsonld",
        "id": "http://example.org/page1",
        "type": "AnnotationPage",
        "partOf": {
            "id": "http://example.org/collection1",
            "label": "Steampunk Annotations",
            "total": 42023
        },
        "next": "http://example.org/page2",
        "startIndex": 0,
        "items": [
            {
                "id": "http://example.org/anno1",
                "type": "Annotation",
                "body": "http://example.net/comment1",
                "target": "http://example.com/book/chapter1"
            }
        ]
    });
    let rehydrated = rehydrate::from_json(&document).unwrap();
    let page = rehydrated.root.as_page().unwrap();
    assert_eq!(page.items().len(), 1);
    assert!(rehydrated.root.as_annotation().is_none());
    assert_eq!(rehydrated.to_json().unwrap(), document);
}

#[test]
fn test_missing_context_takes_session_default() {
    let mut document = minimal(json!({}));
    if let Some(map) = document.as_object_mut() {
        map.remove("@context");
    }
    let rehydrated = rehydrate::from_json(&document).unwrap();
    assert!(rehydrated.context.is_none());
    assert_eq!(
        rehydrated.to_json().unwrap()["@context"],
        "http://www.w3.org/ns/anno.jsonld"
    );
}

#[test]
fn test_custom_session() {
    let document = minimal(json!({
        "body": {"id": "http://example.org/sound1.mp3", "type": "Audio"}
    }));
    assert!(rehydrate::from_json(&document).is_err());

    let config = Arc::new(Config::default().with_resource_type("Audio"));
    let rehydrated = rehydrate::from_json_with(&document, config).unwrap();
    assert_eq!(rehydrated.to_json().unwrap(), document);
}

// ---------------------------------------------------------------------------
// Rejections
// ---------------------------------------------------------------------------

#[test]
fn test_validation_errors_propagate() {
    let document = minimal(json!({"created": "2015-01-28"}));
    assert!(matches!(
        rehydrate::from_json(&document),
        Err(Error::Validation(ValidationError::InvalidTimestamp(_)))
    ));

    let document = minimal(json!({"target": "http://example.com/a page"}));
    assert!(matches!(
        rehydrate::from_json(&document),
        Err(Error::Validation(ValidationError::InvalidUri { .. }))
    ));
}

#[test]
fn test_unknown_selector_type() {
    let document = minimal(json!({
        "target": {
            "source": "http://example.org/page1",
            "selector": {"type": "MagicSelector", "value": "x"}
        }
    }));
    let err = rehydrate::from_json(&document).unwrap_err();
    assert!(matches!(err, Error::Rehydrate(ref message) if message.contains("MagicSelector")));
}

#[test]
fn test_selector_refined_by_state() {
    let document = minimal(json!({
        "target": {
            "source": "http://example.org/page1",
            "selector": {
                "type": "FragmentSelector",
                "value": "page=10",
                "refinedBy": {"type": "HttpRequestState", "value": "Accept: application/pdf"}
            }
        }
    }));
    assert!(matches!(
        rehydrate::from_json(&document),
        Err(Error::TypeMismatch { child: "HttpRequestState", .. })
    ));
}

#[test]
fn test_choice_target_is_rejected() {
    let document = minimal(json!({
        "target": {"type": "Choice", "items": ["http://example.org/a"]}
    }));
    assert!(matches!(
        rehydrate::from_json(&document),
        Err(Error::TypeMismatch { child: "Choice", owner: "Annotation" })
    ));
}

#[test]
fn test_unsupported_root() {
    for document in [json!({"type": "Canvas"}), json!({"id": "http://example.org/x"}), json!([1, 2])] {
        assert!(matches!(
            rehydrate::from_json(&document),
            Err(Error::Rehydrate(_))
        ));
    }
}

#[test]
fn test_malformed_text() {
    assert!(matches!(rehydrate::from_str("{not json"), Err(Error::Json(_))));
}
