use std::io::Write;
use std::path::Path;

use wadm_registry::{Config, Context, LanguageTags, MediaTypes, RegistryError, Settings};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn write_file(dir: &Path, name: &str, contents: &str) {
    let mut f = std::fs::File::create(dir.join(name)).unwrap();
    f.write_all(contents.as_bytes()).unwrap();
    f.flush().unwrap();
}

// ---------------------------------------------------------------------------
// Settings files
// ---------------------------------------------------------------------------

#[test]
fn test_settings_save_and_load_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("wadm.yml");

    let settings = Settings {
        base_url: Some("https://example.org/".into()),
        context: Some(Context::Multiple(vec![
            "http://www.w3.org/ns/anno.jsonld".into(),
            "http://iiif.io/api/presentation/3/context.json".into(),
        ])),
        fast_mode: Some(true),
        resource_types: vec!["Audio".into()],
        ..Settings::default()
    };
    settings.save(&path).unwrap();

    let loaded = Settings::load(&path).unwrap();
    assert_eq!(loaded, settings);
}

#[test]
fn test_config_load_applies_over_defaults() {
    let dir = tempfile::tempdir().unwrap();
    write_file(
        dir.path(),
        "wadm.yml",
        "base_url: https://example.org/\nlanguages: [tlh]\nmedia_types: [application/x-thing]\n",
    );

    let config = Config::load(dir.path().join("wadm.yml")).unwrap();
    assert_eq!(config.base_url, "https://example.org/");
    assert_eq!(config.context, Context::default());
    assert!(config.vocabulary.languages.contains("tlh"));
    assert!(config.vocabulary.languages.contains("en"));
    assert!(config.vocabulary.media_types.contains("application/x-thing"));
    assert!(config.vocabulary.media_types.contains("image/jpeg"));
}

#[test]
fn test_config_load_resolves_table_paths_relative_to_file() {
    let dir = tempfile::tempdir().unwrap();
    write_file(dir.path(), "langs.txt", "en\nla\n");
    write_file(
        dir.path(),
        "media.yaml",
        "image:\n  - image/png\ntext:\n  - text/plain\n",
    );
    write_file(
        dir.path(),
        "wadm.yml",
        "language_table: langs.txt\nmedia_type_table: media.yaml\n",
    );

    let config = Config::load(dir.path().join("wadm.yml")).unwrap();
    assert_eq!(config.vocabulary.languages.len(), 2);
    assert!(config.vocabulary.languages.contains("la"));
    assert!(!config.vocabulary.languages.contains("fr"));
    assert!(config.vocabulary.media_types.contains("image/png"));
    assert!(!config.vocabulary.media_types.contains("image/jpeg"));
}

#[test]
fn test_config_load_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = Config::load(dir.path().join("absent.yml")).unwrap_err();
    assert!(matches!(err, RegistryError::IoError(_)));
}

#[test]
fn test_settings_load_invalid_yaml() {
    let dir = tempfile::tempdir().unwrap();
    write_file(dir.path(), "bad.yml", "fast_mode: [not, a, bool]\n");
    let err = Settings::load(dir.path().join("bad.yml")).unwrap_err();
    assert!(matches!(err, RegistryError::YamlError(_)));
}

// ---------------------------------------------------------------------------
// Table files
// ---------------------------------------------------------------------------

#[test]
fn test_media_types_load_json_mapping() {
    let dir = tempfile::tempdir().unwrap();
    write_file(
        dir.path(),
        "media.json",
        r#"{"audio": ["audio/mpeg", "audio/ogg"], "application": ["application/pdf"]}"#,
    );
    let types = MediaTypes::load(dir.path().join("media.json")).unwrap();
    assert_eq!(types.len(), 3);
    assert!(types.contains("audio/ogg"));
    assert_eq!(
        types.categories().collect::<Vec<_>>(),
        vec!["application", "audio"]
    );
}

#[test]
fn test_media_types_load_bad_json() {
    let dir = tempfile::tempdir().unwrap();
    write_file(dir.path(), "media.json", "{ not json");
    let err = MediaTypes::load(dir.path().join("media.json")).unwrap_err();
    assert!(matches!(err, RegistryError::JsonError(_)));
}

#[test]
fn test_media_types_load_text() {
    let dir = tempfile::tempdir().unwrap();
    write_file(dir.path(), "media.txt", "# custom\nmodel/gltf+json\n");
    let types = MediaTypes::load(dir.path().join("media.txt")).unwrap();
    assert!(types.contains("model/gltf+json"));
    assert_eq!(types.len(), 1);
}

#[test]
fn test_language_tags_reject_whitespace_entries() {
    let dir = tempfile::tempdir().unwrap();
    write_file(dir.path(), "langs.txt", "en\nfr CA\n");
    let err = LanguageTags::load(dir.path().join("langs.txt")).unwrap_err();
    match err {
        RegistryError::InvalidEntry(entry) => assert_eq!(entry, "fr CA"),
        other => panic!("unexpected error: {other}"),
    }
}
