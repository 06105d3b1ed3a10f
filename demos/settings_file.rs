//! Session configuration from a settings file.
//!
//! Writes a YAML settings file that registers an extra resource type and
//! language, loads it into a `Config`, and installs it as the process
//! default for nodes created afterwards.
//!
//! # Usage
//!
//! ```bash
//! cargo run -p wadm-demos --example settings_file
//! ```

use std::sync::Arc;

use wadm_core::{
    Annotation, Config, Document, ExternalResource, Formatted, Identified, Localized, config,
};
use wadm_registry::Settings;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wadm_core=debug,wadm_registry=debug".into()),
        )
        .with_target(false)
        .init();

    let dir = std::env::temp_dir().join("wadm_settings_example");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("wadm.yml");

    let settings = Settings {
        base_url: Some("http://example.org/annotations/".to_string()),
        resource_types: vec!["Audio".to_string()],
        languages: vec!["sv".to_string()],
        ..Settings::default()
    };
    settings.save(&path).unwrap();
    println!("Wrote {}", path.display());

    let loaded = Config::load(&path).unwrap();
    println!("Base URL: {}", loaded.base_url);

    // A separate session leaves the process default alone.
    let mut isolated = Annotation::with_config(Arc::new(loaded.clone()));
    isolated.set_id_under_base("isolated").unwrap();
    println!("Isolated id: {}", isolated.id().unwrap_or_default());

    config::install(loaded);

    let mut anno = Annotation::new();
    anno.set_id_under_base("anno1").unwrap();
    let body = anno.set_body(ExternalResource::new()).unwrap();
    body.set_id("http://example.org/podcast1.mp3").unwrap();
    body.set_type("Audio").unwrap();
    body.set_format("audio/mpeg").unwrap();
    body.set_language("sv").unwrap();
    anno.set_target("http://example.com/transcript1").unwrap();

    println!("{}", anno.json_dumps(&Default::default()).unwrap());

    std::fs::remove_dir_all(&dir).unwrap();
}
