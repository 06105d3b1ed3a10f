//! Builder configuration and YAML settings files.
//!
//! A [`Config`] is an immutable value describing one builder session: the
//! base URL used when identifiers are given as suffixes, the `@context`
//! injected at the top of every document, the fast-mode switch, and the
//! lookup tables. [`Settings`] is its on-disk form.
//!
//! # Example YAML
//!
//! ```yaml
//! base_url: "https://example.org/annotations/"
//! context:
//!   - http://www.w3.org/ns/anno.jsonld
//!   - http://iiif.io/api/presentation/3/context.json
//! fast_mode: false
//! languages:
//!   - de-DE-u-co-phonebk
//! media_types:
//!   - application/x-custom
//! resource_types:
//!   - Audio
//! media_type_table: media-types.yaml
//! ```

use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::tables::{LanguageTags, MediaTypes, Vocabulary};

/// Context injected when none is configured.
pub const DEFAULT_CONTEXT: &str = "http://www.w3.org/ns/anno.jsonld";

/// Base URL used for identifier suffixes when none is configured.
pub const DEFAULT_BASE_URL: &str = "https://";

/// The `@context` of a document: one identifier or an ordered list.
///
/// Serializes untagged, so it round-trips as a JSON string or array.
///
/// # Examples
///
/// ```
/// use wadm_registry::Context;
///
/// let single = Context::default();
/// assert_eq!(single, Context::Single("http://www.w3.org/ns/anno.jsonld".into()));
///
/// let many: Context = vec!["http://a.example/ctx".to_string()].into();
/// assert!(matches!(many, Context::Multiple(_)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Context {
    /// A single context IRI.
    Single(String),
    /// Several context IRIs, in order.
    Multiple(Vec<String>),
}

impl Default for Context {
    fn default() -> Self {
        Context::Single(DEFAULT_CONTEXT.to_string())
    }
}

impl From<&str> for Context {
    fn from(value: &str) -> Self {
        Context::Single(value.to_string())
    }
}

impl From<String> for Context {
    fn from(value: String) -> Self {
        Context::Single(value)
    }
}

impl From<Vec<String>> for Context {
    fn from(values: Vec<String>) -> Self {
        Context::Multiple(values)
    }
}

/// Immutable configuration for one builder session.
///
/// Nodes keep a shared handle to the `Config` they were created with, so a
/// value is built once and then only read.
///
/// # Examples
///
/// ```
/// use wadm_registry::Config;
///
/// let config = Config::default()
///     .with_base_url("https://example.org/")
///     .with_resource_type("Audio")
///     .with_language("de-DE-u-co-phonebk");
///
/// assert_eq!(config.base_url, "https://example.org/");
/// assert!(config.vocabulary.resource_types.contains("Audio"));
/// assert!(config.vocabulary.languages.contains("de-DE-u-co-phonebk"));
/// assert!(!config.fast_mode);
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Prefix joined with identifier suffixes.
    pub base_url: String,
    /// Context written as the first key of every document.
    pub context: Context,
    /// Treat obligation markers as plain absence.
    pub fast_mode: bool,
    /// Injected lookup tables.
    pub vocabulary: Vocabulary,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            context: Context::default(),
            fast_mode: false,
            vocabulary: Vocabulary::default(),
        }
    }
}

impl Config {
    /// Loads a settings file and applies it over the defaults.
    ///
    /// Table paths inside the file are resolved relative to the file's
    /// directory.
    ///
    /// # Errors
    ///
    /// Returns any error from [`Settings::load`] or from loading the
    /// referenced tables.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let settings = Settings::load(path)?;
        settings.apply(Config::default(), path.parent())
    }

    /// Sets the base URL used for identifier suffixes.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Sets the context injected into documents.
    pub fn with_context(mut self, context: impl Into<Context>) -> Self {
        self.context = context.into();
        self
    }

    /// Switches fast mode on or off.
    pub fn with_fast_mode(mut self, fast_mode: bool) -> Self {
        self.fast_mode = fast_mode;
        self
    }

    /// Accepts an additional generic resource `type`.
    pub fn with_resource_type(mut self, resource_type: impl Into<String>) -> Self {
        self.vocabulary.resource_types.push(resource_type);
        self
    }

    /// Accepts an additional language tag.
    pub fn with_language(mut self, tag: impl Into<String>) -> Self {
        self.vocabulary.languages.push(tag);
        self
    }

    /// Accepts an additional media type.
    pub fn with_media_type(mut self, media_type: impl Into<String>) -> Self {
        self.vocabulary.media_types.insert(media_type);
        self
    }

    /// Replaces the whole vocabulary.
    pub fn with_vocabulary(mut self, vocabulary: Vocabulary) -> Self {
        self.vocabulary = vocabulary;
        self
    }
}

/// On-disk settings, applied over [`Config::default`].
///
/// Every field is optional and an unset field leaves the config as it
/// was. List fields add entries to the bundled tables
/// rather than replacing them. Use `language_table` / `media_type_table`
/// to replace a table entirely.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Base URL for identifier suffixes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Document context.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<Context>,
    /// Fast-mode switch.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fast_mode: Option<bool>,
    /// Extra language tags.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub languages: Vec<String>,
    /// Extra media types (`category/subtype`).
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub media_types: Vec<String>,
    /// Extra generic resource types.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub resource_types: Vec<String>,
    /// Replacement language table (one tag per line).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language_table: Option<PathBuf>,
    /// Replacement media type table (text or YAML/JSON mapping).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_type_table: Option<PathBuf>,
}

impl Settings {
    /// Loads settings from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::RegistryError::IoError) if the file cannot
    /// be read, or [`YamlError`](crate::RegistryError::YamlError) if parsing
    /// fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path.as_ref())?;
        let reader = BufReader::new(file);
        let settings = serde_yaml::from_reader(reader)?;
        tracing::debug!(path = %path.as_ref().display(), "Loaded settings");
        Ok(settings)
    }

    /// Saves the settings as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::RegistryError::IoError) if the file cannot
    /// be written, or [`YamlError`](crate::RegistryError::YamlError) if
    /// serialization fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }

    /// Applies these settings over `config`.
    ///
    /// Relative table paths are joined onto `base_dir` when one is given.
    ///
    /// # Errors
    ///
    /// Returns an error if a referenced table cannot be loaded.
    pub fn apply(&self, mut config: Config, base_dir: Option<&Path>) -> Result<Config> {
        let resolve = |p: &Path| match base_dir {
            Some(dir) if p.is_relative() => dir.join(p),
            _ => p.to_path_buf(),
        };

        if let Some(base_url) = &self.base_url {
            config.base_url = base_url.clone();
        }
        if let Some(context) = &self.context {
            config.context = context.clone();
        }
        if let Some(fast_mode) = self.fast_mode {
            config.fast_mode = fast_mode;
        }

        if let Some(table) = &self.language_table {
            config.vocabulary.languages = LanguageTags::load(resolve(table))?;
        }
        if let Some(table) = &self.media_type_table {
            config.vocabulary.media_types = MediaTypes::load(resolve(table))?;
        }
        for tag in &self.languages {
            config.vocabulary.languages.push(tag.as_str());
        }
        for media_type in &self.media_types {
            config.vocabulary.media_types.insert(media_type.as_str());
        }
        for resource_type in &self.resource_types {
            config.vocabulary.resource_types.push(resource_type.as_str());
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.base_url, "https://");
        assert_eq!(config.context, Context::Single(DEFAULT_CONTEXT.into()));
        assert!(!config.fast_mode);
    }

    #[test]
    fn test_context_serializes_untagged() {
        let single = serde_json::to_value(Context::default()).unwrap();
        assert_eq!(single, serde_json::json!("http://www.w3.org/ns/anno.jsonld"));

        let many = Context::from(vec!["a".to_string(), "b".to_string()]);
        let value = serde_json::to_value(&many).unwrap();
        assert_eq!(value, serde_json::json!(["a", "b"]));
        let back: Context = serde_json::from_value(value).unwrap();
        assert_eq!(back, many);
    }

    #[test]
    fn test_settings_parse_partial_yaml() {
        let yaml = "base_url: https://example.org/\nresource_types: [Audio]\n";
        let settings: Settings = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(settings.base_url.as_deref(), Some("https://example.org/"));
        assert!(settings.context.is_none());
        assert!(settings.fast_mode.is_none());

        let config = settings.apply(Config::default(), None).unwrap();
        assert_eq!(config.base_url, "https://example.org/");
        assert!(config.vocabulary.resource_types.contains("Audio"));
        assert!(config.vocabulary.resource_types.contains("Image"));
    }

    #[test]
    fn test_settings_context_list() {
        let yaml = "context:\n  - http://a.example/1\n  - http://a.example/2\nfast_mode: true\n";
        let settings: Settings = serde_yaml::from_str(yaml).unwrap();
        let config = settings.apply(Config::default(), None).unwrap();
        assert!(config.fast_mode);
        assert_eq!(
            config.context,
            Context::Multiple(vec!["http://a.example/1".into(), "http://a.example/2".into()])
        );
    }

    #[test]
    fn test_settings_without_fast_mode_keep_it() {
        let settings: Settings = serde_yaml::from_str("base_url: https://example.org/\n").unwrap();
        let config = settings
            .apply(Config::default().with_fast_mode(true), None)
            .unwrap();
        assert!(config.fast_mode);

        let settings: Settings = serde_yaml::from_str("fast_mode: false\n").unwrap();
        let config = settings
            .apply(Config::default().with_fast_mode(true), None)
            .unwrap();
        assert!(!config.fast_mode);
    }
}
