//! Lookup tables consulted by the validation layer.
//!
//! Three tables are injectable: accepted BCP-47 language tags, accepted IANA
//! media types, and the vocabulary of `type` values accepted on generic
//! body/target resources. Each has a bundled default compiled into the crate
//! and can be replaced from a file or extended entry by entry.
//!
//! # Examples
//!
//! ```
//! use wadm_registry::{LanguageTags, MediaTypes, Vocabulary};
//!
//! let vocabulary = Vocabulary::default();
//! assert!(vocabulary.languages.contains("en"));
//! assert!(vocabulary.media_types.contains("image/jpeg"));
//! assert!(vocabulary.resource_types.contains("Image"));
//!
//! let mut tags = LanguageTags::from_text("en\nfr\n");
//! tags.push("de-DE-u-co-phonebk");
//! assert_eq!(tags.len(), 3);
//!
//! let types = MediaTypes::from_text("text/plain\n");
//! assert!(!types.contains("text/html"));
//! ```

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::Path;

use crate::error::{RegistryError, Result};

const BUNDLED_LANGUAGE_TAGS: &str = include_str!("../data/language-tags.txt");
const BUNDLED_MEDIA_TYPES: &str = include_str!("../data/media-types.txt");

/// Default `type` vocabulary for generic bodies and targets.
pub const DEFAULT_RESOURCE_TYPES: [&str; 5] = ["Text", "Video", "Sound", "Image", "Dataset"];

/// Ordered set of accepted BCP-47 language tags.
///
/// Insertion order is kept for listing; membership checks are O(1).
#[derive(Debug, Clone, Default)]
pub struct LanguageTags {
    ordered: Vec<String>,
    index: HashSet<String>,
}

impl LanguageTags {
    /// Returns the table compiled into the crate.
    pub fn bundled() -> Self {
        Self::from_text(BUNDLED_LANGUAGE_TAGS)
    }

    /// Parses one tag per line. Blank lines and `#` comments are skipped.
    pub fn from_text(text: &str) -> Self {
        let mut tags = Self::default();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            tags.push(line);
        }
        tags
    }

    /// Loads a replacement table from a text file with one tag per line.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](RegistryError::IoError) if the file cannot be
    /// read, or [`InvalidEntry`](RegistryError::InvalidEntry) if a line
    /// contains whitespace inside the tag.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        if let Some(bad) = text
            .lines()
            .map(str::trim)
            .find(|line| !line.starts_with('#') && line.contains(char::is_whitespace))
        {
            return Err(RegistryError::InvalidEntry(bad.to_string()));
        }
        Ok(Self::from_text(&text))
    }

    /// Appends a custom tag. Re-adding a known tag is a no-op.
    pub fn push(&mut self, tag: impl Into<String>) {
        let tag = tag.into();
        if self.index.insert(tag.clone()) {
            self.ordered.push(tag);
        }
    }

    /// Returns `true` if `tag` is accepted.
    pub fn contains(&self, tag: &str) -> bool {
        self.index.contains(tag)
    }

    /// Number of accepted tags.
    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    /// Returns `true` if the table holds no tags.
    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }

    /// Iterates tags in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ordered.iter().map(String::as_str)
    }
}

/// Accepted IANA media types, grouped by top-level category.
///
/// The category key is the part before `/` (`image`, `text`, ...); the
/// values are full media type strings such as `image/jpeg`.
#[derive(Debug, Clone, Default)]
pub struct MediaTypes {
    by_category: BTreeMap<String, BTreeSet<String>>,
}

impl MediaTypes {
    /// Returns the table compiled into the crate.
    pub fn bundled() -> Self {
        Self::from_text(BUNDLED_MEDIA_TYPES)
    }

    /// Parses one `category/subtype` per line. Lines without a `/` are
    /// skipped.
    pub fn from_text(text: &str) -> Self {
        let mut types = Self::default();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            types.insert(line);
        }
        types
    }

    /// Builds a table from a `category -> [media type]` mapping.
    pub fn from_map(map: BTreeMap<String, Vec<String>>) -> Self {
        let by_category = map
            .into_iter()
            .map(|(category, types)| (category, types.into_iter().collect()))
            .collect();
        Self { by_category }
    }

    /// Loads a replacement table.
    ///
    /// Files ending in `.yaml`, `.yml` or `.json` are read as a
    /// `category -> [media type]` mapping; anything else as one media type
    /// per line.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](RegistryError::IoError) if the file cannot be
    /// read, or [`YamlError`](RegistryError::YamlError) /
    /// [`JsonError`](RegistryError::JsonError) if a mapping file does not
    /// parse.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml" | "yml") => Ok(Self::from_map(serde_yaml::from_str(&text)?)),
            Some("json") => Ok(Self::from_map(serde_json::from_str(&text)?)),
            _ => Ok(Self::from_text(&text)),
        }
    }

    /// Adds a full media type (`category/subtype`) to its category.
    pub fn insert(&mut self, media_type: impl Into<String>) {
        let media_type = media_type.into();
        let Some((category, _)) = media_type.split_once('/') else {
            tracing::debug!(entry = %media_type, "Skipping media type without a category");
            return;
        };
        self.by_category
            .entry(category.to_string())
            .or_default()
            .insert(media_type);
    }

    /// Returns `true` if any category lists `media_type`.
    pub fn contains(&self, media_type: &str) -> bool {
        self.by_category
            .values()
            .any(|types| types.contains(media_type))
    }

    /// Returns the categories present in the table.
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.by_category.keys().map(String::as_str)
    }

    /// Total number of media types across all categories.
    pub fn len(&self) -> usize {
        self.by_category.values().map(BTreeSet::len).sum()
    }

    /// Returns `true` if the table holds no media types.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Accepted `type` values for generic (untyped) body and target resources.
#[derive(Debug, Clone)]
pub struct ResourceTypes(Vec<String>);

impl Default for ResourceTypes {
    fn default() -> Self {
        Self(DEFAULT_RESOURCE_TYPES.iter().map(|t| t.to_string()).collect())
    }
}

impl ResourceTypes {
    /// Adds a non-standard type such as `Audio`.
    pub fn push(&mut self, resource_type: impl Into<String>) {
        let resource_type = resource_type.into();
        if !self.contains(&resource_type) {
            self.0.push(resource_type);
        }
    }

    /// Returns `true` if `resource_type` is accepted.
    pub fn contains(&self, resource_type: &str) -> bool {
        self.0.iter().any(|t| t == resource_type)
    }

    /// Iterates the accepted types in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

/// The three injectable tables, bundled together.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    /// Accepted BCP-47 language tags.
    pub languages: LanguageTags,
    /// Accepted IANA media types.
    pub media_types: MediaTypes,
    /// Accepted generic resource `type` values.
    pub resource_types: ResourceTypes,
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self {
            languages: LanguageTags::bundled(),
            media_types: MediaTypes::bundled(),
            resource_types: ResourceTypes::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_tables_cover_common_entries() {
        let vocabulary = Vocabulary::default();
        for tag in ["en", "fr", "de", "ar", "it", "zh-Hans"] {
            assert!(vocabulary.languages.contains(tag), "missing {tag}");
        }
        for media in ["audio/mpeg", "application/pdf", "image/jpeg", "text/html", "text/plain"] {
            assert!(vocabulary.media_types.contains(media), "missing {media}");
        }
        assert!(!vocabulary.media_types.contains("image/jpg"));
    }

    #[test]
    fn test_language_tags_keep_order_and_skip_duplicates() {
        let mut tags = LanguageTags::from_text("# header\nen\n\nfr\nen\n");
        tags.push("fr");
        tags.push("x-custom");
        assert_eq!(tags.iter().collect::<Vec<_>>(), vec!["en", "fr", "x-custom"]);
    }

    #[test]
    fn test_media_types_group_by_category() {
        let types = MediaTypes::from_text("image/png\nimage/jpeg\ntext/plain\nbogus\n");
        assert_eq!(types.categories().collect::<Vec<_>>(), vec!["image", "text"]);
        assert_eq!(types.len(), 3);
        assert!(!types.contains("bogus"));
    }

    #[test]
    fn test_media_types_from_map_uses_any_category() {
        let mut map = BTreeMap::new();
        map.insert("misc".to_string(), vec!["application/x-thing".to_string()]);
        let types = MediaTypes::from_map(map);
        assert!(types.contains("application/x-thing"));
    }

    #[test]
    fn test_resource_types_default_and_extension() {
        let mut types = ResourceTypes::default();
        assert_eq!(types.iter().count(), 5);
        assert!(!types.contains("Audio"));
        types.push("Audio");
        types.push("Audio");
        assert!(types.contains("Audio"));
        assert_eq!(types.iter().count(), 6);
    }
}
