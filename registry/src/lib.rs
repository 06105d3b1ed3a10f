//! Lookup tables and session configuration for Web Annotation builders.
//!
//! This crate holds the data the annotation model validates against, kept
//! apart from the model itself so it can be swapped per process or per
//! builder session:
//!
//! - [`LanguageTags`]: accepted BCP-47 language tags.
//! - [`MediaTypes`]: accepted IANA media types, grouped by category.
//! - [`ResourceTypes`]: accepted `type` values on generic bodies/targets.
//! - [`Config`]: base URL, `@context`, fast mode and the tables above.
//! - [`Settings`]: the YAML form of a [`Config`].
//!
//! # Quick start
//!
//! ```no_run
//! use wadm_registry::{Config, Settings};
//!
//! // Defaults with a couple of extensions
//! let config = Config::default()
//!     .with_base_url("https://example.org/")
//!     .with_resource_type("Audio");
//! assert!(config.vocabulary.media_types.contains("image/jpeg"));
//!
//! // Or from a settings file next to the project
//! let config = Config::load("wadm.yml").unwrap();
//! let settings = Settings::load("wadm.yml").unwrap();
//! settings.save("wadm-copy.yml").unwrap();
//! ```

mod config;
mod error;
mod tables;

pub use config::{Config, Context, DEFAULT_BASE_URL, DEFAULT_CONTEXT, Settings};
pub use error::{RegistryError, Result};
pub use tables::{DEFAULT_RESOURCE_TYPES, LanguageTags, MediaTypes, ResourceTypes, Vocabulary};
