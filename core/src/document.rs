//! Document operations available on every node.

use std::io::{BufWriter, Write};
use std::path::Path;

use serde_json::Value;
use tracing::info;

use crate::error::Result;
use crate::node::Node;
use crate::render::{Inspection, RenderOptions, render_document};

/// Serialization entry points, implemented for every [`Node`].
///
/// # Examples
///
/// ```
/// use wadm_core::{Annotation, Document, Error, Identified, RenderOptions};
///
/// let mut anno = Annotation::new();
/// anno.set_id("http://example.org/anno1").unwrap();
///
/// // The target is still missing.
/// assert!(matches!(anno.to_json(), Err(Error::MissingRequiredField { .. })));
/// let report = anno.inspect().unwrap();
/// assert_eq!(report.missing_required, 1);
///
/// anno.set_target("http://example.com/page1").unwrap();
/// let text = anno.json_dumps(&RenderOptions::default().with_compact(true)).unwrap();
/// assert!(text.starts_with(r#"{"@context":"#));
/// ```
pub trait Document: Node + Sized {
    /// Renders the document in strict mode.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingRequiredField`](crate::Error::MissingRequiredField)
    /// while a `Required` field is unset.
    fn to_json(&self) -> Result<Value> {
        self.to_json_with(&RenderOptions::default())
    }

    fn to_json_with(&self, options: &RenderOptions) -> Result<Value> {
        Ok(render_document(self, options)?.document)
    }

    /// Renders to a string, indented unless `options.compact` is set.
    fn json_dumps(&self, options: &RenderOptions) -> Result<String> {
        let document = self.to_json_with(options)?;
        let text = if options.compact {
            serde_json::to_string(&document)?
        } else {
            serde_json::to_string_pretty(&document)?
        };
        Ok(text)
    }

    /// Writes the document to `path`, replacing any existing file.
    ///
    /// Nothing is written when rendering fails.
    fn json_save(&self, path: impl AsRef<Path>, options: &RenderOptions) -> Result<()> {
        let document = self.to_json_with(options)?;
        let file = std::fs::File::create(path)?;
        let mut writer = BufWriter::new(file);
        if options.compact {
            serde_json::to_writer(&mut writer, &document)?;
        } else {
            serde_json::to_writer_pretty(&mut writer, &document)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Renders in diagnostic mode and counts unmet obligations. Never fails
    /// on missing fields.
    fn inspect(&self) -> Result<Inspection> {
        let inspection = render_document(self, &RenderOptions::diagnostic())?;
        info!(
            kind = self.kind(),
            missing_required = inspection.missing_required,
            missing_recommended = inspection.missing_recommended,
            "Inspected document"
        );
        Ok(inspection)
    }
}

impl<T: Node> Document for T {}
