//! Pulling an XML document out of surrounding text.
//!
//! Generated documents usually arrive wrapped in prose or markdown fences.
//! [`DocumentExtractor`] returns the span from the first `<?xml` declaration
//! through the first closing tag of the expected root element.

use regex::Regex;
use tracing::{debug, warn};

use crate::converter::TargetFormat;

/// Finds an embedded document with a known root element.
#[derive(Debug, Clone)]
pub struct DocumentExtractor {
    root_tag: String,
    pattern: Option<Regex>,
}

impl DocumentExtractor {
    /// Create an extractor for documents whose root element is `root_tag`.
    ///
    /// The tag is matched case-insensitively and literally, so regex
    /// metacharacters in it carry no special meaning. A tag too large to
    /// compile yields an extractor that never matches.
    #[must_use]
    pub fn new(root_tag: &str) -> Self {
        let source = format!(r"(?is)<\?xml.*?</{}\s*>", regex::escape(root_tag));
        let pattern = match Regex::new(&source) {
            Ok(pattern) => Some(pattern),
            Err(e) => {
                warn!(root = %root_tag, error = %e, "cannot build extraction pattern");
                None
            }
        };
        Self {
            root_tag: root_tag.to_string(),
            pattern,
        }
    }

    /// Extractor for URDF (`<robot>`).
    #[must_use]
    pub fn urdf() -> Self {
        Self::new("robot")
    }

    /// Extractor for documents emitted in `format`.
    #[must_use]
    pub fn for_format(format: TargetFormat) -> Self {
        Self::new(format.root_tag())
    }

    /// Extractor for MJCF (`<mujoco>`).
    #[must_use]
    pub fn mjcf() -> Self {
        Self::for_format(TargetFormat::Mjcf)
    }

    /// Extractor for SDF (`<sdf>`).
    #[must_use]
    pub fn sdf() -> Self {
        Self::for_format(TargetFormat::Sdf)
    }

    /// The root element this extractor looks for.
    #[must_use]
    pub fn root_tag(&self) -> &str {
        &self.root_tag
    }

    /// Return the embedded document, or the trimmed input when there is none.
    #[must_use]
    pub fn extract<'t>(&self, text: &'t str) -> &'t str {
        match self.pattern.as_ref().and_then(|p| p.find(text)) {
            Some(m) => m.as_str().trim(),
            None => {
                debug!(root = %self.root_tag, "no embedded document found; using input as-is");
                text.trim()
            }
        }
    }
}

/// One-shot form of [`DocumentExtractor::extract`].
#[must_use]
pub fn extract_document<'t>(text: &'t str, root_tag: &str) -> &'t str {
    DocumentExtractor::new(root_tag).extract(text)
}
