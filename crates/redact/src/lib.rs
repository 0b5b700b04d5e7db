//! Redaction transforms and output artifact encoding.
//!
//! Consumes the merged detection list, resolves each detection's method
//! through the policy map, applies the transform to the page raster, and
//! produces the audit trail plus the encoded output document.

mod artifact;
mod engine;
mod geometry;

pub use artifact::encode_artifact;
pub use engine::{PageSurface, RedactionEngine, RedactionOutcome};
pub use geometry::{padded_rect, GeometryError};

/// Artifact-level failures. These are fatal for the document: no partial
/// or corrupt output is retained.
#[derive(Debug, thiserror::Error)]
pub enum RedactError {
    #[error("cannot encode {0} page(s) as a single-page raster artifact")]
    PageCount(usize),
    #[error("image encoding failed: {0}")]
    Encode(String),
    #[error("pdf assembly failed: {0}")]
    Pdf(String),
}
