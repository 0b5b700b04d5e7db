//! Error taxonomy.
//!
//! Fatal kinds abort the whole document call and surface as
//! [`PipelineError`]. Recoverable kinds are caught at their boundary and
//! recorded as [`PageFailure`] entries on the result, so callers can tell
//! a degraded partial success from a clean run without string matching.

use serde::Serialize;

use crate::types::PIIType;

/// Fatal failures: the document call aborts and no output is retained.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),
    #[error("document extraction failed: {0}")]
    Extraction(String),
    #[error("failed to produce output artifact: {0}")]
    Redaction(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Which detector a recoverable failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectorKind {
    Text,
    Visual,
}

/// Recoverable, per-page or per-detection failures. Each one is logged at
/// its boundary and carried on the result instead of aborting processing.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PageFailure {
    /// The page contributed no text, no bitmap and no detections.
    Extraction { page: usize, reason: String },
    /// One detector contributed nothing for this page; the other still ran.
    Detection {
        page: usize,
        detector: DetectorKind,
        reason: String,
    },
    /// A single detection whose padded rectangle collapsed; it was skipped,
    /// not redacted.
    Geometry {
        page: usize,
        pii_type: PIIType,
        reason: String,
    },
}

/// Error at the page-extraction collaborator boundary.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct ExtractError(pub String);
