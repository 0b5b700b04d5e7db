//! Shared data model for the deidentification pipeline.
//!
//! Everything that crosses a component boundary lives here: detections,
//! audit entries, configuration, the error taxonomy, and the page
//! extraction seam the pipeline drives.

pub mod config;
pub mod error;
pub mod extract;
pub mod types;

pub use config::{NerConfig, PipelineConfig, PolicyMap, RedactionConfig, VisualConfig};
pub use error::{DetectorKind, ExtractError, PageFailure, PipelineError};
pub use extract::{DocumentFormat, ExtractedPage, PageExtractor, RENDER_SCALE};
pub use types::{
    AuditEntry, BoundingBox, PIIDetection, PIIType, ProcessResult, ProcessSummary,
    RedactionMethod,
};

pub type Result<T> = std::result::Result<T, PipelineError>;
