//! Per-document orchestration: extraction, dual detection, redaction.

mod processor;
mod raster;

pub use processor::{write_artifact, DocumentProcessor};
pub use raster::RasterExtractor;
