//! Document processor: drives per-page extraction and dual detection,
//! merges results, and requests redaction.
//!
//! Per-page failure policy: a failed page contributes zero detections and
//! a recorded failure, and processing continues. Only artifact encoding
//! and document-level extraction failures abort the call. The processor
//! holds no mutable state across calls, so one instance can serve
//! arbitrarily many documents from concurrent scheduler tasks.

use std::path::Path;

use docushield_core::{
    DetectorKind, DocumentFormat, PIIDetection, PageExtractor, PageFailure, PipelineConfig,
    PipelineError, PolicyMap, ProcessResult, ProcessSummary,
};
use docushield_redact::{encode_artifact, PageSurface, RedactionEngine};
use docushield_text::TextPatternDetector;
use docushield_visual::{StubBackend, VisualBackend, VisualPiiDetector};

use crate::raster::RasterExtractor;

pub struct DocumentProcessor {
    text_detector: TextPatternDetector,
    visual_detector: VisualPiiDetector,
    engine: RedactionEngine,
}

impl DocumentProcessor {
    /// Wires the stub visual backend; production callers inject a real
    /// one through [`DocumentProcessor::with_backend`].
    pub fn new(config: &PipelineConfig, policies: PolicyMap) -> Self {
        Self::with_backend(config, policies, Box::new(StubBackend))
    }

    pub fn with_backend(
        config: &PipelineConfig,
        policies: PolicyMap,
        backend: Box<dyn VisualBackend>,
    ) -> Self {
        Self {
            text_detector: TextPatternDetector::new(&config.ner),
            visual_detector: VisualPiiDetector::new(&config.visual, backend),
            engine: RedactionEngine::new(&config.redaction, policies),
        }
    }

    /// Runs the full pipeline over one document behind an exclusively
    /// borrowed extractor handle, which is released on every exit path.
    pub fn process(
        &self,
        extractor: &mut dyn PageExtractor,
        filename: &str,
    ) -> Result<ProcessResult, PipelineError> {
        let format = extractor.format();
        log::info!("[Processor] processing {} ({:?})", filename, format);

        let total_pages = extractor
            .page_count()
            .map_err(|e| PipelineError::Extraction(e.to_string()))?;

        let mut detections: Vec<PIIDetection> = Vec::new();
        let mut failures: Vec<PageFailure> = Vec::new();
        let mut surfaces: Vec<PageSurface> = Vec::with_capacity(total_pages);

        for page in 0..total_pages {
            let extracted = match extractor.extract_page(page) {
                Ok(extracted) => extracted,
                Err(err) => {
                    log::warn!("[Processor] page {} extraction failed: {}", page, err);
                    failures.push(PageFailure::Extraction {
                        page,
                        reason: err.to_string(),
                    });
                    continue;
                }
            };

            // detector-then-insertion order: text first, then visual
            detections.extend(self.text_detector.detect(&extracted.text, page));

            match self.visual_detector.detect(&extracted.image, page) {
                Ok(visual) => detections.extend(visual),
                Err(err) => {
                    log::warn!("[Processor] page {} visual detection failed: {}", page, err);
                    failures.push(PageFailure::Detection {
                        page,
                        detector: DetectorKind::Visual,
                        reason: err.to_string(),
                    });
                }
            }

            surfaces.push(PageSurface {
                index: page,
                image: extracted.image,
            });
        }

        let outcome = self.engine.redact(&mut surfaces, &detections);
        failures.extend(outcome.failures);

        let output = encode_artifact(format, &surfaces)
            .map_err(|e| PipelineError::Redaction(e.to_string()))?;

        let summary = ProcessSummary::from_detections(&detections, total_pages);
        log::info!(
            "[Processor] {}: {} detection(s) across {} page(s), {} recovered failure(s)",
            filename,
            detections.len(),
            total_pages,
            failures.len()
        );

        Ok(ProcessResult {
            filename: filename.to_string(),
            total_pages,
            detections_count: detections.len(),
            audit_entries: outcome.audit_entries,
            output,
            summary,
            failures,
        })
    }

    /// Dispatches on the filename extension. Raster inputs are decoded
    /// directly; PDF inputs need a caller-supplied extractor because page
    /// rendering is a collaborator concern.
    pub fn process_bytes(
        &self,
        bytes: &[u8],
        filename: &str,
    ) -> Result<ProcessResult, PipelineError> {
        let extension = Path::new(filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("");
        let format = DocumentFormat::from_extension(extension)
            .ok_or_else(|| PipelineError::UnsupportedFormat(extension.to_string()))?;

        match format {
            DocumentFormat::Pdf => Err(PipelineError::Extraction(
                "PDF input requires a caller-supplied page extractor".to_string(),
            )),
            _ => {
                let mut extractor = RasterExtractor::from_bytes(bytes, format)
                    .map_err(|e| PipelineError::Extraction(e.to_string()))?;
                self.process(&mut extractor, filename)
            }
        }
    }
}

/// Writes the output artifact, removing any partially written file on
/// failure so a failed document never leaves corrupt output behind.
pub fn write_artifact(path: &Path, bytes: &[u8]) -> Result<(), PipelineError> {
    if let Err(err) = std::fs::write(path, bytes) {
        let _ = std::fs::remove_file(path);
        return Err(PipelineError::Io(err));
    }
    Ok(())
}
