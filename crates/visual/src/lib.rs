//! Visual PII detection over rasterized pages.
//!
//! The model itself is a pluggable capability: production deployments
//! inject a real face/signature/stamp backend, tests and the default
//! wiring use [`StubBackend`]. Nothing here depends on model weights.

use docushield_core::{BoundingBox, PIIDetection, PIIType, VisualConfig};
use image::RgbaImage;
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum VisualError {
    #[error("backend inference failed: {0}")]
    Backend(String),
    #[error("malformed image buffer: {0}")]
    MalformedImage(String),
}

/// Detection classes a backend can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisualClass {
    Face,
    Signature,
    Stamp,
}

impl VisualClass {
    pub fn pii_type(self) -> PIIType {
        match self {
            Self::Face => PIIType::Face,
            Self::Signature => PIIType::Signature,
            Self::Stamp => PIIType::Stamp,
        }
    }

    fn placeholder(self) -> &'static str {
        match self {
            Self::Face => "[FACE]",
            Self::Signature => "[SIGNATURE]",
            Self::Stamp => "[STAMP]",
        }
    }
}

/// One raw backend hit, before threshold gating.
#[derive(Debug, Clone)]
pub struct VisualHit {
    pub class: VisualClass,
    pub confidence: f32,
    pub bbox: BoundingBox,
}

/// Capability interface over a raster classifier/detector.
///
/// Implementations must not panic on malformed buffers; they report
/// failure through the error channel and the caller degrades gracefully.
pub trait VisualBackend: Send + Sync {
    fn name(&self) -> &str;

    fn infer(&self, image: &RgbaImage) -> Result<Vec<VisualHit>, VisualError>;
}

/// Threshold-gating wrapper around a [`VisualBackend`].
pub struct VisualPiiDetector {
    backend: Box<dyn VisualBackend>,
    face_threshold: f32,
    signature_threshold: f32,
}

impl VisualPiiDetector {
    pub fn new(config: &VisualConfig, backend: Box<dyn VisualBackend>) -> Self {
        Self {
            backend,
            face_threshold: config.face_threshold,
            signature_threshold: config.signature_threshold,
        }
    }

    /// Runs the backend on one page bitmap, discarding hits below the
    /// per-class acceptance threshold and hits with degenerate boxes.
    /// Backend failure surfaces as a recoverable error, never a panic.
    pub fn detect(&self, image: &RgbaImage, page: usize) -> Result<Vec<PIIDetection>, VisualError> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(VisualError::MalformedImage(format!(
                "{width}x{height} page bitmap"
            )));
        }

        let hits = self.backend.infer(image)?;

        let mut detections = Vec::with_capacity(hits.len());
        for hit in hits {
            let threshold = self.threshold_for(hit.class);
            if hit.confidence < threshold {
                log::debug!(
                    "[Visual] page {}: dropped {:?} at {:.2} (threshold {:.2})",
                    page,
                    hit.class,
                    hit.confidence,
                    threshold
                );
                continue;
            }
            if !hit.bbox.is_valid() {
                log::debug!("[Visual] page {}: dropped {:?} with empty bbox", page, hit.class);
                continue;
            }
            detections.push(PIIDetection {
                text: hit.class.placeholder().to_string(),
                pii_type: hit.class.pii_type(),
                confidence: hit.confidence,
                bbox: hit.bbox,
                page,
            });
        }

        log::info!(
            "[Visual] page {}: {} detections ({} backend)",
            page,
            detections.len(),
            self.backend.name()
        );
        Ok(detections)
    }

    fn threshold_for(&self, class: VisualClass) -> f32 {
        match class {
            VisualClass::Face => self.face_threshold,
            // stamps share the signature threshold
            VisualClass::Signature | VisualClass::Stamp => self.signature_threshold,
        }
    }
}

/// Reference backend: a trivial buffer-size heuristic that exists purely
/// to exercise the interface, never to approximate a real model.
#[derive(Debug, Default)]
pub struct StubBackend;

impl VisualBackend for StubBackend {
    fn name(&self) -> &str {
        "stub"
    }

    fn infer(&self, image: &RgbaImage) -> Result<Vec<VisualHit>, VisualError> {
        let buffer_len = image.as_raw().len();
        let mut hits = Vec::new();
        if buffer_len > 10_000 {
            hits.push(VisualHit {
                class: VisualClass::Face,
                confidence: 0.8,
                bbox: BoundingBox::new(100, 100, 150, 150),
            });
        }
        if buffer_len > 5_000 {
            hits.push(VisualHit {
                class: VisualClass::Signature,
                confidence: 0.7,
                bbox: BoundingBox::new(200, 300, 100, 50),
            });
        }
        Ok(hits)
    }
}
