//! Detection and audit data structures.
//!
//! The audit entry schema is consumed by external compliance tooling;
//! field names and serialized forms are a stable contract.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::PageFailure;

/// Axis-aligned rectangle in page-local pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// A box is only usable with positive area.
    pub fn is_valid(&self) -> bool {
        self.width > 0 && self.height > 0
    }
}

/// Closed set of PII classes the detectors can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PIIType {
    Person,
    Phone,
    Email,
    Aadhaar,
    Pan,
    Ifsc,
    AccountNo,
    Face,
    Signature,
    Stamp,
    Date,
    Org,
}

/// Visual transform applied to a detected region.
///
/// `Remove` is declared for policy compatibility but has no raster
/// implementation path; the engine resolves it to `Mask`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RedactionMethod {
    #[default]
    Mask,
    Blur,
    Replace,
    Remove,
}

/// One located instance of PII. Immutable once created, produced by
/// exactly one detector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PIIDetection {
    /// Matched snippet, or a class placeholder like `[FACE]` for visual hits.
    pub text: String,
    pub pii_type: PIIType,
    /// In `[0, 1]`.
    pub confidence: f32,
    pub bbox: BoundingBox,
    pub page: usize,
}

/// Durable record of one redaction action, created only at redaction time
/// (the method is not known until the policy is consulted).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub pii_type: PIIType,
    /// The method actually applied.
    pub method: RedactionMethod,
    /// The padded, clamped rectangle, not the raw detection box.
    pub bbox: BoundingBox,
    pub page: usize,
    pub confidence: f32,
    /// RFC 3339 generation timestamp.
    pub timestamp: String,
}

/// Per-type breakdown of what a document run found.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessSummary {
    pub total_pages: usize,
    pub total_detections: usize,
    pub pii_types_found: Vec<PIIType>,
    pub pii_counts: BTreeMap<PIIType, usize>,
}

impl ProcessSummary {
    pub fn from_detections(detections: &[PIIDetection], total_pages: usize) -> Self {
        let mut pii_counts: BTreeMap<PIIType, usize> = BTreeMap::new();
        for detection in detections {
            *pii_counts.entry(detection.pii_type).or_insert(0) += 1;
        }
        Self {
            total_pages,
            total_detections: detections.len(),
            pii_types_found: pii_counts.keys().copied().collect(),
            pii_counts,
        }
    }
}

/// Outcome of one document-processing call.
///
/// When `failures` is empty, `audit_entries.len() == detections_count`;
/// every recovered failure is listed so a degraded run is never mistaken
/// for a clean one that found nothing.
#[derive(Debug, Serialize)]
pub struct ProcessResult {
    pub filename: String,
    pub total_pages: usize,
    pub detections_count: usize,
    pub audit_entries: Vec<AuditEntry>,
    /// Encoded output artifact, same format family as the input.
    #[serde(skip)]
    pub output: Vec<u8>,
    pub summary: ProcessSummary,
    pub failures: Vec<PageFailure>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn audit_entry_schema_is_stable() {
        let entry = AuditEntry {
            pii_type: PIIType::AccountNo,
            method: RedactionMethod::Blur,
            bbox: BoundingBox::new(1, 2, 3, 4),
            page: 0,
            confidence: 0.9,
            timestamp: "2025-01-01T00:00:00+00:00".to_string(),
        };
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["pii_type"], "ACCOUNT_NO");
        assert_eq!(value["method"], "blur");
        assert_eq!(value["bbox"]["x"], 1);
        assert_eq!(value["bbox"]["width"], 3);
        assert_eq!(value["page"], 0);
    }

    #[test]
    fn bbox_validity_requires_positive_area() {
        assert!(BoundingBox::new(0, 0, 1, 1).is_valid());
        assert!(!BoundingBox::new(5, 5, 0, 10).is_valid());
        assert!(!BoundingBox::new(5, 5, 10, 0).is_valid());
    }

    #[test]
    fn summary_counts_per_type() {
        let det = |pii_type, page| PIIDetection {
            text: String::new(),
            pii_type,
            confidence: 0.9,
            bbox: BoundingBox::new(0, 0, 10, 10),
            page,
        };
        let detections = vec![
            det(PIIType::Email, 0),
            det(PIIType::Email, 2),
            det(PIIType::Pan, 2),
        ];
        let summary = ProcessSummary::from_detections(&detections, 3);
        assert_eq!(summary.total_pages, 3);
        assert_eq!(summary.total_detections, 3);
        assert_eq!(summary.pii_counts[&PIIType::Email], 2);
        assert_eq!(summary.pii_counts[&PIIType::Pan], 1);
        assert_eq!(summary.pii_types_found.len(), 2);
    }
}
