//! Pattern and heuristic PII detection over extracted page text.
//!
//! Structural matches (national-ID, tax-ID, routing codes, phone, email,
//! account numbers, dates) use fixed grammars and score 0.9. PERSON and
//! ORG use indicator-word heuristics and score lower (0.7/0.6) so policy
//! and review logic can treat them differently; their false-positive rate
//! is materially higher than the structural patterns'.
//!
//! Coordinate contract: this detector sees extracted text, not glyph
//! layout, so the bounding boxes it emits are placeholder estimates from
//! text length and a fixed line height. Callers needing pixel-accurate
//! redaction must pair it with a coordinate-aware extraction layer, or
//! treat its output as page-level evidence. This asymmetry with the
//! visual detector is a design boundary, not a bug.

use docushield_core::{BoundingBox, NerConfig, PIIDetection, PIIType};
use once_cell::sync::Lazy;
use regex::Regex;

const STRUCTURAL_CONFIDENCE: f32 = 0.9;
const PERSON_CONFIDENCE: f32 = 0.7;
const ORG_CONFIDENCE: f32 = 0.6;

/// Placeholder geometry: estimated glyph width and line height in pixels.
const CHAR_WIDTH_PX: u32 = 10;
const ORG_CHAR_WIDTH_PX: u32 = 8;
const LINE_HEIGHT_PX: u32 = 20;

static STRUCTURAL_PATTERNS: Lazy<Vec<(PIIType, Regex)>> = Lazy::new(|| {
    [
        // 12-digit national ID, optionally grouped in fours
        (PIIType::Aadhaar, r"\b\d{4}\s?\d{4}\s?\d{4}\b"),
        // 5 letters + 4 digits + 1 letter tax ID; extracted text is not
        // case-normalized, so letter-bearing grammars match either case
        (PIIType::Pan, r"(?i)\b[A-Z]{5}[0-9]{4}[A-Z]\b"),
        // bank routing code: 4 letters, literal zero, 6 alphanumerics
        (PIIType::Ifsc, r"(?i)\b[A-Z]{4}0[A-Z0-9]{6}\b"),
        // 10-digit mobile, optional country prefix
        (PIIType::Phone, r"\b(?:\+?91[- ]?)?[6-9]\d{9}\b"),
        (
            PIIType::Email,
            r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b",
        ),
        (PIIType::AccountNo, r"\b\d{9,18}\b"),
        (PIIType::Date, r"\b\d{1,2}[/-]\d{1,2}[/-]\d{2,4}\b"),
    ]
    .into_iter()
    .map(|(pii_type, pattern)| (pii_type, Regex::new(pattern).unwrap()))
    .collect()
});

static PAN_EXACT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z]{5}[0-9]{4}[A-Z]$").unwrap());

/// Honorifics and common surname markers that precede a person's name.
const NAME_INDICATORS: &[&str] = &[
    "mr", "mrs", "ms", "dr", "prof", "shri", "smt", "kumar", "singh", "sharma", "gupta",
];

/// Legal-entity suffixes that terminate an organization name.
const ORG_INDICATORS: &[&str] = &[
    "ltd", "limited", "pvt", "private", "corp", "corporation", "inc", "company", "bank",
    "hospital",
];

/// Rule-based text PII detector. Stateless apart from configuration; a
/// pure function of its input, safe to share across threads.
#[derive(Debug, Clone)]
pub struct TextPatternDetector {
    min_confidence: f32,
}

impl TextPatternDetector {
    pub fn new(config: &NerConfig) -> Self {
        Self {
            min_confidence: config.min_confidence,
        }
    }

    /// Scans one page's text. Detections keep detector-then-insertion
    /// order: structural matches first, then PERSON, then ORG.
    pub fn detect(&self, text: &str, page: usize) -> Vec<PIIDetection> {
        let mut detections = Vec::new();

        for (pii_type, pattern) in STRUCTURAL_PATTERNS.iter() {
            for found in pattern.find_iter(text) {
                let snippet = found.as_str();
                detections.push(PIIDetection {
                    text: snippet.to_string(),
                    pii_type: *pii_type,
                    confidence: STRUCTURAL_CONFIDENCE,
                    bbox: estimated_bbox(snippet.chars().count() as u32 * CHAR_WIDTH_PX),
                    page,
                });
            }
        }

        let words: Vec<&str> = text.split_whitespace().collect();

        for (i, word) in words.iter().enumerate() {
            if !NAME_INDICATORS.contains(&word.to_lowercase().as_str()) {
                continue;
            }
            if let Some(next) = words.get(i + 1) {
                if is_title_case(next) && next.chars().count() > 2 {
                    detections.push(PIIDetection {
                        text: next.to_string(),
                        pii_type: PIIType::Person,
                        confidence: PERSON_CONFIDENCE,
                        bbox: estimated_bbox(next.chars().count() as u32 * CHAR_WIDTH_PX),
                        page,
                    });
                }
            }
        }

        for (i, word) in words.iter().enumerate() {
            if !ORG_INDICATORS.contains(&word.to_lowercase().as_str()) {
                continue;
            }
            // up to three preceding words plus the suffix itself
            let start = i.saturating_sub(3);
            let org_name = words[start..=i].join(" ");
            detections.push(PIIDetection {
                bbox: estimated_bbox(org_name.chars().count() as u32 * ORG_CHAR_WIDTH_PX),
                text: org_name,
                pii_type: PIIType::Org,
                confidence: ORG_CONFIDENCE,
                page,
            });
        }

        detections.retain(|d| d.confidence >= self.min_confidence);
        log::info!("[Text] page {}: {} detections", page, detections.len());
        detections
    }
}

fn estimated_bbox(width: u32) -> BoundingBox {
    BoundingBox::new(0, 0, width.max(1), LINE_HEIGHT_PX)
}

/// Python-style title case: leading uppercase, no uppercase afterwards.
fn is_title_case(word: &str) -> bool {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) if first.is_uppercase() => chars.all(|c| !c.is_uppercase()),
        _ => false,
    }
}

/// Format-only national-ID check: exactly 12 digits once separators are
/// stripped. Usable for post-hoc confidence upgrades or review gating,
/// independent of detection.
pub fn validate_aadhaar(value: &str) -> bool {
    let stripped: String = value.chars().filter(|c| !c.is_whitespace()).collect();
    stripped.len() == 12 && stripped.chars().all(|c| c.is_ascii_digit())
}

/// Exact-grammar tax-ID check: 5 letters, 4 digits, 1 letter. Stricter
/// than detection: the canonical form is uppercase only.
pub fn validate_pan(value: &str) -> bool {
    PAN_EXACT.is_match(value)
}
