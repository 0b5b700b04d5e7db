//! Typed, read-only pipeline configuration.
//!
//! Every field carries a serde default, so a partial config file only
//! overrides what it names; nested sections never lose sibling defaults.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::types::{PIIType, RedactionMethod};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub ner: NerConfig,
    pub visual: VisualConfig,
    pub redaction: RedactionConfig,
}

/// Text-detector settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NerConfig {
    /// Detections below this confidence are dropped. The structural
    /// patterns score 0.9; heuristic PERSON/ORG score 0.7/0.6, so raising
    /// this past 0.7 leaves structural matches only.
    pub min_confidence: f32,
}

impl Default for NerConfig {
    fn default() -> Self {
        Self { min_confidence: 0.6 }
    }
}

/// Visual-detector acceptance thresholds, applied per class.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualConfig {
    pub face_threshold: f32,
    /// Also applied to stamp hits.
    pub signature_threshold: f32,
}

impl Default for VisualConfig {
    fn default() -> Self {
        Self {
            face_threshold: 0.5,
            signature_threshold: 0.35,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RedactionConfig {
    /// Padding added on all sides of every detection rectangle before
    /// clamping to page bounds.
    pub padding_px: u32,
    pub default_method: RedactionMethod,
}

impl Default for RedactionConfig {
    fn default() -> Self {
        Self {
            padding_px: 4,
            default_method: RedactionMethod::Mask,
        }
    }
}

/// Total mapping from PII type to redaction method. Types absent from the
/// map resolve to the default method (MASK unless configured otherwise).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PolicyMap {
    #[serde(default)]
    methods: HashMap<PIIType, RedactionMethod>,
    #[serde(default)]
    default_method: RedactionMethod,
}

impl PolicyMap {
    pub fn new(default_method: RedactionMethod) -> Self {
        Self {
            methods: HashMap::new(),
            default_method,
        }
    }

    /// The policy table shipped as a starting point: photographic content
    /// is blurred, phone numbers get a neutral replacement, everything
    /// else is opaquely masked.
    pub fn recommended() -> Self {
        let mut map = Self::default();
        map.set(PIIType::Face, RedactionMethod::Blur);
        map.set(PIIType::Signature, RedactionMethod::Blur);
        map.set(PIIType::Phone, RedactionMethod::Replace);
        map
    }

    pub fn set(&mut self, pii_type: PIIType, method: RedactionMethod) {
        self.methods.insert(pii_type, method);
    }

    pub fn method_for(&self, pii_type: PIIType) -> RedactionMethod {
        self.methods
            .get(&pii_type)
            .copied()
            .unwrap_or(self.default_method)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_types_resolve_to_mask() {
        let policies = PolicyMap::default();
        assert_eq!(policies.method_for(PIIType::Email), RedactionMethod::Mask);
        assert_eq!(policies.method_for(PIIType::Face), RedactionMethod::Mask);
    }

    #[test]
    fn recommended_table_overrides_selectively() {
        let policies = PolicyMap::recommended();
        assert_eq!(policies.method_for(PIIType::Face), RedactionMethod::Blur);
        assert_eq!(policies.method_for(PIIType::Phone), RedactionMethod::Replace);
        assert_eq!(policies.method_for(PIIType::Aadhaar), RedactionMethod::Mask);
    }

    #[test]
    fn partial_config_keeps_sibling_defaults() {
        let config: PipelineConfig =
            serde_json::from_str(r#"{"redaction": {"padding_px": 8}}"#).unwrap();
        assert_eq!(config.redaction.padding_px, 8);
        assert_eq!(config.redaction.default_method, RedactionMethod::Mask);
        assert!((config.ner.min_confidence - 0.6).abs() < f32::EPSILON);
        assert!((config.visual.signature_threshold - 0.35).abs() < f32::EPSILON);
    }

    #[test]
    fn policy_map_round_trips_through_json() {
        let raw = r#"{"methods": {"FACE": "blur", "PHONE": "replace"}}"#;
        let policies: PolicyMap = serde_json::from_str(raw).unwrap();
        assert_eq!(policies.method_for(PIIType::Face), RedactionMethod::Blur);
        assert_eq!(policies.method_for(PIIType::Org), RedactionMethod::Mask);
    }
}
