//! Policy dispatch and per-page transform application.

use std::collections::BTreeMap;

use chrono::Utc;
use docushield_core::{
    AuditEntry, BoundingBox, PIIDetection, PIIType, PageFailure, PolicyMap, RedactionConfig,
    RedactionMethod,
};
use image::{Rgba, RgbaImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;

use crate::geometry::padded_rect;

/// Strong enough that no original detail inside the rectangle survives
/// inversion; a cosmetic blur would not satisfy the redaction contract.
const BLUR_SIGMA: f32 = 10.0;

const MASK_FILL: Rgba<u8> = Rgba([0, 0, 0, 255]);
const REPLACE_FILL: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// One page's raster, owned by the pipeline for the duration of a single
/// document call.
pub struct PageSurface {
    pub index: usize,
    pub image: RgbaImage,
}

pub struct RedactionOutcome {
    /// One entry per applied detection, carrying the padded rectangle.
    pub audit_entries: Vec<AuditEntry>,
    /// Geometry failures for skipped detections.
    pub failures: Vec<PageFailure>,
}

pub struct RedactionEngine {
    padding_px: u32,
    policies: PolicyMap,
}

impl RedactionEngine {
    pub fn new(config: &RedactionConfig, policies: PolicyMap) -> Self {
        Self {
            padding_px: config.padding_px,
            policies,
        }
    }

    /// Applies every detection to its page surface, in detection order.
    /// Overlapping rectangles are applied independently; the last one wins
    /// inside the overlap, which is safe because every transform only
    /// obscures further.
    pub fn redact(
        &self,
        pages: &mut [PageSurface],
        detections: &[PIIDetection],
    ) -> RedactionOutcome {
        let mut by_page: BTreeMap<usize, Vec<&PIIDetection>> = BTreeMap::new();
        for detection in detections {
            by_page.entry(detection.page).or_default().push(detection);
        }

        let mut audit_entries = Vec::with_capacity(detections.len());
        let mut failures = Vec::new();

        for surface in pages.iter_mut() {
            let Some(page_detections) = by_page.get(&surface.index) else {
                continue;
            };
            let (page_width, page_height) = surface.image.dimensions();

            for detection in page_detections {
                let rect = match padded_rect(&detection.bbox, self.padding_px, page_width, page_height)
                {
                    Ok(rect) => rect,
                    Err(err) => {
                        log::warn!(
                            "[Redact] page {}: skipping {:?} detection: {}",
                            surface.index,
                            detection.pii_type,
                            err
                        );
                        failures.push(PageFailure::Geometry {
                            page: surface.index,
                            pii_type: detection.pii_type,
                            reason: err.to_string(),
                        });
                        continue;
                    }
                };

                let method = self.resolve_method(detection.pii_type);
                apply_transform(&mut surface.image, &rect, method);

                audit_entries.push(AuditEntry {
                    pii_type: detection.pii_type,
                    method,
                    bbox: rect,
                    page: surface.index,
                    confidence: detection.confidence,
                    timestamp: Utc::now().to_rfc3339(),
                });
            }

            log::info!(
                "[Redact] page {}: applied {} region(s)",
                surface.index,
                page_detections.len()
            );
        }

        RedactionOutcome {
            audit_entries,
            failures,
        }
    }

    fn resolve_method(&self, pii_type: PIIType) -> RedactionMethod {
        match self.policies.method_for(pii_type) {
            RedactionMethod::Remove => {
                // no surface supports true content removal yet
                log::warn!(
                    "[Redact] REMOVE has no implementation path, masking {:?} instead",
                    pii_type
                );
                RedactionMethod::Mask
            }
            method => method,
        }
    }
}

fn apply_transform(image: &mut RgbaImage, rect: &BoundingBox, method: RedactionMethod) {
    match method {
        // Remove was resolved to Mask before dispatch
        RedactionMethod::Mask | RedactionMethod::Remove => fill_rect(image, rect, MASK_FILL),
        // raster surfaces carry no embedded text; a neutral opaque fill is
        // the whole REPLACE transform here
        RedactionMethod::Replace => fill_rect(image, rect, REPLACE_FILL),
        RedactionMethod::Blur => blur_rect(image, rect),
    }
}

fn fill_rect(image: &mut RgbaImage, rect: &BoundingBox, color: Rgba<u8>) {
    draw_filled_rect_mut(
        image,
        Rect::at(rect.x as i32, rect.y as i32).of_size(rect.width, rect.height),
        color,
    );
}

/// Crops the rectangle, blurs it, and composites it back in place.
fn blur_rect(image: &mut RgbaImage, rect: &BoundingBox) {
    let region =
        image::imageops::crop_imm(&*image, rect.x, rect.y, rect.width, rect.height).to_image();
    let blurred = image::imageops::blur(&region, BLUR_SIGMA);
    image::imageops::replace(image, &blurred, rect.x as i64, rect.y as i64);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checkerboard(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| {
            if (x / 4 + y / 4) % 2 == 0 {
                Rgba([255, 255, 255, 255])
            } else {
                Rgba([0, 0, 0, 255])
            }
        })
    }

    fn detection(pii_type: PIIType, bbox: BoundingBox, page: usize) -> PIIDetection {
        PIIDetection {
            text: String::new(),
            pii_type,
            confidence: 0.9,
            bbox,
            page,
        }
    }

    fn engine(policies: PolicyMap) -> RedactionEngine {
        RedactionEngine::new(&RedactionConfig::default(), policies)
    }

    #[test]
    fn mask_fills_padded_rect_and_nothing_else() {
        let mut pages = vec![PageSurface {
            index: 0,
            image: RgbaImage::from_pixel(200, 200, Rgba([200, 200, 200, 255])),
        }];
        let detections = vec![detection(PIIType::Email, BoundingBox::new(50, 50, 40, 20), 0)];

        let outcome = engine(PolicyMap::default()).redact(&mut pages, &detections);
        assert_eq!(outcome.audit_entries.len(), 1);
        assert!(outcome.failures.is_empty());

        let image = &pages[0].image;
        // inside padded rect (padding 4, so 46..94 x 46..74): black
        assert_eq!(*image.get_pixel(46, 46), Rgba([0, 0, 0, 255]));
        assert_eq!(*image.get_pixel(93, 73), Rgba([0, 0, 0, 255]));
        // just outside: untouched
        assert_eq!(*image.get_pixel(45, 45), Rgba([200, 200, 200, 255]));
        assert_eq!(*image.get_pixel(94, 74), Rgba([200, 200, 200, 255]));
    }

    #[test]
    fn audit_records_padded_bbox_and_method() {
        let mut pages = vec![PageSurface {
            index: 3,
            image: RgbaImage::from_pixel(300, 300, Rgba([255, 255, 255, 255])),
        }];
        let detections = vec![detection(PIIType::Phone, BoundingBox::new(20, 30, 60, 10), 3)];

        let outcome = engine(PolicyMap::recommended()).redact(&mut pages, &detections);
        let entry = &outcome.audit_entries[0];
        assert_eq!(entry.method, RedactionMethod::Replace);
        assert_eq!(entry.bbox, BoundingBox::new(16, 26, 68, 18));
        assert_eq!(entry.page, 3);
        assert!(!entry.timestamp.is_empty());
    }

    #[test]
    fn blur_destroys_detail_inside_rect_only() {
        let mut pages = vec![PageSurface {
            index: 0,
            image: checkerboard(200, 200),
        }];
        let reference = checkerboard(200, 200);
        let mut policies = PolicyMap::default();
        policies.set(PIIType::Face, RedactionMethod::Blur);
        let detections = vec![detection(PIIType::Face, BoundingBox::new(60, 60, 60, 60), 0)];

        engine(policies).redact(&mut pages, &detections);
        let image = &pages[0].image;

        // deep inside the blurred rect the hard black/white edges are gone
        let center = image.get_pixel(90, 90);
        assert!(center[0] > 40 && center[0] < 215, "center not blurred: {:?}", center);
        // a checkerboard cell center inside the rect no longer matches the source
        let mut changed = 0;
        for (x, y) in [(70u32, 70u32), (90, 80), (100, 100), (80, 110)] {
            if image.get_pixel(x, y) != reference.get_pixel(x, y) {
                changed += 1;
            }
        }
        assert!(changed >= 3);
        // outside the padded rect nothing moved
        assert_eq!(image.get_pixel(10, 10), reference.get_pixel(10, 10));
        assert_eq!(image.get_pixel(150, 150), reference.get_pixel(150, 150));
    }

    #[test]
    fn geometry_failure_skips_single_detection() {
        let mut pages = vec![PageSurface {
            index: 0,
            image: RgbaImage::from_pixel(100, 100, Rgba([255, 255, 255, 255])),
        }];
        let detections = vec![
            detection(PIIType::Face, BoundingBox::new(500, 500, 50, 50), 0),
            detection(PIIType::Email, BoundingBox::new(10, 10, 30, 10), 0),
        ];

        let outcome = engine(PolicyMap::default()).redact(&mut pages, &detections);
        assert_eq!(outcome.audit_entries.len(), 1);
        assert_eq!(outcome.failures.len(), 1);
        assert!(matches!(
            outcome.failures[0],
            PageFailure::Geometry {
                pii_type: PIIType::Face,
                ..
            }
        ));
        assert_eq!(outcome.audit_entries[0].pii_type, PIIType::Email);
    }

    #[test]
    fn remove_policy_falls_back_to_mask() {
        let mut pages = vec![PageSurface {
            index: 0,
            image: RgbaImage::from_pixel(100, 100, Rgba([255, 255, 255, 255])),
        }];
        let mut policies = PolicyMap::default();
        policies.set(PIIType::Stamp, RedactionMethod::Remove);
        let detections = vec![detection(PIIType::Stamp, BoundingBox::new(10, 10, 20, 20), 0)];

        let outcome = engine(policies).redact(&mut pages, &detections);
        assert_eq!(outcome.audit_entries[0].method, RedactionMethod::Mask);
        assert_eq!(*pages[0].image.get_pixel(15, 15), Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn untouched_pages_stay_pixel_identical() {
        let mut pages = vec![
            PageSurface {
                index: 0,
                image: checkerboard(100, 100),
            },
            PageSurface {
                index: 1,
                image: checkerboard(100, 100),
            },
        ];
        let detections = vec![detection(PIIType::Pan, BoundingBox::new(10, 10, 40, 10), 0)];

        engine(PolicyMap::default()).redact(&mut pages, &detections);
        assert_eq!(pages[1].image, checkerboard(100, 100));
        assert_ne!(pages[0].image, checkerboard(100, 100));
    }
}
