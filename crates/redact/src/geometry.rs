//! Padded-rectangle computation.

use docushield_core::BoundingBox;

/// The rectangle collapsed to zero area; the detection cannot be redacted.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct GeometryError(pub String);

/// Expands a detection box by `padding` on all sides, then clamps to
/// `[0, page_width] x [0, page_height]`. Clamping never inverts the
/// rectangle: anything that would collapse to zero area is rejected so
/// the caller can skip that single detection.
pub fn padded_rect(
    bbox: &BoundingBox,
    padding: u32,
    page_width: u32,
    page_height: u32,
) -> Result<BoundingBox, GeometryError> {
    if !bbox.is_valid() {
        return Err(GeometryError(format!(
            "degenerate detection box {}x{}",
            bbox.width, bbox.height
        )));
    }

    let x0 = bbox.x.saturating_sub(padding);
    let y0 = bbox.y.saturating_sub(padding);
    let x1 = bbox
        .x
        .saturating_add(bbox.width)
        .saturating_add(padding)
        .min(page_width);
    let y1 = bbox
        .y
        .saturating_add(bbox.height)
        .saturating_add(padding)
        .min(page_height);

    if x0 >= x1 || y0 >= y1 {
        return Err(GeometryError(format!(
            "box at ({}, {}) {}x{} falls outside {}x{} page",
            bbox.x, bbox.y, bbox.width, bbox.height, page_width, page_height
        )));
    }

    Ok(BoundingBox::new(x0, y0, x1 - x0, y1 - y0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interior_box_is_padded_on_all_sides() {
        let rect = padded_rect(&BoundingBox::new(50, 60, 100, 20), 4, 1000, 800).unwrap();
        assert_eq!(rect, BoundingBox::new(46, 56, 108, 28));
    }

    #[test]
    fn clamped_to_page_bounds() {
        let rect = padded_rect(&BoundingBox::new(0, 0, 100, 20), 4, 1000, 800).unwrap();
        assert_eq!((rect.x, rect.y), (0, 0));
        assert_eq!((rect.width, rect.height), (104, 24));

        let rect = padded_rect(&BoundingBox::new(950, 780, 100, 40), 4, 1000, 800).unwrap();
        assert_eq!(rect.x + rect.width, 1000);
        assert_eq!(rect.y + rect.height, 800);
    }

    #[test]
    fn box_outside_page_is_rejected() {
        assert!(padded_rect(&BoundingBox::new(1200, 10, 50, 50), 4, 1000, 800).is_err());
        assert!(padded_rect(&BoundingBox::new(10, 900, 50, 50), 4, 1000, 800).is_err());
    }

    #[test]
    fn degenerate_box_is_rejected() {
        assert!(padded_rect(&BoundingBox::new(10, 10, 0, 20), 4, 1000, 800).is_err());
    }
}
