//! Page extraction seam.
//!
//! Extraction abstracts over PDF vs. single-image inputs. The pipeline
//! drives any [`PageExtractor`] through an exclusive borrow for the whole
//! document call, so implementations may hold non-thread-safe native
//! handles (PDF sessions, decoders) as long as they release them on drop.

use image::RgbaImage;
use serde::{Deserialize, Serialize};

use crate::error::ExtractError;

/// Upscaling factor collaborators apply when rasterizing vector pages,
/// keeping the visual detector's input resolution consistent across
/// documents.
pub const RENDER_SCALE: f32 = 2.0;

/// Declared input format. Anything else is rejected before extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Pdf,
    Jpeg,
    Png,
    Tiff,
}

impl DocumentFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.trim_start_matches('.').to_ascii_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            "tif" | "tiff" => Some(Self::Tiff),
            _ => None,
        }
    }

    pub fn is_raster(&self) -> bool {
        !matches!(self, Self::Pdf)
    }
}

/// One extracted page: plain text plus a rasterized bitmap.
pub struct ExtractedPage {
    pub text: String,
    pub image: RgbaImage,
}

/// Collaborator that turns a document into per-page text and bitmaps.
pub trait PageExtractor {
    fn format(&self) -> DocumentFormat;

    fn page_count(&mut self) -> Result<usize, ExtractError>;

    /// Extracts one page. A failure here is recoverable at the document
    /// level: the page contributes no detections and processing continues.
    fn extract_page(&mut self, index: usize) -> Result<ExtractedPage, ExtractError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_dispatch() {
        assert_eq!(DocumentFormat::from_extension("pdf"), Some(DocumentFormat::Pdf));
        assert_eq!(DocumentFormat::from_extension(".JPG"), Some(DocumentFormat::Jpeg));
        assert_eq!(DocumentFormat::from_extension("tiff"), Some(DocumentFormat::Tiff));
        assert_eq!(DocumentFormat::from_extension("docx"), None);
    }
}
