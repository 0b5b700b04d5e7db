//! Single raster image as a one-page document.

use docushield_core::{DocumentFormat, ExtractError, ExtractedPage, PageExtractor};
use image::RgbaImage;

/// Treats one decoded raster image as a document with a single implicit
/// page (index 0). The extracted text is empty: reading text out of
/// pixels needs an OCR collaborator, which sits outside this crate, so
/// raster inputs are covered by visual detection only.
pub struct RasterExtractor {
    format: DocumentFormat,
    image: RgbaImage,
}

impl RasterExtractor {
    pub fn from_bytes(bytes: &[u8], format: DocumentFormat) -> Result<Self, ExtractError> {
        if !format.is_raster() {
            return Err(ExtractError(
                "RasterExtractor only handles raster formats".to_string(),
            ));
        }
        let image = image::load_from_memory(bytes)
            .map_err(|e| ExtractError(format!("failed to decode image: {e}")))?
            .to_rgba8();
        Ok(Self { format, image })
    }

    pub fn from_image(image: RgbaImage, format: DocumentFormat) -> Self {
        Self { format, image }
    }
}

impl PageExtractor for RasterExtractor {
    fn format(&self) -> DocumentFormat {
        self.format
    }

    fn page_count(&mut self) -> Result<usize, ExtractError> {
        Ok(1)
    }

    fn extract_page(&mut self, index: usize) -> Result<ExtractedPage, ExtractError> {
        if index != 0 {
            return Err(ExtractError(format!("page {index} out of range")));
        }
        Ok(ExtractedPage {
            text: String::new(),
            image: self.image.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn decodes_png_bytes_into_one_page() {
        let source = RgbaImage::from_pixel(30, 20, image::Rgba([9, 9, 9, 255]));
        let mut bytes = Cursor::new(Vec::new());
        image::DynamicImage::ImageRgba8(source)
            .write_to(&mut bytes, image::ImageFormat::Png)
            .unwrap();

        let mut extractor =
            RasterExtractor::from_bytes(&bytes.into_inner(), DocumentFormat::Png).unwrap();
        assert_eq!(extractor.page_count().unwrap(), 1);
        let page = extractor.extract_page(0).unwrap();
        assert_eq!(page.image.dimensions(), (30, 20));
        assert!(page.text.is_empty());
        assert!(extractor.extract_page(1).is_err());
    }

    #[test]
    fn rejects_pdf_format() {
        assert!(RasterExtractor::from_bytes(&[], DocumentFormat::Pdf).is_err());
    }

    #[test]
    fn rejects_garbage_bytes() {
        assert!(RasterExtractor::from_bytes(&[1, 2, 3], DocumentFormat::Png).is_err());
    }
}
