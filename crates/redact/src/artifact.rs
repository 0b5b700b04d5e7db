//! Output artifact encoding.
//!
//! Raster inputs stay in their format family. PDF inputs are re-assembled
//! as an image-only PDF: each redacted page raster becomes an opaque,
//! losslessly stored page image, so whatever text sat under a redaction
//! rectangle is destroyed rather than merely covered, while pages with no
//! detections keep their exact pixels.

use std::io::Cursor;

use docushield_core::{DocumentFormat, RENDER_SCALE};
use image::{DynamicImage, ImageFormat};
use lopdf::{dictionary, Document, Object, Stream};

use crate::{PageSurface, RedactError};

pub fn encode_artifact(
    format: DocumentFormat,
    pages: &[PageSurface],
) -> Result<Vec<u8>, RedactError> {
    match format {
        DocumentFormat::Pdf => encode_pdf(pages),
        DocumentFormat::Jpeg => encode_raster(pages, ImageFormat::Jpeg),
        DocumentFormat::Png => encode_raster(pages, ImageFormat::Png),
        DocumentFormat::Tiff => encode_raster(pages, ImageFormat::Tiff),
    }
}

fn encode_raster(pages: &[PageSurface], format: ImageFormat) -> Result<Vec<u8>, RedactError> {
    let [page] = pages else {
        return Err(RedactError::PageCount(pages.len()));
    };

    let mut buffer = Cursor::new(Vec::new());
    let result = match format {
        // PNG keeps the alpha channel; JPEG/TIFF are written as RGB
        ImageFormat::Png => {
            DynamicImage::ImageRgba8(page.image.clone()).write_to(&mut buffer, format)
        }
        _ => DynamicImage::ImageRgba8(page.image.clone())
            .to_rgb8()
            .write_to(&mut buffer, format),
    };
    result.map_err(|e| RedactError::Encode(e.to_string()))?;
    Ok(buffer.into_inner())
}

/// Builds an image-only PDF: one raw-RGB XObject per page, scaled to fill
/// a media box sized back down by the extraction render scale. Page
/// bitmaps are stored losslessly (Flate, applied by the document-wide
/// compression pass) so pages without any redaction rectangle come back
/// pixel-identical to their input raster.
fn encode_pdf(pages: &[PageSurface]) -> Result<Vec<u8>, RedactError> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());

    for page in pages {
        let (px_width, px_height) = page.image.dimensions();
        let pt_width = px_width as f32 / RENDER_SCALE;
        let pt_height = px_height as f32 / RENDER_SCALE;

        let rgb = DynamicImage::ImageRgba8(page.image.clone()).to_rgb8();

        let image_id = doc.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => px_width as i64,
                "Height" => px_height as i64,
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8,
            },
            rgb.into_raw(),
        ));

        let content = format!("q\n{} 0 0 {} 0 0 cm\n/Im0 Do\nQ", pt_width, pt_height);
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), pt_width.into(), pt_height.into()],
            "Resources" => dictionary! {
                "XObject" => dictionary! { "Im0" => image_id },
            },
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let page_count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    let mut out = Cursor::new(Vec::new());
    doc.save_to(&mut out)
        .map_err(|e| RedactError::Pdf(e.to_string()))?;
    Ok(out.into_inner())
}
