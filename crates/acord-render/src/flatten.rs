//! Flattening: rasterize each page through pdfium with form data and
//! annotations baked in, then rebuild a PDF whose pages are single
//! full-bleed images at the original point dimensions.

use std::io::Write as _;
use std::path::Path;

use flate2::write::ZlibEncoder;
use flate2::Compression;
use image::RgbImage;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use pdfium_render::prelude::*;
use tracing::debug;

use crate::error::RenderError;

/// One rendered page: pixels plus the point-space size to restore.
pub struct PageRaster {
    pub width_pts: f32,
    pub height_pts: f32,
    pub image: RgbImage,
}

fn bind_pdfium() -> Result<Pdfium, RenderError> {
    let bindings = Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
        .or_else(|_| Pdfium::bind_to_system_library())
        .map_err(|e| RenderError::Flatten(format!("pdfium unavailable: {}", e)))?;
    Ok(Pdfium::new(bindings))
}

/// 0-based page indices that survive the exclusion list, in source
/// order. Out-of-range exclusions are ignored.
fn retained_indices(page_count: usize, excluded: &[usize]) -> Vec<usize> {
    (0..page_count).filter(|i| !excluded.contains(i)).collect()
}

/// Render every page not listed in `excluded` (0-based indices) at the
/// given DPI.
pub fn render_pages(
    path: &Path,
    dpi: f32,
    excluded: &[usize],
) -> Result<Vec<PageRaster>, RenderError> {
    let pdfium = bind_pdfium()?;
    let document = pdfium
        .load_pdf_from_file(path, None)
        .map_err(|e| RenderError::Flatten(format!("load for rasterization: {}", e)))?;

    let retained = retained_indices(document.pages().len() as usize, excluded);
    if retained.is_empty() {
        return Err(RenderError::Flatten(
            "every page was excluded or the document is empty".to_string(),
        ));
    }

    let scale = dpi / 72.0;
    let mut rasters = Vec::new();
    for index in retained {
        let page = document
            .pages()
            .get(index as u16)
            .map_err(|e| RenderError::Flatten(format!("page {}: {}", index, e)))?;
        let width_pts = page.width().value;
        let height_pts = page.height().value;
        let config = PdfRenderConfig::new()
            .set_target_width((width_pts * scale) as i32)
            .set_target_height((height_pts * scale) as i32)
            .render_form_data(true)
            .render_annotations(true);
        let bitmap = page
            .render_with_config(&config)
            .map_err(|e| RenderError::Flatten(format!("page {}: {}", index, e)))?;
        debug!(page = index, "rasterized page");
        rasters.push(PageRaster {
            width_pts,
            height_pts,
            image: bitmap.as_image().to_rgb8(),
        });
    }
    Ok(rasters)
}

/// Build the flattened document from rendered pages. Pure assembly, no
/// pdfium involvement.
pub fn assemble_document(rasters: &[PageRaster]) -> Result<Document, RenderError> {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();
    let mut kids = Vec::with_capacity(rasters.len());

    for (index, raster) in rasters.iter().enumerate() {
        let (px_w, px_h) = raster.image.dimensions();
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(raster.image.as_raw())?;
        let compressed = encoder.finish()?;

        let image_id = doc.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => px_w as i64,
                "Height" => px_h as i64,
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8,
                "Filter" => "FlateDecode",
            },
            compressed,
        ));

        let content = Content {
            operations: vec![
                Operation::new("q", vec![]),
                Operation::new(
                    "cm",
                    vec![
                        Object::Real(raster.width_pts),
                        Object::Real(0.0),
                        Object::Real(0.0),
                        Object::Real(raster.height_pts),
                        Object::Real(0.0),
                        Object::Real(0.0),
                    ],
                ),
                Operation::new("Do", vec![Object::Name(b"Im0".to_vec())]),
                Operation::new("Q", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            content
                .encode()
                .map_err(|e| RenderError::Flatten(e.to_string()))?,
        ));

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => Object::Reference(pages_id),
            "MediaBox" => vec![
                0.into(),
                0.into(),
                Object::Real(raster.width_pts),
                Object::Real(raster.height_pts),
            ],
            "Resources" => dictionary! {
                "XObject" => dictionary! { "Im0" => Object::Reference(image_id) },
            },
            "Contents" => Object::Reference(content_id),
        });
        kids.push(Object::Reference(page_id));
        debug!(page = index, px_w, px_h, "assembled flattened page");
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => Object::Reference(pages_id),
    });
    doc.trailer.set("Root", catalog_id);
    Ok(doc)
}

/// Rasterize `path` and reassemble it as an image-only document.
pub fn flatten_document(
    path: &Path,
    dpi: f32,
    excluded: &[usize],
) -> Result<Document, RenderError> {
    let rasters = render_pages(path, dpi, excluded)?;
    assemble_document(&rasters)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn raster(w_pts: f32, h_pts: f32, dpi: f32) -> PageRaster {
        let scale = dpi / 72.0;
        PageRaster {
            width_pts: w_pts,
            height_pts: h_pts,
            image: RgbImage::from_pixel(
                (w_pts * scale) as u32,
                (h_pts * scale) as u32,
                image::Rgb([255, 255, 255]),
            ),
        }
    }

    #[test]
    fn test_retained_indices_drop_excluded_in_order() {
        assert_eq!(retained_indices(6, &[2, 3]), vec![0, 1, 4, 5]);
        assert_eq!(retained_indices(3, &[]), vec![0, 1, 2]);
        // The general-liability section of the 125/140 package.
        assert_eq!(retained_indices(8, &[4, 5, 6, 7]), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_retained_indices_ignore_out_of_range() {
        assert_eq!(retained_indices(2, &[5]), vec![0, 1]);
    }

    #[test]
    fn test_retained_indices_can_drop_everything() {
        assert!(retained_indices(2, &[0, 1]).is_empty());
        assert!(retained_indices(0, &[]).is_empty());
    }

    #[test]
    fn test_assembled_pages_keep_point_dimensions() {
        let doc = assemble_document(&[raster(612.0, 792.0, 144.0)]).unwrap();
        let pages = doc.get_pages();
        assert_eq!(pages.len(), 1);
        let page = doc.get_dictionary(pages[&1]).unwrap();
        let media_box = page.get(b"MediaBox").unwrap().as_array().unwrap();
        assert_eq!(media_box[2], Object::Real(612.0));
        assert_eq!(media_box[3], Object::Real(792.0));
    }

    #[test]
    fn test_assembled_document_has_no_form() {
        let doc = assemble_document(&[raster(612.0, 792.0, 72.0)]).unwrap();
        let catalog_id = doc.trailer.get(b"Root").and_then(Object::as_reference).unwrap();
        let catalog = doc.get_dictionary(catalog_id).unwrap();
        assert!(catalog.get(b"AcroForm").is_err());
    }

    #[test]
    fn test_one_page_per_raster() {
        let doc = assemble_document(&[
            raster(612.0, 792.0, 72.0),
            raster(612.0, 792.0, 72.0),
            raster(792.0, 612.0, 72.0),
        ])
        .unwrap();
        assert_eq!(doc.get_pages().len(), 3);
    }
}
