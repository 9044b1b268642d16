//! Signature composition for the certificate forms' authorized
//! representative box.
//!
//! Signature placement is cosmetic. Every failure here degrades to a
//! blank box and a warning; nothing in this module aborts generation.

use std::path::Path;

use image::{imageops, RgbaImage};
use imageproc::drawing::draw_text_mut;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};
use rusttype::{point, Font, Scale};
use tracing::warn;

use acord_schema::SignatureRect;

use crate::draw;
use crate::error::RenderError;

/// What to place in the signature box.
pub enum SignatureAsset {
    /// Encoded image bytes (PNG, JPEG).
    Image(Vec<u8>),
    /// A name to set in a script face, or plain Helvetica when no face
    /// is available.
    Typed(String),
}

const XOBJECT_NAME: &str = "Sig0";
const FALLBACK_FONT_NAME: &str = "HelvSig";
const TYPED_RASTER_SCALE: f32 = 64.0;

/// Place the signature inside `rect` on `page_index`. Returns whether
/// anything was drawn.
pub fn apply_signature(
    doc: &mut Document,
    page_index: usize,
    rect: SignatureRect,
    asset: &SignatureAsset,
    font_path: Option<&Path>,
) -> bool {
    let pages: Vec<ObjectId> = doc.get_pages().into_values().collect();
    let Some(&page_id) = pages.get(page_index) else {
        warn!(page = page_index, "signature page not present in document");
        return false;
    };
    let result = match asset {
        SignatureAsset::Image(bytes) => place_image(doc, page_id, rect, bytes),
        SignatureAsset::Typed(name) => place_typed(doc, page_id, rect, name, font_path),
    };
    match result {
        Ok(placed) => placed,
        Err(e) => {
            warn!(error = %e, "signature composition failed, leaving box blank");
            false
        }
    }
}

fn place_image(
    doc: &mut Document,
    page_id: ObjectId,
    rect: SignatureRect,
    bytes: &[u8],
) -> Result<bool, RenderError> {
    let decoded = match image::load_from_memory(bytes) {
        Ok(img) => img,
        Err(e) => {
            warn!(error = %e, "signature image unreadable");
            return Ok(false);
        }
    };
    let rgba = decoded.to_rgba8();
    place_raster(doc, page_id, rect, rgba, rect.height)
}

fn place_typed(
    doc: &mut Document,
    page_id: ObjectId,
    rect: SignatureRect,
    name: &str,
    font_path: Option<&Path>,
) -> Result<bool, RenderError> {
    if name.trim().is_empty() {
        return Ok(false);
    }
    if let Some(path) = font_path {
        match std::fs::read(path) {
            Ok(data) => {
                if let Some(font) = Font::try_from_vec(data) {
                    if let Some(raster) = rasterize_name(&font, name) {
                        return place_raster(doc, page_id, rect, raster, rect.height * 0.82);
                    }
                }
                warn!(path = %path.display(), "signature font unusable, using plain text");
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "signature font unreadable, using plain text");
            }
        }
    }

    let page_height = draw::page_height(doc, page_id)?;
    let font_id = draw::helvetica(doc);
    draw::register_font(doc, page_id, FALLBACK_FONT_NAME, font_id)?;
    let mut ops = Vec::new();
    draw::text_block(
        &mut ops,
        FALLBACK_FONT_NAME,
        14.0,
        rect.x + 10.0,
        page_height - rect.y - 16.0,
        name,
    );
    draw::append_content(doc, page_id, Content { operations: ops })?;
    Ok(true)
}

fn rasterize_name(font: &Font, name: &str) -> Option<RgbaImage> {
    let scale = Scale::uniform(TYPED_RASTER_SCALE);
    let metrics = font.v_metrics(scale);
    let glyphs: Vec<_> = font.layout(name, scale, point(0.0, metrics.ascent)).collect();
    let last = glyphs.last()?;
    let width =
        (last.position().x + last.unpositioned().h_metrics().advance_width).ceil() as u32 + 4;
    let height = (metrics.ascent - metrics.descent).ceil() as u32 + 4;
    if width == 0 || height == 0 {
        return None;
    }
    let mut img = RgbaImage::from_pixel(width, height, image::Rgba([0, 0, 0, 0]));
    draw_text_mut(&mut img, image::Rgba([24, 24, 64, 255]), 2, 2, scale, font, name);
    Some(img)
}

/// Scale to `target_height`, preserve aspect, center horizontally in
/// the rect, and embed as an RGB XObject with an alpha SMask.
fn place_raster(
    doc: &mut Document,
    page_id: ObjectId,
    rect: SignatureRect,
    mut rgba: RgbaImage,
    target_height: f32,
) -> Result<bool, RenderError> {
    let (px_w, px_h) = rgba.dimensions();
    if px_w == 0 || px_h == 0 {
        return Ok(false);
    }
    let aspect = px_w as f32 / px_h as f32;
    let (width, height) = {
        let w = target_height * aspect;
        if w > rect.width {
            (rect.width, rect.width / aspect)
        } else {
            (w, target_height)
        }
    };
    let x = rect.x + (rect.width - width) / 2.0;
    let page_height = draw::page_height(doc, page_id)?;
    let y = page_height - rect.y - height;

    // Image space runs bottom-up under the cm matrix.
    imageops::flip_vertical_in_place(&mut rgba);
    let mut rgb = Vec::with_capacity((px_w * px_h * 3) as usize);
    let mut alpha = Vec::with_capacity((px_w * px_h) as usize);
    for pixel in rgba.pixels() {
        rgb.extend_from_slice(&pixel.0[..3]);
        alpha.push(pixel.0[3]);
    }

    let smask_id = doc.add_object(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => px_w as i64,
            "Height" => px_h as i64,
            "ColorSpace" => "DeviceGray",
            "BitsPerComponent" => 8,
            "Filter" => "FlateDecode",
        },
        deflate(&alpha)?,
    ));
    let image_id = doc.add_object(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => px_w as i64,
            "Height" => px_h as i64,
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
            "Filter" => "FlateDecode",
            "SMask" => Object::Reference(smask_id),
        },
        deflate(&rgb)?,
    ));
    draw::register_xobject(doc, page_id, XOBJECT_NAME, image_id)?;

    let content = Content {
        operations: vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    Object::Real(width),
                    Object::Real(0.0),
                    Object::Real(0.0),
                    Object::Real(height),
                    Object::Real(x),
                    Object::Real(y),
                ],
            ),
            Operation::new("Do", vec![Object::Name(XOBJECT_NAME.as_bytes().to_vec())]),
            Operation::new("Q", vec![]),
        ],
    };
    draw::append_content(doc, page_id, content)?;
    Ok(true)
}

fn deflate(data: &[u8]) -> Result<Vec<u8>, RenderError> {
    use std::io::Write as _;
    let mut encoder =
        flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flatten::{assemble_document, PageRaster};
    use image::RgbImage;
    use pretty_assertions::assert_eq;

    const RECT: SignatureRect = SignatureRect {
        x: 310.0,
        y: 721.0,
        width: 280.0,
        height: 22.0,
    };

    fn one_page_doc() -> Document {
        assemble_document(&[PageRaster {
            width_pts: 612.0,
            height_pts: 792.0,
            image: RgbImage::from_pixel(61, 79, image::Rgb([255, 255, 255])),
        }])
        .unwrap()
    }

    fn png_bytes(w: u32, h: u32) -> Vec<u8> {
        let img = image::DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            w,
            h,
            image::Rgba([10, 10, 40, 255]),
        ));
        let mut out = std::io::Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageOutputFormat::Png).unwrap();
        out.into_inner()
    }

    fn page_content(doc: &Document) -> String {
        let page_id = doc.get_pages()[&1];
        String::from_utf8_lossy(&doc.get_page_content(page_id).unwrap()).into_owned()
    }

    #[test]
    fn test_image_signature_embedded_and_centered() {
        let mut doc = one_page_doc();
        assert!(apply_signature(
            &mut doc,
            0,
            RECT,
            &SignatureAsset::Image(png_bytes(200, 50)),
            None,
        ));
        let content = page_content(&doc);
        assert!(content.contains("/Sig0 Do"));
        // 22pt tall, 88pt wide at 4:1, centered: x = 310 + (280-88)/2 = 406
        assert!(content.contains("406"));
    }

    #[test]
    fn test_unreadable_image_leaves_box_blank() {
        let mut doc = one_page_doc();
        let before = page_content(&doc);
        let placed = apply_signature(
            &mut doc,
            0,
            RECT,
            &SignatureAsset::Image(b"not an image".to_vec()),
            None,
        );
        assert!(!placed);
        assert_eq!(page_content(&doc), before);
    }

    #[test]
    fn test_typed_without_font_uses_plain_text() {
        let mut doc = one_page_doc();
        assert!(apply_signature(
            &mut doc,
            0,
            RECT,
            &SignatureAsset::Typed("Jordan Avery".to_string()),
            None,
        ));
        assert!(page_content(&doc).contains("(Jordan Avery) Tj"));
    }

    #[test]
    fn test_empty_typed_name_draws_nothing() {
        let mut doc = one_page_doc();
        assert!(!apply_signature(
            &mut doc,
            0,
            RECT,
            &SignatureAsset::Typed("  ".to_string()),
            None,
        ));
    }

    #[test]
    fn test_missing_page_reports_not_placed() {
        let mut doc = one_page_doc();
        assert!(!apply_signature(
            &mut doc,
            5,
            RECT,
            &SignatureAsset::Typed("Jordan Avery".to_string()),
            None,
        ));
    }

    #[test]
    fn test_wide_image_clamped_to_rect_width() {
        let mut doc = one_page_doc();
        assert!(apply_signature(
            &mut doc,
            0,
            RECT,
            &SignatureAsset::Image(png_bytes(2000, 50)),
            None,
        ));
        // 40:1 aspect would be 880pt wide; clamped to the 280pt box.
        let content = page_content(&doc);
        assert!(content.contains("280"));
    }
}
