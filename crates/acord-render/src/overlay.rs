//! Draws resolved text overlays onto a flattened document.

use std::collections::BTreeMap;

use lopdf::content::Content;
use lopdf::{Document, ObjectId};
use tracing::warn;

use acord_schema::TextOverlay;

use crate::draw;
use crate::error::RenderError;

const FONT_NAME: &str = "HelvOv";

/// Apply every overlay. Overlay coordinates use y-from-top; conversion
/// to PDF space happens here against each page's MediaBox. Overlays
/// aimed at a page the document does not have are skipped with a
/// warning, which keeps single-page renditions of multi-page layouts
/// usable.
pub fn draw_overlays(doc: &mut Document, overlays: &[TextOverlay]) -> Result<(), RenderError> {
    if overlays.is_empty() {
        return Ok(());
    }
    let pages: Vec<ObjectId> = doc.get_pages().into_values().collect();
    let font_id = draw::helvetica(doc);

    let mut by_page: BTreeMap<usize, Vec<&TextOverlay>> = BTreeMap::new();
    for overlay in overlays {
        by_page.entry(overlay.page_index).or_default().push(overlay);
    }

    for (page_index, group) in by_page {
        let Some(&page_id) = pages.get(page_index) else {
            warn!(
                page = page_index,
                count = group.len(),
                "overlay page not present in document"
            );
            continue;
        };
        let height = draw::page_height(doc, page_id)?;
        draw::register_font(doc, page_id, FONT_NAME, font_id)?;

        let mut ops = Vec::new();
        for overlay in group {
            draw::text_block(
                &mut ops,
                FONT_NAME,
                overlay.font_size,
                overlay.x,
                height - overlay.y,
                &overlay.text,
            );
        }
        draw::append_content(doc, page_id, Content { operations: ops })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flatten::{assemble_document, PageRaster};
    use image::RgbImage;
    use pretty_assertions::assert_eq;

    fn three_page_doc() -> Document {
        let raster = || PageRaster {
            width_pts: 612.0,
            height_pts: 792.0,
            image: RgbImage::from_pixel(61, 79, image::Rgb([255, 255, 255])),
        };
        assemble_document(&[raster(), raster(), raster()]).unwrap()
    }

    fn overlay(page_index: usize, text: &str) -> TextOverlay {
        TextOverlay {
            page_index,
            x: 498.0,
            y: 164.0,
            font_size: 8.0,
            text: text.to_string(),
        }
    }

    fn page_content(doc: &Document, page_number: u32) -> String {
        let page_id = doc.get_pages()[&page_number];
        String::from_utf8_lossy(&doc.get_page_content(page_id).unwrap()).into_owned()
    }

    #[test]
    fn test_overlay_lands_on_target_page_only() {
        let mut doc = three_page_doc();
        draw_overlays(&mut doc, &[overlay(2, "N")]).unwrap();
        assert!(page_content(&doc, 3).contains("(N) Tj"));
        assert!(!page_content(&doc, 1).contains("Tj"));
        assert!(!page_content(&doc, 2).contains("Tj"));
    }

    #[test]
    fn test_y_converted_from_top() {
        let mut doc = three_page_doc();
        draw_overlays(&mut doc, &[overlay(0, "Y")]).unwrap();
        // 792 - 164 = 628
        assert!(page_content(&doc, 1).contains("628"));
    }

    #[test]
    fn test_out_of_range_page_skipped() {
        let mut doc = three_page_doc();
        draw_overlays(&mut doc, &[overlay(7, "Y"), overlay(0, "N")]).unwrap();
        assert!(page_content(&doc, 1).contains("(N) Tj"));
    }

    #[test]
    fn test_existing_content_preserved() {
        let mut doc = three_page_doc();
        let before = page_content(&doc, 1);
        draw_overlays(&mut doc, &[overlay(0, "Y")]).unwrap();
        let after = page_content(&doc, 1);
        assert!(after.contains("Do"));
        assert!(after.len() > before.len());
        assert_eq!(&after[..before.len()], before.as_str());
    }
}
