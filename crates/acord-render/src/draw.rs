//! Low-level lopdf helpers shared by the overlay, signature and notes
//! drawing paths.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};

use crate::error::RenderError;

/// Standard-14 Helvetica, registered once per document and referenced
/// from every page that draws text.
pub(crate) fn helvetica(doc: &mut Document) -> ObjectId {
    doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    })
}

fn as_number(obj: &Object) -> f32 {
    match obj {
        Object::Integer(i) => *i as f32,
        Object::Real(r) => *r,
        _ => 0.0,
    }
}

/// MediaBox height in points, following the Pages inheritance chain.
pub(crate) fn page_height(doc: &Document, page_id: ObjectId) -> Result<f32, RenderError> {
    let mut current = page_id;
    loop {
        let dict = doc.get_dictionary(current)?;
        if let Ok(media_box) = dict.get(b"MediaBox") {
            let rect = match media_box {
                Object::Array(a) => a.clone(),
                Object::Reference(id) => doc.get_object(*id)?.as_array()?.clone(),
                _ => Vec::new(),
            };
            if rect.len() == 4 {
                return Ok(as_number(&rect[3]) - as_number(&rect[1]));
            }
        }
        match dict.get(b"Parent") {
            Ok(Object::Reference(id)) => current = *id,
            _ => {
                return Err(RenderError::Overlay(format!(
                    "page {:?} has no MediaBox",
                    page_id
                )))
            }
        }
    }
}

/// Append encoded operations as a new content stream, preserving any
/// existing streams on the page.
pub(crate) fn append_content(
    doc: &mut Document,
    page_id: ObjectId,
    content: Content,
) -> Result<(), RenderError> {
    let encoded = content
        .encode()
        .map_err(|e| RenderError::Overlay(e.to_string()))?;
    let stream_id = doc.add_object(Stream::new(dictionary! {}, encoded));

    enum Contents {
        Missing,
        Single(ObjectId),
        Array,
    }
    let shape = match doc.get_dictionary(page_id)?.get(b"Contents") {
        Ok(Object::Reference(id)) => Contents::Single(*id),
        Ok(Object::Array(_)) => Contents::Array,
        _ => Contents::Missing,
    };

    let page = doc.get_object_mut(page_id)?.as_dict_mut()?;
    match shape {
        Contents::Missing => page.set("Contents", Object::Reference(stream_id)),
        Contents::Single(existing) => page.set(
            "Contents",
            Object::Array(vec![
                Object::Reference(existing),
                Object::Reference(stream_id),
            ]),
        ),
        Contents::Array => {
            if let Ok(array) = page.get_mut(b"Contents").and_then(Object::as_array_mut) {
                array.push(Object::Reference(stream_id));
            }
        }
    }
    Ok(())
}

fn resources_mut(doc: &mut Document, page_id: ObjectId) -> Result<&mut Dictionary, RenderError> {
    enum Res {
        Indirect(ObjectId),
        Inline,
        Missing,
    }
    let shape = match doc.get_dictionary(page_id)?.get(b"Resources") {
        Ok(Object::Reference(id)) => Res::Indirect(*id),
        Ok(Object::Dictionary(_)) => Res::Inline,
        _ => Res::Missing,
    };
    match shape {
        Res::Indirect(id) => Ok(doc.get_object_mut(id)?.as_dict_mut()?),
        Res::Inline => Ok(doc
            .get_object_mut(page_id)?
            .as_dict_mut()?
            .get_mut(b"Resources")?
            .as_dict_mut()?),
        Res::Missing => {
            let page = doc.get_object_mut(page_id)?.as_dict_mut()?;
            page.set("Resources", Dictionary::new());
            Ok(page.get_mut(b"Resources")?.as_dict_mut()?)
        }
    }
}

/// Register `id` under the page's /Resources /Font table.
pub(crate) fn register_font(
    doc: &mut Document,
    page_id: ObjectId,
    name: &str,
    id: ObjectId,
) -> Result<(), RenderError> {
    let indirect_fonts = {
        let resources = resources_mut(doc, page_id)?;
        match resources.get(b"Font") {
            Ok(Object::Reference(fonts_id)) => Some(*fonts_id),
            Ok(Object::Dictionary(_)) => {
                resources
                    .get_mut(b"Font")?
                    .as_dict_mut()?
                    .set(name, Object::Reference(id));
                None
            }
            _ => {
                let mut fonts = Dictionary::new();
                fonts.set(name, Object::Reference(id));
                resources.set("Font", Object::Dictionary(fonts));
                None
            }
        }
    };
    if let Some(fonts_id) = indirect_fonts {
        doc.get_object_mut(fonts_id)?
            .as_dict_mut()?
            .set(name, Object::Reference(id));
    }
    Ok(())
}

/// Register an image XObject under the page's /Resources /XObject table.
pub(crate) fn register_xobject(
    doc: &mut Document,
    page_id: ObjectId,
    name: &str,
    id: ObjectId,
) -> Result<(), RenderError> {
    let indirect = {
        let resources = resources_mut(doc, page_id)?;
        match resources.get(b"XObject") {
            Ok(Object::Reference(xobjects_id)) => Some(*xobjects_id),
            Ok(Object::Dictionary(_)) => {
                resources
                    .get_mut(b"XObject")?
                    .as_dict_mut()?
                    .set(name, Object::Reference(id));
                None
            }
            _ => {
                let mut xobjects = Dictionary::new();
                xobjects.set(name, Object::Reference(id));
                resources.set("XObject", Object::Dictionary(xobjects));
                None
            }
        }
    };
    if let Some(xobjects_id) = indirect {
        doc.get_object_mut(xobjects_id)?
            .as_dict_mut()?
            .set(name, Object::Reference(id));
    }
    Ok(())
}

/// One BT..ET block placing `text` with the baseline at (x, y) in PDF
/// bottom-up coordinates.
pub(crate) fn text_block(ops: &mut Vec<Operation>, font: &str, size: f32, x: f32, y: f32, text: &str) {
    ops.push(Operation::new("BT", vec![]));
    ops.push(Operation::new(
        "Tf",
        vec![Object::Name(font.as_bytes().to_vec()), Object::Real(size)],
    ));
    ops.push(Operation::new("Td", vec![Object::Real(x), Object::Real(y)]));
    ops.push(Operation::new("Tj", vec![Object::string_literal(text)]));
    ops.push(Operation::new("ET", vec![]));
}
