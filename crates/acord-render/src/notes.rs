//! Broker-notes document generation.
//!
//! Notes render as a standalone letter-size PDF, one amber callout box
//! per note, flowing top to bottom with page breaks between boxes. A
//! box never splits across pages.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};

use acord_schema::BrokerNote;

use crate::error::RenderError;

pub const PAGE_WIDTH: f32 = 612.0;
pub const PAGE_HEIGHT: f32 = 792.0;

const WRAP_PLAIN: usize = 85;
const WRAP_TITLED: usize = 90;
const FLOW_BOTTOM: f32 = 750.0;
const FLOW_TOP: f32 = 50.0;

const BOX_LEFT: f32 = 40.0;
const BOX_WIDTH: f32 = 532.0;
const TEXT_LEFT: f32 = 48.0;

const FONT_NAME: &str = "F1";

const BOX_FILL: (f32, f32, f32) = (1.0, 0.95, 0.85);
const BOX_STROKE: (f32, f32, f32) = (0.8, 0.6, 0.1);
const BODY_INK: (f32, f32, f32) = (0.2, 0.2, 0.2);
const TITLE_INK: (f32, f32, f32) = (0.6, 0.4, 0.05);
const HEADER_INK: (f32, f32, f32) = (0.2, 0.2, 0.6);

/// Greedy word wrap to a character budget. Words longer than the
/// budget are hard-split so no line ever exceeds it.
pub fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let mut line = String::new();
        for word in paragraph.split_whitespace() {
            let mut word = word.to_string();
            while word.chars().count() > max_chars {
                if !line.is_empty() {
                    lines.push(std::mem::take(&mut line));
                }
                let head: String = word.chars().take(max_chars).collect();
                word = word.chars().skip(max_chars).collect();
                lines.push(head);
            }
            if line.is_empty() {
                line = word;
            } else if line.chars().count() + 1 + word.chars().count() <= max_chars {
                line.push(' ');
                line.push_str(&word);
            } else {
                lines.push(std::mem::take(&mut line));
                line = word;
            }
        }
        lines.push(line);
    }
    while lines.len() > 1 && lines.last().is_some_and(String::is_empty) {
        lines.pop();
    }
    lines
}

struct NotesBuilder {
    doc: Document,
    pages_id: ObjectId,
    font_id: ObjectId,
    kids: Vec<Object>,
    ops: Vec<Operation>,
    /// Flow cursor, measured from the top of the page.
    y: f32,
}

impl NotesBuilder {
    fn new() -> Self {
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });
        let mut builder = NotesBuilder {
            doc,
            pages_id,
            font_id,
            kids: Vec::new(),
            ops: Vec::new(),
            y: FLOW_TOP,
        };
        builder.header();
        builder
    }

    fn header(&mut self) {
        self.text(14.0, 50.0, self.y, HEADER_INK, "Broker Notes");
        self.text(8.0, 50.0, self.y + 18.0, (0.5, 0.5, 0.5), "Internal processing notes");
        self.y += 34.0;
    }

    fn text(&mut self, size: f32, x: f32, y_top: f32, ink: (f32, f32, f32), text: &str) {
        self.ops.push(Operation::new("BT", vec![]));
        self.ops.push(Operation::new(
            "Tf",
            vec![Object::Name(FONT_NAME.as_bytes().to_vec()), Object::Real(size)],
        ));
        self.ops.push(Operation::new(
            "rg",
            vec![Object::Real(ink.0), Object::Real(ink.1), Object::Real(ink.2)],
        ));
        self.ops.push(Operation::new(
            "Td",
            vec![Object::Real(x), Object::Real(PAGE_HEIGHT - y_top)],
        ));
        self.ops
            .push(Operation::new("Tj", vec![Object::string_literal(text)]));
        self.ops.push(Operation::new("ET", vec![]));
    }

    fn callout_box(&mut self, height: f32) {
        self.ops.push(Operation::new("q", vec![]));
        self.ops.push(Operation::new(
            "rg",
            vec![
                Object::Real(BOX_FILL.0),
                Object::Real(BOX_FILL.1),
                Object::Real(BOX_FILL.2),
            ],
        ));
        self.ops.push(Operation::new(
            "RG",
            vec![
                Object::Real(BOX_STROKE.0),
                Object::Real(BOX_STROKE.1),
                Object::Real(BOX_STROKE.2),
            ],
        ));
        self.ops.push(Operation::new("w", vec![Object::Real(0.5)]));
        self.ops.push(Operation::new(
            "re",
            vec![
                Object::Real(BOX_LEFT),
                Object::Real(PAGE_HEIGHT - self.y - height),
                Object::Real(BOX_WIDTH),
                Object::Real(height),
            ],
        ));
        self.ops.push(Operation::new("B", vec![]));
        self.ops.push(Operation::new("Q", vec![]));
    }

    fn ensure_room(&mut self, box_height: f32) {
        if self.y + box_height > FLOW_BOTTOM {
            self.flush_page();
            self.y = FLOW_TOP;
        }
    }

    fn plain_note(&mut self, body: &str) {
        let lines = wrap_text(body, WRAP_PLAIN);
        let box_height = 20.0 + lines.len() as f32 * 12.0 + 8.0;
        self.ensure_room(box_height);
        self.callout_box(box_height);
        let mut line_y = self.y + 14.0;
        for line in &lines {
            self.text(8.0, TEXT_LEFT, line_y, BODY_INK, line);
            line_y += 12.0;
        }
        self.y += box_height + 6.0;
    }

    fn titled_note(&mut self, title: &str, body: &str) {
        let lines = wrap_text(body, WRAP_TITLED);
        let box_height = 28.0 + lines.len() as f32 * 11.0 + 8.0;
        self.ensure_room(box_height);
        self.callout_box(box_height);
        self.text(9.0, TEXT_LEFT, self.y + 14.0, TITLE_INK, title);
        let mut line_y = self.y + 28.0;
        for line in &lines {
            self.text(8.0, TEXT_LEFT, line_y, BODY_INK, line);
            line_y += 11.0;
        }
        self.y += box_height + 8.0;
    }

    fn flush_page(&mut self) {
        let ops = std::mem::take(&mut self.ops);
        let content = Content { operations: ops };
        let content_id = self.doc.add_object(Stream::new(
            dictionary! {},
            content.encode().unwrap_or_default(),
        ));
        let page_id = self.doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => Object::Reference(self.pages_id),
            "MediaBox" => vec![
                0.into(),
                0.into(),
                Object::Real(PAGE_WIDTH),
                Object::Real(PAGE_HEIGHT),
            ],
            "Resources" => dictionary! {
                "Font" => dictionary! {
                    FONT_NAME => Object::Reference(self.font_id),
                },
            },
            "Contents" => Object::Reference(content_id),
        });
        self.kids.push(Object::Reference(page_id));
    }

    fn finish(mut self) -> Result<Vec<u8>, RenderError> {
        self.flush_page();
        let count = self.kids.len() as i64;
        let kids = std::mem::take(&mut self.kids);
        self.doc.objects.insert(
            self.pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );
        let catalog_id = self.doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => Object::Reference(self.pages_id),
        });
        self.doc.trailer.set("Root", catalog_id);
        let mut out = Vec::new();
        self.doc
            .save_to(&mut out)
            .map_err(|e| RenderError::Notes(e.to_string()))?;
        Ok(out)
    }
}

/// Render the notes document and return its bytes.
pub fn build_notes(notes: &[BrokerNote]) -> Result<Vec<u8>, RenderError> {
    if notes.is_empty() {
        return Err(RenderError::Notes("no notes provided".to_string()));
    }
    let mut builder = NotesBuilder::new();
    for note in notes {
        match note {
            BrokerNote::Text(body) => builder.plain_note(body),
            BrokerNote::Titled { title, body } => builder.titled_note(title, body),
        }
    }
    builder.finish()
}
