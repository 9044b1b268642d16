//! AcroForm widget filling.
//!
//! Widgets are discovered by walking every page's /Annots array once.
//! A widget's fully-qualified name is its own /T joined onto the /T of
//! each ancestor in its /Parent chain, dot-separated, which matches
//! both the descriptive names on the AcroForm layouts and the
//! `F[0].P1[0].X[0]` names XFA-derived forms expose.

use std::collections::{BTreeSet, HashSet};

use lopdf::{Dictionary, Document, Object, ObjectId};
use serde::Serialize;
use tracing::{debug, warn};

use acord_schema::FlatFieldMap;

use crate::error::RenderError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Checkbox,
}

/// One discovered widget, for `acord-cli list`.
#[derive(Debug, Clone, Serialize)]
pub struct FieldInfo {
    pub name: String,
    pub page: u32,
    pub kind: FieldKind,
    pub value: String,
}

/// Outcome of one fill pass over a document.
#[derive(Debug, Clone, Serialize)]
pub struct FillReport {
    /// Map keys that matched at least one widget.
    pub filled: usize,
    /// Distinct field names present on the form.
    pub total: usize,
    /// Map keys with no widget on this form, sorted.
    pub skipped: Vec<String>,
}

struct Widget {
    /// The annotation dictionary itself.
    id: ObjectId,
    /// Nearest ancestor (or self) carrying /T, where /V belongs.
    value_id: ObjectId,
    name: String,
    page: u32,
    kind: FieldKind,
    /// Appearance state that turns a checkbox on.
    on_state: Vec<u8>,
}

fn resolve_dict<'a>(doc: &'a Document, obj: &'a Object) -> Option<&'a Dictionary> {
    match obj {
        Object::Dictionary(d) => Some(d),
        Object::Reference(id) => doc.get_object(*id).ok().and_then(|o| o.as_dict().ok()),
        _ => None,
    }
}

fn name_component(dict: &Dictionary) -> Option<String> {
    match dict.get(b"T") {
        Ok(Object::String(bytes, _)) => Some(String::from_utf8_lossy(bytes).into_owned()),
        _ => None,
    }
}

/// Fully-qualified name plus the object that owns the terminal /T.
fn qualified_name(doc: &Document, id: ObjectId) -> Option<(String, ObjectId)> {
    let mut parts = Vec::new();
    let mut value_id = None;
    let mut current = Some(id);
    let mut guard = 0;
    while let Some(cid) = current {
        guard += 1;
        if guard > 32 {
            break;
        }
        let dict = doc.get_dictionary(cid).ok()?;
        if let Some(part) = name_component(dict) {
            if value_id.is_none() {
                value_id = Some(cid);
            }
            parts.push(part);
        }
        current = match dict.get(b"Parent") {
            Ok(Object::Reference(pid)) => Some(*pid),
            _ => None,
        };
    }
    let value_id = value_id?;
    parts.reverse();
    Some((parts.join("."), value_id))
}

/// Inherited lookup along the /Parent chain.
fn inherited<'a>(doc: &'a Document, id: ObjectId, key: &[u8]) -> Option<&'a Object> {
    let mut current = Some(id);
    let mut guard = 0;
    while let Some(cid) = current {
        guard += 1;
        if guard > 32 {
            break;
        }
        let dict = doc.get_dictionary(cid).ok()?;
        if let Ok(obj) = dict.get(key) {
            return Some(obj);
        }
        current = match dict.get(b"Parent") {
            Ok(Object::Reference(pid)) => Some(*pid),
            _ => None,
        };
    }
    None
}

/// The /AP /N state name that is not "Off". Defaults to "Yes" when the
/// widget carries no appearance states.
fn checkbox_on_state(doc: &Document, dict: &Dictionary) -> Vec<u8> {
    if let Ok(ap) = dict.get(b"AP") {
        if let Some(ap) = resolve_dict(doc, ap) {
            if let Ok(normal) = ap.get(b"N") {
                if let Some(states) = resolve_dict(doc, normal) {
                    for (state, _) in states.iter() {
                        if state.as_slice() != b"Off" {
                            return state.clone();
                        }
                    }
                }
            }
        }
    }
    b"Yes".to_vec()
}

fn collect_widgets(doc: &Document) -> Vec<Widget> {
    let mut widgets = Vec::new();
    let mut seen = HashSet::new();
    for (page_number, page_id) in doc.get_pages() {
        let Ok(page) = doc.get_dictionary(page_id) else {
            continue;
        };
        let annots: Vec<ObjectId> = match page.get(b"Annots") {
            Ok(Object::Array(items)) => items
                .iter()
                .filter_map(|o| o.as_reference().ok())
                .collect(),
            Ok(Object::Reference(id)) => doc
                .get_object(*id)
                .ok()
                .and_then(|o| o.as_array().ok())
                .map(|items| {
                    items
                        .iter()
                        .filter_map(|o| o.as_reference().ok())
                        .collect()
                })
                .unwrap_or_default(),
            _ => Vec::new(),
        };
        for annot_id in annots {
            if !seen.insert(annot_id) {
                continue;
            }
            let Ok(dict) = doc.get_dictionary(annot_id) else {
                continue;
            };
            let is_widget = matches!(dict.get(b"Subtype"), Ok(Object::Name(n)) if n == b"Widget");
            if !is_widget {
                continue;
            }
            let Some((name, value_id)) = qualified_name(doc, annot_id) else {
                continue;
            };
            let field_type = inherited(doc, annot_id, b"FT");
            let kind = match field_type {
                Some(Object::Name(n)) if n == b"Btn" => FieldKind::Checkbox,
                _ => FieldKind::Text,
            };
            let on_state = if kind == FieldKind::Checkbox {
                checkbox_on_state(doc, dict)
            } else {
                Vec::new()
            };
            widgets.push(Widget {
                id: annot_id,
                value_id,
                name,
                page: page_number,
                kind,
                on_state,
            });
        }
    }
    widgets
}

fn truthy(value: &str) -> bool {
    !matches!(value, "" | "Off" | "No" | "false" | "0")
}

fn set_need_appearances(doc: &mut Document) -> Result<(), RenderError> {
    let catalog_id = doc
        .trailer
        .get(b"Root")
        .and_then(Object::as_reference)
        .map_err(|e| RenderError::Fill(format!("document has no catalog: {}", e)))?;
    let acro_ref = match doc.get_dictionary(catalog_id)?.get(b"AcroForm") {
        Ok(Object::Reference(id)) => Some(*id),
        Ok(Object::Dictionary(_)) => None,
        _ => return Ok(()),
    };
    match acro_ref {
        Some(id) => doc
            .get_object_mut(id)?
            .as_dict_mut()?
            .set("NeedAppearances", Object::Boolean(true)),
        None => doc
            .get_object_mut(catalog_id)?
            .as_dict_mut()?
            .get_mut(b"AcroForm")?
            .as_dict_mut()?
            .set("NeedAppearances", Object::Boolean(true)),
    }
    Ok(())
}

/// Fill every widget whose qualified name appears in `fields`. Values
/// land on the field dictionary; checkbox appearance state lands on the
/// widget so viewers without appearance regeneration still show the
/// mark. Unknown map keys are reported, never fatal.
pub fn fill_fields(doc: &mut Document, fields: &FlatFieldMap) -> Result<FillReport, RenderError> {
    let widgets = collect_widgets(doc);
    let total = widgets
        .iter()
        .map(|w| w.name.as_str())
        .collect::<BTreeSet<_>>()
        .len();

    let mut matched: BTreeSet<&str> = BTreeSet::new();
    for widget in &widgets {
        let Some(value) = fields.get(&widget.name) else {
            continue;
        };
        match widget.kind {
            FieldKind::Text => {
                let target = doc.get_object_mut(widget.value_id)?.as_dict_mut()?;
                target.set("V", Object::string_literal(value));
                // Stale appearance streams would shadow the new value.
                target.remove(b"AP");
                if widget.value_id != widget.id {
                    doc.get_object_mut(widget.id)?.as_dict_mut()?.remove(b"AP");
                }
            }
            FieldKind::Checkbox => {
                let state = if truthy(value) {
                    widget.on_state.clone()
                } else {
                    b"Off".to_vec()
                };
                doc.get_object_mut(widget.value_id)?
                    .as_dict_mut()?
                    .set("V", Object::Name(state.clone()));
                doc.get_object_mut(widget.id)?
                    .as_dict_mut()?
                    .set("AS", Object::Name(state));
            }
        }
        matched.insert(widget.name.as_str());
        debug!(field = %widget.name, page = widget.page, "filled widget");
    }

    set_need_appearances(doc)?;

    let skipped: Vec<String> = fields
        .keys()
        .filter(|k| !matched.contains(*k))
        .map(str::to_string)
        .collect();
    if !skipped.is_empty() {
        warn!(count = skipped.len(), "map keys with no widget on this form");
    }
    Ok(FillReport {
        filled: matched.len(),
        total,
        skipped,
    })
}

/// Enumerate widgets with their current values, for `acord-cli list`.
pub fn list_fields(doc: &Document) -> Vec<FieldInfo> {
    collect_widgets(doc)
        .into_iter()
        .map(|w| {
            let value = match inherited(doc, w.value_id, b"V") {
                Some(Object::String(bytes, _)) => String::from_utf8_lossy(bytes).into_owned(),
                Some(Object::Name(n)) => String::from_utf8_lossy(n).into_owned(),
                _ => String::new(),
            };
            FieldInfo {
                name: w.name,
                page: w.page,
                kind: w.kind,
                value,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::{dictionary, Stream};
    use pretty_assertions::assert_eq;

    fn form_pdf() -> Document {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let name_field = doc.add_object(dictionary! {
            "Type" => "Annot",
            "Subtype" => "Widget",
            "FT" => "Tx",
            "T" => Object::string_literal("NamedInsured_FullName_A"),
            "Rect" => vec![50.into(), 700.into(), 300.into(), 715.into()],
        });
        let date_field = doc.add_object(dictionary! {
            "Type" => "Annot",
            "Subtype" => "Widget",
            "FT" => "Tx",
            "T" => Object::string_literal("Form_CompletionDate_A"),
            "Rect" => vec![400.into(), 700.into(), 560.into(), 715.into()],
        });

        let on_stream = doc.add_object(Stream::new(dictionary! {}, b"".to_vec()));
        let off_stream = doc.add_object(Stream::new(dictionary! {}, b"".to_vec()));
        let checkbox = doc.add_object(dictionary! {
            "Type" => "Annot",
            "Subtype" => "Widget",
            "FT" => "Btn",
            "T" => Object::string_literal("Policy_PolicyType_SpecialIndicator_A"),
            "Rect" => vec![50.into(), 650.into(), 60.into(), 660.into()],
            "AP" => dictionary! {
                "N" => dictionary! {
                    "1" => Object::Reference(on_stream),
                    "Off" => Object::Reference(off_stream),
                },
            },
        });

        // XFA-style hierarchy: F[0] -> P1[0] -> Text1[0] widget.
        let root_node = doc.add_object(dictionary! {
            "T" => Object::string_literal("F[0]"),
        });
        let page_node = doc.add_object(dictionary! {
            "T" => Object::string_literal("P1[0]"),
            "Parent" => Object::Reference(root_node),
        });
        let xfa_widget = doc.add_object(dictionary! {
            "Type" => "Annot",
            "Subtype" => "Widget",
            "FT" => "Tx",
            "T" => Object::string_literal("Text1[0]"),
            "Parent" => Object::Reference(page_node),
            "Rect" => vec![50.into(), 600.into(), 300.into(), 615.into()],
        });

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => Object::Reference(pages_id),
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Annots" => vec![
                Object::Reference(name_field),
                Object::Reference(date_field),
                Object::Reference(checkbox),
                Object::Reference(xfa_widget),
            ],
        });
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => vec![Object::Reference(page_id)],
            "Count" => 1,
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages));
        let acro_form = doc.add_object(dictionary! {
            "Fields" => vec![
                Object::Reference(name_field),
                Object::Reference(date_field),
                Object::Reference(checkbox),
                Object::Reference(root_node),
            ],
        });
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => Object::Reference(pages_id),
            "AcroForm" => Object::Reference(acro_form),
        });
        doc.trailer.set("Root", catalog_id);
        doc
    }

    fn value_of(doc: &Document, name: &str) -> Option<String> {
        list_fields(doc)
            .into_iter()
            .find(|f| f.name == name)
            .map(|f| f.value)
    }

    #[test]
    fn test_fills_text_and_checkbox_widgets() {
        let mut doc = form_pdf();
        let fields: FlatFieldMap = [
            ("NamedInsured_FullName_A", "Acme Holdings LLC"),
            ("Policy_PolicyType_SpecialIndicator_A", "Yes"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let report = fill_fields(&mut doc, &fields).unwrap();
        assert_eq!(report.filled, 2);
        assert_eq!(report.total, 4);
        assert!(report.skipped.is_empty());
        assert_eq!(
            value_of(&doc, "NamedInsured_FullName_A").as_deref(),
            Some("Acme Holdings LLC")
        );
        // Checkbox takes its on-state from /AP /N, not a literal "Yes".
        assert_eq!(
            value_of(&doc, "Policy_PolicyType_SpecialIndicator_A").as_deref(),
            Some("1")
        );
    }

    #[test]
    fn test_unknown_keys_reported_not_fatal() {
        let mut doc = form_pdf();
        let fields: FlatFieldMap = [
            ("Form_CompletionDate_A", "08/30/2026"),
            ("NoSuchField_A", "x"),
            ("AnotherMissing_B", "y"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let report = fill_fields(&mut doc, &fields).unwrap();
        assert_eq!(report.filled, 1);
        assert_eq!(
            report.skipped,
            vec!["AnotherMissing_B".to_string(), "NoSuchField_A".to_string()]
        );
    }

    #[test]
    fn test_qualified_names_join_parent_chain() {
        let doc = form_pdf();
        let names: Vec<String> = list_fields(&doc).into_iter().map(|f| f.name).collect();
        assert!(names.contains(&"F[0].P1[0].Text1[0]".to_string()));
    }

    #[test]
    fn test_fill_sets_need_appearances() {
        let mut doc = form_pdf();
        fill_fields(&mut doc, &FlatFieldMap::new()).unwrap();
        let catalog_id = doc.trailer.get(b"Root").and_then(Object::as_reference).unwrap();
        let acro_id = doc
            .get_dictionary(catalog_id)
            .unwrap()
            .get(b"AcroForm")
            .and_then(Object::as_reference)
            .unwrap();
        let acro = doc.get_dictionary(acro_id).unwrap();
        assert!(matches!(
            acro.get(b"NeedAppearances"),
            Ok(Object::Boolean(true))
        ));
    }

    #[test]
    fn test_empty_value_turns_checkbox_off() {
        let mut doc = form_pdf();
        let fields: FlatFieldMap =
            std::iter::once(("Policy_PolicyType_SpecialIndicator_A".to_string(), "Off".to_string()))
                .collect();
        fill_fields(&mut doc, &fields).unwrap();
        assert_eq!(
            value_of(&doc, "Policy_PolicyType_SpecialIndicator_A").as_deref(),
            Some("Off")
        );
    }
}
