//! Overlay coordinate tables and overlay-plan resolution.
//!
//! Some values on the fixed layouts have no widget to hold them: the
//! General Info Y/N grid is checkbox-only, and the prior-carrier
//! Property column simply has no fields. Those values are drawn as
//! text at fixed coordinates after flattening. All coordinates are in
//! the page's own point space at 1:1 scale, with y measured from the
//! top of the page.

use crate::input::StructuredInput;
use crate::variant::FormVariant;

/// A Y/N question with two alternate x anchors sharing one baseline.
#[derive(Debug, Clone, Copy)]
pub struct YnSpec {
    pub field: &'static str,
    pub x_yes: f32,
    pub x_no: f32,
    pub y: f32,
}

/// One resolved draw instruction for the overlay compositor.
#[derive(Debug, Clone, PartialEq)]
pub struct TextOverlay {
    pub page_index: usize,
    pub x: f32,
    /// Distance from the top of the page.
    pub y: f32,
    pub font_size: f32,
    pub text: String,
}

/// Fixed rectangle for signature composition, y from page top.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignatureRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// General Info Y/N grid, ACORD 125 page 3 (0-indexed page 2). The
/// checkbox widgets there reject text values, so answers are drawn
/// after flattening.
pub const GENERAL_INFO_YN: &[YnSpec] = &[
    YnSpec { field: "ACORD_General_CoverageTerminated", x_yes: 498.0, x_no: 524.0, y: 164.0 },
    YnSpec { field: "ACORD_General_Subsidiary", x_yes: 498.0, x_no: 524.0, y: 179.0 },
    YnSpec { field: "ACORD_General_Parent", x_yes: 498.0, x_no: 524.0, y: 194.0 },
    YnSpec { field: "ACORD_General_OtherVentures", x_yes: 498.0, x_no: 524.0, y: 232.0 },
    YnSpec { field: "ACORD_General_Exposure", x_yes: 498.0, x_no: 524.0, y: 247.0 },
    YnSpec { field: "ACORD_General_Foreign", x_yes: 498.0, x_no: 524.0, y: 262.0 },
    YnSpec { field: "ACORD_General_Trust", x_yes: 498.0, x_no: 524.0, y: 277.0 },
    YnSpec { field: "ACORD_General_OtherInsurance", x_yes: 498.0, x_no: 524.0, y: 315.0 },
    YnSpec { field: "ACORD_General_PossessDrones", x_yes: 498.0, x_no: 524.0, y: 353.0 },
    YnSpec { field: "ACORD_General_HireDrones", x_yes: 498.0, x_no: 524.0, y: 368.0 },
    YnSpec { field: "ACORD_General_IndictedOrConvicted", x_yes: 498.0, x_no: 524.0, y: 406.0 },
    YnSpec { field: "ACORD_General_SafetyViolations", x_yes: 498.0, x_no: 524.0, y: 421.0 },
    YnSpec { field: "ACORD_General_NegativeFinancialAction", x_yes: 498.0, x_no: 524.0, y: 459.0 },
    YnSpec { field: "ACORD_General_JudgementLien", x_yes: 498.0, x_no: 524.0, y: 474.0 },
    YnSpec { field: "ACORD_General_Safety", x_yes: 498.0, x_no: 524.0, y: 512.0 },
    YnSpec { field: "ACORD_General_PastAllegations", x_yes: 498.0, x_no: 524.0, y: 550.0 },
];

/// Prior-carrier Property column x-offset. The widget columns on the
/// same table are named "Auto" but are generic; the Property column
/// has no widgets at all and is drawn at this shared offset.
pub const PRIOR_CARRIER_PROPERTY_X: f32 = 355.0;

/// Prior-carrier table baselines (page 3), one per row field.
pub const PRIOR_CARRIER_PROPERTY_ROWS: &[(&str, f32)] = &[
    ("carrier", 614.0),
    ("policy_number", 629.0),
    ("premium", 644.0),
    ("effective", 659.0),
    ("expiration", 674.0),
];

const GENERAL_INFO_FONT_SIZE: f32 = 8.0;
const PRIOR_CARRIER_FONT_SIZE: f32 = 7.0;

/// Signature rectangle for the certificate forms' authorized
/// representative box. The application forms carry no signature block.
pub fn signature_rect(variant: FormVariant) -> Option<SignatureRect> {
    match variant {
        FormVariant::Acord24 | FormVariant::Acord25 => {
            Some(SignatureRect { x: 310.0, y: 721.0, width: 280.0, height: 22.0 })
        }
        FormVariant::Acord125140 | FormVariant::Acord37 => None,
    }
}

/// Resolve every coordinate overlay for one request. Specs whose value
/// resolves to empty are omitted entirely; the compositor never draws
/// blanks.
pub fn overlay_plan(input: &StructuredInput, variant: FormVariant) -> Vec<TextOverlay> {
    let Some(page_index) = variant.overlay_page_index() else {
        return Vec::new();
    };

    let mut plan = Vec::new();

    for spec in GENERAL_INFO_YN {
        let short = spec.field.trim_start_matches("ACORD_General_");
        let value = match input.general_info.get(short) {
            Some(v) => v.trim().to_uppercase(),
            None if input.general_info_all_no => "N".to_string(),
            None => continue,
        };
        if value.is_empty() {
            continue;
        }
        let x = if value == "Y" { spec.x_yes } else { spec.x_no };
        plan.push(TextOverlay {
            page_index,
            x,
            y: spec.y,
            font_size: GENERAL_INFO_FONT_SIZE,
            text: value,
        });
    }

    if let Some(prior) = input.prior_carrier_rows().first() {
        for (key, y) in PRIOR_CARRIER_PROPERTY_ROWS {
            let value = match *key {
                "carrier" => prior.carrier.as_deref(),
                "policy_number" => prior.policy_number.as_deref(),
                "premium" => prior.premium.as_deref(),
                "effective" => prior.effective.as_deref(),
                "expiration" => prior.expiration.as_deref(),
                _ => None,
            };
            if let Some(value) = value {
                if !value.is_empty() {
                    plan.push(TextOverlay {
                        page_index,
                        x: PRIOR_CARRIER_PROPERTY_X,
                        y: *y,
                        font_size: PRIOR_CARRIER_FONT_SIZE,
                        text: value.to_string(),
                    });
                }
            }
        }
    }

    plan
}
