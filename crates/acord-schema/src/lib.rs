//! ACORD form schemas and the schema mapper
//!
//! This crate owns everything tied to a specific ACORD paper-form
//! revision: field-name tables, overlay coordinates, and the mapping
//! from structured policy data to flat `field_name -> value` pairs.
//! It performs no PDF I/O; that lives in `acord-render`.

pub mod acord125;
pub mod acord24;
pub mod acord25;
pub mod acord37;
pub mod address;
pub mod fieldmap;
pub mod input;
pub mod overlay;
pub mod variant;

pub use fieldmap::FlatFieldMap;
pub use input::{BrokerNote, StructuredInput};
pub use overlay::{overlay_plan, SignatureRect, TextOverlay};
pub use variant::FormVariant;

/// Map structured input to a flat field map for one form variant.
///
/// Mapping never fails: unknown keys, malformed addresses, and entities
/// past the per-table caps are dropped silently. Raw `field_overrides`
/// are applied last and win over every computed value.
pub fn map_fields(input: &StructuredInput, variant: FormVariant) -> FlatFieldMap {
    let mut fields = match variant {
        FormVariant::Acord125140 => acord125::map(input),
        FormVariant::Acord25 => acord25::map(input),
        FormVariant::Acord24 => acord24::map(input),
        FormVariant::Acord37 => acord37::map(input),
    };

    for (name, value) in &input.field_overrides {
        fields.set(name.clone(), value.clone());
    }

    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_overrides_replace_computed_values() {
        let input: StructuredInput = serde_json::from_str(
            r#"{"override_date": "02/03/2026",
                "field_overrides": {"ACORD_CurrentDate": "12/31/2025"}}"#,
        )
        .unwrap();
        let fields = map_fields(&input, FormVariant::Acord125140);
        assert_eq!(fields.get("ACORD_CurrentDate"), Some("12/31/2025"));
    }

    #[test]
    fn test_overrides_land_outside_the_schema() {
        let input: StructuredInput = serde_json::from_str(
            r#"{"field_overrides": {"Carrier_Internal_RefNumber": "Q-4471"}}"#,
        )
        .unwrap();
        let fields = map_fields(&input, FormVariant::Acord25);
        assert_eq!(fields.get("Carrier_Internal_RefNumber"), Some("Q-4471"));
    }
}
