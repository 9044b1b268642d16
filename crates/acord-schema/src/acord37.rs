//! ACORD 37 Statement of No Loss field schema and mapper.
//!
//! The 37 is an XFA form with positional field names (`Text1`,
//! `Text2`, ...) rather than descriptive identifiers, so the schema is
//! one flat table from position to data source.

use crate::fieldmap::FlatFieldMap;
use crate::input::StructuredInput;

const P: &str = "F[0].P1[0].";

fn field(n: u32) -> String {
    format!("{}Text{}[0]", P, n)
}

/// Positional slot -> value, in form order. Slots 6, 11 and 12 do not
/// exist on the form.
fn slots(input: &StructuredInput) -> Vec<(u32, Option<String>)> {
    let ag = &input.agency;
    let ins = &input.insured;
    let pol = &input.policy;
    let nl = &input.no_loss;
    vec![
        (1, ag.name.clone()),
        (2, ag.address_line1.clone()),
        (3, ag.address_line2.clone()),
        (4, ag.code.clone()),
        (5, ag.subcode.clone()),
        (7, ag.contact.clone()),
        (8, ag.phone.clone()),
        (9, ag.fax.clone()),
        (10, ag.email.clone()),
        (13, ag.customer_id.clone()),
        (14, ins.name.clone()),
        (16, ins.mailing_address.clone().or_else(|| ins.address_line1.clone())),
        (17, ins.address_line2.clone()),
        (18, pol.carrier.clone()),
        (19, pol.naic.clone()),
        (20, pol.number.clone()),
        (21, nl.approved_by.clone()),
        (22, nl.from_date.clone()),
        (23, nl.to_date.clone()),
        (24, nl.cancellation_date.clone()),
        (25, nl.applicant_name.clone()),
        (26, nl.receipt_amount.clone()),
        (27, nl.received_by.clone()),
        (28, nl.witness.clone()),
        (29, nl.witness_date.clone()),
        (30, nl.receipt_date.clone()),
    ]
}

pub fn map(input: &StructuredInput) -> FlatFieldMap {
    let mut f = FlatFieldMap::new();
    for (n, value) in slots(input) {
        f.set_opt(field(n), value.as_deref());
    }
    f
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_maps_no_loss_period() {
        let input: StructuredInput = serde_json::from_str(
            r#"{
                "agency": {"name": "Alliance Risk", "phone": "(512) 555-0100"},
                "insured": {"name": "Acme LLC",
                            "mailing_address": "1 Main St, Austin, TX 78701"},
                "policy": {"carrier": "Hartford", "naic": "19682", "number": "P-1"},
                "no_loss": {"from_date": "01/01/2026", "to_date": "02/01/2026",
                            "applicant_name": "J. Smith, Member"}
            }"#,
        )
        .unwrap();
        let f = map(&input);

        assert_eq!(f.get("F[0].P1[0].Text1[0]"), Some("Alliance Risk"));
        assert_eq!(f.get("F[0].P1[0].Text14[0]"), Some("Acme LLC"));
        assert_eq!(f.get("F[0].P1[0].Text16[0]"), Some("1 Main St, Austin, TX 78701"));
        assert_eq!(f.get("F[0].P1[0].Text18[0]"), Some("Hartford"));
        assert_eq!(f.get("F[0].P1[0].Text22[0]"), Some("01/01/2026"));
        assert_eq!(f.get("F[0].P1[0].Text25[0]"), Some("J. Smith, Member"));
    }

    #[test]
    fn test_absent_sections_map_nothing() {
        let input: StructuredInput = serde_json::from_str("{}").unwrap();
        assert!(map(&input).is_empty());
    }
}
