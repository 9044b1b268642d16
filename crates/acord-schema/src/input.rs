//! Structured request data consumed by the schema mapper.
//!
//! Constructed once per request (normally from JSON) and read-only
//! through the pipeline. Every section is optional; the mapper simply
//! omits fields whose source data is absent.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct StructuredInput {
    pub insured: Insured,
    /// Legacy single-policy block. Coverage lines without their own
    /// carrier/dates fall back to these values.
    pub policy: PolicySummary,
    pub coverages: Coverages,
    /// Insurer table for certificate forms, letters A-E. At most 5 are
    /// used; extras are dropped.
    pub insurers: Vec<Insurer>,
    /// Keyed locations ("loc1", "loc2", ...); mapped in key order.
    pub locations: BTreeMap<String, Location>,
    pub loss_history: Vec<LossEntry>,
    /// Explicit override for the "no losses" checkbox. Defaults to
    /// true exactly when `loss_history` is empty.
    pub loss_history_none: Option<bool>,
    pub prior_carrier: Option<PriorCarrier>,
    /// Additional prior-policy rows. Together with `prior_carrier`, at
    /// most 3 rows reach the form.
    pub prior_carriers: Vec<PriorCarrier>,
    pub cert_holder: CertHolder,
    pub agency: Agency,
    /// ACORD 37 statement-of-no-loss section.
    pub no_loss: NoLoss,
    /// quote | bound | renew | cancel | change | issue. Defaults to
    /// "quote".
    pub transaction_type: Option<String>,
    /// llc | corporation | partnership | individual | scorp | trust |
    /// joint_venture.
    pub entity_type: Option<String>,
    /// Per-question Y/N answers for the General Info grid, keyed by
    /// short question name ("Subsidiary", "Foreign", ...).
    pub general_info: BTreeMap<String, String>,
    /// Answer "N" to every General Info question not overridden above.
    pub general_info_all_no: bool,
    /// Ad-hoc checkbox fields by exact target field name.
    pub checkboxes: BTreeMap<String, bool>,
    pub remarks: Option<String>,
    pub location_description: Option<String>,
    pub broker_notes: Vec<BrokerNote>,
    /// Raw field overrides, applied after all computed values. The
    /// designed escape hatch for one-off corrections.
    pub field_overrides: BTreeMap<String, String>,
    /// Fixed date (MM/DD/YYYY) instead of today; used for reproducible
    /// output.
    pub override_date: Option<String>,
}

impl StructuredInput {
    /// Completion date stamped on the form: the override when given,
    /// otherwise today in MM/DD/YYYY.
    pub fn completion_date(&self) -> String {
        match &self.override_date {
            Some(d) => d.clone(),
            None => chrono::Local::now().format("%m/%d/%Y").to_string(),
        }
    }

    /// Whether the "no loss history" checkbox applies.
    pub fn no_known_losses(&self) -> bool {
        self.loss_history_none
            .unwrap_or_else(|| self.loss_history.is_empty())
    }

    /// Prior-policy rows in form order: the singular `prior_carrier`
    /// first, then `prior_carriers`.
    pub fn prior_carrier_rows(&self) -> Vec<&PriorCarrier> {
        self.prior_carrier
            .iter()
            .chain(self.prior_carriers.iter())
            .collect()
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Insured {
    pub name: Option<String>,
    /// Single-line "street, city, ST ZIP" used on the 125 application.
    pub mailing_address: Option<String>,
    /// Decomposed address used on the certificate forms.
    pub address_line1: Option<String>,
    pub address_line2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub sic: Option<String>,
    pub fein: Option<String>,
    pub nature_of_business: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct PolicySummary {
    pub carrier: Option<String>,
    pub naic: Option<String>,
    pub number: Option<String>,
    pub effective_date: Option<String>,
    pub expiration_date: Option<String>,
    pub premium: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Insurer {
    /// Column letter A-E. Defaults to "A".
    pub letter: Option<String>,
    pub carrier: Option<String>,
    pub naic: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Coverages {
    pub gl: GeneralLiability,
    pub auto: AutoLiability,
    pub umbrella: Umbrella,
    pub workers_comp: WorkersComp,
    pub property: PropertyCoverage,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct GeneralLiability {
    pub has: bool,
    pub insurer_letter: Option<String>,
    pub policy_number: Option<String>,
    pub effective_date: Option<String>,
    pub expiration_date: Option<String>,
    pub occurrence: bool,
    pub claims_made: bool,
    pub occurrence_limit: Option<String>,
    pub aggregate_limit: Option<String>,
    pub fire_damage_limit: Option<String>,
    pub med_exp_limit: Option<String>,
    pub personal_adv_limit: Option<String>,
    pub products_completed_limit: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AutoLiability {
    pub has: bool,
    pub insurer_letter: Option<String>,
    pub policy_number: Option<String>,
    pub effective_date: Option<String>,
    pub expiration_date: Option<String>,
    pub combined_single_limit: Option<String>,
    pub any_auto: bool,
    pub hired: bool,
    pub non_owned: bool,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Umbrella {
    pub has: bool,
    pub insurer_letter: Option<String>,
    pub policy_number: Option<String>,
    pub effective_date: Option<String>,
    pub expiration_date: Option<String>,
    pub each_occurrence: Option<String>,
    pub aggregate: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct WorkersComp {
    pub has: bool,
    pub insurer_letter: Option<String>,
    pub policy_number: Option<String>,
    pub effective_date: Option<String>,
    pub expiration_date: Option<String>,
    pub statutory: bool,
    pub el_each_accident: Option<String>,
    pub el_disease_policy: Option<String>,
    pub el_disease_each: Option<String>,
}

/// Property line for the ACORD 24 certificate.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct PropertyCoverage {
    pub has: bool,
    pub insurer_letter: Option<String>,
    pub policy_number: Option<String>,
    pub effective_date: Option<String>,
    pub expiration_date: Option<String>,
    pub deductible: Option<String>,
    pub building_limit: Option<String>,
    pub bpp_limit: Option<String>,
    pub business_income_limit: Option<String>,
    pub extra_expense_limit: Option<String>,
    pub rental_value_limit: Option<String>,
    pub cause_basic: bool,
    pub cause_broad: bool,
    pub cause_special: bool,
    pub cause_earthquake: bool,
    pub cause_wind: bool,
    pub cause_flood: bool,
    pub cov_building: bool,
    pub cov_bpp: bool,
    pub cov_business_income: bool,
    pub cov_extra_expense: bool,
    pub cov_rental_value: bool,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Location {
    /// "street, city, ST ZIP". Decomposed on commas by the mapper.
    pub address: Option<String>,
    pub state: Option<String>,
    pub county: Option<String>,
    pub description: Option<String>,
    pub sqft: Option<u64>,
    /// Premises number printed on the form.
    pub premises: Option<u32>,
    pub building: Option<u32>,
    /// owner | tenant. Defaults to owner.
    pub interest: Option<String>,
    pub construction: Option<String>,
    pub year_built: Option<u32>,
    pub stories: Option<u32>,
    pub basements: Option<u32>,
    pub roof: Option<String>,
    pub protection_class: Option<String>,
    pub exposures: BTreeMap<String, Exposure>,
    pub limit: Option<String>,
    pub coinsurance: Option<String>,
    pub valuation: Option<String>,
    pub cause_of_loss: Option<String>,
    pub deductible: Option<String>,
    pub ded_type: Option<String>,
    pub subject_of_insurance: Option<String>,
    pub equipment_breakdown: bool,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Exposure {
    pub desc: Option<String>,
    pub dist: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct LossEntry {
    pub date_of_claim: Option<String>,
    pub occurrence_date: Option<String>,
    pub description: Option<String>,
    pub lob: Option<String>,
    pub amount_paid: Option<String>,
    pub amount_reserved: Option<String>,
    pub claim_open: Option<String>,
    pub subrogation: Option<String>,
}

/// One prior-policy row. The widget columns on the form are literally
/// named "Auto" but serve as the generic first column; the Property
/// column for the same row has no widgets and is drawn as an overlay.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct PriorCarrier {
    pub carrier: Option<String>,
    pub policy_number: Option<String>,
    pub premium: Option<String>,
    pub effective: Option<String>,
    pub expiration: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct CertHolder {
    pub name: Option<String>,
    pub address_line1: Option<String>,
    pub address_line2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub additional_insured: bool,
    pub waiver_of_subrogation: bool,
    pub primary_noncontributory: bool,
    pub additional_description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Agency {
    pub name: Option<String>,
    pub contact: Option<String>,
    pub phone: Option<String>,
    pub fax: Option<String>,
    pub email: Option<String>,
    pub address_line1: Option<String>,
    pub address_line2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub code: Option<String>,
    pub subcode: Option<String>,
    pub customer_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct NoLoss {
    pub approved_by: Option<String>,
    pub from_date: Option<String>,
    pub to_date: Option<String>,
    pub cancellation_date: Option<String>,
    pub applicant_name: Option<String>,
    pub date_signed: Option<String>,
    pub receipt_amount: Option<String>,
    pub received_by: Option<String>,
    pub receipt_date: Option<String>,
    pub witness: Option<String>,
    pub witness_date: Option<String>,
}

/// Confidential broker annotation for the standalone notes document.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum BrokerNote {
    Text(String),
    Titled { title: String, body: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserializes_minimal_input() {
        let input: StructuredInput = serde_json::from_str("{}").unwrap();
        assert!(input.locations.is_empty());
        assert!(input.no_known_losses());
    }

    #[test]
    fn test_broker_note_forms() {
        let notes: Vec<BrokerNote> = serde_json::from_str(
            r#"["plain note", {"title": "Valuation", "body": "ITV looks low"}]"#,
        )
        .unwrap();
        assert!(matches!(notes[0], BrokerNote::Text(_)));
        assert!(matches!(notes[1], BrokerNote::Titled { .. }));
    }

    #[test]
    fn test_no_known_losses_follows_history() {
        let with_losses: StructuredInput =
            serde_json::from_str(r#"{"loss_history": [{"description": "hail"}]}"#).unwrap();
        assert!(!with_losses.no_known_losses());

        let overridden: StructuredInput =
            serde_json::from_str(r#"{"loss_history": [], "loss_history_none": false}"#).unwrap();
        assert!(!overridden.no_known_losses());
    }

    #[test]
    fn test_completion_date_override() {
        let input: StructuredInput =
            serde_json::from_str(r#"{"override_date": "01/15/2026"}"#).unwrap();
        assert_eq!(input.completion_date(), "01/15/2026");
    }
}
