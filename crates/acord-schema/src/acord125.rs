//! ACORD 125 Commercial Insurance Application + ACORD 140 Property
//! Section field schema and mapper.
//!
//! Field identifiers are exact strings from the combined 125/140
//! fillable PDF. Multi-instance tables are capped at what the paper
//! layout physically holds: 4 locations on the 125 premises page, 2
//! locations on the 140, 3 loss rows, 3 prior-carrier rows.

use crate::address::{split_address, state_code};
use crate::fieldmap::FlatFieldMap;
use crate::input::{Location, StructuredInput};

pub const MAX_LOCATIONS: usize = 4;
pub const MAX_ACORD140_LOCATIONS: usize = 2;
pub const MAX_LOSS_ROWS: usize = 3;
pub const MAX_PRIOR_CARRIER_ROWS: usize = 3;

/// Transaction-type checkbox fields by semantic key.
const TRANSACTION_CHECKBOXES: &[(&str, &str)] = &[
    ("quote", "ACORD_Transaction_Quote"),
    ("bound", "ACORD_Transaction_Bound"),
    ("renew", "ACORD_Transaction_Renew"),
    ("cancel", "ACORD_Transaction_Cancel"),
    ("change", "ACORD_Transaction_Change"),
    ("issue", "ACORD_Transaction_IssuePolicy"),
];

/// Legal-entity checkbox fields by semantic key.
const ENTITY_CHECKBOXES: &[(&str, &str)] = &[
    ("llc", "ACORD_Policy_Insured1_Type_LLC"),
    ("corporation", "ACORD_Policy_Insured1_Type_Corporation"),
    ("partnership", "ACORD_Policy_Insured1_Type_Partnership"),
    ("individual", "ACORD_Policy_Insured1_Type_Individual"),
    ("scorp", "ACORD_Policy_Insured1_Type_SCorp"),
    ("trust", "ACORD_Policy_Insured1_Type_Trust"),
    ("joint_venture", "ACORD_Policy_Insured1_Type_JointVenture"),
];

/// ACORD 140 coverage row letters: Section A (page 9) and Section B
/// (page 10) use disjoint letter runs.
const SECTION_A_ROWS: &[&str] = &["A", "B", "C", "D", "E"];
const SECTION_B_ROWS: &[&str] = &["G", "H", "I", "J", "K"];

/// Loss-history column suffixes. "OccurenceDate" is the form's own
/// spelling.
const LOSS_COLUMNS: &[(&str, fn(&crate::input::LossEntry) -> Option<&str>)] = &[
    ("DateOfClaim", |l| l.date_of_claim.as_deref()),
    ("OccurenceDate", |l| l.occurrence_date.as_deref()),
    ("Description", |l| l.description.as_deref()),
    ("LOB", |l| l.lob.as_deref()),
    ("AmountPaid", |l| l.amount_paid.as_deref()),
    ("AmountReserved", |l| l.amount_reserved.as_deref()),
    ("ClaimOpen", |l| l.claim_open.as_deref()),
    ("Subrogation", |l| l.subrogation.as_deref()),
];

pub fn map(input: &StructuredInput) -> FlatFieldMap {
    let mut f = FlatFieldMap::new();
    let today = input.completion_date();

    map_direct(input, &mut f);
    f.set("ACORD_CurrentDate", today.clone());
    f.set("ACORD_Transaction_Date", today.clone());

    let tx = input.transaction_type.as_deref().unwrap_or("quote");
    if let Some((_, field)) = TRANSACTION_CHECKBOXES.iter().find(|(k, _)| *k == tx) {
        f.set(*field, "Yes");
    }

    if let Some(entity) = input.entity_type.as_deref() {
        let entity = entity.to_lowercase();
        if let Some((_, field)) = ENTITY_CHECKBOXES.iter().find(|(k, _)| *k == entity) {
            f.set(*field, "Yes");
        }
    }

    let locations: Vec<(&String, &Location)> = input.locations.iter().collect();

    for (i, (_, loc)) in locations.iter().take(MAX_LOCATIONS).enumerate() {
        map_premises_row(loc, i + 1, &mut f);
    }

    for (i, (_, loc)) in locations.iter().take(MAX_ACORD140_LOCATIONS).enumerate() {
        map_acord140_section(loc, i, &mut f);
    }

    if !locations.is_empty() {
        map_acord140_header(input, &today, &mut f);
    }

    for (i, prior) in input
        .prior_carrier_rows()
        .iter()
        .take(MAX_PRIOR_CARRIER_ROWS)
        .enumerate()
    {
        // The widget columns are named "Auto" but serve as the generic
        // first column; the Property column is drawn as an overlay.
        let prefix = format!("ACORD_PriorCarrier_{}_Auto", i + 1);
        f.set_opt(format!("{}Carrier", prefix), prior.carrier.as_deref());
        f.set_opt(
            format!("{}PolicyNumber", prefix),
            prior.policy_number.as_deref(),
        );
        f.set_opt(format!("{}Premium", prefix), prior.premium.as_deref());
        f.set_opt(format!("{}EffectiveDate", prefix), prior.effective.as_deref());
        f.set_opt(
            format!("{}ExpirationDate", prefix),
            prior.expiration.as_deref(),
        );
    }

    f.set_yes("ACORD_LossHistory_None", input.no_known_losses());
    for (i, loss) in input.loss_history.iter().take(MAX_LOSS_ROWS).enumerate() {
        let prefix = format!("ACORD_LossHistory_{}_", i + 1);
        for (suffix, get) in LOSS_COLUMNS {
            f.set_opt(format!("{}{}", prefix, suffix), get(loss));
        }
    }

    for (name, checked) in &input.checkboxes {
        f.set_yes(name.clone(), *checked);
    }

    f
}

/// Top-level insured / policy / producer fields.
fn map_direct(input: &StructuredInput, f: &mut FlatFieldMap) {
    let ins = &input.insured;
    f.set_opt("ACORD_Policy_Insured1_Name", ins.name.as_deref());
    f.set_opt(
        "ACORD_Policy_Insured1_MailingAddress",
        ins.mailing_address.as_deref(),
    );
    f.set_opt("ACORD_Policy_Insured1_SIC", ins.sic.as_deref());
    f.set_opt("ACORD_Policy_Insured1_PhoneNumber", ins.phone.as_deref());
    f.set_opt("ACORD_Policy_Insured1_FEINSSN", ins.fein.as_deref());
    f.set_opt("ACORD_Policy_Insured1_Website", ins.website.as_deref());
    f.set_opt(
        "ACORD_NatureOfBusiness_Description",
        ins.nature_of_business.as_deref(),
    );

    let pol = &input.policy;
    f.set_opt("ACORD_CarrierName", pol.carrier.as_deref());
    f.set_opt("ACORD_NAICCode", pol.naic.as_deref());
    f.set_opt("ACORD_PolicyNumber", pol.number.as_deref());
    f.set_opt("ACORD_Policy_EffectiveDate", pol.effective_date.as_deref());
    f.set_opt("ACORD_Policy_ExpirationDate", pol.expiration_date.as_deref());
    f.set_opt("ACORD_Policy_PolicyPremium", pol.premium.as_deref());

    let ag = &input.agency;
    f.set_opt("ACORD_AgencyName", ag.name.as_deref());
    f.set_opt("ACORD_ProducerContact", ag.contact.as_deref());
    f.set_opt("ACORD_ProducerPhoneNumber", ag.phone.as_deref());
    f.set_opt("ACORD_ProducerEmailAddress", ag.email.as_deref());
    f.set_opt("ACORD_ProducerCode", ag.code.as_deref());
}

/// One premises row on the ACORD 125 locations page (1-indexed, max 4).
fn map_premises_row(loc: &Location, n: usize, f: &mut FlatFieldMap) {
    let prefix = format!("ACORD_Location{}_", n);

    if let Some(address) = loc.address.as_deref() {
        if let Some(parts) = split_address(address) {
            f.set(format!("{}Street", prefix), parts.street);
            f.set(format!("{}City", prefix), parts.city);
            f.set_opt(format!("{}State", prefix), parts.state.as_deref());
            f.set_opt(format!("{}ZIP", prefix), parts.zip.as_deref());
        }
    }

    f.set_opt(format!("{}County", prefix), loc.county.as_deref());
    f.set_opt(format!("{}Description", prefix), loc.description.as_deref());
    if let Some(sqft) = loc.sqft {
        f.set(format!("{}BuildingArea", prefix), sqft.to_string());
        f.set(format!("{}OccupiedArea", prefix), sqft.to_string());
    }
    if let Some(premises) = loc.premises {
        f.set(format!("{}LocationNumber", prefix), premises.to_string());
    }
    if let Some(building) = loc.building {
        f.set(format!("{}BuildingNumber", prefix), building.to_string());
    }

    match loc.interest.as_deref().unwrap_or("owner").to_lowercase().as_str() {
        "owner" => f.set(format!("{}Interest_Owner", prefix), "Yes"),
        "tenant" => f.set(format!("{}Interest_Tenant", prefix), "Yes"),
        _ => {}
    }
}

/// ACORD 140 building/coverage section for one location. Section index
/// 0 maps to suffix A (page 9), index 1 to suffix B (page 10).
fn map_acord140_section(loc: &Location, section: usize, f: &mut FlatFieldMap) {
    let suffix = if section == 0 { "A" } else { "B" };
    let rows = if section == 0 { SECTION_A_ROWS } else { SECTION_B_ROWS };

    f.set(
        format!("CommercialStructure_Location_ProducerIdentifier_{}", suffix),
        loc.premises.unwrap_or(section as u32 + 1).to_string(),
    );
    f.set(
        format!("CommercialStructure_Building_ProducerIdentifier_{}", suffix),
        loc.building.unwrap_or(1).to_string(),
    );
    f.set(
        format!("CommercialStructure_PhysicalAddress_LineOne_{}", suffix),
        loc.address.clone().unwrap_or_default(),
    );
    f.set(
        format!("CommercialStructure_Building_SublocationDescription_{}", suffix),
        loc.description.clone().unwrap_or_default(),
    );

    f.set_opt(
        format!("Construction_ConstructionCode_{}", suffix),
        loc.construction.as_deref(),
    );
    if let Some(year) = loc.year_built {
        f.set(format!("CommercialStructure_BuiltYear_{}", suffix), year.to_string());
    }
    if let Some(stories) = loc.stories {
        f.set(format!("Construction_StoreyCount_{}", suffix), stories.to_string());
    }
    if let Some(basements) = loc.basements {
        f.set(
            format!("Construction_BasementCount_{}", suffix),
            basements.to_string(),
        );
    }
    if let Some(sqft) = loc.sqft {
        f.set(format!("Construction_BuildingArea_{}", suffix), sqft.to_string());
    }
    f.set_opt(
        format!("Construction_RoofMaterialCode_{}", suffix),
        loc.roof.as_deref(),
    );
    f.set_opt(
        format!("BuildingFireProtection_ProtectionClassCode_{}", suffix),
        loc.protection_class.as_deref(),
    );

    for direction in ["front", "rear", "left", "right"] {
        if let Some(exp) = loc.exposures.get(direction) {
            let cap = capitalize(direction);
            f.set_opt(
                format!("BuildingExposure_{}Description_{}", cap, suffix),
                exp.desc.as_deref(),
            );
            f.set_opt(
                format!("BuildingExposure_{}Distance_{}", cap, suffix),
                exp.dist.as_deref(),
            );
        }
    }

    // Coverage values go on the section's first row.
    let row = rows[0];
    f.set_opt(
        format!("CommercialProperty_Premises_LimitAmount_{}", row),
        loc.limit.as_deref(),
    );
    f.set_opt(
        format!("CommercialProperty_Premises_CoinsurancePercent_{}", row),
        loc.coinsurance.as_deref(),
    );
    f.set_opt(
        format!("CommercialProperty_Premises_ValuationCode_{}", row),
        loc.valuation.as_deref(),
    );
    f.set_opt(
        format!("CommercialProperty_Premises_CauseOfLossCode_{}", row),
        loc.cause_of_loss.as_deref(),
    );
    f.set_opt(
        format!("CommercialProperty_Premises_DeductibleAmount_{}", row),
        loc.deductible.as_deref(),
    );
    f.set_opt(
        format!("CommercialProperty_Premises_DeductibleTypeCode_{}", row),
        loc.ded_type.as_deref(),
    );
    f.set_opt(
        format!("CommercialProperty_Premises_SubjectOfInsuranceCode_{}", row),
        loc.subject_of_insurance.as_deref(),
    );

    // Texas filings: mine subsidence and sinkhole collapse both default
    // to "No" for TX risks.
    let state = state_code(loc.state.as_deref(), loc.address.as_deref());
    if state.as_deref() == Some("TX") {
        f.set(
            format!("CommercialPropertyCoverage_MineSubsidenceOption_NoIndicator_{}", suffix),
            "Yes",
        );
        f.set(
            format!("CommercialPropertyCoverage_SinkHoleCollapse_NoIndicator_{}", suffix),
            "Yes",
        );
    }

    f.set_yes(
        format!(
            "CommercialProperty_Premises_BreakdownOrContaminationIndicator_{}",
            suffix
        ),
        loc.equipment_breakdown,
    );
}

/// Header block repeated at the top of the ACORD 140 pages.
fn map_acord140_header(input: &StructuredInput, today: &str, f: &mut FlatFieldMap) {
    f.set(
        "NamedInsured_FullName_A",
        input.insured.name.clone().unwrap_or_default(),
    );
    f.set(
        "Policy_PolicyNumberIdentifier_A",
        input.policy.number.clone().unwrap_or_default(),
    );
    f.set(
        "Policy_EffectiveDate_A",
        input.policy.effective_date.clone().unwrap_or_default(),
    );
    f.set(
        "Insurer_FullName_A",
        input.policy.carrier.clone().unwrap_or_default(),
    );
    // Agency names can be multi-line; the 140 header only fits one.
    let producer = input.agency.name.as_deref().unwrap_or_default();
    f.set(
        "Producer_FullName_A",
        producer.lines().next().unwrap_or_default(),
    );
    f.set("Form_CompletionDate_A", today);
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
