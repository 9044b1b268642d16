//! ACORD 25 Certificate of Liability Insurance (2016/03) field schema
//! and mapper.
//!
//! The 2016/03 revision is an XFA-derived form: every identifier is
//! prefixed `F[0].P1[0].` and suffixed `[0]`. Identifiers must match
//! exactly; a mismatched name is silently skipped by the filler.

use crate::fieldmap::FlatFieldMap;
use crate::input::StructuredInput;

pub const MAX_INSURERS: usize = 5;

/// XFA page prefix shared by every field on the form.
const P: &str = "F[0].P1[0].";

fn field(name: &str) -> String {
    format!("{}{}[0]", P, name)
}

/// Default insurer letter per coverage line when the line does not
/// name its own.
const DEFAULT_LETTERS: [(&str, &str); 4] =
    [("gl", "A"), ("auto", "B"), ("umbrella", "C"), ("workers_comp", "D")];

fn default_letter(line: &str) -> &'static str {
    DEFAULT_LETTERS
        .iter()
        .find(|(k, _)| *k == line)
        .map(|(_, v)| *v)
        .unwrap_or("A")
}

pub fn map(input: &StructuredInput) -> FlatFieldMap {
    let mut f = FlatFieldMap::new();

    f.set(field("Form_CompletionDate_A"), input.completion_date());

    map_insurers(input, &mut f);
    map_producer(input, &mut f);
    map_insured(input, &mut f);
    map_coverage_lines(input, &mut f);
    map_cert_holder(input, &mut f);

    f
}

/// Insurer table, letters A-E, at most 5 rows. Falls back to the
/// legacy single-policy carrier in slot A.
fn map_insurers(input: &StructuredInput, f: &mut FlatFieldMap) {
    let mut insurers: Vec<(String, String, String)> = input
        .insurers
        .iter()
        .take(MAX_INSURERS)
        .map(|ins| {
            (
                ins.letter.clone().unwrap_or_else(|| "A".to_string()),
                ins.carrier.clone().unwrap_or_default(),
                ins.naic.clone().unwrap_or_default(),
            )
        })
        .collect();

    if insurers.is_empty() {
        if let Some(carrier) = input.policy.carrier.clone() {
            insurers.push((
                "A".to_string(),
                carrier,
                input.policy.naic.clone().unwrap_or_default(),
            ));
        }
    }

    for (letter, carrier, naic) in &insurers {
        f.set(field(&format!("Insurer_FullName_{}", letter)), carrier.clone());
        f.set(field(&format!("Insurer_NAICCode_{}", letter)), naic.clone());
    }
}

fn map_producer(input: &StructuredInput, f: &mut FlatFieldMap) {
    let ag = &input.agency;
    f.set(field("Producer_FullName_A"), ag.name.clone().unwrap_or_default());

    let mut addr = ag.address_line1.clone().unwrap_or_default();
    if let Some(line2) = ag.address_line2.as_deref() {
        if !line2.is_empty() {
            addr.push('\n');
            addr.push_str(line2);
        }
    }
    f.set(field("Producer_MailingAddress_LineOne_A"), addr);
    f.set(
        field("Producer_MailingAddress_CityName_A"),
        ag.city.clone().unwrap_or_default(),
    );
    f.set(
        field("Producer_MailingAddress_StateOrProvinceCode_A"),
        ag.state.clone().unwrap_or_default(),
    );
    f.set(
        field("Producer_MailingAddress_PostalCode_A"),
        ag.zip.clone().unwrap_or_default(),
    );
    f.set(
        field("Producer_ContactPerson_FullName_A"),
        ag.contact.clone().unwrap_or_default(),
    );
    f.set(
        field("Producer_ContactPerson_PhoneNumber_A"),
        ag.phone.clone().unwrap_or_default(),
    );
    f.set(
        field("Producer_ContactPerson_EmailAddress_A"),
        ag.email.clone().unwrap_or_default(),
    );
}

fn map_insured(input: &StructuredInput, f: &mut FlatFieldMap) {
    let ins = &input.insured;
    f.set(field("NamedInsured_FullName_A"), ins.name.clone().unwrap_or_default());

    let mut addr = ins.address_line1.clone().unwrap_or_default();
    if let Some(line2) = ins.address_line2.as_deref() {
        if !line2.is_empty() {
            addr.push('\n');
            addr.push_str(line2);
        }
    }
    f.set(field("NamedInsured_MailingAddress_LineOne_A"), addr);
    f.set(
        field("NamedInsured_MailingAddress_CityName_A"),
        ins.city.clone().unwrap_or_default(),
    );
    f.set(
        field("NamedInsured_MailingAddress_StateOrProvinceCode_A"),
        ins.state.clone().unwrap_or_default(),
    );
    f.set(
        field("NamedInsured_MailingAddress_PostalCode_A"),
        ins.zip.clone().unwrap_or_default(),
    );
}

/// Per-line dates fall back to the legacy single-policy pair when a
/// coverage line carries no dates of its own.
fn line_dates<'a>(
    input: &'a StructuredInput,
    eff: Option<&'a str>,
    exp: Option<&'a str>,
) -> (&'a str, &'a str) {
    (
        eff.or(input.policy.effective_date.as_deref()).unwrap_or(""),
        exp.or(input.policy.expiration_date.as_deref()).unwrap_or(""),
    )
}

fn map_coverage_lines(input: &StructuredInput, f: &mut FlatFieldMap) {
    let cov = &input.coverages;

    let gl = &cov.gl;
    if gl.has {
        let letter = gl.insurer_letter.as_deref().unwrap_or(default_letter("gl"));
        let (eff, exp) = line_dates(input, gl.effective_date.as_deref(), gl.expiration_date.as_deref());
        f.set(field("GeneralLiability_CoverageIndicator_A"), "Yes");
        f.set_yes(field("GeneralLiability_OccurrenceIndicator_A"), gl.occurrence);
        f.set_yes(field("GeneralLiability_ClaimsMadeIndicator_A"), gl.claims_made);
        f.set(field("GeneralLiability_InsurerLetterCode_A"), letter);
        f.set(
            field("GeneralLiability_PolicyNumberIdentifier_A"),
            gl.policy_number
                .clone()
                .or_else(|| input.policy.number.clone())
                .unwrap_or_default(),
        );
        f.set(field("GeneralLiability_PolicyEffectiveDate_A"), eff);
        f.set(field("GeneralLiability_PolicyExpirationDate_A"), exp);
        f.set_opt(
            field("GeneralLiability_EachOccurrence_LimitAmount_A"),
            gl.occurrence_limit.as_deref(),
        );
        f.set_opt(
            field("GeneralLiability_GeneralAggregate_LimitAmount_A"),
            gl.aggregate_limit.as_deref(),
        );
        f.set_opt(
            field("GeneralLiability_FireDamageRentedPremises_EachOccurrenceLimitAmount_A"),
            gl.fire_damage_limit.as_deref(),
        );
        f.set_opt(
            field("GeneralLiability_MedicalExpense_AnyOnePersonLimitAmount_A"),
            gl.med_exp_limit.as_deref(),
        );
        f.set_opt(
            field("GeneralLiability_PersonalAndAdvertisingInjury_LimitAmount_A"),
            gl.personal_adv_limit.as_deref(),
        );
        f.set_opt(
            field("GeneralLiability_ProductsCompletedOperationsAggregate_LimitAmount_A"),
            gl.products_completed_limit.as_deref(),
        );
    }

    let auto = &cov.auto;
    if auto.has {
        let letter = auto.insurer_letter.as_deref().unwrap_or(default_letter("auto"));
        let (eff, exp) =
            line_dates(input, auto.effective_date.as_deref(), auto.expiration_date.as_deref());
        f.set(field("AutomobileLiability_InsurerLetterCode_A"), letter);
        f.set(
            field("AutomobileLiability_PolicyNumberIdentifier_A"),
            auto.policy_number.clone().unwrap_or_default(),
        );
        f.set(field("AutomobileLiability_PolicyEffectiveDate_A"), eff);
        f.set(field("AutomobileLiability_PolicyExpirationDate_A"), exp);
        f.set_opt(
            field("AutomobileLiability_CombinedSingleLimit_EachAccidentAmount_A"),
            auto.combined_single_limit.as_deref(),
        );
        f.set_yes(field("AutomobileLiability_AnyAutoIndicator_A"), auto.any_auto);
        f.set_yes(field("AutomobileLiability_HiredAutosOnlyIndicator_A"), auto.hired);
        f.set_yes(
            field("AutomobileLiability_NonOwnedAutosOnlyIndicator_A"),
            auto.non_owned,
        );
    }

    let umb = &cov.umbrella;
    if umb.has {
        let letter = umb.insurer_letter.as_deref().unwrap_or(default_letter("umbrella"));
        let (eff, exp) =
            line_dates(input, umb.effective_date.as_deref(), umb.expiration_date.as_deref());
        f.set(field("ExcessUmbrella_InsurerLetterCode_A"), letter);
        f.set(
            field("ExcessUmbrella_PolicyNumberIdentifier_A"),
            umb.policy_number.clone().unwrap_or_default(),
        );
        f.set(field("ExcessUmbrella_PolicyEffectiveDate_A"), eff);
        f.set(field("ExcessUmbrella_PolicyExpirationDate_A"), exp);
        f.set_opt(
            field("ExcessUmbrella_Umbrella_EachOccurrenceAmount_A"),
            umb.each_occurrence.as_deref(),
        );
        f.set_opt(
            field("ExcessUmbrella_Umbrella_AggregateAmount_A"),
            umb.aggregate.as_deref(),
        );
    }

    let wc = &cov.workers_comp;
    if wc.has {
        let letter = wc
            .insurer_letter
            .as_deref()
            .unwrap_or(default_letter("workers_comp"));
        let (eff, exp) =
            line_dates(input, wc.effective_date.as_deref(), wc.expiration_date.as_deref());
        f.set(field("WorkersCompensation_InsurerLetterCode_A"), letter);
        f.set(
            field("WorkersCompensation_PolicyNumberIdentifier_A"),
            wc.policy_number.clone().unwrap_or_default(),
        );
        f.set(field("WorkersCompensation_PolicyEffectiveDate_A"), eff);
        f.set(field("WorkersCompensation_PolicyExpirationDate_A"), exp);
        f.set_yes(field("WorkersCompensation_StatutoryLimitsIndicator_A"), wc.statutory);
        f.set_opt(
            field("WorkersCompensation_EachAccident_LimitAmount_A"),
            wc.el_each_accident.as_deref(),
        );
        f.set_opt(
            field("WorkersCompensation_DiseasePolicyLimit_LimitAmount_A"),
            wc.el_disease_policy.as_deref(),
        );
        f.set_opt(
            field("WorkersCompensation_DiseaseEachEmployee_LimitAmount_A"),
            wc.el_disease_each.as_deref(),
        );
    }
}

fn map_cert_holder(input: &StructuredInput, f: &mut FlatFieldMap) {
    let ch = &input.cert_holder;
    f.set(field("CertificateHolder_FullName_A"), ch.name.clone().unwrap_or_default());
    f.set(
        field("CertificateHolder_MailingAddress_LineOne_A"),
        ch.address_line1.clone().unwrap_or_default(),
    );
    f.set(
        field("CertificateHolder_MailingAddress_LineTwo_A"),
        ch.address_line2.clone().unwrap_or_default(),
    );
    f.set(
        field("CertificateHolder_MailingAddress_CityName_A"),
        ch.city.clone().unwrap_or_default(),
    );
    f.set(
        field("CertificateHolder_MailingAddress_StateOrProvinceCode_A"),
        ch.state.clone().unwrap_or_default(),
    );
    f.set(
        field("CertificateHolder_MailingAddress_PostalCode_A"),
        ch.zip.clone().unwrap_or_default(),
    );

    // Remarks assembled from the holder's endorsement flags.
    let mut desc: Vec<String> = Vec::new();
    if ch.additional_insured {
        desc.push(format!(
            "{} is included as Additional Insured as required by written contract.",
            ch.name.as_deref().unwrap_or_default()
        ));
    }
    if ch.waiver_of_subrogation {
        desc.push(
            "Waiver of Subrogation applies in favor of the Certificate Holder as required by \
             written contract."
                .to_string(),
        );
    }
    if ch.primary_noncontributory {
        desc.push(
            "Coverage is Primary and Non-Contributory as required by written contract.".to_string(),
        );
    }
    if let Some(extra) = ch.additional_description.as_deref() {
        if !extra.is_empty() {
            desc.push(extra.to_string());
        }
    }
    if !desc.is_empty() {
        f.set(
            field("CertificateOfLiabilityInsurance_ACORDForm_RemarkText_A"),
            desc.join("\n"),
        );
    }

    if ch.additional_insured {
        if input.coverages.gl.has {
            f.set(
                field("CertificateOfInsurance_GeneralLiability_AdditionalInsuredCode_A"),
                "Y",
            );
        }
        if input.coverages.auto.has {
            f.set(
                field("CertificateOfInsurance_AutomobileLiability_AdditionalInsuredCode_A"),
                "Y",
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn input_from(json: &str) -> StructuredInput {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_default_letters_per_line() {
        let input = input_from(
            r#"{"coverages": {
                "gl": {"has": true},
                "auto": {"has": true},
                "umbrella": {"has": true},
                "workers_comp": {"has": true}
            }}"#,
        );
        let f = map(&input);

        assert_eq!(f.get("F[0].P1[0].GeneralLiability_InsurerLetterCode_A[0]"), Some("A"));
        assert_eq!(f.get("F[0].P1[0].AutomobileLiability_InsurerLetterCode_A[0]"), Some("B"));
        assert_eq!(f.get("F[0].P1[0].ExcessUmbrella_InsurerLetterCode_A[0]"), Some("C"));
        assert_eq!(f.get("F[0].P1[0].WorkersCompensation_InsurerLetterCode_A[0]"), Some("D"));
    }

    #[test]
    fn test_explicit_letter_wins() {
        let input =
            input_from(r#"{"coverages": {"gl": {"has": true, "insurer_letter": "C"}}}"#);
        let f = map(&input);
        assert_eq!(f.get("F[0].P1[0].GeneralLiability_InsurerLetterCode_A[0]"), Some("C"));
    }

    #[test]
    fn test_legacy_date_fallback() {
        let input = input_from(
            r#"{
                "policy": {"effective_date": "01/01/2026", "expiration_date": "01/01/2027"},
                "coverages": {
                    "gl": {"has": true},
                    "auto": {"has": true, "effective_date": "06/01/2026",
                             "expiration_date": "06/01/2027"}
                }
            }"#,
        );
        let f = map(&input);

        assert_eq!(
            f.get("F[0].P1[0].GeneralLiability_PolicyEffectiveDate_A[0]"),
            Some("01/01/2026")
        );
        assert_eq!(
            f.get("F[0].P1[0].AutomobileLiability_PolicyEffectiveDate_A[0]"),
            Some("06/01/2026")
        );
        assert_eq!(
            f.get("F[0].P1[0].AutomobileLiability_PolicyExpirationDate_A[0]"),
            Some("06/01/2027")
        );
    }

    #[test]
    fn test_insurer_table_caps_at_five() {
        let input = input_from(
            r#"{"insurers": [
                {"letter": "A", "carrier": "One"}, {"letter": "B", "carrier": "Two"},
                {"letter": "C", "carrier": "Three"}, {"letter": "D", "carrier": "Four"},
                {"letter": "E", "carrier": "Five"}, {"letter": "F", "carrier": "Six"}
            ]}"#,
        );
        let f = map(&input);

        assert_eq!(f.get("F[0].P1[0].Insurer_FullName_E[0]"), Some("Five"));
        assert!(!f.contains("F[0].P1[0].Insurer_FullName_F[0]"));
    }

    #[test]
    fn test_legacy_carrier_lands_in_slot_a() {
        let input = input_from(r#"{"policy": {"carrier": "Hartford", "naic": "19682"}}"#);
        let f = map(&input);
        assert_eq!(f.get("F[0].P1[0].Insurer_FullName_A[0]"), Some("Hartford"));
        assert_eq!(f.get("F[0].P1[0].Insurer_NAICCode_A[0]"), Some("19682"));
    }

    #[test]
    fn test_holder_endorsement_remarks() {
        let input = input_from(
            r#"{
                "coverages": {"gl": {"has": true}},
                "cert_holder": {
                    "name": "City of Austin",
                    "additional_insured": true,
                    "waiver_of_subrogation": true
                }
            }"#,
        );
        let f = map(&input);

        let remark = f
            .get("F[0].P1[0].CertificateOfLiabilityInsurance_ACORDForm_RemarkText_A[0]")
            .unwrap();
        assert!(remark.contains("City of Austin is included as Additional Insured"));
        assert!(remark.contains("Waiver of Subrogation"));
        assert_eq!(
            f.get("F[0].P1[0].CertificateOfInsurance_GeneralLiability_AdditionalInsuredCode_A[0]"),
            Some("Y")
        );
    }

    #[test]
    fn test_skipped_lines_leave_no_fields() {
        let f = map(&input_from("{}"));
        assert!(!f.keys().any(|k| k.contains("GeneralLiability_CoverageIndicator")));
        assert!(!f.keys().any(|k| k.contains("WorkersCompensation_PolicyNumber")));
    }
}
