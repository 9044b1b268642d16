//! ACORD 24 Certificate of Property Insurance field schema and mapper.

use crate::fieldmap::FlatFieldMap;
use crate::input::StructuredInput;

pub fn map(input: &StructuredInput) -> FlatFieldMap {
    let mut f = FlatFieldMap::new();

    f.set("Form_CompletionDate_A", input.completion_date());

    let ag = &input.agency;
    f.set_opt("Producer_FullName_A", ag.name.as_deref());
    f.set_opt("Producer_MailingAddress_LineOne_A", ag.address_line1.as_deref());
    f.set_opt("Producer_MailingAddress_LineTwo_A", ag.address_line2.as_deref());
    f.set_opt("Producer_MailingAddress_CityName_A", ag.city.as_deref());
    f.set_opt("Producer_MailingAddress_StateOrProvinceCode_A", ag.state.as_deref());
    f.set_opt("Producer_MailingAddress_PostalCode_A", ag.zip.as_deref());
    f.set_opt("Producer_ContactPerson_FullName_A", ag.contact.as_deref());
    f.set_opt("Producer_ContactPerson_PhoneNumber_A", ag.phone.as_deref());
    f.set_opt("Producer_FaxNumber_A", ag.fax.as_deref());
    f.set_opt("Producer_ContactPerson_EmailAddress_A", ag.email.as_deref());

    let ins = &input.insured;
    f.set_opt("NamedInsured_FullName_A", ins.name.as_deref());
    f.set_opt("NamedInsured_MailingAddress_LineOne_A", ins.address_line1.as_deref());
    f.set_opt("NamedInsured_MailingAddress_LineTwo_A", ins.address_line2.as_deref());
    f.set_opt("NamedInsured_MailingAddress_CityName_A", ins.city.as_deref());
    f.set_opt(
        "NamedInsured_MailingAddress_StateOrProvinceCode_A",
        ins.state.as_deref(),
    );
    f.set_opt("NamedInsured_MailingAddress_PostalCode_A", ins.zip.as_deref());

    // Insurer slots A/B.
    for (i, insurer) in input.insurers.iter().take(2).enumerate() {
        let slot = if i == 0 { "A" } else { "B" };
        f.set_opt(format!("Insurer_FullName_{}", slot), insurer.carrier.as_deref());
        f.set_opt(format!("Insurer_NAICCode_{}", slot), insurer.naic.as_deref());
    }
    if input.insurers.is_empty() {
        f.set_opt("Insurer_FullName_A", input.policy.carrier.as_deref());
        f.set_opt("Insurer_NAICCode_A", input.policy.naic.as_deref());
    }

    let prop = &input.coverages.property;
    if prop.has {
        f.set("Policy_PolicyType_PropertyIndicator_A", "Yes");
        f.set(
            "Property_InsurerLetterCode_A",
            prop.insurer_letter.clone().unwrap_or_else(|| "A".to_string()),
        );
        f.set(
            "Policy_Property_PolicyNumberIdentifier_A",
            prop.policy_number
                .clone()
                .or_else(|| input.policy.number.clone())
                .unwrap_or_default(),
        );
        f.set_opt(
            "Policy_Property_EffectiveDate_A",
            prop.effective_date
                .as_deref()
                .or(input.policy.effective_date.as_deref()),
        );
        f.set_opt(
            "Policy_Property_ExpirationDate_A",
            prop.expiration_date
                .as_deref()
                .or(input.policy.expiration_date.as_deref()),
        );
        f.set_opt("CommercialProperty_Premises_DeductibleAmount_A", prop.deductible.as_deref());
        f.set_opt("Property_Building_LimitAmount_A", prop.building_limit.as_deref());
        f.set_opt("Property_PersonalProperty_LimitAmount_A", prop.bpp_limit.as_deref());
        f.set_opt(
            "CommercialPropertyCoverage_BusinessIncome_LimitAmount_A",
            prop.business_income_limit.as_deref(),
        );
        f.set_opt(
            "CommercialPropertyCoverage_ExtraExpense_LimitAmount_A",
            prop.extra_expense_limit.as_deref(),
        );
        f.set_opt(
            "CommercialPropertyCoverage_RentalValue_LimitAmount_A",
            prop.rental_value_limit.as_deref(),
        );

        f.set_yes("Policy_PolicyType_BasicIndicator_A", prop.cause_basic);
        f.set_yes("Policy_PolicyType_BroadIndicator_A", prop.cause_broad);
        f.set_yes("Policy_PolicyType_SpecialIndicator_A", prop.cause_special);
        f.set_yes(
            "CommercialPropertyCoverage_EarthquakeOption_IncludedIndicator_A",
            prop.cause_earthquake,
        );
        f.set_yes("Policy_PolicyType_WindIndicator_A", prop.cause_wind);
        f.set_yes("CommercialPropertyCoverage_Flood_YesIndicator_A", prop.cause_flood);

        f.set_yes("Property_Building_CoverageIndicator_A", prop.cov_building);
        f.set_yes("Property_PersonalProperty_CoverageIndicator_A", prop.cov_bpp);
        f.set_yes(
            "CommercialPropertyCoverage_BusinessIncomeOption_IncludedIndicator_A",
            prop.cov_business_income,
        );
        f.set_yes(
            "CommercialPropertyCoverage_ExtraExpenseOption_IncludedIndicator_A",
            prop.cov_extra_expense,
        );
        f.set_yes(
            "CommercialPropertyCoverage_RentalValueOption_IncludedIndicator_A",
            prop.cov_rental_value,
        );
    }

    // Location description defaults to the first location's address.
    let location_description = input.location_description.clone().or_else(|| {
        input
            .locations
            .values()
            .next()
            .and_then(|loc| loc.address.clone())
    });
    f.set_opt(
        "CertificateOfLiabilityInsurance_ACORDForm_RemarkText_A",
        location_description.as_deref(),
    );
    f.set_opt(
        "CertificateOfLiabilityInsurance_ACORDForm_RemarkText_B",
        input.remarks.as_deref(),
    );

    let ch = &input.cert_holder;
    f.set_opt("CertificateHolder_FullName_A", ch.name.as_deref());
    f.set_opt("CertificateHolder_MailingAddress_LineOne_A", ch.address_line1.as_deref());
    f.set_opt("CertificateHolder_MailingAddress_LineTwo_A", ch.address_line2.as_deref());
    f.set_opt("CertificateHolder_MailingAddress_CityName_A", ch.city.as_deref());
    f.set_opt(
        "CertificateHolder_MailingAddress_StateOrProvinceCode_A",
        ch.state.as_deref(),
    );
    f.set_opt("CertificateHolder_MailingAddress_PostalCode_A", ch.zip.as_deref());

    f
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn input_from(json: &str) -> StructuredInput {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_property_line_fields_and_checkboxes() {
        let input = input_from(
            r#"{
                "policy": {"number": "PKG-99", "effective_date": "01/01/2026"},
                "coverages": {"property": {
                    "has": true,
                    "building_limit": "1,200,000",
                    "deductible": "5,000",
                    "cause_special": true,
                    "cov_building": true
                }}
            }"#,
        );
        let f = map(&input);

        assert_eq!(f.get("Policy_PolicyType_PropertyIndicator_A"), Some("Yes"));
        assert_eq!(f.get("Policy_Property_PolicyNumberIdentifier_A"), Some("PKG-99"));
        assert_eq!(f.get("Policy_Property_EffectiveDate_A"), Some("01/01/2026"));
        assert_eq!(f.get("Property_Building_LimitAmount_A"), Some("1,200,000"));
        assert_eq!(f.get("Policy_PolicyType_SpecialIndicator_A"), Some("Yes"));
        assert_eq!(f.get("Property_Building_CoverageIndicator_A"), Some("Yes"));
        assert!(!f.contains("Policy_PolicyType_BasicIndicator_A"));
    }

    #[test]
    fn test_location_description_falls_back_to_first_location() {
        let input = input_from(
            r#"{"locations": {"loc1": {"address": "500 Commerce St, Dallas, TX 75202"}}}"#,
        );
        let f = map(&input);
        assert_eq!(
            f.get("CertificateOfLiabilityInsurance_ACORDForm_RemarkText_A"),
            Some("500 Commerce St, Dallas, TX 75202")
        );
    }

    #[test]
    fn test_no_property_line_no_property_fields() {
        let f = map(&input_from("{}"));
        assert!(!f.contains("Policy_PolicyType_PropertyIndicator_A"));
        assert!(!f.contains("Property_InsurerLetterCode_A"));
    }
}
