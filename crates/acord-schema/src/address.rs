//! Single-line address decomposition.
//!
//! ACORD 125 location blocks want street / city / state / ZIP in
//! separate fields, but upstream data arrives as one
//! "street, city, ST ZIP" string.

/// Decomposed "street, city, ST ZIP" address.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressParts {
    pub street: String,
    pub city: String,
    pub state: Option<String>,
    pub zip: Option<String>,
}

/// Split a single-line address on commas into street / city / state /
/// ZIP. Requires at least three comma-separated parts; anything less
/// returns `None` and the caller leaves the fields unset (degraded
/// output, not a failure).
pub fn split_address(address: &str) -> Option<AddressParts> {
    let parts: Vec<&str> = address.split(',').collect();
    if parts.len() < 3 {
        return None;
    }

    let mut st_zip = parts[2].trim().split_whitespace();
    Some(AddressParts {
        street: parts[0].trim().to_string(),
        city: parts[1].trim().to_string(),
        state: st_zip.next().map(str::to_string),
        zip: st_zip.next().map(str::to_string),
    })
}

/// State code from an explicit value or the address line, used for
/// state-specific coverage defaults.
pub fn state_code(explicit: Option<&str>, address: Option<&str>) -> Option<String> {
    if let Some(s) = explicit {
        if !s.is_empty() {
            return Some(s.to_string());
        }
    }
    address.and_then(split_address).and_then(|p| p.state)
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn split_never_panics(address in ".{0,200}") {
            let _ = split_address(&address);
        }

        #[test]
        fn split_recovers_components(
            street in "[0-9]{1,5} [A-Za-z ]{1,20}",
            city in "[A-Za-z]{1,15}",
            state in "[A-Z]{2}",
            zip in "[0-9]{5}",
        ) {
            let line = format!("{}, {}, {} {}", street, city, state, zip);
            let parts = split_address(&line).unwrap();
            prop_assert_eq!(parts.street, street.trim());
            prop_assert_eq!(parts.city, city);
            prop_assert_eq!(parts.state.as_deref(), Some(state.as_str()));
            prop_assert_eq!(parts.zip.as_deref(), Some(zip.as_str()));
        }

        #[test]
        fn fewer_than_three_parts_is_none(a in "[^,]{0,30}", b in "[^,]{0,30}") {
            prop_assert_eq!(split_address(&a), None);
            prop_assert_eq!(split_address(&format!("{},{}", a, b)), None);
        }
    }
}
