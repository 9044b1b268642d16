use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One fixed ACORD paper-form layout.
///
/// The variant selects which field schema, overlay coordinate set, and
/// signature rectangle apply. Field identifiers are exact strings tied
/// to one form revision; a layout revision means a new table, not new
/// logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FormVariant {
    /// ACORD 125 Commercial Insurance Application + ACORD 140 Property
    /// Section, distributed as one combined fillable PDF.
    Acord125140,
    /// ACORD 25 Certificate of Liability Insurance (2016/03).
    Acord25,
    /// ACORD 24 Certificate of Property Insurance.
    Acord24,
    /// ACORD 37 Statement of No Loss.
    Acord37,
}

impl FormVariant {
    /// 0-indexed page that carries the General Info Y/N grid and the
    /// prior-carrier table (ACORD 125 page 3). Other variants have no
    /// coordinate overlays besides the signature.
    pub fn overlay_page_index(self) -> Option<usize> {
        match self {
            FormVariant::Acord125140 => Some(2),
            _ => None,
        }
    }

    /// GL section pages (0-indexed) dropped for property-only output.
    pub fn gl_page_indices(self) -> &'static [usize] {
        match self {
            FormVariant::Acord125140 => &[4, 5, 6, 7],
            _ => &[],
        }
    }
}

impl fmt::Display for FormVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FormVariant::Acord125140 => "ACORD-125/140",
            FormVariant::Acord25 => "ACORD-25",
            FormVariant::Acord24 => "ACORD-24",
            FormVariant::Acord37 => "ACORD-37",
        };
        f.write_str(name)
    }
}

impl FromStr for FormVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let norm: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_lowercase();
        match norm.as_str() {
            "125" | "140" | "125140" | "acord125" | "acord140" | "acord125140" => {
                Ok(FormVariant::Acord125140)
            }
            "25" | "acord25" => Ok(FormVariant::Acord25),
            "24" | "acord24" => Ok(FormVariant::Acord24),
            "37" | "acord37" => Ok(FormVariant::Acord37),
            _ => Err(format!("unknown form variant: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepts_common_spellings() {
        assert_eq!("125/140".parse::<FormVariant>().unwrap(), FormVariant::Acord125140);
        assert_eq!("ACORD-25".parse::<FormVariant>().unwrap(), FormVariant::Acord25);
        assert_eq!("acord_37".parse::<FormVariant>().unwrap(), FormVariant::Acord37);
        assert_eq!("24".parse::<FormVariant>().unwrap(), FormVariant::Acord24);
    }

    #[test]
    fn test_parse_rejects_unknown() {
        assert!("126".parse::<FormVariant>().is_err());
    }

    #[test]
    fn test_overlay_page_only_for_application() {
        assert_eq!(FormVariant::Acord125140.overlay_page_index(), Some(2));
        assert_eq!(FormVariant::Acord25.overlay_page_index(), None);
    }
}
