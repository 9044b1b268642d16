use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Flat `field_name -> value` mapping produced by the schema mapper and
/// consumed once by the widget filler.
///
/// Keys are exact target-layout identifiers. Keys with no matching
/// widget in the blank form are reported as skipped by the filler,
/// never treated as an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FlatFieldMap(BTreeMap<String, String>);

impl FlatFieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    /// Set only when the value is present and non-empty.
    pub fn set_opt(&mut self, name: impl Into<String>, value: Option<&str>) {
        if let Some(v) = value {
            if !v.is_empty() {
                self.set(name, v);
            }
        }
    }

    /// Checkbox semantics: the literal value "Yes" when true, nothing
    /// otherwise. An explicit "No" is never written to a widget.
    pub fn set_yes(&mut self, name: impl Into<String>, checked: bool) {
        if checked {
            self.set(name, "Yes");
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl FromIterator<(String, String)> for FlatFieldMap {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_yes_omits_false() {
        let mut map = FlatFieldMap::new();
        map.set_yes("A", true);
        map.set_yes("B", false);
        assert_eq!(map.get("A"), Some("Yes"));
        assert!(!map.contains("B"));
    }

    #[test]
    fn test_set_opt_skips_empty() {
        let mut map = FlatFieldMap::new();
        map.set_opt("A", Some(""));
        map.set_opt("B", None);
        map.set_opt("C", Some("x"));
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("C"), Some("x"));
    }
}
