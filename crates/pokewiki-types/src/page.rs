use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::TypeError;
use crate::keys;

/// A user-submitted wiki page.
///
/// Stored as a flat JSON object under `pages/<lowercase name>`. The named
/// fields are the ones Pokewiki queries; `level` and the stat fields live in
/// `attributes` alongside anything else the uploader supplied. Images are
/// referenced by `image-name`/`image-type` and stored under `images/`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PageRecord {
    pub name: String,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nature: Option<String>,

    #[serde(rename = "image-name", default, skip_serializing_if = "Option::is_none")]
    pub image_name: Option<String>,

    #[serde(rename = "image-type", default, skip_serializing_if = "Option::is_none")]
    pub image_type: Option<String>,

    #[serde(flatten)]
    pub attributes: BTreeMap<String, Value>,
}

impl PageRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn with_nature(mut self, nature: impl Into<String>) -> Self {
        self.nature = Some(nature.into());
        self
    }

    pub fn with_attribute(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(field.into(), value.into());
        self
    }

    /// The storage key this page lives under.
    pub fn key(&self) -> String {
        keys::page_key(&self.name)
    }

    /// Read a field as a number.
    ///
    /// Form uploads store numbers as strings, so numeric strings are accepted
    /// alongside JSON numbers. Returns `None` for missing or non-numeric values.
    pub fn numeric_field(&self, field: &str) -> Option<f64> {
        match self.attributes.get(field)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn level(&self) -> Option<f64> {
        self.numeric_field("level")
    }
}

/// Search criteria over page records.
///
/// Every `Some` field must match: `name` is a case-insensitive substring
/// test, the categorical fields are exact matches. An all-`None` filter
/// matches every page.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageFilter {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub nature: Option<String>,
}

impl PageFilter {
    pub fn by_name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Treat empty strings (as submitted by blank form fields) as unset.
    pub fn normalized(self) -> Self {
        fn keep(field: Option<String>) -> Option<String> {
            field.filter(|value| !value.trim().is_empty())
        }
        Self {
            name: keep(self.name),
            kind: keep(self.kind),
            region: keep(self.region),
            nature: keep(self.nature),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.kind.is_none() && self.region.is_none() && self.nature.is_none()
    }

    pub fn matches(&self, record: &PageRecord) -> bool {
        let name_ok = self
            .name
            .as_ref()
            .map_or(true, |needle| record.name.to_lowercase().contains(&needle.to_lowercase()));
        name_ok
            && exact(&self.kind, &record.kind)
            && exact(&self.region, &record.region)
            && exact(&self.nature, &record.nature)
    }
}

fn exact(wanted: &Option<String>, actual: &Option<String>) -> bool {
    match wanted {
        None => true,
        Some(wanted) => actual.as_deref() == Some(wanted.as_str()),
    }
}

/// Ordering for numeric page sorts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    #[serde(rename = "LowestToHighest")]
    Ascending,
    #[serde(rename = "HighestToLowest")]
    Descending,
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ascending => write!(f, "LowestToHighest"),
            Self::Descending => write!(f, "HighestToLowest"),
        }
    }
}

impl FromStr for SortDirection {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "LowestToHighest" | "asc" | "ascending" => Ok(Self::Ascending),
            "HighestToLowest" | "desc" | "descending" => Ok(Self::Descending),
            other => Err(TypeError::UnknownSortDirection(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn abra() -> PageRecord {
        PageRecord::new("Abra")
            .with_kind("Psychic")
            .with_region("Kanto")
            .with_nature("Timid")
            .with_attribute("level", "16")
            .with_attribute("attack", 20)
    }

    #[test]
    fn record_uses_canonical_field_names() {
        let mut record = abra();
        record.image_name = Some("abra.png".into());
        record.image_type = Some("image/png".into());
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["type"], "Psychic");
        assert_eq!(value["image-name"], "abra.png");
        assert_eq!(value["image-type"], "image/png");
        assert_eq!(value["level"], "16");
        assert!(value.get("kind").is_none());
    }

    #[test]
    fn record_keeps_unknown_fields() {
        let raw = json!({"name": "Zubat", "type": "Poison", "speed": 55, "habitat": "cave"});
        let record: PageRecord = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(record.kind.as_deref(), Some("Poison"));
        assert_eq!(record.attributes.get("habitat"), Some(&json!("cave")));
        assert_eq!(serde_json::to_value(&record).unwrap(), raw);
    }

    #[test]
    fn numeric_fields_accept_strings_and_numbers() {
        let record = abra();
        assert_eq!(record.level(), Some(16.0));
        assert_eq!(record.numeric_field("attack"), Some(20.0));
        assert_eq!(record.numeric_field("speed"), None);
        let odd = PageRecord::new("x").with_attribute("level", "high");
        assert_eq!(odd.level(), None);
    }

    #[test]
    fn key_is_lowercase_name() {
        assert_eq!(abra().key(), "pages/abra");
    }

    #[test]
    fn filter_name_is_case_insensitive_substring() {
        assert!(PageFilter::by_name("BR").matches(&abra()));
        assert!(!PageFilter::by_name("kad").matches(&abra()));
    }

    #[test]
    fn filter_categories_are_exact() {
        let filter = PageFilter {
            kind: Some("Psychic".into()),
            region: Some("Kanto".into()),
            ..PageFilter::default()
        };
        assert!(filter.matches(&abra()));

        let lower = PageFilter {
            kind: Some("psychic".into()),
            ..PageFilter::default()
        };
        assert!(!lower.matches(&abra()));
        assert!(!lower.matches(&PageRecord::new("Ditto")));
    }

    #[test]
    fn empty_filter_matches_all() {
        let filter = PageFilter {
            name: Some("  ".into()),
            nature: Some(String::new()),
            ..PageFilter::default()
        }
        .normalized();
        assert!(filter.is_empty());
        assert!(filter.matches(&abra()));
    }

    #[test]
    fn sort_direction_parsing() {
        assert_eq!("LowestToHighest".parse::<SortDirection>().unwrap(), SortDirection::Ascending);
        assert_eq!("desc".parse::<SortDirection>().unwrap(), SortDirection::Descending);
        assert!("sideways".parse::<SortDirection>().is_err());
        assert_eq!(SortDirection::Descending.to_string(), "HighestToLowest");
    }
}
