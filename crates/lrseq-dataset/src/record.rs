use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Sequencing instrument category.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Platform {
    OxfordNanopore,
    PacBioSmrt,
    Other(String),
}

impl Platform {
    /// Platforms that get their own counter in the summary.
    pub const TRACKED: &'static [Platform] = &[Platform::OxfordNanopore, Platform::PacBioSmrt];

    /// Canonical wire spelling.
    pub fn as_str(&self) -> &str {
        match self {
            Platform::OxfordNanopore => "OXFORD_NANOPORE",
            Platform::PacBioSmrt => "PACBIO_SMRT",
            Platform::Other(name) => name,
        }
    }

    /// Human-readable name.
    pub fn label(&self) -> &str {
        match self {
            Platform::OxfordNanopore => "Oxford Nanopore",
            Platform::PacBioSmrt => "PacBio",
            Platform::Other(name) => name,
        }
    }
}

impl FromStr for Platform {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Ok(match s {
            "OXFORD_NANOPORE" | "ONT" | "Oxford Nanopore" => Platform::OxfordNanopore,
            "PACBIO_SMRT" | "PACBIO" | "PacBio" => Platform::PacBioSmrt,
            other => Platform::Other(other.to_string()),
        })
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Platform {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Platform {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        let Ok(platform) = s.parse::<Platform>();
        Ok(platform)
    }
}

/// One genomic sample.
///
/// Every attribute is optional: a field missing from the source document is
/// `None` rather than a parse failure, and unknown fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Record {
    pub sample_id: Option<String>,
    pub scientific_name: Option<String>,
    pub instrument_platform: Option<Platform>,
    #[serde(deserialize_with = "count::deserialize")]
    pub read_count: Option<u64>,
    #[serde(deserialize_with = "count::deserialize")]
    pub base_count: Option<u64>,
    pub study_accession: Option<String>,
    pub source: Option<String>,
    pub library_strategy: Option<String>,
}

impl Record {
    pub fn is_amplicon(&self) -> bool {
        self.library_strategy
            .as_deref()
            .is_some_and(|s| s.eq_ignore_ascii_case("AMPLICON"))
    }
}

/// Counts arrive either as JSON integers or, from the ENA portal, as decimal
/// strings. Empty strings and `null` mean "unknown".
mod count {
    use std::fmt;

    use serde::Deserializer;
    use serde::de::{self, Visitor};

    struct CountVisitor;

    impl<'de> Visitor<'de> for CountVisitor {
        type Value = Option<u64>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a non-negative integer or a decimal string")
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
            Ok(Some(v))
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
            u64::try_from(v)
                .map(Some)
                .map_err(|_| E::invalid_value(de::Unexpected::Signed(v), &self))
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            let v = v.trim();
            if v.is_empty() {
                return Ok(None);
            }
            v.parse()
                .map(Some)
                .map_err(|_| E::invalid_value(de::Unexpected::Str(v), &self))
        }

        fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_some<D: Deserializer<'de>>(self, d: D) -> Result<Self::Value, D::Error> {
            d.deserialize_any(CountVisitor)
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u64>, D::Error> {
        d.deserialize_any(CountVisitor)
    }
}

/// Ordered collection of records, in arrival order.
///
/// Duplicate sample identifiers are kept as they are.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dataset {
    records: Vec<Record>,
}

impl Dataset {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    /// Append another dataset, preserving both orders.
    pub fn append(&mut self, other: Dataset) {
        self.records.extend(other.records);
    }

    pub fn into_records(self) -> Vec<Record> {
        self.records
    }
}

impl From<Vec<Record>> for Dataset {
    fn from(records: Vec<Record>) -> Self {
        Self::new(records)
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn platform_aliases() {
        assert_eq!("ONT".parse::<Platform>(), Ok(Platform::OxfordNanopore));
        assert_eq!("Oxford Nanopore".parse::<Platform>(), Ok(Platform::OxfordNanopore));
        assert_eq!("PacBio".parse::<Platform>(), Ok(Platform::PacBioSmrt));
        assert_eq!(
            "ILLUMINA".parse::<Platform>(),
            Ok(Platform::Other("ILLUMINA".to_string()))
        );
    }

    #[test]
    fn platform_serializes_canonically() {
        let json = serde_json::to_string(&Platform::OxfordNanopore).unwrap();
        assert_eq!(json, "\"OXFORD_NANOPORE\"");
        let back: Platform = serde_json::from_str("\"ONT\"").unwrap();
        assert_eq!(back, Platform::OxfordNanopore);
    }

    #[test]
    fn record_tolerates_missing_and_unknown_fields() {
        let r: Record =
            serde_json::from_str(r#"{"sample_id":"SAMEA1","first_public":"2020-01-01"}"#).unwrap();
        assert_eq!(r.sample_id.as_deref(), Some("SAMEA1"));
        assert_eq!(r.read_count, None);
        assert_eq!(r.instrument_platform, None);
    }

    #[test]
    fn counts_accept_integers_and_strings() {
        let r: Record =
            serde_json::from_str(r#"{"read_count":"1200","base_count":98765}"#).unwrap();
        assert_eq!(r.read_count, Some(1200));
        assert_eq!(r.base_count, Some(98765));

        let r: Record = serde_json::from_str(r#"{"read_count":"","base_count":null}"#).unwrap();
        assert_eq!(r.read_count, None);
        assert_eq!(r.base_count, None);
    }

    #[test]
    fn counts_reject_negative_and_garbage() {
        assert!(serde_json::from_str::<Record>(r#"{"read_count":-1}"#).is_err());
        assert!(serde_json::from_str::<Record>(r#"{"read_count":"lots"}"#).is_err());
        assert!(serde_json::from_str::<Record>(r#"{"read_count":1.5}"#).is_err());
    }

    #[test]
    fn amplicon_is_case_insensitive() {
        let r = Record {
            library_strategy: Some("amplicon".into()),
            ..Default::default()
        };
        assert!(r.is_amplicon());
        assert!(!Record::default().is_amplicon());
    }

    #[test]
    fn append_preserves_order() {
        let a = |id: &str| Record {
            sample_id: Some(id.into()),
            ..Default::default()
        };
        let mut ds = Dataset::new(vec![a("1"), a("2")]);
        ds.append(Dataset::new(vec![a("3"), a("1")]));
        let ids: Vec<_> = ds.iter().map(|r| r.sample_id.as_deref().unwrap()).collect();
        assert_eq!(ids, ["1", "2", "3", "1"]);
    }
}
