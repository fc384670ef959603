//! Central repository record types

use serde::{Deserialize, Serialize};

/// Kind of attribute correlated across cases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CorrelationAttributeType {
    Files,
    Domain,
    Email,
    Phone,
    UsbId,
}

impl CorrelationAttributeType {
    pub fn id(&self) -> i64 {
        match self {
            CorrelationAttributeType::Files => 0,
            CorrelationAttributeType::Domain => 1,
            CorrelationAttributeType::Email => 2,
            CorrelationAttributeType::Phone => 3,
            CorrelationAttributeType::UsbId => 4,
        }
    }

    pub fn from_id(id: i64) -> Option<Self> {
        match id {
            0 => Some(CorrelationAttributeType::Files),
            1 => Some(CorrelationAttributeType::Domain),
            2 => Some(CorrelationAttributeType::Email),
            3 => Some(CorrelationAttributeType::Phone),
            4 => Some(CorrelationAttributeType::UsbId),
            _ => None,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            CorrelationAttributeType::Files => "Files",
            CorrelationAttributeType::Domain => "Domains",
            CorrelationAttributeType::Email => "Email Addresses",
            CorrelationAttributeType::Phone => "Phone Numbers",
            CorrelationAttributeType::UsbId => "USB Devices",
        }
    }
}

/// Known status of a file as recorded in the central repository
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum KnownStatus {
    #[default]
    Unknown,
    /// Matches a known-good hash set (e.g. NSRL)
    Known,
    /// Flagged as notable
    Bad,
}

impl KnownStatus {
    pub fn id(&self) -> i64 {
        match self {
            KnownStatus::Unknown => 0,
            KnownStatus::Known => 1,
            KnownStatus::Bad => 2,
        }
    }

    /// Unrecognized values read back as `Unknown`
    pub fn from_id(id: i64) -> Self {
        match id {
            1 => KnownStatus::Known,
            2 => KnownStatus::Bad,
            _ => KnownStatus::Unknown,
        }
    }
}

/// A case registered in the central repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrelationCase {
    pub id: i64,
    pub case_uid: String,
    pub display_name: String,
}

/// A data source registered in the central repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrelationDataSource {
    pub id: i64,
    pub case_id: i64,
    pub device_id: String,
    pub name: String,
}

/// One occurrence of an attribute value in a case / data source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrelationAttributeInstance {
    pub id: i64,
    pub attribute_type: CorrelationAttributeType,
    pub value: String,
    pub case: CorrelationCase,
    pub data_source: CorrelationDataSource,
    /// Path as recorded at ingest; may use `\` separators
    pub file_path: String,
    pub known_status: KnownStatus,
    #[serde(default)]
    pub comment: Option<String>,
}

impl CorrelationAttributeInstance {
    /// Split the recorded path into (parent path with trailing `/`, file name)
    pub fn parent_path_and_name(&self) -> (String, String) {
        let normalized = crate::common::normalize_path(&self.file_path);
        match normalized.rfind('/') {
            Some(idx) => (
                normalized[..=idx].to_string(),
                normalized[idx + 1..].to_string(),
            ),
            None => ("/".to_string(), normalized),
        }
    }
}

/// Common-value rows returned by an inter-case query, keyed by attribute instance id
#[derive(Debug, Clone, Default)]
pub struct InterCaseValues {
    /// attribute instance id -> value
    pub values: std::collections::BTreeMap<i64, String>,
    /// attribute instance id -> correlation case id
    pub cases: std::collections::HashMap<i64, i64>,
}

impl InterCaseValues {
    pub fn insert(&mut self, attribute_id: i64, value: impl Into<String>, case_id: i64) {
        self.values.insert(attribute_id, value.into());
        self.cases.insert(attribute_id, case_id);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instance(path: &str) -> CorrelationAttributeInstance {
        CorrelationAttributeInstance {
            id: 1,
            attribute_type: CorrelationAttributeType::Files,
            value: "5eb63bbbe01eeed093cb22bb8f5acdc3".into(),
            case: CorrelationCase {
                id: 1,
                case_uid: "uid-1".into(),
                display_name: "Case One".into(),
            },
            data_source: CorrelationDataSource {
                id: 1,
                case_id: 1,
                device_id: "dev-1".into(),
                name: "image.E01".into(),
            },
            file_path: path.into(),
            known_status: KnownStatus::Unknown,
            comment: None,
        }
    }

    #[test]
    fn test_parent_path_and_name() {
        let (parent, name) = instance("\\Users\\bob\\a.txt").parent_path_and_name();
        assert_eq!(parent, "/Users/bob/");
        assert_eq!(name, "a.txt");

        let (parent, name) = instance("a.txt").parent_path_and_name();
        assert_eq!(parent, "/");
        assert_eq!(name, "a.txt");
    }

    #[test]
    fn test_type_ids_round_trip() {
        for ty in [
            CorrelationAttributeType::Files,
            CorrelationAttributeType::Domain,
            CorrelationAttributeType::UsbId,
        ] {
            assert_eq!(CorrelationAttributeType::from_id(ty.id()), Some(ty));
        }
        assert_eq!(CorrelationAttributeType::from_id(99), None);
        assert_eq!(KnownStatus::from_id(7), KnownStatus::Unknown);
    }
}
