//! Active case file store
//!
//! Files ingested into the currently open case. Searches resolve correlation
//! records against this store to decide whether a hit is a live file.

use serde::{Deserialize, Serialize};

use crate::error::CorrelationResult;

/// Whether the open case is local to this machine or shared between examiners
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseType {
    #[default]
    SingleUser,
    MultiUser,
}

/// A file record in the active case database
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbstractFile {
    pub object_id: i64,
    pub name: String,
    /// Parent directory with a trailing separator, e.g. `/Users/bob/`
    pub parent_path: String,
    pub data_source_id: i64,
    pub data_source_name: String,
    pub md5: Option<String>,
    pub mime_type: Option<String>,
    pub size: i64,
}

impl AbstractFile {
    /// Parent path joined with the file name
    pub fn full_path(&self) -> String {
        format!("{}{}", self.parent_path, self.name)
    }
}

/// Query interface of the active case database
pub trait CaseFileStore {
    /// Look up a file by object id
    fn get_file_by_id(&self, object_id: i64) -> CorrelationResult<Option<AbstractFile>>;

    /// Files in the named data source matching parent path and name
    /// (case-insensitive on all three)
    fn find_files(
        &self,
        data_source_name: &str,
        parent_path: &str,
        name: &str,
    ) -> CorrelationResult<Vec<AbstractFile>>;

    /// Every file that has an MD5 recorded
    fn files_with_md5(&self) -> CorrelationResult<Vec<AbstractFile>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_path() {
        let file = AbstractFile {
            object_id: 10,
            name: "a.txt".into(),
            parent_path: "/Users/bob/".into(),
            data_source_id: 1,
            data_source_name: "image.E01".into(),
            md5: None,
            mime_type: None,
            size: 0,
        };
        assert_eq!(file.full_path(), "/Users/bob/a.txt");
    }

    #[test]
    fn test_case_type_serde() {
        let json = serde_json::to_string(&CaseType::MultiUser).unwrap();
        assert_eq!(json, "\"multi_user\"");
        let parsed: CaseType = serde_json::from_str("\"single_user\"").unwrap();
        assert_eq!(parsed, CaseType::SingleUser);
    }
}
