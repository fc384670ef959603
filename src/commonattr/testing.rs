//! In-memory stores used by the search tests

use std::cell::Cell;
use std::collections::HashSet;

use crate::case::{AbstractFile, CaseFileStore};
use crate::common::{eq_ignore_case, normalize_path};
use crate::correlation::{
    CentralRepository, CorrelationAttributeInstance, CorrelationAttributeType, CorrelationCase,
    CorrelationDataSource, InterCaseValues, KnownStatus,
};
use crate::error::{CorrelationError, CorrelationResult};

pub const HASH_A: &str = "5eb63bbbe01eeed093cb22bb8f5acdc3";
pub const HASH_B: &str = "7d793037a0760186574b0282f2f435e7";
pub const HASH_C: &str = "0cc175b9c0f1b6a831c399e269772661";

#[derive(Default)]
pub struct MemoryRepository {
    pub cases: Vec<CorrelationCase>,
    pub data_sources: Vec<CorrelationDataSource>,
    pub instances: Vec<CorrelationAttributeInstance>,
    /// Case ids whose lookup fails with a database error
    pub failing_cases: HashSet<i64>,
    pub attribute_lookups: Cell<usize>,
}

impl MemoryRepository {
    pub fn add_case(&mut self, id: i64, name: &str) -> CorrelationCase {
        let case = CorrelationCase {
            id,
            case_uid: format!("uid-{}", id),
            display_name: name.to_string(),
        };
        self.cases.push(case.clone());
        case
    }

    pub fn add_data_source(&mut self, id: i64, case_id: i64, name: &str) -> CorrelationDataSource {
        let ds = CorrelationDataSource {
            id,
            case_id,
            device_id: format!("dev-{}", id),
            name: name.to_string(),
        };
        self.data_sources.push(ds.clone());
        ds
    }

    pub fn add_instance(&mut self, id: i64, data_source_id: i64, value: &str, path: &str) {
        let data_source = self
            .data_sources
            .iter()
            .find(|d| d.id == data_source_id)
            .cloned()
            .expect("data source registered");
        let case = self
            .cases
            .iter()
            .find(|c| c.id == data_source.case_id)
            .cloned()
            .expect("case registered");
        self.instances.push(CorrelationAttributeInstance {
            id,
            attribute_type: CorrelationAttributeType::Files,
            value: value.to_string(),
            case,
            data_source,
            file_path: path.to_string(),
            known_status: KnownStatus::Unknown,
            comment: None,
        });
    }
}

impl CentralRepository for MemoryRepository {
    fn get_case_by_id(&self, case_id: i64) -> CorrelationResult<Option<CorrelationCase>> {
        if self.failing_cases.contains(&case_id) {
            return Err(CorrelationError::Database(rusqlite::Error::InvalidQuery));
        }
        Ok(self.cases.iter().find(|c| c.id == case_id).cloned())
    }

    fn get_cases(&self) -> CorrelationResult<Vec<CorrelationCase>> {
        Ok(self.cases.clone())
    }

    fn get_attribute_instance(
        &self,
        attribute_id: i64,
    ) -> CorrelationResult<Option<CorrelationAttributeInstance>> {
        self.attribute_lookups.set(self.attribute_lookups.get() + 1);
        Ok(self.instances.iter().find(|i| i.id == attribute_id).cloned())
    }

    fn find_intercase_values(
        &self,
        current_case_id: i64,
        target_case_id: Option<i64>,
    ) -> CorrelationResult<InterCaseValues> {
        let in_scope = |i: &&CorrelationAttributeInstance| match target_case_id {
            Some(target) => i.case.id == current_case_id || i.case.id == target,
            None => true,
        };
        let mut values = InterCaseValues::default();
        for instance in self.instances.iter().filter(in_scope) {
            let peers: Vec<_> = self
                .instances
                .iter()
                .filter(in_scope)
                .filter(|other| other.value == instance.value)
                .collect();
            let in_current = peers.iter().any(|p| p.case.id == current_case_id);
            let in_target = target_case_id.map_or(true, |t| peers.iter().any(|p| p.case.id == t));
            let pairs: HashSet<_> = peers.iter().map(|p| (p.case.id, p.data_source.id)).collect();
            if in_current && in_target && pairs.len() > 1 {
                values.insert(instance.id, instance.value.clone(), instance.case.id);
            }
        }
        Ok(values)
    }

    fn count_unique_data_sources(&self) -> CorrelationResult<u64> {
        Ok(self.data_sources.len() as u64)
    }

    fn count_data_sources_with_value(&self, value: &str) -> CorrelationResult<u64> {
        let sources: HashSet<_> = self
            .instances
            .iter()
            .filter(|i| i.attribute_type == CorrelationAttributeType::Files && i.value == value)
            .map(|i| i.data_source.id)
            .collect();
        Ok(sources.len() as u64)
    }
}

#[derive(Default)]
pub struct MemoryCaseStore {
    pub files: Vec<AbstractFile>,
    pub id_lookups: Cell<usize>,
    pub path_lookups: Cell<usize>,
}

impl MemoryCaseStore {
    pub fn add_file(
        &mut self,
        object_id: i64,
        data_source: (i64, &str),
        full_path: &str,
        md5: Option<&str>,
        mime_type: Option<&str>,
    ) -> AbstractFile {
        let normalized = normalize_path(full_path);
        let split = normalized.rfind('/').map_or(0, |i| i + 1);
        let file = AbstractFile {
            object_id,
            name: normalized[split..].to_string(),
            parent_path: normalized[..split].to_string(),
            data_source_id: data_source.0,
            data_source_name: data_source.1.to_string(),
            md5: md5.map(String::from),
            mime_type: mime_type.map(String::from),
            size: 1,
        };
        self.files.push(file.clone());
        file
    }
}

impl CaseFileStore for MemoryCaseStore {
    fn get_file_by_id(&self, object_id: i64) -> CorrelationResult<Option<AbstractFile>> {
        self.id_lookups.set(self.id_lookups.get() + 1);
        Ok(self.files.iter().find(|f| f.object_id == object_id).cloned())
    }

    fn find_files(
        &self,
        data_source_name: &str,
        parent_path: &str,
        name: &str,
    ) -> CorrelationResult<Vec<AbstractFile>> {
        self.path_lookups.set(self.path_lookups.get() + 1);
        Ok(self
            .files
            .iter()
            .filter(|f| {
                eq_ignore_case(&f.data_source_name, data_source_name)
                    && eq_ignore_case(&f.parent_path, parent_path)
                    && eq_ignore_case(&f.name, name)
            })
            .cloned()
            .collect())
    }

    fn files_with_md5(&self) -> CorrelationResult<Vec<AbstractFile>> {
        Ok(self.files.iter().filter(|f| f.md5.is_some()).cloned().collect())
    }
}
