//! Central repository (correlation store) query interface
//!
//! The central repository correlates attribute values across every case an
//! examiner has ingested. Searches only read from it.

mod types;

pub use types::*;

use crate::error::{CorrelationError, CorrelationResult};

/// Read-only view of the central repository
pub trait CentralRepository {
    /// Look up a correlation case by its repository id
    fn get_case_by_id(&self, case_id: i64) -> CorrelationResult<Option<CorrelationCase>>;

    /// All cases in the repository
    fn get_cases(&self) -> CorrelationResult<Vec<CorrelationCase>>;

    /// Find a correlation case by display name (case-insensitive)
    fn get_case_by_name(&self, display_name: &str) -> CorrelationResult<Option<CorrelationCase>> {
        Ok(self
            .get_cases()?
            .into_iter()
            .find(|c| crate::common::eq_ignore_case(&c.display_name, display_name)))
    }

    /// Fetch a single attribute instance by its row id
    fn get_attribute_instance(
        &self,
        attribute_id: i64,
    ) -> CorrelationResult<Option<CorrelationAttributeInstance>>;

    /// File attribute instances whose value occurs in `current_case_id` and in
    /// at least one other case/data source pair. When `target_case_id` is set,
    /// only instances from the current or target case are returned. Files
    /// flagged as known are excluded.
    fn find_intercase_values(
        &self,
        current_case_id: i64,
        target_case_id: Option<i64>,
    ) -> CorrelationResult<InterCaseValues>;

    /// Number of distinct data sources in the repository
    fn count_unique_data_sources(&self) -> CorrelationResult<u64>;

    /// Number of distinct data sources with a file attribute of this value
    fn count_data_sources_with_value(&self, value: &str) -> CorrelationResult<u64>;
}

/// Resolve a correlation case by id, failing when it does not exist
pub fn require_case(repo: &dyn CentralRepository, case_id: i64) -> CorrelationResult<CorrelationCase> {
    repo.get_case_by_id(case_id)?
        .ok_or(CorrelationError::CaseNotFound(case_id))
}
